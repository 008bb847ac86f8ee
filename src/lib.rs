pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::SyncConfig;

pub use adapters::csv_feed::{parse_feed_csv, CsvFileFeed};
pub use adapters::http_feed::HttpCsvFeed;
pub use adapters::json_store::JsonStore;
pub use adapters::local_staging::LocalStaging;
pub use adapters::memory_store::MemoryStore;
pub use core::matcher::NameMatcher;
pub use core::membership::ShortlistSynchronizer;
pub use core::normalizer::{default_stat_scales, StatNormalizer};
pub use core::pipeline::SyncPipeline;
pub use core::sync::SyncEngine;
pub use domain::model::{FeedRecord, Player, RecordFailure, SyncReport};
pub use domain::ports::{ConfigProvider, PlayerStore, SourceFeed, Staging};
pub use utils::error::{Result, SyncError};
