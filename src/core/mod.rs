pub mod matcher;
pub mod membership;
pub mod normalizer;
pub mod pipeline;
pub mod sync;

pub use crate::domain::model::{FeedRecord, Player, SyncReport};
pub use crate::domain::ports::{ConfigProvider, PlayerStore, SourceFeed, Staging};
pub use crate::utils::error::Result;
