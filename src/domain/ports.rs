use crate::domain::model::{FeedRecord, NewPlayer, Player, StatScale};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Produces one batch of raw records from an external source. Swappable:
/// HTTP download, local drop-zone file, or a test double. An `Err` here is
/// fatal for the whole run; nothing is reconciled against a failed fetch.
#[async_trait]
pub trait SourceFeed: Send + Sync {
    async fn fetch(&self) -> Result<Vec<FeedRecord>>;
}

/// Intermediate storage for acquired snapshots, owned by the orchestrator
/// for the duration of one run.
pub trait Staging: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// The authoritative store. A single `update_player_fields` call is applied
/// atomically; shortlist operations are idempotent set operations.
pub trait PlayerStore: Send + Sync {
    fn find_by_external_id(&self, external_id: &str) -> Result<Option<Player>>;
    fn find_by_name(&self, name: &str) -> Result<Option<Player>>;
    /// Catalog of display names for fuzzy matching, in stable insertion order.
    fn player_names(&self) -> Result<Vec<String>>;
    fn shortlist_names(&self) -> Result<Vec<String>>;
    fn shortlists_for(&self, player_id: u64) -> Result<Vec<String>>;

    fn create_player(&mut self, new_player: NewPlayer) -> Result<Player>;
    fn update_player_fields(
        &mut self,
        player_id: u64,
        updates: &HashMap<String, Value>,
    ) -> Result<()>;
    fn add_to_shortlist(&mut self, player_id: u64, shortlist: &str) -> Result<()>;
    fn remove_from_shortlist(&mut self, player_id: u64, shortlist: &str) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn feed_endpoint(&self) -> &str;
    fn staging_dir(&self) -> &str;
    fn store_path(&self) -> &str;
    fn match_cutoff(&self) -> f64;
    fn default_shortlist(&self) -> &str;
    fn managed_shortlists(&self) -> &[String];
    fn stat_scales(&self) -> HashMap<String, StatScale>;
}
