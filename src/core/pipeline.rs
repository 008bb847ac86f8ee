use crate::core::matcher::NameMatcher;
use crate::core::membership::ShortlistSynchronizer;
use crate::core::normalizer::StatNormalizer;
use crate::core::sync::SyncEngine;
use crate::domain::model::{FeedRecord, SyncReport};
use crate::domain::ports::{ConfigProvider, PlayerStore, SourceFeed, Staging};
use crate::utils::error::Result;
use chrono::Utc;

/// Orchestrates one zero-touch run: acquire → stage → reconcile.
///
/// Single-writer, synchronous batch model: one run executes to completion
/// before another may start against the same store. A failed acquisition
/// short-circuits before anything is staged or written. Each step is also
/// independently invocable.
pub struct SyncPipeline<F, G, S, C> {
    feed: F,
    staging: G,
    store: S,
    config: C,
}

impl<F, G, S, C> SyncPipeline<F, G, S, C>
where
    F: SourceFeed,
    G: Staging,
    S: PlayerStore,
    C: ConfigProvider,
{
    pub fn new(feed: F, staging: G, store: S, config: C) -> Self {
        Self {
            feed,
            staging,
            store,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Step 1: pull one batch from the feed. Any error here is fatal for
    /// the run; the store is never touched against a failed fetch.
    pub async fn acquire(&self) -> Result<Vec<FeedRecord>> {
        tracing::info!("📡 acquiring feed: {}", self.config.feed_endpoint());
        let records = self.feed.fetch().await?;
        tracing::info!("📡 acquired {} records", records.len());
        Ok(records)
    }

    /// Step 2: write the acquired batch to intermediate storage so a run
    /// can be audited or replayed. Returns the snapshot filename.
    pub async fn stage(&self, records: &[FeedRecord]) -> Result<String> {
        let filename = format!("feed_snapshot_{}.json", Utc::now().format("%Y%m%dT%H%M%S"));
        let data = serde_json::to_vec_pretty(records)?;
        self.staging.write_file(&filename, &data).await?;
        Ok(filename)
    }

    /// Step 3: reconcile a batch into the live store.
    pub fn reconcile(&mut self, records: Vec<FeedRecord>) -> SyncReport {
        let mut engine = SyncEngine::new(
            &mut self.store,
            NameMatcher::new(self.config.match_cutoff()),
            StatNormalizer::new(self.config.stat_scales()),
            ShortlistSynchronizer::new(self.config.managed_shortlists().to_vec()),
            self.config.default_shortlist().to_string(),
        );
        engine.run_batch(records)
    }

    /// The full zero-touch pass. Staging and reconciliation are skipped
    /// entirely when the feed yields nothing new.
    pub async fn run(&mut self) -> Result<SyncReport> {
        let records = self.acquire().await?;

        if records.is_empty() {
            tracing::info!("📭 feed returned no rows; nothing to stage or reconcile");
            return Ok(SyncReport::default());
        }

        let snapshot = self.stage(&records).await?;
        tracing::info!("📂 staged snapshot: {}", snapshot);

        let report = self.reconcile(records);
        tracing::info!("✅ sync complete: {}", report.summary());
        Ok(report)
    }
}
