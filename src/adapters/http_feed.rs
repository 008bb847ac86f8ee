use crate::adapters::csv_feed::parse_feed_csv;
use crate::domain::model::FeedRecord;
use crate::domain::ports::SourceFeed;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::Client;

/// Downloads one CSV batch from an open-data endpoint.
///
/// Any network or HTTP-level failure propagates as-is: the orchestrator
/// must abort the run rather than reconcile against stale data.
#[derive(Debug, Clone)]
pub struct HttpCsvFeed {
    endpoint: String,
    client: Client,
}

impl HttpCsvFeed {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl SourceFeed for HttpCsvFeed {
    async fn fetch(&self) -> Result<Vec<FeedRecord>> {
        tracing::debug!("📡 GET {}", self.endpoint);
        let response = self.client.get(&self.endpoint).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Adapter {
                message: format!("feed endpoint returned {}", status),
            });
        }

        let body = response.bytes().await?;
        parse_feed_csv(&body)
    }
}
