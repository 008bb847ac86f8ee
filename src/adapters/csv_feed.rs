use crate::domain::model::FeedRecord;
use crate::domain::ports::SourceFeed;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;

/// Parse one CSV payload into feed records.
///
/// Reserved columns are recognized case-insensitively, with the header
/// aliases the feeds actually use (`fm_id`, `club`, `shortlist_category`,
/// `is_shortlisted`). Everything else lands in the record's stat bag with
/// numbers coerced where possible. Empty cells are treated as absent.
pub fn parse_feed_csv(data: &[u8]) -> Result<Vec<FeedRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let mut record = FeedRecord::default();

        for (header, value) in headers.iter().zip(row.iter()) {
            if value.is_empty() {
                continue;
            }
            match header.to_ascii_lowercase().as_str() {
                "external_id" | "fm_id" | "id" => record.external_id = Some(value.to_string()),
                "name" => record.name = Some(value.to_string()),
                "club" | "group" => record.club = Some(value.to_string()),
                "shortlist" | "shortlist_category" | "declared_category" => {
                    record.shortlist = Some(value.to_string())
                }
                "shortlisted" | "is_shortlisted" | "is_managed" => {
                    record.shortlisted = parse_bool(value)
                }
                _ => {
                    record.stats.insert(header.to_string(), parse_value(value));
                }
            }
        }

        records.push(record);
    }

    Ok(records)
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "y"
    )
}

fn parse_value(value: &str) -> Value {
    if let Ok(n) = value.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(f) = value.parse::<f64>() {
        return Value::from(f);
    }
    Value::String(value.to_string())
}

/// Drop-zone feed: reads a single local CSV file, for batches delivered
/// out of band instead of fetched over HTTP.
#[derive(Debug, Clone)]
pub struct CsvFileFeed {
    path: PathBuf,
}

impl CsvFileFeed {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SourceFeed for CsvFileFeed {
    async fn fetch(&self) -> Result<Vec<FeedRecord>> {
        tracing::debug!("📂 reading feed file: {}", self.path.display());
        let data = tokio::fs::read(&self.path).await?;
        parse_feed_csv(&data)
    }
}
