use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A reconciled player in the authoritative store.
///
/// `id` is the internal primary key, assigned on creation and never reused.
/// `external_id` comes from the feed and is immutable once bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: u64,
    pub external_id: Option<String>,
    pub name: String,
    pub club: String,
    #[serde(default)]
    pub stats: HashMap<String, Value>,
}

impl Player {
    /// Current value of a named field, for diffing against incoming records.
    /// The three scalar fields live on the struct; everything else is a stat.
    pub fn field(&self, key: &str) -> Option<Value> {
        match key {
            "name" => Some(Value::String(self.name.clone())),
            "club" => Some(Value::String(self.club.clone())),
            "external_id" => self.external_id.clone().map(Value::String),
            _ => self.stats.get(key).cloned(),
        }
    }
}

/// A player about to be created; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewPlayer {
    pub external_id: Option<String>,
    pub name: String,
    pub club: String,
    pub stats: HashMap<String, Value>,
}

/// One raw row from the feed after the adapter boundary.
///
/// `shortlist` and `shortlisted` are pipeline control fields; they steer
/// membership sync and are never written to the player itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedRecord {
    pub external_id: Option<String>,
    pub name: Option<String>,
    pub club: Option<String>,
    pub shortlist: Option<String>,
    pub shortlisted: bool,
    pub stats: HashMap<String, Value>,
}

impl FeedRecord {
    /// A record needs at least one identifying key to be usable.
    pub fn is_identifiable(&self) -> bool {
        self.external_id.is_some() || self.name.is_some()
    }
}

/// Per-field linear scale mapping a raw feed value onto 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatScale {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// No identifying key, or nothing to create a player from.
    Malformed,
    /// Fuzzy match landed on a player already bound to a different external id.
    ConflictingIdentity,
    /// The store rejected a read or write; the record was skipped. A rejected
    /// write is rolled back in full.
    Store,
}

/// A record the run could not apply. Collected, never raised past the
/// orchestrator; the caller decides whether to alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordFailure {
    pub row: usize,
    pub name: Option<String>,
    pub kind: FailureKind,
    pub detail: String,
}

/// Outcome counts for one pipeline run. Returned to the caller, never
/// persisted. Failed records are listed separately and counted in none
/// of the four buckets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub transfers: usize,
    pub unchanged: usize,
    #[serde(default)]
    pub failures: Vec<RecordFailure>,
}

impl SyncReport {
    /// Records that landed in a terminal outcome. Transfers are not added
    /// here: a transferred record is also counted as updated.
    pub fn accounted(&self) -> usize {
        self.created + self.updated + self.unchanged
    }

    pub fn summary(&self) -> String {
        format!(
            "created {}, updated {}, transfers {}, unchanged {}, failed {}",
            self.created,
            self.updated,
            self.transfers,
            self.unchanged,
            self.failures.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_field_lookup() {
        let mut stats = HashMap::new();
        stats.insert("xG".to_string(), Value::from(73));
        let player = Player {
            id: 1,
            external_id: Some("fm-100".to_string()),
            name: "Jorrel Hato".to_string(),
            club: "Ajax".to_string(),
            stats,
        };

        assert_eq!(player.field("name"), Some(Value::from("Jorrel Hato")));
        assert_eq!(player.field("club"), Some(Value::from("Ajax")));
        assert_eq!(player.field("external_id"), Some(Value::from("fm-100")));
        assert_eq!(player.field("xG"), Some(Value::from(73)));
        assert_eq!(player.field("PassCompletion"), None);
    }

    #[test]
    fn test_record_identifiability() {
        assert!(!FeedRecord::default().is_identifiable());
        assert!(FeedRecord {
            name: Some("Brian Brobbey".to_string()),
            ..Default::default()
        }
        .is_identifiable());
        assert!(FeedRecord {
            external_id: Some("fm-7".to_string()),
            ..Default::default()
        }
        .is_identifiable());
    }

    #[test]
    fn test_report_accounting() {
        let report = SyncReport {
            created: 2,
            updated: 3,
            transfers: 1,
            unchanged: 4,
            failures: vec![RecordFailure {
                row: 5,
                name: None,
                kind: FailureKind::Malformed,
                detail: "no identifying key".to_string(),
            }],
        };
        assert_eq!(report.accounted(), 9);
        assert!(report.summary().contains("failed 1"));
    }
}
