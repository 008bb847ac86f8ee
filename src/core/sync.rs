use crate::core::matcher::NameMatcher;
use crate::core::membership::ShortlistSynchronizer;
use crate::core::normalizer::StatNormalizer;
use crate::domain::model::{FailureKind, FeedRecord, NewPlayer, Player, RecordFailure, SyncReport};
use crate::domain::ports::PlayerStore;
use serde_json::Value;
use std::collections::HashMap;

/// Terminal outcome for a record that matched an existing player.
enum Outcome {
    Updated { transferred: bool },
    Unchanged,
}

/// Matches incoming records to stored players (external id first, fuzzy
/// name second), decides create vs. update, detects club transfers, and
/// applies idempotent upserts.
///
/// Records are processed strictly in input order; a later record with the
/// same external id wins. All field updates for one record go to the store
/// in a single atomic write. Unusable records are collected into the report
/// and never abort the batch.
pub struct SyncEngine<'a, S: PlayerStore> {
    store: &'a mut S,
    matcher: NameMatcher,
    normalizer: StatNormalizer,
    shortlists: ShortlistSynchronizer,
    default_shortlist: String,
}

impl<'a, S: PlayerStore> SyncEngine<'a, S> {
    pub fn new(
        store: &'a mut S,
        matcher: NameMatcher,
        normalizer: StatNormalizer,
        shortlists: ShortlistSynchronizer,
        default_shortlist: String,
    ) -> Self {
        Self {
            store,
            matcher,
            normalizer,
            shortlists,
            default_shortlist,
        }
    }

    pub fn run_batch(&mut self, records: Vec<FeedRecord>) -> SyncReport {
        let mut report = SyncReport::default();

        for (row, record) in records.into_iter().enumerate() {
            if let Err(failure) = self.apply_record(row, record, &mut report) {
                tracing::warn!(
                    "⚠️ row {}: {:?} - {}",
                    failure.row,
                    failure.kind,
                    failure.detail
                );
                report.failures.push(failure);
            }
        }

        report
    }

    /// Run one record through identify → reconcile/create → membership sync.
    /// An `Err` means the record was skipped; the player outcome counts stay
    /// untouched for it.
    fn apply_record(
        &mut self,
        row: usize,
        record: FeedRecord,
        report: &mut SyncReport,
    ) -> Result<(), RecordFailure> {
        if !record.is_identifiable() {
            return Err(RecordFailure {
                row,
                name: None,
                kind: FailureKind::Malformed,
                detail: "record carries neither an external id nor a name".to_string(),
            });
        }

        let player_id = match self.identify(row, &record)? {
            Some((player, matched_by_name)) => {
                match self.reconcile(row, &record, &player, matched_by_name)? {
                    Outcome::Updated { transferred } => {
                        report.updated += 1;
                        if transferred {
                            report.transfers += 1;
                        }
                    }
                    Outcome::Unchanged => report.unchanged += 1,
                }
                player.id
            }
            None => {
                let player = self.create(row, &record)?;
                tracing::debug!("➕ created player '{}' (id {})", player.name, player.id);
                report.created += 1;
                player.id
            }
        };

        // Control fields never reach the store; they only steer membership.
        if record.shortlisted {
            let declared = record
                .shortlist
                .as_deref()
                .unwrap_or(&self.default_shortlist);
            if let Err(e) = self.shortlists.sync(&mut *self.store, player_id, declared) {
                // The player upsert already committed; memberships repair
                // themselves on the next idempotent run.
                report.failures.push(RecordFailure {
                    row,
                    name: record.name.clone(),
                    kind: FailureKind::Store,
                    detail: format!("shortlist sync failed: {}", e),
                });
            }
        }

        Ok(())
    }

    /// Look up an existing player, by external id first, fuzzy name second.
    /// Returns the player and whether the match came from the name path.
    fn identify(
        &self,
        row: usize,
        record: &FeedRecord,
    ) -> Result<Option<(Player, bool)>, RecordFailure> {
        if let Some(external_id) = &record.external_id {
            if let Some(player) = self
                .store
                .find_by_external_id(external_id)
                .map_err(|e| store_failure(row, record, e))?
            {
                return Ok(Some((player, false)));
            }
        }

        let Some(name) = &record.name else {
            // Unknown external id and nothing to match or create from.
            return Err(RecordFailure {
                row,
                name: None,
                kind: FailureKind::Malformed,
                detail: format!(
                    "external id {:?} is unknown and the record has no name",
                    record.external_id
                ),
            });
        };

        let catalog = self
            .store
            .player_names()
            .map_err(|e| store_failure(row, record, e))?;

        if let Some(matched) = self.matcher.best_match(name, &catalog) {
            let Some(player) = self
                .store
                .find_by_name(matched)
                .map_err(|e| store_failure(row, record, e))?
            else {
                return Ok(None);
            };

            // A bound external id is immutable; a mismatch is surfaced, not
            // silently resolved.
            if let (Some(incoming), Some(bound)) = (&record.external_id, &player.external_id) {
                if incoming != bound {
                    return Err(RecordFailure {
                        row,
                        name: record.name.clone(),
                        kind: FailureKind::ConflictingIdentity,
                        detail: format!(
                            "'{}' matched '{}' which is bound to external id '{}', record carries '{}'",
                            name, player.name, bound, incoming
                        ),
                    });
                }
            }

            tracing::debug!("🔍 fuzzy match: '{}' -> '{}'", name, player.name);
            return Ok(Some((player, true)));
        }

        Ok(None)
    }

    /// Diff every field the record carries against the stored player and
    /// apply the changes in one write. Absent fields are left untouched.
    fn reconcile(
        &mut self,
        row: usize,
        record: &FeedRecord,
        player: &Player,
        matched_by_name: bool,
    ) -> Result<Outcome, RecordFailure> {
        let mut updates: HashMap<String, Value> = HashMap::new();

        // A fuzzy-matched spelling is approximate; only an id match may
        // rename the player.
        if !matched_by_name {
            if let Some(name) = &record.name {
                if name != &player.name {
                    updates.insert("name".to_string(), Value::String(name.clone()));
                }
            }
        }

        if matched_by_name && player.external_id.is_none() {
            if let Some(external_id) = &record.external_id {
                updates.insert(
                    "external_id".to_string(),
                    Value::String(external_id.clone()),
                );
            }
        }

        let mut transferred = false;
        if let Some(club) = &record.club {
            if club != &player.club {
                transferred = true;
                updates.insert("club".to_string(), Value::String(club.clone()));
            }
        }

        for (field, raw) in &record.stats {
            let value = self.rated(field, raw);
            if player.field(field).as_ref() != Some(&value) {
                updates.insert(field.clone(), value);
            }
        }

        if updates.is_empty() {
            return Ok(Outcome::Unchanged);
        }

        self.store
            .update_player_fields(player.id, &updates)
            .map_err(|e| store_failure(row, record, e))?;

        if transferred {
            tracing::info!(
                "🔁 transfer: '{}' {} -> {}",
                player.name,
                player.club,
                record.club.as_deref().unwrap_or_default()
            );
        }

        Ok(Outcome::Updated { transferred })
    }

    fn create(&mut self, row: usize, record: &FeedRecord) -> Result<Player, RecordFailure> {
        // identify() already rejected nameless unknowns.
        let Some(name) = record.name.clone() else {
            return Err(RecordFailure {
                row,
                name: None,
                kind: FailureKind::Malformed,
                detail: "cannot create a player without a name".to_string(),
            });
        };

        let stats = record
            .stats
            .iter()
            .map(|(field, raw)| (field.clone(), self.rated(field, raw)))
            .collect();

        self.store
            .create_player(NewPlayer {
                external_id: record.external_id.clone(),
                name,
                club: record.club.clone().unwrap_or_default(),
                stats,
            })
            .map_err(|e| store_failure(row, record, e))
    }

    /// Fields with a configured scale become bounded ratings; everything
    /// else is stored as delivered.
    fn rated(&self, field: &str, raw: &Value) -> Value {
        if self.normalizer.has_scale(field) {
            Value::from(self.normalizer.normalize(field, raw))
        } else {
            raw.clone()
        }
    }
}

fn store_failure(
    row: usize,
    record: &FeedRecord,
    error: crate::utils::error::SyncError,
) -> RecordFailure {
    RecordFailure {
        row,
        name: record.name.clone(),
        kind: FailureKind::Store,
        detail: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_store::MemoryStore;
    use crate::core::normalizer::default_stat_scales;
    use crate::utils::error::{Result, SyncError};
    use serde_json::json;

    fn engine(store: &mut MemoryStore) -> SyncEngine<'_, MemoryStore> {
        SyncEngine::new(
            store,
            NameMatcher::default(),
            StatNormalizer::new(default_stat_scales()),
            ShortlistSynchronizer::new(vec![
                "Global Targets".to_string(),
                "First Team".to_string(),
            ]),
            "Global Targets".to_string(),
        )
    }

    fn record(name: &str, club: &str) -> FeedRecord {
        FeedRecord {
            name: Some(name.to_string()),
            club: Some(club.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_novel_record_creates_player() {
        let mut store = MemoryStore::new();
        let mut rec = record("Brian Brobbey", "Ajax");
        rec.external_id = Some("fm-1".to_string());
        rec.stats.insert("xG".to_string(), json!(0.4));

        let report = engine(&mut store).run_batch(vec![rec]);

        assert_eq!(report.created, 1);
        let player = store.find_by_name("Brian Brobbey").unwrap().unwrap();
        assert_eq!(player.external_id.as_deref(), Some("fm-1"));
        assert_eq!(player.club, "Ajax");
        // Scaled fields land as bounded ratings, not raw values.
        assert_eq!(player.stats.get("xG"), Some(&json!(50)));
    }

    #[test]
    fn test_rerun_of_identical_batch_is_all_unchanged() {
        let mut store = MemoryStore::new();
        let mut rec = record("Brian Brobbey", "Ajax");
        rec.stats.insert("xG".to_string(), json!(0.4));

        let first = engine(&mut store).run_batch(vec![rec.clone()]);
        let second = engine(&mut store).run_batch(vec![rec]);

        assert_eq!(first.created, 1);
        assert_eq!(second.created, 0);
        assert_eq!(second.updated, 0);
        assert_eq!(second.transfers, 0);
        assert_eq!(second.unchanged, 1);
    }

    #[test]
    fn test_club_change_counts_as_transfer_and_update() {
        let mut store = MemoryStore::new();
        engine(&mut store).run_batch(vec![record("Brian Brobbey", "Ajax")]);

        let report =
            engine(&mut store).run_batch(vec![record("Brian Brobbey", "Manchester United")]);

        assert_eq!(report.updated, 1);
        assert_eq!(report.transfers, 1);
        let player = store.find_by_name("Brian Brobbey").unwrap().unwrap();
        assert_eq!(player.club, "Manchester United");
    }

    #[test]
    fn test_external_id_takes_precedence_over_name_match() {
        let mut store = MemoryStore::new();
        let mut a = record("Erling Haaland", "Manchester City");
        a.external_id = Some("fm-9".to_string());
        let mut b = record("Kalvin Phillips", "Leeds United");
        b.external_id = Some("fm-10".to_string());
        engine(&mut store).run_batch(vec![a, b]);

        // Name fuzzy-matches fm-9's player, but the id pins it to fm-10.
        let mut incoming = record("Erling Haland", "Manchester City");
        incoming.external_id = Some("fm-10".to_string());
        let report = engine(&mut store).run_batch(vec![incoming]);

        assert_eq!(report.updated, 1);
        let by_id = store.find_by_external_id("fm-10").unwrap().unwrap();
        assert_eq!(by_id.club, "Manchester City");
        assert_eq!(by_id.name, "Erling Haland");
        let other = store.find_by_external_id("fm-9").unwrap().unwrap();
        assert_eq!(other.name, "Erling Haaland");
    }

    #[test]
    fn test_fuzzy_match_updates_existing_player() {
        let mut store = MemoryStore::new();
        engine(&mut store).run_batch(vec![record("Erling Haaland", "Manchester City")]);

        let mut incoming = record("Erling Haland", "Manchester City");
        incoming.stats.insert("xG".to_string(), json!(0.8));
        let report = engine(&mut store).run_batch(vec![incoming]);

        assert_eq!(report.updated, 1);
        let player = store.find_by_name("Erling Haaland").unwrap().unwrap();
        // The approximate incoming spelling must not overwrite the name.
        assert_eq!(player.name, "Erling Haaland");
        assert_eq!(player.stats.get("xG"), Some(&json!(100)));
    }

    #[test]
    fn test_fuzzy_match_binds_missing_external_id() {
        let mut store = MemoryStore::new();
        engine(&mut store).run_batch(vec![record("Jorrel Hato", "Ajax")]);

        let mut incoming = record("Jorrel Hato", "Ajax");
        incoming.external_id = Some("fm-55".to_string());
        engine(&mut store).run_batch(vec![incoming]);

        let player = store.find_by_external_id("fm-55").unwrap().unwrap();
        assert_eq!(player.name, "Jorrel Hato");
    }

    #[test]
    fn test_conflicting_identity_is_skipped_and_reported() {
        let mut store = MemoryStore::new();
        let mut existing = record("Erling Haaland", "Manchester City");
        existing.external_id = Some("fm-9".to_string());
        engine(&mut store).run_batch(vec![existing]);

        let mut incoming = record("Erling Haland", "Leeds United");
        incoming.external_id = Some("fm-999".to_string());
        let report = engine(&mut store).run_batch(vec![incoming]);

        assert_eq!(report.accounted(), 0);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, FailureKind::ConflictingIdentity);
        // Neither the binding nor the club moved.
        let player = store.find_by_external_id("fm-9").unwrap().unwrap();
        assert_eq!(player.club, "Manchester City");
    }

    #[test]
    fn test_malformed_record_does_not_abort_the_batch() {
        let mut store = MemoryStore::new();
        let names = [
            "Brian Brobbey",
            "Jorrel Hato",
            "Kenneth Taylor",
            "Devyne Rensch",
            "placeholder",
            "Steven Berghuis",
            "Branco van den Boomen",
            "Josip Sutalo",
            "Chuba Akpom",
            "Sivert Mannsverk",
        ];
        let mut batch: Vec<FeedRecord> = names.iter().map(|n| record(n, "Ajax")).collect();
        batch[4] = FeedRecord {
            stats: HashMap::from([("xG".to_string(), json!(0.3))]),
            ..Default::default()
        };

        let report = engine(&mut store).run_batch(batch);

        assert_eq!(report.accounted(), 9);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, FailureKind::Malformed);
        assert_eq!(report.failures[0].row, 4);
    }

    /// Store double whose updates always fail; reads and creates pass
    /// through.
    struct RejectingStore {
        inner: MemoryStore,
    }

    impl PlayerStore for RejectingStore {
        fn find_by_external_id(&self, external_id: &str) -> Result<Option<Player>> {
            self.inner.find_by_external_id(external_id)
        }

        fn find_by_name(&self, name: &str) -> Result<Option<Player>> {
            self.inner.find_by_name(name)
        }

        fn player_names(&self) -> Result<Vec<String>> {
            self.inner.player_names()
        }

        fn shortlist_names(&self) -> Result<Vec<String>> {
            self.inner.shortlist_names()
        }

        fn shortlists_for(&self, player_id: u64) -> Result<Vec<String>> {
            self.inner.shortlists_for(player_id)
        }

        fn create_player(&mut self, new_player: NewPlayer) -> Result<Player> {
            self.inner.create_player(new_player)
        }

        fn update_player_fields(
            &mut self,
            player_id: u64,
            _updates: &HashMap<String, Value>,
        ) -> Result<()> {
            Err(SyncError::StoreWrite {
                player: player_id.to_string(),
                message: "write rejected".to_string(),
            })
        }

        fn add_to_shortlist(&mut self, player_id: u64, shortlist: &str) -> Result<()> {
            self.inner.add_to_shortlist(player_id, shortlist)
        }

        fn remove_from_shortlist(&mut self, player_id: u64, shortlist: &str) -> Result<()> {
            self.inner.remove_from_shortlist(player_id, shortlist)
        }
    }

    #[test]
    fn test_rejected_write_is_collected_and_the_batch_continues() {
        let mut inner = MemoryStore::new();
        engine(&mut inner).run_batch(vec![record("Brian Brobbey", "Ajax")]);
        let mut store = RejectingStore { inner };

        // First record needs an update (which the store rejects), second
        // is a fresh create.
        let report = SyncEngine::new(
            &mut store,
            NameMatcher::default(),
            StatNormalizer::new(default_stat_scales()),
            ShortlistSynchronizer::new(vec!["Global Targets".to_string()]),
            "Global Targets".to_string(),
        )
        .run_batch(vec![
            record("Brian Brobbey", "RB Leipzig"),
            record("Jorrel Hato", "Ajax"),
        ]);

        assert_eq!(report.created, 1);
        assert_eq!(report.updated, 0);
        // The rolled-back club change must not count as a transfer.
        assert_eq!(report.transfers, 0);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].row, 0);
        assert_eq!(report.failures[0].kind, FailureKind::Store);
        let player = store.inner.find_by_name("Brian Brobbey").unwrap().unwrap();
        assert_eq!(player.club, "Ajax");
    }

    #[test]
    fn test_later_record_wins_within_one_batch() {
        let mut store = MemoryStore::new();
        let mut first = record("Brian Brobbey", "Ajax");
        first.external_id = Some("fm-1".to_string());
        let mut second = record("Brian Brobbey", "RB Leipzig");
        second.external_id = Some("fm-1".to_string());

        let report = engine(&mut store).run_batch(vec![first, second]);

        assert_eq!(report.created, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(report.transfers, 1);
        let player = store.find_by_external_id("fm-1").unwrap().unwrap();
        assert_eq!(player.club, "RB Leipzig");
    }

    #[test]
    fn test_absent_fields_are_left_untouched() {
        let mut store = MemoryStore::new();
        let mut rec = record("Brian Brobbey", "Ajax");
        rec.stats.insert("Appearances".to_string(), json!(30));
        engine(&mut store).run_batch(vec![rec]);

        // No club, no stats: nothing to change.
        let incoming = FeedRecord {
            name: Some("Brian Brobbey".to_string()),
            ..Default::default()
        };
        let report = engine(&mut store).run_batch(vec![incoming]);

        assert_eq!(report.unchanged, 1);
        let player = store.find_by_name("Brian Brobbey").unwrap().unwrap();
        assert_eq!(player.club, "Ajax");
        assert_eq!(player.stats.get("Appearances"), Some(&json!(30)));
    }

    #[test]
    fn test_shortlisted_record_triggers_membership_sync() {
        let mut store = MemoryStore::new();
        let mut rec = record("Brian Brobbey", "Ajax");
        rec.shortlisted = true;
        rec.shortlist = Some("First Team".to_string());

        engine(&mut store).run_batch(vec![rec]);

        let id = store.find_by_name("Brian Brobbey").unwrap().unwrap().id;
        assert_eq!(store.shortlists_for(id).unwrap(), vec!["First Team"]);
    }

    #[test]
    fn test_unshortlisted_record_skips_membership_sync() {
        let mut store = MemoryStore::new();
        engine(&mut store).run_batch(vec![record("Brian Brobbey", "Ajax")]);

        let id = store.find_by_name("Brian Brobbey").unwrap().unwrap().id;
        assert!(store.shortlists_for(id).unwrap().is_empty());
    }

    #[test]
    fn test_missing_declared_list_falls_back_to_default() {
        let mut store = MemoryStore::new();
        let mut rec = record("Brian Brobbey", "Ajax");
        rec.shortlisted = true;

        engine(&mut store).run_batch(vec![rec]);

        let id = store.find_by_name("Brian Brobbey").unwrap().unwrap().id;
        assert_eq!(store.shortlists_for(id).unwrap(), vec!["Global Targets"]);
    }
}
