use crate::adapters::memory_store::MemoryStore;
use crate::domain::model::{NewPlayer, Player};
use crate::domain::ports::PlayerStore;
use crate::utils::error::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File-backed master store: the whole database is one JSON document,
/// loaded at startup and written back with an explicit [`flush`].
///
/// [`flush`]: JsonStore::flush
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonStore {
    /// Load the store from `path`, or start empty when the file does not
    /// exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = if path.exists() {
            let data = std::fs::read(&path)?;
            serde_json::from_slice(&data)?
        } else {
            tracing::info!("📁 master store {} not found, starting empty", path.display());
            MemoryStore::new()
        };
        Ok(Self { path, inner })
    }

    /// Persist the current state. Written via a sibling temp file and
    /// rename so a crash mid-write cannot truncate the master file.
    pub fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&self.inner)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &data)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::debug!("📁 master store flushed to {}", self.path.display());
        Ok(())
    }
}

impl PlayerStore for JsonStore {
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
        updates: &HashMap<String, Value>,
    ) -> Result<()> {
        self.inner.update_player_fields(player_id, updates)
    }

    fn add_to_shortlist(&mut self, player_id: u64, shortlist: &str) -> Result<()> {
        self.inner.add_to_shortlist(player_id, shortlist)
    }

    fn remove_from_shortlist(&mut self, player_id: u64, shortlist: &str) -> Result<()> {
        self.inner.remove_from_shortlist(player_id, shortlist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_player(name: &str) -> NewPlayer {
        NewPlayer {
            external_id: None,
            name: name.to_string(),
            club: "Ajax".to_string(),
            stats: HashMap::new(),
        }
    }

    #[test]
    fn test_open_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::open(dir.path().join("master.json")).unwrap();
        assert!(store.player_names().unwrap().is_empty());
    }

    #[test]
    fn test_flush_and_reopen_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("master.json");

        let mut store = JsonStore::open(&path).unwrap();
        let player = store.create_player(new_player("Brian Brobbey")).unwrap();
        store.add_to_shortlist(player.id, "Global Targets").unwrap();
        store.flush().unwrap();

        let reopened = JsonStore::open(&path).unwrap();
        assert_eq!(reopened.player_names().unwrap(), vec!["Brian Brobbey"]);
        assert_eq!(
            reopened.shortlists_for(player.id).unwrap(),
            vec!["Global Targets"]
        );
    }

    #[test]
    fn test_reopened_store_does_not_reuse_ids() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("master.json");

        let mut store = JsonStore::open(&path).unwrap();
        let first = store.create_player(new_player("A One")).unwrap();
        store.flush().unwrap();

        let mut reopened = JsonStore::open(&path).unwrap();
        let second = reopened.create_player(new_player("B Two")).unwrap();
        assert!(second.id > first.id);
    }
}
