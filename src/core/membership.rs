use crate::domain::ports::PlayerStore;
use crate::utils::error::Result;

/// Keeps managed shortlist membership in line with a record's declared list.
///
/// Only the managed lists are ever cleared; manually curated shortlists are
/// left alone. Running the sync twice with the same inputs yields the same
/// membership set.
#[derive(Debug, Clone)]
pub struct ShortlistSynchronizer {
    managed: Vec<String>,
}

impl ShortlistSynchronizer {
    pub fn new(managed: Vec<String>) -> Self {
        Self { managed }
    }

    pub fn managed(&self) -> &[String] {
        &self.managed
    }

    /// Remove the player from every managed shortlist other than `declared`,
    /// then ensure the declared membership exists.
    pub fn sync<S: PlayerStore>(
        &self,
        store: &mut S,
        player_id: u64,
        declared: &str,
    ) -> Result<()> {
        for list in &self.managed {
            if list != declared {
                store.remove_from_shortlist(player_id, list)?;
            }
        }
        store.add_to_shortlist(player_id, declared)
    }
}
