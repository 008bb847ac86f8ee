use crate::domain::model::{NewPlayer, Player};
use crate::domain::ports::PlayerStore;
use crate::utils::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// In-memory player store: the master-DB dictionary the pipeline upserts
/// into. Also the backing state of [`crate::adapters::json_store::JsonStore`]
/// and the store double for tests.
///
/// `update_player_fields` validates the whole update before mutating, so a
/// rejected write leaves the player untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    players: Vec<Player>,
    shortlists: BTreeMap<String, BTreeSet<u64>>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn player_mut(&mut self, player_id: u64) -> Result<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or_else(|| SyncError::StoreWrite {
                player: player_id.to_string(),
                message: "unknown player id".to_string(),
            })
    }
}

fn expect_string(player_id: u64, field: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| SyncError::StoreWrite {
            player: player_id.to_string(),
            message: format!("field '{}' requires a string value", field),
        })
}

impl PlayerStore for MemoryStore {
    fn find_by_external_id(&self, external_id: &str) -> Result<Option<Player>> {
        Ok(self
            .players
            .iter()
            .find(|p| p.external_id.as_deref() == Some(external_id))
            .cloned())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Player>> {
        Ok(self.players.iter().find(|p| p.name == name).cloned())
    }

    fn player_names(&self) -> Result<Vec<String>> {
        Ok(self.players.iter().map(|p| p.name.clone()).collect())
    }

    fn shortlist_names(&self) -> Result<Vec<String>> {
        Ok(self.shortlists.keys().cloned().collect())
    }

    fn shortlists_for(&self, player_id: u64) -> Result<Vec<String>> {
        Ok(self
            .shortlists
            .iter()
            .filter(|(_, members)| members.contains(&player_id))
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn create_player(&mut self, new_player: NewPlayer) -> Result<Player> {
        if new_player.name.trim().is_empty() {
            return Err(SyncError::StoreWrite {
                player: "<new>".to_string(),
                message: "player name cannot be empty".to_string(),
            });
        }
        if let Some(external_id) = &new_player.external_id {
            if self.find_by_external_id(external_id)?.is_some() {
                return Err(SyncError::StoreWrite {
                    player: new_player.name.clone(),
                    message: format!("external id '{}' is already bound", external_id),
                });
            }
        }

        self.next_id += 1;
        let player = Player {
            id: self.next_id,
            external_id: new_player.external_id,
            name: new_player.name,
            club: new_player.club,
            stats: new_player.stats,
        };
        self.players.push(player.clone());
        Ok(player)
    }

    fn update_player_fields(
        &mut self,
        player_id: u64,
        updates: &HashMap<String, Value>,
    ) -> Result<()> {
        // Validate everything before touching the player: one logical
        // update is applied atomically or not at all.
        let current = self
            .players
            .iter()
            .find(|p| p.id == player_id)
            .ok_or_else(|| SyncError::StoreWrite {
                player: player_id.to_string(),
                message: "unknown player id".to_string(),
            })?;

        let mut scalars: HashMap<&str, String> = HashMap::new();
        for (field, value) in updates {
            match field.as_str() {
                "name" | "club" => {
                    scalars.insert(field, expect_string(player_id, field, value)?);
                }
                "external_id" => {
                    let incoming = expect_string(player_id, field, value)?;
                    if let Some(bound) = &current.external_id {
                        if bound != &incoming {
                            return Err(SyncError::StoreWrite {
                                player: current.name.clone(),
                                message: format!(
                                    "external id '{}' is immutable, rejected '{}'",
                                    bound, incoming
                                ),
                            });
                        }
                    }
                    scalars.insert(field, incoming);
                }
                _ => {}
            }
        }

        let player = self.player_mut(player_id)?;
        for (field, value) in updates {
            match field.as_str() {
                "name" => player.name = scalars["name"].clone(),
                "club" => player.club = scalars["club"].clone(),
                "external_id" => player.external_id = Some(scalars["external_id"].clone()),
                _ => {
                    player.stats.insert(field.clone(), value.clone());
                }
            }
        }
        Ok(())
    }

    fn add_to_shortlist(&mut self, player_id: u64, shortlist: &str) -> Result<()> {
        self.shortlists
            .entry(shortlist.to_string())
            .or_default()
            .insert(player_id);
        Ok(())
    }

    fn remove_from_shortlist(&mut self, player_id: u64, shortlist: &str) -> Result<()> {
        if let Some(members) = self.shortlists.get_mut(shortlist) {
            members.remove(&player_id);
        }
        Ok(())
    }
}
