//! In-memory lore store
//!
//! Backs tests and the CLI. Uses `tokio::sync::RwLock` for concurrent access,
//! and can be seeded from a JSON `Fixture`. Fixture snapshots are parsed one
//! by one so a malformed entry never takes its siblings down with it.

use super::LoreStore;
use crate::error::Result;
use crate::insight::{EventRecord, StatsSnapshot};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

type EntityKey = (String, String);

/// In-memory store keyed by (user, entity)
pub struct MemoryStore {
    events: Arc<RwLock<HashMap<EntityKey, Vec<EventRecord>>>>,
    names: Arc<RwLock<HashMap<EntityKey, String>>>,
    first_appearances: Arc<RwLock<HashMap<EntityKey, DateTime<Utc>>>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(HashMap::new())),
            names: Arc::new(RwLock::new(HashMap::new())),
            first_appearances: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Append an event to a (user, entity) log
    pub async fn record_event(&self, user_id: &str, entity_id: &str, event: EventRecord) {
        self.events
            .write()
            .await
            .entry(key(user_id, entity_id))
            .or_default()
            .push(event);
    }

    /// Set the display name of an entity
    pub async fn set_name(&self, user_id: &str, entity_id: &str, name: impl Into<String>) {
        self.names
            .write()
            .await
            .insert(key(user_id, entity_id), name.into());
    }

    /// Set the first-appearance date of an entity
    pub async fn set_first_appearance(&self, user_id: &str, entity_id: &str, at: DateTime<Utc>) {
        self.first_appearances
            .write()
            .await
            .insert(key(user_id, entity_id), at);
    }

    /// Number of events held for a (user, entity) pair
    pub async fn event_count(&self, user_id: &str, entity_id: &str) -> usize {
        self.events
            .read()
            .await
            .get(&key(user_id, entity_id))
            .map_or(0, Vec::len)
    }

    /// Build a store from a fixture, returning it with the fixture's valid
    /// snapshots in order. Invalid snapshots are logged and skipped.
    pub async fn from_fixture(fixture: Fixture) -> (Self, Vec<StatsSnapshot>) {
        let store = Self::new();
        let user = fixture.user_id.as_str();

        let mut snapshots = Vec::with_capacity(fixture.snapshots.len());
        for (index, parsed) in fixture.parse_snapshots().into_iter().enumerate() {
            match parsed {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping invalid fixture snapshot");
                }
            }
        }

        for (entity_id, events) in fixture.events {
            for event in events {
                store.record_event(user, &entity_id, event).await;
            }
        }
        for (entity_id, name) in fixture.names {
            store.set_name(user, &entity_id, name).await;
        }
        for (entity_id, at) in fixture.first_appearances {
            store.set_first_appearance(user, &entity_id, at).await;
        }

        (store, snapshots)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LoreStore for MemoryStore {
    async fn list_events(&self, user_id: &str, entity_id: &str) -> Result<Vec<EventRecord>> {
        Ok(self
            .events
            .read()
            .await
            .get(&key(user_id, entity_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn resolve_name(&self, user_id: &str, entity_id: &str) -> Result<Option<String>> {
        Ok(self
            .names
            .read()
            .await
            .get(&key(user_id, entity_id))
            .cloned())
    }

    async fn first_appearance(
        &self,
        user_id: &str,
        entity_id: &str,
    ) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .first_appearances
            .read()
            .await
            .get(&key(user_id, entity_id))
            .copied())
    }
}

fn key(user_id: &str, entity_id: &str) -> EntityKey {
    (user_id.to_string(), entity_id.to_string())
}

/// A self-contained input bundle for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub user_id: String,
    /// Raw snapshots, parsed individually by `parse_snapshots`
    pub snapshots: Vec<serde_json::Value>,
    /// Events per entity id
    #[serde(default)]
    pub events: HashMap<String, Vec<EventRecord>>,
    /// Display names per entity id
    #[serde(default)]
    pub names: HashMap<String, String>,
    /// First-appearance dates per entity id
    #[serde(default)]
    pub first_appearances: HashMap<String, DateTime<Utc>>,
}

impl Fixture {
    /// Load a fixture from a JSON file. Snapshots are not validated here.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Parse every snapshot, in order, keeping each outcome.
    pub fn parse_snapshots(&self) -> Vec<Result<StatsSnapshot>> {
        self.snapshots
            .iter()
            .cloned()
            .map(StatsSnapshot::from_json)
            .collect()
    }
}
