//! Read access to the lore the engine draws on
//!
//! The persistent store is an external collaborator. The engine only reads
//! through `LoreStore`, and every read may fail or stall; callers degrade to
//! documented defaults rather than propagate.

pub mod memory;

pub use memory::{Fixture, MemoryStore};

use crate::error::Result;
use crate::insight::EventRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Read-only lore store interface.
#[async_trait]
pub trait LoreStore: Send + Sync {
    /// Events recorded for a (user, entity) pair, in any order.
    async fn list_events(&self, user_id: &str, entity_id: &str) -> Result<Vec<EventRecord>>;

    /// Display name of a character, skill, or quest chain.
    async fn resolve_name(&self, user_id: &str, entity_id: &str) -> Result<Option<String>>;

    /// When an entity was first recorded in the user's story.
    async fn first_appearance(
        &self,
        user_id: &str,
        entity_id: &str,
    ) -> Result<Option<DateTime<Utc>>>;
}
