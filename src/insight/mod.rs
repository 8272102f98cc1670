//! Narrative insight synthesis
//!
//! Turns a numeric stats snapshot plus the entity's event history into
//! short story-shaped records. No raw number ever reaches a record.

pub mod composer;
pub mod engine;
pub mod evolution;
pub mod guard;
pub mod resolver;
pub mod selector;
pub mod snapshot;
pub mod temporal;
pub mod types;

pub use engine::InsightEngine;
pub use evolution::{EvolutionProfile, Phase, Trend};
pub use guard::LeakGuard;
pub use resolver::{Fallback, Lookup};
pub use snapshot::{
    CompanionStats, Domain, EventRecord, QuestChain, RelationshipClass, SkillTree, StatsSnapshot,
};
pub use temporal::{PeakPeriod, TemporalContext};
pub use types::{InsightBuilder, InsightRecord, InsightType, StoryContext};
