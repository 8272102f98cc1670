//! Lorekeeper - Narrative Insight Synthesis Engine
//!
//! Lorekeeper turns numeric progress in three story domains (companions,
//! quest chains, skill trees) into short narrative insights. Numbers go in,
//! prose comes out: no record ever carries a raw metric.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        Batch Orchestrator                         │
//! │            entities in input order, failures skipped              │
//! └────────────────────────────────┬─────────────────────────────────┘
//!                                  │ one StatsSnapshot
//! ┌────────────────────────────────▼─────────────────────────────────┐
//! │                         Context Resolvers                         │
//! │  ┌────────────┐  ┌────────────┐  ┌─────────────────────────────┐ │
//! │  │  Temporal  │  │ Evolution  │  │ Tones / names / first seen  │ │
//! │  └─────┬──────┘  └─────┬──────┘  └──────────────┬──────────────┘ │
//! └────────┼───────────────┼────────────────────────┼────────────────┘
//!          └───────────────┴───────────┬────────────┘
//!                                      │ immutable contexts
//! ┌────────────────────────────────────▼─────────────────────────────┐
//! │   Tier Selector ──► Narrative Composer ──► Number Leak Guard      │
//! └────────────────────────────────────┬─────────────────────────────┘
//!                                      ▼
//!                              Vec<InsightRecord>
//! ```
//!
//! Every read goes through [`store::LoreStore`] under a bounded timeout.
//! A failed or slow read falls back to a documented default and is logged;
//! only a malformed snapshot is reported as an error.
//!
//! ## Modules
//!
//! - [`insight`]: snapshots, context resolvers, selector, composer, engine
//! - [`store`]: the lore store interface and an in-memory implementation
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod config;
pub mod error;
pub mod insight;
pub mod store;

pub use config::LorekeeperConfig;
pub use error::{Error, Result};
pub use insight::{InsightEngine, InsightRecord, StatsSnapshot};
pub use store::{LoreStore, MemoryStore};
