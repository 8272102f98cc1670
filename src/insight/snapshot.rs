//! Input data contracts: per-domain stats snapshots and event records
//!
//! Snapshots are produced by upstream engines and are read-only here. The
//! domain is an explicit discriminant so the selector can match exhaustively.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chronological log entry tied to a (user, entity) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// When the event happened
    pub timestamp: DateTime<Utc>,
    /// Optional emotion tag ("joy", "grief", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    /// Optional role tag ("mentor", "ally", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl EventRecord {
    /// An untagged event at the given time
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            emotion: None,
            role: None,
        }
    }

    /// Attach an emotion tag
    pub fn with_emotion(mut self, emotion: impl Into<String>) -> Self {
        self.emotion = Some(emotion.into());
        self
    }

    /// Attach a role tag
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Domain discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Companion,
    QuestChain,
    SkillTree,
}

/// Categorical relationship class of a companion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipClass {
    Mentor,
    Family,
    Friend,
    Ally,
    Rival,
    Romantic,
    #[serde(other)]
    Other,
}

/// Companion relationship snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionStats {
    pub character_id: String,
    pub character_name: String,
    /// 0–100
    pub relationship_depth: f64,
    pub shared_experiences: u32,
    /// 0–10
    pub support_level: f64,
    pub relationship_class: RelationshipClass,
}

/// Quest chain snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestChain {
    pub chain_id: String,
    pub chain_name: String,
    pub quest_ids: Vec<String>,
    /// 0–100
    pub storyline_progress: f64,
    pub epic_completion: bool,
}

/// Skill tree snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillTree {
    pub skill_id: String,
    pub skill_name: String,
    pub current_level: u32,
    pub mastery_level: u32,
    #[serde(default)]
    pub synergies: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

/// One entity's current state in one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "snake_case")]
pub enum StatsSnapshot {
    Companion(CompanionStats),
    QuestChain(QuestChain),
    SkillTree(SkillTree),
}

impl StatsSnapshot {
    /// Parse a snapshot, turning missing or mistyped fields into a
    /// descriptive `InvalidSnapshot` error.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let snapshot: Self = serde_json::from_value(value)
            .map_err(|e| Error::InvalidSnapshot(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn domain(&self) -> Domain {
        match self {
            Self::Companion(_) => Domain::Companion,
            Self::QuestChain(_) => Domain::QuestChain,
            Self::SkillTree(_) => Domain::SkillTree,
        }
    }

    pub fn entity_id(&self) -> &str {
        match self {
            Self::Companion(c) => &c.character_id,
            Self::QuestChain(q) => &q.chain_id,
            Self::SkillTree(s) => &s.skill_id,
        }
    }

    pub fn entity_name(&self) -> &str {
        match self {
            Self::Companion(c) => &c.character_name,
            Self::QuestChain(q) => &q.chain_name,
            Self::SkillTree(s) => &s.skill_name,
        }
    }

    /// Check the fields the selector relies on.
    pub fn validate(&self) -> Result<()> {
        let domain = self.domain();
        if self.entity_id().trim().is_empty() {
            return Err(Error::InvalidSnapshot(format!(
                "{domain:?} snapshot has an empty entity id"
            )));
        }
        if self.entity_name().trim().is_empty() {
            return Err(Error::InvalidSnapshot(format!(
                "{domain:?} snapshot '{}' has an empty name",
                self.entity_id()
            )));
        }

        match self {
            Self::Companion(c) => {
                check_magnitude("relationship_depth", c.relationship_depth)?;
                check_magnitude("support_level", c.support_level)?;
            }
            Self::QuestChain(q) => {
                check_magnitude("storyline_progress", q.storyline_progress)?;
            }
            Self::SkillTree(_) => {}
        }
        Ok(())
    }

    /// Every magnitude carried by this snapshot, for leak checking.
    pub fn magnitudes(&self) -> Vec<f64> {
        match self {
            Self::Companion(c) => vec![
                c.relationship_depth,
                c.shared_experiences as f64,
                c.support_level,
            ],
            Self::QuestChain(q) => vec![q.quest_ids.len() as f64, q.storyline_progress],
            Self::SkillTree(s) => vec![
                s.current_level as f64,
                s.mastery_level as f64,
                s.synergies.len() as f64,
                s.prerequisites.len() as f64,
            ],
        }
    }
}

/// Scores have no upper bound here; tier tables treat anything past the top
/// threshold as the top tier.
fn check_magnitude(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidSnapshot(format!(
            "{field} must be a finite, non-negative value"
        )));
    }
    Ok(())
}
