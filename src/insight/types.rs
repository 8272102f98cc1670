//! Insight record types
//!
//! An `InsightRecord` is the engine's only output unit: templated narrative
//! text plus the entity it describes. Records are created fresh per call and
//! carry no identity of their own. No field may hold a raw magnitude.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A narrative insight about one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightRecord {
    /// Rendered narrative text
    pub text: String,
    /// Entity the insight describes
    pub entity_id: String,
    /// Display name of the entity
    pub entity_name: String,
    /// Kind of insight
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    /// Direct question to the user (discovery insights only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Qualitative story framing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_context: Option<StoryContext>,
}

impl InsightRecord {
    /// All user-facing strings that must stay free of magnitudes.
    pub fn narrative_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.text.as_str()];
        if let Some(ref suggestion) = self.suggestion {
            fields.push(suggestion);
        }
        if let Some(ref ctx) = self.story_context {
            fields.extend(
                [&ctx.timeline, &ctx.evolution, &ctx.frequency, &ctx.significance]
                    .into_iter()
                    .flatten()
                    .map(String::as_str),
            );
        }
        fields
    }
}

/// Qualitative framing attached to an insight
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub significance: Option<String>,
}

impl StoryContext {
    pub fn is_empty(&self) -> bool {
        self.timeline.is_none()
            && self.evolution.is_none()
            && self.frequency.is_none()
            && self.significance.is_none()
    }
}

/// The kind of narrative insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    RelationshipDepth,
    SharedExperiences,
    Discovery,
    Support,
    Evolution,
    Connection,
    Progress,
    Continuation,
    Completion,
    Progression,
    Synergy,
    Growth,
    Narrative,
    Temporal,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RelationshipDepth => "relationship_depth",
            Self::SharedExperiences => "shared_experiences",
            Self::Discovery => "discovery",
            Self::Support => "support",
            Self::Evolution => "evolution",
            Self::Connection => "connection",
            Self::Progress => "progress",
            Self::Continuation => "continuation",
            Self::Completion => "completion",
            Self::Progression => "progression",
            Self::Synergy => "synergy",
            Self::Growth => "growth",
            Self::Narrative => "narrative",
            Self::Temporal => "temporal",
        }
    }
}

/// Builder for constructing `InsightRecord` instances
pub struct InsightBuilder {
    insight_type: InsightType,
    entity_id: Option<String>,
    entity_name: Option<String>,
    text: Option<String>,
    suggestion: Option<String>,
    story_context: StoryContext,
}

impl InsightBuilder {
    /// Create a new builder with the required insight type
    pub fn new(insight_type: InsightType) -> Self {
        Self {
            insight_type,
            entity_id: None,
            entity_name: None,
            text: None,
            suggestion: None,
            story_context: StoryContext::default(),
        }
    }

    /// Set the entity the insight describes
    pub fn entity(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self.entity_name = Some(name.into());
        self
    }

    /// Set the rendered text
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the suggestion; empty strings are ignored
    pub fn suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = non_empty(suggestion.into());
        self
    }

    pub fn timeline(mut self, phrase: impl Into<String>) -> Self {
        self.story_context.timeline = non_empty(phrase.into());
        self
    }

    pub fn evolution(mut self, phrase: impl Into<String>) -> Self {
        self.story_context.evolution = non_empty(phrase.into());
        self
    }

    pub fn frequency(mut self, phrase: impl Into<String>) -> Self {
        self.story_context.frequency = non_empty(phrase.into());
        self
    }

    pub fn significance(mut self, phrase: impl Into<String>) -> Self {
        self.story_context.significance = non_empty(phrase.into());
        self
    }

    /// Build the record, returning an error if text or entity is missing
    pub fn build(self) -> Result<InsightRecord> {
        let text = self
            .text
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Internal("insight text is required".to_string()))?;
        let entity_id = self
            .entity_id
            .ok_or_else(|| Error::Internal("insight entity is required".to_string()))?;

        Ok(InsightRecord {
            text,
            entity_id,
            entity_name: self.entity_name.unwrap_or_default(),
            insight_type: self.insight_type,
            suggestion: self.suggestion,
            story_context: if self.story_context.is_empty() {
                None
            } else {
                Some(self.story_context)
            },
        })
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
