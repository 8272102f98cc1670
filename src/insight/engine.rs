//! Insight engine
//!
//! Runs one entity through the pipeline:
//!
//! ```text
//! store ──► events ──┬─► temporal ─┐
//!                    ├─► evolution ├─► selector ─► composer ─► leak guard
//!                    └─► tones ────┘
//! ```
//!
//! The store reads for an entity run concurrently; entities in a batch run
//! one after another so output order follows input order.

use super::composer::Template;
use super::evolution;
use super::guard::{ForbiddenValues, LeakGuard};
use super::resolver::{self, dominant_emotion, FamilyTone, MentorTone, SupportTone};
use super::selector::{self, Selection, SelectionContext};
use super::snapshot::StatsSnapshot;
use super::temporal;
use super::types::{InsightBuilder, InsightRecord};
use crate::config::{EngineConfig, LorekeeperConfig};
use crate::error::Result;
use crate::store::LoreStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Stateless insight generator over a shared store.
///
/// Nothing is mutated after construction, so one engine can serve any
/// number of requests.
pub struct InsightEngine<S: LoreStore + ?Sized> {
    store: Arc<S>,
    config: EngineConfig,
    guard: LeakGuard,
}

impl<S: LoreStore + ?Sized> InsightEngine<S> {
    pub fn new(store: Arc<S>, config: &LorekeeperConfig) -> Result<Self> {
        config.engine.validate()?;
        Ok(Self {
            store,
            config: config.engine.clone(),
            guard: LeakGuard::new(&config.guard)?,
        })
    }

    /// Insights for a single entity as of now.
    pub async fn generate_insights(
        &self,
        user_id: &str,
        snapshot: &StatsSnapshot,
    ) -> Result<Vec<InsightRecord>> {
        self.generate_insights_at(user_id, snapshot, Utc::now()).await
    }

    /// Insights for a single entity as of `now`.
    ///
    /// Store failures degrade to defaults. Only a malformed snapshot is an
    /// error.
    pub async fn generate_insights_at(
        &self,
        user_id: &str,
        snapshot: &StatsSnapshot,
        now: DateTime<Utc>,
    ) -> Result<Vec<InsightRecord>> {
        snapshot.validate()?;
        let entity_id = snapshot.entity_id();
        let timeout = self.config.lookup_timeout();
        let store = self.store.as_ref();

        let (synergy_ids, prerequisite_ids): (&[String], &[String]) = match snapshot {
            StatsSnapshot::SkillTree(s) => (s.synergies.as_slice(), s.prerequisites.as_slice()),
            _ => (&[][..], &[][..]),
        };

        let (events, first_seen, synergies, prerequisites) = tokio::join!(
            resolver::load_events(store, user_id, entity_id, timeout),
            resolver::lookup(
                "first_appearance",
                timeout,
                store.first_appearance(user_id, entity_id)
            ),
            resolver::resolve_names(store, user_id, synergy_ids, timeout),
            resolver::resolve_names(store, user_id, prerequisite_ids, timeout),
        );

        let degraded = [
            events.is_defaulted(),
            first_seen.is_defaulted(),
            synergies.is_defaulted(),
            prerequisites.is_defaulted(),
        ]
        .into_iter()
        .filter(|d| *d)
        .count();

        let events = events.into_value();
        let temporal = temporal::analyze(&events, now);
        let evolution = evolution::classify(&events, snapshot.domain());
        let frequency = temporal
            .peak_period
            .map(|p| p.relative_phrase(now))
            .unwrap_or_else(|| temporal.recent_activity_phrase.clone());
        let first_seen = first_seen
            .into_value()
            .or_else(|| events.iter().map(|e| e.timestamp).min());

        let ctx = SelectionContext {
            support: SupportTone::from_events(
                &events,
                self.config.recent_event_window,
                &self.config.supporter_roles,
            ),
            mentor: MentorTone::from_event_count(events.len()),
            family: FamilyTone::from_first_appearance(first_seen, now),
            emotion: dominant_emotion(&events),
            synergies: synergies.into_value(),
            prerequisites: prerequisites.into_value(),
            temporal,
            frequency,
            evolution,
        };

        let selections = selector::select(snapshot, &ctx)?;
        let records = selections
            .iter()
            .map(|selection| compose(selection, snapshot, &ctx))
            .collect::<Result<Vec<_>>>()?;

        let forbidden = ForbiddenValues::from_snapshot(snapshot, events.len()).with_names(
            std::iter::once(snapshot.entity_name())
                .chain(ctx.synergies.iter().map(String::as_str))
                .chain(ctx.prerequisites.iter().map(String::as_str)),
        );
        let records = self.guard.filter(records, &forbidden);

        tracing::debug!(
            entity_id,
            domain = ?snapshot.domain(),
            selected = selections.len(),
            emitted = records.len(),
            degraded_lookups = degraded,
            "Generated insights"
        );
        Ok(records)
    }

    /// Insights for every entity in order, as of now.
    pub async fn generate_all_insights(
        &self,
        user_id: &str,
        snapshots: &[StatsSnapshot],
    ) -> Vec<InsightRecord> {
        self.generate_all_insights_at(user_id, snapshots, Utc::now())
            .await
    }

    /// Insights for every entity in order, as of `now`.
    ///
    /// An entity that fails is logged and skipped; its siblings still run.
    pub async fn generate_all_insights_at(
        &self,
        user_id: &str,
        snapshots: &[StatsSnapshot],
        now: DateTime<Utc>,
    ) -> Vec<InsightRecord> {
        let mut all = Vec::new();
        for snapshot in snapshots {
            match self.generate_insights_at(user_id, snapshot, now).await {
                Ok(records) => all.extend(records),
                Err(e) => {
                    tracing::warn!(
                        entity_id = snapshot.entity_id(),
                        domain = ?snapshot.domain(),
                        error = %e,
                        "Skipping entity"
                    );
                }
            }
        }
        all
    }
}

fn compose(
    selection: &Selection,
    snapshot: &StatsSnapshot,
    ctx: &SelectionContext,
) -> Result<InsightRecord> {
    let mut builder = InsightBuilder::new(selection.insight_type)
        .entity(snapshot.entity_id(), snapshot.entity_name())
        .text(selection.text())
        .timeline(&ctx.temporal.timeline_phrase)
        .frequency(&ctx.frequency)
        .significance(selection.significance);

    if let Some(suggestion) = selection.suggestion_text() {
        builder = builder.suggestion(suggestion);
    }
    if ctx.evolution.has_arc {
        builder = builder.evolution(&ctx.evolution.arc_summary);
    }
    if selection.template == Template::Family && !ctx.family.timeline.is_empty() {
        builder = builder.timeline(&ctx.family.timeline);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::insight::snapshot::{
        CompanionStats, EventRecord, QuestChain, RelationshipClass, SkillTree,
    };
    use crate::insight::types::InsightType;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};

    const USER: &str = "user-1";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 20, 12, 0, 0).unwrap()
    }

    fn engine<S: LoreStore + 'static>(store: S) -> InsightEngine<S> {
        InsightEngine::new(Arc::new(store), &LorekeeperConfig::default()).unwrap()
    }

    fn mentor_companion() -> StatsSnapshot {
        StatsSnapshot::Companion(CompanionStats {
            character_id: "char-1".to_string(),
            character_name: "Aria".to_string(),
            relationship_depth: 75.0,
            shared_experiences: 22,
            support_level: 8.0,
            relationship_class: RelationshipClass::Mentor,
        })
    }

    fn companion(id: &str, depth: f64, shared: u32) -> StatsSnapshot {
        StatsSnapshot::Companion(CompanionStats {
            character_id: id.to_string(),
            character_name: format!("Companion {}", id.to_uppercase()),
            relationship_depth: depth,
            shared_experiences: shared,
            support_level: 0.0,
            relationship_class: RelationshipClass::Friend,
        })
    }

    fn quest(ids: &[&str], progress: f64, complete: bool) -> StatsSnapshot {
        StatsSnapshot::QuestChain(QuestChain {
            chain_id: "qc-1".to_string(),
            chain_name: "The Ember Road".to_string(),
            quest_ids: ids.iter().map(|s| s.to_string()).collect(),
            storyline_progress: progress,
            epic_completion: complete,
        })
    }

    fn skill(level: u32, mastery: u32, synergies: &[&str]) -> StatsSnapshot {
        StatsSnapshot::SkillTree(SkillTree {
            skill_id: "sk-1".to_string(),
            skill_name: "Archery".to_string(),
            current_level: level,
            mastery_level: mastery,
            synergies: synergies.iter().map(|s| s.to_string()).collect(),
            prerequisites: vec![],
        })
    }

    async fn seeded_mentor_store() -> MemoryStore {
        let store = MemoryStore::new();
        let old = now() - Duration::days(400);
        store
            .record_event(USER, "char-1", EventRecord::at(old).with_emotion("joy"))
            .await;
        for day in [2, 5, 9] {
            let at = Utc.with_ymd_and_hms(2025, 6, day, 18, 0, 0).unwrap();
            store
                .record_event(USER, "char-1", EventRecord::at(at).with_emotion("joy"))
                .await;
        }
        store
    }

    fn assert_no_digits(records: &[InsightRecord]) {
        for record in records {
            for field in record.narrative_fields() {
                assert!(
                    !field.chars().any(|c| c.is_ascii_digit()),
                    "digit in {:?}: {field}",
                    record.insight_type
                );
            }
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl LoreStore for BrokenStore {
        async fn list_events(&self, _: &str, _: &str) -> Result<Vec<EventRecord>> {
            Err(Error::Lookup("store offline".to_string()))
        }

        async fn resolve_name(&self, _: &str, _: &str) -> Result<Option<String>> {
            Err(Error::Lookup("store offline".to_string()))
        }

        async fn first_appearance(&self, _: &str, _: &str) -> Result<Option<DateTime<Utc>>> {
            Err(Error::Lookup("store offline".to_string()))
        }
    }

    struct StalledStore;

    #[async_trait]
    impl LoreStore for StalledStore {
        async fn list_events(&self, _: &str, _: &str) -> Result<Vec<EventRecord>> {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            Ok(vec![])
        }

        async fn resolve_name(&self, _: &str, _: &str) -> Result<Option<String>> {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            Ok(None)
        }

        async fn first_appearance(&self, _: &str, _: &str) -> Result<Option<DateTime<Utc>>> {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_mentor_companion_scenario() {
        let engine = engine(seeded_mentor_store().await);
        let records = engine
            .generate_insights_at(USER, &mentor_companion(), now())
            .await
            .unwrap();

        assert!(records.len() >= 4);
        let types: Vec<_> = records.iter().map(|r| r.insight_type).collect();
        assert_eq!(
            &types[..4],
            &[
                InsightType::RelationshipDepth,
                InsightType::SharedExperiences,
                InsightType::Support,
                InsightType::Support,
            ]
        );

        let depth = &records[0];
        assert!(depth.text.contains("deep connection"));
        assert!(depth.text.contains("for over one year"));
        let ctx = depth.story_context.as_ref().unwrap();
        assert_eq!(ctx.timeline.as_deref(), Some("for over one year"));
        assert_eq!(ctx.frequency.as_deref(), Some("with peak activity in June"));
        assert_eq!(ctx.significance.as_deref(), Some("deep"));

        assert!(records[1].text.contains("many meaningful moments"));
        assert!(records[3].text.contains("mentor"));
        assert!(records.iter().all(|r| r.entity_id == "char-1"));
        assert_no_digits(&records);
    }

    #[tokio::test]
    async fn test_arc_carries_emotion_and_evolution() {
        let engine = engine(seeded_mentor_store().await);
        let records = engine
            .generate_insights_at(USER, &mentor_companion(), now())
            .await
            .unwrap();

        let arc = records.last().unwrap();
        assert_eq!(arc.insight_type, InsightType::Evolution);
        assert!(arc.text.contains("marked by moments of joy"));
        assert_eq!(
            arc.story_context.as_ref().unwrap().evolution.as_deref(),
            Some("From early connections to stable relationship")
        );
    }

    #[tokio::test]
    async fn test_low_skill_is_empty() {
        let engine = engine(MemoryStore::new());
        let records = engine
            .generate_insights_at(USER, &skill(2, 0, &[]), now())
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_single_quest_beginning() {
        let engine = engine(MemoryStore::new());
        let records = engine
            .generate_insights_at(USER, &quest(&["q1"], 30.0, false), now())
            .await
            .unwrap();

        let types: Vec<_> = records.iter().map(|r| r.insight_type).collect();
        assert_eq!(types, vec![InsightType::Progress, InsightType::Continuation]);
        assert!(records[0].text.contains("beginning"));
        assert_no_digits(&records);
    }

    #[tokio::test]
    async fn test_digit_in_entity_name_keeps_records() {
        let store = MemoryStore::new();
        store
            .record_event(USER, "qc-1", EventRecord::at(now() - Duration::days(3)))
            .await;
        let engine = engine(store);
        let snapshot = StatsSnapshot::QuestChain(QuestChain {
            chain_id: "qc-1".to_string(),
            chain_name: "Chapter 1".to_string(),
            quest_ids: vec!["q1".to_string()],
            storyline_progress: 30.0,
            epic_completion: false,
        });

        let records = engine
            .generate_insights_at(USER, &snapshot, now())
            .await
            .unwrap();
        let types: Vec<_> = records.iter().map(|r| r.insight_type).collect();
        assert_eq!(types, vec![InsightType::Progress, InsightType::Continuation]);
        assert!(records[0].text.contains("Chapter 1"));
    }

    #[tokio::test]
    async fn test_digit_in_synergy_name_keeps_records() {
        let store = MemoryStore::new();
        store.set_name(USER, "sk-2", "Volley 1").await;
        let engine = engine(store);

        let records = engine
            .generate_insights_at(USER, &skill(3, 0, &["sk-2"]), now())
            .await
            .unwrap();
        let types: Vec<_> = records.iter().map(|r| r.insight_type).collect();
        assert_eq!(types, vec![InsightType::Progression, InsightType::Synergy]);
        assert!(records[1].text.contains("Volley 1"));
    }

    #[tokio::test]
    async fn test_depth_tier_precedence() {
        let engine = engine(MemoryStore::new());
        let records = engine
            .generate_insights_at(USER, &companion("a", 85.0, 1), now())
            .await
            .unwrap();

        let depth: Vec<_> = records
            .iter()
            .filter(|r| r.insight_type == InsightType::RelationshipDepth)
            .collect();
        assert_eq!(depth.len(), 1);
        assert!(depth[0].text.contains("deep connection"));
        assert!(!depth[0].text.contains("is growing"));
    }

    #[tokio::test]
    async fn test_discovery_exclusivity() {
        let engine = engine(MemoryStore::new());
        let records = engine
            .generate_insights_at(USER, &companion("a", 10.0, 0), now())
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].insight_type, InsightType::Discovery);
        assert!(records[0].suggestion.as_deref().unwrap().ends_with('?'));
    }

    #[tokio::test]
    async fn test_skill_synergy_names_resolved() {
        let store = MemoryStore::new();
        store.set_name(USER, "sk-2", "Fletching").await;
        let engine = engine(store);

        let records = engine
            .generate_insights_at(USER, &skill(4, 0, &["sk-2", "sk-9"]), now())
            .await
            .unwrap();
        let types: Vec<_> = records.iter().map(|r| r.insight_type).collect();
        assert_eq!(types, vec![InsightType::Progression, InsightType::Synergy]);
        assert!(records[1].text.contains("Fletching"));
        assert!(!records[1].text.contains("sk-9"));
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let engine = engine(MemoryStore::new());
        let batch = vec![
            companion("a", 85.0, 12),
            companion("b", 45.0, 0),
            companion("c", 10.0, 6),
        ];

        let all = engine.generate_all_insights_at(USER, &batch, now()).await;

        let mut expected = Vec::new();
        for snapshot in &batch {
            expected.extend(
                engine
                    .generate_insights_at(USER, snapshot, now())
                    .await
                    .unwrap(),
            );
        }
        assert_eq!(all, expected);
        let ids: Vec<_> = all.iter().map(|r| r.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "a", "b", "b", "c"]);
    }

    #[tokio::test]
    async fn test_batch_skips_malformed_entity() {
        let engine = engine(MemoryStore::new());
        let batch = vec![
            companion("a", 85.0, 1),
            companion("bad", -4.0, 1),
            companion("c", 85.0, 1),
        ];

        let all = engine.generate_all_insights_at(USER, &batch, now()).await;
        let ids: Vec<_> = all.iter().map(|r| r.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        let err = engine
            .generate_insights_at(USER, &batch[1], now())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSnapshot(_)));
    }

    #[tokio::test]
    async fn test_failing_store_degrades() {
        let engine = engine(BrokenStore);
        let records = engine
            .generate_insights_at(USER, &mentor_companion(), now())
            .await
            .unwrap();

        // No events: no timeline, no arc, default tones
        let types: Vec<_> = records.iter().map(|r| r.insight_type).collect();
        assert_eq!(
            types,
            vec![
                InsightType::RelationshipDepth,
                InsightType::SharedExperiences,
                InsightType::Support,
                InsightType::Support,
            ]
        );
        assert_eq!(records[0].text, "You and Aria share a deep connection.");
        assert!(records[3].text.contains("supportive mentor"));
        assert_no_digits(&records);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_store_times_out() {
        let engine = engine(StalledStore);
        let records = engine
            .generate_insights_at(USER, &skill(5, 1, &["sk-2"]), now())
            .await
            .unwrap();

        let types: Vec<_> = records.iter().map(|r| r.insight_type).collect();
        assert_eq!(types, vec![InsightType::Progression, InsightType::Growth]);
    }

    #[tokio::test]
    async fn test_no_leakage_across_domains() {
        let store = seeded_mentor_store().await;
        store.set_name(USER, "sk-2", "Fletching").await;
        store
            .set_first_appearance(USER, "char-2", now() - Duration::days(800))
            .await;
        let engine = engine(store);

        let batch = vec![
            mentor_companion(),
            StatsSnapshot::Companion(CompanionStats {
                character_id: "char-2".to_string(),
                character_name: "Bram".to_string(),
                relationship_depth: 42.5,
                shared_experiences: 7,
                support_level: 9.5,
                relationship_class: RelationshipClass::Family,
            }),
            quest(&["q1", "q2", "q3"], 66.6, true),
            skill(7, 3, &["sk-2"]),
        ];
        let records = engine.generate_all_insights_at(USER, &batch, now()).await;

        assert!(records.len() > batch.len());
        assert_no_digits(&records);

        let family = records
            .iter()
            .find(|r| r.entity_id == "char-2" && r.insight_type == InsightType::Evolution)
            .unwrap();
        assert_eq!(
            family.text,
            "Your family bond with Bram has deepened for over two years."
        );
    }

    #[tokio::test]
    async fn test_strict_guard_keeps_clean_records() {
        let mut config = LorekeeperConfig::default();
        config.guard.strict_digits = true;
        let engine = InsightEngine::new(Arc::new(seeded_mentor_store().await), &config).unwrap();

        let records = engine
            .generate_insights_at(USER, &mentor_companion(), now())
            .await
            .unwrap();
        assert_eq!(records.len(), 5);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = LorekeeperConfig::default();
        config.engine.lookup_timeout_ms = 0;
        assert!(InsightEngine::new(Arc::new(MemoryStore::new()), &config).is_err());
    }
}
