use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::recco::config::ReccoConfig;
use crate::recco::diagnosis::Diagnoser;
use crate::recco::pool::ContentPool;
use crate::recco::prioritization::Prioritizer;
use crate::recco::reinforcement::Reinforcer;
use crate::recco::selection::Selector;
use crate::recco::sequencing::Sequencer;
use crate::recco::types::{
    CandidateAction, DiagnosedState, Priority, ReccoInputs, Reinforcement, SelectedContent,
    SequencedTrail, SessionResult, TrailItem,
};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEBUG_SAMPLE_SIZE: usize = 5;

/// Everything needed to build one learner's trail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrailRequest {
    pub learner_id: String,
    #[serde(default)]
    pub inputs: ReccoInputs,
    #[serde(default)]
    pub candidates: Vec<CandidateAction>,
    /// Falls back to the diagnosed `tempo_otimo_estudo`.
    #[serde(default)]
    pub budget_minutes: Option<u32>,
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugSample {
    pub top_priorities: Vec<Priority>,
    pub first_items: Vec<TrailItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub engine_version: String,
    pub budget_minutes: u32,
    pub srs_backlog: u32,
    pub candidate_count: usize,
    pub priority_count: usize,
    pub processing_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailOutcome {
    pub learner_id: String,
    pub diagnosis: DiagnosedState,
    pub selected: SelectedContent,
    pub trail: SequencedTrail,
    pub metadata: RunMetadata,
}

/// Runs the stages in order for one learner. Holds no per-learner state, so a
/// single engine serves any number of learners concurrently.
pub struct ReccoEngine {
    config: ReccoConfig,
    diagnoser: Diagnoser,
    prioritizer: Prioritizer,
    selector: Selector,
    sequencer: Sequencer,
    reinforcer: Reinforcer,
}

impl ReccoEngine {
    pub fn new(config: ReccoConfig) -> Self {
        Self {
            diagnoser: Diagnoser::new(config.diagnosis.clone()),
            prioritizer: Prioritizer::new(config.prioritization.clone()),
            selector: Selector::new(config.selection.clone()),
            sequencer: Sequencer::new(config.sequencing.clone()),
            reinforcer: Reinforcer::new(config.reinforcement.clone()),
            config,
        }
    }

    pub fn config(&self) -> &ReccoConfig {
        &self.config
    }

    pub fn diagnose(&self, inputs: &ReccoInputs) -> DiagnosedState {
        self.diagnoser.diagnose(inputs)
    }

    pub fn generate_trail(&self, request: &TrailRequest, pool: &dyn ContentPool) -> TrailOutcome {
        let start_time = Instant::now();
        let inputs = &request.inputs;

        let diagnosis = self.diagnoser.diagnose(inputs);
        let priorities = self
            .prioritizer
            .prioritize(&diagnosis, inputs, &request.candidates);
        let budget_minutes = request
            .budget_minutes
            .unwrap_or(diagnosis.tempo_otimo_estudo);
        let selected = self
            .selector
            .select(&priorities, pool, budget_minutes, inputs.srs_overdue);
        let trail = self.sequencer.sequence(&selected, &diagnosis);

        let processing_time_ms = start_time.elapsed().as_millis() as u64;
        let debug = request.debug.then(|| DebugSample {
            top_priorities: priorities.iter().take(DEBUG_SAMPLE_SIZE).cloned().collect(),
            first_items: trail.items.iter().take(DEBUG_SAMPLE_SIZE).cloned().collect(),
        });

        tracing::info!(
            learner_id = %request.learner_id,
            estado_cognitivo = diagnosis.estado_cognitivo.as_str(),
            items = trail.items.len(),
            total_minutes = trail.total_time_minutes,
            budget_minutes,
            processing_time_ms,
            "trail generated"
        );

        TrailOutcome {
            learner_id: request.learner_id.clone(),
            metadata: RunMetadata {
                engine_version: ENGINE_VERSION.to_string(),
                budget_minutes,
                srs_backlog: inputs.srs_pending.saturating_add(inputs.srs_overdue),
                candidate_count: request.candidates.len(),
                priority_count: priorities.len(),
                processing_time_ms,
                debug,
            },
            diagnosis,
            selected,
            trail,
        }
    }

    /// Independent learners in parallel; output order follows `requests`.
    pub fn generate_trails<P>(&self, requests: &[TrailRequest], pool: &P) -> Vec<TrailOutcome>
    where
        P: ContentPool,
    {
        requests
            .par_iter()
            .map(|request| self.generate_trail(request, pool))
            .collect()
    }

    pub fn reinforce(
        &self,
        session: &SessionResult,
        state: &DiagnosedState,
        pool: &dyn ContentPool,
    ) -> Reinforcement {
        self.reinforcer.reinforce(session, state, pool)
    }
}

impl Default for ReccoEngine {
    fn default() -> Self {
        Self::new(ReccoConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recco::pool::{InMemoryContentPool, PoolItem};
    use crate::recco::types::ContentKind;

    fn pool() -> InMemoryContentPool {
        InMemoryContentPool::new(vec![
            PoolItem::new("d1", ContentKind::Drop),
            PoolItem::new("q1", ContentKind::Questao),
            PoolItem::new("r1", ContentKind::Revisao),
        ])
    }

    fn request(learner_id: &str) -> TrailRequest {
        TrailRequest {
            learner_id: learner_id.to_string(),
            inputs: ReccoInputs {
                srs_overdue: 3,
                ..Default::default()
            },
            candidates: vec![
                CandidateAction::new("drop", ContentKind::Drop),
                CandidateAction::new("questoes", ContentKind::Questao),
                CandidateAction::new("revisar", ContentKind::Revisao),
            ],
            budget_minutes: Some(30),
            debug: false,
        }
    }

    #[test]
    fn budget_defaults_to_diagnosed_study_time() {
        let engine = ReccoEngine::default();
        let outcome = engine.generate_trail(
            &TrailRequest {
                budget_minutes: None,
                ..request("ana")
            },
            &pool(),
        );
        assert_eq!(outcome.metadata.budget_minutes, outcome.diagnosis.tempo_otimo_estudo);
        assert_eq!(outcome.trail.total_time_minutes, 10);
    }

    #[test]
    fn metadata_reports_counts_and_optional_debug() {
        let engine = ReccoEngine::default();
        let outcome = engine.generate_trail(&request("bia"), &pool());
        assert_eq!(outcome.metadata.candidate_count, 3);
        assert_eq!(outcome.metadata.priority_count, 3);
        assert_eq!(outcome.metadata.srs_backlog, 3);
        assert_eq!(outcome.metadata.engine_version, ENGINE_VERSION);
        assert!(outcome.metadata.debug.is_none());

        let debug = engine
            .generate_trail(
                &TrailRequest {
                    debug: true,
                    ..request("bia")
                },
                &pool(),
            )
            .metadata
            .debug
            .expect("debug sample requested");
        assert_eq!(debug.top_priorities.len(), 3);
        assert_eq!(debug.first_items.len(), 3);
    }

    #[test]
    fn batch_preserves_request_order() {
        let engine = ReccoEngine::default();
        let requests: Vec<TrailRequest> = ["a", "b", "c", "d"].iter().map(|id| request(id)).collect();
        let outcomes = engine.generate_trails(&requests, &pool());
        let ids: Vec<&str> = outcomes.iter().map(|o| o.learner_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert!(outcomes.windows(2).all(|w| w[0].trail == w[1].trail));
    }
}
