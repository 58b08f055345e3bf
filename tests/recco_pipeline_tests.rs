mod common;

use recco_engine::recco::diagnosis::Diagnoser;
use recco_engine::recco::prioritization::Prioritizer;
use recco_engine::recco::selection::Selector;
use recco_engine::recco::sequencing::Sequencer;
use recco_engine::recco::types::{
    AttemptStatus, CognitiveLevel, ContentKind, DifficultyStrategy, PedagogicalLevel,
    ReccoInputs, Reinforcement, SelectedContent, SessionResult,
};
use recco_engine::recco::{ReccoEngine, TrailRequest};

use common::{attempt, cognitive, performance, sample_candidates, sample_pool};

fn request(learner_id: &str, inputs: ReccoInputs) -> TrailRequest {
    TrailRequest {
        learner_id: learner_id.to_string(),
        inputs,
        candidates: sample_candidates(),
        budget_minutes: None,
        debug: false,
    }
}

fn sorted_keys(mut keys: Vec<(ContentKind, String)>) -> Vec<(ContentKind, String)> {
    keys.sort();
    keys
}

#[test]
fn tired_learner_with_review_backlog_starts_light() {
    let engine = ReccoEngine::default();
    let inputs = ReccoInputs {
        cognitive: Some(cognitive(30.0, 25.0, None)),
        srs_overdue: 10,
        tempo_ate_prova: Some(60),
        ..Default::default()
    };
    let outcome = engine.generate_trail(&request("cansado", inputs), &sample_pool());

    assert_eq!(outcome.diagnosis.estado_cognitivo, CognitiveLevel::Baixo);
    assert_eq!(outcome.trail.estrategia, DifficultyStrategy::Progressiva);
    let first = &outcome.trail.items[0];
    assert_ne!(first.kind, ContentKind::Simulado);
    assert!(
        first.kind == ContentKind::Revisao
            || (first.kind == ContentKind::Drop && first.estimated_minutes <= 5),
        "unexpected opener {first:?}"
    );
    assert!(outcome.selected.review_minutes() >= Selector::default().review_reserve(35, 10));
}

#[test]
fn saturated_learner_starts_light_and_skips_simulado_opener() {
    let engine = ReccoEngine::default();
    let inputs = ReccoInputs {
        cognitive: Some(cognitive(30.0, 25.0, Some(90.0))),
        srs_overdue: 10,
        tempo_ate_prova: Some(60),
        ..Default::default()
    };
    let outcome = engine.generate_trail(&request("saturado", inputs), &sample_pool());

    assert_eq!(outcome.diagnosis.estado_cognitivo, CognitiveLevel::Saturado);
    let first = &outcome.trail.items[0];
    assert!(matches!(first.kind, ContentKind::Revisao | ContentKind::Drop));
    assert!(outcome.selected.simulados.is_empty());
}

#[test]
fn advanced_learner_gets_long_session_favoring_practice() {
    let inputs = ReccoInputs {
        performance: Some(performance(18, 2, 1.0)),
        srs_overdue: 0,
        ..Default::default()
    };
    let state = Diagnoser::default().diagnose(&inputs);
    assert_eq!(state.estado_pedagogico, PedagogicalLevel::Avancado);
    assert!(state.tempo_otimo_estudo >= 110);

    let priorities = Prioritizer::default().prioritize(&state, &inputs, &sample_candidates());
    let first_practice = priorities
        .iter()
        .position(|p| matches!(p.tipo, ContentKind::Bloco | ContentKind::Questao))
        .expect("practice candidate present");
    let first_review = priorities
        .iter()
        .position(|p| p.tipo == ContentKind::Revisao)
        .expect("review candidate present");
    assert!(first_practice < first_review);

    let selected = Selector::default().select(
        &priorities,
        &sample_pool(),
        state.tempo_otimo_estudo,
        inputs.srs_overdue,
    );
    let practice_minutes: u32 = selected
        .blocos
        .iter()
        .chain(&selected.questoes)
        .map(|item| item.estimated_minutes)
        .sum();
    assert!(practice_minutes > selected.review_minutes());
}

#[test]
fn empty_candidates_flow_through_as_empty_results() {
    let inputs = ReccoInputs::default();
    let state = Diagnoser::default().diagnose(&inputs);

    let priorities = Prioritizer::default().prioritize(&state, &inputs, &[]);
    assert!(priorities.is_empty());

    let selected = Selector::default().select(&priorities, &sample_pool(), 60, 0);
    assert_eq!(selected, SelectedContent::default());

    let trail = Sequencer::default().sequence(&selected, &state);
    assert!(trail.items.is_empty());
    assert_eq!(trail.total_time_minutes, 0);
}

#[test]
fn consecutive_errors_trigger_topic_reinforcement() {
    let engine = ReccoEngine::default();
    let state = engine.diagnose(&ReccoInputs::default());
    let session = SessionResult {
        session_id: Some("sessao-1".to_string()),
        attempts: vec![
            attempt("q-a", "crase", AttemptStatus::Incorrect),
            attempt("q-b", "crase", AttemptStatus::Incorrect),
            attempt("q-c", "crase", AttemptStatus::Incorrect),
        ],
        time_spent_minutes: 12.0,
    };

    let reinforcement = engine.reinforce(&session, &state, &sample_pool());
    assert!(!reinforcement.drops_reforco.is_empty());
    assert!(!reinforcement.questoes_fixacao.is_empty());
    assert!(reinforcement.motivo.contains("crase"));
    assert!(reinforcement.motivo.contains("3 erros consecutivos"));
    assert_eq!(reinforcement.ajustes_srs.len(), 3);
    assert!(!reinforcement
        .drops_reforco
        .contains(&"drop-crase-mnemo".to_string()));
}

#[test]
fn error_free_session_yields_no_reinforcement() {
    let engine = ReccoEngine::default();
    let state = engine.diagnose(&ReccoInputs::default());
    let session = SessionResult {
        attempts: vec![
            attempt("q-a", "crase", AttemptStatus::Correct),
            attempt("q-b", "crase", AttemptStatus::Skipped),
        ],
        ..Default::default()
    };

    let reinforcement = engine.reinforce(&session, &state, &sample_pool());
    assert_eq!(reinforcement.motivo, Reinforcement::NO_ERRORS);
    assert!(reinforcement.drops_reforco.is_empty());
    assert!(reinforcement.mnemonicos.is_empty());
    assert!(reinforcement.questoes_fixacao.is_empty());
    assert!(reinforcement.ajustes_srs.is_empty());
}

#[test]
fn trail_conserves_selected_content_and_budget() {
    let engine = ReccoEngine::default();
    for budget in [0, 5, 20, 45, 90, 180] {
        let outcome = engine.generate_trail(
            &TrailRequest {
                budget_minutes: Some(budget),
                ..request(
                    "orcamento",
                    ReccoInputs {
                        srs_overdue: 6,
                        srs_pending: 20,
                        ..Default::default()
                    },
                )
            },
            &sample_pool(),
        );
        assert!(outcome.trail.total_time_minutes <= budget);
        assert_eq!(outcome.trail.total_time_minutes, outcome.selected.total_minutes());
        assert_eq!(
            sorted_keys(outcome.trail.keys()),
            sorted_keys(outcome.selected.keys())
        );
    }
}

#[test]
fn repeated_runs_serialize_identically() {
    let engine = ReccoEngine::default();
    let inputs = ReccoInputs {
        cognitive: Some(cognitive(55.0, 60.0, Some(20.0))),
        performance: Some(performance(7, 5, 3.0)),
        srs_overdue: 4,
        srs_pending: 9,
        tempo_ate_prova: Some(20),
        banca: Some("CESPE".to_string()),
        ..Default::default()
    };
    let req = request("determinismo", inputs);
    let pool = sample_pool();

    let first = serde_json::to_string(&engine.generate_trail(&req, &pool).trail).unwrap();
    for _ in 0..5 {
        let again = serde_json::to_string(&engine.generate_trail(&req, &pool).trail).unwrap();
        assert_eq!(first, again);
    }
}

#[test]
fn batch_generation_matches_single_runs() {
    let engine = ReccoEngine::default();
    let pool = sample_pool();
    let requests: Vec<TrailRequest> = (0..16)
        .map(|i| {
            request(
                &format!("aluno-{i}"),
                ReccoInputs {
                    cognitive: Some(cognitive(10.0 + i as f64 * 5.0, 80.0 - i as f64 * 4.0, None)),
                    srs_overdue: i,
                    ..Default::default()
                },
            )
        })
        .collect();

    let batch = engine.generate_trails(&requests, &pool);
    assert_eq!(batch.len(), requests.len());
    for (request, outcome) in requests.iter().zip(&batch) {
        assert_eq!(outcome.learner_id, request.learner_id);
        assert_eq!(outcome.trail, engine.generate_trail(request, &pool).trail);
    }
}
