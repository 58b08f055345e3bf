#![allow(dead_code)]

use chrono::{DateTime, Utc};

use recco_engine::recco::types::{
    AttemptOutcome, AttemptStatus, CandidateAction, CognitiveState, ContentKind, DropType,
    EmotionalState, PerformanceData,
};
use recco_engine::recco::{InMemoryContentPool, PoolItem};

pub fn fixed_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
}

pub fn cognitive(foco: f64, energia: f64, nca: Option<f64>) -> CognitiveState {
    CognitiveState {
        foco: Some(foco),
        energia: Some(energia),
        velocidade: None,
        nec: None,
        nca,
        timestamp: fixed_time(),
    }
}

pub fn emotional(motivated: bool, anxious: bool, frustrated: bool) -> EmotionalState {
    EmotionalState {
        humor: None,
        frustracao_inferida: frustrated,
        ansiedade_inferida: anxious,
        motivacao_inferida: motivated,
        timestamp: fixed_time(),
    }
}

pub fn performance(acertos: u32, erros: u32, dificuldade: f64) -> PerformanceData {
    PerformanceData {
        acertos,
        erros,
        tempo_medio_questao: Some(60.0),
        dificuldade_percebida: Some(dificuldade),
    }
}

/// A small catalogue covering every content kind and a few topics.
pub fn sample_pool() -> InMemoryContentPool {
    let mut items = vec![
        PoolItem::new("drop-crase-regra", ContentKind::Drop)
            .topic("crase")
            .drop_type(DropType::Regra)
            .minutes(6)
            .difficulty(2),
        PoolItem::new("drop-crase-flash", ContentKind::Drop)
            .topic("crase")
            .drop_type(DropType::Flashcard)
            .minutes(3)
            .difficulty(1),
        PoolItem::new("drop-crase-mnemo", ContentKind::Drop)
            .topic("crase")
            .drop_type(DropType::Mnemonico)
            .minutes(2)
            .difficulty(1),
        PoolItem::new("drop-regencia-exp", ContentKind::Drop)
            .topic("regencia")
            .tags(["verbos"])
            .drop_type(DropType::Explicacao)
            .minutes(8)
            .difficulty(3),
        PoolItem::new("bloco-crase", ContentKind::Bloco)
            .topic("crase")
            .minutes(15)
            .difficulty(3),
        PoolItem::new("bloco-regencia", ContentKind::Bloco)
            .topic("regencia")
            .minutes(15)
            .difficulty(4),
        PoolItem::new("questao-crase-1", ContentKind::Questao)
            .topic("crase")
            .difficulty(2),
        PoolItem::new("questao-crase-2", ContentKind::Questao)
            .topic("crase")
            .difficulty(3),
        PoolItem::new("questao-crase-3", ContentKind::Questao)
            .topic("crase")
            .difficulty(4),
        PoolItem::new("questao-regencia-1", ContentKind::Questao)
            .topic("regencia")
            .difficulty(3),
        PoolItem::new("simulado-cespe", ContentKind::Simulado)
            .minutes(40)
            .difficulty(5),
    ];
    items.extend((1..=12).map(|i| {
        PoolItem::new(format!("card-{i}"), ContentKind::Revisao)
            .minutes(2)
            .difficulty(1)
    }));
    InMemoryContentPool::new(items)
}

pub fn sample_candidates() -> Vec<CandidateAction> {
    vec![
        CandidateAction::new("revisar cards vencidos", ContentKind::Revisao),
        CandidateAction::new("flashcards de crase", ContentKind::Drop)
            .with_content_id("drop-crase-flash")
            .with_drop_type(DropType::Flashcard)
            .with_topic("crase"),
        CandidateAction::new("regra de crase", ContentKind::Drop)
            .with_content_id("drop-crase-regra")
            .with_topic("crase"),
        CandidateAction::new("bloco de regência", ContentKind::Bloco)
            .with_content_id("bloco-regencia")
            .with_topic("regencia"),
        CandidateAction::new("questões de crase", ContentKind::Questao).with_topic("crase"),
        CandidateAction {
            exam_aligned: true,
            banca: Some("CESPE".to_string()),
            ..CandidateAction::new("simulado cespe", ContentKind::Simulado)
                .with_content_id("simulado-cespe")
        },
    ]
}

pub fn attempt(item_id: &str, topic: &str, status: AttemptStatus) -> AttemptOutcome {
    AttemptOutcome {
        item_id: item_id.to_string(),
        tipo: ContentKind::Questao,
        topic: Some(topic.to_string()),
        tags: Vec::new(),
        card_id: Some(format!("srs-{item_id}")),
        status,
        time_seconds: Some(75.0),
    }
}
