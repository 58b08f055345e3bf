use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Drop,
    Questao,
    Revisao,
    Simulado,
    Bloco,
}

impl ContentKind {
    pub const ALL: [ContentKind; 5] = [
        Self::Drop,
        Self::Questao,
        Self::Revisao,
        Self::Simulado,
        Self::Bloco,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Questao => "questao",
            Self::Revisao => "revisao",
            Self::Simulado => "simulado",
            Self::Bloco => "bloco",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropType {
    Explicacao,
    Regra,
    Flashcard,
    MiniQuestao,
    Mnemonico,
    Fundamento,
}

impl DropType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Explicacao => "explicacao",
            Self::Regra => "regra",
            Self::Flashcard => "flashcard",
            Self::MiniQuestao => "mini_questao",
            Self::Mnemonico => "mnemonico",
            Self::Fundamento => "fundamento",
        }
    }

    /// Low-effort drop formats, usable as warm-up or remedial material.
    pub fn is_light(&self) -> bool {
        matches!(self, Self::Flashcard | Self::Mnemonico)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum CognitiveLevel {
    Alto,
    #[default]
    Medio,
    Baixo,
    Saturado,
}

impl CognitiveLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alto => "alto",
            Self::Medio => "medio",
            Self::Baixo => "baixo",
            Self::Saturado => "saturado",
        }
    }

    pub fn is_depleted(&self) -> bool {
        matches!(self, Self::Baixo | Self::Saturado)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum EmotionalLevel {
    Motivado,
    Ansioso,
    Frustrado,
    #[default]
    Neutro,
}

impl EmotionalLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Motivado => "motivado",
            Self::Ansioso => "ansioso",
            Self::Frustrado => "frustrado",
            Self::Neutro => "neutro",
        }
    }

    pub fn is_distressed(&self) -> bool {
        matches!(self, Self::Ansioso | Self::Frustrado)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum PedagogicalLevel {
    Avancado,
    #[default]
    Medio,
    Iniciante,
    Travado,
}

impl PedagogicalLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Avancado => "avancado",
            Self::Medio => "medio",
            Self::Iniciante => "iniciante",
            Self::Travado => "travado",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum ContentHint {
    Fundamento,
    Revisao,
    RevisaoLeve,
    DropsCurtos,
    #[default]
    DropsMedios,
    DropsAvancados,
    Questoes,
    Simulado,
}

impl ContentHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fundamento => "fundamento",
            Self::Revisao => "revisao",
            Self::RevisaoLeve => "revisao_leve",
            Self::DropsCurtos => "drops_curtos",
            Self::DropsMedios => "drops_medios",
            Self::DropsAvancados => "drops_avancados",
            Self::Questoes => "questoes",
            Self::Simulado => "simulado",
        }
    }
}

// ---------------------------------------------------------------------------
// Telemetry inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CognitiveState {
    #[serde(default)]
    pub foco: Option<f64>,
    #[serde(default)]
    pub energia: Option<f64>,
    #[serde(default)]
    pub velocidade: Option<f64>,
    #[serde(default)]
    pub nec: Option<f64>,
    #[serde(default)]
    pub nca: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionalState {
    #[serde(default)]
    pub humor: Option<f64>,
    #[serde(default)]
    pub frustracao_inferida: bool,
    #[serde(default)]
    pub ansiedade_inferida: bool,
    #[serde(default)]
    pub motivacao_inferida: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceData {
    pub acertos: u32,
    pub erros: u32,
    #[serde(default)]
    pub tempo_medio_questao: Option<f64>,
    #[serde(default)]
    pub dificuldade_percebida: Option<f64>,
}

impl PerformanceData {
    pub fn sample_size(&self) -> u32 {
        self.acertos.saturating_add(self.erros)
    }

    pub fn taxa_acerto(&self) -> Option<f64> {
        if self.sample_size() == 0 {
            None
        } else {
            Some(self.acertos as f64 / (self.acertos as f64 + self.erros as f64))
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReccoInputs {
    #[serde(default)]
    pub cognitive: Option<CognitiveState>,
    #[serde(default)]
    pub emotional: Option<EmotionalState>,
    #[serde(default)]
    pub performance: Option<PerformanceData>,
    #[serde(default)]
    pub srs_pending: u32,
    #[serde(default)]
    pub srs_overdue: u32,
    /// Days until the exam; `None` when no exam is scheduled.
    #[serde(default)]
    pub tempo_ate_prova: Option<u32>,
    #[serde(default)]
    pub banca: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosedState {
    pub estado_cognitivo: CognitiveLevel,
    pub estado_emocional: EmotionalLevel,
    pub estado_pedagogico: PedagogicalLevel,
    pub prob_acerto: f64,
    pub prob_retencao: f64,
    pub prob_saturacao: f64,
    pub tempo_otimo_estudo: u32,
    pub conteudo_ideal: ContentHint,
    pub recomendacao: String,
}

// ---------------------------------------------------------------------------
// Ranking and selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateAction {
    pub action: String,
    pub tipo: ContentKind,
    #[serde(default)]
    pub content_id: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub drop_type: Option<DropType>,
    #[serde(default)]
    pub banca: Option<String>,
    #[serde(default)]
    pub exam_aligned: bool,
    #[serde(default)]
    pub topic_attempts: u32,
    #[serde(default)]
    pub topic_error_rate: Option<f64>,
    /// Topic difficulty on the 1–5 content scale.
    #[serde(default)]
    pub difficulty: Option<u8>,
}

impl CandidateAction {
    pub fn new(action: impl Into<String>, tipo: ContentKind) -> Self {
        Self {
            action: action.into(),
            tipo,
            content_id: None,
            topic: None,
            drop_type: None,
            banca: None,
            exam_aligned: false,
            topic_attempts: 0,
            topic_error_rate: None,
            difficulty: None,
        }
    }

    pub fn with_content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_drop_type(mut self, drop_type: DropType) -> Self {
        self.drop_type = Some(drop_type);
        self
    }

    pub fn with_difficulty(mut self, difficulty: u8) -> Self {
        self.difficulty = Some(difficulty);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Priority {
    pub action: String,
    pub score: f64,
    pub reason: String,
    pub urgency: f64,
    pub tipo: ContentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_type: Option<DropType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedItem {
    pub id: String,
    pub score: f64,
    pub reason: String,
    pub estimated_minutes: u32,
    pub difficulty: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_type: Option<DropType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedReview {
    pub card_id: String,
    pub score: f64,
    pub reason: String,
    pub estimated_minutes: u32,
    pub difficulty: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectedContent {
    pub drops: Vec<SelectedItem>,
    pub blocos: Vec<SelectedItem>,
    pub questoes: Vec<SelectedItem>,
    pub revisoes_srs: Vec<SelectedReview>,
    pub simulados: Vec<SelectedItem>,
}

impl SelectedContent {
    pub fn len(&self) -> usize {
        self.drops.len()
            + self.blocos.len()
            + self.questoes.len()
            + self.revisoes_srs.len()
            + self.simulados.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_minutes(&self) -> u32 {
        let items: u32 = self
            .drops
            .iter()
            .chain(&self.blocos)
            .chain(&self.questoes)
            .chain(&self.simulados)
            .map(|item| item.estimated_minutes)
            .sum();
        let reviews: u32 = self.revisoes_srs.iter().map(|r| r.estimated_minutes).sum();
        items + reviews
    }

    pub fn review_minutes(&self) -> u32 {
        self.revisoes_srs.iter().map(|r| r.estimated_minutes).sum()
    }

    /// `(kind, id)` pairs in list order, used for conservation checks.
    pub fn keys(&self) -> Vec<(ContentKind, String)> {
        let mut keys = Vec::with_capacity(self.len());
        keys.extend(
            self.revisoes_srs
                .iter()
                .map(|r| (ContentKind::Revisao, r.card_id.clone())),
        );
        keys.extend(self.drops.iter().map(|i| (ContentKind::Drop, i.id.clone())));
        keys.extend(self.blocos.iter().map(|i| (ContentKind::Bloco, i.id.clone())));
        keys.extend(
            self.questoes
                .iter()
                .map(|i| (ContentKind::Questao, i.id.clone())),
        );
        keys.extend(
            self.simulados
                .iter()
                .map(|i| (ContentKind::Simulado, i.id.clone())),
        );
        keys
    }
}

// ---------------------------------------------------------------------------
// Sequencing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum CurveShape {
    Crescente,
    Decrescente,
    #[default]
    Estavel,
    Pico,
    Ondulada,
}

impl CurveShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crescente => "crescente",
            Self::Decrescente => "decrescente",
            Self::Estavel => "estavel",
            Self::Pico => "pico",
            Self::Ondulada => "ondulada",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum DifficultyStrategy {
    Progressiva,
    Inversa,
    Pico,
    #[default]
    Adaptativa,
}

impl DifficultyStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Progressiva => "progressiva",
            Self::Inversa => "inversa",
            Self::Pico => "pico",
            Self::Adaptativa => "adaptativa",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailItem {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub id: String,
    pub order: u32,
    pub reason: String,
    pub estimated_minutes: u32,
    pub difficulty: u8,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequencedTrail {
    pub items: Vec<TrailItem>,
    pub total_time_minutes: u32,
    pub curva_dificuldade: CurveShape,
    pub curva_cognitiva: CurveShape,
    pub curva_emocional: CurveShape,
    pub estrategia: DifficultyStrategy,
    pub pausas_sugeridas: Vec<u32>,
}

impl SequencedTrail {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn keys(&self) -> Vec<(ContentKind, String)> {
        self.items
            .iter()
            .map(|item| (item.kind, item.id.clone()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Session feedback
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptStatus {
    Correct,
    Incorrect,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptOutcome {
    pub item_id: String,
    pub tipo: ContentKind,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub card_id: Option<String>,
    pub status: AttemptStatus,
    #[serde(default)]
    pub time_seconds: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionResult {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub attempts: Vec<AttemptOutcome>,
    #[serde(default)]
    pub time_spent_minutes: f64,
}

impl SessionResult {
    pub fn error_count(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| a.status == AttemptStatus::Incorrect)
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaknessLevel {
    Baixo,
    Medio,
    Alto,
    Critico,
}

impl WeaknessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baixo => "baixo",
            Self::Medio => "medio",
            Self::Alto => "alto",
            Self::Critico => "critico",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SrsDirective {
    ShortenInterval,
    ResetToLearning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SrsAdjustment {
    pub directive: SrsDirective,
    pub interval_factor: f64,
    pub ease_delta: f64,
    pub motivo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicWeakness {
    pub topic: String,
    pub nivel: WeaknessLevel,
    pub erros: u32,
    pub erros_consecutivos: u32,
    pub taxa_erro: f64,
    pub recomendacoes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reinforcement {
    pub drops_reforco: Vec<String>,
    pub mnemonicos: Vec<String>,
    pub questoes_fixacao: Vec<String>,
    pub ajustes_srs: BTreeMap<String, SrsAdjustment>,
    pub motivo: String,
    #[serde(default)]
    pub fraquezas: Vec<TopicWeakness>,
}

impl Reinforcement {
    pub const NO_ERRORS: &'static str = "no_errors";

    pub fn no_errors() -> Self {
        Self {
            motivo: Self::NO_ERRORS.to_string(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.drops_reforco.is_empty()
            && self.mnemonicos.is_empty()
            && self.questoes_fixacao.is_empty()
            && self.ajustes_srs.is_empty()
    }
}
