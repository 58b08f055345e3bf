use crate::recco::config::{PrioritizationParams, StateGate};
use crate::recco::invariants::{assert_priority, clamp01};
use crate::recco::types::{
    CandidateAction, CognitiveLevel, ContentHint, ContentKind, DiagnosedState, DropType,
    PedagogicalLevel, Priority, ReccoInputs,
};

/// Ordered from worst to best so `max` picks the stronger match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FitMatch {
    Mismatch,
    Partial,
    Exact,
}

/// Ranks candidate actions by `urgency` and state `fit`.
///
/// `score = clamp01(w_u * urgency + w_f * min(fit * gate, 1))`, sorted
/// descending; ties keep the higher urgency first, then input order.
pub struct Prioritizer {
    params: PrioritizationParams,
}

impl Prioritizer {
    pub fn new(params: PrioritizationParams) -> Self {
        Self { params }
    }

    pub fn prioritize(
        &self,
        state: &DiagnosedState,
        inputs: &ReccoInputs,
        candidates: &[CandidateAction],
    ) -> Vec<Priority> {
        let mut priorities: Vec<Priority> = candidates
            .iter()
            .map(|candidate| self.score_candidate(state, inputs, candidate))
            .collect();

        // sort_by is stable, so equal (score, urgency) pairs keep input order
        priorities.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(b.urgency.total_cmp(&a.urgency))
        });

        tracing::debug!(
            candidates = candidates.len(),
            top = priorities.first().map(|p| p.action.as_str()).unwrap_or("-"),
            "candidates prioritized"
        );

        priorities
    }

    fn score_candidate(
        &self,
        state: &DiagnosedState,
        inputs: &ReccoInputs,
        candidate: &CandidateAction,
    ) -> Priority {
        let banca_match = banca_matches(candidate, inputs);
        let urgency = self.urgency(inputs, candidate, banca_match);
        let fit = self.fit(state, candidate, banca_match);
        let gate = self.gate(state.estado_cognitivo, candidate.tipo, candidate.drop_type);
        let score = self.combine(urgency, fit, gate);

        let priority = Priority {
            action: candidate.action.clone(),
            score,
            reason: self.reason(state, inputs, candidate, banca_match, gate),
            urgency,
            tipo: candidate.tipo,
            content_id: candidate.content_id.clone(),
            drop_type: candidate.drop_type,
        };
        assert_priority(&priority);
        priority
    }

    pub fn combine(&self, urgency: f64, fit: f64, gate: f64) -> f64 {
        let gated_fit = clamp01(fit * gate);
        clamp01(self.params.urgency_weight * clamp01(urgency) + self.params.fit_weight * gated_fit)
    }

    /// The strongest applicable pressure wins; components are not summed.
    pub fn urgency(&self, inputs: &ReccoInputs, candidate: &CandidateAction, banca_match: bool) -> f64 {
        let p = &self.params;
        let mut urgency: f64 = 0.0;

        if candidate.tipo == ContentKind::Revisao {
            let overdue = (inputs.srs_overdue as f64 / p.srs_overdue_cap as f64).min(1.0);
            let pending =
                (inputs.srs_pending as f64 / p.srs_pending_cap as f64).min(1.0) * p.pending_weight;
            urgency = urgency.max(overdue).max(pending);
        }

        if is_exam_aligned(candidate, banca_match) {
            if let Some(proximity) = exam_proximity(inputs.tempo_ate_prova) {
                urgency = urgency.max(proximity);
            }
        }

        if let Some(error_rate) = candidate.topic_error_rate {
            urgency = urgency.max(clamp01(error_rate));
        } else if candidate.topic_attempts == 0 && candidate.topic.is_some() {
            urgency = urgency.max(p.new_topic_urgency);
        }

        clamp01(urgency)
    }

    pub fn fit(&self, state: &DiagnosedState, candidate: &CandidateAction, banca_match: bool) -> f64 {
        let p = &self.params;
        let by_hint = hint_match(state.conteudo_ideal, candidate.tipo, candidate.drop_type);
        let by_level = level_match(state.estado_pedagogico, candidate.tipo, candidate.drop_type);

        // a pedagogical mismatch vetoes the hint, any other opinion can only raise it
        let combined = match by_level {
            Some(FitMatch::Mismatch) => FitMatch::Mismatch,
            Some(floor) => by_hint.max(floor),
            None => by_hint,
        };

        let base = match combined {
            FitMatch::Exact => p.fit_exact,
            FitMatch::Partial => p.fit_partial,
            FitMatch::Mismatch => p.fit_mismatch,
        };
        let bonus = if banca_match { p.banca_bonus } else { 0.0 };
        let difficulty = if suits_energy(state.estado_cognitivo, candidate.difficulty) {
            p.difficulty_bonus
        } else {
            0.0
        };
        clamp01(base + bonus + difficulty)
    }

    pub fn gate(&self, level: CognitiveLevel, kind: ContentKind, drop_type: Option<DropType>) -> f64 {
        let gate: &StateGate = match level {
            CognitiveLevel::Saturado => &self.params.saturated_gate,
            CognitiveLevel::Baixo => &self.params.low_gate,
            _ => return 1.0,
        };
        match kind {
            ContentKind::Simulado => gate.simulado,
            ContentKind::Questao => gate.questao,
            ContentKind::Bloco => gate.bloco,
            ContentKind::Revisao => gate.light,
            ContentKind::Drop if drop_type.is_some_and(|dt| dt.is_light()) => gate.light,
            ContentKind::Drop => gate.drop,
        }
    }

    fn reason(
        &self,
        state: &DiagnosedState,
        inputs: &ReccoInputs,
        candidate: &CandidateAction,
        banca_match: bool,
        gate: f64,
    ) -> String {
        let mut reasons: Vec<String> = Vec::new();

        if candidate.tipo == ContentKind::Revisao && inputs.srs_overdue > 0 {
            reasons.push(format!("revisão atrasada ({} cards)", inputs.srs_overdue));
        }
        if is_exam_aligned(candidate, banca_match) && inputs.tempo_ate_prova.is_some_and(|d| d <= 30)
        {
            reasons.push("prova próxima".to_string());
        }
        match candidate.topic_error_rate {
            Some(rate) if rate > self.params.high_error_rate => {
                reasons.push("alto índice de erros".to_string())
            }
            None if candidate.topic_attempts == 0 && candidate.topic.is_some() => {
                reasons.push("tópico novo".to_string())
            }
            _ => {}
        }
        if banca_match {
            if let Some(banca) = inputs.banca.as_deref() {
                reasons.push(format!("padrão da banca {banca}"));
            }
        }
        if gate > 1.0 {
            reasons.push(format!("leve para estado {}", state.estado_cognitivo.as_str()));
        } else if gate < 1.0 {
            reasons.push(format!("contido pelo estado {}", state.estado_cognitivo.as_str()));
        }

        if reasons.is_empty() {
            "reforço geral".to_string()
        } else {
            reasons.join(", ")
        }
    }
}

impl Default for Prioritizer {
    fn default() -> Self {
        Self::new(PrioritizationParams::default())
    }
}

/// Exam urgency buckets; `None` when no exam date is known.
pub fn exam_proximity(days: Option<u32>) -> Option<f64> {
    let days = days?;
    Some(match days {
        0..=7 => 1.0,
        8..=30 => 0.8,
        31..=60 => 0.6,
        61..=90 => 0.4,
        _ => 0.2,
    })
}

fn banca_matches(candidate: &CandidateAction, inputs: &ReccoInputs) -> bool {
    match (candidate.banca.as_deref(), inputs.banca.as_deref()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

/// Depleted learners lean toward easy topics, rested ones toward hard topics.
fn suits_energy(level: CognitiveLevel, difficulty: Option<u8>) -> bool {
    match (level, difficulty) {
        (CognitiveLevel::Baixo | CognitiveLevel::Saturado, Some(d)) => d <= 2,
        (CognitiveLevel::Alto, Some(d)) => d >= 4,
        _ => false,
    }
}

fn is_exam_aligned(candidate: &CandidateAction, banca_match: bool) -> bool {
    candidate.exam_aligned || banca_match || candidate.tipo == ContentKind::Simulado
}

fn hint_match(hint: ContentHint, kind: ContentKind, drop_type: Option<DropType>) -> FitMatch {
    use ContentKind::*;
    use FitMatch::*;

    let light_drop = kind == Drop && drop_type.is_some_and(|dt| dt.is_light());
    match hint {
        ContentHint::RevisaoLeve => match kind {
            Revisao => Exact,
            Drop if light_drop => Exact,
            Drop => Partial,
            _ => Mismatch,
        },
        ContentHint::Revisao => match kind {
            Revisao => Exact,
            Drop if light_drop => Partial,
            Questao => Partial,
            _ => Mismatch,
        },
        ContentHint::Fundamento => match (kind, drop_type) {
            (Drop, Some(DropType::Fundamento | DropType::Explicacao | DropType::Regra)) => Exact,
            (Drop, _) | (Bloco, _) => Partial,
            _ => Mismatch,
        },
        ContentHint::DropsCurtos => match kind {
            Drop if light_drop => Exact,
            Drop | Revisao => Partial,
            _ => Mismatch,
        },
        ContentHint::DropsMedios => match kind {
            Drop => Exact,
            Bloco | Questao | Revisao => Partial,
            Simulado => Mismatch,
        },
        ContentHint::DropsAvancados => match kind {
            Drop | Bloco => Exact,
            Questao | Simulado => Partial,
            Revisao => Mismatch,
        },
        ContentHint::Questoes => match kind {
            Questao => Exact,
            Bloco | Simulado => Partial,
            _ => Mismatch,
        },
        ContentHint::Simulado => match kind {
            Simulado => Exact,
            Questao | Bloco => Partial,
            _ => Mismatch,
        },
    }
}

/// The pedagogical level's opinion on a content kind; `None` defers to the hint.
fn level_match(
    level: PedagogicalLevel,
    kind: ContentKind,
    drop_type: Option<DropType>,
) -> Option<FitMatch> {
    match (level, kind) {
        (PedagogicalLevel::Travado | PedagogicalLevel::Iniciante, ContentKind::Simulado) => {
            Some(FitMatch::Mismatch)
        }
        (PedagogicalLevel::Travado, ContentKind::Drop)
            if drop_type == Some(DropType::Fundamento) =>
        {
            Some(FitMatch::Exact)
        }
        (PedagogicalLevel::Avancado, ContentKind::Bloco | ContentKind::Questao) => {
            Some(FitMatch::Exact)
        }
        (PedagogicalLevel::Avancado, ContentKind::Simulado) => Some(FitMatch::Partial),
        _ => None,
    }
}
