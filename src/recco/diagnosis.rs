use crate::recco::config::DiagnosisParams;
use crate::recco::invariants::{assert_diagnosis, clamp01};
use crate::recco::types::{
    CognitiveLevel, CognitiveState, ContentHint, DiagnosedState, EmotionalLevel, EmotionalState,
    PedagogicalLevel, PerformanceData, ReccoInputs,
};

/// Threshold-bucket classifier turning raw telemetry into a [`DiagnosedState`].
///
/// Each axis is classified on its own and the results are combined into the
/// probabilities, the study-time estimate and the content hint. Absent
/// telemetry falls back to the middle buckets.
pub struct Diagnoser {
    params: DiagnosisParams,
}

impl Diagnoser {
    pub fn new(params: DiagnosisParams) -> Self {
        Self { params }
    }

    pub fn diagnose(&self, inputs: &ReccoInputs) -> DiagnosedState {
        let cognitive = inputs.cognitive.as_ref();
        let emotional = inputs.emotional.as_ref();
        let performance = inputs.performance.as_ref();

        let estado_cognitivo = self.classify_cognitive(cognitive);
        let estado_emocional = classify_emotional(emotional);
        let estado_pedagogico = self.classify_pedagogical(performance);

        let prob_acerto = self.prob_acerto(performance);
        let prob_retencao = self.prob_retencao(cognitive, inputs.srs_overdue);
        let prob_saturacao = prob_saturacao(cognitive, estado_emocional);
        let tempo_otimo_estudo =
            self.optimal_study_minutes(estado_cognitivo, estado_emocional, estado_pedagogico);
        let conteudo_ideal = self.ideal_content(
            estado_cognitivo,
            estado_pedagogico,
            inputs.srs_overdue,
            inputs.tempo_ate_prova,
        );
        let recomendacao = recommendation(
            estado_cognitivo,
            estado_emocional,
            estado_pedagogico,
            prob_saturacao,
        );

        let state = DiagnosedState {
            estado_cognitivo,
            estado_emocional,
            estado_pedagogico,
            prob_acerto,
            prob_retencao,
            prob_saturacao,
            tempo_otimo_estudo,
            conteudo_ideal,
            recomendacao: recomendacao.to_string(),
        };
        assert_diagnosis(&state);

        tracing::debug!(
            cognitivo = state.estado_cognitivo.as_str(),
            emocional = state.estado_emocional.as_str(),
            pedagogico = state.estado_pedagogico.as_str(),
            tempo_otimo = state.tempo_otimo_estudo,
            "learner diagnosed"
        );

        state
    }

    /// Mean of the available `foco`/`energia` readings, falling back to `nec`.
    fn cognitive_level(cognitive: &CognitiveState) -> Option<f64> {
        let readings: Vec<f64> = [cognitive.foco, cognitive.energia]
            .into_iter()
            .flatten()
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(0.0, 100.0))
            .collect();
        if readings.is_empty() {
            cognitive
                .nec
                .filter(|v| v.is_finite())
                .map(|v| v.clamp(0.0, 100.0))
        } else {
            Some(readings.iter().sum::<f64>() / readings.len() as f64)
        }
    }

    fn classify_cognitive(&self, cognitive: Option<&CognitiveState>) -> CognitiveLevel {
        let Some(cognitive) = cognitive else {
            return CognitiveLevel::Medio;
        };

        if cognitive
            .nca
            .is_some_and(|nca| nca > self.params.saturation_nca_threshold)
        {
            return CognitiveLevel::Saturado;
        }

        match Self::cognitive_level(cognitive) {
            Some(level) if level >= self.params.high_bucket => CognitiveLevel::Alto,
            Some(level) if level >= self.params.medium_bucket => CognitiveLevel::Medio,
            Some(_) => CognitiveLevel::Baixo,
            None => CognitiveLevel::Medio,
        }
    }

    fn classify_pedagogical(&self, performance: Option<&PerformanceData>) -> PedagogicalLevel {
        let Some(performance) = performance else {
            return PedagogicalLevel::Medio;
        };

        if performance.sample_size() < self.params.min_sample_size {
            return PedagogicalLevel::Iniciante;
        }
        let Some(taxa) = performance.taxa_acerto() else {
            return PedagogicalLevel::Iniciante;
        };

        let perceived = performance.dificuldade_percebida.unwrap_or(3.0);
        if taxa >= self.params.advanced_accuracy && perceived <= self.params.advanced_max_difficulty
        {
            return PedagogicalLevel::Avancado;
        }

        let slow = performance.tempo_medio_questao.is_some_and(|t| {
            t > self.params.slow_answer_baseline_seconds * self.params.slow_answer_factor
        });
        if taxa < self.params.stuck_accuracy && slow {
            return PedagogicalLevel::Travado;
        }

        PedagogicalLevel::Medio
    }

    fn prob_acerto(&self, performance: Option<&PerformanceData>) -> f64 {
        let Some(performance) = performance else {
            return 0.5;
        };
        let prior = self.params.prior_strength.max(0.0);
        let n = performance.acertos as f64 + performance.erros as f64;
        if n + prior <= 0.0 {
            return 0.5;
        }
        clamp01((performance.acertos as f64 + prior * 0.5) / (n + prior))
    }

    fn prob_retencao(&self, cognitive: Option<&CognitiveState>, srs_overdue: u32) -> f64 {
        let quality = cognitive
            .and_then(Self::cognitive_level)
            .map(|level| level / 100.0)
            .unwrap_or(0.5);
        let cap = self.params.overdue_retention_cap.max(1) as f64;
        let backlog = (srs_overdue as f64 / cap).min(1.0);
        clamp01((0.4 + 0.5 * quality) * (1.0 - 0.6 * backlog))
    }

    fn optimal_study_minutes(
        &self,
        cognitive: CognitiveLevel,
        emotional: EmotionalLevel,
        pedagogical: PedagogicalLevel,
    ) -> u32 {
        let p = &self.params;
        let mut minutes = p.base_study_minutes;

        minutes *= match cognitive {
            CognitiveLevel::Saturado => p.saturated_factor,
            CognitiveLevel::Baixo => p.low_factor,
            CognitiveLevel::Alto => p.high_factor,
            CognitiveLevel::Medio => 1.0,
        };
        minutes *= match pedagogical {
            PedagogicalLevel::Travado => p.stuck_factor,
            PedagogicalLevel::Avancado => p.advanced_factor,
            _ => 1.0,
        };
        minutes *= match emotional {
            EmotionalLevel::Motivado => p.motivated_factor,
            EmotionalLevel::Ansioso => p.anxious_factor,
            _ => 1.0,
        };

        let minutes = if minutes.is_finite() { minutes.round() } else { p.base_study_minutes };
        (minutes.max(0.0) as u32).clamp(p.min_study_minutes, p.max_study_minutes)
    }

    fn ideal_content(
        &self,
        cognitive: CognitiveLevel,
        pedagogical: PedagogicalLevel,
        srs_overdue: u32,
        tempo_ate_prova: Option<u32>,
    ) -> ContentHint {
        if cognitive == CognitiveLevel::Saturado {
            return ContentHint::RevisaoLeve;
        }
        if pedagogical == PedagogicalLevel::Travado {
            return ContentHint::Fundamento;
        }
        if srs_overdue >= self.params.overdue_review_threshold {
            return ContentHint::Revisao;
        }
        if cognitive == CognitiveLevel::Baixo {
            return ContentHint::DropsCurtos;
        }
        match pedagogical {
            PedagogicalLevel::Avancado => {
                if cognitive == CognitiveLevel::Alto && tempo_ate_prova.is_some_and(|d| d <= 30) {
                    ContentHint::Simulado
                } else {
                    ContentHint::Questoes
                }
            }
            PedagogicalLevel::Iniciante => ContentHint::Fundamento,
            _ if cognitive == CognitiveLevel::Alto => ContentHint::DropsAvancados,
            _ => ContentHint::DropsMedios,
        }
    }
}

impl Default for Diagnoser {
    fn default() -> Self {
        Self::new(DiagnosisParams::default())
    }
}

/// Negative signals win: a learner who is both motivated and frustrated is
/// treated as frustrated.
fn classify_emotional(emotional: Option<&EmotionalState>) -> EmotionalLevel {
    let Some(emotional) = emotional else {
        return EmotionalLevel::Neutro;
    };
    if emotional.frustracao_inferida {
        EmotionalLevel::Frustrado
    } else if emotional.ansiedade_inferida {
        EmotionalLevel::Ansioso
    } else if emotional.motivacao_inferida || emotional.humor.is_some_and(|h| h >= 4.0) {
        EmotionalLevel::Motivado
    } else {
        EmotionalLevel::Neutro
    }
}

fn prob_saturacao(cognitive: Option<&CognitiveState>, emotional: EmotionalLevel) -> f64 {
    let load = cognitive
        .and_then(|c| c.nca)
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 100.0) / 100.0)
        .unwrap_or(0.5);
    let energy = cognitive
        .and_then(|c| c.energia)
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 100.0) / 100.0)
        .unwrap_or(0.5);
    let distress = if emotional.is_distressed() { 0.1 } else { 0.0 };
    clamp01(0.6 * load + 0.4 * (1.0 - energy) + distress)
}

fn recommendation(
    cognitive: CognitiveLevel,
    emotional: EmotionalLevel,
    pedagogical: PedagogicalLevel,
    prob_saturacao: f64,
) -> &'static str {
    if cognitive == CognitiveLevel::Saturado || prob_saturacao > 0.7 {
        return "Sinais de saturação: prefira uma pausa ou revisões leves.";
    }
    if emotional == EmotionalLevel::Ansioso && cognitive.is_depleted() {
        return "Ansiedade com pouca energia: comece por drops curtos e revisões.";
    }
    if emotional == EmotionalLevel::Frustrado {
        return "Comece com algo que você domina para recuperar a confiança.";
    }
    if cognitive == CognitiveLevel::Alto && emotional == EmotionalLevel::Motivado {
        return "Ótimo momento para enfrentar os tópicos mais difíceis.";
    }
    if pedagogical == PedagogicalLevel::Travado {
        return "Vamos reforçar os fundamentos dos pontos fracos hoje.";
    }
    "Tudo equilibrado: siga o ritmo normal de estudos."
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn cognitive(foco: f64, energia: f64, nca: Option<f64>) -> CognitiveState {
        CognitiveState {
            foco: Some(foco),
            energia: Some(energia),
            velocidade: Some(200.0),
            nec: None,
            nca,
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    fn emotional(frustrado: bool, ansioso: bool, motivado: bool, humor: f64) -> EmotionalState {
        EmotionalState {
            humor: Some(humor),
            frustracao_inferida: frustrado,
            ansiedade_inferida: ansioso,
            motivacao_inferida: motivado,
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn missing_telemetry_degrades_to_middle_buckets() {
        let state = Diagnoser::default().diagnose(&ReccoInputs::default());
        assert_eq!(state.estado_cognitivo, CognitiveLevel::Medio);
        assert_eq!(state.estado_emocional, EmotionalLevel::Neutro);
        assert_eq!(state.estado_pedagogico, PedagogicalLevel::Medio);
        assert_eq!(state.prob_acerto, 0.5);
        assert_eq!(state.tempo_otimo_estudo, 50);
    }

    #[test]
    fn cognitive_buckets() {
        let diagnoser = Diagnoser::default();
        let level = |foco, energia, nca| {
            diagnoser
                .diagnose(&ReccoInputs {
                    cognitive: Some(cognitive(foco, energia, nca)),
                    ..Default::default()
                })
                .estado_cognitivo
        };
        assert_eq!(level(80.0, 70.0, None), CognitiveLevel::Alto);
        assert_eq!(level(50.0, 40.0, Some(30.0)), CognitiveLevel::Medio);
        assert_eq!(level(30.0, 25.0, Some(30.0)), CognitiveLevel::Baixo);
        assert_eq!(level(90.0, 90.0, Some(85.0)), CognitiveLevel::Saturado);
    }

    #[test]
    fn nec_used_when_foco_and_energia_absent() {
        let mut c = cognitive(0.0, 0.0, None);
        c.foco = None;
        c.energia = None;
        c.nec = Some(75.0);
        let state = Diagnoser::default().diagnose(&ReccoInputs {
            cognitive: Some(c),
            ..Default::default()
        });
        assert_eq!(state.estado_cognitivo, CognitiveLevel::Alto);
    }

    #[test]
    fn negative_emotions_take_precedence() {
        assert_eq!(
            classify_emotional(Some(&emotional(true, true, true, 5.0))),
            EmotionalLevel::Frustrado
        );
        assert_eq!(
            classify_emotional(Some(&emotional(false, true, true, 5.0))),
            EmotionalLevel::Ansioso
        );
        assert_eq!(
            classify_emotional(Some(&emotional(false, false, false, 4.0))),
            EmotionalLevel::Motivado
        );
        assert_eq!(
            classify_emotional(Some(&emotional(false, false, false, 3.0))),
            EmotionalLevel::Neutro
        );
    }

    #[test]
    fn pedagogical_classification() {
        let diagnoser = Diagnoser::default();
        let classify = |acertos, erros, tempo, dificuldade| {
            diagnoser.classify_pedagogical(Some(&PerformanceData {
                acertos,
                erros,
                tempo_medio_questao: Some(tempo),
                dificuldade_percebida: Some(dificuldade),
            }))
        };
        assert_eq!(classify(18, 2, 40.0, 1.0), PedagogicalLevel::Avancado);
        assert_eq!(classify(3, 7, 200.0, 4.0), PedagogicalLevel::Travado);
        assert_eq!(classify(3, 7, 60.0, 4.0), PedagogicalLevel::Medio);
        assert_eq!(classify(2, 1, 40.0, 1.0), PedagogicalLevel::Iniciante);
    }

    #[test]
    fn prob_acerto_shrinks_small_samples_toward_half() {
        let diagnoser = Diagnoser::default();
        let small = diagnoser.prob_acerto(Some(&PerformanceData {
            acertos: 2,
            erros: 0,
            ..Default::default()
        }));
        let large = diagnoser.prob_acerto(Some(&PerformanceData {
            acertos: 200,
            erros: 0,
            ..Default::default()
        }));
        assert!(small < large);
        assert!((small - 4.0 / 6.0).abs() < 1e-9);
        assert!(large > 0.98);
    }

    #[test]
    fn retention_drops_with_overdue_backlog() {
        let diagnoser = Diagnoser::default();
        let c = cognitive(60.0, 60.0, None);
        let fresh = diagnoser.prob_retencao(Some(&c), 0);
        let backlog = diagnoser.prob_retencao(Some(&c), 30);
        assert!(backlog < fresh);

        let sharp = diagnoser.prob_retencao(Some(&cognitive(90.0, 90.0, None)), 0);
        assert!(sharp > fresh);
    }

    #[test]
    fn saturation_rises_with_load_and_falls_with_energy() {
        let calm = prob_saturacao(Some(&cognitive(50.0, 80.0, Some(20.0))), EmotionalLevel::Neutro);
        let loaded = prob_saturacao(Some(&cognitive(50.0, 80.0, Some(90.0))), EmotionalLevel::Neutro);
        let tired = prob_saturacao(Some(&cognitive(50.0, 10.0, Some(20.0))), EmotionalLevel::Neutro);
        assert!(loaded > calm);
        assert!(tired > calm);
    }

    #[test]
    fn study_time_is_clamped() {
        let diagnoser = Diagnoser::default();
        let advanced = diagnoser.optimal_study_minutes(
            CognitiveLevel::Alto,
            EmotionalLevel::Motivado,
            PedagogicalLevel::Avancado,
        );
        assert_eq!(advanced, 120);

        let exhausted = diagnoser.optimal_study_minutes(
            CognitiveLevel::Saturado,
            EmotionalLevel::Ansioso,
            PedagogicalLevel::Travado,
        );
        assert_eq!(exhausted, 10);
    }

    #[test]
    fn ideal_content_follows_dominant_deficiency() {
        let diagnoser = Diagnoser::default();
        assert_eq!(
            diagnoser.ideal_content(CognitiveLevel::Saturado, PedagogicalLevel::Travado, 50, None),
            ContentHint::RevisaoLeve
        );
        assert_eq!(
            diagnoser.ideal_content(CognitiveLevel::Medio, PedagogicalLevel::Travado, 50, None),
            ContentHint::Fundamento
        );
        assert_eq!(
            diagnoser.ideal_content(CognitiveLevel::Medio, PedagogicalLevel::Medio, 12, None),
            ContentHint::Revisao
        );
        assert_eq!(
            diagnoser.ideal_content(CognitiveLevel::Alto, PedagogicalLevel::Avancado, 0, Some(20)),
            ContentHint::Simulado
        );
    }
}
