use std::collections::HashMap;

use crate::recco::config::{ReinforcementParams, RemedialQuota};
use crate::recco::pool::{ContentPool, RelatedQuery};
use crate::recco::types::{
    AttemptStatus, CognitiveLevel, ContentKind, DiagnosedState, DropType, EmotionalLevel,
    Reinforcement, SessionResult, SrsAdjustment, SrsDirective, TopicWeakness, WeaknessLevel,
};

/// Topic label for attempts that carry none.
pub const GENERAL_TOPIC: &str = "geral";

#[derive(Debug, Default)]
struct TopicTally {
    topic: String,
    tags: Vec<String>,
    answered: u32,
    errors: u32,
    streak: u32,
    max_streak: u32,
    cards: Vec<String>,
}

impl TopicTally {
    fn error_rate(&self) -> f64 {
        if self.answered == 0 {
            0.0
        } else {
            self.errors as f64 / self.answered as f64
        }
    }

    fn motivo(&self) -> String {
        if self.max_streak >= 2 {
            format!("{} erros consecutivos em {}", self.max_streak, self.topic)
        } else {
            format!(
                "{} erros em {} (taxa de erro {:.0}%)",
                self.errors,
                self.topic,
                self.error_rate() * 100.0
            )
        }
    }
}

enum Formats {
    Any,
    Only(DropType),
    Except(DropType),
}

/// Pulls related content while keeping staged and attempted ids unique.
struct Stager<'a> {
    pool: &'a dyn ContentPool,
    excluded: Vec<String>,
}

impl Stager<'_> {
    fn stage(
        &mut self,
        kind: ContentKind,
        tally: &TopicTally,
        formats: &Formats,
        limit: usize,
    ) -> Vec<String> {
        if limit == 0 {
            return Vec::new();
        }
        let (drop_types, exclude_drop_types): (&[DropType], &[DropType]) = match formats {
            Formats::Any => (&[], &[]),
            Formats::Only(dt) => (std::slice::from_ref(dt), &[]),
            Formats::Except(dt) => (&[], std::slice::from_ref(dt)),
        };
        let topic = (tally.topic != GENERAL_TOPIC).then_some(tally.topic.as_str());

        let staged: Vec<String> = self
            .pool
            .related(&RelatedQuery {
                kind,
                topic,
                tags: &tally.tags,
                drop_types,
                exclude_drop_types,
                exclude_ids: &self.excluded,
                limit,
            })
            .into_iter()
            .map(|item| item.id)
            .collect();
        self.excluded.extend(staged.iter().cloned());
        staged
    }
}

/// Post-session remediation: stages related content per weak topic and
/// requests SRS interval changes without touching SRS state.
pub struct Reinforcer {
    params: ReinforcementParams,
}

impl Reinforcer {
    pub fn new(params: ReinforcementParams) -> Self {
        Self { params }
    }

    pub fn reinforce(
        &self,
        session: &SessionResult,
        state: &DiagnosedState,
        pool: &dyn ContentPool,
    ) -> Reinforcement {
        if session.error_count() == 0 {
            return Reinforcement::no_errors();
        }

        let mut tallies: Vec<(WeaknessLevel, TopicTally)> = tally_topics(session)
            .into_iter()
            .filter(|tally| tally.errors > 0)
            .map(|tally| (self.level(tally.max_streak, tally.error_rate()), tally))
            .collect();
        // worst topics claim remedial content first
        tallies.sort_by(|a, b| b.0.cmp(&a.0));

        let mut stager = Stager {
            pool,
            excluded: session.attempts.iter().map(|a| a.item_id.clone()).collect(),
        };
        let mut result = Reinforcement::default();
        let mut motivos = Vec::with_capacity(tallies.len());

        for (level, tally) in &tallies {
            let quota = self.quota(*level, state);
            let mnemonic = DropType::Mnemonico;

            result.drops_reforco.extend(stager.stage(
                ContentKind::Drop,
                tally,
                &Formats::Except(mnemonic),
                quota.drops,
            ));
            result.mnemonicos.extend(stager.stage(
                ContentKind::Drop,
                tally,
                &Formats::Only(mnemonic),
                quota.mnemonicos,
            ));
            result.questoes_fixacao.extend(stager.stage(
                ContentKind::Questao,
                tally,
                &Formats::Any,
                quota.questoes,
            ));

            let motivo = tally.motivo();
            for card in &tally.cards {
                let adjustment = self.adjustment(*level, &motivo);
                let keep_existing = result
                    .ajustes_srs
                    .get(card)
                    .is_some_and(|existing| existing.interval_factor <= adjustment.interval_factor);
                if !keep_existing {
                    result.ajustes_srs.insert(card.clone(), adjustment);
                }
            }

            result.fraquezas.push(TopicWeakness {
                topic: tally.topic.clone(),
                nivel: *level,
                erros: tally.errors,
                erros_consecutivos: tally.max_streak,
                taxa_erro: tally.error_rate(),
                recomendacoes: recommendations(*level, tally.error_rate(), state.prob_retencao),
            });
            motivos.push(motivo);
        }

        result.motivo = motivos.join("; ");

        tracing::debug!(
            session_id = session.session_id.as_deref().unwrap_or("-"),
            topics = result.fraquezas.len(),
            drops = result.drops_reforco.len(),
            mnemonicos = result.mnemonicos.len(),
            questoes = result.questoes_fixacao.len(),
            ajustes_srs = result.ajustes_srs.len(),
            "reinforcement staged"
        );

        result
    }

    pub fn level(&self, streak: u32, error_rate: f64) -> WeaknessLevel {
        let p = &self.params;
        if streak >= p.critical_streak || error_rate >= p.critical_error_rate {
            WeaknessLevel::Critico
        } else if streak >= p.high_streak || error_rate >= p.high_error_rate {
            WeaknessLevel::Alto
        } else if error_rate >= p.medium_error_rate {
            WeaknessLevel::Medio
        } else {
            WeaknessLevel::Baixo
        }
    }

    fn quota(&self, level: WeaknessLevel, state: &DiagnosedState) -> RemedialQuota {
        let mut quota = match level {
            WeaknessLevel::Critico => self.params.critical_quota.clone(),
            WeaknessLevel::Alto => self.params.high_quota.clone(),
            WeaknessLevel::Medio => self.params.medium_quota.clone(),
            WeaknessLevel::Baixo => self.params.low_quota.clone(),
        };
        // exhausted or frustrated learners get one fixation question at most
        if state.estado_cognitivo == CognitiveLevel::Saturado
            || state.estado_emocional == EmotionalLevel::Frustrado
        {
            quota.questoes = quota.questoes.min(1);
        }
        quota
    }

    fn adjustment(&self, level: WeaknessLevel, motivo: &str) -> SrsAdjustment {
        let p = &self.params;
        let (directive, interval_factor, ease_delta) = match level {
            WeaknessLevel::Critico => (
                SrsDirective::ResetToLearning,
                p.critical_interval_factor,
                p.critical_ease_delta,
            ),
            WeaknessLevel::Alto => (
                SrsDirective::ShortenInterval,
                p.high_interval_factor,
                p.high_ease_delta,
            ),
            WeaknessLevel::Medio | WeaknessLevel::Baixo => (
                SrsDirective::ShortenInterval,
                p.default_interval_factor,
                p.default_ease_delta,
            ),
        };
        SrsAdjustment {
            directive,
            interval_factor,
            ease_delta,
            motivo: motivo.to_string(),
        }
    }
}

impl Default for Reinforcer {
    fn default() -> Self {
        Self::new(ReinforcementParams::default())
    }
}

/// Per-topic counts in first-seen order. Skipped attempts neither count as
/// answers nor break an error streak.
fn tally_topics(session: &SessionResult) -> Vec<TopicTally> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut tallies: Vec<TopicTally> = Vec::new();

    for attempt in &session.attempts {
        let topic = attempt.topic.as_deref().unwrap_or(GENERAL_TOPIC);
        let slot = *index.entry(topic.to_string()).or_insert_with(|| {
            tallies.push(TopicTally {
                topic: topic.to_string(),
                ..Default::default()
            });
            tallies.len() - 1
        });
        let tally = &mut tallies[slot];

        match attempt.status {
            AttemptStatus::Skipped => {}
            AttemptStatus::Correct => {
                tally.answered += 1;
                tally.streak = 0;
            }
            AttemptStatus::Incorrect => {
                tally.answered += 1;
                tally.errors += 1;
                tally.streak += 1;
                tally.max_streak = tally.max_streak.max(tally.streak);
                for tag in &attempt.tags {
                    if !tally.tags.contains(tag) {
                        tally.tags.push(tag.clone());
                    }
                }
                // trail reviews carry their card id as the item id
                let card = attempt.card_id.as_ref().or(
                    (attempt.tipo == ContentKind::Revisao).then_some(&attempt.item_id),
                );
                if let Some(card) = card {
                    if !tally.cards.contains(card) {
                        tally.cards.push(card.clone());
                    }
                }
            }
        }
    }

    tallies
}

fn recommendations(level: WeaknessLevel, error_rate: f64, retention: f64) -> Vec<String> {
    let mut out = Vec::new();
    if matches!(level, WeaknessLevel::Critico | WeaknessLevel::Alto) {
        out.push("Revise a teoria deste tópico".to_string());
        out.push("Use mnemônicos para fixar conceitos".to_string());
        out.push("Resolva questões comentadas".to_string());
    }
    if 1.0 - error_rate < 0.4 {
        out.push("Foque em entender os fundamentos".to_string());
    }
    if retention < 0.5 {
        out.push("Aumente a frequência de revisão SRS".to_string());
        out.push("Reduza os intervalos de revisão".to_string());
    }
    if out.is_empty() {
        out.push("Continue praticando com questões".to_string());
    }
    out
}
