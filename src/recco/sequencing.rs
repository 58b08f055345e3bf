use std::cmp::Ordering;

use crate::recco::config::SequencingParams;
use crate::recco::invariants::assert_trail_consistent;
use crate::recco::types::{
    CognitiveLevel, ContentKind, CurveShape, DiagnosedState, DifficultyStrategy, EmotionalLevel,
    SelectedContent, SequencedTrail, TrailItem,
};

/// Sustained effort an item demands, lightest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Effort {
    Light,
    Moderate,
    Demanding,
    Intense,
}

impl Effort {
    fn rank(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone)]
struct Entry {
    kind: ContentKind,
    id: String,
    reason: String,
    minutes: u32,
    difficulty: u8,
    score: f64,
    effort: Effort,
}

/// Orders selected content into a paced trail.
pub struct Sequencer {
    params: SequencingParams,
}

impl Sequencer {
    pub fn new(params: SequencingParams) -> Self {
        Self { params }
    }

    pub fn sequence(&self, selected: &SelectedContent, state: &DiagnosedState) -> SequencedTrail {
        let strategy = self.strategy(state);
        let entries = self.collect(selected);
        let selected_minutes: u32 = entries.iter().map(|e| e.minutes).sum();
        let warmup_target = selected_minutes as f64 * self.params.warmup_fraction;

        let mut ordered = match strategy {
            DifficultyStrategy::Progressiva => sorted(entries, by_effort_then_score),
            DifficultyStrategy::Inversa => sorted(entries, |a, b| {
                b.effort.cmp(&a.effort).then(b.score.total_cmp(&a.score))
            }),
            DifficultyStrategy::Pico => {
                let (mut head, rest) = warm_up(entries, warmup_target);
                head.extend(sorted(rest, |a, b| {
                    b.effort.cmp(&a.effort).then(b.score.total_cmp(&a.score))
                }));
                head
            }
            DifficultyStrategy::Adaptativa => {
                let (mut head, rest) = warm_up(entries, warmup_target);
                head.extend(sorted(rest, |a, b| b.score.total_cmp(&a.score)));
                head
            }
        };

        if state.estado_emocional.is_distressed() {
            guard_opener(&mut ordered);
        }

        let difficulty: Vec<u8> = ordered.iter().map(|e| e.difficulty).collect();
        let effort: Vec<u8> = ordered.iter().map(|e| e.effort.rank()).collect();
        let pressure: Vec<u8> = ordered.iter().map(|e| emotional_pressure(e.kind)).collect();

        let items: Vec<TrailItem> = ordered
            .into_iter()
            .enumerate()
            .map(|(index, entry)| TrailItem {
                kind: entry.kind,
                id: entry.id,
                order: index as u32 + 1,
                reason: entry.reason,
                estimated_minutes: entry.minutes,
                difficulty: entry.difficulty,
                score: entry.score,
            })
            .collect();

        let trail = SequencedTrail {
            total_time_minutes: items.iter().map(|item| item.estimated_minutes).sum(),
            pausas_sugeridas: self.breaks(&items, state.estado_cognitivo),
            curva_dificuldade: curve_shape(&difficulty),
            curva_cognitiva: curve_shape(&effort),
            curva_emocional: curve_shape(&pressure),
            estrategia: strategy,
            items,
        };
        assert_trail_consistent(&trail);
        debug_assert_eq!(trail.total_time_minutes, selected_minutes);

        tracing::debug!(
            items = trail.items.len(),
            total_minutes = trail.total_time_minutes,
            estrategia = strategy.as_str(),
            "trail sequenced"
        );

        trail
    }

    pub fn strategy(&self, state: &DiagnosedState) -> DifficultyStrategy {
        if state.estado_cognitivo.is_depleted()
            || state.prob_saturacao > self.params.saturation_strategy_threshold
        {
            return DifficultyStrategy::Progressiva;
        }
        match (state.estado_cognitivo, state.estado_emocional) {
            (CognitiveLevel::Alto, EmotionalLevel::Motivado) => DifficultyStrategy::Inversa,
            (CognitiveLevel::Medio, _) => DifficultyStrategy::Pico,
            _ => DifficultyStrategy::Adaptativa,
        }
    }

    /// Only short drops count as light, whatever their format.
    pub fn effort(&self, kind: ContentKind, minutes: u32) -> Effort {
        match kind {
            ContentKind::Revisao => Effort::Light,
            ContentKind::Drop if minutes <= self.params.short_drop_minutes => Effort::Light,
            ContentKind::Drop => Effort::Moderate,
            ContentKind::Questao | ContentKind::Bloco => Effort::Demanding,
            ContentKind::Simulado => Effort::Intense,
        }
    }

    fn collect(&self, selected: &SelectedContent) -> Vec<Entry> {
        let mut entries = Vec::with_capacity(selected.len());
        entries.extend(selected.revisoes_srs.iter().map(|review| Entry {
            kind: ContentKind::Revisao,
            id: review.card_id.clone(),
            reason: review.reason.clone(),
            minutes: review.estimated_minutes,
            difficulty: review.difficulty,
            score: review.score,
            effort: Effort::Light,
        }));
        for (kind, list) in [
            (ContentKind::Drop, &selected.drops),
            (ContentKind::Bloco, &selected.blocos),
            (ContentKind::Questao, &selected.questoes),
            (ContentKind::Simulado, &selected.simulados),
        ] {
            entries.extend(list.iter().map(|item| Entry {
                kind,
                id: item.id.clone(),
                reason: item.reason.clone(),
                minutes: item.estimated_minutes,
                difficulty: item.difficulty,
                score: item.score,
                effort: self.effort(kind, item.estimated_minutes),
            }));
        }
        entries
    }

    /// Trail orders after which a pause is suggested; never after the last item.
    fn breaks(&self, items: &[TrailItem], level: CognitiveLevel) -> Vec<u32> {
        let interval = match level {
            CognitiveLevel::Baixo | CognitiveLevel::Saturado => self.params.depleted_break_minutes,
            CognitiveLevel::Alto => self.params.high_break_minutes,
            CognitiveLevel::Medio => self.params.medium_break_minutes,
        };
        if interval == 0 {
            return Vec::new();
        }

        let mut pauses = Vec::new();
        let mut since_break = 0;
        for item in items.iter().take(items.len().saturating_sub(1)) {
            since_break += item.estimated_minutes;
            if since_break >= interval {
                pauses.push(item.order);
                since_break = 0;
            }
        }
        pauses
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new(SequencingParams::default())
    }
}

fn by_effort_then_score(a: &Entry, b: &Entry) -> Ordering {
    a.effort.cmp(&b.effort).then(b.score.total_cmp(&a.score))
}

fn sorted(mut entries: Vec<Entry>, compare: impl FnMut(&Entry, &Entry) -> Ordering) -> Vec<Entry> {
    entries.sort_by(compare);
    entries
}

/// Splits off the best-scored light items until `target` minutes are covered.
fn warm_up(entries: Vec<Entry>, target: f64) -> (Vec<Entry>, Vec<Entry>) {
    let (light, mut rest): (Vec<Entry>, Vec<Entry>) =
        entries.into_iter().partition(|e| e.effort == Effort::Light);

    let mut head = Vec::new();
    let mut covered = 0u32;
    for entry in sorted(light, |a, b| b.score.total_cmp(&a.score)) {
        if (covered as f64) < target {
            covered += entry.minutes;
            head.push(entry);
        } else {
            rest.push(entry);
        }
    }
    (head, rest)
}

/// Anxious or frustrated learners start with the lightest available item,
/// and never with a simulado when anything else exists.
fn guard_opener(ordered: &mut [Entry]) {
    let Some(first) = ordered.first() else {
        return;
    };
    let lightest = ordered.iter().map(|e| e.effort).min().unwrap_or(first.effort);
    if first.effort == lightest {
        return;
    }
    if let Some(index) = ordered.iter().position(|e| e.effort == lightest) {
        ordered[..=index].rotate_right(1);
    }
}

fn emotional_pressure(kind: ContentKind) -> u8 {
    match kind {
        ContentKind::Drop | ContentKind::Bloco => 1,
        ContentKind::Revisao => 2,
        ContentKind::Questao => 3,
        ContentKind::Simulado => 4,
    }
}

pub fn curve_shape(values: &[u8]) -> CurveShape {
    if values.len() < 2 || values.windows(2).all(|w| w[0] == w[1]) {
        return CurveShape::Estavel;
    }
    if values.windows(2).all(|w| w[0] <= w[1]) {
        return CurveShape::Crescente;
    }
    if values.windows(2).all(|w| w[0] >= w[1]) {
        return CurveShape::Decrescente;
    }

    let peak = values
        .iter()
        .enumerate()
        .max_by_key(|(_, v)| **v)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let rising = values[..=peak].windows(2).all(|w| w[0] <= w[1]);
    let falling = values[peak..].windows(2).all(|w| w[0] >= w[1]);
    if rising && falling {
        CurveShape::Pico
    } else {
        CurveShape::Ondulada
    }
}
