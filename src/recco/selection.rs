use std::collections::HashSet;

use crate::recco::config::SelectionParams;
use crate::recco::invariants::clamp01;
use crate::recco::pool::{ContentPool, PoolItem};
use crate::recco::types::{ContentKind, Priority, SelectedContent, SelectedItem, SelectedReview};

pub const DUE_REVIEW_REASON: &str = "revisao_srs_vencida";

/// Greedy budgeted selection over ranked priorities.
pub struct Selector {
    params: SelectionParams,
}

struct Basket {
    content: SelectedContent,
    used: u32,
    budget: u32,
    seen: HashSet<(ContentKind, String)>,
}

impl Basket {
    fn new(budget: u32) -> Self {
        Self {
            content: SelectedContent::default(),
            used: 0,
            budget,
            seen: HashSet::new(),
        }
    }

    fn is_full(&self) -> bool {
        self.used >= self.budget
    }

    fn admits(&self, item: &PoolItem, minutes: u32) -> bool {
        !self.seen.contains(&(item.tipo, item.id.clone()))
            && self.used.saturating_add(minutes) <= self.budget
    }

    fn accept(&mut self, item: &PoolItem, minutes: u32, score: f64, reason: &str) {
        self.seen.insert((item.tipo, item.id.clone()));
        self.used += minutes;

        let selected = || SelectedItem {
            id: item.id.clone(),
            score,
            reason: reason.to_string(),
            estimated_minutes: minutes,
            difficulty: item.difficulty,
            drop_type: item.drop_type,
        };
        match item.tipo {
            ContentKind::Revisao => self.content.revisoes_srs.push(SelectedReview {
                card_id: item.id.clone(),
                score,
                reason: reason.to_string(),
                estimated_minutes: minutes,
                difficulty: item.difficulty,
            }),
            ContentKind::Drop => self.content.drops.push(selected()),
            ContentKind::Bloco => self.content.blocos.push(selected()),
            ContentKind::Questao => self.content.questoes.push(selected()),
            ContentKind::Simulado => self.content.simulados.push(selected()),
        }
    }
}

impl Selector {
    pub fn new(params: SelectionParams) -> Self {
        Self { params }
    }

    /// Minutes held back for SRS reviews: `budget * min(overdue * share, cap)`.
    pub fn review_reserve(&self, budget_minutes: u32, srs_overdue: u32) -> u32 {
        let share = (srs_overdue as f64 * self.params.review_share_per_overdue)
            .min(self.params.review_share_cap)
            .max(0.0);
        (budget_minutes as f64 * share).floor() as u32
    }

    pub fn select(
        &self,
        priorities: &[Priority],
        pool: &dyn ContentPool,
        budget_minutes: u32,
        srs_overdue: u32,
    ) -> SelectedContent {
        let resolved: Vec<Vec<PoolItem>> = priorities
            .iter()
            .map(|priority| self.resolve(priority, pool))
            .collect();

        let reserve = self.review_reserve(budget_minutes, srs_overdue);
        let mut basket = Basket::new(budget_minutes);

        // reviews first, only up to the reserved floor
        for (priority, items) in priorities.iter().zip(&resolved) {
            if priority.tipo != ContentKind::Revisao {
                continue;
            }
            for item in items {
                if basket.content.review_minutes() >= reserve {
                    break;
                }
                let minutes = self.minutes_for(item);
                if basket.admits(item, minutes) {
                    basket.accept(item, minutes, priority.score, &priority.reason);
                }
            }
        }

        if basket.content.review_minutes() < reserve {
            self.top_up_due_reviews(&mut basket, pool, reserve, srs_overdue);
        }

        for (priority, items) in priorities.iter().zip(&resolved) {
            if basket.is_full() {
                break;
            }
            for item in items {
                let minutes = self.minutes_for(item);
                if basket.admits(item, minutes) {
                    basket.accept(item, minutes, priority.score, &priority.reason);
                }
            }
        }

        tracing::debug!(
            budget_minutes,
            reserve,
            used = basket.used,
            items = basket.content.len(),
            "content selected"
        );

        basket.content
    }

    fn resolve(&self, priority: &Priority, pool: &dyn ContentPool) -> Vec<PoolItem> {
        let mut items = pool.resolve(priority.tipo, priority.content_id.as_deref());
        if let Some(drop_type) = priority.drop_type {
            if priority.content_id.is_none() {
                items.retain(|item| item.drop_type.map_or(true, |dt| dt == drop_type));
            }
        }
        if items.is_empty() {
            tracing::warn!(
                tipo = priority.tipo.as_str(),
                content_id = priority.content_id.as_deref().unwrap_or("-"),
                action = %priority.action,
                "unresolvable content reference skipped"
            );
        }
        items.truncate(self.params.max_items_per_priority);
        items
    }

    fn top_up_due_reviews(
        &self,
        basket: &mut Basket,
        pool: &dyn ContentPool,
        reserve: u32,
        srs_overdue: u32,
    ) {
        let cap = self.params.review_share_cap;
        let demand = srs_overdue as f64 * self.params.review_share_per_overdue;
        let score = if cap > 0.0 { clamp01(demand / cap) } else { 0.0 };

        for item in pool
            .resolve(ContentKind::Revisao, None)
            .iter()
            .take(srs_overdue as usize)
        {
            if basket.content.review_minutes() >= reserve {
                break;
            }
            let minutes = self.minutes_for(item);
            if basket.admits(item, minutes) {
                basket.accept(item, minutes, score, DUE_REVIEW_REASON);
            }
        }
    }

    fn minutes_for(&self, item: &PoolItem) -> u32 {
        item.estimated_minutes
            .unwrap_or_else(|| self.params.durations.for_kind(item.tipo))
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::new(SelectionParams::default())
    }
}
