//! Hard checks for the engine's value invariants.
//!
//! Every stage is a pure function, so a violation here is a bug in the stage
//! and not a runtime condition. These checks panic in release builds too.

use crate::recco::types::{DiagnosedState, Priority, SequencedTrail};

pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

pub fn assert_unit_interval(field: &str, value: f64) {
    assert!(
        (0.0..=1.0).contains(&value),
        "{field} must lie in [0, 1], got {value}"
    );
}

pub fn assert_diagnosis(state: &DiagnosedState) {
    assert_unit_interval("prob_acerto", state.prob_acerto);
    assert_unit_interval("prob_retencao", state.prob_retencao);
    assert_unit_interval("prob_saturacao", state.prob_saturacao);
}

pub fn assert_priority(priority: &Priority) {
    assert_unit_interval("priority.score", priority.score);
    assert_unit_interval("priority.urgency", priority.urgency);
}

pub fn assert_trail_consistent(trail: &SequencedTrail) {
    let summed: u32 = trail.items.iter().map(|item| item.estimated_minutes).sum();
    assert_eq!(
        summed, trail.total_time_minutes,
        "trail declares {} minutes but its items sum to {}",
        trail.total_time_minutes, summed
    );
    for (index, item) in trail.items.iter().enumerate() {
        assert_eq!(
            item.order as usize,
            index + 1,
            "trail item {} has order {}",
            item.id,
            item.order
        );
    }
}
