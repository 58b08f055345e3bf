use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::recco::error::ReccoError;
use crate::recco::types::ContentKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosisParams {
    pub high_bucket: f64,
    pub medium_bucket: f64,
    /// Attention-load (`nca`, 0-100 scale) above which the learner is saturated.
    pub saturation_nca_threshold: f64,
    pub min_sample_size: u32,
    pub prior_strength: f64,
    pub advanced_accuracy: f64,
    pub advanced_max_difficulty: f64,
    pub stuck_accuracy: f64,
    pub slow_answer_baseline_seconds: f64,
    pub slow_answer_factor: f64,
    pub base_study_minutes: f64,
    pub min_study_minutes: u32,
    pub max_study_minutes: u32,
    pub saturated_factor: f64,
    pub low_factor: f64,
    pub high_factor: f64,
    pub stuck_factor: f64,
    pub advanced_factor: f64,
    pub motivated_factor: f64,
    pub anxious_factor: f64,
    pub overdue_review_threshold: u32,
    pub overdue_retention_cap: u32,
}

impl Default for DiagnosisParams {
    fn default() -> Self {
        Self {
            high_bucket: 70.0,
            medium_bucket: 40.0,
            saturation_nca_threshold: 70.0,
            min_sample_size: 5,
            prior_strength: 4.0,
            advanced_accuracy: 0.8,
            advanced_max_difficulty: 2.0,
            stuck_accuracy: 0.4,
            slow_answer_baseline_seconds: 90.0,
            slow_answer_factor: 1.5,
            base_study_minutes: 50.0,
            min_study_minutes: 10,
            max_study_minutes: 120,
            saturated_factor: 0.4,
            low_factor: 0.7,
            high_factor: 1.2,
            stuck_factor: 0.6,
            advanced_factor: 2.4,
            motivated_factor: 1.3,
            anxious_factor: 0.8,
            overdue_review_threshold: 10,
            overdue_retention_cap: 40,
        }
    }
}

/// Multipliers applied to `fit` for a given cognitive state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StateGate {
    pub simulado: f64,
    pub questao: f64,
    pub bloco: f64,
    pub drop: f64,
    pub light: f64,
}

impl Default for StateGate {
    fn default() -> Self {
        Self {
            simulado: 1.0,
            questao: 1.0,
            bloco: 1.0,
            drop: 1.0,
            light: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrioritizationParams {
    pub urgency_weight: f64,
    pub fit_weight: f64,
    pub fit_exact: f64,
    pub fit_partial: f64,
    pub fit_mismatch: f64,
    pub banca_bonus: f64,
    pub difficulty_bonus: f64,
    pub srs_overdue_cap: u32,
    pub srs_pending_cap: u32,
    pub pending_weight: f64,
    pub new_topic_urgency: f64,
    pub high_error_rate: f64,
    pub saturated_gate: StateGate,
    pub low_gate: StateGate,
}

impl Default for PrioritizationParams {
    fn default() -> Self {
        Self {
            urgency_weight: 0.45,
            fit_weight: 0.55,
            fit_exact: 1.0,
            fit_partial: 0.6,
            fit_mismatch: 0.1,
            banca_bonus: 0.15,
            difficulty_bonus: 0.1,
            srs_overdue_cap: 20,
            srs_pending_cap: 50,
            pending_weight: 0.3,
            new_topic_urgency: 0.3,
            high_error_rate: 0.6,
            saturated_gate: StateGate {
                simulado: 0.05,
                questao: 0.6,
                bloco: 0.5,
                drop: 1.0,
                light: 1.5,
            },
            low_gate: StateGate {
                simulado: 0.4,
                questao: 0.9,
                bloco: 0.8,
                drop: 1.0,
                light: 1.2,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultDurations {
    pub drop: u32,
    pub questao: u32,
    pub revisao: u32,
    pub bloco: u32,
    pub simulado: u32,
}

impl Default for DefaultDurations {
    fn default() -> Self {
        Self {
            drop: 5,
            questao: 3,
            revisao: 2,
            bloco: 8,
            simulado: 10,
        }
    }
}

impl DefaultDurations {
    pub fn for_kind(&self, kind: ContentKind) -> u32 {
        match kind {
            ContentKind::Drop => self.drop,
            ContentKind::Questao => self.questao,
            ContentKind::Revisao => self.revisao,
            ContentKind::Bloco => self.bloco,
            ContentKind::Simulado => self.simulado,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionParams {
    pub review_share_per_overdue: f64,
    pub review_share_cap: f64,
    pub max_items_per_priority: usize,
    pub durations: DefaultDurations,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self {
            review_share_per_overdue: 0.03,
            review_share_cap: 0.4,
            max_items_per_priority: 3,
            durations: DefaultDurations::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencingParams {
    pub warmup_fraction: f64,
    pub short_drop_minutes: u32,
    pub saturation_strategy_threshold: f64,
    pub depleted_break_minutes: u32,
    pub medium_break_minutes: u32,
    pub high_break_minutes: u32,
}

impl Default for SequencingParams {
    fn default() -> Self {
        Self {
            warmup_fraction: 0.2,
            short_drop_minutes: 5,
            saturation_strategy_threshold: 0.7,
            depleted_break_minutes: 15,
            medium_break_minutes: 25,
            high_break_minutes: 45,
        }
    }
}

/// How many remedial items of each kind a weakness level stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemedialQuota {
    pub drops: usize,
    pub mnemonicos: usize,
    pub questoes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReinforcementParams {
    pub critical_streak: u32,
    pub high_streak: u32,
    pub critical_error_rate: f64,
    pub high_error_rate: f64,
    pub medium_error_rate: f64,
    pub critical_quota: RemedialQuota,
    pub high_quota: RemedialQuota,
    pub medium_quota: RemedialQuota,
    pub low_quota: RemedialQuota,
    pub critical_interval_factor: f64,
    pub high_interval_factor: f64,
    pub default_interval_factor: f64,
    pub critical_ease_delta: f64,
    pub high_ease_delta: f64,
    pub default_ease_delta: f64,
}

impl Default for ReinforcementParams {
    fn default() -> Self {
        Self {
            critical_streak: 5,
            high_streak: 3,
            critical_error_rate: 0.7,
            high_error_rate: 0.5,
            medium_error_rate: 0.3,
            critical_quota: RemedialQuota { drops: 2, mnemonicos: 2, questoes: 3 },
            high_quota: RemedialQuota { drops: 1, mnemonicos: 1, questoes: 2 },
            medium_quota: RemedialQuota { drops: 1, mnemonicos: 0, questoes: 1 },
            low_quota: RemedialQuota { drops: 0, mnemonicos: 0, questoes: 1 },
            critical_interval_factor: 0.5,
            high_interval_factor: 0.7,
            default_interval_factor: 0.85,
            critical_ease_delta: -0.2,
            high_ease_delta: -0.1,
            default_ease_delta: -0.05,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReccoConfig {
    pub diagnosis: DiagnosisParams,
    pub prioritization: PrioritizationParams,
    pub selection: SelectionParams,
    pub sequencing: SequencingParams,
    pub reinforcement: ReinforcementParams,
}

impl ReccoConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ReccoError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ReccoError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Some(val) = env_f64("RECCO_SATURATION_NCA_THRESHOLD") {
            self.diagnosis.saturation_nca_threshold = val;
        }
        if let Some(val) = env_f64("RECCO_BASE_STUDY_MINUTES") {
            self.diagnosis.base_study_minutes = val;
        }
        if let Some(val) = env_f64("RECCO_WARMUP_FRACTION") {
            self.sequencing.warmup_fraction = val;
        }
        if let Some(val) = env_f64("RECCO_REVIEW_SHARE_CAP") {
            self.selection.review_share_cap = val;
        }
        if let Some(val) = env_f64("RECCO_URGENCY_WEIGHT") {
            self.prioritization.urgency_weight = val;
            self.prioritization.fit_weight = 1.0 - val;
        }
    }

    pub fn validate(&self) -> Result<(), ReccoError> {
        let p = &self.prioritization;
        check_unit("prioritization.urgency_weight", p.urgency_weight)?;
        check_unit("prioritization.fit_weight", p.fit_weight)?;
        if ((p.urgency_weight + p.fit_weight) - 1.0).abs() > 1e-9 {
            return Err(invalid(
                "prioritization.fit_weight",
                "urgency_weight + fit_weight must equal 1",
            ));
        }
        check_unit("prioritization.fit_exact", p.fit_exact)?;
        check_unit("prioritization.fit_partial", p.fit_partial)?;
        check_unit("prioritization.fit_mismatch", p.fit_mismatch)?;
        check_unit("prioritization.difficulty_bonus", p.difficulty_bonus)?;
        if p.saturated_gate.simulado > p.saturated_gate.light * p.fit_mismatch {
            return Err(invalid(
                "prioritization.saturated_gate.simulado",
                "must not exceed saturated_gate.light * fit_mismatch",
            ));
        }
        if p.srs_overdue_cap == 0 || p.srs_pending_cap == 0 {
            return Err(invalid("prioritization.srs_overdue_cap", "caps must be positive"));
        }

        let d = &self.diagnosis;
        if d.min_study_minutes < 10
            || d.max_study_minutes > 120
            || d.min_study_minutes > d.max_study_minutes
        {
            return Err(invalid(
                "diagnosis.min_study_minutes",
                "study bounds must satisfy 10 <= min <= max <= 120",
            ));
        }
        if d.medium_bucket > d.high_bucket {
            return Err(invalid("diagnosis.medium_bucket", "must not exceed high_bucket"));
        }

        check_unit("sequencing.warmup_fraction", self.sequencing.warmup_fraction)?;
        check_unit("selection.review_share_cap", self.selection.review_share_cap)?;
        check_unit(
            "selection.review_share_per_overdue",
            self.selection.review_share_per_overdue,
        )?;
        if self.selection.max_items_per_priority == 0 {
            return Err(invalid("selection.max_items_per_priority", "must be positive"));
        }

        Ok(())
    }
}

fn env_f64(key: &str) -> Option<f64> {
    std::env::var(key).ok().and_then(|val| val.parse::<f64>().ok())
}

fn check_unit(field: &str, value: f64) -> Result<(), ReccoError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, "must lie in [0, 1]"))
    }
}

fn invalid(field: &str, reason: &str) -> ReccoError {
    ReccoError::InvalidConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
