use crate::draft::EvaluationKind;
use serde::{Deserialize, Serialize};

/// Tool configuration.
///
/// Everything has a sensible default, so a missing config file means
/// defaults across the board.
///
/// Example YAML:
/// ```yaml
/// defaults:
///   max_score: 100
///   time_limit_minutes: 90
///   kind: quiz
/// limits:
///   max_max_score: 500
/// preview:
///   debounce_ms: 300
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub defaults: DraftDefaults,

    #[serde(default)]
    pub limits: Limits,

    #[serde(default)]
    pub preview: PreviewConfig,
}

/// Starting values for a freshly created draft.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DraftDefaults {
    #[serde(default = "default_max_score")]
    pub max_score: i64,

    #[serde(default = "default_time_limit")]
    pub time_limit_minutes: u32,

    #[serde(default = "default_kind")]
    pub kind: EvaluationKind,
}

impl Default for DraftDefaults {
    fn default() -> Self {
        Self {
            max_score: default_max_score(),
            time_limit_minutes: default_time_limit(),
            kind: default_kind(),
        }
    }
}

/// Bounds enforced by draft validation.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Limits {
    #[serde(default = "default_min_max_score")]
    pub min_max_score: i64,

    #[serde(default = "default_max_max_score")]
    pub max_max_score: i64,

    /// Time limit bounds, in minutes.
    #[serde(default = "default_min_time_limit")]
    pub min_time_limit: u32,

    #[serde(default = "default_max_time_limit")]
    pub max_time_limit: u32,

    /// Minimum answer options on a single-choice question.
    #[serde(default = "default_min_choices")]
    pub min_choices: usize,

    #[serde(default = "default_max_retakes")]
    pub max_retakes: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_max_score: default_min_max_score(),
            max_max_score: default_max_max_score(),
            min_time_limit: default_min_time_limit(),
            max_time_limit: default_max_time_limit(),
            min_choices: default_min_choices(),
            max_retakes: default_max_retakes(),
        }
    }
}

/// Preview notification settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PreviewConfig {
    /// Quiescence window before the preview consumer is notified.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_max_score() -> i64 {
    100
}

fn default_time_limit() -> u32 {
    60
}

fn default_kind() -> EvaluationKind {
    EvaluationKind::Exam
}

fn default_min_max_score() -> i64 {
    1
}

fn default_max_max_score() -> i64 {
    500
}

fn default_min_time_limit() -> u32 {
    1
}

fn default_max_time_limit() -> u32 {
    480
}

fn default_min_choices() -> usize {
    2
}

fn default_max_retakes() -> u32 {
    10
}

fn default_debounce_ms() -> u64 {
    300
}

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.limits.min_max_score < 1 {
        errors.push("limits.min_max_score: must be at least 1".to_string());
    }

    if config.limits.max_max_score < config.limits.min_max_score {
        errors.push(format!(
            "limits.max_max_score: {} is below limits.min_max_score {}",
            config.limits.max_max_score, config.limits.min_max_score
        ));
    }

    if config.limits.min_time_limit < 1 {
        errors.push("limits.min_time_limit: must be at least 1".to_string());
    }

    if config.limits.max_time_limit < config.limits.min_time_limit {
        errors.push(format!(
            "limits.max_time_limit: {} is below limits.min_time_limit {}",
            config.limits.max_time_limit, config.limits.min_time_limit
        ));
    }

    if config.limits.min_choices < 2 {
        errors.push("limits.min_choices: must be at least 2".to_string());
    }

    if config.defaults.max_score < config.limits.min_max_score
        || config.defaults.max_score > config.limits.max_max_score
    {
        errors.push(format!(
            "defaults.max_score: {} outside limits {}..{}",
            config.defaults.max_score, config.limits.min_max_score, config.limits.max_max_score
        ));
    }

    if config.preview.debounce_ms == 0 {
        errors.push("preview.debounce_ms: must be greater than 0".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
