//! Matching weights: how much each compatibility factor matters.

use serde::{Deserialize, Serialize};

/// Signed coefficients for the compatibility and placement cost terms.
///
/// Positive `department_mix`, `interest_affinity`, and `job_level_diversity`
/// reward mixing. `repeat_avoidance` is conventionally non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct MatchingWeights {
    pub department_mix: f64,
    pub interest_affinity: f64,
    pub job_level_diversity: f64,
    pub goal_compatibility: f64,
    pub repeat_avoidance: f64,
}

impl MatchingWeights {
    /// All weights zero: only constraints and stability influence placement.
    #[cfg(test)]
    pub const ZERO: Self = Self {
        department_mix: 0.0,
        interest_affinity: 0.0,
        job_level_diversity: 0.0,
        goal_compatibility: 0.0,
        repeat_avoidance: 0.0,
    };
}

impl Default for MatchingWeights {
    fn default() -> Self {
        Self {
            department_mix: 0.8,
            interest_affinity: 0.3,
            job_level_diversity: 0.5,
            goal_compatibility: 0.4,
            repeat_avoidance: 0.9,
        }
    }
}
