//! Pairwise compatibility scoring.
//!
//! A score is a weighted sum of four sub-scores, each bounded to roughly
//! `[-1, 1]` before weighting. Higher is a better pairing. Scores are exactly
//! symmetric: `compatibility(a, b, w) == compatibility(b, a, w)`.

use std::collections::BTreeSet;

use crate::model::{Guest, MatchingWeights};

/// Level assumed for guests without a job level: halfway along the scale.
const UNKNOWN_LEVEL: f64 = 1.5;

/// Largest possible distance between two job levels.
const MAX_LEVEL_GAP: f64 = 3.0;

/// How well two networking goals complement each other.
///
/// Lookup is symmetric and case-insensitive. Pairs not listed score 0.
const GOAL_MATRIX: &[(&str, &str, f64)] = &[
    ("hiring", "job-seeking", 0.8),
    ("mentoring", "seeking-mentor", 0.8),
    ("investing", "fundraising", 0.8),
    ("selling", "buying", 0.7),
    ("partnership", "partnership", 0.6),
    ("learning", "mentoring", 0.5),
    ("learning", "learning", 0.4),
    ("networking", "networking", 0.3),
    ("networking", "partnership", 0.2),
    ("hiring", "hiring", -0.2),
    ("job-seeking", "job-seeking", -0.2),
    ("fundraising", "fundraising", -0.3),
    ("selling", "selling", -0.3),
];

/// Scores how good it is to seat `a` next to `b`.
pub fn compatibility(a: &Guest, b: &Guest, weights: &MatchingWeights) -> f64 {
    let mut score = 0.0;

    if weights.department_mix != 0.0 {
        score += weights.department_mix * department_score(a, b);
    }
    if weights.interest_affinity != 0.0 {
        score += weights.interest_affinity * interest_score(a, b);
    }
    if weights.job_level_diversity != 0.0 {
        score += weights.job_level_diversity * level_score(a, b);
    }
    if weights.goal_compatibility != 0.0 {
        score += weights.goal_compatibility * goal_score(a, b);
    }

    score
}

/// Mean pairwise compatibility over every unique pair at a table.
///
/// Diagnostics only; placement never calls this.
pub fn table_quality(guests: &[&Guest], weights: &MatchingWeights) -> f64 {
    if guests.len() < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    let mut pairs = 0usize;
    for (i, a) in guests.iter().enumerate() {
        for b in &guests[i + 1..] {
            total += compatibility(a, b, weights);
            pairs += 1;
        }
    }
    total / pairs as f64
}

/// Case-insensitive department equality. Guests without one never match.
pub fn same_department(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.trim().to_lowercase() == b.trim().to_lowercase(),
        _ => false,
    }
}

/// -1 when both guests share a department, +1 otherwise.
fn department_score(a: &Guest, b: &Guest) -> f64 {
    if same_department(a.department.as_deref(), b.department.as_deref()) {
        -1.0
    } else {
        1.0
    }
}

/// Jaccard similarity of interests, rescaled to `[-1, 1]`.
fn interest_score(a: &Guest, b: &Guest) -> f64 {
    let left = lowercased(&a.attributes.interests);
    let right = lowercased(&b.attributes.interests);

    let jaccard = if left.is_empty() || right.is_empty() {
        0.0
    } else {
        let shared = left.intersection(&right).count();
        let union = left.union(&right).count();
        shared as f64 / union as f64
    };

    rescale(jaccard)
}

/// Normalized job-level gap, rescaled to `[-1, 1]`.
fn level_score(a: &Guest, b: &Guest) -> f64 {
    let left = a.attributes.job_level.map_or(UNKNOWN_LEVEL, |l| l.position());
    let right = b.attributes.job_level.map_or(UNKNOWN_LEVEL, |l| l.position());
    rescale((left - right).abs() / MAX_LEVEL_GAP)
}

/// Mean goal-matrix value over every pairing of distinct goals.
fn goal_score(a: &Guest, b: &Guest) -> f64 {
    let left_goals = lowercased(&a.attributes.goals);
    let right_goals = lowercased(&b.attributes.goals);
    if left_goals.is_empty() || right_goals.is_empty() {
        return 0.0;
    }

    let mut values: Vec<f64> = Vec::new();
    for left in &left_goals {
        for right in &right_goals {
            values.push(goal_affinity(left, right));
        }
    }

    // Summing in sorted order keeps the result bit-identical when a and b swap.
    values.sort_by(f64::total_cmp);
    values.iter().sum::<f64>() / values.len() as f64
}

/// Matrix value for a single goal pairing.
pub fn goal_affinity(left: &str, right: &str) -> f64 {
    let left = left.trim().to_lowercase();
    let right = right.trim().to_lowercase();

    GOAL_MATRIX
        .iter()
        .find(|(x, y, _)| (*x == left && *y == right) || (*x == right && *y == left))
        .map_or(0.0, |(_, _, value)| *value)
}

fn lowercased(set: &BTreeSet<String>) -> BTreeSet<String> {
    set.iter().map(|s| s.trim().to_lowercase()).collect()
}

fn rescale(unit: f64) -> f64 {
    2.0 * unit - 1.0
}
