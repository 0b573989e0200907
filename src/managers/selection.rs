//! Task scoring and selection
//!
//! The one piece of original decision logic in the system: a pure,
//! deterministic function from (assessments, settings) to a ranked,
//! capped candidate list. No I/O, no randomness.

use crate::config::SelectionSettings;
use crate::types::{ScoredCandidate, TaskAssessment};
use std::cmp::Ordering;

/// The three weighted scoring dimensions, in declaration (default-weight)
/// order. Safety is a hard filter, not a weighted dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScoreDim {
    Value,
    Feasibility,
    Alignment,
}

impl ScoreDim {
    fn get(self, a: &TaskAssessment) -> u8 {
        match self {
            ScoreDim::Value => a.value_score,
            ScoreDim::Feasibility => a.feasibility_score,
            ScoreDim::Alignment => a.user_preference_alignment_score,
        }
    }
}

/// Weighted composite score for one assessment
pub fn true_score(a: &TaskAssessment, settings: &SelectionSettings) -> f64 {
    f64::from(a.value_score) * settings.value_weight
        + f64::from(a.feasibility_score) * settings.feasibility_weight
        + f64::from(a.user_preference_alignment_score) * settings.user_preference_alignment_weight
}

/// Filter, rank, and truncate scored assessments into the deployment list
///
/// 1. Drop anything with `safety_score < safety_threshold`.
/// 2. Compute the weighted `true_score` and its ratio against the maximum
///    attainable score (ratio 0 when the weights sum to nothing).
/// 3. Drop anything with `score_ratio < deployment_threshold`.
/// 4. Sort by `true_score` descending; break ties on the individual
///    dimensions ordered by descending configured weight, so the ordering
///    generalizes to any weight configuration.
/// 5. Cap at `max_deployed_tasks` (a value ≤ 0 means no cap).
pub fn select_candidates(
    assessments: &[TaskAssessment],
    settings: &SelectionSettings,
) -> Vec<ScoredCandidate> {
    let max_score = 10.0
        * (settings.value_weight
            + settings.feasibility_weight
            + settings.user_preference_alignment_weight);

    let tie_break_order = dimension_order(settings);

    let mut candidates: Vec<ScoredCandidate> = assessments
        .iter()
        .filter(|a| a.safety_score >= settings.safety_threshold)
        .filter_map(|a| {
            let score = true_score(a, settings);
            let ratio = if max_score > 0.0 { score / max_score } else { 0.0 };
            if ratio < settings.deployment_threshold {
                return None;
            }
            Some(ScoredCandidate {
                assessment: a.clone(),
                true_score: score,
                score_ratio: ratio,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.true_score
            .partial_cmp(&a.true_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                for dim in tie_break_order {
                    let ord = dim.get(&b.assessment).cmp(&dim.get(&a.assessment));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            })
    });

    if settings.max_deployed_tasks > 0 {
        candidates.truncate(settings.max_deployed_tasks as usize);
    }
    candidates
}

/// The three dimensions sorted by descending configured weight
///
/// Stable sort: dimensions with equal weights keep value, feasibility,
/// alignment order.
fn dimension_order(settings: &SelectionSettings) -> [ScoreDim; 3] {
    let mut dims = [
        (ScoreDim::Value, settings.value_weight),
        (ScoreDim::Feasibility, settings.feasibility_weight),
        (ScoreDim::Alignment, settings.user_preference_alignment_weight),
    ];
    dims.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    [dims[0].0, dims[1].0, dims[2].0]
}
