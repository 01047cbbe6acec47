//! Weighted consensus of probability cards.
//!
//! Produces one consensus vector plus two independent confidence scalars:
//! coverage (driven only by the raw weight sum) and disagreement (driven
//! only by the spread of the raw, unweighted card vectors).

use tracing::debug;

use crate::types::{BlendResult, OutcomeKey, ProbabilityVector, WeightedCard};

/// Raw weight sum that maps to full (pre-cap) coverage.
const COVERAGE_WEIGHT_SCALE: f64 = 1.4;
pub const COVERAGE_MIN: f64 = 0.40;
pub const COVERAGE_MAX: f64 = 0.95;

/// Mean per-key standard deviation that maps to disagreement 1.0.
const DISAGREEMENT_SCALE: f64 = 0.12;

/// Blend `cards` into a consensus vector.
///
/// Negative or non-finite weights count as zero. With a zero total weight
/// (or no cards) the consensus is all-zero and `has_signal()` on the
/// result is false.
pub fn blend(cards: &[WeightedCard]) -> BlendResult {
    let total_weight: f64 = cards.iter().map(|c| effective_weight(c.weight)).sum();
    let divisor = if total_weight == 0.0 { 1.0 } else { total_weight };

    let mut vector = ProbabilityVector::default();
    for card in cards {
        let w = effective_weight(card.weight) / divisor;
        for key in OutcomeKey::ALL {
            vector.set(key, vector.get(key) + w * card.vector.get(key));
        }
    }

    let result = BlendResult {
        vector,
        coverage: coverage(total_weight),
        disagreement: disagreement(cards),
        total_weight,
    };

    debug!(
        cards = cards.len(),
        total_weight,
        coverage = result.coverage,
        disagreement = result.disagreement,
        "Blend complete"
    );

    result
}

fn effective_weight(weight: f64) -> f64 {
    if weight.is_finite() {
        weight.max(0.0)
    } else {
        0.0
    }
}

/// `clamp(total_weight / 1.4, 0.40, 0.95)`.
pub fn coverage(total_weight: f64) -> f64 {
    if total_weight.is_nan() {
        return COVERAGE_MIN;
    }
    (total_weight / COVERAGE_WEIGHT_SCALE).clamp(COVERAGE_MIN, COVERAGE_MAX)
}

/// Mean over keys of the population standard deviation across raw card
/// vectors, scaled by 0.12 and clamped to [0, 1]. Weights are ignored.
pub fn disagreement(cards: &[WeightedCard]) -> f64 {
    if cards.len() < 2 {
        return 0.0;
    }
    let n = cards.len() as f64;

    let total_sd: f64 = OutcomeKey::ALL
        .into_iter()
        .map(|key| {
            let mean = cards.iter().map(|c| c.vector.get(key)).sum::<f64>() / n;
            let var = cards
                .iter()
                .map(|c| (c.vector.get(key) - mean).powi(2))
                .sum::<f64>()
                / n;
            var.sqrt()
        })
        .sum();
    let mean_sd = total_sd / OutcomeKey::ALL.len() as f64;

    let score = mean_sd / DISAGREEMENT_SCALE;
    if score.is_nan() {
        return 1.0;
    }
    score.clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
