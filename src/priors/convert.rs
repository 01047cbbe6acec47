//! Prior → probability vector conversion.
//!
//! Fixed linear heuristics anchored at league-average baselines. Each
//! output is clamped to its own valid range. The coefficients are a frozen
//! table, kept exactly as-is for reproducibility across releases.

use crate::types::{ProbabilityVector, ProviderPrior, WeightedCard};

/// League-average combined goals the tempo adjustment is centred on.
const BASELINE_TEMPO: f64 = 2.45;
const TEMPO_SLOPE: f64 = 0.06;
const TEMPO_ADJ_CAP: f64 = 0.06;

/// Tempo adjustment shared by the full-time and half-time outcomes.
pub fn tempo_adjustment(tempo: f64) -> f64 {
    ((tempo - BASELINE_TEMPO) * TEMPO_SLOPE).clamp(-TEMPO_ADJ_CAP, TEMPO_ADJ_CAP)
}

/// Convert a provider prior into a probability vector.
pub fn prior_to_vector(prior: &ProviderPrior) -> ProbabilityVector {
    let t = tempo_adjustment(prior.tempo);
    let ha = prior.home_attack_rel;
    let aa = prior.away_attack_rel;
    let hd = prior.home_defense_rel;
    let ad = prior.away_defense_rel;

    ProbabilityVector {
        over_15: (0.78 + t + 0.02 * (ha - ad)).clamp(0.55, 0.97),
        over_25: (0.60 + 0.8 * t + 0.02 * (ha + aa - hd - ad)).clamp(0.38, 0.93),
        under_35: (0.76 - 0.6 * t - 0.02 * (ha + aa)).clamp(0.35, 0.96),
        under_45: (0.82 - 0.5 * t - 0.015 * (ha + aa)).clamp(0.55, 0.98),
        ht_over_05: (0.74 + 0.4 * t).clamp(0.42, 0.95),
        home_over_15: (0.66 + 0.05 * (ha - 1.0) - 0.03 * (ad - 1.0)).clamp(0.30, 0.95),
        away_over_05: (0.62 + 0.04 * (aa - 1.0) - 0.02 * (hd - 1.0)).clamp(0.25, 0.95),
    }
}

/// Convert a prior into a blendable card carrying the prior's weight.
pub fn prior_to_card(prior: &ProviderPrior) -> WeightedCard {
    WeightedCard {
        vector: prior_to_vector(prior),
        weight: prior.weight.max(0.0),
        source: prior.source.clone(),
        note: format!(
            "tempo {:.2}, attack H/A {:.2}/{:.2}, defense H/A {:.2}/{:.2}",
            prior.tempo,
            prior.home_attack_rel,
            prior.away_attack_rel,
            prior.home_defense_rel,
            prior.away_defense_rel,
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
