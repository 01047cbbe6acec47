//! Candidate scanning.
//!
//! Runs every candidate bet through the band rule against a built card
//! and splits the results into passes (best edge first) and near-misses
//! (closest to passing first).

use serde::Serialize;
use tracing::{debug, info};

use super::band::{evaluate, CandidateDecision};
use crate::types::{OddsQuote, PCard};

/// A candidate that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedCandidate {
    pub label: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanOutcome {
    pub passes: Vec<CandidateDecision>,
    pub near_misses: Vec<CandidateDecision>,
    pub skipped: Vec<SkippedCandidate>,
}

/// Evaluate `candidates` against the blended probabilities in `card`.
pub fn scan(card: &PCard, candidates: &[OddsQuote]) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    for quote in candidates {
        let Some(key) = quote.outcome() else {
            debug!(label = %quote.label, "Unrecognized candidate label");
            outcome.skipped.push(SkippedCandidate {
                label: quote.label.clone(),
                reason: "unrecognized market label".into(),
            });
            continue;
        };
        let Some(no_vig) = quote.no_vig() else {
            debug!(quote = %quote, "Invalid candidate prices");
            outcome.skipped.push(SkippedCandidate {
                label: quote.label.clone(),
                reason: "prices must both be above 1.0".into(),
            });
            continue;
        };

        let decision = evaluate(quote, no_vig, card.vector.get(key));
        if decision.passes {
            outcome.passes.push(decision);
        } else {
            outcome.near_misses.push(decision);
        }
    }

    outcome.passes.sort_by(|a, b| b.edge.total_cmp(&a.edge));
    outcome.near_misses.sort_by(|a, b| a.shortfall.total_cmp(&b.shortfall));

    info!(
        candidates = candidates.len(),
        passes = outcome.passes.len(),
        near_misses = outcome.near_misses.len(),
        skipped = outcome.skipped.len(),
        "Candidate scan complete"
    );

    outcome
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
