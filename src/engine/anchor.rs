//! Bookmaker anchor card.
//!
//! Turns raw quoted markets into a full probability vector. Every key the
//! bookmaker rows do not price (absent label, invalid prices, degenerate
//! normalization) falls back to a static default; the half-time key is
//! always derived from the full-time Over 1.5 value.

use std::collections::BTreeMap;
use tracing::debug;

use crate::types::{OddsQuote, OutcomeKey, ProbabilityVector, WeightedCard};

pub const ANCHOR_SOURCE: &str = "bookmaker";

/// Static fallback per priced key. `None` for the derived half-time key.
pub fn default_probability(key: OutcomeKey) -> Option<f64> {
    match key {
        OutcomeKey::Over15 => Some(0.82),
        OutcomeKey::Over25 => Some(0.62),
        OutcomeKey::Under35 => Some(0.72),
        OutcomeKey::Under45 => Some(0.78),
        OutcomeKey::HomeOver15 => Some(0.70),
        OutcomeKey::AwayOver05 => Some(0.66),
        OutcomeKey::HalfTimeOver05 => None,
    }
}

/// `clamp(0.70 × O15 + 0.05, 0.40, 0.95)`.
pub fn derive_half_time(over_15: f64) -> f64 {
    (0.70 * over_15 + 0.05).clamp(0.40, 0.95)
}

/// Build the anchor card from quoted markets.
///
/// The first valid quote for each recognized label wins.
pub fn build_anchor_card(markets: &[OddsQuote], weight: f64) -> WeightedCard {
    let mut priced: BTreeMap<OutcomeKey, f64> = BTreeMap::new();

    for quote in markets {
        let Some(key) = quote.outcome() else {
            debug!(label = %quote.label, "Unrecognized market label, ignored");
            continue;
        };
        if default_probability(key).is_none() || priced.contains_key(&key) {
            continue;
        }
        match quote.no_vig() {
            Some(p) => {
                priced.insert(key, p);
            }
            None => debug!(quote = %quote, "Invalid or degenerate quote, using default"),
        }
    }

    let mut defaulted = Vec::new();
    let mut vector = ProbabilityVector::from_fn(|key| match default_probability(key) {
        Some(fallback) => priced.get(&key).copied().unwrap_or_else(|| {
            defaulted.push(key.as_str());
            fallback
        }),
        None => 0.0,
    });
    vector.ht_over_05 = derive_half_time(vector.over_15);

    let priced_keys: Vec<&str> = priced.keys().map(OutcomeKey::as_str).collect();
    let mut note = format!(
        "no-vig from {}/6 markets ({})",
        priced.len(),
        if priced_keys.is_empty() { "none".to_string() } else { priced_keys.join(", ") },
    );
    if !defaulted.is_empty() {
        note.push_str(&format!("; defaults for {}", defaulted.join(", ")));
    }
    note.push_str("; HT_O05 derived from O15");

    WeightedCard {
        vector,
        weight,
        source: ANCHOR_SOURCE.to_string(),
        note,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
