//! Odds-band decision rule.
//!
//! Short prices need more confidence to be worth taking, so every price
//! band carries its own minimum blended probability and minimum edge over
//! the no-vig market probability.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::types::OddsQuote;

// ---------------------------------------------------------------------------
// Bands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OddsBand {
    #[serde(rename = "micro")]
    Micro,
    #[serde(rename = "1.18–1.30")]
    Short,
    #[serde(rename = "1.31–1.35")]
    Mid,
    #[serde(rename = "1.36–1.45")]
    Long,
    #[serde(rename = "outside")]
    Outside,
}

/// Pass thresholds for one band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandThresholds {
    pub min_blended_probability: f64,
    pub min_edge: f64,
}

struct BandRow {
    band: OddsBand,
    min_price: f64,
    max_price: f64,
    thresholds: BandThresholds,
}

/// Inclusive price ranges, in ascending order.
const BANDS: [BandRow; 4] = [
    BandRow {
        band: OddsBand::Micro,
        min_price: 1.11,
        max_price: 1.17,
        thresholds: BandThresholds { min_blended_probability: 0.90, min_edge: 0.10 },
    },
    BandRow {
        band: OddsBand::Short,
        min_price: 1.18,
        max_price: 1.30,
        thresholds: BandThresholds { min_blended_probability: 0.79, min_edge: 0.04 },
    },
    BandRow {
        band: OddsBand::Mid,
        min_price: 1.31,
        max_price: 1.35,
        thresholds: BandThresholds { min_blended_probability: 0.78, min_edge: 0.03 },
    },
    BandRow {
        band: OddsBand::Long,
        min_price: 1.36,
        max_price: 1.45,
        thresholds: BandThresholds { min_blended_probability: 0.78, min_edge: 0.03 },
    },
];

const OUTSIDE_THRESHOLDS: BandThresholds = BandThresholds {
    min_blended_probability: 0.78,
    min_edge: 0.10,
};

impl OddsBand {
    pub const ALL: [OddsBand; 5] = [
        OddsBand::Micro,
        OddsBand::Short,
        OddsBand::Mid,
        OddsBand::Long,
        OddsBand::Outside,
    ];

    /// Band for a decimal price. Gaps between bands (e.g. 1.171) and NaN are `Outside`.
    pub fn classify(price: f64) -> Self {
        BANDS
            .iter()
            .find(|row| price >= row.min_price && price <= row.max_price)
            .map(|row| row.band)
            .unwrap_or(OddsBand::Outside)
    }

    pub fn id(&self) -> &'static str {
        match self {
            OddsBand::Micro => "micro",
            OddsBand::Short => "1.18–1.30",
            OddsBand::Mid => "1.31–1.35",
            OddsBand::Long => "1.36–1.45",
            OddsBand::Outside => "outside",
        }
    }

    /// Inclusive price range, `None` for `Outside`.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        BANDS
            .iter()
            .find(|row| row.band == *self)
            .map(|row| (row.min_price, row.max_price))
    }

    pub fn thresholds(&self) -> BandThresholds {
        BANDS
            .iter()
            .find(|row| row.band == *self)
            .map(|row| row.thresholds)
            .unwrap_or(OUTSIDE_THRESHOLDS)
    }
}

impl fmt::Display for OddsBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Outcome of checking one candidate bet against its band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateDecision {
    pub quote: OddsQuote,
    pub no_vig_probability: f64,
    pub blended_probability: f64,
    /// `blended_probability − no_vig_probability`.
    pub edge: f64,
    pub band: OddsBand,
    pub passes: bool,
    /// Distance to passing; 0 when `passes`.
    pub shortfall: f64,
}

/// Evaluate a candidate quote given its no-vig and blended probabilities.
pub fn evaluate(quote: &OddsQuote, no_vig_probability: f64, blended_probability: f64) -> CandidateDecision {
    let band = OddsBand::classify(quote.price);
    let t = band.thresholds();
    let edge = blended_probability - no_vig_probability;
    let passes = blended_probability >= t.min_blended_probability && edge >= t.min_edge;
    let shortfall = if passes {
        0.0
    } else {
        (t.min_blended_probability - blended_probability).max(0.0) + (t.min_edge - edge).max(0.0)
    };

    debug!(
        label = %quote.label,
        price = quote.price,
        band = %band,
        blended = format!("{:.1}%", blended_probability * 100.0),
        edge = format!("{:+.1}%", edge * 100.0),
        passes,
        "Candidate evaluated"
    );

    CandidateDecision {
        quote: quote.clone(),
        no_vig_probability,
        blended_probability,
        edge,
        band,
        passes,
        shortfall,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
