//! Shared types for the GOALCARD engine.
//!
//! These types form the data model used across all modules.
//! They are deliberately plain data so that the odds, prior, engine and
//! strategy modules can depend on them without circular references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Outcome keys
// ---------------------------------------------------------------------------

/// The closed set of goal-total outcomes every card is expressed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OutcomeKey {
    #[serde(rename = "O15")]
    Over15,
    #[serde(rename = "O25")]
    Over25,
    #[serde(rename = "U35")]
    Under35,
    #[serde(rename = "U45")]
    Under45,
    #[serde(rename = "HT_O05")]
    HalfTimeOver05,
    #[serde(rename = "HOME_O15")]
    HomeOver15,
    #[serde(rename = "AWAY_O05")]
    AwayOver05,
}

impl OutcomeKey {
    /// All outcome keys in canonical order.
    pub const ALL: [OutcomeKey; 7] = [
        OutcomeKey::Over15,
        OutcomeKey::Over25,
        OutcomeKey::Under35,
        OutcomeKey::Under45,
        OutcomeKey::HalfTimeOver05,
        OutcomeKey::HomeOver15,
        OutcomeKey::AwayOver05,
    ];

    /// Wire identifier (`O15`, `HT_O05`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKey::Over15 => "O15",
            OutcomeKey::Over25 => "O25",
            OutcomeKey::Under35 => "U35",
            OutcomeKey::Under45 => "U45",
            OutcomeKey::HalfTimeOver05 => "HT_O05",
            OutcomeKey::HomeOver15 => "HOME_O15",
            OutcomeKey::AwayOver05 => "AWAY_O05",
        }
    }

    /// Bookmaker market label for this outcome, as quoted in odds rows.
    pub fn market_label(&self) -> &'static str {
        match self {
            OutcomeKey::Over15 => "FT Over 1.5",
            OutcomeKey::Over25 => "FT Over 2.5",
            OutcomeKey::Under35 => "FT Under 3.5",
            OutcomeKey::Under45 => "FT Under 4.5",
            OutcomeKey::HalfTimeOver05 => "HT Over 0.5",
            OutcomeKey::HomeOver15 => "Home Over 1.5",
            OutcomeKey::AwayOver05 => "Away Over 0.5",
        }
    }

    /// Resolve a quoted market label (case and whitespace insensitive).
    pub fn from_market_label(label: &str) -> Option<Self> {
        let wanted = normalize_label(label);
        Self::ALL
            .into_iter()
            .find(|key| normalize_label(key.market_label()) == wanted)
    }
}

impl fmt::Display for OutcomeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lowercase and strip all whitespace so `" ft  OVER 1.5"` matches `"FT Over 1.5"`.
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

// ---------------------------------------------------------------------------
// Probability vector
// ---------------------------------------------------------------------------

/// One probability per outcome key.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProbabilityVector {
    #[serde(rename = "O15")]
    pub over_15: f64,
    #[serde(rename = "O25")]
    pub over_25: f64,
    #[serde(rename = "U35")]
    pub under_35: f64,
    #[serde(rename = "U45")]
    pub under_45: f64,
    #[serde(rename = "HT_O05")]
    pub ht_over_05: f64,
    #[serde(rename = "HOME_O15")]
    pub home_over_15: f64,
    #[serde(rename = "AWAY_O05")]
    pub away_over_05: f64,
}

impl ProbabilityVector {
    /// Build a vector by evaluating `f` for every outcome key.
    pub fn from_fn(mut f: impl FnMut(OutcomeKey) -> f64) -> Self {
        let mut v = Self::default();
        for key in OutcomeKey::ALL {
            v.set(key, f(key));
        }
        v
    }

    pub fn get(&self, key: OutcomeKey) -> f64 {
        match key {
            OutcomeKey::Over15 => self.over_15,
            OutcomeKey::Over25 => self.over_25,
            OutcomeKey::Under35 => self.under_35,
            OutcomeKey::Under45 => self.under_45,
            OutcomeKey::HalfTimeOver05 => self.ht_over_05,
            OutcomeKey::HomeOver15 => self.home_over_15,
            OutcomeKey::AwayOver05 => self.away_over_05,
        }
    }

    pub fn set(&mut self, key: OutcomeKey, value: f64) {
        let slot = match key {
            OutcomeKey::Over15 => &mut self.over_15,
            OutcomeKey::Over25 => &mut self.over_25,
            OutcomeKey::Under35 => &mut self.under_35,
            OutcomeKey::Under45 => &mut self.under_45,
            OutcomeKey::HalfTimeOver05 => &mut self.ht_over_05,
            OutcomeKey::HomeOver15 => &mut self.home_over_15,
            OutcomeKey::AwayOver05 => &mut self.away_over_05,
        };
        *slot = value;
    }

    /// `(key, value)` pairs in canonical key order.
    pub fn iter(&self) -> impl Iterator<Item = (OutcomeKey, f64)> + '_ {
        OutcomeKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }

    /// Same vector expressed in percent, rounded to one decimal.
    pub fn to_percentages(&self) -> Self {
        Self::from_fn(|key| round1(self.get(key) * 100.0))
    }
}

impl fmt::Display for ProbabilityVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(key, p)| format!("{key}={:.1}%", p * 100.0))
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// A two-outcome market quote in decimal odds (e.g. Over 2.5 vs Under 2.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OddsQuote {
    pub label: String,
    pub price: f64,
    pub opposite_price: f64,
}

impl OddsQuote {
    pub fn new(label: impl Into<String>, price: f64, opposite_price: f64) -> Self {
        Self {
            label: label.into(),
            price,
            opposite_price,
        }
    }

    /// Both prices must be finite decimal odds above 1.0.
    pub fn is_valid(&self) -> bool {
        self.price.is_finite()
            && self.opposite_price.is_finite()
            && self.price > 1.0
            && self.opposite_price > 1.0
    }

    /// The outcome this quote prices, if its label is recognized.
    pub fn outcome(&self) -> Option<OutcomeKey> {
        OutcomeKey::from_market_label(&self.label)
    }
}

impl fmt::Display for OddsQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {:.2} / {:.2}", self.label, self.price, self.opposite_price)
    }
}

/// Team-strength and tempo ratings from an external provider.
///
/// Relative ratings are centred on 1.0 (league average). For attack ratings
/// higher is stronger; for defense ratings lower is stronger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderPrior {
    pub source: String,
    /// Expected combined goals.
    pub tempo: f64,
    pub home_attack_rel: f64,
    pub away_attack_rel: f64,
    pub home_defense_rel: f64,
    pub away_defense_rel: f64,
    pub weight: f64,
}

impl ProviderPrior {
    /// A league-average prior: tempo 2.45 and every rating at 1.0.
    pub fn baseline(source: impl Into<String>, weight: f64) -> Self {
        Self {
            source: source.into(),
            tempo: 2.45,
            home_attack_rel: 1.0,
            away_attack_rel: 1.0,
            home_defense_rel: 1.0,
            away_defense_rel: 1.0,
            weight,
        }
    }

    /// Wire name of the first NaN or infinite field, if any.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("tempo", self.tempo),
            ("homeAttackRel", self.home_attack_rel),
            ("awayAttackRel", self.away_attack_rel),
            ("homeDefenseRel", self.home_defense_rel),
            ("awayDefenseRel", self.away_defense_rel),
            ("weight", self.weight),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite())
        .map(|(name, _)| name)
    }
}

/// Hints passed to every provider so it can locate the fixture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingHints {
    pub home: Option<String>,
    pub away: Option<String>,
    pub league_code: Option<String>,
    pub league_id: Option<String>,
    pub fixture_key: Option<String>,
}

/// A probability vector tagged with its blend weight and provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedCard {
    pub vector: ProbabilityVector,
    pub weight: f64,
    pub source: String,
    pub note: String,
}

/// Consensus vector plus the two confidence scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendResult {
    pub vector: ProbabilityVector,
    /// In [0.40, 0.95].
    pub coverage: f64,
    /// In [0, 1].
    pub disagreement: f64,
    /// Raw (un-normalized) weight sum of the blended cards.
    pub total_weight: f64,
}

impl BlendResult {
    /// False when every card carried zero weight and the consensus is all-zero.
    pub fn has_signal(&self) -> bool {
        self.total_weight > 0.0
    }
}

// ---------------------------------------------------------------------------
// Request / report
// ---------------------------------------------------------------------------

/// Inbound card request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRequest {
    #[serde(default)]
    pub fixture: Option<String>,
    #[serde(default)]
    pub home: Option<String>,
    #[serde(default)]
    pub away: Option<String>,
    #[serde(default)]
    pub markets: Vec<OddsQuote>,
    #[serde(default)]
    pub league_code: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub league_id: Option<String>,
    #[serde(default)]
    pub fixture_key: Option<String>,
}

impl CardRequest {
    /// Reject requests the engine cannot price at all.
    pub fn validate(&self) -> Result<(), GoalcardError> {
        if self.markets.is_empty() {
            return Err(GoalcardError::InvalidRequest(
                "markets must be a non-empty array of {label, price, oppositePrice}".into(),
            ));
        }
        Ok(())
    }

    /// Display name of the fixture: explicit name, else "home vs away".
    pub fn fixture_name(&self) -> String {
        if let Some(name) = self.fixture.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            return name.to_string();
        }
        match (self.home.as_deref(), self.away.as_deref()) {
            (Some(h), Some(a)) => format!("{h} vs {a}"),
            (Some(h), None) => h.to_string(),
            (None, Some(a)) => a.to_string(),
            (None, None) => "unknown fixture".to_string(),
        }
    }

    pub fn routing_hints(&self) -> RoutingHints {
        RoutingHints {
            home: self.home.clone(),
            away: self.away.clone(),
            league_code: self.league_code.clone(),
            league_id: self.league_id.clone(),
            fixture_key: self.fixture_key.clone(),
        }
    }
}

/// Accept `"leagueId": 39` as well as `"leagueId": "39"`.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "leagueId must be a string or number, got {other}"
        ))),
    }
}

/// Blended probabilities plus coverage, as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PCard {
    #[serde(flatten)]
    pub vector: ProbabilityVector,
    pub coverage: f64,
}

/// Per-source annotation in a card report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub name: String,
    pub weight: f64,
    /// Source vector in percent.
    pub sample: ProbabilityVector,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reason {
    pub key: String,
    pub note: String,
}

impl Reason {
    pub fn new(key: &str, note: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            note: note.into(),
        }
    }
}

/// Full output of one card build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardReport {
    pub fixture: String,
    pub p_card: PCard,
    pub sources: Vec<SourceSummary>,
    pub disagreement: f64,
    pub reasons: Vec<Reason>,
    pub generated_at: DateTime<Utc>,
}

impl fmt::Display for CardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | coverage {:.0}% | disagreement {:.0}% | {} source(s)",
            self.fixture,
            self.p_card.vector,
            self.p_card.coverage * 100.0,
            self.disagreement * 100.0,
            self.sources.len(),
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for GOALCARD.
#[derive(Debug, thiserror::Error)]
pub enum GoalcardError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Provider error ({provider}): {message}")]
    Provider { provider: String, message: String },

    #[error("Provider timed out ({provider}) after {timeout_ms}ms")]
    ProviderTimeout { provider: String, timeout_ms: u64 },

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
