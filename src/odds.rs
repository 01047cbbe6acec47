//! Bookmaker margin removal.
//!
//! Converts a two-sided decimal price pair into the de-margined ("no-vig")
//! probability of the quoted side, assuming the market has exactly two
//! outcomes.

use crate::types::OddsQuote;

/// Raw no-vig probability of the `price` side.
///
/// Returns NaN when both implied probabilities vanish (infinite prices).
/// Prefer [`checked_no_vig`] unless the caller handles NaN itself.
pub fn no_vig_probability(price: f64, opposite_price: f64) -> f64 {
    let a = 1.0 / price;
    let b = 1.0 / opposite_price.abs();
    let sum = a + b;
    if sum == 0.0 {
        return f64::NAN;
    }
    a / sum
}

/// No-vig probability, or `None` for invalid prices or a degenerate result.
pub fn checked_no_vig(price: f64, opposite_price: f64) -> Option<f64> {
    if !(price > 1.0 && opposite_price > 1.0) {
        return None;
    }
    let p = no_vig_probability(price, opposite_price);
    p.is_finite().then_some(p)
}

impl OddsQuote {
    /// De-margined probability of this quote's side; `None` for invalid quotes.
    pub fn no_vig(&self) -> Option<f64> {
        if !self.is_valid() {
            return None;
        }
        checked_no_vig(self.price, self.opposite_price)
    }

    /// Bookmaker overround: implied probabilities summed, minus one.
    pub fn margin(&self) -> Option<f64> {
        self.is_valid()
            .then(|| 1.0 / self.price + 1.0 / self.opposite_price - 1.0)
    }
}
