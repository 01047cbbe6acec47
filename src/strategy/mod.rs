//! Strategy — band thresholds and candidate scanning.

pub mod band;
pub mod scanner;

pub use band::{evaluate, CandidateDecision, OddsBand};
pub use scanner::{scan, ScanOutcome};
