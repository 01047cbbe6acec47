//! GOALCARD — goal-total probability cards for football fixtures.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod odds;
pub mod priors;
pub mod engine;
pub mod strategy;
pub mod api;
