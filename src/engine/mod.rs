//! Core engine — anchor construction, blending and card orchestration.

pub mod anchor;
pub mod blend;
pub mod card_builder;

pub use card_builder::CardBuilder;
