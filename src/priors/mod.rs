//! External prior providers.
//!
//! Defines the `PriorProvider` trait and the conversion from a provider's
//! team-strength/tempo ratings into a full outcome probability vector.

pub mod convert;
pub mod http;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{ProviderPrior, RoutingHints};

/// Abstraction over external sources of team-strength priors.
///
/// `Ok(None)` means the provider is not configured for this request (no
/// credential, missing routing hint) and must be skipped silently. `Err`
/// means the call was attempted and failed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriorProvider: Send + Sync {
    /// Provider name for logging and source annotations.
    fn name(&self) -> &str;

    /// Fetch the prior for the fixture described by `hints`.
    async fn fetch_prior(&self, hints: &RoutingHints) -> Result<Option<ProviderPrior>>;
}
