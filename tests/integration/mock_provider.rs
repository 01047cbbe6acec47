//! Mock prior providers for integration testing.
//!
//! Deterministic `PriorProvider` implementations with controllable
//! latency and failure, all in-memory with no network access.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use goalcard::priors::PriorProvider;
use goalcard::types::{ProviderPrior, RoutingHints};

#[derive(Clone)]
enum Behaviour {
    Prior(ProviderPrior),
    Skip,
    Fail(String),
    Panic(String),
}

/// A scripted provider.
///
/// Returns the same answer on every call after an optional delay and
/// counts how often it was called.
pub struct MockProvider {
    name: String,
    behaviour: Behaviour,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl MockProvider {
    fn with(name: &str, behaviour: Behaviour) -> Self {
        Self {
            name: name.to_string(),
            behaviour,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always returns `prior`.
    pub fn returning(name: &str, prior: ProviderPrior) -> Self {
        Self::with(name, Behaviour::Prior(prior))
    }

    /// Always reports itself unavailable.
    pub fn skipping(name: &str) -> Self {
        Self::with(name, Behaviour::Skip)
    }

    /// Always fails with `message`.
    pub fn failing(name: &str, message: &str) -> Self {
        Self::with(name, Behaviour::Fail(message.to_string()))
    }

    /// Panics inside `fetch_prior`.
    pub fn panicking(name: &str, message: &str) -> Self {
        Self::with(name, Behaviour::Panic(message.to_string()))
    }

    /// Sleep for `delay` before answering.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Shared call counter, readable after the provider is moved into a builder.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl PriorProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_prior(&self, _hints: &RoutingHints) -> Result<Option<ProviderPrior>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.behaviour {
            Behaviour::Prior(prior) => Ok(Some(prior.clone())),
            Behaviour::Skip => Ok(None),
            Behaviour::Fail(message) => Err(anyhow!("{message}")),
            Behaviour::Panic(message) => panic!("{message}"),
        }
    }
}

/// A high-scoring fixture prior.
pub fn attacking_prior(source: &str, weight: f64) -> ProviderPrior {
    ProviderPrior {
        source: source.to_string(),
        tempo: 3.1,
        home_attack_rel: 1.35,
        away_attack_rel: 1.2,
        home_defense_rel: 1.15,
        away_defense_rel: 1.25,
        weight,
    }
}

/// A low-scoring fixture prior.
pub fn cagey_prior(source: &str, weight: f64) -> ProviderPrior {
    ProviderPrior {
        source: source.to_string(),
        tempo: 2.0,
        home_attack_rel: 0.8,
        away_attack_rel: 0.75,
        home_defense_rel: 0.85,
        away_defense_rel: 0.9,
        weight,
    }
}
