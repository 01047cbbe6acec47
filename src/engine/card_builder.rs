//! Card orchestration.
//!
//! Builds the bookmaker anchor, fans out to every configured prior
//! provider concurrently, converts the priors that came back, blends
//! everything and packages the report with per-source notes.

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::anchor::build_anchor_card;
use super::blend::blend;
use crate::config::AppConfig;
use crate::priors::convert::{prior_to_card, prior_to_vector};
use crate::priors::http::HttpPriorProvider;
use crate::priors::PriorProvider;
use crate::types::{
    CardReport, CardRequest, GoalcardError, PCard, ProviderPrior, Reason, RoutingHints,
    SourceSummary, WeightedCard,
};

/// Settled result of one provider call.
#[derive(Debug)]
enum ProviderOutcome {
    Skipped,
    Prior(ProviderPrior),
    Failed(String),
}

/// Orchestrates anchor → providers → blend for one request at a time.
///
/// Holds no per-request state; share it behind an `Arc`.
pub struct CardBuilder {
    providers: Vec<Arc<dyn PriorProvider>>,
    anchor_weight: f64,
    provider_timeout: Duration,
}

impl CardBuilder {
    /// `anchor_weight` should be positive; a zero or negative anchor counts
    /// as weightless in the blend and the report carries a `signal` reason.
    pub fn new(anchor_weight: f64, provider_timeout: Duration) -> Self {
        Self {
            providers: Vec::new(),
            anchor_weight,
            provider_timeout,
        }
    }

    /// Build from config, constructing one HTTP provider per configured source.
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        cfg.validate()?;
        let timeout = cfg.providers.timeout();
        let mut builder = Self::new(cfg.anchor.weight, timeout);
        for source in &cfg.providers.sources {
            let provider = HttpPriorProvider::from_config(source, timeout)?;
            info!(
                provider = %source.name,
                enabled = provider.is_enabled(),
                hint = ?source.hint,
                "Prior provider registered"
            );
            builder = builder.with_provider(Arc::new(provider));
        }
        Ok(builder)
    }

    pub fn with_provider(mut self, provider: Arc<dyn PriorProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Build a card report for `request`.
    ///
    /// Only request validation fails; provider problems are reported in
    /// the returned sources.
    pub async fn build(&self, request: &CardRequest) -> Result<CardReport, GoalcardError> {
        request.validate()?;
        let fixture = request.fixture_name();
        let span = info_span!("card", request_id = %Uuid::new_v4(), fixture = %fixture);
        Ok(self.build_validated(request, fixture).instrument(span).await)
    }

    async fn build_validated(&self, request: &CardRequest, fixture: String) -> CardReport {
        let anchor = build_anchor_card(&request.markets, self.anchor_weight);
        let hints = request.routing_hints();

        let outcomes = self.fetch_all(&hints).await;

        let mut blend_cards: Vec<WeightedCard> = vec![anchor.clone()];
        let mut reported: Vec<WeightedCard> = vec![anchor.clone()];
        let (mut contributed, mut skipped, mut failed) = (0usize, 0usize, 0usize);

        for (provider, outcome) in self.providers.iter().zip(outcomes) {
            match outcome {
                ProviderOutcome::Skipped => skipped += 1,
                ProviderOutcome::Prior(prior) => {
                    let card = prior_to_card(&prior);
                    contributed += 1;
                    blend_cards.push(card.clone());
                    reported.push(card);
                }
                ProviderOutcome::Failed(message) => {
                    failed += 1;
                    reported.push(failure_card(provider.name(), &message));
                }
            }
        }

        let result = blend(&blend_cards);

        let mut reasons = vec![
            Reason::new("anchor", anchor.note.clone()),
            Reason::new(
                "providers",
                format!(
                    "{contributed} of {} provider(s) contributed ({skipped} skipped, {failed} failed)",
                    self.providers.len()
                ),
            ),
            Reason::new("coverage", format!("coverage {:.0}%", result.coverage * 100.0)),
            Reason::new(
                "disagreement",
                format!("disagreement {:.0}%", result.disagreement * 100.0),
            ),
        ];
        if !result.has_signal() {
            reasons.push(Reason::new("signal", "no usable signal: every source had zero weight"));
        }

        let report = CardReport {
            fixture,
            p_card: PCard {
                vector: result.vector,
                coverage: result.coverage,
            },
            sources: reported
                .into_iter()
                .map(|card| SourceSummary {
                    name: card.source,
                    weight: card.weight,
                    sample: card.vector.to_percentages(),
                    note: card.note,
                })
                .collect(),
            disagreement: result.disagreement,
            reasons,
            generated_at: Utc::now(),
        };

        info!(
            sources = report.sources.len(),
            contributed,
            skipped,
            failed,
            coverage = format!("{:.0}%", report.p_card.coverage * 100.0),
            disagreement = format!("{:.0}%", report.disagreement * 100.0),
            "Card built"
        );

        report
    }

    /// Call every provider concurrently, each on its own task, so neither
    /// an error nor a panic in one provider affects another.
    async fn fetch_all(&self, hints: &RoutingHints) -> Vec<ProviderOutcome> {
        let tasks: Vec<_> = self
            .providers
            .iter()
            .map(|p| {
                let provider = Arc::clone(p);
                let hints = hints.clone();
                let timeout = self.provider_timeout;
                tokio::spawn(
                    async move { call_provider(provider.as_ref(), &hints, timeout).await }
                        .in_current_span(),
                )
            })
            .collect();

        futures::future::join_all(tasks)
            .await
            .into_iter()
            .zip(&self.providers)
            .map(|(joined, provider)| {
                joined.unwrap_or_else(|e| {
                    let message = task_failure_message(e);
                    warn!(provider = provider.name(), error = %message, "Provider task aborted");
                    ProviderOutcome::Failed(message)
                })
            })
            .collect()
    }
}

async fn call_provider(
    provider: &dyn PriorProvider,
    hints: &RoutingHints,
    timeout: Duration,
) -> ProviderOutcome {
    let name = provider.name();
    match tokio::time::timeout(timeout, provider.fetch_prior(hints)).await {
        Ok(Ok(Some(mut prior))) => {
            if let Some(field) = prior.non_finite_field() {
                let e = GoalcardError::Provider {
                    provider: name.to_string(),
                    message: format!("non-finite {field} in prior"),
                };
                warn!(provider = name, error = %e, "Provider returned unusable prior");
                return ProviderOutcome::Failed(e.to_string());
            }
            if prior.source.is_empty() {
                prior.source = name.to_string();
            }
            debug!(provider = name, weight = prior.weight, "Prior received");
            ProviderOutcome::Prior(prior)
        }
        Ok(Ok(None)) => {
            debug!(provider = name, "Provider skipped");
            ProviderOutcome::Skipped
        }
        Ok(Err(e)) => {
            warn!(provider = name, error = %e, "Provider failed");
            ProviderOutcome::Failed(format!("{e:#}"))
        }
        Err(_) => {
            let e = GoalcardError::ProviderTimeout {
                provider: name.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            };
            warn!(provider = name, error = %e, "Provider timed out");
            ProviderOutcome::Failed(e.to_string())
        }
    }
}

fn task_failure_message(err: JoinError) -> String {
    if !err.is_panic() {
        return format!("provider task cancelled: {err}");
    }
    let payload = err.into_panic();
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("provider panicked: {detail}")
}

/// Zero-weight league-average card marking a failed provider.
fn failure_card(provider: &str, message: &str) -> WeightedCard {
    WeightedCard {
        vector: prior_to_vector(&ProviderPrior::baseline(provider, 0.0)),
        weight: 0.0,
        source: provider.to_string(),
        note: format!("failed: {message}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
