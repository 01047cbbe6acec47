//! Generic HTTP prior provider.
//!
//! Calls a configured JSON endpoint that returns team-strength/tempo
//! ratings for a fixture. Each provider is keyed on one routing hint
//! (league code, league id or fixture key) and authenticates with a
//! bearer credential resolved from the environment at startup.
//!
//! Expected response body:
//! `{"tempo": 2.6, "homeAttackRel": 1.1, "awayAttackRel": 0.95,
//!   "homeDefenseRel": 0.9, "awayDefenseRel": 1.05, "weight": 0.25}`
//! (`weight` optional).

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::PriorProvider;
use crate::config::{AppConfig, ProviderSourceConfig, RoutingHintKind};
use crate::types::{GoalcardError, ProviderPrior, RoutingHints};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriorPayload {
    tempo: f64,
    home_attack_rel: f64,
    away_attack_rel: f64,
    home_defense_rel: f64,
    away_defense_rel: f64,
    #[serde(default)]
    weight: Option<f64>,
}

pub struct HttpPriorProvider {
    http: Client,
    name: String,
    url: String,
    credential: Option<SecretString>,
    weight: f64,
    hint: RoutingHintKind,
}

impl HttpPriorProvider {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        credential: Option<SecretString>,
        weight: f64,
        hint: RoutingHintKind,
        timeout: Duration,
    ) -> Result<Self> {
        let name = name.into();
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("GOALCARD/0.1.0")
            .build()
            .with_context(|| format!("Failed to build HTTP client for provider {name}"))?;
        Ok(Self {
            http,
            name,
            url: url.into(),
            credential,
            weight,
            hint,
        })
    }

    /// Build from config, resolving the credential env var now.
    pub fn from_config(cfg: &ProviderSourceConfig, timeout: Duration) -> Result<Self> {
        let credential = AppConfig::resolve_credential(cfg.credential_env.as_deref());
        Self::new(&cfg.name, &cfg.url, credential, cfg.weight, cfg.hint, timeout)
    }

    /// Whether a credential was configured.
    pub fn is_enabled(&self) -> bool {
        self.credential.is_some()
    }

    /// Request URL for `hints`, or `None` when the required hint is absent.
    fn request_url(&self, hints: &RoutingHints) -> Option<String> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(home) = hints.home.as_deref() {
            params.push(("home", home));
        }
        if let Some(away) = hints.away.as_deref() {
            params.push(("away", away));
        }
        if let Some(param) = self.hint.query_param() {
            let value = match self.hint {
                RoutingHintKind::LeagueCode => hints.league_code.as_deref(),
                RoutingHintKind::LeagueId => hints.league_id.as_deref(),
                RoutingHintKind::FixtureKey => hints.fixture_key.as_deref(),
                RoutingHintKind::None => None,
            };
            let value = value.map(str::trim).filter(|v| !v.is_empty())?;
            params.push((param, value));
        }

        if params.is_empty() {
            return Some(self.url.clone());
        }
        let query: Vec<String> = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect();
        let sep = if self.url.contains('?') { '&' } else { '?' };
        Some(format!("{}{sep}{}", self.url, query.join("&")))
    }

    fn prior_from_payload(&self, payload: PriorPayload) -> Result<ProviderPrior> {
        let fields = [
            payload.tempo,
            payload.home_attack_rel,
            payload.away_attack_rel,
            payload.home_defense_rel,
            payload.away_defense_rel,
        ];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(GoalcardError::Provider {
                provider: self.name.clone(),
                message: "non-finite rating in response".into(),
            }
            .into());
        }
        Ok(ProviderPrior {
            source: self.name.clone(),
            tempo: payload.tempo,
            home_attack_rel: payload.home_attack_rel,
            away_attack_rel: payload.away_attack_rel,
            home_defense_rel: payload.home_defense_rel,
            away_defense_rel: payload.away_defense_rel,
            weight: payload.weight.unwrap_or(self.weight).max(0.0),
        })
    }
}

#[async_trait]
impl PriorProvider for HttpPriorProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_prior(&self, hints: &RoutingHints) -> Result<Option<ProviderPrior>> {
        let Some(credential) = &self.credential else {
            debug!(provider = %self.name, "No credential configured, skipping");
            return Ok(None);
        };
        let Some(url) = self.request_url(hints) else {
            debug!(provider = %self.name, hint = ?self.hint, "Routing hint missing, skipping");
            return Ok(None);
        };

        debug!(provider = %self.name, url = %url, "Fetching prior");

        let resp = self
            .http
            .get(&url)
            .bearer_auth(credential.expose_secret())
            .send()
            .await
            .with_context(|| format!("Prior request failed for {}", self.name))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(GoalcardError::Provider {
                provider: self.name.clone(),
                message: format!("HTTP {status}: {}", body.chars().take(200).collect::<String>()),
            }
            .into());
        }

        let payload: PriorPayload = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse prior response from {}", self.name))?;

        self.prior_from_payload(payload).map(Some)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
