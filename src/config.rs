//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Provider credentials are referenced by env-var name in the config and
//! resolved once at startup, so provider enablement is fixed for the
//! lifetime of the process.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::time::Duration;

use crate::types::GoalcardError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub anchor: AnchorConfig,
    pub providers: ProvidersConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8787 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnchorConfig {
    /// Blend weight of the bookmaker anchor card.
    pub weight: f64,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self { weight: 0.40 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Per-provider call budget.
    pub timeout_secs: u64,
    pub sources: Vec<ProviderSourceConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 6,
            sources: Vec::new(),
        }
    }
}

impl ProvidersConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// One generic HTTP prior endpoint.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderSourceConfig {
    pub name: String,
    pub url: String,
    /// Env var holding the bearer credential. Unset or empty disables the provider.
    #[serde(default)]
    pub credential_env: Option<String>,
    /// Weight used when the endpoint does not return its own.
    pub weight: f64,
    /// Routing hint the endpoint requires to locate a fixture.
    #[serde(default)]
    pub hint: RoutingHintKind,
}

/// Which routing hint a provider keys its lookups on.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoutingHintKind {
    LeagueCode,
    LeagueId,
    FixtureKey,
    #[default]
    None,
}

impl RoutingHintKind {
    /// Query parameter name used when forwarding the hint.
    pub fn query_param(&self) -> Option<&'static str> {
        match self {
            RoutingHintKind::LeagueCode => Some("league_code"),
            RoutingHintKind::LeagueId => Some("league_id"),
            RoutingHintKind::FixtureKey => Some("fixture_key"),
            RoutingHintKind::None => None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents).context("Invalid TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), GoalcardError> {
        if !(self.anchor.weight.is_finite() && self.anchor.weight > 0.0) {
            return Err(GoalcardError::Config(format!(
                "anchor.weight must be positive, got {}",
                self.anchor.weight
            )));
        }
        if self.providers.timeout_secs == 0 {
            return Err(GoalcardError::Config(
                "providers.timeout_secs must be at least 1".into(),
            ));
        }
        let mut seen = HashSet::new();
        for source in &self.providers.sources {
            if !(source.weight.is_finite() && source.weight >= 0.0) {
                return Err(GoalcardError::Config(format!(
                    "provider {} has invalid weight {}",
                    source.name, source.weight
                )));
            }
            if !seen.insert(source.name.as_str()) {
                return Err(GoalcardError::Config(format!(
                    "duplicate provider name: {}",
                    source.name
                )));
            }
        }
        Ok(())
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }

    /// Resolve an optional credential env var; unset or blank yields `None`.
    pub fn resolve_credential(env_name: Option<&str>) -> Option<SecretString> {
        env_name
            .and_then(|name| Self::resolve_env(name).ok())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(SecretString::new)
    }
}
