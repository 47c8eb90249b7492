//! postbox/crates/configs/src/lib.rs
//!
//! Layered configuration for the Postbox binary: built-in defaults, then an
//! optional `postbox.toml`, then `POSTBOX_*` environment variables. A `.env`
//! file is loaded first so local development can keep the API key out of the
//! shell profile.

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Author-presence policy, mapped onto the orchestrator's policy at wiring
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorPolicySetting {
    #[default]
    AllowAnonymous,
    RequireIdentity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// GraphQL endpoint URL.
    pub endpoint: String,
    /// Sent as `Authorization: Apikey <key>`.
    pub api_key: SecretString,
    /// Page size for the aggregate listing read.
    pub listing_limit: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionSettings {
    pub author_policy: AuthorPolicySetting,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub submission: SubmissionSettings,
}

impl AppConfig {
    /// Loads configuration from defaults, `postbox.toml` (optional), and
    /// `POSTBOX_*` environment variables (e.g. `POSTBOX_GATEWAY__API_KEY`).
    pub fn load() -> Result<Self, ConfigError> {
        if dotenvy::dotenv().is_ok() {
            tracing::debug!("loaded environment from .env");
        }

        Self::from_sources(
            config::File::with_name("postbox").required(false),
            config::Environment::with_prefix("POSTBOX")
                .prefix_separator("_")
                .separator("__"),
        )
    }

    /// Builds the layered stack over explicit sources: defaults, then the
    /// file, then the environment. Split out so tests can substitute an
    /// in-memory file and a fake environment map.
    fn from_sources<F>(file: F, env: config::Environment) -> Result<Self, ConfigError>
    where
        F: config::Source + Send + Sync + 'static,
    {
        let raw = config::Config::builder()
            .set_default("gateway.endpoint", "")?
            .set_default("gateway.api_key", "")?
            .set_default("gateway.listing_limit", 10_i64)?
            .set_default("submission.author_policy", "allow_anonymous")?
            .add_source(file)
            .add_source(env)
            .build()?;

        let parsed: AppConfig = raw.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.endpoint.is_empty() {
            return Err(ConfigError::Invalid(
                "gateway.endpoint is required (set POSTBOX_GATEWAY__ENDPOINT)".into(),
            ));
        }
        if self.gateway.listing_limit == 0 {
            return Err(ConfigError::Invalid(
                "gateway.listing_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
