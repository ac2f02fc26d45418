//! HTTP client for the company registry search API.
//!
//! Wraps the registry's entity search endpoint using [`reqwest`] and hands
//! the response body to [`normalize_response`].

use async_trait::async_trait;
use nzbn_core::error::CoreError;
use nzbn_core::types::{Entity, SearchQuery};
use reqwest::header::{ACCEPT, AUTHORIZATION};

use crate::config::{AuthStyle, RegistryConfig, SUBSCRIPTION_KEY_HEADER};
use crate::normalize::{normalize_response, NormalizeError};

const MISSING_API_KEY: &str = "Registry API key is not configured (set REGISTRY_API_KEY)";

/// Errors from the registry adapter.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The caller supplied no searchable field.
    #[error("{0}")]
    InvalidQuery(String),

    /// No API key is configured.
    #[error("Registry API key is not configured (set REGISTRY_API_KEY)")]
    MissingApiKey,

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("Registry request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The registry returned a non-2xx status code.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The body was not valid JSON or did not match a known shape.
    #[error("{0}")]
    Schema(#[from] NormalizeError),
}

impl From<RegistryError> for CoreError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::InvalidQuery(msg) => CoreError::Validation(msg),
            RegistryError::MissingApiKey => CoreError::Config(MISSING_API_KEY.to_string()),
            RegistryError::Request(e) => CoreError::Upstream {
                status: e.status().map(|s| s.as_u16()),
                message: format!("Registry request failed: {e}"),
            },
            RegistryError::Api { status, message } => CoreError::Upstream {
                status: Some(status),
                message,
            },
            RegistryError::Schema(e) => CoreError::Integrity(e.to_string()),
        }
    }
}

/// Search seam between HTTP handlers and the registry.
#[async_trait]
pub trait RegistrySearch: Send + Sync {
    /// Find entities associated with the queried person or identifier.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Entity>, RegistryError>;
}

/// Registry search client backed by [`reqwest`].
pub struct RegistryClient {
    client: reqwest::Client,
    config: RegistryConfig,
}

impl RegistryClient {
    /// Create a client with its own connection pool and the configured
    /// per-call timeout.
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn authorize(&self, request: reqwest::RequestBuilder, api_key: &str) -> reqwest::RequestBuilder {
        match self.config.auth_style {
            AuthStyle::SubscriptionKey => request.header(SUBSCRIPTION_KEY_HEADER, api_key),
            AuthStyle::Bearer => request.header(AUTHORIZATION, format!("Bearer {api_key}")),
        }
    }
}

#[async_trait]
impl RegistrySearch for RegistryClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Entity>, RegistryError> {
        query
            .validate()
            .map_err(|e| RegistryError::InvalidQuery(e.user_message().to_string()))?;

        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(RegistryError::MissingApiKey)?;

        let params = query.present_fields();
        tracing::debug!(fields = params.len(), "Searching registry");

        let request = self
            .client
            .get(&self.config.base_url)
            .header(ACCEPT, "application/json")
            .query(&params);

        let response = self.authorize(request, api_key).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = upstream_message(status.as_u16(), &body);
            tracing::warn!(status = status.as_u16(), %message, "Registry search failed");
            return Err(RegistryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: serde_json::Value = response.json().await?;
        let entities = normalize_response(body)?;
        tracing::info!(count = entities.len(), "Registry search returned entities");
        Ok(entities)
    }
}

/// Pull a human-readable message out of a registry error body, falling
/// back to one naming the status.
fn upstream_message(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            ["message", "error", "title"]
                .iter()
                .find_map(|key| json.get(*key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("Registry request failed ({status})"))
}
