//! OAuth refresh-token exchange and authorized JSON transport over
//! [`reqwest`].

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::Value;

use crate::config::CrmConfig;
use crate::gateway::{extract_error_message, AccessToken, CrmError, CrmGateway, Method};

/// Body of the OAuth token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

/// HTTP implementation of [`CrmGateway`].
///
/// Holds no mutable state; a token is fetched for every call to
/// [`CrmGateway::access_token`].
pub struct CrmClient {
    client: reqwest::Client,
    config: CrmConfig,
}

impl CrmClient {
    /// Create a client whose requests time out after the configured
    /// per-call timeout.
    pub fn new(config: CrmConfig) -> Result<Self, CrmError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Read a body as JSON. Empty bodies become `Null`.
    async fn read_json(response: reqwest::Response) -> Result<Value, CrmError> {
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| CrmError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CrmGateway for CrmClient {
    async fn access_token(&self) -> Result<AccessToken, CrmError> {
        let form = [
            ("refresh_token", self.config.refresh_token.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(self.config.token_url())
            .form(&form)
            .send()
            .await
            .map_err(|e| CrmError::Token(format!("Unable to reach CRM token endpoint: {e}")))?;

        let status = response.status();
        let body: Option<TokenResponse> = response.json().await.ok();

        match body {
            Some(TokenResponse {
                access_token: Some(token),
                ..
            }) if status.is_success() && !token.is_empty() => {
                tracing::debug!("Obtained CRM access token");
                Ok(AccessToken::new(token))
            }
            other => {
                let reason = other
                    .and_then(|b| b.error)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
                tracing::warn!(status = status.as_u16(), %reason, "CRM token exchange failed");
                Err(CrmError::Token(format!("Unable to get CRM access token: {reason}")))
            }
        }
    }

    async fn request(
        &self,
        token: &AccessToken,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, CrmError> {
        let mut request = self
            .client
            .request(method.clone(), self.config.api_url(path))
            .header(
                AUTHORIZATION,
                format!("{} {}", self.config.auth_scheme, token.secret()),
            );
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let json = Self::read_json(response).await.unwrap_or(Value::Null);
            let message = extract_error_message(status.as_u16(), &json);
            tracing::warn!(%method, path, status = status.as_u16(), %message, "CRM request failed");
            return Err(CrmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Self::read_json(response).await
    }
}
