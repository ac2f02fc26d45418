//! The transport seam the import pipeline talks to.

use std::fmt;

use async_trait::async_trait;
use nzbn_core::error::CoreError;
use serde_json::Value;

pub use reqwest::Method;

/// A short-lived CRM access token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Errors from the CRM transport layer.
#[derive(Debug, thiserror::Error)]
pub enum CrmError {
    /// Exchanging the refresh token for an access token failed.
    #[error("{0}")]
    Token(String),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("CRM request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The CRM returned a non-2xx status code.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// A success response whose body could not be decoded.
    #[error("CRM returned an unreadable response: {0}")]
    Decode(String),
}

impl CrmError {
    /// HTTP status received from the CRM, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            CrmError::Api { status, .. } => Some(*status),
            CrmError::Request(e) => e.status().map(|s| s.as_u16()),
            CrmError::Token(_) | CrmError::Decode(_) => None,
        }
    }
}

impl From<CrmError> for CoreError {
    fn from(err: CrmError) -> Self {
        match err {
            CrmError::Token(msg) => CoreError::Auth(msg),
            CrmError::Decode(msg) => {
                CoreError::Integrity(format!("CRM returned an unreadable response: {msg}"))
            }
            other => CoreError::Upstream {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}

/// Obtains credentials and performs authorized JSON calls against the CRM.
#[async_trait]
pub trait CrmGateway: Send + Sync {
    /// Exchange the configured refresh token for an access token.
    async fn access_token(&self) -> Result<AccessToken, CrmError>;

    /// Send `body` to `path` (relative to the API domain) and return the
    /// parsed JSON response. Non-2xx responses become [`CrmError::Api`].
    async fn request(
        &self,
        token: &AccessToken,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, CrmError>;
}

/// Extract a human-readable message from a CRM error body.
///
/// Prefers the first entry of the `data` detail list, then a top-level
/// `message`, then a generic message carrying the status.
pub fn extract_error_message(status: u16, body: &Value) -> String {
    body.get("data")
        .and_then(|d| d.get(0))
        .and_then(|first| first.get("message"))
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("CRM request failed ({status})"))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn message_prefers_first_detail() {
        let body = json!({
            "data": [{ "code": "MANDATORY_NOT_FOUND", "message": "required field not found" }],
            "message": "top level"
        });
        assert_eq!(extract_error_message(400, &body), "required field not found");
    }

    #[test]
    fn message_falls_back_to_top_level() {
        let body = json!({ "code": "INVALID_TOKEN", "message": "invalid oauth token" });
        assert_eq!(extract_error_message(401, &body), "invalid oauth token");
    }

    #[test]
    fn message_falls_back_to_status() {
        assert_eq!(extract_error_message(500, &Value::Null), "CRM request failed (500)");
        assert_eq!(
            extract_error_message(502, &json!({ "data": [] })),
            "CRM request failed (502)"
        );
    }

    #[test]
    fn token_error_becomes_auth() {
        let err = CoreError::from(CrmError::Token("invalid_code".into()));
        assert_matches!(err, CoreError::Auth(msg) if msg == "invalid_code");
    }

    #[test]
    fn api_error_becomes_upstream_with_status() {
        let err = CoreError::from(CrmError::Api {
            status: 400,
            message: "invalid data".into(),
        });
        assert_matches!(err, CoreError::Upstream { status: Some(400), message } if message == "invalid data");
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = AccessToken::new("1000.abcdef");
        assert!(!format!("{token:?}").contains("abcdef"));
        assert_eq!(token.secret(), "1000.abcdef");
    }
}
