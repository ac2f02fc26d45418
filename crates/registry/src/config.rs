use std::fmt;
use std::time::Duration;

/// Default registry entity search endpoint.
pub const DEFAULT_BASE_URL: &str =
    "https://api.business.govt.nz/services/v4/companies-office/entities";

/// Header used for subscription-key authentication.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// How the API key is attached to outbound registry requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStyle {
    /// `Ocp-Apim-Subscription-Key: <key>`
    SubscriptionKey,
    /// `Authorization: Bearer <key>`
    Bearer,
}

impl AuthStyle {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "subscription-key" | "subscription" | "key" => Some(AuthStyle::SubscriptionKey),
            "bearer" => Some(AuthStyle::Bearer),
            _ => None,
        }
    }
}

/// Registry adapter configuration.
///
/// | Env Var                 | Default                 |
/// |-------------------------|-------------------------|
/// | `REGISTRY_BASE_URL`     | [`DEFAULT_BASE_URL`]    |
/// | `REGISTRY_API_KEY`      | unset                   |
/// | `REGISTRY_AUTH_STYLE`   | `subscription-key`      |
/// | `REGISTRY_TIMEOUT_SECS` | `15`                    |
///
/// A missing API key is not a startup error; searches fail with a
/// configuration error until one is provided.
#[derive(Clone)]
pub struct RegistryConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub auth_style: AuthStyle,
    pub timeout: Duration,
}

impl RegistryConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let auth_style = get("REGISTRY_AUTH_STYLE")
            .and_then(|v| AuthStyle::parse(&v))
            .unwrap_or(AuthStyle::SubscriptionKey);

        let timeout_secs = get("REGISTRY_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(15);

        Self {
            base_url: get("REGISTRY_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: get("REGISTRY_API_KEY"),
            auth_style,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

impl fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("auth_style", &self.auth_style)
            .field("timeout", &self.timeout)
            .finish()
    }
}
