use std::fmt;
use std::time::Duration;

use nzbn_core::error::CoreError;

/// Credentials that must be present for the service to start.
pub const REQUIRED_ENV: [&str; 3] = ["CRM_CLIENT_ID", "CRM_CLIENT_SECRET", "CRM_REFRESH_TOKEN"];

/// Module names and API version used to build record paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmModules {
    pub contacts: String,
    pub accounts: String,
    pub api_version: String,
}

impl Default for CrmModules {
    fn default() -> Self {
        Self {
            contacts: "Contacts".into(),
            accounts: "Accounts".into(),
            api_version: "v6".into(),
        }
    }
}

impl CrmModules {
    /// Record path for a module, relative to the API domain.
    pub fn records_path(&self, module: &str) -> String {
        format!("/crm/{}/{module}", self.api_version)
    }

    pub fn contacts_path(&self) -> String {
        self.records_path(&self.contacts)
    }

    pub fn accounts_path(&self) -> String {
        self.records_path(&self.accounts)
    }
}

/// CRM gateway configuration loaded from environment variables.
///
/// | Env Var               | Default                       |
/// |-----------------------|-------------------------------|
/// | `CRM_CLIENT_ID`       | required                      |
/// | `CRM_CLIENT_SECRET`   | required                      |
/// | `CRM_REFRESH_TOKEN`   | required                      |
/// | `CRM_ACCOUNTS_DOMAIN` | `https://accounts.zoho.com`   |
/// | `CRM_API_DOMAIN`      | `https://www.zohoapis.com`    |
/// | `CRM_API_VERSION`     | `v6`                          |
/// | `CRM_AUTH_SCHEME`     | `Zoho-oauthtoken`             |
/// | `CRM_ACCOUNT_MODULE`  | `Accounts`                    |
/// | `CRM_CONTACT_MODULE`  | `Contacts`                    |
/// | `CRM_TIMEOUT_SECS`    | `15`                          |
#[derive(Clone)]
pub struct CrmConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub accounts_domain: String,
    pub api_domain: String,
    pub auth_scheme: String,
    pub modules: CrmModules,
    pub timeout: Duration,
}

impl CrmConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Fails with [`CoreError::Config`] naming every missing credential.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let missing: Vec<&str> = REQUIRED_ENV.into_iter().filter(|&key| get(key).is_none()).collect();
        if !missing.is_empty() {
            return Err(CoreError::Config(format!(
                "Missing required env vars: {}",
                missing.join(", ")
            )));
        }

        let defaults = CrmModules::default();
        let modules = CrmModules {
            contacts: get("CRM_CONTACT_MODULE").unwrap_or(defaults.contacts),
            accounts: get("CRM_ACCOUNT_MODULE").unwrap_or(defaults.accounts),
            api_version: get("CRM_API_VERSION").unwrap_or(defaults.api_version),
        };

        let timeout_secs: u64 = match get("CRM_TIMEOUT_SECS") {
            Some(v) => v
                .parse()
                .map_err(|_| CoreError::Config(format!("CRM_TIMEOUT_SECS must be a number, got '{v}'")))?,
            None => 15,
        };

        Ok(Self {
            client_id: get("CRM_CLIENT_ID").unwrap_or_default(),
            client_secret: get("CRM_CLIENT_SECRET").unwrap_or_default(),
            refresh_token: get("CRM_REFRESH_TOKEN").unwrap_or_default(),
            accounts_domain: get("CRM_ACCOUNTS_DOMAIN")
                .unwrap_or_else(|| "https://accounts.zoho.com".into()),
            api_domain: get("CRM_API_DOMAIN").unwrap_or_else(|| "https://www.zohoapis.com".into()),
            auth_scheme: get("CRM_AUTH_SCHEME").unwrap_or_else(|| "Zoho-oauthtoken".into()),
            modules,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// OAuth token endpoint on the accounts domain.
    pub fn token_url(&self) -> String {
        format!("{}/oauth/v2/token", self.accounts_domain.trim_end_matches('/'))
    }

    /// Absolute URL for a path on the API domain.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.api_domain.trim_end_matches('/'))
    }
}

impl fmt::Debug for CrmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrmConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("accounts_domain", &self.accounts_domain)
            .field("api_domain", &self.api_domain)
            .field("auth_scheme", &self.auth_scheme)
            .field("modules", &self.modules)
            .field("timeout", &self.timeout)
            .finish()
    }
}
