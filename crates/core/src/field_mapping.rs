//! Logical-to-CRM field name configuration.
//!
//! [`FieldMappingConfig`] is constructed once at process start and passed by
//! reference into the mapper and orchestrator. Every logical field can be
//! overridden from the environment or programmatically.

use std::collections::HashMap;
use std::fmt;

/// A logical record field, independent of the CRM's native naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalField {
    AccountName,
    AccountNzbn,
    AccountAddress,
    AccountStatus,
    AccountRole,
    AccountIncorporationDate,
    AccountContactLookup,
    ContactFirstName,
    ContactLastName,
    ContactEmail,
}

impl LogicalField {
    pub const ALL: [LogicalField; 10] = [
        LogicalField::AccountName,
        LogicalField::AccountNzbn,
        LogicalField::AccountAddress,
        LogicalField::AccountStatus,
        LogicalField::AccountRole,
        LogicalField::AccountIncorporationDate,
        LogicalField::AccountContactLookup,
        LogicalField::ContactFirstName,
        LogicalField::ContactLastName,
        LogicalField::ContactEmail,
    ];

    /// Dotted logical name, e.g. `account.role`.
    pub fn key(self) -> &'static str {
        match self {
            LogicalField::AccountName => "account.name",
            LogicalField::AccountNzbn => "account.nzbn",
            LogicalField::AccountAddress => "account.address",
            LogicalField::AccountStatus => "account.status",
            LogicalField::AccountRole => "account.role",
            LogicalField::AccountIncorporationDate => "account.incorporationDate",
            LogicalField::AccountContactLookup => "account.contactLookup",
            LogicalField::ContactFirstName => "contact.firstName",
            LogicalField::ContactLastName => "contact.lastName",
            LogicalField::ContactEmail => "contact.email",
        }
    }

    /// Environment variable that overrides this field's native name.
    pub fn env_var(self) -> &'static str {
        match self {
            LogicalField::AccountName => "CRM_FIELD_ACCOUNT_NAME",
            LogicalField::AccountNzbn => "CRM_FIELD_ACCOUNT_NZBN",
            LogicalField::AccountAddress => "CRM_FIELD_ACCOUNT_ADDRESS",
            LogicalField::AccountStatus => "CRM_FIELD_ACCOUNT_STATUS",
            LogicalField::AccountRole => "CRM_FIELD_ACCOUNT_ROLE",
            LogicalField::AccountIncorporationDate => "CRM_FIELD_ACCOUNT_INCORP_DATE",
            LogicalField::AccountContactLookup => "CRM_FIELD_ACCOUNT_CONTACT_LOOKUP",
            LogicalField::ContactFirstName => "CRM_FIELD_CONTACT_FIRST_NAME",
            LogicalField::ContactLastName => "CRM_FIELD_CONTACT_LAST_NAME",
            LogicalField::ContactEmail => "CRM_FIELD_CONTACT_EMAIL",
        }
    }

    /// Native name used when nothing is configured. An empty default
    /// disables the field.
    pub fn default_native(self) -> &'static str {
        match self {
            LogicalField::AccountName => "Account_Name",
            LogicalField::AccountNzbn => "NZBN",
            LogicalField::AccountAddress => "Billing_Street",
            LogicalField::AccountStatus => "Status",
            LogicalField::AccountRole => "Description",
            LogicalField::AccountIncorporationDate => "Description",
            LogicalField::AccountContactLookup => "",
            LogicalField::ContactFirstName => "First_Name",
            LogicalField::ContactLastName => "Last_Name",
            LogicalField::ContactEmail => "Email",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Mapping from logical field to CRM-native field identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMappingConfig {
    fields: HashMap<LogicalField, String>,
}

impl Default for FieldMappingConfig {
    fn default() -> Self {
        let fields = LogicalField::ALL
            .into_iter()
            .map(|f| (f, f.default_native().to_string()))
            .collect();
        Self { fields }
    }
}

impl FieldMappingConfig {
    /// Load overrides from the process environment.
    ///
    /// See [`LogicalField::env_var`] for the variable names.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load overrides through an arbitrary key/value lookup. Unset or empty
    /// values fall back to the default native name.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        for field in LogicalField::ALL {
            if let Some(native) = lookup(field.env_var()).filter(|v| !v.trim().is_empty()) {
                config.fields.insert(field, native.trim().to_string());
            }
        }
        config
    }

    /// Override one field. Passing an empty string disables it.
    pub fn with_field(mut self, field: LogicalField, native: impl Into<String>) -> Self {
        self.fields.insert(field, native.into());
        self
    }

    /// Native name for a logical field; empty when disabled.
    pub fn native(&self, field: LogicalField) -> &str {
        self.fields.get(&field).map(String::as_str).unwrap_or_default()
    }

    /// Native name by dotted logical key, e.g. `"account.nzbn"`.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        LogicalField::from_key(key).map(|f| self.native(f))
    }

    /// Whether role and incorporation date share one native field and must
    /// be merged into a single value.
    pub fn role_and_incorporation_collide(&self) -> bool {
        self.native(LogicalField::AccountRole) == self.native(LogicalField::AccountIncorporationDate)
    }
}
