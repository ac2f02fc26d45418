//! Request-scoped value objects for registry search and CRM import.
//!
//! Nothing here is persisted. All types serialize with camelCase keys, which
//! is the wire format of the inbound HTTP API.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ── Person ───────────────────────────────────────────────────────────

/// The individual being searched for and imported as a CRM Contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default)]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Person {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: Some(last_name.into()),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

// ── Entity status / role ─────────────────────────────────────────────

/// Registration status of a registry entity.
///
/// Only the registry's exact spellings map to named variants; any other text
/// is kept verbatim in `Other`, so [`EntityStatus::as_str`] always returns
/// what the registry sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityStatus {
    Registered,
    InLiquidation,
    Removed,
    Receivership,
    Other(String),
}

impl EntityStatus {
    pub fn as_str(&self) -> &str {
        match self {
            EntityStatus::Registered => "Registered",
            EntityStatus::InLiquidation => "In Liquidation",
            EntityStatus::Removed => "Removed",
            EntityStatus::Receivership => "Receivership",
            EntityStatus::Other(s) => s,
        }
    }
}

impl From<String> for EntityStatus {
    fn from(value: String) -> Self {
        match value.trim() {
            "Registered" => EntityStatus::Registered,
            "In Liquidation" => EntityStatus::InLiquidation,
            "Removed" => EntityStatus::Removed,
            "Receivership" => EntityStatus::Receivership,
            other => EntityStatus::Other(other.to_string()),
        }
    }
}

impl From<EntityStatus> for String {
    fn from(value: EntityStatus) -> Self {
        match value {
            EntityStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The searched person's relationship to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityRole {
    Director,
    Shareholder,
    Ceo,
    Secretary,
    Other(String),
}

impl EntityRole {
    pub fn as_str(&self) -> &str {
        match self {
            EntityRole::Director => "Director",
            EntityRole::Shareholder => "Shareholder",
            EntityRole::Ceo => "CEO",
            EntityRole::Secretary => "Secretary",
            EntityRole::Other(s) => s,
        }
    }
}

impl From<String> for EntityRole {
    fn from(value: String) -> Self {
        match value.trim() {
            "Director" => EntityRole::Director,
            "Shareholder" => EntityRole::Shareholder,
            "CEO" => EntityRole::Ceo,
            "Secretary" => EntityRole::Secretary,
            other => EntityRole::Other(other.to_string()),
        }
    }
}

impl From<EntityRole> for String {
    fn from(value: EntityRole) -> Self {
        match value {
            EntityRole::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EntityRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Entity ───────────────────────────────────────────────────────────

/// One registry business record annotated with the person's role in it.
///
/// `id` is unique within one search-result set. Inbound payloads may spell
/// the identifier `identifier` or `nzbn`; `identifier` wins when both are
/// non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "EntityPayload")]
pub struct Entity {
    pub id: String,
    pub name: String,
    /// Registry business number (NZBN).
    pub identifier: String,
    pub status: EntityStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incorporation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub role: EntityRole,
    pub individual_name: String,
    /// Percentage string, only meaningful when `role` is `Shareholder`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_allocation: Option<String>,
}

/// Inbound shape of [`Entity`], with each identifier spelling read as its
/// own key.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityPayload {
    id: String,
    name: String,
    #[serde(default)]
    identifier: Option<String>,
    #[serde(default)]
    nzbn: Option<String>,
    status: EntityStatus,
    #[serde(default)]
    incorporation_date: Option<String>,
    #[serde(default)]
    address: Option<String>,
    role: EntityRole,
    individual_name: String,
    #[serde(default)]
    share_allocation: Option<String>,
}

impl TryFrom<EntityPayload> for Entity {
    type Error = String;

    fn try_from(payload: EntityPayload) -> Result<Self, Self::Error> {
        let identifier = [payload.identifier, payload.nzbn]
            .into_iter()
            .flatten()
            .find(|v| !v.trim().is_empty())
            .ok_or_else(|| "missing field `identifier`".to_string())?;

        Ok(Self {
            id: payload.id,
            name: payload.name,
            identifier,
            status: payload.status,
            incorporation_date: payload.incorporation_date,
            address: payload.address,
            role: payload.role,
            individual_name: payload.individual_name,
            share_allocation: payload.share_allocation,
        })
    }
}

// ── Search ───────────────────────────────────────────────────────────

/// Registry search input. At least one field must be non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

impl SearchQuery {
    /// Non-empty query fields as `(wire_name, trimmed_value)` pairs, in a
    /// stable order. Empty fields are omitted rather than sent blank.
    pub fn present_fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("firstName", self.first_name.as_deref()),
            ("lastName", self.last_name.as_deref()),
            ("identifier", self.identifier.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            let value = value?.trim();
            (!value.is_empty()).then_some((key, value))
        })
        .collect()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.present_fields().is_empty() {
            return Err(CoreError::Validation(
                "Provide a first name, last name or identifier to search.".into(),
            ));
        }
        Ok(())
    }
}

// ── Import ───────────────────────────────────────────────────────────

/// A person plus the ordered, non-empty selection of entities to import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    #[serde(default)]
    pub person: Person,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl ImportRequest {
    /// Precondition check run before any outbound call.
    pub fn validate(&self) -> Result<(), CoreError> {
        let last_name = self.person.last_name.as_deref().unwrap_or_default();
        if self.person.first_name.trim().is_empty() || last_name.trim().is_empty() {
            return Err(CoreError::Validation(
                "First name and last name are required.".into(),
            ));
        }
        if self.entities.is_empty() {
            return Err(CoreError::Validation(
                "At least one entity must be selected.".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Failure,
}

/// Result of creating the Account for one selected entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityOutcome {
    pub entity_id: String,
    pub entity_name: String,
    pub status: OutcomeStatus,
    /// CRM id of the created Account, when the CRM reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl EntityOutcome {
    pub fn success(entity: &Entity, account_id: Option<String>) -> Self {
        Self {
            entity_id: entity.id.clone(),
            entity_name: entity.name.clone(),
            status: OutcomeStatus::Success,
            account_id,
            error_detail: None,
        }
    }

    pub fn failure(entity: &Entity, detail: impl Into<String>) -> Self {
        Self {
            entity_id: entity.id.clone(),
            entity_name: entity.name.clone(),
            status: OutcomeStatus::Failure,
            account_id: None,
            error_detail: Some(detail.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// Summary of one import: the Contact id plus per-entity outcomes in input
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub contact_id: String,
    pub per_entity_outcome: Vec<EntityOutcome>,
    pub created_accounts_count: usize,
}

impl ImportResult {
    /// Build a result, deriving `created_accounts_count` from the outcomes.
    pub fn new(contact_id: impl Into<String>, per_entity_outcome: Vec<EntityOutcome>) -> Self {
        let created_accounts_count = per_entity_outcome.iter().filter(|o| o.is_success()).count();
        Self {
            contact_id: contact_id.into(),
            per_entity_outcome,
            created_accounts_count,
        }
    }

    /// True when some, but not all, accounts were created.
    pub fn is_partial(&self) -> bool {
        self.created_accounts_count > 0
            && self.created_accounts_count < self.per_entity_outcome.len()
    }
}
