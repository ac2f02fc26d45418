//! Normalization of registry response bodies into canonical [`Entity`]
//! values.
//!
//! The registry has returned several envelope shapes over time. They are
//! modelled as one untagged enum so the accepted shapes are explicit. Each
//! entry is read as a plain object and validated field by field, taking the
//! first non-empty spelling of every attribute.

use std::collections::HashSet;

use nzbn_core::types::{Entity, EntityRole, EntityStatus};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Address object keys joined, in this order, into a single line.
const ADDRESS_PARTS: &[&str] = &[
    "address1", "address2", "address3", "address4", "suburb", "city", "postCode", "country",
];

/// Errors raised while validating a registry response body.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NormalizeError {
    /// The body did not match any known envelope.
    #[error("Unrecognised registry response shape: {0}")]
    UnrecognisedShape(String),

    /// An entry lacked a required attribute.
    #[error("Registry entity #{index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },
}

// ── Wire shapes ──────────────────────────────────────────────────────

/// One upstream entry, kept as a raw object. Attributes are read through
/// [`FieldKeys`] so an entry may carry several spellings of the same field.
type RawEntry = Map<String, Value>;

/// Accepted response envelopes, tried in declaration order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RegistryEnvelope {
    /// `{ "results": { "entities": [...] } }` (canonical)
    Results { results: ResultsBody },
    /// `{ "items": [...] }`
    Items { items: Vec<RawEntry> },
    /// `{ "list": [...] }`
    List { list: Vec<RawEntry> },
    /// `[...]`
    Bare(Vec<RawEntry>),
}

#[derive(Debug, Deserialize)]
struct ResultsBody {
    #[serde(default)]
    entities: Vec<RawEntry>,
}

impl RegistryEnvelope {
    fn into_entries(self) -> Vec<RawEntry> {
        match self {
            RegistryEnvelope::Results { results } => results.entities,
            RegistryEnvelope::Items { items } => items,
            RegistryEnvelope::List { list } => list,
            RegistryEnvelope::Bare(entries) => entries,
        }
    }
}

/// Upstream spellings of one attribute, most preferred first.
type FieldKeys = &'static [&'static str];

const ID: FieldKeys = &["id", "entityId", "entity_id"];
const NAME: FieldKeys = &["name", "entityName", "entity_name"];
const IDENTIFIER: FieldKeys = &["identifier", "nzbn", "businessNumber"];
const STATUS: FieldKeys = &["status", "entityStatus", "entityStatusDescription"];
const INCORPORATION_DATE: FieldKeys = &["incorporationDate", "registrationDate", "incorporatedDate"];
const ADDRESS: FieldKeys = &["address", "registeredAddress"];
const ROLE: FieldKeys = &["role", "roleType"];
const INDIVIDUAL_NAME: FieldKeys = &["individualName", "personName", "fullName"];
const SHARE_ALLOCATION: FieldKeys = &["shareAllocation", "sharePercentage"];

/// First non-empty value among `keys`, rendered by `render`.
fn pick(entry: &RawEntry, keys: FieldKeys, render: fn(Option<Value>) -> Option<String>) -> Option<String> {
    keys.iter().find_map(|key| render(entry.get(*key).cloned()))
}

fn into_entity(entry: RawEntry, index: usize) -> Result<Entity, NormalizeError> {
    let missing = |field| NormalizeError::MissingField { index, field };
    let text = |keys| pick(&entry, keys, scalar_text);

    let identifier = text(IDENTIFIER).ok_or_else(|| missing("identifier"))?;
    let id = text(ID).unwrap_or_else(|| identifier.clone());
    let name = text(NAME).ok_or_else(|| missing("name"))?;
    let status = text(STATUS).ok_or_else(|| missing("status"))?;
    let role = text(ROLE).ok_or_else(|| missing("role"))?;
    let individual_name = text(INDIVIDUAL_NAME).ok_or_else(|| missing("individualName"))?;

    Ok(Entity {
        id,
        name,
        identifier,
        status: EntityStatus::from(status),
        incorporation_date: text(INCORPORATION_DATE),
        address: pick(&entry, ADDRESS, address_text),
        role: EntityRole::from(role),
        individual_name,
        share_allocation: pick(&entry, SHARE_ALLOCATION, share_text),
    })
}

// ── Public API ───────────────────────────────────────────────────────

/// Convert a registry response body into the canonical entity list.
///
/// Entry order is preserved. Ids are made unique within the result set.
pub fn normalize_response(body: Value) -> Result<Vec<Entity>, NormalizeError> {
    let envelope: RegistryEnvelope = serde_json::from_value(body)
        .map_err(|e| NormalizeError::UnrecognisedShape(e.to_string()))?;

    let mut entities = envelope
        .into_entries()
        .into_iter()
        .enumerate()
        .map(|(index, entry)| into_entity(entry, index))
        .collect::<Result<Vec<_>, _>>()?;

    ensure_unique_ids(&mut entities);
    Ok(entities)
}

/// The same entity can appear once per role. Later duplicates get the role
/// appended to their id, falling back to their position and then to the
/// next unused position.
fn ensure_unique_ids(entities: &mut [Entity]) {
    let mut seen = HashSet::new();
    for (index, entity) in entities.iter_mut().enumerate() {
        if seen.insert(entity.id.clone()) {
            continue;
        }
        let base = entity.id.clone();
        let mut candidate = format!("{base}#{}", entity.role.as_str().to_ascii_lowercase());
        let mut position = index;
        while seen.contains(&candidate) {
            candidate = format!("{base}#{position}");
            position += 1;
        }
        seen.insert(candidate.clone());
        entity.id = candidate;
    }
}

// ── Value helpers ────────────────────────────────────────────────────

fn scalar_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn address_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Object(map) => {
            let parts: Vec<String> = ADDRESS_PARTS
                .iter()
                .filter_map(|key| scalar_text(map.get(*key).cloned()))
                .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        other => scalar_text(Some(other)),
    }
}

/// Numeric allocations are percentages; strings pass through unchanged.
fn share_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Number(n) => Some(format!("{n}%")),
        other => scalar_text(Some(other)),
    }
}
