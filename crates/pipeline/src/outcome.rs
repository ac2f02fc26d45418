//! Interpretation of CRM create-record responses.
//!
//! The CRM answers a batch create with a `data` array holding one entry per
//! submitted record, in submission order. Entries are paired with inputs by
//! position.

use nzbn_core::error::CoreError;
use nzbn_core::types::{Entity, EntityOutcome};
use serde_json::Value;

/// Detail recorded when the batch response has fewer entries than inputs.
pub const NO_OUTCOME: &str = "CRM returned no outcome for this record";

/// Extract the id of the single created Contact.
pub fn contact_id_from(response: &Value) -> Result<String, CoreError> {
    let first = response.get("data").and_then(|d| d.get(0));

    if let Some(entry) = first {
        if !is_success(entry) && entry.get("status").is_some() {
            return Err(CoreError::Upstream {
                status: None,
                message: failure_detail(entry),
            });
        }
    }

    first
        .and_then(created_id)
        .ok_or_else(|| CoreError::Integrity("CRM did not return an identifier for the Contact".into()))
}

/// Pair each entity with its per-record outcome, preserving input order.
pub fn pair_outcomes(entities: &[Entity], response: &Value) -> Vec<EntityOutcome> {
    let records: &[Value] = response
        .get("data")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    entities
        .iter()
        .enumerate()
        .map(|(index, entity)| match records.get(index) {
            Some(record) if is_success(record) => EntityOutcome::success(entity, created_id(record)),
            Some(record) => EntityOutcome::failure(entity, failure_detail(record)),
            None => EntityOutcome::failure(entity, NO_OUTCOME),
        })
        .collect()
}

fn is_success(record: &Value) -> bool {
    record
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|s| s.eq_ignore_ascii_case("success"))
}

fn created_id(record: &Value) -> Option<String> {
    match record.get("details")?.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `"{code}: {message}"`, or whichever of the two is present.
fn failure_detail(record: &Value) -> String {
    let text = |key: &str| record.get(key).and_then(Value::as_str).filter(|s| !s.is_empty());
    match (text("code"), text("message")) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (None, Some(message)) => message.to_string(),
        (Some(code), None) => code.to_string(),
        (None, None) => "CRM rejected the record without detail".to_string(),
    }
}
