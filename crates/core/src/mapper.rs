//! Pure translation of [`Person`] and [`Entity`] values into CRM-shaped
//! records.
//!
//! A field is written only when both its value and its configured native
//! name are non-empty; partially-populated inputs produce partially-populated
//! records, never placeholder or null writes.

use serde_json::{json, Map, Value};

use crate::field_mapping::{FieldMappingConfig, LogicalField};
use crate::types::{Entity, EntityRole, Person};

/// A CRM record body keyed by native field name.
pub type CrmRecord = Map<String, Value>;

/// Last name written when the person has none; the CRM rejects a null
/// last name on Contacts.
pub const DEFAULT_LAST_NAME: &str = "Unknown";

/// Builds Contact and Account records according to a [`FieldMappingConfig`].
#[derive(Debug, Clone, Copy)]
pub struct FieldMapper<'a> {
    config: &'a FieldMappingConfig,
}

impl<'a> FieldMapper<'a> {
    pub fn new(config: &'a FieldMappingConfig) -> Self {
        Self { config }
    }

    pub fn build_contact_record(&self, person: &Person) -> CrmRecord {
        let mut record = CrmRecord::new();
        self.add_if_present(&mut record, LogicalField::ContactFirstName, Some(person.first_name.as_str()));

        let last_name = person
            .last_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_LAST_NAME);
        self.add_if_present(&mut record, LogicalField::ContactLastName, Some(last_name));
        self.add_if_present(&mut record, LogicalField::ContactEmail, person.email.as_deref());
        record
    }

    /// Build the Account record for one entity, linking it to `contact_id`
    /// when a contact lookup field is configured.
    pub fn build_account_record(&self, entity: &Entity, contact_id: Option<&str>) -> CrmRecord {
        let mut record = CrmRecord::new();
        self.add_if_present(&mut record, LogicalField::AccountName, Some(entity.name.as_str()));
        self.add_if_present(&mut record, LogicalField::AccountNzbn, Some(entity.identifier.as_str()));
        self.add_if_present(&mut record, LogicalField::AccountAddress, entity.address.as_deref());
        self.add_if_present(&mut record, LogicalField::AccountStatus, Some(entity.status.as_str()));

        let role = format_role(entity);
        if self.config.role_and_incorporation_collide() {
            let merged = format!(
                "{role} | Incorporated: {}",
                entity.incorporation_date.as_deref().unwrap_or_default()
            );
            self.add_if_present(&mut record, LogicalField::AccountRole, Some(merged.trim()));
        } else {
            self.add_if_present(&mut record, LogicalField::AccountRole, Some(role.as_str()));
            self.add_if_present(
                &mut record,
                LogicalField::AccountIncorporationDate,
                entity.incorporation_date.as_deref(),
            );
        }

        let lookup = self.config.native(LogicalField::AccountContactLookup);
        if let Some(contact_id) = contact_id.filter(|id| !id.is_empty()) {
            if !lookup.is_empty() {
                record.insert(lookup.to_string(), json!({ "id": contact_id }));
            }
        }

        record
    }

    fn add_if_present(&self, record: &mut CrmRecord, field: LogicalField, value: Option<&str>) {
        let native = self.config.native(field);
        match value {
            Some(value) if !native.is_empty() && !value.is_empty() => {
                record.insert(native.to_string(), Value::String(value.to_string()));
            }
            _ => {}
        }
    }
}

/// `"Shareholder (40%)"` for shareholders with an allocation, otherwise the
/// bare role.
pub fn format_role(entity: &Entity) -> String {
    match (&entity.role, entity.share_allocation.as_deref()) {
        (EntityRole::Shareholder, Some(share)) if !share.is_empty() => {
            format!("{} ({share})", entity.role)
        }
        (role, _) => role.to_string(),
    }
}
