//! Two-phase Contact-then-Accounts import.
//!
//! Phase A creates exactly one Contact. Phase B creates one Account per
//! selected entity in a single batched call, linked to that Contact. The
//! phases are strictly sequential and nothing is rolled back: a failure in
//! Phase A aborts before any Account is attempted, while per-record failures
//! in Phase B are reported as data.

use std::sync::Arc;

use nzbn_core::error::CoreError;
use nzbn_core::field_mapping::FieldMappingConfig;
use nzbn_core::mapper::{CrmRecord, FieldMapper};
use nzbn_core::types::{ImportRequest, ImportResult};
use nzbn_crm::{AccessToken, CrmError, CrmGateway, CrmModules, Method};
use serde_json::{json, Value};

use crate::outcome::{contact_id_from, pair_outcomes};

/// Runs imports against a [`CrmGateway`].
///
/// Holds only immutable configuration, so one instance serves concurrent
/// requests without coordination.
pub struct ImportOrchestrator {
    gateway: Arc<dyn CrmGateway>,
    mapping: Arc<FieldMappingConfig>,
    modules: CrmModules,
}

impl ImportOrchestrator {
    pub fn new(
        gateway: Arc<dyn CrmGateway>,
        mapping: Arc<FieldMappingConfig>,
        modules: CrmModules,
    ) -> Self {
        Self {
            gateway,
            mapping,
            modules,
        }
    }

    /// Import one person and their selected entities.
    ///
    /// Repeated calls with identical input create new records each time;
    /// there is no deduplication against existing CRM data.
    pub async fn import(&self, request: &ImportRequest) -> Result<ImportResult, CoreError> {
        request.validate()?;

        let token = self
            .gateway
            .access_token()
            .await
            .map_err(|e| CoreError::Auth(e.to_string()))?;

        let mapper = FieldMapper::new(&self.mapping);

        // Phase A: the Contact every Account links to.
        let contact = mapper.build_contact_record(&request.person);
        let contact_response = self
            .create_records(&token, &self.modules.contacts_path(), vec![contact])
            .await
            .map_err(CoreError::from)?;
        let contact_id = contact_id_from(&contact_response)?;
        tracing::info!(%contact_id, "Created CRM contact");

        // Phase B: one batched create for all selected entities.
        let accounts = request
            .entities
            .iter()
            .map(|entity| mapper.build_account_record(entity, Some(contact_id.as_str())))
            .collect();
        let account_response = self
            .create_records(&token, &self.modules.accounts_path(), accounts)
            .await
            .map_err(|e| {
                tracing::error!(%contact_id, error = %e, "Account batch failed after contact was created");
                CoreError::Upstream {
                    status: e.status(),
                    message: format!("Contact {contact_id} was created but creating accounts failed: {e}"),
                }
            })?;

        let result = ImportResult::new(
            contact_id,
            pair_outcomes(&request.entities, &account_response),
        );
        tracing::info!(
            contact_id = %result.contact_id,
            created = result.created_accounts_count,
            failed = result.per_entity_outcome.len() - result.created_accounts_count,
            "Import finished"
        );
        Ok(result)
    }

    async fn create_records(
        &self,
        token: &AccessToken,
        path: &str,
        records: Vec<CrmRecord>,
    ) -> Result<Value, CrmError> {
        let payload = json!({ "data": records, "trigger": [] });
        self.gateway
            .request(token, Method::POST, path, Some(&payload))
            .await
    }
}
