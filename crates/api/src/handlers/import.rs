//! Handler for importing a person and their selected entities into the CRM.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use nzbn_core::types::{EntityOutcome, ImportRequest};
use serde::Serialize;

use crate::error::AppResult;
use crate::state::AppState;

/// Response body for a completed import.
///
/// Returned even when some Accounts failed; `details` carries the
/// per-entity outcomes in request order.
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub ok: bool,
    pub summary: ImportSummary,
    pub details: Vec<EntityOutcome>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub contact_id: String,
    pub created_accounts: usize,
}

/// POST /api/v1/import
///
/// Creates one Contact, then one Account per selected entity linked to it.
pub async fn import(
    State(state): State<AppState>,
    body: Result<Json<ImportRequest>, JsonRejection>,
) -> AppResult<Json<ImportResponse>> {
    let Json(request) = body?;
    tracing::info!(entity_count = request.entities.len(), "Import requested");

    let result = state.importer.import(&request).await?;

    Ok(Json(ImportResponse {
        ok: true,
        summary: ImportSummary {
            contact_id: result.contact_id,
            created_accounts: result.created_accounts_count,
        },
        details: result.per_entity_outcome,
    }))
}
