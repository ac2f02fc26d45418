//! Handlers for the companies-register search endpoint.
//!
//! The same search is offered as `GET` with query parameters and as `POST`
//! with a JSON body; both return `{ "results": { "entities": [...] } }`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use nzbn_core::error::CoreError;
use nzbn_core::types::{Entity, SearchQuery};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Envelope for search results.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: SearchResults,
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub entities: Vec<Entity>,
}

/// GET /api/v1/search?firstName=&lastName=&identifier=
pub async fn search_by_query(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<Json<SearchResponse>> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    run_search(&state, &query).await
}

/// POST /api/v1/search
pub async fn search_by_body(
    State(state): State<AppState>,
    body: Result<Json<SearchQuery>, JsonRejection>,
) -> AppResult<Json<SearchResponse>> {
    let Json(query) = body?;
    run_search(&state, &query).await
}

async fn run_search(state: &AppState, query: &SearchQuery) -> AppResult<Json<SearchResponse>> {
    query.validate()?;

    let entities = state
        .registry
        .search(query)
        .await
        .map_err(CoreError::from)?;
    tracing::info!(entity_count = entities.len(), "Registry search complete");

    Ok(Json(SearchResponse {
        results: SearchResults { entities },
    }))
}
