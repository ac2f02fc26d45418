pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /search          registry search (GET query string, POST JSON body)
/// /import          create Contact + Accounts in the CRM (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/search",
            get(handlers::search::search_by_query).post(handlers::search::search_by_body),
        )
        .route("/import", post(handlers::import::import))
}
