use std::sync::Arc;

use nzbn_pipeline::ImportOrchestrator;
use nzbn_registry::RegistrySearch;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Companies-register search backend.
    pub registry: Arc<dyn RegistrySearch>,
    /// Contact-then-Accounts CRM importer.
    pub importer: Arc<ImportOrchestrator>,
}
