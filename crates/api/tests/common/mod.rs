#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use nzbn_api::config::ServerConfig;
use nzbn_api::router::build_app_router;
use nzbn_api::state::AppState;
use nzbn_core::field_mapping::FieldMappingConfig;
use nzbn_core::types::{Entity, EntityRole, EntityStatus, SearchQuery};
use nzbn_crm::{AccessToken, CrmError, CrmGateway, CrmModules};
use nzbn_pipeline::ImportOrchestrator;
use nzbn_registry::{RegistryError, RegistrySearch};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
    }
}

pub fn sample_entity(id: &str) -> Entity {
    Entity {
        id: id.to_string(),
        name: format!("{id} Holdings Limited"),
        identifier: "9429041234567".to_string(),
        status: EntityStatus::Registered,
        incorporation_date: Some("12/03/2015".to_string()),
        address: Some("1 Queen Street, Auckland".to_string()),
        role: EntityRole::Director,
        individual_name: "Jo Bloggs".to_string(),
        share_allocation: None,
    }
}

// ---------------------------------------------------------------------------
// Registry stub
// ---------------------------------------------------------------------------

/// Registry that answers every search with a fixed list or a fixed failure.
#[derive(Default)]
pub struct StubRegistry {
    pub entities: Vec<Entity>,
    pub failure: Option<(u16, String)>,
    pub missing_key: bool,
    /// Sleep before answering, to exercise the request timeout.
    pub delay: Option<Duration>,
    pub queries: Mutex<Vec<SearchQuery>>,
}

#[async_trait]
impl RegistrySearch for StubRegistry {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Entity>, RegistryError> {
        self.queries.lock().unwrap().push(query.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.missing_key {
            return Err(RegistryError::MissingApiKey);
        }
        if let Some((status, message)) = &self.failure {
            return Err(RegistryError::Api {
                status: *status,
                message: message.clone(),
            });
        }
        Ok(self.entities.clone())
    }
}

// ---------------------------------------------------------------------------
// CRM stub
// ---------------------------------------------------------------------------

/// CRM gateway that records traffic and answers from a script.
#[derive(Default)]
pub struct StubGateway {
    pub fail_token: bool,
    pub fail_contact: bool,
    /// Per-record success flags for the account batch; missing entries
    /// succeed.
    pub account_results: Vec<bool>,
    pub contact_calls: AtomicUsize,
    pub account_calls: AtomicUsize,
    pub bodies: Mutex<Vec<(String, Value)>>,
}

impl StubGateway {
    pub fn contact_calls(&self) -> usize {
        self.contact_calls.load(Ordering::SeqCst)
    }

    pub fn account_calls(&self) -> usize {
        self.account_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CrmGateway for StubGateway {
    async fn access_token(&self) -> Result<AccessToken, CrmError> {
        if self.fail_token {
            return Err(CrmError::Token(
                "Unable to get CRM access token: invalid_client".into(),
            ));
        }
        Ok(AccessToken::new("test-token"))
    }

    async fn request(
        &self,
        _token: &AccessToken,
        _method: nzbn_crm::Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, CrmError> {
        let body = body.cloned().unwrap_or(Value::Null);
        self.bodies.lock().unwrap().push((path.to_string(), body.clone()));

        if path.ends_with("/Contacts") {
            let n = self.contact_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_contact {
                return Err(CrmError::Api {
                    status: 400,
                    message: "required field not found".into(),
                });
            }
            return Ok(json!({
                "data": [{ "code": "SUCCESS", "status": "success", "details": { "id": format!("C{n}") } }]
            }));
        }

        self.account_calls.fetch_add(1, Ordering::SeqCst);
        let count = body["data"].as_array().map(Vec::len).unwrap_or_default();
        let data: Vec<Value> = (0..count)
            .map(|i| {
                if self.account_results.get(i).copied().unwrap_or(true) {
                    json!({ "code": "SUCCESS", "status": "success", "details": { "id": format!("A{i}") } })
                } else {
                    json!({ "code": "INVALID_DATA", "status": "error", "message": "invalid data" })
                }
            })
            .collect();
        Ok(json!({ "data": data }))
    }
}

// ---------------------------------------------------------------------------
// App + request helpers
// ---------------------------------------------------------------------------

/// Build the full application router with the production middleware stack,
/// backed by the given stubs.
pub fn build_test_app(registry: Arc<StubRegistry>, gateway: Arc<StubGateway>) -> Router {
    build_test_app_with_config(test_config(), registry, gateway)
}

pub fn build_test_app_with_config(
    config: ServerConfig,
    registry: Arc<StubRegistry>,
    gateway: Arc<StubGateway>,
) -> Router {
    let importer = ImportOrchestrator::new(
        gateway,
        Arc::new(FieldMappingConfig::default()),
        CrmModules::default(),
    );
    let state = AppState {
        registry,
        importer: Arc::new(importer),
    };
    build_app_router(state, &config)
}

pub fn default_app() -> Router {
    build_test_app(Arc::default(), Arc::default())
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_raw(app: Router, uri: &str, body: &'static str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
