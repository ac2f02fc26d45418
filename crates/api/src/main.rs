use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nzbn_api::config::ServerConfig;
use nzbn_api::router::build_app_router;
use nzbn_api::state::AppState;
use nzbn_core::field_mapping::FieldMappingConfig;
use nzbn_crm::{CrmClient, CrmConfig};
use nzbn_pipeline::ImportOrchestrator;
use nzbn_registry::{RegistryClient, RegistryConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "nzbn_api=debug,nzbn_pipeline=debug,nzbn_registry=debug,nzbn_crm=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env().unwrap_or_else(|e| panic!("{e}"));
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let crm_config = CrmConfig::from_env().unwrap_or_else(|e| panic!("{e}"));
    tracing::info!(
        api_domain = %crm_config.api_domain,
        accounts = %crm_config.modules.accounts,
        contacts = %crm_config.modules.contacts,
        "Loaded CRM configuration"
    );

    let mapping = FieldMappingConfig::from_env();
    if mapping.role_and_incorporation_collide() {
        tracing::debug!("Role and incorporation date share a CRM field; values will be merged");
    }

    let registry_config = RegistryConfig::from_env();
    if registry_config.api_key.is_none() {
        tracing::warn!("REGISTRY_API_KEY is not set; searches will fail until it is configured");
    }

    // --- Upstream clients ---
    let modules = crm_config.modules.clone();
    let crm = CrmClient::new(crm_config).expect("Failed to build CRM HTTP client");
    let registry = RegistryClient::new(registry_config).expect("Failed to build registry HTTP client");

    // --- App state ---
    let importer = ImportOrchestrator::new(Arc::new(crm), Arc::new(mapping), modules);
    let state = AppState {
        registry: Arc::new(registry),
        importer: Arc::new(importer),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    let shutdown = Arc::new(Notify::new());
    let server = tokio::spawn({
        let shutdown = Arc::clone(&shutdown);
        async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.notified().await })
                .await
        }
    });

    shutdown_signal().await;
    shutdown.notify_one();

    // In-flight imports get a bounded window to finish.
    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    match tokio::time::timeout(drain, server).await {
        Ok(Ok(Ok(()))) => tracing::info!("Graceful shutdown complete"),
        Ok(Ok(Err(e))) => tracing::error!(error = %e, "Server error"),
        Ok(Err(e)) => tracing::error!(error = %e, "Server task failed"),
        Err(_) => tracing::warn!(
            timeout_secs = config.shutdown_timeout_secs,
            "Shutdown timeout elapsed with requests still in flight"
        ),
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
