use crate::utility::db_pool::create_db_pool;
use axum::routing::get;
use axum::Router;
use axum_prometheus::{metrics_exporter_prometheus::PrometheusHandle, PrometheusMetricLayer};
use eyre::{eyre, Report};
use http::HeaderValue;
use meterpay_core::app_state::{AppConfig, AppState};
use meterpay_core::fixtures::{seed_demo_data, DEMO_PASSWORD, DEMO_USERNAME};
use meterpay_core::repositories::{EntityStore, MemoryStore, PgStore};
use meterpay_core::services::auth_service::AuthService;
use meterpay_primitives::models::app_state::app_config::StorageBackend;
use secrecy::SecretString;
use std::env;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub fn build_cors() -> Result<CorsLayer, Report> {
    let origins = env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into());

    let allowed_origins = origins
        .split(',')
        .map(|s| s.trim().parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| eyre!("Invalid CORS origin: {}", e))?;

    Ok(CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(allowed_origins))
}

pub fn load_env() {
    if dotenvy::dotenv().is_ok() {
        info!("Loaded .env file");
    } else {
        info!("No .env file found, using system environment");
    }
}

pub fn build_router(
    state: Arc<AppState>,
    metric_layer: PrometheusMetricLayer<'static>,
    metric_handle: PrometheusHandle,
) -> Result<Router, Report> {
    let cors = build_cors()?;

    Ok(meterpay_api::create_router(state)
        .route(
            "/metrics",
            get(move || async move { metric_handle.render() }),
        )
        .layer(metric_layer)
        .layer(cors))
}

/// Opens the configured backend. Postgres gets its migrations applied; the
/// memory backend starts with the demo dataset.
pub fn build_store(config: &AppConfig) -> Result<Arc<dyn EntityStore>, Report> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let store = PgStore::new(create_db_pool()?);
            store.run_migrations().map_err(|e| eyre!("{}", e))?;
            info!("Using PostgreSQL storage");
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            let store = MemoryStore::new();
            let hash = AuthService::hash_password(&SecretString::from(DEMO_PASSWORD.to_string()))
                .map_err(|e| eyre!("{}", e))?;
            seed_demo_data(&store, &config.billing, hash).map_err(|e| eyre!("{}", e))?;
            info!(
                username = DEMO_USERNAME,
                "Using in-memory storage seeded with demo data"
            );
            Ok(Arc::new(store))
        }
    }
}
