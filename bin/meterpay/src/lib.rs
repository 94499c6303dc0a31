mod observability;

pub mod utility;

pub use meterpay_primitives::error::ApiError;

use crate::utility::clean_up_tasks::spawn_background_tasks;
use crate::utility::logging::setup_logging;
use crate::utility::server::serve;
use crate::utility::tasks::{build_router, build_store, load_env};
use eyre::Report;
use meterpay_core::app_state::{AppConfig, AppState};
use tracing::info;

pub async fn run() -> Result<(), Report> {
    // 1. load environment variables
    load_env();

    // 2. initialize logging first (so we can log everything else)
    setup_logging();

    info!("Starting MeterPay application...");

    // 3. load configuration
    let config = AppConfig::from_env()?;

    // 4. open the configured store (migrations or demo fixtures included)
    let store = build_store(&config)?;

    // 5. build application state
    let state = AppState::new(store, config);

    // 6. start background maintenance tasks
    spawn_background_tasks(state.clone());

    // 7. initialize metrics
    let (metric_layer, metric_handle) = observability::metrics::setup_metrics();

    // 8. build axum router
    let app = build_router(state, metric_layer, metric_handle)?;

    // 9. start HTTP server
    serve(app).await?;

    info!("MeterPay application shut down gracefully");
    Ok(())
}
