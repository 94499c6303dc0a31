use meterpay_core::app_state::AppState;
use meterpay_core::services::maintenance_service::MaintenanceService;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, error, info};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub fn spawn_background_tasks(state: Arc<AppState>) {
    tokio::spawn(async move {
        info!("Starting stale pending transaction sweep task");
        sweep_pending_transactions(state).await;
    });

    info!("Background maintenance tasks spawned");
}

async fn sweep_pending_transactions(state: Arc<AppState>) {
    let mut interval = interval(SWEEP_INTERVAL);
    interval.tick().await;

    loop {
        interval.tick().await;

        match MaintenanceService::sweep_stale_pending(&state).await {
            Ok(0) => debug!("No stale pending transactions"),
            Ok(n) => info!("Failed {} stale pending transactions", n),
            Err(e) => error!("Stale pending sweep failed: {}", e),
        }
    }
}
