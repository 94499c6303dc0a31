use crate::app_state::AppState;
use chrono::Utc;
use meterpay_primitives::error::ApiError;
use tracing::{info, warn};

pub const STALE_PENDING_REASON: &str = "Authorization timed out";

pub struct MaintenanceService;

impl MaintenanceService {
    /// Fails transactions left pending past the sweep threshold, e.g. after a
    /// crash between creation and settlement. Returns how many were swept.
    pub async fn sweep_stale_pending(state: &AppState) -> Result<usize, ApiError> {
        let after = chrono::Duration::from_std(state.config.pending_sweep_after)
            .map_err(|e| ApiError::Internal(format!("invalid sweep threshold: {}", e)))?;
        let cutoff = Utc::now() - after;

        let swept = state.store.fail_stale_pending(cutoff, STALE_PENDING_REASON)?;

        if !swept.is_empty() {
            warn!(count = swept.len(), "maintenance.sweep: failed stale pending transactions");
            for tx_id in &swept {
                info!(tx_id = %tx_id, "maintenance.sweep: transaction failed");
            }
        }

        Ok(swept.len())
    }
}
