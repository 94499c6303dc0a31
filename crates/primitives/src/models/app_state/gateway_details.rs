use crate::models::app_state::billing_details::parse_or;
use eyre::{eyre, Report};
use std::time::Duration;

/// Settings of the simulated card/mobile processor.
#[derive(Clone, Debug)]
pub struct GatewayInfo {
    /// Probability in `[0, 1]` that an authorization is approved.
    pub approval_rate: f64,
    pub latency: Duration,
    /// Upper bound on a single authorization; expiry fails the transaction.
    pub timeout: Duration,
}

impl Default for GatewayInfo {
    fn default() -> Self {
        Self {
            approval_rate: 0.9,
            latency: Duration::ZERO,
            timeout: Duration::from_millis(5_000),
        }
    }
}

impl GatewayInfo {
    pub fn new() -> Result<GatewayInfo, Report> {
        let approval_rate: f64 = parse_or("GATEWAY_APPROVAL_RATE", 0.9)?;

        if !(0.0..=1.0).contains(&approval_rate) {
            return Err(eyre!("GATEWAY_APPROVAL_RATE must be between 0 and 1"));
        }

        let timeout_ms: u64 = parse_or("GATEWAY_TIMEOUT_MS", 5_000)?;
        if timeout_ms == 0 {
            return Err(eyre!("GATEWAY_TIMEOUT_MS must be positive"));
        }

        Ok(Self {
            approval_rate,
            latency: Duration::from_millis(parse_or("GATEWAY_LATENCY_MS", 0)?),
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}
