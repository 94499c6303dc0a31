use crate::models::app_state::billing_details::{parse_or, BillingInfo};
use crate::models::app_state::gateway_details::GatewayInfo;
use crate::models::app_state::jwt_details::JWTInfo;
use eyre::{eyre, Report};
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-process store seeded with the demo fixtures.
    Memory,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mock" => Ok(StorageBackend::Memory),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            other => Err(eyre!("Unknown storage backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_details: JWTInfo,

    pub billing: BillingInfo,

    pub gateway: GatewayInfo,

    pub storage_backend: StorageBackend,

    pub pending_sweep_after: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, Report> {
        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) if env::var("DATABASE_URL").is_ok() => StorageBackend::Postgres,
            Err(_) => StorageBackend::Memory,
        };

        let config = Self {
            jwt_details: JWTInfo::new()?,

            billing: BillingInfo::new()?,

            gateway: GatewayInfo::new()?,

            storage_backend,

            pending_sweep_after: Duration::from_secs(parse_or("PENDING_SWEEP_AFTER_SECS", 300)?),
        };

        config.validate()?;
        Ok(config)
    }

    /// The sweep must never fail a transaction whose authorization can still return.
    pub fn validate(&self) -> Result<(), Report> {
        if self.pending_sweep_after <= self.gateway.timeout {
            return Err(eyre!(
                "PENDING_SWEEP_AFTER_SECS ({}s) must exceed GATEWAY_TIMEOUT_MS ({}ms)",
                self.pending_sweep_after.as_secs(),
                self.gateway.timeout.as_millis()
            ));
        }
        Ok(())
    }
}
