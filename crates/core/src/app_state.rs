use crate::clients::{PaymentGateway, SimulatedGateway};
use crate::repositories::EntityStore;
use crate::services::token_service::{RandomTokenIssuer, TokenIssuer};
use std::sync::Arc;

pub use meterpay_primitives::models::app_state::app_config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub tokens: Arc<dyn TokenIssuer>,
    pub config: AppConfig,
}

impl AppState {
    /// State wired to the simulated processor configured in `config.gateway`.
    pub fn new(store: Arc<dyn EntityStore>, config: AppConfig) -> Arc<Self> {
        let gateway = Arc::new(SimulatedGateway::new(&config.gateway));
        Self::with_gateway(store, gateway, config)
    }

    pub fn with_gateway(
        store: Arc<dyn EntityStore>,
        gateway: Arc<dyn PaymentGateway>,
        config: AppConfig,
    ) -> Arc<Self> {
        Self::with_parts(store, gateway, Arc::new(RandomTokenIssuer), config)
    }

    pub fn with_parts(
        store: Arc<dyn EntityStore>,
        gateway: Arc<dyn PaymentGateway>,
        tokens: Arc<dyn TokenIssuer>,
        config: AppConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            gateway,
            tokens,
            config,
        })
    }
}
