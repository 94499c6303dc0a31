use async_trait::async_trait;
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::app_state::gateway_details::GatewayInfo;
use meterpay_primitives::models::entities::enum_types::PaymentMethod;
use rand::Rng;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub transaction_id: Uuid,
    pub user_id: Uuid,
    /// Cents, fee included.
    pub amount: i64,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayDecision {
    Approved { reference: String },
    Declined { reason: String },
}

/// External card/mobile processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn authorize(&self, request: &ChargeRequest) -> Result<GatewayDecision, ApiError>;
}

/// Stand-in processor approving a configurable share of charges after a fixed delay.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    approval_rate: f64,
    latency: Duration,
}

impl SimulatedGateway {
    pub fn new(info: &GatewayInfo) -> Self {
        Self::with_rate(info.approval_rate, info.latency)
    }

    pub fn with_rate(approval_rate: f64, latency: Duration) -> Self {
        Self {
            approval_rate: approval_rate.clamp(0.0, 1.0),
            latency,
        }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn authorize(&self, request: &ChargeRequest) -> Result<GatewayDecision, ApiError> {
        let approved = rand::thread_rng().gen_bool(self.approval_rate);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        debug!(
            tx_id = %request.transaction_id,
            method = %request.method,
            amount = request.amount,
            approved,
            "gateway.authorize: simulated decision"
        );

        Ok(if approved {
            GatewayDecision::Approved {
                reference: format!("sim_{}", request.transaction_id.simple()),
            }
        } else {
            GatewayDecision::Declined {
                reason: "Payment declined by processor".into(),
            }
        })
    }
}
