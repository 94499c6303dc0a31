#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use axum_test::{TestRequest, TestServer};
use chrono::{Duration as ChronoDuration, Utc};
use meterpay_core::app_state::{AppConfig, AppState};
use meterpay_core::clients::{ChargeRequest, GatewayDecision, PaymentGateway, SimulatedGateway};
use meterpay_core::repositories::{EntityStore, MemoryStore};
use meterpay_core::security::SecurityConfig;
use meterpay_core::services::token_service::{TokenIssuer, TokenService};
use meterpay_primitives::error::ApiError;
use meterpay_primitives::models::app_state::app_config::StorageBackend;
use meterpay_primitives::models::app_state::billing_details::BillingInfo;
use meterpay_primitives::models::app_state::gateway_details::GatewayInfo;
use meterpay_primitives::models::app_state::jwt_details::JWTInfo;
use meterpay_primitives::models::entities::{
    Debt, DebtCategory, NewDebt, NewUser, NewWalletTransaction, User, WalletEntryType,
};
use secrecy::SecretString;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;
use uuid::Uuid;

/// Never verified; users made this way only authenticate with minted tokens.
pub const TEST_PASSWORD_HASH: &str = "unverifiable-test-hash";

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_details: JWTInfo {
            jwt_secret: SecretString::from("test_secret_key_minimum_32_characters_long_for_testing"),
            jwt_expiration_hours: 2,
            jwt_issuer: "meterpay".to_string(),
            jwt_audience: "meterpay_api".to_string(),
        },
        billing: BillingInfo::default(),
        gateway: GatewayInfo {
            approval_rate: 1.0,
            latency: Duration::ZERO,
            timeout: Duration::from_millis(200),
        },
        storage_backend: StorageBackend::Memory,
        pending_sweep_after: Duration::from_secs(300),
    }
}

/// Memory-backed state whose processor approves every charge.
pub fn create_test_app_state() -> Arc<AppState> {
    create_test_app_state_with(Arc::new(SimulatedGateway::with_rate(1.0, Duration::ZERO)))
}

pub fn create_test_app_state_with(gateway: Arc<dyn PaymentGateway>) -> Arc<AppState> {
    let store: Arc<dyn EntityStore> = Arc::new(MemoryStore::new());
    AppState::with_gateway(store, gateway, test_config())
}

/// Same as `create_test_app_state_with`, keeping a handle on the concrete store.
pub fn create_test_app_state_with_store(
    gateway: Arc<dyn PaymentGateway>,
) -> (Arc<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::with_gateway(store.clone(), gateway, test_config());
    (state, store)
}

/// Approving processor paired with a custom token source.
pub fn create_test_app_state_with_tokens(tokens: Arc<dyn TokenIssuer>) -> Arc<AppState> {
    let store: Arc<dyn EntityStore> = Arc::new(MemoryStore::new());
    let gateway = Arc::new(SimulatedGateway::with_rate(1.0, Duration::ZERO));
    AppState::with_parts(store, gateway, tokens, test_config())
}

pub fn declining_gateway() -> Arc<dyn PaymentGateway> {
    Arc::new(SimulatedGateway::with_rate(0.0, Duration::ZERO))
}

/// Approves, but only after the configured test timeout has long passed.
pub fn slow_gateway() -> Arc<dyn PaymentGateway> {
    Arc::new(SimulatedGateway::with_rate(1.0, Duration::from_secs(5)))
}

/// Processor that cannot be reached at all.
pub struct UnavailableGateway;

#[async_trait]
impl PaymentGateway for UnavailableGateway {
    async fn authorize(&self, _request: &ChargeRequest) -> Result<GatewayDecision, ApiError> {
        Err(ApiError::Payment("connection refused".into()))
    }
}

/// Approving processor that records how many charges it was asked for.
pub struct CountingGateway {
    inner: SimulatedGateway,
    calls: AtomicUsize,
}

impl CountingGateway {
    pub fn new(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            inner: SimulatedGateway::with_rate(1.0, latency),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for CountingGateway {
    async fn authorize(&self, request: &ChargeRequest) -> Result<GatewayDecision, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.authorize(request).await
    }
}

/// Hands out the same token every time.
pub struct FixedTokenIssuer(pub &'static str);

impl TokenIssuer for FixedTokenIssuer {
    fn issue(&self) -> String {
        self.0.to_string()
    }
}

/// Holds the first `held` token requests until the test releases them.
///
/// A purchase asks for its token after its pending row exists and before it
/// settles, so holding it there lets a test interleave other writes.
/// Held callers block a worker thread; use a multi-threaded runtime.
pub struct GatedTokenIssuer {
    held: usize,
    calls: AtomicUsize,
    arrived: Barrier,
    released: Barrier,
}

impl GatedTokenIssuer {
    pub fn new(held: usize) -> Arc<Self> {
        Arc::new(Self {
            held,
            calls: AtomicUsize::new(0),
            arrived: Barrier::new(held + 1),
            released: Barrier::new(held + 1),
        })
    }

    /// Returns once every held caller is waiting for its token.
    pub async fn wait_for_callers(self: &Arc<Self>) {
        let gate = self.clone();
        tokio::task::spawn_blocking(move || {
            gate.arrived.wait();
        })
        .await
        .unwrap();
    }

    pub async fn release(self: &Arc<Self>) {
        let gate = self.clone();
        tokio::task::spawn_blocking(move || {
            gate.released.wait();
        })
        .await
        .unwrap();
    }
}

impl TokenIssuer for GatedTokenIssuer {
    fn issue(&self) -> String {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.held {
            self.arrived.wait();
            self.released.wait();
        }
        TokenService::generate()
    }
}

pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    TestServer::new(meterpay_api::create_router(state)).unwrap()
}

/// Inserts a user directly, skipping the deliberately slow password hashing.
pub fn create_test_user(state: &AppState, username: &str) -> (User, String) {
    let user = state
        .store
        .create_user(NewUser {
            id: Uuid::new_v4(),
            username: format!("{}_{}", username, Uuid::new_v4().simple()),
            password_hash: TEST_PASSWORD_HASH.to_string(),
            full_name: None,
            email: None,
            phone: None,
            address: None,
        })
        .unwrap();

    let token = SecurityConfig::create_token(state, user.id).unwrap();
    (user, token)
}

pub fn fund_wallet(state: &AppState, user_id: Uuid, amount: i64) -> i64 {
    let (_, balance) = state
        .store
        .apply_wallet_entry(NewWalletTransaction {
            id: Uuid::new_v4(),
            user_id,
            entry_type: WalletEntryType::Deposit,
            amount,
            description: "Account top-up".to_string(),
            reference: None,
        })
        .unwrap();
    balance
}

pub fn create_test_debt(state: &AppState, user_id: Uuid, amount: i64) -> Debt {
    state
        .store
        .create_debt(NewDebt {
            id: Uuid::new_v4(),
            user_id,
            meter_number: "12345678901".to_string(),
            amount,
            category: DebtCategory::Water,
            due_date: Utc::now() + ChronoDuration::days(14),
            description: Some("Water bill arrears".to_string()),
        })
        .unwrap()
}

pub fn bearer(request: TestRequest, token: &str) -> TestRequest {
    request.add_header(AUTHORIZATION, format!("Bearer {}", token))
}
