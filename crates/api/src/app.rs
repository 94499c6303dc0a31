use crate::config::swagger_config::ApiDoc;
use crate::handlers::{
    add_funds::add_funds, create_meter::create_meter, debt::get_debt, debts::list_debts,
    get_meter::get_meter, health::health_check, login::login, pay_debt::pay_debt,
    purchase::purchase, recent_meters::recent_meters, recent_transactions::recent_transactions,
    register::register, transaction::get_user_transaction, transaction_stats::transaction_stats,
    transactions::list_transactions, update_meter::update_meter, user_profile::user_profile,
    wallet::wallet_balance, wallet_transactions::wallet_transactions,
};
use axum::routing::{get, post};
use axum::{middleware, Router};
use meterpay_core::app_state::AppState;
use meterpay_core::security::SecurityConfig;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn create_router(state: Arc<AppState>) -> Router {
    // public routes (no authentication)
    let public_router = create_public_routers();

    // protected routes (require JWT authentication)
    let protected_router = create_secured_routers(&state);

    Router::new()
        .merge(public_router)
        .merge(protected_router)
        .layer(axum::extract::DefaultBodyLimit::max(64 * 1024))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(state)
}

fn create_secured_routers(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/user/profile", get(user_profile))
        .route("/api/meters", post(create_meter))
        .route("/api/meters/recent", get(recent_meters))
        .route("/api/meters/{meter_id}", get(get_meter).patch(update_meter))
        .route("/api/transactions", get(list_transactions).post(purchase))
        .route("/api/transactions/recent", get(recent_transactions))
        .route("/api/transactions/stats", get(transaction_stats))
        .route("/api/transactions/{transaction_id}", get(get_user_transaction))
        .route("/api/debts", get(list_debts))
        .route("/api/debts/{debt_id}", get(get_debt))
        .route("/api/debts/{debt_id}/pay", post(pay_debt))
        .route("/api/wallet", get(wallet_balance))
        .route("/api/wallet/transactions", get(wallet_transactions))
        .route("/api/wallet/add-funds", post(add_funds))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            SecurityConfig::auth_middleware,
        ))
}

fn create_public_routers() -> Router<Arc<AppState>> {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/health", get(health_check))
}
