use crate::handlers::{
    add_funds::__path_add_funds, create_meter::__path_create_meter, debt::__path_get_debt,
    debts::__path_list_debts, get_meter::__path_get_meter, health::__path_health_check,
    login::__path_login, pay_debt::__path_pay_debt, purchase::__path_purchase,
    recent_meters::__path_recent_meters, recent_transactions::__path_recent_transactions,
    register::__path_register, transaction::__path_get_user_transaction,
    transaction_stats::__path_transaction_stats, transactions::__path_list_transactions,
    update_meter::__path_update_meter, user_profile::__path_user_profile,
    wallet::__path_wallet_balance, wallet_transactions::__path_wallet_transactions,
};
use meterpay_primitives::models::*;
use serde::Serialize;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    #[schema(example = "insufficient_funds")]
    pub error: String,
    pub message: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        register, login, health_check, user_profile,
        create_meter, recent_meters, get_meter, update_meter,
        purchase, list_transactions, recent_transactions, transaction_stats, get_user_transaction,
        list_debts, get_debt, pay_debt,
        wallet_balance, wallet_transactions, add_funds
    ),
    components(schemas(
        ApiErrorResponse, RegisterRequest, LoginRequest, AuthResponse, UserProfileDto,
        CreateMeterRequest, UpdateMeterRequest, MeterDto, MetersResponse,
        PurchaseRequest, TransactionDto, TransactionsResponse, TransactionStatsDto,
        PayDebtRequest, DebtDto, DebtsResponse, DebtPaymentResponse,
        AddFundsRequest, AddFundsResponse, WalletDto, WalletTransactionDto,
        WalletTransactionsResponse, HealthStatus
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration and login"),
        (name = "Meters", description = "Meter registration and activity"),
        (name = "Transactions", description = "Recharge purchases and history"),
        (name = "Debts", description = "Outstanding debts and their settlement"),
        (name = "Wallet", description = "Wallet balance and top-ups"),
        (name = "Users", description = "User profile"),
        (name = "Health", description = "Service status")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "bearerAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
