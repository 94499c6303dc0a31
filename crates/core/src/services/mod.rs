pub mod auth_service;
pub mod ledger_service;
pub mod maintenance_service;
pub mod meter_service;
pub mod payment_service;
pub mod query_service;
pub mod token_service;

pub use auth_service::AuthService;
pub use ledger_service::LedgerService;
pub use maintenance_service::MaintenanceService;
pub use meter_service::MeterService;
pub use payment_service::PaymentService;
pub use query_service::QueryService;
pub use token_service::{RandomTokenIssuer, TokenIssuer, TokenService};
