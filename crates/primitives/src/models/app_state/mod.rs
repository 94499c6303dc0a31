pub mod app_config;
pub mod billing_details;
pub mod gateway_details;
pub mod jwt_details;

pub use app_config::*;
pub use billing_details::*;
pub use gateway_details::*;
pub use jwt_details::*;
