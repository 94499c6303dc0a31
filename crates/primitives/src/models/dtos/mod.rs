pub mod auth_dto;
pub mod debt_dto;
pub mod meter_dto;
pub mod transaction_dto;
pub mod wallet_dto;

pub use auth_dto::*;
pub use debt_dto::*;
pub use meter_dto::*;
pub use transaction_dto::*;
pub use wallet_dto::*;
