pub mod debt;
pub mod enum_types;
pub mod meter;
pub mod transaction;
pub mod user;
pub mod wallet_transaction;

pub use debt::*;
pub use enum_types::*;
pub use meter::*;
pub use transaction::*;
pub use user::*;
pub use wallet_transaction::*;
