pub mod debt_repository;
pub mod memory_store;
pub mod meter_repository;
pub mod pg_store;
pub mod store;
pub mod transaction_repository;
pub mod user_repository;
pub mod wallet_repository;

pub use memory_store::MemoryStore;
pub use pg_store::{DbPool, PgStore, MIGRATIONS};
pub use store::{EntityStore, MeterClaim, MeterResolution, Settlement, WalletDebit};

use diesel::result::{DatabaseErrorKind, Error};

/// Name of the unique constraint a write tripped over, if that is what failed.
pub(crate) fn violated_constraint(err: &Error) -> Option<&str> {
    match err {
        Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => info.constraint_name(),
        _ => None,
    }
}
