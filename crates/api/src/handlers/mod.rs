pub mod add_funds;
pub mod create_meter;
pub mod debt;
pub mod debts;
pub mod get_meter;
pub mod health;
pub mod login;
pub mod pay_debt;
pub mod purchase;
pub mod recent_meters;
pub mod recent_transactions;
pub mod register;
pub mod transaction;
pub mod transaction_stats;
pub mod transactions;
pub mod update_meter;
pub mod user_profile;
pub mod wallet;
pub mod wallet_transactions;
