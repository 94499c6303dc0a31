use crate::error::ApiError;
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, DbEnum, Display, EnumString,
    ToSchema,
)]
#[ExistingTypePath = "crate::schema::sql_types::MeterStatus"]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MeterStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, DbEnum, Display, EnumString,
    ToSchema,
)]
#[ExistingTypePath = "crate::schema::sql_types::TransactionStatus"]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Success,
    Failed,
}

impl TransactionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, DbEnum, Display, EnumString,
    ToSchema,
)]
#[ExistingTypePath = "crate::schema::sql_types::PaymentMethod"]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Card,
    Wallet,
    Mobile,
}

impl PaymentMethod {
    /// Card and mobile payments are authorized by the external processor.
    pub fn is_external(self) -> bool {
        !matches!(self, PaymentMethod::Wallet)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, DbEnum, Display, EnumString,
    ToSchema,
)]
#[ExistingTypePath = "crate::schema::sql_types::TransactionType"]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransactionType {
    #[default]
    Recharge,
    DebtPayment,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, DbEnum, Display, EnumString,
    ToSchema,
)]
#[ExistingTypePath = "crate::schema::sql_types::DebtCategory"]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DebtCategory {
    #[default]
    Electricity,
    Water,
    Maintenance,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum, Display, EnumString, ToSchema,
)]
#[ExistingTypePath = "crate::schema::sql_types::WalletEntryType"]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WalletEntryType {
    Deposit,
    Withdrawal,
    Payment,
}

impl WalletEntryType {
    /// Signed effect of an entry of this type on the wallet balance.
    pub fn signed(self, amount: i64) -> i64 {
        match self {
            WalletEntryType::Deposit => amount,
            WalletEntryType::Withdrawal | WalletEntryType::Payment => -amount,
        }
    }

    pub fn is_debit(self) -> bool {
        !matches!(self, WalletEntryType::Deposit)
    }
}

/// Filter accepted by the debt listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DebtFilter {
    Pending,
    Paid,
    #[default]
    All,
}

impl DebtFilter {
    pub fn matches(self, is_paid: bool) -> bool {
        match self {
            DebtFilter::Pending => !is_paid,
            DebtFilter::Paid => is_paid,
            DebtFilter::All => true,
        }
    }
}

/// Parses an optional `?status=` query value. `all` and an empty value mean no filter.
pub fn parse_status_filter(input: Option<&str>) -> Result<Option<TransactionStatus>, ApiError> {
    match input.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => TransactionStatus::from_str(&value.to_lowercase())
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("Unknown transaction status: {}", value))),
    }
}

pub fn parse_debt_filter(input: Option<&str>) -> Result<DebtFilter, ApiError> {
    match input.map(str::trim) {
        None | Some("") => Ok(DebtFilter::All),
        Some(value) => DebtFilter::from_str(&value.to_lowercase())
            .map_err(|_| ApiError::BadRequest(format!("Unknown debt filter: {}", value))),
    }
}
