use eyre::{eyre, Report};
use std::env;

/// Tariff and wallet limits, all money in cents.
#[derive(Clone, Debug)]
pub struct BillingInfo {
    /// Surcharge added to card and mobile payments.
    pub service_fee: i64,
    /// Price of one kWh.
    pub unit_price: i64,
    pub min_top_up: i64,
    pub max_top_up: i64,
    pub token_max_attempts: u32,
}

impl Default for BillingInfo {
    fn default() -> Self {
        Self {
            service_fee: 50,
            unit_price: 45,
            min_top_up: 500,
            max_top_up: 100_000,
            token_max_attempts: 5,
        }
    }
}

impl BillingInfo {
    pub fn new() -> Result<BillingInfo, Report> {
        let defaults = Self::default();

        let info = Self {
            service_fee: parse_or("SERVICE_FEE_CENTS", defaults.service_fee)?,
            unit_price: parse_or("UNIT_PRICE_CENTS", defaults.unit_price)?,
            min_top_up: parse_or("MIN_TOP_UP_CENTS", defaults.min_top_up)?,
            max_top_up: parse_or("MAX_TOP_UP_CENTS", defaults.max_top_up)?,
            token_max_attempts: parse_or("TOKEN_MAX_ATTEMPTS", defaults.token_max_attempts)?,
        };

        if info.service_fee < 0 {
            return Err(eyre!("SERVICE_FEE_CENTS must not be negative"));
        }
        if info.unit_price <= 0 {
            return Err(eyre!("UNIT_PRICE_CENTS must be positive"));
        }
        if info.min_top_up <= 0 || info.min_top_up > info.max_top_up {
            return Err(eyre!("top-up bounds must satisfy 0 < MIN_TOP_UP_CENTS <= MAX_TOP_UP_CENTS"));
        }
        if info.token_max_attempts == 0 {
            return Err(eyre!("TOKEN_MAX_ATTEMPTS must be at least 1"));
        }

        Ok(info)
    }
}

pub(crate) fn parse_or<T>(key: &str, default: T) -> Result<T, Report>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| eyre!("Invalid value for {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}
