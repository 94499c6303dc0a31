use validator::ValidationError;

const METER_NUMBER_MIN_LEN: usize = 5;
const METER_NUMBER_MAX_LEN: usize = 20;

pub fn validate_meter_number(meter_number: &str) -> Result<(), ValidationError> {
    let trimmed = meter_number.trim();

    if trimmed.len() < METER_NUMBER_MIN_LEN || trimmed.len() > METER_NUMBER_MAX_LEN {
        return Err(error("meter_number_length"));
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(error("meter_number_invalid_character"));
    }

    Ok(())
}

/// Renders cents as a two-digit decimal string, e.g. `2050` -> `"20.50"`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Hundredths of a kWh purchasable for `amount` at `unit_price`, rounded down.
pub fn units_for(amount: i64, unit_price: i64) -> i64 {
    if unit_price <= 0 {
        return 0;
    }
    ((amount as i128 * 100) / unit_price as i128) as i64
}

fn error(code: &'static str) -> ValidationError {
    ValidationError::new(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_cents_with_two_fraction_digits() {
        assert_eq!(format_cents(5000), "50.00");
        assert_eq!(format_cents(2050), "20.50");
        assert_eq!(format_cents(7), "0.07");
        assert_eq!(format_cents(-150), "-1.50");
    }

    #[test]
    fn units_round_down_to_hundredths() {
        // 20.00 at 0.45 per kWh = 44.444...
        assert_eq!(units_for(2000, 45), 4444);
        assert_eq!(format_cents(units_for(2000, 45)), "44.44");
        assert_eq!(units_for(4500, 45), 10_000);
        assert_eq!(units_for(100, 0), 0);
    }

    #[test]
    fn meter_numbers_are_alphanumeric_with_hyphens() {
        assert!(validate_meter_number("12345678901").is_ok());
        assert!(validate_meter_number("M-10254").is_ok());
        assert!(validate_meter_number("123").is_err());
        assert!(validate_meter_number("1234 5678").is_err());
        assert!(validate_meter_number("123456789012345678901").is_err());
    }
}
