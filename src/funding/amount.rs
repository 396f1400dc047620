//! Money as the database stores it: NUMERIC(14,2).

use crate::error::DomainError;
use rust_decimal::Decimal;

/// Digits after the decimal point
pub const MONEY_SCALE: u32 = 2;

/// Digits before the decimal point
const MONEY_INTEGER_DIGITS: u32 = 12;

/// Accept a non-negative amount with at most two decimals that fits the column
pub fn validate_amount(amount: Decimal) -> Result<Decimal, DomainError> {
    let limit = Decimal::from(10i64.pow(MONEY_INTEGER_DIGITS));

    if amount < Decimal::ZERO || amount.normalize().scale() > MONEY_SCALE || amount >= limit {
        return Err(DomainError::InvalidAmount(amount));
    }
    Ok(amount)
}

/// Like [`validate_amount`], and the amount must be above zero
pub fn validate_positive_amount(amount: Decimal) -> Result<Decimal, DomainError> {
    if amount <= Decimal::ZERO {
        return Err(DomainError::InvalidAmount(amount));
    }
    validate_amount(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_accepts_cents() {
        assert_eq!(validate_amount(dec("10.05")), Ok(dec("10.05")));
        assert_eq!(validate_amount(dec("10.500")), Ok(dec("10.500")));
        assert_eq!(validate_amount(Decimal::ZERO), Ok(Decimal::ZERO));
        assert_eq!(validate_amount(dec("999999999999.99")), Ok(dec("999999999999.99")));
    }

    #[test]
    fn test_rejects_fractions_of_a_cent() {
        for raw in ["0.001", "10.005"] {
            assert_eq!(
                validate_amount(dec(raw)),
                Err(DomainError::InvalidAmount(dec(raw)))
            );
        }
    }

    #[test]
    fn test_rejects_amounts_beyond_the_column() {
        assert!(validate_amount(dec("1000000000000")).is_err());
        assert!(validate_amount(dec("1000000000000000")).is_err());
        assert!(validate_amount(dec("-0.01")).is_err());
    }

    #[test]
    fn test_positive_amount() {
        assert!(validate_positive_amount(Decimal::ZERO).is_err());
        assert!(validate_positive_amount(dec("0.001")).is_err());
        assert_eq!(validate_positive_amount(dec("0.01")), Ok(dec("0.01")));
    }
}
