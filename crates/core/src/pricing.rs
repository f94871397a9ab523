//! Pricing calculator: bid final prices and suggested quote amounts.
//!
//! All results are rounded to cents with midpoint-away-from-zero rounding so
//! stored amounts and recomputed sums always agree.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::CoreError;
use crate::types::Money;

/// Number of decimal places kept for monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Round an amount to cents.
pub fn round_money(amount: Money) -> Money {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// A proposed price must be strictly positive.
pub fn validate_proposed_price(price: Money) -> Result<(), CoreError> {
    if price <= Decimal::ZERO {
        return Err(CoreError::Validation(format!(
            "Proposed price must be greater than zero, got {price}"
        )));
    }
    Ok(())
}

/// A markup percentage must be supplied and non-negative. Zero is a valid
/// "no markup" choice.
pub fn validate_markup(markup_percentage: Decimal) -> Result<(), CoreError> {
    if markup_percentage < Decimal::ZERO {
        return Err(CoreError::Validation(format!(
            "Markup percentage must not be negative, got {markup_percentage}"
        )));
    }
    Ok(())
}

/// `proposed_price * (1 + markup_percentage / 100)`, rounded to cents.
pub fn final_price(proposed_price: Money, markup_percentage: Decimal) -> Result<Money, CoreError> {
    validate_proposed_price(proposed_price)?;
    validate_markup(markup_percentage)?;

    let markup_amount = proposed_price
        .checked_mul(markup_percentage)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(|| CoreError::Validation("Final price is out of range".to_string()))?;
    let total = proposed_price
        .checked_add(markup_amount)
        .ok_or_else(|| CoreError::Validation("Final price is out of range".to_string()))?;

    Ok(round_money(total))
}

/// Suggested quote amount: the sum of accepted bids' final prices.
pub fn suggested_amount<I>(final_prices: I) -> Money
where
    I: IntoIterator<Item = Money>,
{
    round_money(final_prices.into_iter().sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn applies_markup_percentage() {
        assert_eq!(final_price(money("1000"), money("20")).unwrap(), money("1200.00"));
        assert_eq!(final_price(money("1250"), money("20")).unwrap(), money("1500"));
    }

    #[test]
    fn zero_markup_keeps_proposed_price() {
        assert_eq!(final_price(money("980.50"), Decimal::ZERO).unwrap(), money("980.50"));
    }

    #[test]
    fn rounds_to_cents_half_away_from_zero() {
        // 333.33 * 1.15 = 383.3295
        assert_eq!(final_price(money("333.33"), money("15")).unwrap(), money("383.33"));
        // 10.01 * 1.05 = 10.5105
        assert_eq!(final_price(money("10.01"), money("5")).unwrap(), money("10.51"));
        // 0.10 * 1.25 = 0.125
        assert_eq!(final_price(money("0.10"), money("25")).unwrap(), money("0.13"));
    }

    #[test]
    fn fractional_markup_is_supported() {
        assert_eq!(final_price(money("200"), money("12.5")).unwrap(), money("225"));
    }

    #[test]
    fn negative_markup_is_rejected() {
        let err = final_price(money("100"), money("-1")).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn non_positive_price_is_rejected() {
        assert!(final_price(Decimal::ZERO, money("20")).is_err());
        assert!(final_price(money("-5"), money("20")).is_err());
    }

    #[test]
    fn suggested_amount_sums_final_prices() {
        assert_eq!(
            suggested_amount(vec![money("1000"), money("1500")]),
            money("2500")
        );
        assert_eq!(suggested_amount(Vec::new()), Decimal::ZERO);
    }
}
