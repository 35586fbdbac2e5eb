//! Prices

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::items::CartItem;

/// Errors that can occur during money arithmetic.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A multiplication or sum did not fit in minor units.
    #[error("money arithmetic overflowed")]
    Overflow,

    /// A decimal amount could not be expressed in minor units.
    #[error("amount {0} cannot be represented in minor units")]
    Unrepresentable(Decimal),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculates `price * quantity`.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the product does not fit in minor units.
pub fn line_total(
    price: &Money<'static, Currency>,
    quantity: u32,
) -> Result<Money<'static, Currency>, PricingError> {
    price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .map(|minor| Money::from_minor(minor, price.currency()))
        .ok_or(PricingError::Overflow)
}

/// Re-sums `price * quantity` over every item.
///
/// Cart mutators keep their running total incrementally; this is the
/// reference figure that running total must always agree with.
///
/// # Errors
///
/// - [`PricingError::Overflow`]: a line total did not fit in minor units.
/// - [`PricingError::Money`]: an item is priced in a different currency.
pub fn total_spent(
    items: &[CartItem],
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    items
        .iter()
        .try_fold(
            Money::from_minor(0, currency),
            |acc, item| -> Result<_, PricingError> { Ok(acc.add(item.line_total()?)?) },
        )
}

/// Converts money into a major-unit decimal (e.g. 399 cents -> 3.99).
pub fn to_decimal(money: &Money<'_, Currency>) -> Decimal {
    Decimal::new(money.to_minor_units(), money.currency().exponent)
}

/// Converts a major-unit decimal into money, rounding half away from zero.
///
/// # Errors
///
/// Returns [`PricingError::Unrepresentable`] if the rounded amount does not
/// fit in minor units.
pub fn from_decimal(
    amount: Decimal,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    let mut rounded =
        amount.round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero);

    rounded.rescale(currency.exponent);

    let minor = i64::try_from(rounded.mantissa())
        .map_err(|_err| PricingError::Unrepresentable(amount))?;

    Ok(Money::from_minor(minor, currency))
}
