//! Parsing of user-entered numbers
//!
//! Form values arrive as text. Anything that is not a sensible amount is
//! refused here, before a store operation is ever invoked.

use std::str::FromStr;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::pricing::{PricingError, from_decimal};

/// Input Parsing Errors
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    /// Not a number at all
    #[error("not a valid number: {0:?}")]
    NotANumber(String),

    /// A value below zero
    #[error("value cannot be negative: {0}")]
    Negative(String),

    /// A value that has to be above zero
    #[error("value must be greater than zero: {0}")]
    NotPositive(String),

    /// A value with a fractional part where a whole number is expected
    #[error("expected a whole number: {0}")]
    NotWhole(String),

    /// The amount could not be stored as money.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Parses a unit price such as `"3.99"`. Zero is allowed.
///
/// # Errors
///
/// Returns an [`InputError`] for non-numeric or negative input.
pub fn parse_price(
    input: &str,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, InputError> {
    let amount = parse_decimal(input)?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(InputError::Negative(input.trim().to_string()));
    }

    Ok(from_decimal(amount, currency)?)
}

/// Parses a budget such as `"150"`, which must be above zero.
///
/// # Errors
///
/// Returns an [`InputError`] for non-numeric, zero or negative input.
pub fn parse_budget(
    input: &str,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, InputError> {
    let budget = from_decimal(parse_decimal(input)?, currency)?;

    if budget.to_minor_units() <= 0 {
        return Err(InputError::NotPositive(input.trim().to_string()));
    }

    Ok(budget)
}

/// Parses an item quantity, which must be a whole number of at least 1.
///
/// # Errors
///
/// Returns an [`InputError`] for non-numeric, fractional, zero or negative input.
pub fn parse_quantity(input: &str) -> Result<u32, InputError> {
    let trimmed = input.trim();
    let value = parse_decimal(trimmed)?;

    if !value.fract().is_zero() {
        return Err(InputError::NotWhole(trimmed.to_string()));
    }

    if value <= Decimal::ZERO {
        return Err(InputError::NotPositive(trimmed.to_string()));
    }

    u32::try_from(value.mantissa() / 10_i128.pow(value.scale()))
        .map_err(|_err| InputError::NotANumber(trimmed.to_string()))
}

/// Parses one member's custom split amount. A blank field counts as zero.
///
/// # Errors
///
/// Returns an [`InputError`] for non-numeric or negative input.
pub fn parse_custom_amount(input: &str) -> Result<Decimal, InputError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let amount = parse_decimal(trimmed)?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(InputError::Negative(trimmed.to_string()));
    }

    Ok(amount)
}

fn parse_decimal(input: &str) -> Result<Decimal, InputError> {
    let trimmed = input.trim();

    Decimal::from_str(trimmed).map_err(|_err| InputError::NotANumber(trimmed.to_string()))
}
