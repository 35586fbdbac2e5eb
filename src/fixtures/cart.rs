//! Cart Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;

use crate::fixtures::FixtureError;

/// A complete session seed in YAML
#[derive(Debug, Deserialize)]
pub struct SeedFixture {
    /// ISO currency code every price is in (e.g. `USD`)
    pub currency: String,

    /// Cart details
    pub cart: CartFixture,

    /// Member roster; the first entries join first
    pub members: Vec<MemberFixture>,

    /// Starter items
    #[serde(default)]
    pub items: Vec<ItemFixture>,

    /// Chat history
    #[serde(default)]
    pub messages: Vec<MessageFixture>,
}

/// Cart Fixture
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Cart name
    pub name: String,

    /// Cart description
    pub description: Option<String>,

    /// Member key of the cart's creator
    pub owner: String,

    /// Budget ceiling (e.g. `"150.00 USD"`)
    pub budget: Option<String>,

    /// Share link
    pub share_url: Option<String>,
}

/// Member Fixture
#[derive(Debug, Deserialize)]
pub struct MemberFixture {
    /// Key other fixture entries use to refer to this member
    pub key: String,

    /// Display name
    pub name: String,

    /// Contact email
    pub email: String,

    /// Avatar reference
    #[serde(default)]
    pub avatar: String,
}

/// Item Fixture
#[derive(Debug, Deserialize)]
pub struct ItemFixture {
    /// Item name
    pub name: String,

    /// Unit price (e.g. `"3.99 USD"`)
    pub price: String,

    /// Number of units
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Category tag
    pub category: String,

    /// Member keys of everyone who added it; the first one created it
    pub added_by: Vec<String>,

    /// Description
    pub description: Option<String>,

    /// Image reference
    pub image: Option<String>,

    /// How long before seeding the item was added
    #[serde(default)]
    pub minutes_ago: i64,
}

/// Chat Message Fixture
#[derive(Debug, Deserialize)]
pub struct MessageFixture {
    /// Member key of the author
    pub author: String,

    /// Message body
    pub text: String,

    /// How long before seeding the message was sent
    #[serde(default)]
    pub minutes_ago: i64,

    /// Reactions on the message
    #[serde(default)]
    pub reactions: Vec<ReactionFixture>,
}

/// Reaction Fixture
#[derive(Debug, Deserialize)]
pub struct ReactionFixture {
    /// The emoji
    pub emoji: String,

    /// Member keys of everyone who reacted
    pub members: Vec<String>,
}

fn default_quantity() -> u32 {
    1
}

/// Look up a supported ISO currency by code.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for any other code.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

/// Parse a money string (e.g. `"2.99 USD"`) into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_money(s: &str) -> Result<Money<'static, Currency>, FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok(Money::from_minor(minor_units, parse_currency(currency_code)?))
}
