//! Fixtures
//!
//! The starting state of a session (members, cart, starter items and chat
//! history) is described in YAML files under `./fixtures`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use jiff::{Span, Timestamp};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    chat::ChatLog,
    fixtures::cart::{SeedFixture, parse_currency, parse_money},
    items::NewCartItem,
    members::{Member, MemberUuid},
};

pub mod cart;

/// Default directory seed sets are read from
pub const DEFAULT_FIXTURES_DIR: &str = "./fixtures";

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between the seed and a price
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// A member key that no member declares
    #[error("Member not found: {0}")]
    MemberNotFound(String),

    /// Two members declared with the same key
    #[error("Duplicate member key: {0}")]
    DuplicateMember(String),

    /// An item nobody added
    #[error("Item has no members in added_by: {0}")]
    NoContributors(String),

    /// A relative time that falls outside the supported range
    #[error("Invalid time offset: {0}")]
    Time(#[from] jiff::Error),

    /// The cart refused seeded data
    #[error("Failed to build cart: {0}")]
    Cart(#[from] CartError),
}

/// The initial state of a session.
#[derive(Debug, Clone)]
pub struct Seed {
    /// The shared cart
    pub cart: Cart,

    /// Chat history
    pub chat: ChatLog,

    member_keys: FxHashMap<String, MemberUuid>,
}

impl Seed {
    /// Load a seed set by name from the default fixtures directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the seed is invalid.
    pub fn from_set(name: &str, now: Timestamp) -> Result<Self, FixtureError> {
        Self::from_set_in(DEFAULT_FIXTURES_DIR, name, now)
    }

    /// Load a seed set by name from `base_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the seed is invalid.
    pub fn from_set_in(
        base_path: impl Into<PathBuf>,
        name: &str,
        now: Timestamp,
    ) -> Result<Self, FixtureError> {
        Self::from_file(base_path.into().join(format!("{name}.yml")), now)
    }

    /// Load a seed from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the seed is invalid.
    pub fn from_file(path: impl AsRef<Path>, now: Timestamp) -> Result<Self, FixtureError> {
        let contents = fs::read_to_string(path)?;

        Self::parse(&contents, now)
    }

    /// Build a seed from YAML text. Relative times are measured back from `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed, refers to unknown members or
    /// currencies, or describes items the cart refuses.
    pub fn parse(yaml: &str, now: Timestamp) -> Result<Self, FixtureError> {
        let fixture: SeedFixture = serde_norway::from_str(yaml)?;
        let currency = parse_currency(&fixture.currency)?;

        let mut members: Vec<Member> = Vec::with_capacity(fixture.members.len());
        let mut member_keys: FxHashMap<String, MemberUuid> = FxHashMap::default();

        for member in fixture.members {
            let joined = Member::new(member.name, member.email, member.avatar);

            if member_keys.insert(member.key.clone(), joined.uuid()).is_some() {
                return Err(FixtureError::DuplicateMember(member.key));
            }

            members.push(joined);
        }

        let lookup = |key: &str| {
            member_keys
                .get(key)
                .copied()
                .ok_or_else(|| FixtureError::MemberNotFound(key.to_string()))
        };

        let owner_uuid = lookup(&fixture.cart.owner)?;

        let Some(owner_position) = members.iter().position(|member| member.uuid() == owner_uuid)
        else {
            return Err(FixtureError::MemberNotFound(fixture.cart.owner));
        };

        let owner = members.remove(owner_position);
        let mut cart = Cart::new(fixture.cart.name, owner, currency, now);

        if let Some(description) = fixture.cart.description {
            cart = cart.with_description(description);
        }

        if let Some(share_url) = fixture.cart.share_url {
            cart = cart.with_share_url(share_url);
        }

        for member in members {
            cart.add_member(member);
        }

        if let Some(budget) = fixture.cart.budget.as_deref() {
            cart.update_budget(Some(expect_currency(parse_money(budget)?, currency)?))?;
        }

        for item in fixture.items {
            let mut added_by = item.added_by.iter();

            let Some(first) = added_by.next() else {
                return Err(FixtureError::NoContributors(item.name));
            };

            let mut draft = NewCartItem::new(
                item.name,
                expect_currency(parse_money(&item.price)?, currency)?,
                item.quantity,
                item.category,
            );

            draft.description = item.description;
            draft.image = item.image;

            let added_at = now.checked_sub(Span::new().try_minutes(item.minutes_ago)?)?;
            let uuid = cart.add_item(draft, lookup(first)?, added_at)?;

            for member in added_by {
                cart.co_add_item(uuid, lookup(member)?)?;
            }
        }

        let mut chat = ChatLog::new();

        for message in fixture.messages {
            let author_uuid = lookup(&message.author)?;

            let Some(author) = cart.member(author_uuid) else {
                return Err(FixtureError::MemberNotFound(message.author));
            };

            let sent_at = now.checked_sub(Span::new().try_minutes(message.minutes_ago)?)?;
            let uuid = chat.push(author, message.text, sent_at);

            for reaction in message.reactions {
                for member in &reaction.members {
                    chat.toggle_reaction(uuid, &reaction.emoji, lookup(member)?);
                }
            }
        }

        Ok(Self {
            cart,
            chat,
            member_keys,
        })
    }

    /// Look up a member by fixture key.
    pub fn member(&self, key: &str) -> Option<&Member> {
        self.member_keys
            .get(key)
            .and_then(|uuid| self.cart.member(*uuid))
    }
}

fn expect_currency(
    money: rusty_money::Money<'static, rusty_money::iso::Currency>,
    currency: &'static rusty_money::iso::Currency,
) -> Result<rusty_money::Money<'static, rusty_money::iso::Currency>, FixtureError> {
    if money.currency() == currency {
        Ok(money)
    } else {
        Err(FixtureError::CurrencyMismatch(
            currency.iso_alpha_code.to_string(),
            money.currency().iso_alpha_code.to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use jiff::ToSpan;
    use rust_decimal::Decimal;
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use super::*;
    use crate::splits::{SplitPolicy, calculate_split};

    const SEED: &str = r#"
currency: USD
cart:
  name: Family Grocery List
  owner: john
  budget: "150.00 USD"
  share_url: https://sharedcart.app/cart/abc123
members:
  - key: john
    name: John Doe
    email: john@example.com
  - key: jane
    name: Jane Smith
    email: jane@example.com
  - key: mike
    name: Mike Johnson
    email: mike@example.com
items:
  - name: Organic Bananas
    price: "3.99 USD"
    quantity: 2
    category: Fruits
    added_by: [john]
    minutes_ago: 30
  - name: Whole Milk
    price: "4.29 USD"
    category: Dairy
    added_by: [jane, mike]
messages:
  - author: jane
    text: Hey everyone! I added milk to the cart
    minutes_ago: 60
    reactions:
      - emoji: "👍"
        members: [john, mike]
"#;

    #[test]
    fn parse_builds_cart_and_chat() -> TestResult {
        let now = Timestamp::UNIX_EPOCH.checked_add(24.hours())?;
        let seed = Seed::parse(SEED, now)?;

        assert_eq!(seed.cart.name(), "Family Grocery List");
        assert_eq!(seed.cart.members().len(), 3);
        assert_eq!(seed.cart.share_url(), "https://sharedcart.app/cart/abc123");
        assert_eq!(*seed.cart.total_spent(), Money::from_minor(1227, USD));
        assert_eq!(seed.cart.budget(), Some(&Money::from_minor(150_00, USD)));

        let john = seed.member("john").ok_or("john missing")?;
        assert_eq!(seed.cart.owner(), john.uuid());

        let bananas = seed.cart.items().first().ok_or("bananas missing")?;
        assert_eq!(bananas.created_at(), now.checked_sub(30.minutes())?);

        let message = seed.chat.messages().first().ok_or("message missing")?;
        assert_eq!(message.reaction_count("👍"), 2);
        assert_eq!(message.sent_at(), now.checked_sub(60.minutes())?);

        Ok(())
    }

    #[test]
    fn seeded_co_adders_share_items() -> TestResult {
        let seed = Seed::parse(SEED, Timestamp::UNIX_EPOCH)?;
        let jane = seed.member("jane").ok_or("jane missing")?;

        let outcome = calculate_split(&seed.cart, &SplitPolicy::ItemBased)?;

        assert_eq!(outcome.amount_for(jane.uuid()), Some(Decimal::new(2145, 3)));

        Ok(())
    }

    #[test]
    fn unknown_member_key_is_reported() {
        let yaml = SEED.replace("added_by: [john]", "added_by: [sam]");

        let result = Seed::parse(&yaml, Timestamp::UNIX_EPOCH);

        assert!(matches!(result, Err(FixtureError::MemberNotFound(key)) if key == "sam"));
    }

    #[test]
    fn mismatched_currency_is_reported() {
        let yaml = SEED.replace("\"3.99 USD\"", "\"3.99 GBP\"");

        let result = Seed::parse(&yaml, Timestamp::UNIX_EPOCH);

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_, found)) if found == "GBP"));
    }

    #[test]
    fn out_of_range_item_offset_is_a_time_error() {
        let yaml = SEED.replace("minutes_ago: 30", "minutes_ago: 9223372036854775807");

        let result = Seed::parse(&yaml, Timestamp::UNIX_EPOCH);

        assert!(matches!(result, Err(FixtureError::Time(_))));
    }

    #[test]
    fn out_of_range_message_offset_is_a_time_error() {
        let yaml = SEED.replace("minutes_ago: 60", "minutes_ago: -9223372036854775808");

        let result = Seed::parse(&yaml, Timestamp::UNIX_EPOCH);

        assert!(matches!(result, Err(FixtureError::Time(_))));
    }

    #[test]
    fn from_set_in_reads_named_file() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut file = fs::File::create(dir.path().join("weekly.yml"))?;
        file.write_all(SEED.as_bytes())?;

        let seed = Seed::from_set_in(dir.path(), "weekly", Timestamp::UNIX_EPOCH)?;

        assert_eq!(seed.cart.len(), 2);

        Ok(())
    }

    #[test]
    fn missing_set_is_an_io_error() {
        let result = Seed::from_set_in("./does-not-exist", "nope", Timestamp::UNIX_EPOCH);

        assert!(matches!(result, Err(FixtureError::Io(_))));
    }
}
