//! Items

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use smallvec::{SmallVec, smallvec};
use thiserror::Error;

use crate::{
    members::MemberUuid,
    pricing::{PricingError, line_total},
    uuids::TypedUuid,
};

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItem>;

/// Reasons an item draft is refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ItemError {
    /// The item has no name.
    #[error("item name cannot be empty")]
    EmptyName,

    /// The item has no category.
    #[error("item category cannot be empty")]
    EmptyCategory,

    /// The unit price is below zero (minor units).
    #[error("item price cannot be negative, got {0} minor units")]
    NegativePrice(i64),

    /// Items must be added at least once.
    #[error("item quantity must be at least 1")]
    ZeroQuantity,
}

/// An item as entered by a member, before it joins a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartItem {
    /// Item name
    pub name: String,

    /// Unit price
    pub price: Money<'static, Currency>,

    /// Number of units
    pub quantity: u32,

    /// Free-form category tag
    pub category: String,

    /// Optional free-text description
    pub description: Option<String>,

    /// Optional image reference
    pub image: Option<String>,
}

impl NewCartItem {
    /// Creates a draft with no description or image.
    pub fn new(
        name: impl Into<String>,
        price: Money<'static, Currency>,
        quantity: u32,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            price,
            quantity,
            category: category.into(),
            description: None,
            image: None,
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach an image reference.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Checks the draft can become a cart item.
    ///
    /// An empty description is fine.
    ///
    /// # Errors
    ///
    /// Returns the first [`ItemError`] found.
    pub fn validate(&self) -> Result<(), ItemError> {
        if self.name.trim().is_empty() {
            return Err(ItemError::EmptyName);
        }

        if self.category.trim().is_empty() {
            return Err(ItemError::EmptyCategory);
        }

        let minor = self.price.to_minor_units();

        if minor < 0 {
            return Err(ItemError::NegativePrice(minor));
        }

        if self.quantity == 0 {
            return Err(ItemError::ZeroQuantity);
        }

        Ok(())
    }
}

/// An item in a shared cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    uuid: CartItemUuid,
    name: String,
    price: Money<'static, Currency>,
    quantity: u32,
    category: String,
    added_by: SmallVec<[MemberUuid; 2]>,
    description: Option<String>,
    image: Option<String>,
    created_at: Timestamp,
}

impl CartItem {
    /// Build an item from a draft; the draft is assumed valid.
    pub(crate) fn from_draft(
        draft: NewCartItem,
        added_by: MemberUuid,
        created_at: Timestamp,
    ) -> Self {
        Self {
            uuid: CartItemUuid::new(),
            name: draft.name,
            price: draft.price,
            quantity: draft.quantity,
            category: draft.category,
            added_by: smallvec![added_by],
            description: draft.description,
            image: draft.image,
            created_at,
        }
    }

    /// Item id
    pub fn uuid(&self) -> CartItemUuid {
        self.uuid
    }

    /// Item name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price
    pub fn price(&self) -> &Money<'static, Currency> {
        &self.price
    }

    /// Number of units, always at least 1
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Category tag
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Members who added this item, in the order they added it
    pub fn added_by(&self) -> &[MemberUuid] {
        &self.added_by
    }

    /// Description, if any
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Image reference, if any
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// When the item was first added
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns `true` if the member is one of the item's contributors.
    pub fn was_added_by(&self, member: MemberUuid) -> bool {
        self.added_by.contains(&member)
    }

    /// Calculates `price * quantity`.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the total does not fit in minor units.
    pub fn line_total(&self) -> Result<Money<'static, Currency>, PricingError> {
        line_total(&self.price, self.quantity)
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    /// Returns `false` if the member was already a contributor.
    pub(crate) fn add_contributor(&mut self, member: MemberUuid) -> bool {
        if self.was_added_by(member) {
            return false;
        }

        self.added_by.push(member);

        true
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;

    use super::*;

    fn bananas() -> NewCartItem {
        NewCartItem::new("Organic Bananas", Money::from_minor(399, USD), 2, "Fruits")
    }

    #[test]
    fn validate_accepts_empty_description() {
        let draft = bananas().with_description("");

        assert_eq!(draft.validate(), Ok(()));
    }

    #[test]
    fn validate_accepts_free_items() {
        let mut draft = bananas();
        draft.price = Money::from_minor(0, USD);

        assert_eq!(draft.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_negative_price() {
        let mut draft = bananas();
        draft.price = Money::from_minor(-1, USD);

        assert_eq!(draft.validate(), Err(ItemError::NegativePrice(-1)));
    }

    #[test]
    fn validate_rejects_zero_quantity() {
        let mut draft = bananas();
        draft.quantity = 0;

        assert_eq!(draft.validate(), Err(ItemError::ZeroQuantity));
    }

    #[test]
    fn validate_rejects_blank_name_and_category() {
        let mut draft = bananas();
        draft.name = "   ".to_string();

        assert_eq!(draft.validate(), Err(ItemError::EmptyName));

        let mut draft = bananas();
        draft.category = String::new();

        assert_eq!(draft.validate(), Err(ItemError::EmptyCategory));
    }

    #[test]
    fn contributors_are_not_duplicated() {
        let first = MemberUuid::new();
        let second = MemberUuid::new();
        let mut item = CartItem::from_draft(bananas(), first, Timestamp::UNIX_EPOCH);

        assert!(!item.add_contributor(first));
        assert!(item.add_contributor(second));
        assert_eq!(item.added_by(), &[first, second]);
        assert!(item.was_added_by(second));
    }
}
