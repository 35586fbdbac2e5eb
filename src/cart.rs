//! Cart

use jiff::Timestamp;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    items::{CartItem, CartItemUuid, ItemError, NewCartItem},
    members::{Member, MemberUuid},
    pricing::PricingError,
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<Cart>;

/// Errors related to cart mutations. A failed mutation leaves the cart untouched.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// The item draft was refused.
    #[error(transparent)]
    Item(#[from] ItemError),

    /// Money in a different currency to the cart (given currency, cart currency).
    #[error("amount has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// The acting member is not on the cart's roster.
    #[error("member {0} is not part of this cart")]
    UnknownMember(MemberUuid),

    /// Budgets must be positive (minor units).
    #[error("budget must be positive, got {0} minor units")]
    InvalidBudget(i64),

    /// The requested quantity does not fit in a `u32`.
    #[error("quantity {0} is too large")]
    QuantityTooLarge(i64),

    /// Errors bubbled up from line total calculation.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Outcome of [`Cart::update_quantity`].
#[derive(Debug, Clone, PartialEq)]
pub enum QuantityUpdate {
    /// The quantity was replaced.
    Updated {
        /// Quantity before the update
        previous: u32,
        /// Quantity after the update
        current: u32,
    },

    /// The quantity dropped to zero or below, so the item was removed.
    Removed(CartItem),

    /// No item has that id; nothing changed.
    Missing,
}

/// A shared shopping cart.
///
/// `total_spent` is maintained incrementally by every mutator and always
/// equals the sum of `price * quantity` over the items present.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    uuid: CartUuid,
    name: String,
    description: Option<String>,
    owner: MemberUuid,
    members: Vec<Member>,
    items: Vec<CartItem>,
    currency: &'static Currency,
    budget: Option<Money<'static, Currency>>,
    total_spent: Money<'static, Currency>,
    created_at: Timestamp,
    share_url: String,
}

impl Cart {
    /// Create an empty cart owned by `owner`, who becomes its first member.
    pub fn new(
        name: impl Into<String>,
        owner: Member,
        currency: &'static Currency,
        created_at: Timestamp,
    ) -> Self {
        let uuid = CartUuid::new();

        Cart {
            uuid,
            name: name.into(),
            description: None,
            owner: owner.uuid(),
            members: vec![owner],
            items: Vec::new(),
            currency,
            budget: None,
            total_spent: Money::from_minor(0, currency),
            created_at,
            share_url: format!("https://sharedcart.app/cart/{}", uuid.into_uuid().simple()),
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the generated share link.
    #[must_use]
    pub fn with_share_url(mut self, share_url: impl Into<String>) -> Self {
        self.share_url = share_url.into();
        self
    }

    /// Add an item on behalf of `member`, who must be on the roster.
    ///
    /// # Errors
    ///
    /// - [`CartError::Item`]: the draft failed validation.
    /// - [`CartError::CurrencyMismatch`]: the draft is priced in another currency.
    /// - [`CartError::UnknownMember`]: the member is not on the roster.
    /// - [`CartError::Pricing`] / [`CartError::Money`]: the total could not be updated.
    pub fn add_item(
        &mut self,
        draft: NewCartItem,
        member: MemberUuid,
        added_at: Timestamp,
    ) -> Result<CartItemUuid, CartError> {
        draft.validate()?;
        self.ensure_currency(&draft.price)?;
        self.ensure_member(member)?;

        let item = CartItem::from_draft(draft, member, added_at);
        let total_spent = self.total_spent.add(item.line_total()?)?;
        let uuid = item.uuid();

        self.items.push(item);
        self.total_spent = total_spent;

        Ok(uuid)
    }

    /// Record that another member also added an existing item.
    ///
    /// Returns `Ok(false)` if the item is absent or the member already
    /// contributed to it. The total is unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownMember`] if the member is not on the roster.
    pub fn co_add_item(
        &mut self,
        item: CartItemUuid,
        member: MemberUuid,
    ) -> Result<bool, CartError> {
        self.ensure_member(member)?;

        Ok(self
            .items
            .iter_mut()
            .find(|candidate| candidate.uuid() == item)
            .is_some_and(|item| item.add_contributor(member)))
    }

    /// Remove an item, returning it. Unknown ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the total could not be updated.
    pub fn remove_item(&mut self, item: CartItemUuid) -> Result<Option<CartItem>, CartError> {
        let Some(position) = self.items.iter().position(|candidate| candidate.uuid() == item)
        else {
            return Ok(None);
        };

        let Some(line_total) = self.items.get(position).map(CartItem::line_total) else {
            return Ok(None);
        };

        let total_spent = self.total_spent.sub(line_total?)?;

        self.total_spent = total_spent;

        Ok(Some(self.items.remove(position)))
    }

    /// Replace an item's quantity; zero or below removes the item.
    ///
    /// The total is adjusted by `(new - old) * price` rather than re-summed.
    ///
    /// # Errors
    ///
    /// - [`CartError::QuantityTooLarge`]: the quantity does not fit in a `u32`.
    /// - [`CartError::Pricing`] / [`CartError::Money`]: the total could not be updated.
    pub fn update_quantity(
        &mut self,
        item: CartItemUuid,
        quantity: i64,
    ) -> Result<QuantityUpdate, CartError> {
        if quantity <= 0 {
            return Ok(self
                .remove_item(item)?
                .map_or(QuantityUpdate::Missing, QuantityUpdate::Removed));
        }

        let current =
            u32::try_from(quantity).map_err(|_err| CartError::QuantityTooLarge(quantity))?;

        let Some(entry) = self.items.iter_mut().find(|candidate| candidate.uuid() == item) else {
            return Ok(QuantityUpdate::Missing);
        };

        let previous = entry.quantity();

        let delta_minor = (i64::from(current) - i64::from(previous))
            .checked_mul(entry.price().to_minor_units())
            .ok_or(PricingError::Overflow)?;

        let total_minor = self
            .total_spent
            .to_minor_units()
            .checked_add(delta_minor)
            .ok_or(PricingError::Overflow)?;

        entry.set_quantity(current);
        self.total_spent = Money::from_minor(total_minor, self.currency);

        Ok(QuantityUpdate::Updated { previous, current })
    }

    /// Replace the budget ceiling; `None` clears it.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidBudget`]: the budget is zero or negative.
    /// - [`CartError::CurrencyMismatch`]: the budget is in another currency.
    pub fn update_budget(
        &mut self,
        budget: Option<Money<'static, Currency>>,
    ) -> Result<(), CartError> {
        if let Some(budget) = &budget {
            self.ensure_currency(budget)?;

            let minor = budget.to_minor_units();

            if minor <= 0 {
                return Err(CartError::InvalidBudget(minor));
            }
        }

        self.budget = budget;

        Ok(())
    }

    /// Add a member to the roster. Returns `false` if they were already on it.
    pub fn add_member(&mut self, member: Member) -> bool {
        if self.member(member.uuid()).is_some() {
            return false;
        }

        self.members.push(member);

        true
    }

    /// Cart id
    pub fn uuid(&self) -> CartUuid {
        self.uuid
    }

    /// Cart name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description, if any
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The member who created the cart
    pub fn owner(&self) -> MemberUuid {
        self.owner
    }

    /// Member roster, in joining order
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Look up a member on the roster.
    pub fn member(&self, uuid: MemberUuid) -> Option<&Member> {
        self.members.iter().find(|member| member.uuid() == uuid)
    }

    /// Items, in the order they were added
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up an item.
    pub fn item(&self, uuid: CartItemUuid) -> Option<&CartItem> {
        self.items.iter().find(|item| item.uuid() == uuid)
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Budget ceiling, if set
    pub fn budget(&self) -> Option<&Money<'static, Currency>> {
        self.budget.as_ref()
    }

    /// Running total of `price * quantity` over all items
    pub fn total_spent(&self) -> &Money<'static, Currency> {
        &self.total_spent
    }

    /// When the cart was created
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Opaque link handed to the platform share facility
    pub fn share_url(&self) -> &str {
        &self.share_url
    }

    /// Get the number of distinct items in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Unique item categories, in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();

        for item in &self.items {
            if !categories.contains(&item.category()) {
                categories.push(item.category());
            }
        }

        categories
    }

    fn ensure_currency(&self, money: &Money<'static, Currency>) -> Result<(), CartError> {
        if money.currency() == self.currency {
            Ok(())
        } else {
            Err(CartError::CurrencyMismatch(
                money.currency().iso_alpha_code,
                self.currency.iso_alpha_code,
            ))
        }
    }

    fn ensure_member(&self, member: MemberUuid) -> Result<(), CartError> {
        if self.member(member).is_some() {
            Ok(())
        } else {
            Err(CartError::UnknownMember(member))
        }
    }
}
