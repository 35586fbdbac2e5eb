//! Budget tracking

use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};

use crate::{cart::Cart, pricing::to_decimal};

/// How a cart's spending compares to its budget ceiling.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetStatus {
    budget: Money<'static, Currency>,
    spent: Money<'static, Currency>,
    remaining: Money<'static, Currency>,
    percent_used: Decimal,
}

impl BudgetStatus {
    /// Budget status for a cart, or `None` if no budget is set.
    ///
    /// # Errors
    ///
    /// Returns a `MoneyError` if the budget and total are in different currencies.
    pub fn for_cart(cart: &Cart) -> Result<Option<Self>, MoneyError> {
        cart.budget()
            .map(|budget| Self::new(*budget, *cart.total_spent()))
            .transpose()
    }

    /// Compare `spent` against `budget`.
    ///
    /// # Errors
    ///
    /// Returns a `MoneyError` if the amounts are in different currencies.
    pub fn new(
        budget: Money<'static, Currency>,
        spent: Money<'static, Currency>,
    ) -> Result<Self, MoneyError> {
        let remaining = budget.sub(spent)?;

        let percent_used = to_decimal(&spent)
            .checked_div(to_decimal(&budget))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map_or(Decimal::ONE_HUNDRED, |percent| {
                percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
            });

        Ok(Self {
            budget,
            spent,
            remaining,
            percent_used,
        })
    }

    /// Budget ceiling
    pub fn budget(&self) -> &Money<'static, Currency> {
        &self.budget
    }

    /// Amount spent so far
    pub fn spent(&self) -> &Money<'static, Currency> {
        &self.spent
    }

    /// `budget - spent`; negative once over budget
    pub fn remaining(&self) -> &Money<'static, Currency> {
        &self.remaining
    }

    /// Percentage of the budget used, capped at 100
    pub fn percent_used(&self) -> Decimal {
        self.percent_used
    }

    /// Returns `true` once spending exceeds the budget.
    pub fn is_over_budget(&self) -> bool {
        self.spent.to_minor_units() > self.budget.to_minor_units()
    }

    /// How far over budget the cart is, if it is.
    pub fn overage(&self) -> Option<Money<'static, Currency>> {
        self.is_over_budget().then(|| {
            Money::from_minor(-self.remaining.to_minor_units(), self.remaining.currency())
        })
    }
}
