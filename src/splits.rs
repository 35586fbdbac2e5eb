//! Payment splits
//!
//! Derives how a cart's total should be shared between its members. Splits
//! are never stored; they are recalculated from a cart snapshot on demand.
//!
//! Amounts are major-unit [`Decimal`]s rather than `Money`, because a fair
//! share can fall between minor units (two members sharing $4.29 owe $2.145
//! each).

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    cart::Cart,
    members::MemberUuid,
    pricing::{PricingError, to_decimal},
};

/// Custom splits are accepted when they miss the total by strictly less than this (0.01).
pub const CUSTOM_SPLIT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Errors that can occur while calculating a split.
#[derive(Debug, Error, PartialEq)]
pub enum SplitError {
    /// A line total could not be calculated.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Decimal arithmetic overflowed.
    #[error("split arithmetic overflowed")]
    Overflow,
}

/// The policy a split was calculated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitKind {
    /// Everyone pays the same
    Even,

    /// Each item is shared by the members who added it
    ItemBased,

    /// Amounts chosen by the members
    Custom,
}

/// One member's share of the total.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSplit {
    /// Member paying
    pub member: MemberUuid,

    /// Amount owed, in major units
    pub amount: Decimal,

    /// Policy the amount came from
    pub kind: SplitKind,
}

/// How to divide the total.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SplitPolicy {
    /// Divide the total evenly between all members.
    Even,

    /// Divide each item between the members who added it.
    #[default]
    ItemBased,

    /// Use caller-supplied amounts; members left out pay nothing.
    Custom(FxHashMap<MemberUuid, Decimal>),
}

/// Result of checking custom amounts against the cart total.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomSplitValidation {
    /// Sum of the amounts allocated to roster members
    pub supplied_total: Decimal,

    /// The cart's total spent
    pub expected_total: Decimal,

    /// `supplied_total - expected_total`
    pub delta: Decimal,

    /// `|delta| < 0.01` and no amount is negative
    pub valid: bool,
}

/// A calculated split, plus the validation result for custom policies.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitOutcome {
    /// One entry per member
    pub splits: Vec<PaymentSplit>,

    /// Present only for [`SplitPolicy::Custom`]
    pub validation: Option<CustomSplitValidation>,
}

impl SplitOutcome {
    /// Returns `false` only for a custom split that failed validation.
    pub fn is_valid(&self) -> bool {
        self.validation
            .as_ref()
            .is_none_or(|validation| validation.valid)
    }

    /// Sum of every allocated amount.
    pub fn total(&self) -> Decimal {
        self.splits.iter().map(|split| split.amount).sum()
    }

    /// The amount allocated to one member.
    pub fn amount_for(&self, member: MemberUuid) -> Option<Decimal> {
        self.splits
            .iter()
            .find(|split| split.member == member)
            .map(|split| split.amount)
    }
}

/// Calculates a split of the cart's total under the given policy.
///
/// # Errors
///
/// Returns a [`SplitError`] if an item's line total overflows or the
/// division cannot be represented.
pub fn calculate_split(cart: &Cart, policy: &SplitPolicy) -> Result<SplitOutcome, SplitError> {
    match policy {
        SplitPolicy::Even => Ok(SplitOutcome {
            splits: even_split(cart)?,
            validation: None,
        }),
        SplitPolicy::ItemBased => Ok(SplitOutcome {
            splits: item_based_split(cart)?,
            validation: None,
        }),
        SplitPolicy::Custom(amounts) => {
            let (splits, validation) = custom_split(cart, amounts);

            Ok(SplitOutcome {
                splits,
                validation: Some(validation),
            })
        }
    }
}

/// `total / member_count` for every member of the cart.
///
/// # Errors
///
/// Returns [`SplitError::Overflow`] if the division cannot be represented.
pub fn even_split(cart: &Cart) -> Result<Vec<PaymentSplit>, SplitError> {
    let members: Vec<MemberUuid> = cart.members().iter().map(|member| member.uuid()).collect();

    even_split_among(to_decimal(cart.total_spent()), &members)
}

/// Divides `total` evenly between `members`; empty when there are no members.
///
/// # Errors
///
/// Returns [`SplitError::Overflow`] if the division cannot be represented.
pub fn even_split_among(
    total: Decimal,
    members: &[MemberUuid],
) -> Result<Vec<PaymentSplit>, SplitError> {
    if members.is_empty() {
        return Ok(Vec::new());
    }

    let share = total
        .checked_div(Decimal::from(members.len()))
        .ok_or(SplitError::Overflow)?;

    Ok(members
        .iter()
        .map(|member| PaymentSplit {
            member: *member,
            amount: share,
            kind: SplitKind::Even,
        })
        .collect())
}

/// Shares each item's line total between the members who added it.
///
/// Roster members come first in roster order (members who added nothing get
/// zero), followed by any contributors no longer on the roster.
///
/// # Errors
///
/// Returns a [`SplitError`] if a line total overflows.
pub fn item_based_split(cart: &Cart) -> Result<Vec<PaymentSplit>, SplitError> {
    let mut owed: FxHashMap<MemberUuid, Decimal> = FxHashMap::default();
    let mut contributors: Vec<MemberUuid> = Vec::new();

    for item in cart.items() {
        let sharers = item.added_by();

        if sharers.is_empty() {
            continue;
        }

        let share = to_decimal(&item.line_total()?)
            .checked_div(Decimal::from(sharers.len()))
            .ok_or(SplitError::Overflow)?;

        for member in sharers {
            let entry = owed.entry(*member).or_insert_with(|| {
                contributors.push(*member);
                Decimal::ZERO
            });

            *entry = entry.checked_add(share).ok_or(SplitError::Overflow)?;
        }
    }

    let roster = cart.members().iter().map(|member| member.uuid());
    let departed = contributors
        .into_iter()
        .filter(|member| cart.member(*member).is_none());

    Ok(roster
        .chain(departed)
        .map(|member| PaymentSplit {
            member,
            amount: owed.get(&member).copied().unwrap_or(Decimal::ZERO),
            kind: SplitKind::ItemBased,
        })
        .collect())
}

/// Allocates the supplied amounts to roster members and checks them against the total.
///
/// Amounts for members not on the roster are ignored. A mismatch is reported
/// through the validation flag, never as an error.
pub fn custom_split(
    cart: &Cart,
    amounts: &FxHashMap<MemberUuid, Decimal>,
) -> (Vec<PaymentSplit>, CustomSplitValidation) {
    let splits: Vec<PaymentSplit> = cart
        .members()
        .iter()
        .map(|member| PaymentSplit {
            member: member.uuid(),
            amount: amounts.get(&member.uuid()).copied().unwrap_or(Decimal::ZERO),
            kind: SplitKind::Custom,
        })
        .collect();

    let supplied_total: Decimal = splits.iter().map(|split| split.amount).sum();
    let expected_total = to_decimal(cart.total_spent());
    let delta = supplied_total - expected_total;
    let any_negative = splits.iter().any(|split| split.amount.is_sign_negative());

    let validation = CustomSplitValidation {
        supplied_total,
        expected_total,
        delta,
        valid: !any_negative && delta.abs() < CUSTOM_SPLIT_TOLERANCE,
    };

    (splits, validation)
}
