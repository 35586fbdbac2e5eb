//! Shared Cart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    browse::{ItemFilter, SortOrder, browse},
    budget::BudgetStatus,
    cart::{Cart, CartError, CartUuid, QuantityUpdate},
    chat::{ChatLog, ChatMessage, MessageUuid, Reaction, ReactionToggle},
    fixtures::{FixtureError, Seed},
    input::{InputError, parse_budget, parse_custom_amount, parse_price, parse_quantity},
    items::{CartItem, CartItemUuid, ItemError, NewCartItem},
    members::{Member, MemberUuid},
    pricing::PricingError,
    report::{ReportError, write_cart, write_chat, write_split},
    splits::{
        CustomSplitValidation, PaymentSplit, SplitError, SplitKind, SplitOutcome, SplitPolicy,
        calculate_split,
    },
    suggestions::{Suggestion, SuggestionError, suggest},
    uuids::TypedUuid,
};
