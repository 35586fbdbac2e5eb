//! Shared Cart
//!
//! Shared Cart is the domain engine for a collaborative shopping list: members
//! share a cart, track spending against a budget, divide the bill and chat
//! about what to buy.

pub mod browse;
pub mod budget;
pub mod cart;
pub mod chat;
pub mod fixtures;
pub mod input;
pub mod items;
pub mod members;
pub mod prelude;
pub mod pricing;
pub mod report;
pub mod splits;
pub mod suggestions;
pub mod uuids;
