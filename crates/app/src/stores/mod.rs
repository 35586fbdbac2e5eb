//! Stores
//!
//! Each store publishes immutable snapshots through a `watch` channel.
//! Mutations work on a copy of the current snapshot and only replace it once
//! the whole operation has succeeded.

pub mod carts;
pub mod chat;

pub use carts::CartStore;
pub use chat::ChatStore;
