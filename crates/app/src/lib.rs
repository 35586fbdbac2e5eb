//! Session services for the shared cart: stores, suggestions and configuration.

pub mod clock;
pub mod config;
pub mod context;
pub mod logging;
pub mod stores;
pub mod suggestions;
