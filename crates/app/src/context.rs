//! App Context

use std::{sync::Arc, time::Duration};

use sharedcart::{
    fixtures::{FixtureError, Seed},
    members::Member,
    suggestions::SuggestionError,
};
use thiserror::Error;

use crate::{
    clock::Clock,
    stores::{CartStore, ChatStore},
    suggestions::{Delay, MockSuggestionEngine, SuggestionsPanel, SuggestionsService},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to load seed data")]
    Fixture(#[from] FixtureError),

    #[error("member not found in seed: {0}")]
    UnknownMember(String),
}

/// Everything a session needs: the stores, the suggestion panel and the
/// member acting in this session.
#[derive(Debug)]
pub struct AppContext {
    pub carts: CartStore,
    pub chat: ChatStore,
    pub suggestions: SuggestionsPanel,
    pub member: Member,
}

impl AppContext {
    /// Build application context from a seed, acting as the member with
    /// fixture key `member_key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the key names no seeded member.
    pub fn from_seed(
        seed: Seed,
        member_key: &str,
        clock: Arc<dyn Clock>,
        suggestions: Arc<dyn SuggestionsService>,
    ) -> Result<Self, AppInitError> {
        let member = seed
            .member(member_key)
            .cloned()
            .ok_or_else(|| AppInitError::UnknownMember(member_key.to_string()))?;

        Ok(Self {
            carts: CartStore::new(seed.cart, Arc::clone(&clock)),
            chat: ChatStore::new(seed.chat, clock),
            suggestions: SuggestionsPanel::new(suggestions),
            member,
        })
    }

    /// Build application context backed by the catalogue engine.
    ///
    /// # Errors
    ///
    /// Returns an error when the key names no seeded member.
    pub fn with_engine<D: Delay + 'static>(
        seed: Seed,
        member_key: &str,
        clock: Arc<dyn Clock>,
        delay: D,
        duration: Duration,
    ) -> Result<Self, AppInitError> {
        let engine = MockSuggestionEngine::new(delay, duration, seed.cart.currency());

        Self::from_seed(seed, member_key, clock, Arc::new(engine))
    }

    /// Request suggestions for `goal` against the items currently in the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`SuggestionError`] if the request fails and was not superseded.
    pub async fn suggest(&self, goal: &str) -> Result<bool, SuggestionError> {
        let current_items = self
            .carts
            .snapshot()
            .items()
            .iter()
            .map(|item| item.name().to_string())
            .collect();

        self.suggestions.request(goal, current_items).await
    }
}
