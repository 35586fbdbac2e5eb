//! Suggestions service

use std::{
    fmt::Debug,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use mockall::automock;
use rusty_money::iso::Currency;
use sharedcart::suggestions::{Suggestion, SuggestionError, suggest};
use tokio::sync::watch;
use tracing::{debug, info};

/// Default pause before a suggestion request resolves.
pub const DEFAULT_SUGGESTION_DELAY: Duration = Duration::from_millis(2000);

/// Suspends a request for a while.
#[async_trait]
pub trait Delay: Debug + Send + Sync {
    /// Wait for `duration` to pass.
    async fn wait(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn wait(&self, _duration: Duration) {}
}

/// Produces item suggestions for a shopping goal.
#[automock]
#[async_trait]
pub trait SuggestionsService: Send + Sync {
    /// Suggest items for `goal` that are not already among `current_items`.
    async fn generate(
        &self,
        goal: String,
        current_items: Vec<String>,
    ) -> Result<Vec<Suggestion>, SuggestionError>;
}

/// Answers from the fixed catalogue after an artificial delay.
#[derive(Debug)]
pub struct MockSuggestionEngine<D> {
    delay: D,
    duration: Duration,
    currency: &'static Currency,
}

impl<D: Delay> MockSuggestionEngine<D> {
    /// Price suggestions in `currency` and wait `duration` through `delay`.
    pub fn new(delay: D, duration: Duration, currency: &'static Currency) -> Self {
        Self {
            delay,
            duration,
            currency,
        }
    }
}

#[async_trait]
impl<D: Delay> SuggestionsService for MockSuggestionEngine<D> {
    #[tracing::instrument(
        name = "suggestions.engine.generate",
        skip(self, current_items),
        fields(current_items = current_items.len()),
        err
    )]
    async fn generate(
        &self,
        goal: String,
        current_items: Vec<String>,
    ) -> Result<Vec<Suggestion>, SuggestionError> {
        if goal.trim().is_empty() {
            return Err(SuggestionError::EmptyGoal);
        }

        self.delay.wait(self.duration).await;

        suggest(&goal, &current_items, self.currency)
    }
}

/// What the suggestions panel is showing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionsState {
    /// A request is in flight
    pub loading: bool,

    /// Latest suggestions
    pub suggestions: Vec<Suggestion>,
}

/// Tracks the latest suggestion request.
///
/// Requests may overlap. Only the most recently started one is allowed to
/// publish its result; earlier ones resolve without touching the state.
pub struct SuggestionsPanel {
    service: Arc<dyn SuggestionsService>,
    state: watch::Sender<SuggestionsState>,
    generation: AtomicU64,
}

impl Debug for SuggestionsPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionsPanel")
            .field("state", &*self.state.borrow())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl SuggestionsPanel {
    /// Create an idle panel backed by `service`.
    pub fn new(service: Arc<dyn SuggestionsService>) -> Self {
        let (state, _rx) = watch::channel(SuggestionsState::default());

        Self {
            service,
            state,
            generation: AtomicU64::new(0),
        }
    }

    /// The current state.
    pub fn state(&self) -> SuggestionsState {
        self.state.borrow().clone()
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<SuggestionsState> {
        self.state.subscribe()
    }

    /// Ask for suggestions. Returns `Ok(true)` if this request's result was
    /// published, or `Ok(false)` if a newer request superseded it.
    ///
    /// # Errors
    ///
    /// Returns the service's error if this request is still the latest one.
    #[tracing::instrument(name = "suggestions.panel.request", skip(self, current_items), err)]
    pub async fn request(
        &self,
        goal: &str,
        current_items: Vec<String>,
    ) -> Result<bool, SuggestionError> {
        let mut generation = 0;

        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.loading = true;
        });

        let result = self.service.generate(goal.to_string(), current_items).await;

        let mut failure = None;
        let mut count = 0;

        let published = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }

            state.loading = false;

            match result {
                Ok(suggestions) => {
                    count = suggestions.len();
                    state.suggestions = suggestions;
                }
                Err(error) => failure = Some(error),
            }

            true
        });

        if !published {
            debug!(generation, "discarded superseded suggestions");

            return Ok(false);
        }

        if let Some(error) = failure {
            return Err(error);
        }

        info!(count, "published suggestions");

        Ok(true)
    }

    /// Drop the current suggestions. Any request in flight is superseded.
    pub fn clear(&self) {
        self.state.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = SuggestionsState::default();
        });
    }
}
