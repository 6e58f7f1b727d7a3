//! Per-session suggestion engine.
//!
//! Wires the debouncer, fetch gates, fetcher and decision tracker around one
//! `SessionState`. The editor integration calls `on_edit` for completion
//! requests and `accept`/`reject` for the user's verdicts.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use crate::domain::models::{Config, Decision, SessionState, SuggestionContext};
use crate::domain::ports::{
    prompt_text, AuthProvider, BugInjector, Clock, EventLog, Notification, Notifier,
    SuggestionService, UserStore,
};

use super::debouncer::{DebounceOutcome, EditDebouncer, EditEvent};
use super::decision_tracker::{DecisionReport, DecisionTracker};
use super::lock_policy::LockPolicyEngine;
use super::suggestion_fetcher::SuggestionFetcher;

/// Everything the engine talks to.
#[derive(Clone)]
pub struct Collaborators {
    /// AI service generating suggestion pairs
    pub suggestion_service: Arc<dyn SuggestionService>,
    /// Suggestion records, log events and decision history
    pub event_log: Arc<dyn EventLog>,
    /// Lock flags and code context ids
    pub user_store: Arc<dyn UserStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub notifier: Arc<dyn Notifier>,
    /// Picks the flawed or correct generation path per request
    pub bug_injector: Arc<dyn BugInjector>,
    pub clock: Arc<dyn Clock>,
}

/// Why an edit produced no suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skipped {
    /// A newer edit arrived before this one fired
    Superseded,
    /// The editor withdrew the request
    Cancelled,
    /// An accepted flawed suggestion has not been reviewed yet
    ReviewPending,
    /// No authenticated user
    SignedOut,
    /// The user is locked out of suggestions
    Locked,
    /// Nothing before the cursor
    EmptyPrompt,
    /// The suggestion service failed with `status`
    FetchFailed { status: u16 },
}

impl std::fmt::Display for Skipped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Superseded => f.write_str("superseded by a newer edit"),
            Self::Cancelled => f.write_str("cancelled by the editor"),
            Self::ReviewPending => f.write_str("a flagged suggestion is awaiting review"),
            Self::SignedOut => f.write_str("not signed in"),
            Self::Locked => f.write_str("suggestions are locked pending review"),
            Self::EmptyPrompt => f.write_str("nothing to complete"),
            Self::FetchFailed { status } => write!(f, "suggestion request failed ({status})"),
        }
    }
}

/// Suggestion lifecycle of one editor session.
pub struct SuggestionEngine {
    session: Arc<Mutex<SessionState>>,
    debouncer: EditDebouncer,
    fetcher: SuggestionFetcher,
    tracker: DecisionTracker,
    policy: Arc<LockPolicyEngine>,
    auth: Arc<dyn AuthProvider>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    in_flight: Mutex<()>,
}

impl SuggestionEngine {
    /// Build the components of one session around `collaborators`.
    pub fn new(config: &Config, collaborators: Collaborators) -> Self {
        let Collaborators {
            suggestion_service,
            event_log,
            user_store,
            auth,
            notifier,
            bug_injector,
            clock,
        } = collaborators;

        let policy = Arc::new(LockPolicyEngine::new(
            config.policy.clone(),
            user_store,
            Arc::clone(&event_log),
            Arc::clone(&notifier),
        ));
        let fetcher = SuggestionFetcher::new(
            suggestion_service,
            Arc::clone(&event_log),
            bug_injector,
            Arc::clone(&clock),
            config.model.clone(),
        );
        let tracker = DecisionTracker::new(
            event_log,
            Arc::clone(&auth),
            Arc::clone(&notifier),
            Arc::clone(&clock),
            Arc::clone(&policy),
        );

        Self {
            session: Arc::new(Mutex::new(SessionState::new())),
            debouncer: EditDebouncer::new(Duration::from_millis(config.engine.debounce_ms)),
            fetcher,
            tracker,
            policy,
            auth,
            notifier,
            clock,
            in_flight: Mutex::new(()),
        }
    }

    /// Shared handle to this engine's session state.
    pub fn session(&self) -> Arc<Mutex<SessionState>> {
        Arc::clone(&self.session)
    }

    pub const fn policy(&self) -> &Arc<LockPolicyEngine> {
        &self.policy
    }

    /// Completion items for an edit: the displayed suggestion, or nothing.
    pub async fn on_edit(&self, event: EditEvent) -> Vec<String> {
        self.suggest(event).await.map_or_else(|_| Vec::new(), |text| vec![text])
    }

    /// Run one edit through debounce, gates and fetch.
    ///
    /// On success the session's context holds the new suggestion and the
    /// displayed text is returned. Nothing is mutated on any other path.
    #[instrument(skip(self, event), fields(line = event.position.line))]
    pub async fn suggest(&self, event: EditEvent) -> Result<String, Skipped> {
        let ticket = match self.debouncer.debounce(&event.cancellation).await {
            DebounceOutcome::Fire(ticket) => ticket,
            DebounceOutcome::Superseded => return Err(Skipped::Superseded),
            DebounceOutcome::Cancelled => return Err(Skipped::Cancelled),
        };

        let _in_flight = self.in_flight.lock().await;
        if !self.debouncer.is_latest(&ticket) {
            return Err(Skipped::Superseded);
        }

        self.check_gates().await?;

        let prompt = prompt_text(event.document.as_ref(), event.position);
        if prompt.trim().is_empty() {
            return Err(Skipped::EmptyPrompt);
        }

        let result = self
            .fetcher
            .fetch(&prompt)
            .await
            .map_err(|e| Skipped::FetchFailed { status: e.status() })?;

        if event.cancellation.is_cancelled() {
            debug!("Completion cancelled during fetch, dropping suggestion");
            return Err(Skipped::Cancelled);
        }

        let displayed = result.displayed().to_string();
        if let Some(superseded) = self
            .session
            .lock()
            .await
            .offer(SuggestionContext::offered(result, self.clock.now()))
        {
            debug!(suggestion_id = %superseded.suggestion_id, "Undecided suggestion superseded");
        }
        Ok(displayed)
    }

    async fn check_gates(&self) -> Result<(), Skipped> {
        if self.session.lock().await.is_review_pending() {
            debug!("Review pending, suggestions paused");
            return Err(Skipped::ReviewPending);
        }

        let auth = self.auth.current();
        let Some(user_id) = auth.user_id() else {
            info!("Not signed in, prompting for sign-in");
            self.notifier.notify(Notification::SignInRequired).await;
            return Err(Skipped::SignedOut);
        };

        if self.policy.lock_state(user_id).await.is_locked() {
            info!(user_id, "Suggestions locked pending review");
            self.notifier
                .notify(Notification::SuggestionsLocked {
                    review_url: self.policy.config().review_url.clone(),
                })
                .await;
            return Err(Skipped::Locked);
        }

        Ok(())
    }

    /// The user accepted the pending suggestion.
    pub async fn accept(&self) -> Option<DecisionReport> {
        self.tracker.record(Decision::Accept, &self.session).await
    }

    /// The user rejected the pending suggestion.
    pub async fn reject(&self) -> Option<DecisionReport> {
        self.tracker.record(Decision::Reject, &self.session).await
    }

    /// Record a verdict from a boolean, as editor commands deliver it.
    pub async fn decide(&self, accepted: bool) -> Option<DecisionReport> {
        self.tracker
            .record(Decision::from_accepted(accepted), &self.session)
            .await
    }

    /// Record a verdict without waiting for logging and policy evaluation.
    pub fn decide_in_background(
        self: &Arc<Self>,
        accepted: bool,
    ) -> JoinHandle<Option<DecisionReport>> {
        let engine = Arc::clone(self);
        tokio::spawn(async move { engine.decide(accepted).await })
    }

    /// Drop pending debounce state, wait for outstanding log events and
    /// clear the session.
    pub async fn shutdown(&self) {
        self.debouncer.cancel_pending().await;
        self.fetcher.flush().await;
        self.session.lock().await.reset();
    }
}

impl std::fmt::Debug for SuggestionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionEngine")
            .field("debouncer", &self.debouncer)
            .field("fetcher", &self.fetcher)
            .finish_non_exhaustive()
    }
}
