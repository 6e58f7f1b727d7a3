//! Recording accept/reject decisions and feeding them to the lock policy.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::domain::models::{
    Decision, DecisionEvent, PolicyOutcome, ProgressStats, SessionState, SuggestionPair,
};
use crate::domain::ports::{AuthProvider, Clock, EventLog, Notification, NotificationResponse, Notifier};

use super::lock_policy::LockPolicyEngine;
use super::progress_evaluator::ProgressEvaluator;

/// What recording one decision produced.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionReport {
    /// The event sent to the event log
    pub event: DecisionEvent,
    /// Stats of the decision's code context, when history could be read
    pub progress: Option<ProgressStats>,
    /// Policy verdict, absent for anonymous users or on policy failures
    pub outcome: Option<PolicyOutcome>,
}

/// Turns accept/reject verdicts into logged events and policy evaluations.
pub struct DecisionTracker {
    event_log: Arc<dyn EventLog>,
    auth: Arc<dyn AuthProvider>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    policy: Arc<LockPolicyEngine>,
}

impl DecisionTracker {
    pub fn new(
        event_log: Arc<dyn EventLog>,
        auth: Arc<dyn AuthProvider>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        policy: Arc<LockPolicyEngine>,
    ) -> Self {
        Self {
            event_log,
            auth,
            notifier,
            clock,
            policy,
        }
    }

    /// Record the user's verdict on the pending suggestion of `session`.
    ///
    /// Returns `None` when no suggestion was pending. Collaborator failures
    /// are logged and never propagated; the session is cleared regardless.
    #[instrument(skip(self, session))]
    pub async fn record(
        &self,
        decision: Decision,
        session: &Mutex<SessionState>,
    ) -> Option<DecisionReport> {
        let Some(context) = session.lock().await.begin_decision(decision) else {
            debug!("No pending suggestion to decide on");
            return None;
        };

        let elapsed_ms = context.elapsed_ms(self.clock.now());
        let auth = self.auth.current();
        let user_id = auth.user_id().map(str::to_string);
        if user_id.is_none() {
            warn!("Recording decision without a signed-in user");
        }

        let code_context_id = match &user_id {
            Some(user) => match self.policy.code_context_id(user).await {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(error = %e, "Could not resolve code context, skipping policy evaluation");
                    None
                }
            },
            None => None,
        };

        let event = DecisionEvent {
            decision,
            user_id,
            suggestion_id: context.suggestion_id.clone(),
            has_bug: context.has_bug,
            elapsed_ms,
            code_context_id,
            timestamp: Some(self.clock.now()),
        };
        if let Err(e) = self.event_log.track(&event.to_log_event()).await {
            warn!(error = %e, "Failed to log decision");
        }
        info!(
            event = %decision.kind(),
            suggestion_id = %event.suggestion_id,
            has_bug = event.has_bug,
            elapsed_ms,
            "Decision recorded"
        );

        let (progress, outcome) = self.evaluate(&event).await;

        if decision == Decision::Accept && context.has_bug {
            if let Some(pair) = &context.suggestions {
                self.warn_buggy_acceptance(pair).await;
            }
        }

        session.lock().await.finish_decision();

        Some(DecisionReport {
            event,
            progress,
            outcome,
        })
    }

    async fn evaluate(&self, event: &DecisionEvent) -> (Option<ProgressStats>, Option<PolicyOutcome>) {
        let (Some(user_id), Some(code_context_id)) = (&event.user_id, &event.code_context_id) else {
            return (None, None);
        };

        let history = match self.event_log.history(user_id, Some(code_context_id)).await {
            Ok(history) => history,
            Err(e) => {
                warn!(error = %e, "Failed to read decision history");
                return (None, None);
            }
        };

        let stats = ProgressEvaluator::evaluate_history(&history);
        debug!(%stats, "Progress evaluated");
        self.notifier.notify(Notification::Progress(stats)).await;

        match self.policy.evaluate(user_id, code_context_id, stats).await {
            Ok(outcome) => (Some(stats), Some(outcome)),
            Err(e) => {
                warn!(error = %e, "Lock policy evaluation failed");
                (Some(stats), None)
            }
        }
    }

    async fn warn_buggy_acceptance(&self, pair: &SuggestionPair) {
        warn!("Accepted a suggestion with an injected bug");
        let response = self
            .notifier
            .notify(Notification::BuggyAcceptance(pair.clone()))
            .await;
        if response == NotificationResponse::Review {
            self.notifier.show_comparison(pair).await;
        }
    }
}

impl std::fmt::Debug for DecisionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionTracker")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
