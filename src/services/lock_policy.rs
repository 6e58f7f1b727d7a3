//! Adaptive trust policy.
//!
//! Once a user has accepted enough suggestions within one code context, the
//! share of buggy acceptances decides between locking the user out of
//! suggestions and a milestone congratulation. Either way a fresh code
//! context starts so the next evaluation window counts from zero.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::{LockState, LogEvent, PolicyConfig, PolicyOutcome, ProgressStats};
use crate::domain::ports::{EventLog, Notification, Notifier, UserStore};

/// Generate a new opaque code context id.
pub fn new_code_context_id() -> String {
    Uuid::new_v4().to_string()
}

/// Decides lock state from progress and owns code context rotation.
///
/// Evaluations are serialized in-process so two decisions landing together
/// cannot both rotate the context. Consistency across processes is left to
/// the user store.
pub struct LockPolicyEngine {
    config: PolicyConfig,
    user_store: Arc<dyn UserStore>,
    event_log: Arc<dyn EventLog>,
    notifier: Arc<dyn Notifier>,
    evaluation: Mutex<()>,
    /// Users who passed a milestone and are held to the tightened cutoff
    tightened: Mutex<HashSet<String>>,
}

impl LockPolicyEngine {
    pub fn new(
        config: PolicyConfig,
        user_store: Arc<dyn UserStore>,
        event_log: Arc<dyn EventLog>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            user_store,
            event_log,
            notifier,
            evaluation: Mutex::new(()),
            tightened: Mutex::new(HashSet::new()),
        }
    }

    pub const fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Read the persisted lock flag.
    ///
    /// A failed read fails open: the user is treated as unlocked and the
    /// failure is logged.
    pub async fn lock_state(&self, user_id: &str) -> LockState {
        match self.user_store.get(user_id).await {
            Ok(record) => LockState::from_flag(record.is_some_and(|r| r.is_locked)),
            Err(e) => {
                warn!(user_id, error = %e, "Could not read lock state, treating user as unlocked");
                LockState::Unlocked
            }
        }
    }

    /// The user's current code context, created on first use.
    ///
    /// # Errors
    /// `PolicyStateFailure` when the user record cannot be read. A failure to
    /// persist a newly created id is only logged.
    #[instrument(skip(self))]
    pub async fn code_context_id(&self, user_id: &str) -> EngineResult<String> {
        let record = self
            .user_store
            .get(user_id)
            .await
            .map_err(EngineError::into_policy_failure)?;

        if let Some(existing) = record
            .and_then(|r| r.code_context_id)
            .filter(|id| !id.is_empty())
        {
            return Ok(existing);
        }

        let created = new_code_context_id();
        debug!(code_context_id = %created, "Starting first code context");
        if let Err(e) = self.user_store.set_code_context_id(user_id, &created).await {
            warn!(error = %e, "Failed to persist new code context id");
        }
        Ok(created)
    }

    /// Cutoff currently applied to `user_id`.
    pub async fn cutoff_for(&self, user_id: &str) -> f64 {
        let tightened = self.tightened.lock().await.contains(user_id);
        match self.config.tightened_bug_percentage {
            Some(cutoff) if tightened => cutoff,
            _ => self.config.bug_percentage,
        }
    }

    fn exceeds(&self, percentage: f64, cutoff: f64) -> bool {
        if self.config.inclusive_cutoff {
            percentage >= cutoff
        } else {
            percentage > cutoff
        }
    }

    /// Apply the policy to the stats of `code_context_id`.
    ///
    /// # Errors
    /// `PolicyStateFailure` when the lock flag cannot be persisted. The code
    /// context is then left as is, so the next decision evaluates again.
    #[instrument(skip(self, stats), fields(accepted = stats.total_accepted))]
    pub async fn evaluate(
        &self,
        user_id: &str,
        code_context_id: &str,
        stats: ProgressStats,
    ) -> EngineResult<PolicyOutcome> {
        let _guard = self.evaluation.lock().await;

        if stats.total_accepted < self.config.acceptance_threshold {
            return Ok(PolicyOutcome::Pending { stats });
        }

        let cutoff = self.cutoff_for(user_id).await;
        let next_context = new_code_context_id();
        let review_url = self.config.review_url.clone();

        let outcome = if self.exceeds(stats.percentage_with_bugs, cutoff) {
            self.user_store
                .set_locked(user_id, true)
                .await
                .map_err(EngineError::into_policy_failure)?;

            warn!(
                percentage = stats.percentage_with_bugs,
                cutoff, "Bug rate above cutoff, locking suggestions"
            );
            if let Err(e) = self
                .event_log
                .track(&LogEvent::user_locked(user_id, code_context_id))
                .await
            {
                warn!(error = %e, "Failed to log USER_LOCKED");
            }
            self.notifier
                .notify(Notification::UserLocked { review_url })
                .await;

            PolicyOutcome::Locked {
                stats,
                retired_context: code_context_id.to_string(),
                next_context: next_context.clone(),
            }
        } else {
            info!(
                percentage = stats.percentage_with_bugs,
                cutoff, "Milestone reached"
            );
            self.tightened.lock().await.insert(user_id.to_string());
            self.notifier
                .notify(Notification::Milestone { review_url })
                .await;

            PolicyOutcome::Milestone {
                stats,
                retired_context: code_context_id.to_string(),
                next_context: next_context.clone(),
            }
        };

        if let Err(e) = self
            .user_store
            .set_code_context_id(user_id, &next_context)
            .await
        {
            warn!(error = %e, "Failed to rotate code context");
        }

        Ok(outcome)
    }
}

impl std::fmt::Debug for LockPolicyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockPolicyEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{SuggestionPair, UserRecord};
    use crate::domain::ports::NotificationResponse;
    use crate::infrastructure::memory::{InMemoryEventLog, InMemoryUserStore};
    use async_trait::async_trait;

    #[derive(Default)]
    struct RecordingNotifier {
        seen: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, notification: Notification) -> NotificationResponse {
            self.seen.lock().await.push(notification);
            NotificationResponse::Dismissed
        }

        async fn show_comparison(&self, _pair: &SuggestionPair) {}
    }

    struct BrokenStore;

    #[async_trait]
    impl UserStore for BrokenStore {
        async fn get(&self, _user_id: &str) -> EngineResult<Option<UserRecord>> {
            Err(EngineError::NetworkFailure("connection refused".into()))
        }

        async fn set_locked(&self, _user_id: &str, _is_locked: bool) -> EngineResult<()> {
            Err(EngineError::NetworkFailure("connection refused".into()))
        }

        async fn set_code_context_id(&self, _user_id: &str, _id: &str) -> EngineResult<()> {
            Err(EngineError::NetworkFailure("connection refused".into()))
        }
    }

    struct Fixture {
        engine: LockPolicyEngine,
        store: Arc<InMemoryUserStore>,
        log: Arc<InMemoryEventLog>,
        notifier: Arc<RecordingNotifier>,
    }

    fn fixture(config: PolicyConfig) -> Fixture {
        let store = Arc::new(InMemoryUserStore::new());
        let log = Arc::new(InMemoryEventLog::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let engine = LockPolicyEngine::new(
            config,
            Arc::clone(&store) as Arc<dyn UserStore>,
            Arc::clone(&log) as Arc<dyn EventLog>,
            Arc::clone(&notifier) as Arc<dyn Notifier>,
        );
        Fixture {
            engine,
            store,
            log,
            notifier,
        }
    }

    #[tokio::test]
    async fn test_below_threshold_is_pending() {
        let f = fixture(PolicyConfig::default());
        let outcome = f
            .engine
            .evaluate("u1", "ctx", ProgressStats::new(19, 19))
            .await
            .unwrap();

        assert!(matches!(outcome, PolicyOutcome::Pending { .. }));
        assert!(f.notifier.seen.lock().await.is_empty());
        assert!(f.store.record("u1").await.is_none());
    }

    #[tokio::test]
    async fn test_high_bug_rate_locks_and_rotates() {
        let f = fixture(PolicyConfig::default());
        let outcome = f
            .engine
            .evaluate("u1", "ctx-1", ProgressStats::new(20, 7))
            .await
            .unwrap();

        assert_eq!(outcome.lock_state(), LockState::Locked);
        let next = outcome.rotated_to().unwrap().to_string();
        assert_ne!(next, "ctx-1");

        let record = f.store.record("u1").await.unwrap();
        assert!(record.is_locked);
        assert_eq!(record.code_context_id.as_deref(), Some(next.as_str()));

        let events = f.log.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].metadata.code_context_id.as_deref(), Some("ctx-1"));

        let seen = f.notifier.seen.lock().await;
        assert!(matches!(&seen[..], [Notification::UserLocked { .. }]));
        assert!(seen[0].is_blocking());
    }

    #[tokio::test]
    async fn test_low_bug_rate_is_milestone() {
        let f = fixture(PolicyConfig::default());
        let outcome = f
            .engine
            .evaluate("u1", "ctx-1", ProgressStats::new(20, 4))
            .await
            .unwrap();

        assert!(matches!(outcome, PolicyOutcome::Milestone { .. }));
        let record = f.store.record("u1").await.unwrap();
        assert!(!record.is_locked);
        assert_eq!(record.code_context_id.as_deref(), outcome.rotated_to());
        assert!(f.log.events().await.is_empty());
        assert!(matches!(
            &f.notifier.seen.lock().await[..],
            [Notification::Milestone { .. }]
        ));
    }

    #[tokio::test]
    async fn test_exact_cutoff_is_not_locked_by_default() {
        let f = fixture(PolicyConfig::default());
        let outcome = f
            .engine
            .evaluate("u1", "ctx", ProgressStats::new(20, 6))
            .await
            .unwrap();
        assert_eq!(outcome.lock_state(), LockState::Unlocked);

        let inclusive = fixture(PolicyConfig {
            inclusive_cutoff: true,
            ..PolicyConfig::default()
        });
        let outcome = inclusive
            .engine
            .evaluate("u1", "ctx", ProgressStats::new(20, 6))
            .await
            .unwrap();
        assert_eq!(outcome.lock_state(), LockState::Locked);
    }

    #[tokio::test]
    async fn test_milestone_tightens_cutoff() {
        let f = fixture(PolicyConfig::default());
        assert!((f.engine.cutoff_for("u1").await - 30.0).abs() < f64::EPSILON);

        f.engine
            .evaluate("u1", "ctx-1", ProgressStats::new(20, 4))
            .await
            .unwrap();
        assert!((f.engine.cutoff_for("u1").await - 25.0).abs() < f64::EPSILON);
        assert!((f.engine.cutoff_for("u2").await - 30.0).abs() < f64::EPSILON);

        // 27.5% passes the original cutoff but not the tightened one
        let outcome = f
            .engine
            .evaluate("u1", "ctx-2", ProgressStats::new(40, 11))
            .await
            .unwrap();
        assert_eq!(outcome.lock_state(), LockState::Locked);
    }

    #[tokio::test]
    async fn test_code_context_created_once() {
        let f = fixture(PolicyConfig::default());
        let first = f.engine.code_context_id("u1").await.unwrap();
        let second = f.engine.code_context_id("u1").await.unwrap();
        assert_eq!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[tokio::test]
    async fn test_store_failures() {
        let engine = LockPolicyEngine::new(
            PolicyConfig::default(),
            Arc::new(BrokenStore),
            Arc::new(InMemoryEventLog::new()),
            Arc::new(RecordingNotifier::default()),
        );

        assert_eq!(engine.lock_state("u1").await, LockState::Unlocked);
        assert!(matches!(
            engine.code_context_id("u1").await,
            Err(EngineError::PolicyStateFailure(_))
        ));
        assert!(matches!(
            engine.evaluate("u1", "ctx", ProgressStats::new(20, 10)).await,
            Err(EngineError::PolicyStateFailure(_))
        ));
    }
}
