//! Common test utilities for integration tests
//!
//! In-process fakes for the engine's collaborators plus a harness that
//! wires them into a `SuggestionEngine`.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;

use clover::domain::models::{
    AuthContext, Config, Decision, DecisionEvent, LogEvent, SuggestionPair, SuggestionRecord,
    User, UserRecord,
};
use clover::domain::ports::{
    AuthProvider, BugInjector, Clock, EventLog, GenerationRequest, Notification,
    NotificationResponse, Notifier, Position, StaticAuth, SuggestionService, TextDocument,
    UserStore,
};
use clover::infrastructure::{InMemoryEventLog, InMemoryUserStore};
use clover::services::{Collaborators, EditEvent, SuggestionEngine};
use clover::{EngineError, EngineResult};

pub const USER: &str = "user-1";
pub const CORRECT: &str = "return a + b;";
pub const BUGGY: &str = "return a - b;";

/// Setup test logging
#[allow(dead_code)]
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Let spawned background work run to completion.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Suggestion service answering every request with the same pair.
pub struct ScriptedService {
    pub fail_with: StdMutex<Option<u16>>,
    pub delay: Duration,
    pub prompts: StdMutex<Vec<String>>,
    pub requests: StdMutex<Vec<GenerationRequest>>,
    /// Clock moved forward by the given milliseconds during each generation
    pub clock_step: Option<(Arc<ManualClock>, i64)>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self {
            fail_with: StdMutex::new(None),
            delay: Duration::ZERO,
            prompts: StdMutex::new(Vec::new()),
            requests: StdMutex::new(Vec::new()),
            clock_step: None,
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    /// Highest number of generations that ran at the same time.
    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new()
        }
    }

    /// Generation that takes `millis` on `clock`.
    pub fn taking(clock: Arc<ManualClock>, millis: i64) -> Self {
        Self {
            clock_step: Some((clock, millis)),
            ..Self::new()
        }
    }

    pub fn fail_with(&self, status: u16) {
        *self.fail_with.lock().unwrap() = Some(status);
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SuggestionService for ScriptedService {
    async fn generate(&self, request: &GenerationRequest) -> EngineResult<SuggestionPair> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        self.requests.lock().unwrap().push(request.clone());
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some((clock, millis)) = &self.clock_step {
            clock.advance(*millis);
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        let failure = *self.fail_with.lock().unwrap();
        match failure {
            Some(status) => Err(EngineError::UpstreamError {
                status,
                message: format!("Error: {status} Internal Server Error"),
            }),
            None => Ok(SuggestionPair::new(CORRECT, BUGGY)),
        }
    }
}

/// Event log whose writes and reads can be made to fail.
#[derive(Default)]
pub struct FlakyEventLog {
    pub inner: InMemoryEventLog,
    pub fail_saves: bool,
    pub fail_history: bool,
    pub track_delay: Duration,
}

impl FlakyEventLog {
    pub fn with_events(events: Vec<LogEvent>) -> Self {
        Self {
            inner: InMemoryEventLog::with_events(events),
            ..Self::default()
        }
    }
}

#[async_trait]
impl EventLog for FlakyEventLog {
    async fn save_suggestion(&self, record: &SuggestionRecord) -> EngineResult<String> {
        if self.fail_saves {
            return Err(EngineError::PersistenceFailure("store offline".into()));
        }
        self.inner.save_suggestion(record).await
    }

    async fn track(&self, event: &LogEvent) -> EngineResult<()> {
        if !self.track_delay.is_zero() {
            tokio::time::sleep(self.track_delay).await;
        }
        self.inner.track(event).await
    }

    async fn history(
        &self,
        user_id: &str,
        code_context_id: Option<&str>,
    ) -> EngineResult<Vec<LogEvent>> {
        if self.fail_history {
            return Err(EngineError::NetworkFailure("connection reset".into()));
        }
        self.inner.history(user_id, code_context_id).await
    }
}

/// Records every notification; can hold buggy-acceptance warnings open.
pub struct RecordingNotifier {
    pub seen: StdMutex<Vec<Notification>>,
    pub compared: AtomicUsize,
    pub response: NotificationResponse,
    pub buggy_gate: Option<Arc<Semaphore>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            seen: StdMutex::new(Vec::new()),
            compared: AtomicUsize::new(0),
            response: NotificationResponse::Dismissed,
            buggy_gate: None,
        }
    }

    pub fn answering(response: NotificationResponse) -> Self {
        Self {
            response,
            ..Self::new()
        }
    }

    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            buggy_gate: Some(gate),
            ..Self::new()
        }
    }

    pub fn seen(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Notification) -> bool) -> usize {
        self.seen.lock().unwrap().iter().filter(|n| predicate(n)).count()
    }

    pub fn comparisons(&self) -> usize {
        self.compared.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> NotificationResponse {
        let buggy = matches!(notification, Notification::BuggyAcceptance(_));
        self.seen.lock().unwrap().push(notification);

        if buggy {
            if let Some(gate) = &self.buggy_gate {
                let _permit = gate.acquire().await;
            }
            return self.response;
        }
        NotificationResponse::Dismissed
    }

    async fn show_comparison(&self, _pair: &SuggestionPair) {
        self.compared.fetch_add(1, Ordering::SeqCst);
    }
}

/// Replays a fixed sequence of decisions, then repeats the last one.
pub struct SequenceBugInjector {
    decisions: StdMutex<VecDeque<bool>>,
    last: StdMutex<bool>,
}

impl SequenceBugInjector {
    pub fn new(decisions: impl IntoIterator<Item = bool>) -> Self {
        Self {
            decisions: StdMutex::new(decisions.into_iter().collect()),
            last: StdMutex::new(false),
        }
    }
}

impl BugInjector for SequenceBugInjector {
    fn decide(&self) -> bool {
        let next = self.decisions.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        if let Some(value) = next {
            *last = value;
        }
        *last
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: StdMutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: StdMutex::new(Utc::now()),
        }
    }

    pub fn advance(&self, millis: i64) {
        *self.now.lock().unwrap() += chrono::Duration::milliseconds(millis);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Authentication state that can change mid-session.
pub struct SwitchableAuth {
    current: StdMutex<AuthContext>,
}

impl SwitchableAuth {
    pub fn signed_in() -> Self {
        Self {
            current: StdMutex::new(AuthContext::signed_in(User {
                id: USER.to_string(),
                email: None,
            })),
        }
    }

    pub fn sign_out(&self) {
        *self.current.lock().unwrap() = AuthContext::anonymous();
    }
}

impl AuthProvider for SwitchableAuth {
    fn current(&self) -> AuthContext {
        self.current.lock().unwrap().clone()
    }
}

pub fn signed_in() -> Arc<dyn AuthProvider> {
    Arc::new(StaticAuth(AuthContext::signed_in(User {
        id: USER.to_string(),
        email: Some("dev@example.com".to_string()),
    })))
}

pub fn anonymous() -> Arc<dyn AuthProvider> {
    Arc::new(StaticAuth(AuthContext::anonymous()))
}

/// Decision history for `USER` inside `code_context_id`.
pub fn accepted_history(code_context_id: &str, accepted: usize, with_bugs: usize) -> Vec<LogEvent> {
    (0..accepted)
        .map(|i| {
            DecisionEvent {
                decision: Decision::Accept,
                user_id: Some(USER.to_string()),
                suggestion_id: format!("s-{i}"),
                has_bug: i < with_bugs,
                elapsed_ms: 500,
                code_context_id: Some(code_context_id.to_string()),
                timestamp: None,
            }
            .to_log_event()
        })
        .collect()
}

/// Everything a scenario needs to drive and inspect an engine.
pub struct Harness {
    pub engine: Arc<SuggestionEngine>,
    pub service: Arc<ScriptedService>,
    pub log: Arc<FlakyEventLog>,
    pub store: Arc<InMemoryUserStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<ManualClock>,
}

pub struct HarnessBuilder {
    config: Config,
    service: ScriptedService,
    log: FlakyEventLog,
    store: InMemoryUserStore,
    notifier: RecordingNotifier,
    auth: Arc<dyn AuthProvider>,
    bugs: Vec<bool>,
    clock: Arc<ManualClock>,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            service: ScriptedService::new(),
            log: FlakyEventLog::default(),
            store: InMemoryUserStore::new(),
            notifier: RecordingNotifier::new(),
            auth: signed_in(),
            bugs: vec![false],
            clock: Arc::new(ManualClock::new()),
        }
    }

    /// The clock the built engine will read.
    pub fn clock(&self) -> Arc<ManualClock> {
        Arc::clone(&self.clock)
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn service(mut self, service: ScriptedService) -> Self {
        self.service = service;
        self
    }

    pub fn log(mut self, log: FlakyEventLog) -> Self {
        self.log = log;
        self
    }

    pub fn notifier(mut self, notifier: RecordingNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = auth;
        self
    }

    pub fn bugs(mut self, bugs: impl IntoIterator<Item = bool>) -> Self {
        self.bugs = bugs.into_iter().collect();
        self
    }

    pub async fn user(self, record: UserRecord) -> Self {
        self.store.insert(record).await;
        self
    }

    pub fn build(self) -> Harness {
        let service = Arc::new(self.service);
        let log = Arc::new(self.log);
        let store = Arc::new(self.store);
        let notifier = Arc::new(self.notifier);
        let clock = self.clock;

        let engine = SuggestionEngine::new(
            &self.config,
            Collaborators {
                suggestion_service: Arc::clone(&service) as Arc<dyn SuggestionService>,
                event_log: Arc::clone(&log) as Arc<dyn EventLog>,
                user_store: Arc::clone(&store) as Arc<dyn UserStore>,
                auth: self.auth,
                notifier: Arc::clone(&notifier) as Arc<dyn Notifier>,
                bug_injector: Arc::new(SequenceBugInjector::new(self.bugs)),
                clock: Arc::clone(&clock) as Arc<dyn Clock>,
            },
        );

        Harness {
            engine: Arc::new(engine),
            service,
            log,
            store,
            notifier,
            clock,
        }
    }
}

/// An edit whose current line is `line`, cursor at its end.
pub fn edit(line: &str) -> EditEvent {
    let position = Position::new(0, line.chars().count());
    let document: Arc<dyn TextDocument> = Arc::new(line.to_string());
    EditEvent::new(document, position)
}

/// Code context the store currently holds for `USER`.
pub async fn current_context(store: &InMemoryUserStore) -> Option<String> {
    store.record(USER).await.and_then(|r| r.code_context_id)
}
