//! Port trait definitions (Hexagonal Architecture)
//!
//! The engine depends on these interfaces, never on concrete adapters:
//! - SuggestionService: AI suggestion generation
//! - EventLog: suggestion persistence, event log and decision history
//! - UserStore: per-user lock flag and code context id
//! - AuthProvider: current authentication state
//! - Notifier: user-facing notifications
//! - BugInjector / Clock: injectable randomness and time

pub mod auth;
pub mod bug_injector;
pub mod clock;
pub mod document;
pub mod event_log;
pub mod notifier;
pub mod suggestion_service;
pub mod user_store;

pub use auth::{AuthProvider, StaticAuth};
pub use bug_injector::{BugInjector, FixedBugInjector};
pub use clock::{Clock, SystemClock};
pub use document::{prompt_text, Position, TextDocument};
pub use event_log::EventLog;
pub use notifier::{Notification, NotificationResponse, Notifier};
pub use suggestion_service::{GenerationRequest, SamplingParameters, SuggestionService};
pub use user_store::UserStore;
