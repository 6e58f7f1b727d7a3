//! Suggestion lifecycle services.
//!
//! - `EditDebouncer` coalesces edit bursts on top of `DelayTimer`
//! - `SuggestionFetcher` runs one generation request
//! - `DecisionTracker` records verdicts and feeds the policy
//! - `ProgressEvaluator` aggregates decision history
//! - `LockPolicyEngine` decides lock state and rotates code contexts
//! - `SuggestionEngine` ties them together per session

pub mod debouncer;
pub mod decision_tracker;
pub mod engine;
pub mod lock_policy;
pub mod progress_evaluator;
pub mod suggestion_fetcher;
pub mod timer;

pub use debouncer::{DebounceOutcome, EditDebouncer, EditEvent};
pub use decision_tracker::{DecisionReport, DecisionTracker};
pub use engine::{Collaborators, Skipped, SuggestionEngine};
pub use lock_policy::{new_code_context_id, LockPolicyEngine};
pub use progress_evaluator::ProgressEvaluator;
pub use suggestion_fetcher::SuggestionFetcher;
pub use timer::{DelayTimer, TimerTicket};
