//! Domain models.

pub mod config;
pub mod decision;
pub mod lock;
pub mod progress;
pub mod suggestion;
pub mod user;

pub use config::{
    Config, EngineConfig, LoggingConfig, ModelConfig, PolicyConfig, RetryConfig, ServiceConfig,
};
pub use decision::{Decision, DecisionEvent, LogEvent, LogEventKind, LogMetadata};
pub use lock::{LockState, PolicyOutcome};
pub use progress::ProgressStats;
pub use suggestion::{
    ReviewQueue, SessionState, SuggestionContext, SuggestionPair, SuggestionRecord,
    SuggestionResult,
};
pub use user::{AuthContext, User, UserRecord};
