//! Clover - Suggestion Lifecycle & Adaptive Trust Engine
//!
//! Clover turns editor activity into AI code suggestions, deliberately serves
//! a flawed variant some of the time, records whether the user accepted it
//! and locks suggestions for users who keep accepting buggy code.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, errors and the ports the engine depends on
//! - **Service Layer** (`services`): Debouncing, fetching, decision tracking and lock policy
//! - **Infrastructure Layer** (`infrastructure`): HTTP adapters, config, logging
//! - **CLI Layer** (`cli`): Developer command-line driver
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use clover::services::{EditEvent, SuggestionEngine};
//! use clover::domain::ports::Position;
//!
//! async fn complete(engine: &SuggestionEngine, line: String) -> Vec<String> {
//!     let position = Position::new(0, line.chars().count());
//!     engine.on_edit(EditEvent::new(Arc::new(line), position)).await
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{EngineError, EngineResult};
pub use domain::models::{
    Config, Decision, DecisionEvent, LockState, PolicyOutcome, ProgressStats, SessionState,
    SuggestionContext, SuggestionPair, SuggestionResult,
};
pub use domain::ports::{
    AuthProvider, BugInjector, Clock, EventLog, Notifier, SuggestionService, UserStore,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    Collaborators, EditEvent, LockPolicyEngine, ProgressEvaluator, SuggestionEngine,
};
