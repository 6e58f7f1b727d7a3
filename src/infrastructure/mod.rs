//! Infrastructure layer module
//!
//! Adapters satisfying the domain ports:
//! - HTTP clients for the AI service, event log and user store
//! - In-memory event log and user store
//! - Randomized bug injection
//! - Configuration management and project setup
//! - Logging infrastructure

pub mod bug_injector;
pub mod config;
pub mod http;
pub mod logging;
pub mod memory;
pub mod setup;

pub use bug_injector::RandomBugInjector;
pub use memory::{InMemoryEventLog, InMemoryUserStore};
