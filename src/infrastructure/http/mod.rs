//! HTTP adapters for the remote collaborators
//!
//! - `HttpSuggestionService`: AI suggestion generation
//! - `HttpEventLog`: suggestion persistence, event log, decision history
//! - `HttpUserStore`: per-user lock flag and code context id

pub mod client;
pub mod errors;
pub mod log_client;
pub mod retry;
pub mod suggestion_client;
pub mod types;
pub mod user_client;

pub use client::build_http_client;
pub use errors::ApiError;
pub use log_client::HttpEventLog;
pub use retry::RetryPolicy;
pub use suggestion_client::HttpSuggestionService;
pub use user_client::HttpUserStore;
