//! CLI command implementations.

pub mod fetch;
pub mod init;
pub mod progress;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::domain::models::Config;
use crate::domain::ports::{AuthProvider, EventLog, Notifier, SystemClock, UserStore};
use crate::infrastructure::http::{HttpEventLog, HttpSuggestionService, HttpUserStore, RetryPolicy};
use crate::infrastructure::{InMemoryEventLog, InMemoryUserStore, RandomBugInjector};
use crate::services::Collaborators;

/// Remote event log and user store built from `config`.
pub fn remote_stores(config: &Config) -> Result<(Arc<dyn EventLog>, Arc<dyn UserStore>)> {
    let timeout = Duration::from_secs(config.service.timeout_secs);
    let retry = RetryPolicy::from_config(&config.retry);

    let event_log = HttpEventLog::new(&config.service.log_base_url, timeout, retry.clone())
        .context("Failed to build event log client")?;
    let user_store = HttpUserStore::new(&config.service.user_base_url, timeout, retry)
        .context("Failed to build user store client")?;

    Ok((Arc::new(event_log), Arc::new(user_store)))
}

/// Wire the engine's collaborators.
///
/// With `dry_run` nothing is persisted: decisions, suggestions and lock
/// state live in memory for the duration of the command.
pub fn collaborators(
    config: &Config,
    auth: Arc<dyn AuthProvider>,
    notifier: Arc<dyn Notifier>,
    dry_run: bool,
) -> Result<Collaborators> {
    let suggestion_service = HttpSuggestionService::new(
        &config.service.ai_base_url,
        Duration::from_secs(config.service.timeout_secs),
    )
    .context("Failed to build suggestion service client")?;

    let (event_log, user_store): (Arc<dyn EventLog>, Arc<dyn UserStore>) = if dry_run {
        (Arc::new(InMemoryEventLog::new()), Arc::new(InMemoryUserStore::new()))
    } else {
        remote_stores(config)?
    };

    Ok(Collaborators {
        suggestion_service: Arc::new(suggestion_service),
        event_log,
        user_store,
        auth,
        notifier,
        bug_injector: Arc::new(RandomBugInjector::new(config.engine.bug_probability)),
        clock: Arc::new(SystemClock),
    })
}
