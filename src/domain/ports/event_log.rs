use async_trait::async_trait;

use crate::domain::errors::EngineResult;
use crate::domain::models::{LogEvent, SuggestionRecord};

/// Port trait for the persistence/logging collaborator.
///
/// Records written here are never mutated or deleted.
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Persist a served suggestion and return the id the store assigned.
    async fn save_suggestion(&self, record: &SuggestionRecord) -> EngineResult<String>;

    /// Append one event (`USER_ACCEPT`, `USER_REJECT`, `USER_LOCKED`, `MODEL_GENERATE`).
    async fn track(&self, event: &LogEvent) -> EngineResult<()>;

    /// Full event history for a user, optionally narrowed to one code context.
    ///
    /// No snapshot consistency with preceding `track` calls is promised.
    async fn history(
        &self,
        user_id: &str,
        code_context_id: Option<&str>,
    ) -> EngineResult<Vec<LogEvent>>;
}
