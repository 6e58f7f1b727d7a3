use async_trait::async_trait;

use crate::domain::errors::EngineResult;
use crate::domain::models::UserRecord;

/// Port trait for the per-user record store (`is_locked`, `code_context_id`).
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch the user's record; `None` when the store has no such user.
    async fn get(&self, user_id: &str) -> EngineResult<Option<UserRecord>>;

    async fn set_locked(&self, user_id: &str, is_locked: bool) -> EngineResult<()>;

    async fn set_code_context_id(&self, user_id: &str, code_context_id: &str) -> EngineResult<()>;
}
