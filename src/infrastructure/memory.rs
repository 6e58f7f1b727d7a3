//! In-process event log and user store.
//!
//! Backs `clover fetch --dry-run` and the tests. Nothing survives the process.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::EngineResult;
use crate::domain::models::{LogEvent, SuggestionRecord, UserRecord};
use crate::domain::ports::{EventLog, UserStore};

/// Append-only event log held in memory.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    suggestions: RwLock<Vec<SuggestionRecord>>,
    events: RwLock<Vec<LogEvent>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with existing history.
    pub fn with_events(events: Vec<LogEvent>) -> Self {
        Self {
            suggestions: RwLock::default(),
            events: RwLock::new(events),
        }
    }

    pub async fn events(&self) -> Vec<LogEvent> {
        self.events.read().await.clone()
    }

    pub async fn suggestions(&self) -> Vec<SuggestionRecord> {
        self.suggestions.read().await.clone()
    }
}

#[async_trait]
impl EventLog for InMemoryEventLog {
    async fn save_suggestion(&self, record: &SuggestionRecord) -> EngineResult<String> {
        let id = Uuid::new_v4().to_string();
        let mut stored = record.clone();
        stored.id.clone_from(&id);
        self.suggestions.write().await.push(stored);
        Ok(id)
    }

    async fn track(&self, event: &LogEvent) -> EngineResult<()> {
        self.events.write().await.push(event.clone());
        Ok(())
    }

    async fn history(
        &self,
        user_id: &str,
        code_context_id: Option<&str>,
    ) -> EngineResult<Vec<LogEvent>> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|event| event.metadata.user_id.as_deref() == Some(user_id))
            .filter(|event| {
                code_context_id.is_none_or(|ctx| event.metadata.code_context_id.as_deref() == Some(ctx))
            })
            .cloned()
            .collect())
    }
}

/// User records keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, record: UserRecord) {
        self.users.write().await.insert(record.id.clone(), record);
    }

    pub async fn record(&self, user_id: &str) -> Option<UserRecord> {
        self.users.read().await.get(user_id).cloned()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get(&self, user_id: &str) -> EngineResult<Option<UserRecord>> {
        Ok(self.record(user_id).await)
    }

    async fn set_locked(&self, user_id: &str, is_locked: bool) -> EngineResult<()> {
        let mut users = self.users.write().await;
        let record = users.entry(user_id.to_string()).or_insert_with(|| UserRecord {
            id: user_id.to_string(),
            ..UserRecord::default()
        });
        record.is_locked = is_locked;
        Ok(())
    }

    async fn set_code_context_id(&self, user_id: &str, code_context_id: &str) -> EngineResult<()> {
        let mut users = self.users.write().await;
        let record = users.entry(user_id.to_string()).or_insert_with(|| UserRecord {
            id: user_id.to_string(),
            ..UserRecord::default()
        });
        record.code_context_id = Some(code_context_id.to_string());
        Ok(())
    }
}
