//! One suggestion request end to end: bug decision, generation, persistence
//! and the `MODEL_GENERATE` event.

use std::sync::Arc;

use tokio_util::task::TaskTracker;
use tracing::{debug, instrument, warn};

use crate::domain::errors::EngineResult;
use crate::domain::models::{LogEvent, ModelConfig, SuggestionRecord, SuggestionResult};
use crate::domain::ports::{BugInjector, Clock, EventLog, GenerationRequest, SuggestionService};

/// Requests suggestion pairs and records what was shown.
pub struct SuggestionFetcher {
    service: Arc<dyn SuggestionService>,
    event_log: Arc<dyn EventLog>,
    bug_injector: Arc<dyn BugInjector>,
    clock: Arc<dyn Clock>,
    model: ModelConfig,
    /// Outstanding `MODEL_GENERATE` sends
    background: TaskTracker,
}

impl SuggestionFetcher {
    pub fn new(
        service: Arc<dyn SuggestionService>,
        event_log: Arc<dyn EventLog>,
        bug_injector: Arc<dyn BugInjector>,
        clock: Arc<dyn Clock>,
        model: ModelConfig,
    ) -> Self {
        Self {
            service,
            event_log,
            bug_injector,
            clock,
            model,
            background: TaskTracker::new(),
        }
    }

    pub const fn model(&self) -> &ModelConfig {
        &self.model
    }

    /// Fetch a correct/flawed pair for `prompt`.
    ///
    /// A persistence failure does not fail the fetch: the result carries an
    /// empty suggestion id instead. The `MODEL_GENERATE` event is sent in the
    /// background and its failures are only logged.
    ///
    /// # Errors
    /// Whatever the suggestion service reported. No log event is emitted then.
    #[instrument(skip(self, prompt), fields(model = %self.model.model, prompt_len = prompt.len()))]
    pub async fn fetch(&self, prompt: &str) -> EngineResult<SuggestionResult> {
        let start = self.clock.now();
        let has_bug = self.bug_injector.decide();
        let request = GenerationRequest::new(prompt, &self.model, has_bug);

        let suggestions = self.service.generate(&request).await.inspect_err(|e| {
            warn!(status = e.status(), error = %e, "Suggestion request failed");
        })?;

        let record = SuggestionRecord {
            id: String::new(),
            prompt: prompt.to_string(),
            suggestion_text: suggestions.displayed(has_bug).to_string(),
            has_bug,
            model: self.model.model.clone(),
            vendor: Some(self.model.vendor.clone()),
        };
        let suggestion_id = match self.event_log.save_suggestion(&record).await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Failed to persist suggestion, continuing without an id");
                String::new()
            }
        };

        let elapsed_ms = (self.clock.now() - start).num_milliseconds().max(0);
        debug!(suggestion_id = %suggestion_id, has_bug, elapsed_ms, "Suggestion generated");
        self.emit(LogEvent::model_generate(elapsed_ms, &suggestion_id, has_bug));

        Ok(SuggestionResult {
            suggestions,
            suggestion_id,
            has_bug,
        })
    }

    fn emit(&self, event: LogEvent) {
        let event_log = Arc::clone(&self.event_log);
        self.background.spawn(async move {
            if let Err(e) = event_log.track(&event).await {
                warn!(event = %event.event, error = %e, "Failed to log event");
            }
        });
    }

    /// Wait until every event sent so far has been delivered or failed.
    pub async fn flush(&self) {
        self.background.close();
        self.background.wait().await;
        self.background.reopen();
    }
}

impl std::fmt::Debug for SuggestionFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionFetcher")
            .field("model", &self.model)
            .field("pending_events", &self.background.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::EngineError;
    use crate::domain::models::{LogEventKind, SuggestionPair};
    use crate::domain::ports::{FixedBugInjector, SystemClock};
    use crate::infrastructure::memory::InMemoryEventLog;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct ScriptedService {
        fail_with: Option<u16>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    #[async_trait]
    impl SuggestionService for ScriptedService {
        async fn generate(&self, request: &GenerationRequest) -> EngineResult<SuggestionPair> {
            self.requests.lock().await.push(request.clone());
            match self.fail_with {
                Some(status) => Err(EngineError::UpstreamError {
                    status,
                    message: format!("Error: {status} Internal Server Error"),
                }),
                None => Ok(SuggestionPair::new("a + b", "a - b")),
            }
        }
    }

    fn fetcher(
        service: Arc<ScriptedService>,
        log: Arc<InMemoryEventLog>,
        has_bug: bool,
    ) -> SuggestionFetcher {
        SuggestionFetcher::new(
            service,
            log,
            Arc::new(FixedBugInjector(has_bug)),
            Arc::new(SystemClock),
            ModelConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_fetch_persists_displayed_side() {
        let service = Arc::new(ScriptedService::default());
        let log = Arc::new(InMemoryEventLog::new());
        let fetcher = fetcher(Arc::clone(&service), Arc::clone(&log), true);
        let result = fetcher.fetch("let x =").await.unwrap();

        assert!(result.has_bug);
        assert_eq!(result.displayed(), "a - b");
        assert!(!result.suggestion_id.is_empty());

        let request = &service.requests.lock().await[0];
        assert!(!request.is_correct);
        assert_eq!(request.vendor, "ollama");

        let saved = log.suggestions().await;
        assert_eq!(saved[0].suggestion_text, "a - b");
        assert!(saved[0].has_bug);

        fetcher.flush().await;
        let events = log.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, LogEventKind::ModelGenerate);
        assert_eq!(
            events[0].metadata.suggestion_id.as_deref(),
            Some(result.suggestion_id.as_str())
        );
    }

    #[tokio::test]
    async fn test_failed_generation_logs_nothing() {
        let service = Arc::new(ScriptedService {
            fail_with: Some(500),
            ..ScriptedService::default()
        });
        let log = Arc::new(InMemoryEventLog::new());
        let fetcher = fetcher(service, Arc::clone(&log), false);
        let err = fetcher.fetch("let x =").await.unwrap_err();

        assert_eq!(err.status(), 500);
        fetcher.flush().await;
        assert!(log.suggestions().await.is_empty());
        assert!(log.events().await.is_empty());
    }
}
