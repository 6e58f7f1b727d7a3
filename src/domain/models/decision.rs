//! Decision and log event model.
//!
//! Every accept/reject becomes an immutable `DecisionEvent`, shipped to the
//! logging collaborator as a `LogEvent` and read back from it as history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event names understood by the logging collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogEventKind {
    ModelGenerate,
    UserAccept,
    UserReject,
    UserLocked,
    /// Any event this engine does not act upon (logins, sign-ups, ...)
    #[serde(other)]
    Other,
}

impl LogEventKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ModelGenerate => "MODEL_GENERATE",
            Self::UserAccept => "USER_ACCEPT",
            Self::UserReject => "USER_REJECT",
            Self::UserLocked => "USER_LOCKED",
            Self::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for LogEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-form metadata attached to a log event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMetadata {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_bug: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_context_id: Option<String>,
}

/// Wire shape of `POST /logs` and of each entry in `GET /logs/{userId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: LogEventKind,
    #[serde(default)]
    pub time_lapse: i64,
    #[serde(default)]
    pub metadata: LogMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl LogEvent {
    pub fn new(event: LogEventKind, time_lapse: i64, metadata: LogMetadata) -> Self {
        Self {
            event,
            time_lapse,
            metadata,
            timestamp: None,
        }
    }

    /// `MODEL_GENERATE`: emitted once per successful fetch.
    pub fn model_generate(elapsed_ms: i64, suggestion_id: &str, has_bug: bool) -> Self {
        Self::new(
            LogEventKind::ModelGenerate,
            elapsed_ms,
            LogMetadata {
                user_id: None,
                suggestion_id: Some(suggestion_id.to_string()),
                has_bug: Some(has_bug),
                code_context_id: None,
            },
        )
    }

    /// `USER_LOCKED`: emitted when the lock policy fires.
    pub fn user_locked(user_id: &str, code_context_id: &str) -> Self {
        Self::new(
            LogEventKind::UserLocked,
            0,
            LogMetadata {
                user_id: Some(user_id.to_string()),
                code_context_id: Some(code_context_id.to_string()),
                ..LogMetadata::default()
            },
        )
    }
}

/// The user's verdict on an offered suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub const fn from_accepted(accepted: bool) -> Self {
        if accepted {
            Self::Accept
        } else {
            Self::Reject
        }
    }

    pub const fn kind(self) -> LogEventKind {
        match self {
            Self::Accept => LogEventKind::UserAccept,
            Self::Reject => LogEventKind::UserReject,
        }
    }
}

/// Immutable record of one accept/reject decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionEvent {
    pub decision: Decision,
    /// `None` when no user was signed in; the decision is logged regardless
    pub user_id: Option<String>,
    pub suggestion_id: String,
    pub has_bug: bool,
    pub elapsed_ms: i64,
    pub code_context_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl DecisionEvent {
    pub fn to_log_event(&self) -> LogEvent {
        LogEvent {
            event: self.decision.kind(),
            time_lapse: self.elapsed_ms,
            metadata: LogMetadata {
                user_id: self.user_id.clone(),
                suggestion_id: Some(self.suggestion_id.clone()),
                has_bug: Some(self.has_bug),
                code_context_id: self.code_context_id.clone(),
            },
            timestamp: self.timestamp,
        }
    }

    /// Read a decision back from history; non-decision events yield `None`.
    pub fn from_log_event(event: &LogEvent) -> Option<Self> {
        let decision = match event.event {
            LogEventKind::UserAccept => Decision::Accept,
            LogEventKind::UserReject => Decision::Reject,
            _ => return None,
        };

        Some(Self {
            decision,
            user_id: event.metadata.user_id.clone(),
            suggestion_id: event.metadata.suggestion_id.clone().unwrap_or_default(),
            has_bug: event.metadata.has_bug.unwrap_or(false),
            elapsed_ms: event.time_lapse,
            code_context_id: event.metadata.code_context_id.clone(),
            timestamp: event.timestamp,
        })
    }
}
