//! Wire envelopes shared by the remote services.

use serde::{Deserialize, Serialize};

/// `{data: ..., error: ...}` envelope used by every endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Best human-readable explanation the server gave, if any.
    pub fn reason(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}

/// `data` of a `POST /suggestion` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionsPayload {
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// `data` of a `POST /logs/suggestion` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedSuggestion {
    pub id: String,
}

/// Body of `PATCH /users/{id}`; only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserPatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_context_id: Option<&'a str>,
}
