//! Suggestion domain model.
//!
//! The AI service always answers with a correct/flawed pair. Exactly one side
//! of the pair is shown to the user; the whole pair travels with the context
//! so a buggy acceptance can be reviewed side by side later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::decision::Decision;

/// The `[correctText, buggyText]` tuple returned per AI request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionPair {
    pub correct: String,
    pub buggy: String,
}

impl SuggestionPair {
    pub fn new(correct: impl Into<String>, buggy: impl Into<String>) -> Self {
        Self {
            correct: correct.into(),
            buggy: buggy.into(),
        }
    }

    /// Build a pair from the service's ordered list (correct first).
    ///
    /// Returns `None` when fewer than two candidates are present.
    pub fn from_ordered(suggestions: &[String]) -> Option<Self> {
        match suggestions {
            [correct, buggy, ..] => Some(Self::new(correct.clone(), buggy.clone())),
            _ => None,
        }
    }

    /// The text that is literally displayed for a request.
    pub fn displayed(&self, has_bug: bool) -> &str {
        if has_bug {
            &self.buggy
        } else {
            &self.correct
        }
    }

    /// Ordered view, correct always at index 0.
    pub fn to_vec(&self) -> Vec<String> {
        vec![self.correct.clone(), self.buggy.clone()]
    }
}

/// Successful outcome of a suggestion fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResult {
    pub suggestions: SuggestionPair,
    /// Id assigned by the persistence collaborator, empty when persisting failed
    pub suggestion_id: String,
    pub has_bug: bool,
}

impl SuggestionResult {
    pub fn displayed(&self) -> &str {
        self.suggestions.displayed(self.has_bug)
    }
}

/// Record persisted through `POST /logs/suggestion`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRecord {
    #[serde(default)]
    pub id: String,
    pub prompt: String,
    pub suggestion_text: String,
    pub has_bug: bool,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
}

/// The pending decision for the suggestion currently offered to the user.
///
/// `Default` is the empty context: no pair, empty id, no bug, no start time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionContext {
    pub suggestions: Option<SuggestionPair>,
    pub suggestion_id: String,
    pub has_bug: bool,
    pub start_time: Option<DateTime<Utc>>,
}

impl SuggestionContext {
    pub fn offered(result: SuggestionResult, start_time: DateTime<Utc>) -> Self {
        Self {
            suggestions: Some(result.suggestions),
            suggestion_id: result.suggestion_id,
            has_bug: result.has_bug,
            start_time: Some(start_time),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_none()
    }

    /// Milliseconds between the offer and `now`; zero for an empty context.
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> i64 {
        self.start_time
            .map_or(0, |start| (now - start).num_milliseconds().max(0))
    }
}

/// Suggestion texts awaiting manual review after a buggy acceptance.
///
/// While non-empty, new fetches are suppressed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewQueue {
    items: Vec<String>,
}

impl ReviewQueue {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Replace the queue contents with the pair under review.
    pub fn hold(&mut self, pair: &SuggestionPair) {
        self.items = pair.to_vec();
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Mutable state scoped to one user session.
///
/// The context is only ever replaced wholesale or reset; there is no way to
/// populate it field by field.
#[derive(Debug, Default)]
pub struct SessionState {
    context: SuggestionContext,
    review_queue: ReviewQueue,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn context(&self) -> &SuggestionContext {
        &self.context
    }

    pub const fn review_queue(&self) -> &ReviewQueue {
        &self.review_queue
    }

    pub fn is_review_pending(&self) -> bool {
        !self.review_queue.is_empty()
    }

    /// Install a freshly fetched suggestion, superseding any undecided one.
    ///
    /// Returns the superseded context if it was still pending.
    pub fn offer(&mut self, context: SuggestionContext) -> Option<SuggestionContext> {
        let previous = std::mem::replace(&mut self.context, context);
        (!previous.is_empty()).then_some(previous)
    }

    /// Claim the pending context for a decision.
    ///
    /// The context is cleared right away so a suggestion offered while the
    /// decision is still being recorded is not wiped afterwards. Accepting a
    /// buggy suggestion moves its pair into the review queue in the same
    /// step, closing the fetch gate before any await.
    pub fn begin_decision(&mut self, decision: Decision) -> Option<SuggestionContext> {
        if self.context.is_empty() {
            return None;
        }

        let context = std::mem::take(&mut self.context);
        if decision == Decision::Accept && context.has_bug {
            if let Some(pair) = &context.suggestions {
                self.review_queue.hold(pair);
            }
        }
        Some(context)
    }

    /// Close out a recorded decision: the review queue is released.
    pub fn finish_decision(&mut self) {
        self.review_queue.clear();
    }

    /// Clear the context and the review queue. Idempotent.
    pub fn reset(&mut self) {
        self.context = SuggestionContext::default();
        self.review_queue.clear();
    }
}
