//! Port for user-facing notifications.
//!
//! Rendering is the editor's business; the engine only says what to tell the
//! user and, for prompts with choices, waits for the answer.

use async_trait::async_trait;

use crate::domain::models::{ProgressStats, SuggestionPair};

/// Something the engine wants the user to see.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Not signed in; offers a sign-in action
    SignInRequired,
    /// A fetch was suppressed because the user is locked
    SuggestionsLocked { review_url: String },
    /// Blocking prompt raised when the lock policy fires
    UserLocked { review_url: String },
    /// Non-blocking congratulation when the threshold passes cleanly
    Milestone { review_url: String },
    /// Progress summary after a decision
    Progress(ProgressStats),
    /// Non-blocking warning after a buggy suggestion was accepted
    BuggyAcceptance(SuggestionPair),
}

impl Notification {
    /// Whether the editor should present this modally.
    pub const fn is_blocking(&self) -> bool {
        matches!(self, Self::UserLocked { .. })
    }
}

/// The user's answer to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationResponse {
    Dismissed,
    SignIn,
    Review,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> NotificationResponse;

    /// Show the correct and flawed code side by side.
    async fn show_comparison(&self, pair: &SuggestionPair);
}
