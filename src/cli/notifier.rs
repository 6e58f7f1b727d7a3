//! Terminal rendering of engine notifications.

use async_trait::async_trait;
use comfy_table::{presets, Cell, ContentArrangement, Table};
use tracing::debug;

use crate::domain::models::SuggestionPair;
use crate::domain::ports::{Notification, NotificationResponse, Notifier};

/// Prints notifications to stderr so `--json` output on stdout stays clean.
///
/// There is nobody to answer prompts interactively; `review` decides whether
/// buggy-acceptance warnings are answered with a side-by-side comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier {
    review: bool,
}

impl ConsoleNotifier {
    pub const fn new(review: bool) -> Self {
        Self { review }
    }
}

/// Human text for a notification.
pub fn describe(notification: &Notification) -> String {
    match notification {
        Notification::SignInRequired => "Please sign in to receive suggestions.".to_string(),
        Notification::SuggestionsLocked { review_url } => format!(
            "Suggestions are locked until your accepted code is reviewed: {review_url}"
        ),
        Notification::UserLocked { review_url } => format!(
            "Too many accepted suggestions contained bugs. Suggestions are now locked. Review them at {review_url}"
        ),
        Notification::Milestone { review_url } => format!(
            "Milestone reached! Most of the suggestions you accepted were correct. See your progress at {review_url}"
        ),
        Notification::Progress(stats) => stats.to_string(),
        Notification::BuggyAcceptance(_) => {
            "Warning: the suggestion you accepted contains a bug.".to_string()
        }
    }
}

/// Correct and flawed code next to each other.
pub fn comparison_table(pair: &SuggestionPair) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![Cell::new("CORRECT"), Cell::new("ACCEPTED (FLAWED)")])
        .add_row(vec![Cell::new(&pair.correct), Cell::new(&pair.buggy)]);
    table
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, notification: Notification) -> NotificationResponse {
        debug!(blocking = notification.is_blocking(), "notification");
        eprintln!("{}", describe(&notification));

        match notification {
            Notification::BuggyAcceptance(_) if self.review => NotificationResponse::Review,
            _ => NotificationResponse::Dismissed,
        }
    }

    async fn show_comparison(&self, pair: &SuggestionPair) {
        eprintln!("{}", comparison_table(pair));
    }
}
