//! Edit debouncing.
//!
//! A burst of edit events collapses into a single fetch attempt for the last
//! event of the burst, fired once the configured quiet period has elapsed
//! without a newer edit.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::domain::ports::{Position, TextDocument};

use super::timer::{DelayTimer, TimerTicket};

/// One completion request raised by the editor.
#[derive(Clone)]
pub struct EditEvent {
    pub document: Arc<dyn TextDocument>,
    pub position: Position,
    /// Cancelled by the editor when it no longer wants this completion
    pub cancellation: CancellationToken,
}

impl EditEvent {
    pub fn new(document: Arc<dyn TextDocument>, position: Position) -> Self {
        Self {
            document,
            position,
            cancellation: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }
}

impl std::fmt::Debug for EditEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditEvent")
            .field("position", &self.position)
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// How a debounced request resolved.
#[derive(Debug, Clone)]
pub enum DebounceOutcome {
    /// Quiet period elapsed and this is still the latest request
    Fire(TimerTicket),
    /// A newer edit arrived first
    Superseded,
    /// The caller cancelled before the timer fired
    Cancelled,
}

/// Collapses bursts of edits into one fetch for the last edit.
#[derive(Debug)]
pub struct EditDebouncer {
    timer: DelayTimer,
}

impl EditDebouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            timer: DelayTimer::new(quiet_period),
        }
    }

    pub const fn quiet_period(&self) -> Duration {
        self.timer.delay()
    }

    /// Wait out the quiet period for one edit.
    ///
    /// Superseded and cancelled requests resolve normally; nothing here ever
    /// errors.
    pub async fn debounce(&self, cancellation: &CancellationToken) -> DebounceOutcome {
        let ticket = self.timer.arm().await;
        trace!(generation = ticket.generation(), "edit debounce armed");

        if !self.timer.wait(&ticket).await {
            return DebounceOutcome::Superseded;
        }
        if cancellation.is_cancelled() {
            return DebounceOutcome::Cancelled;
        }
        DebounceOutcome::Fire(ticket)
    }

    /// Whether no edit arrived since `ticket` fired.
    pub fn is_latest(&self, ticket: &TimerTicket) -> bool {
        self.timer.is_current(ticket)
    }

    /// Discard any pending request, e.g. when the session ends.
    pub async fn cancel_pending(&self) {
        self.timer.cancel().await;
    }
}
