//! Cancellable delayed wake-ups.
//!
//! Every `arm` cancels the previously armed wake-up and hands out a ticket
//! carrying a generation number. Only the ticket of the latest generation is
//! ever considered current.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Handle to one armed wake-up.
#[derive(Debug, Clone)]
pub struct TimerTicket {
    generation: u64,
    token: CancellationToken,
}

impl TimerTicket {
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Single-slot timer: at most one armed wake-up is live at any time.
#[derive(Debug)]
pub struct DelayTimer {
    delay: Duration,
    generation: AtomicU64,
    armed: Mutex<Option<CancellationToken>>,
}

impl DelayTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: AtomicU64::new(0),
            armed: Mutex::new(None),
        }
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm a new wake-up, cancelling whichever one was pending.
    pub async fn arm(&self) -> TimerTicket {
        let token = CancellationToken::new();
        let mut armed = self.armed.lock().await;
        if let Some(previous) = armed.replace(token.clone()) {
            previous.cancel();
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        TimerTicket { generation, token }
    }

    /// Sleep out the delay for `ticket`.
    ///
    /// Returns `false` as soon as a later `arm` cancels the ticket.
    pub async fn wait(&self, ticket: &TimerTicket) -> bool {
        tokio::select! {
            () = tokio::time::sleep(self.delay) => self.is_current(ticket),
            () = ticket.token.cancelled() => false,
        }
    }

    /// Whether no later wake-up has been armed since `ticket`.
    pub fn is_current(&self, ticket: &TimerTicket) -> bool {
        !ticket.is_cancelled() && self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    /// Drop the pending wake-up without arming a new one.
    pub async fn cancel(&self) {
        if let Some(token) = self.armed.lock().await.take() {
            token.cancel();
        }
    }
}
