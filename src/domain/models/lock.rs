//! Lock policy state.

use serde::{Deserialize, Serialize};

use super::progress::ProgressStats;

/// Persisted per-user lock flag as a two-state machine.
///
/// `Locked` is only left through an external review, never automatically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    #[default]
    Unlocked,
    Locked,
}

impl LockState {
    pub const fn from_flag(is_locked: bool) -> Self {
        if is_locked {
            Self::Locked
        } else {
            Self::Unlocked
        }
    }

    pub const fn is_locked(self) -> bool {
        matches!(self, Self::Locked)
    }
}

/// What a policy evaluation decided.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyOutcome {
    /// Not enough accepted suggestions in the current code context yet
    Pending { stats: ProgressStats },
    /// Threshold reached with too many buggy acceptances
    Locked {
        stats: ProgressStats,
        retired_context: String,
        next_context: String,
    },
    /// Threshold reached within the allowed bug rate
    Milestone {
        stats: ProgressStats,
        retired_context: String,
        next_context: String,
    },
}

impl PolicyOutcome {
    pub const fn stats(&self) -> &ProgressStats {
        match self {
            Self::Pending { stats } | Self::Locked { stats, .. } | Self::Milestone { stats, .. } => {
                stats
            }
        }
    }

    pub const fn lock_state(&self) -> LockState {
        match self {
            Self::Locked { .. } => LockState::Locked,
            Self::Pending { .. } | Self::Milestone { .. } => LockState::Unlocked,
        }
    }

    /// The fresh code context id when the threshold fired.
    pub fn rotated_to(&self) -> Option<&str> {
        match self {
            Self::Pending { .. } => None,
            Self::Locked { next_context, .. } | Self::Milestone { next_context, .. } => {
                Some(next_context.as_str())
            }
        }
    }
}
