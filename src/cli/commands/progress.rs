//! Implementation of the `clover progress` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::output::{detail_table, output, CommandOutput};
use crate::domain::models::{Config, LockState, ProgressStats};
use crate::services::ProgressEvaluator;

#[derive(Args, Debug)]
pub struct ProgressArgs {
    /// User to report on
    pub user_id: String,

    /// Count every decision ever made instead of the current code context only
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressOutput {
    pub user_id: String,
    pub code_context_id: Option<String>,
    pub lock_state: LockState,
    #[serde(flatten)]
    pub stats: ProgressStats,
    pub acceptance_threshold: usize,
    pub bug_percentage: f64,
}

impl CommandOutput for ProgressOutput {
    fn to_human(&self) -> String {
        let lock = if self.lock_state.is_locked() { "locked" } else { "unlocked" };
        let table = detail_table([
            ("User", self.user_id.clone()),
            (
                "Code context",
                self.code_context_id.clone().unwrap_or_else(|| "(all)".to_string()),
            ),
            (
                "Accepted",
                format!("{} / {}", self.stats.total_accepted, self.acceptance_threshold),
            ),
            ("With bugs", self.stats.total_with_bugs.to_string()),
            (
                "Bug rate",
                format!(
                    "{:.2}% (cutoff {:.0}%)",
                    self.stats.percentage_with_bugs, self.bug_percentage
                ),
            ),
            ("Lock state", lock.to_string()),
        ]);
        format!("{}\n{table}", self.stats)
    }
}

pub async fn execute(args: ProgressArgs, config: &Config, json_mode: bool) -> Result<()> {
    let (event_log, user_store) = super::remote_stores(config)?;

    let record = user_store
        .get(&args.user_id)
        .await
        .context("Failed to read user record")?;
    let lock_state = LockState::from_flag(record.as_ref().is_some_and(|r| r.is_locked));
    let code_context_id = if args.all {
        None
    } else {
        record.and_then(|r| r.code_context_id)
    };

    let history = event_log
        .history(&args.user_id, code_context_id.as_deref())
        .await
        .context("Failed to read decision history")?;
    let stats = ProgressEvaluator::evaluate_history(&history);

    output(
        &ProgressOutput {
            user_id: args.user_id,
            code_context_id,
            lock_state,
            stats,
            acceptance_threshold: config.policy.acceptance_threshold,
            bug_percentage: config.policy.bug_percentage,
        },
        json_mode,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_json_shape() {
        let out = ProgressOutput {
            user_id: "u1".into(),
            code_context_id: Some("ctx".into()),
            lock_state: LockState::Locked,
            stats: ProgressStats::new(20, 7),
            acceptance_threshold: 20,
            bug_percentage: 30.0,
        };
        let json = out.to_json();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["totalAccepted"], 20);
        assert_eq!(json["lockState"], "locked");
        assert!(out.to_human().starts_with("You have accepted 20 suggestions."));
    }
}
