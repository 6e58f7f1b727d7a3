//! Implementation of the `clover fetch` command.
//!
//! Runs one edit through the engine exactly as the editor would: debounce,
//! gates, generation, then optionally the user's decision.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::notifier::ConsoleNotifier;
use crate::cli::output::{detail_table, output, CommandOutput};
use crate::domain::models::{AuthContext, Config, LockState, ProgressStats, User};
use crate::domain::ports::{Position, StaticAuth, TextDocument};
use crate::services::{DecisionReport, EditEvent, SuggestionEngine};

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Line of code up to the cursor
    pub prompt: String,

    /// Signed-in user id; without it the sign-in prompt is shown
    #[arg(short, long)]
    pub user: Option<String>,

    /// Accept the suggestion once shown
    #[arg(long, conflicts_with = "reject")]
    pub accept: bool,

    /// Reject the suggestion once shown
    #[arg(long)]
    pub reject: bool,

    /// Answer a buggy-acceptance warning by showing the comparison
    #[arg(long)]
    pub review: bool,

    /// Keep logs and user records in memory instead of the remote services
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub struct DecisionOutput {
    pub event: String,
    pub elapsed_ms: i64,
    pub code_context_id: Option<String>,
    pub progress: Option<ProgressStats>,
    pub lock_state: Option<LockState>,
    pub rotated_to: Option<String>,
}

impl From<DecisionReport> for DecisionOutput {
    fn from(report: DecisionReport) -> Self {
        Self {
            event: report.event.decision.kind().to_string(),
            elapsed_ms: report.event.elapsed_ms,
            code_context_id: report.event.code_context_id,
            progress: report.progress,
            lock_state: report.outcome.as_ref().map(|o| o.lock_state()),
            rotated_to: report
                .outcome
                .as_ref()
                .and_then(|o| o.rotated_to().map(str::to_string)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FetchOutput {
    pub suggestion: Option<String>,
    pub suggestion_id: Option<String>,
    pub has_bug: Option<bool>,
    pub skipped: Option<String>,
    pub decision: Option<DecisionOutput>,
}

impl CommandOutput for FetchOutput {
    fn to_human(&self) -> String {
        let Some(suggestion) = &self.suggestion else {
            return format!(
                "No suggestion: {}",
                self.skipped.as_deref().unwrap_or("unknown reason")
            );
        };

        let mut rows = vec![("Suggestion", suggestion.clone())];
        if let Some(id) = self.suggestion_id.as_ref().filter(|id| !id.is_empty()) {
            rows.push(("Suggestion id", id.clone()));
        }
        if let Some(decision) = &self.decision {
            rows.push(("Decision", decision.event.clone()));
            rows.push(("Time to decide", format!("{} ms", decision.elapsed_ms)));
            if let Some(stats) = &decision.progress {
                rows.push(("Accepted", stats.total_accepted.to_string()));
                rows.push(("Bug rate", format!("{:.2}%", stats.percentage_with_bugs)));
            }
            if let Some(state) = decision.lock_state {
                let label = if state.is_locked() { "locked" } else { "unlocked" };
                rows.push(("Lock state", label.to_string()));
            }
            if let Some(next) = &decision.rotated_to {
                rows.push(("New code context", next.clone()));
            }
        }
        detail_table(rows).to_string()
    }
}

pub async fn execute(args: FetchArgs, config: &Config, json_mode: bool) -> Result<()> {
    let auth = args.user.clone().map_or_else(AuthContext::anonymous, |id| {
        AuthContext::signed_in(User { id, email: None })
    });
    let collaborators = super::collaborators(
        config,
        Arc::new(StaticAuth(auth)),
        Arc::new(ConsoleNotifier::new(args.review)),
        args.dry_run,
    )?;
    let engine = SuggestionEngine::new(config, collaborators);

    let position = Position::new(0, args.prompt.chars().count());
    let document: Arc<dyn TextDocument> = Arc::new(args.prompt);

    let result = match engine.suggest(EditEvent::new(document, position)).await {
        Ok(suggestion) => {
            let (suggestion_id, has_bug) = {
                let session = engine.session();
                let session = session.lock().await;
                (session.context().suggestion_id.clone(), session.context().has_bug)
            };

            let decision = if args.accept {
                engine.accept().await
            } else if args.reject {
                engine.reject().await
            } else {
                None
            };

            FetchOutput {
                suggestion: Some(suggestion),
                suggestion_id: Some(suggestion_id),
                has_bug: Some(has_bug),
                skipped: None,
                decision: decision.map(DecisionOutput::from),
            }
        }
        Err(skipped) => FetchOutput {
            suggestion: None,
            suggestion_id: None,
            has_bug: None,
            skipped: Some(skipped.to_string()),
            decision: None,
        },
    };

    engine.shutdown().await;
    output(&result, json_mode);
    Ok(())
}
