use serde::{Deserialize, Serialize};

/// Acceptance statistics for one code context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub total_accepted: usize,
    pub total_with_bugs: usize,
    /// `total_with_bugs / total_accepted * 100`, zero when nothing was accepted
    pub percentage_with_bugs: f64,
}

impl ProgressStats {
    #[allow(clippy::cast_precision_loss)]
    pub fn new(total_accepted: usize, total_with_bugs: usize) -> Self {
        let percentage_with_bugs = if total_accepted == 0 {
            0.0
        } else {
            total_with_bugs as f64 / total_accepted as f64 * 100.0
        };

        Self {
            total_accepted,
            total_with_bugs,
            percentage_with_bugs,
        }
    }
}

impl std::fmt::Display for ProgressStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "You have accepted {} suggestions. {:.2}% of them had bugs.",
            self.total_accepted, self.percentage_with_bugs
        )
    }
}
