//! Acceptance statistics over decision history.

use crate::domain::models::{Decision, DecisionEvent, LogEvent, ProgressStats};

/// Pure aggregation of decision history into `ProgressStats`.
///
/// Only accept events count. Rejections, generation events and anything else
/// in the history are ignored, and the result does not depend on order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressEvaluator;

impl ProgressEvaluator {
    pub fn evaluate(events: &[DecisionEvent]) -> ProgressStats {
        let (accepted, with_bugs) = events
            .iter()
            .filter(|event| event.decision == Decision::Accept)
            .fold((0, 0), |(accepted, with_bugs), event| {
                (accepted + 1, with_bugs + usize::from(event.has_bug))
            });

        ProgressStats::new(accepted, with_bugs)
    }

    /// Evaluate raw log history as returned by the logging collaborator.
    pub fn evaluate_history(history: &[LogEvent]) -> ProgressStats {
        let decisions: Vec<DecisionEvent> = history
            .iter()
            .filter_map(DecisionEvent::from_log_event)
            .collect();
        Self::evaluate(&decisions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::LogEventKind;
    use proptest::prelude::*;

    fn event(decision: Decision, has_bug: bool) -> DecisionEvent {
        DecisionEvent {
            decision,
            user_id: Some("u1".into()),
            suggestion_id: "s".into(),
            has_bug,
            elapsed_ms: 100,
            code_context_id: Some("ctx".into()),
            timestamp: None,
        }
    }

    #[test]
    fn test_empty_history() {
        let stats = ProgressEvaluator::evaluate(&[]);
        assert_eq!(stats, ProgressStats::new(0, 0));
        assert!(stats.percentage_with_bugs.abs() < f64::EPSILON);
    }

    #[test]
    fn test_counts_only_accepts() {
        let mut events = vec![event(Decision::Accept, true); 7];
        events.extend(vec![event(Decision::Accept, false); 13]);
        events.extend(vec![event(Decision::Reject, true); 9]);

        let stats = ProgressEvaluator::evaluate(&events);
        assert_eq!(stats.total_accepted, 20);
        assert_eq!(stats.total_with_bugs, 7);
        assert!((stats.percentage_with_bugs - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_history_ignores_generation_events() {
        let history = vec![
            LogEvent::model_generate(30, "s1", true),
            event(Decision::Accept, true).to_log_event(),
            event(Decision::Reject, false).to_log_event(),
            LogEvent::user_locked("u1", "ctx"),
        ];
        assert!(history.iter().any(|e| e.event == LogEventKind::UserLocked));

        let stats = ProgressEvaluator::evaluate_history(&history);
        assert_eq!(stats.total_accepted, 1);
        assert_eq!(stats.total_with_bugs, 1);
    }

    proptest! {
        #[test]
        fn prop_order_does_not_matter(
            flags in prop::collection::vec((any::<bool>(), any::<bool>()), 0..60),
            seed in any::<u64>(),
        ) {
            let events: Vec<DecisionEvent> = flags
                .iter()
                .map(|&(accepted, has_bug)| event(Decision::from_accepted(accepted), has_bug))
                .collect();

            let mut shuffled = events.clone();
            let len = shuffled.len();
            if len > 1 {
                shuffled.rotate_left(usize::try_from(seed % len as u64).unwrap_or(0));
                shuffled.reverse();
            }

            prop_assert_eq!(
                ProgressEvaluator::evaluate(&events),
                ProgressEvaluator::evaluate(&shuffled)
            );
        }

        #[test]
        fn prop_bugs_never_exceed_accepts(
            flags in prop::collection::vec((any::<bool>(), any::<bool>()), 0..60),
        ) {
            let events: Vec<DecisionEvent> = flags
                .iter()
                .map(|&(accepted, has_bug)| event(Decision::from_accepted(accepted), has_bug))
                .collect();

            let stats = ProgressEvaluator::evaluate(&events);
            prop_assert!(stats.total_with_bugs <= stats.total_accepted);
            prop_assert!((0.0..=100.0).contains(&stats.percentage_with_bugs));
        }
    }
}
