use crate::dependency::DependencyTracker;

/// UI state derived from the dependency set. `Waiting` names exactly one
/// dependency so the caller can show a single stable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Waiting { blocking: String },
    Ready,
}

/// Reports the first unmet name in `ordered_required`, walking the list in
/// fixed declaration order rather than arrival order: the waiting message
/// must be stable across re-renders ("waiting for connection" always beats
/// "waiting for settings", even when settings happens to be the newer gap).
pub fn evaluate(tracker: &DependencyTracker, ordered_required: &[&str]) -> Readiness {
    for name in ordered_required {
        if !tracker.is_satisfied(name) {
            return Readiness::Waiting {
                blocking: (*name).to_string(),
            };
        }
    }
    Readiness::Ready
}

impl DependencyTracker {
    /// Convenience: evaluate against this tracker's own registration order.
    pub fn readiness(&self) -> Readiness {
        evaluate(self, &self.required_names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_order_wins_over_arrival_order() {
        let mut tracker = DependencyTracker::new();
        tracker.register("rpc.open");
        tracker.register("rpc.settings");
        // Settings arrives first; the report must still name the connection.
        tracker.mark_satisfied("rpc.settings");
        assert_eq!(
            evaluate(&tracker, &["rpc.open", "rpc.settings"]),
            Readiness::Waiting {
                blocking: "rpc.open".to_string()
            }
        );
    }

    #[test]
    fn walks_the_checklist_then_goes_ready() {
        let mut tracker = DependencyTracker::new();
        tracker.register("rpc.open");
        tracker.register("rpc.settings");
        let order = ["rpc.open", "rpc.settings"];

        assert_eq!(
            evaluate(&tracker, &order),
            Readiness::Waiting {
                blocking: "rpc.open".to_string()
            }
        );

        tracker.mark_satisfied("rpc.open");
        assert_eq!(
            evaluate(&tracker, &order),
            Readiness::Waiting {
                blocking: "rpc.settings".to_string()
            }
        );

        tracker.mark_satisfied("rpc.settings");
        assert_eq!(evaluate(&tracker, &order), Readiness::Ready);
    }

    #[test]
    fn reset_re_blocks_on_the_first_requirement() {
        let mut tracker = DependencyTracker::new();
        tracker.register("rpc.open");
        tracker.register("rpc.settings");
        tracker.mark_satisfied("rpc.open");
        tracker.mark_satisfied("rpc.settings");
        assert_eq!(tracker.readiness(), Readiness::Ready);

        tracker.reset();
        assert_eq!(
            tracker.readiness(),
            Readiness::Waiting {
                blocking: "rpc.open".to_string()
            }
        );
    }

    #[test]
    fn double_satisfaction_changes_nothing() {
        let mut tracker = DependencyTracker::new();
        tracker.register("rpc.open");
        tracker.mark_satisfied("rpc.open");
        let once = tracker.readiness();
        tracker.mark_satisfied("rpc.open");
        assert_eq!(tracker.readiness(), once);
    }

    #[test]
    fn non_blocking_never_appears_in_waiting() {
        let mut tracker = DependencyTracker::new();
        tracker.register("rpc.open");
        tracker.register_non_blocking("rpc.profiles");
        tracker.mark_satisfied("rpc.open");
        assert_eq!(tracker.readiness(), Readiness::Ready);
    }
}
