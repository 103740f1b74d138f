use parking_lot::Mutex;
use tracing::info;

use crate::domain::ProgressStep;

/// Records the status transitions of one question as it moves through the
/// pipeline and mirrors each of them to the log.
#[derive(Default)]
pub struct ProgressTracker {
    steps: Mutex<Vec<ProgressStep>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_status(&self, agent: &str, subject: Option<&str>, status: &str) {
        info!(
            target: "adtarget::progress",
            agent,
            subject = subject.unwrap_or_default(),
            "{status}"
        );

        self.steps.lock().push(ProgressStep {
            agent: agent.to_string(),
            subject: subject.map(str::to_string),
            status: status.to_string(),
        });
    }

    pub fn finish(self) -> Vec<ProgressStep> {
        self.steps.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_recorded_in_order() {
        let tracker = ProgressTracker::new();
        tracker.update_status("supervisor", None, "Analyzing user request");
        tracker.update_status("usage", Some("e-bikes"), "Retrieving data");

        let steps = tracker.finish();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].agent, "supervisor");
        assert_eq!(steps[1].subject.as_deref(), Some("e-bikes"));
        assert_eq!(steps[1].status, "Retrieving data");
    }
}
