// ABOUTME: Simulated progress sequence shown while a submission is in flight
// ABOUTME: Also owns the single-slot outcome handoff between the two tasks

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::remote::models::JobOutcome;

/// Snapshot emitted to the progress sink. `fraction_complete` is
/// non-decreasing until `is_done` flips; `is_done` at 1.0 is terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressState {
    pub fraction_complete: f64,
    pub stage_label: String,
    pub is_done: bool,
}

/// Single-writer result slot. The submit task stores the outcome and then
/// sets the flag; a reader that observes the flag always observes the
/// outcome.
pub struct OutcomeSlot {
    outcome: Mutex<Option<JobOutcome>>,
    done: AtomicBool,
}

impl OutcomeSlot {
    pub fn new() -> Self {
        Self {
            outcome: Mutex::new(None),
            done: AtomicBool::new(false),
        }
    }

    pub fn complete(&self, outcome: JobOutcome) {
        let mut slot = self.outcome.lock().expect("outcome slot poisoned");
        *slot = Some(outcome);
        drop(slot);
        self.done.store(true, Ordering::Release);
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    pub fn take(&self) -> Option<JobOutcome> {
        self.outcome.lock().expect("outcome slot poisoned").take()
    }
}

impl Default for OutcomeSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Assumed pipeline phases. The fractions and labels are cosmetic; the
/// reporter has no visibility into actual remote progress.
const STAGES: &[(f64, &str)] = &[
    (0.10, "Workflow started"),
    (0.15, "Analyzing layout"),
    (0.25, "Detecting components"),
    (0.35, "Extracting styling"),
    (0.45, "Analyzing content"),
    (0.55, "Aggregating analysis results"),
    (0.60, "Generating HTML"),
    (0.70, "Creating React component"),
    (0.80, "Generating Tailwind classes"),
    (0.90, "Building final output"),
];

const UPLOAD_FRACTION: f64 = 0.05;
const HOLD_FRACTION: f64 = 0.95;
const HOLD_LABEL: &str = "Finalizing and packaging results";
const DONE_LABEL: &str = "Processing complete";

pub struct ProgressReporter {
    /// Wall-clock time spent on each stage before advancing.
    advance_interval: Duration,
    /// How often the completion flag is re-checked within a stage.
    poll_interval: Duration,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self {
            advance_interval: Duration::from_secs(45),
            poll_interval: Duration::from_secs(5),
        }
    }
}

impl ProgressReporter {
    #[cfg(test)]
    fn with_intervals(advance_interval: Duration, poll_interval: Duration) -> Self {
        Self {
            advance_interval,
            poll_interval,
        }
    }

    /// Walks the fixed stage sequence until the slot reports completion,
    /// then emits the terminal state. Runs on the foreground task while the
    /// submit task blocks on the network call.
    pub async fn run(&self, slot: &OutcomeSlot, mut emit: impl FnMut(&ProgressState)) {
        let mut state = ProgressState {
            fraction_complete: UPLOAD_FRACTION,
            stage_label: "Uploading wireframe".to_string(),
            is_done: false,
        };
        emit(&state);

        let polls_per_stage = (self.advance_interval.as_millis()
            / self.poll_interval.as_millis().max(1))
        .max(1);
        let mut stage_index = 0;

        'running: while !slot.is_done() {
            if stage_index < STAGES.len() {
                let (fraction, label) = STAGES[stage_index];
                state.fraction_complete = fraction;
                state.stage_label = label.to_string();
                emit(&state);
                stage_index += 1;

                for _ in 0..polls_per_stage {
                    tokio::time::sleep(self.poll_interval).await;
                    if slot.is_done() {
                        break 'running;
                    }
                }
            } else {
                state.fraction_complete = HOLD_FRACTION;
                state.stage_label = HOLD_LABEL.to_string();
                emit(&state);
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        state.fraction_complete = 1.0;
        state.stage_label = DONE_LABEL.to_string();
        state.is_done = true;
        emit(&state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn outcome() -> JobOutcome {
        JobOutcome::Success {
            html: "<html></html>".to_string(),
            captured_at: None,
        }
    }

    fn assert_well_formed(emissions: &[ProgressState]) {
        for pair in emissions.windows(2) {
            assert!(
                pair[1].fraction_complete >= pair[0].fraction_complete,
                "fraction regressed: {:?} -> {:?}",
                pair[0],
                pair[1]
            );
        }
        let last = emissions.last().expect("at least one emission");
        assert!(last.is_done);
        assert_eq!(last.fraction_complete, 1.0);
        for state in &emissions[..emissions.len() - 1] {
            assert!(!state.is_done, "done reported before the final emission");
        }
    }

    #[test]
    fn test_slot_flag_follows_stored_outcome() {
        let slot = OutcomeSlot::new();
        assert!(!slot.is_done());
        assert!(slot.take().is_none());

        slot.complete(outcome());
        assert!(slot.is_done());
        assert_eq!(slot.take(), Some(outcome()));
        assert!(slot.take().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_after_two_stage_ticks() {
        let slot = Arc::new(OutcomeSlot::new());
        let reporter = ProgressReporter::default();

        let completer = slot.clone();
        tokio::spawn(async move {
            // Lands inside the second stage's poll window.
            tokio::time::sleep(Duration::from_secs(70)).await;
            completer.complete(outcome());
        });

        let mut emissions = Vec::new();
        reporter.run(&slot, |state| emissions.push(state.clone())).await;

        assert_well_formed(&emissions);
        let labels: Vec<&str> = emissions.iter().map(|s| s.stage_label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Uploading wireframe",
                "Workflow started",
                "Analyzing layout",
                "Processing complete",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_completion_skips_stages() {
        let slot = OutcomeSlot::new();
        slot.complete(outcome());

        let mut emissions = Vec::new();
        ProgressReporter::default()
            .run(&slot, |state| emissions.push(state.clone()))
            .await;

        assert_well_formed(&emissions);
        assert_eq!(emissions.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_holds_at_ceiling_after_stages_exhaust() {
        let slot = Arc::new(OutcomeSlot::new());
        let reporter =
            ProgressReporter::with_intervals(Duration::from_secs(2), Duration::from_secs(1));

        let completer = slot.clone();
        tokio::spawn(async move {
            // Ten stages at 2s each finish at t=20; leave time in the hold.
            tokio::time::sleep(Duration::from_secs(30)).await;
            completer.complete(outcome());
        });

        let mut emissions = Vec::new();
        reporter.run(&slot, |state| emissions.push(state.clone())).await;

        assert_well_formed(&emissions);
        let holds: Vec<&ProgressState> = emissions
            .iter()
            .filter(|s| s.stage_label == HOLD_LABEL)
            .collect();
        assert!(!holds.is_empty(), "expected at least one holding emission");
        for state in holds {
            assert_eq!(state.fraction_complete, HOLD_FRACTION);
        }
        // Nothing before the terminal emission exceeds the hold ceiling.
        for state in &emissions[..emissions.len() - 1] {
            assert!(state.fraction_complete <= HOLD_FRACTION);
        }
    }
}
