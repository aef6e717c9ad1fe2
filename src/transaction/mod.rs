// src/transaction/mod.rs

//! Plan execution
//!
//! A [`Plan`] is applied step by step against a [`Container`]. Execution
//! stops at the first failing step and does not roll back: every completed
//! rename stays in place and the error names the step that failed. Because
//! renames never delete content, a halted plan can always be finished or
//! undone by hand.
//!
//! # Execution
//!
//! ```text
//! plan_transition -> execute_plan -> resolve_state
//!                      |
//!                      +-- step N fails -> PlanConflict / StepFailed (steps 0..N stay applied)
//! ```

mod planner;

pub use planner::{Plan, RenameStep, plan_transition};

use crate::container::Container;
use crate::error::{Error, Result};
use crate::progress::ProgressTracker;
use std::time::Instant;
use tracing::{info, warn};

/// Outcome of a successfully applied plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyReport {
    pub steps_applied: usize,
    pub duration_ms: u64,
}

/// Apply every step of `plan` in order
///
/// Step indices in errors are zero-based. A destination that already exists
/// yields [`Error::PlanConflict`]; any other failure is wrapped in
/// [`Error::StepFailed`].
pub fn execute_plan(
    plan: &Plan,
    container: &mut dyn Container,
    progress: &dyn ProgressTracker,
) -> Result<ApplyReport> {
    let start = Instant::now();
    progress.set_length(plan.steps.len() as u64);
    progress.set_message(&format!("Applying {} -> {} for {}", plan.from, plan.to, plan.feature));

    for (index, step) in plan.steps.iter().enumerate() {
        if let Err(e) = container.rename(&step.src, &step.dst) {
            let error = match e {
                Error::AlreadyExists(path) => Error::PlanConflict { step: index, path },
                other => Error::StepFailed {
                    step: index,
                    src: step.src.clone(),
                    dst: step.dst.clone(),
                    source: Box::new(other),
                },
            };
            warn!(
                "Halting '{}' at step {} of {}: {}",
                plan.feature,
                index,
                plan.steps.len(),
                error
            );
            progress.finish_with_error(&error.to_string());
            return Err(error);
        }

        info!("[{}] step {}: {}", plan.feature, index, step);
        progress.increment(1);
    }

    let duration_ms = start.elapsed().as_millis() as u64;
    progress.finish_with_message(&format!("{} set to {}", plan.feature, plan.to));
    info!(
        "Applied {} steps for '{}' in {} ms on {}",
        plan.steps.len(),
        plan.feature,
        duration_ms,
        container.describe()
    );

    Ok(ApplyReport {
        steps_applied: plan.steps.len(),
        duration_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::memory::MemoryContainer;
    use crate::progress::{CallbackProgress, ProgressEvent, SilentProgress};
    use crate::schema::tests::{night_schema, sample_schema};
    use crate::schema::{FeatureValue, resolve_state};
    use std::sync::{Arc, Mutex};

    fn default_pack() -> MemoryContainer {
        MemoryContainer::with_files(&[
            "direct.png",
            "a.png.packset.old",
            "p.png",
            "q.png.packset.old",
            "classic.jpg",
            "modern.jpg",
            "minimal.jpg",
        ])
    }

    #[test]
    fn test_execute_plan() {
        let schema = sample_schema();
        let mut pack = default_pack();
        let state = resolve_state(&schema, &pack).unwrap();
        let plan = plan_transition(&schema, &state, "status_feature", "modern").unwrap();

        let report = execute_plan(&plan, &mut pack, &SilentProgress::new()).unwrap();
        assert_eq!(report.steps_applied, 2);
        assert_eq!(
            pack.paths(),
            vec![
                "a.png.packset.old",
                "classic.jpg",
                "classic.jpg.packset.old",
                "direct.png",
                "minimal.jpg",
                "p.png",
                "q.png.packset.old",
            ]
        );
        // Content followed the renames
        assert_eq!(pack.read("classic.jpg").unwrap(), b"modern.jpg");
        assert_eq!(pack.read("classic.jpg.packset.old").unwrap(), b"classic.jpg");

        let state = resolve_state(&schema, &pack).unwrap();
        assert_eq!(
            state.get("status_feature"),
            Some(&FeatureValue::Toggle("modern".to_string()))
        );
    }

    #[test]
    fn test_default_on_feature_round_trip() {
        let schema = night_schema();
        let mut pack =
            MemoryContainer::with_files(&["direct.png", "a.png", "p.png.packset.old", "q.png"]);
        let original = pack.clone();

        let state = resolve_state(&schema, &pack).unwrap();
        assert_eq!(state.get("night_mode"), Some(&FeatureValue::Bool(true)));

        let plan = plan_transition(&schema, &state, "night_mode", "false").unwrap();
        let steps: Vec<String> = plan.steps.iter().map(|s| s.to_string()).collect();
        assert_eq!(
            steps,
            vec![
                "direct.png -> direct.png.packset.old",
                "a.png -> a.png.packset.old",
                "q.png -> q.png.packset.old",
                "p.png.packset.old -> p.png",
            ]
        );

        execute_plan(&plan, &mut pack, &SilentProgress::new()).unwrap();
        let state = resolve_state(&schema, &pack).unwrap();
        assert_eq!(state.get("night_mode"), Some(&FeatureValue::Bool(false)));

        let back = plan_transition(&schema, &state, "night_mode", "true").unwrap();
        assert_eq!(back.len(), 4);
        execute_plan(&back, &mut pack, &SilentProgress::new()).unwrap();
        assert_eq!(pack, original);
        assert_eq!(
            resolve_state(&schema, &pack).unwrap().get("night_mode"),
            Some(&FeatureValue::Bool(true))
        );
    }

    #[test]
    fn test_reapplying_plan_conflicts() {
        let schema = sample_schema();
        let mut pack = default_pack();
        let state = resolve_state(&schema, &pack).unwrap();
        let plan = plan_transition(&schema, &state, "status_feature", "modern").unwrap();

        execute_plan(&plan, &mut pack, &SilentProgress::new()).unwrap();
        let after_first = pack.clone();

        let err = execute_plan(&plan, &mut pack, &SilentProgress::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::PlanConflict { step: 0, ref path } if path == "classic.jpg.packset.old"
        ));
        assert_eq!(pack, after_first);
    }

    #[test]
    fn test_halts_on_first_failure_without_rollback() {
        let schema = sample_schema();
        let mut pack = default_pack();
        let state = resolve_state(&schema, &pack).unwrap();
        let plan = plan_transition(&schema, &state, "switch_feature", "true").unwrap();
        assert_eq!(plan.len(), 4);

        pack.fail_on = Some("p.png".to_string());
        let err = execute_plan(&plan, &mut pack, &SilentProgress::new()).unwrap_err();
        match err {
            Error::StepFailed { step, src, dst, .. } => {
                assert_eq!(step, 2);
                assert_eq!(src, "p.png");
                assert_eq!(dst, "p.png.packset.old");
            }
            other => panic!("unexpected error: {other}"),
        }

        // Steps 0 and 1 stay applied, 3 never ran
        assert!(pack.exists("direct.png.packset.old").unwrap());
        assert!(pack.exists("a.png").unwrap());
        assert!(pack.exists("p.png").unwrap());
        assert!(pack.exists("q.png.packset.old").unwrap());
    }

    #[test]
    fn test_noop_plan_touches_nothing() {
        let schema = sample_schema();
        let mut pack = default_pack();
        let state = resolve_state(&schema, &pack).unwrap();
        let plan = plan_transition(&schema, &state, "switch_feature", "false").unwrap();

        let before = pack.clone();
        let report = execute_plan(&plan, &mut pack, &SilentProgress::new()).unwrap();
        assert_eq!(report.steps_applied, 0);
        assert_eq!(pack, before);
    }

    #[test]
    fn test_progress_reports_each_step() {
        let schema = sample_schema();
        let mut pack = default_pack();
        let state = resolve_state(&schema, &pack).unwrap();
        let plan = plan_transition(&schema, &state, "switch_feature", "true").unwrap();

        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = Arc::clone(&events);
        let progress = CallbackProgress::new(0, move |event| {
            events_clone.lock().unwrap().push(event);
        });

        execute_plan(&plan, &mut pack, &progress).unwrap();

        let events = events.lock().unwrap();
        let increments = events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Step { .. }))
            .count();
        assert_eq!(increments, 4);
        assert!(matches!(events.last(), Some(ProgressEvent::Finished(_))));
        assert!(progress.is_finished());
    }
}
