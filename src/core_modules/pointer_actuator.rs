// THEORY:
// The `PointerActuator` turns one pixel offset into many small relative pointer
// moves spread over time. It never jumps: a displacement of `(dx, dy)` over `steps`
// iterations is fed through a pair of fractional accumulators.
//
// Key principles:
// 1.  **Carry-forward rounding**: Each iteration adds `d / steps` to its
//     accumulator, emits the rounded whole-pixel part, and keeps the remainder.
//     However the per-step rounding falls, the emitted deltas sum exactly to
//     `(dx, dy)`.
// 2.  **Quiet steps**: An iteration whose rounded delta is `(0, 0)` emits nothing
//     but still takes its time slot.
// 3.  **Explicit failure policy**: Injection is fallible. Each emitted step reports
//     its own result and the configured `InjectionFailurePolicy` decides whether the
//     move carries on (the default) or stops.
// 4.  **Injectable time**: Pacing uses `tokio::time`, so tests run on a paused,
//     virtual clock instead of real sleeps.

use crate::error::{AcquisitionError, InjectionError};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Something that can enqueue one relative pointer movement.
pub trait PointerInjector: Send {
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), InjectionError>;
}

/// What to do when a single step cannot be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InjectionFailurePolicy {
    /// Log the failure, count it, and keep stepping.
    #[default]
    Ignore,
    /// Stop the move and return the error.
    Abort,
}

/// Outcome of one smoothed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveReport {
    /// Sum of the deltas the injector accepted.
    pub emitted: (i32, i32),
    /// Number of accepted events.
    pub events: usize,
    /// Number of rejected events.
    pub failures: usize,
}

/// Splits `(dx, dy)` into per-iteration whole-pixel deltas, zeros included.
pub fn plan_steps(dx: i32, dy: i32, steps: i32) -> Vec<(i32, i32)> {
    let steps = steps.max(1);
    let step_x = dx as f64 / steps as f64;
    let step_y = dy as f64 / steps as f64;

    let (mut accum_x, mut accum_y) = (0.0f64, 0.0f64);
    let mut plan = Vec::with_capacity(steps as usize);
    for _ in 0..steps {
        accum_x += step_x;
        accum_y += step_y;
        let move_x = accum_x.round() as i32;
        let move_y = accum_y.round() as i32;
        accum_x -= move_x as f64;
        accum_y -= move_y as f64;
        plan.push((move_x, move_y));
    }
    plan
}

pub struct PointerActuator<I> {
    injector: I,
    step_interval: Duration,
    failure_policy: InjectionFailurePolicy,
}

impl<I: PointerInjector> PointerActuator<I> {
    pub fn new(injector: I, step_interval: Duration) -> Self {
        Self {
            injector,
            step_interval,
            failure_policy: InjectionFailurePolicy::default(),
        }
    }

    pub fn with_failure_policy(mut self, failure_policy: InjectionFailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    /// Moves the pointer by `(dx, dy)` in `steps` paced increments (`steps <= 0` means 1).
    pub async fn move_smoothed(
        &mut self,
        dx: i32,
        dy: i32,
        steps: i32,
    ) -> Result<MoveReport, AcquisitionError> {
        let plan = plan_steps(dx, dy, steps);
        let last = plan.len().saturating_sub(1);
        let mut report = MoveReport::default();

        for (index, (move_x, move_y)) in plan.into_iter().enumerate() {
            if move_x != 0 || move_y != 0 {
                match self.injector.move_relative(move_x, move_y) {
                    Ok(()) => {
                        report.events += 1;
                        report.emitted.0 += move_x;
                        report.emitted.1 += move_y;
                    }
                    Err(source) => {
                        report.failures += 1;
                        match self.failure_policy {
                            InjectionFailurePolicy::Ignore => {
                                tracing::warn!(error = %source, step = index, "pointer step dropped");
                            }
                            InjectionFailurePolicy::Abort => {
                                return Err(AcquisitionError::Injection {
                                    emitted_events: report.events,
                                    source,
                                });
                            }
                        }
                    }
                }
            }

            if index < last && !self.step_interval.is_zero() {
                tokio::time::sleep(self.step_interval).await;
            }
        }

        tracing::trace!(dx, dy, events = report.events, failures = report.failures, "smoothed move done");
        Ok(report)
    }
}

/// Discards every movement.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInjector;

impl PointerInjector for NoopInjector {
    fn move_relative(&mut self, _dx: i32, _dy: i32) -> Result<(), InjectionError> {
        Ok(())
    }
}

/// Keeps every accepted movement in a shared log. Can be told to reject chosen
/// event numbers (zero-based, counted over all attempts).
#[derive(Debug, Clone, Default)]
pub struct RecordingInjector {
    moves: Arc<Mutex<Vec<(i32, i32)>>>,
    attempts: Arc<Mutex<usize>>,
    reject: Vec<usize>,
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(attempts: &[usize]) -> Self {
        Self {
            reject: attempts.to_vec(),
            ..Self::default()
        }
    }

    /// Accepted movements so far, in order.
    pub fn moves(&self) -> Vec<(i32, i32)> {
        self.moves.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn total(&self) -> (i32, i32) {
        self.moves()
            .iter()
            .fold((0, 0), |(x, y), (dx, dy)| (x + dx, y + dy))
    }
}

impl PointerInjector for RecordingInjector {
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), InjectionError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap_or_else(PoisonError::into_inner);
            let attempt = *attempts;
            *attempts += 1;
            attempt
        };

        if self.reject.contains(&attempt) {
            return Err(InjectionError::Rejected {
                dx,
                dy,
                reason: format!("attempt {attempt} rejected"),
            });
        }

        self.moves
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((dx, dy));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    fn sum(plan: &[(i32, i32)]) -> (i32, i32) {
        plan.iter().fold((0, 0), |(x, y), (dx, dy)| (x + dx, y + dy))
    }

    #[test]
    fn planned_steps_sum_exactly_to_displacement() {
        for dx in [-1000, -333, -7, -1, 0, 1, 2, 5, 99, 640, 1919] {
            for dy in [-541, -3, 0, 1, 17, 1079] {
                for steps in [1, 2, 3, 5, 7, 10, 33, 100, 1000] {
                    let plan = plan_steps(dx, dy, steps);
                    assert_eq!(plan.len(), steps as usize);
                    assert_eq!(sum(&plan), (dx, dy), "dx={dx} dy={dy} steps={steps}");
                }
            }
        }
    }

    #[test]
    fn non_positive_steps_behave_like_one() {
        for steps in [0, -1, -50] {
            assert_eq!(plan_steps(37, -12, steps), plan_steps(37, -12, 1));
        }
        assert_eq!(plan_steps(37, -12, 1), vec![(37, -12)]);
    }

    #[test]
    fn small_displacements_spread_over_quiet_steps() {
        assert_eq!(plan_steps(2, 0, 4), vec![(1, 0), (0, 0), (1, 0), (0, 0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn emits_only_nonzero_steps_with_paced_timing() {
        let injector = RecordingInjector::new();
        let mut actuator = PointerActuator::new(injector.clone(), Duration::from_millis(1));

        let start = Instant::now();
        let report = actuator.move_smoothed(2, 0, 4).await.expect("ignore policy");

        assert_eq!(injector.moves(), vec![(1, 0), (1, 0)]);
        assert_eq!(report, MoveReport { emitted: (2, 0), events: 2, failures: 0 });
        assert_eq!(start.elapsed(), Duration::from_millis(3));
    }

    #[tokio::test(start_paused = true)]
    async fn recorded_moves_sum_to_target() {
        let injector = RecordingInjector::new();
        let mut actuator = PointerActuator::new(injector.clone(), Duration::from_millis(1));
        actuator.move_smoothed(-313, 128, 7).await.expect("ignore policy");
        assert_eq!(injector.total(), (-313, 128));
    }

    #[tokio::test(start_paused = true)]
    async fn ignore_policy_counts_failures_and_continues() {
        let injector = RecordingInjector::rejecting(&[1]);
        let mut actuator = PointerActuator::new(injector.clone(), Duration::from_millis(1));

        let report = actuator.move_smoothed(30, 30, 3).await.expect("ignore policy");
        assert_eq!(report.failures, 1);
        assert_eq!(report.events, 2);
        assert_eq!(report.emitted, (20, 20));
        assert_eq!(injector.moves(), vec![(10, 10), (10, 10)]);
    }

    #[tokio::test(start_paused = true)]
    async fn abort_policy_stops_at_first_failure() {
        let injector = RecordingInjector::rejecting(&[1]);
        let mut actuator = PointerActuator::new(injector.clone(), Duration::from_millis(1))
            .with_failure_policy(InjectionFailurePolicy::Abort);

        let err = actuator.move_smoothed(30, 30, 3).await.expect_err("second step rejected");
        match err {
            AcquisitionError::Injection { emitted_events, source } => {
                assert_eq!(emitted_events, 1);
                assert!(matches!(source, InjectionError::Rejected { dx: 10, dy: 10, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(injector.moves(), vec![(10, 10)]);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_displacement_emits_nothing() {
        let injector = RecordingInjector::new();
        let mut actuator = PointerActuator::new(injector.clone(), Duration::ZERO);
        let report = actuator.move_smoothed(0, 0, 10).await.expect("ignore policy");
        assert_eq!(report, MoveReport::default());
        assert!(injector.moves().is_empty());
    }
}
