// THEORY:
// The `pipeline` module is the top-level API of the acquisition engine. It wires the
// capture, locate and actuate layers into one repeating cycle and exposes it as a
// cancellable background task.
//
// One cycle:
// 1.  **Capture**: Read a clamped square around the display center.
// 2.  **Locate**: Find the nearest in-range blob, translating its centroid by the
//     manual offset plus the capture's clamped origin.
// 3.  **Publish**: Replace the single shared `Target` slot. Readers always see a
//     whole target from one cycle; older values are dropped.
// 4.  **Actuate** (optional): When auto-move is on and the target is valid, move the
//     pointer from the display center toward it in smoothed steps.
// 5.  **Throttle**: Sleep for the cycle interval, waking early on shutdown.
//
// Capture and locate are synchronous and CPU-bound (an OS screen grab plus a full
// per-pixel pass), so each cycle runs them on tokio's blocking pool and the async
// worker only awaits the result.
//
// Every failure inside a cycle degrades to "no target" or a counted, logged event.
// The loop itself only stops when its owner asks it to.

use crate::config::AcquisitionConfig;
use crate::core_modules::pointer_actuator::{PointerActuator, PointerInjector};
use crate::core_modules::region_capturer::{DisplaySource, RegionCapturer};
use crate::core_modules::target::{Target, TargetPublisher};
use crate::core_modules::target_locator::target_locator;
use crate::error::AcquisitionError;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

// Re-export key data structures for the public API.
pub use crate::core_modules::pointer_actuator::MoveReport;
pub use crate::core_modules::target::{TargetReader, target_slot};

/// Counters for one acquisition run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AcquisitionSummary {
    pub cycles: u64,
    /// Cycles that published a valid target.
    pub detections: u64,
    /// Cycles whose capture came back empty.
    pub capture_failures: u64,
    /// Smoothed moves started by the auto-move policy.
    pub moves: u64,
    /// Pointer steps that could not be injected.
    pub injection_failures: u64,
}

/// The acquisition engine. Owns the capture source, the optional actuator and the
/// write side of the target slot.
pub struct AcquisitionLoop<S, I> {
    capturer: Arc<RegionCapturer<S>>,
    actuator: PointerActuator<I>,
    publisher: TargetPublisher,
    config: AcquisitionConfig,
    summary: AcquisitionSummary,
}

/// What the blocking half of a cycle hands back to the async half.
struct Scan {
    target: Target,
    captured: bool,
    display_size: Option<(u32, u32)>,
}

impl<S, I> AcquisitionLoop<S, I>
where
    S: DisplaySource + 'static,
    I: PointerInjector + 'static,
{
    pub fn new(source: S, injector: I, publisher: TargetPublisher, config: AcquisitionConfig) -> Self {
        let actuator = PointerActuator::new(injector, config.step_interval)
            .with_failure_policy(config.failure_policy);
        Self {
            capturer: Arc::new(RegionCapturer::new(source)),
            actuator,
            publisher,
            config,
            summary: AcquisitionSummary::default(),
        }
    }

    pub fn summary(&self) -> AcquisitionSummary {
        self.summary
    }

    /// Runs capture, locate, publish and the optional move once, without throttling.
    pub async fn run_cycle(&mut self) -> Target {
        self.summary.cycles += 1;

        let scan = match tokio::task::spawn_blocking(self.scan_job()).await {
            Ok(scan) => scan,
            Err(err) => {
                tracing::warn!(error = %err, "capture task failed");
                Scan {
                    target: Target::invalid(),
                    captured: false,
                    display_size: None,
                }
            }
        };

        if !scan.captured {
            self.summary.capture_failures += 1;
        }

        let target = scan.target;
        self.publisher.publish(target);

        if target.valid {
            self.summary.detections += 1;
            tracing::debug!(x = target.x, y = target.y, "target published");
        } else {
            tracing::trace!("no target this cycle");
        }

        if let (Some((x, y)), Some(display_size)) = (target.position(), scan.display_size) {
            self.move_toward(x, y, display_size).await;
        }

        target
    }

    /// Builds the blocking half of a cycle: capture, then locate in absolute coordinates.
    fn scan_job(&self) -> impl FnOnce() -> Scan + Send + 'static {
        let capturer = Arc::clone(&self.capturer);
        let radius = self.config.radius;
        let manual_offset = self.config.manual_offset;
        let color_range = self.config.color_range;
        let auto_move = self.config.auto_move.enabled;

        move || {
            let capture = capturer.capture(radius);
            let (origin_x, origin_y) = capture.origin();
            let offset = (manual_offset.0 + origin_x, manual_offset.1 + origin_y);
            let target = target_locator::locate(&capture.buffer, radius, offset, &color_range);
            let display_size = if auto_move && target.valid {
                capturer.source().dimensions().ok()
            } else {
                None
            };
            Scan {
                target,
                captured: !capture.buffer.is_empty(),
                display_size,
            }
        }
    }

    async fn move_toward(&mut self, x: i32, y: i32, (width, height): (u32, u32)) {
        let dx = x - (width / 2) as i32;
        let dy = y - (height / 2) as i32;
        if dx == 0 && dy == 0 {
            return;
        }

        self.summary.moves += 1;
        match self.actuator.move_smoothed(dx, dy, self.config.auto_move.steps).await {
            Ok(report) => self.summary.injection_failures += report.failures as u64,
            Err(err) => {
                self.summary.injection_failures += 1;
                tracing::warn!(error = %err, dx, dy, "smoothed move aborted");
            }
        }
    }

    /// Cycles until `shutdown` turns `true` or its sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> AcquisitionSummary {
        tracing::info!(
            radius = self.config.radius,
            auto_move = self.config.auto_move.enabled,
            "acquisition loop started"
        );

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            self.run_cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(self.config.cycle_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::info!(
            cycles = self.summary.cycles,
            detections = self.summary.detections,
            capture_failures = self.summary.capture_failures,
            "acquisition loop stopped"
        );
        self.summary
    }

    /// Starts the loop on the tokio runtime and returns the handle that stops it.
    pub fn spawn(self) -> AcquisitionHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));
        AcquisitionHandle { shutdown_tx, task }
    }
}

/// Owner's handle on a running acquisition loop.
pub struct AcquisitionHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<AcquisitionSummary>,
}

impl AcquisitionHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Requests cancellation and waits for the current cycle to finish.
    pub async fn shutdown(self) -> Result<AcquisitionSummary, AcquisitionError> {
        self.shutdown_tx.send_replace(true);
        Ok(self.task.await?)
    }
}
