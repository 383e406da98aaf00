//! Structured diagnostics emitted by the controller.
//!
//! The controller never prints. It reports [`DiagnosticEvent`]s to a
//! [`DiagnosticsSink`]; the binary forwards them to `tracing`, tests record
//! them.

use std::sync::Arc;

use parking_lot::Mutex;
use tracer_common::tracer::config::AlignmentMode;
use tracer_common::tracer::maneuver::TurnDirection;
use tracer_common::tracer::state::AlignmentStep;
use tracing::{debug, info, warn};

/// One controller event.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    /// Encoders zeroed on the first tick.
    Initialized,
    /// Alignment moved to a new step.
    AlignmentStep {
        /// Step left.
        from: AlignmentStep,
        /// Step entered.
        to: AlignmentStep,
    },
    /// Alignment finished; steady-state operation follows.
    AlignmentCompleted {
        /// Mode that finished.
        mode: AlignmentMode,
    },
    /// Blue marker seen.
    MarkerDetected {
        /// Detections so far, this one included.
        count: u32,
    },
    /// Base speed dropped to the slow level.
    SlowModeEngaged {
        /// New base speed.
        speed: i32,
    },
    /// Maneuver for a detection began.
    ManeuverStarted {
        /// Detection count.
        count: u32,
        /// Number of steps.
        steps: usize,
    },
    /// Maneuver for a detection ended.
    ManeuverFinished {
        /// Detection count.
        count: u32,
        /// Whether the permanent stop is latched.
        halted: bool,
    },
    /// A scripted move returned.
    MoveFinished {
        /// Curve direction.
        direction: TurnDirection,
        /// Requested distance [cm].
        distance_cm: f64,
        /// Polls spent.
        polls: u32,
        /// `false` on timeout.
        reached: bool,
    },
    /// Creep-to-black returned.
    CreepFinished {
        /// Polls spent.
        polls: u32,
        /// `false` on timeout.
        found: bool,
    },
    /// Permanent stop latched.
    CompleteStop,
    /// Sensor read failed; wheels held stopped for the tick.
    SensorFault {
        /// Device error text.
        error: String,
    },
}

/// Receiver for controller diagnostics.
pub trait DiagnosticsSink: Send + Sync {
    /// Handle one event. Must not block.
    fn emit(&self, event: DiagnosticEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn emit(&self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::Initialized => info!("Controller initialized, encoders reset"),
            DiagnosticEvent::AlignmentStep { from, to } => {
                debug!(?from, ?to, "Alignment step");
            }
            DiagnosticEvent::AlignmentCompleted { mode } => {
                info!(%mode, "Alignment completed, line trace armed");
            }
            DiagnosticEvent::MarkerDetected { count } => info!(count, "Blue marker detected"),
            DiagnosticEvent::SlowModeEngaged { speed } => info!(speed, "Slow mode engaged"),
            DiagnosticEvent::ManeuverStarted { count, steps } => {
                info!(count, steps, "Maneuver started");
            }
            DiagnosticEvent::ManeuverFinished { count, halted } => {
                if halted {
                    info!(count, "Maneuver finished, holding complete stop");
                } else {
                    info!(count, "Maneuver finished, line trace resumed");
                }
            }
            DiagnosticEvent::MoveFinished {
                direction,
                distance_cm,
                polls,
                reached,
            } => {
                if reached {
                    debug!(%direction, distance_cm, polls, "Move finished");
                } else {
                    warn!(%direction, distance_cm, polls, "Move timed out short of target");
                }
            }
            DiagnosticEvent::CreepFinished { polls, found } => {
                if found {
                    debug!(polls, "Black detected");
                } else {
                    warn!(polls, "Creep timed out without black");
                }
            }
            DiagnosticEvent::CompleteStop => info!("Complete stop latched"),
            DiagnosticEvent::SensorFault { error } => warn!(%error, "Sensor read failed"),
        }
    }
}

/// Stores events for later inspection. Clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<DiagnosticEvent>>>,
}

impl RecordingSink {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().clone()
    }

    /// Drain the buffer.
    pub fn take(&self) -> Vec<DiagnosticEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Count events matching `pred`.
    pub fn count(&self, pred: impl Fn(&DiagnosticEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }
}

impl DiagnosticsSink for RecordingSink {
    fn emit(&self, event: DiagnosticEvent) {
        self.events.lock().push(event);
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn emit(&self, _event: DiagnosticEvent) {}
}
