//! Distance-targeted scripted move and the creep-to-black primitive.
//!
//! A move converts a distance into wheel degrees, stretches the outer
//! wheel's target and slows the inner wheel for curves, then polls the
//! encoders until the average progress reaches the average target or the
//! poll budget runs out. Both wheels are stopped on every exit path.

use std::f64::consts::PI;
use std::time::Duration;

use tracer_common::hal::driver::{ColorSensor, HalDevices, WheelMotor};
use tracer_common::tracer::config::DriveConfig;
use tracer_common::tracer::maneuver::{MoveCommand, TurnDirection};

use crate::diagnostics::{DiagnosticEvent, DiagnosticsSink};

/// Poll budget for a blocking primitive.
///
/// A stalled wheel can never hold the controller longer than
/// `max_polls × poll_interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveDeadline {
    /// Maximum encoder polls before giving up.
    pub max_polls: u32,
    /// Sleep between polls. Zero spins.
    pub poll_interval: Duration,
}

impl From<&DriveConfig> for MoveDeadline {
    fn from(cfg: &DriveConfig) -> Self {
        Self {
            max_polls: cfg.max_polls,
            poll_interval: Duration::from_micros(cfg.poll_interval_us),
        }
    }
}

/// Start and target encoder count of one wheel.
///
/// `target ≥ start`: scripted moves only drive forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WheelTarget {
    /// Count when the move began.
    pub start: i64,
    /// Count at which this wheel has covered its share.
    pub target: i64,
}

/// Degrees and power for each wheel, before any device is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePlan {
    /// Left wheel rotation [deg].
    pub left_degrees: i64,
    /// Right wheel rotation [deg].
    pub right_degrees: i64,
    /// Left wheel power.
    pub left_power: i32,
    /// Right wheel power.
    pub right_power: i32,
}

impl MovePlan {
    /// Plan `cmd` at `base_speed` for the configured wheel geometry.
    pub fn new(cmd: &MoveCommand, base_speed: i32, drive: &DriveConfig) -> Self {
        let circumference = PI * drive.wheel_diameter_cm;
        let base_degrees = (cmd.distance_cm / circumference * 360.0) as i64;

        let outer_degrees = (base_degrees as f64 * (1.0 + drive.outer_gain * cmd.intensity)) as i64;
        let reduction = (drive.inner_reduction_base
            + drive.inner_reduction_per_intensity * cmd.intensity)
            .min(drive.inner_reduction_max);
        let inner_power =
            ((f64::from(base_speed) * (1.0 - reduction)) as i32).max(drive.inner_min_power);

        match cmd.direction {
            TurnDirection::Straight => Self {
                left_degrees: base_degrees,
                right_degrees: base_degrees,
                left_power: base_speed,
                right_power: base_speed,
            },
            TurnDirection::Left => Self {
                left_degrees: base_degrees,
                right_degrees: outer_degrees,
                left_power: inner_power,
                right_power: base_speed,
            },
            TurnDirection::Right => Self {
                left_degrees: outer_degrees,
                right_degrees: base_degrees,
                left_power: base_speed,
                right_power: inner_power,
            },
        }
    }
}

/// How a blocking primitive ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Goal reached before the deadline.
    pub reached: bool,
    /// Polls spent.
    pub polls: u32,
    /// Average encoder count at exit.
    pub average_count: i64,
    /// Average target count.
    pub average_target: i64,
}

impl MoveOutcome {
    /// Deadline expired before the goal was reached.
    pub fn timed_out(&self) -> bool {
        !self.reached
    }
}

/// The two drive wheels, borrowed for one primitive.
pub struct Drivetrain<'a> {
    /// Left wheel.
    pub left: &'a mut dyn WheelMotor,
    /// Right wheel.
    pub right: &'a mut dyn WheelMotor,
}

impl<'a> Drivetrain<'a> {
    /// Borrow the wheels of a device bundle.
    pub fn of(devices: &'a mut HalDevices) -> Self {
        Self {
            left: devices.left.as_mut(),
            right: devices.right.as_mut(),
        }
    }

    /// Command both wheels.
    pub fn set_powers(&mut self, left: i32, right: i32) {
        self.left.set_power(left);
        self.right.set_power(right);
    }

    /// Stop both wheels.
    pub fn stop(&mut self) {
        self.left.stop();
        self.right.stop();
    }

    fn counts(&mut self) -> (i64, i64) {
        (i64::from(self.left.count()), i64::from(self.right.count()))
    }
}

/// Drive `cmd` and block until the average wheel progress reaches the
/// average target, or the deadline expires. Both wheels end stopped.
///
/// A timeout is not an error: the robot stops short and the caller goes on.
pub fn move_blocking(
    wheels: &mut Drivetrain<'_>,
    cmd: &MoveCommand,
    base_speed: i32,
    drive: &DriveConfig,
    deadline: &MoveDeadline,
) -> MoveOutcome {
    let plan = MovePlan::new(cmd, base_speed, drive);
    let (left_start, right_start) = wheels.counts();
    let left = WheelTarget {
        start: left_start,
        target: left_start + plan.left_degrees,
    };
    let right = WheelTarget {
        start: right_start,
        target: right_start + plan.right_degrees,
    };
    let average_target = (left.target + right.target) / 2;

    wheels.set_powers(plan.left_power, plan.right_power);

    let mut polls = 0;
    let mut average_count;
    let reached = loop {
        let (l, r) = wheels.counts();
        average_count = (l + r) / 2;
        if average_count >= average_target {
            break true;
        }
        polls += 1;
        if polls >= deadline.max_polls {
            break false;
        }
        if !deadline.poll_interval.is_zero() {
            std::thread::sleep(deadline.poll_interval);
        }
    };

    wheels.stop();
    MoveOutcome {
        reached,
        polls,
        average_count,
        average_target,
    }
}

/// Drive both wheels at `speed` until reflectance drops below
/// `black_threshold`, or the deadline expires. Both wheels end stopped.
///
/// Failed sensor reads count as "not black".
pub fn creep_until_black(
    wheels: &mut Drivetrain<'_>,
    sensor: &mut dyn ColorSensor,
    speed: i32,
    black_threshold: i32,
    deadline: &MoveDeadline,
) -> MoveOutcome {
    let mut polls = 0;
    let reached = loop {
        if sensor.reflectance().is_ok_and(|r| r < black_threshold) {
            break true;
        }
        polls += 1;
        if polls >= deadline.max_polls {
            break false;
        }
        wheels.set_powers(speed, speed);
        if !deadline.poll_interval.is_zero() {
            std::thread::sleep(deadline.poll_interval);
        }
    };

    wheels.stop();
    MoveOutcome {
        reached,
        polls,
        average_count: 0,
        average_target: 0,
    }
}

/// [`move_blocking`] on a device bundle, reported to `sink`.
pub fn run_move(
    devices: &mut HalDevices,
    cmd: &MoveCommand,
    base_speed: i32,
    drive: &DriveConfig,
    sink: &dyn DiagnosticsSink,
) -> MoveOutcome {
    let outcome = move_blocking(
        &mut Drivetrain::of(devices),
        cmd,
        base_speed,
        drive,
        &MoveDeadline::from(drive),
    );
    sink.emit(DiagnosticEvent::MoveFinished {
        direction: cmd.direction,
        distance_cm: cmd.distance_cm,
        polls: outcome.polls,
        reached: outcome.reached,
    });
    outcome
}

/// [`creep_until_black`] on a device bundle, reported to `sink`.
pub fn run_creep(
    devices: &mut HalDevices,
    speed: i32,
    black_threshold: i32,
    drive: &DriveConfig,
    sink: &dyn DiagnosticsSink,
) -> MoveOutcome {
    let mut wheels = Drivetrain {
        left: devices.left.as_mut(),
        right: devices.right.as_mut(),
    };
    let outcome = creep_until_black(
        &mut wheels,
        devices.color.as_mut(),
        speed,
        black_threshold,
        &MoveDeadline::from(drive),
    );
    sink.emit(DiagnosticEvent::CreepFinished {
        polls: outcome.polls,
        found: outcome.reached,
    });
    outcome
}

// ─── Tests ──────────────────────────────────────────────────────────
