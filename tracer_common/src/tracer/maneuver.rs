//! Scripted motion commands and the marker maneuver table.
//!
//! A maneuver is a short ordered list of steps run when a blue marker is
//! detected. The table is keyed by the 1-based detection count; counts past
//! the end of the table use the fallback entry.

use heapless::Vec as FixedVec;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_MANEUVER_STEPS;

/// Curve direction of a scripted move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnDirection {
    /// Both wheels travel the same distance at the same power.
    #[default]
    Straight,
    /// Right wheel is the outer wheel.
    Left,
    /// Left wheel is the outer wheel.
    Right,
}

impl std::fmt::Display for TurnDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Straight => "STRAIGHT",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        };
        f.write_str(s)
    }
}

/// Declarative description of one scripted motion.
///
/// Consumed immediately by the scripted move primitive, never retained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveCommand {
    /// Travel distance [cm].
    pub distance_cm: f64,
    /// Curve direction.
    #[serde(default)]
    pub direction: TurnDirection,
    /// Curve sharpness (≥ 0). Ignored for `Straight`.
    #[serde(default)]
    pub intensity: f64,
}

impl MoveCommand {
    /// Straight move.
    pub const fn straight(distance_cm: f64) -> Self {
        Self {
            distance_cm,
            direction: TurnDirection::Straight,
            intensity: 0.0,
        }
    }

    /// Curve to the left.
    pub const fn left(distance_cm: f64, intensity: f64) -> Self {
        Self {
            distance_cm,
            direction: TurnDirection::Left,
            intensity,
        }
    }

    /// Curve to the right.
    pub const fn right(distance_cm: f64, intensity: f64) -> Self {
        Self {
            distance_cm,
            direction: TurnDirection::Right,
            intensity,
        }
    }
}

/// One step of a marker maneuver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ManeuverStep {
    /// Blocking scripted move.
    Move(MoveCommand),
    /// Latch the permanent stop flag and stop both wheels.
    ///
    /// Later steps of the same maneuver still run.
    CompleteStop,
    /// Drive at slow speed until the black landmark is seen.
    CreepUntilBlack,
}

/// Ordered step list for one marker occurrence.
///
/// An empty maneuver ignores the marker and resumes line tracing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Maneuver {
    /// Steps, executed in order.
    #[serde(default)]
    pub steps: FixedVec<ManeuverStep, MAX_MANEUVER_STEPS>,
}

/// Step list longer than [`MAX_MANEUVER_STEPS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooManySteps;

impl std::fmt::Display for TooManySteps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "maneuver exceeds {MAX_MANEUVER_STEPS} steps")
    }
}

impl std::error::Error for TooManySteps {}

impl Maneuver {
    /// Maneuver with no steps.
    pub const fn empty() -> Self {
        Self {
            steps: FixedVec::new(),
        }
    }

    /// Build from a step slice.
    pub fn from_steps(steps: &[ManeuverStep]) -> Result<Self, TooManySteps> {
        let steps = FixedVec::from_slice(steps).map_err(|_| TooManySteps)?;
        Ok(Self { steps })
    }

    /// Whether any step latches the permanent stop.
    pub fn stops_permanently(&self) -> bool {
        self.steps
            .iter()
            .any(|s| matches!(s, ManeuverStep::CompleteStop))
    }

    /// Whether the maneuver has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

/// Marker maneuvers keyed by 1-based detection count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManeuverTable {
    /// Entry `i` runs on detection `i + 1`.
    pub occurrence: Vec<Maneuver>,
    /// Runs for every detection past the table's end.
    pub fallback: Maneuver,
}

impl ManeuverTable {
    /// Maneuver registered for the given detection count.
    ///
    /// A count of zero, or one past the table, resolves to the fallback.
    pub fn lookup(&self, count: u32) -> &Maneuver {
        count
            .checked_sub(1)
            .and_then(|i| self.occurrence.get(i as usize))
            .unwrap_or(&self.fallback)
    }

    /// Every maneuver in the table, fallback last.
    pub fn iter(&self) -> impl Iterator<Item = &Maneuver> {
        self.occurrence.iter().chain(std::iter::once(&self.fallback))
    }
}

fn maneuver(steps: &[ManeuverStep]) -> Maneuver {
    Maneuver {
        steps: steps.iter().copied().take(MAX_MANEUVER_STEPS).collect(),
    }
}

impl Default for ManeuverTable {
    fn default() -> Self {
        use ManeuverStep::{CompleteStop, CreepUntilBlack, Move};

        Self {
            occurrence: vec![
                maneuver(&[
                    Move(MoveCommand::straight(20.0)),
                    Move(MoveCommand::right(3.0, 6.0)),
                    Move(MoveCommand::straight(14.0)),
                ]),
                maneuver(&[
                    Move(MoveCommand::right(15.0, 2.0)),
                    Move(MoveCommand::left(12.0, 2.8)),
                ]),
                maneuver(&[
                    Move(MoveCommand::left(8.0, 2.0)),
                    Move(MoveCommand::right(9.0, 2.2)),
                ]),
                maneuver(&[
                    Move(MoveCommand::right(2.0, 1.3)),
                    Move(MoveCommand::left(1.0, 0.5)),
                    Move(MoveCommand::right(15.0, 1.5)),
                    CreepUntilBlack,
                ]),
                Maneuver::empty(),
            ],
            fallback: maneuver(&[CompleteStop]),
        }
    }
}
