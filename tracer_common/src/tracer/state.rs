//! State enums reported by the controller.
//!
//! Owned by the control unit's state machines; shared here so diagnostics
//! consumers and drivers can name them without depending on the core.

/// Startup alignment steps, in execution order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AlignmentStep {
    /// Optional PD line-trace lead-in.
    #[default]
    TraceTimed,
    /// Timed straight run at base speed.
    ForwardTimed,
    /// Standstill before the right curve.
    Settle1,
    /// Scripted right curve.
    CurveRight,
    /// Scripted straight segment.
    Straight,
    /// Standstill before the left curve.
    Settle2,
    /// Scripted left curve.
    CurveLeft,
    /// Creep at slow speed until black is seen.
    AwaitBlack,
    /// Terminal.
    Done,
}

impl AlignmentStep {
    /// Successor in the linear sequence. `Done` is absorbing.
    pub const fn next(self) -> Self {
        match self {
            Self::TraceTimed => Self::ForwardTimed,
            Self::ForwardTimed => Self::Settle1,
            Self::Settle1 => Self::CurveRight,
            Self::CurveRight => Self::Straight,
            Self::Straight => Self::Settle2,
            Self::Settle2 => Self::CurveLeft,
            Self::CurveLeft => Self::AwaitBlack,
            Self::AwaitBlack | Self::Done => Self::Done,
        }
    }
}

/// Blue-marker handling phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MarkerPhase {
    /// Detection armed.
    #[default]
    Idle,
    /// Maneuver in progress; detection and line tracing disabled.
    Handling,
    /// A maneuver latched the permanent stop.
    Halted,
}
