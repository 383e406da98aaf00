//! Curvature-adaptive forward speed and wheel power split.
//!
//! Bands are evaluated top-down on `|turn|`; the first match wins:
//!
//! | `|turn|`      | speed                 |
//! |---------------|-----------------------|
//! | > 25          | minimum speed         |
//! | (15, 25]      | 50 % of base speed    |
//! | (8, 15]       | 70 % of base speed    |
//! | ≤ 8           | base speed            |
//!
//! Percentages use integer division, truncating toward zero. There is no
//! hysteresis between bands.

/// Above this `|turn|` the minimum speed applies.
pub const SHARP_TURN: f64 = 25.0;
/// Above this `|turn|` half the base speed applies.
pub const MEDIUM_TURN: f64 = 15.0;
/// Above this `|turn|` 70 % of the base speed applies.
pub const GENTLE_TURN: f64 = 8.0;

/// Forward speed for a steering correction.
#[inline]
pub fn adaptive_speed(turn: f64, base_speed: i32, min_speed: i32) -> i32 {
    let magnitude = turn.abs();
    if magnitude > SHARP_TURN {
        min_speed
    } else if magnitude > MEDIUM_TURN {
        base_speed * 50 / 100
    } else if magnitude > GENTLE_TURN {
        base_speed * 70 / 100
    } else {
        base_speed
    }
}

/// Signed power command for both wheels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WheelPowers {
    /// Left wheel duty.
    pub left: i32,
    /// Right wheel duty.
    pub right: i32,
}

impl WheelPowers {
    /// Same power on both wheels.
    pub const fn even(power: i32) -> Self {
        Self {
            left: power,
            right: power,
        }
    }
}

/// Split speed and correction: `left = speed − turn`, `right = speed + turn`.
///
/// Fractions truncate toward zero. Results may exceed the device range.
#[inline]
pub fn wheel_powers(speed: i32, turn: f64) -> WheelPowers {
    let speed = f64::from(speed);
    WheelPowers {
        left: (speed - turn) as i32,
        right: (speed + turn) as i32,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
