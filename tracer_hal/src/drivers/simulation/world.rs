//! Kinematic model of the robot on a virtual track.
//!
//! The track is a straight line edge. The robot's lateral offset from the
//! edge maps linearly to reflectance, so the PD loop sees a plant it can
//! regulate. Blue markers and black landmarks are spans of travelled
//! distance along the path.

use std::f64::consts::PI;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracer_common::consts::{REFLECTANCE_MAX, TARGET_REFLECTANCE, WHEEL_DIAMETER_CM};
use tracer_common::hal::types::{Reading, Rgb, Side};

/// Wheel angular rate per unit of commanded power [deg/s].
pub const DEG_PER_SEC_PER_POWER: f64 = 10.0;

/// Distance between wheel contact points [cm].
pub const AXLE_WIDTH_CM: f64 = 12.0;

/// Reflectance seen over a black landmark.
pub const LANDMARK_REFLECTANCE: i32 = 5;

/// Color reported over a blue marker.
pub const MARKER_RGB: Rgb = Rgb::new(10, 10, 200);

/// World handle shared by every simulated device.
pub type SharedWorld = Arc<Mutex<World>>;

/// Interval of travelled distance [cm].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    /// Inclusive start [cm]
    pub start_cm: f64,
    /// Exclusive end [cm]
    pub end_cm: f64,
}

impl Span {
    /// Span of `width_cm` starting at `start_cm`.
    pub const fn at(start_cm: f64, width_cm: f64) -> Self {
        Self {
            start_cm,
            end_cm: start_cm + width_cm,
        }
    }

    /// Whether `x` falls inside the span.
    pub fn contains(&self, x: f64) -> bool {
        x >= self.start_cm && x < self.end_cm
    }
}

/// Track layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Reflectance change per cm of lateral offset.
    pub edge_gain: f64,
    /// Blue marker spans.
    pub markers: Vec<Span>,
    /// Black landmark spans.
    pub landmarks: Vec<Span>,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            edge_gain: 8.0,
            markers: [250.0, 500.0, 750.0, 1000.0, 1250.0, 1500.0]
                .into_iter()
                .map(|x| Span::at(x, 4.0))
                .collect(),
            landmarks: vec![Span::at(90.0, 5.0), Span::at(1030.0, 5.0)],
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Clock {
    Realtime(Instant),
    Manual,
}

#[derive(Debug, Clone, Copy, Default)]
struct Wheel {
    power: i32,
    degrees: f64,
}

/// Simulated robot pose plus wheel state.
#[derive(Debug, Clone)]
pub struct World {
    track: Track,
    wheel_circumference_cm: f64,
    left: Wheel,
    right: Wheel,
    heading: f64,
    lateral_cm: f64,
    travelled_cm: f64,
    elapsed: Duration,
    clock: Clock,
}

impl World {
    /// World that advances with wall-clock time on every device access.
    pub fn realtime(track: Track, wheel_diameter_cm: f64) -> Self {
        Self::with_clock(track, wheel_diameter_cm, Clock::Realtime(Instant::now()))
    }

    /// World that only advances through [`World::step`].
    pub fn manual(track: Track, wheel_diameter_cm: f64) -> Self {
        Self::with_clock(track, wheel_diameter_cm, Clock::Manual)
    }

    fn with_clock(track: Track, wheel_diameter_cm: f64, clock: Clock) -> Self {
        let diameter = if wheel_diameter_cm > 0.0 {
            wheel_diameter_cm
        } else {
            WHEEL_DIAMETER_CM
        };
        Self {
            track,
            wheel_circumference_cm: PI * diameter,
            left: Wheel::default(),
            right: Wheel::default(),
            heading: 0.0,
            lateral_cm: 0.0,
            travelled_cm: 0.0,
            elapsed: Duration::ZERO,
            clock,
        }
    }

    /// Wrap for sharing between devices.
    pub fn shared(self) -> SharedWorld {
        Arc::new(Mutex::new(self))
    }

    /// Catch up to `now` in realtime mode. No-op in manual mode.
    pub fn sync(&mut self, now: Instant) {
        if let Clock::Realtime(last) = self.clock {
            let dt = now.saturating_duration_since(last);
            self.clock = Clock::Realtime(now);
            self.step(dt);
        }
    }

    /// Integrate the differential-drive kinematics over `dt`.
    pub fn step(&mut self, dt: Duration) {
        let secs = dt.as_secs_f64();
        let dl_deg = f64::from(self.left.power) * DEG_PER_SEC_PER_POWER * secs;
        let dr_deg = f64::from(self.right.power) * DEG_PER_SEC_PER_POWER * secs;
        self.left.degrees += dl_deg;
        self.right.degrees += dr_deg;

        let dl = dl_deg / 360.0 * self.wheel_circumference_cm;
        let dr = dr_deg / 360.0 * self.wheel_circumference_cm;
        let ds = (dl + dr) / 2.0;

        self.heading += (dr - dl) / AXLE_WIDTH_CM;
        self.lateral_cm -= ds * self.heading.sin();
        self.travelled_cm += ds;
        self.elapsed += dt;
    }

    /// Command a wheel. Power is clamped to ±100.
    pub fn set_power(&mut self, side: Side, power: i32) {
        self.wheel_mut(side).power = power.clamp(-100, 100);
    }

    /// Commanded power of a wheel.
    pub fn power(&self, side: Side) -> i32 {
        self.wheel(side).power
    }

    /// Encoder count, truncated to whole degrees.
    pub fn count(&self, side: Side) -> i32 {
        self.wheel(side).degrees as i32
    }

    /// Zero a wheel's encoder.
    pub fn reset_count(&mut self, side: Side) {
        self.wheel_mut(side).degrees = 0.0;
    }

    /// Sensor sample at the current pose.
    pub fn reading(&self) -> Reading {
        let x = self.travelled_cm;
        if self.track.landmarks.iter().any(|s| s.contains(x)) {
            return Reading::new(LANDMARK_REFLECTANCE, Rgb::gray(10));
        }
        let raw = f64::from(TARGET_REFLECTANCE) + self.track.edge_gain * self.lateral_cm;
        let reflectance = (raw.round() as i32).clamp(0, REFLECTANCE_MAX);
        if self.track.markers.iter().any(|s| s.contains(x)) {
            return Reading::new(reflectance, MARKER_RGB);
        }
        Reading::new(reflectance, Rgb::gray((reflectance * 2) as u16))
    }

    /// Distance covered along the path [cm].
    pub fn travelled_cm(&self) -> f64 {
        self.travelled_cm
    }

    /// Signed offset from the edge [cm].
    pub fn lateral_cm(&self) -> f64 {
        self.lateral_cm
    }

    /// Heading relative to the edge [rad].
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Simulated time since creation.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Place the robot at a lateral offset, e.g. to test recovery.
    pub fn set_lateral_cm(&mut self, lateral_cm: f64) {
        self.lateral_cm = lateral_cm;
    }

    fn wheel(&self, side: Side) -> &Wheel {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn wheel_mut(&mut self, side: Side) -> &mut Wheel {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: Duration = Duration::from_millis(10);

    fn world() -> World {
        World::manual(Track::default(), WHEEL_DIAMETER_CM)
    }

    #[test]
    fn span_is_half_open() {
        let s = Span::at(10.0, 2.0);
        assert!(s.contains(10.0));
        assert!(s.contains(11.9));
        assert!(!s.contains(12.0));
    }

    #[test]
    fn encoder_integrates_power() {
        let mut w = world();
        w.set_power(Side::Left, 50);
        w.set_power(Side::Right, 50);
        for _ in 0..100 {
            w.step(DT);
        }
        // 1 s at 500 deg/s
        assert!((w.count(Side::Left) - 500).abs() <= 1);
        assert!((w.count(Side::Right) - 500).abs() <= 1);
        assert!(w.heading().abs() < 1e-12);
        assert!(w.lateral_cm().abs() < 1e-9);
    }

    #[test]
    fn power_is_clamped() {
        let mut w = world();
        w.set_power(Side::Left, 250);
        w.set_power(Side::Right, -300);
        assert_eq!(w.power(Side::Left), 100);
        assert_eq!(w.power(Side::Right), -100);
    }

    #[test]
    fn turning_left_lowers_reflectance() {
        let mut w = world();
        w.set_power(Side::Left, 30);
        w.set_power(Side::Right, 60);
        for _ in 0..20 {
            w.step(DT);
        }
        assert!(w.heading() > 0.0);
        assert!(w.reading().reflectance < TARGET_REFLECTANCE);
    }

    #[test]
    fn reset_zeroes_one_wheel() {
        let mut w = world();
        w.set_power(Side::Left, 40);
        w.set_power(Side::Right, 40);
        w.step(Duration::from_millis(500));
        w.reset_count(Side::Left);
        assert_eq!(w.count(Side::Left), 0);
        assert!(w.count(Side::Right) > 0);
    }

    #[test]
    fn markers_and_landmarks_along_path() {
        let track = Track {
            edge_gain: 8.0,
            markers: vec![Span::at(1.0, 1.0)],
            landmarks: vec![Span::at(3.0, 1.0)],
        };
        let mut w = World::manual(track, WHEEL_DIAMETER_CM);
        assert_eq!(w.reading().rgb, Rgb::gray(50));

        w.set_power(Side::Left, 20);
        w.set_power(Side::Right, 20);
        while w.travelled_cm() < 1.5 {
            w.step(DT);
        }
        assert_eq!(w.reading().rgb, MARKER_RGB);

        while w.travelled_cm() < 3.5 {
            w.step(DT);
        }
        assert_eq!(w.reading().reflectance, LANDMARK_REFLECTANCE);
    }

    #[test]
    fn reflectance_clamps_to_sensor_range() {
        let mut w = world();
        w.set_lateral_cm(100.0);
        assert_eq!(w.reading().reflectance, REFLECTANCE_MAX);
        w.set_lateral_cm(-100.0);
        assert_eq!(w.reading().reflectance, 0);
    }

    #[test]
    fn manual_world_ignores_sync() {
        let mut w = world();
        w.set_power(Side::Left, 100);
        w.sync(Instant::now() + Duration::from_secs(5));
        assert_eq!(w.count(Side::Left), 0);
        assert_eq!(w.elapsed(), Duration::ZERO);
    }
}
