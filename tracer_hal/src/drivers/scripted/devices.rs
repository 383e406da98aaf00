//! Bench devices driven by a script and observed through handles.
//!
//! Wheels advance their encoder on every `count()` call in proportion to the
//! commanded power, so a blocking move converges after a predictable number
//! of polls. The color sensor replays a queue of frames.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracer_common::hal::driver::{ColorSensor, ForceSensor, HalError, WheelMotor};
use tracer_common::hal::types::{Reading, Rgb};

/// Most recent power commands kept per wheel; older entries are dropped.
pub const HISTORY_LIMIT: usize = 4096;

#[derive(Debug)]
struct WheelChannel {
    power: i32,
    count: f64,
    ratio: f64,
    stalled: bool,
    history: VecDeque<i32>,
    stops: u32,
}

impl WheelChannel {
    fn record(&mut self, power: i32) {
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(power);
    }
}

/// Scripted drive wheel.
pub struct ScriptedWheel {
    channel: Arc<Mutex<WheelChannel>>,
}

/// Observer and fault injector for a [`ScriptedWheel`].
#[derive(Clone)]
pub struct WheelHandle {
    channel: Arc<Mutex<WheelChannel>>,
}

impl ScriptedWheel {
    /// Wheel advancing `ratio` degrees per poll per unit of power.
    pub fn new(ratio: f64) -> (Self, WheelHandle) {
        let channel = Arc::new(Mutex::new(WheelChannel {
            power: 0,
            count: 0.0,
            ratio,
            stalled: false,
            history: VecDeque::new(),
            stops: 0,
        }));
        (
            Self {
                channel: channel.clone(),
            },
            WheelHandle { channel },
        )
    }
}

impl WheelMotor for ScriptedWheel {
    fn set_power(&mut self, power: i32) {
        let mut ch = self.channel.lock();
        ch.power = power;
        ch.record(power);
    }

    fn stop(&mut self) {
        let mut ch = self.channel.lock();
        ch.power = 0;
        ch.record(0);
        ch.stops += 1;
    }

    fn count(&mut self) -> i32 {
        let mut ch = self.channel.lock();
        if !ch.stalled {
            ch.count += f64::from(ch.power) * ch.ratio;
        }
        ch.count as i32
    }

    fn reset_count(&mut self) {
        self.channel.lock().count = 0.0;
    }
}

impl WheelHandle {
    /// Last commanded power.
    pub fn power(&self) -> i32 {
        self.channel.lock().power
    }

    /// Encoder value without advancing it.
    pub fn count(&self) -> i32 {
        self.channel.lock().count as i32
    }

    /// Powers commanded so far, including stops as `0`, oldest first.
    ///
    /// Holds at most [`HISTORY_LIMIT`] entries.
    pub fn history(&self) -> Vec<i32> {
        self.channel.lock().history.iter().copied().collect()
    }

    /// Number of `stop()` calls.
    pub fn stop_count(&self) -> u32 {
        self.channel.lock().stops
    }

    /// Freeze or release the encoder.
    pub fn stall(&self, stalled: bool) {
        self.channel.lock().stalled = stalled;
    }

    /// Overwrite the encoder value.
    pub fn set_count(&self, count: i32) {
        self.channel.lock().count = f64::from(count);
    }

    /// Forget recorded powers and stops.
    pub fn clear_history(&self) {
        let mut ch = self.channel.lock();
        ch.history.clear();
        ch.stops = 0;
    }
}

/// One scripted sensor sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Deliver this reading.
    Reading(Reading),
    /// Fail the read.
    Fault,
}

#[derive(Debug)]
struct SensorScript {
    queue: VecDeque<Frame>,
    current: Frame,
    reads: u32,
}

/// Color sensor replaying queued frames.
///
/// `reflectance()` advances to the next frame; when the queue runs dry the
/// last frame repeats. `rgb()` reports the frame most recently advanced to.
pub struct ScriptedColorSensor {
    script: Arc<Mutex<SensorScript>>,
}

/// Feeds frames into a [`ScriptedColorSensor`].
#[derive(Clone)]
pub struct SensorHandle {
    script: Arc<Mutex<SensorScript>>,
}

impl ScriptedColorSensor {
    /// Sensor that repeats `initial` until frames are queued.
    pub fn new(initial: Reading) -> (Self, SensorHandle) {
        let script = Arc::new(Mutex::new(SensorScript {
            queue: VecDeque::new(),
            current: Frame::Reading(initial),
            reads: 0,
        }));
        (
            Self {
                script: script.clone(),
            },
            SensorHandle { script },
        )
    }
}

fn fault() -> HalError {
    HalError::SensorRead("scripted fault".to_string())
}

impl ColorSensor for ScriptedColorSensor {
    fn reflectance(&mut self) -> Result<i32, HalError> {
        let mut s = self.script.lock();
        if let Some(next) = s.queue.pop_front() {
            s.current = next;
        }
        s.reads += 1;
        match s.current {
            Frame::Reading(r) => Ok(r.reflectance),
            Frame::Fault => Err(fault()),
        }
    }

    fn rgb(&mut self) -> Result<Rgb, HalError> {
        match self.script.lock().current {
            Frame::Reading(r) => Ok(r.rgb),
            Frame::Fault => Err(fault()),
        }
    }
}

impl SensorHandle {
    /// Queue one reading.
    pub fn push(&self, reading: Reading) {
        self.script.lock().queue.push_back(Frame::Reading(reading));
    }

    /// Queue several readings in order.
    pub fn push_all(&self, readings: impl IntoIterator<Item = Reading>) {
        let mut s = self.script.lock();
        s.queue.extend(readings.into_iter().map(Frame::Reading));
    }

    /// Queue a failing read.
    pub fn push_fault(&self) {
        self.script.lock().queue.push_back(Frame::Fault);
    }

    /// Frames not yet consumed.
    pub fn pending(&self) -> usize {
        self.script.lock().queue.len()
    }

    /// Number of reflectance reads so far.
    pub fn reads(&self) -> u32 {
        self.script.lock().reads
    }
}

/// Start button backed by a flag.
pub struct ScriptedForceSensor {
    pressed: Arc<AtomicBool>,
}

/// Presses and releases a [`ScriptedForceSensor`].
#[derive(Clone)]
pub struct ButtonHandle {
    pressed: Arc<AtomicBool>,
}

impl ScriptedForceSensor {
    /// Button in the given initial state.
    pub fn new(pressed: bool) -> (Self, ButtonHandle) {
        let pressed = Arc::new(AtomicBool::new(pressed));
        (
            Self {
                pressed: pressed.clone(),
            },
            ButtonHandle { pressed },
        )
    }
}

impl ForceSensor for ScriptedForceSensor {
    fn is_touched(&mut self) -> bool {
        self.pressed.load(Ordering::Acquire)
    }
}

impl ButtonHandle {
    /// Press or release.
    pub fn set(&self, pressed: bool) {
        self.pressed.store(pressed, Ordering::Release);
    }
}
