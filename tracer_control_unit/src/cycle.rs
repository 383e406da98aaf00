//! Periodic cycle runner: tick → measure → sleep.
//!
//! Calls [`Tracer::tick`] once per configured period, records timing in
//! [`CycleStats`] and sleeps for the remainder. A tick that runs a blocking
//! scripted move overruns its period; overruns are counted, never fatal.
//!
//! ## RT Setup Sequence
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)`: lock all pages.
//! 2. Prefault stack pages.
//! 3. `sched_setaffinity`: pin to one CPU core.
//! 4. `sched_setscheduler(SCHED_FIFO, prio)`: RT priority.
//!
//! Without the `rt` feature every step except the prefault is a no-op.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, trace};

use crate::tick::{TickOutcome, Tracer};

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration [ns].
    pub last_cycle_ns: i64,
    /// Minimum cycle duration [ns].
    pub min_cycle_ns: i64,
    /// Maximum cycle duration [ns].
    pub max_cycle_ns: i64,
    /// Running sum for average computation.
    pub sum_cycle_ns: i64,
    /// Cycles that exceeded the period.
    pub overruns: u64,
    /// Maximum wake-up latency [ns] (time between expected and actual wake).
    pub max_latency_ns: i64,
}

impl CycleStats {
    /// Create a new zeroed stats instance.
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
            max_latency_ns: 0,
        }
    }

    /// Record a cycle duration against its budget.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, latency_ns: i64, budget_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns = self.sum_cycle_ns.saturating_add(duration_ns);
        self.max_latency_ns = self.max_latency_ns.max(latency_ns);
        if duration_ns > budget_ns {
            self.overruns += 1;
        }
    }

    /// Average cycle time [ns] (returns 0 if no cycles).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

/// Cycle runner error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CycleError {
    /// RT system call failed.
    #[error("RT setup error: {0}")]
    RtSetup(String),
    /// Cycle period of zero.
    #[error("cycle period must be positive")]
    ZeroPeriod,
}

// ─── RT Setup ───────────────────────────────────────────────────────

/// Lock all current and future memory pages.
#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), CycleError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| CycleError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), CycleError> {
    Ok(())
}

/// Touch 256 KiB of stack so the loop does not fault pages in.
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, exclusive reference into `buf`.
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

/// Pin the current thread to a specific CPU core.
#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), CycleError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| CycleError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| CycleError::RtSetup(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), CycleError> {
    Ok(())
}

/// Set SCHED_FIFO with the given RT priority.
#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), CycleError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` outlives the call; pid 0 is the calling thread.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(CycleError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), CycleError> {
    Ok(())
}

/// Perform the full RT setup sequence. Call before [`CycleRunner::run`].
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    Ok(())
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// Periodic scheduler around one [`Tracer`].
pub struct CycleRunner {
    tracer: Tracer,
    running: Arc<AtomicBool>,
    period: Duration,
    max_cycles: Option<u64>,
    stats: CycleStats,
}

impl CycleRunner {
    /// Runner ticking `tracer` every `cycle_time_ms` until `running` clears.
    pub fn new(tracer: Tracer, running: Arc<AtomicBool>) -> Self {
        let period = Duration::from_millis(u64::from(tracer.config().cycle_time_ms));
        Self {
            tracer,
            running,
            period,
            max_cycles: None,
            stats: CycleStats::new(),
        }
    }

    /// Stop after `limit` cycles.
    pub fn with_max_cycles(mut self, limit: Option<u64>) -> Self {
        self.max_cycles = limit;
        self
    }

    /// Override the period from the configuration.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Tick until stopped, then stop both wheels.
    pub fn run(&mut self) -> Result<&CycleStats, CycleError> {
        if self.period.is_zero() {
            return Err(CycleError::ZeroPeriod);
        }
        let budget_ns = self.period.as_nanos() as i64;
        let mut next_wake = Instant::now();

        info!(period_ms = self.period.as_millis() as u64, "Entering cycle loop");

        while self.running.load(Ordering::SeqCst) {
            if self.max_cycles.is_some_and(|n| self.stats.cycle_count >= n) {
                debug!(cycles = self.stats.cycle_count, "Cycle limit reached");
                break;
            }

            let cycle_start = Instant::now();
            let latency_ns = cycle_start.saturating_duration_since(next_wake).as_nanos() as i64;

            let outcome = self.tracer.tick();
            if !matches!(outcome, TickOutcome::Traced(_)) {
                trace!(?outcome, "Tick");
            }

            let elapsed = cycle_start.elapsed();
            let duration_ns = elapsed.as_nanos() as i64;
            self.stats.record(duration_ns, latency_ns, budget_ns);

            next_wake = cycle_start + self.period;
            if let Some(remaining) = next_wake.checked_duration_since(Instant::now()) {
                std::thread::sleep(remaining);
            } else {
                next_wake = Instant::now();
            }
        }

        self.tracer.terminate();
        info!(
            cycles = self.stats.cycle_count,
            overruns = self.stats.overruns,
            avg_cycle_us = self.stats.avg_cycle_ns() / 1000,
            "Cycle loop stopped"
        );
        Ok(&self.stats)
    }

    /// Timing statistics so far.
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// The controller being driven.
    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
