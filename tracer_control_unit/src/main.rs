//! # Tracer Control Unit
//!
//! Loads the tracer TOML configuration, brings up the selected HAL driver,
//! waits for the force sensor as a start signal and then runs the
//! line-trace controller at a fixed period until Ctrl-C or the cycle limit.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracer_common::config::LogLevel;
use tracer_common::hal::driver::ForceSensor;
use tracer_common::tracer::config::{AlignmentMode, TracerConfig};
use tracer_control_unit::config::load_config;
use tracer_control_unit::cycle::{CycleRunner, rt_setup};
use tracer_control_unit::diagnostics::TracingSink;
use tracer_control_unit::tick::Tracer;
use tracer_hal::driver_registry::DriverRegistry;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

const START_POLL: Duration = Duration::from_millis(10);

/// Startup alignment selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AlignmentArg {
    /// Run the full alignment sequence.
    Choreographed,
    /// Begin line tracing immediately.
    Skip,
}

impl From<AlignmentArg> for AlignmentMode {
    fn from(arg: AlignmentArg) -> Self {
        match arg {
            AlignmentArg::Choreographed => Self::Choreographed,
            AlignmentArg::Skip => Self::Skip,
        }
    }
}

/// Tracer Control Unit: PD line tracer with marker maneuvers
#[derive(Parser, Debug)]
#[command(name = "tracer_control_unit")]
#[command(version)]
#[command(about = "Line-trace controller with scripted marker maneuvers")]
struct Args {
    /// Path to the tracer configuration TOML.
    #[arg(default_value = "config/tracer.toml")]
    config: PathBuf,

    /// HAL driver to bring up.
    #[arg(long, default_value = "simulation")]
    driver: String,

    /// Override the configured startup alignment.
    #[arg(long, value_enum)]
    alignment: Option<AlignmentArg>,

    /// Stop after this many cycles.
    #[arg(long)]
    cycles: Option<u64>,

    /// Start without waiting for the force sensor.
    #[arg(long)]
    no_wait: bool,

    /// CPU core to pin the control thread to (default: 1).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority (default: 80).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let loaded = load_config(&args.config);
    let level = loaded
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, level);

    info!("Tracer Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = loaded
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|config| run(&args, config));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Tracer Control Unit shutdown complete");
}

fn run(args: &Args, mut config: TracerConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(mode) = args.alignment {
        config.alignment.mode = mode.into();
    }
    info!(
        service = %config.shared.service_name,
        cycle_time_ms = config.cycle_time_ms,
        alignment = %config.alignment.mode,
        maneuvers = config.maneuvers.occurrence.len(),
        "Config OK"
    );

    let registry = DriverRegistry::with_builtin();
    let mut driver = registry.create_driver(&args.driver)?;
    let mut devices = driver.init(&config)?;
    info!("Driver '{}' v{} initialized", driver.name(), driver.version());

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    if args.no_wait {
        info!("Start gate skipped");
    } else {
        info!("Waiting for force sensor press...");
        wait_for_start(devices.force.as_mut(), &running);
    }

    if running.load(Ordering::SeqCst) {
        rt_setup(args.cpu_core, args.rt_priority)?;
        info!(
            "RT setup complete (cpu_core={}, priority={})",
            args.cpu_core, args.rt_priority
        );

        let tracer = Tracer::new(config, devices, Box::new(TracingSink));
        let mut runner = CycleRunner::new(tracer, running).with_max_cycles(args.cycles);
        let stats = runner.run()?;
        info!(
            cycles = stats.cycle_count,
            overruns = stats.overruns,
            max_cycle_us = stats.max_cycle_ns / 1000,
            "Run finished"
        );
    } else {
        warn!("Shutdown requested before start");
    }

    driver.shutdown()?;
    Ok(())
}

/// Block until the force sensor is pressed or shutdown is requested.
fn wait_for_start(force: &mut dyn ForceSensor, running: &AtomicBool) {
    while running.load(Ordering::SeqCst) && !force.is_touched() {
        std::thread::sleep(START_POLL);
    }
}

/// Setup tracing subscriber from CLI arguments and the configured level.
fn setup_tracing(args: &Args, configured: LogLevel) {
    let filter = if args.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(configured.as_str()))
    };

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
