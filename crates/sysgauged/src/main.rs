//! sysgauged - macOS kernel counter sampler daemon.
//!
//! Samples load average, swap usage and IPv4 bandwidth through `sysctl` and
//! writes chart definitions and samples as JSON lines.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use sysgauge_core::collector::{FamilyKind, Sampler, SysctlReader};
use sysgauge_core::config::{ConfigError, SamplerConfig};
use sysgauge_core::sink::JsonLinesSink;

/// macOS kernel counter sampler daemon.
#[derive(Parser, Debug)]
#[command(name = "sysgauged", about = "macOS kernel counter sampler", version)]
struct Args {
    /// Collection interval in seconds. Overrides the config file.
    #[arg(short, long)]
    interval: Option<u64>,

    /// JSON config file with `[plugin:macos:sysctl]` keys.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Sample the load average. Disable with --load-average=false.
    #[arg(long, action = clap::ArgAction::Set)]
    load_average: Option<bool>,

    /// Sample swap usage. Disable with --swap=false.
    #[arg(long, action = clap::ArgAction::Set)]
    swap: Option<bool>,

    /// Sample IPv4 bandwidth. Disable with --bandwidth=false.
    #[arg(long, action = clap::ArgAction::Set)]
    bandwidth: Option<bool>,

    /// Write metrics to this file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    /// Builds the sampler config: file (or defaults) first, then flags.
    fn sampler_config(&self) -> Result<SamplerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SamplerConfig::from_json_file(path)?,
            None => SamplerConfig::default(),
        };

        if let Some(secs) = self.interval {
            config.update_every = Duration::from_secs(secs);
        }
        if let Some(enabled) = self.load_average {
            config.load_average = enabled;
        }
        if let Some(enabled) = self.swap {
            config.swap = enabled;
        }
        if let Some(enabled) = self.bandwidth {
            config.bandwidth = enabled;
        }

        config.validate()?;
        Ok(config)
    }

    fn open_output(&self) -> io::Result<Box<dyn Write>> {
        match &self.output {
            Some(path) => Ok(Box::new(BufWriter::new(File::create(path)?))),
            None => Ok(Box::new(io::stdout())),
        }
    }
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Logs go to stderr so they never mix with metrics on stdout.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for crate_name in ["sysgauged", "sysgauge_core"] {
        if let Ok(directive) = format!("{}={}", crate_name, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Sleeps up to `duration`, waking every 100ms to check for shutdown.
fn sleep_while_running(duration: Duration, running: &AtomicBool) {
    let sleep_interval = Duration::from_millis(100);
    let mut remaining = duration;
    while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
        let sleep_time = remaining.min(sleep_interval);
        std::thread::sleep(sleep_time);
        remaining = remaining.saturating_sub(sleep_time);
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let config = match args.sampler_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("sysgauged {} starting", env!("CARGO_PKG_VERSION"));
    for kind in FamilyKind::ALL {
        let enabled = match kind {
            FamilyKind::LoadAverage => config.load_average,
            FamilyKind::SwapUsage => config.swap,
            FamilyKind::BandwidthTotals => config.bandwidth,
        };
        debug!("Config: {} = {}", kind.config_key(), enabled);
    }

    let output = match args.open_output() {
        Ok(output) => output,
        Err(e) => {
            error!("Failed to open output: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(ref path) = args.output {
        info!("Writing metrics to {}", path.display());
    }

    let mut sampler = Sampler::new(SysctlReader::new(), JsonLinesSink::new(output), &config);
    let interval = config.update_every;

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    info!("Starting sampling loop (interval={}s)", interval.as_secs());

    let mut last_tick: Option<Instant> = None;
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        let dt = last_tick.map_or(interval, |t| now.duration_since(t));
        last_tick = Some(now);

        sampler.tick(dt);
        if let Some(timing) = sampler.last_timing() {
            debug!(
                "Tick #{}: total={:?} loadavg={:?} swap={:?} bandwidth={:?}",
                sampler.ticks(),
                timing.total,
                timing.loadavg,
                timing.swap,
                timing.bandwidth
            );
        }
        if let Err(e) = sampler.sink_mut().flush() {
            debug!("Flush failed: {}", e);
        }

        if sampler.enabled_families().is_empty() {
            warn!("All families are disabled, nothing left to sample");
            break;
        }

        sleep_while_running(interval.saturating_sub(now.elapsed()), &running);
    }

    // Graceful shutdown
    info!("Shutting down...");

    let mut sink = sampler.into_sink();
    if let Err(e) = sink.flush() {
        error!("Failed to flush output on shutdown: {}", e);
    }
    if sink.write_errors() > 0 {
        warn!("{} metric records could not be written", sink.write_errors());
    }

    info!("Shutdown complete");
    ExitCode::SUCCESS
}
