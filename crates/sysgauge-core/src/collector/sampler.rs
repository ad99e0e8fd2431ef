//! Main sampler that drives every metric family once per tick.
//!
//! The `Sampler` owns the reader, the sink and the per-family state, and
//! offers each tick to the families in a fixed order: load average, swap,
//! bandwidth.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::collector::families::{
    BandwidthTotals, FamilyKind, FamilyState, LoadAverage, SwapUsage, TickOutcome,
};
use crate::collector::traits::KernelValueReader;
use crate::config::SamplerConfig;
use crate::sink::MetricSink;

/// Timing information for each family within one tick.
///
/// Families that were skipped or disabled report `Duration::ZERO`.
#[derive(Debug, Clone, Default)]
pub struct SamplerTiming {
    /// Total tick time.
    pub total: Duration,
    /// Time to query, decode and emit the load average.
    pub loadavg: Duration,
    /// Time to query, decode and emit swap usage.
    pub swap: Duration,
    /// Time to query, decode and emit bandwidth totals.
    pub bandwidth: Duration,
}

/// Per-family outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub loadavg: TickOutcome,
    pub swap: TickOutcome,
    pub bandwidth: TickOutcome,
}

impl TickReport {
    pub fn outcome(&self, kind: FamilyKind) -> TickOutcome {
        match kind {
            FamilyKind::LoadAverage => self.loadavg,
            FamilyKind::SwapUsage => self.swap,
            FamilyKind::BandwidthTotals => self.bandwidth,
        }
    }

    /// Number of families that emitted samples.
    pub fn sampled(&self) -> usize {
        self.count(TickOutcome::Sampled)
    }

    /// Number of families disabled during this tick.
    pub fn failed(&self) -> usize {
        self.count(TickOutcome::Failed)
    }

    fn count(&self, outcome: TickOutcome) -> usize {
        [self.loadavg, self.swap, self.bandwidth]
            .iter()
            .filter(|&&o| o == outcome)
            .count()
    }
}

/// Cadence-gated sampler over all metric families.
///
/// `tick` takes `&mut self`, so ticks never overlap. Callers that trigger
/// ticks from several threads share the sampler behind a `Mutex`.
pub struct Sampler<R: KernelValueReader, S: MetricSink> {
    reader: R,
    sink: S,
    loadavg: FamilyState<LoadAverage>,
    swap: FamilyState<SwapUsage>,
    bandwidth: FamilyState<BandwidthTotals>,
    ticks: u64,
    /// Timing information from the last tick.
    last_timing: Option<SamplerTiming>,
}

impl<R: KernelValueReader, S: MetricSink> Sampler<R, S> {
    /// Creates a new sampler.
    ///
    /// # Arguments
    /// * `reader` - Kernel value reader (real or mock)
    /// * `sink` - Receiver of charts and samples
    /// * `config` - Enable flags and the configured collection interval
    pub fn new(reader: R, sink: S, config: &SamplerConfig) -> Self {
        let interval = config.update_every;
        let sampler = Self {
            reader,
            sink,
            loadavg: FamilyState::new(LoadAverage, config.load_average, interval),
            swap: FamilyState::new(SwapUsage, config.swap, interval),
            bandwidth: FamilyState::new(BandwidthTotals::new(), config.bandwidth, interval),
            ticks: 0,
            last_timing: None,
        };

        info!(
            interval_secs = interval.as_secs(),
            families = ?sampler.enabled_families(),
            "sampler initialized"
        );
        sampler
    }

    /// Runs one collection tick.
    ///
    /// `dt` is the wall-clock time since the previous tick. Never fails: a
    /// family that errors is disabled and the remaining families still run.
    pub fn tick(&mut self, dt: Duration) -> TickReport {
        let total_start = Instant::now();
        let mut timing = SamplerTiming::default();

        let start = Instant::now();
        let loadavg = self.loadavg.tick(dt, &self.reader, &mut self.sink);
        if loadavg != TickOutcome::Disabled && loadavg != TickOutcome::Skipped {
            timing.loadavg = start.elapsed();
        }

        let start = Instant::now();
        let swap = self.swap.tick(dt, &self.reader, &mut self.sink);
        if swap != TickOutcome::Disabled && swap != TickOutcome::Skipped {
            timing.swap = start.elapsed();
        }

        let start = Instant::now();
        let bandwidth = self.bandwidth.tick(dt, &self.reader, &mut self.sink);
        if bandwidth != TickOutcome::Disabled && bandwidth != TickOutcome::Skipped {
            timing.bandwidth = start.elapsed();
        }

        self.ticks += 1;
        timing.total = total_start.elapsed();
        self.last_timing = Some(timing);

        let report = TickReport {
            loadavg,
            swap,
            bandwidth,
        };
        debug!(
            tick = self.ticks,
            sampled = report.sampled(),
            failed = report.failed(),
            "tick complete"
        );
        report
    }

    /// Whether `kind` is still being sampled.
    pub fn is_enabled(&self, kind: FamilyKind) -> bool {
        match kind {
            FamilyKind::LoadAverage => self.loadavg.is_enabled(),
            FamilyKind::SwapUsage => self.swap.is_enabled(),
            FamilyKind::BandwidthTotals => self.bandwidth.is_enabled(),
        }
    }

    /// Families still enabled, in sampling order.
    pub fn enabled_families(&self) -> Vec<FamilyKind> {
        FamilyKind::ALL
            .into_iter()
            .filter(|&kind| self.is_enabled(kind))
            .collect()
    }

    /// Why `kind` was disabled at runtime, if it was.
    pub fn disabled_reason(&self, kind: FamilyKind) -> Option<&str> {
        match kind {
            FamilyKind::LoadAverage => self.loadavg.disabled_reason(),
            FamilyKind::SwapUsage => self.swap.disabled_reason(),
            FamilyKind::BandwidthTotals => self.bandwidth.disabled_reason(),
        }
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Returns timing information from the last tick.
    pub fn last_timing(&self) -> Option<&SamplerTiming> {
        self.last_timing.as_ref()
    }

    /// Returns a reference to the kernel reader.
    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Returns a reference to the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Returns a mutable reference to the sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consumes the sampler, returning the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }
}
