//! Metric families: one kernel counter source feeding one chart each.
//!
//! A family knows how to query and decode its counter ([`MetricFamily`]).
//! [`FamilyState`] wraps it with the per-family enable flag, cadence gate and
//! chart bookkeeping, and implements the terminal `Enabled -> Disabled`
//! transition on the first failure.

pub mod bandwidth;
pub mod loadavg;
pub mod swap;

pub use bandwidth::BandwidthTotals;
pub use loadavg::LoadAverage;
pub use swap::SwapUsage;

use std::time::Duration;

use tracing::{debug, error};

use crate::collector::cadence::{CadenceGate, effective_period};
use crate::collector::error::QueryError;
use crate::collector::traits::KernelValueReader;
use crate::sink::{ChartDef, MetricSink, Sample};

/// Identifies a metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FamilyKind {
    LoadAverage,
    SwapUsage,
    BandwidthTotals,
}

impl FamilyKind {
    /// All families, in sampling order.
    pub const ALL: [FamilyKind; 3] = [
        FamilyKind::LoadAverage,
        FamilyKind::SwapUsage,
        FamilyKind::BandwidthTotals,
    ];

    /// Full id of the chart the family feeds.
    pub fn chart_id(&self) -> &'static str {
        match self {
            FamilyKind::LoadAverage => "system.load",
            FamilyKind::SwapUsage => "system.swap",
            FamilyKind::BandwidthTotals => "system.ipv4",
        }
    }

    /// Configuration key of the family's enable flag.
    pub fn config_key(&self) -> &'static str {
        match self {
            FamilyKind::LoadAverage => "enable load average",
            FamilyKind::SwapUsage => "system swap",
            FamilyKind::BandwidthTotals => "bandwidth",
        }
    }
}

impl std::fmt::Display for FamilyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.chart_id())
    }
}

/// Query and decode logic of one family.
pub trait MetricFamily {
    const KIND: FamilyKind;

    /// Shortest interval at which the underlying counter changes.
    /// Zero means the family is sampled on every tick.
    fn min_update_period(&self) -> Duration {
        Duration::ZERO
    }

    /// Chart description for the sink.
    fn chart(&self, update_every: Duration) -> ChartDef;

    /// Queries the kernel and converts the result into samples, in the
    /// chart's dimension order.
    fn collect<R: KernelValueReader>(&mut self, reader: &R) -> Result<Vec<Sample>, QueryError>;
}

/// Result of offering one tick to a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Family is disabled (by configuration or an earlier failure); nothing was queried.
    Disabled,
    /// Cadence gate not due; nothing was queried.
    Skipped,
    /// Samples were emitted.
    Sampled,
    /// The query failed; the family is now disabled for good.
    Failed,
}

/// A family plus its enable flag, cadence and chart bookkeeping.
#[derive(Debug)]
pub struct FamilyState<F: MetricFamily> {
    family: F,
    enabled: bool,
    chart_created: bool,
    gate: CadenceGate,
    gate_period: Duration,
    update_every: Duration,
    disabled_reason: Option<String>,
}

impl<F: MetricFamily> FamilyState<F> {
    /// Wraps `family`.
    ///
    /// # Arguments
    /// * `enabled` - Enable flag from configuration
    /// * `interval` - Configured collection interval
    pub fn new(family: F, enabled: bool, interval: Duration) -> Self {
        let minimum = family.min_update_period();
        let update_every = effective_period(interval, minimum);
        let gate_period = if minimum.is_zero() {
            Duration::ZERO
        } else {
            update_every
        };

        if !enabled {
            debug!(chart = F::KIND.chart_id(), "disabled by configuration");
        }

        Self {
            family,
            enabled,
            chart_created: false,
            gate: CadenceGate::new(),
            gate_period,
            update_every,
            disabled_reason: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the chart has been sent to the sink.
    pub fn chart_created(&self) -> bool {
        self.chart_created
    }

    /// Update period advertised on the chart.
    pub fn update_every(&self) -> Duration {
        self.update_every
    }

    /// Why the family was disabled at runtime, if it was.
    pub fn disabled_reason(&self) -> Option<&str> {
        self.disabled_reason.as_deref()
    }

    pub fn family(&self) -> &F {
        &self.family
    }

    /// Runs one tick: gate, query, decode, emit.
    ///
    /// Errors never escape; they disable the family and are logged once.
    pub fn tick<R, S>(&mut self, dt: Duration, reader: &R, sink: &mut S) -> TickOutcome
    where
        R: KernelValueReader,
        S: MetricSink,
    {
        if !self.enabled {
            return TickOutcome::Disabled;
        }
        if !self.gate.should_sample(dt) {
            return TickOutcome::Skipped;
        }

        match self.family.collect(reader) {
            Ok(samples) => {
                if !self.chart_created {
                    sink.create_chart(&self.family.chart(self.update_every));
                    self.chart_created = true;
                }
                sink.update(F::KIND.chart_id(), &samples);
                self.gate.reset(self.gate_period);
                TickOutcome::Sampled
            }
            Err(e) => {
                self.enabled = false;
                error!(chart = F::KIND.chart_id(), error = %e, "DISABLED: {}", F::KIND);
                self.disabled_reason = Some(e.to_string());
                TickOutcome::Failed
            }
        }
    }
}

/// Converts a kernel counter to a sample value, saturating at `i64::MAX`.
pub(crate) fn counter_value(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
