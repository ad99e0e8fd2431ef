//! Outbound interface to the time-series sink.
//!
//! The sampler describes each chart once with a [`ChartDef`] and then
//! pushes [`Sample`]s for its dimensions. How values are stored, how
//! incremental dimensions are turned into rates and how charts are rendered
//! is up to the sink.

mod jsonl;
mod memory;

pub use jsonl::JsonLinesSink;
pub use memory::{MemorySink, SinkEvent};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the sink interprets collected values of a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// The value is shown as collected.
    Absolute,
    /// The value is a running total; the sink charts its per-second delta.
    Incremental,
}

/// Rendering hint for the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Line,
    Area,
    Stacked,
}

/// One dimension (series) of a chart.
///
/// Displayed value = collected value * `multiplier` / `divisor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub id: String,
    /// Display name; defaults to `id`.
    pub name: String,
    pub multiplier: i64,
    pub divisor: i64,
    pub algorithm: Algorithm,
}

impl Dimension {
    pub fn new(id: &str, multiplier: i64, divisor: i64, algorithm: Algorithm) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            multiplier,
            divisor,
            algorithm,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }
}

/// Chart description, sent to the sink exactly once per chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartDef {
    /// Chart type prefix, e.g. `system`.
    pub type_id: String,
    /// Chart id within the type, e.g. `load`.
    pub id: String,
    /// Menu family the chart belongs to.
    pub family: String,
    pub title: String,
    pub units: String,
    pub priority: u32,
    #[serde(with = "duration_secs")]
    pub update_every: Duration,
    pub chart_type: ChartType,
    /// Detail charts are hidden from overview dashboards.
    pub detail: bool,
    pub dimensions: Vec<Dimension>,
}

impl ChartDef {
    /// Full chart id, e.g. `system.load`.
    pub fn full_id(&self) -> String {
        format!("{}.{}", self.type_id, self.id)
    }
}

/// One collected value for one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Dimension id the value belongs to.
    pub metric_name: String,
    pub value: i64,
}

impl Sample {
    pub fn new(metric_name: &str, value: i64) -> Self {
        Self {
            metric_name: metric_name.to_string(),
            value,
        }
    }
}

/// Receiver of charts and samples.
///
/// Implementations must not fail the caller: delivery problems are theirs to
/// log or buffer.
pub trait MetricSink {
    /// Registers a chart and its dimensions.
    fn create_chart(&mut self, chart: &ChartDef);

    /// Pushes one set of samples for the chart with the given full id.
    fn update(&mut self, chart_id: &str, samples: &[Sample]);
}

impl<S: MetricSink + ?Sized> MetricSink for &mut S {
    fn create_chart(&mut self, chart: &ChartDef) {
        (**self).create_chart(chart);
    }

    fn update(&mut self, chart_id: &str, samples: &[Sample]) {
        (**self).update(chart_id, samples);
    }
}

pub(crate) mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_chart() -> ChartDef {
        ChartDef {
            type_id: "system".to_string(),
            id: "ipv4".to_string(),
            family: "network".to_string(),
            title: "IPv4 Bandwidth".to_string(),
            units: "kilobits/s".to_string(),
            priority: 500,
            update_every: Duration::from_secs(1),
            chart_type: ChartType::Area,
            detail: false,
            dimensions: vec![
                Dimension::new("InOctets", 8, 1024, Algorithm::Incremental).named("received"),
            ],
        }
    }

    #[test]
    fn test_full_id() {
        assert_eq!(sample_chart().full_id(), "system.ipv4");
    }

    #[test]
    fn test_dimension_name_defaults_to_id() {
        let dim = Dimension::new("load1", 1, 1000, Algorithm::Absolute);
        assert_eq!(dim.name, "load1");
        assert_eq!(dim.named("one").name, "one");
    }

    #[test]
    fn test_chart_serializes_update_every_as_seconds() {
        let json = serde_json::to_value(sample_chart()).unwrap();
        assert_eq!(json["update_every"], 1);
        assert_eq!(json["chart_type"], "area");
        assert_eq!(json["dimensions"][0]["algorithm"], "incremental");
        assert_eq!(json["dimensions"][0]["name"], "received");

        let back: ChartDef = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample_chart());
    }
}
