//! In-memory sink that records everything it receives.

use super::{ChartDef, MetricSink, Sample};

/// Event received by a [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Create(ChartDef),
    Update { chart_id: String, samples: Vec<Sample> },
}

/// Sink that keeps every chart and update in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Vec<SinkEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events in arrival order.
    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    /// Charts created so far.
    pub fn charts(&self) -> Vec<&ChartDef> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Create(chart) => Some(chart),
                SinkEvent::Update { .. } => None,
            })
            .collect()
    }

    /// Chart with the given full id, if it was created.
    pub fn chart(&self, chart_id: &str) -> Option<&ChartDef> {
        self.charts().into_iter().find(|c| c.full_id() == chart_id)
    }

    /// Every sample set pushed for `chart_id`, oldest first.
    pub fn updates(&self, chart_id: &str) -> Vec<&[Sample]> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Update {
                    chart_id: id,
                    samples,
                } if id == chart_id => Some(samples.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// Most recent value of `dimension` on `chart_id`.
    pub fn last_value(&self, chart_id: &str, dimension: &str) -> Option<i64> {
        self.updates(chart_id)
            .into_iter()
            .rev()
            .find_map(|samples| samples.iter().find(|s| s.metric_name == dimension))
            .map(|s| s.value)
    }

    /// Drops recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl MetricSink for MemorySink {
    fn create_chart(&mut self, chart: &ChartDef) {
        self.events.push(SinkEvent::Create(chart.clone()));
    }

    fn update(&mut self, chart_id: &str, samples: &[Sample]) {
        self.events.push(SinkEvent::Update {
            chart_id: chart_id.to_string(),
            samples: samples.to_vec(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{Algorithm, ChartType, Dimension};
    use std::time::Duration;

    fn chart(id: &str) -> ChartDef {
        ChartDef {
            type_id: "system".to_string(),
            id: id.to_string(),
            family: id.to_string(),
            title: id.to_string(),
            units: "units".to_string(),
            priority: 1,
            update_every: Duration::from_secs(1),
            chart_type: ChartType::Line,
            detail: false,
            dimensions: vec![Dimension::new("a", 1, 1, Algorithm::Absolute)],
        }
    }

    #[test]
    fn test_records_in_order() {
        let mut sink = MemorySink::new();
        sink.create_chart(&chart("load"));
        sink.update("system.load", &[Sample::new("a", 1)]);
        sink.update("system.load", &[Sample::new("a", 2)]);

        assert_eq!(sink.events().len(), 3);
        assert_eq!(sink.charts().len(), 1);
        assert!(sink.chart("system.load").is_some());
        assert_eq!(sink.updates("system.load").len(), 2);
        assert_eq!(sink.last_value("system.load", "a"), Some(2));
    }

    #[test]
    fn test_filters_by_chart() {
        let mut sink = MemorySink::new();
        sink.update("system.load", &[Sample::new("a", 1)]);
        sink.update("system.swap", &[Sample::new("a", 5)]);

        assert_eq!(sink.updates("system.swap").len(), 1);
        assert_eq!(sink.last_value("system.swap", "a"), Some(5));
        assert_eq!(sink.last_value("system.ipv4", "a"), None);
    }

    #[test]
    fn test_clear() {
        let mut sink = MemorySink::new();
        sink.create_chart(&chart("load"));
        sink.clear();
        assert!(sink.events().is_empty());
    }
}
