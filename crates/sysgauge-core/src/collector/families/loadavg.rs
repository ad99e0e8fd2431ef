//! `system.load`: 1/5/15 minute load averages from `vm.loadavg`.

use std::time::Duration;

use super::{FamilyKind, MetricFamily};
use crate::collector::error::QueryError;
use crate::collector::parser::{LOADAVG_SIZE, parse_loadavg};
use crate::collector::traits::KernelValueReader;
use crate::sink::{Algorithm, ChartDef, ChartType, Dimension, Sample};

pub const LOADAVG_NAME: &str = "vm.loadavg";

/// macOS recomputes load averages once every 5 seconds.
pub const MIN_LOADAVG_UPDATE_EVERY: Duration = Duration::from_secs(5);

/// Load average family. Values are emitted in thousandths.
#[derive(Debug, Default)]
pub struct LoadAverage;

impl MetricFamily for LoadAverage {
    const KIND: FamilyKind = FamilyKind::LoadAverage;

    fn min_update_period(&self) -> Duration {
        MIN_LOADAVG_UPDATE_EVERY
    }

    fn chart(&self, update_every: Duration) -> ChartDef {
        ChartDef {
            type_id: "system".to_string(),
            id: "load".to_string(),
            family: "load".to_string(),
            title: "System Load Average".to_string(),
            units: "load".to_string(),
            priority: 100,
            update_every,
            chart_type: ChartType::Line,
            detail: false,
            dimensions: ["load1", "load5", "load15"]
                .iter()
                .map(|id| Dimension::new(id, 1, 1000, Algorithm::Absolute))
                .collect(),
        }
    }

    fn collect<R: KernelValueReader>(&mut self, reader: &R) -> Result<Vec<Sample>, QueryError> {
        let raw = reader.read_fixed::<LOADAVG_SIZE>(LOADAVG_NAME)?;
        let load = parse_loadavg(&raw)
            .map_err(|e| QueryError::malformed(LOADAVG_NAME, e.offset, e.message))?;
        let [load1, load5, load15] = load.thousandths();

        Ok(vec![
            Sample::new("load1", load1),
            Sample::new("load5", load5),
            Sample::new("load15", load15),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MACOS_FSCALE, MockKernel, encode_loadavg};

    #[test]
    fn test_collect_thousandths() {
        let kernel = MockKernel::typical_host();
        let samples = LoadAverage.collect(&kernel).unwrap();

        assert_eq!(
            samples,
            vec![
                Sample::new("load1", 1550),
                Sample::new("load5", 1300),
                Sample::new("load15", 1050),
            ]
        );
    }

    #[test]
    fn test_collect_rounds_to_nearest() {
        let kernel = MockKernel::new();
        // 1023/2048 = 0.49951..., 1 / 2048 = 0.000488...
        kernel.set_named(LOADAVG_NAME, encode_loadavg([1023, 1, 0], MACOS_FSCALE).to_vec());

        let samples = LoadAverage.collect(&kernel).unwrap();
        assert_eq!(samples[0].value, 500);
        assert_eq!(samples[1].value, 0);
        assert_eq!(samples[2].value, 0);
    }

    #[test]
    fn test_collect_zero_scale_is_malformed() {
        let kernel = MockKernel::new();
        kernel.set_named(LOADAVG_NAME, encode_loadavg([1, 1, 1], 0).to_vec());

        let err = LoadAverage.collect(&kernel).unwrap_err();
        assert!(matches!(err, QueryError::MalformedRecord { .. }));
    }

    #[test]
    fn test_collect_wrong_size() {
        let kernel = MockKernel::new();
        kernel.set_named(LOADAVG_NAME, vec![0u8; 16]);

        let err = LoadAverage.collect(&kernel).unwrap_err();
        assert!(matches!(err, QueryError::SizeMismatch { actual: 16, .. }));
    }

    #[test]
    fn test_chart_has_three_dimensions() {
        let chart = LoadAverage.chart(MIN_LOADAVG_UPDATE_EVERY);
        assert_eq!(chart.full_id(), "system.load");
        assert_eq!(chart.dimensions.len(), 3);
        assert!(chart.dimensions.iter().all(|d| d.divisor == 1000));
        assert_eq!(chart.update_every, Duration::from_secs(5));
    }
}
