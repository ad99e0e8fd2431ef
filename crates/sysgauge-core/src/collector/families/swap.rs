//! `system.swap`: swap space usage from `vm.swapusage`.

use std::time::Duration;

use tracing::trace;

use super::{FamilyKind, MetricFamily, counter_value};
use crate::collector::error::QueryError;
use crate::collector::parser::{XSW_USAGE_SIZE, parse_swap_usage};
use crate::collector::traits::KernelValueReader;
use crate::sink::{Algorithm, ChartDef, ChartType, Dimension, Sample};

pub const SWAPUSAGE_NAME: &str = "vm.swapusage";

const MIB: i64 = 1024 * 1024;

/// Swap usage family. Emits byte counts; the chart's divisor presents them in MB.
#[derive(Debug, Default)]
pub struct SwapUsage;

impl MetricFamily for SwapUsage {
    const KIND: FamilyKind = FamilyKind::SwapUsage;

    fn chart(&self, update_every: Duration) -> ChartDef {
        ChartDef {
            type_id: "system".to_string(),
            id: "swap".to_string(),
            family: "swap".to_string(),
            title: "System Swap".to_string(),
            units: "MB".to_string(),
            priority: 201,
            update_every,
            chart_type: ChartType::Stacked,
            detail: true,
            dimensions: vec![
                Dimension::new("free", 1, MIB, Algorithm::Absolute),
                Dimension::new("used", 1, MIB, Algorithm::Absolute),
            ],
        }
    }

    fn collect<R: KernelValueReader>(&mut self, reader: &R) -> Result<Vec<Sample>, QueryError> {
        let raw = reader.read_fixed::<XSW_USAGE_SIZE>(SWAPUSAGE_NAME)?;
        let swap = parse_swap_usage(&raw);
        trace!(
            total = swap.total,
            pagesize = swap.pagesize,
            encrypted = swap.encrypted,
            "swap usage decoded"
        );

        Ok(vec![
            Sample::new("free", counter_value(swap.avail)),
            Sample::new("used", counter_value(swap.used)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockKernel, encode_swap_usage};

    #[test]
    fn test_collect_bytes() {
        let kernel = MockKernel::new();
        kernel.set_named(
            SWAPUSAGE_NAME,
            encode_swap_usage(1 << 30, 768 << 20, 256 << 20).to_vec(),
        );

        let samples = SwapUsage.collect(&kernel).unwrap();
        assert_eq!(
            samples,
            vec![
                Sample::new("free", 768 << 20),
                Sample::new("used", 256 << 20),
            ]
        );
    }

    #[test]
    fn test_collect_missing_counter() {
        let kernel = MockKernel::new();
        let err = SwapUsage.collect(&kernel).unwrap_err();
        assert!(matches!(err, QueryError::QueryFailed { .. }));
    }

    #[test]
    fn test_chart_is_stacked_detail_in_mb() {
        let chart = SwapUsage.chart(Duration::from_secs(1));
        assert_eq!(chart.full_id(), "system.swap");
        assert_eq!(chart.chart_type, ChartType::Stacked);
        assert!(chart.detail);
        assert_eq!(chart.dimensions[0].id, "free");
        assert_eq!(chart.dimensions[1].id, "used");
        assert!(chart.dimensions.iter().all(|d| d.divisor == 1_048_576));
    }

    #[test]
    fn test_not_throttled() {
        assert!(SwapUsage.min_update_period().is_zero());
    }
}
