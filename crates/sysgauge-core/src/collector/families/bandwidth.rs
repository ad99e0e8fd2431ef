//! `system.ipv4`: total IPv4 bandwidth summed over all interfaces.
//!
//! Reads the `NET_RT_IFLIST2` routing sysctl, which returns a stream of
//! interface and address records of varying size, and sums the byte
//! counters of every interface record.

use std::time::Duration;

use tracing::debug;

use super::{FamilyKind, MetricFamily, counter_value};
use crate::collector::buffer::GrowableBuffer;
use crate::collector::error::QueryError;
use crate::collector::parser::parse_interface_totals;
use crate::collector::traits::KernelValueReader;
use crate::sink::{Algorithm, ChartDef, ChartType, Dimension, Sample};

const CTL_NET: i32 = 4;
const PF_ROUTE: i32 = 17;
const AF_INET: i32 = 2;
const NET_RT_IFLIST2: i32 = 6;

/// Selector for "all IPv4-capable interfaces, extended info".
pub const IFLIST2_MIB: [i32; 6] = [CTL_NET, PF_ROUTE, 0, AF_INET, NET_RT_IFLIST2, 0];

/// Label used for the interface list in diagnostics.
pub const IFLIST2_LABEL: &str = "net interfaces";

/// Bandwidth family. Emits cumulative byte counters; the sink computes rates.
#[derive(Debug, Default)]
pub struct BandwidthTotals {
    buffer: GrowableBuffer,
}

impl BandwidthTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current size of the reusable response buffer.
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }
}

impl MetricFamily for BandwidthTotals {
    const KIND: FamilyKind = FamilyKind::BandwidthTotals;

    fn chart(&self, update_every: Duration) -> ChartDef {
        ChartDef {
            type_id: "system".to_string(),
            id: "ipv4".to_string(),
            family: "network".to_string(),
            title: "IPv4 Bandwidth".to_string(),
            units: "kilobits/s".to_string(),
            priority: 500,
            update_every,
            chart_type: ChartType::Area,
            detail: false,
            dimensions: vec![
                Dimension::new("InOctets", 8, 1024, Algorithm::Incremental).named("received"),
                Dimension::new("OutOctets", -8, 1024, Algorithm::Incremental).named("sent"),
            ],
        }
    }

    fn collect<R: KernelValueReader>(&mut self, reader: &R) -> Result<Vec<Sample>, QueryError> {
        let data = reader.read_variable(IFLIST2_LABEL, &IFLIST2_MIB, &mut self.buffer)?;
        let totals = parse_interface_totals(data)
            .map_err(|e| QueryError::malformed(IFLIST2_LABEL, e.offset, e.message))?;
        debug!(
            interfaces = totals.interfaces,
            bytes = data.len(),
            "interface totals decoded"
        );

        Ok(vec![
            Sample::new("InOctets", counter_value(totals.ibytes)),
            Sample::new("OutOctets", counter_value(totals.obytes)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockKernel, RTM_NEWADDR, interface_record, other_record};

    #[test]
    fn test_collect_sums_all_interfaces() {
        let kernel = MockKernel::typical_host();
        let mut family = BandwidthTotals::new();

        let samples = family.collect(&kernel).unwrap();
        assert_eq!(
            samples,
            vec![
                Sample::new("InOctets", 12_846_678),
                Sample::new("OutOctets", 2_847_678),
            ]
        );
        assert_eq!(kernel.mib_queries(&IFLIST2_MIB), 2);
    }

    #[test]
    fn test_buffer_grows_and_is_reused() {
        let kernel = MockKernel::new();
        let mut family = BandwidthTotals::new();

        let mut big = Vec::new();
        for _ in 0..4 {
            big.extend(interface_record(1, 1));
            big.extend(other_record(RTM_NEWADDR, 32));
        }
        let big_len = big.len();
        kernel.set_mib(&IFLIST2_MIB, big);
        family.collect(&kernel).unwrap();
        assert_eq!(family.buffer_len(), big_len);

        // One interface went away: smaller response, same buffer.
        let mut small = interface_record(10, 20);
        small.extend(other_record(RTM_NEWADDR, 32));
        kernel.set_mib(&IFLIST2_MIB, small);
        let samples = family.collect(&kernel).unwrap();
        assert_eq!(family.buffer_len(), big_len);
        assert_eq!(samples[0].value, 10);
        assert_eq!(samples[1].value, 20);
    }

    #[test]
    fn test_collect_counts_only_current_response() {
        let kernel = MockKernel::new();
        let mut family = BandwidthTotals::new();

        kernel.set_mib(&IFLIST2_MIB, interface_record(100, 200));
        family.collect(&kernel).unwrap();

        kernel.set_mib(&IFLIST2_MIB, interface_record(150, 260));
        let samples = family.collect(&kernel).unwrap();
        assert_eq!(samples[0].value, 150);
        assert_eq!(samples[1].value, 260);
    }

    #[test]
    fn test_collect_corrupt_record() {
        let kernel = MockKernel::host_with_corrupt_iflist();
        let err = BandwidthTotals::new().collect(&kernel).unwrap_err();
        assert!(matches!(err, QueryError::MalformedRecord { .. }));
        assert_eq!(err.name(), IFLIST2_LABEL);
    }

    #[test]
    fn test_collect_shape_change_between_calls() {
        let kernel = MockKernel::typical_host();
        kernel.set_mib_drift(&IFLIST2_MIB, -20);

        let err = BandwidthTotals::new().collect(&kernel).unwrap_err();
        assert!(matches!(err, QueryError::SizeMismatch { .. }));
    }

    #[test]
    fn test_collect_probe_failure() {
        let kernel = MockKernel::typical_host();
        kernel.fail_mib(&IFLIST2_MIB);

        let err = BandwidthTotals::new().collect(&kernel).unwrap_err();
        assert!(matches!(err, QueryError::QueryFailed { .. }));
        assert_eq!(kernel.mib_queries(&IFLIST2_MIB), 1);
    }

    #[test]
    fn test_chart_sent_is_negated() {
        let chart = BandwidthTotals::new().chart(Duration::from_secs(1));
        assert_eq!(chart.full_id(), "system.ipv4");
        assert_eq!(chart.dimensions[0].name, "received");
        assert_eq!(chart.dimensions[0].multiplier, 8);
        assert_eq!(chart.dimensions[1].name, "sent");
        assert_eq!(chart.dimensions[1].multiplier, -8);
        assert!(
            chart
                .dimensions
                .iter()
                .all(|d| d.algorithm == Algorithm::Incremental)
        );
    }
}
