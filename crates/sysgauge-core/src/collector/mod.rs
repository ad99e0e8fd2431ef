//! Kernel counter collector for macOS.
//!
//! This module samples a fixed set of kernel counters through the `sysctl`
//! interface, with a mock kernel so everything can be tested on Linux.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Sampler                            │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐   │
//! │  │ LoadAverage  │  │  SwapUsage   │  │ BandwidthTotals  │   │
//! │  │ vm.loadavg   │  │ vm.swapusage │  │ NET_RT_IFLIST2   │   │
//! │  │ CadenceGate  │  │              │  │ GrowableBuffer   │   │
//! │  └──────┬───────┘  └──────┬───────┘  └────────┬─────────┘   │
//! │         └─────────────────┼───────────────────┘             │
//! │                           │                                 │
//! │                ┌──────────▼──────────┐   ┌──────────────┐   │
//! │                │  KernelValueReader  │   │  MetricSink  │   │
//! │                └──────────┬──────────┘   └──────────────┘   │
//! └───────────────────────────┼─────────────────────────────────┘
//!                             │
//!              ┌──────────────┼──────────────┐
//!              │              │              │
//!       ┌──────▼──────┐ ┌─────▼──────┐ ┌─────▼──────┐
//!       │SysctlReader │ │ MockKernel │ │ Scenarios  │
//!       │  (macOS)    │ │ (Testing)  │ │ (Fixtures) │
//!       └─────────────┘ └────────────┘ └────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (macOS)
//!
//! ```ignore
//! use std::time::Duration;
//! use sysgauge_core::collector::{Sampler, SysctlReader};
//! use sysgauge_core::config::SamplerConfig;
//! use sysgauge_core::sink::JsonLinesSink;
//!
//! let sink = JsonLinesSink::new(std::io::stdout());
//! let mut sampler = Sampler::new(SysctlReader::new(), sink, &SamplerConfig::default());
//! sampler.tick(Duration::from_secs(1));
//! ```
//!
//! ## Testing (with MockKernel)
//!
//! ```
//! use std::time::Duration;
//! use sysgauge_core::collector::{Sampler, MockKernel};
//! use sysgauge_core::config::SamplerConfig;
//! use sysgauge_core::sink::MemorySink;
//!
//! let kernel = MockKernel::typical_host();
//! let mut sampler = Sampler::new(kernel, MemorySink::new(), &SamplerConfig::default());
//! sampler.tick(Duration::from_secs(1));
//! assert_eq!(sampler.sink().charts().len(), 3);
//! ```

pub mod buffer;
pub mod cadence;
pub mod error;
pub mod families;
pub mod mock;
pub mod parser;
mod sampler;
pub mod sysctl;
pub mod traits;

pub use buffer::GrowableBuffer;
pub use cadence::CadenceGate;
pub use error::QueryError;
pub use families::{FamilyKind, TickOutcome};
pub use mock::MockKernel;
pub use sampler::{Sampler, SamplerTiming, TickReport};
pub use sysctl::SysctlReader;
pub use traits::KernelValueReader;
