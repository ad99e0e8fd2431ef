//! sysgauge-core: platform sampling library for the sysgauge agent.
//!
//! Provides:
//! - `collector`: kernel counter reader, cadence gating, metric families
//!   (load average, swap usage, IPv4 bandwidth) and the `Sampler` that ties
//!   them together
//! - `sink`: chart model and sink implementations that receive samples
//! - `config`: sampler configuration (enable flags, update interval)

pub mod collector;
pub mod config;
pub mod sink;
