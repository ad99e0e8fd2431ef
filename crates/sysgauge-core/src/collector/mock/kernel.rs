//! In-memory mock kernel for testing families without a real `sysctl`.
//!
//! `MockKernel` simulates named and MIB-addressed kernel values, so tests
//! can run on Linux and in CI exactly as they would on macOS.

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::collector::traits::KernelValueReader;

#[derive(Debug, Default)]
struct MibEntry {
    data: Vec<u8>,
    /// Bytes gained (or lost, if negative) between probe and fetch.
    drift: isize,
}

#[derive(Debug, Default)]
struct MockState {
    named: HashMap<String, Vec<u8>>,
    mibs: HashMap<Vec<i32>, MibEntry>,
    failing_named: HashSet<String>,
    failing_mibs: HashSet<Vec<i32>>,
    named_queries: HashMap<String, usize>,
    mib_queries: HashMap<Vec<i32>, usize>,
}

/// In-memory kernel.
///
/// Clones share state, so a test can keep a handle for reconfiguration and
/// query counting after moving another handle into a `Sampler`.
#[derive(Debug, Clone, Default)]
pub struct MockKernel {
    state: Arc<Mutex<MockState>>,
}

impl MockKernel {
    /// Creates a kernel with no values; every query fails with `NotFound`.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets the bytes returned for a named value.
    pub fn set_named(&self, name: impl Into<String>, data: Vec<u8>) {
        self.state().named.insert(name.into(), data);
    }

    /// Sets the bytes returned for a MIB-addressed value.
    pub fn set_mib(&self, mib: &[i32], data: Vec<u8>) {
        self.state().mibs.entry(mib.to_vec()).or_default().data = data;
    }

    /// Makes the value at `mib` change size by `drift` bytes between the
    /// size probe and the fetch.
    pub fn set_mib_drift(&self, mib: &[i32], drift: isize) {
        self.state().mibs.entry(mib.to_vec()).or_default().drift = drift;
    }

    /// Makes every subsequent read of `name` fail.
    pub fn fail_named(&self, name: impl Into<String>) {
        self.state().failing_named.insert(name.into());
    }

    /// Makes every subsequent probe and fetch of `mib` fail.
    pub fn fail_mib(&self, mib: &[i32]) {
        self.state().failing_mibs.insert(mib.to_vec());
    }

    /// Number of reads issued for `name`.
    pub fn named_queries(&self, name: &str) -> usize {
        self.state().named_queries.get(name).copied().unwrap_or(0)
    }

    /// Number of probes plus fetches issued for `mib`.
    pub fn mib_queries(&self, mib: &[i32]) -> usize {
        self.state().mib_queries.get(mib).copied().unwrap_or(0)
    }

    /// Total number of kernel calls of any kind.
    pub fn total_queries(&self) -> usize {
        let state = self.state();
        state.named_queries.values().sum::<usize>() + state.mib_queries.values().sum::<usize>()
    }
}

fn not_found(what: impl std::fmt::Debug) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no such value: {:?}", what))
}

fn injected(what: impl std::fmt::Debug) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("injected failure: {:?}", what),
    )
}

impl KernelValueReader for MockKernel {
    fn read_named(&self, name: &str, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state();
        *state.named_queries.entry(name.to_string()).or_default() += 1;

        if state.failing_named.contains(name) {
            return Err(injected(name));
        }
        let data = state.named.get(name).ok_or_else(|| not_found(name))?;
        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        Ok(data.len())
    }

    fn probe_mib(&self, mib: &[i32]) -> io::Result<usize> {
        let mut state = self.state();
        *state.mib_queries.entry(mib.to_vec()).or_default() += 1;

        if state.failing_mibs.contains(mib) {
            return Err(injected(mib));
        }
        state
            .mibs
            .get(mib)
            .map(|entry| entry.data.len())
            .ok_or_else(|| not_found(mib))
    }

    fn read_mib(&self, mib: &[i32], buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state();
        *state.mib_queries.entry(mib.to_vec()).or_default() += 1;

        if state.failing_mibs.contains(mib) {
            return Err(injected(mib));
        }
        let entry = state.mibs.get(mib).ok_or_else(|| not_found(mib))?;
        let produced = entry.data.len().saturating_add_signed(entry.drift);
        if produced > buf.len() {
            return Err(io::Error::new(
                io::ErrorKind::OutOfMemory,
                format!("buffer of {} bytes too small for {}", buf.len(), produced),
            ));
        }
        let n = produced.min(entry.data.len());
        buf[..n].copy_from_slice(&entry.data[..n]);
        Ok(produced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_value_roundtrip() {
        let kernel = MockKernel::new();
        kernel.set_named("vm.value", vec![1, 2, 3]);

        let mut buf = [0u8; 3];
        assert_eq!(kernel.read_named("vm.value", &mut buf).unwrap(), 3);
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(kernel.named_queries("vm.value"), 1);
    }

    #[test]
    fn test_missing_value_not_found() {
        let kernel = MockKernel::new();
        let mut buf = [0u8; 4];
        let err = kernel.read_named("vm.nope", &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(kernel.named_queries("vm.nope"), 1);
    }

    #[test]
    fn test_injected_failure_wins_over_value() {
        let kernel = MockKernel::new();
        kernel.set_named("vm.value", vec![1]);
        kernel.fail_named("vm.value");

        let mut buf = [0u8; 1];
        let err = kernel.read_named("vm.value", &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_clones_share_state() {
        let kernel = MockKernel::new();
        let handle = kernel.clone();
        kernel.set_named("vm.value", vec![9]);

        let mut buf = [0u8; 1];
        handle.read_named("vm.value", &mut buf).unwrap();
        assert_eq!(kernel.named_queries("vm.value"), 1);
        assert_eq!(kernel.total_queries(), 1);
    }

    #[test]
    fn test_mib_probe_and_fetch_counted() {
        let kernel = MockKernel::new();
        let mib = [1, 2, 3];
        kernel.set_mib(&mib, vec![5; 10]);

        assert_eq!(kernel.probe_mib(&mib).unwrap(), 10);
        let mut buf = vec![0u8; 10];
        assert_eq!(kernel.read_mib(&mib, &mut buf).unwrap(), 10);
        assert_eq!(kernel.mib_queries(&mib), 2);
    }

    #[test]
    fn test_mib_growth_overflows_buffer() {
        let kernel = MockKernel::new();
        let mib = [1, 2, 3];
        kernel.set_mib(&mib, vec![5; 10]);
        kernel.set_mib_drift(&mib, 4);

        let size = kernel.probe_mib(&mib).unwrap();
        let mut buf = vec![0u8; size];
        let err = kernel.read_mib(&mib, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::OutOfMemory);
    }
}
