//! Abstraction over the kernel counter query primitive.
//!
//! The `KernelValueReader` trait lets families run against the real
//! `sysctl` interface on macOS and against `MockKernel` in tests and on
//! other platforms.

use std::io;

use crate::collector::buffer::GrowableBuffer;
use crate::collector::error::QueryError;

/// Low-level access to named and MIB-addressed kernel values.
///
/// Implementations perform exactly one kernel call per method invocation and
/// never retry. Size and shape checks live in the provided methods.
pub trait KernelValueReader: Send + Sync {
    /// Reads the named value into `buf`.
    ///
    /// # Returns
    /// The number of bytes the kernel produced.
    fn read_named(&self, name: &str, buf: &mut [u8]) -> io::Result<usize>;

    /// Asks the kernel how many bytes the value addressed by `mib` would take.
    fn probe_mib(&self, mib: &[i32]) -> io::Result<usize>;

    /// Fetches the value addressed by `mib` into `buf`.
    ///
    /// # Returns
    /// The number of bytes written.
    fn read_mib(&self, mib: &[i32], buf: &mut [u8]) -> io::Result<usize>;

    /// Reads a fixed-size value; the kernel must produce exactly `N` bytes.
    fn read_fixed<const N: usize>(&self, name: &str) -> Result<[u8; N], QueryError>
    where
        Self: Sized,
    {
        let mut raw = [0u8; N];
        let produced = self
            .read_named(name, &mut raw)
            .map_err(|e| QueryError::failed(name, e))?;
        if produced != N {
            return Err(QueryError::SizeMismatch {
                name: name.to_string(),
                expected: N,
                actual: produced,
            });
        }
        Ok(raw)
    }

    /// Two-phase read of a variable-length value into `buf`.
    ///
    /// Probes the required size, grows `buf` if needed, then fetches. The
    /// value may change shape between the two calls, so a fetch that reports
    /// a different size than the probe is rejected as `SizeMismatch`.
    fn read_variable<'a>(
        &self,
        label: &str,
        mib: &[i32],
        buf: &'a mut GrowableBuffer,
    ) -> Result<&'a [u8], QueryError>
    where
        Self: Sized,
    {
        let required = self
            .probe_mib(mib)
            .map_err(|e| QueryError::failed(label, e))?;
        let fetched = self
            .read_mib(mib, buf.reserve(required))
            .map_err(|e| QueryError::failed(label, e))?;
        if fetched != required {
            return Err(QueryError::SizeMismatch {
                name: label.to_string(),
                expected: required,
                actual: fetched,
            });
        }
        Ok(buf.filled(fetched))
    }
}
