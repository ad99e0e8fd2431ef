//! Real `sysctl` reader.
//!
//! On macOS this issues `sysctlbyname(3)` and `sysctl(3)` calls through
//! `libc`. Elsewhere every call fails with `ErrorKind::Unsupported`, which the
//! sampler turns into "family disabled" on the first tick.

use std::io;

use crate::collector::traits::KernelValueReader;

/// Kernel value reader backed by the host's `sysctl` interface.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysctlReader;

impl SysctlReader {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "macos")]
impl KernelValueReader for SysctlReader {
    fn read_named(&self, name: &str, buf: &mut [u8]) -> io::Result<usize> {
        let name = std::ffi::CString::new(name)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let mut len: libc::size_t = buf.len();
        // SAFETY: `name` is NUL-terminated, `buf` is valid for `len` bytes and
        // the kernel writes at most `len` bytes, reporting the count in `len`.
        let rc = unsafe {
            libc::sysctlbyname(
                name.as_ptr(),
                buf.as_mut_ptr().cast(),
                &mut len,
                std::ptr::null_mut(),
                0,
            )
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(len)
    }

    fn probe_mib(&self, mib: &[i32]) -> io::Result<usize> {
        let mut mib = mib.to_vec();
        let mut len: libc::size_t = 0;
        // SAFETY: a null `oldp` asks only for the required size.
        let rc = unsafe {
            libc::sysctl(
                mib.as_mut_ptr(),
                mib.len() as libc::c_uint,
                std::ptr::null_mut(),
                &mut len,
                std::ptr::null_mut(),
                0,
            )
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(len)
    }

    fn read_mib(&self, mib: &[i32], buf: &mut [u8]) -> io::Result<usize> {
        let mut mib = mib.to_vec();
        let mut len: libc::size_t = buf.len();
        // SAFETY: `buf` is valid for `len` bytes; the kernel writes at most
        // `len` bytes and stores the produced count in `len`.
        let rc = unsafe {
            libc::sysctl(
                mib.as_mut_ptr(),
                mib.len() as libc::c_uint,
                buf.as_mut_ptr().cast(),
                &mut len,
                std::ptr::null_mut(),
                0,
            )
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(len)
    }
}

#[cfg(not(target_os = "macos"))]
fn unsupported() -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        "sysctl counters are only available on macOS",
    )
}

#[cfg(not(target_os = "macos"))]
impl KernelValueReader for SysctlReader {
    fn read_named(&self, _name: &str, _buf: &mut [u8]) -> io::Result<usize> {
        Err(unsupported())
    }

    fn probe_mib(&self, _mib: &[i32]) -> io::Result<usize> {
        Err(unsupported())
    }

    fn read_mib(&self, _mib: &[i32], _buf: &mut [u8]) -> io::Result<usize> {
        Err(unsupported())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::families::bandwidth::IFLIST2_MIB;
    use crate::collector::families::loadavg::LOADAVG_NAME;
    use crate::collector::parser::LOADAVG_SIZE;

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn test_unsupported_off_macos() {
        let reader = SysctlReader::new();
        let err = reader.read_named(LOADAVG_NAME, &mut [0u8; 8]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
        assert!(reader.probe_mib(&IFLIST2_MIB).is_err());
        assert!(reader.read_fixed::<LOADAVG_SIZE>(LOADAVG_NAME).is_err());
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn test_reads_live_counters() {
        let reader = SysctlReader::new();
        assert!(reader.read_fixed::<LOADAVG_SIZE>(LOADAVG_NAME).is_ok());
        assert!(reader.probe_mib(&IFLIST2_MIB).unwrap() > 0);
    }
}
