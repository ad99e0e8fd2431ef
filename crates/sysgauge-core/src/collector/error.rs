//! Errors raised while querying and decoding kernel counters.

use std::io;

/// Error type for kernel counter queries.
///
/// Every variant is terminal for the family that produced it: the sampler
/// disables the family and never queries it again.
#[derive(Debug)]
pub enum QueryError {
    /// The kernel query itself failed (unsupported counter, permission denied, ...).
    QueryFailed { name: String, source: io::Error },
    /// The kernel produced a different number of bytes than expected.
    SizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    /// A record or value in the response is inconsistent with its container.
    MalformedRecord {
        name: String,
        offset: usize,
        detail: String,
    },
}

impl QueryError {
    pub(crate) fn failed(name: impl Into<String>, source: io::Error) -> Self {
        QueryError::QueryFailed {
            name: name.into(),
            source,
        }
    }

    pub(crate) fn malformed(name: impl Into<String>, offset: usize, detail: impl Into<String>) -> Self {
        QueryError::MalformedRecord {
            name: name.into(),
            offset,
            detail: detail.into(),
        }
    }

    /// Returns the kernel value name (or selector label) the error refers to.
    pub fn name(&self) -> &str {
        match self {
            QueryError::QueryFailed { name, .. }
            | QueryError::SizeMismatch { name, .. }
            | QueryError::MalformedRecord { name, .. } => name,
        }
    }
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::QueryFailed { name, source } => {
                write!(f, "sysctl({}) failed: {}", name, source)
            }
            QueryError::SizeMismatch {
                name,
                expected,
                actual,
            } => write!(
                f,
                "sysctl({}) expected {} bytes, got {}",
                name, expected, actual
            ),
            QueryError::MalformedRecord {
                name,
                offset,
                detail,
            } => write!(
                f,
                "sysctl({}) malformed record at offset {}: {}",
                name, offset, detail
            ),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::QueryFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_name_and_cause() {
        let err = QueryError::failed(
            "vm.loadavg",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("vm.loadavg"));
        assert!(msg.contains("denied"));
        assert_eq!(err.name(), "vm.loadavg");
    }

    #[test]
    fn test_size_mismatch_display() {
        let err = QueryError::SizeMismatch {
            name: "vm.swapusage".to_string(),
            expected: 32,
            actual: 16,
        };
        assert_eq!(err.to_string(), "sysctl(vm.swapusage) expected 32 bytes, got 16");
    }

    #[test]
    fn test_only_query_failed_has_source() {
        use std::error::Error;

        let failed = QueryError::failed("x", io::Error::other("boom"));
        assert!(failed.source().is_some());

        let malformed = QueryError::malformed("net interfaces", 12, "short record");
        assert!(malformed.source().is_none());
    }
}
