//! Reusable grow-only byte buffer for variable-length kernel responses.

/// Byte buffer retained across ticks.
///
/// Capacity only grows: when the kernel reports the same (or a smaller)
/// response size on the next tick, the existing allocation is reused.
/// Content is overwritten by every fetch.
#[derive(Debug, Default)]
pub struct GrowableBuffer {
    data: Vec<u8>,
}

impl GrowableBuffer {
    /// Creates an empty buffer. No allocation happens until the first `reserve`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure at least `size` bytes are addressable and returns them.
    ///
    /// Grows (zero-filled) when the current length is smaller than `size`,
    /// never shrinks.
    pub fn reserve(&mut self, size: usize) -> &mut [u8] {
        if self.data.len() < size {
            self.data.resize(size, 0);
        }
        &mut self.data[..size]
    }

    /// Number of bytes currently addressable.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read-only view of the first `size` bytes (clamped to the buffer length).
    pub fn filled(&self, size: usize) -> &[u8] {
        &self.data[..size.min(self.data.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let buf = GrowableBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn test_reserve_grows_to_requested_size() {
        let mut buf = GrowableBuffer::new();
        let slice = buf.reserve(128);
        assert_eq!(slice.len(), 128);
        assert_eq!(buf.len(), 128);
    }

    #[test]
    fn test_never_shrinks() {
        let mut buf = GrowableBuffer::new();
        buf.reserve(512);
        let slice = buf.reserve(64);
        assert_eq!(slice.len(), 64);
        assert_eq!(buf.len(), 512);

        buf.reserve(0);
        assert_eq!(buf.len(), 512);
    }

    #[test]
    fn test_reuses_allocation_when_size_is_stable() {
        let mut buf = GrowableBuffer::new();
        let first = buf.reserve(256).as_ptr();
        let second = buf.reserve(256).as_ptr();
        assert_eq!(first, second);
    }

    #[test]
    fn test_content_overwritten_in_place() {
        let mut buf = GrowableBuffer::new();
        buf.reserve(4).copy_from_slice(&[1, 2, 3, 4]);
        buf.reserve(2).copy_from_slice(&[9, 9]);
        assert_eq!(buf.filled(4), &[9, 9, 3, 4]);
    }

    #[test]
    fn test_filled_clamps_to_length() {
        let mut buf = GrowableBuffer::new();
        buf.reserve(8);
        assert_eq!(buf.filled(100).len(), 8);
    }
}
