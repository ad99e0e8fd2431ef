//! Decoders for raw `sysctl` payloads.
//!
//! These are pure functions over byte slices, laid out the way the macOS
//! kernel writes them on 64-bit hosts (native byte order). They are designed
//! to be easily testable with hand-built buffers.

/// Error type for decoding failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Byte offset of the offending record or field.
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(offset: usize, msg: impl Into<String>) -> Self {
        Self {
            offset,
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error at offset {}: {}", self.offset, self.message)
    }
}

impl std::error::Error for ParseError {}

// struct loadavg { fixpt_t ldavg[3]; long fscale; }
pub const LOADAVG_SIZE: usize = 24;
pub(crate) const LOADAVG_FSCALE_OFFSET: usize = 16;

// struct xsw_usage { u64 total; u64 avail; u64 used; u32 pagesize; boolean_t encrypted; }
pub const XSW_USAGE_SIZE: usize = 32;

// struct if_msghdr2 header fields.
pub(crate) const IFM_MSGLEN_OFFSET: usize = 0;
pub(crate) const IFM_TYPE_OFFSET: usize = 3;
pub(crate) const IFM_HEADER_LEN: usize = 4;
// ifm_data (struct if_data64, 4-byte packed) starts after the fixed header.
pub(crate) const IFM_DATA_OFFSET: usize = 32;
pub(crate) const IFI_IBYTES_OFFSET: usize = IFM_DATA_OFFSET + 64;
pub(crate) const IFI_OBYTES_OFFSET: usize = IFM_DATA_OFFSET + 72;
/// Size of a complete `if_msghdr2` record.
pub const IF_MSGHDR2_SIZE: usize = 160;
/// Shortest interface record that still carries both byte counters.
pub(crate) const IFINFO2_MIN_LEN: usize = IFI_OBYTES_OFFSET + 8;

/// Routing message type of extended interface info records.
pub const RTM_IFINFO2: u8 = 0x12;

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_ne_bytes([data[offset], data[offset + 1]])
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&data[offset..offset + 4]);
    u32::from_ne_bytes(raw)
}

fn read_u64(data: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&data[offset..offset + 8]);
    u64::from_ne_bytes(raw)
}

/// Decoded `vm.loadavg`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadAvg {
    /// Fixed-point 1, 5 and 15 minute load figures.
    pub ldavg: [u32; 3],
    /// Kernel scale factor (`FSCALE`).
    pub fscale: i64,
}

impl LoadAvg {
    /// Load figures in thousandths: `round(raw / fscale * 1000)`.
    pub fn thousandths(&self) -> [i64; 3] {
        self.ldavg.map(|raw| fixed_to_thousandths(raw, self.fscale))
    }
}

/// Converts one fixed-point load figure to thousandths.
///
/// `fscale` must be positive; `parse_loadavg` guarantees that for decoded values.
pub fn fixed_to_thousandths(raw: u32, fscale: i64) -> i64 {
    (raw as f64 / fscale as f64 * 1000.0).round() as i64
}

/// Parses a `struct loadavg` payload.
pub fn parse_loadavg(raw: &[u8; LOADAVG_SIZE]) -> Result<LoadAvg, ParseError> {
    let ldavg = [read_u32(raw, 0), read_u32(raw, 4), read_u32(raw, 8)];
    let fscale = read_u64(raw, LOADAVG_FSCALE_OFFSET) as i64;
    if fscale <= 0 {
        return Err(ParseError::new(
            LOADAVG_FSCALE_OFFSET,
            format!("invalid load average scale {}", fscale),
        ));
    }
    Ok(LoadAvg { ldavg, fscale })
}

/// Decoded `vm.swapusage`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SwapUsage {
    pub total: u64,
    pub avail: u64,
    pub used: u64,
    pub pagesize: u32,
    pub encrypted: bool,
}

/// Parses a `struct xsw_usage` payload.
pub fn parse_swap_usage(raw: &[u8; XSW_USAGE_SIZE]) -> SwapUsage {
    SwapUsage {
        total: read_u64(raw, 0),
        avail: read_u64(raw, 8),
        used: read_u64(raw, 16),
        pagesize: read_u32(raw, 24),
        encrypted: read_u32(raw, 28) != 0,
    }
}

/// Byte counters summed over every interface record of one response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterfaceTotals {
    pub ibytes: u64,
    pub obytes: u64,
    /// Number of interface records that contributed.
    pub interfaces: usize,
}

/// Walks a `NET_RT_IFLIST2` response and sums the byte counters of every
/// `RTM_IFINFO2` record.
///
/// The response is a sequence of routing messages, each starting with its own
/// length and type. Records of other types (interface addresses, multicast
/// entries) are skipped by length without looking at their payload.
///
/// # Errors
/// A record whose header does not fit, whose length is shorter than its
/// header, or which extends past the end of `data` is rejected. So is an
/// interface record too short to hold its counters.
pub fn parse_interface_totals(data: &[u8]) -> Result<InterfaceTotals, ParseError> {
    let mut totals = InterfaceTotals::default();
    let mut offset = 0;

    while offset < data.len() {
        let remaining = data.len() - offset;
        if remaining < IFM_HEADER_LEN {
            return Err(ParseError::new(
                offset,
                format!("truncated record header ({} bytes left)", remaining),
            ));
        }

        let msglen = read_u16(data, offset + IFM_MSGLEN_OFFSET) as usize;
        if msglen < IFM_HEADER_LEN {
            return Err(ParseError::new(
                offset,
                format!("record length {} shorter than its header", msglen),
            ));
        }
        if msglen > remaining {
            return Err(ParseError::new(
                offset,
                format!(
                    "record length {} exceeds buffer ({} bytes left)",
                    msglen, remaining
                ),
            ));
        }

        let record = &data[offset..offset + msglen];
        if record[IFM_TYPE_OFFSET] == RTM_IFINFO2 {
            if msglen < IFINFO2_MIN_LEN {
                return Err(ParseError::new(
                    offset,
                    format!("interface record too short ({} bytes)", msglen),
                ));
            }
            totals.ibytes = totals
                .ibytes
                .wrapping_add(read_u64(record, IFI_IBYTES_OFFSET));
            totals.obytes = totals
                .obytes
                .wrapping_add(read_u64(record, IFI_OBYTES_OFFSET));
            totals.interfaces += 1;
        }

        offset += msglen;
    }

    Ok(totals)
}
