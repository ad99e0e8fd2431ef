//! Pre-built mock kernel scenarios and payload encoders for testing.
//!
//! The encoders produce byte layouts identical to what the macOS kernel
//! returns, so the same decoders run against mocks and real hosts.

use super::kernel::MockKernel;
use crate::collector::families::bandwidth::IFLIST2_MIB;
use crate::collector::families::loadavg::LOADAVG_NAME;
use crate::collector::families::swap::SWAPUSAGE_NAME;
use crate::collector::parser::{
    IF_MSGHDR2_SIZE, IFI_IBYTES_OFFSET, IFI_OBYTES_OFFSET, IFM_MSGLEN_OFFSET, IFM_TYPE_OFFSET,
    LOADAVG_FSCALE_OFFSET, LOADAVG_SIZE, RTM_IFINFO2, XSW_USAGE_SIZE,
};

/// `FSCALE` on macOS (`1 << FSHIFT`, `FSHIFT` = 11).
pub const MACOS_FSCALE: i64 = 1 << 11;

/// Routing message version written into every record header.
const RTM_VERSION: u8 = 5;
/// Address record type that follows each interface record in real responses.
pub const RTM_NEWADDR: u8 = 0x0c;
/// Multicast address record type.
pub const RTM_NEWMADDR2: u8 = 0x13;

/// Encodes a `struct loadavg`.
pub fn encode_loadavg(ldavg: [u32; 3], fscale: i64) -> [u8; LOADAVG_SIZE] {
    let mut raw = [0u8; LOADAVG_SIZE];
    for (i, value) in ldavg.iter().enumerate() {
        raw[i * 4..i * 4 + 4].copy_from_slice(&value.to_ne_bytes());
    }
    raw[LOADAVG_FSCALE_OFFSET..LOADAVG_FSCALE_OFFSET + 8].copy_from_slice(&fscale.to_ne_bytes());
    raw
}

/// Encodes a `struct xsw_usage` with a 4 KiB page size, unencrypted.
pub fn encode_swap_usage(total: u64, avail: u64, used: u64) -> [u8; XSW_USAGE_SIZE] {
    let mut raw = [0u8; XSW_USAGE_SIZE];
    raw[0..8].copy_from_slice(&total.to_ne_bytes());
    raw[8..16].copy_from_slice(&avail.to_ne_bytes());
    raw[16..24].copy_from_slice(&used.to_ne_bytes());
    raw[24..28].copy_from_slice(&4096u32.to_ne_bytes());
    raw
}

/// Encodes one `RTM_IFINFO2` record carrying the given byte counters.
pub fn interface_record(ibytes: u64, obytes: u64) -> Vec<u8> {
    let mut record = vec![0u8; IF_MSGHDR2_SIZE];
    write_header(&mut record, RTM_IFINFO2);
    record[IFI_IBYTES_OFFSET..IFI_IBYTES_OFFSET + 8].copy_from_slice(&ibytes.to_ne_bytes());
    record[IFI_OBYTES_OFFSET..IFI_OBYTES_OFFSET + 8].copy_from_slice(&obytes.to_ne_bytes());
    record
}

/// Encodes a record of type `ty` and total length `len` (at least 4).
///
/// The payload is filled with `0xff` so a decoder that misreads it as an
/// interface record would pick up implausibly large counters.
pub fn other_record(ty: u8, len: usize) -> Vec<u8> {
    let mut record = vec![0xffu8; len.max(4)];
    write_header(&mut record, ty);
    record
}

fn write_header(record: &mut [u8], ty: u8) {
    let len = record.len() as u16;
    record[IFM_MSGLEN_OFFSET..IFM_MSGLEN_OFFSET + 2].copy_from_slice(&len.to_ne_bytes());
    record[2] = RTM_VERSION;
    record[IFM_TYPE_OFFSET] = ty;
}

impl MockKernel {
    /// Creates a healthy host.
    ///
    /// - load average 1.550 / 1.300 / 1.050
    /// - swap: 2 GiB total, 1.25 GiB free, 0.75 GiB used
    /// - three interfaces (lo0, en0, utun0), each followed by address
    ///   records: 12 846 678 bytes received, 2 847 678 bytes sent in total
    pub fn typical_host() -> Self {
        let kernel = Self::new();

        kernel.set_named(
            LOADAVG_NAME,
            encode_loadavg([3174, 2662, 2150], MACOS_FSCALE).to_vec(),
        );
        kernel.set_named(
            SWAPUSAGE_NAME,
            encode_swap_usage(2 << 30, 5 << 28, 3 << 28).to_vec(),
        );

        let mut iflist = Vec::new();
        // lo0
        iflist.extend(interface_record(500_000, 500_000));
        iflist.extend(other_record(RTM_NEWADDR, 20));
        iflist.extend(other_record(RTM_NEWADDR, 36));
        // en0
        iflist.extend(interface_record(12_345_678, 2_345_678));
        iflist.extend(other_record(RTM_NEWADDR, 36));
        iflist.extend(other_record(RTM_NEWMADDR2, 44));
        // utun0
        iflist.extend(interface_record(1_000, 2_000));
        iflist.extend(other_record(RTM_NEWADDR, 28));
        kernel.set_mib(&IFLIST2_MIB, iflist);

        kernel
    }

    /// Host where the swap counter is missing (e.g. a sandboxed process).
    pub fn host_without_swap() -> Self {
        let kernel = Self::typical_host();
        kernel.fail_named(SWAPUSAGE_NAME);
        kernel
    }

    /// Host whose interface list contains a record running past the end of
    /// the response.
    pub fn host_with_corrupt_iflist() -> Self {
        let kernel = Self::typical_host();
        let mut iflist = interface_record(1, 2);
        let mut overrun = other_record(RTM_NEWADDR, 32);
        overrun[IFM_MSGLEN_OFFSET..IFM_MSGLEN_OFFSET + 2].copy_from_slice(&512u16.to_ne_bytes());
        iflist.extend(overrun);
        kernel.set_mib(&IFLIST2_MIB, iflist);
        kernel
    }
}
