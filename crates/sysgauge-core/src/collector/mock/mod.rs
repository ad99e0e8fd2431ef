//! Mock kernel for testing on non-macOS platforms.

mod kernel;
mod scenarios;

pub use kernel::MockKernel;
pub use scenarios::{
    MACOS_FSCALE, RTM_NEWADDR, RTM_NEWMADDR2, encode_loadavg, encode_swap_usage,
    interface_record, other_record,
};
