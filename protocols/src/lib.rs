//! Wire-level helpers used by the probes: HTTP Digest authentication,
//! device-info document parsing and the printer port table.

pub mod device_info;
pub mod digest;
pub mod printer;
