//! Well-known printer service ports.

/// Raw socket printing (AppSocket / JetDirect).
pub const RAW: u16 = 9100;
/// Line Printer Daemon.
pub const LPD: u16 = 515;
/// Internet Printing Protocol.
pub const IPP: u16 = 631;

/// Probe order: the port most printers expose comes first.
pub const PRIORITY: [u16; 3] = [RAW, LPD, IPP];

/// Short service name for a printer port, if it is a known one.
pub fn service_name(port: u16) -> Option<&'static str> {
    match port {
        RAW => Some("raw"),
        LPD => Some("lpd"),
        IPP => Some("ipp"),
        _ => None,
    }
}
