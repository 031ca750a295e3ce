//! # Device Models
//!
//! What a probe reports back for a single address, and what a confirmed
//! device looks like once it leaves the scanner.

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

/// Placeholder for identity fields a device did not report.
pub const UNKNOWN: &str = "Unknown";

/// The class of appliance a scan is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Access-control terminal with an HTTP digest-auth management API.
    AccessTerminal,
    /// Network printer listening on raw, LPD or IPP ports.
    Printer,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::AccessTerminal => write!(f, "access terminal"),
            DeviceKind::Printer => write!(f, "printer"),
        }
    }
}

/// Model and name reported by a device-info endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub model: String,
    pub name: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            model: UNKNOWN.to_string(),
            name: UNKNOWN.to_string(),
        }
    }
}

/// Evidence attached to a confirmed device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum Evidence {
    /// The device answered the authenticated device-info request.
    Identity {
        identity: Identity,
        /// Raw response body, kept for audit sinks.
        body: String,
    },
    /// A TCP connection was accepted on this port.
    OpenPort { port: u16 },
}

/// A confirmed match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub addr: Ipv4Addr,
    pub kind: DeviceKind,
    pub evidence: Evidence,
}

impl Device {
    pub fn identified(addr: Ipv4Addr, identity: Identity, body: String) -> Self {
        Self {
            addr,
            kind: DeviceKind::AccessTerminal,
            evidence: Evidence::Identity { identity, body },
        }
    }

    pub fn open_port(addr: Ipv4Addr, kind: DeviceKind, port: u16) -> Self {
        Self {
            addr,
            kind,
            evidence: Evidence::OpenPort { port },
        }
    }
}

/// Outcome of probing one address. Produced exactly once per address per scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Matched(Device),
    NoMatch,
}

impl ProbeResult {
    pub fn into_device(self) -> Option<Device> {
        match self {
            ProbeResult::Matched(device) => Some(device),
            ProbeResult::NoMatch => None,
        }
    }
}
