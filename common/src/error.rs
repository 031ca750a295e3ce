use std::io;
use std::net::IpAddr;

use thiserror::Error;

/// The local subnet could not be worked out.
///
/// Recoverable: callers fall back to an explicit or configured prefix.
#[derive(Debug, Error)]
pub enum SubnetDetectionError {
    #[error("no route towards an external address: {0}")]
    NoRoute(#[source] io::Error),

    #[error("local endpoint {0} is not a usable IPv4 address")]
    UnusableAddress(IpAddr),

    #[error("no interface with a private IPv4 address is up")]
    NoInterface,
}

/// A scan target string that could not be understood.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetParseError {
    #[error("invalid prefix '{0}': expected three dotted octets such as 192.168.1")]
    InvalidPrefix(String),

    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    #[error("unsupported network width /{0}: only /24 subnets can be scanned")]
    UnsupportedWidth(u8),

    #[error("invalid target: {0}")]
    Unrecognised(String),
}
