//! # Scan Target Model
//!
//! Defines what the user asked to scan.
//!
//! A target can be:
//! * The local LAN, detected automatically (`auto`, `lan` or no argument at all).
//! * A /24 given by its prefix (`192.168.1`) or in CIDR form (`192.168.1.0/24`).
//! * A single host (`192.168.1.20`).

use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::TargetParseError;
use crate::network::interface;
use crate::network::range::{self, Prefix};
use crate::{info, warn};

/// The only network width the scanner enumerates.
pub const SUPPORTED_WIDTH: u8 = 24;

/// Represents a distinct target to be scanned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Target {
    /// Detect the local /24 and scan it.
    #[default]
    Auto,
    /// Scan every host of an explicit /24.
    Subnet(Prefix),
    /// Probe exactly one address.
    Host(Ipv4Addr),
}

impl FromStr for Target {
    type Err = TargetParseError;

    /// Parses a string into a `Target`.
    ///
    /// Supported formats:
    /// * **Keywords**: "auto", "lan" (case-insensitive).
    /// * **Prefix**: three dotted octets (e.g., "10.0.0").
    /// * **CIDR**: "Network/24" (e.g., "10.0.0.0/24").
    /// * **Host**: a single IPv4 address (e.g., "10.0.0.5").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(target) = parse_keyword(&s.to_ascii_lowercase()) {
            return Ok(target);
        }

        if let Some(target) = parse_cidr(s)? {
            return Ok(target);
        }

        if let Ok(addr) = s.parse::<Ipv4Addr>() {
            return Ok(Target::Host(addr));
        }

        match s.split('.').count() {
            3 => Ok(Target::Subnet(s.parse::<Prefix>()?)),
            _ => Err(TargetParseError::Unrecognised(s.to_string())),
        }
    }
}

/// Turns a target into the concrete list of addresses to probe.
///
/// `Auto` falls back to `fallback` when the local subnet cannot be detected.
pub fn resolve(target: Target, fallback: Prefix) -> Vec<Ipv4Addr> {
    match target {
        Target::Auto => {
            let prefix: Prefix = match interface::detect_local_subnet() {
                Ok(prefix) => {
                    info!("Detected local subnet {prefix}.0/24");
                    prefix
                }
                Err(e) => {
                    warn!("Could not detect local subnet ({e}), falling back to {fallback}.0/24");
                    fallback
                }
            };
            range::enumerate(prefix).iter().collect()
        }
        Target::Subnet(prefix) => range::enumerate(prefix).iter().collect(),
        Target::Host(addr) => vec![addr],
    }
}

fn parse_keyword(s_lower: &str) -> Option<Target> {
    match s_lower {
        "auto" | "lan" => Some(Target::Auto),
        _ => None,
    }
}

/// Parses CIDR notation; only /24 networks are accepted.
fn parse_cidr(s: &str) -> Result<Option<Target>, TargetParseError> {
    let Some((ip_str, width_str)) = s.split_once('/') else {
        return Ok(None);
    };

    let addr = ip_str
        .parse::<Ipv4Addr>()
        .map_err(|_| TargetParseError::InvalidAddress(ip_str.to_string()))?;

    let width = width_str
        .parse::<u8>()
        .map_err(|_| TargetParseError::Unrecognised(s.to_string()))?;

    if width != SUPPORTED_WIDTH {
        return Err(TargetParseError::UnsupportedWidth(width));
    }

    Ok(Some(Target::Subnet(Prefix::from(addr))))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_full_parsing() {
        // Keywords (case-insensitive)
        assert_eq!(Target::from_str("lan"), Ok(Target::Auto));
        assert_eq!(Target::from_str("AUTO"), Ok(Target::Auto));

        // Prefix
        assert_eq!(
            Target::from_str("10.0.0"),
            Ok(Target::Subnet(Prefix::new(10, 0, 0)))
        );

        // CIDR
        assert_eq!(
            Target::from_str("192.168.3.0/24"),
            Ok(Target::Subnet(Prefix::new(192, 168, 3)))
        );

        // Host
        assert_eq!(
            Target::from_str("10.0.0.5"),
            Ok(Target::Host(Ipv4Addr::new(10, 0, 0, 5)))
        );

        // Invalid
        assert_eq!(
            Target::from_str("10.0.0.0/16"),
            Err(TargetParseError::UnsupportedWidth(16))
        );
        assert!(Target::from_str("not-an-ip").is_err());
        assert!(Target::from_str("10.0.300").is_err());
        assert!(Target::from_str("10.0.0.0/abc").is_err());
        assert!(Target::from_str("10.0").is_err());
    }

    #[test]
    fn resolve_explicit_subnet() {
        let addrs = resolve(Target::Subnet(Prefix::new(10, 0, 0)), Prefix::new(1, 1, 1));
        assert_eq!(addrs.len(), 254);
        assert!(addrs.iter().all(|ip| Prefix::new(10, 0, 0).contains(*ip)));
    }

    #[test]
    fn resolve_single_host() {
        let addr = Ipv4Addr::new(172, 16, 0, 9);
        assert_eq!(resolve(Target::Host(addr), Prefix::new(1, 1, 1)), vec![addr]);
    }

    #[test]
    fn resolve_auto_always_yields_a_full_subnet() {
        let addrs = resolve(Target::Auto, Prefix::new(192, 168, 1));
        assert_eq!(addrs.len(), 254);
    }
}
