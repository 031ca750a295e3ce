//! # Address Space
//!
//! A scan covers one /24 worth of hosts. The network is named by its first
//! three octets (the [`Prefix`]) and the candidate hosts are `.1` through
//! `.254`; the network (`.0`) and broadcast (`.255`) forms are never probed.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TargetParseError;

/// First host octet handed out by [`enumerate`].
pub const FIRST_HOST: u8 = 1;
/// Last host octet handed out by [`enumerate`].
pub const LAST_HOST: u8 = 254;

/// The network-significant part of a /24, e.g. `192.168.1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Prefix([u8; 3]);

impl Prefix {
    pub const fn new(a: u8, b: u8, c: u8) -> Self {
        Self([a, b, c])
    }

    /// Builds the host address `prefix.host`.
    pub fn host(&self, host: u8) -> Ipv4Addr {
        let [a, b, c] = self.0;
        Ipv4Addr::new(a, b, c, host)
    }

    /// `true` when `addr` lives in this /24.
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        addr.octets()[..3] == self.0
    }
}

impl From<Ipv4Addr> for Prefix {
    fn from(addr: Ipv4Addr) -> Self {
        let [a, b, c, _] = addr.octets();
        Self([a, b, c])
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "{a}.{b}.{c}")
    }
}

impl FromStr for Prefix {
    type Err = TargetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let octets: Vec<u8> = s
            .trim()
            .split('.')
            .map(|octet| octet.parse::<u8>())
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|_| TargetParseError::InvalidPrefix(s.to_string()))?;

        match octets.as_slice() {
            [a, b, c] => Ok(Self::new(*a, *b, *c)),
            _ => Err(TargetParseError::InvalidPrefix(s.to_string())),
        }
    }
}

/// Inclusive run of host addresses inside one prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostRange {
    pub prefix: Prefix,
    pub first: u8,
    pub last: u8,
}

impl HostRange {
    pub fn new(prefix: Prefix, first: u8, last: u8) -> Self {
        Self {
            prefix,
            first,
            last,
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Ipv4Addr> + Clone + use<> {
        let prefix: Prefix = self.prefix;
        (self.first..=self.last).map(move |host| prefix.host(host))
    }

    pub fn len(&self) -> usize {
        if self.last < self.first {
            0
        } else {
            usize::from(self.last - self.first) + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Every candidate host of `prefix`: `prefix.1 ..= prefix.254`.
///
/// A pure function of the prefix; calling it again restarts the sequence.
pub fn enumerate(prefix: Prefix) -> HostRange {
    HostRange::new(prefix, FIRST_HOST, LAST_HOST)
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
    fn enumerate_yields_every_host_but_network_and_broadcast() {
        for prefix in [
            Prefix::new(10, 0, 0),
            Prefix::new(192, 168, 1),
            Prefix::new(0, 0, 0),
            Prefix::new(255, 255, 255),
        ] {
            let hosts: Vec<Ipv4Addr> = enumerate(prefix).iter().collect();

            assert_eq!(hosts.len(), 254);
            assert!(hosts.iter().all(|ip| prefix.contains(*ip)));
            assert!(hosts.iter().all(|ip| ip.octets()[3] != 0 && ip.octets()[3] != 255));
            assert_eq!(hosts.first(), Some(&prefix.host(1)));
            assert_eq!(hosts.last(), Some(&prefix.host(254)));
        }
    }

    #[test]
    fn enumerate_is_restartable() {
        let prefix = Prefix::new(172, 16, 4);
        let first: Vec<Ipv4Addr> = enumerate(prefix).iter().collect();
        let second: Vec<Ipv4Addr> = enumerate(prefix).iter().collect();
        assert_eq!(first, second);
        assert_eq!(enumerate(prefix).len(), 254);
    }

    #[test]
    fn prefix_parsing() {
        assert_eq!("10.0.0".parse::<Prefix>(), Ok(Prefix::new(10, 0, 0)));
        assert_eq!(" 192.168.20 ".parse::<Prefix>(), Ok(Prefix::new(192, 168, 20)));
        assert!("10.0".parse::<Prefix>().is_err());
        assert!("10.0.0.1".parse::<Prefix>().is_err());
        assert!("10.0.256".parse::<Prefix>().is_err());
        assert!("".parse::<Prefix>().is_err());
    }

    #[test]
    fn prefix_display_round_trips_through_host() {
        let prefix: Prefix = Prefix::from(Ipv4Addr::new(192, 168, 7, 42));
        assert_eq!(prefix.to_string(), "192.168.7");
        assert_eq!(prefix.host(9), Ipv4Addr::new(192, 168, 7, 9));
    }

    #[test]
    fn empty_host_range() {
        let range = HostRange::new(Prefix::new(10, 0, 0), 9, 3);
        assert!(range.is_empty());
        assert_eq!(range.iter().count(), 0);
    }
}
