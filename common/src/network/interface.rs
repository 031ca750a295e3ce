//! Local subnet detection.
//!
//! The primary strategy asks the OS which local endpoint it would use to reach
//! a public address: a connectionless socket is "connected" towards it, which
//! performs route selection without sending a single packet. When that fails
//! (no default route, offline lab network) the interfaces are inspected
//! directly instead.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::IpNetwork;
use tracing::debug;

use crate::error::SubnetDetectionError;
use crate::network::range::Prefix;

/// Route probe destination. Nothing is ever sent to it.
pub const ROUTE_PROBE_ADDR: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 80);

/// Works out the /24 this machine sits in.
pub fn detect_local_subnet() -> Result<Prefix, SubnetDetectionError> {
    match local_ip_via_route(ROUTE_PROBE_ADDR) {
        Ok(ip) => Ok(Prefix::from(ip)),
        Err(route_err) => {
            debug!("route-based detection failed ({route_err}), inspecting interfaces");
            select_lan_address(&datalink::interfaces())
                .map(Prefix::from)
                .ok_or(route_err)
        }
    }
}

/// Local IPv4 address the OS picks for traffic towards `destination`.
pub fn local_ip_via_route(destination: SocketAddr) -> Result<Ipv4Addr, SubnetDetectionError> {
    let socket = UdpSocket::bind(("0.0.0.0", 0)).map_err(SubnetDetectionError::NoRoute)?;
    socket
        .connect(destination)
        .map_err(SubnetDetectionError::NoRoute)?;
    let local: SocketAddr = socket.local_addr().map_err(SubnetDetectionError::NoRoute)?;

    match local.ip() {
        IpAddr::V4(ipv4) if is_usable(&ipv4) => Ok(ipv4),
        other => Err(SubnetDetectionError::UnusableAddress(other)),
    }
}

/// First private IPv4 address on an interface that is up and not loopback.
pub fn select_lan_address(interfaces: &[NetworkInterface]) -> Option<Ipv4Addr> {
    interfaces
        .iter()
        .filter(|intf| intf.is_up() && !intf.is_loopback())
        .flat_map(|intf| intf.ips.iter())
        .find_map(|net| match net {
            IpNetwork::V4(v4) if v4.ip().is_private() && is_usable(&v4.ip()) => Some(v4.ip()),
            _ => None,
        })
}

fn is_usable(ip: &Ipv4Addr) -> bool {
    !ip.is_loopback() && !ip.is_unspecified() && !ip.is_link_local()
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
    use pnet::datalink::MacAddr;
    use pnet::ipnetwork::{Ipv4Network, Ipv6Network};

    const IFF_UP: u32 = 1;
    const IFF_LOOPBACK: u32 = 1 << 3;

    fn ni(name: &str, ips: &[IpNetwork], flags: u32) -> NetworkInterface {
        NetworkInterface {
            name: name.into(),
            description: "".into(),
            index: 1,
            mac: Some(MacAddr::new(0, 1, 2, 3, 4, 5)),
            ips: ips.to_vec(),
            flags,
        }
    }

    fn v4(a: u8, b: u8, c: u8, d: u8, p: u8) -> IpNetwork {
        IpNetwork::V4(Ipv4Network::new(Ipv4Addr::new(a, b, c, d), p).unwrap())
    }

    fn v6(s: &str, p: u8) -> IpNetwork {
        IpNetwork::V6(Ipv6Network::new(s.parse().unwrap(), p).unwrap())
    }

    #[test]
    fn skips_loopback_and_down_interfaces() {
        let interfaces = vec![
            ni("lo", &[v4(127, 0, 0, 1, 8)], IFF_UP | IFF_LOOPBACK),
            ni("eth0", &[v4(10, 1, 2, 3, 24)], 0),
            ni("wlan0", &[v6("fe80::1", 64), v4(192, 168, 50, 7, 24)], IFF_UP),
        ];

        assert_eq!(
            select_lan_address(&interfaces),
            Some(Ipv4Addr::new(192, 168, 50, 7))
        );
    }

    #[test]
    fn ignores_public_addresses() {
        let interfaces = vec![ni("eth0", &[v4(8, 8, 4, 4, 24)], IFF_UP)];
        assert_eq!(select_lan_address(&interfaces), None);
    }

    #[test]
    fn nothing_to_select_from() {
        assert_eq!(select_lan_address(&[]), None);
    }

    #[test]
    fn loopback_route_is_rejected() {
        let destination = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 9);
        let result = local_ip_via_route(destination);
        assert!(matches!(
            result,
            Err(SubnetDetectionError::UnusableAddress(_))
        ));
    }
}
