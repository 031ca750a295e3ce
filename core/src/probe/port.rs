use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use lanscout_common::config::PortSettings;
use lanscout_common::network::device::{Device, DeviceKind, ProbeResult};
use tracing::trace;

use super::Prober;
use crate::network::tcp::{self, Connector, TcpConnector};

/// Tries a fixed, ordered list of ports and stops at the first one that
/// accepts a connection. No payload is exchanged.
pub struct PortProbe<C = TcpConnector> {
    ports: Vec<u16>,
    per_port_timeout: Duration,
    kind: DeviceKind,
    connector: C,
}

impl PortProbe {
    /// Printer sweep over raw print, LPD and IPP (or whatever `settings` lists).
    pub fn printers(settings: &PortSettings) -> Self {
        Self::with_connector(settings, DeviceKind::Printer, TcpConnector)
    }
}

impl<C: Connector> PortProbe<C> {
    pub fn with_connector(settings: &PortSettings, kind: DeviceKind, connector: C) -> Self {
        Self {
            ports: settings.ports.clone(),
            per_port_timeout: settings.per_port_timeout,
            kind,
            connector,
        }
    }
}

#[async_trait]
impl<C: Connector> Prober for PortProbe<C> {
    async fn probe(&self, addr: Ipv4Addr) -> ProbeResult {
        for &port in &self.ports {
            let socket = SocketAddr::new(IpAddr::V4(addr), port);
            match tcp::connect_within(&self.connector, socket, self.per_port_timeout).await {
                Ok(()) => return ProbeResult::Matched(Device::open_port(addr, self.kind, port)),
                Err(e) => trace!("{socket}: {e}"),
            }
        }
        ProbeResult::NoMatch
    }

    fn kind(&self) -> DeviceKind {
        self.kind
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
