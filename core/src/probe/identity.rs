use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use async_trait::async_trait;
use lanscout_common::config::IdentitySettings;
use lanscout_common::network::device::{Device, DeviceKind, ProbeResult};
use lanscout_protocols::{device_info, digest};
use reqwest::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::{Client, Response, StatusCode};
use tokio::time::timeout;
use tracing::{debug, trace};

use super::{ProbeError, Prober};
use crate::network::tcp::{self, Connector, TcpConnector};

/// Identifies access-control terminals through their device-info endpoint.
///
/// 1. A bare TCP connect with a short deadline weeds out empty addresses.
/// 2. One GET to the device-info path, answered with HTTP Digest credentials
///    when the device challenges it, all within the request deadline.
/// 3. A `200` carrying a `<DeviceInfo>` document is a match.
pub struct IdentityProbe<C = TcpConnector> {
    settings: IdentitySettings,
    client: Client,
    connector: C,
}

impl IdentityProbe {
    pub fn new(settings: IdentitySettings) -> Result<Self, ProbeError> {
        Self::with_connector(settings, TcpConnector)
    }
}

impl<C: Connector> IdentityProbe<C> {
    pub fn with_connector(settings: IdentitySettings, connector: C) -> Result<Self, ProbeError> {
        // Terminals are always asked directly, never through HTTP(S)_PROXY.
        let client: Client = Client::builder()
            .no_proxy()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self {
            settings,
            client,
            connector,
        })
    }

    async fn identify(&self, addr: Ipv4Addr) -> Result<Device, ProbeError> {
        let socket = SocketAddr::new(IpAddr::V4(addr), self.settings.port);
        tcp::connect_within(&self.connector, socket, self.settings.connect_timeout).await?;

        let deadline = self.settings.request_timeout;
        let body: String = timeout(deadline, self.fetch_device_info(socket))
            .await
            .map_err(|_| ProbeError::Timeout(deadline))??;

        let identity = device_info::parse(&body)?;
        Ok(Device::identified(addr, identity, body))
    }

    async fn fetch_device_info(&self, socket: SocketAddr) -> Result<String, ProbeError> {
        let path: &str = &self.settings.path;
        let url: String = format!("http://{socket}{path}");

        let response: Response = self.client.get(&url).send().await?;
        let response: Response = match response.status() {
            StatusCode::OK => response,
            StatusCode::UNAUTHORIZED => {
                let challenge = digest::find_challenge(
                    response
                        .headers()
                        .get_all(WWW_AUTHENTICATE)
                        .iter()
                        .filter_map(|value| value.to_str().ok()),
                )?;
                let credentials = &self.settings.credentials;
                let authorization: String =
                    challenge.respond("GET", path, &credentials.username, credentials.password());

                self.client
                    .get(&url)
                    .header(AUTHORIZATION, authorization)
                    .send()
                    .await?
            }
            status => return Err(ProbeError::UnexpectedStatus(status.as_u16())),
        };

        match response.status() {
            StatusCode::OK => Ok(response.text().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ProbeError::Unauthorized),
            status => Err(ProbeError::UnexpectedStatus(status.as_u16())),
        }
    }
}

#[async_trait]
impl<C: Connector> Prober for IdentityProbe<C> {
    async fn probe(&self, addr: Ipv4Addr) -> ProbeResult {
        match self.identify(addr).await {
            Ok(device) => ProbeResult::Matched(device),
            Err(e) if e.is_unreachable() => {
                trace!("{addr}: {e}");
                ProbeResult::NoMatch
            }
            Err(e) => {
                debug!("{addr} answered but is not a terminal: {e}");
                ProbeResult::NoMatch
            }
        }
    }

    fn kind(&self) -> DeviceKind {
        DeviceKind::AccessTerminal
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
