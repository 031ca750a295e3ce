use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::probe::ProbeError;

/// Opens (and immediately drops) a TCP connection.
///
/// Probes connect through this trait so the transport can be swapped for a
/// simulated one.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, addr: SocketAddr) -> io::Result<()>;
}

/// The real thing: a tokio `TcpStream` handshake.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, addr: SocketAddr) -> io::Result<()> {
        TcpStream::connect(addr).await.map(drop)
    }
}

/// Connects with a hard deadline; the socket is closed when the attempt ends.
pub async fn connect_within<C>(
    connector: &C,
    addr: SocketAddr,
    deadline: Duration,
) -> Result<(), ProbeError>
where
    C: Connector + ?Sized,
{
    match timeout(deadline, connector.connect(addr)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ProbeError::Transport(e)),
        Err(_elapsed) => Err(ProbeError::Timeout(deadline)),
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
