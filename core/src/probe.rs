//! Probe strategies.
//!
//! A [`Prober`] answers one question for one address: is this the kind of
//! device we are looking for? Whatever goes wrong on the way (refused
//! connections, deadlines, garbage responses) the answer is a
//! [`ProbeResult`]; nothing is ever propagated into the worker pool.

use std::io;
use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use lanscout_common::network::device::{DeviceKind, ProbeResult};
use lanscout_protocols::device_info::DeviceInfoError;
use lanscout_protocols::digest::DigestError;
use thiserror::Error;

mod identity;
mod port;

pub use identity::IdentityProbe;
pub use port::PortProbe;

#[async_trait]
pub trait Prober: Send + Sync {
    /// Bounded-time check of a single address.
    async fn probe(&self, addr: Ipv4Addr) -> ProbeResult;

    /// What a match from this prober means.
    fn kind(&self) -> DeviceKind;
}

/// Why a probe ended in `NoMatch`. Never leaves the prober.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Transport(#[from] io::Error),

    #[error("http exchange failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("credentials rejected")]
    Unauthorized,

    #[error("unexpected http status {0}")]
    UnexpectedStatus(u16),

    #[error("unusable auth challenge: {0}")]
    Challenge(#[from] DigestError),

    #[error("not a device-info response: {0}")]
    Protocol(#[from] DeviceInfoError),
}

impl ProbeError {
    /// `true` for the failures that simply mean "nothing listening here".
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ProbeError::Timeout(_) | ProbeError::Transport(_))
    }
}
