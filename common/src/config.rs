//! Explicit configuration for a discovery run.
//!
//! Everything a probe needs (credentials, ports, deadlines, pool widths) is
//! carried here and handed to the engine at construction. Workers only ever
//! read it.

use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::network::range::Prefix;

/// Device-info endpoint of the access-control terminals' management API.
pub const DEVICE_INFO_PATH: &str = "/ISAPI/System/deviceInfo";

pub const DEFAULT_HTTP_PORT: u16 = 80;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_PORT_TIMEOUT: Duration = Duration::from_millis(500);

/// Refused connections dominate an identity sweep, so it can run wide.
pub const DEFAULT_IDENTITY_PARALLELISM: usize = 50;
/// Printers choke on piles of half-open connections; keep this one narrow.
pub const DEFAULT_PRINTER_PARALLELISM: usize = 20;

/// Raw print (9100), LPD (515), IPP (631), in probing order.
pub const DEFAULT_PRINTER_PORTS: [u16; 3] = [9100, 515, 631];

pub const FALLBACK_PREFIX: Prefix = Prefix::new(192, 168, 1);

/// Options that shape the terminal output rather than the scan.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub no_banner: bool,
    /// 0 prints everything, 1 drops decorations, 2 prints the summary only.
    pub quiet: u8,
    /// Do not listen for key presses while scanning.
    pub disable_input: bool,
}

/// Username and password for the management API.
pub struct Credentials {
    pub username: String,
    password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new("admin", "")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Settings for the authenticated device-info probe.
#[derive(Debug)]
pub struct IdentitySettings {
    pub credentials: Credentials,
    pub port: u16,
    pub path: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_parallelism: usize,
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            port: DEFAULT_HTTP_PORT,
            path: DEVICE_INFO_PATH.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_parallelism: DEFAULT_IDENTITY_PARALLELISM,
        }
    }
}

/// Settings for the printer port sweep.
#[derive(Debug, Clone)]
pub struct PortSettings {
    pub ports: Vec<u16>,
    pub per_port_timeout: Duration,
    pub max_parallelism: usize,
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            ports: DEFAULT_PRINTER_PORTS.to_vec(),
            per_port_timeout: DEFAULT_PORT_TIMEOUT,
            max_parallelism: DEFAULT_PRINTER_PARALLELISM,
        }
    }
}

/// Everything the discovery engine needs for one run.
#[derive(Debug)]
pub struct ScanConfig {
    pub identity: IdentitySettings,
    pub printer: PortSettings,
    /// Used when the local subnet cannot be detected.
    pub fallback_prefix: Prefix,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            identity: IdentitySettings::default(),
            printer: PortSettings::default(),
            fallback_prefix: FALLBACK_PREFIX,
        }
    }
}
