pub mod discover;

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};
use lanscout_common::config::{
    self, Config, Credentials, DEVICE_INFO_PATH, IdentitySettings, PortSettings, ScanConfig,
};
use lanscout_common::network::device::DeviceKind;
use lanscout_common::network::target::Target;

#[derive(Parser, Debug)]
#[command(name = "lanscout", version)]
#[command(about = "Finds access-control terminals and printers on the local network.")]
pub struct CommandLine {
    /// Subnet to scan: "192.168.1", "192.168.1.0/24", a single host, or "auto"
    #[arg(default_value = "auto")]
    pub target: Target,

    /// Which devices to look for
    #[arg(short, long, value_enum, default_value_t = KindArg::All)]
    pub kind: KindArg,

    /// Username for the terminals' management API
    #[arg(short, long, env = "LANSCOUT_USER", default_value = "admin")]
    pub user: String,

    /// Password for the terminals' management API
    #[arg(
        short,
        long,
        env = "LANSCOUT_PASSWORD",
        default_value = "",
        hide_env_values = true,
        hide_default_value = true
    )]
    pub password: String,

    /// HTTP port of the management API
    #[arg(long, default_value_t = config::DEFAULT_HTTP_PORT)]
    pub port: u16,

    /// Device-info path requested from each terminal
    #[arg(long, default_value = DEVICE_INFO_PATH, value_parser = parse_path)]
    pub path: String,

    /// TCP connect deadline for terminals, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = millis(config::DEFAULT_CONNECT_TIMEOUT))]
    pub connect_timeout: u64,

    /// Deadline for the whole device-info exchange, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = millis(config::DEFAULT_REQUEST_TIMEOUT))]
    pub request_timeout: u64,

    /// TCP connect deadline per printer port, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = millis(config::DEFAULT_PORT_TIMEOUT))]
    pub port_timeout: u64,

    /// Terminals probed at once
    #[arg(long, value_name = "N", default_value_t = config::DEFAULT_IDENTITY_PARALLELISM)]
    pub terminal_workers: usize,

    /// Printers probed at once
    #[arg(long, value_name = "N", default_value_t = config::DEFAULT_PRINTER_PARALLELISM)]
    pub printer_workers: usize,

    /// Printer ports, tried in this order
    #[arg(
        long,
        value_name = "LIST",
        value_delimiter = ',',
        default_values_t = config::DEFAULT_PRINTER_PORTS
    )]
    pub printer_ports: Vec<u16>,

    /// Also write every match to FILE as JSON lines
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Less output (-qq prints the summary line only)
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Do not listen for 'q' while scanning
    #[arg(long)]
    pub no_input: bool,

    /// Skip the banner
    #[arg(long)]
    pub no_banner: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Terminal,
    Printer,
    All,
}

impl KindArg {
    pub fn kinds(self) -> &'static [DeviceKind] {
        match self {
            KindArg::Terminal => &[DeviceKind::AccessTerminal],
            KindArg::Printer => &[DeviceKind::Printer],
            KindArg::All => &[DeviceKind::AccessTerminal, DeviceKind::Printer],
        }
    }
}

/// Request paths are absolute so they can be appended to `http://host:port`.
fn parse_path(s: &str) -> Result<String, String> {
    if s.starts_with('/') {
        Ok(s.to_string())
    } else {
        Err(format!("'{s}' must start with '/', e.g. /{s}"))
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        Config {
            no_banner: self.no_banner,
            quiet: self.quiet,
            disable_input: self.no_input,
        }
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            identity: IdentitySettings {
                credentials: Credentials::new(self.user.as_str(), self.password.as_str()),
                port: self.port,
                path: self.path.clone(),
                connect_timeout: Duration::from_millis(self.connect_timeout),
                request_timeout: Duration::from_millis(self.request_timeout),
                max_parallelism: self.terminal_workers,
            },
            printer: PortSettings {
                ports: self.printer_ports.clone(),
                per_port_timeout: Duration::from_millis(self.port_timeout),
                max_parallelism: self.printer_workers,
            },
            ..ScanConfig::default()
        }
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
