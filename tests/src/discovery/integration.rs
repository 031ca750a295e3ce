#![cfg(test)]
use std::net::Ipv4Addr;
use std::time::Duration;

use lanscout_common::config::{Credentials, IdentitySettings, PortSettings, ScanConfig};
use lanscout_common::network::device::{DeviceKind, Evidence, Identity};
use lanscout_common::network::range::Prefix;
use lanscout_common::network::target::Target;
use lanscout_core::discovery::{DiscoveryService, Report};
use tokio_util::sync::CancellationToken;

use crate::support::{self, FakeTerminal};

const PATH: &str = "/ISAPI/System/deviceInfo";
const LOOPBACK: Prefix = Prefix::new(127, 0, 0);

fn scan_config(terminal_port: u16, printer_ports: Vec<u16>) -> ScanConfig {
    ScanConfig {
        identity: IdentitySettings {
            credentials: Credentials::new("admin", "12345abc"),
            port: terminal_port,
            path: PATH.to_string(),
            connect_timeout: Duration::from_millis(300),
            request_timeout: Duration::from_secs(2),
            max_parallelism: 254,
        },
        printer: PortSettings {
            ports: printer_ports,
            per_port_timeout: Duration::from_millis(300),
            max_parallelism: 254,
        },
        fallback_prefix: LOOPBACK,
    }
}

async fn discover(config: ScanConfig, target: Target, kinds: &[DeviceKind]) -> Report {
    DiscoveryService::new(config)
        .expect("service should build")
        .perform_discovery(target, kinds)
        .await
}

/// A digest-protected terminal on loopback is found and identified.
#[tokio::test]
async fn discovery_identifies_loopback_terminal() {
    let terminal = FakeTerminal::new("admin", "12345abc", PATH, "DS-K1T804MF", "Front door");
    let addr = terminal.spawn().await.unwrap();

    let report = discover(
        scan_config(addr.port(), vec![]),
        Target::Host(Ipv4Addr::LOCALHOST),
        &[DeviceKind::AccessTerminal],
    )
    .await;

    assert_eq!(report.count(), 1);
    let device = report.devices().next().unwrap();
    assert_eq!(device.addr, Ipv4Addr::LOCALHOST);
    match &device.evidence {
        Evidence::Identity { identity, body } => {
            assert_eq!(
                identity,
                &Identity {
                    model: "DS-K1T804MF".to_string(),
                    name: "Front door".to_string()
                }
            );
            assert!(body.contains("<serialNumber>"));
        }
        other => panic!("expected identity evidence, got {other:?}"),
    }
}

/// Wrong credentials are indistinguishable from "not a terminal".
#[tokio::test]
async fn discovery_with_wrong_password_finds_nothing() {
    let terminal = FakeTerminal::new("admin", "another-password", PATH, "DS-K1T804MF", "Door");
    let addr = terminal.spawn().await.unwrap();

    let report = discover(
        scan_config(addr.port(), vec![]),
        Target::Host(Ipv4Addr::LOCALHOST),
        &[DeviceKind::AccessTerminal],
    )
    .await;

    assert_eq!(report.count(), 0);
    assert_eq!(report.outcomes[0].probed, 1);
    assert!(!report.cancelled);
}

/// The printer sweep reports the first port that accepts.
#[tokio::test]
async fn discovery_finds_loopback_printer_port() {
    let closed = support::closed_port().await.unwrap();
    let (_listener, open) = support::spawn_open_port().await.unwrap();

    let report = discover(
        scan_config(closed, vec![closed, open]),
        Target::Host(Ipv4Addr::LOCALHOST),
        &[DeviceKind::Printer],
    )
    .await;

    assert_eq!(report.count(), 1);
    let device = report.devices().next().unwrap();
    assert_eq!(device.kind, DeviceKind::Printer);
    assert_eq!(device.evidence, Evidence::OpenPort { port: open });
}

/// Both kinds in one run, each counted once.
#[tokio::test]
async fn discovery_of_all_kinds_sums_counts() {
    let terminal = FakeTerminal::new("admin", "12345abc", PATH, "DS-K1T341", "Lobby");
    let terminal_addr = terminal.spawn().await.unwrap();
    let (_listener, printer_port) = support::spawn_open_port().await.unwrap();

    let report = discover(
        scan_config(terminal_addr.port(), vec![printer_port]),
        Target::Host(Ipv4Addr::LOCALHOST),
        &[DeviceKind::AccessTerminal, DeviceKind::Printer],
    )
    .await;

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.count(), 2);
    assert_eq!(report.outcome(DeviceKind::AccessTerminal).unwrap().count(), 1);
    assert_eq!(report.outcome(DeviceKind::Printer).unwrap().count(), 1);
}

/// A full /24 sweep over loopback still yields one result per address.
#[tokio::test]
async fn discovery_sweeps_whole_loopback_subnet() {
    let (_listener, open) = support::spawn_open_port().await.unwrap();

    let report = discover(
        scan_config(open, vec![open]),
        Target::Subnet(LOOPBACK),
        &[DeviceKind::Printer],
    )
    .await;

    assert_eq!(report.addresses, 254);
    let printers = report.outcome(DeviceKind::Printer).unwrap();
    assert_eq!(printers.probed, 254);
    assert!(printers.get(&Ipv4Addr::LOCALHOST).is_some());
}

/// Nothing listening anywhere still ends with a count of zero.
#[tokio::test]
async fn discovery_with_nothing_listening_completes_empty() {
    let closed = support::closed_port().await.unwrap();

    let report = discover(
        scan_config(closed, vec![closed]),
        Target::Host(Ipv4Addr::LOCALHOST),
        &[DeviceKind::AccessTerminal, DeviceKind::Printer],
    )
    .await;

    assert_eq!(report.count(), 0);
    assert_eq!(report.outcomes.len(), 2);
}

/// Cancelling mid-scan returns promptly with what was already gathered.
#[tokio::test]
async fn discovery_cancelled_returns_partial_report() {
    // Accepts the request and never answers, so the terminal scan stalls on 127.0.0.1.
    let (_listener, silent) = support::spawn_open_port().await.unwrap();
    let cancel = CancellationToken::new();

    let service = DiscoveryService::new(scan_config(silent, vec![silent]))
        .unwrap()
        .with_cancellation(cancel.clone());

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let report = service
        .perform_discovery(
            Target::Subnet(LOOPBACK),
            &[DeviceKind::AccessTerminal, DeviceKind::Printer],
        )
        .await;

    assert!(report.cancelled);
    assert!(started.elapsed() < Duration::from_millis(1500));
    assert_eq!(report.outcomes.len(), 1);
    assert!(report.outcomes[0].cancelled);
    assert_eq!(report.count(), 0);
}
