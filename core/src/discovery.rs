//! # Network Discovery Service
//!
//! Implements the "find devices on my LAN" use case.
//!
//! The target is resolved to a list of addresses once, then one scan runs per
//! requested [`DeviceKind`], each with its own prober and pool width. The
//! per-kind outcomes are gathered into a single [`Report`].

use std::net::Ipv4Addr;
use std::sync::Arc;

use lanscout_common::config::ScanConfig;
use lanscout_common::network::device::{Device, DeviceKind};
use lanscout_common::network::range::{self, Prefix};
use lanscout_common::network::target::{self, Target};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::probe::{IdentityProbe, PortProbe, ProbeError, Prober};
use crate::scanner::{ProgressCallback, ScanOutcome, Scanner};

/// A prober together with the pool width it runs at.
struct Sweep {
    prober: Arc<dyn Prober>,
    max_parallelism: usize,
}

/// Application Service for Network Discovery.
pub struct DiscoveryService {
    sweeps: Vec<Sweep>,
    fallback_prefix: Prefix,
    cancel: CancellationToken,
    on_match: Option<ProgressCallback>,
}

/// Everything one discovery run found.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// How many addresses each scan covered.
    pub addresses: usize,
    /// One outcome per scanned kind, in the order they ran.
    pub outcomes: Vec<ScanOutcome>,
    /// Some requested kind was cut short or never started.
    pub cancelled: bool,
}

impl Report {
    /// Total confirmed devices across kinds.
    pub fn count(&self) -> usize {
        self.outcomes.iter().map(ScanOutcome::count).sum()
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.outcomes.iter().flat_map(ScanOutcome::devices)
    }

    pub fn outcome(&self, kind: DeviceKind) -> Option<&ScanOutcome> {
        self.outcomes.iter().find(|outcome| outcome.kind == kind)
    }
}

impl DiscoveryService {
    /// Builds the identity and printer probers from `config`.
    pub fn new(config: ScanConfig) -> Result<Self, ProbeError> {
        let identity_width = config.identity.max_parallelism;
        let printer_width = config.printer.max_parallelism;
        let printers = PortProbe::printers(&config.printer);
        let terminals = IdentityProbe::new(config.identity)?;

        Ok(Self::empty(config.fallback_prefix)
            .with_prober(Arc::new(terminals), identity_width)
            .with_prober(Arc::new(printers), printer_width))
    }

    /// A service with no probers registered yet.
    pub fn empty(fallback_prefix: Prefix) -> Self {
        Self {
            sweeps: Vec::new(),
            fallback_prefix,
            cancel: CancellationToken::new(),
            on_match: None,
        }
    }

    /// Registers `prober` for its kind, replacing any earlier one.
    pub fn with_prober(mut self, prober: Arc<dyn Prober>, max_parallelism: usize) -> Self {
        let kind = prober.kind();
        self.sweeps.retain(|sweep| sweep.prober.kind() != kind);
        self.sweeps.push(Sweep {
            prober,
            max_parallelism,
        });
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// `on_match` sees the running total across every kind scanned so far.
    pub fn with_progress(mut self, on_match: ProgressCallback) -> Self {
        self.on_match = Some(on_match);
        self
    }

    /// Scans `target` once for each of `kinds`.
    ///
    /// Kinds without a registered prober are skipped, duplicates run once.
    /// After a cancellation the remaining kinds are not started.
    pub async fn perform_discovery(&self, target: Target, kinds: &[DeviceKind]) -> Report {
        let addresses: Vec<Ipv4Addr> = resolve_addresses(target, self.fallback_prefix).await;
        let mut report = Report {
            addresses: addresses.len(),
            outcomes: Vec::with_capacity(kinds.len()),
            cancelled: false,
        };

        let mut seen: Vec<DeviceKind> = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            if seen.contains(&kind) {
                continue;
            }
            seen.push(kind);

            if self.cancel.is_cancelled() {
                debug!("skipping {kind} scan after cancellation");
                report.cancelled = true;
                break;
            }

            let Some(sweep) = self.sweeps.iter().find(|s| s.prober.kind() == kind) else {
                debug!("no prober registered for {kind}");
                continue;
            };

            let scanner = self.scanner_for(sweep, report.count());
            let outcome = scanner.scan(addresses.iter().copied(), Arc::clone(&sweep.prober)).await;
            report.cancelled |= outcome.cancelled;
            report.outcomes.push(outcome);
        }

        report
    }

    fn scanner_for(&self, sweep: &Sweep, already_found: usize) -> Scanner {
        let scanner = Scanner::new(sweep.max_parallelism).with_cancellation(self.cancel.clone());
        match &self.on_match {
            Some(on_match) => {
                let on_match = Arc::clone(on_match);
                scanner.with_progress(Arc::new(move |count| on_match(already_found + count)))
            }
            None => scanner,
        }
    }
}

/// [`target::resolve`] on the blocking pool.
///
/// Subnet detection opens a socket and walks the interface list, neither of
/// which may stall the runtime.
async fn resolve_addresses(target: Target, fallback: Prefix) -> Vec<Ipv4Addr> {
    match tokio::task::spawn_blocking(move || target::resolve(target, fallback)).await {
        Ok(addresses) => addresses,
        Err(e) => {
            warn!("Target resolution failed ({e}), falling back to {fallback}.0/24");
            range::enumerate(fallback).iter().collect()
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

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lanscout_common::network::device::{Identity, ProbeResult};
    use std::sync::Mutex;

    const PREFIX: Prefix = Prefix::new(10, 1, 2);

    struct Fixed {
        kind: DeviceKind,
        hosts: Vec<u8>,
    }

    #[async_trait]
    impl Prober for Fixed {
        async fn probe(&self, addr: Ipv4Addr) -> ProbeResult {
            if !self.hosts.contains(&addr.octets()[3]) {
                return ProbeResult::NoMatch;
            }
            ProbeResult::Matched(match self.kind {
                DeviceKind::AccessTerminal => {
                    Device::identified(addr, Identity::default(), String::new())
                }
                DeviceKind::Printer => Device::open_port(addr, self.kind, 9100),
            })
        }

        fn kind(&self) -> DeviceKind {
            self.kind
        }
    }

    fn service() -> DiscoveryService {
        DiscoveryService::empty(PREFIX)
            .with_prober(
                Arc::new(Fixed {
                    kind: DeviceKind::AccessTerminal,
                    hosts: vec![5, 9],
                }),
                50,
            )
            .with_prober(
                Arc::new(Fixed {
                    kind: DeviceKind::Printer,
                    hosts: vec![30],
                }),
                20,
            )
    }

    #[tokio::test]
    async fn runs_one_scan_per_kind() {
        let report = service()
            .perform_discovery(
                Target::Subnet(PREFIX),
                &[DeviceKind::AccessTerminal, DeviceKind::Printer],
            )
            .await;

        assert_eq!(report.addresses, 254);
        assert_eq!(report.count(), 3);
        assert!(!report.cancelled);

        let terminals = report.outcome(DeviceKind::AccessTerminal).unwrap();
        assert_eq!(
            terminals.addresses().collect::<Vec<_>>(),
            vec![PREFIX.host(5), PREFIX.host(9)]
        );
        let printers = report.outcome(DeviceKind::Printer).unwrap();
        assert_eq!(printers.addresses().collect::<Vec<_>>(), vec![PREFIX.host(30)]);
    }

    #[tokio::test]
    async fn only_requested_kinds_are_scanned() {
        let report = service()
            .perform_discovery(
                Target::Subnet(PREFIX),
                &[DeviceKind::Printer, DeviceKind::Printer],
            )
            .await;

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].kind, DeviceKind::Printer);
        assert_eq!(report.count(), 1);
    }

    #[tokio::test]
    async fn single_host_target_probes_one_address() {
        let report = service()
            .perform_discovery(Target::Host(PREFIX.host(9)), &[DeviceKind::AccessTerminal])
            .await;

        assert_eq!(report.addresses, 1);
        assert_eq!(report.outcomes[0].probed, 1);
        assert_eq!(report.count(), 1);
    }

    #[tokio::test]
    async fn progress_is_cumulative_across_kinds() {
        let seen: Arc<Mutex<Vec<usize>>> = Arc::default();
        let sink = Arc::clone(&seen);

        let report = service()
            .with_progress(Arc::new(move |n| sink.lock().unwrap().push(n)))
            .perform_discovery(
                Target::Subnet(PREFIX),
                &[DeviceKind::AccessTerminal, DeviceKind::Printer],
            )
            .await;

        assert_eq!(report.count(), 3);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn cancelled_service_reports_without_scanning() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = service()
            .with_cancellation(cancel)
            .perform_discovery(
                Target::Subnet(PREFIX),
                &[DeviceKind::AccessTerminal, DeviceKind::Printer],
            )
            .await;

        assert_eq!(report.count(), 0);
        assert!(report.outcomes.is_empty());
        assert!(report.cancelled);
    }

    #[tokio::test]
    async fn built_from_default_config() {
        let service = DiscoveryService::new(ScanConfig::default()).unwrap();
        let kinds: Vec<DeviceKind> = service.sweeps.iter().map(|s| s.prober.kind()).collect();
        assert_eq!(kinds, vec![DeviceKind::AccessTerminal, DeviceKind::Printer]);
        assert_eq!(service.sweeps[0].max_parallelism, 50);
        assert_eq!(service.sweeps[1].max_parallelism, 20);
    }

    #[tokio::test]
    async fn targets_resolve_on_the_blocking_pool() {
        let auto = resolve_addresses(Target::Auto, PREFIX).await;
        assert_eq!(auto.len(), 254);
        let network = &auto[0].octets()[..3];
        assert!(auto.iter().all(|addr| &addr.octets()[..3] == network));

        assert_eq!(
            resolve_addresses(Target::Host(PREFIX.host(4)), PREFIX).await,
            vec![PREFIX.host(4)]
        );
        assert_eq!(
            resolve_addresses(Target::Subnet(PREFIX), Prefix::new(10, 9, 9)).await,
            range::enumerate(PREFIX).iter().collect::<Vec<_>>()
        );
    }
}
