use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use lanscout_common::network::device::{Device, DeviceKind, ProbeResult};

/// Aggregated result of one scan.
///
/// Matches are keyed by address, so two scans that confirmed the same
/// devices compare equal no matter in which order probes finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub kind: DeviceKind,
    devices: BTreeMap<Ipv4Addr, Device>,
    /// Probe results collected, matches and misses alike.
    pub probed: usize,
    /// Probes that blew up instead of answering; also counted in `probed`.
    pub faulted: usize,
    /// The scan was stopped before every address reported back.
    pub cancelled: bool,
}

impl ScanOutcome {
    pub fn new(kind: DeviceKind) -> Self {
        Self {
            kind,
            devices: BTreeMap::new(),
            probed: 0,
            faulted: 0,
            cancelled: false,
        }
    }

    /// Folds one probe result in. Returns `true` when it was a match.
    pub(crate) fn record(&mut self, result: ProbeResult) -> bool {
        self.probed += 1;
        match result {
            ProbeResult::Matched(device) => {
                self.devices.insert(device.addr, device);
                true
            }
            ProbeResult::NoMatch => false,
        }
    }

    /// A probe that failed unexpectedly counts as a miss.
    pub(crate) fn record_fault(&mut self) {
        self.probed += 1;
        self.faulted += 1;
    }

    /// Number of confirmed devices.
    pub fn count(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Confirmed devices in address order.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub fn addresses(&self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        self.devices.keys().copied()
    }

    pub fn get(&self, addr: &Ipv4Addr) -> Option<&Device> {
        self.devices.get(addr)
    }
}
