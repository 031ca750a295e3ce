//! The bounded worker pool.
//!
//! Every address handed to [`Scanner::scan`] is dispatched to the prober in
//! its own task, with at most `max_parallelism` tasks alive at once. Results
//! are folded into a [`ScanOutcome`] by the scan loop alone, so the
//! aggregation needs no locking.
//!
//! Guarantees:
//! * every dispatched address yields exactly one result (a panicking probe is
//!   recorded as a faulted miss, it does not take the batch down);
//! * the scan returns only after every dispatched probe reported back, or
//!   after cancellation, in which case in-flight probes are aborted and the
//!   results gathered so far are returned.

use std::any::Any;
use std::net::Ipv4Addr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use lanscout_common::network::device::ProbeResult;
use lanscout_common::success;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::probe::Prober;

mod outcome;

pub use outcome::ScanOutcome;

/// Called with the running number of matches whenever a new one lands.
pub type ProgressCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// `Err` carries the panic message of a probe that blew up.
type TaskOutput = (Ipv4Addr, Result<ProbeResult, String>);

pub struct Scanner {
    max_parallelism: usize,
    cancel: CancellationToken,
    on_match: Option<ProgressCallback>,
}

impl Scanner {
    /// A pool at most `max_parallelism` probes wide (at least one).
    pub fn new(max_parallelism: usize) -> Self {
        Self {
            max_parallelism: max_parallelism.max(1),
            cancel: CancellationToken::new(),
            on_match: None,
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, on_match: ProgressCallback) -> Self {
        self.on_match = Some(on_match);
        self
    }

    pub fn max_parallelism(&self) -> usize {
        self.max_parallelism
    }

    /// Probes every address and returns the confirmed matches.
    pub async fn scan<I>(&self, addresses: I, prober: Arc<dyn Prober>) -> ScanOutcome
    where
        I: IntoIterator<Item = Ipv4Addr>,
    {
        let mut pending = addresses.into_iter();
        let mut tasks: JoinSet<TaskOutput> = JoinSet::new();
        let mut outcome = ScanOutcome::new(prober.kind());

        loop {
            if self.cancel.is_cancelled() {
                self.abandon(&mut tasks, &mut outcome).await;
                break;
            }

            while tasks.len() < self.max_parallelism {
                let Some(addr) = pending.next() else {
                    break;
                };
                dispatch(&mut tasks, addr, Arc::clone(&prober));
            }

            if tasks.is_empty() {
                break;
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {}
                Some(joined) = tasks.join_next() => self.collect(&mut outcome, joined),
            }
        }

        debug!(
            "{} scan finished: {} probed, {} matched, {} faulted",
            outcome.kind,
            outcome.probed,
            outcome.count(),
            outcome.faulted
        );
        outcome
    }

    /// Aborts whatever is still running, keeping results that already landed.
    async fn abandon(&self, tasks: &mut JoinSet<TaskOutput>, outcome: &mut ScanOutcome) {
        outcome.cancelled = true;
        tasks.abort_all();
        while let Some(joined) = tasks.join_next().await {
            if joined.is_ok() {
                self.collect(outcome, joined);
            }
        }
    }

    fn collect(&self, outcome: &mut ScanOutcome, joined: Result<TaskOutput, JoinError>) {
        match joined {
            Ok((addr, Ok(result))) => {
                if outcome.record(result) {
                    success!("{} found at {addr}", outcome.kind);
                    if let Some(on_match) = &self.on_match {
                        on_match(outcome.count());
                    }
                }
            }
            Ok((addr, Err(panic))) => {
                warn!("probe for {addr} panicked ({panic}), counting it as no match");
                outcome.record_fault();
            }
            Err(e) => debug!("probe task ended early: {e}"),
        }
    }
}

fn dispatch(tasks: &mut JoinSet<TaskOutput>, addr: Ipv4Addr, prober: Arc<dyn Prober>) {
    tasks.spawn(async move {
        let result = AssertUnwindSafe(prober.probe(addr))
            .catch_unwind()
            .await
            .map_err(|payload| panic_message(payload.as_ref()).to_string());
        (addr, result)
    });
}

/// The text of a panic payload, for the common `&str` and `String` cases.
pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "non-text panic payload"
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
