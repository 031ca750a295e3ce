//! The discovery engine.
//!
//! * [`network`]: the TCP connect seam every probe goes through.
//! * [`probe`]: the [`probe::Prober`] strategies (identity over HTTP, open ports over TCP).
//! * [`scanner`]: the bounded worker pool that fans addresses out and results in.
//! * [`discovery`]: runs one scan per requested device kind.

pub mod discovery;
pub mod network;
pub mod probe;
pub mod scanner;
