//! Shared building blocks for `lanscout`.
//!
//! * [`network`]: addresses, prefixes, scan targets and device models.
//! * [`config`]: the explicit configuration handed to the scan engine.
//! * [`error`]: errors raised while working out *what* to scan.

pub mod config;
pub mod error;
pub mod network;

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "lanscout::info", $($arg)*)
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "lanscout::success", $($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        ::tracing::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        ::tracing::error!($($arg)*)
    };
}
