//! End-to-end checks of the discovery engine against fake devices on loopback.

pub mod support;

#[cfg(test)]
mod discovery;
