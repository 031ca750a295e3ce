//! Where confirmed devices end up once a scan is over.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use colored::*;
use lanscout_common::network::device::Device;
use thiserror::Error;

use crate::mprint;
use crate::terminal::format::{self, Detail};
use crate::terminal::{colors, print};

/// Width reserved for keys in a device tree.
const TREE_KEY_WIDTH: usize = 7;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("could not write results: {0}")]
    Io(#[from] io::Error),

    #[error("could not encode result: {0}")]
    Json(#[from] serde_json::Error),
}

/// Consumes confirmed matches one at a time.
pub trait ResultSink {
    fn record(&mut self, idx: usize, device: &Device) -> Result<(), SinkError>;

    /// Called once after the last record.
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Tree view of every device on the terminal.
pub struct TerminalSink {
    q_level: u8,
}

impl TerminalSink {
    pub fn new(q_level: u8) -> Self {
        Self { q_level }
    }
}

impl ResultSink for TerminalSink {
    fn record(&mut self, idx: usize, device: &Device) -> Result<(), SinkError> {
        if self.q_level > 1 {
            return Ok(());
        }
        if idx > 0 {
            mprint!();
        }
        for line in device_tree(idx, device) {
            print::print(&line);
        }
        Ok(())
    }
}

/// `[idx] addr` followed by one `├─ key...: value` branch per detail.
fn device_tree(idx: usize, device: &Device) -> Vec<String> {
    let head: String = format!(
        "{}{}{} {}",
        "[".color(colors::SEPARATOR),
        idx.to_string().color(colors::ACCENT),
        "]".color(colors::SEPARATOR),
        device.addr.to_string().color(colors::PRIMARY)
    );

    let details: Vec<Detail> = format::device_to_details(device);
    let last: usize = details.len().saturating_sub(1);
    let branches = details.into_iter().enumerate().map(|(i, (key, value))| {
        let branch: &str = if i == last { "└─" } else { "├─" };
        let padding: String = ".".repeat(TREE_KEY_WIDTH.saturating_sub(key.len()));
        format!(
            " {} {}{}{} {}",
            branch.color(colors::SEPARATOR),
            key.color(colors::TEXT_DEFAULT),
            padding.color(colors::SEPARATOR),
            ":".color(colors::SEPARATOR),
            value
        )
    });

    std::iter::once(head).chain(branches).collect()
}

/// One JSON object per line, raw device-info bodies included.
pub struct JsonLinesSink<W: Write> {
    writer: BufWriter<W>,
}

impl JsonLinesSink<File> {
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|e| SinkError::Io(e.into_error()))
    }
}

impl<W: Write> ResultSink for JsonLinesSink<W> {
    fn record(&mut self, _idx: usize, device: &Device) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, device)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(self.writer.flush()?)
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
