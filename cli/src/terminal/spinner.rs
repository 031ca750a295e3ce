use std::io::{self, Write};
use std::sync::Mutex;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use colored::*;
use crossterm::terminal;
use indicatif::{ProgressBar, ProgressStyle};

const TIP_DURATION: Duration = Duration::from_secs(1);
const MESSAGE_READ_TIME: Duration = Duration::from_secs(1);
const MIN_TIP_VISIBILITY: Duration = Duration::from_millis(750);
const TIPS: &[&str] = &[
    "Press 'q' to stop early and keep what was found",
    "Pass a prefix like 192.168.1 to scan another subnet",
];

pub struct SpinnerHandle {
    spinner: ProgressBar,
    tx: Sender<String>,
}

impl SpinnerHandle {
    fn send_to_queue(&self, message: String) {
        let _ = self.tx.send(message);
    }
}

/// The spinner shown while a scan runs, if any.
static ACTIVE: Mutex<Option<SpinnerHandle>> = Mutex::new(None);

/// Starts the scan spinner unless output is fully quiet.
pub fn start(q_level: u8) {
    if q_level > 1 {
        return;
    }
    if let Ok(mut active) = ACTIVE.lock() {
        if active.is_none() {
            *active = Some(init_spinner());
        }
    }
}

/// Clears the spinner; later log lines go straight to stdout.
pub fn stop() {
    let handle: Option<SpinnerHandle> = ACTIVE.lock().ok().and_then(|mut active| active.take());
    if let Some(handle) = handle {
        handle.spinner.finish_and_clear();
    }
}

fn init_spinner() -> SpinnerHandle {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&[
            "▁▁▁▁▁",
            "▁▂▂▂▁",
            "▁▄▂▄▁",
            "▂▄▆▄▂",
            "▄▆█▆▄",
            "▂▄▆▄▂",
            "▁▄▂▄▁",
            "▁▂▂▂▁",
        ]);

    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));

    let (tx, rx) = mpsc::channel::<String>();
    let pb_clone = pb.clone();

    thread::spawn(move || {
        let mut tip_index = 0;
        let mut next_action_time = Instant::now() + TIP_DURATION;
        let mut is_showing_tip = false;
        let mut last_tip_time = Instant::now();

        loop {
            if pb_clone.is_finished() {
                break;
            }

            let wait_time = next_action_time.saturating_duration_since(Instant::now());

            match rx.recv_timeout(wait_time) {
                Ok(mut msg) => {
                    if is_showing_tip {
                        let elapsed = last_tip_time.elapsed();
                        if elapsed < MIN_TIP_VISIBILITY {
                            thread::sleep(MIN_TIP_VISIBILITY - elapsed);
                        }
                        is_showing_tip = false;
                    }
                    while let Ok(newer_msg) = rx.try_recv() {
                        msg = newer_msg;
                    }
                    pb_clone.set_message(msg);
                    next_action_time = Instant::now() + MESSAGE_READ_TIME;
                }
                Err(RecvTimeoutError::Timeout) => {
                    let tip = TIPS[tip_index % TIPS.len()];
                    pb_clone.set_message(format!("{}", tip.italic().white()));

                    tip_index += 1;
                    is_showing_tip = true;
                    last_tip_time = Instant::now();

                    next_action_time = Instant::now() + TIP_DURATION;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    break;
                }
            }
        }
    });

    SpinnerHandle { spinner: pb, tx }
}

pub fn report_discovery_progress(count: usize) {
    if let Ok(active) = ACTIVE.lock() {
        if let Some(handle) = active.as_ref() {
            handle.send_to_queue(format!(
                "Identified {} devices so far...",
                count.to_string().green().bold()
            ));
        }
    }
}

/// Log sink that keeps lines from tearing through the spinner.
pub struct SpinnerWriter;

impl Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        // Raw mode needs explicit carriage returns.
        let text = match terminal::is_raw_mode_enabled() {
            Ok(true) => text.replace('\n', "\r\n"),
            _ => text.into_owned(),
        };

        let active = ACTIVE.lock().ok();
        match active.as_deref() {
            Some(Some(handle)) => handle.spinner.suspend(|| io::stdout().write_all(text.as_bytes()))?,
            _ => io::stdout().write_all(text.as_bytes())?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}
