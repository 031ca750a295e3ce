use std::sync::Arc;
use std::time::{Duration, Instant};

use colored::*;
use lanscout_common::config::{Config, ScanConfig};
use lanscout_common::network::device::DeviceKind;
use lanscout_common::network::target::Target;
use lanscout_common::{error, warn};
use lanscout_core::discovery::{DiscoveryService, Report};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::commands::CommandLine;
use crate::mprint;
use crate::sink::{JsonLinesSink, ResultSink, TerminalSink};
use crate::terminal::input::InputHandle;
use crate::terminal::{colors, print, spinner};

pub async fn discover(args: &CommandLine, cfg: &Config) -> anyhow::Result<()> {
    let kinds: &[DeviceKind] = args.kind.kinds();
    let scan_config: ScanConfig = args.scan_config();
    print_plan(args.target, kinds, &scan_config, cfg);

    let mut sinks: Vec<Box<dyn ResultSink>> = vec![Box::new(TerminalSink::new(cfg.quiet))];
    if let Some(path) = &args.output {
        sinks.push(Box::new(JsonLinesSink::create(path)?));
    }

    let cancel = CancellationToken::new();
    watch_ctrl_c(cancel.clone());
    let input: Option<InputHandle> = if cfg.disable_input {
        None
    } else {
        InputHandle::start(cancel.clone())
    };

    let service = DiscoveryService::new(scan_config)?
        .with_cancellation(cancel.clone())
        .with_progress(Arc::new(spinner::report_discovery_progress));

    spinner::start(cfg.quiet);
    let start_time: Instant = Instant::now();
    let report: Report = service.perform_discovery(args.target, kinds).await;
    let total_time: Duration = start_time.elapsed();
    spinner::stop();

    if let Some(input) = input {
        input.finish();
    }

    discovery_ends(&report, &mut sinks, total_time, cfg);
    Ok(())
}

fn print_plan(target: Target, kinds: &[DeviceKind], scan_config: &ScanConfig, cfg: &Config) {
    if cfg.quiet > 0 {
        return;
    }
    print::header("getting ready for discovery", cfg.quiet);

    let target: String = match target {
        Target::Auto => String::from("local subnet"),
        Target::Subnet(prefix) => format!("{prefix}.0/24"),
        Target::Host(addr) => addr.to_string(),
    };
    let looking_for: String = kinds
        .iter()
        .map(DeviceKind::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let ports: String = scan_config
        .printer
        .ports
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    let rows: [(&str, String); 4] = [
        ("Target", target),
        ("Looking for", looking_for),
        ("Terminal API", format!(":{}{}", scan_config.identity.port, scan_config.identity.path)),
        ("Printer ports", ports),
    ];
    let key_width: usize = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    for (key, value) in rows {
        print_plan_line(key, &value, key_width);
    }
}

/// `> Key......: value`, dots padding keys to a shared width.
fn print_plan_line(key: &str, value: &str, key_width: usize) {
    let dots: String = ".".repeat((key_width + 1).saturating_sub(key.len()));
    print::print(&format!(
        "{} {}{} {}",
        ">".color(colors::SEPARATOR),
        key.color(colors::PRIMARY),
        format!("{dots}:").color(colors::SEPARATOR),
        value.color(colors::TEXT_DEFAULT)
    ));
}

/// Cancels the scan on SIGINT; the key listener covers raw-mode Ctrl-C.
fn watch_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => cancel.cancel(),
                Err(e) => debug!("cannot listen for Ctrl-C: {e}"),
            },
            _ = cancel.cancelled() => {}
        }
    });
}

fn discovery_ends(
    report: &Report,
    sinks: &mut [Box<dyn ResultSink>],
    total_time: Duration,
    cfg: &Config,
) {
    if report.cancelled {
        warn!("Scan cancelled, showing what was found so far");
    }

    if report.count() == 0 {
        no_devices_found(cfg);
    } else {
        if cfg.quiet > 0 {
            mprint!();
        }
        print::header("Network Discovery", cfg.quiet);
        deliver(report, sinks);
    }

    for sink in sinks.iter_mut() {
        if let Err(e) = sink.finish() {
            error!("{e}");
        }
    }

    print_summary(report, total_time, cfg);
}

fn deliver(report: &Report, sinks: &mut [Box<dyn ResultSink>]) {
    for (idx, device) in report.devices().enumerate() {
        for sink in sinks.iter_mut() {
            if let Err(e) = sink.record(idx, device) {
                error!("{e}");
            }
        }
    }
}

fn no_devices_found(cfg: &Config) {
    if cfg.quiet > 0 {
        return;
    }
    print::header("nothing answered", cfg.quiet);
    print::print(&print::centered(
        &"No access terminals or printers responded."
            .red()
            .bold()
            .to_string(),
    ));
    print::status("check the subnet and credentials, or run again with -v");
}

fn print_summary(report: &Report, total_time: Duration, cfg: &Config) {
    let count: usize = report.count();

    if cfg.quiet == 0 {
        let devices: ColoredString = format!("{count} devices").bold().green();
        let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
        let output: ColoredString =
            format!("Discovery Complete: {devices} identified in {total_time}")
                .color(colors::TEXT_DEFAULT);

        print::print(&print::rule('═'));
        print::print(&print::centered(&output.to_string()));
        print::print(&print::rule('═'));
    } else if cfg.quiet == 1 {
        for outcome in &report.outcomes {
            print::status(&format!(
                "{}: {} matched, {} probed",
                outcome.kind,
                outcome.count(),
                outcome.probed
            ));
        }
    }

    print::print(&format!("Found {count} devices"));
}
