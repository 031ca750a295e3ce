use crate::terminal::colors;
use colored::*;
use tracing::info;

pub const TOTAL_WIDTH: usize = 64;

#[macro_export]
macro_rules! mprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

/// Raw output line. Always shown, whatever the log level.
pub fn print(msg: &str) {
    info!(target: "lanscout::print", raw_msg = msg);
}

pub fn banner(no_banner: bool, q_level: u8) {
    if no_banner || q_level > 0 {
        return;
    }
    print(&titled_rule(
        &format!("LANSCOUT v{}", env!("CARGO_PKG_VERSION")),
        '═',
    ));
}

pub fn header(msg: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }
    print(&titled_rule(&msg.to_uppercase(), '─'));
}

/// A full-width line of `fill`.
pub fn rule(fill: char) -> String {
    fill.to_string()
        .repeat(TOTAL_WIDTH)
        .color(colors::SEPARATOR)
        .to_string()
}

/// `> msg`, the prefix for every status line outside the result tree.
pub fn status(msg: &str) {
    print(&format!(
        "{} {}",
        ">".color(colors::SEPARATOR),
        msg.color(colors::TEXT_DEFAULT)
    ));
}

/// `msg` padded with spaces to sit in the middle of [`TOTAL_WIDTH`].
pub fn centered(msg: &str) -> String {
    let pad: usize = TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2;
    format!("{}{msg}", " ".repeat(pad))
}

/// `───⟦ TITLE ⟧───` spanning [`TOTAL_WIDTH`].
fn titled_rule(title: &str, fill: char) -> String {
    let title: String = format!("⟦ {title} ⟧");
    let free: usize = TOTAL_WIDTH.saturating_sub(console::measure_text_width(&title));
    let left: String = fill.to_string().repeat(free / 2);
    let right: String = fill.to_string().repeat(free - free / 2);

    format!(
        "{}{}{}",
        left.color(colors::SEPARATOR),
        title.bright_green().bold(),
        right.color(colors::SEPARATOR)
    )
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
