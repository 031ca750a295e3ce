use crate::terminal::colors;
use colored::*;
use lanscout_common::network::device::{Device, Evidence};
use lanscout_protocols::printer;

pub type Detail = (String, ColoredString);

/// Key/value rows shown under a device in the result tree.
pub fn device_to_details(device: &Device) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![(
        String::from("Kind"),
        device.kind.to_string().color(colors::TEXT_DEFAULT),
    )];

    match &device.evidence {
        Evidence::Identity { identity, .. } => {
            details.push((String::from("Model"), identity.model.color(colors::MODEL)));
            details.push((String::from("Name"), identity.name.normal()));
        }
        Evidence::OpenPort { port } => {
            details.push((String::from("Port"), port_to_value(*port)));
        }
    }

    details
}

fn port_to_value(port: u16) -> ColoredString {
    let number: ColoredString = port.to_string().color(colors::PORT);
    match printer::service_name(port) {
        Some(service) => format!("{number} ({service})").normal(),
        None => number,
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
