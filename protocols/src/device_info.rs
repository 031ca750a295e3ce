//! Device-info response parsing.
//!
//! The management API answers `GET /ISAPI/System/deviceInfo` with an XML
//! document rooted at `<DeviceInfo>`. Only two fields matter here, `model`
//! and `deviceName`; either may be missing without failing the parse.

use lanscout_common::network::device::Identity;
use quick_xml::Reader;
use quick_xml::events::Event;
use thiserror::Error;

/// Local name of the root element that marks a device-info document.
pub const ROOT_ELEMENT: &[u8] = b"DeviceInfo";
const MODEL_TAG: &[u8] = b"model";
const NAME_TAG: &[u8] = b"deviceName";

#[derive(Debug, Error)]
pub enum DeviceInfoError {
    #[error("body is not well-formed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("root element is <{0}>, not <DeviceInfo>")]
    UnexpectedRoot(String),

    #[error("body contains no XML element")]
    Empty,

    #[error("body ends before </DeviceInfo>")]
    Truncated,
}

/// Parses a device-info body into an [`Identity`].
///
/// Tag names are matched case-sensitively on their local part, so
/// namespace prefixes are ignored. Only direct children of the root count.
pub fn parse(body: &str) -> Result<Identity, DeviceInfoError> {
    let mut reader = Reader::from_str(body);
    reader.trim_text(true);

    let mut identity = Identity::default();
    let mut seen_root = false;
    let mut depth: usize = 0;
    let mut current: Option<Field> = None;

    loop {
        match reader.read_event()? {
            Event::Start(element) => {
                let local = element.local_name();
                if !seen_root {
                    check_root(local.as_ref())?;
                    seen_root = true;
                } else if depth == 1 {
                    current = Field::from_tag(local.as_ref());
                }
                depth += 1;
            }
            Event::Empty(element) => {
                if !seen_root {
                    check_root(element.local_name().as_ref())?;
                    return Ok(identity);
                }
            }
            Event::Text(text) => {
                if let Some(field) = current {
                    let value = text.unescape()?;
                    let value = value.trim();
                    if !value.is_empty() {
                        field.store(&mut identity, value);
                    }
                }
            }
            Event::End(_) => {
                current = None;
                depth = depth.saturating_sub(1);
                if seen_root && depth == 0 {
                    break;
                }
            }
            Event::Eof if depth > 0 => return Err(DeviceInfoError::Truncated),
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(DeviceInfoError::Empty);
    }
    Ok(identity)
}

fn check_root(local: &[u8]) -> Result<(), DeviceInfoError> {
    if local == ROOT_ELEMENT {
        Ok(())
    } else {
        Err(DeviceInfoError::UnexpectedRoot(
            String::from_utf8_lossy(local).into_owned(),
        ))
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Model,
    Name,
}

impl Field {
    fn from_tag(local: &[u8]) -> Option<Self> {
        match local {
            MODEL_TAG => Some(Field::Model),
            NAME_TAG => Some(Field::Name),
            _ => None,
        }
    }

    fn store(self, identity: &mut Identity, value: &str) {
        match self {
            Field::Model => identity.model = value.to_string(),
            Field::Name => identity.name = value.to_string(),
        }
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
