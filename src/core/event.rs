//! Decoded device events.
//!
//! One [`Event`] is produced for every non-empty line the board sends. The
//! variants and their wire names follow the firmware's JSON protocol:
//!
//! | `event`   | fields                |
//! |-----------|-----------------------|
//! | `menu`    | `selection`           |
//! | `state`   | `state`               |
//! | `keyword` | `label`, `score`      |
//! | `select`  | `option`              |
//! | `data`    | `option`, `payload`   |
//! | `error`   | `where`, `msg`        |
//!
//! Anything else becomes [`Event::Raw`].

use super::field::Field;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::fmt;

/// `where` value used for errors raised by the line framer.
pub const HOST_FRAMER: &str = "host.framer";

/// `where` value used for errors raised while reading the serial port.
pub const HOST_SERIAL: &str = "host.serial";

/// The closed set of event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Menu navigation.
    Menu,
    /// Device state transition.
    State,
    /// Keyword spotting result (gesture or spoken command).
    Keyword,
    /// Option selected from a menu.
    Select,
    /// Sensor reading or other payload.
    Data,
    /// Error reported by the device or by this host.
    Error,
    /// Line that is not a recognized event.
    Raw,
}

impl EventKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Menu,
        Self::State,
        Self::Keyword,
        Self::Select,
        Self::Data,
        Self::Error,
        Self::Raw,
    ];

    /// Looks up a kind by its wire discriminant.
    ///
    /// `raw` is not a wire discriminant; a device line claiming it is
    /// treated like any other unknown kind.
    #[must_use]
    pub fn from_discriminant(value: &str) -> Option<Self> {
        match value {
            "menu" => Some(Self::Menu),
            "state" => Some(Self::State),
            "keyword" => Some(Self::Keyword),
            "select" => Some(Self::Select),
            "data" => Some(Self::Data),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Returns the lowercase name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::State => "state",
            Self::Keyword => "keyword",
            Self::Select => "select",
            Self::Data => "data",
            Self::Error => "error",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side of the wire an error was raised on.
///
/// Only [`Event::local_error`] produces [`Origin::Host`]; the decoder always
/// yields [`Origin::Device`], whatever the device put in `where`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Origin {
    /// Reported by the board.
    #[default]
    Device,
    /// Raised by this host's framer or transport.
    Host,
}

/// Payload of a `data` event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// Free text.
    Text(String),
    /// A numeric reading, kept exactly as sent.
    Number(Number),
    /// A structured reading.
    Map(Map<String, Value>),
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => fmt::Display::fmt(number, f),
            Self::Map(map) => {
                let rendered = serde_json::to_string(map).map_err(|_| fmt::Error)?;
                f.write_str(&rendered)
            }
        }
    }
}

/// One classified line of device output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum Event {
    /// Menu navigation.
    Menu {
        /// Highlighted menu entry.
        #[serde(skip_serializing_if = "Field::is_missing")]
        selection: Field<String>,
    },
    /// Device state transition.
    State {
        /// New state name.
        #[serde(skip_serializing_if = "Field::is_missing")]
        state: Field<String>,
    },
    /// Keyword spotting result.
    Keyword {
        /// Recognized label.
        #[serde(skip_serializing_if = "Field::is_missing")]
        label: Field<String>,
        /// Classifier confidence.
        #[serde(skip_serializing_if = "Field::is_missing")]
        score: Field<f64>,
    },
    /// Option chosen from a menu.
    Select {
        /// Chosen option.
        #[serde(skip_serializing_if = "Field::is_missing")]
        option: Field<String>,
    },
    /// Reading produced for an option.
    Data {
        /// Option that produced the reading.
        #[serde(skip_serializing_if = "Field::is_missing")]
        option: Field<String>,
        /// The reading itself.
        #[serde(skip_serializing_if = "Field::is_missing")]
        payload: Field<Payload>,
    },
    /// Error report.
    Error {
        /// Component that failed.
        #[serde(rename = "where", skip_serializing_if = "Field::is_missing")]
        location: Field<String>,
        /// Failure description.
        #[serde(rename = "msg", skip_serializing_if = "Field::is_missing")]
        message: Field<String>,
        /// Where the error was raised; not part of the wire format.
        #[serde(skip)]
        origin: Origin,
    },
    /// Line that is not a recognized event, kept verbatim.
    Raw {
        /// The line as received (after trimming).
        text: String,
    },
}

impl Event {
    /// Creates a raw text event.
    #[must_use]
    pub fn raw(text: impl Into<String>) -> Self {
        Self::Raw { text: text.into() }
    }

    /// Creates an error event raised on this side of the wire.
    #[must_use]
    pub fn local_error(location: &str, message: impl Into<String>) -> Self {
        Self::Error {
            location: Field::Present(location.to_string()),
            message: Field::Present(message.into()),
            origin: Origin::Host,
        }
    }

    /// Returns the kind of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Menu { .. } => EventKind::Menu,
            Self::State { .. } => EventKind::State,
            Self::Keyword { .. } => EventKind::Keyword,
            Self::Select { .. } => EventKind::Select,
            Self::Data { .. } => EventKind::Data,
            Self::Error { .. } => EventKind::Error,
            Self::Raw { .. } => EventKind::Raw,
        }
    }

    /// Returns `true` for errors raised by this host rather than the device.
    #[must_use]
    pub fn is_local_error(&self) -> bool {
        match self {
            Self::Error { origin, .. } => *origin == Origin::Host,
            _ => false,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Menu { selection } => write!(f, "[MENU] selection={selection}"),
            Self::State { state } => write!(f, "[STATE] {state}"),
            Self::Keyword { label, score } => write!(f, "[KW] label={label} score={score}"),
            Self::Select { option } => write!(f, "[SELECT] option={option}"),
            Self::Data { option, payload } => {
                write!(f, "[DATA] option={option} payload={payload}")
            }
            Self::Error {
                location, message, ..
            } => write!(f, "[ERROR@{location}] {message}"),
            Self::Raw { text } => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_discriminants() {
        for kind in EventKind::ALL {
            if kind == EventKind::Raw {
                assert_eq!(EventKind::from_discriminant(kind.as_str()), None);
            } else {
                assert_eq!(EventKind::from_discriminant(kind.as_str()), Some(kind));
            }
        }
        assert_eq!(EventKind::from_discriminant("MENU"), None);
    }

    #[test]
    fn test_display_matches_console_view() {
        let event = Event::Keyword {
            label: Field::Present("left".to_string()),
            score: Field::Present(0.87),
        };
        assert_eq!(event.to_string(), "[KW] label=left score=0.87");

        let event = Event::Error {
            location: Field::Present("imu".to_string()),
            message: Field::Missing,
            origin: Origin::Device,
        };
        assert_eq!(event.to_string(), "[ERROR@imu] <missing>");

        assert_eq!(Event::raw("BOOT OK").to_string(), "BOOT OK");
    }

    #[test]
    fn test_payload_display() {
        let mut map = Map::new();
        map.insert("t".to_string(), json!(21.5));
        let event = Event::Data {
            option: Field::Present("temp".to_string()),
            payload: Field::Present(Payload::Map(map)),
        };
        assert_eq!(event.to_string(), r#"[DATA] option=temp payload={"t":21.5}"#);
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let event = Event::local_error(HOST_FRAMER, "line too long");
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({"event": "error", "where": "host.framer", "msg": "line too long"})
        );
        assert!(event.is_local_error());
    }

    #[test]
    fn test_serialize_omits_missing_fields() {
        let event = Event::Keyword {
            label: Field::Present("up".to_string()),
            score: Field::Missing,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value, json!({"event": "keyword", "label": "up"}));
    }

    #[test]
    fn test_device_error_is_not_local() {
        let event = Event::Error {
            location: Field::Present("mic".to_string()),
            message: Field::Present("overrun".to_string()),
            origin: Origin::Device,
        };
        assert!(!event.is_local_error());
        assert_eq!(event.kind(), EventKind::Error);
    }

    #[test]
    fn test_host_location_alone_is_not_local() {
        let device = Event::Error {
            location: Field::Present(HOST_SERIAL.to_string()),
            message: Field::Present("spoof".to_string()),
            origin: Origin::Device,
        };
        let host = Event::local_error(HOST_SERIAL, "spoof");
        assert!(!device.is_local_error());
        assert!(host.is_local_error());
        assert_ne!(device, host);
        assert_eq!(
            serde_json::to_value(&device).unwrap(),
            serde_json::to_value(&host).unwrap()
        );
    }
}
