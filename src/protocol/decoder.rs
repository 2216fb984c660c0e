//! Event decoding.
//!
//! [`decode`] never fails: boot banners, debug prints and events from newer
//! firmware all come through as [`Event::Raw`] with the line as received.
//! [`classify`] is the same decoder with the downgrade reason exposed.

use crate::core::{Event, EventKind, Field, Origin, Payload};
use crate::error::DecodeError;
use serde_json::{Map, Value};

/// Wire name of the discriminant field.
pub const DISCRIMINANT: &str = "event";

/// Decodes one line into an event, downgrading anything unrecognized to
/// [`Event::Raw`].
///
/// # Examples
///
/// ```
/// use ardu_monitor::core::{Event, Field};
/// use ardu_monitor::protocol::decode;
///
/// let event = decode(r#"{"event":"keyword","label":"left","score":0.87}"#);
/// assert_eq!(
///     event,
///     Event::Keyword {
///         label: Field::Present("left".to_string()),
///         score: Field::Present(0.87),
///     }
/// );
///
/// assert_eq!(decode("BOOT OK"), Event::raw("BOOT OK"));
/// ```
#[must_use]
pub fn decode(line: &str) -> Event {
    classify(line).unwrap_or_else(|reason| {
        tracing::trace!(%reason, line, "line kept as raw text");
        Event::raw(line)
    })
}

/// Decodes one line, reporting why it is not a recognized event.
///
/// # Errors
///
/// - [`DecodeError::MalformedLine`] if the line is not a JSON object.
/// - [`DecodeError::DecodeMismatch`] if the object has no known `event`.
pub fn classify(line: &str) -> Result<Event, DecodeError> {
    let value: Value = serde_json::from_str(line).map_err(|e| DecodeError::MalformedLine {
        reason: e.to_string(),
    })?;

    let Value::Object(fields) = value else {
        return Err(DecodeError::MalformedLine {
            reason: "not a JSON object".to_string(),
        });
    };

    let kind = match fields.get(DISCRIMINANT) {
        Some(Value::String(name)) => {
            EventKind::from_discriminant(name).ok_or_else(|| DecodeError::DecodeMismatch {
                discriminant: Some(name.clone()),
            })?
        }
        Some(other) => {
            return Err(DecodeError::DecodeMismatch {
                discriminant: Some(other.to_string()),
            });
        }
        None => return Err(DecodeError::DecodeMismatch { discriminant: None }),
    };

    Ok(match kind {
        EventKind::Menu => Event::Menu {
            selection: text(&fields, "selection"),
        },
        EventKind::State => Event::State {
            state: text(&fields, "state"),
        },
        EventKind::Keyword => Event::Keyword {
            label: text(&fields, "label"),
            score: number(&fields, "score"),
        },
        EventKind::Select => Event::Select {
            option: text(&fields, "option"),
        },
        EventKind::Data => Event::Data {
            option: text(&fields, "option"),
            payload: payload(&fields, "payload"),
        },
        EventKind::Error => Event::Error {
            location: text(&fields, "where"),
            message: text(&fields, "msg"),
            origin: Origin::Device,
        },
        // from_discriminant never yields Raw
        EventKind::Raw => {
            return Err(DecodeError::DecodeMismatch {
                discriminant: Some(kind.as_str().to_string()),
            });
        }
    })
}

/// Reads a text field. Numbers and booleans are rendered as text since
/// firmware often sends menu indices as integers.
fn text(fields: &Map<String, Value>, key: &str) -> Field<String> {
    match fields.get(key) {
        None => Field::Missing,
        Some(Value::String(s)) => Field::Present(s.clone()),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Field::Present(v.to_string()),
        Some(other) => Field::Mistyped(other.clone()),
    }
}

fn number(fields: &Map<String, Value>, key: &str) -> Field<f64> {
    match fields.get(key) {
        None => Field::Missing,
        Some(v) => v
            .as_f64()
            .map_or_else(|| Field::Mistyped(v.clone()), Field::Present),
    }
}

fn payload(fields: &Map<String, Value>, key: &str) -> Field<Payload> {
    match fields.get(key) {
        None => Field::Missing,
        Some(Value::String(s)) => Field::Present(Payload::Text(s.clone())),
        Some(Value::Number(n)) => Field::Present(Payload::Number(n.clone())),
        Some(Value::Object(map)) => Field::Present(Payload::Map(map.clone())),
        Some(other) => Field::Mistyped(other.clone()),
    }
}
