//! Typed views over renamed action details.
//!
//! The flat log keeps details as schema-less json. The passes that act on
//! them decode the handful of shapes they care about here, once per record.

use serde_json::{Map, Value};

use crate::core::{self, IndexOrigin};

pub const INSERT_SUGGESTION: &str = "iss";
pub const DELETE_SUGGESTION: &str = "dss";

/// Action types starting with these prefixes edit the document text.
const INSERT_PREFIX: &str = "is";
const DELETE_PREFIX: &str = "ds";

/// A field a recognised action needed but did not carry.
pub type MissingField = &'static str;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEdit<'a> {
    Insert { index: i64, text: &'a str },
    Delete { start: i64, end: i64 },
}

impl<'a> TextEdit<'a> {
    /// `Ok(None)` when `detail` is not a text edit at all.
    pub fn decode(detail: &'a Map<String, Value>) -> Result<Option<Self>, MissingField> {
        let Some(kind) = detail.get("type").and_then(Value::as_str) else {
            return Ok(None);
        };
        if kind.starts_with(INSERT_PREFIX) {
            Ok(Some(TextEdit::Insert {
                index: int_field(detail, "ins_index")?,
                text: str_field(detail, "string")?,
            }))
        } else if kind.starts_with(DELETE_PREFIX) {
            Ok(Some(TextEdit::Delete {
                start: int_field(detail, "start_index")?,
                end: int_field(detail, "end_index")?,
            }))
        } else {
            Ok(None)
        }
    }

    pub fn apply(&self, text: &str, origin: IndexOrigin) -> String {
        match *self {
            TextEdit::Insert { index, text: new } => core::insert(text, new, index, origin.offset()),
            TextEdit::Delete { start, end } => core::delete(text, start, end, origin.offset()),
        }
    }
}

/// What the object scanner makes of one detail object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScanEvent<'a> {
    Image {
        id: &'a str,
    },
    Drawing {
        id: &'a str,
        element: &'a Map<String, Value>,
    },
    InsertSuggestion {
        id: &'a str,
        index: i64,
        text: &'a str,
    },
    DeleteSuggestion {
        start: i64,
        end: i64,
    },
}

impl<'a> ScanEvent<'a> {
    /// Embedded elements take priority over the action type: a detail with an
    /// `epm.ee_eo` descriptor is never a suggestion.
    pub fn classify(detail: &'a Map<String, Value>) -> Result<Option<Self>, MissingField> {
        if let Some(element) = element_descriptor(detail) {
            if element.contains_key("img_cosmoId") {
                return Ok(Some(ScanEvent::Image {
                    id: str_field(element, "img_cosmoId")?,
                }));
            }
            if element.contains_key("d_id") {
                return Ok(Some(ScanEvent::Drawing {
                    id: str_field(element, "d_id")?,
                    element,
                }));
            }
            return Ok(None);
        }

        match detail.get("type").and_then(Value::as_str) {
            Some(INSERT_SUGGESTION) => Ok(Some(ScanEvent::InsertSuggestion {
                id: str_field(detail, "sug_id")?,
                index: int_field(detail, "ins_index")?,
                text: str_field(detail, "string")?,
            })),
            Some(DELETE_SUGGESTION) => Ok(Some(ScanEvent::DeleteSuggestion {
                start: int_field(detail, "start_index")?,
                end: int_field(detail, "end_index")?,
            })),
            _ => Ok(None),
        }
    }
}

fn element_descriptor(detail: &Map<String, Value>) -> Option<&Map<String, Value>> {
    detail
        .get("epm")
        .and_then(Value::as_object)
        .and_then(|epm| epm.get("ee_eo"))
        .and_then(Value::as_object)
}

pub fn int_field(map: &Map<String, Value>, key: &'static str) -> Result<i64, MissingField> {
    map.get(key).and_then(Value::as_i64).ok_or(key)
}

pub fn str_field<'a>(
    map: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a str, MissingField> {
    map.get(key).and_then(Value::as_str).ok_or(key)
}

/// Reads an element dimension. The vendor sends these as integers, floats or
/// numeric strings; fractions are truncated.
pub fn parse_dimension(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float.trunc() as i64)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>().ok().or_else(|| {
                text.parse::<f64>()
                    .ok()
                    .filter(|float| float.is_finite())
                    .map(|float| float.trunc() as i64)
            })
        }
        _ => None,
    }
}
