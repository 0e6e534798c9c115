//! The raw revision log as delivered by the vendor endpoint.
//!
//! A log is a json object with two array sections: `chunkedSnapshot`, the
//! starting state split into chunks, and `changelog`, one entry per applied
//! revision. Responses arrive behind a five-byte anti-hijacking prefix which
//! has to be removed before decoding.

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Prefix the vendor prepends to every json response.
pub const SENTINEL: &str = ")]}'\n";
pub const SNAPSHOT_KEY: &str = "chunkedSnapshot";
pub const CHANGELOG_KEY: &str = "changelog";

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("revision log is missing the `{0}` section")]
    MissingSection(&'static str),
    #[error("response does not start with the expected json prefix")]
    MissingSentinel,
    #[error("revision log is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("revision log is not a json object")]
    NotAnObject,
}

/// An undecoded revision log. Immutable once received.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLog {
    value: Value,
}

impl RawLog {
    /// Decodes a response body, requiring the sentinel prefix.
    pub fn from_response(body: &str) -> Result<Self, FormatError> {
        let json = body
            .strip_prefix(SENTINEL)
            .ok_or(FormatError::MissingSentinel)?;
        Self::from_json(json)
    }

    /// Decodes a saved log, with or without the sentinel prefix.
    pub fn from_saved(text: &str) -> Result<Self, FormatError> {
        match text.strip_prefix(SENTINEL) {
            Some(json) => Self::from_json(json),
            None => Self::from_json(text),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, FormatError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    pub fn from_value(value: Value) -> Result<Self, FormatError> {
        if !value.is_object() {
            return Err(FormatError::NotAnObject);
        }
        Ok(Self { value })
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    pub fn snapshot(&self) -> Result<&[Value], FormatError> {
        self.section(SNAPSHOT_KEY)
    }

    pub fn changelog(&self) -> Result<&[Value], FormatError> {
        self.section(CHANGELOG_KEY)
    }

    /// Checks that both sections are present.
    pub fn validate(&self) -> Result<(), FormatError> {
        self.snapshot()?;
        self.changelog()?;
        Ok(())
    }

    /// One-space indented rendering written out as `revision-log.txt`.
    pub fn to_pretty_string(&self) -> Result<String, FormatError> {
        let mut out = Vec::new();
        let formatter = PrettyFormatter::with_indent(b" ");
        let mut serializer = Serializer::with_formatter(&mut out, formatter);
        self.value.serialize(&mut serializer)?;
        String::from_utf8(out).map_err(|err| {
            let io = std::io::Error::new(std::io::ErrorKind::InvalidData, err);
            FormatError::Json(serde_json::Error::io(io))
        })
    }

    fn section(&self, key: &'static str) -> Result<&[Value], FormatError> {
        self.value
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .ok_or(FormatError::MissingSection(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_strips_sentinel() {
        let body = ")]}'\n{\"chunkedSnapshot\": [], \"changelog\": [[{\"ty\": \"is\"}, 1]]}";
        let log = RawLog::from_response(body).unwrap();
        assert!(log.snapshot().unwrap().is_empty());
        assert_eq!(log.changelog().unwrap().len(), 1);
    }

    #[test]
    fn test_from_response_requires_sentinel() {
        let err = RawLog::from_response("{\"chunkedSnapshot\": [], \"changelog\": []}");
        assert!(matches!(err, Err(FormatError::MissingSentinel)));
        let err = RawLog::from_response(")]}'{}");
        assert!(matches!(err, Err(FormatError::MissingSentinel)));
    }

    #[test]
    fn test_from_saved_accepts_both_forms() {
        let plain = "{\"chunkedSnapshot\": [], \"changelog\": []}";
        assert!(RawLog::from_saved(plain).is_ok());
        assert!(RawLog::from_saved(&format!("{SENTINEL}{plain}")).is_ok());
    }

    #[test]
    fn test_missing_sections() {
        let log = RawLog::from_json("{\"changelog\": []}").unwrap();
        assert!(matches!(
            log.snapshot(),
            Err(FormatError::MissingSection(SNAPSHOT_KEY))
        ));
        let log = RawLog::from_json("{\"chunkedSnapshot\": []}").unwrap();
        assert!(matches!(
            log.validate(),
            Err(FormatError::MissingSection(CHANGELOG_KEY))
        ));
    }

    #[test]
    fn test_pretty_string_uses_single_space_indent() {
        let log = RawLog::from_json("{\"chunkedSnapshot\": [], \"changelog\": [1]}").unwrap();
        assert_eq!(
            log.to_pretty_string().unwrap(),
            "{\n \"chunkedSnapshot\": [],\n \"changelog\": [\n  1\n ]\n}"
        );
    }

    #[test]
    fn test_rejects_non_objects() {
        assert!(matches!(
            RawLog::from_json("[1, 2]"),
            Err(FormatError::NotAnObject)
        ));
        assert!(matches!(RawLog::from_json("{"), Err(FormatError::Json(_))));
    }
}
