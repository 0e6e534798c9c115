//! Document revision logs: the flattener and the passes that consume it.
//!
//! [`flatten`] turns a [`RawLog`] into a [`FlatLog`], an ordered list of
//! [`FlatLine`]s. Every compound changelog entry is expanded into one record
//! per atomic action and every detail object has its keys renamed through
//! [`crate::core::keymap`]. The order of the flat log is the order the
//! vendor applied the edits, which is the only order replay is correct in.
//!
//! A flat log renders as text, one line per entry:
//!
//! ```text
//! chunkedSnapshot
//! {"type": "is", "string": "hello"}
//! 1|5|text|adj_style|{"bold": true}
//! changelog
//! 1500000000000|user1|2|None|ins|{"type": "is", "ins_index": 6, "string": " world"}
//! ```

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::core::json::{self, JsonStyle};
use crate::core::keymap::{remap, rename_keys};
use crate::revlog::{CHANGELOG_KEY, FormatError, RawLog, SNAPSHOT_KEY};

pub mod action;
pub mod replay;
pub mod scan;

pub use action::{ScanEvent, TextEdit};
pub use replay::replay;
pub use scan::{Drawing, ScanResult, Suggestion, SuggestionTable, scan};

pub const DEFAULT_DELIMITER: char = '|';

/// Positional fields projected from every snapshot style entry.
const SNAPSHOT_FIELDS: [&str; 3] = ["si", "ei", "st"];
const MULTISET_KEY: &str = "mts";

/// Rendering of a metadata field the entry does not carry.
const MISSING_FIELD: &str = "None";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Snapshot,
    Changelog,
}

impl Section {
    pub fn marker(self) -> &'static str {
        match self {
            Section::Snapshot => SNAPSHOT_KEY,
            Section::Changelog => CHANGELOG_KEY,
        }
    }
}

/// One flattened action: shared metadata, the action tag, the renamed detail.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRecord {
    pub fields: Vec<String>,
    pub action: String,
    pub detail: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlatLine {
    /// Start of a log section.
    Header(Section),
    /// Initial document content pasted into the first revision.
    Chunk(Map<String, Value>),
    Record(FlatRecord),
    /// A saved line that carries no json object.
    Opaque(String),
}

impl FlatLine {
    /// The json object carried by the line, if any.
    pub fn detail(&self) -> Option<&Map<String, Value>> {
        match self {
            FlatLine::Chunk(detail) => Some(detail),
            FlatLine::Record(record) => Some(&record.detail),
            FlatLine::Header(_) | FlatLine::Opaque(_) => None,
        }
    }

    pub fn render(&self, delimiter: char) -> serde_json::Result<String> {
        match self {
            FlatLine::Header(section) => Ok(section.marker().to_string()),
            FlatLine::Chunk(detail) => json::to_string(detail, JsonStyle::Ascii),
            FlatLine::Record(record) => {
                let mut line = String::new();
                for field in &record.fields {
                    line.push_str(field);
                    line.push(delimiter);
                }
                line.push_str(&record.action);
                line.push(delimiter);
                line.push_str(&json::to_string(&record.detail, JsonStyle::Ascii)?);
                Ok(line)
            }
            FlatLine::Opaque(text) => Ok(text.clone()),
        }
    }

    /// Reads back one line of a saved flat log.
    ///
    /// Headers are accepted bare or followed by a delimited empty object. The
    /// detail object starts at the first `{` of the line. Lines without a
    /// parseable object are kept as [`FlatLine::Opaque`].
    pub fn parse(line: &str, delimiter: char) -> FlatLine {
        for section in [Section::Snapshot, Section::Changelog] {
            if line == section.marker() || line == delimited_header(section, delimiter) {
                return FlatLine::Header(section);
            }
        }

        let Some(open) = line.find('{') else {
            return FlatLine::Opaque(line.to_string());
        };
        let Ok(detail) = serde_json::from_str::<Map<String, Value>>(&line[open..]) else {
            return FlatLine::Opaque(line.to_string());
        };

        let prefix = &line[..open];
        if prefix.is_empty() {
            return FlatLine::Chunk(detail);
        }
        let prefix = prefix.strip_suffix(delimiter).unwrap_or(prefix);
        let mut fields: Vec<String> = prefix.split(delimiter).map(str::to_string).collect();
        let action = fields.pop().unwrap_or_default();
        FlatLine::Record(FlatRecord {
            fields,
            action,
            detail,
        })
    }
}

/// Header form some saved flat logs use, e.g. `chunkedSnapshot|{}`.
fn delimited_header(section: Section, delimiter: char) -> String {
    format!("{}{delimiter}{{}}", section.marker())
}

/// The ordered, flattened form of a revision log.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatLog {
    lines: Vec<FlatLine>,
    delimiter: char,
}

impl Default for FlatLog {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

impl FlatLog {
    pub fn new(delimiter: char) -> Self {
        Self {
            lines: Vec::new(),
            delimiter,
        }
    }

    pub fn lines(&self) -> &[FlatLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn push(&mut self, line: FlatLine) {
        self.lines.push(line);
    }

    /// Lines between the header of `section` and the next header.
    pub fn section(&self, section: Section) -> &[FlatLine] {
        let Some(start) = self
            .lines
            .iter()
            .position(|line| *line == FlatLine::Header(section))
        else {
            return &[];
        };
        let body = &self.lines[start + 1..];
        let end = body
            .iter()
            .position(|line| matches!(line, FlatLine::Header(_)))
            .unwrap_or(body.len());
        &body[..end]
    }

    /// Newline-joined rendering written out as `flat-log.txt`.
    pub fn to_text(&self) -> serde_json::Result<String> {
        let rendered = self
            .lines
            .iter()
            .map(|line| line.render(self.delimiter))
            .collect::<serde_json::Result<Vec<_>>>()?;
        Ok(rendered.join("\n"))
    }

    pub fn parse(text: &str, delimiter: char) -> Self {
        Self {
            lines: text
                .lines()
                .map(|line| FlatLine::parse(line, delimiter))
                .collect(),
            delimiter,
        }
    }
}

/// Flattens both sections of `log`.
///
/// Fails only when a section is missing. Entries with an unexpected shape are
/// skipped so that one odd revision does not lose the rest of the history.
pub fn flatten(log: &RawLog, delimiter: char) -> Result<FlatLog, FormatError> {
    let snapshot = log.snapshot()?;
    let changelog = log.changelog()?;

    let mut flat = FlatLog::new(delimiter);
    flat.push(FlatLine::Header(Section::Snapshot));
    flatten_snapshot(snapshot, &mut flat);
    flat.push(FlatLine::Header(Section::Changelog));
    for entry in changelog {
        flatten_changelog_entry(entry, &mut flat);
    }

    info!(
        snapshot_entries = snapshot.len(),
        changelog_entries = changelog.len(),
        lines = flat.len(),
        "flattened revision log"
    );
    Ok(flat)
}

fn flatten_snapshot(snapshot: &[Value], flat: &mut FlatLog) {
    // Only the first chunk list carries entries.
    let Some(entries) = snapshot.first().and_then(Value::as_array) else {
        return;
    };

    let mut entries = entries.iter().filter_map(Value::as_object).peekable();
    if entries.peek().is_some_and(|first| first.contains_key("s")) {
        if let Some(first) = entries.next() {
            flat.push(FlatLine::Chunk(initial_chunk(first)));
        }
    }

    for entry in entries {
        flat.push(FlatLine::Record(snapshot_record(entry)));
    }
}

/// The pasted initial content, reduced to its `type` and `string`.
fn initial_chunk(entry: &Map<String, Value>) -> Map<String, Value> {
    let mut chunk: Map<String, Value> = entry
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "ty" | "s" | "ibi"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    if let Some(ty) = entry.get("ty") {
        chunk.insert("type".to_string(), ty.clone());
    }
    if let Some(string) = entry.get("s") {
        chunk.insert("string".to_string(), string.clone());
    }
    chunk
}

fn snapshot_record(entry: &Map<String, Value>) -> FlatRecord {
    let fields = SNAPSHOT_FIELDS
        .iter()
        .map(|key| {
            entry
                .get(*key)
                .map(scalar_text)
                .unwrap_or_else(|| MISSING_FIELD.to_string())
        })
        .collect();
    let detail = entry
        .get("sm")
        .and_then(Value::as_object)
        .map(rename_keys)
        .unwrap_or_default();
    FlatRecord {
        fields,
        action: action_tag(entry),
        detail,
    }
}

fn flatten_changelog_entry(entry: &Value, flat: &mut FlatLog) {
    let Some(items) = entry.as_array() else {
        debug!(%entry, "skipping changelog entry that is not an array");
        return;
    };
    let Some(action) = items.first().and_then(Value::as_object) else {
        debug!(%entry, "skipping changelog entry without an action");
        return;
    };

    // `[action, metadata.., trailer]`
    let metadata = if items.len() > 2 {
        &items[1..items.len() - 1]
    } else {
        &[]
    };
    let fields: Vec<String> = metadata.iter().map(scalar_text).collect();
    expand_multiset(action, &fields, flat);
}

/// Emits one record per leaf action of a possibly nested multiset.
fn expand_multiset(action: &Map<String, Value>, fields: &[String], flat: &mut FlatLog) {
    match action.get(MULTISET_KEY).and_then(Value::as_array) {
        Some(children) => {
            for child in children.iter().filter_map(Value::as_object) {
                expand_multiset(child, fields, flat);
            }
        }
        None => flat.push(FlatLine::Record(FlatRecord {
            fields: fields.to_vec(),
            action: action_tag(action),
            detail: rename_keys(action),
        })),
    }
}

fn action_tag(action: &Map<String, Value>) -> String {
    action
        .get("ty")
        .and_then(Value::as_str)
        .map(|ty| remap(ty).to_string())
        .unwrap_or_default()
}

/// Text form of a metadata scalar. Strings are written verbatim, `null` and
/// booleans in the spelling the downstream tooling reads (`None`, `True`,
/// `False`), everything else as json.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => MISSING_FIELD.to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}
