//! Single forward pass over a flat log that collects embedded objects and
//! tracks suggestion spans.

use indexmap::{IndexMap, IndexSet};
use serde::ser::{Serialize, SerializeTuple, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::core::json::{self, JsonStyle};
use crate::core::{self, IndexOrigin};

use super::FlatLog;
use super::action::{ScanEvent, parse_dimension};

/// A drawing embedded in the document, fetched later at its inserted size.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Drawing {
    pub id: String,
    pub width: i64,
    pub height: i64,
}

impl Drawing {
    /// Builds a drawing from an element descriptor carrying `img_wth` and
    /// `img_ht`.
    pub fn from_element(id: &str, element: &Map<String, Value>) -> Option<Self> {
        Some(Self {
            id: id.to_string(),
            width: element.get("img_wth").and_then(parse_dimension)?,
            height: element.get("img_ht").and_then(parse_dimension)?,
        })
    }
}

/// A tracked change proposed by a collaborator.
///
/// `start` and `end` are inclusive document positions of the suggested text.
/// A suggestion whose text has been fully removed is kept with `end` below
/// `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub id: String,
    pub start: i64,
    pub end: i64,
    pub content: String,
    pub deleted: Vec<String>,
}

impl Suggestion {
    pub fn new(id: impl Into<String>, start: i64, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            id: id.into(),
            start,
            end: start.saturating_add(core::char_len(&content) - 1),
            content,
            deleted: Vec::new(),
        }
    }

    /// Splices `text` in at document position `index`.
    pub fn insert_text(&mut self, index: i64, text: &str) {
        let relative = index.saturating_sub(self.start).saturating_add(1);
        self.content = core::insert(
            &self.content,
            text,
            relative,
            IndexOrigin::OneBased.offset(),
        );
        self.end = self.end.saturating_add(core::char_len(text));
    }

    /// Removes document positions `start..=end` from the suggested text and
    /// records what was removed, even when nothing was.
    pub fn delete_text(&mut self, start: i64, end: i64) {
        let from = start.saturating_sub(self.start);
        let to = end.saturating_sub(self.start).saturating_add(1);
        let removed = core::slice(&self.content, from, to).to_string();
        self.content = core::delete(&self.content, from, to, 0);
        self.end = self.end.saturating_sub(core::char_len(&removed));
        self.deleted.push(removed);
    }

    pub fn contains(&self, index: i64) -> bool {
        self.start <= index && index <= self.end
    }
}

/// Serialised as `[start, end, id, content, deleted]`.
impl Serialize for Suggestion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(5)?;
        tuple.serialize_element(&self.start)?;
        tuple.serialize_element(&self.end)?;
        tuple.serialize_element(&self.id)?;
        tuple.serialize_element(&self.content)?;
        tuple.serialize_element(&self.deleted)?;
        tuple.end()
    }
}

/// Suggestions by id, in the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct SuggestionTable {
    entries: IndexMap<String, Suggestion>,
}

impl SuggestionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Suggestion> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Suggestion> {
        self.entries.values()
    }

    /// Starts a suggestion on first sight of `id`, otherwise extends it.
    pub fn insert_text(&mut self, id: &str, index: i64, text: &str) {
        match self.entries.get_mut(id) {
            Some(suggestion) => suggestion.insert_text(index, text),
            None => {
                self.entries
                    .insert(id.to_string(), Suggestion::new(id, index, text));
            }
        }
    }

    /// Removes `start..=end` from the suggestion covering `start`.
    ///
    /// Returns the id of the suggestion edited, `None` when no tracked
    /// suggestion covers the range.
    pub fn delete_text(&mut self, start: i64, end: i64) -> Option<String> {
        let Some(id) = self.find_by_index(start).map(|s| s.id.clone()) else {
            debug!(start, end, "no suggestion covers deleted range");
            return None;
        };
        if let Some(suggestion) = self.entries.get_mut(&id) {
            suggestion.delete_text(start, end);
        }
        Some(id)
    }

    /// The suggestion whose `[start, end]` contains `index`. Overlapping spans
    /// resolve to the first one tracked.
    pub fn find_by_index(&self, index: i64) -> Option<&Suggestion> {
        let mut matches = self.entries.values().filter(|s| s.contains(index));
        let first = matches.next()?;
        let extra = matches.count();
        if extra > 0 {
            warn!(
                index,
                id = %first.id,
                candidates = extra + 1,
                "several suggestions cover index, using the first"
            );
        }
        Some(first)
    }

    /// Rendering written out as `suggestions.txt`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        json::to_string(self, JsonStyle::Unicode)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanResult {
    pub image_ids: IndexSet<String>,
    pub drawings: Vec<Drawing>,
    pub suggestions: SuggestionTable,
}

/// Collects image ids, drawings and suggestions from `flat`, in log order.
pub fn scan(flat: &FlatLog) -> ScanResult {
    let mut result = ScanResult::default();

    for detail in flat.lines().iter().filter_map(|line| line.detail()) {
        let event = match ScanEvent::classify(detail) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(field) => {
                debug!(field, "skipping scan record with missing field");
                continue;
            }
        };
        match event {
            ScanEvent::Image { id } => {
                result.image_ids.insert(id.to_string());
            }
            ScanEvent::Drawing { id, element } => {
                if result.drawings.iter().any(|drawing| drawing.id == id) {
                    continue;
                }
                match Drawing::from_element(id, element) {
                    Some(drawing) => result.drawings.push(drawing),
                    None => warn!(id, "drawing has no usable dimensions"),
                }
            }
            ScanEvent::InsertSuggestion { id, index, text } => {
                result.suggestions.insert_text(id, index, text);
            }
            ScanEvent::DeleteSuggestion { start, end } => {
                result.suggestions.delete_text(start, end);
            }
        }
    }

    info!(
        images = result.image_ids.len(),
        drawings = result.drawings.len(),
        suggestions = result.suggestions.len(),
        "scanned flat log"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Suggestion {
        Suggestion::new("abc", 1, "test")
    }

    #[test]
    fn test_new_suggestion_span() {
        let suggestion = sample();
        assert_eq!(suggestion.start, 1);
        assert_eq!(suggestion.end, 4);
        assert!(suggestion.deleted.is_empty());
    }

    #[test]
    fn test_insert_extends_suggestion() {
        let mut suggestion = sample();
        suggestion.insert_text(1, "test");
        assert_eq!(suggestion.content, "testtest");
        assert_eq!(suggestion.end, 8);
        suggestion.insert_text(9, "!");
        assert_eq!(suggestion.content, "testtest!");
    }

    #[test]
    fn test_delete_records_removed_text() {
        let mut suggestion = sample();
        suggestion.delete_text(2, 4);
        assert_eq!(suggestion.content, "t");
        assert_eq!(suggestion.end, 1);
        assert_eq!(suggestion.deleted, vec!["est"]);
    }

    #[test]
    fn test_delete_outside_content_records_empty_fragment() {
        let mut suggestion = sample();
        suggestion.delete_text(10, 12);
        assert_eq!(suggestion.content, "test");
        assert_eq!(suggestion.end, 4);
        assert_eq!(suggestion.deleted, vec![""]);
    }

    #[test]
    fn test_find_by_index() {
        let mut table = SuggestionTable::new();
        table.insert_text("sugid1", 148, "no content here..");
        table.insert_text("sugid2", 165, "def");
        assert_eq!(table.find_by_index(148).map(|s| s.id.as_str()), Some("sugid1"));
        assert_eq!(table.find_by_index(166).map(|s| s.id.as_str()), Some("sugid2"));
        assert!(table.find_by_index(147).is_none());
        assert!(table.find_by_index(168).is_none());
    }

    #[test]
    fn test_overlap_resolves_to_first() {
        let mut table = SuggestionTable::new();
        table.insert_text("a", 1, "xxxx");
        table.insert_text("b", 3, "yy");
        assert_eq!(table.find_by_index(3).map(|s| s.id.as_str()), Some("a"));
        assert_eq!(table.delete_text(3, 3), Some("a".to_string()));
        assert_eq!(table.get("b").map(|s| s.content.as_str()), Some("yy"));
    }

    #[test]
    fn test_table_json_keeps_unicode() {
        let mut table = SuggestionTable::new();
        table.insert_text("s.1", 37, "café");
        table.insert_text("s.2", 104, "\n\n");
        table.delete_text(104, 105);
        assert_eq!(
            table.to_json().unwrap(),
            r#"{"s.1": [37, 40, "s.1", "café", []], "s.2": [104, 103, "s.2", "", ["\n\n"]]}"#
        );
    }

    #[test]
    fn test_drawing_from_element() {
        let element = json!({"d_id": "d", "img_wth": "5", "img_ht": 15});
        let element = element.as_object().unwrap();
        assert_eq!(
            Drawing::from_element("d", element),
            Some(Drawing {
                id: "d".to_string(),
                width: 5,
                height: 15
            })
        );
        let element = json!({"d_id": "d", "img_wth": 5});
        assert_eq!(Drawing::from_element("d", element.as_object().unwrap()), None);
    }
}
