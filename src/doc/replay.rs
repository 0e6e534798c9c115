//! Plain-text reconstruction from a flat log.

use serde_json::Value;
use tracing::{debug, info};

use crate::core::IndexOrigin;

use super::action::TextEdit;
use super::{FlatLine, FlatLog, Section};

/// Replays every text edit of the changelog, in order, on top of the pasted
/// initial content.
pub fn replay(flat: &FlatLog) -> String {
    let mut text = initial_text(flat);

    let mut edits = 0usize;
    for detail in flat
        .section(Section::Changelog)
        .iter()
        .filter_map(FlatLine::detail)
    {
        match TextEdit::decode(detail) {
            Ok(Some(edit)) => {
                text = edit.apply(&text, IndexOrigin::OneBased);
                edits += 1;
            }
            Ok(None) => {}
            Err(field) => debug!(field, "skipping text edit with missing field"),
        }
    }

    info!(edits, chars = text.chars().count(), "replayed plain text");
    text
}

/// The `string` of the first snapshot line, when that line carries one.
fn initial_text(flat: &FlatLog) -> String {
    flat.section(Section::Snapshot)
        .first()
        .and_then(FlatLine::detail)
        .and_then(|detail| detail.get("string"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}
