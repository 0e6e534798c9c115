//! Positional text primitives shared by every log replay.
//!
//! Vendor logs address text by code point. Documents count positions from 1,
//! presentations from 0, and both expect slice semantics on the edges:
//!
//! - [`insert`] and [`delete`] - splice a buffer at an adjusted position
//! - [`slice`] - the sub-string between two positions
//! - [`IndexOrigin`] - the base correction for a sub-format
//!
//! Out-of-range positions clamp to the buffer and negative positions count
//! from the end, so a malformed edit degrades the text instead of aborting the
//! pass.

pub mod json;
pub mod keymap;

/// Index base used by a wire schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOrigin {
    /// Document logs, where the first character sits at position 1.
    OneBased,
    /// Presentation logs.
    ZeroBased,
}

impl IndexOrigin {
    pub fn offset(self) -> i64 {
        match self {
            IndexOrigin::OneBased => -1,
            IndexOrigin::ZeroBased => 0,
        }
    }
}

/// Returns `old[..index + offset] + new + old[index + offset..]`.
pub fn insert(old: &str, new: &str, index: i64, offset: i64) -> String {
    let at = byte_index(old, index.saturating_add(offset));
    let mut out = String::with_capacity(old.len() + new.len());
    out.push_str(&old[..at]);
    out.push_str(new);
    out.push_str(&old[at..]);
    out
}

/// Returns `old[..start + offset] + old[end..]`.
///
/// `end` is never offset: the vendor's end position already points one past
/// the last removed character once the start is rebased.
pub fn delete(old: &str, start: i64, end: i64, offset: i64) -> String {
    let head = byte_index(old, start.saturating_add(offset));
    let tail = byte_index(old, end);
    let mut out = String::with_capacity(old.len());
    out.push_str(&old[..head]);
    out.push_str(&old[tail..]);
    out
}

/// Returns `s[start..end]` by code point, empty when the range is inverted.
pub fn slice(s: &str, start: i64, end: i64) -> &str {
    let from = byte_index(s, start);
    let to = byte_index(s, end);
    if from >= to { "" } else { &s[from..to] }
}

/// Number of code points in `s`, the unit every vendor position counts in.
pub fn char_len(s: &str) -> i64 {
    s.chars().count() as i64
}

/// Byte offset of code point `index` after clamping it into `0..=len`.
pub fn byte_index(s: &str, index: i64) -> usize {
    let len = char_len(s);
    let clamped = if index < 0 {
        (len + index).max(0)
    } else {
        index.min(len)
    };
    s.char_indices()
        .nth(clamped as usize)
        .map_or(s.len(), |(byte, _)| byte)
}
