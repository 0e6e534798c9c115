//! Presentation revision logs.
//!
//! Presentations use a positional schema: every changelog action is an array
//! whose first slot is a numeric code. There is no flat-log intermediate;
//! [`Presentation`] replays the raw changelog directly into slides and text
//! boxes.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::core::{self, IndexOrigin};
use crate::revlog::{FormatError, RawLog};

pub mod images;

pub use images::{ImageSource, SlideImage, decode_image_insert, slide_images};

pub const DELETE_BOX: i64 = 0;
pub const ADD_BOX: i64 = 3;
pub const MULTISET: i64 = 4;
pub const ADD_SLIDE: i64 = 12;
pub const DELETE_SLIDE: i64 = 13;
pub const MOVE_SLIDE: i64 = 14;
pub const ADD_TEXT: i64 = 15;
pub const DELETE_TEXT: i64 = 16;

/// Slide every new presentation starts with.
pub const FIRST_SLIDE: &str = "p";
/// Placeholder boxes the vendor creates on the first slide.
pub const PLACEHOLDER_BOXES: [&str; 3] = ["i0", "i1", "i3"];

const NOTES_SUFFIX: &str = ":notes";

/// A decoded presentation action. Slot positions refer to the action array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlideAction<'a> {
    AddText {
        box_id: &'a str,
        index: i64,
        text: &'a str,
    },
    Multiset(&'a [Value]),
    DeleteText {
        box_id: &'a str,
        start: i64,
        end: i64,
    },
    AddBox {
        box_id: &'a str,
        slide_id: &'a str,
    },
    AddSlide {
        slide_id: &'a str,
        index: i64,
    },
    DeleteSlide {
        index: i64,
        expected_id: &'a str,
    },
    DeleteBoxes(&'a [Value]),
    MoveSlide {
        from: i64,
        to: i64,
    },
}

impl<'a> SlideAction<'a> {
    /// `Ok(None)` for codes this model does not act on. `Err` names the slot
    /// that was missing or had the wrong type.
    pub fn decode(action: &'a [Value]) -> Result<Option<Self>, usize> {
        let Some(code) = action.first().and_then(Value::as_i64) else {
            return Ok(None);
        };
        let decoded = match code {
            ADD_TEXT => SlideAction::AddText {
                box_id: str_slot(action, 1)?,
                index: int_slot(action, 3)?,
                text: str_slot(action, 4)?,
            },
            MULTISET => SlideAction::Multiset(array_slot(action, 1)?),
            DELETE_TEXT => SlideAction::DeleteText {
                box_id: str_slot(action, 1)?,
                start: int_slot(action, 3)?,
                end: int_slot(action, 4)?,
            },
            ADD_BOX => SlideAction::AddBox {
                box_id: str_slot(action, 1)?,
                slide_id: str_slot(action, 5)?,
            },
            ADD_SLIDE => SlideAction::AddSlide {
                slide_id: str_slot(action, 1)?,
                index: int_slot(action, 2)?,
            },
            DELETE_SLIDE => SlideAction::DeleteSlide {
                index: int_slot(action, 1)?,
                expected_id: str_slot(action, 4)?,
            },
            DELETE_BOX => SlideAction::DeleteBoxes(array_slot(action, 1)?),
            MOVE_SLIDE => SlideAction::MoveSlide {
                from: int_slot(action, 1)?,
                to: int_slot(action, 2)?,
            },
            _ => return Ok(None),
        };
        Ok(Some(decoded))
    }
}

fn str_slot(action: &[Value], slot: usize) -> Result<&str, usize> {
    action.get(slot).and_then(Value::as_str).ok_or(slot)
}

fn int_slot(action: &[Value], slot: usize) -> Result<i64, usize> {
    action.get(slot).and_then(Value::as_i64).ok_or(slot)
}

fn array_slot(action: &[Value], slot: usize) -> Result<&[Value], usize> {
    action
        .get(slot)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or(slot)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBox {
    pub slide_id: String,
    pub text: String,
}

/// Slides in display order, the boxes on each slide, and each box's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    slides: Vec<String>,
    slide_boxes: IndexMap<String, Vec<String>>,
    boxes: IndexMap<String, TextBox>,
}

impl Default for Presentation {
    fn default() -> Self {
        let placeholders: Vec<String> = PLACEHOLDER_BOXES.iter().map(|b| b.to_string()).collect();
        let boxes = placeholders
            .iter()
            .map(|id| {
                (
                    id.clone(),
                    TextBox {
                        slide_id: FIRST_SLIDE.to_string(),
                        text: String::new(),
                    },
                )
            })
            .collect();
        Self {
            slides: vec![FIRST_SLIDE.to_string()],
            slide_boxes: IndexMap::from([(FIRST_SLIDE.to_string(), placeholders)]),
            boxes,
        }
    }
}

impl Presentation {
    /// Replays the changelog of `log`. The first changelog entry only creates
    /// the document and is skipped.
    pub fn from_log(log: &RawLog) -> Result<Self, FormatError> {
        let changelog = log.changelog()?;
        let mut presentation = Self::default();
        for entry in changelog.iter().skip(1) {
            match entry
                .as_array()
                .and_then(|items| items.first())
                .and_then(Value::as_array)
            {
                Some(action) => presentation.apply(action),
                None => debug!(%entry, "skipping presentation entry without an action"),
            }
        }
        info!(
            slides = presentation.slides.len(),
            boxes = presentation.boxes.len(),
            "replayed presentation"
        );
        Ok(presentation)
    }

    /// Applies one positional action. Unknown codes are ignored.
    pub fn apply(&mut self, action: &[Value]) {
        match SlideAction::decode(action) {
            Ok(Some(decoded)) => self.dispatch(decoded),
            Ok(None) => {}
            Err(slot) => debug!(slot, ?action, "skipping malformed presentation action"),
        }
    }

    fn dispatch(&mut self, action: SlideAction<'_>) {
        match action {
            SlideAction::AddText {
                box_id,
                index,
                text,
            } => self.edit_box(box_id, |old| {
                core::insert(old, text, index, IndexOrigin::ZeroBased.offset())
            }),
            SlideAction::Multiset(children) => {
                for child in children.iter().filter_map(Value::as_array) {
                    self.apply(child);
                }
            }
            SlideAction::DeleteText { box_id, start, end } => self.edit_box(box_id, |old| {
                core::delete(old, start, end, IndexOrigin::ZeroBased.offset())
            }),
            SlideAction::AddBox { box_id, slide_id } => self.add_box(box_id, slide_id),
            SlideAction::AddSlide { slide_id, index } => self.add_slide(slide_id, index),
            SlideAction::DeleteSlide { index, expected_id } => {
                self.delete_slide(index, expected_id)
            }
            SlideAction::DeleteBoxes(ids) => {
                for id in ids {
                    match id.as_str() {
                        Some(id) => self.delete_box(id),
                        None => warn!(%id, "box id is not a string"),
                    }
                }
            }
            SlideAction::MoveSlide { from, to } => self.move_slide(from, to),
        }
    }

    fn edit_box(&mut self, box_id: &str, edit: impl FnOnce(&str) -> String) {
        match self.boxes.get_mut(box_id) {
            Some(text_box) => text_box.text = edit(&text_box.text),
            None => debug!(box_id, "text edit on unknown box"),
        }
    }

    fn add_box(&mut self, box_id: &str, slide_id: &str) {
        let slide_id = slide_id.strip_suffix(NOTES_SUFFIX).unwrap_or(slide_id);
        let previous = self.boxes.insert(
            box_id.to_string(),
            TextBox {
                slide_id: slide_id.to_string(),
                text: String::new(),
            },
        );
        if let Some(previous) = previous {
            if previous.slide_id != slide_id {
                self.detach_box(&previous.slide_id, box_id);
            }
        }
        let boxes = self.slide_boxes.entry(slide_id.to_string()).or_default();
        if !boxes.iter().any(|id| id == box_id) {
            boxes.push(box_id.to_string());
        }
    }

    fn add_slide(&mut self, slide_id: &str, index: i64) {
        let at = insert_position(self.slides.len(), index);
        self.slides.insert(at, slide_id.to_string());
        self.slide_boxes.entry(slide_id.to_string()).or_default();
    }

    fn delete_slide(&mut self, index: i64, expected_id: &str) {
        match list_position(self.slides.len(), index) {
            Some(at) if self.slides[at] == expected_id => {
                self.slides.remove(at);
            }
            _ => debug!(index, expected_id, "slide delete guard mismatch"),
        }
    }

    fn delete_box(&mut self, box_id: &str) {
        match self.boxes.shift_remove(box_id) {
            Some(removed) => {
                if !self.detach_box(&removed.slide_id, box_id) {
                    warn!(box_id, slide_id = %removed.slide_id, "deleted box missing from its slide");
                }
            }
            None => warn!(box_id, "delete of unknown box"),
        }
    }

    fn detach_box(&mut self, slide_id: &str, box_id: &str) -> bool {
        let Some(boxes) = self.slide_boxes.get_mut(slide_id) else {
            return false;
        };
        match boxes.iter().position(|id| id == box_id) {
            Some(at) => {
                boxes.remove(at);
                true
            }
            None => false,
        }
    }

    fn move_slide(&mut self, from: i64, to: i64) {
        let len = self.slides.len();
        match (list_position(len, from), list_position(len, to)) {
            (Some(a), Some(b)) => self.slides.swap(a, b),
            _ => debug!(from, to, slides = len, "slide move out of range"),
        }
    }

    pub fn slides(&self) -> &[String] {
        &self.slides
    }

    pub fn boxes_on(&self, slide_id: &str) -> &[String] {
        self.slide_boxes
            .get(slide_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn text_box(&self, box_id: &str) -> Option<&TextBox> {
        self.boxes.get(box_id)
    }

    /// `(slide{i}/box{j}.txt, text)` for every box holding text. Positions
    /// count every slide and box, empty ones included.
    pub fn text_files(&self) -> Vec<(String, &str)> {
        let mut files = Vec::new();
        for (i, slide_id) in self.slides.iter().enumerate() {
            for (j, box_id) in self.boxes_on(slide_id).iter().enumerate() {
                let Some(text_box) = self.boxes.get(box_id) else {
                    continue;
                };
                if !text_box.text.is_empty() {
                    files.push((format!("slide{i}/box{j}.txt"), text_box.text.as_str()));
                }
            }
        }
        files
    }
}

/// Position for a list insert: negative counts from the end, both ends clamp.
fn insert_position(len: usize, index: i64) -> usize {
    let len = len as i64;
    let at = if index < 0 { (len + index).max(0) } else { index.min(len) };
    at as usize
}

/// Position of an existing element; negative counts from the end.
fn list_position(len: usize, index: i64) -> Option<usize> {
    let len = len as i64;
    let at = if index < 0 { len + index } else { index };
    (0..len).contains(&at).then_some(at as usize)
}
