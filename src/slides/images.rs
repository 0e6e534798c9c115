//! Image inserts in presentation logs.
//!
//! An image insert is a multiset (code 4) whose second child carries code 44.
//! The first child holds the insert section at slot 4 and the slide id at
//! slot 5. The vendor encodes where the image came from by which section
//! slots hold arrays, so the source is decoded once into [`ImageSource`].

use indexmap::IndexMap;
use serde_json::Value;
use tracing::info;

use crate::revlog::{FormatError, RawLog};

use super::MULTISET;

pub const INSERT_IMAGE: i64 = 44;

/// Insert sections of this length are video embeds.
const VIDEO_SECTION_LEN: usize = 18;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    DriveUpload(String),
    PersonalUpload(String),
    UrlUpload(String),
    Video,
}

impl ImageSource {
    fn decode(section: &[Value]) -> Option<Self> {
        if section.len() == VIDEO_SECTION_LEN {
            return Some(ImageSource::Video);
        }
        let id = |slot: usize| section.get(slot).and_then(Value::as_str).map(str::to_string);
        if is_array(section, 11) {
            if is_array(section, 9) {
                id(7).map(ImageSource::PersonalUpload)
            } else {
                id(9).map(ImageSource::DriveUpload)
            }
        } else {
            id(11).map(ImageSource::UrlUpload)
        }
    }

    /// The image id to fetch; videos have none.
    pub fn image_id(&self) -> Option<&str> {
        match self {
            ImageSource::DriveUpload(id)
            | ImageSource::PersonalUpload(id)
            | ImageSource::UrlUpload(id) => Some(id),
            ImageSource::Video => None,
        }
    }
}

fn is_array(section: &[Value], slot: usize) -> bool {
    section.get(slot).is_some_and(Value::is_array)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideImage {
    pub slide_id: String,
    pub source: ImageSource,
}

/// Decodes a changelog entry, `None` when it is not an image insert.
pub fn decode_image_insert(entry: &Value) -> Option<SlideImage> {
    let action = entry.get(0)?.as_array()?;
    if action.first()?.as_i64()? != MULTISET {
        return None;
    }
    let children = action.get(1)?.as_array()?;
    if children.get(1)?.get(0)?.as_i64()? != INSERT_IMAGE {
        return None;
    }
    let first = children.first()?;
    let section = first.get(4)?.as_array()?;
    let slide_id = first.get(5)?.as_str()?;
    Some(SlideImage {
        slide_id: slide_id.to_string(),
        source: ImageSource::decode(section)?,
    })
}

/// Image id to slide id for every non-video image insert, in log order.
pub fn slide_images(log: &RawLog) -> Result<IndexMap<String, String>, FormatError> {
    let mut images = IndexMap::new();
    for image in log.changelog()?.iter().filter_map(decode_image_insert) {
        if let Some(id) = image.source.image_id() {
            images.insert(id.to_string(), image.slide_id.clone());
        }
    }
    info!(images = images.len(), "found presentation images");
    Ok(images)
}
