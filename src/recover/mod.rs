//! Object recovery: turns one revision log into the files handed to a writer.
//!
//! Each [`Service`] owns a fixed list of [`Artifact`]s. [`recover`] produces
//! them in that order from the raw log, the flat log and whatever the
//! [`Fetcher`] can supply. Fetch failures drop the affected object and the
//! pass carries on; only a malformed log aborts it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::doc::{self, DEFAULT_DELIMITER, FlatLog, ScanResult};
use crate::revlog::{FormatError, RawLog};
use crate::slides::{self, Presentation};

pub mod api;
pub mod comments;
pub mod fetch;

pub use comments::{comment_items, format_comments};
pub use fetch::{Download, FetchError, Fetcher, OfflineFetcher};

pub const REVISION_LOG_FILE: &str = "revision-log.txt";
pub const FLAT_LOG_FILE: &str = "flat-log.txt";
pub const COMMENTS_FILE: &str = "comments.txt";
pub const PLAIN_TEXT_FILE: &str = "plaintext.txt";
pub const SUGGESTIONS_FILE: &str = "suggestions.txt";

/// A recovered file: a relative path and its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredObject {
    pub filename: String,
    pub content: Vec<u8>,
}

impl RecoveredObject {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown service `{0}`")]
pub struct UnknownService(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Document,
    Presentation,
    Spreadsheet,
    Drawing,
    Form,
}

/// What a service knows how to recover, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    RevisionLog,
    FlatLog,
    Comments,
    Drawings,
    Images,
    PlainText,
    Suggestions,
    SlideText,
}

impl Service {
    pub const ALL: [Service; 5] = [
        Service::Document,
        Service::Presentation,
        Service::Spreadsheet,
        Service::Drawing,
        Service::Form,
    ];

    /// Path segment the vendor uses for this service's endpoints.
    pub fn tag(self) -> &'static str {
        match self {
            Service::Document => "document",
            Service::Presentation => "presentation",
            Service::Spreadsheet => "spreadsheets",
            Service::Drawing => "drawings",
            Service::Form => "forms",
        }
    }

    pub fn artifacts(self) -> &'static [Artifact] {
        match self {
            Service::Document => &[
                Artifact::RevisionLog,
                Artifact::FlatLog,
                Artifact::Comments,
                Artifact::Drawings,
                Artifact::Images,
                Artifact::PlainText,
                Artifact::Suggestions,
            ],
            Service::Presentation | Service::Drawing => &[
                Artifact::RevisionLog,
                Artifact::FlatLog,
                Artifact::Comments,
                Artifact::Images,
                Artifact::SlideText,
            ],
            Service::Spreadsheet => &[
                Artifact::RevisionLog,
                Artifact::FlatLog,
                Artifact::Comments,
            ],
            Service::Form => &[Artifact::RevisionLog, Artifact::FlatLog],
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Service {
    type Err = UnknownService;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "document" => Ok(Service::Document),
            "presentation" => Ok(Service::Presentation),
            "spreadsheet" | "spreadsheets" => Ok(Service::Spreadsheet),
            "drawing" | "drawings" => Ok(Service::Drawing),
            "form" | "forms" => Ok(Service::Form),
            _ => Err(UnknownService(s.to_string())),
        }
    }
}

/// The document being recovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChoice {
    pub file_id: String,
    pub title: String,
    pub service: Service,
    pub max_revs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecoveryConfig {
    pub delimiter: char,
    pub include_flat_log: bool,
    pub include_revision_log: bool,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            include_flat_log: true,
            include_revision_log: true,
        }
    }
}

/// Runs one recovery pass over `log`.
pub fn recover(
    log: &RawLog,
    choice: &FileChoice,
    fetcher: &dyn Fetcher,
    config: &RecoveryConfig,
) -> Result<Vec<RecoveredObject>, FormatError> {
    log.validate()?;
    info!(
        service = %choice.service,
        title = %choice.title,
        "recovering objects"
    );

    let flat = match choice.service {
        Service::Document => doc::flatten(log, config.delimiter)?,
        _ => FlatLog::new(config.delimiter),
    };
    let scanned = match choice.service {
        Service::Document => Some(doc::scan(&flat)),
        _ => None,
    };

    let mut objects = Vec::new();
    for artifact in choice.service.artifacts() {
        match artifact {
            Artifact::RevisionLog => {
                if config.include_revision_log {
                    objects.push(RecoveredObject::new(
                        REVISION_LOG_FILE,
                        log.to_pretty_string()?,
                    ));
                }
            }
            Artifact::FlatLog => {
                if config.include_flat_log && !flat.is_empty() {
                    objects.push(RecoveredObject::new(FLAT_LOG_FILE, flat.to_text()?));
                }
            }
            Artifact::Comments => match fetcher.comments(&choice.file_id) {
                Ok(items) => {
                    objects.push(RecoveredObject::new(COMMENTS_FILE, format_comments(&items)))
                }
                Err(err) => warn!(error = %err, "skipping comments"),
            },
            Artifact::Drawings => {
                if let Some(scanned) = &scanned {
                    objects.extend(fetch_drawings(scanned, fetcher));
                }
            }
            Artifact::Images => {
                let image_ids: Vec<String> = match &scanned {
                    Some(scanned) => scanned.image_ids.iter().cloned().collect(),
                    None => slides::slide_images(log)?.into_keys().collect(),
                };
                objects.extend(fetch_images(&image_ids, choice, fetcher));
            }
            Artifact::PlainText => {
                objects.push(RecoveredObject::new(PLAIN_TEXT_FILE, doc::replay(&flat)));
            }
            Artifact::Suggestions => {
                if let Some(scanned) = &scanned {
                    objects.push(RecoveredObject::new(
                        SUGGESTIONS_FILE,
                        scanned.suggestions.to_json()?,
                    ));
                }
            }
            Artifact::SlideText => {
                let presentation = Presentation::from_log(log)?;
                objects.extend(
                    presentation
                        .text_files()
                        .into_iter()
                        .map(|(name, text)| RecoveredObject::new(name, text)),
                );
            }
        }
    }

    info!(objects = objects.len(), "recovery finished");
    Ok(objects)
}

/// `drawing{N}{ext}`, numbered over the drawings actually fetched.
fn fetch_drawings(scanned: &ScanResult, fetcher: &dyn Fetcher) -> Vec<RecoveredObject> {
    info!(drawings = scanned.drawings.len(), "retrieving drawings");
    scanned
        .drawings
        .iter()
        .filter_map(|drawing| match fetcher.drawing(drawing) {
            Ok(download) => Some(download),
            Err(err) => {
                warn!(id = %drawing.id, error = %err, "could not retrieve drawing");
                None
            }
        })
        .enumerate()
        .map(|(n, download)| {
            RecoveredObject::new(format!("drawing{n}{}", download.extension()), download.content)
        })
        .collect()
}

/// `img{N}{ext}`, numbered over the images actually fetched.
fn fetch_images(
    image_ids: &[String],
    choice: &FileChoice,
    fetcher: &dyn Fetcher,
) -> Vec<RecoveredObject> {
    info!(images = image_ids.len(), "retrieving images");
    image_ids
        .iter()
        .filter_map(|id| match fetcher.image(choice, id) {
            Ok(download) => Some(download),
            Err(err) => {
                warn!(id = %id, error = %err, "could not retrieve image");
                None
            }
        })
        .enumerate()
        .map(|(n, download)| {
            RecoveredObject::new(format!("img{n}{}", download.extension()), download.content)
        })
        .collect()
}
