//! The narrow interface to whatever retrieves comments and binary objects.

use serde_json::Value;

use crate::doc::Drawing;

use super::FileChoice;

/// Extension given to downloads that arrive without a filename.
pub const FAILED_EXTENSION: &str = ".failed";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{0} cannot be fetched by this fetcher")]
    Unavailable(&'static str),
    #[error("request to {url} failed with status {status}")]
    Http { status: u16, url: String },
    #[error("{0}")]
    Other(String),
}

/// A downloaded object and the `Content-Disposition` header it came with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub content: Vec<u8>,
    pub content_disposition: Option<String>,
}

impl Download {
    pub fn new(content: impl Into<Vec<u8>>, content_disposition: Option<String>) -> Self {
        Self {
            content: content.into(),
            content_disposition,
        }
    }

    /// Extension of the served filename, dot included. Empty when the filename
    /// has none, [`FAILED_EXTENSION`] when no filename was served.
    pub fn extension(&self) -> &str {
        match self.content_disposition.as_deref().and_then(disposition_filename) {
            Some(filename) => file_extension(filename),
            None => FAILED_EXTENSION,
        }
    }
}

/// The `filename` parameter of a `Content-Disposition` header.
fn disposition_filename(header: &str) -> Option<&str> {
    header.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        let value = value.trim();
        Some(
            value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value),
        )
    })
}

/// Extension of the last path component. Leading dots belong to the name.
fn file_extension(filename: &str) -> &str {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match base.rfind('.') {
        Some(dot) if base[..dot].chars().any(|c| c != '.') => &base[dot..],
        _ => "",
    }
}

/// Retrieves what the revision log only references.
pub trait Fetcher {
    /// Comment resources of `file_id`, replies included.
    fn comments(&self, file_id: &str) -> Result<Vec<Value>, FetchError>;

    fn image(&self, choice: &FileChoice, image_id: &str) -> Result<Download, FetchError>;

    fn drawing(&self, drawing: &Drawing) -> Result<Download, FetchError>;
}

/// Fetcher for saved logs: serves comments loaded up front and nothing else.
#[derive(Debug, Clone, Default)]
pub struct OfflineFetcher {
    comments: Option<Vec<Value>>,
}

impl OfflineFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_comments(comments: Vec<Value>) -> Self {
        Self {
            comments: Some(comments),
        }
    }
}

impl Fetcher for OfflineFetcher {
    fn comments(&self, _file_id: &str) -> Result<Vec<Value>, FetchError> {
        self.comments
            .clone()
            .ok_or(FetchError::Unavailable("comments"))
    }

    fn image(&self, _choice: &FileChoice, _image_id: &str) -> Result<Download, FetchError> {
        Err(FetchError::Unavailable("images"))
    }

    fn drawing(&self, _drawing: &Drawing) -> Result<Download, FetchError> {
        Err(FetchError::Unavailable("drawings"))
    }
}
