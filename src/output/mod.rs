//! Filesystem writer for recovered objects.
//!
//! Objects of one recovery pass land in
//! `<base>/<service>/<sanitised title>/<start>-<end>/`, with slide text in
//! per-slide subdirectories.

use regex::Regex;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::recover::{RecoveredObject, Service};

static INVALID_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\-. ]").expect("valid pattern"));
static UNDERSCORE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__+").expect("valid pattern"));

/// Service suffixes that name their log directory in the plural.
const PLURAL_SERVICES: [&str; 3] = ["drawing", "form", "spreadsheet"];

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Path does not exist: {0}")]
    PathDoesNotExist(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Object path escapes the output directory: {0}")]
    InvalidObjectPath(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDir {
    pub path: PathBuf,
}

impl OutputDir {
    /// Opens an existing directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, OutputError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(OutputError::PathDoesNotExist(path));
        }
        Ok(OutputDir { path })
    }

    /// Directory for revisions `start..=end` of one document. Nothing is
    /// created until [`OutputDir::write_all`].
    pub fn for_file(
        base: impl AsRef<Path>,
        service: Service,
        title: &str,
        start: u64,
        end: u64,
    ) -> Self {
        let path = base
            .as_ref()
            .join(service.tag())
            .join(sanitize_filename(title))
            .join(format!("{start}-{end}"));
        OutputDir { path }
    }

    /// Writes every object, creating subdirectories as needed. Returns the
    /// written paths in object order.
    pub fn write_all(&self, objects: &[RecoveredObject]) -> Result<Vec<PathBuf>, OutputError> {
        fs::create_dir_all(&self.path)?;
        let mut written = Vec::with_capacity(objects.len());
        for object in objects {
            let target = self.object_path(&object.filename)?;
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, &object.content)?;
            debug!(path = %target.display(), bytes = object.content.len(), "wrote object");
            written.push(target);
        }
        info!(
            objects = written.len(),
            dir = %self.path.display(),
            "wrote recovered objects"
        );
        Ok(written)
    }

    /// Every file under the directory, sorted by path.
    pub fn files(&self) -> impl Iterator<Item = PathBuf> + '_ {
        WalkDir::new(&self.path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .map(|e| e.path().to_path_buf())
    }

    fn object_path(&self, filename: &str) -> Result<PathBuf, OutputError> {
        let relative = Path::new(filename);
        let contained = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
        if filename.is_empty() || !contained {
            return Err(OutputError::InvalidObjectPath(filename.to_string()));
        }
        Ok(self.path.join(relative))
    }
}

/// Replaces characters outside `[A-Za-z0-9_\-. ]` with `_`, then collapses
/// underscore runs.
pub fn sanitize_filename(name: &str) -> String {
    let replaced = INVALID_CHARS.replace_all(name, "_");
    let collapsed = UNDERSCORE_RUNS.replace_all(&replaced, "_").into_owned();
    if collapsed != name {
        debug!(from = name, to = %collapsed, "sanitised filename");
    }
    collapsed
}

/// Splits `name.service` into the bare name and the service's log tag.
///
/// Any directory part before the name is dropped. Returns no service when the
/// title has no `.`.
pub fn split_title(title: &str) -> (String, Option<String>) {
    let Some(dot) = title.rfind('.') else {
        return (basename(title).to_string(), None);
    };
    let name = basename(&title[..dot]).to_string();
    let mut service = title[dot + 1..].to_string();
    if PLURAL_SERVICES.contains(&service.as_str()) {
        service.push('s');
    }
    (name, Some(service))
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Saved revision logs (`*.json`) anywhere under `dir`, sorted by path.
pub fn find_logs(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, OutputError> {
    let dir = OutputDir::open(dir)?;
    Ok(dir
        .files()
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect())
}
