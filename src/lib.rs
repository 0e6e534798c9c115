//! kumo: revision-log replay and object recovery for cloud office documents.
//!
//! The vendor's private revision endpoint returns a document's full edit
//! history as a minified, positionally encoded log. This crate rebuilds what
//! that history contains:
//!
//! - **Flattening** - snapshot and changelog expanded into one ordered,
//!   key-renamed record per atomic action
//! - **Replay** - the plain text of a document, or the text of every box of a
//!   presentation
//! - **Object scanning** - embedded images, drawings and suggestion spans
//! - **Recovery** - the per-service set of files a recovery pass produces
//! - **Output** - writing those files to disk (optional)
//!
//! # Quick Start
//!
//! ```rust
//! use kumo::{RawLog, flatten, replay};
//!
//! let log = RawLog::from_response(
//!     ")]}'\n{\"chunkedSnapshot\": [[{\"ty\": \"is\", \"ibi\": 1, \"s\": \"hello\"}]], \
//!      \"changelog\": [[{\"ty\": \"is\", \"ibi\": 6, \"s\": \" world\"}, 1, \"u\", 2]]}",
//! )
//! .unwrap();
//! let flat = flatten(&log, '|').unwrap();
//! assert_eq!(replay(&flat), "hello world");
//! ```
//!
//! # Features
//!
//! - `output` (default) - Enables the filesystem writer

// Text primitives, key translation and json rendering
pub mod core;

// Raw revision logs
pub mod revlog;

// Document logs: flattener, scanner, replay
pub mod doc;

// Presentation logs
pub mod slides;

// Per-service recovery
pub mod recover;

// Optional: Filesystem writer
#[cfg(feature = "output")]
pub mod output;

// Re-export core types
pub use core::IndexOrigin;
pub use core::json::JsonStyle;
pub use core::keymap::{remap, rename_keys, transform_keys};

// Re-export revision log types
pub use revlog::{FormatError, RawLog, SENTINEL};

// Re-export doc types
pub use doc::{
    DEFAULT_DELIMITER, Drawing, FlatLine, FlatLog, FlatRecord, ScanEvent, ScanResult, Section,
    Suggestion, SuggestionTable, TextEdit, flatten, replay, scan,
};

// Re-export presentation types
pub use slides::{ImageSource, Presentation, SlideAction, SlideImage, slide_images};

// Re-export recovery types
pub use recover::{
    Artifact, Download, FetchError, Fetcher, FileChoice, OfflineFetcher, RecoveredObject,
    RecoveryConfig, Service, UnknownService, format_comments, recover,
};

// Re-export output types (feature-gated)
#[cfg(feature = "output")]
pub use output::{OutputDir, OutputError, find_logs, sanitize_filename, split_title};
