//! Classification: moving the current file into a label folder.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::path::{Path, PathBuf};
//! use audio_classifier::classify::{Classifier, DialogPrompt};
//!
//! let classifier = Classifier::new(PathBuf::from("sorted"), PathBuf::from("sorted-2"));
//! let outcome = classifier
//!     .classify(Path::new("unsorted/a.wav"), "speech", false, &DialogPrompt)
//!     .unwrap();
//! println!("{}", outcome.status_message());
//! ```

pub mod action;
pub mod prompt;

use std::path::PathBuf;

use thiserror::Error;

pub use action::{default_label, Classifier, ClassifyOutcome, ConflictPrompt, UNKNOWN_LABEL};
pub use prompt::DialogPrompt;

// ---------------------------------------------------------------------------
// ClassifyError
// ---------------------------------------------------------------------------

/// Failures of a classification move.  None of them are fatal; the message
/// goes to the status line.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("source file does not exist: {0}")]
    SourceMissing(PathBuf),

    #[error("path has no file name: {0}")]
    NoFileName(PathBuf),

    #[error("invalid label {0:?}")]
    InvalidLabel(String),

    #[error("cannot create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
