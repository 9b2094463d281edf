//! Dataset error types.

use std::path::PathBuf;
use thiserror::Error;

pub type DatasetResult<T> = Result<T, DatasetError>;

/// The errors raised when building or reading a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("unable to list directory '{}'", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image and annotation files are not paired: {reason}")]
    Pairing { reason: String },

    #[error("index {index} is out of bounds for a dataset of {len} examples")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("no annotation file at index {index}, only {num_annotations} annotation files are indexed")]
    MissingAnnotation {
        index: usize,
        num_annotations: usize,
    },

    #[error("failed to decode image '{}'", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image '{}' has zero width or height", .path.display())]
    EmptyImage { path: PathBuf },

    #[error("failed to read annotation file '{}'", .path.display())]
    ReadAnnotation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse annotation file '{}': {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },
}

impl DatasetError {
    pub(crate) fn parse(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
