//! Shared Image Tool Error Types
//!
//! One error enum for comparison and conversion so callers can tell a missing
//! input from a corrupt one from a failed write.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageToolError {
    /// Missing, or present but not readable by this process.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Failed to decode image {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("Failed to write image {}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },

    #[error(
        "Image dimensions differ: expected {}x{}, got {}x{}",
        expected.0, expected.1, actual.0, actual.1
    )]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Image format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Not a HEIC file: {}", .0.display())]
    NotHeic(PathBuf),

    #[error("Output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImageToolError {
    pub fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Write {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ImageToolError>;
