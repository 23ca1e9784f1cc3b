// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Bindery.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Bindery operations.
#[derive(Debug, Error)]
pub enum BinderyError {
    // -- Archive admission --
    #[error("archive not found: {}", .path.display())]
    ArchiveNotFound { path: PathBuf },

    #[error("not a ZIP archive: {}", .path.display())]
    NotAnArchive { path: PathBuf },

    #[error("archive too large: {} is {observed} bytes (limit {limit})", .path.display())]
    ArchiveTooLarge {
        path: PathBuf,
        observed: u64,
        limit: u64,
    },

    #[error("invalid ZIP archive: {0}")]
    InvalidArchive(String),

    // -- Fatal batch errors (abort the whole archive) --
    #[error(
        "archive exceeds maximum extraction size ({observed} > {limit} bytes), possible ZIP bomb"
    )]
    DecompressionBomb { observed: u64, limit: u64 },

    #[error("archive contains too many images ({observed} > {limit})")]
    TooManyEntries { observed: usize, limit: usize },

    #[error("no image files found in archive")]
    NoImages,

    #[error("entry '{name}' inflates past its declared size of {declared} bytes")]
    EntrySizeMismatch { name: String, declared: u64 },

    // -- Output --
    #[error("output already exists: {}", .path.display())]
    OutputExists { path: PathBuf },

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    // -- I/O and persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BinderyError {
    /// Whether this error aborts an archive as a whole because a batch-wide
    /// bound was hit (as opposed to a problem with the input file itself).
    pub fn is_fatal_batch(&self) -> bool {
        matches!(
            self,
            Self::DecompressionBomb { .. }
                | Self::TooManyEntries { .. }
                | Self::NoImages
                | Self::EntrySizeMismatch { .. }
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BinderyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bomb_message_carries_observed_and_limit() {
        let err = BinderyError::DecompressionBomb {
            observed: 600,
            limit: 500,
        };
        let msg = err.to_string();
        assert!(msg.contains("600"));
        assert!(msg.contains("500"));
        assert!(err.is_fatal_batch());
    }

    #[test]
    fn admission_errors_are_not_batch_errors() {
        let err = BinderyError::NotAnArchive {
            path: PathBuf::from("notes.txt"),
        };
        assert!(!err.is_fatal_batch());
        assert_eq!(err.to_string(), "not a ZIP archive: notes.txt");
    }
}
