// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion,
// which the command line prints under the technical message.

use crate::error::BinderyError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The user can fix the input or the command line and run again.
    ActionRequired,
    /// The archive itself is unusable or unsafe; rerunning won't help.
    Permanent,
    /// A passing environment problem such as a full disk. Worth retrying.
    Transient,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    pub severity: Severity,
}

impl HumanError {
    fn new(message: impl Into<String>, suggestion: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            suggestion: suggestion.into(),
            severity,
        }
    }
}

/// Convert a `BinderyError` into a `HumanError`.
pub fn humanize_error(err: &BinderyError) -> HumanError {
    match err {
        // -- Archive admission --
        BinderyError::ArchiveNotFound { path } => HumanError::new(
            "The archive couldn't be found.",
            format!("Check the path and try again ({}).", path.display()),
            Severity::ActionRequired,
        ),

        BinderyError::NotAnArchive { .. } => HumanError::new(
            "That file isn't a ZIP archive.",
            "Only .zip files can be unpacked. Compress the images into a ZIP first.",
            Severity::ActionRequired,
        ),

        BinderyError::ArchiveTooLarge { observed, limit, .. } => HumanError::new(
            "The archive is too large.",
            format!(
                "It is {} but the limit is {}. Split it into smaller archives or raise --max-archive-bytes.",
                megabytes(*observed),
                megabytes(*limit)
            ),
            Severity::ActionRequired,
        ),

        BinderyError::InvalidArchive(_) => HumanError::new(
            "The archive is damaged or not a valid ZIP file.",
            "Try re-downloading or re-creating the archive. Password-protected archives aren't supported.",
            Severity::Permanent,
        ),

        // -- Batch bounds --
        BinderyError::DecompressionBomb { limit, .. } => HumanError::new(
            "The archive unpacks to far more data than it should.",
            format!(
                "This looks like a ZIP bomb, so nothing was extracted. If the archive is genuine, raise --max-total-bytes above {}.",
                megabytes(*limit)
            ),
            Severity::Permanent,
        ),

        BinderyError::TooManyEntries { observed, limit } => HumanError::new(
            "The archive contains too many images.",
            format!(
                "Found at least {observed} images but the limit is {limit}. Split the archive or raise --max-entries."
            ),
            Severity::ActionRequired,
        ),

        BinderyError::NoImages => HumanError::new(
            "No images were found in the archive.",
            "Supported formats are JPEG, PNG, GIF, BMP, TIFF and WebP. Check --formats if you narrowed the list.",
            Severity::ActionRequired,
        ),

        BinderyError::EntrySizeMismatch { name, .. } => HumanError::new(
            "An image in the archive is larger than its header claims.",
            format!("The archive may have been tampered with ({name}). Nothing was extracted."),
            Severity::Permanent,
        ),

        // -- Output --
        BinderyError::OutputExists { path } => HumanError::new(
            "The output folder already exists.",
            format!(
                "Remove {} or pass --overwrite to replace it.",
                path.display()
            ),
            Severity::ActionRequired,
        ),

        BinderyError::Config(detail) => HumanError::new(
            "The configuration isn't valid.",
            format!("Fix the setting and try again. ({detail})"),
            Severity::ActionRequired,
        ),

        // -- I/O --
        BinderyError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError::new(
                "A file or folder couldn't be found.",
                "It may have been moved or deleted. Check the paths and try again.",
                Severity::ActionRequired,
            ),
            std::io::ErrorKind::PermissionDenied => HumanError::new(
                "Permission was denied while reading or writing files.",
                "Check the permissions of the archive and the output folder.",
                Severity::ActionRequired,
            ),
            _ => HumanError::new(
                "There was a problem reading or writing a file.",
                "Try again. If this keeps happening, the disk may be full.",
                Severity::Transient,
            ),
        },

        BinderyError::Serialization(_) => HumanError::new(
            "A configuration or manifest file couldn't be read or written.",
            "Check that the JSON file is well formed.",
            Severity::ActionRequired,
        ),
    }
}

fn megabytes(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn bomb_is_permanent() {
        let err = BinderyError::DecompressionBomb {
            observed: 600 * 1024 * 1024,
            limit: 500 * 1024 * 1024,
        };
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::Permanent);
        assert!(human.suggestion.contains("500.0 MB"));
    }

    #[test]
    fn no_images_is_action_required() {
        let human = humanize_error(&BinderyError::NoImages);
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn output_exists_mentions_overwrite() {
        let err = BinderyError::OutputExists {
            path: PathBuf::from("out/book"),
        };
        let human = humanize_error(&err);
        assert!(human.suggestion.contains("--overwrite"));
        assert!(human.suggestion.contains("out/book"));
    }

    #[test]
    fn io_not_found_is_action_required() {
        let err = BinderyError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }

    #[test]
    fn io_other_is_transient() {
        let err = BinderyError::Io(std::io::Error::other("disk full"));
        assert_eq!(humanize_error(&err).severity, Severity::Transient);
    }
}
