// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Entry validator — the safety gate every archive entry passes before
// anything is extracted.
//
// Per-entry checks run in a fixed order and only ever reject the entry:
// directory skip, path traversal, extension allow-list, renderable-format
// allow-list. Accepted entries are charged against an `ExtractionBudget`;
// overrunning the byte or entry ceiling, or accepting nothing at all, fails
// the whole archive.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{BinderyError, Result};
use crate::types::{AcceptedEntry, ArchiveLimits, ImageFormat, RawEntry, file_name};

/// Settings the validator needs, derived from [`crate::BinderyConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub limits: ArchiveLimits,
    /// Formats the consuming surface can render. Recognized formats outside
    /// this set are skipped as unsupported.
    pub renderable: BTreeSet<ImageFormat>,
}

impl ValidationPolicy {
    pub fn new(limits: ArchiveLimits) -> Self {
        Self {
            limits,
            renderable: ImageFormat::all(),
        }
    }

    pub fn with_renderable(mut self, formats: impl IntoIterator<Item = ImageFormat>) -> Self {
        self.renderable = formats.into_iter().collect();
        self
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::new(ArchiveLimits::default())
    }
}

/// Why an entry was left out. None of these abort the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Directory,
    /// Parent-directory segment or absolute path.
    Suspicious,
    NotAnImage,
    /// A recognized image format the renderer cannot handle.
    Unsupported(ImageFormat),
}

/// Outcome of inspecting one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(Rejection),
}

/// Counters of entries left out, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub directories: usize,
    pub suspicious: usize,
    pub not_images: usize,
    pub unsupported: usize,
}

impl ValidationReport {
    fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::Directory => self.directories += 1,
            Rejection::Suspicious => self.suspicious += 1,
            Rejection::NotAnImage => self.not_images += 1,
            Rejection::Unsupported(_) => self.unsupported += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.directories + self.suspicious + self.not_images + self.unsupported
    }
}

/// Running totals for one archive. Never shared between archives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionBudget {
    pub accepted: usize,
    pub total_bytes: u64,
}

impl ExtractionBudget {
    /// Charge one accepted entry, failing once either ceiling is crossed.
    pub fn charge(&mut self, declared_size: u64, limits: &ArchiveLimits) -> Result<()> {
        self.total_bytes = self.total_bytes.saturating_add(declared_size);
        if self.total_bytes > limits.max_total_bytes {
            return Err(BinderyError::DecompressionBomb {
                observed: self.total_bytes,
                limit: limits.max_total_bytes,
            });
        }

        self.accepted += 1;
        if self.accepted > limits.max_entry_count {
            return Err(BinderyError::TooManyEntries {
                observed: self.accepted,
                limit: limits.max_entry_count,
            });
        }

        Ok(())
    }
}

/// The accepted entries of one archive, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedArchive {
    pub entries: Vec<AcceptedEntry>,
    pub report: ValidationReport,
    pub total_bytes: u64,
}

impl ValidatedArchive {
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}

/// Incremental validator for a single pass over one archive's entries.
///
/// Feed entries with [`EntryValidator::inspect`] and stop at the first error;
/// [`EntryValidator::finish`] applies the empty-result check.
pub struct EntryValidator<'a> {
    policy: &'a ValidationPolicy,
    budget: ExtractionBudget,
    accepted: Vec<AcceptedEntry>,
    report: ValidationReport,
    seen: usize,
}

impl<'a> EntryValidator<'a> {
    pub fn new(policy: &'a ValidationPolicy) -> Self {
        Self {
            policy,
            budget: ExtractionBudget::default(),
            accepted: Vec::new(),
            report: ValidationReport::default(),
            seen: 0,
        }
    }

    pub fn budget(&self) -> &ExtractionBudget {
        &self.budget
    }

    /// Inspect the next entry in enumeration order.
    ///
    /// Returns the verdict for a rejected or accepted entry, or a fatal
    /// error when accepting it crosses a batch ceiling.
    pub fn inspect(&mut self, entry: &RawEntry) -> Result<Verdict> {
        let index = self.seen;
        self.seen += 1;

        let format = match classify(entry, &self.policy.renderable) {
            Ok(format) => format,
            Err(rejection) => {
                match rejection {
                    Rejection::Suspicious => {
                        warn!(entry = %entry.name, "Skipping suspicious path");
                    }
                    Rejection::Unsupported(format) => {
                        debug!(entry = %entry.name, %format, "Skipping unsupported image format");
                    }
                    Rejection::Directory | Rejection::NotAnImage => {
                        debug!(entry = %entry.name, ?rejection, "Skipping entry");
                    }
                }
                self.report.record(rejection);
                return Ok(Verdict::Rejected(rejection));
            }
        };

        self.budget.charge(entry.uncompressed_size, &self.policy.limits)?;

        self.accepted.push(AcceptedEntry {
            index,
            name: entry.name.clone(),
            format,
            declared_size: entry.uncompressed_size,
        });
        Ok(Verdict::Accepted)
    }

    /// Close the pass. Fails with [`BinderyError::NoImages`] when nothing was
    /// accepted.
    pub fn finish(self) -> Result<ValidatedArchive> {
        if self.accepted.is_empty() {
            return Err(BinderyError::NoImages);
        }

        debug!(
            accepted = self.accepted.len(),
            skipped = self.report.total(),
            total_bytes = self.budget.total_bytes,
            "Validation complete"
        );

        Ok(ValidatedArchive {
            entries: self.accepted,
            report: self.report,
            total_bytes: self.budget.total_bytes,
        })
    }
}

/// Validate a complete entry listing in one call.
pub fn validate_entries(
    entries: &[RawEntry],
    policy: &ValidationPolicy,
) -> Result<ValidatedArchive> {
    let mut validator = EntryValidator::new(policy);
    for entry in entries {
        validator.inspect(entry)?;
    }
    validator.finish()
}

/// Per-entry checks, in order. Returns the entry's format when it passes.
fn classify(
    entry: &RawEntry,
    renderable: &BTreeSet<ImageFormat>,
) -> std::result::Result<ImageFormat, Rejection> {
    if entry.is_dir {
        return Err(Rejection::Directory);
    }
    if is_suspicious_path(&entry.name) {
        return Err(Rejection::Suspicious);
    }
    let format = ImageFormat::from_entry_name(&entry.name).ok_or(Rejection::NotAnImage)?;
    if !renderable.contains(&format) {
        return Err(Rejection::Unsupported(format));
    }
    Ok(format)
}

/// Whether an entry name could escape the extraction root: any `..`
/// segment, a leading `/` or `\`, or a drive-letter prefix such as `C:`.
pub fn is_suspicious_path(name: &str) -> bool {
    if name.starts_with(['/', '\\']) {
        return true;
    }

    let mut chars = name.chars();
    if let (Some(drive), Some(':')) = (chars.next(), chars.next())
        && drive.is_ascii_alphabetic()
    {
        return true;
    }

    name.split(['/', '\\']).any(|segment| segment == "..")
}

/// Final component of an accepted entry, for display.
pub fn display_name(entry: &AcceptedEntry) -> &str {
    file_name(&entry.name)
}
