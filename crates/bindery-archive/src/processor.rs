// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Archive processor — admission, validation, ordering, then guarded
// extraction into a page sink.
//
// The whole listing is validated before the first byte is decompressed, so a
// batch-level failure (ZIP bomb, too many entries, no images) never produces
// partial output.

use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use bindery_core::error::{BinderyError, Result};
use bindery_core::validate::{ValidationReport, display_name};
use bindery_core::{
    AcceptedEntry, BinderyConfig, PriorityChars, SortMode, file_name, resolve_order,
    validate_entries,
};
use tracing::{debug, info, instrument};

use crate::integrity::hash_bytes;
use crate::sink::PageSink;
use crate::source::ZipSource;

/// Everything decided about an archive before extraction starts.
#[derive(Debug, Clone)]
pub struct ArchivePlan {
    /// Where the archive was read from.
    pub source: PathBuf,
    /// Archive file stem, used to name outputs.
    pub name: String,
    /// Accepted entries in page order.
    pub entries: Vec<AcceptedEntry>,
    pub report: ValidationReport,
    /// Sum of the declared sizes of `entries`.
    pub total_bytes: u64,
    pub sort_mode: SortMode,
    pub priority_chars: PriorityChars,
}

impl ArchivePlan {
    pub fn page_count(&self) -> usize {
        self.entries.len()
    }
}

/// One extracted page, numbered from 1.
#[derive(Debug, Clone)]
pub struct Page {
    pub number: usize,
    pub entry: AcceptedEntry,
    pub bytes: Vec<u8>,
    /// Lowercase hex SHA-256 of `bytes`.
    pub sha256: String,
}

impl Page {
    /// Final path component of the entry this page came from.
    pub fn file_name(&self) -> &str {
        file_name(&self.entry.name)
    }
}

/// Runs archives through the validate → order → extract pipeline.
///
/// Each call works on its own validator and budget, so one processor can be
/// cloned into as many concurrent jobs as needed.
#[derive(Debug, Clone)]
pub struct ArchiveProcessor {
    config: BinderyConfig,
}

impl ArchiveProcessor {
    pub fn new(config: BinderyConfig) -> Self {
        Self { config }
    }

    /// Process the archive at `path` into `sink`.
    #[instrument(skip(self, sink), fields(archive = %path.display()))]
    pub fn process<S: PageSink>(&self, path: &Path, sink: &mut S) -> Result<S::Output> {
        self.admit(path)?;

        let mut source = ZipSource::open(path)?;
        let plan = self.plan(&mut source, path)?;
        info!(pages = plan.page_count(), "Found {} image(s) in archive", plan.page_count());

        self.extract(&mut source, &plan, sink)
    }

    /// Check the archive file itself: it must exist, carry a `.zip`
    /// extension, and fit under the on-disk size ceiling.
    ///
    /// Returns the archive's size in bytes.
    pub fn admit(&self, path: &Path) -> Result<u64> {
        if !path.is_file() {
            return Err(BinderyError::ArchiveNotFound {
                path: path.to_path_buf(),
            });
        }

        let is_zip = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
        if !is_zip {
            return Err(BinderyError::NotAnArchive {
                path: path.to_path_buf(),
            });
        }

        let size = std::fs::metadata(path)?.len();
        let limit = self.config.limits.max_archive_bytes;
        if size > limit {
            return Err(BinderyError::ArchiveTooLarge {
                path: path.to_path_buf(),
                observed: size,
                limit,
            });
        }

        debug!(size, "Archive admitted");
        Ok(size)
    }

    /// Validate the listing of `source` and resolve the page order.
    pub fn plan<R: Read + Seek>(
        &self,
        source: &mut ZipSource<R>,
        path: &Path,
    ) -> Result<ArchivePlan> {
        let raw = source.raw_entries()?;
        let validated = validate_entries(&raw, &self.config.validation_policy())?;

        let options = self.config.order_options();
        let entries = resolve_order(validated.entries, &options);

        Ok(ArchivePlan {
            source: path.to_path_buf(),
            name: archive_name(path),
            entries,
            report: validated.report,
            total_bytes: validated.total_bytes,
            sort_mode: options.mode,
            priority_chars: options.priority,
        })
    }

    /// Read every planned entry in order and feed it to `sink`.
    ///
    /// On any failure the sink is told to abort before the error is returned.
    pub fn extract<R: Read + Seek, S: PageSink>(
        &self,
        source: &mut ZipSource<R>,
        plan: &ArchivePlan,
        sink: &mut S,
    ) -> Result<S::Output> {
        sink.begin(plan)?;

        if let Err(err) = feed_pages(source, plan, sink) {
            sink.abort();
            return Err(err);
        }

        sink.finish(plan)
    }
}

fn feed_pages<R: Read + Seek, S: PageSink>(
    source: &mut ZipSource<R>,
    plan: &ArchivePlan,
    sink: &mut S,
) -> Result<()> {
    let total = plan.page_count();
    for (idx, entry) in plan.entries.iter().enumerate() {
        let number = idx + 1;
        info!("Extracting image {number}/{total}: {}", display_name(entry));

        let bytes = source.read_entry(entry)?;
        let sha256 = hash_bytes(&bytes);
        sink.write_page(Page {
            number,
            entry: entry.clone(),
            bytes,
            sha256,
        })?;
    }
    Ok(())
}

fn archive_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "archive".to_owned())
}
