// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page sinks — where ordered pages go once they leave the archive.
//
// The directory sink stages everything in a hidden temporary directory next
// to the target and renames it into place only after the last page and the
// manifest are written, so a failed archive leaves nothing behind.

use std::fs;
use std::path::{Path, PathBuf};

use bindery_core::error::{BinderyError, Result};
use bindery_core::validate::ValidationReport;
use bindery_core::{ImageFormat, PriorityChars, SortMode};
use serde::Serialize;
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::processor::{ArchivePlan, Page};

/// Receives the pages of one archive in order.
pub trait PageSink {
    type Output;

    /// Called once, before the first page.
    fn begin(&mut self, plan: &ArchivePlan) -> Result<()>;

    fn write_page(&mut self, page: Page) -> Result<()>;

    /// Called once, after the last page.
    fn finish(&mut self, plan: &ArchivePlan) -> Result<Self::Output>;

    /// Discard whatever was collected since `begin`.
    fn abort(&mut self) {}
}

/// Collects pages in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pages: Vec<Page>,
}

impl PageSink for MemorySink {
    type Output = Vec<Page>;

    fn begin(&mut self, plan: &ArchivePlan) -> Result<()> {
        self.pages.clear();
        self.pages.reserve(plan.page_count());
        Ok(())
    }

    fn write_page(&mut self, page: Page) -> Result<()> {
        self.pages.push(page);
        Ok(())
    }

    fn finish(&mut self, _plan: &ArchivePlan) -> Result<Self::Output> {
        Ok(std::mem::take(&mut self.pages))
    }

    fn abort(&mut self) {
        self.pages.clear();
    }
}

/// One page as recorded in `manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestPage {
    pub page: usize,
    /// File name inside the output directory.
    pub file: String,
    /// Entry name inside the archive.
    pub entry: String,
    pub format: ImageFormat,
    pub mime_type: &'static str,
    pub bytes: u64,
    pub sha256: String,
}

/// Description of an unpacked archive, written next to its pages.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub archive: String,
    pub source: PathBuf,
    pub sort_mode: SortMode,
    pub priority_chars: PriorityChars,
    pub total_bytes: u64,
    pub skipped: ValidationReport,
    pub pages: Vec<ManifestPage>,
}

impl Manifest {
    fn new(plan: &ArchivePlan, pages: Vec<ManifestPage>) -> Self {
        Self {
            archive: plan.name.clone(),
            source: plan.source.clone(),
            sort_mode: plan.sort_mode,
            priority_chars: plan.priority_chars.clone(),
            total_bytes: plan.total_bytes,
            skipped: plan.report,
            pages,
        }
    }
}

/// Result of a successful [`DirectorySink`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedOutput {
    /// Final output directory, `<root>/<archive name>`.
    pub dir: PathBuf,
    pub manifest: PathBuf,
    pub pages: usize,
}

/// Writes pages as `<root>/<archive name>/NNNN-<file name>` plus a
/// `manifest.json`.
#[derive(Debug)]
pub struct DirectorySink {
    root: PathBuf,
    overwrite: bool,
    staging: Option<TempDir>,
    width: usize,
    pages: Vec<ManifestPage>,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            overwrite: false,
            staging: None,
            width: MIN_INDEX_WIDTH,
            pages: Vec::new(),
        }
    }

    /// Replace an existing output directory instead of failing.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Where the pages of `plan` end up.
    pub fn target_for(&self, plan: &ArchivePlan) -> PathBuf {
        self.root.join(&plan.name)
    }

    fn check_target(&self, target: &Path) -> Result<()> {
        if target.exists() && !self.overwrite {
            return Err(BinderyError::OutputExists {
                path: target.to_path_buf(),
            });
        }
        Ok(())
    }

    fn staging_dir(&self) -> Result<&Path> {
        self.staging
            .as_ref()
            .map(TempDir::path)
            .ok_or_else(|| std::io::Error::other("directory sink used before begin").into())
    }
}

const MIN_INDEX_WIDTH: usize = 4;
const MANIFEST_FILE: &str = "manifest.json";

/// Zero-padded page prefix width: at least four digits, more for long books.
fn index_width(pages: usize) -> usize {
    pages.to_string().len().max(MIN_INDEX_WIDTH)
}

/// `NNNN-<name>`, with characters Windows refuses in file names (`:` would
/// otherwise open an NTFS alternate data stream) replaced by `_`.
fn page_file_name(number: usize, width: usize, name: &str) -> String {
    let name: String = name
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, ':' | '<' | '>' | '"' | '|' | '?' | '*') {
                '_'
            } else {
                c
            }
        })
        .collect();
    format!("{number:0width$}-{name}")
}

/// Move `staged` to `target`, replacing whatever is already there.
///
/// An existing target is first renamed into a `.bindery-old-*` directory
/// under `root` and deleted only once `staged` is in place. If that second
/// rename fails the previous output is moved back.
fn install_output(root: &Path, staged: &Path, target: &Path) -> Result<()> {
    if fs::symlink_metadata(target).is_err() {
        fs::rename(staged, target)?;
        return Ok(());
    }

    let backup = tempfile::Builder::new()
        .prefix(".bindery-old-")
        .tempdir_in(root)?;
    let previous = backup.path().join("previous");
    fs::rename(target, &previous)?;

    if let Err(err) = fs::rename(staged, target) {
        if let Err(restore_err) = fs::rename(&previous, target) {
            let kept = backup.keep();
            warn!(
                backup = %kept.display(),
                "Could not restore previous output: {restore_err}"
            );
        }
        return Err(err.into());
    }

    if let Err(err) = backup.close() {
        warn!(path = %target.display(), "Could not remove previous output: {err}");
    }
    Ok(())
}

impl PageSink for DirectorySink {
    type Output = StagedOutput;

    fn begin(&mut self, plan: &ArchivePlan) -> Result<()> {
        self.check_target(&self.target_for(plan))?;

        fs::create_dir_all(&self.root)?;
        let staging = tempfile::Builder::new()
            .prefix(".bindery-")
            .tempdir_in(&self.root)?;
        debug!(staging = %staging.path().display(), "Staging output");

        self.staging = Some(staging);
        self.width = index_width(plan.page_count());
        self.pages.clear();
        Ok(())
    }

    fn write_page(&mut self, page: Page) -> Result<()> {
        let file = page_file_name(page.number, self.width, page.file_name());
        fs::write(self.staging_dir()?.join(&file), &page.bytes)?;

        self.pages.push(ManifestPage {
            page: page.number,
            file,
            mime_type: page.entry.format.mime_type(),
            format: page.entry.format,
            bytes: page.bytes.len() as u64,
            sha256: page.sha256,
            entry: page.entry.name,
        });
        Ok(())
    }

    fn finish(&mut self, plan: &ArchivePlan) -> Result<Self::Output> {
        let manifest = Manifest::new(plan, std::mem::take(&mut self.pages));
        let page_count = manifest.pages.len();
        let json = serde_json::to_vec_pretty(&manifest)?;
        fs::write(self.staging_dir()?.join(MANIFEST_FILE), json)?;

        let target = self.target_for(plan);
        self.check_target(&target)?;
        if target.exists() {
            warn!(path = %target.display(), "Replacing existing output directory");
        }

        let Some(staging) = self.staging.take() else {
            return Err(std::io::Error::other("directory sink used before begin").into());
        };
        install_output(&self.root, staging.path(), &target)?;
        // The staging path no longer exists, so dropping the guard is a no-op.
        drop(staging);

        info!(path = %target.display(), pages = page_count, "Output written");
        Ok(StagedOutput {
            manifest: target.join(MANIFEST_FILE),
            dir: target,
            pages: page_count,
        })
    }

    fn abort(&mut self) {
        if let Some(staging) = self.staging.take() {
            debug!(staging = %staging.path().display(), "Discarding staged output");
        }
        self.pages.clear();
    }
}
