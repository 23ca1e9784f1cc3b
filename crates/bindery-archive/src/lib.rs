// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! bindery-archive — the I/O half of Bindery.
//!
//! Opens ZIP archives, runs their listings through the `bindery-core`
//! validator and order resolver, reads the accepted entries in page order
//! with a per-entry size guard, and hands each page to a [`PageSink`].
//!
//! Nothing reaches a sink until the whole listing has been validated, and
//! [`DirectorySink`] stages its output so a failed archive leaves no files
//! behind.

pub mod integrity;
pub mod processor;
pub mod sink;
pub mod source;

pub use integrity::hash_bytes;
pub use processor::{ArchivePlan, ArchiveProcessor, Page};
pub use sink::{DirectorySink, Manifest, ManifestPage, MemorySink, PageSink, StagedOutput};
pub use source::ZipSource;

#[cfg(test)]
pub(crate) mod test_helpers;
