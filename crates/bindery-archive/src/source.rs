// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ZIP entry source — enumerates raw entries from the central directory and
// reads accepted entries back with a size guard.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use bindery_core::error::{BinderyError, Result};
use bindery_core::{AcceptedEntry, RawEntry};
use tracing::debug;

/// Upper bound on the buffer reserved up front for one entry; larger entries
/// grow the buffer as they are read.
const MAX_PREALLOC: u64 = 16 * 1024 * 1024;

/// A ZIP archive opened for listing and guarded extraction.
pub struct ZipSource<R: Read + Seek> {
    archive: zip::ZipArchive<R>,
}

impl ZipSource<BufReader<File>> {
    /// Open a ZIP archive from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> ZipSource<R> {
    /// Parse the central directory of an archive held by `reader`.
    pub fn new(reader: R) -> Result<Self> {
        let archive = zip::ZipArchive::new(reader).map_err(invalid)?;
        debug!(entries = archive.len(), "ZIP central directory parsed");
        Ok(Self { archive })
    }

    /// List every entry in central-directory order, without decompressing.
    ///
    /// Position `i` of the result is archive index `i`, which is what
    /// [`AcceptedEntry::index`] refers back to.
    pub fn raw_entries(&mut self) -> Result<Vec<RawEntry>> {
        let mut entries = Vec::with_capacity(self.archive.len());
        for index in 0..self.archive.len() {
            let file = self.archive.by_index_raw(index).map_err(invalid)?;
            entries.push(RawEntry {
                name: file.name().to_owned(),
                is_dir: file.is_dir(),
                uncompressed_size: file.size(),
            });
        }
        Ok(entries)
    }

    /// Decompress one accepted entry.
    ///
    /// At most `declared_size + 1` bytes are inflated; an entry that yields
    /// more than its header declared fails with
    /// [`BinderyError::EntrySizeMismatch`], so the validated byte budget
    /// also bounds what is actually read.
    pub fn read_entry(&mut self, entry: &AcceptedEntry) -> Result<Vec<u8>> {
        let file = self.archive.by_index(entry.index).map_err(invalid)?;

        let mut bytes = Vec::with_capacity(entry.declared_size.min(MAX_PREALLOC) as usize);
        file.take(entry.declared_size.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|err| BinderyError::InvalidArchive(format!("{}: {err}", entry.name)))?;

        if bytes.len() as u64 > entry.declared_size {
            return Err(BinderyError::EntrySizeMismatch {
                name: entry.name.clone(),
                declared: entry.declared_size,
            });
        }

        Ok(bytes)
    }
}

fn invalid(err: zip::result::ZipError) -> BinderyError {
    BinderyError::InvalidArchive(err.to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bindery_core::ImageFormat;

    use super::*;
    use crate::test_helpers::{ZipEntry, zip_bytes};

    fn accepted(index: usize, name: &str, declared_size: u64) -> AcceptedEntry {
        AcceptedEntry {
            index,
            name: name.into(),
            format: ImageFormat::Jpeg,
            declared_size,
        }
    }

    #[test]
    fn lists_files_and_directories_in_order() {
        let bytes = zip_bytes(&[
            ZipEntry::Dir("scans/"),
            ZipEntry::File("scans/page_2.jpg", b"two"),
            ZipEntry::File("notes.txt", b"hello world"),
        ]);
        let mut source = ZipSource::new(Cursor::new(bytes)).unwrap();
        let entries = source.raw_entries().unwrap();

        assert_eq!(entries.len(), 3);
        assert!(entries[0].is_dir);
        assert_eq!(entries[1], RawEntry::file("scans/page_2.jpg", 3));
        assert_eq!(entries[2].uncompressed_size, 11);
    }

    #[test]
    fn reads_entry_bytes_by_index() {
        let bytes = zip_bytes(&[
            ZipEntry::File("a.jpg", b"first"),
            ZipEntry::File("b.jpg", b"second"),
        ]);
        let mut source = ZipSource::new(Cursor::new(bytes)).unwrap();
        let data = source.read_entry(&accepted(1, "b.jpg", 6)).unwrap();
        assert_eq!(data, b"second");
    }

    #[test]
    fn entry_larger_than_declared_is_rejected() {
        let bytes = zip_bytes(&[ZipEntry::File("a.jpg", b"0123456789")]);
        let mut source = ZipSource::new(Cursor::new(bytes)).unwrap();
        let err = source.read_entry(&accepted(0, "a.jpg", 4)).unwrap_err();
        assert!(matches!(
            err,
            BinderyError::EntrySizeMismatch { declared: 4, .. }
        ));
    }

    #[test]
    fn garbage_is_an_invalid_archive() {
        let result = ZipSource::new(Cursor::new(vec![0xDE, 0xAD, 0xBE, 0xEF]));
        assert!(matches!(result, Err(BinderyError::InvalidArchive(_))));
    }

    #[test]
    fn truncated_archive_is_invalid() {
        let mut bytes = zip_bytes(&[ZipEntry::File("a.jpg", b"data")]);
        bytes.truncate(bytes.len() / 2);
        let result = ZipSource::new(Cursor::new(bytes));
        assert!(matches!(result, Err(BinderyError::InvalidArchive(_))));
    }
}
