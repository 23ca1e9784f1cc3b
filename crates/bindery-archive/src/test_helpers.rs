// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory ZIP fixtures for unit tests.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

pub(crate) enum ZipEntry<'a> {
    File(&'a str, &'a [u8]),
    Dir(&'a str),
}

/// Build a deflated ZIP archive holding `entries`, in order.
pub(crate) fn zip_bytes(entries: &[ZipEntry<'_>]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        match entry {
            ZipEntry::File(name, data) => {
                writer.start_file(*name, options).unwrap();
                writer.write_all(data).unwrap();
            }
            ZipEntry::Dir(name) => writer.add_directory(*name, options).unwrap(),
        }
    }

    writer.finish().unwrap().into_inner()
}

/// Write a ZIP archive named `file_name` into `dir` and return its path.
pub(crate) fn write_zip(dir: &Path, file_name: &str, entries: &[ZipEntry<'_>]) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, zip_bytes(entries)).unwrap();
    path
}
