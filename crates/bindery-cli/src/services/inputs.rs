// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Input collection — turns command-line paths into the list of archives to run.

use std::path::PathBuf;

use tracing::warn;

/// Keep the paths that name files. Directories and missing paths are
/// reported and dropped; order and duplicates are preserved.
pub fn collect_archives(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut archives = Vec::with_capacity(paths.len());
    for path in paths {
        if path.is_dir() {
            warn!(
                "{} is a directory; pass the archives inside it explicitly",
                path.display()
            );
        } else if !path.exists() {
            warn!("{} not found", path.display());
        } else {
            archives.push(path.clone());
        }
    }
    archives
}
