// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments and how they fold into a `BinderyConfig`.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use bindery_core::error::Result;
use bindery_core::{BinderyConfig, ImageFormat, PriorityChars};
use clap::{ArgAction, Parser};

/// Unpack the images in ZIP archives as numbered pages, in natural order.
#[derive(Debug, Parser)]
#[command(name = "bindery", version, about)]
pub struct Cli {
    /// ZIP archives to unpack.
    #[arg(required = true, value_name = "ARCHIVES")]
    pub archives: Vec<PathBuf>,

    /// Output root. Defaults to each archive's own directory.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Order digit runs numerically (page_2 before page_10). The default.
    #[arg(long, overrides_with = "no_natural_sort")]
    pub natural_sort: bool,

    /// Order filenames by plain code-point comparison.
    #[arg(long, overrides_with = "natural_sort")]
    pub no_natural_sort: bool,

    /// Filenames starting with any of these characters come first.
    /// Pass an empty string to disable.
    #[arg(long, value_name = "CHARS")]
    pub priority_chars: Option<String>,

    /// Only treat these formats as renderable (e.g. jpg,png).
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    pub formats: Option<Vec<ImageFormat>>,

    /// JSON configuration file; flags override its values.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Largest archive file accepted, in bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_archive_bytes: Option<u64>,

    /// Largest total uncompressed size of the images in one archive, in bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_total_bytes: Option<u64>,

    /// Largest number of images taken from one archive.
    #[arg(long, value_name = "N")]
    pub max_entries: Option<usize>,

    /// Archives processed concurrently.
    #[arg(short, long, value_name = "N", default_value = "1")]
    pub jobs: NonZeroUsize,

    /// Replace existing output directories.
    #[arg(long)]
    pub overwrite: bool,

    /// More log output.
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Build the run configuration: the `--config` file (or defaults) with
    /// any flags applied on top.
    pub fn config(&self) -> Result<BinderyConfig> {
        let mut config = match &self.config {
            Some(path) => BinderyConfig::load(path)?,
            None => BinderyConfig::default(),
        };

        if self.no_natural_sort {
            config.natural_sort = false;
        } else if self.natural_sort {
            config.natural_sort = true;
        }

        if let Some(chars) = &self.priority_chars {
            config.priority_chars = PriorityChars::from(chars.as_str());
        }
        if let Some(formats) = &self.formats {
            config.renderable_formats = formats.iter().copied().collect();
        }

        if let Some(bytes) = self.max_archive_bytes {
            config.limits.max_archive_bytes = bytes;
        }
        if let Some(bytes) = self.max_total_bytes {
            config.limits.max_total_bytes = bytes;
        }
        if let Some(count) = self.max_entries {
            config.limits.max_entry_count = count;
        }

        config.validate()?;
        Ok(config)
    }

    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else if self.verbose > 0 {
            "debug"
        } else {
            "info"
        }
    }
}
