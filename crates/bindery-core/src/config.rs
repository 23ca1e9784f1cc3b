// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run configuration.
//
// One explicit value, threaded into ordering and validation. Loaded from an
// optional JSON file; fields missing from the file keep their defaults.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BinderyError, Result};
use crate::order::{OrderOptions, SortMode};
use crate::types::{ArchiveLimits, ImageFormat, PriorityChars};
use crate::validate::ValidationPolicy;

/// Settings for one Bindery run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderyConfig {
    /// Compare digit runs numerically (`page_2` before `page_10`).
    pub natural_sort: bool,
    /// Filenames starting with one of these characters come first.
    pub priority_chars: PriorityChars,
    /// Per-archive resource ceilings.
    pub limits: ArchiveLimits,
    /// Image formats the downstream consumer can render.
    pub renderable_formats: BTreeSet<ImageFormat>,
}

impl Default for BinderyConfig {
    fn default() -> Self {
        Self {
            natural_sort: true,
            priority_chars: PriorityChars::default(),
            limits: ArchiveLimits::default(),
            renderable_formats: ImageFormat::all(),
        }
    }
}

impl BinderyConfig {
    /// Read a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        debug!(path = %path.display(), "Loaded configuration file");
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every archive fail.
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_archive_bytes == 0 {
            return Err(BinderyError::Config("max_archive_bytes must be positive".into()));
        }
        if self.limits.max_total_bytes == 0 {
            return Err(BinderyError::Config("max_total_bytes must be positive".into()));
        }
        if self.limits.max_entry_count == 0 {
            return Err(BinderyError::Config("max_entry_count must be positive".into()));
        }
        if self.renderable_formats.is_empty() {
            return Err(BinderyError::Config(
                "at least one renderable image format is required".into(),
            ));
        }
        Ok(())
    }

    pub fn sort_mode(&self) -> SortMode {
        SortMode::from_natural(self.natural_sort)
    }

    pub fn order_options(&self) -> OrderOptions {
        OrderOptions::new(self.sort_mode(), self.priority_chars.clone())
    }

    pub fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy::new(self.limits)
            .with_renderable(self.renderable_formats.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::types::{DEFAULT_MAX_ENTRY_COUNT, DEFAULT_MAX_TOTAL_BYTES};

    #[test]
    fn defaults_match_documented_values() {
        let config = BinderyConfig::default();
        assert!(config.natural_sort);
        assert_eq!(config.priority_chars.to_string(), "!");
        assert_eq!(config.limits.max_total_bytes, DEFAULT_MAX_TOTAL_BYTES);
        assert_eq!(config.limits.max_entry_count, DEFAULT_MAX_ENTRY_COUNT);
        assert_eq!(config.renderable_formats.len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "natural_sort": false, "priority_chars": "!@", "limits": {{ "max_entry_count": 5 }} }}"#
        )
        .unwrap();

        let config = BinderyConfig::load(file.path()).unwrap();
        assert_eq!(config.sort_mode(), SortMode::Lexical);
        assert!(config.priority_chars.marks("@x.png"));
        assert_eq!(config.limits.max_entry_count, 5);
        assert_eq!(config.limits.max_total_bytes, DEFAULT_MAX_TOTAL_BYTES);
    }

    #[test]
    fn formats_load_from_names() {
        let config: BinderyConfig =
            serde_json::from_str(r#"{ "renderable_formats": ["jpeg", "png"] }"#).unwrap();
        let policy = config.validation_policy();
        assert!(policy.renderable.contains(&ImageFormat::Jpeg));
        assert!(!policy.renderable.contains(&ImageFormat::Gif));
    }

    #[test]
    fn zero_limits_are_rejected() {
        let mut config = BinderyConfig::default();
        config.limits.max_entry_count = 0;
        assert!(matches!(config.validate(), Err(BinderyError::Config(_))));
    }

    #[test]
    fn malformed_file_is_a_serialization_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            BinderyConfig::load(file.path()),
            Err(BinderyError::Serialization(_))
        ));
    }

    #[test]
    fn order_options_follow_settings() {
        let config = BinderyConfig {
            natural_sort: false,
            priority_chars: PriorityChars::none(),
            ..BinderyConfig::default()
        };
        let options = config.order_options();
        assert_eq!(options.mode, SortMode::Lexical);
        assert!(options.priority.is_empty());
    }
}
