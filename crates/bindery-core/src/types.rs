// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Bindery.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 100 MiB: largest archive file accepted from disk.
pub const DEFAULT_MAX_ARCHIVE_BYTES: u64 = 100 * 1024 * 1024;
/// 500 MiB: cap on the declared uncompressed size of all accepted entries.
pub const DEFAULT_MAX_TOTAL_BYTES: u64 = 500 * 1024 * 1024;
/// Cap on the number of accepted entries in one archive.
pub const DEFAULT_MAX_ENTRY_COUNT: usize = 10_000;
/// Priority characters used when none are configured.
pub const DEFAULT_PRIORITY_CHARS: &str = "!";

/// Image formats recognized inside archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
    Webp,
}

impl ImageFormat {
    /// Every recognized format, in declaration order.
    pub const ALL: [ImageFormat; 6] = [
        Self::Jpeg,
        Self::Png,
        Self::Gif,
        Self::Bmp,
        Self::Tiff,
        Self::Webp,
    ];

    /// MIME type string, recorded in page manifests.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
            Self::Webp => "image/webp",
        }
    }

    /// Infer the image format from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "tiff" => Some(Self::Tiff),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Infer the image format of an archive entry from its final path component.
    pub fn from_entry_name(name: &str) -> Option<Self> {
        extension(file_name(name)).and_then(Self::from_extension)
    }

    /// Set containing every recognized format.
    pub fn all() -> BTreeSet<ImageFormat> {
        Self::ALL.into_iter().collect()
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Webp => "webp",
        };
        f.write_str(name)
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('.');
        Self::from_extension(trimmed).ok_or_else(|| format!("unknown image format '{s}'"))
    }
}

/// Characters that move an entry into the priority partition when its
/// filename starts with one of them.
///
/// Order of first appearance is kept; duplicates are dropped. An empty set
/// disables priority partitioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PriorityChars(Vec<char>);

impl PriorityChars {
    /// A set that never marks anything as priority.
    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, c: char) -> bool {
        self.0.contains(&c)
    }

    /// Whether `filename` begins with one of the priority characters.
    pub fn marks(&self, filename: &str) -> bool {
        filename.chars().next().is_some_and(|c| self.contains(c))
    }

    pub fn chars(&self) -> &[char] {
        &self.0
    }
}

impl Default for PriorityChars {
    fn default() -> Self {
        Self::from(DEFAULT_PRIORITY_CHARS)
    }
}

impl From<&str> for PriorityChars {
    fn from(s: &str) -> Self {
        let mut chars = Vec::new();
        for c in s.chars() {
            if !chars.contains(&c) {
                chars.push(c);
            }
        }
        Self(chars)
    }
}

impl From<String> for PriorityChars {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<PriorityChars> for String {
    fn from(p: PriorityChars) -> Self {
        p.0.into_iter().collect()
    }
}

impl fmt::Display for PriorityChars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.0 {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Resource ceilings for one archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveLimits {
    /// Largest archive file accepted from disk, in bytes.
    pub max_archive_bytes: u64,
    /// Cap on the summed declared uncompressed size of accepted entries.
    pub max_total_bytes: u64,
    /// Cap on the number of accepted entries.
    pub max_entry_count: usize,
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_archive_bytes: DEFAULT_MAX_ARCHIVE_BYTES,
            max_total_bytes: DEFAULT_MAX_TOTAL_BYTES,
            max_entry_count: DEFAULT_MAX_ENTRY_COUNT,
        }
    }
}

/// One archive entry as enumerated by the archive-reading layer, before any
/// validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Entry name exactly as stored in the archive.
    pub name: String,
    pub is_dir: bool,
    /// Uncompressed size declared by the archive header.
    pub uncompressed_size: u64,
}

impl RawEntry {
    pub fn file(name: impl Into<String>, uncompressed_size: u64) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
            uncompressed_size,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
            uncompressed_size: 0,
        }
    }
}

/// An entry that passed validation, tagged with its position in the
/// archive's enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptedEntry {
    pub index: usize,
    pub name: String,
    pub format: ImageFormat,
    pub declared_size: u64,
}

impl AsRef<str> for AcceptedEntry {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

/// Final path component of an archive entry name.
///
/// Both `/` and `\` count as separators and trailing separators are ignored,
/// so `"scans/ch1/page_01.jpg"` yields `"page_01.jpg"`.
pub fn file_name(entry: &str) -> &str {
    let trimmed = entry.trim_end_matches(['/', '\\']);
    match trimmed.rfind(['/', '\\']) {
        Some(pos) => &trimmed[pos + 1..],
        None => trimmed,
    }
}

/// Extension of a filename, without the dot.
///
/// A leading dot does not start an extension (`".jpg"` has none), and a
/// trailing dot yields none.
pub fn extension(filename: &str) -> Option<&str> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_strips_directories() {
        assert_eq!(file_name("scans/ch1/page_01.jpg"), "page_01.jpg");
        assert_eq!(file_name("scans\\page_01.jpg"), "page_01.jpg");
        assert_eq!(file_name("page_01.jpg"), "page_01.jpg");
        assert_eq!(file_name("scans/"), "scans");
        assert_eq!(file_name(""), "");
    }

    #[test]
    fn extension_rules() {
        assert_eq!(extension("photo.JPG"), Some("JPG"));
        assert_eq!(extension("archive.tar.png"), Some("png"));
        assert_eq!(extension(".jpg"), None);
        assert_eq!(extension("trailing."), None);
        assert_eq!(extension("README"), None);
    }

    #[test]
    fn format_from_entry_name_is_case_insensitive() {
        assert_eq!(ImageFormat::from_entry_name("a/B.JPEG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_entry_name("x.WebP"), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::from_entry_name("notes.txt"), None);
        assert_eq!(ImageFormat::from_entry_name("scan.tif"), None);
    }

    #[test]
    fn format_parses_cli_spellings() {
        assert_eq!("jpg".parse::<ImageFormat>(), Ok(ImageFormat::Jpeg));
        assert_eq!(" .PNG".parse::<ImageFormat>(), Ok(ImageFormat::Png));
        assert!("pdf".parse::<ImageFormat>().is_err());
    }

    #[test]
    fn priority_chars_dedup_and_membership() {
        let p = PriorityChars::from("!@!");
        assert_eq!(p.chars(), &['!', '@']);
        assert!(p.marks("!cover.jpg"));
        assert!(p.marks("@special.jpg"));
        assert!(!p.marks("page.jpg"));
        assert!(!p.marks(""));
        assert_eq!(p.to_string(), "!@");
    }

    #[test]
    fn empty_priority_chars_mark_nothing() {
        let p = PriorityChars::from("");
        assert!(p.is_empty());
        assert!(!p.marks("!cover.jpg"));
        assert_eq!(p, PriorityChars::none());
    }

    #[test]
    fn priority_chars_serialize_as_string() {
        let json = serde_json::to_string(&PriorityChars::from("!@")).unwrap();
        assert_eq!(json, "\"!@\"");
        let back: PriorityChars = serde_json::from_str("\"#\"").unwrap();
        assert!(back.marks("#1.png"));
    }
}
