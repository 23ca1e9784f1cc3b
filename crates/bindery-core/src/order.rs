// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Order resolver — turns validated entry names into the page sequence.
//
// Entries whose filename starts with a priority character form a leading
// partition; each partition is sorted on its own, either naturally (digit
// runs compare as numbers) or lexically (plain code-point order). Only the
// final path component takes part in the comparison, so files from different
// directories interleave purely by filename.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{PriorityChars, file_name};

/// How entries inside one partition are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Digit runs compare by numeric value: `page_2` before `page_10`.
    #[default]
    Natural,
    /// Code-point comparison of the filename: `page_10` before `page_2`.
    Lexical,
}

impl SortMode {
    pub fn from_natural(natural: bool) -> Self {
        if natural { Self::Natural } else { Self::Lexical }
    }
}

/// Inputs to [`resolve_order`] besides the entries themselves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderOptions {
    pub mode: SortMode,
    pub priority: PriorityChars,
}

impl OrderOptions {
    pub fn new(mode: SortMode, priority: PriorityChars) -> Self {
        Self { mode, priority }
    }
}

/// One piece of a [`SortKey`].
#[derive(Debug, Clone, Copy)]
pub enum Chunk<'a> {
    /// A run of non-digit characters (possibly empty).
    Text(&'a str),
    /// A run of ASCII digits with its leading zeros removed. Zero itself is
    /// the empty string.
    Number(&'a str),
}

impl Chunk<'_> {
    fn number(digits: &str) -> Chunk<'_> {
        Chunk::Number(digits.trim_start_matches('0'))
    }
}

impl Ord for Chunk<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Chunk::Text(a), Chunk::Text(b)) => a.cmp(b),
            // Arbitrary precision: with leading zeros gone, a longer digit
            // string is the larger number; equal lengths compare digit-wise.
            (Chunk::Number(a), Chunk::Number(b)) => {
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            // Text and numbers alternate from a text chunk at index 0, so the
            // kinds never meet at the same position.
            (Chunk::Number(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Chunk<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Chunk<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Chunk<'_> {}

/// Natural-sort key of a filename.
///
/// The filename is split around every maximal run of ASCII digits, always
/// starting and ending with a (possibly empty) text chunk:
/// `"page_01.jpg"` → `["page_", 1, ".jpg"]`, `"42"` → `["", 42, ""]`,
/// `"cover.png"` → `["cover.png"]`. Keys compare chunk by chunk, and a key
/// that is a strict prefix of another sorts first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey<'a>(Vec<Chunk<'a>>);

impl<'a> SortKey<'a> {
    pub fn new(filename: &'a str) -> Self {
        let mut chunks = Vec::new();
        let mut start = 0;
        let mut in_digits = false;

        for (idx, c) in filename.char_indices() {
            let is_digit = c.is_ascii_digit();
            if is_digit != in_digits {
                let run = &filename[start..idx];
                chunks.push(if in_digits {
                    Chunk::number(run)
                } else {
                    Chunk::Text(run)
                });
                start = idx;
                in_digits = is_digit;
            }
        }

        let tail = &filename[start..];
        if in_digits {
            chunks.push(Chunk::number(tail));
            chunks.push(Chunk::Text(""));
        } else {
            chunks.push(Chunk::Text(tail));
        }

        Self(chunks)
    }

    pub fn chunks(&self) -> &[Chunk<'a>] {
        &self.0
    }
}

/// Compare two filenames in natural order.
pub fn compare_natural(a: &str, b: &str) -> Ordering {
    SortKey::new(a).cmp(&SortKey::new(b))
}

/// Compare two archive entry names under `mode`, looking only at their
/// final path components.
pub fn compare_entries(a: &str, b: &str, mode: SortMode) -> Ordering {
    let (a, b) = (file_name(a), file_name(b));
    match mode {
        SortMode::Natural => compare_natural(a, b),
        SortMode::Lexical => a.cmp(b),
    }
}

/// Resolve the page order of a set of validated entries.
///
/// Priority entries come first, then the rest; each group is sorted stably
/// by `options.mode`, so entries with equal keys (`"001"` vs `"1"`) keep
/// their input order. Total and side-effect free: the output is a
/// permutation of the input.
pub fn resolve_order<T: AsRef<str>>(
    entries: impl IntoIterator<Item = T>,
    options: &OrderOptions,
) -> Vec<T> {
    let (mut priority, mut normal): (Vec<T>, Vec<T>) = entries
        .into_iter()
        .partition(|entry| options.priority.marks(file_name(entry.as_ref())));

    debug!(
        priority = priority.len(),
        normal = normal.len(),
        mode = ?options.mode,
        "Resolving entry order"
    );

    sort_bucket(&mut priority, options.mode);
    sort_bucket(&mut normal, options.mode);

    priority.append(&mut normal);
    priority
}

fn sort_bucket<T: AsRef<str>>(bucket: &mut Vec<T>, mode: SortMode) {
    match mode {
        SortMode::Lexical => {
            bucket.sort_by(|a, b| compare_entries(a.as_ref(), b.as_ref(), SortMode::Lexical));
        }
        SortMode::Natural => {
            // Build each key once, sort positions stably, then move the
            // entries into place.
            let mut positions: Vec<usize> = (0..bucket.len()).collect();
            {
                let keys: Vec<SortKey<'_>> = bucket
                    .iter()
                    .map(|entry| SortKey::new(file_name(entry.as_ref())))
                    .collect();
                positions.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
            }

            let mut slots: Vec<Option<T>> = bucket.drain(..).map(Some).collect();
            bucket.extend(positions.into_iter().filter_map(|pos| slots[pos].take()));
        }
    }
}
