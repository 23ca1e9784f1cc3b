// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bindery — ordering and archive-safety core.
//
// Pure, synchronous building blocks shared by every Bindery crate: the entry
// validator that gates archive entries before extraction, the order resolver
// that turns the surviving names into a page sequence, plus the shared
// configuration and error types.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod order;
pub mod types;
pub mod validate;

pub use config::BinderyConfig;
pub use error::BinderyError;
pub use order::{OrderOptions, SortKey, SortMode, resolve_order};
pub use types::*;
pub use validate::{EntryValidator, ValidatedArchive, ValidationPolicy, validate_entries};
