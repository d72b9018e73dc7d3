//! Defines the [`Entry`] type, the in-memory form of one source document.

use chrono::NaiveDate;
use std::path::PathBuf;

/// The format used when presenting an [`Entry`]'s date to templates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Represents a parsed source document. Entries are created once per
/// discovered document by [`crate::parser::Parser`] and are never mutated
/// afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    /// The title from the document's `Title:` header line.
    pub title: String,

    /// The date from the document's `Date:` header line.
    pub date: NaiveDate,

    /// The path of the backing source document. Used for diagnostics only;
    /// never rendered into output.
    pub source_path: PathBuf,

    /// The output file name, derived from `source_path` by
    /// [`crate::permalink::permalink`].
    pub permalink: String,

    /// The raw document bytes following the two header lines.
    pub body: Vec<u8>,
}

impl Entry {
    /// Returns the entry's date formatted as `YYYY-MM-DD`.
    pub fn formatted_date(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}
