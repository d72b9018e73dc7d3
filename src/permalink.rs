//! Derives output file names from source document paths.

use std::fmt;
use std::path::{Path, PathBuf};

/// The extension used for every generated page.
pub const HTML_EXTENSION: &str = "html";

/// Maps `source_path` to its output file name: the base name with its
/// extension replaced by `extension` (e.g., `posts/hello.md` becomes
/// `hello.html`). Only the file name is considered, so two sources with the
/// same base name in different directories derive the same permalink.
pub fn permalink(source_path: &Path, extension: &str) -> Result<String, InvalidFileNameError> {
    let stem = source_path
        .file_stem()
        .ok_or_else(|| InvalidFileNameError(source_path.to_owned()))?
        .to_str()
        .ok_or_else(|| InvalidFileNameError(source_path.to_owned()))?;
    Ok(format!("{}.{}", stem, extension))
}

/// Returned when a source path has no file name or its file name isn't valid
/// UTF-8.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidFileNameError(pub PathBuf);

impl fmt::Display for InvalidFileNameError {
    /// Displays an [`InvalidFileNameError`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid file name: {:?}", &self.0)
    }
}

impl std::error::Error for InvalidFileNameError {}
