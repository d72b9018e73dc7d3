//! Renders [`PageContext`]s through the layout template and writes the
//! results to disk.

use gtmpl::{Context, Template, Value};
use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::collection::YearGroup;
use crate::page::{html_text, PageContext};

/// Responsible for templating and writing HTML pages to disk.
pub struct Writer<'a> {
    /// The layout applied to every page.
    pub layout: &'a Template,

    /// The template for the archive page's link list.
    pub archive: &'a Template,

    /// The directory in which pages are written.
    pub output_directory: &'a Path,
}

impl Writer<'_> {
    /// Renders `page` with the layout and writes it to
    /// `{output_directory}/{file_name}`, returning the written path. An
    /// existing file is overwritten.
    pub fn write_page(&self, page: &PageContext, file_name: &str) -> Result<PathBuf> {
        let path = self.output_directory.join(file_name);
        let file = File::create(&path).map_err(|err| Error::Create {
            path: path.clone(),
            err,
        })?;
        let mut w = BufWriter::new(file);
        self.layout
            .execute(&mut w, &Context::from(page.to_value()?)?)
            .map_err(|err| Error::Template {
                path: path.clone(),
                err,
            })?;
        w.flush().map_err(|err| Error::Create {
            path: path.clone(),
            err,
        })?;
        debug!("wrote `{}`", path.display());
        Ok(path)
    }

    /// Renders the archive page's content: a heading per year followed by a
    /// link to each entry of that year.
    pub fn archive_content(&self, groups: &[YearGroup]) -> Result<String> {
        let mut years = Vec::with_capacity(groups.len());
        for group in groups {
            let mut entries = Vec::with_capacity(group.entries.len());
            for entry in &group.entries {
                let mut m: HashMap<String, Value> = HashMap::new();
                m.insert("Permalink".to_owned(), Value::String(entry.permalink.clone()));
                m.insert("Title".to_owned(), Value::String(html_text(&entry.title)?));
                entries.push(Value::Object(m));
            }

            let mut m: HashMap<String, Value> = HashMap::new();
            m.insert("Year".to_owned(), Value::String(group.year.to_string()));
            m.insert("Entries".to_owned(), Value::Array(entries));
            years.push(Value::Object(m));
        }

        let mut out: Vec<u8> = Vec::new();
        self.archive
            .execute(&mut out, &Context::from(Value::Array(years))?)
            .map_err(|err| Error::Template {
                path: PathBuf::from("<archive>"),
                err,
            })?;
        String::from_utf8(out).map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error evaluating the template for the page at `path`.
    Template { path: PathBuf, err: String },

    /// An error creating or writing the output file at `path`.
    Create { path: PathBuf, err: io::Error },

    /// An error building the template context.
    Context(String),

    /// Other I/O errors.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template context error message ([`String`]) into an
    /// [`Error`].
    fn from(err: String) -> Error {
        Error::Context(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template { path, err } => {
                write!(f, "Rendering '{}': {}", path.display(), err)
            }
            Error::Create { path, err } => {
                write!(f, "Writing '{}': {}", path.display(), err)
            }
            Error::Context(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template { .. } => None,
            Error::Create { path: _, err } => Some(err),
            Error::Context(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}
