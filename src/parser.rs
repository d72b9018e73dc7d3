//! Defines the [`Parser`], [`Header`], and [`Error`] types. Also defines the
//! logic for discovering source documents and parsing them into [`Entry`]
//! objects. See [`extract_header`] for the source document format.

use std::{
    ffi::OsStr,
    fmt,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use log::debug;
use walkdir::WalkDir;

use crate::entry::{Entry, DATE_FORMAT};
use crate::permalink::{permalink, InvalidFileNameError};

/// The extension of source documents.
pub const MARKDOWN_EXTENSION: &str = "md";

const TITLE_MARKER: &str = "Title:";
const DATE_MARKER: &str = "Date:";

/// The metadata extracted from a document's two header lines.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    /// The value of the `Title:` line, trimmed.
    pub title: String,

    /// The parsed value of the `Date:` line.
    pub date: NaiveDate,

    /// The number of bytes consumed by both header lines including their
    /// terminators. The document body starts here.
    pub body_offset: usize,
}

/// Extracts the [`Header`] from a document's raw bytes. The document must
/// begin with two lines:
///
/// ```md
/// Title: Hello, world!
/// Date: 2021-04-16
/// # Hello
///
/// World
/// ```
///
/// Lines end in `\n` or `\r\n`. The marker and the whitespace around the value
/// are stripped. Everything after the second line terminator is the body.
pub fn extract_header(input: &[u8]) -> Result<Header> {
    let (title_line, date_start) = split_line(input, 0).ok_or(Error::MalformedHeader {
        line: 1,
        marker: TITLE_MARKER,
    })?;
    let title = header_value(title_line, TITLE_MARKER, 1)?;
    if title.is_empty() {
        return Err(Error::MalformedHeader {
            line: 1,
            marker: TITLE_MARKER,
        });
    }

    let (date_line, body_offset) = split_line(input, date_start).ok_or(Error::MalformedHeader {
        line: 2,
        marker: DATE_MARKER,
    })?;
    let date = parse_date(header_value(date_line, DATE_MARKER, 2)?)?;

    Ok(Header {
        title: title.to_owned(),
        date,
        body_offset,
    })
}

// Returns the line starting at `start` without its terminator, along with the
// offset just past the terminator. Returns `None` when `start` is at the end
// of the input.
fn split_line(input: &[u8], start: usize) -> Option<(&[u8], usize)> {
    if start >= input.len() {
        return None;
    }
    let rest = &input[start..];
    Some(match rest.iter().position(|b| *b == b'\n') {
        Some(i) => {
            let line = &rest[..i];
            (line.strip_suffix(b"\r").unwrap_or(line), start + i + 1)
        }
        None => (rest, input.len()),
    })
}

fn header_value<'a>(line: &'a [u8], marker: &'static str, number: usize) -> Result<&'a str> {
    let malformed = Error::MalformedHeader {
        line: number,
        marker,
    };
    match std::str::from_utf8(line) {
        Ok(line) => line.strip_prefix(marker).map(str::trim).ok_or(malformed),
        Err(_) => Err(malformed),
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    // chrono accepts unpadded fields, so check the shape first
    let shaped = value.len() == 10
        && value.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err(Error::InvalidDate {
            value: value.to_owned(),
            err: None,
        });
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|err| Error::InvalidDate {
        value: value.to_owned(),
        err: Some(err),
    })
}

/// Parses [`Entry`] objects from source files.
pub struct Parser<'a> {
    /// The extension given to permalinks (e.g., `html`).
    output_extension: &'a str,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser which derives permalinks with the provided
    /// `output_extension`.
    pub fn new(output_extension: &'a str) -> Parser<'a> {
        Parser { output_extension }
    }

    /// Lists the source documents (extension `.md`) directly inside
    /// `source_directory`, sorted by file name. Subdirectories are not
    /// searched.
    pub fn discover(&self, source_directory: &Path) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for result in WalkDir::new(source_directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let entry = result?;
            let path = entry.path();
            if path.is_file() && path.extension() == Some(OsStr::new(MARKDOWN_EXTENSION)) {
                paths.push(path.to_owned());
            }
        }
        debug!(
            "discovered {} source documents in `{}`",
            paths.len(),
            source_directory.display()
        );
        Ok(paths)
    }

    /// Reads and parses a single [`Entry`]. Errors are annotated with the
    /// offending document's path.
    pub fn parse_entry(&self, source_path: &Path) -> Result<Entry> {
        self._parse_entry(source_path)
            .map_err(|e| Error::Annotated(source_path.to_owned(), Box::new(e)))
    }

    fn _parse_entry(&self, source_path: &Path) -> Result<Entry> {
        let mut contents = std::fs::read(source_path)?;
        let header = extract_header(&contents)?;
        let permalink = permalink(source_path, self.output_extension)?;
        let body = contents.split_off(header.body_offset);
        Ok(Entry {
            title: header.title,
            date: header.date,
            source_path: source_path.to_owned(),
            permalink,
            body,
        })
    }

    /// Parses every document in `source_paths`, returning the entries in the
    /// same order. Stops at the first document that fails to parse.
    pub fn parse_entries(&self, source_paths: &[PathBuf]) -> Result<Vec<Entry>> {
        source_paths
            .iter()
            .map(|path| self.parse_entry(path))
            .collect()
    }
}

/// Represents the result of an [`Entry`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing an [`Entry`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when a header line is missing or doesn't start with its
    /// marker (`Title:` on line 1, `Date:` on line 2).
    MalformedHeader { line: usize, marker: &'static str },

    /// Returned when the `Date:` value isn't a `YYYY-MM-DD` calendar date.
    InvalidDate {
        value: String,
        err: Option<chrono::ParseError>,
    },

    /// Returned when a source file name can't be turned into a permalink.
    InvalidFileName(InvalidFileNameError),

    /// Returned for I/O errors reading source documents.
    Io(std::io::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// An error annotated with the source document it came from.
    Annotated(PathBuf, Box<Error>),
}

impl Error {
    /// Returns the innermost error, skipping any annotations.
    pub fn root(&self) -> &Error {
        match self {
            Error::Annotated(_, err) => err.root(),
            _ => self,
        }
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MalformedHeader { line, marker } => {
                write!(f, "malformed header: line {} must begin with `{}`", line, marker)
            }
            Error::InvalidDate { value, err: _ } => {
                write!(f, "invalid date `{}`: expected YYYY-MM-DD", value)
            }
            Error::InvalidFileName(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Annotated(path, err) => {
                write!(f, "parsing `{}`: {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MalformedHeader { .. } => None,
            Error::InvalidDate { value: _, err } => {
                err.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
            }
            Error::InvalidFileName(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Annotated(_, err) => Some(err.as_ref()),
        }
    }
}

impl From<InvalidFileNameError> for Error {
    fn from(err: InvalidFileNameError) -> Error {
        Error::InvalidFileName(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator while walking the source directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
