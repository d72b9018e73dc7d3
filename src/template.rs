//! Loads the page layout, either a user-supplied file or the built-in
//! [`DEFAULT_LAYOUT`], and the built-in archive link list template. Templates
//! use Go template syntax (see [`gtmpl`]).

use gtmpl::Template;
use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};

/// The layout used when no custom template is configured. It references every
/// [`crate::page::PageContext`] field.
pub const DEFAULT_LAYOUT: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
{{with .Title}}<title>{{.}}</title>{{end}}
{{with .CSS}}<link rel="stylesheet" type="text/css" href="{{.}}"/>{{end}}
</head>
<body>
<div>
<a href="index.html">home</a>
<a href="archives.html">archives</a>
{{if .HasAboutPage}}<a href="about.html">about</a>{{end}}
<div>
{{with .Title}}<h1>{{.}}</h1>{{end}}
{{if .IsArticle}}<p>{{.Date}}, <a href="{{.Permalink}}">permalink</a></p>{{end}}
{{.Content}}
</div>
</div>
</body>
</html>
"#;

/// Renders the archive page's content from a list of year groups. Each group
/// is an object with `Year` and `Entries`; each entry has `Permalink` and an
/// HTML-escaped `Title`.
pub const ARCHIVE_TEMPLATE: &str = r#"{{range .}}<h2>{{.Year}}</h2>
{{range .Entries}}<p><a href="{{.Permalink}}">{{.Title}}</a></p>
{{end}}{{end}}"#;

/// Loads the layout at `path`, or the [`DEFAULT_LAYOUT`] if `path` is `None`.
pub fn layout(path: Option<&Path>) -> Result<Template> {
    match path {
        None => parse(DEFAULT_LAYOUT),
        Some(path) => {
            debug!("loading layout `{}`", path.display());
            let contents = std::fs::read_to_string(path).map_err(|err| Error::Open {
                path: path.to_owned(),
                err,
            })?;
            parse(&contents).map_err(|e| match e {
                Error::Parse { path: _, err } => Error::Parse {
                    path: Some(path.to_owned()),
                    err,
                },
                other => other,
            })
        }
    }
}

/// Parses the built-in [`ARCHIVE_TEMPLATE`].
pub fn archive() -> Result<Template> {
    parse(ARCHIVE_TEMPLATE)
}

fn parse(contents: &str) -> Result<Template> {
    let mut template = Template::default();
    template
        .parse(contents)
        .map_err(|err| Error::Parse { path: None, err })?;
    Ok(template)
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure to load a template.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while reading a template file.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned for template syntax errors. `path` is `None` for built-in
    /// templates.
    Parse { path: Option<PathBuf>, err: String },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::Parse {
                path: Some(path),
                err,
            } => write!(f, "Parsing template file '{}': {}", path.display(), err),
            Error::Parse { path: None, err } => {
                write!(f, "Parsing built-in template: {}", err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::Parse { .. } => None,
        }
    }
}
