//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output site: parsing the entries
//! ([`crate::parser`]), rendering entry, archive, index, and about pages
//! ([`crate::write`]), and generating the feeds ([`crate::feed`]).

use log::{debug, error, info, warn};
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::collection::Entries;
use crate::config::Config;
use crate::feed::{self, Error as FeedError};
use crate::markdown::{Converter, Markdown};
use crate::page::{Chrome, PageContext};
use crate::parser::{Error as ParseError, Parser as EntryParser};
use crate::template::{self, Error as TemplateError};
use crate::write::{Error as WriteError, Writer};

/// The file name of the Atom feed.
pub const ATOM_FILE_NAME: &str = "feed.atom";

/// The file name of the RSS feed.
pub const RSS_FILE_NAME: &str = "feed.rss";

/// The outcome of a successful build.
#[derive(Debug, Default)]
pub struct Report {
    /// Every page written, in the order it was written.
    pub pages: Vec<PathBuf>,

    /// The feeds written successfully.
    pub feeds: Vec<PathBuf>,

    /// Feeds that couldn't be written. These don't fail the build.
    pub feed_errors: Vec<Error>,
}

/// Builds the site from a [`Config`] object. The stages run in order and the
/// first failure aborts the build; pages already written stay on disk. Feed
/// failures are the exception: they are logged and collected in the
/// [`Report`].
pub fn build_site(config: &Config) -> Result<Report> {
    let ext = config.output_extension.as_str();
    let layout = template::layout(config.template.as_deref())?;
    let archive = template::archive()?;

    std::fs::create_dir_all(&config.output_directory).map_err(|err| Error::Filesystem {
        path: config.output_directory.clone(),
        err,
    })?;

    // Every document must parse before any page is written.
    let parser = EntryParser::new(ext);
    let paths = parser
        .discover(&config.source_directory)
        .map_err(|err| match err {
            ParseError::WalkDir(err) => Error::Filesystem {
                path: config.source_directory.clone(),
                err: err.into(),
            },
            other => Error::Parse(other),
        })?;
    let entries = Entries::new(parser.parse_entries(&paths)?);
    if entries.is_empty() {
        return Err(Error::EmptyCollection(config.source_directory.clone()));
    }
    let archives_name = format!("archives.{}", ext);
    let index_name = format!("index.{}", ext);
    let about_name = format!("about.{}", ext);
    let mut reserved = vec![archives_name.as_str(), index_name.as_str()];
    if config.has_about_page() {
        reserved.push(about_name.as_str());
    }
    if let Some(entry) = entries.claiming(&reserved).first() {
        return Err(Error::ReservedPermalink {
            permalink: entry.permalink.clone(),
            path: entry.source_path.clone(),
        });
    }
    info!(
        "parsed {} entries from `{}`",
        entries.len(),
        config.source_directory.display()
    );
    for (permalink, paths) in entries.collisions() {
        warn!(
            "{} source documents share the permalink `{}`; the last one wins: {:?}",
            paths.len(),
            permalink,
            paths
        );
    }

    let converter = Markdown::new(ext);
    let writer = Writer {
        layout: &layout,
        archive: &archive,
        output_directory: &config.output_directory,
    };
    let chrome = Chrome {
        has_about_page: config.has_about_page(),
        css_href: config.css.as_deref(),
    };
    let mut report = Report::default();

    for entry in entries.iter() {
        let content = converter.convert(&entry.body);
        report.pages.push(writer.write_page(
            &PageContext::article(entry, content, chrome),
            &entry.permalink,
        )?);
    }

    let archive_page = PageContext::standalone(
        archives_name.clone(),
        writer.archive_content(&entries.archive_groups())?,
        chrome,
    );
    report.pages.push(writer.write_page(&archive_page, &archives_name)?);

    // `entries` is non-empty, so there's always a latest entry.
    if let Some(latest) = entries.latest() {
        debug!("index page shows `{}`", latest.source_path.display());
        let index_page = PageContext::article(latest, converter.convert(&latest.body), chrome);
        report
            .pages
            .push(writer.write_page(&index_page, &index_name)?);
    }

    if let Some(about) = &config.about {
        let body = std::fs::read(about).map_err(|err| Error::Filesystem {
            path: about.clone(),
            err,
        })?;
        let about_page = PageContext::standalone(about_name.clone(), converter.convert(&body), chrome);
        report.pages.push(writer.write_page(&about_page, &about_name)?);
    }
    info!(
        "wrote {} pages to `{}`",
        report.pages.len(),
        config.output_directory.display()
    );

    let items = feed::items(&config.site, &entries.ordered(config.feed_order));
    let atom_path = config.output_directory.join(ATOM_FILE_NAME);
    let result = write_feed(&atom_path, |w| feed::write_atom(&config.site, &items, w));
    report.record_feed(atom_path, result);
    let rss_path = config.output_directory.join(RSS_FILE_NAME);
    let result = write_feed(&rss_path, |w| feed::write_rss(&config.site, &items, w));
    report.record_feed(rss_path, result);

    Ok(report)
}

impl Report {
    fn record_feed(&mut self, path: PathBuf, result: Result<()>) {
        match result {
            Ok(()) => {
                debug!("wrote `{}`", path.display());
                self.feeds.push(path);
            }
            Err(err) => {
                error!("{}", err);
                self.feed_errors.push(err);
            }
        }
    }
}

// Creates the file at `path` and hands it to `write`. Both failures are
// reported as [`Error::Feed`].
fn write_feed<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(BufWriter<File>) -> feed::Result<()>,
{
    let annotate = |err| Error::Feed {
        path: path.to_owned(),
        err,
    };
    let file = File::create(path).map_err(|e| annotate(FeedError::Io(e)))?;
    write(BufWriter::new(file)).map_err(annotate)
}

/// The result of a fallible build operation.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors parsing source documents, including malformed
    /// headers and invalid dates.
    Parse(ParseError),

    /// Returned when the source directory holds no documents.
    EmptyCollection(PathBuf),

    /// Returned when a source document's permalink is the name of a page the
    /// site writes itself (`index`, `archives`, or `about`).
    ReservedPermalink { permalink: String, path: PathBuf },

    /// Returned when the layout can't be read or parsed.
    TemplateLoad(TemplateError),

    /// Returned for errors rendering or writing a page.
    Render(WriteError),

    /// Returned when a feed can't be created or serialized.
    Feed { path: PathBuf, err: FeedError },

    /// Returned for other I/O errors, such as listing the source directory,
    /// creating the output directory, or reading the about page.
    Filesystem { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::EmptyCollection(path) => {
                write!(f, "No `.md` documents found in '{}'", path.display())
            }
            Error::ReservedPermalink { permalink, path } => write!(
                f,
                "'{}' would be overwritten by the site's own `{}` page",
                path.display(),
                permalink
            ),
            Error::TemplateLoad(err) => err.fmt(f),
            Error::Render(err) => err.fmt(f),
            Error::Feed { path, err } => {
                write!(f, "Writing feed '{}': {}", path.display(), err)
            }
            Error::Filesystem { path, err } => {
                write!(f, "Accessing '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::EmptyCollection(_) => None,
            Error::ReservedPermalink { .. } => None,
            Error::TemplateLoad(err) => Some(err),
            Error::Render(err) => Some(err),
            Error::Feed { path: _, err } => Some(err),
            Error::Filesystem { path: _, err } => Some(err),
        }
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<TemplateError> for Error {
    /// Converts [`TemplateError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: TemplateError) -> Error {
        Error::TemplateLoad(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Render(err)
    }
}
