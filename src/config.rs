//! Defines [`Config`], the immutable settings for one build, and the optional
//! YAML site file it can be loaded from.

use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

use crate::collection::FeedOrder;
use crate::permalink::HTML_EXTENSION;

const DEFAULT_NAME: &str = "Blog";
const DEFAULT_URL: &str = "http://localhost";
const DEFAULT_AUTHOR: &str = "Anonymous";

/// The author credited in feeds.
#[derive(Clone, Debug, PartialEq)]
pub struct Author {
    pub name: String,
    pub email: Option<String>,
}

/// Site-wide metadata for feeds.
#[derive(Clone, Debug, PartialEq)]
pub struct Site {
    pub name: String,

    /// The absolute base URL of the output directory, without a trailing
    /// slash.
    pub url: String,

    pub author: Author,
}

impl Site {
    /// Returns the absolute URL for `permalink`, i.e. `{url}/{permalink}`.
    pub fn link(&self, permalink: &str) -> String {
        format!("{}/{}", self.url, permalink)
    }
}

/// The settings for one build, constructed once at startup and passed to
/// [`crate::build::build_site`].
#[derive(Clone, Debug)]
pub struct Config {
    /// The directory searched for `.md` source documents.
    pub source_directory: PathBuf,

    /// The directory pages and feeds are written into. Created if absent.
    pub output_directory: PathBuf,

    /// A custom layout; `None` selects [`crate::template::DEFAULT_LAYOUT`].
    pub template: Option<PathBuf>,

    /// The source of the about page; `None` means no about page is written.
    pub about: Option<PathBuf>,

    /// The stylesheet href handed to every page.
    pub css: Option<String>,

    /// The extension of every generated page.
    pub output_extension: String,

    /// The order of feed items.
    pub feed_order: FeedOrder,

    pub site: Site,
}

/// The optional YAML site file. Every field may be omitted.
///
/// ```yaml
/// name: My Notebook
/// url: https://example.org/notes
/// author: Ada
/// email: ada@example.org
/// css: style.css
/// feed_order: oldest
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteFile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub css: Option<String>,
    #[serde(default)]
    pub feed_order: Option<FeedOrder>,
}

impl SiteFile {
    /// Loads a [`SiteFile`] from the YAML file at `path`.
    pub fn from_path(path: &Path) -> Result<SiteFile> {
        debug!("loading site file `{}`", path.display());
        let file = File::open(path)
            .with_context(|| format!("Opening site file `{}`", path.display()))?;
        serde_yaml::from_reader(file)
            .with_context(|| format!("Parsing site file `{}`", path.display()))
    }
}

/// Settings given on the command line. Set values take precedence over the
/// [`SiteFile`].
#[derive(Debug, Default)]
pub struct Overrides {
    pub output_directory: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub about: Option<PathBuf>,
    pub css: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub author: Option<String>,
    pub email: Option<String>,
    pub feed_order: Option<FeedOrder>,
}

impl Config {
    /// Merges command line `overrides` over the site `file` and fills in
    /// defaults. The output directory defaults to the current directory.
    pub fn new(source_directory: PathBuf, overrides: Overrides, file: SiteFile) -> Result<Config> {
        let url = overrides
            .url
            .or(file.url)
            .unwrap_or_else(|| DEFAULT_URL.to_owned());
        Ok(Config {
            source_directory,
            output_directory: overrides
                .output_directory
                .unwrap_or_else(|| PathBuf::from(".")),
            template: overrides.template,
            about: overrides.about,
            css: overrides.css.or(file.css),
            output_extension: HTML_EXTENSION.to_owned(),
            feed_order: overrides.feed_order.or(file.feed_order).unwrap_or_default(),
            site: Site {
                name: overrides
                    .name
                    .or(file.name)
                    .unwrap_or_else(|| DEFAULT_NAME.to_owned()),
                url: normalize_base_url(&url)?,
                author: Author {
                    name: overrides
                        .author
                        .or(file.author)
                        .unwrap_or_else(|| DEFAULT_AUTHOR.to_owned()),
                    email: overrides.email.or(file.email),
                },
            },
        })
    }

    /// Whether an about page source was configured.
    pub fn has_about_page(&self) -> bool {
        self.about.is_some()
    }
}

// Checks that `url` is absolute and strips trailing slashes so links can be
// formed as `{url}/{permalink}`.
fn normalize_base_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| anyhow!("Invalid site URL `{}`: {}", url, e))?;
    if parsed.cannot_be_a_base() {
        return Err(anyhow!("Invalid site URL `{}`: not a base URL", url));
    }
    Ok(url.trim_end_matches('/').to_owned())
}
