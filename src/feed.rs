//! Support for creating Atom and RSS feeds from a list of entries. Both feeds
//! are serialized from one shared list of [`FeedItem`]s.

use atom_syndication::{Error as AtomError, Feed, Link, Person};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder};
use std::fmt;
use std::io::Write;

use crate::config::Site;
use crate::entry::Entry;

/// One feed entry. Items keep the order of the entries they were built from.
#[derive(Clone, Debug, PartialEq)]
pub struct FeedItem {
    pub title: String,

    /// The absolute URL of the entry's page.
    pub link: String,

    pub author: String,
    pub email: Option<String>,
    pub created: NaiveDate,
}

/// Projects `entries` (already in feed order) into [`FeedItem`]s whose links
/// are `{site.url}/{permalink}`.
pub fn items(site: &Site, entries: &[&Entry]) -> Vec<FeedItem> {
    entries
        .iter()
        .map(|entry| FeedItem {
            title: entry.title.clone(),
            link: site.link(&entry.permalink),
            author: site.author.name.clone(),
            email: site.author.email.clone(),
            created: entry.date,
        })
        .collect()
}

// Feeds carry full timestamps but entries only have a date, so every entry is
// published at midnight UTC.
fn midnight(date: NaiveDate) -> DateTime<FixedOffset> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)).into()
}

// The feed is as fresh as its newest item. An empty feed falls back to the
// epoch so output stays deterministic.
fn updated(items: &[FeedItem]) -> DateTime<FixedOffset> {
    midnight(items.iter().map(|i| i.created).max().unwrap_or_default())
}

/// Builds the Atom [`Feed`] for `items`.
pub fn atom_feed(site: &Site, items: &[FeedItem]) -> Feed {
    let mut home = Link::default();
    home.set_href(site.link(""));
    home.set_rel("alternate");

    let mut feed = Feed::default();
    feed.set_title(site.name.as_str());
    feed.set_id(site.link(""));
    feed.set_updated(updated(items));
    feed.set_authors(vec![person(&site.author.name, site.author.email.as_deref())]);
    feed.set_links(vec![home]);
    feed.set_entries(
        items
            .iter()
            .map(|item| {
                let mut link = Link::default();
                link.set_href(item.link.as_str());
                link.set_rel("alternate");

                let mut entry = atom_syndication::Entry::default();
                entry.set_id(item.link.as_str());
                entry.set_title(item.title.as_str());
                entry.set_updated(midnight(item.created));
                entry.set_published(Some(midnight(item.created)));
                entry.set_authors(vec![person(&item.author, item.email.as_deref())]);
                entry.set_links(vec![link]);
                entry
            })
            .collect::<Vec<_>>(),
    );
    feed
}

fn person(name: &str, email: Option<&str>) -> Person {
    let mut person = Person::default();
    person.set_name(name);
    person.set_email(email.map(str::to_owned));
    person
}

/// Builds the RSS [`rss::Channel`] for `items`.
pub fn rss_channel(site: &Site, items: &[FeedItem]) -> rss::Channel {
    ChannelBuilder::default()
        .title(site.name.clone())
        .link(site.link(""))
        .description(site.name.clone())
        .last_build_date(Some(updated(items).to_rfc2822()))
        .items(
            items
                .iter()
                .map(|item| {
                    ItemBuilder::default()
                        .title(Some(item.title.clone()))
                        .link(Some(item.link.clone()))
                        .guid(Some(
                            GuidBuilder::default()
                                .permalink(true)
                                .value(item.link.clone())
                                .build(),
                        ))
                        .author(Some(rss_author(item)))
                        .pub_date(Some(midnight(item.created).to_rfc2822()))
                        .build()
                })
                .collect::<Vec<_>>(),
        )
        .build()
}

// RSS wants an email address, optionally followed by the name in parens.
fn rss_author(item: &FeedItem) -> String {
    match &item.email {
        Some(email) => format!("{} ({})", email, item.author),
        None => item.author.clone(),
    }
}

/// Serializes `items` as an Atom feed into `w` and flushes it.
pub fn write_atom<W: Write>(site: &Site, items: &[FeedItem], w: W) -> Result<()> {
    atom_feed(site, items).write_to(w)?.flush()?;
    Ok(())
}

/// Serializes `items` as an RSS feed into `w` and flushes it.
pub fn write_rss<W: Write>(site: &Site, items: &[FeedItem], w: W) -> Result<()> {
    rss_channel(site, items).write_to(w)?.flush()?;
    Ok(())
}

/// The result of a fallible feed operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem writing a feed. Variants include I/O, Atom, and RSS
/// serialization issues.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    Io(std::io::Error),

    /// Returned when there is an Atom-related error.
    Atom(AtomError),

    /// Returned when there is an RSS-related error.
    Rss(rss::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Atom(err) => err.fmt(f),
            Error::Rss(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Atom(err) => Some(err),
            Error::Rss(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<AtomError> for Error {
    /// Converts [`AtomError`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: AtomError) -> Error {
        Error::Atom(err)
    }
}

impl From<rss::Error> for Error {
    /// Converts [`rss::Error`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: rss::Error) -> Error {
        Error::Rss(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::collection::{Entries, FeedOrder};
    use crate::config::Author;
    use std::io::{self, BufWriter};
    use std::path::PathBuf;

    fn site() -> Site {
        Site {
            name: String::from("Notebook"),
            url: String::from("https://example.org/blog"),
            author: Author {
                name: String::from("Ada"),
                email: Some(String::from("ada@example.org")),
            },
        }
    }

    fn entry(name: &str, date: &str) -> Entry {
        Entry {
            title: name.to_uppercase(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            source_path: PathBuf::from(format!("{}.md", name)),
            permalink: format!("{}.html", name),
            body: Vec::new(),
        }
    }

    fn entries() -> Entries {
        Entries::new(vec![
            entry("a", "2020-01-01"),
            entry("b", "2021-06-15"),
            entry("c", "2020-07-04"),
        ])
    }

    #[test]
    fn test_items_follow_order() {
        let entries = entries();
        for order in &[FeedOrder::Newest, FeedOrder::Oldest] {
            let ordered = entries.ordered(*order);
            let items = items(&site(), &ordered);
            assert_eq!(entries.len(), items.len());
            for (item, entry) in items.iter().zip(ordered.iter()) {
                assert_eq!(entry.title, item.title);
                assert_eq!(format!("https://example.org/blog/{}", entry.permalink), item.link);
                assert_eq!(entry.date, item.created);
                assert_eq!("Ada", item.author);
                assert_eq!(Some(String::from("ada@example.org")), item.email);
            }
        }
    }

    #[test]
    fn test_atom_and_rss_share_items() {
        let entries = entries();
        let items = items(&site(), &entries.descending());

        let feed = atom_feed(&site(), &items);
        let atom_links: Vec<&str> = feed
            .entries()
            .iter()
            .map(|e| e.links()[0].href())
            .collect();

        let channel = rss_channel(&site(), &items);
        let rss_links: Vec<&str> = channel
            .items()
            .iter()
            .filter_map(|i| i.link())
            .collect();

        assert_eq!(
            vec![
                "https://example.org/blog/b.html",
                "https://example.org/blog/c.html",
                "https://example.org/blog/a.html",
            ],
            atom_links
        );
        assert_eq!(atom_links, rss_links);
        assert_eq!(Some("ada@example.org (Ada)"), channel.items()[0].author());
    }

    #[test]
    fn test_updated_is_newest_item() {
        let entries = entries();
        let items = items(&site(), &entries.ascending());
        assert_eq!("2021-06-15T00:00:00+00:00", updated(&items).to_rfc3339());
    }

    #[test]
    fn test_write_feeds() -> Result<()> {
        let entries = entries();
        let items = items(&site(), &entries.descending());

        let mut atom_out: Vec<u8> = Vec::new();
        write_atom(&site(), &items, &mut atom_out)?;
        let atom_xml = String::from_utf8_lossy(&atom_out);
        assert!(atom_xml.contains("https://example.org/blog/b.html"));
        assert!(atom_xml.contains("Notebook"));

        let mut rss_out: Vec<u8> = Vec::new();
        write_rss(&site(), &items, &mut rss_out)?;
        let rss_xml = String::from_utf8_lossy(&rss_out);
        assert!(rss_xml.contains("<link>https://example.org/blog/b.html</link>"));
        Ok(())
    }

    #[test]
    fn test_item_authors_come_from_items() {
        let items = vec![FeedItem {
            title: String::from("Guest Post"),
            link: String::from("https://example.org/blog/guest.html"),
            author: String::from("Grace"),
            email: None,
            created: NaiveDate::from_ymd_opt(2021, 3, 3).unwrap(),
        }];

        let feed = atom_feed(&site(), &items);
        let person = &feed.entries()[0].authors()[0];
        assert_eq!("Grace", person.name());
        assert_eq!(None, person.email());
        assert_eq!("Ada", feed.authors()[0].name());

        let channel = rss_channel(&site(), &items);
        assert_eq!(Some("Grace"), channel.items()[0].author());
    }

    // Accepts nothing, like a full disk.
    struct Full;

    impl Write for Full {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "no space left on device"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_feeds_report_buffered_failures() {
        // Small feeds fit in the buffer, so the failure only surfaces when
        // the buffer is flushed.
        let items = items(&site(), &entries().descending());
        assert!(write_atom(&site(), &items, BufWriter::new(Full)).is_err());
        assert!(write_rss(&site(), &items, BufWriter::new(Full)).is_err());
    }
}
