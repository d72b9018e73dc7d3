//! Defines [`Entries`], the set of parsed [`Entry`] objects for one build, and
//! the orderings derived from it.

use chrono::Datelike;
use serde::Deserialize;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::path::Path;

use crate::entry::Entry;

/// The order in which entries are listed in feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedOrder {
    /// Most recent entry first.
    Newest,

    /// Oldest entry first.
    Oldest,
}

impl Default for FeedOrder {
    fn default() -> Self {
        FeedOrder::Newest
    }
}

impl std::str::FromStr for FeedOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(FeedOrder::Newest),
            "oldest" => Ok(FeedOrder::Oldest),
            _ => Err(format!("unknown feed order `{}`, expected `newest` or `oldest`", s)),
        }
    }
}

/// A run of entries sharing a publication year, as listed on the archive
/// page.
#[derive(Debug, PartialEq)]
pub struct YearGroup<'a> {
    pub year: i32,
    pub entries: Vec<&'a Entry>,
}

/// The entries of one build, held in discovery order. Every ordering is a
/// stable sort on the entry date, so entries with equal dates keep their
/// discovery order.
#[derive(Debug, Default)]
pub struct Entries {
    entries: Vec<Entry>,
}

impl Entries {
    /// Wraps `entries`, which must be in discovery order.
    pub fn new(entries: Vec<Entry>) -> Entries {
        Entries { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the entries in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Returns the entries oldest first.
    pub fn ascending(&self) -> Vec<&Entry> {
        let mut v: Vec<&Entry> = self.entries.iter().collect();
        v.sort_by_key(|e| e.date);
        v
    }

    /// Returns the entries newest first.
    pub fn descending(&self) -> Vec<&Entry> {
        let mut v: Vec<&Entry> = self.entries.iter().collect();
        v.sort_by_key(|e| Reverse(e.date));
        v
    }

    /// Returns the entries in the requested feed order.
    pub fn ordered(&self, order: FeedOrder) -> Vec<&Entry> {
        match order {
            FeedOrder::Newest => self.descending(),
            FeedOrder::Oldest => self.ascending(),
        }
    }

    /// Returns the entry with the most recent date, or `None` if there are no
    /// entries. If several entries share the most recent date, the one
    /// discovered first wins.
    pub fn latest(&self) -> Option<&Entry> {
        let mut latest: Option<&Entry> = None;
        for entry in &self.entries {
            match latest {
                Some(l) if l.date >= entry.date => {}
                _ => latest = Some(entry),
            }
        }
        latest
    }

    /// Groups the entries by year, newest first. A new group starts every
    /// time the year changes while scanning the descending ordering.
    pub fn archive_groups(&self) -> Vec<YearGroup> {
        let mut groups: Vec<YearGroup> = Vec::new();
        for entry in self.descending() {
            let year = entry.date.year();
            match groups.last_mut() {
                Some(group) if group.year == year => group.entries.push(entry),
                _ => groups.push(YearGroup {
                    year,
                    entries: vec![entry],
                }),
            }
        }
        groups
    }

    /// Returns the entries, in discovery order, whose permalink is one of
    /// `names`.
    pub fn claiming(&self, names: &[&str]) -> Vec<&Entry> {
        self.entries
            .iter()
            .filter(|entry| names.contains(&entry.permalink.as_str()))
            .collect()
    }

    /// Returns every permalink claimed by more than one entry along with the
    /// source paths claiming it, in discovery order. The last of those
    /// entries is the one whose page survives in the output directory.
    pub fn collisions(&self) -> Vec<(&str, Vec<&Path>)> {
        let mut claims: HashMap<&str, Vec<&Path>> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for entry in &self.entries {
            let permalink = entry.permalink.as_str();
            let paths = claims.entry(permalink).or_insert_with(|| {
                order.push(permalink);
                Vec::new()
            });
            paths.push(entry.source_path.as_path());
        }
        order
            .into_iter()
            .filter_map(|permalink| match claims.remove(permalink) {
                Some(paths) if paths.len() > 1 => Some((permalink, paths)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn entry(name: &str, date: &str) -> Entry {
        Entry {
            title: name.to_uppercase(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            source_path: PathBuf::from(format!("src/{}.md", name)),
            permalink: format!("{}.html", name),
            body: Vec::new(),
        }
    }

    fn permalinks(entries: &[&Entry]) -> Vec<String> {
        entries.iter().map(|e| e.permalink.clone()).collect()
    }

    #[test]
    fn test_orderings_are_reversed() {
        let entries = Entries::new(vec![
            entry("b", "2021-06-15"),
            entry("a", "2020-01-01"),
            entry("c", "2022-03-03"),
        ]);
        assert_eq!(vec!["a.html", "b.html", "c.html"], permalinks(&entries.ascending()));
        assert_eq!(vec!["c.html", "b.html", "a.html"], permalinks(&entries.descending()));

        let mut reversed = entries.ascending();
        reversed.reverse();
        assert_eq!(entries.descending(), reversed);
    }

    #[test]
    fn test_equal_dates_keep_discovery_order() {
        let entries = Entries::new(vec![
            entry("first", "2020-05-05"),
            entry("older", "2019-01-01"),
            entry("second", "2020-05-05"),
            entry("third", "2020-05-05"),
        ]);
        assert_eq!(
            vec!["first.html", "second.html", "third.html", "older.html"],
            permalinks(&entries.descending())
        );
        assert_eq!(
            vec!["older.html", "first.html", "second.html", "third.html"],
            permalinks(&entries.ascending())
        );
    }

    #[test]
    fn test_latest_prefers_first_discovered() {
        let entries = Entries::new(vec![
            entry("old", "2019-01-01"),
            entry("tie1", "2021-01-01"),
            entry("tie2", "2021-01-01"),
        ]);
        assert_eq!("tie1.html", entries.latest().unwrap().permalink);
        assert_eq!(None, Entries::default().latest());
    }

    #[test]
    fn test_ordered() {
        let entries = Entries::new(vec![entry("a", "2020-01-01"), entry("b", "2021-06-15")]);
        assert_eq!(vec!["b.html", "a.html"], permalinks(&entries.ordered(FeedOrder::Newest)));
        assert_eq!(vec!["a.html", "b.html"], permalinks(&entries.ordered(FeedOrder::Oldest)));
    }

    #[test]
    fn test_archive_groups() {
        let entries = Entries::new(vec![
            entry("a", "2020-01-01"),
            entry("b", "2021-06-15"),
            entry("c", "2020-11-30"),
            entry("d", "2021-01-02"),
        ]);
        let groups = entries.archive_groups();
        assert_eq!(
            vec![2021, 2020],
            groups.iter().map(|g| g.year).collect::<Vec<_>>()
        );
        assert_eq!(vec!["b.html", "d.html"], permalinks(&groups[0].entries));
        assert_eq!(vec!["c.html", "a.html"], permalinks(&groups[1].entries));
    }

    #[test]
    fn test_collisions() {
        let mut dup = entry("a", "2020-01-01");
        dup.source_path = PathBuf::from("elsewhere/a.md");
        let entries = Entries::new(vec![entry("a", "2021-01-01"), entry("b", "2020-01-01"), dup]);
        assert_eq!(
            vec![(
                "a.html",
                vec![Path::new("src/a.md"), Path::new("elsewhere/a.md")]
            )],
            entries.collisions()
        );
    }

    #[test]
    fn test_feed_order_from_str() {
        assert_eq!(Ok(FeedOrder::Oldest), "oldest".parse::<FeedOrder>());
        assert!("sideways".parse::<FeedOrder>().is_err());
    }

    #[test]
    fn test_claiming() {
        let entries = Entries::new(vec![
            entry("index", "2020-01-01"),
            entry("a", "2020-01-01"),
            entry("archives", "2021-01-01"),
        ]);
        assert_eq!(
            vec!["index.html", "archives.html"],
            permalinks(&entries.claiming(&["archives.html", "index.html", "about.html"]))
        );
        assert!(entries.claiming(&[]).is_empty());
    }
}
