//! Converts document bodies into HTML fragments.

use pulldown_cmark::{html, CowStr, Event, LinkType, Options, Parser, Tag};
use url::{ParseError, Url};

use crate::parser::MARKDOWN_EXTENSION;

/// Turns raw document bodies into trusted markup. The returned fragment is
/// inserted into pages as-is, so implementations are responsible for its
/// safety.
pub trait Converter {
    fn convert(&self, body: &[u8]) -> String;
}

/// A [`Converter`] for CommonMark bodies (with footnotes, smart punctuation,
/// strikethrough, tables, and task lists). Relative links to other `.md`
/// documents are rewritten to point at their permalinks.
pub struct Markdown<'a> {
    output_extension: &'a str,
}

impl<'a> Markdown<'a> {
    pub fn new(output_extension: &'a str) -> Markdown<'a> {
        Markdown { output_extension }
    }

    fn options() -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);
        options
    }

    // Rewrites `foo.md` and `foo.md#frag` into `foo.html` and `foo.html#frag`.
    // Absolute URLs are left alone.
    fn convert_link(&self, link: &str) -> Option<String> {
        match Url::parse(link) {
            Err(ParseError::RelativeUrlWithoutBase) => {}
            _ => return None,
        }
        let (path, fragment) = match link.find('#') {
            Some(i) => link.split_at(i),
            None => (link, ""),
        };
        let stem = path.strip_suffix(MARKDOWN_EXTENSION)?.strip_suffix('.')?;
        if stem.is_empty() || stem.ends_with('/') {
            return None;
        }
        Some(format!("{}.{}{}", stem, self.output_extension, fragment))
    }

    fn convert_event<'b>(&self, ev: Event<'b>) -> Event<'b> {
        match ev {
            Event::Start(Tag::Link(
                link @ (LinkType::Inline
                | LinkType::Reference
                | LinkType::ReferenceUnknown
                | LinkType::Shortcut
                | LinkType::Collapsed
                | LinkType::CollapsedUnknown),
                url,
                title,
            )) => {
                let url = match self.convert_link(&url) {
                    Some(converted) => CowStr::Boxed(converted.into_boxed_str()),
                    None => url,
                };
                Event::Start(Tag::Link(link, url, title))
            }
            _ => ev,
        }
    }
}

impl Converter for Markdown<'_> {
    fn convert(&self, body: &[u8]) -> String {
        let markdown = String::from_utf8_lossy(body);
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(
            &mut out,
            Parser::new_ext(&markdown, Self::options()).map(|ev| self.convert_event(ev)),
        );
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn convert(markdown: &str) -> String {
        Markdown::new("html").convert(markdown.as_bytes())
    }

    #[test]
    fn test_convert_paragraph() {
        assert_eq!("<p>hi</p>\n", convert("hi"));
    }

    #[test]
    fn test_convert_relative_markdown_link() {
        assert_eq!(
            "<p><a href=\"other.html#part\">other</a></p>\n",
            convert("[other](other.md#part)")
        );
        assert_eq!("<p><a href=\"b.html\">b</a></p>\n", convert("[b](b.md)"));
    }

    #[test]
    fn test_convert_leaves_other_links() {
        assert_eq!(
            "<p><a href=\"https://example.org/a.md\">x</a></p>\n",
            convert("[x](https://example.org/a.md)")
        );
        assert_eq!("<p><a href=\"img.png\">y</a></p>\n", convert("[y](img.png)"));
    }

    #[test]
    fn test_convert_tables() {
        let html = convert("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_convert_lossy_utf8() {
        assert_eq!("<p>a\u{FFFD}b</p>\n", Markdown::new("html").convert(b"a\xffb"));
    }
}
