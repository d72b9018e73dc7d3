//! Defines [`PageContext`], the value handed to the layout template for every
//! output page.

use gtmpl::Value;
use pulldown_cmark::escape::{escape_href, escape_html};
use std::collections::HashMap;
use std::io;

use crate::entry::Entry;

/// The data for rendering one page. Every field is always present in the
/// template value; fields that only apply to entry pages default to empty
/// strings or `false` on the index-of-nothing, archive, and about pages.
///
/// Templates see the fields as `.Title`, `.Date`, `.Permalink`, `.IsArticle`,
/// `.HasAboutPage`, `.Content`, and `.CSS`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageContext {
    pub title: String,
    pub date: String,
    pub permalink: String,
    pub is_article: bool,
    pub has_about_page: bool,

    /// Trusted markup, inserted into the layout without escaping.
    pub content: String,

    /// The stylesheet link, or empty for none.
    pub css_href: String,
}

/// Site-wide values shared by every [`PageContext`].
#[derive(Clone, Copy, Debug)]
pub struct Chrome<'a> {
    pub has_about_page: bool,
    pub css_href: Option<&'a str>,
}

impl PageContext {
    /// The context for an entry's own page (and the index page, which shows
    /// the latest entry).
    pub fn article(entry: &Entry, content: String, chrome: Chrome) -> PageContext {
        PageContext {
            title: entry.title.clone(),
            date: entry.formatted_date(),
            is_article: true,
            ..PageContext::standalone(entry.permalink.clone(), content, chrome)
        }
    }

    /// The context for a page that isn't backed by an entry (archive, about).
    pub fn standalone(permalink: String, content: String, chrome: Chrome) -> PageContext {
        PageContext {
            permalink,
            content,
            has_about_page: chrome.has_about_page,
            css_href: chrome.css_href.unwrap_or_default().to_owned(),
            ..PageContext::default()
        }
    }

    /// Converts the context into a [`Value::Object`] for templating. Layouts
    /// don't escape, so every field except `Content` is escaped here:
    /// `Permalink` and `CSS` as hrefs, the rest as HTML text.
    pub fn to_value(&self) -> io::Result<Value> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("Title".to_owned(), Value::String(html_text(&self.title)?));
        m.insert("Date".to_owned(), Value::String(html_text(&self.date)?));
        m.insert("Permalink".to_owned(), Value::String(href(&self.permalink)?));
        m.insert("IsArticle".to_owned(), Value::Bool(self.is_article));
        m.insert("HasAboutPage".to_owned(), Value::Bool(self.has_about_page));
        m.insert("Content".to_owned(), Value::String(self.content.clone()));
        m.insert("CSS".to_owned(), Value::String(href(&self.css_href)?));
        Ok(Value::Object(m))
    }
}

/// Escapes `s` for use as HTML text or a quoted attribute value.
pub fn html_text(s: &str) -> io::Result<String> {
    let mut out = String::with_capacity(s.len());
    escape_html(&mut out, s)?;
    Ok(out)
}

/// Escapes `s` for use in an `href` attribute.
pub fn href(s: &str) -> io::Result<String> {
    let mut out = String::with_capacity(s.len());
    escape_href(&mut out, s)?;
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn string_field(value: &Value, key: &str) -> String {
        match value {
            Value::Object(m) => match &m[key] {
                Value::String(s) => s.clone(),
                _ => panic!("`{}` is not a string", key),
            },
            _ => panic!("expected an object"),
        }
    }

    fn bool_field(value: &Value, key: &str) -> bool {
        match value {
            Value::Object(m) => match &m[key] {
                Value::Bool(b) => *b,
                _ => panic!("`{}` is not a bool", key),
            },
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_article_context() {
        let entry = Entry {
            title: String::from("Beta"),
            date: NaiveDate::from_ymd_opt(2021, 6, 15).unwrap(),
            source_path: PathBuf::from("posts/b.md"),
            permalink: String::from("b.html"),
            body: b"bye".to_vec(),
        };
        let chrome = Chrome {
            has_about_page: true,
            css_href: Some("style.css"),
        };
        let ctx = PageContext::article(&entry, String::from("<p>bye</p>"), chrome);
        assert_eq!(
            PageContext {
                title: String::from("Beta"),
                date: String::from("2021-06-15"),
                permalink: String::from("b.html"),
                is_article: true,
                has_about_page: true,
                content: String::from("<p>bye</p>"),
                css_href: String::from("style.css"),
            },
            ctx
        );
    }

    #[test]
    fn test_standalone_context_defaults_article_fields() -> io::Result<()> {
        let chrome = Chrome {
            has_about_page: false,
            css_href: None,
        };
        let value = PageContext::standalone(String::from("archives.html"), String::new(), chrome)
            .to_value()?;
        for key in &["Title", "Date", "Content", "CSS"] {
            assert_eq!("", string_field(&value, key));
        }
        assert!(!bool_field(&value, "IsArticle"));
        assert!(!bool_field(&value, "HasAboutPage"));
        assert_eq!("archives.html", string_field(&value, "Permalink"));
        Ok(())
    }

    #[test]
    fn test_value_escapes_everything_but_content() -> io::Result<()> {
        let ctx = PageContext {
            title: String::from("Cats & <Dogs>"),
            date: String::from("2021-06-15"),
            permalink: String::from("cats&dogs.html"),
            is_article: true,
            has_about_page: false,
            content: String::from("<p>Cats &amp; dogs</p>"),
            css_href: String::from("a\"b.css"),
        };
        let value = ctx.to_value()?;
        assert_eq!("Cats &amp; &lt;Dogs&gt;", string_field(&value, "Title"));
        assert_eq!("2021-06-15", string_field(&value, "Date"));
        assert_eq!("cats&amp;dogs.html", string_field(&value, "Permalink"));
        assert_eq!("<p>Cats &amp; dogs</p>", string_field(&value, "Content"));
        assert!(!string_field(&value, "CSS").contains('"'));
        Ok(())
    }
}
