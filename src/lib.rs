//! The library code for the `sitebuilder` static blog builder. A build is a
//! single straight-line pass:
//!
//! 1. Parsing entries from source documents on disk ([`crate::parser`])
//! 2. Ordering them ([`crate::collection`])
//! 3. Rendering pages to disk ([`crate::write`])
//! 4. Writing the Atom and RSS feeds ([`crate::feed`])
//!
//! Source documents are markdown files whose first two lines are a
//! `Title:` and a `Date:` header. Every document becomes one page named after
//! its source file (its permalink). The index page shows the most recent
//! entry, and the archive page links every entry, newest first, grouped by
//! year. [`crate::build::build_site`] sequences the steps and fails on the
//! first bad document, so a build either produces the whole site or stops.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod collection;
pub mod config;
pub mod entry;
pub mod feed;
pub mod markdown;
pub mod page;
pub mod parser;
pub mod permalink;
pub mod template;
pub mod write;
