//! Streaming RSS / RDF (RSS 1.0) / Atom feed parser.
//!
//! `skein` consumes an XML byte stream in any of the three syndication
//! dialects and emits one normalized [`FeedMeta`] record plus a sequence of
//! [`Article`] records, while preserving every non-core namespaced element
//! for downstream consumers. The builder keeps only the spine from the root
//! to the current element, so memory stays bounded by one article plus the
//! feed-level metadata block regardless of feed size.
//!
//! Dialect differences — element spellings, the Atom `rel` link vocabulary,
//! Dublin Core / iTunes / Media RSS extensions, `xml:base` scoping, inline
//! XHTML content — are flattened into one stable schema so callers never
//! branch on feed type.
//!
//! # Collect everything
//!
//! ```
//! let xml = br#"<rss version="2.0"><channel>
//!     <title>Example</title>
//!     <item><title>Hello</title><link>http://example.com/1</link></item>
//! </channel></rss>"#;
//!
//! let parsed = skein::parse(xml).unwrap();
//! assert_eq!(parsed.meta.title.as_deref(), Some("Example"));
//! assert_eq!(parsed.articles.len(), 1);
//! assert_eq!(parsed.articles[0].guid.as_deref(), Some("http://example.com/1"));
//! ```
//!
//! # Observe events as they happen
//!
//! ```
//! use skein::{Article, FeedParser, FeedSink};
//!
//! #[derive(Default)]
//! struct Titles(Vec<String>);
//!
//! impl FeedSink for Titles {
//!     fn article(&mut self, article: &Article) {
//!         self.0.extend(article.title.clone());
//!     }
//! }
//!
//! let xml: &[u8] = br#"<feed xmlns="http://www.w3.org/2005/Atom">
//!     <title>F</title>
//!     <entry><title>One</title></entry>
//!     <entry><title>Two</title></entry>
//! </feed>"#;
//!
//! let mut sink = Titles::default();
//! FeedParser::new().run(xml, &mut sink).unwrap();
//! assert_eq!(sink.0, ["One", "Two"]);
//! ```
//!
//! Fetching, conditional GETs and byte-level tokenization live elsewhere:
//! this crate drives quick-xml over whatever `BufRead` you hand it, or
//! accepts pre-tokenized [`SaxEvent`]s straight through
//! [`FeedParser::handle_event`].

mod builder;
mod dialect;
mod error;
mod model;
mod node;
mod normalize;
mod options;
mod parser;
mod sax;

pub mod namespace;
pub mod util;

pub use builder::ParseContext;
pub use dialect::Dialect;
pub use error::FeedError;
pub use model::{Article, ArticleSource, Enclosure, FeedMeta, Image};
pub use node::{Children, Node, Value};
pub use options::ParseOptions;
pub use parser::{parse, parse_with, FeedParser, FeedSink, ParsedFeed};
pub use sax::{QName, SaxAttr, SaxEvent};
