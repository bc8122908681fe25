//! The normalized, dialect-agnostic output records.
//!
//! Every field is optional — feeds in the wild omit nearly anything — and
//! the collections are empty rather than absent. Non-core namespaced
//! elements survive verbatim in the `extensions` maps under canonical keys,
//! so downstream consumers lose nothing to normalization.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dialect::Dialect;
use crate::node::Children;

/// Feed-level metadata, normalized across RSS, RDF and Atom.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedMeta {
    /// Detected dialect of the document root.
    #[serde(rename = "type")]
    pub dialect: Option<Dialect>,
    /// Dialect version: the root `version` attribute, or `"1.0"`.
    pub version: Option<String>,
    /// `(prefix, uri)` namespace declarations seen anywhere in the feed.
    /// The default namespace is recorded under an empty prefix.
    pub namespaces: Vec<(String, String)>,
    /// Root-element attributes other than `version`, canonicalized.
    pub root_attrs: Vec<(String, String)>,
    /// Feed title.
    pub title: Option<String>,
    /// Feed description / Atom subtitle.
    pub description: Option<String>,
    /// Last-modified date (`lastBuildDate`, Atom `updated`, `dc:date`).
    pub date: Option<DateTime<Utc>>,
    /// Publication date (`pubDate`, Atom `published`).
    pub pubdate: Option<DateTime<Utc>>,
    /// Human-facing site link.
    pub link: Option<String>,
    /// The feed's own URL, when declared (Atom `rel="self"`).
    pub xml_url: Option<String>,
    /// Feed-level author.
    pub author: Option<String>,
    /// Declared language.
    pub language: Option<String>,
    /// Channel image / Atom logo.
    pub image: Image,
    /// Atom icon.
    pub favicon: Option<String>,
    /// Copyright / rights statement.
    pub copyright: Option<String>,
    /// Generating software, with version and URI folded in when declared.
    pub generator: Option<String>,
    /// Deduplicated categories in first-seen order.
    pub categories: Vec<String>,
    /// Every channel/feed child, preserved under its canonical key
    /// (unprefixed names re-keyed as `{dialect}:{name}`).
    pub extensions: Children,
}

/// An image attached to a feed or article.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Image {
    pub url: Option<String>,
    pub title: Option<String>,
}

/// The upstream source of a republished article (RSS `source`, Atom
/// `source`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArticleSource {
    pub title: Option<String>,
    pub url: Option<String>,
}

/// An attached media object (`enclosure`, `media:content`, Atom
/// `rel="enclosure"` links).
///
/// `length` stays a string: feeds put anything from byte counts to empty
/// strings in here, and the parser does not editorialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Enclosure {
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
    pub length: Option<String>,
}

/// One article (RSS/RDF `item`, Atom `entry`), normalized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Article {
    /// Article title.
    pub title: Option<String>,
    /// Full body: `content:encoded`, Atom `content`, falling back to the
    /// summary when no richer body exists.
    pub description: Option<String>,
    /// Short form: `description` (RSS) or `summary` (Atom).
    pub summary: Option<String>,
    /// Last-modified date.
    pub date: Option<DateTime<Utc>>,
    /// Publication date.
    pub pubdate: Option<DateTime<Utc>>,
    /// Canonical link to the article.
    pub link: Option<String>,
    /// Pre-rewrite link (`feedburner:origLink`, `pheedo:origLink`, Atom
    /// `rel="canonical"`).
    pub orig_link: Option<String>,
    /// Article author, inheriting the feed author when absent.
    pub author: Option<String>,
    /// Stable identifier (`guid`, Atom `id`), falling back to the link.
    pub guid: Option<String>,
    /// Comments page link.
    pub comments: Option<String>,
    /// Article image.
    pub image: Image,
    /// Republication source.
    pub source: ArticleSource,
    /// Deduplicated categories in first-seen order.
    pub categories: Vec<String>,
    /// Attached media objects, in document order.
    pub enclosures: Vec<Enclosure>,
    /// Back-reference to the feed metadata (the `add_meta` option).
    pub meta: Option<Box<FeedMeta>>,
    /// Every item/entry child, preserved under its canonical key.
    pub extensions: Children,
}
