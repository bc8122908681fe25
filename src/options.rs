//! Parser configuration.
//!
//! All options default to the lenient, normalizing behavior most callers
//! want; construct with `ParseOptions::default()` and override fields.

/// Options controlling a parse session.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Reject malformed XML instead of recovering. When set, the first
    /// tokenizer error aborts the parse.
    pub strict: bool,

    /// Map channel/feed and item/entry subtrees onto the canonical schema.
    /// When false, raw trees are returned in the `extensions` maps and the
    /// canonical fields stay empty.
    pub normalize: bool,

    /// Attach a copy of the feed metadata to every emitted article.
    pub add_meta: bool,

    /// Pre-seeded base URL, used to absolutize relative references before
    /// any `xml:base` attribute or Atom `rel="self"` link is seen.
    pub feed_url: Option<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict: false,
            normalize: true,
            add_meta: true,
            feed_url: None,
        }
    }
}
