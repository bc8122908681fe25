use thiserror::Error;

/// Errors surfaced while parsing a feed.
///
/// Only two kinds are fatal (see [`FeedError::is_fatal`]): [`FeedError::Io`]
/// (the upstream byte source failed) and [`FeedError::NotAFeed`]. Everything
/// else is accumulated and parsing resumes, preserving as much of the
/// document as possible — unless the `strict` option additionally turns
/// tokenizer errors fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// The document root is not `<rss>`, `<rdf:RDF>` or an Atom `<feed>`.
    #[error("not a feed: document root is <{0}>")]
    NotAFeed(String),

    /// A recoverable tokenizer error. The reader state is cleared and
    /// parsing resumes at the next event.
    #[error("xml error at byte {position}: {message}")]
    Xml {
        /// Byte offset into the input where the tokenizer gave up.
        position: u64,
        /// Tokenizer message, verbatim.
        message: String,
    },

    /// A non-fatal XML quibble (e.g. a malformed attribute). Reported and
    /// otherwise ignored.
    #[error("xml warning: {0}")]
    Warning(String),

    /// The upstream stream failed. Fatal: parsing halts and `end` fires with
    /// this error attached.
    #[error("read failed: {0}")]
    Io(String),
}

impl FeedError {
    /// Whether this error halts parsing regardless of options. Strict mode
    /// makes [`FeedError::Xml`] fatal on top of these.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FeedError::Io(_) | FeedError::NotAFeed(_))
    }
}
