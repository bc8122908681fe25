//! The tokenizer-facing event contract.
//!
//! The core consumes a SAX-like stream with lowercase-normalized names and
//! namespace expansion already applied. [`crate::FeedParser`] produces these
//! events from bytes via quick-xml; callers with their own tokenizer can
//! feed them directly through [`crate::FeedParser::handle_event`].

/// A namespace-expanded element or attribute name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QName {
    /// Qualified name as written (`prefix:local` or `local`), lowercased.
    pub name: String,
    /// Declared prefix, lowercased, if any.
    pub prefix: Option<String>,
    /// Local part, lowercased.
    pub local: String,
    /// Resolved namespace URI, if the name is bound to one.
    pub uri: Option<String>,
}

impl QName {
    /// An unbound, unprefixed name.
    pub fn plain(name: &str) -> Self {
        QName {
            name: name.to_string(),
            prefix: None,
            local: name.to_string(),
            uri: None,
        }
    }
}

/// A namespace-expanded attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaxAttr {
    /// Qualified name as written, lowercased.
    pub name: String,
    /// Declared prefix, lowercased, if any (`xmlns` for prefixed namespace
    /// declarations).
    pub prefix: Option<String>,
    /// Local part, lowercased.
    pub local: String,
    /// Resolved namespace URI, if any.
    pub uri: Option<String>,
    /// Unescaped attribute value.
    pub value: String,
}

/// One event from the tokenizer.
#[derive(Debug, Clone, PartialEq)]
pub enum SaxEvent {
    /// An opening tag. Empty elements (`<x/>`) arrive as `Open` immediately
    /// followed by `Close`.
    Open {
        name: QName,
        attrs: Vec<SaxAttr>,
    },
    /// A closing tag.
    Close { name: QName },
    /// Character data (entities already decoded).
    Text(String),
    /// A CDATA section, verbatim.
    Cdata(String),
    /// The terminal event.
    End,
}
