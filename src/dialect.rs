//! Feed dialect identification.

use std::fmt;

use serde::Serialize;

use crate::namespace;

/// The three wire dialects this parser understands.
///
/// Detected once, from the document root element, and attached to the feed
/// metadata; normalizers branch on it instead of string-matching element
/// names at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// RSS 0.9x / 2.0.
    Rss,
    /// RDF Site Summary (RSS 1.0 / 0.90).
    Rdf,
    /// Atom 0.3 / 1.0.
    Atom,
}

impl Dialect {
    /// Identify the dialect from the root element's local name and
    /// namespace URI.
    ///
    /// `rss` is accepted regardless of namespace; `rdf` requires the local
    /// name `rdf` within the RDF namespace; `feed` requires the Atom
    /// namespace.
    pub fn detect(local: &str, uri: Option<&str>) -> Option<Dialect> {
        match local {
            "rss" => Some(Dialect::Rss),
            "rdf" if namespace::uri_belongs_to(uri, "rdf") => Some(Dialect::Rdf),
            "feed" if namespace::uri_belongs_to(uri, "atom") => Some(Dialect::Atom),
            _ => None,
        }
    }

    /// The lowercase tag used in canonical keys (`rss`, `rdf`, `atom`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Rss => "rss",
            Dialect::Rdf => "rdf",
            Dialect::Atom => "atom",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rss_detected_without_namespace() {
        assert_eq!(Dialect::detect("rss", None), Some(Dialect::Rss));
        assert_eq!(
            Dialect::detect("rss", Some("http://example.com/whatever")),
            Some(Dialect::Rss)
        );
    }

    #[test]
    fn test_rdf_requires_rdf_namespace() {
        assert_eq!(
            Dialect::detect("rdf", Some("http://www.w3.org/1999/02/22-rdf-syntax-ns#")),
            Some(Dialect::Rdf)
        );
        assert_eq!(Dialect::detect("rdf", None), None);
    }

    #[test]
    fn test_feed_requires_atom_namespace() {
        assert_eq!(
            Dialect::detect("feed", Some("http://www.w3.org/2005/Atom")),
            Some(Dialect::Atom)
        );
        assert_eq!(
            Dialect::detect("feed", Some("http://purl.org/atom/ns#")),
            Some(Dialect::Atom)
        );
        assert_eq!(Dialect::detect("feed", None), None);
    }

    #[test]
    fn test_html_is_not_a_feed() {
        assert_eq!(Dialect::detect("html", None), None);
    }
}
