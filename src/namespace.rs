//! Registry of known syndication namespaces.
//!
//! The registry is the single point that decides dialect identity: a feed
//! that binds `a:` to the Atom namespace URI is recognized exactly as one
//! that uses the default namespace. Lookups are case-insensitive and
//! tolerate a trailing slash.

/// The XML namespace itself (`xml:base`, `xml:lang`).
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Known namespace URI → canonical prefix. URIs are stored pre-normalized
/// (lowercase, no trailing slash).
const REGISTRY: &[(&str, &str)] = &[
    // Atom 1.0 and the draft/0.3 namespaces
    ("http://www.w3.org/2005/atom", "atom"),
    ("http://purl.org/atom/ns#", "atom"),
    // RDF syntax (the rdf:RDF wrapper of RSS 1.0 / 0.90)
    ("http://www.w3.org/1999/02/22-rdf-syntax-ns#", "rdf"),
    // RSS 1.0 core elements, plus the Netscape 0.90 vocabulary
    ("http://purl.org/rss/1.0", "rss"),
    ("http://my.netscape.com/rdf/simple/0.9", "rss"),
    // Dublin Core
    ("http://purl.org/dc/elements/1.1", "dc"),
    ("http://purl.org/dc/terms", "dc"),
    // Apple podcast extensions
    ("http://www.itunes.com/dtds/podcast-1.0.dtd", "itunes"),
    // Media RSS
    ("http://search.yahoo.com/mrss", "media"),
    ("http://www.rssboard.org/media-rss", "media"),
    // Creative Commons (two historic spellings)
    ("http://creativecommons.org/ns#", "cc"),
    ("http://cyber.law.harvard.edu/rss/creativecommonsrssmodule.html", "cc"),
    ("http://backend.userland.com/creativecommonsrssmodule", "creativecommons"),
    // RSS module administrivia
    ("http://webns.net/mvcb", "admin"),
    // Feedburner / Pheedo rewriting services
    ("http://rssnamespace.org/feedburner/ext/1.0", "feedburner"),
    ("http://www.pheedo.com/namespace/pheedo", "pheedo"),
    // The XML namespace (xml:base, xml:lang)
    ("http://www.w3.org/xml/1998/namespace", "xml"),
];

/// Lowercase and strip a single trailing slash so lookup tolerates the
/// common URI spelling variants.
fn normalize(uri: &str) -> String {
    let lowered = uri.trim().to_ascii_lowercase();
    match lowered.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => lowered,
    }
}

/// Returns the canonical prefix for a registered namespace URI.
///
/// ```
/// use skein::namespace::canonical_prefix;
///
/// assert_eq!(canonical_prefix("http://www.w3.org/2005/Atom"), Some("atom"));
/// assert_eq!(canonical_prefix("http://search.yahoo.com/mrss/"), Some("media"));
/// assert_eq!(canonical_prefix("http://example.com/ns"), None);
/// ```
pub fn canonical_prefix(uri: &str) -> Option<&'static str> {
    if uri.is_empty() {
        return None;
    }
    let norm = normalize(uri);
    REGISTRY
        .iter()
        .find(|(known, _)| *known == norm)
        .map(|(_, prefix)| *prefix)
}

/// True iff `uri` is one of the registered URIs for `prefix`.
pub fn belongs_to(uri: &str, prefix: &str) -> bool {
    canonical_prefix(uri) == Some(prefix) && !prefix.is_empty()
}

/// Convenience: whether an optional URI belongs to `prefix`.
pub(crate) fn uri_belongs_to(uri: Option<&str>, prefix: &str) -> bool {
    uri.is_some_and(|u| belongs_to(u, prefix))
}
