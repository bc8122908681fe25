use crate::model::FeedMeta;
use crate::node::{Node, Value};
use crate::options::ParseOptions;
use crate::util::parse_date;

use super::{attr, collect_categories, dedup, first_rdf_resource, person, preserve_children, text};

/// Map a channel/feed subtree onto the canonical feed metadata.
///
/// `meta` arrives with `dialect`, `version`, `namespaces` and `root_attrs`
/// already populated by the builder; this fills the content fields. Returns
/// the feed's own URL when an Atom `rel="self"` link is discovered, so the
/// builder can seed the base stack and retroactively fix already-stored
/// relative references.
pub(crate) fn normalize_meta(
    node: &Node,
    meta: &mut FeedMeta,
    options: &ParseOptions,
) -> Option<String> {
    if !options.normalize {
        meta.extensions = node.children.clone();
        return None;
    }

    let dialect = meta.dialect;
    let mut discovered = None;
    let mut categories = Vec::new();

    for (key, value) in node.children.iter() {
        match key {
            "title" => meta.title = text(value),
            "description" | "subtitle" => meta.description = text(value),
            "pubdate" | "published" => {
                if let Some(date) = value.text().and_then(parse_date) {
                    meta.pubdate = Some(date);
                    meta.date.get_or_insert(date);
                }
            }
            "lastbuilddate" | "modified" | "updated" | "dc:date" => {
                if let Some(date) = value.text().and_then(parse_date) {
                    meta.date = Some(date);
                    meta.pubdate.get_or_insert(date);
                }
            }
            "link" | "atom:link" | "atom10:link" => {
                handle_links(value, meta, &mut discovered);
            }
            "managingeditor" | "webmaster" => {
                if meta.author.is_none() {
                    meta.author = text(value);
                }
            }
            "author" => meta.author = person(value),
            "language" => meta.language = text(value),
            "image" | "logo" => {
                if let Some(image) = value.as_node() {
                    meta.image.url = image
                        .child_text("url")
                        .map(str::to_string)
                        .or_else(|| (!image.text.is_empty()).then(|| image.text.clone()));
                    if let Some(title) = image.child_text("title") {
                        meta.image.title = Some(title.to_string());
                    }
                } else if let Some(url) = text(value) {
                    meta.image.url = Some(url);
                }
            }
            "icon" => meta.favicon = text(value),
            "copyright" | "rights" | "dc:rights" => meta.copyright = text(value),
            "generator" => {
                let mut generator = text(value);
                if let Some(el) = value.as_node() {
                    if let Some(version) = el.attr("version") {
                        generator = Some(match generator {
                            Some(g) => format!("{} v{}", g, version),
                            None => format!("v{}", version),
                        });
                    }
                    if let Some(uri) = el.attr("uri") {
                        generator = Some(match generator {
                            Some(g) => format!("{} ({})", g, uri),
                            None => uri.to_string(),
                        });
                    }
                }
                meta.generator = generator;
            }
            "category" | "dc:subject" | "itunes:category" | "media:category" => {
                collect_categories(key, value, dialect, &mut categories);
            }
            _ => {}
        }
    }

    let child_text = |key: &str| node.child(key).and_then(text);
    let child_attr = |key: &str, name: &str| {
        node.child(key)
            .and_then(Value::first)
            .and_then(|v| attr(v, name))
    };

    if meta.description.is_none() {
        meta.description = child_text("itunes:summary").or_else(|| child_text("tagline"));
    }
    if meta.author.is_none() {
        meta.author = child_text("itunes:author")
            .or_else(|| {
                node.child("itunes:owner")
                    .and_then(Value::as_node)
                    .and_then(|owner| owner.child_text("itunes:name"))
                    .map(str::to_string)
            })
            .or_else(|| child_text("dc:creator"))
            .or_else(|| child_text("dc:publisher"));
    }
    if meta.language.is_none() {
        meta.language = node
            .attr("xml:lang")
            .map(str::to_string)
            .or_else(|| child_text("dc:language"));
    }
    if meta.image.url.is_none() {
        meta.image.url =
            child_attr("itunes:image", "href").or_else(|| child_attr("media:thumbnail", "url"));
    }
    if meta.copyright.is_none() {
        meta.copyright = child_text("media:copyright")
            .or_else(|| child_text("dc:rights"))
            .or_else(|| child_text("creativecommons:license"))
            .or_else(|| node.child("cc:license").and_then(first_rdf_resource));
    }
    if meta.generator.is_none() {
        meta.generator = node
            .child("admin:generatoragent")
            .and_then(first_rdf_resource);
    }

    meta.categories = dedup(categories);
    preserve_children(node, dialect, &mut meta.extensions);

    discovered
}

/// Meta-level link handling. Atom links carry `href` (and optionally
/// `rel`); RSS links are bare text and only fill an unset slot.
fn handle_links(value: &Value, meta: &mut FeedMeta, discovered: &mut Option<String>) {
    for link in value.iter() {
        if let Some(href) = attr(link, "href") {
            if href.is_empty() {
                continue;
            }
            match link.as_node().and_then(|n| n.attr("rel")) {
                None => {
                    if meta.link.is_none() {
                        meta.link = Some(href);
                    }
                }
                Some("alternate") => meta.link = Some(href),
                Some("self") => {
                    meta.xml_url = Some(href.clone());
                    *discovered = Some(href);
                }
                Some(_) => {}
            }
        } else if meta.link.is_none() {
            if let Some(url) = link.text() {
                meta.link = Some(url.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parse;
    use pretty_assertions::assert_eq;

    const RSS_META: &str = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <title>Channel</title>
    <description>About</description>
    <link>http://example.com/</link>
    <language>en-us</language>
    <copyright>© 2024</copyright>
    <managingEditor>ed@example.com</managingEditor>
    <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
    <lastBuildDate>Tue, 02 Jan 2024 00:00:00 GMT</lastBuildDate>
    <generator>PodPress</generator>
    <image><url>http://example.com/img.png</url><title>Logo</title></image>
  </channel>
</rss>"#;

    #[test]
    fn test_rss_channel_fields() {
        let parsed = parse(RSS_META.as_bytes()).unwrap();
        let meta = parsed.meta;
        assert_eq!(meta.title.as_deref(), Some("Channel"));
        assert_eq!(meta.description.as_deref(), Some("About"));
        assert_eq!(meta.link.as_deref(), Some("http://example.com/"));
        assert_eq!(meta.language.as_deref(), Some("en-us"));
        assert_eq!(meta.copyright.as_deref(), Some("© 2024"));
        assert_eq!(meta.author.as_deref(), Some("ed@example.com"));
        assert_eq!(meta.generator.as_deref(), Some("PodPress"));
        assert_eq!(meta.image.url.as_deref(), Some("http://example.com/img.png"));
        assert_eq!(meta.image.title.as_deref(), Some("Logo"));
        assert!(meta.pubdate.is_some());
        assert!(meta.date.is_some());
        assert_ne!(meta.pubdate, meta.date);
    }

    #[test]
    fn test_pubdate_seeds_date_but_is_not_overwritten() {
        let xml = r#"<rss version="2.0"><channel>
            <title>T</title>
            <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
        </channel></rss>"#;
        let meta = parse(xml.as_bytes()).unwrap().meta;
        assert_eq!(meta.date, meta.pubdate);

        let xml = r#"<rss version="2.0"><channel>
            <title>T</title>
            <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
            <lastBuildDate>Tue, 02 Jan 2024 00:00:00 GMT</lastBuildDate>
        </channel></rss>"#;
        let meta = parse(xml.as_bytes()).unwrap().meta;
        // lastBuildDate moves `date` forward, pubdate stays put
        assert!(meta.date > meta.pubdate);
    }

    #[test]
    fn test_atom_feed_fields() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
            <title>Atom Feed</title>
            <subtitle>Sub</subtitle>
            <updated>2024-01-02T00:00:00Z</updated>
            <author><name>Ada</name><email>ada@example.com</email></author>
            <link rel="alternate" href="http://example.com/"/>
            <link rel="self" href="http://example.com/feed.xml"/>
            <icon>http://example.com/favicon.ico</icon>
            <logo>http://example.com/logo.png</logo>
            <rights>CC-BY</rights>
            <generator uri="http://gen.example" version="2.1">GenTool</generator>
        </feed>"#;
        let meta = parse(xml.as_bytes()).unwrap().meta;
        assert_eq!(meta.title.as_deref(), Some("Atom Feed"));
        assert_eq!(meta.description.as_deref(), Some("Sub"));
        assert_eq!(meta.author.as_deref(), Some("Ada"));
        assert_eq!(meta.link.as_deref(), Some("http://example.com/"));
        assert_eq!(meta.xml_url.as_deref(), Some("http://example.com/feed.xml"));
        assert_eq!(meta.favicon.as_deref(), Some("http://example.com/favicon.ico"));
        assert_eq!(meta.image.url.as_deref(), Some("http://example.com/logo.png"));
        assert_eq!(meta.copyright.as_deref(), Some("CC-BY"));
        assert_eq!(
            meta.generator.as_deref(),
            Some("GenTool v2.1 (http://gen.example)")
        );
        assert!(meta.date.is_some());
    }

    #[test]
    fn test_itunes_fallbacks() {
        let xml = r#"<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
          <channel>
            <title>Pod</title>
            <itunes:summary>A show</itunes:summary>
            <itunes:author>Host</itunes:author>
            <itunes:image href="http://example.com/cover.jpg"/>
          </channel>
        </rss>"#;
        let meta = parse(xml.as_bytes()).unwrap().meta;
        assert_eq!(meta.description.as_deref(), Some("A show"));
        assert_eq!(meta.author.as_deref(), Some("Host"));
        assert_eq!(meta.image.url.as_deref(), Some("http://example.com/cover.jpg"));
    }

    #[test]
    fn test_itunes_owner_name_author_fallback() {
        let xml = r#"<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
          <channel>
            <title>Pod</title>
            <itunes:owner>
              <itunes:name>Host</itunes:name>
              <itunes:email>host@example.com</itunes:email>
            </itunes:owner>
          </channel>
        </rss>"#;
        let meta = parse(xml.as_bytes()).unwrap().meta;
        // No itunes:author, managingEditor or author: the owner's name wins
        assert_eq!(meta.author.as_deref(), Some("Host"));
    }

    #[test]
    fn test_dc_fallbacks() {
        let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                              xmlns="http://purl.org/rss/1.0/"
                              xmlns:dc="http://purl.org/dc/elements/1.1/">
          <channel rdf:about="http://example.com/">
            <title>RDF Feed</title>
            <dc:creator>Carol</dc:creator>
            <dc:language>de</dc:language>
            <dc:date>2024-01-01T00:00:00Z</dc:date>
          </channel>
        </rdf:RDF>"#;
        let meta = parse(xml.as_bytes()).unwrap().meta;
        assert_eq!(meta.author.as_deref(), Some("Carol"));
        assert_eq!(meta.language.as_deref(), Some("de"));
        assert!(meta.date.is_some());
    }

    #[test]
    fn test_extensions_preserved_with_dialect_keys() {
        let parsed = parse(RSS_META.as_bytes()).unwrap();
        let ext = parsed.meta.extensions;
        assert!(ext.contains("rss:title"));
        assert!(ext.contains("rss:image"));
        assert!(!ext.is_empty());
    }

    #[test]
    fn test_raw_mode_returns_children_unmapped() {
        let options = crate::ParseOptions {
            normalize: false,
            ..Default::default()
        };
        let parsed = crate::parse_with(RSS_META.as_bytes(), options).unwrap();
        assert!(parsed.meta.title.is_none());
        assert!(parsed.meta.extensions.contains("title"));
    }
}
