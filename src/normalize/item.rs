use crate::dialect::Dialect;
use crate::model::{Article, Enclosure};
use crate::node::{Node, Value};
use crate::options::ParseOptions;
use crate::util::parse_date;

use super::{attr, collect_categories, dedup, person, preserve_children, text};

/// Map an item/entry subtree onto a canonical article.
pub(crate) fn normalize_item(
    node: &Node,
    dialect: Option<Dialect>,
    options: &ParseOptions,
) -> Article {
    let mut item = Article::default();

    if !options.normalize {
        item.extensions = node.children.clone();
        return item;
    }

    let mut categories = Vec::new();

    for (key, value) in node.children.iter() {
        match key {
            "title" => item.title = text(value),
            "description" | "summary" => {
                item.summary = text(value);
                if item.description.is_none() {
                    item.description = text(value);
                }
            }
            // A full body always wins over the short form
            "content" | "content:encoded" => item.description = text(value),
            "pubdate" | "published" | "issued" => {
                if let Some(date) = value.text().and_then(parse_date) {
                    item.pubdate = Some(date);
                    item.date.get_or_insert(date);
                }
            }
            "modified" | "updated" | "dc:date" => {
                if let Some(date) = value.text().and_then(parse_date) {
                    item.date = Some(date);
                    item.pubdate.get_or_insert(date);
                }
            }
            "link" | "atom:link" | "atom10:link" => handle_links(value, &mut item),
            "guid" | "id" => item.guid = text(value),
            "author" => item.author = person(value),
            "dc:creator" => item.author = text(value),
            "comments" => item.comments = text(value),
            "source" => handle_source(value, dialect, &mut item),
            "enclosure" | "media:content" => {
                for enclosure in value.iter() {
                    if let Some(el) = enclosure.as_node() {
                        item.enclosures.push(Enclosure {
                            url: el.attr("url").map(str::to_string),
                            mime_type: el
                                .attr("type")
                                .or_else(|| el.attr("medium"))
                                .map(str::to_string),
                            length: el
                                .attr("length")
                                .or_else(|| el.attr("filesize"))
                                .map(str::to_string),
                        });
                    }
                }
            }
            "category" | "dc:subject" | "itunes:category" | "media:category" => {
                collect_categories(key, value, dialect, &mut categories);
            }
            "feedburner:origlink" | "pheedo:origlink" => {
                if item.orig_link.is_none() {
                    item.orig_link = text(value);
                }
            }
            _ => {}
        }
    }

    let child_text = |key: &str| node.child(key).and_then(text);

    if item.description.is_none() {
        item.description = child_text("itunes:summary");
    }
    if item.author.is_none() {
        item.author = child_text("itunes:author")
            .or_else(|| {
                node.child("itunes:owner")
                    .and_then(Value::as_node)
                    .and_then(|owner| owner.child_text("itunes:name"))
                    .map(str::to_string)
            })
            .or_else(|| child_text("dc:publisher"));
    }
    if item.image.url.is_none() {
        item.image.url = nested_attr(node, &["itunes:image"], "href")
            .or_else(|| nested_attr(node, &["media:thumbnail"], "url"))
            .or_else(|| nested_attr(node, &["media:content", "media:thumbnail"], "url"))
            .or_else(|| nested_attr(node, &["media:group", "media:thumbnail"], "url"))
            .or_else(|| {
                nested_attr(
                    node,
                    &["media:group", "media:content", "media:thumbnail"],
                    "url",
                )
            });
    }

    item.categories = dedup(categories);
    preserve_children(node, dialect, &mut item.extensions);

    item
}

/// Item-level link handling. The Atom `rel` vocabulary routes links into
/// different fields; an RSS link is bare text. The article guid falls back
/// to the link when no explicit `guid`/`id` was (or will be) seen.
fn handle_links(value: &Value, item: &mut Article) {
    for link in value.iter() {
        if let Some(href) = attr(link, "href") {
            if href.is_empty() {
                continue;
            }
            match link.as_node().and_then(|n| n.attr("rel")) {
                None => {
                    if item.link.is_none() {
                        item.link = Some(href);
                    }
                }
                Some("canonical") => item.orig_link = Some(href),
                Some("alternate") => item.link = Some(href),
                Some("replies") => item.comments = Some(href),
                Some("enclosure") => {
                    let el = link.as_node();
                    item.enclosures.push(Enclosure {
                        url: Some(href),
                        mime_type: el.and_then(|n| n.attr("type")).map(str::to_string),
                        length: el.and_then(|n| n.attr("length")).map(str::to_string),
                    });
                }
                Some(_) => {}
            }
        } else if item.link.is_none() {
            if let Some(url) = link.text() {
                item.link = Some(url.to_string());
            }
        }
    }
    if item.guid.is_none() {
        item.guid = item.link.clone();
    }
}

fn handle_source(value: &Value, dialect: Option<Dialect>, item: &mut Article) {
    if dialect == Some(Dialect::Atom) {
        if let Some(source) = value.as_node() {
            item.source.title = source.child_text("title").map(str::to_string);
            item.source.url = source
                .child("link")
                .and_then(Value::first)
                .and_then(|link| attr(link, "href"));
        }
    } else if let Some(source) = value.as_node() {
        item.source.title = (!source.text.is_empty()).then(|| source.text.clone());
        item.source.url = source.attr("url").map(str::to_string);
    } else {
        // A url-less RSS source collapses to its title text
        item.source.title = text(value);
    }
}

/// Follow a child path (taking the first entry of any multi-valued slot)
/// and read an attribute off the final element.
fn nested_attr(node: &Node, path: &[&str], name: &str) -> Option<String> {
    let mut current = node;
    for key in path {
        current = current
            .child(key)
            .and_then(Value::first)
            .and_then(Value::as_node)?;
    }
    current.attr(name).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use crate::parse;
    use pretty_assertions::assert_eq;

    const RSS_ITEM: &str = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Channel</title>
    <item>
      <title>First</title>
      <link>http://example.com/1</link>
      <description>Short</description>
      <content:encoded>&lt;p&gt;Long body&lt;/p&gt;</content:encoded>
      <comments>http://example.com/1#comments</comments>
      <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
      <enclosure url="http://example.com/1.mp3" type="audio/mpeg" length="123"/>
      <source url="http://orig.example.com/feed.xml">Origin</source>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_rss_item_fields() {
        let parsed = parse(RSS_ITEM.as_bytes()).unwrap();
        assert_eq!(parsed.articles.len(), 1);
        let item = &parsed.articles[0];
        assert_eq!(item.title.as_deref(), Some("First"));
        assert_eq!(item.link.as_deref(), Some("http://example.com/1"));
        assert_eq!(item.summary.as_deref(), Some("Short"));
        assert_eq!(item.description.as_deref(), Some("<p>Long body</p>"));
        assert_eq!(item.comments.as_deref(), Some("http://example.com/1#comments"));
        // No explicit guid: the link stands in
        assert_eq!(item.guid.as_deref(), Some("http://example.com/1"));
        assert_eq!(item.enclosures.len(), 1);
        assert_eq!(
            item.enclosures[0].url.as_deref(),
            Some("http://example.com/1.mp3")
        );
        assert_eq!(item.enclosures[0].mime_type.as_deref(), Some("audio/mpeg"));
        assert_eq!(item.enclosures[0].length.as_deref(), Some("123"));
        assert_eq!(item.source.title.as_deref(), Some("Origin"));
        assert_eq!(
            item.source.url.as_deref(),
            Some("http://orig.example.com/feed.xml")
        );
        assert!(item.pubdate.is_some());
    }

    #[test]
    fn test_atom_entry_link_routing() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
          <title>F</title>
          <entry>
            <id>tag:example.com,2024:1</id>
            <title>E</title>
            <link rel="alternate" href="http://example.com/e"/>
            <link rel="replies" href="http://example.com/e/comments"/>
            <link rel="canonical" href="http://example.com/canonical"/>
            <link rel="enclosure" href="http://example.com/e.mp3" type="audio/mpeg" length="9"/>
            <updated>2024-01-01T00:00:00Z</updated>
          </entry>
        </feed>"#;
        let parsed = parse(xml.as_bytes()).unwrap();
        let item = &parsed.articles[0];
        assert_eq!(item.link.as_deref(), Some("http://example.com/e"));
        assert_eq!(item.comments.as_deref(), Some("http://example.com/e/comments"));
        assert_eq!(item.orig_link.as_deref(), Some("http://example.com/canonical"));
        assert_eq!(item.guid.as_deref(), Some("tag:example.com,2024:1"));
        assert_eq!(item.enclosures.len(), 1);
        assert_eq!(item.enclosures[0].length.as_deref(), Some("9"));
        assert!(item.date.is_some());
        assert_eq!(item.date, item.pubdate);
    }

    #[test]
    fn test_media_content_and_thumbnail_fallbacks() {
        let xml = r#"<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
          <channel><title>C</title>
            <item>
              <title>V</title>
              <media:group>
                <media:content url="http://example.com/v.mp4" medium="video" fileSize="5000">
                </media:content>
                <media:thumbnail url="http://example.com/v.jpg"/>
              </media:group>
            </item>
          </channel>
        </rss>"#;
        let parsed = parse(xml.as_bytes()).unwrap();
        let item = &parsed.articles[0];
        assert_eq!(item.image.url.as_deref(), Some("http://example.com/v.jpg"));
        // media:content inside media:group is preserved but not a direct
        // child, so it does not become an enclosure
        assert!(item.enclosures.is_empty());
        assert!(item.extensions.contains("media:group"));
    }

    #[test]
    fn test_direct_media_content_becomes_enclosure() {
        let xml = r#"<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
          <channel><title>C</title>
            <item>
              <title>V</title>
              <media:content url="http://example.com/v.mp4" medium="video" fileSize="5000"/>
            </item>
          </channel>
        </rss>"#;
        let parsed = parse(xml.as_bytes()).unwrap();
        let item = &parsed.articles[0];
        assert_eq!(item.enclosures.len(), 1);
        assert_eq!(item.enclosures[0].mime_type.as_deref(), Some("video"));
        assert_eq!(item.enclosures[0].length.as_deref(), Some("5000"));
    }

    #[test]
    fn test_feedburner_origlink() {
        let xml = r#"<rss version="2.0" xmlns:feedburner="http://rssnamespace.org/feedburner/ext/1.0">
          <channel><title>C</title>
            <item>
              <title>T</title>
              <link>http://feeds.example.com/~r/x/1</link>
              <feedburner:origLink>http://example.com/real</feedburner:origLink>
            </item>
          </channel>
        </rss>"#;
        let parsed = parse(xml.as_bytes()).unwrap();
        let item = &parsed.articles[0];
        assert_eq!(item.orig_link.as_deref(), Some("http://example.com/real"));
        assert_eq!(item.link.as_deref(), Some("http://feeds.example.com/~r/x/1"));
    }

    #[test]
    fn test_itunes_owner_name_author_fallback() {
        let xml = r#"<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
          <channel><title>Pod</title>
            <item>
              <title>Ep 1</title>
              <itunes:owner>
                <itunes:name>Host</itunes:name>
                <itunes:email>host@example.com</itunes:email>
              </itunes:owner>
            </item>
          </channel>
        </rss>"#;
        let parsed = parse(xml.as_bytes()).unwrap();
        // No itunes:author and no author element: the owner's name steps in
        assert_eq!(parsed.articles[0].author.as_deref(), Some("Host"));
    }

    #[test]
    fn test_direct_media_thumbnail_sets_image() {
        let xml = r#"<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
          <channel><title>C</title>
            <item>
              <title>V</title>
              <media:thumbnail url="http://example.com/direct.jpg"/>
            </item>
          </channel>
        </rss>"#;
        let parsed = parse(xml.as_bytes()).unwrap();
        assert_eq!(
            parsed.articles[0].image.url.as_deref(),
            Some("http://example.com/direct.jpg")
        );
    }

    #[test]
    fn test_media_content_nested_thumbnail_sets_image() {
        let xml = r#"<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
          <channel><title>C</title>
            <item>
              <title>V</title>
              <media:content url="http://example.com/v.mp4" medium="video">
                <media:thumbnail url="http://example.com/nested.jpg"/>
              </media:content>
            </item>
          </channel>
        </rss>"#;
        let parsed = parse(xml.as_bytes()).unwrap();
        let item = &parsed.articles[0];
        assert_eq!(
            item.image.url.as_deref(),
            Some("http://example.com/nested.jpg")
        );
        // The direct media:content child still yields an enclosure
        assert_eq!(item.enclosures.len(), 1);
        assert_eq!(
            item.enclosures[0].url.as_deref(),
            Some("http://example.com/v.mp4")
        );
    }

    #[test]
    fn test_dc_creator_sets_author() {
        let xml = r#"<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
          <channel><title>C</title>
            <item><title>T</title><dc:creator>Dana</dc:creator></item>
          </channel>
        </rss>"#;
        let parsed = parse(xml.as_bytes()).unwrap();
        assert_eq!(parsed.articles[0].author.as_deref(), Some("Dana"));
    }

    #[test]
    fn test_guid_element_wins_over_link_fallback() {
        let xml = r#"<rss version="2.0">
          <channel><title>C</title>
            <item>
              <link>http://example.com/1</link>
              <guid isPermaLink="false">abc-123</guid>
            </item>
          </channel>
        </rss>"#;
        let parsed = parse(xml.as_bytes()).unwrap();
        assert_eq!(parsed.articles[0].guid.as_deref(), Some("abc-123"));
    }
}
