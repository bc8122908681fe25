//! Mapping dialect-specific subtrees onto the canonical schema.
//!
//! The meta and item normalizers share the same small vocabulary of
//! extraction helpers: elements may arrive as bare strings (the collapse
//! rule), single nodes, or lists, and every helper flattens those shapes
//! uniformly.

mod item;
mod meta;

pub(crate) use item::normalize_item;
pub(crate) use meta::normalize_meta;

use crate::dialect::Dialect;
use crate::node::{Node, Value};

/// Text of a child slot: the collapsed string, or the node's character
/// data. Lists yield nothing — a multi-valued field has no single text.
pub(crate) fn text(value: &Value) -> Option<String> {
    value.text().map(str::to_string)
}

/// Attribute of a single-node slot.
pub(crate) fn attr(value: &Value, name: &str) -> Option<String> {
    value.as_node().and_then(|n| n.attr(name)).map(str::to_string)
}

/// Extract a person: Atom `author` elements carry `name`/`email`/`uri`
/// children, RSS spells the author as bare text.
pub(crate) fn person(value: &Value) -> Option<String> {
    if let Some(node) = value.as_node() {
        return node
            .child_text("name")
            .or_else(|| node.child_text("email"))
            .or_else(|| node.child_text("uri"))
            .map(str::to_string);
    }
    text(value)
}

/// First `rdf:resource` attribute found in a slot (single node or list).
/// Used by the Creative Commons and `admin:generatorAgent` fallbacks. A
/// properly-bound `rdf:` prefix canonicalizes to the bare local name, so
/// both spellings are checked.
pub(crate) fn first_rdf_resource(value: &Value) -> Option<String> {
    value
        .iter()
        .find_map(|v| {
            v.as_node()
                .and_then(|n| n.attr("resource").or_else(|| n.attr("rdf:resource")))
        })
        .map(str::to_string)
}

/// Deduplicate preserving first-seen order. Comparison is case-sensitive
/// after the trim the collectors already applied.
pub(crate) fn dedup(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::with_capacity(values.len());
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

/// Collect categories out of one child slot into `out`, following the
/// per-vocabulary splitting rules.
pub(crate) fn collect_categories(
    key: &str,
    value: &Value,
    dialect: Option<Dialect>,
    out: &mut Vec<String>,
) {
    for entry in value.iter() {
        match key {
            "category" => {
                if dialect == Some(Dialect::Atom) {
                    if let Some(term) = attr(entry, "term") {
                        out.push(term);
                    }
                } else if let Some(joined) = text(entry) {
                    // RSS allows comma-joined category lists in one element
                    out.extend(
                        joined
                            .split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(str::to_string),
                    );
                }
            }
            "dc:subject" => {
                if let Some(joined) = text(entry) {
                    out.extend(
                        joined
                            .split_whitespace()
                            .map(str::to_string)
                            .filter(|s| !s.is_empty()),
                    );
                }
            }
            "itunes:category" => {
                let Some(top) = attr(entry, "text") else {
                    continue;
                };
                let mut pushed_nested = false;
                if let Some(node) = entry.as_node() {
                    if let Some(nested) = node.child("itunes:category") {
                        for sub in nested.iter() {
                            if let Some(sub_text) = attr(sub, "text") {
                                out.push(format!("{}/{}", top, sub_text));
                                pushed_nested = true;
                            }
                        }
                    }
                }
                if !pushed_nested {
                    out.push(top);
                }
            }
            "media:category" => {
                if let Some(t) = text(entry) {
                    out.push(t);
                }
            }
            _ => {}
        }
    }
}

/// Copy every child into an output map under its canonical key, re-keying
/// unprefixed extension elements as `{dialect}:{name}` so consumers can
/// always tell which vocabulary a preserved node came from.
pub(crate) fn preserve_children(
    node: &Node,
    dialect: Option<Dialect>,
    out: &mut crate::node::Children,
) {
    let tag = dialect.as_ref().map(Dialect::as_str).unwrap_or("rss");
    for (key, value) in node.children.iter() {
        if key.starts_with('#') {
            continue;
        }
        if key.contains(':') {
            out.insert(key, value.clone());
        } else {
            out.insert(&format!("{}:{}", tag, key), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_with_attr(name: &str, attr_name: &str, attr_value: &str) -> Value {
        Value::Node(Box::new(Node {
            name: name.into(),
            local: name.into(),
            attrs: vec![(attr_name.into(), attr_value.into())],
            ..Node::default()
        }))
    }

    #[test]
    fn test_person_prefers_name_over_email() {
        let mut author = Node {
            name: "author".into(),
            local: "author".into(),
            ..Node::default()
        };
        author.children.insert("name", Value::Text("Ada".into()));
        author
            .children
            .insert("email", Value::Text("ada@example.com".into()));
        assert_eq!(person(&Value::Node(Box::new(author))), Some("Ada".into()));
    }

    #[test]
    fn test_person_falls_back_to_bare_text() {
        let v = Value::Text("editor@example.com (Ed)".into());
        assert_eq!(person(&v), Some("editor@example.com (Ed)".into()));
    }

    #[test]
    fn test_rss_category_splits_on_comma() {
        let mut out = Vec::new();
        collect_categories(
            "category",
            &Value::Text("news, tech , ".into()),
            Some(Dialect::Rss),
            &mut out,
        );
        assert_eq!(out, ["news", "tech"]);
    }

    #[test]
    fn test_atom_category_takes_term() {
        let mut out = Vec::new();
        collect_categories(
            "category",
            &node_with_attr("category", "term", "rust"),
            Some(Dialect::Atom),
            &mut out,
        );
        assert_eq!(out, ["rust"]);
    }

    #[test]
    fn test_dc_subject_splits_on_whitespace() {
        let mut out = Vec::new();
        collect_categories(
            "dc:subject",
            &Value::Text("science  space".into()),
            Some(Dialect::Rdf),
            &mut out,
        );
        assert_eq!(out, ["science", "space"]);
    }

    #[test]
    fn test_itunes_nested_category_joined_with_slash() {
        let mut top = Node {
            name: "itunes:category".into(),
            prefix: Some("itunes".into()),
            local: "category".into(),
            attrs: vec![("text".into(), "Tech".into())],
            ..Node::default()
        };
        top.children.insert(
            "itunes:category",
            node_with_attr("itunes:category", "text", "Software"),
        );

        let mut out = Vec::new();
        collect_categories(
            "itunes:category",
            &Value::Node(Box::new(top)),
            Some(Dialect::Rss),
            &mut out,
        );
        assert_eq!(out, ["Tech/Software"]);
    }

    #[test]
    fn test_itunes_flat_category_pushes_bare_top() {
        let mut out = Vec::new();
        collect_categories(
            "itunes:category",
            &node_with_attr("itunes:category", "text", "Tech"),
            Some(Dialect::Rss),
            &mut out,
        );
        assert_eq!(out, ["Tech"]);
    }

    #[test]
    fn test_dedup_is_case_sensitive_and_order_preserving() {
        let deduped = dedup(vec![
            "news".into(),
            "tech".into(),
            "news".into(),
            "Tech".into(),
        ]);
        assert_eq!(deduped, ["news", "tech", "Tech"]);
    }

    #[test]
    fn test_first_rdf_resource_from_list() {
        let list = Value::List(vec![
            Value::Text("noise".into()),
            node_with_attr("cc:license", "rdf:resource", "http://l/1"),
            node_with_attr("cc:license", "rdf:resource", "http://l/2"),
        ]);
        assert_eq!(first_rdf_resource(&list), Some("http://l/1".into()));
    }
}
