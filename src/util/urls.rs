use url::Url;

use crate::namespace;
use crate::node::{Node, Value};

/// Resolve a possibly-relative URL reference against a base.
///
/// Already-absolute references and references with an empty base are
/// returned unchanged; so is anything the `url` crate cannot make sense of.
/// Resolution never fails — worst case the input comes back as-is.
pub fn resolve(base: &str, reference: &str) -> String {
    if base.trim().is_empty() {
        return reference.to_string();
    }
    if Url::parse(reference).is_ok() {
        // Already absolute
        return reference.to_string();
    }
    match Url::parse(base).and_then(|b| b.join(reference)) {
        Ok(joined) => joined.to_string(),
        Err(_) => reference.to_string(),
    }
}

/// Retroactively absolutize a subtree against `base`.
///
/// Walks the tree applying [`resolve`] to every `href`, `src` and `uri`
/// attribute and to the text of Atom `logo`/`icon` elements. Used when the
/// canonical feed URL is only discovered mid-parse (an Atom `rel="self"`
/// link), after relative references have already been stored.
pub fn reresolve(node: &mut Node, base: &str) {
    for (name, value) in node.attrs.iter_mut() {
        if matches!(name.as_str(), "href" | "src" | "uri") {
            *value = resolve(base, value);
        }
    }
    if is_atom_image(node) {
        node.text = resolve(base, &node.text);
    }
    for (name, value) in node.children.iter_mut() {
        // Text-only logo/icon elements collapse to bare strings, so the
        // keyed form has to be caught here rather than in the node walk.
        let image_key = matches!(name, "logo" | "icon");
        reresolve_value(value, base, image_key);
    }
}

fn reresolve_value(value: &mut Value, base: &str, image_key: bool) {
    match value {
        Value::Node(child) => reresolve(child, base),
        Value::List(items) => {
            for item in items {
                reresolve_value(item, base, image_key);
            }
        }
        Value::Text(text) if image_key => *text = resolve(base, text),
        Value::Text(_) => {}
    }
}

fn is_atom_image(node: &Node) -> bool {
    matches!(node.local.as_str(), "logo" | "icon")
        && node
            .uri
            .as_deref()
            .map_or(true, |uri| namespace::belongs_to(uri, "atom"))
}
