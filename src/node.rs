//! The element tree the builder accumulates.
//!
//! Children live in an ordered name → [`Value`] map. A slot holds either the
//! collapsed text of a simple element, a single structured [`Node`], or a
//! list once two or more siblings share the same key. The list promotion
//! happens on insert, so normalizers can treat "one" and "many" uniformly
//! through [`Value::iter`].

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// A child slot in a [`Node`]'s children map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// An element that collapsed to its text content on close (it had no
    /// attributes and no children).
    Text(String),
    /// A single structured child element.
    Node(Box<Node>),
    /// Two or more same-named siblings, in document order. Entries are
    /// `Text` or `Node`, never nested lists.
    List(Vec<Value>),
}

impl Value {
    /// The text carried by this value: the string itself, or the element's
    /// accumulated character data. Empty text and lists yield nothing.
    pub fn text(&self) -> Option<&str> {
        match self {
            Value::Text(s) if !s.is_empty() => Some(s),
            Value::Node(n) if !n.text.is_empty() => Some(&n.text),
            _ => None,
        }
    }

    /// The structured element, if this slot holds exactly one.
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(n) => Some(n),
            _ => None,
        }
    }

    /// Iterate the value uniformly: a scalar yields itself once, a list
    /// yields its entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        match self {
            Value::List(items) => ValueIter::Many(items.iter()),
            other => ValueIter::One(std::iter::once(other)),
        }
    }

    /// The first scalar: `self` for `Text`/`Node`, the first entry of a
    /// list.
    pub fn first(&self) -> Option<&Value> {
        match self {
            Value::List(items) => items.first(),
            other => Some(other),
        }
    }
}

enum ValueIter<'a> {
    One(std::iter::Once<&'a Value>),
    Many(std::slice::Iter<'a, Value>),
}

impl<'a> Iterator for ValueIter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<&'a Value> {
        match self {
            ValueIter::One(it) => it.next(),
            ValueIter::Many(it) => it.next(),
        }
    }
}

/// Ordered name → [`Value`] map.
///
/// Feed elements carry a handful of children, so a linear-scan vector keeps
/// document order without dragging in an ordered-map dependency.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Children(Vec<(String, Value)>);

impl Children {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert under `name`. A second insert for the same key promotes the
    /// existing scalar to a two-element list; later inserts append.
    pub fn insert(&mut self, name: &str, value: Value) {
        match self.0.iter_mut().find(|(k, _)| k == name) {
            Some((_, Value::List(items))) => items.push(value),
            Some((_, existing)) => {
                let prev = std::mem::replace(existing, Value::List(Vec::with_capacity(2)));
                if let Value::List(items) = existing {
                    items.push(prev);
                    items.push(value);
                }
            }
            None => self.0.push((name.to_string(), value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Value)> {
        self.0.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl Serialize for Children {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// One XML element as received from the tokenizer, accumulated while it sits
/// on the builder's stack.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Node {
    /// Qualified name as received (`prefix:local` or `local`), lowercased.
    pub name: String,
    /// Declared prefix, if any.
    pub prefix: Option<String>,
    /// Local part of the name.
    pub local: String,
    /// Namespace URI the tokenizer resolved for this element.
    pub uri: Option<String>,
    /// Canonicalized attribute name → trimmed value, in document order.
    pub attrs: Vec<(String, String)>,
    /// Accumulated character data (trimmed on close).
    pub text: String,
    /// Closed child elements, keyed by canonical name.
    pub children: Children,
}

impl Node {
    /// Attribute lookup by canonical name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&Value> {
        self.children.get(name)
    }

    /// Text of a named child, through the collapse rule.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.children.get(name).and_then(Value::text)
    }

    /// Whether the element carried nothing but character data.
    pub fn is_text_only(&self) -> bool {
        self.attrs.is_empty() && self.children.is_empty()
    }
}
