//! The SAX-driven tree builder.
//!
//! One [`ParseContext`] owns all per-session state: the open-element stack,
//! the `xml:base` scope stack, the XHTML capture buffer and the accumulated
//! outputs. Memory stays bounded by the spine from root to the current
//! element plus the feed-level metadata block — closed article subtrees are
//! handed to the normalizer and dropped, never attached to the tree.

use tracing::{debug, trace};

use crate::dialect::Dialect;
use crate::error::FeedError;
use crate::model::{Article, FeedMeta};
use crate::namespace;
use crate::node::{Node, Value};
use crate::normalize::{normalize_item, normalize_meta};
use crate::options::ParseOptions;
use crate::parser::FeedSink;
use crate::sax::{QName, SaxAttr, SaxEvent};
use crate::util::{reresolve, resolve};

/// One `xml:base` scope, keyed by the qualified name of the element that
/// declared it. Popped when an element with that name closes.
#[derive(Debug, Clone)]
struct BaseFrame {
    element: String,
    url: String,
}

/// Active XHTML passthrough capture. While set, descendant markup of the
/// container is serialized into `buf` instead of the tree.
#[derive(Debug)]
struct XhtmlCapture {
    container: String,
    depth: usize,
    buf: String,
}

/// Per-session parse state. Two concurrent parses require two contexts;
/// nothing is shared.
pub struct ParseContext {
    options: ParseOptions,
    stack: Vec<Node>,
    bases: Vec<BaseFrame>,
    xhtml: Option<XhtmlCapture>,
    meta: FeedMeta,
    articles: Vec<Article>,
    errors: Vec<FeedError>,
    meta_emitted: bool,
    root_seen: bool,
    ended: bool,
}

impl ParseContext {
    pub fn new(options: ParseOptions) -> Self {
        let mut bases = Vec::new();
        if let Some(url) = &options.feed_url {
            // Pre-seeded base, keyed "xml" so no element close ever pops it
            bases.push(BaseFrame {
                element: "xml".into(),
                url: url.clone(),
            });
        }
        Self {
            options,
            stack: Vec::new(),
            bases,
            xhtml: None,
            meta: FeedMeta::default(),
            articles: Vec::new(),
            errors: Vec::new(),
            meta_emitted: false,
            root_seen: false,
            ended: false,
        }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn meta(&self) -> &FeedMeta {
        &self.meta
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn errors(&self) -> &[FeedError] {
        &self.errors
    }

    pub fn into_parts(self) -> (FeedMeta, Vec<Article>, Vec<FeedError>) {
        (self.meta, self.articles, self.errors)
    }

    /// Feed one tokenizer event through the builder.
    pub fn handle_event(&mut self, event: SaxEvent, sink: &mut dyn FeedSink) {
        match event {
            SaxEvent::Open { name, attrs } => self.open_tag(name, attrs, sink),
            SaxEvent::Close { name } => self.close_tag(&name, sink),
            SaxEvent::Text(data) | SaxEvent::Cdata(data) => self.text(data),
            SaxEvent::End => self.end(sink),
        }
    }

    /// Record a tokenizer/stream error and route it to the sink. Parsing
    /// state is untouched — recovery is the driver's call.
    pub fn report(&mut self, error: FeedError, sink: &mut dyn FeedSink) {
        match &error {
            FeedError::Warning(_) => sink.warning(&error),
            _ => sink.error(&error),
        }
        self.errors.push(error);
    }

    fn base(&self) -> Option<&str> {
        self.bases.last().map(|frame| frame.url.as_str())
    }

    /// Canonicalize one raw attribute list onto `node`, recording namespace
    /// declarations, resolving URL-bearing values against the active base
    /// and pushing `xml:base` scopes. Returns whether this element declared
    /// `type="xhtml"`.
    fn apply_attributes(
        &mut self,
        node: &mut Node,
        attrs: Vec<SaxAttr>,
        element_name: &str,
        capturing: bool,
    ) -> bool {
        let mut xhtml = false;
        for a in attrs {
            let is_xmlns =
                a.prefix.as_deref() == Some("xmlns") || (a.prefix.is_none() && a.local == "xmlns");
            if is_xmlns {
                let prefix = if a.prefix.is_some() {
                    a.local.clone()
                } else {
                    String::new()
                };
                let pair = (prefix, a.value.trim().to_string());
                if !self.meta.namespaces.contains(&pair) {
                    self.meta.namespaces.push(pair);
                }
            }

            // Emitted key: swap in the canonical prefix when the document's
            // prefix is not the registered one, or for the xml: namespace.
            // Namespace declarations keep their qualified spelling.
            let mut key = if is_xmlns {
                a.name.clone()
            } else {
                a.local.clone()
            };
            if !is_xmlns {
                if let (Some(uri), Some(prefix)) = (a.uri.as_deref(), a.prefix.as_deref()) {
                    if !namespace::belongs_to(uri, prefix) || namespace::belongs_to(uri, "xml") {
                        let canon = namespace::canonical_prefix(uri).unwrap_or(prefix);
                        key = format!("{}:{}", canon, a.local);
                    }
                }
            }

            let mut value = a.value.trim().to_string();
            let is_xml_base = !is_xmlns
                && a.local == "base"
                && (a.prefix.as_deref() == Some("xml")
                    || a.uri.as_deref().is_some_and(|u| namespace::belongs_to(u, "xml")));
            if is_xml_base {
                if let Some(base) = self.base() {
                    value = resolve(base, &value);
                }
                if !capturing {
                    self.bases.push(BaseFrame {
                        element: element_name.to_string(),
                        url: value.clone(),
                    });
                }
            } else if !is_xmlns && matches!(a.local.as_str(), "href" | "src" | "uri") {
                if let Some(base) = self.base() {
                    value = resolve(base, &value);
                }
            }

            if !is_xmlns && a.local == "type" && value == "xhtml" {
                xhtml = true;
            }

            node.attrs.push((key, value));
        }
        xhtml
    }

    fn open_tag(&mut self, name: QName, attrs: Vec<SaxAttr>, sink: &mut dyn FeedSink) {
        let mut node = Node {
            name: name.name.clone(),
            prefix: name.prefix,
            local: name.local.clone(),
            uri: name.uri.clone(),
            ..Node::default()
        };

        if self.xhtml.is_some() {
            // Inside a capture: serialize the tag, keep it off the stack
            self.apply_attributes(&mut node, attrs, &name.name, true);
            let cap = self.xhtml.as_mut().expect("capture checked above");
            cap.buf.push('<');
            cap.buf.push_str(&node.name);
            for (attr_name, attr_value) in &node.attrs {
                cap.buf.push(' ');
                cap.buf.push_str(attr_name);
                cap.buf.push_str("=\"");
                cap.buf.push_str(attr_value);
                cap.buf.push('"');
            }
            cap.buf.push('>');
            cap.depth += 1;
            return;
        }

        let xhtml_requested = self.apply_attributes(&mut node, attrs, &name.name, false);

        if !self.root_seen {
            self.root_seen = true;
            match Dialect::detect(&name.local, name.uri.as_deref()) {
                Some(dialect) => {
                    debug!(%dialect, "detected feed dialect");
                    self.meta.dialect = Some(dialect);
                    self.meta.version =
                        Some(node.attr("version").unwrap_or("1.0").to_string());
                    for (attr_name, attr_value) in &node.attrs {
                        if attr_name != "version" {
                            self.meta
                                .root_attrs
                                .push((attr_name.clone(), attr_value.clone()));
                        }
                    }
                }
                None => self.report(FeedError::NotAFeed(name.name.clone()), sink),
            }
        }

        if xhtml_requested {
            trace!(element = %name.name, "entering xhtml capture");
            self.xhtml = Some(XhtmlCapture {
                container: name.name,
                depth: 0,
                buf: String::new(),
            });
        }

        self.stack.push(node);
    }

    fn text(&mut self, data: String) {
        if let Some(cap) = &mut self.xhtml {
            cap.buf.push_str(&data);
            return;
        }
        if let Some(top) = self.stack.last_mut() {
            top.text.push_str(&data);
        }
        // Character data outside the root is not ours to keep
    }

    fn close_tag(&mut self, name: &QName, sink: &mut dyn FeedSink) {
        if let Some(cap) = self.xhtml.as_mut() {
            if cap.depth > 0 || name.name != cap.container {
                cap.buf.push_str("</");
                cap.buf.push_str(&name.name);
                cap.buf.push('>');
                cap.depth = cap.depth.saturating_sub(1);
                return;
            }
        }

        let Some(mut node) = self.stack.pop() else {
            // Unbalanced close after error recovery; nothing to do
            return;
        };

        let (key, tag) = canonical_name(&node);

        // Atom logo/icon text resolves while the element's own base frame
        // is still in scope
        if matches!(key.as_str(), "logo" | "icon") && !node.text.is_empty() {
            if let Some(base) = self.base() {
                node.text = resolve(base, &node.text);
            }
        }
        if self.bases.last().is_some_and(|frame| frame.element == node.name) {
            self.bases.pop();
        }

        if let Some(cap) = self.xhtml.take() {
            // The capture container itself: flush the serialized markup in
            // as its text and drop any stray structure
            node.text.push_str(cap.buf.trim());
            node.children.clear();
        }

        let trimmed = node.text.trim();
        if trimmed.len() != node.text.len() {
            node.text = trimmed.to_string();
        }

        let is_article = matches!(
            (key.as_str(), tag.as_str()),
            ("item", "" | "rss" | "rdf") | ("entry", "atom")
        );
        if is_article {
            self.handle_article(node, sink);
            return;
        }

        let is_container = matches!(
            (key.as_str(), tag.as_str()),
            ("channel", "" | "rss" | "rdf") | ("feed", "atom")
        );
        if is_container && !self.meta_emitted {
            self.run_meta(&node, sink);
        }

        if let Some(parent) = self.stack.last_mut() {
            let value = if node.is_text_only() {
                Value::Text(std::mem::take(&mut node.text))
            } else {
                Value::Node(Box::new(node))
            };
            parent.children.insert(&key, value);
        }
    }

    /// A closed item/entry: make sure meta went out first, retrofit any
    /// just-discovered feed URL, normalize, emit.
    fn handle_article(&mut self, mut node: Node, sink: &mut dyn FeedSink) {
        if !self.meta_emitted {
            let container = self.stack.last().cloned().unwrap_or_default();
            if let Some(feed_url) = self.run_meta(&container, sink) {
                reresolve(&mut node, &feed_url);
            }
        }

        let mut article = normalize_item(&node, self.meta.dialect, &self.options);
        if self.options.add_meta {
            article.meta = Some(Box::new(self.meta.clone()));
        }
        if article.author.is_none() {
            article.author = self.meta.author.clone();
        }
        sink.article(&article);
        self.articles.push(article);
    }

    /// Normalize feed metadata exactly once and emit it. When an Atom
    /// `rel="self"` link surfaces a feed URL and no base is active yet, the
    /// URL becomes the document-wide base and already-built state is
    /// re-resolved; the URL is returned so the caller can fix a pending
    /// article subtree the same way.
    fn run_meta(&mut self, source: &Node, sink: &mut dyn FeedSink) -> Option<String> {
        let discovered = normalize_meta(source, &mut self.meta, &self.options);
        let retrofit = match discovered {
            Some(url) if self.bases.is_empty() => {
                debug!(feed_url = %url, "feed url discovered mid-parse");
                self.bases.push(BaseFrame {
                    element: "xml".into(),
                    url: url.clone(),
                });
                if let Some(open) = self.stack.last_mut() {
                    reresolve(open, &url);
                }
                Some(url)
            }
            _ => None,
        };
        self.meta_emitted = true;
        sink.meta(&self.meta);
        retrofit
    }

    fn end(&mut self, sink: &mut dyn FeedSink) {
        if self.ended {
            return;
        }
        self.ended = true;
        self.stack.clear();
        self.bases.clear();
        self.xhtml = None;
        sink.end(&self.articles);
    }

    #[cfg(test)]
    fn is_clean(&self) -> bool {
        self.stack.is_empty() && self.bases.is_empty() && self.xhtml.is_none()
    }
}

/// Canonical `(attach-key, dialect-tag)` for a closed element.
///
/// Elements in the Atom or RDF namespaces lose their prefix entirely; other
/// registered namespaces are re-keyed onto their canonical prefix; unknown
/// prefixes pass through; unprefixed names stay bare.
fn canonical_name(node: &Node) -> (String, String) {
    if let Some(prefix) = node.prefix.as_deref() {
        if let Some(uri) = node.uri.as_deref() {
            if namespace::belongs_to(uri, "atom") {
                return (node.local.clone(), "atom".into());
            }
            if namespace::belongs_to(uri, "rdf") {
                return (node.local.clone(), "rdf".into());
            }
            if let Some(canon) = namespace::canonical_prefix(uri) {
                return (format!("{}:{}", canon, node.local), canon.to_string());
            }
        }
        (node.name.clone(), prefix.to_string())
    } else {
        if let Some(uri) = node.uri.as_deref() {
            if let Some(canon) = namespace::canonical_prefix(uri) {
                return (node.local.clone(), canon.to_string());
            }
        }
        (node.name.clone(), String::new())
    }
}
