//! The driver: feeds tokenizer events through the builder and guarantees
//! event ordering.
//!
//! Two ways in, one core. [`FeedParser::run`] drives quick-xml over any
//! `BufRead` and pushes the resulting events through the session's
//! [`ParseContext`]; [`FeedParser::handle_event`] accepts pre-tokenized
//! [`SaxEvent`]s directly for callers with their own tokenizer. Two ways
//! out as well: implement [`FeedSink`] to observe events as they happen, or
//! use [`parse`]/[`parse_with`] to collect everything and get a
//! [`ParsedFeed`] back.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{QName as XmlName, ResolveResult};
use quick_xml::reader::NsReader;
use tracing::debug;

use crate::builder::ParseContext;
use crate::error::FeedError;
use crate::model::{Article, FeedMeta};
use crate::options::ParseOptions;
use crate::sax::{QName, SaxAttr, SaxEvent};

/// Observer for parse events.
///
/// Delivery order is guaranteed: `meta` exactly once, strictly before any
/// `article`; articles in document order; `end` exactly once, last. All
/// methods default to no-ops so implementors pick what they care about.
pub trait FeedSink {
    fn meta(&mut self, _meta: &FeedMeta) {}
    fn article(&mut self, _article: &Article) {}
    fn warning(&mut self, _error: &FeedError) {}
    fn error(&mut self, _error: &FeedError) {}
    fn end(&mut self, _articles: &[Article]) {}
}

/// A streaming feed parser for one document.
///
/// Owns the per-session [`ParseContext`]; two concurrent parses need two
/// parsers. Nothing is shared and no threads are spawned — backpressure is
/// whatever pace the caller feeds bytes or events at.
pub struct FeedParser {
    cx: ParseContext,
}

impl FeedParser {
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            cx: ParseContext::new(options),
        }
    }

    /// Push one pre-tokenized event through the parser.
    pub fn handle_event<S: FeedSink>(&mut self, event: SaxEvent, sink: &mut S) {
        self.cx.handle_event(event, sink);
    }

    /// Normalized feed metadata accumulated so far.
    pub fn meta(&self) -> &FeedMeta {
        self.cx.meta()
    }

    /// Articles emitted so far, in document order.
    pub fn articles(&self) -> &[Article] {
        self.cx.articles()
    }

    /// Errors accumulated so far, in occurrence order.
    pub fn errors(&self) -> &[FeedError] {
        self.cx.errors()
    }

    /// Consume the parser, yielding `(meta, articles, errors)`.
    pub fn into_parts(self) -> (FeedMeta, Vec<Article>, Vec<FeedError>) {
        self.cx.into_parts()
    }

    /// Tokenize `source` with quick-xml and run it to completion.
    ///
    /// In lenient mode (the default) tokenizer errors are reported through
    /// the sink and parsing resumes; recovery gives up only when the reader
    /// stops making forward progress. `strict` turns the first tokenizer
    /// error fatal. An I/O failure from `source` is always fatal. Fatal or
    /// not, `end` fires exactly once before this returns.
    ///
    /// # Errors
    ///
    /// Returns the fatal [`FeedError`] that halted parsing, if any.
    pub fn run<R: BufRead, S: FeedSink>(
        &mut self,
        source: R,
        sink: &mut S,
    ) -> Result<(), FeedError> {
        let mut reader = NsReader::from_reader(source);
        let config = reader.config_mut();
        config.trim_text(false);
        config.expand_empty_elements = true;
        config.check_end_names = self.cx.options().strict;

        let strict = self.cx.options().strict;
        let mut buf = Vec::new();
        let mut last_error_pos = u64::MAX;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let name = expand_element(&reader, e.name());
                    let attrs = convert_attrs(&reader, &e, &mut self.cx, sink);
                    self.cx.handle_event(SaxEvent::Open { name, attrs }, sink);
                }
                Ok(Event::End(e)) => {
                    let name = expand_element(&reader, e.name());
                    self.cx.handle_event(SaxEvent::Close { name }, sink);
                }
                Ok(Event::Text(e)) => {
                    let text = match e.unescape() {
                        Ok(t) => t.into_owned(),
                        Err(err) => {
                            self.cx
                                .report(FeedError::Warning(err.to_string()), sink);
                            String::from_utf8_lossy(&e).into_owned()
                        }
                    };
                    self.cx.handle_event(SaxEvent::Text(text), sink);
                }
                Ok(Event::CData(e)) => {
                    let data = String::from_utf8_lossy(&e).into_owned();
                    self.cx.handle_event(SaxEvent::Cdata(data), sink);
                }
                Ok(Event::Eof) => break,
                // Declarations, comments, PIs and doctypes are not feed data
                Ok(_) => {}
                Err(err) => {
                    let position = reader.buffer_position() as u64;
                    let error = if matches!(err, quick_xml::Error::Io(_)) {
                        FeedError::Io(err.to_string())
                    } else {
                        FeedError::Xml {
                            position,
                            message: err.to_string(),
                        }
                    };
                    self.cx.report(error.clone(), sink);
                    if error.is_fatal() || strict {
                        self.cx.handle_event(SaxEvent::End, sink);
                        return Err(error);
                    }
                    debug!(position, error = %error, "recovering from tokenizer error");
                    if position == last_error_pos {
                        // No forward progress; stop rather than spin
                        break;
                    }
                    last_error_pos = position;
                }
            }
            buf.clear();
        }

        self.cx.handle_event(SaxEvent::End, sink);
        Ok(())
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a completed parse produced.
#[derive(Debug, Clone)]
pub struct ParsedFeed {
    /// Normalized feed metadata.
    pub meta: FeedMeta,
    /// Articles in document order.
    pub articles: Vec<Article>,
    /// Non-fatal errors, in occurrence order.
    pub warnings: Vec<FeedError>,
}

/// Parse a complete feed document with default options.
///
/// The completion-style counterpart to [`FeedParser::run`]: collect
/// everything, then deliver. Non-fatal problems land in
/// [`ParsedFeed::warnings`]; only an unrecognized root, an I/O failure or a
/// strict-mode tokenizer error produce `Err`.
///
/// # Errors
///
/// Returns the error that halted parsing.
pub fn parse(bytes: &[u8]) -> Result<ParsedFeed, FeedError> {
    parse_with(bytes, ParseOptions::default())
}

/// [`parse`] with explicit options.
///
/// # Errors
///
/// Returns the error that halted parsing.
pub fn parse_with(bytes: &[u8], options: ParseOptions) -> Result<ParsedFeed, FeedError> {
    struct Quiet;
    impl FeedSink for Quiet {}

    let mut parser = FeedParser::with_options(options);
    parser.run(bytes, &mut Quiet)?;
    let (meta, articles, errors) = parser.into_parts();

    // The most recent fatal classification wins as the primary error; the
    // rest stay observable through sink mode. After a successful run the
    // only fatal kind left in the list is NotAFeed.
    if let Some(err) = errors.iter().rev().find(|e| e.is_fatal()) {
        return Err(err.clone());
    }

    Ok(ParsedFeed {
        meta,
        articles,
        warnings: errors,
    })
}

fn expand_element<R: BufRead>(reader: &NsReader<R>, raw: XmlName<'_>) -> QName {
    let (resolution, local) = reader.resolve_element(raw);
    build_qname(raw, resolution, local.as_ref())
}

fn build_qname(raw: XmlName<'_>, resolution: ResolveResult<'_>, local: &[u8]) -> QName {
    let uri = match resolution {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        _ => None,
    };
    let raw_bytes = raw.as_ref();
    let prefix = raw_bytes
        .iter()
        .position(|b| *b == b':')
        .map(|colon| String::from_utf8_lossy(&raw_bytes[..colon]).to_lowercase());
    QName {
        name: String::from_utf8_lossy(raw_bytes).to_lowercase(),
        prefix,
        local: String::from_utf8_lossy(local).to_lowercase(),
        uri,
    }
}

/// Convert a start tag's raw attributes. Namespace declarations are passed
/// through with an `xmlns` marker prefix; everything else is
/// namespace-expanded. Malformed attributes become warnings, not failures.
fn convert_attrs<R: BufRead, S: FeedSink>(
    reader: &NsReader<R>,
    e: &BytesStart<'_>,
    cx: &mut ParseContext,
    sink: &mut S,
) -> Vec<SaxAttr> {
    let mut attrs = Vec::new();
    for attr in e.attributes().with_checks(false) {
        let attr = match attr {
            Ok(a) => a,
            Err(err) => {
                cx.report(FeedError::Warning(err.to_string()), sink);
                continue;
            }
        };
        let value = match attr.decode_and_unescape_value(reader.decoder()) {
            Ok(v) => v.into_owned(),
            Err(err) => {
                cx.report(FeedError::Warning(err.to_string()), sink);
                String::from_utf8_lossy(attr.value.as_ref()).into_owned()
            }
        };

        let key = attr.key;
        if key.as_ref() == b"xmlns" {
            attrs.push(SaxAttr {
                name: "xmlns".into(),
                prefix: None,
                local: "xmlns".into(),
                uri: None,
                value,
            });
            continue;
        }
        if let Some(declared) = key.as_ref().strip_prefix(b"xmlns:") {
            let local = String::from_utf8_lossy(declared).to_lowercase();
            attrs.push(SaxAttr {
                name: format!("xmlns:{}", local),
                prefix: Some("xmlns".into()),
                local,
                uri: None,
                value,
            });
            continue;
        }

        let (resolution, local) = reader.resolve_attribute(key);
        let qname = build_qname(key, resolution, local.as_ref());
        attrs.push(SaxAttr {
            name: qname.name,
            prefix: qname.prefix,
            local: qname.local,
            uri: qname.uri,
            value,
        });
    }
    attrs
}
