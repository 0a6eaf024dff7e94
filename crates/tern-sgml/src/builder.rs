//! Building a [`DomTree`] from SGML tokens.
//!
//! The builder keeps a stack of open elements. Start tags append to the
//! current element and open a new one, end tags close back to the nearest
//! open element of the same name, and everything else is appended to the
//! current element. Malformed input never fails the parse: each recovery is
//! recorded as a [`ParseIssue`] and building continues.

use tern_common::warning::warn_once;
use tern_dom::{DomTree, ElementData, NodeId, NodeType};
use tern_scanner::{ScanMode, Scanner, ScannerConfig, Token, TokenKind};
use tracing::debug;

use crate::entity;

/// Elements that never have content.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

/// Store a pending attribute. The first of duplicate attributes wins.
fn set_attribute(data: &mut ElementData, name: &mut Option<String>, value: String) {
    if let Some(name) = name.take() {
        let _ = data.attrs.entry(name).or_insert(value);
    }
}

/// Options for [`parse_document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeBuilderConfig {
    /// How the markup is scanned.
    pub scanner: ScannerConfig,
    /// Keep whitespace-only text between tags as text nodes.
    pub keep_whitespace: bool,
    /// Keep comments as comment nodes.
    pub keep_comments: bool,
}

impl Default for TreeBuilderConfig {
    fn default() -> Self {
        Self {
            scanner: ScannerConfig::default(),
            keep_whitespace: false,
            keep_comments: true,
        }
    }
}

impl TreeBuilderConfig {
    /// Use `scanner` for tokenizing.
    #[must_use]
    pub const fn with_scanner(mut self, scanner: ScannerConfig) -> Self {
        self.scanner = scanner;
        self
    }

    /// See [`TreeBuilderConfig::keep_whitespace`].
    #[must_use]
    pub const fn keep_whitespace(mut self, keep: bool) -> Self {
        self.keep_whitespace = keep;
        self
    }

    /// See [`TreeBuilderConfig::keep_comments`].
    #[must_use]
    pub const fn keep_comments(mut self, keep: bool) -> Self {
        self.keep_comments = keep;
        self
    }
}

/// A problem the builder recovered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// What happened.
    pub message: String,
    /// Byte offset into the markup.
    pub offset: usize,
    /// Whether markup was lost, as opposed to merely noted.
    pub is_error: bool,
}

/// The result of [`parse_document`].
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// The built tree; the document node is [`NodeId::ROOT`].
    pub tree: DomTree,
    /// Everything the builder recovered from, in source order.
    pub issues: Vec<ParseIssue>,
    /// With a partial scanner configuration, the offset of the token the
    /// input ended in. Parsing again from scratch once more input arrives
    /// picks it up.
    pub incomplete_at: Option<usize>,
}

/// Parse with the default [`TreeBuilderConfig`].
#[must_use]
pub fn parse(source: &str) -> ParsedDocument {
    parse_document(source, TreeBuilderConfig::default())
}

/// Build a tree from SGML/HTML markup.
///
/// ```
/// use tern_sgml::{TreeBuilderConfig, parse_document};
///
/// // `br` takes no children and `</>` closes the open `p`.
/// let doc = parse_document("<p>one<br>two</><p>three</p>", TreeBuilderConfig::default());
/// let p = doc.tree.document_element().unwrap();
/// assert_eq!(doc.tree.children(p).len(), 3);
/// assert_eq!(doc.tree.children(doc.tree.root()).len(), 2);
/// assert!(doc.issues.is_empty());
/// ```
#[must_use]
pub fn parse_document(source: &str, config: TreeBuilderConfig) -> ParsedDocument {
    TreeBuilder::new(source, config).run()
}

struct TreeBuilder<'a> {
    source: &'a [u8],
    scanner: Scanner<'a>,
    config: TreeBuilderConfig,
    tree: DomTree,
    open: Vec<NodeId>,
    issues: Vec<ParseIssue>,
    incomplete_at: Option<usize>,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str, config: TreeBuilderConfig) -> Self {
        Self {
            source: source.as_bytes(),
            scanner: Scanner::with_config(source.as_bytes(), ScanMode::Sgml, config.scanner),
            config,
            tree: DomTree::new(),
            open: Vec::new(),
            issues: Vec::new(),
            incomplete_at: None,
        }
    }

    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or(NodeId::ROOT)
    }

    fn issue(&mut self, offset: usize, message: impl Into<String>) {
        self.issues.push(ParseIssue {
            message: message.into(),
            offset,
            is_error: false,
        });
    }

    fn error(&mut self, offset: usize, message: &str) {
        let _ = warn_once("SGML", message);
        self.issues.push(ParseIssue {
            message: message.to_owned(),
            offset,
            is_error: true,
        });
    }

    fn run(mut self) -> ParsedDocument {
        while let Some(token) = self.scanner.next_token() {
            match token.kind {
                TokenKind::Element => self.start_tag(token, false),
                TokenKind::ElementBegin => self.start_tag(token, true),
                TokenKind::ElementEnd => self.end_tag(token),
                TokenKind::Text => self.append_text(&token.value_str(self.source)),
                TokenKind::Entity => self.entity(token),
                TokenKind::Space => self.space(token),
                TokenKind::NotationComment => {
                    if self.config.keep_comments {
                        let comment = token.value_str(self.source).into_owned();
                        self.append(NodeType::Comment(comment));
                    }
                }
                TokenKind::CdataSection => {
                    let data = token.value_str(self.source).into_owned();
                    self.append(NodeType::CData(data));
                }
                TokenKind::Notation => {
                    debug!(declaration = %token.value_str(self.source), "skipped declaration");
                }
                TokenKind::ProcessingInstruction => self.processing_instruction(token),
                TokenKind::Incomplete => {
                    self.incomplete_at = Some(token.span.start);
                    self.issue(token.span.start, "input ends inside markup");
                }
                TokenKind::Error => self.error(token.span.start, "unterminated markup"),
                TokenKind::Garbage => {
                    // A `<` that opens nothing is text.
                    self.issue(token.span.start, "stray `<` treated as text");
                    self.append_text(&token.value_str(self.source));
                }
                kind => {
                    self.issue(token.span.start, format!("unexpected {kind} token"));
                }
            }
        }
        debug!(
            nodes = self.tree.len(),
            issues = self.issues.len(),
            unclosed = self.open.len(),
            "built tree"
        );
        ParsedDocument {
            tree: self.tree,
            issues: self.issues,
            incomplete_at: self.incomplete_at,
        }
    }

    fn append(&mut self, node_type: NodeType) -> NodeId {
        let id = self.tree.alloc(node_type);
        self.tree.append_child(self.current(), id);
        id
    }

    /// Append to the current element, extending a preceding text node.
    fn append_text(&mut self, text: &str) {
        let last = self.tree.children(self.current()).last().copied();
        if let Some(node) = last.and_then(|id| self.tree.get_mut(id)) {
            if let NodeType::Text(existing) = &mut node.node_type {
                existing.push_str(text);
                return;
            }
        }
        let _ = self.append(NodeType::Text(text.to_owned()));
    }

    fn entity(&mut self, token: Token) {
        let name = token.value_str(self.source);
        match entity::decode(&name) {
            Some(c) => self.append_text(c.encode_utf8(&mut [0; 4])),
            None => {
                self.issue(token.span.start, format!("unknown character reference &{name};"));
                self.append_text(&String::from_utf8_lossy(token.text(self.source)));
            }
        }
    }

    /// Whitespace before a tag: kept when it continues text, or on request.
    fn space(&mut self, token: Token) {
        let after_text = self
            .tree
            .children(self.current())
            .last()
            .is_some_and(|&id| self.tree.as_text(id).is_some());
        if after_text || self.config.keep_whitespace {
            self.append_text(&token.value_str(self.source));
        }
    }

    fn start_tag(&mut self, token: Token, with_attributes: bool) {
        let name = token.value_str(self.source).to_ascii_lowercase();
        let mut data = ElementData::new(name);
        let self_closing = with_attributes && self.attributes(&mut data);
        let void = is_void(&data.tag_name);
        let id = self.tree.append_element(self.current(), data);
        if !self_closing && !void {
            self.open.push(id);
        }
    }

    /// Read attributes up to the end of the tag. True for `/>`.
    fn attributes(&mut self, data: &mut ElementData) -> bool {
        let mut name: Option<String> = None;
        let mut awaiting_value = false;

        loop {
            let Some(token) = self.scanner.next_token() else {
                set_attribute(data, &mut name, String::new());
                return false;
            };
            match token.kind {
                TokenKind::Space => {}
                TokenKind::Ident | TokenKind::Attribute if awaiting_value => {
                    set_attribute(data, &mut name, token.value_str(self.source).into_owned());
                    awaiting_value = false;
                }
                TokenKind::String if awaiting_value => {
                    set_attribute(data, &mut name, token.value_str(self.source).into_owned());
                    awaiting_value = false;
                }
                TokenKind::Ident => {
                    set_attribute(data, &mut name, String::new());
                    name = Some(token.value_str(self.source).to_ascii_lowercase());
                }
                TokenKind::Char(b'=') if name.is_some() && !awaiting_value => awaiting_value = true,
                TokenKind::TagEnd => {
                    set_attribute(data, &mut name, String::new());
                    return false;
                }
                TokenKind::ElementEmptyEnd => {
                    set_attribute(data, &mut name, String::new());
                    return true;
                }
                TokenKind::Incomplete => {
                    self.incomplete_at = Some(token.span.start);
                    self.issue(token.span.start, "input ends inside a tag");
                    set_attribute(data, &mut name, String::new());
                    return false;
                }
                TokenKind::Error => {
                    self.error(token.span.start, "unterminated attribute value");
                    set_attribute(data, &mut name, String::new());
                    return false;
                }
                _ => {
                    set_attribute(data, &mut name, String::new());
                    return self.recover_tag(token);
                }
            }
        }
    }

    /// Skip the rest of a malformed tag. True if it ended with `/>`.
    fn recover_tag(&mut self, token: Token) -> bool {
        self.issue(
            token.span.start,
            format!(
                "malformed tag at `{}`, skipped to `>`",
                String::from_utf8_lossy(token.text(self.source))
            ),
        );
        if self.scanner.skip_to(TokenKind::TagEnd).is_some() {
            return false;
        }
        // skip_to stops without consuming at a `/>`, which ranks with `>`.
        let empty_end = self
            .scanner
            .peek_token()
            .is_some_and(|t| t.kind == TokenKind::ElementEmptyEnd);
        if empty_end {
            let _ = self.scanner.next_token();
        }
        empty_end
    }

    fn end_tag(&mut self, token: Token) {
        let name = token.value_str(self.source).to_ascii_lowercase();
        if name.is_empty() {
            if self.open.pop().is_none() {
                self.issue(token.span.start, "`</>` with no open element");
            }
            return;
        }

        let tree = &self.tree;
        let position = self
            .open
            .iter()
            .rposition(|&id| tree.as_element(id).is_some_and(|e| e.is(&name)));
        match position {
            Some(index) => {
                let implied = self.open.len() - index - 1;
                if implied > 0 {
                    debug!(tag = %name, implied, "end tag closed inner elements");
                }
                self.open.truncate(index);
            }
            None if is_void(&name) => {}
            None => {
                let message = format!("unmatched end tag </{name}>");
                let _ = warn_once("SGML", &message);
                self.issue(token.span.start, message);
            }
        }
    }

    fn processing_instruction(&mut self, token: Token) {
        let target = token.value_str(self.source).into_owned();
        let data = match self.scanner.peek_token().copied() {
            Some(next) if next.kind == TokenKind::ProcessData => {
                let _ = self.scanner.next_token();
                next.value_str(self.source).trim().to_owned()
            }
            _ => String::new(),
        };
        self.issue(
            token.span.start,
            format!("processing instruction <?{target} {data}?> skipped"),
        );
    }
}
