//! A recovering style sheet splitter, after
//! [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
//!
//! "When errors occur in CSS, the parser attempts to recover gracefully,
//! throwing away only the minimum amount of content before returning to
//! parsing as normal."
//!
//! Recovery leans on [`Scanner::skip_to`]: a bad declaration is skipped to
//! the next `;`, which never runs past the `}` closing its block, and a bad
//! prelude is skipped to its `{`, which never runs past a `}`.

use tern_dom::TreeNode;
use tern_scanner::{ScanMode, Scanner, Span, Token, TokenKind};
use tracing::debug;

use crate::matcher::matches;
use crate::selector::{Selector, Specificity, Syntax, compile_list};

/// [§ 5.4.4 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-a-declaration)
///
/// A CSS declaration (e.g., `color: red`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// The property name, lowercased.
    pub name: String,
    /// The value text, trimmed, without `!important`.
    pub value: String,
    /// Whether the declaration has `!important`.
    pub important: bool,
}

/// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-a-qualified-rule)
///
/// A style rule (selectors + declarations).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// The compiled selector group.
    pub selectors: Vec<Selector>,
    /// The declarations in this rule block, in source order.
    pub declarations: Vec<Declaration>,
}

/// Something the splitter skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleIssue {
    /// What was wrong.
    pub message: String,
    /// Byte offset into the style sheet.
    pub offset: usize,
}

/// The style rules of a style sheet. At-rules are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    /// Style rules in source order.
    pub rules: Vec<Rule>,
    /// Everything dropped during recovery.
    pub issues: Vec<RuleIssue>,
}

impl Stylesheet {
    /// Rules with a selector matching `node`, ordered by ascending
    /// specificity of the best matching selector and then by source order,
    /// so later entries win in a cascade.
    #[must_use]
    pub fn matching_rules<N: TreeNode>(&self, node: N) -> Vec<(Specificity, &Rule)> {
        let mut matched: Vec<(Specificity, &Rule)> = self
            .rules
            .iter()
            .filter_map(|rule| {
                rule.selectors
                    .iter()
                    .filter(|s| matches(s, node))
                    .map(Selector::specificity_parts)
                    .max()
                    .map(|specificity| (specificity, rule))
            })
            .collect();
        matched.sort_by_key(|&(specificity, _)| specificity);
        matched
    }
}

/// Split a style sheet into rules.
///
/// ```
/// use tern_css::parser::parse_stylesheet;
///
/// let sheet = parse_stylesheet("p { color: red; margin 0; } a { color: blue }");
/// assert_eq!(sheet.rules.len(), 2);
/// assert_eq!(sheet.rules[0].declarations.len(), 1);
/// assert_eq!(sheet.issues.len(), 1);
/// ```
#[must_use]
pub fn parse_stylesheet(source: &str) -> Stylesheet {
    let mut parser = RuleParser::new(source);
    let mut rules = Vec::new();
    loop {
        parser.skip_trivia();
        let Some(token) = parser.peek() else { break };
        match token.kind {
            TokenKind::AtKeyword => parser.at_rule(),
            TokenKind::Char(b'}') => {
                parser.bump();
                parser.issue(token.span.start, "unmatched `}`");
            }
            _ => rules.extend(parser.style_rule()),
        }
    }
    debug!(
        rules = rules.len(),
        issues = parser.issues.len(),
        "parsed style sheet"
    );
    Stylesheet {
        rules,
        issues: parser.issues,
    }
}

/// Parse the contents of a declaration block without braces, as found in a
/// `style` attribute.
#[must_use]
pub fn parse_declarations(source: &str) -> (Vec<Declaration>, Vec<RuleIssue>) {
    let mut parser = RuleParser::new(source);
    let declarations = parser.declaration_block(false);
    (declarations, parser.issues)
}

struct RuleParser<'a> {
    source: &'a str,
    scanner: Scanner<'a>,
    issues: Vec<RuleIssue>,
}

impl<'a> RuleParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            scanner: Scanner::new(source.as_bytes(), ScanMode::Css),
            issues: Vec::new(),
        }
    }

    fn peek(&mut self) -> Option<Token> {
        self.scanner.peek_token().copied()
    }

    fn bump(&mut self) {
        let _ = self.scanner.next_token();
    }

    fn text(&self, span: Span) -> &'a str {
        self.source.get(span.range()).unwrap_or_default()
    }

    fn issue(&mut self, offset: usize, message: impl Into<String>) {
        let message = message.into();
        debug!(offset, %message, "style sheet recovery");
        self.issues.push(RuleIssue { message, offset });
    }

    fn skip_trivia(&mut self) {
        while self
            .peek()
            .is_some_and(|t| matches!(t.kind, TokenKind::Space | TokenKind::Comment))
        {
            self.bump();
        }
    }

    /// `@import ...;`, `@charset ...;` or `@media ... { ... }`.
    fn at_rule(&mut self) {
        let Some(keyword) = self.scanner.next_token() else {
            return;
        };
        if self.scanner.skip_to(TokenKind::Char(b';')).is_none()
            && self.peek().is_some_and(|t| t.kind.is_char(b'{'))
        {
            self.skip_block();
        }
        debug!(at_rule = %self.text(keyword.value), "skipped at-rule");
    }

    /// Consume a `{ ... }` block including nested blocks. Stops at the end
    /// of the input if the block is never closed.
    fn skip_block(&mut self) {
        let mut depth = 0_usize;
        while let Some(token) = self.scanner.next_token() {
            match token.kind {
                TokenKind::Char(b'{') => depth += 1,
                TokenKind::Char(b'}') => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    fn style_rule(&mut self) -> Option<Rule> {
        let start = self.scanner.offset();
        let Some(open) = self.scanner.skip_to(TokenKind::Char(b'{')) else {
            // Stopped at a `}` or the end; the caller reports a stray `}`.
            self.issue(start, "expected `{` after selector");
            return None;
        };
        let prelude = self.text(Span::new(start, open.span.start));
        let selectors = compile_list(prelude, Syntax::Css);
        let declarations = self.declaration_block(true);

        match selectors {
            Ok(selectors) => Some(Rule {
                selectors,
                declarations,
            }),
            Err(err) => {
                self.issue(start + err.offset(), format!("rule dropped: {err}"));
                None
            }
        }
    }

    /// Declarations up to the closing `}` (consumed) or the end of input.
    fn declaration_block(&mut self, braced: bool) -> Vec<Declaration> {
        let mut declarations = Vec::new();
        loop {
            self.skip_trivia();
            let Some(token) = self.peek() else {
                if braced {
                    self.issue(self.source.len(), "unterminated block");
                }
                break;
            };
            match token.kind {
                TokenKind::Char(b'}') => {
                    self.bump();
                    if braced {
                        break;
                    }
                    self.issue(token.span.start, "unmatched `}`");
                }
                TokenKind::Char(b';') => self.bump(),
                TokenKind::Ident => declarations.extend(self.declaration()),
                _ => {
                    self.issue(token.span.start, "property name expected");
                    self.recover();
                }
            }
        }
        declarations
    }

    /// [§ 5.4.4 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-a-declaration)
    fn declaration(&mut self) -> Option<Declaration> {
        let name = self.scanner.next_token()?;
        self.skip_trivia();
        if !self.peek().is_some_and(|t| t.kind.is_char(b':')) {
            self.issue(name.span.end, "expected `:` after property name");
            self.recover();
            return None;
        }
        self.bump();

        let value_start = self.scanner.offset();
        let mut value: Option<Span> = None;
        let mut important = false;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Char(b';') => {
                    self.bump();
                    break;
                }
                TokenKind::Char(b'}') => break,
                TokenKind::Char(b'{') => {
                    self.issue(token.span.start, "unexpected block in declaration");
                    self.skip_block();
                    return None;
                }
                TokenKind::Important => {
                    self.bump();
                    important = true;
                }
                TokenKind::Space | TokenKind::Comment => self.bump(),
                _ => {
                    self.bump();
                    if !important {
                        let start = value.map_or(token.span.start, |v| v.start);
                        value = Some(Span::new(start, token.span.end));
                    }
                }
            }
        }

        let Some(value) = value else {
            self.issue(value_start, "empty declaration value");
            return None;
        };
        Some(Declaration {
            name: self.text(name.span).to_ascii_lowercase(),
            value: self.text(value).to_owned(),
            important,
        })
    }

    /// Skip a malformed declaration: to the next `;`, or up to a `}` that
    /// closes the block, or over a nested block.
    fn recover(&mut self) {
        if self.scanner.skip_to(TokenKind::Char(b';')).is_none()
            && self.peek().is_some_and(|t| t.kind.is_char(b'{'))
        {
            self.skip_block();
        }
    }
}
