//! The scanner state machine shared by both token grammars.

use strum_macros::Display;
use tracing::trace;

use crate::config::ScannerConfig;
use crate::token::{Span, Token, TokenKind};

/// Which token grammar a [`Scanner`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ScanMode {
    /// Style sheets and selectors.
    Css,
    /// SGML/HTML markup.
    Sgml,
}

/// Where an SGML scanner is in the markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum MarkupState {
    /// Between tags.
    #[default]
    Text,
    /// Inside a start tag, scanning attributes.
    Element,
    /// After `<?target`, scanning up to `?>`.
    ProcessingInstruction,
}

/// A stateful scanner over an immutable byte buffer.
///
/// The scanner keeps one token of lookahead: [`Scanner::peek_token`] scans
/// ahead without consuming, [`Scanner::next_token`] consumes. It also
/// implements [`Iterator`], yielding every token until the end of the buffer.
///
/// ```
/// use tern_scanner::{ScanMode, Scanner, TokenKind};
///
/// let mut scanner = Scanner::new(b"a { color: red }", ScanMode::Css);
/// let first = scanner.next_token().map(|t| t.kind);
/// assert_eq!(first, Some(TokenKind::Ident));
/// ```
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    pub(crate) source: &'a [u8],
    pub(crate) position: usize,
    pub(crate) state: MarkupState,
    pub(crate) config: ScannerConfig,
    mode: ScanMode,
    lookahead: Option<Token>,
    incomplete: bool,
    line: usize,
}

impl<'a> Scanner<'a> {
    /// Create a scanner at the start of `source` with the default configuration.
    #[must_use]
    pub fn new(source: &'a [u8], mode: ScanMode) -> Self {
        Self::with_config(source, mode, ScannerConfig::default())
    }

    /// Create a scanner with an explicit configuration.
    #[must_use]
    pub fn with_config(source: &'a [u8], mode: ScanMode, config: ScannerConfig) -> Self {
        Self {
            source,
            position: 0,
            state: MarkupState::Text,
            config,
            mode,
            lookahead: None,
            incomplete: false,
            line: 1,
        }
    }

    /// Resume scanning at `position` in `state`, as when a caller re-scans a
    /// grown buffer from the start of an `Incomplete` token.
    #[must_use]
    pub fn resume(mut self, position: usize, state: MarkupState) -> Self {
        self.position = position.min(self.source.len());
        self.state = state;
        self.lookahead = None;
        self.incomplete = false;
        self
    }

    /// The buffer being scanned.
    #[must_use]
    pub const fn source(&self) -> &'a [u8] {
        self.source
    }

    /// The grammar in use.
    #[must_use]
    pub const fn mode(&self) -> ScanMode {
        self.mode
    }

    /// The markup state the next token will be scanned in.
    #[must_use]
    pub const fn state(&self) -> MarkupState {
        self.state
    }

    /// Offset of the next token that [`Scanner::next_token`] will return.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.lookahead.map_or(self.position, |t| t.span.start)
    }

    /// Whether the buffer ended in the middle of a token.
    #[must_use]
    pub const fn is_incomplete(&self) -> bool {
        self.incomplete
    }

    /// Look at the next token without consuming it.
    pub fn peek_token(&mut self) -> Option<&Token> {
        if self.lookahead.is_none() {
            self.lookahead = self.scan_one();
        }
        self.lookahead.as_ref()
    }

    /// Consume and return the next token, `None` at the end of the buffer.
    pub fn next_token(&mut self) -> Option<Token> {
        self.lookahead.take().or_else(|| self.scan_one())
    }

    /// Discard tokens until `target` is reached.
    ///
    /// Returns the consumed `target` token, or `None` when a token ranking at
    /// or above `target` (see [`TokenKind::precedence`]) is met first, in which
    /// case that token is left unconsumed, or when the buffer runs out.
    ///
    /// ```
    /// use tern_scanner::{ScanMode, Scanner, TokenKind};
    ///
    /// let mut scanner = Scanner::new(b"bad stuff; next: 1", ScanMode::Css);
    /// assert!(scanner.skip_to(TokenKind::Char(b';')).is_some());
    ///
    /// let mut scanner = Scanner::new(b"bad stuff } next", ScanMode::Css);
    /// assert!(scanner.skip_to(TokenKind::Char(b';')).is_none());
    /// assert_eq!(scanner.next_token().map(|t| t.kind), Some(TokenKind::Char(b'}')));
    /// ```
    pub fn skip_to(&mut self, target: TokenKind) -> Option<Token> {
        let limit = target.precedence();
        while let Some(token) = self.peek_token().copied() {
            if token.kind == target {
                return self.next_token();
            }
            if token.kind.precedence() >= limit {
                trace!(target = %target, stopped_at = %token.kind, offset = token.span.start, "skip_to stopped");
                return None;
            }
            trace!(kind = %token.kind, offset = token.span.start, "skip_to discarded");
            let _ = self.next_token();
        }
        None
    }

    fn scan_one(&mut self) -> Option<Token> {
        if self.position >= self.source.len() {
            return None;
        }
        let start = self.position;
        let mut token = match self.mode {
            ScanMode::Css => self.scan_css_token(start),
            ScanMode::Sgml => self.scan_sgml_token(start),
        };
        debug_assert!(token.span.start == start && token.span.end <= self.source.len());
        debug_assert!(
            !token.span.is_empty() || token.kind == TokenKind::TagEnd,
            "only virtual tag ends may be empty"
        );

        if self.config.count_lines {
            token.line = self.line;
            self.line += token.text(self.source).iter().filter(|&&b| b == b'\n').count();
        }
        if token.kind == TokenKind::Incomplete {
            self.incomplete = true;
        }
        self.position = token.span.end;
        Some(token)
    }

    /// The token for a construct starting at `start` that runs off the end of
    /// the buffer. `recover` builds the best-effort token for complete buffers.
    pub(crate) fn unterminated(&self, start: usize, recover: impl FnOnce() -> Token) -> Token {
        let rest = Span::new(start, self.source.len());
        if self.config.partial {
            Token::new(TokenKind::Incomplete, rest)
        } else if self.config.detect_errors {
            Token::new(TokenKind::Error, rest)
        } else {
            recover()
        }
    }

    pub(crate) fn byte_at(&self, offset: usize) -> Option<u8> {
        self.source.get(offset).copied()
    }

    pub(crate) fn starts_with_at(&self, offset: usize, pattern: &[u8]) -> bool {
        self.source
            .get(offset..)
            .is_some_and(|rest| rest.starts_with(pattern))
    }

    pub(crate) fn starts_with_ignore_case_at(&self, offset: usize, pattern: &[u8]) -> bool {
        self.source
            .get(offset..offset + pattern.len())
            .is_some_and(|window| window.eq_ignore_ascii_case(pattern))
    }

    /// Offset of the first byte at or after `from` not matching `pred`.
    pub(crate) fn run_while(&self, from: usize, pred: impl Fn(u8) -> bool) -> usize {
        let rest = self.source.get(from..).unwrap_or_default();
        from + rest.iter().position(|&b| !pred(b)).unwrap_or(rest.len())
    }

    /// Offset of the first occurrence of `pattern` at or after `from`.
    pub(crate) fn find_at(&self, from: usize, pattern: &[u8]) -> Option<usize> {
        let rest = self.source.get(from..)?;
        rest.windows(pattern.len())
            .position(|window| window == pattern)
            .map(|i| from + i)
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

pub(crate) const fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c')
}
