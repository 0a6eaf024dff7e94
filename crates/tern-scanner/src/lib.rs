//! Precedence-aware token scanner for CSS and SGML/HTML.
//!
//! # Scope
//!
//! This crate implements:
//! - **Tokens** ([`Token`], [`TokenKind`], [`Span`]): typed spans over an
//!   immutable byte buffer. Every byte of the buffer belongs to exactly one
//!   token, so scanning never loses input.
//! - **CSS rules**: identifiers, numbers with unit classification, strings,
//!   hashes and hex colors, at-keywords, functions, `url()`, `!important`,
//!   attribute-selector operators and comments.
//! - **SGML rules**: text, entities, start/end tags, attributes, comments,
//!   CDATA sections, declarations and processing instructions, including
//!   tag-soup recovery when a tag is left open.
//! - **Recovery** ([`Scanner::skip_to`]): skipping malformed input up to a
//!   target token without running past a token of equal or higher
//!   [precedence](TokenKind::precedence).
//!
//! Problems are reported in-band as `Garbage`, `Incomplete` and `Error`
//! tokens; [`tokenize_strict`] turns the first one into a [`ScanError`].

mod config;
mod css;
mod error;
mod scanner;
mod sgml;
mod token;

pub use config::ScannerConfig;
pub use error::ScanError;
pub use scanner::{MarkupState, ScanMode, Scanner};
pub use token::{Span, Token, TokenKind, get_precedence};

/// Scan the single token starting at `position`.
///
/// Returns the token and the offset just past it, or `None` at the end of the
/// buffer. SGML scanning starts in [`MarkupState::Text`].
///
/// ```
/// use tern_scanner::{ScanMode, TokenKind, scan};
///
/// let (token, next) = scan(b"12px solid", 0, ScanMode::Css).unwrap();
/// assert_eq!(token.kind, TokenKind::Length);
/// assert_eq!(next, 4);
/// ```
#[must_use]
pub fn scan(source: &[u8], position: usize, mode: ScanMode) -> Option<(Token, usize)> {
    let mut scanner = Scanner::new(source, mode).resume(position, MarkupState::Text);
    scanner.next_token().map(|token| (token, token.span.end))
}

/// Scan the whole buffer with the default configuration.
#[must_use]
pub fn tokenize(source: &[u8], mode: ScanMode) -> Vec<Token> {
    Scanner::new(source, mode).collect()
}

/// Scan the whole buffer, failing at the first problem token.
///
/// # Errors
/// Returns the [`ScanError`] of the first `Garbage`, `Incomplete` or `Error`
/// token.
pub fn tokenize_strict(
    source: &[u8],
    mode: ScanMode,
    config: ScannerConfig,
) -> Result<Vec<Token>, ScanError> {
    Scanner::with_config(source, mode, config)
        .map(|token| token.error().map_or(Ok(token), Err))
        .collect()
}
