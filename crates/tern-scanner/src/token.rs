//! Token types shared by the CSS and SGML scanners.
//!
//! A token never owns text. It records a [`Span`] of the source buffer and,
//! for tokens whose meaningful part is narrower than their source text
//! (`"quoted"` strings, `<tag` names, `/* comments */`), a second `value`
//! span. Concatenating the spans of every token of a buffer gives the buffer
//! back byte for byte.

use std::borrow::Cow;
use std::ops::Range;

use serde::Serialize;
use strum_macros::Display;

use crate::error::ScanError;

/// A half-open byte range `start..end` into the scanned buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    /// Offset of the first byte.
    pub start: usize,
    /// Offset one past the last byte.
    pub end: usize,
}

impl Span {
    /// Create a span; `end` is clamped so the span is never inverted.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: if end < start { start } else { end },
        }
    }

    /// An empty span at `offset`.
    #[must_use]
    pub const fn empty(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Number of bytes covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The covered bytes of `source`, empty if the span is out of range.
    #[must_use]
    pub fn slice<'s>(&self, source: &'s [u8]) -> &'s [u8] {
        source.get(self.start..self.end).unwrap_or_default()
    }

    /// The span as a `Range`.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// The kind of a token.
///
/// Single characters that carry syntactic meaning on their own are
/// [`TokenKind::Char`]; everything else is a named kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum TokenKind {
    /// A single meaningful character such as `{`, `;` or `>`.
    Char(u8),

    // CSS
    /// `[a-zA-Z_][a-zA-Z0-9_-]*`, plus non-ASCII bytes.
    Ident,
    /// Digits with an optional decimal part.
    Number,
    /// A number followed by `%`.
    Percentage,
    /// A number with a unit this scanner does not classify.
    Dimension,
    /// A number in `px`, `cm`, `mm`, `in`, `pt` or `pc`.
    Length,
    /// A number in `deg`, `rad` or `grad`.
    Angle,
    /// A number in `ms` or `s`.
    Time,
    /// A number in `Hz` or `kHz`.
    Frequency,
    /// A number in `em`.
    Em,
    /// A number in `ex`.
    Ex,
    /// A quoted string; the value excludes the quotes.
    String,
    /// `#name`; the value excludes the `#`.
    Hash,
    /// `#` followed by exactly three or six hex digits.
    HexColor,
    /// `@name`; the value excludes the `@`.
    AtKeyword,
    /// `name(`; the value is the name.
    Function,
    /// `url(...)`; the value is the unquoted, trimmed address.
    Url,
    /// `!important`.
    Important,
    /// `~=`
    SelectSpaceList,
    /// `|=`
    SelectHyphenList,
    /// `^=`
    SelectBegin,
    /// `$=`
    SelectEnd,
    /// `*=`
    SelectContains,
    /// `!=`
    SelectNotEqual,
    /// `/* ... */`, or the `<!--`/`-->` markers around an embedded style sheet.
    Comment,

    // SGML
    /// Character data between tags.
    Text,
    /// `&name;`; the value is the name.
    Entity,
    /// `<name>`; the value is the name.
    Element,
    /// `<name` followed by attributes; the value is the name.
    ElementBegin,
    /// `</name>`; the value is the name, empty for `</>`.
    ElementEnd,
    /// `/>`
    ElementEmptyEnd,
    /// `>` closing a tag, or a zero-length virtual end before a stray `<`.
    TagEnd,
    /// An unquoted attribute value that is not a plain name.
    Attribute,
    /// `<!-- ... -->`; the value is the comment body.
    NotationComment,
    /// `<!DOCTYPE ...>` and other declarations.
    Notation,
    /// `<![CDATA[ ... ]]>`; the value is the section body.
    CdataSection,
    /// `<?target`; the value is the target.
    ProcessingInstruction,
    /// Processing instruction data up to and including `?>`.
    ProcessData,

    // Shared
    /// A run of whitespace.
    Space,
    /// A byte that starts no known token.
    Garbage,
    /// The buffer ended inside this token.
    Incomplete,
    /// An unterminated construct in a complete buffer.
    Error,
    /// Recovery sentinel; never produced by the scanners.
    Skip,
    /// Terminator sentinel that outranks every token; never produced by the scanners.
    None,
}

impl TokenKind {
    /// Position of this kind in the recovery order.
    ///
    /// `}` > `{` > `;` > `)` > tag openers > tag closers > everything else.
    /// [`Scanner::skip_to`](crate::Scanner::skip_to) never discards a token
    /// ranking at or above its target.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::None => u8::MAX,
            Self::Char(b'}') => 6,
            Self::Char(b'{') => 5,
            Self::Char(b';') => 4,
            Self::Char(b')') => 3,
            Self::Char(b'<')
            | Self::Element
            | Self::ElementBegin
            | Self::ElementEnd
            | Self::NotationComment
            | Self::Notation
            | Self::CdataSection
            | Self::ProcessingInstruction => 2,
            Self::Char(b'>') | Self::TagEnd | Self::ElementEmptyEnd => 1,
            _ => 0,
        }
    }

    /// Whether this is the single character `c`.
    #[must_use]
    pub const fn is_char(self, c: u8) -> bool {
        matches!(self, Self::Char(k) if k == c)
    }

    /// Whether this kind reports a scanning problem.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Garbage | Self::Incomplete | Self::Error)
    }
}

/// Free-function form of [`TokenKind::precedence`].
#[must_use]
pub const fn get_precedence(kind: TokenKind) -> u8 {
    kind.precedence()
}

/// A scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token {
    /// What was scanned.
    pub kind: TokenKind,
    /// The full source text of the token.
    pub span: Span,
    /// The meaningful part of the token, equal to `span` unless narrower.
    pub value: Span,
    /// The character for [`TokenKind::Char`] tokens.
    pub char_value: Option<u8>,
    /// 1-based line of the first byte, or 0 when line counting is off.
    pub line: usize,
}

impl Token {
    /// A token whose value is its whole span.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            span,
            value: span,
            char_value: match kind {
                TokenKind::Char(c) => Some(c),
                _ => None,
            },
            line: 0,
        }
    }

    /// Replace the value span.
    #[must_use]
    pub const fn with_value(mut self, value: Span) -> Self {
        self.value = value;
        self
    }

    /// Whether this token is of kind `kind`.
    #[must_use]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// See [`TokenKind::precedence`].
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        self.kind.precedence()
    }

    /// The source text of the whole token.
    #[must_use]
    pub fn text<'s>(&self, source: &'s [u8]) -> &'s [u8] {
        self.span.slice(source)
    }

    /// The value bytes, lossily decoded.
    #[must_use]
    pub fn value_str<'s>(&self, source: &'s [u8]) -> Cow<'s, str> {
        String::from_utf8_lossy(self.value.slice(source))
    }

    /// The scanning problem this token reports, if any.
    #[must_use]
    pub const fn error(&self) -> Option<ScanError> {
        match self.kind {
            TokenKind::Garbage => Some(ScanError::Garbage {
                offset: self.span.start,
            }),
            TokenKind::Incomplete => Some(ScanError::Incomplete {
                offset: self.span.start,
            }),
            TokenKind::Error => Some(ScanError::Unterminated {
                offset: self.span.start,
            }),
            _ => None,
        }
    }
}
