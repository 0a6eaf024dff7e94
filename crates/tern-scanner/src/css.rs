//! CSS token rules.
//!
//! Used for style sheets, `style` attributes and selector text. Whitespace and
//! comments are returned as tokens so that callers can see descendant
//! combinators and so that no byte of the input is lost.

use crate::scanner::{Scanner, is_whitespace};
use crate::token::{Span, Token, TokenKind};

/// Bytes that form a token on their own.
const fn is_css_char_token(b: u8) -> bool {
    matches!(
        b,
        b'[' | b'(' | b'{' | b'}' | b')' | b']' | b';' | b':' | b',' | b'.' | b'>' | b'+'
            | b'~' | b'*' | b'=' | b'/' | b'-'
    )
}

pub(crate) const fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'\\' || b >= 0x80
}

pub(crate) const fn is_ident_char(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit() || b == b'-'
}

/// Map a unit suffix to the token kind of the whole dimension.
fn unit_kind(unit: &[u8]) -> TokenKind {
    match unit.to_ascii_lowercase().as_slice() {
        b"px" | b"cm" | b"mm" | b"in" | b"pt" | b"pc" => TokenKind::Length,
        b"em" => TokenKind::Em,
        b"ex" => TokenKind::Ex,
        b"deg" | b"rad" | b"grad" => TokenKind::Angle,
        b"ms" | b"s" => TokenKind::Time,
        b"hz" | b"khz" => TokenKind::Frequency,
        _ => TokenKind::Dimension,
    }
}

impl Scanner<'_> {
    pub(crate) fn scan_css_token(&self, start: usize) -> Token {
        let Some(b) = self.byte_at(start) else {
            return Token::new(TokenKind::Incomplete, Span::empty(start));
        };
        let next = self.byte_at(start + 1);
        let digit_follows = |offset: usize| self.byte_at(offset).is_some_and(|c| c.is_ascii_digit());

        match b {
            b if is_whitespace(b) => {
                let end = self.run_while(start, is_whitespace);
                Token::new(TokenKind::Space, Span::new(start, end))
            }
            b'/' if next == Some(b'*') => self.scan_css_comment(start),
            b'<' if self.starts_with_at(start, b"<!--") => {
                Token::new(TokenKind::Comment, Span::new(start, start + 4))
            }
            b'-' if self.starts_with_at(start, b"-->") => {
                Token::new(TokenKind::Comment, Span::new(start, start + 3))
            }
            b'-' if digit_follows(start + 1)
                || (next == Some(b'.') && digit_follows(start + 2)) =>
            {
                self.scan_css_number(start, start + 1)
            }
            b'-' if next.is_some_and(is_ident_start) => self.scan_css_ident(start),
            b'.' if digit_follows(start + 1) => self.scan_css_number(start, start),
            b if b.is_ascii_digit() => self.scan_css_number(start, start),
            b'"' | b'\'' => self.scan_css_string(start, b),
            b'#' => self.scan_css_hash(start),
            b'@' => {
                let end = self.run_while(start + 1, is_ident_char);
                if end == start + 1 {
                    Token::new(TokenKind::Garbage, Span::new(start, start + 1))
                } else {
                    Token::new(TokenKind::AtKeyword, Span::new(start, end))
                        .with_value(Span::new(start + 1, end))
                }
            }
            b'!' => self.scan_css_bang(start),
            b'^' | b'$' | b'|' | b'*' | b'~' if next == Some(b'=') => {
                let kind = match b {
                    b'^' => TokenKind::SelectBegin,
                    b'$' => TokenKind::SelectEnd,
                    b'|' => TokenKind::SelectHyphenList,
                    b'*' => TokenKind::SelectContains,
                    _ => TokenKind::SelectSpaceList,
                };
                Token::new(kind, Span::new(start, start + 2))
            }
            b if is_css_char_token(b) => Token::new(TokenKind::Char(b), Span::new(start, start + 1)),
            b if is_ident_start(b) => self.scan_css_ident(start),
            _ => Token::new(TokenKind::Garbage, Span::new(start, start + 1)),
        }
    }

    fn scan_css_comment(&self, start: usize) -> Token {
        let body = start + 2;
        match self.find_at(body, b"*/") {
            Some(close) => Token::new(TokenKind::Comment, Span::new(start, close + 2))
                .with_value(Span::new(body, close)),
            None => self.unterminated(start, || {
                Token::new(TokenKind::Comment, Span::new(start, self.source.len()))
                    .with_value(Span::new(body, self.source.len()))
            }),
        }
    }

    /// `digits_from` is where the digits (or leading `.`) begin, after any sign.
    fn scan_css_number(&self, start: usize, digits_from: usize) -> Token {
        let mut end = self.run_while(digits_from, |c| c.is_ascii_digit());
        if self.byte_at(end) == Some(b'.')
            && self.byte_at(end + 1).is_some_and(|c| c.is_ascii_digit())
        {
            end = self.run_while(end + 1, |c| c.is_ascii_digit());
        }
        let number = Span::new(start, end);

        match self.byte_at(end) {
            Some(b'%') => Token::new(TokenKind::Percentage, Span::new(start, end + 1))
                .with_value(number),
            Some(c) if is_ident_start(c) => {
                let unit_end = self.run_while(end, is_ident_char);
                let kind = unit_kind(Span::new(end, unit_end).slice(self.source));
                Token::new(kind, Span::new(start, unit_end)).with_value(number)
            }
            _ => Token::new(TokenKind::Number, number),
        }
    }

    fn scan_css_ident(&self, start: usize) -> Token {
        let mut end = start;
        while let Some(c) = self.byte_at(end) {
            if c == b'\\' {
                // An escape takes the next byte verbatim.
                end = (end + 2).min(self.source.len());
            } else if is_ident_char(c) {
                end += 1;
            } else {
                break;
            }
        }
        let name = Span::new(start, end);

        if self.byte_at(end) != Some(b'(') {
            return Token::new(TokenKind::Ident, name);
        }
        if name.slice(self.source).eq_ignore_ascii_case(b"url") {
            return self.scan_css_url(start, end + 1);
        }
        Token::new(TokenKind::Function, Span::new(start, end + 1)).with_value(name)
    }

    fn scan_css_url(&self, start: usize, body: usize) -> Token {
        let function = || {
            Token::new(TokenKind::Function, Span::new(start, body))
                .with_value(Span::new(start, body - 1))
        };
        let mut offset = body;
        while let Some(c) = self.byte_at(offset) {
            match c {
                b')' => {
                    let inner = Span::new(body, offset);
                    return Token::new(TokenKind::Url, Span::new(start, offset + 1))
                        .with_value(self.trim_url(inner));
                }
                b'"' | b'\'' => match self.source[offset + 1..].iter().position(|&q| q == c) {
                    Some(i) => offset += i + 2,
                    None => return self.unterminated(start, function),
                },
                _ => offset += 1,
            }
        }
        self.unterminated(start, function)
    }

    /// Strip surrounding whitespace, then one pair of matching quotes.
    fn trim_url(&self, mut inner: Span) -> Span {
        while inner.start < inner.end && is_whitespace(self.source[inner.start]) {
            inner.start += 1;
        }
        while inner.end > inner.start && is_whitespace(self.source[inner.end - 1]) {
            inner.end -= 1;
        }
        let quoted = inner.len() >= 2
            && matches!(self.source[inner.start], b'"' | b'\'')
            && self.source[inner.end - 1] == self.source[inner.start];
        if quoted {
            Span::new(inner.start + 1, inner.end - 1)
        } else {
            inner
        }
    }

    fn scan_css_string(&self, start: usize, quote: u8) -> Token {
        match self.source[start + 1..].iter().position(|&c| c == quote) {
            Some(i) => {
                let close = start + 1 + i;
                Token::new(TokenKind::String, Span::new(start, close + 1))
                    .with_value(Span::new(start + 1, close))
            }
            None => self.unterminated(start, || {
                Token::new(TokenKind::Garbage, Span::new(start, start + 1))
            }),
        }
    }

    fn scan_css_hash(&self, start: usize) -> Token {
        let end = self.run_while(start + 1, is_ident_char);
        let name = Span::new(start + 1, end);
        if name.is_empty() {
            return Token::new(TokenKind::Garbage, Span::new(start, start + 1));
        }
        let bytes = name.slice(self.source);
        let kind = if matches!(bytes.len(), 3 | 6) && bytes.iter().all(u8::is_ascii_hexdigit) {
            TokenKind::HexColor
        } else {
            TokenKind::Hash
        };
        Token::new(kind, Span::new(start, end)).with_value(name)
    }

    fn scan_css_bang(&self, start: usize) -> Token {
        if self.byte_at(start + 1) == Some(b'=') {
            return Token::new(TokenKind::SelectNotEqual, Span::new(start, start + 2));
        }
        let word = self.run_while(start + 1, is_whitespace);
        if self.starts_with_ignore_case_at(word, b"important") {
            let end = word + b"important".len();
            return Token::new(TokenKind::Important, Span::new(start, end))
                .with_value(Span::new(word, end));
        }
        Token::new(TokenKind::Garbage, Span::new(start, start + 1))
    }
}
