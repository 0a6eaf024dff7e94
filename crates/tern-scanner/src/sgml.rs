//! SGML/HTML token rules.
//!
//! Markup is scanned in one of three [`MarkupState`]s. Text state yields
//! character data, entities and the tokens that open markup. Element state
//! yields the attribute tokens of a start tag until its `>`. Processing
//! instruction state yields the data up to `?>`.

use crate::css::is_ident_char;
use crate::scanner::{MarkupState, Scanner, is_whitespace};
use crate::token::{Span, Token, TokenKind};

/// How a scan for the end of a tag stopped.
enum TagStop {
    /// At a `>`, which belongs to the tag.
    Close(usize),
    /// At a `<`, which starts the next tag.
    Open(usize),
    /// At the end of the buffer.
    End,
}

const fn is_name_char(b: u8) -> bool {
    is_ident_char(b) || matches!(b, b':' | b'.')
}

const fn is_attribute_char(b: u8) -> bool {
    !is_whitespace(b) && !matches!(b, b'<' | b'>' | b'=' | b'"' | b'\'')
}

impl Scanner<'_> {
    pub(crate) fn scan_sgml_token(&mut self, start: usize) -> Token {
        match self.state {
            MarkupState::Text => self.scan_sgml_text(start),
            MarkupState::Element => self.scan_sgml_element(start),
            MarkupState::ProcessingInstruction => self.scan_sgml_process_data(start),
        }
    }

    fn scan_sgml_text(&mut self, start: usize) -> Token {
        match self.source[start] {
            b'<' => self.scan_sgml_markup(start),
            b'&' => self.scan_sgml_entity(start),
            b if is_whitespace(b) => {
                let end = self.run_while(start, is_whitespace);
                match self.byte_at(end) {
                    None | Some(b'<' | b'&') => Token::new(TokenKind::Space, Span::new(start, end)),
                    Some(_) => self.scan_sgml_text_run(start, end),
                }
            }
            _ => self.scan_sgml_text_run(start, start),
        }
    }

    /// Text from `start`, with the scan for markup resuming at `from`.
    fn scan_sgml_text_run(&self, start: usize, from: usize) -> Token {
        let end = self.run_while(from, |c| c != b'<' && c != b'&');
        if end == self.source.len() && self.config.partial {
            return Token::new(TokenKind::Incomplete, Span::new(start, end));
        }
        Token::new(TokenKind::Text, Span::new(start, end))
    }

    fn scan_sgml_entity(&self, start: usize) -> Token {
        let end = self.run_while(start + 1, |c| c.is_ascii_alphanumeric() || c == b'#');
        let name = Span::new(start + 1, end);
        if name.is_empty() {
            // A lone `&` is plain text.
            return self.scan_sgml_text_run(start, start + 1);
        }
        match self.byte_at(end) {
            Some(b';') => Token::new(TokenKind::Entity, Span::new(start, end + 1)).with_value(name),
            None => self.unterminated(start, || {
                Token::new(TokenKind::Entity, Span::new(start, end)).with_value(name)
            }),
            Some(_) => Token::new(TokenKind::Entity, Span::new(start, end)).with_value(name),
        }
    }

    fn scan_sgml_markup(&mut self, start: usize) -> Token {
        let garbage = Token::new(TokenKind::Garbage, Span::new(start, start + 1));
        let Some(next) = self.byte_at(start + 1) else {
            return self.unterminated(start, || garbage);
        };

        match next {
            b'!' if self.starts_with_at(start, b"<!--") => self.scan_sgml_comment(start),
            b'!' if self.starts_with_at(start, b"<![CDATA[") => self.scan_sgml_delimited(
                start,
                b"<![CDATA[".len(),
                b"]]>",
                TokenKind::CdataSection,
            ),
            b'!' => self.scan_sgml_declaration(start, TokenKind::Notation, start + 2),
            b'?' => {
                let end = self.run_while(start + 2, is_name_char);
                if end == self.source.len() && self.config.partial {
                    return Token::new(TokenKind::Incomplete, Span::new(start, end));
                }
                self.state = MarkupState::ProcessingInstruction;
                Token::new(TokenKind::ProcessingInstruction, Span::new(start, end))
                    .with_value(Span::new(start + 2, end))
            }
            b'/' => {
                let name_end = self.run_while(start + 2, is_name_char);
                match self.byte_at(name_end) {
                    None if name_end == start + 2 => self.unterminated(start, || garbage),
                    Some(c) if name_end == start + 2 && c != b'>' => garbage,
                    _ => self.scan_sgml_declaration(start, TokenKind::ElementEnd, start + 2),
                }
            }
            c if c.is_ascii_alphabetic() => {
                let end = self.run_while(start + 1, is_name_char);
                let name = Span::new(start + 1, end);
                match self.byte_at(end) {
                    Some(b'>') => {
                        Token::new(TokenKind::Element, Span::new(start, end + 1)).with_value(name)
                    }
                    None if self.config.partial => {
                        Token::new(TokenKind::Incomplete, Span::new(start, end))
                    }
                    _ => {
                        self.state = MarkupState::Element;
                        Token::new(TokenKind::ElementBegin, Span::new(start, end)).with_value(name)
                    }
                }
            }
            _ => garbage,
        }
    }

    fn scan_sgml_comment(&self, start: usize) -> Token {
        let body = start + 4;
        let close = match (self.find_at(body, b"-->"), self.find_at(body, b"--!>")) {
            (Some(a), Some(b)) if b < a => Some((b, 4)),
            (Some(a), _) => Some((a, 3)),
            (None, Some(b)) => Some((b, 4)),
            (None, None) => None,
        };
        match close {
            Some((at, len)) => Token::new(TokenKind::NotationComment, Span::new(start, at + len))
                .with_value(Span::new(body, at)),
            None => self.unterminated(start, || {
                Token::new(TokenKind::NotationComment, Span::new(start, self.source.len()))
                    .with_value(Span::new(body, self.source.len()))
            }),
        }
    }

    fn scan_sgml_delimited(&self, start: usize, open: usize, close: &[u8], kind: TokenKind) -> Token {
        let body = start + open;
        match self.find_at(body, close) {
            Some(at) => Token::new(kind, Span::new(start, at + close.len()))
                .with_value(Span::new(body, at)),
            None => self.unterminated(start, || {
                Token::new(kind, Span::new(start, self.source.len()))
                    .with_value(Span::new(body, self.source.len()))
            }),
        }
    }

    /// `<!...>` declarations and `</name ...>` end tags: everything up to the
    /// closing `>`, stopping early before a `<` that opens the next tag.
    fn scan_sgml_declaration(&self, start: usize, kind: TokenKind, body: usize) -> Token {
        let name = Span::new(body, self.run_while(body, is_name_char));
        let token = |end: usize, inner_end: usize| {
            let value = if kind == TokenKind::ElementEnd {
                name
            } else {
                Span::new(body, inner_end)
            };
            Token::new(kind, Span::new(start, end)).with_value(value)
        };
        match self.find_tag_end(body) {
            TagStop::Close(at) => token(at + 1, at),
            TagStop::Open(at) => token(at, at),
            TagStop::End => {
                let len = self.source.len();
                self.unterminated(start, || token(len, len))
            }
        }
    }

    /// Find the `>` ending a tag, skipping quoted values.
    fn find_tag_end(&self, from: usize) -> TagStop {
        let mut offset = from;
        while let Some(c) = self.byte_at(offset) {
            match c {
                b'>' => return TagStop::Close(offset),
                b'<' => return TagStop::Open(offset),
                b'"' | b'\'' => match self.source[offset + 1..].iter().position(|&q| q == c) {
                    Some(i) => offset += i + 2,
                    None => return TagStop::End,
                },
                _ => offset += 1,
            }
        }
        TagStop::End
    }

    fn scan_sgml_element(&mut self, start: usize) -> Token {
        let c = self.source[start];
        let next = self.byte_at(start + 1);
        match c {
            c if is_whitespace(c) => {
                let end = self.run_while(start, is_whitespace);
                Token::new(TokenKind::Space, Span::new(start, end))
            }
            b'<' => {
                // Tag soup: a new tag starts before this one was closed.
                self.state = MarkupState::Text;
                Token::new(TokenKind::TagEnd, Span::empty(start))
            }
            b'>' => {
                self.state = MarkupState::Text;
                Token::new(TokenKind::TagEnd, Span::new(start, start + 1))
            }
            b'/' if next == Some(b'>') => {
                self.state = MarkupState::Text;
                Token::new(TokenKind::ElementEmptyEnd, Span::new(start, start + 2))
            }
            b'?' if next == Some(b'>') => {
                self.state = MarkupState::Text;
                Token::new(TokenKind::TagEnd, Span::new(start, start + 2))
            }
            b'=' => Token::new(TokenKind::Char(b'='), Span::new(start, start + 1)),
            b'"' | b'\'' => match self.source[start + 1..].iter().position(|&q| q == c) {
                Some(i) => {
                    let close = start + 1 + i;
                    Token::new(TokenKind::String, Span::new(start, close + 1))
                        .with_value(Span::new(start + 1, close))
                }
                None => self.unterminated(start, || {
                    Token::new(TokenKind::Garbage, Span::new(start, start + 1))
                }),
            },
            _ => self.scan_sgml_attribute(start),
        }
    }

    fn scan_sgml_attribute(&self, start: usize) -> Token {
        let name_end = self.run_while(start, is_name_char);
        let mut end = self.run_while(name_end, is_attribute_char);
        // Leave a trailing `/>` for the empty element end.
        if end > start + 1 && self.source[end - 1] == b'/' && self.byte_at(end) == Some(b'>') {
            end -= 1;
        }
        if end == self.source.len() && self.config.partial {
            return Token::new(TokenKind::Incomplete, Span::new(start, end));
        }
        let kind = if end == name_end && name_end > start {
            TokenKind::Ident
        } else {
            TokenKind::Attribute
        };
        Token::new(kind, Span::new(start, end))
    }

    fn scan_sgml_process_data(&mut self, start: usize) -> Token {
        match self.find_at(start, b"?>") {
            Some(at) => {
                self.state = MarkupState::Text;
                Token::new(TokenKind::ProcessData, Span::new(start, at + 2))
                    .with_value(Span::new(start, at))
            }
            None => {
                let end = self.source.len();
                let token = self.unterminated(start, || {
                    Token::new(TokenKind::ProcessData, Span::new(start, end))
                });
                self.state = MarkupState::Text;
                token
            }
        }
    }
}
