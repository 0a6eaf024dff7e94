//! Tests for the precedence order and `skip_to` recovery.

use tern_scanner::{ScanMode, Scanner, TokenKind, get_precedence};

fn next_kind(scanner: &mut Scanner<'_>) -> Option<TokenKind> {
    scanner.next_token().map(|t| t.kind)
}

#[test]
fn test_precedence_order() {
    let order = [
        TokenKind::Char(b'}'),
        TokenKind::Char(b'{'),
        TokenKind::Char(b';'),
        TokenKind::Char(b')'),
        TokenKind::Char(b'<'),
        TokenKind::Char(b'>'),
        TokenKind::Ident,
    ];
    for pair in order.windows(2) {
        assert!(
            get_precedence(pair[0]) > get_precedence(pair[1]),
            "{:?} should outrank {:?}",
            pair[0],
            pair[1]
        );
    }
    assert_eq!(get_precedence(TokenKind::Ident), 0);
    assert_eq!(get_precedence(TokenKind::Char(b'(')), 0);
    assert!(get_precedence(TokenKind::None) > get_precedence(TokenKind::Char(b'}')));
}

#[test]
fn test_tag_tokens_rank_like_angle_brackets() {
    assert_eq!(
        get_precedence(TokenKind::ElementBegin),
        get_precedence(TokenKind::Char(b'<'))
    );
    assert_eq!(
        get_precedence(TokenKind::TagEnd),
        get_precedence(TokenKind::Char(b'>'))
    );
}

#[test]
fn test_skip_to_consumes_target() {
    let mut scanner = Scanner::new(b"color red; margin: 0", ScanMode::Css);
    let found = scanner.skip_to(TokenKind::Char(b';'));
    assert_eq!(found.map(|t| t.span.start), Some(9));
    assert_eq!(next_kind(&mut scanner), Some(TokenKind::Space));
}

#[test]
fn test_skip_to_semicolon_stops_at_close_brace() {
    let mut scanner = Scanner::new(b"color red } p", ScanMode::Css);
    assert!(scanner.skip_to(TokenKind::Char(b';')).is_none());
    assert_eq!(next_kind(&mut scanner), Some(TokenKind::Char(b'}')));
}

#[test]
fn test_skip_to_semicolon_stops_at_open_brace() {
    let mut scanner = Scanner::new(b"junk { a }", ScanMode::Css);
    assert!(scanner.skip_to(TokenKind::Char(b';')).is_none());
    assert_eq!(next_kind(&mut scanner), Some(TokenKind::Char(b'{')));
}

#[test]
fn test_skip_to_close_brace_discards_lower_tokens() {
    let mut scanner = Scanner::new(b"{ a ; b ) } tail", ScanMode::Css);
    let found = scanner.skip_to(TokenKind::Char(b'}'));
    assert_eq!(found.map(|t| t.kind), Some(TokenKind::Char(b'}')));
    assert_eq!(scanner.offset(), 11);
}

#[test]
fn test_skip_to_close_paren_stops_at_semicolon() {
    let mut scanner = Scanner::new(b"x ; )", ScanMode::Css);
    assert!(scanner.skip_to(TokenKind::Char(b')')).is_none());
    assert_eq!(next_kind(&mut scanner), Some(TokenKind::Char(b';')));
}

#[test]
fn test_skip_to_none_drains_the_buffer() {
    let mut scanner = Scanner::new(b"a { b } ; c", ScanMode::Css);
    assert!(scanner.skip_to(TokenKind::None).is_none());
    assert_eq!(scanner.next_token(), None);
}

#[test]
fn test_skip_to_tag_end_in_tag() {
    let source = br#"<a href="x" junk $$ junk>text"#;
    let mut scanner = Scanner::new(source, ScanMode::Sgml);
    assert_eq!(next_kind(&mut scanner), Some(TokenKind::ElementBegin));
    let end = scanner.skip_to(TokenKind::TagEnd);
    assert_eq!(end.map(|t| t.span.len()), Some(1));
    assert_eq!(next_kind(&mut scanner), Some(TokenKind::Text));
}

#[test]
fn test_skip_to_tag_end_stops_at_nested_tag() {
    let mut scanner = Scanner::new(b"junk <b> more >", ScanMode::Sgml);
    assert!(scanner.skip_to(TokenKind::TagEnd).is_none());
    assert_eq!(next_kind(&mut scanner), Some(TokenKind::Element));
}

#[test]
fn test_skip_to_tag_end_in_unclosed_tag_stops_before_next_tag() {
    let mut scanner = Scanner::new(b"<a junk <b>", ScanMode::Sgml);
    assert_eq!(next_kind(&mut scanner), Some(TokenKind::ElementBegin));
    let end = scanner.skip_to(TokenKind::TagEnd);
    assert!(end.is_some_and(|t| t.span.is_empty()));
    assert_eq!(next_kind(&mut scanner), Some(TokenKind::Element));
}

#[test]
fn test_peek_does_not_consume() {
    let mut scanner = Scanner::new(b"a b", ScanMode::Css);
    assert_eq!(scanner.peek_token().map(|t| t.kind), Some(TokenKind::Ident));
    assert_eq!(scanner.offset(), 0);
    assert_eq!(next_kind(&mut scanner), Some(TokenKind::Ident));
    assert_eq!(scanner.offset(), 1);
}
