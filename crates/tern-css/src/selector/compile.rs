//! The CSS front end, driven by the CSS token scanner.

use strum_macros::Display;
use tern_common::warning::warn_once;
use tern_scanner::{ScanMode, Scanner, Span, Token, TokenKind};
use tracing::debug;

use super::path;
use super::{
    AttributeMatch, AttributePredicate, ElementMatch, Pseudo, Relation, Selector, SimpleSelector,
    Specificity, TextMatch,
};
use crate::error::CompileError;
use crate::nth::{NthMatch, parse_nth};

/// Selector languages accepted by [`compile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum Syntax {
    /// `h1#title + div > p:nth-child(2n)`
    #[default]
    Css,
    /// `/html/body//a[@href][2]`
    Path,
}

/// Pseudo-classes that are recognized but cannot be evaluated on a static tree.
const UNSUPPORTED: &[&str] = &[
    "lang",
    "dir",
    "is",
    "where",
    "has",
    "matches",
    "any",
    "scope",
    "defined",
    "focus-within",
    "focus-visible",
    "any-link",
    "placeholder-shown",
    "read-only",
    "read-write",
    "required",
    "optional",
    "valid",
    "invalid",
];

/// Compile one selector.
///
/// ```
/// use tern_css::{Syntax, compile};
///
/// let selector = compile("ul > li.active", Syntax::Css).unwrap();
/// assert_eq!(selector.chain.len(), 2);
/// assert_eq!(selector.specificity(), 1_002);
/// ```
///
/// # Errors
/// [`CompileError::Syntax`] for malformed text, including a selector group
/// (`a, b`; see [`compile_list`]). [`CompileError::UnsupportedPseudo`] for a
/// pseudo-class this engine recognizes but cannot evaluate.
pub fn compile(text: &str, syntax: Syntax) -> Result<Selector, CompileError> {
    let selector = match syntax {
        Syntax::Css => CssCompiler::new(text).single()?,
        Syntax::Path => path::compile_path(text)?,
    };
    debug!(
        selector = %selector,
        %syntax,
        links = selector.chain.len(),
        specificity = %selector.specificity_parts(),
        "compiled selector"
    );
    Ok(selector)
}

/// Compile a selector group: `,`-separated in CSS syntax, `|`-separated in
/// path syntax.
///
/// # Errors
/// The first error of any member; no partial list is returned.
pub fn compile_list(text: &str, syntax: Syntax) -> Result<Vec<Selector>, CompileError> {
    let selectors = match syntax {
        Syntax::Css => CssCompiler::new(text).list()?,
        Syntax::Path => path::compile_path_list(text)?,
    };
    debug!(group = text.trim(), %syntax, count = selectors.len(), "compiled selector group");
    Ok(selectors)
}

struct CssCompiler<'a> {
    source: &'a str,
    scanner: Scanner<'a>,
}

impl<'a> CssCompiler<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            scanner: Scanner::new(source.as_bytes(), ScanMode::Css),
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

    fn unexpected(&self, token: Token, context: &str) -> CompileError {
        CompileError::syntax(
            token.span.start,
            format!("unexpected `{}` {context}", self.text(token.span)),
        )
    }

    /// Consume whitespace and comments; true if there were any.
    fn skip_space(&mut self) -> bool {
        let mut skipped = false;
        while self
            .peek()
            .is_some_and(|t| matches!(t.kind, TokenKind::Space | TokenKind::Comment))
        {
            self.bump();
            skipped = true;
        }
        skipped
    }

    fn single(mut self) -> Result<Selector, CompileError> {
        let selector = self.complex()?;
        match self.peek() {
            Some(token) => Err(CompileError::syntax(
                token.span.start,
                "selector groups are not allowed here",
            )),
            None => Ok(selector),
        }
    }

    fn list(mut self) -> Result<Vec<Selector>, CompileError> {
        let mut selectors = vec![self.complex()?];
        while self.peek().is_some() {
            // complex() only stops early at a `,`.
            self.bump();
            selectors.push(self.complex()?);
        }
        Ok(selectors)
    }

    /// Parse links and combinators up to a `,` or the end of the text.
    fn complex(&mut self) -> Result<Selector, CompileError> {
        let _ = self.skip_space();
        let start = self.scanner.offset();
        let mut chain: Vec<SimpleSelector> = Vec::new();
        let mut combinator: Option<(Relation, usize)> = None;
        let mut after_space = false;
        let mut end = start;

        while let Some(token) = self.peek() {
            let relation = match token.kind {
                TokenKind::Space | TokenKind::Comment => {
                    self.bump();
                    after_space = true;
                    continue;
                }
                TokenKind::Char(b',') => break,
                TokenKind::Char(b'>') => Some(Relation::DirectChild),
                TokenKind::Char(b'+') => Some(Relation::DirectAdjacent),
                TokenKind::Char(b'~') => Some(Relation::IndirectAdjacent),
                _ => None,
            };

            if let Some(relation) = relation {
                if chain.is_empty() {
                    return Err(CompileError::syntax(
                        token.span.start,
                        format!("combinator `{}` has no left-hand side", relation.symbol()),
                    ));
                }
                if combinator.is_some() {
                    return Err(self.unexpected(token, "after a combinator"));
                }
                combinator = Some((relation, token.span.start));
                self.bump();
                after_space = false;
                continue;
            }

            if !chain.is_empty() && combinator.is_none() && !after_space {
                return Err(self.unexpected(token, "in selector"));
            }
            let mut link = self.compound()?;
            link.relation = combinator.take().map_or(Relation::Descendant, |(r, _)| r);
            let base = chain.last().map(|l| l.specificity).unwrap_or_default();
            link.specificity = base + link.specificity;
            chain.push(link);
            end = self.scanner.offset();
            after_space = false;
        }

        if let Some((relation, offset)) = combinator {
            return Err(CompileError::syntax(
                offset,
                format!("combinator `{}` has no right-hand side", relation.symbol()),
            ));
        }
        if chain.is_empty() {
            return Err(CompileError::syntax(start, "empty selector"));
        }
        Ok(Selector {
            chain,
            text: self.source.get(start..end).unwrap_or_default().to_owned(),
        })
    }

    /// A type or universal selector followed by any number of id, class,
    /// attribute and pseudo-class selectors. The `specificity` of the result
    /// covers this link only.
    fn compound(&mut self) -> Result<SimpleSelector, CompileError> {
        let mut link = SimpleSelector::default();
        let start = self.scanner.offset();
        let mut parts = 0_usize;

        match self.peek() {
            Some(token) if token.kind == TokenKind::Ident => {
                self.bump();
                link.tag = Some(unescape(self.text(token.span)).to_ascii_lowercase());
                link.specificity = Specificity::TYPE;
                parts += 1;
            }
            Some(token) if token.kind.is_char(b'*') => {
                self.bump();
                link.element_match |= ElementMatch::UNIVERSAL;
                parts += 1;
            }
            _ => link.element_match |= ElementMatch::UNIVERSAL,
        }

        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Hash | TokenKind::HexColor => {
                    self.bump();
                    let id = unescape(self.text(token.value));
                    link.attributes
                        .push(AttributePredicate::new(AttributeMatch::Id, "id", Some(id)));
                    link.specificity = link.specificity + Specificity::ID;
                }
                TokenKind::Char(b'.') => {
                    self.bump();
                    let class = self.class_name(token.span.start)?;
                    link.attributes.push(AttributePredicate::new(
                        AttributeMatch::SpaceList,
                        "class",
                        Some(class),
                    ));
                    link.specificity = link.specificity + Specificity::CLASS;
                }
                TokenKind::Char(b'[') => {
                    self.bump();
                    link.attributes.push(self.attribute(token.span.start)?);
                    link.specificity = link.specificity + Specificity::CLASS;
                }
                TokenKind::Char(b':') => {
                    self.bump();
                    self.pseudo(&mut link, token.span.start)?;
                }
                TokenKind::Ident => {
                    return Err(CompileError::syntax(
                        token.span.start,
                        "a type selector must come first in a compound selector",
                    ));
                }
                TokenKind::Char(b'*') => {
                    return Err(CompileError::syntax(
                        token.span.start,
                        "`*` must come first in a compound selector",
                    ));
                }
                _ => break,
            }
            parts += 1;
        }

        if parts == 0 {
            return Err(match self.peek() {
                Some(token) => self.unexpected(token, "where a selector was expected"),
                None => CompileError::syntax(start, "selector expected"),
            });
        }
        Ok(link)
    }

    fn class_name(&mut self, dot: usize) -> Result<String, CompileError> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Ident => {
                self.bump();
                Ok(unescape(self.text(token.span)))
            }
            _ => Err(CompileError::syntax(dot, "class name expected after `.`")),
        }
    }

    /// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors),
    /// after the `[`.
    fn attribute(&mut self, open: usize) -> Result<AttributePredicate, CompileError> {
        let unbalanced = || CompileError::syntax(open, "unbalanced `[`");
        let _ = self.skip_space();
        let name = match self.peek() {
            Some(token) if token.kind == TokenKind::Ident => {
                self.bump();
                unescape(self.text(token.span))
            }
            Some(token) => {
                return Err(CompileError::syntax(token.span.start, "attribute name expected"));
            }
            None => return Err(unbalanced()),
        };
        let _ = self.skip_space();

        let Some(operator) = self.scanner.next_token() else {
            return Err(unbalanced());
        };
        let kind = match operator.kind {
            TokenKind::Char(b']') => {
                return Ok(AttributePredicate::new(AttributeMatch::Any, name, None));
            }
            TokenKind::Char(b'=') => AttributeMatch::Exact,
            TokenKind::SelectSpaceList => AttributeMatch::SpaceList,
            TokenKind::SelectHyphenList => AttributeMatch::HyphenList,
            TokenKind::SelectBegin => AttributeMatch::Begin,
            TokenKind::SelectEnd => AttributeMatch::End,
            TokenKind::SelectContains => AttributeMatch::Contains,
            TokenKind::SelectNotEqual => AttributeMatch::NotEqual,
            _ => return Err(self.unexpected(operator, "in attribute selector")),
        };

        // Quoted or bare, the value runs to the `]`.
        let value_start = operator.span.end;
        let close = loop {
            match self.scanner.next_token() {
                Some(token) if token.kind.is_char(b']') => break token,
                Some(token)
                    if token.kind == TokenKind::Garbage
                        && matches!(self.text(token.span), "\"" | "'") =>
                {
                    return Err(CompileError::syntax(token.span.start, "unterminated string"));
                }
                Some(_) => {}
                None => return Err(unbalanced()),
            }
        };
        let raw = self.text(Span::new(value_start, close.span.start)).trim();
        if raw.is_empty() {
            return Err(CompileError::syntax(close.span.start, "attribute value expected"));
        }
        Ok(AttributePredicate::new(kind, name, Some(unquote(raw).to_owned())))
    }

    /// [§ 3.6 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes),
    /// after the first `:`.
    fn pseudo(&mut self, link: &mut SimpleSelector, colon: usize) -> Result<(), CompileError> {
        let double_colon = self.peek().is_some_and(|t| t.kind.is_char(b':'));
        if double_colon {
            self.bump();
        }
        let (token, argument) = match self.scanner.next_token() {
            Some(token) if token.kind == TokenKind::Ident => (token, None),
            Some(token) if token.kind == TokenKind::Function => {
                (token, Some(self.function_argument(token)?))
            }
            _ => return Err(CompileError::syntax(colon, "pseudo-class name expected")),
        };
        let name = unescape(self.text(token.value)).to_ascii_lowercase();

        if let Some(pseudo) = keyword_pseudo(&name) {
            if argument.is_some() {
                return Err(takes_no_argument(colon, &name));
            }
            if double_colon && !pseudo.is_element() {
                return Err(CompileError::syntax(
                    colon,
                    format!("`::{name}` is not a pseudo-element"),
                ));
            }
            let weight = if pseudo.is_element() {
                Specificity::TYPE
            } else {
                Specificity::CLASS
            };
            link.specificity = link.specificity + weight;
            link.pseudo.push(pseudo);
            return Ok(());
        }

        match (name.as_str(), argument) {
            (name, Some(_)) if STRUCTURAL.contains(&name) => Err(takes_no_argument(colon, name)),
            (name, None) if STRUCTURAL.contains(&name) => {
                apply_structural(link, name);
                link.specificity = link.specificity + Specificity::CLASS;
                Ok(())
            }
            ("nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type", Some((expr, at))) => {
                let nth = parse_nth(expr).map_err(|e| e.rebased(at))?;
                match name.as_str() {
                    "nth-child" => link.push_nth_child(nth),
                    "nth-last-child" => link.push_nth_child(nth.from_end()),
                    "nth-of-type" => link.push_nth_type(nth),
                    _ => link.push_nth_type(nth.from_end()),
                }
                link.specificity = link.specificity + Specificity::CLASS;
                Ok(())
            }
            ("contains", Some((text, at))) => {
                if link.text_match.is_some() {
                    return Err(CompileError::syntax(at, "only one `:contains()` per compound"));
                }
                link.text_match = Some(TextMatch::Contains(unquote(text.trim()).to_owned()));
                link.specificity = link.specificity + Specificity::CLASS;
                Ok(())
            }
            ("not", Some((inner, at))) => {
                let inner = compile(inner, Syntax::Css).map_err(|e| e.rebased(at))?;
                link.specificity = link.specificity + inner.specificity_parts();
                link.pseudo.push(Pseudo::Not(Box::new(inner)));
                Ok(())
            }
            (name, _) if UNSUPPORTED.contains(&name) => {
                let _ = warn_once("CSS", &format!("unsupported pseudo-class :{name}"));
                Err(CompileError::UnsupportedPseudo {
                    offset: colon,
                    name: name.to_owned(),
                })
            }
            (
                name @ ("nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type"
                | "contains" | "not"),
                None,
            ) => Err(CompileError::syntax(
                colon,
                format!("`:{name}` requires an argument"),
            )),
            (name, _) => Err(CompileError::syntax(
                colon,
                format!("unknown pseudo-class `:{name}`"),
            )),
        }
    }

    /// The text between `name(` and its balancing `)`, with its offset.
    fn function_argument(&mut self, function: Token) -> Result<(&'a str, usize), CompileError> {
        let mut depth = 1_usize;
        while let Some(token) = self.scanner.next_token() {
            match token.kind {
                TokenKind::Char(b'(') | TokenKind::Function => depth += 1,
                TokenKind::Char(b')') => {
                    depth -= 1;
                    if depth == 0 {
                        let span = Span::new(function.span.end, token.span.start);
                        return Ok((self.text(span), span.start));
                    }
                }
                _ => {}
            }
        }
        Err(CompileError::syntax(function.span.start, "unbalanced `(`"))
    }
}

/// Structural pseudo-classes written as a bare keyword.
const STRUCTURAL: &[&str] = &[
    "root",
    "empty",
    "first-child",
    "last-child",
    "only-child",
    "first-of-type",
    "last-of-type",
    "only-of-type",
];

fn apply_structural(link: &mut SimpleSelector, name: &str) {
    match name {
        "root" => link.element_match |= ElementMatch::ROOT,
        "empty" => link.element_match |= ElementMatch::EMPTY,
        "first-child" => link.push_nth_child(NthMatch::FIRST),
        "last-child" => link.push_nth_child(NthMatch::LAST),
        "only-child" => {
            link.push_nth_child(NthMatch::FIRST);
            link.push_nth_child(NthMatch::LAST);
        }
        "first-of-type" => link.push_nth_type(NthMatch::FIRST),
        "last-of-type" => link.push_nth_type(NthMatch::LAST),
        "only-of-type" => {
            link.push_nth_type(NthMatch::FIRST);
            link.push_nth_type(NthMatch::LAST);
        }
        _ => {}
    }
}

/// Pseudo-classes and pseudo-elements written as a bare keyword.
fn keyword_pseudo(name: &str) -> Option<Pseudo> {
    Some(match name {
        "link" => Pseudo::Link,
        "visited" => Pseudo::Visited,
        "hover" => Pseudo::Hover,
        "focus" => Pseudo::Focus,
        "active" => Pseudo::Active,
        "target" => Pseudo::Target,
        "enabled" => Pseudo::Enabled,
        "disabled" => Pseudo::Disabled,
        "checked" => Pseudo::Checked,
        "indeterminate" => Pseudo::Indeterminate,
        "first-line" => Pseudo::FirstLine,
        "first-letter" => Pseudo::FirstLetter,
        "selection" => Pseudo::Selection,
        "before" => Pseudo::Before,
        "after" => Pseudo::After,
        _ => return None,
    })
}

fn takes_no_argument(offset: usize, name: &str) -> CompileError {
    CompileError::syntax(offset, format!("`:{name}` takes no argument"))
}

/// Drop the backslash of each `\x` escape.
fn unescape(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    let mut chars = ident.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.extend(chars.next());
        } else {
            out.push(c);
        }
    }
    out
}

/// Strip one pair of matching quotes.
pub(super) fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    match bytes {
        [q @ (b'"' | b'\''), .., last] if last == q => &value[1..value.len() - 1],
        _ => value,
    }
}
