//! The path front end: `/html/body//a[@href][2]`.
//!
//! Steps are element names or `*`. A leading `/` anchors the first step at
//! the root element, a leading `//` lets it match anywhere. Between steps,
//! `/` selects children and `//` selects descendants. Predicates in brackets
//! test attributes (`[@a]`, `[@a=v]`, `[@a!=v]`) or the position among
//! same-tag siblings (`[n]`, `[last()]`).
//!
//! Parsed by hand rather than with the CSS scanner: `/*` is not a comment here.

use super::compile::unquote;
use super::{
    AttributeMatch, AttributePredicate, ElementMatch, Relation, Selector, SimpleSelector,
    Specificity,
};
use crate::error::CompileError;
use crate::nth::NthMatch;

pub(super) fn compile_path(text: &str) -> Result<Selector, CompileError> {
    PathParser::new(text).parse()
}

/// Members of a `|`-separated group, compiled with their offsets intact.
pub(super) fn compile_path_list(text: &str) -> Result<Vec<Selector>, CompileError> {
    let mut selectors = Vec::new();
    let mut start = 0;
    let mut depth = 0_usize;
    let mut quote: Option<u8> = None;
    for (i, b) in text.bytes().enumerate() {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'[') => depth += 1,
            (None, b']') => depth = depth.saturating_sub(1),
            (None, b'|') if depth == 0 => {
                selectors.push(PathParser::at(text, start, i).parse()?);
                start = i + 1;
            }
            _ => {}
        }
    }
    selectors.push(PathParser::at(text, start, text.len()).parse()?);
    Ok(selectors)
}

const fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':') || b >= 0x80
}

struct PathParser<'a> {
    text: &'a str,
    position: usize,
    end: usize,
}

impl<'a> PathParser<'a> {
    const fn new(text: &'a str) -> Self {
        Self::at(text, 0, text.len())
    }

    const fn at(text: &'a str, start: usize, end: usize) -> Self {
        Self {
            text,
            position: start,
            end,
        }
    }

    fn peek(&self) -> Option<u8> {
        (self.position < self.end)
            .then(|| self.text.as_bytes()[self.position])
    }

    fn eat(&mut self, pattern: &str) -> bool {
        let found = self
            .text
            .get(self.position..self.end)
            .is_some_and(|rest| rest.starts_with(pattern));
        if found {
            self.position += pattern.len();
        }
        found
    }

    fn skip_space(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.position += 1;
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.position;
        while self.peek().is_some_and(&pred) {
            self.position += 1;
        }
        self.text.get(start..self.position).unwrap_or_default()
    }

    fn parse(mut self) -> Result<Selector, CompileError> {
        self.skip_space();
        let start = self.position;
        if self.peek().is_none() {
            return Err(CompileError::syntax(start, "empty selector"));
        }
        let (mut relation, anchored) = if self.eat("//") {
            (Relation::Descendant, false)
        } else if self.eat("/") {
            (Relation::DirectChild, true)
        } else {
            (Relation::Descendant, false)
        };

        let mut chain: Vec<SimpleSelector> = Vec::new();
        loop {
            let mut step = self.step()?;
            step.relation = relation;
            if chain.is_empty() && anchored {
                step.element_match |= ElementMatch::ROOT;
            }
            let base = chain.last().map(|s| s.specificity).unwrap_or_default();
            step.specificity = base + step.specificity;
            chain.push(step);

            self.skip_space();
            let separator = self.position;
            relation = if self.eat("//") {
                Relation::Descendant
            } else if self.eat("/") {
                Relation::DirectChild
            } else if let Some(b) = self.peek() {
                return Err(CompileError::syntax(
                    separator,
                    format!("expected `/` or `//`, found `{}`", char::from(b)),
                ));
            } else {
                break;
            };
            self.skip_space();
            if self.peek().is_none() {
                return Err(CompileError::syntax(separator, "trailing `/`"));
            }
        }

        Ok(Selector {
            chain,
            text: self.text.get(start..self.end).unwrap_or_default().trim().to_owned(),
        })
    }

    fn step(&mut self) -> Result<SimpleSelector, CompileError> {
        let mut step = SimpleSelector::default();
        let at = self.position;
        if self.eat("*") {
            step.element_match |= ElementMatch::UNIVERSAL;
        } else {
            let name = self.take_while(is_name_byte);
            if name.is_empty() {
                return Err(CompileError::syntax(at, "element name expected"));
            }
            step.tag = Some(name.to_ascii_lowercase());
            step.specificity = Specificity::TYPE;
        }

        while self.peek() == Some(b'[') {
            let open = self.position;
            self.position += 1;
            self.skip_space();
            if self.eat("@") {
                let predicate = self.attribute()?;
                step.attributes.push(predicate);
            } else if self.eat("last()") {
                step.push_nth_type(NthMatch::LAST);
            } else {
                let digits = self.take_while(|b| b.is_ascii_digit());
                match digits.parse::<isize>() {
                    Ok(0) => {
                        return Err(CompileError::syntax(open + 1, "positions start at 1"));
                    }
                    Ok(n) => step.push_nth_type(NthMatch::new(0, n)),
                    Err(_) => {
                        return Err(CompileError::syntax(open + 1, "unsupported predicate"));
                    }
                }
            }
            self.skip_space();
            if !self.eat("]") {
                return Err(CompileError::syntax(open, "unbalanced `[`"));
            }
            step.specificity = step.specificity + Specificity::CLASS;
        }
        Ok(step)
    }

    /// `@name`, `@name=value` or `@name!=value`, after the `@`.
    fn attribute(&mut self) -> Result<AttributePredicate, CompileError> {
        let name = self.take_while(is_name_byte);
        if name.is_empty() {
            return Err(CompileError::syntax(self.position, "attribute name expected"));
        }
        self.skip_space();
        let kind = if self.eat("!=") {
            AttributeMatch::NotEqual
        } else if self.eat("=") {
            AttributeMatch::Exact
        } else {
            return Ok(AttributePredicate::new(AttributeMatch::Any, name, None));
        };
        self.skip_space();

        let value = match self.peek() {
            Some(q @ (b'"' | b'\'')) => {
                let start = self.position;
                let len = self
                    .text
                    .get(start + 1..self.end)
                    .and_then(|rest| rest.bytes().position(|b| b == q))
                    .ok_or_else(|| CompileError::syntax(start, "unterminated string"))?;
                self.position = start + len + 2;
                unquote(self.text.get(start..self.position).unwrap_or_default())
            }
            _ => self.take_while(|b| b != b']').trim(),
        };
        Ok(AttributePredicate::new(kind, name, Some(value.to_owned())))
    }
}
