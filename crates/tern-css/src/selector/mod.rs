//! Compiled selectors.
//!
//! A [`Selector`] is a left-to-right chain of [`SimpleSelector`]s. Each link
//! records how it relates to the link before it, so `div > p` is the chain
//! `[div, (DirectChild) p]` and the last link is the subject: the element a
//! match returns.
//!
//! Selectors come from two front ends sharing this model: CSS syntax
//! ([Selectors Level 4](https://www.w3.org/TR/selectors-4/)) and a small
//! `/`-delimited path syntax. See [`compile`].

mod compile;
mod path;

use std::fmt;
use std::ops::Add;

use bitflags::bitflags;
use strum_macros::Display;

use crate::nth::NthMatch;

pub use compile::{Syntax, compile, compile_list};

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
///
/// How a link of the chain relates to the link before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum Relation {
    /// `A B`: some ancestor matches the previous link.
    #[default]
    Descendant,
    /// `A > B`: the parent matches the previous link.
    DirectChild,
    /// `A + B`: the immediately preceding element sibling matches.
    DirectAdjacent,
    /// `A ~ B`: some preceding element sibling matches.
    IndirectAdjacent,
}

impl Relation {
    /// The combinator as written in CSS.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Descendant => " ",
            Self::DirectChild => ">",
            Self::DirectAdjacent => "+",
            Self::IndirectAdjacent => "~",
        }
    }
}

bitflags! {
    /// Element-level conditions of a simple selector.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ElementMatch: u8 {
        /// `*`, or no type selector at all.
        const UNIVERSAL = 1;
        /// `:root`, or a leading `/` in path syntax.
        const ROOT = 1 << 1;
        /// `:empty`.
        const EMPTY = 1 << 2;
        /// Position among element siblings, see [`SimpleSelector::nth_child`].
        const NTH_CHILD = 1 << 3;
        /// Position among same-tag siblings, see [`SimpleSelector::nth_type`].
        const NTH_TYPE = 1 << 4;
    }
}

/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum AttributeMatch {
    /// `[att]`: present, whatever the value.
    Any,
    /// `[att=val]`
    Exact,
    /// `[att~=val]` and `.class`: one of the whitespace-separated words.
    SpaceList,
    /// `[att|=val]`: exactly `val`, or `val` followed by `-`.
    HyphenList,
    /// `[att^=val]`
    Begin,
    /// `[att$=val]`
    End,
    /// `[att*=val]`
    Contains,
    /// `[att!=val]`: absent, or anything but `val`.
    NotEqual,
    /// `#id`
    Id,
}

/// One attribute condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributePredicate {
    /// How the value is compared.
    pub kind: AttributeMatch,
    /// Attribute name, lowercased.
    pub name: String,
    /// The value to compare with; `None` for [`AttributeMatch::Any`].
    pub value: Option<String>,
}

impl AttributePredicate {
    /// Build a predicate.
    #[must_use]
    pub fn new(kind: AttributeMatch, name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            kind,
            name: name.into().to_ascii_lowercase(),
            value,
        }
    }
}

/// A condition on an element's text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TextMatch {
    /// `:contains(s)`: the concatenated descendant text contains `s`.
    Contains(String),
}

/// [§ 3.6 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
/// and pseudo-elements that are neither structural nor textual.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Pseudo {
    /// `:link`
    Link,
    /// `:visited`
    Visited,
    /// `:hover`
    Hover,
    /// `:focus`
    Focus,
    /// `:active`
    Active,
    /// `:target`
    Target,
    /// `:enabled`
    Enabled,
    /// `:disabled`
    Disabled,
    /// `:checked`
    Checked,
    /// `:indeterminate`
    Indeterminate,
    /// `::first-line`
    FirstLine,
    /// `::first-letter`
    FirstLetter,
    /// `::selection`
    Selection,
    /// `::before`
    Before,
    /// `::after`
    After,
    /// `:not(x)`
    Not(Box<Selector>),
}

impl Pseudo {
    /// Whether this names a pseudo-element rather than a condition.
    #[must_use]
    pub const fn is_element(&self) -> bool {
        matches!(
            self,
            Self::FirstLine | Self::FirstLetter | Self::Selection | Self::Before | Self::After
        )
    }
}

/// [§ 17 Calculating Specificity](https://www.w3.org/TR/selectors-4/#specificity-rules)
/// "A selector's specificity is calculated for a given element as follows:
///  - count the number of ID selectors in the selector (= A)
///  - count the number of class selectors, attributes selectors, and pseudo-classes in the selector (= B)
///  - count the number of type selectors and pseudo-elements in the selector (= C)"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specificity(pub u32, pub u32, pub u32);

impl Specificity {
    /// One ID selector.
    pub const ID: Self = Self(1, 0, 0);
    /// One class, attribute or pseudo-class selector.
    pub const CLASS: Self = Self(0, 1, 0);
    /// One type selector or pseudo-element.
    pub const TYPE: Self = Self(0, 0, 1);

    /// Create a new specificity with (A, B, C) components.
    #[must_use]
    pub const fn new(a: u32, b: u32, c: u32) -> Self {
        Self(a, b, c)
    }

    /// The scalar weight `A * 1_000_000 + B * 1_000 + C`.
    #[must_use]
    pub const fn weight(self) -> u64 {
        self.0 as u64 * 1_000_000 + self.1 as u64 * 1_000 + self.2 as u64
    }
}

impl Add for Specificity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0, self.1 + rhs.1, self.2 + rhs.2)
    }
}

impl fmt::Display for Specificity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.0, self.1, self.2)
    }
}

/// One link of a selector chain: a compound selector plus its relation to
/// the previous link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SimpleSelector {
    /// Relation to the previous link; ignored on the first.
    pub relation: Relation,
    /// Required tag name, lowercased. `None` when universal.
    pub tag: Option<String>,
    /// Element-level conditions.
    pub element_match: ElementMatch,
    /// Attribute conditions, all of which must hold.
    pub attributes: Vec<AttributePredicate>,
    /// Text condition.
    pub text_match: Option<TextMatch>,
    /// Position predicates among element siblings, all of which must hold.
    /// Only consulted with [`ElementMatch::NTH_CHILD`].
    pub nth_child: Vec<NthMatch>,
    /// Position predicates among same-tag siblings, all of which must hold.
    /// Only consulted with [`ElementMatch::NTH_TYPE`].
    pub nth_type: Vec<NthMatch>,
    /// Other pseudo-classes and pseudo-elements.
    pub pseudo: Vec<Pseudo>,
    /// Specificity of the chain up to and including this link.
    pub specificity: Specificity,
}

impl SimpleSelector {
    /// Add an element-sibling position predicate.
    pub fn push_nth_child(&mut self, nth: NthMatch) {
        self.element_match |= ElementMatch::NTH_CHILD;
        self.nth_child.push(nth);
    }

    /// Add a same-tag-sibling position predicate.
    pub fn push_nth_type(&mut self, nth: NthMatch) {
        self.element_match |= ElementMatch::NTH_TYPE;
        self.nth_type.push(nth);
    }
}

/// A compiled selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    /// The links, leftmost first. Never empty.
    pub chain: Vec<SimpleSelector>,
    /// The source text the selector was compiled from.
    pub text: String,
}

impl Selector {
    /// The link that matched elements are returned for.
    #[must_use]
    pub fn subject(&self) -> Option<&SimpleSelector> {
        self.chain.last()
    }

    /// The [`Specificity`] of the whole selector.
    #[must_use]
    pub fn specificity_parts(&self) -> Specificity {
        self.subject().map(|s| s.specificity).unwrap_or_default()
    }

    /// The scalar specificity, see [`Specificity::weight`].
    #[must_use]
    pub fn specificity(&self) -> u64 {
        self.specificity_parts().weight()
    }

    /// The pseudo-element of the subject, if any.
    #[must_use]
    pub fn pseudo_element(&self) -> Option<&Pseudo> {
        self.subject()?.pseudo.iter().find(|p| p.is_element())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Free-function form of [`Selector::specificity`].
#[must_use]
pub fn specificity(selector: &Selector) -> u64 {
    selector.specificity()
}
