//! Evaluating compiled selectors against a tree.
//!
//! [§ 4.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
//!
//! Every element of the subtree is tested against the subject link first.
//! Only when the subject matches is the chain verified leftward, following
//! each link's [`Relation`] to the parent, an ancestor, or a preceding
//! sibling. A failed branch backtracks to the next candidate, so `a b c`
//! finds a match even when the nearest `b` ancestor has no `a` above it.
//! The outcome of each (chain prefix, node) pair is remembered for the rest
//! of the call, so backtracking never re-walks a branch.
//!
//! The matcher only reads the tree through [`TreeNode`] and never fails:
//! no match is an empty result.

use std::collections::HashMap;
use std::iter;

use tern_dom::{NodeKind, TreeNode};
use tracing::debug;

use crate::selector::{
    AttributeMatch, AttributePredicate, ElementMatch, Pseudo, Relation, Selector, SimpleSelector,
    TextMatch,
};

/// Elements of `root`'s subtree (inclusive) matching `selector`, in document
/// order.
///
/// ```
/// use tern_css::{Syntax, compile, select};
/// use tern_dom::{DomTree, ElementData, NodeId, NodeRef};
///
/// let mut tree = DomTree::new();
/// let div = tree.append_element(NodeId::ROOT, ElementData::new("div"));
/// let p = tree.append_element(div, ElementData::new("p"));
///
/// let selector = compile("div > p", Syntax::Css).unwrap();
/// let found = select(&selector, tree.root_node());
/// assert_eq!(found, vec![NodeRef::new(&tree, p)]);
/// ```
#[must_use]
pub fn select<N: TreeNode>(selector: &Selector, root: N) -> Vec<N> {
    let mut memo = ChainMemo::default();
    let found: Vec<N> = preorder(root)
        .filter(|&node| memo.matches(selector, node))
        .collect();
    debug!(
        selector = %selector,
        matched = found.len(),
        probed = memo.seen.len(),
        "select"
    );
    found
}

/// The first element in document order matching `selector`.
#[must_use]
pub fn select_first<N: TreeNode>(selector: &Selector, root: N) -> Option<N> {
    let mut memo = ChainMemo::default();
    preorder(root).find(|&node| memo.matches(selector, node))
}

/// Whether `node` is an element matching the whole chain of `selector`.
#[must_use]
pub fn matches<N: TreeNode>(selector: &Selector, node: N) -> bool {
    ChainMemo::default().matches(selector, node)
}

/// Depth-first pre-order walk; children are pushed in reverse so the stack
/// pops them in document order.
fn preorder<N: TreeNode>(root: N) -> impl Iterator<Item = N> {
    let mut stack = vec![root];
    iter::from_fn(move || {
        let node = stack.pop()?;
        let children: Vec<N> = node.children().collect();
        stack.extend(children.into_iter().rev());
        Some(node)
    })
}

/// Results of matching a chain prefix at a node, for one selector.
///
/// Keys are the prefix length and the node. Every candidate of a `select()`
/// call shares the memo, so each (prefix, node) pair is evaluated at most
/// once however many descendants reach it through `Descendant` or
/// `IndirectAdjacent` links.
struct ChainMemo<N> {
    seen: HashMap<(usize, N), bool>,
}

impl<N> Default for ChainMemo<N> {
    fn default() -> Self {
        Self {
            seen: HashMap::new(),
        }
    }
}

impl<N: TreeNode> ChainMemo<N> {
    fn matches(&mut self, selector: &Selector, node: N) -> bool {
        !selector.chain.is_empty() && self.chain(&selector.chain, node)
    }

    /// Match the last link at `node`, then the rest of the chain through the
    /// last link's relation.
    fn chain(&mut self, chain: &[SimpleSelector], node: N) -> bool {
        let Some((link, rest)) = chain.split_last() else {
            return true;
        };
        let key = (chain.len(), node);
        if let Some(&known) = self.seen.get(&key) {
            return known;
        }

        let matched = simple_matches(link, node)
            && (rest.is_empty()
                || match link.relation {
                    Relation::DirectChild => node.parent().is_some_and(|p| self.chain(rest, p)),
                    Relation::Descendant => {
                        iter::successors(node.parent(), N::parent).any(|a| self.chain(rest, a))
                    }
                    Relation::DirectAdjacent => node
                        .preceding_siblings()
                        .find(N::is_element)
                        .is_some_and(|s| self.chain(rest, s)),
                    Relation::IndirectAdjacent => node
                        .preceding_siblings()
                        .filter(N::is_element)
                        .any(|s| self.chain(rest, s)),
                });
        let _ = self.seen.insert(key, matched);
        matched
    }
}

/// All conditions of one link, without regard to the rest of the chain.
fn simple_matches<N: TreeNode>(link: &SimpleSelector, node: N) -> bool {
    if !node.is_element() {
        return false;
    }
    let tag_ok = link
        .tag
        .as_deref()
        .is_none_or(|tag| node.tag_name().is_some_and(|t| t.eq_ignore_ascii_case(tag)));
    if !tag_ok {
        return false;
    }

    let flags = link.element_match;
    if flags.contains(ElementMatch::ROOT) && !is_root(node) {
        return false;
    }
    if flags.contains(ElementMatch::EMPTY) && !is_empty(node) {
        return false;
    }
    if !link.attributes.iter().all(|a| attribute_matches(a, node)) {
        return false;
    }
    let text_ok = match &link.text_match {
        Some(TextMatch::Contains(needle)) => node.text_content().contains(needle.as_str()),
        None => true,
    };
    if !text_ok {
        return false;
    }
    if flags.contains(ElementMatch::NTH_CHILD) {
        let (position, count) = sibling_position(node, false);
        if !link.nth_child.iter().all(|nth| nth.matches(position, count)) {
            return false;
        }
    }
    if flags.contains(ElementMatch::NTH_TYPE) {
        let (position, count) = sibling_position(node, true);
        if !link.nth_type.iter().all(|nth| nth.matches(position, count)) {
            return false;
        }
    }
    link.pseudo.iter().all(|p| pseudo_matches(p, node))
}

/// [§ 14.1 `:root`](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
fn is_root<N: TreeNode>(node: N) -> bool {
    node.parent()
        .is_none_or(|p| p.node_type() == NodeKind::Root)
}

/// [§ 14.2 `:empty`](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
/// Comments do not count as content.
fn is_empty<N: TreeNode>(node: N) -> bool {
    !node.children().any(|c| {
        matches!(
            c.node_type(),
            NodeKind::Element | NodeKind::Text | NodeKind::CData
        )
    })
}

/// The 1-based position of `node` among its element siblings, or only among
/// those sharing its tag, and the size of that sibling set. A node without a
/// parent is alone.
fn sibling_position<N: TreeNode>(node: N, same_type: bool) -> (usize, usize) {
    let Some(parent) = node.parent() else {
        return (1, 1);
    };
    let tag = node.tag_name();
    let counts = |sibling: &N| {
        sibling.is_element()
            && (!same_type
                || sibling
                    .tag_name()
                    .zip(tag)
                    .is_some_and(|(a, b)| a.eq_ignore_ascii_case(b)))
    };
    let position = 1 + node.preceding_siblings().filter(counts).count();
    let count = parent.children().filter(counts).count();
    (position, count)
}

fn attribute_matches<N: TreeNode>(predicate: &AttributePredicate, node: N) -> bool {
    let expected = predicate.value.as_deref().unwrap_or_default();
    match (predicate.kind, node.get_attribute(&predicate.name)) {
        (AttributeMatch::NotEqual, None) => true,
        (_, None) => false,
        (kind, Some(actual)) => value_matches(kind, actual, expected),
    }
}

/// [§ 6.1 Attribute presence and value selectors](https://www.w3.org/TR/selectors-4/#attribute-representation)
/// [§ 6.2 Substring matching attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-substrings)
/// "If "val" is the empty string then the selector does not represent anything."
fn value_matches(kind: AttributeMatch, actual: &str, expected: &str) -> bool {
    match kind {
        AttributeMatch::Any => true,
        AttributeMatch::Exact | AttributeMatch::Id => actual == expected,
        AttributeMatch::NotEqual => actual != expected,
        AttributeMatch::SpaceList => actual.split_ascii_whitespace().any(|w| w == expected),
        AttributeMatch::HyphenList => {
            actual == expected
                || actual
                    .strip_prefix(expected)
                    .is_some_and(|rest| rest.starts_with('-'))
        }
        AttributeMatch::Begin => !expected.is_empty() && actual.starts_with(expected),
        AttributeMatch::End => !expected.is_empty() && actual.ends_with(expected),
        AttributeMatch::Contains => !expected.is_empty() && actual.contains(expected),
    }
}

const FORM_CONTROLS: &[&str] = &[
    "input", "button", "select", "textarea", "option", "optgroup", "fieldset",
];

fn tag_is<N: TreeNode>(node: N, names: &[&str]) -> bool {
    node.tag_name()
        .is_some_and(|tag| names.iter().any(|n| tag.eq_ignore_ascii_case(n)))
}

fn pseudo_matches<N: TreeNode>(pseudo: &Pseudo, node: N) -> bool {
    match pseudo {
        // [§ 8.2 The link pseudo-class](https://www.w3.org/TR/selectors-4/#link)
        Pseudo::Link => {
            tag_is(node, &["a", "area", "link"]) && node.get_attribute("href").is_some()
        }
        // No history, pointer or focus on a static tree.
        Pseudo::Visited
        | Pseudo::Hover
        | Pseudo::Focus
        | Pseudo::Active
        | Pseudo::Target
        | Pseudo::Indeterminate => false,
        Pseudo::Enabled => {
            tag_is(node, FORM_CONTROLS) && node.get_attribute("disabled").is_none()
        }
        Pseudo::Disabled => {
            tag_is(node, FORM_CONTROLS) && node.get_attribute("disabled").is_some()
        }
        Pseudo::Checked => {
            (tag_is(node, &["input"]) && node.get_attribute("checked").is_some())
                || (tag_is(node, &["option"]) && node.get_attribute("selected").is_some())
        }
        // Pseudo-elements style part of an element; they do not filter.
        Pseudo::FirstLine
        | Pseudo::FirstLetter
        | Pseudo::Selection
        | Pseudo::Before
        | Pseudo::After => true,
        // [§ 4.3 The Negation Pseudo-class](https://www.w3.org/TR/selectors-4/#negation)
        Pseudo::Not(inner) => !matches(inner, node),
    }
}
