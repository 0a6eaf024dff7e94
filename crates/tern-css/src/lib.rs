//! Selector compilation and matching for the tern engine.
//!
//! # Scope
//!
//! This crate implements:
//! - **Selectors** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/))
//!   - Type, universal, id, class and attribute selectors, including the
//!     `^=`, `$=`, `*=`, `|=`, `~=` and `!=` operators
//!   - Combinators: descendant, child, next-sibling, subsequent-sibling
//!   - Structural pseudo-classes (`:root`, `:empty`, `:nth-*`, `:first-*`,
//!     `:last-*`, `:only-*`), `:not()`, `:contains()`, the link, state and
//!     form pseudo-classes, and pseudo-elements
//!   - Specificity
//! - **Path selectors**: `/`-delimited steps with `[@attr]` and position
//!   predicates, compiled into the same model
//! - **`An+B` indices** ([`nth`])
//! - **Matching** ([`matcher`]) against any tree implementing
//!   [`tern_dom::TreeNode`]
//! - **Style sheets** ([`parser`]): splitting rules and declarations with
//!   error recovery
//!
//! # Not Implemented
//!
//! - `:is()`, `:where()`, `:has()`, `:lang()`, `:dir()` and other
//!   pseudo-classes needing more than a static tree
//!   ([`CompileError::UnsupportedPseudo`])
//! - Namespaces
//! - At-rule contents

/// Selector compilation errors.
pub mod error;
/// Tree matching.
pub mod matcher;
/// `An+B` parsing and evaluation.
pub mod nth;
/// Style sheet splitting with recovery.
pub mod parser;
/// The compiled selector model and its compilers.
pub mod selector;

pub use error::CompileError;
pub use matcher::{matches, select, select_first};
pub use nth::{NthMatch, evaluate, parse_nth};
pub use selector::{
    AttributeMatch, AttributePredicate, ElementMatch, Pseudo, Relation, Selector, SimpleSelector,
    Specificity, Syntax, TextMatch, compile, compile_list, specificity,
};
