//! SGML/HTML tree building for the tern engine.
//!
//! # Scope
//!
//! This crate implements:
//! - **Tree builder** ([`parse_document`]): turns the token stream of
//!   [`tern_scanner`] into a [`tern_dom::DomTree`]
//!   - Start tags, attributes (quoted, unquoted and valueless), end tags and
//!     the anonymous `</>`
//!   - Self-closing tags and HTML void elements
//!   - Comments, CDATA sections and basic character references
//!   - Recovery from unterminated and mis-nested markup, recorded as
//!     [`ParseIssue`]s
//! - **Tree dumps** ([`print_tree`], [`format_tree`])
//!
//! # Not Implemented
//!
//! - HTML insertion modes and implied tags (`<p>` is not closed by a
//!   following `<div>`)
//! - The full named character reference table
//! - Doctype handling

mod builder;
mod entity;
mod print;

pub use builder::{ParseIssue, ParsedDocument, TreeBuilderConfig, parse, parse_document};
pub use print::{format_tree, print_tree};
