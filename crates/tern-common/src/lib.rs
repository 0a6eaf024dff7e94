//! Common utilities for the tern crates.
//!
//! - **Warning System** - deduplicated, colored terminal output for markup the
//!   tree builder had to repair and selectors the compiler refuses

pub mod warning;
