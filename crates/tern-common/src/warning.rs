//! Deduplicated warnings with colored terminal output.
//!
//! The scanner, selector compiler and tree builder report recoveries here so
//! that a page full of the same broken tag prints a single line.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings already printed, keyed by `[component] message`.
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

fn warned() -> MutexGuard<'static, Option<HashSet<String>>> {
    // A panic while holding the lock leaves a usable set behind.
    WARNED.lock().unwrap_or_else(PoisonError::into_inner)
}

fn key(component: &str, message: &str) -> String {
    format!("[{component}] {message}")
}

/// Warn about something that was recovered from (prints once per unique message).
///
/// Returns `true` when the warning was printed, `false` when it was a repeat.
///
/// # Example
/// ```
/// use tern_common::warning::warn_once;
///
/// assert!(warn_once("doc-example", "unmatched end tag </b>"));
/// assert!(!warn_once("doc-example", "unmatched end tag </b>"));
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let should_print = warned()
        .get_or_insert_with(HashSet::new)
        .insert(key(component, message));

    if should_print {
        eprintln!("{}", format!("[tern {component}] ⚠ {message}").yellow());
    }
    should_print
}

/// Whether `message` has already been reported for `component`.
#[must_use]
pub fn has_warned(component: &str, message: &str) -> bool {
    warned()
        .as_ref()
        .is_some_and(|set| set.contains(&key(component, message)))
}

/// Forget all recorded warnings (call before processing a new document).
pub fn clear_warnings() {
    if let Some(set) = warned().as_mut() {
        set.clear();
    }
}
