//! `an+b` indices for the structural pseudo-classes.
//!
//! [§ 14.1 `An+B` notation](https://www.w3.org/TR/selectors-4/#anb-microsyntax)
//! "The An+B notation defines an integer step (A) and offset (B), and
//! represents the An+Bth elements in a list, for every positive integer or
//! zero value of n."

use crate::error::CompileError;

/// A compiled `an+b` predicate over 1-based sibling positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NthMatch {
    /// `a`; zero means an exact position.
    pub step: isize,
    /// `b`.
    pub index: isize,
    /// Count positions from the last sibling instead of the first.
    pub from_end: bool,
}

impl NthMatch {
    /// `:first-child`, `:first-of-type`.
    pub const FIRST: Self = Self::new(0, 1);
    /// `:last-child`, `:last-of-type`.
    pub const LAST: Self = Self::new(0, 1).from_end();

    /// Counted from the first sibling.
    #[must_use]
    pub const fn new(step: isize, index: isize) -> Self {
        Self {
            step,
            index,
            from_end: false,
        }
    }

    /// The same predicate counted from the last sibling.
    #[must_use]
    pub const fn from_end(mut self) -> Self {
        self.from_end = true;
        self
    }

    /// See [`evaluate`].
    #[must_use]
    pub const fn matches(&self, position: usize, count: usize) -> bool {
        evaluate(*self, position, count)
    }
}

/// Parse the argument of `:nth-child()` and friends.
///
/// Accepts `odd`, `even`, `b`, `an+b`, `an-b`, `n`, `-n+b`, and two
/// from-the-end shorthands: `-b` (the `b`-th from the end) and `-0n+b` (the
/// last `b`). Whitespace is ignored and keywords are case-insensitive.
///
/// ```
/// use tern_css::nth::{NthMatch, parse_nth};
///
/// assert_eq!(parse_nth("odd").unwrap(), NthMatch::new(2, 1));
/// assert_eq!(parse_nth("-n + 3").unwrap(), NthMatch::new(-1, 3));
/// ```
///
/// # Errors
/// [`CompileError::Syntax`] with an offset relative to `expr` when the
/// expression is empty or malformed.
pub fn parse_nth(expr: &str) -> Result<NthMatch, CompileError> {
    let compact: String = expr
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let invalid = || CompileError::syntax(0, format!("invalid nth expression `{}`", expr.trim()));

    match compact.as_str() {
        "" => Err(CompileError::syntax(0, "empty nth expression")),
        "odd" => Ok(NthMatch::new(2, 1)),
        "even" => Ok(NthMatch::new(2, 0)),
        _ => match compact.split_once('n') {
            Some(("-0", b)) => {
                let index = parse_offset(b).ok_or_else(invalid)?;
                Ok(NthMatch::new(-1, index).from_end())
            }
            Some((a, b)) => {
                let step = match a {
                    "" | "+" => 1,
                    "-" => -1,
                    _ => a.parse().map_err(|_| invalid())?,
                };
                let index = parse_offset(b).ok_or_else(invalid)?;
                Ok(NthMatch::new(step, index))
            }
            None => {
                let index: isize = compact.parse().map_err(|_| invalid())?;
                if index < 0 {
                    let index = index.checked_neg().ok_or_else(invalid)?;
                    Ok(NthMatch::new(0, index).from_end())
                } else {
                    Ok(NthMatch::new(0, index))
                }
            }
        },
    }
}

/// The `+b`/`-b` after the `n`, absent meaning zero.
fn parse_offset(b: &str) -> Option<isize> {
    if b.is_empty() {
        return Some(0);
    }
    if !b.starts_with(['+', '-']) {
        return None;
    }
    b.parse().ok()
}

/// Whether the 1-based `position` among `count` siblings satisfies `nth`.
///
/// With a zero step the position must equal the index, and an index of zero
/// or less never matches. Otherwise the position must be `step * k + index`
/// for some `k >= 0`. Arithmetic is done in `i128`, so no step or index
/// can overflow it.
#[must_use]
pub const fn evaluate(nth: NthMatch, position: usize, count: usize) -> bool {
    let p = if nth.from_end {
        count as i128 - position as i128 + 1
    } else {
        position as i128
    };
    let (step, index) = (nth.step as i128, nth.index as i128);
    if step == 0 {
        return index > 0 && p == index;
    }
    let diff = p - index;
    diff % step == 0 && diff / step >= 0
}
