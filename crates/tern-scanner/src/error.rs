//! Scanning problems.
//!
//! The scanners never fail: every problem is reported in-band as a
//! [`TokenKind::Garbage`](crate::TokenKind::Garbage),
//! [`TokenKind::Incomplete`](crate::TokenKind::Incomplete) or
//! [`TokenKind::Error`](crate::TokenKind::Error) token. [`ScanError`] is the
//! typed form of those tokens for callers that want to stop at the first one.

use thiserror::Error;

/// A problem found while scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScanError {
    /// A byte that starts no known token.
    #[error("unrecognized input at byte {offset}")]
    Garbage {
        /// Offset of the offending byte.
        offset: usize,
    },
    /// The buffer ends inside a token; more input may complete it.
    #[error("input ends inside a token starting at byte {offset}")]
    Incomplete {
        /// Offset where the unfinished token starts.
        offset: usize,
    },
    /// A string, comment or tag that is never closed in a complete buffer.
    #[error("unterminated construct starting at byte {offset}")]
    Unterminated {
        /// Offset where the construct starts.
        offset: usize,
    },
}

impl ScanError {
    /// Byte offset the problem was found at.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::Garbage { offset } | Self::Incomplete { offset } | Self::Unterminated { offset } => {
                *offset
            }
        }
    }

    /// Whether supplying more input could make the problem go away.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Incomplete { .. })
    }
}
