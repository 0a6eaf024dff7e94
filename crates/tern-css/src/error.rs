//! Selector compilation errors.

use thiserror::Error;

/// Why a selector could not be compiled.
///
/// Compilation is all-or-nothing: no partial selector is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Malformed selector text: unbalanced brackets, an unknown pseudo-class,
    /// a predicate with no attribute name and the like.
    #[error("selector syntax error at byte {offset}: {message}")]
    Syntax {
        /// Byte offset into the selector text.
        offset: usize,
        /// What was wrong.
        message: String,
    },
    /// A pseudo-class that is recognized but cannot be evaluated.
    #[error("unsupported pseudo-class `:{name}` at byte {offset}")]
    UnsupportedPseudo {
        /// Byte offset into the selector text.
        offset: usize,
        /// The pseudo-class name, lowercased.
        name: String,
    },
}

impl CompileError {
    pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            offset,
            message: message.into(),
        }
    }

    /// Byte offset into the selector text.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::Syntax { offset, .. } | Self::UnsupportedPseudo { offset, .. } => *offset,
        }
    }

    /// Shift the offset of an error found in a substring starting at `base`.
    #[must_use]
    pub(crate) fn rebased(mut self, base: usize) -> Self {
        match &mut self {
            Self::Syntax { offset, .. } | Self::UnsupportedPseudo { offset, .. } => *offset += base,
        }
        self
    }
}
