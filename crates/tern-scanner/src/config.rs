//! Scanner configuration.

/// Options controlling how a [`Scanner`](crate::Scanner) treats the buffer.
///
/// ```
/// use tern_scanner::ScannerConfig;
///
/// let config = ScannerConfig::default().partial(true).count_lines(true);
/// assert!(config.partial && config.count_lines && !config.detect_errors);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScannerConfig {
    /// The buffer is a prefix of a longer stream. A token that runs into the
    /// end of the buffer is reported as `Incomplete` and scanning stops.
    pub partial: bool,
    /// In a complete buffer, report unterminated strings, comments and tags
    /// as `Error` tokens instead of recovering.
    pub detect_errors: bool,
    /// Annotate tokens with 1-based line numbers.
    pub count_lines: bool,
}

impl ScannerConfig {
    /// Set [`ScannerConfig::partial`].
    #[must_use]
    pub const fn partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }

    /// Set [`ScannerConfig::detect_errors`].
    #[must_use]
    pub const fn detect_errors(mut self, detect_errors: bool) -> Self {
        self.detect_errors = detect_errors;
        self
    }

    /// Set [`ScannerConfig::count_lines`].
    #[must_use]
    pub const fn count_lines(mut self, count_lines: bool) -> Self {
        self.count_lines = count_lines;
        self
    }
}
