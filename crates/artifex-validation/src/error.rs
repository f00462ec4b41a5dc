//! Checker error classification

/// Substrings (lowercase) that mark a failure as "checker not available"
/// rather than a grammar violation.
const UNAVAILABLE_MARKERS: &[&str] = &[
    "cannot find module",
    "module not found",
    "could not load",
    "no such file or directory",
    "command not found",
    "enoent",
];

/// Failure reported while loading or running a grammar checker
///
/// Cloneable so a failed load can be cached and handed to every caller
/// that was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    /// Checker cannot be loaded or executed; validation degrades to a skip
    #[error("grammar checker unavailable: {0}")]
    Unavailable(String),

    /// Source violates the grammar
    #[error("{0}")]
    Syntax(String),
}

impl CheckError {
    /// Classify a raw failure message
    #[must_use]
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if UNAVAILABLE_MARKERS.iter().any(|m| lower.contains(m)) {
            Self::Unavailable(message.to_string())
        } else {
            Self::Syntax(message.to_string())
        }
    }

    /// Whether the checker itself is missing
    #[inline]
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// Underlying message
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Unavailable(msg) | Self::Syntax(msg) => msg,
        }
    }
}
