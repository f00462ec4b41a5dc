//! Validation outcome value

use serde::{Deserialize, Serialize};

const UNKNOWN_ERROR: &str = "unknown validation error";

/// Result of checking generated source against its grammar
///
/// # Invariants
/// - `valid == false` implies a non-empty `error`
/// - `skipped == true` implies `valid == true`
///
/// Construct through [`ValidationResult::valid`], [`ValidationResult::skipped`]
/// and [`ValidationResult::invalid`] to keep both invariants. Deserialization
/// rejects payloads that break them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawValidationResult")]
pub struct ValidationResult {
    valid: bool,
    error: Option<String>,
    skipped: bool,
}

/// Wire shape before the invariants are checked
#[derive(Deserialize)]
struct RawValidationResult {
    valid: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    skipped: bool,
}

/// Deserialized validation result violating its invariants
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidValidationResult {
    /// `skipped` set on a failed check
    #[error("a skipped validation result must be valid")]
    SkippedButInvalid,
    /// Failed check without a message
    #[error("an invalid validation result must carry a non-empty error")]
    MissingError,
}

impl TryFrom<RawValidationResult> for ValidationResult {
    type Error = InvalidValidationResult;

    fn try_from(raw: RawValidationResult) -> Result<Self, Self::Error> {
        if raw.valid {
            return Ok(Self {
                valid: true,
                error: None,
                skipped: raw.skipped,
            });
        }
        if raw.skipped {
            return Err(InvalidValidationResult::SkippedButInvalid);
        }
        match raw.error {
            Some(error) if !error.trim().is_empty() => Ok(Self::invalid(error)),
            _ => Err(InvalidValidationResult::MissingError),
        }
    }
}

impl ValidationResult {
    /// Grammar check passed
    #[inline]
    #[must_use]
    pub fn valid() -> Self {
        Self {
            valid: true,
            error: None,
            skipped: false,
        }
    }

    /// Checker unavailable; treated as success
    #[inline]
    #[must_use]
    pub fn skipped() -> Self {
        Self {
            valid: true,
            error: None,
            skipped: true,
        }
    }

    /// Grammar violation with message
    #[must_use]
    pub fn invalid(error: impl Into<String>) -> Self {
        let error = error.into();
        let error = if error.trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            error
        };
        Self {
            valid: false,
            error: Some(error),
            skipped: false,
        }
    }

    /// Whether the source is (or is assumed) valid
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether the check was skipped
    #[inline]
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    /// Error message for invalid results
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skipped_is_valid() {
        let r = ValidationResult::skipped();
        assert!(r.is_valid());
        assert!(r.is_skipped());
        assert!(r.error().is_none());
    }

    #[test]
    fn invalid_never_has_empty_error() {
        let r = ValidationResult::invalid("   ");
        assert!(!r.is_valid());
        assert_eq!(r.error(), Some(UNKNOWN_ERROR));
    }

    #[test]
    fn deserialize_rejects_skipped_failure() {
        let err = serde_json::from_str::<ValidationResult>(
            r#"{"valid":false,"skipped":true,"error":null}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("skipped validation result must be valid"));
    }

    #[test]
    fn deserialize_rejects_failure_without_error() {
        for payload in [r#"{"valid":false,"error":null}"#, r#"{"valid":false,"error":"  "}"#] {
            let err = serde_json::from_str::<ValidationResult>(payload).unwrap_err();
            assert!(err.to_string().contains("non-empty error"), "{payload}");
        }
    }

    #[test]
    fn deserialize_accepts_serialized_results() {
        for result in [
            ValidationResult::valid(),
            ValidationResult::skipped(),
            ValidationResult::invalid("Parse error on line 2"),
        ] {
            let json = serde_json::to_string(&result).unwrap();
            assert_eq!(serde_json::from_str::<ValidationResult>(&json).unwrap(), result);
        }
    }

    #[test]
    fn invalid_keeps_message() {
        let r = ValidationResult::invalid("Parse error on line 2");
        assert_eq!(r.error(), Some("Parse error on line 2"));
        assert!(!r.is_skipped());
    }
}
