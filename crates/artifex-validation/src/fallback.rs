//! Guaranteed-valid fallback skeleton

/// Minimal flowchart used when neither generation nor repair produced
/// valid source
pub const FALLBACK_SKELETON: &str = "flowchart TD\n    A[Start] --> B[Process]\n    B --> C[End]";

/// Fallback source for strict mode
#[inline]
#[must_use]
pub fn fallback() -> String {
    FALLBACK_SKELETON.to_string()
}
