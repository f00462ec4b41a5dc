//! Error types for the generation engine
//!
//! Only two kinds are fatal: an unknown capability or sub-type (per
//! request) and a misconfigured registry (at bootstrap). Invalid generated
//! source is never an error; it is reported through the validation status.

use artifex_registry::RegistryError;

/// Main engine error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArtifexError {
    /// No handler registered for the requested capability or sub-type
    #[error("unknown {tier} type: '{key}'")]
    UnknownType {
        /// Dispatch tier (`capability`, `diagram`, `workflow`)
        tier: &'static str,
        /// Requested key after alias normalization
        key: String,
    },

    /// Duplicate or missing handler registration
    #[error("registry misconfiguration: {0}")]
    RegistryMisconfiguration(String),

    /// Request cannot be served as given
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),

    /// Capability handler failed to produce its artifact
    #[error("{capability} capability failed: {message}")]
    Capability {
        /// Capability key
        capability: String,
        /// Failure description
        message: String,
    },
}

impl ArtifexError {
    /// Whether the error aborts the request (or startup) outright
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnknownType { .. } | Self::RegistryMisconfiguration(_)
        )
    }

    /// Capability failure
    pub fn capability(capability: impl Into<String>, message: impl ToString) -> Self {
        Self::Capability {
            capability: capability.into(),
            message: message.to_string(),
        }
    }
}

impl From<RegistryError> for ArtifexError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownType { kind, key } => Self::UnknownType { tier: kind, key },
            dup @ RegistryError::DuplicateKey { .. } => {
                Self::RegistryMisconfiguration(dup.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_errors_map_to_taxonomy() {
        let unknown: ArtifexError = RegistryError::UnknownType {
            kind: "diagram",
            key: "sankey".to_string(),
        }
        .into();
        assert_eq!(unknown.to_string(), "unknown diagram type: 'sankey'");
        assert!(unknown.is_fatal());

        let duplicate: ArtifexError = RegistryError::DuplicateKey {
            kind: "capability",
            key: "diagram".to_string(),
        }
        .into();
        assert!(matches!(duplicate, ArtifexError::RegistryMisconfiguration(_)));
        assert!(duplicate.is_fatal());
    }

    #[test]
    fn capability_failures_are_not_fatal() {
        let err = ArtifexError::capability("workflow", "yaml encoding failed");
        assert_eq!(err.to_string(), "workflow capability failed: yaml encoding failed");
        assert!(!err.is_fatal());
        assert!(!ArtifexError::Config("bad".to_string()).is_fatal());
    }
}
