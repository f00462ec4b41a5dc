//! Registry errors

/// Errors raised by [`HandlerRegistry`](crate::HandlerRegistry)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Second registration for an existing key (bootstrap misconfiguration)
    #[error("duplicate {kind} registration: '{key}'")]
    DuplicateKey {
        /// Registry tier
        kind: &'static str,
        /// Offending key
        key: String,
    },

    /// Lookup for a key with no handler
    #[error("unknown {kind} type: '{key}'")]
    UnknownType {
        /// Registry tier
        kind: &'static str,
        /// Requested key
        key: String,
    },
}

impl RegistryError {
    /// Key the error refers to
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::DuplicateKey { key, .. } | Self::UnknownType { key, .. } => key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_display() {
        let err = RegistryError::DuplicateKey {
            kind: "capability",
            key: "diagram".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate capability registration: 'diagram'");
        assert_eq!(err.key(), "diagram");
    }
}
