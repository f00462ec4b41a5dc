//! Keyed handler registry
//!
//! Provides [`HandlerRegistry`], the map from canonical type key to handler
//! used at both dispatch tiers (capability and sub-type).

use crate::error::RegistryError;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Base contract for anything stored in a [`HandlerRegistry`]
pub trait Handler: Send + Sync {
    /// Whether this handler is relevant for the caller's domain type
    ///
    /// Default implementation accepts every domain type.
    fn supports(&self, domain_type: &str) -> bool {
        let _ = domain_type;
        true
    }
}

/// Registry of handlers keyed by canonical type
///
/// Built once at bootstrap, then shared read-only (typically behind an
/// `Arc`). Registration order is preserved for deterministic iteration.
///
/// # Invariants
/// - At most one handler per key; [`register`](Self::register) rejects duplicates
pub struct HandlerRegistry<H: ?Sized> {
    kind: &'static str,
    handlers: IndexMap<String, Arc<H>>,
}

impl<H: ?Sized + Handler> HandlerRegistry<H> {
    /// Create empty registry
    ///
    /// `kind` names the tier in error messages (e.g. `"capability"`).
    #[inline]
    #[must_use]
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            handlers: IndexMap::new(),
        }
    }

    /// Register a handler under `key`
    ///
    /// # Errors
    /// [`RegistryError::DuplicateKey`] if `key` is already registered
    pub fn register(&mut self, key: impl Into<String>, handler: Arc<H>) -> Result<(), RegistryError> {
        let key = key.into();
        if self.handlers.contains_key(&key) {
            return Err(RegistryError::DuplicateKey {
                kind: self.kind,
                key,
            });
        }
        tracing::debug!(kind = self.kind, key = %key, "registered handler");
        self.handlers.insert(key, handler);
        Ok(())
    }

    /// Look up the handler for `key`
    ///
    /// # Errors
    /// [`RegistryError::UnknownType`] if nothing is registered under `key`
    pub fn get(&self, key: &str) -> Result<&Arc<H>, RegistryError> {
        self.handlers
            .get(key)
            .ok_or_else(|| RegistryError::UnknownType {
                kind: self.kind,
                key: key.to_string(),
            })
    }

    /// Check if a handler exists for `key`
    #[inline]
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    /// Keys whose handler supports `domain_type`, in registration order
    #[must_use]
    pub fn supports(&self, domain_type: &str) -> Vec<&str> {
        self.handlers
            .iter()
            .filter(|(_, handler)| handler.supports(domain_type))
            .map(|(key, _)| key.as_str())
            .collect()
    }

    /// All registered keys, in registration order
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    /// Tier name used in errors
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Number of registered handlers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Iterate over `(key, handler)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<H>)> {
        self.handlers.iter().map(|(k, h)| (k.as_str(), h))
    }
}

impl<H: ?Sized> fmt::Debug for HandlerRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("kind", &self.kind)
            .field("keys", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
