//! Alias normalization
//!
//! Rewrites legacy or alternate identifiers to canonical registry keys before
//! dispatch. Unknown names pass through untouched so the registry can report
//! them as unknown.

use std::collections::HashMap;

/// Alias tables for both dispatch tiers
///
/// Sub-type aliases are scoped per canonical capability, since the same
/// word may mean different things in different families.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    capabilities: HashMap<String, String>,
    sub_types: HashMap<String, HashMap<String, String>>,
}

impl Normalizer {
    /// Create normalizer with no aliases
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add capability aliases
    #[must_use]
    pub fn with_capability_aliases(mut self, aliases: &[(&str, &str)]) -> Self {
        for (alias, canonical) in aliases {
            self.capabilities
                .insert((*alias).to_string(), (*canonical).to_string());
        }
        self
    }

    /// Add sub-type aliases for a canonical capability
    #[must_use]
    pub fn with_sub_type_aliases(mut self, capability: &str, aliases: &[(&str, &str)]) -> Self {
        let table = self.sub_types.entry(capability.to_string()).or_default();
        for (alias, canonical) in aliases {
            table.insert((*alias).to_string(), (*canonical).to_string());
        }
        self
    }

    /// Canonical capability key
    #[must_use]
    pub fn capability<'a>(&'a self, name: &'a str) -> &'a str {
        let name = name.trim();
        self.capabilities.get(name).map_or(name, String::as_str)
    }

    /// Canonical sub-type key within `capability`
    ///
    /// `capability` may itself be an alias.
    #[must_use]
    pub fn sub_type<'a>(&'a self, capability: &str, name: &'a str) -> &'a str {
        let name = name.trim();
        self.sub_types
            .get(self.capability(capability))
            .and_then(|table| table.get(name))
            .map_or(name, String::as_str)
    }

    /// Whether `name` is a known capability alias
    #[inline]
    #[must_use]
    pub fn is_capability_alias(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }
}
