//! Generated artifacts and the per-call capability context

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Pure output value produced by a capability
///
/// The engine keeps no reference to an artifact once it is returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Capability that produced it (`diagram`, `workflow`, ...)
    pub capability: String,
    /// Stable path-like identifier, e.g. `.github/workflows/deploy.yml`
    pub name: String,
    /// Rendered content
    pub content: String,
}

impl Artifact {
    /// Create artifact
    #[inline]
    #[must_use]
    pub fn new(
        capability: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            capability: capability.into(),
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Explicit hints supplied by the caller (`workflowType`, `diagramType`, ...)
///
/// Hints take priority over anything inferred from the domain result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HintBag(Map<String, Value>);

impl HintBag {
    /// Empty hint bag
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Add a hint
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Raw hint value
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Non-blank string hint, trimmed
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Boolean hint
    #[inline]
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// Number of hints
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no hints
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for HintBag {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Per-call bundle handed to a capability handler
///
/// Everything is borrowed: handlers mine these inputs for hints and never
/// mutate them.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityContext<'a> {
    /// Opaque structured result from the caller's business logic
    pub domain_result: &'a Value,
    /// Explicit hints
    pub metadata: Option<&'a HintBag>,
    /// Caller's domain classification
    pub domain_type: Option<&'a str>,
    /// Previously produced document
    pub primary_document: Option<&'a str>,
}

impl<'a> CapabilityContext<'a> {
    /// Context with only a domain result
    #[inline]
    #[must_use]
    pub fn new(domain_result: &'a Value) -> Self {
        Self {
            domain_result,
            metadata: None,
            domain_type: None,
            primary_document: None,
        }
    }

    /// With hints
    #[inline]
    #[must_use]
    pub fn with_metadata(mut self, metadata: Option<&'a HintBag>) -> Self {
        self.metadata = metadata;
        self
    }

    /// With domain type
    #[inline]
    #[must_use]
    pub fn with_domain_type(mut self, domain_type: Option<&'a str>) -> Self {
        self.domain_type = domain_type;
        self
    }

    /// With primary document
    #[inline]
    #[must_use]
    pub fn with_primary_document(mut self, document: Option<&'a str>) -> Self {
        self.primary_document = document;
        self
    }

    /// String hint from metadata
    #[inline]
    #[must_use]
    pub fn hint(&self, key: &str) -> Option<&'a str> {
        self.metadata.and_then(|m| m.get_str(key))
    }

    /// Non-blank top-level string field of the domain result
    #[must_use]
    pub fn domain_str(&self, key: &str) -> Option<&'a str> {
        self.domain_result
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
