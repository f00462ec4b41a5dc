//! Artifact manager facade
//!
//! Entry point for collaborators: hand over a domain result and the
//! capabilities wanted, get back the artifacts that could be produced.

use crate::capability::CapabilityHandler;
use artifex_model::{Artifact, CapabilityContext, HintBag};
use artifex_registry::{Handler, HandlerRegistry, Normalizer};
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;

/// Batch artifact generation over the capability registry
///
/// # Invariants
/// - Output order follows request order
/// - A failing capability never aborts the batch; its artifact is omitted
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    normalizer: Arc<Normalizer>,
    capabilities: Arc<HandlerRegistry<dyn CapabilityHandler>>,
}

impl ArtifactManager {
    /// Create manager
    #[must_use]
    pub fn new(
        normalizer: Arc<Normalizer>,
        capabilities: Arc<HandlerRegistry<dyn CapabilityHandler>>,
    ) -> Self {
        Self {
            normalizer,
            capabilities,
        }
    }

    /// Capability registry
    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> &HandlerRegistry<dyn CapabilityHandler> {
        &self.capabilities
    }

    /// Generate one artifact per requested capability
    ///
    /// Unknown capabilities, and capabilities that do not support
    /// `domain_type`, are skipped. Capabilities run concurrently; results are
    /// returned in request order.
    pub async fn generate_artifacts<S: AsRef<str>>(
        &self,
        domain_result: &Value,
        requested: &[S],
        metadata: Option<&HintBag>,
        domain_type: Option<&str>,
        primary_document: Option<&str>,
    ) -> Vec<Artifact> {
        let ctx = CapabilityContext::new(domain_result)
            .with_metadata(metadata)
            .with_domain_type(domain_type)
            .with_primary_document(primary_document);

        let mut selected = Vec::with_capacity(requested.len());
        for name in requested {
            let key = self.normalizer.capability(name.as_ref());
            let Ok(handler) = self.capabilities.get(key) else {
                tracing::warn!(capability = key, "no handler for capability, skipping");
                continue;
            };
            if let Some(domain_type) = domain_type {
                if !handler.supports(domain_type) {
                    tracing::warn!(
                        capability = key,
                        domain_type,
                        "capability does not support domain type, skipping"
                    );
                    continue;
                }
            }
            selected.push((key, Arc::clone(handler)));
        }

        let results = join_all(
            selected
                .iter()
                .map(|(_, handler)| handler.generate(ctx)),
        )
        .await;

        let mut artifacts = Vec::with_capacity(results.len());
        for ((key, _), result) in selected.iter().zip(results) {
            match result {
                Ok(Some(artifact)) => {
                    tracing::debug!(capability = key, name = %artifact.name, "artifact generated");
                    artifacts.push(artifact);
                }
                Ok(None) => tracing::debug!(capability = key, "capability produced nothing"),
                Err(err) => tracing::warn!(capability = key, error = %err, "capability failed, omitting artifact"),
            }
        }
        artifacts
    }
}
