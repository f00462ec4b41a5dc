//! Engine bootstrap
//!
//! [`Engine::from_config`] wires both registry tiers, the validator, the
//! orchestrator and the artifact manager. Registration errors surface here,
//! before any request is served.

use crate::capability::{
    default_capabilities, DiagramCapability, WorkflowCapability, CAPABILITY_ALIASES,
    WORKFLOW_CAPABILITY,
};
use crate::config::EngineConfig;
use crate::error::ArtifexError;
use crate::manager::ArtifactManager;
use crate::orchestrator::{Orchestrator, DIAGRAM_CAPABILITY};
use artifex_model::{Artifact, HintBag, RequestSpec};
use artifex_registry::Normalizer;
use artifex_validation::{CheckerProvider, Validator};
use artifex_workflow::{Toolchain, WorkflowConfig};
use serde_json::Value;
use std::sync::Arc;

/// Fully wired generation engine
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    normalizer: Arc<Normalizer>,
    validator: Arc<Validator>,
    orchestrator: Arc<Orchestrator>,
    workflow: WorkflowCapability,
    manager: ArtifactManager,
}

impl Engine {
    /// Bootstrap with the provider named in `config`
    ///
    /// # Errors
    /// [`ArtifexError::RegistryMisconfiguration`] on duplicate registration.
    pub fn from_config(config: EngineConfig) -> Result<Self, ArtifexError> {
        let provider = config.validator.provider();
        Self::with_provider(config, provider)
    }

    /// Bootstrap with an explicit checker provider
    ///
    /// # Errors
    /// [`ArtifexError::RegistryMisconfiguration`] on duplicate registration.
    pub fn with_provider(
        config: EngineConfig,
        provider: Arc<dyn CheckerProvider>,
    ) -> Result<Self, ArtifexError> {
        let normalizer = Arc::new(
            Normalizer::new()
                .with_capability_aliases(CAPABILITY_ALIASES)
                .with_sub_type_aliases(DIAGRAM_CAPABILITY, artifex_diagram::ALIASES)
                .with_sub_type_aliases(WORKFLOW_CAPABILITY, artifex_workflow::ALIASES),
        );
        let diagrams = Arc::new(artifex_diagram::default_handlers()?);
        let workflows = Arc::new(artifex_workflow::default_handlers()?);

        tracing::info!(
            provider = provider.name(),
            backend = %config.validator.backend,
            diagrams = diagrams.len(),
            workflows = workflows.len(),
            "bootstrapping artifact engine"
        );
        let validator = Arc::new(Validator::with_cache_capacity(
            provider,
            config.validator.cache_capacity,
        ));
        let orchestrator = Arc::new(Orchestrator::new(
            Arc::clone(&normalizer),
            diagrams,
            Arc::clone(&validator),
        ));

        let workflow = WorkflowCapability::new(Arc::clone(&normalizer), workflows);
        let capabilities = default_capabilities(
            DiagramCapability::new(Arc::clone(&orchestrator), config.defaults.clone()),
            workflow.clone(),
        )?;
        let manager = ArtifactManager::new(Arc::clone(&normalizer), Arc::new(capabilities));

        Ok(Self {
            config,
            normalizer,
            validator,
            orchestrator,
            workflow,
            manager,
        })
    }

    /// Generate one artifact body from a wire request
    ///
    /// The two capabilities return differently shaped bodies:
    ///
    /// - **diagram**: the formatted Markdown response from
    ///   [`Outcome::render`](crate::Outcome::render), with the fenced source,
    ///   accessibility, validation status and settings echo.
    /// - **workflow**: the bare YAML document, identical to the `content` of
    ///   the workflow [`Artifact`]. Workflows have no grammar checker, so
    ///   there is no status to report, and the body can be written to
    ///   `.github/workflows/` as-is.
    ///
    /// # Errors
    /// [`ArtifexError::UnknownType`] for an unknown capability or sub-type.
    pub async fn generate(&self, spec: RequestSpec) -> Result<String, ArtifexError> {
        let request = self.config.request(spec);
        match self.normalizer.capability(&request.target.capability) {
            DIAGRAM_CAPABILITY => self.orchestrator.respond(&request).await,
            WORKFLOW_CAPABILITY => {
                let sub_type = request
                    .target
                    .sub_type
                    .as_deref()
                    .unwrap_or_else(|| WorkflowCapability::infer_sub_type(&request.description));
                let config = WorkflowConfig::new(&request.description)
                    .with_toolchain(Toolchain::infer(&request.description));
                self.workflow.render(sub_type, &config).map(|(_, yaml)| yaml)
            }
            other => Err(ArtifexError::UnknownType {
                tier: "capability",
                key: other.to_string(),
            }),
        }
    }

    /// Generate artifacts for several capabilities at once
    ///
    /// See [`ArtifactManager::generate_artifacts`].
    pub async fn generate_artifacts<S: AsRef<str>>(
        &self,
        domain_result: &Value,
        requested: &[S],
        metadata: Option<&HintBag>,
        domain_type: Option<&str>,
        primary_document: Option<&str>,
    ) -> Vec<Artifact> {
        self.manager
            .generate_artifacts(domain_result, requested, metadata, domain_type, primary_document)
            .await
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared validator (for `reset_state` / `set_provider`)
    #[inline]
    #[must_use]
    pub fn validator(&self) -> &Arc<Validator> {
        &self.validator
    }

    /// Diagram orchestrator
    #[inline]
    #[must_use]
    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    /// Artifact manager
    #[inline]
    #[must_use]
    pub fn manager(&self) -> &ArtifactManager {
        &self.manager
    }

    /// Alias tables
    #[inline]
    #[must_use]
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidatorBackend;

    fn engine() -> Engine {
        Engine::from_config(EngineConfig::new().with_backend(ValidatorBackend::Builtin)).unwrap()
    }

    #[test]
    fn bootstrap_registers_both_tiers() {
        let engine = engine();
        assert_eq!(engine.manager().capabilities().keys(), vec!["diagram", "workflow"]);
        assert_eq!(engine.orchestrator().diagrams().len(), 12);
        assert_eq!(engine.validator().provider_name(), "builtin");
        assert_eq!(engine.manager().capabilities().supports("marketing"), vec!["diagram"]);
        assert_eq!(
            engine.manager().capabilities().supports("devops"),
            vec!["diagram", "workflow"]
        );
    }

    #[tokio::test]
    async fn generate_routes_by_capability() {
        let engine = engine();
        let diagram = engine
            .generate(RequestSpec {
                description: "Open app. Log in".to_string(),
                capability: "mermaid".to_string(),
                sub_type: Some("graph".to_string()),
                ..RequestSpec::default()
            })
            .await
            .unwrap();
        assert!(diagram.starts_with("## Diagram: flowchart"));

        let workflow = engine
            .generate(RequestSpec {
                description: "Deploy the Rust service to staging".to_string(),
                capability: "automation-workflow".to_string(),
                ..RequestSpec::default()
            })
            .await
            .unwrap();
        assert!(workflow.contains("environment: staging"));
        assert!(workflow.contains("cargo build"));
    }

    #[tokio::test]
    async fn workflow_body_is_bare_yaml() {
        let engine = engine();
        let body = engine
            .generate(RequestSpec {
                description: "Run the test suite for the npm package".to_string(),
                capability: "workflow".to_string(),
                sub_type: Some("ci".to_string()),
                ..RequestSpec::default()
            })
            .await
            .unwrap();

        assert!(!body.contains("```"));
        assert!(!body.contains("Status:"));
        let pipeline: artifex_workflow::Pipeline = serde_yaml::from_str(&body).unwrap();
        assert!(!pipeline.jobs.is_empty());
    }

    #[tokio::test]
    async fn unknown_capability_is_fatal() {
        let err = engine()
            .generate(RequestSpec {
                capability: "video".to_string(),
                ..RequestSpec::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown capability type: 'video'");
        assert!(err.is_fatal());
    }
}
