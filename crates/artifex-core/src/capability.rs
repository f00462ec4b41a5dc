//! Tier-1 capability handlers
//!
//! A capability handler mines a [`CapabilityContext`] for hints, picks a
//! sub-type, runs the tier-2 handler and wraps the result in an
//! [`Artifact`]. Explicit metadata hints always win over inference.

use crate::config::DefaultsConfig;
use crate::error::ArtifexError;
use crate::orchestrator::{Orchestrator, DIAGRAM_CAPABILITY};
use artifex_model::{Artifact, CapabilityContext, Direction, GenerationRequest, TargetType};
use artifex_registry::{Handler, HandlerRegistry, Normalizer, RegistryError};
use artifex_workflow::{Toolchain, WorkflowConfig, WorkflowHandler};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Capability key for automation workflows
pub const WORKFLOW_CAPABILITY: &str = "workflow";

/// Capability aliases, mapped to canonical keys before dispatch
pub const CAPABILITY_ALIASES: &[(&str, &str)] = &[
    ("automation-workflow", WORKFLOW_CAPABILITY),
    ("automation", WORKFLOW_CAPABILITY),
    ("pipeline", WORKFLOW_CAPABILITY),
    ("diagrams", DIAGRAM_CAPABILITY),
    ("mermaid", DIAGRAM_CAPABILITY),
];

/// Domain types the workflow capability serves
pub const WORKFLOW_DOMAINS: &[&str] = &[
    "code",
    "devops",
    "ci-cd",
    "deployment",
    "release",
    "testing",
    "project",
    "service",
];

/// Top-level domain keys that imply a diagram sub-type, checked in order
const DIAGRAM_SHAPES: &[(&[&str], &str)] = &[
    (&["participants", "messages", "actors"], "sequence"),
    (&["states", "transitions"], "state"),
    (&["entities", "relationships", "tables"], "er"),
    (&["classes", "interfaces"], "class"),
    (&["commits", "branches"], "git-graph"),
    (&["tasks", "milestones", "schedule"], "gantt"),
    (&["events", "periods", "history"], "timeline"),
    (&["stages", "touchpoints"], "journey"),
    (&["quadrants", "axes"], "quadrant"),
    (&["topics", "ideas"], "mindmap"),
];

const DESCRIPTION_KEYS: &[&str] = &["description", "summary", "title"];

/// Artifact family handler
#[async_trait]
pub trait CapabilityHandler: Handler {
    /// Canonical capability key
    fn key(&self) -> &'static str;

    /// Produce the artifact for `ctx`, or `None` when there is nothing to emit
    ///
    /// # Errors
    /// Any [`ArtifexError`]; the [`ArtifactManager`](crate::ArtifactManager)
    /// drops the artifact and continues with the next capability.
    async fn generate(&self, ctx: CapabilityContext<'_>) -> Result<Option<Artifact>, ArtifexError>;
}

/// Description from hints, then the domain result, then the primary document
fn mine_description(ctx: &CapabilityContext<'_>) -> Option<String> {
    if let Some(description) = ctx.hint("description") {
        return Some(description.to_string());
    }
    if let Some(description) = DESCRIPTION_KEYS.iter().find_map(|key| ctx.domain_str(key)) {
        return Some(description.to_string());
    }
    ctx.primary_document.and_then(document_summary)
}

/// First heading or paragraph of a Markdown-ish document
fn document_summary(document: &str) -> Option<String> {
    document
        .split("\n\n")
        .map(|block| {
            block
                .lines()
                .map(|line| line.trim().trim_start_matches('#').trim())
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .find(|block| !block.is_empty())
}

// ============================================================================
// Diagram capability
// ============================================================================

/// `diagram` capability: runs the full orchestrator pipeline
#[derive(Debug, Clone)]
pub struct DiagramCapability {
    orchestrator: Arc<Orchestrator>,
    defaults: DefaultsConfig,
}

impl DiagramCapability {
    /// Create capability over a shared orchestrator
    #[must_use]
    pub fn new(orchestrator: Arc<Orchestrator>, defaults: DefaultsConfig) -> Self {
        Self {
            orchestrator,
            defaults,
        }
    }

    /// Sub-type implied by the domain result's shape
    #[must_use]
    pub fn infer_sub_type(domain_result: &Value) -> Option<&'static str> {
        let object = domain_result.as_object()?;
        if let Some((_, sub_type)) = DIAGRAM_SHAPES
            .iter()
            .find(|(keys, _)| keys.iter().any(|k| object.contains_key(*k)))
        {
            return Some(*sub_type);
        }
        (!object.is_empty() && object.values().all(Value::is_number)).then_some("pie")
    }

    /// `label: value` listing of a numeric map, for pie charts
    fn numeric_listing(domain_result: &Value) -> Option<String> {
        let object = domain_result.as_object()?;
        let items: Vec<String> = object
            .iter()
            .filter_map(|(label, value)| value.as_f64().map(|v| format!("{label}: {v}")))
            .collect();
        (!items.is_empty() && items.len() == object.len()).then(|| items.join(", "))
    }

    fn request(&self, ctx: &CapabilityContext<'_>) -> GenerationRequest {
        let sub_type = ctx
            .hint("diagramType")
            .map(str::to_string)
            .or_else(|| Self::infer_sub_type(ctx.domain_result).map(str::to_string));
        let description = mine_description(ctx)
            .or_else(|| Self::numeric_listing(ctx.domain_result))
            .unwrap_or_default();

        let target = match sub_type {
            Some(sub_type) => TargetType::with_sub_type(DIAGRAM_CAPABILITY, sub_type),
            None => TargetType::new(DIAGRAM_CAPABILITY),
        };
        let metadata = ctx.metadata;
        let flag = |key: &str, default: bool| {
            metadata.and_then(|m| m.get_bool(key)).unwrap_or(default)
        };

        let mut request = GenerationRequest::new(description, target).with_mode(
            flag("strict", self.defaults.strict),
            flag("repair", self.defaults.repair),
        );
        request.style.theme = ctx
            .hint("theme")
            .map(str::to_string)
            .or_else(|| self.defaults.theme.clone());
        request.style.direction = ctx
            .hint("direction")
            .and_then(|d| d.parse::<Direction>().ok())
            .or(self.defaults.direction);
        request.accessibility.title = ctx.hint("accTitle").map(str::to_string);
        request.accessibility.descr = ctx.hint("accDescr").map(str::to_string);
        if let Some(Value::Object(features)) = metadata.and_then(|m| m.get("advancedFeatures")) {
            request.advanced_features = features
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
        }
        request
    }
}

impl Handler for DiagramCapability {}

#[async_trait]
impl CapabilityHandler for DiagramCapability {
    fn key(&self) -> &'static str {
        DIAGRAM_CAPABILITY
    }

    async fn generate(&self, ctx: CapabilityContext<'_>) -> Result<Option<Artifact>, ArtifexError> {
        let request = self.request(&ctx);
        let outcome = self.orchestrator.generate(&request).await?;
        let name = format!("diagrams/{}.md", outcome.sub_type);
        Ok(Some(Artifact::new(
            DIAGRAM_CAPABILITY,
            name,
            outcome.render(&request),
        )))
    }
}

// ============================================================================
// Workflow capability
// ============================================================================

/// `workflow` capability: emits a YAML pipeline
#[derive(Debug, Clone)]
pub struct WorkflowCapability {
    normalizer: Arc<Normalizer>,
    workflows: Arc<HandlerRegistry<dyn WorkflowHandler>>,
}

impl WorkflowCapability {
    /// Create capability over the workflow sub-type registry
    #[must_use]
    pub fn new(
        normalizer: Arc<Normalizer>,
        workflows: Arc<HandlerRegistry<dyn WorkflowHandler>>,
    ) -> Self {
        Self {
            normalizer,
            workflows,
        }
    }

    /// Workflow kind suggested by free text
    #[must_use]
    pub fn infer_sub_type(text: &str) -> &'static str {
        let lower = text.to_lowercase();
        if lower.contains("deploy") || lower.contains("rollout") {
            "deploy"
        } else if lower.contains("release") || lower.contains("publish") {
            "release"
        } else if lower.contains("test") {
            "test"
        } else {
            "ci"
        }
    }

    /// Render the workflow for an explicit sub-type
    ///
    /// # Errors
    /// [`ArtifexError::UnknownType`] for an unregistered kind,
    /// [`ArtifexError::Capability`] if rendering fails.
    pub fn render(
        &self,
        sub_type: &str,
        config: &WorkflowConfig<'_>,
    ) -> Result<(String, String), ArtifexError> {
        let key = self.normalizer.sub_type(WORKFLOW_CAPABILITY, sub_type);
        let handler = self.workflows.get(key)?;
        let yaml = handler
            .generate(config)
            .map_err(|e| ArtifexError::capability(WORKFLOW_CAPABILITY, e))?;
        Ok((key.to_string(), yaml))
    }
}

impl Handler for WorkflowCapability {
    fn supports(&self, domain_type: &str) -> bool {
        WORKFLOW_DOMAINS.contains(&domain_type.trim().to_ascii_lowercase().as_str())
    }
}

#[async_trait]
impl CapabilityHandler for WorkflowCapability {
    fn key(&self) -> &'static str {
        WORKFLOW_CAPABILITY
    }

    async fn generate(&self, ctx: CapabilityContext<'_>) -> Result<Option<Artifact>, ArtifexError> {
        let description = mine_description(&ctx).unwrap_or_default();
        let sub_type = ctx
            .hint("workflowType")
            .or_else(|| ctx.domain_str("workflowType"))
            .unwrap_or_else(|| Self::infer_sub_type(&description));

        let toolchain = match ctx.hint("toolchain") {
            Some(hint) => hint
                .parse::<Toolchain>()
                .map_err(ArtifexError::InvalidRequest)?,
            None => {
                let mut corpus = ctx.domain_result.to_string();
                if let Some(document) = ctx.primary_document {
                    corpus.push('\n');
                    corpus.push_str(document);
                }
                Toolchain::infer(&corpus)
            }
        };

        let config = WorkflowConfig::new(&description)
            .with_toolchain(toolchain)
            .with_environment(ctx.hint("environment"))
            .with_name(ctx.hint("name"));
        let (key, yaml) = self.render(sub_type, &config)?;
        tracing::debug!(workflow = %key, toolchain = %toolchain, "generated workflow");

        Ok(Some(Artifact::new(
            WORKFLOW_CAPABILITY,
            format!(".github/workflows/{key}.yml"),
            yaml,
        )))
    }
}

/// Registry with the built-in capabilities
///
/// # Errors
/// [`RegistryError::DuplicateKey`] if two capabilities share a key.
pub fn default_capabilities(
    diagram: DiagramCapability,
    workflow: WorkflowCapability,
) -> Result<HandlerRegistry<dyn CapabilityHandler>, RegistryError> {
    let handlers: [Arc<dyn CapabilityHandler>; 2] = [Arc::new(diagram), Arc::new(workflow)];
    let mut registry = HandlerRegistry::new("capability");
    for handler in handlers {
        registry.register(handler.key(), handler)?;
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn infers_diagram_type_from_shape() {
        let cases = [
            (json!({ "participants": ["A", "B"] }), Some("sequence")),
            (json!({ "states": [], "other": 1 }), Some("state")),
            (json!({ "entities": {} }), Some("er")),
            (json!({ "commits": [] }), Some("git-graph")),
            (json!({ "north": 10, "south": 20.5 }), Some("pie")),
            (json!({ "name": "svc" }), None),
            (json!({}), None),
            (json!([1, 2]), None),
        ];
        for (value, expected) in cases {
            assert_eq!(DiagramCapability::infer_sub_type(&value), expected, "{value}");
        }
    }

    #[test]
    fn numeric_listing_for_pie() {
        let listing = DiagramCapability::numeric_listing(&json!({ "North": 10, "South": 20 }));
        assert_eq!(listing.as_deref(), Some("North: 10, South: 20"));
        assert_eq!(DiagramCapability::numeric_listing(&json!({ "a": "x" })), None);
    }

    #[test]
    fn description_sources_in_priority_order() {
        let domain = json!({ "summary": "From summary" });
        let ctx = CapabilityContext::new(&domain);
        assert_eq!(mine_description(&ctx).as_deref(), Some("From summary"));

        let empty = json!({});
        let ctx = CapabilityContext::new(&empty)
            .with_primary_document(Some("\n# Checkout Service\n\nHandles payments."));
        assert_eq!(mine_description(&ctx).as_deref(), Some("Checkout Service"));
    }

    #[test]
    fn workflow_type_inference() {
        assert_eq!(WorkflowCapability::infer_sub_type("Roll out to prod, deploy nightly"), "deploy");
        assert_eq!(WorkflowCapability::infer_sub_type("Publish to crates.io"), "release");
        assert_eq!(WorkflowCapability::infer_sub_type("Run the test matrix"), "test");
        assert_eq!(WorkflowCapability::infer_sub_type("Lint and build"), "ci");
    }

    #[test]
    fn workflow_domains_filter() {
        let capability = WorkflowCapability::new(
            Arc::new(Normalizer::new()),
            Arc::new(artifex_workflow::default_handlers().unwrap()),
        );
        assert!(capability.supports("DevOps"));
        assert!(capability.supports("code"));
        assert!(!capability.supports("marketing"));
    }
}
