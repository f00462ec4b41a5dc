//! Diagram generation pipeline
//!
//! One request walks a fixed sequence of stages:
//!
//! ```text
//! Generated -> Annotated -> Validated -+-> Formatted
//!                                      |
//!                 (invalid, repair on) +-> Repaired -> Validated
//!                 (invalid, strict on) +-> Fallback -> Validated
//! ```
//!
//! Every path ends in [`Stage::Formatted`]. The only error is an unknown
//! sub-type, raised before generation starts.

use crate::error::ArtifexError;
use artifex_diagram::{apply_theme, DiagramConfig, DiagramHandler, FormatCapabilities};
use artifex_model::{GenerationRequest, ValidationResult};
use artifex_registry::{HandlerRegistry, Normalizer};
use artifex_validation::{fallback, repair, Validator};
use std::fmt::{self, Write as _};
use std::sync::Arc;

/// Capability key served by the orchestrator
pub const DIAGRAM_CAPABILITY: &str = "diagram";

/// Sub-type used when a request names none
pub const DEFAULT_DIAGRAM_TYPE: &str = "flowchart";

const TROUBLESHOOTING: &[&str] = &[
    "Check that the first line is a supported diagram header (e.g. `flowchart TD`)",
    "Quote labels that contain brackets, colons or other punctuation",
    "Make sure every opened bracket and quote is closed on the same line",
    "Enable `repair`, or `strict` to fall back to a minimal valid skeleton",
];

/// Pipeline stage, recorded in order on the [`Outcome`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Handler produced source
    Generated,
    /// Accessibility comments and theme applied
    Annotated,
    /// Validator consulted
    Validated,
    /// Repair pass applied
    Repaired,
    /// Fallback skeleton substituted
    Fallback,
    /// Terminal state
    Formatted,
}

/// Final validation status shown to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationStatus {
    /// Checker accepted the generated source
    Valid,
    /// Checker unavailable; source unverified
    Skipped,
    /// Accepted after the repair pass
    Repaired,
    /// Fallback skeleton accepted
    Fallback,
    /// Still invalid
    Invalid(String),
}

impl ValidationStatus {
    /// Whether the returned source is (or is assumed) valid
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid(_))
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("valid"),
            Self::Skipped => f.write_str("valid (skipped \u{2014} checker unavailable)"),
            Self::Repaired => f.write_str("valid (after repair)"),
            Self::Fallback => f.write_str("valid (after fallback)"),
            Self::Invalid(err) => write!(f, "invalid: {err}"),
        }
    }
}

/// Result of running one request through the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Canonical sub-type key
    pub sub_type: String,
    /// Final source
    pub code: String,
    /// Final status
    pub status: ValidationStatus,
    /// Last validator verdict
    pub validation: ValidationResult,
    /// Stages visited, in order
    pub stages: Vec<Stage>,
}

impl Outcome {
    /// Whether the repair pass produced the returned source
    #[inline]
    #[must_use]
    pub fn repaired(&self) -> bool {
        self.status == ValidationStatus::Repaired
    }

    /// Whether the fallback skeleton was substituted
    #[inline]
    #[must_use]
    pub fn fell_back(&self) -> bool {
        self.stages.contains(&Stage::Fallback)
    }

    /// Formatted response body for `request`
    #[must_use]
    pub fn render(&self, request: &GenerationRequest) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "## Diagram: {}\n", self.sub_type);
        let _ = writeln!(out, "```mermaid\n{}\n```\n", self.code);

        out.push_str("### Accessibility\n\n");
        if request.accessibility.is_empty() {
            out.push_str(
                "No accessibility metadata supplied. Provide `accTitle` and `accDescr` so \
                 screen readers can describe this diagram.\n",
            );
        } else {
            for (label, value) in [
                ("Title", &request.accessibility.title),
                ("Description", &request.accessibility.descr),
            ] {
                if let Some(value) = non_blank(value.as_deref()) {
                    let _ = writeln!(out, "- {label}: {}", single_line(value));
                }
            }
        }

        let _ = writeln!(out, "\n### Validation\n\nStatus: {}", self.status);
        if !self.status.is_valid() {
            out.push_str("\nTroubleshooting:\n");
            for (i, tip) in TROUBLESHOOTING.iter().enumerate() {
                let _ = writeln!(out, "{}. {tip}", i + 1);
            }
        }

        out.push_str("\n### Settings\n\n");
        let _ = writeln!(out, "- type: {}", self.sub_type);
        let _ = writeln!(out, "- strict: {}", request.mode.strict);
        let _ = writeln!(out, "- repair: {}", request.mode.repair);
        if let Some(theme) = non_blank(request.style.theme.as_deref()) {
            let _ = writeln!(out, "- theme: {theme}");
        }
        if let Some(direction) = request.style.direction {
            let _ = writeln!(out, "- direction: {direction}");
        }
        out
    }
}

/// Sequences generate, annotate, validate, repair and fallback
///
/// Holds only shared read-only tables and the shared validator, so one
/// instance serves concurrent requests.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    normalizer: Arc<Normalizer>,
    diagrams: Arc<HandlerRegistry<dyn DiagramHandler>>,
    validator: Arc<Validator>,
}

impl Orchestrator {
    /// Create orchestrator
    #[must_use]
    pub fn new(
        normalizer: Arc<Normalizer>,
        diagrams: Arc<HandlerRegistry<dyn DiagramHandler>>,
        validator: Arc<Validator>,
    ) -> Self {
        Self {
            normalizer,
            diagrams,
            validator,
        }
    }

    /// Shared validator
    #[inline]
    #[must_use]
    pub fn validator(&self) -> &Arc<Validator> {
        &self.validator
    }

    /// Diagram sub-type registry
    #[inline]
    #[must_use]
    pub fn diagrams(&self) -> &HandlerRegistry<dyn DiagramHandler> {
        &self.diagrams
    }

    /// Canonical sub-type key for a raw (possibly aliased or absent) name
    #[must_use]
    pub fn resolve<'a>(&'a self, sub_type: Option<&'a str>) -> &'a str {
        let raw = sub_type
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_DIAGRAM_TYPE);
        self.normalizer.sub_type(DIAGRAM_CAPABILITY, raw)
    }

    /// Run the pipeline for `request`
    ///
    /// # Errors
    /// [`ArtifexError::UnknownType`] if the sub-type has no handler.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<Outcome, ArtifexError> {
        let key = self.resolve(request.target.sub_type.as_deref());
        let handler = self.diagrams.get(key)?;
        let mode = request.mode;
        let mut stages = Vec::with_capacity(6);

        let generated = handler.generate(&DiagramConfig::from_request(request));
        stages.push(Stage::Generated);
        tracing::debug!(sub_type = key, "generated diagram source");

        let mut code = annotate(&generated, request, &handler.capabilities());
        stages.push(Stage::Annotated);

        let mut validation = self.validator.validate(&code).await;
        stages.push(Stage::Validated);
        let mut status = initial_status(&validation);

        if !validation.is_valid() && mode.repair {
            let repaired = repair(&code);
            stages.push(Stage::Repaired);
            validation = self.validator.validate(&repaired).await;
            stages.push(Stage::Validated);
            if validation.is_valid() {
                tracing::info!(sub_type = key, "diagram source valid after repair");
                status = ValidationStatus::Repaired;
            }
            code = repaired;
        }

        if !validation.is_valid() && mode.strict {
            tracing::info!(
                sub_type = key,
                error = validation.error().unwrap_or_default(),
                "substituting fallback skeleton"
            );
            code = annotate(&fallback(), request, &FormatCapabilities::themed());
            stages.push(Stage::Fallback);
            validation = self.validator.validate(&code).await;
            stages.push(Stage::Validated);
            if validation.is_valid() {
                status = ValidationStatus::Fallback;
            }
        }

        if !validation.is_valid() {
            status = ValidationStatus::Invalid(
                validation.error().unwrap_or("unknown validation error").to_string(),
            );
        }
        stages.push(Stage::Formatted);
        tracing::debug!(sub_type = key, status = %status, "pipeline finished");

        Ok(Outcome {
            sub_type: key.to_string(),
            code,
            status,
            validation,
            stages,
        })
    }

    /// Run the pipeline and format the response body
    ///
    /// # Errors
    /// [`ArtifexError::UnknownType`] if the sub-type has no handler.
    pub async fn respond(&self, request: &GenerationRequest) -> Result<String, ArtifexError> {
        let outcome = self.generate(request).await?;
        Ok(outcome.render(request))
    }
}

fn initial_status(validation: &ValidationResult) -> ValidationStatus {
    if validation.is_skipped() {
        ValidationStatus::Skipped
    } else if validation.is_valid() {
        ValidationStatus::Valid
    } else {
        ValidationStatus::Invalid(validation.error().unwrap_or_default().to_string())
    }
}

/// Prepend accessibility comment lines, then the theme directive
fn annotate(code: &str, request: &GenerationRequest, caps: &FormatCapabilities) -> String {
    let mut out = String::with_capacity(code.len() + 64);
    let acc = &request.accessibility;
    for (key, value) in [("accTitle", &acc.title), ("accDescr", &acc.descr)] {
        if let Some(value) = non_blank(value.as_deref()) {
            let _ = writeln!(out, "%% {key}: {}", single_line(value));
        }
    }
    out.push_str(code);
    apply_theme(caps, &out, request.style.theme.as_deref())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use artifex_model::TargetType;
    use artifex_validation::{BuiltinProvider, NullProvider};

    fn orchestrator(validator: Validator) -> Orchestrator {
        let normalizer = Normalizer::new()
            .with_sub_type_aliases(DIAGRAM_CAPABILITY, artifex_diagram::ALIASES);
        Orchestrator::new(
            Arc::new(normalizer),
            Arc::new(artifex_diagram::default_handlers().unwrap()),
            Arc::new(validator),
        )
    }

    fn request(sub_type: &str, description: &str) -> GenerationRequest {
        GenerationRequest::new(description, TargetType::with_sub_type("diagram", sub_type))
    }

    #[tokio::test]
    async fn skipped_validation_is_reported() {
        let orchestrator = orchestrator(Validator::new(Arc::new(NullProvider)));
        let outcome = orchestrator
            .generate(&request("pie", "Sales by region"))
            .await
            .unwrap();
        assert_eq!(outcome.status, ValidationStatus::Skipped);
        assert_eq!(
            outcome.stages,
            vec![Stage::Generated, Stage::Annotated, Stage::Validated, Stage::Formatted]
        );
        assert!(outcome.code.starts_with("pie"));
    }

    #[tokio::test]
    async fn annotations_precede_header() {
        let orchestrator = orchestrator(Validator::new(Arc::new(BuiltinProvider)));
        let request = request("flowchart", "Start. Finish")
            .with_theme("dark")
            .with_accessibility(Some("Order\nflow".to_string()), Some("How orders move".to_string()));
        let outcome = orchestrator.generate(&request).await.unwrap();

        let lines: Vec<_> = outcome.code.lines().take(4).collect();
        assert_eq!(lines[0], "%%{init: {'theme':'dark'}}%%");
        assert_eq!(lines[1], "%% accTitle: Order flow");
        assert_eq!(lines[2], "%% accDescr: How orders move");
        assert!(lines[3].starts_with("flowchart"));
        assert_eq!(outcome.status, ValidationStatus::Valid);
    }

    #[tokio::test]
    async fn unknown_sub_type_is_fatal() {
        let orchestrator = orchestrator(Validator::new(Arc::new(NullProvider)));
        let err = orchestrator
            .generate(&request("sankey", "x"))
            .await
            .unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "unknown diagram type: 'sankey'");
    }

    #[tokio::test]
    async fn missing_sub_type_defaults_to_flowchart() {
        let orchestrator = orchestrator(Validator::new(Arc::new(NullProvider)));
        let request = GenerationRequest::new("A then B", TargetType::new("diagram"));
        let outcome = orchestrator.generate(&request).await.unwrap();
        assert_eq!(outcome.sub_type, "flowchart");
    }

    #[test]
    fn status_strings() {
        assert_eq!(ValidationStatus::Valid.to_string(), "valid");
        assert_eq!(
            ValidationStatus::Skipped.to_string(),
            "valid (skipped \u{2014} checker unavailable)"
        );
        assert_eq!(ValidationStatus::Repaired.to_string(), "valid (after repair)");
        assert_eq!(ValidationStatus::Fallback.to_string(), "valid (after fallback)");
        assert_eq!(
            ValidationStatus::Invalid("line 2".to_string()).to_string(),
            "invalid: line 2"
        );
    }

    #[test]
    fn render_lists_troubleshooting_only_when_invalid() {
        let request = request("pie", "x");
        let mut outcome = Outcome {
            sub_type: "pie".to_string(),
            code: "pie\n    \"A\" : 1".to_string(),
            status: ValidationStatus::Valid,
            validation: ValidationResult::valid(),
            stages: vec![Stage::Formatted],
        };
        let body = outcome.render(&request);
        assert!(body.starts_with("## Diagram: pie\n"));
        assert!(body.contains("```mermaid\npie\n"));
        assert!(body.contains("No accessibility metadata supplied"));
        assert!(body.contains("Status: valid\n"));
        assert!(body.contains("- type: pie\n- strict: true\n- repair: true\n"));
        assert!(!body.contains("Troubleshooting"));

        outcome.status = ValidationStatus::Invalid("bad".to_string());
        let body = outcome.render(&request);
        assert!(body.contains("Status: invalid: bad"));
        assert!(body.contains("Troubleshooting:\n1. "));
    }
}
