//! Orchestrator transitions around the repair stage.
//!
//! Core guarantees exercised here:
//! - Code that repair fixes ends `valid (after repair)` without a fallback.
//! - With repair disabled, strict mode goes straight to the fallback.
//! - With both disabled, the generated code is returned verbatim as invalid.

use artifex_core::{Orchestrator, Stage, ValidationStatus};
use artifex_diagram::{DiagramConfig, DiagramFormat, DiagramHandler};
use artifex_model::GenerationRequest;
use artifex_registry::{Handler, HandlerRegistry, Normalizer};
use artifex_test_utils::{init_tracing, request, ScriptedProvider};
use artifex_validation::{Validator, FALLBACK_SKELETON};
use pretty_assertions::assert_eq;
use std::sync::Arc;

/// Emits the legacy `graph` header, which repair rewrites to `flowchart`
#[derive(Debug, Clone, Copy, Default)]
struct LegacyGraph;

impl Handler for LegacyGraph {}

impl DiagramFormat for LegacyGraph {
    type Elements = ();

    const KEY: &'static str = "legacy";
    const HEADER: &'static str = "graph";

    fn parse(&self, _description: &str) -> Self::Elements {}

    fn render(&self, _elements: &(), header: &str, _config: &DiagramConfig<'_>) -> String {
        format!("{header} TD\n    A --> B")
    }
}

/// Orchestrator whose checker rejects any source still using `graph`
fn orchestrator() -> Orchestrator {
    init_tracing();
    let mut diagrams: HandlerRegistry<dyn DiagramHandler> = HandlerRegistry::new("diagram");
    diagrams.register("legacy", Arc::new(LegacyGraph)).unwrap();
    let provider = ScriptedProvider::accepting_only(|code| !code.contains("graph"));
    Orchestrator::new(
        Arc::new(Normalizer::new()),
        Arc::new(diagrams),
        Arc::new(Validator::new(Arc::new(provider))),
    )
}

fn legacy(strict: bool, repair: bool) -> GenerationRequest {
    request("legacy", "A then B").with_mode(strict, repair)
}

/// A successful repair is terminal: no fallback stage, repaired status.
#[tokio::test]
async fn repaired_code_skips_fallback() {
    let orchestrator = orchestrator();
    let request = legacy(true, true);
    let outcome = orchestrator.generate(&request).await.unwrap();

    assert_eq!(outcome.status, ValidationStatus::Repaired);
    assert!(outcome.repaired());
    assert!(!outcome.fell_back());
    assert_eq!(outcome.code, "flowchart TD\n    A --> B");
    assert_eq!(
        outcome.stages,
        vec![
            Stage::Generated,
            Stage::Annotated,
            Stage::Validated,
            Stage::Repaired,
            Stage::Validated,
            Stage::Formatted,
        ]
    );

    let body = outcome.render(&request);
    assert!(body.contains("Status: valid (after repair)"));
    assert!(body.starts_with("## Diagram: legacy\n"));
    assert!(!body.contains("Troubleshooting"));
}

/// Repair disabled under strict mode: validation failure goes to the fallback.
#[tokio::test]
async fn repair_disabled_goes_straight_to_fallback() {
    let outcome = orchestrator().generate(&legacy(true, false)).await.unwrap();

    assert_eq!(outcome.status, ValidationStatus::Fallback);
    assert!(!outcome.repaired());
    assert_eq!(outcome.code, FALLBACK_SKELETON);
    assert_eq!(
        outcome.stages,
        vec![
            Stage::Generated,
            Stage::Annotated,
            Stage::Validated,
            Stage::Fallback,
            Stage::Validated,
            Stage::Formatted,
        ]
    );
}

/// Neither strict nor repair: the generated code comes back untouched.
#[tokio::test]
async fn lenient_without_repair_returns_verbatim() {
    let request = legacy(false, false);
    let outcome = orchestrator().generate(&request).await.unwrap();

    assert_eq!(outcome.code, "graph TD\n    A --> B");
    assert!(matches!(outcome.status, ValidationStatus::Invalid(_)));
    assert_eq!(
        outcome.stages,
        vec![Stage::Generated, Stage::Annotated, Stage::Validated, Stage::Formatted]
    );

    let body = outcome.render(&request);
    assert!(body.contains("Status: invalid: Parse error on line 1"));
    assert!(body.contains("Troubleshooting:"));
    assert!(body.contains("- strict: false\n- repair: false"));
}
