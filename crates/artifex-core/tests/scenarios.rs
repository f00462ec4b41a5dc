//! End-to-end generation scenarios.
//!
//! Core guarantees exercised here:
//! - A pie request produces a pie header followed by data entries.
//! - Strict mode never returns invalid code while a checker is present.
//! - Aliased sub-type names are indistinguishable from canonical ones.
//! - The artifact manager emits a deploy workflow with build before deploy.
//! - Repair inserts a missing header exactly once.

use artifex_core::{Engine, EngineConfig, Stage, ValidationStatus, ValidatorBackend};
use artifex_model::{HintBag, RequestSpec};
use artifex_test_utils::{init_tracing, request, ScriptedProvider};
use artifex_validation::{repair, BuiltinProvider, FALLBACK_SKELETON};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn builtin_engine() -> Engine {
    init_tracing();
    Engine::with_provider(EngineConfig::new(), Arc::new(BuiltinProvider)).unwrap()
}

fn spec(sub_type: &str, description: &str) -> RequestSpec {
    RequestSpec {
        description: description.to_string(),
        capability: "diagram".to_string(),
        sub_type: Some(sub_type.to_string()),
        ..RequestSpec::default()
    }
}

/// A pie request yields a pie header and at least one `"label" : value` row.
#[tokio::test]
async fn pie_request_contains_header_and_data() {
    let engine = builtin_engine();
    let outcome = engine
        .orchestrator()
        .generate(&request("pie", "Sales by region"))
        .await
        .unwrap();

    assert_eq!(outcome.status, ValidationStatus::Valid);
    assert!(outcome.code.starts_with("pie"));
    assert!(outcome.code.contains("title Sales by region"));
    assert!(outcome.code.contains("\"Region A\" : 40"));
}

/// When the generated source and its repair both fail, strict mode falls
/// back to the skeleton and reports that explicitly.
#[tokio::test]
async fn strict_mode_falls_back_to_skeleton() {
    init_tracing();
    let provider = ScriptedProvider::accepting_only(|code| code.contains("A[Start] --> B[Process]"));
    let engine = Engine::with_provider(EngineConfig::new(), Arc::new(provider)).unwrap();

    let mut spec = spec("flowchart", "");
    spec.strict = Some(true);
    let body = engine.generate(spec).await.unwrap();

    assert!(body.contains("Status: valid (after fallback)"));
    assert!(body.contains(FALLBACK_SKELETON));
    assert!(!body.contains("Troubleshooting"));

    let outcome = engine
        .orchestrator()
        .generate(&request("flowchart", "").with_mode(true, true))
        .await
        .unwrap();
    assert!(outcome.fell_back());
    assert_eq!(
        outcome.stages,
        vec![
            Stage::Generated,
            Stage::Annotated,
            Stage::Validated,
            Stage::Repaired,
            Stage::Validated,
            Stage::Fallback,
            Stage::Validated,
            Stage::Formatted,
        ]
    );
}

/// Without strict mode the failing source is returned as-is with an
/// invalid status and troubleshooting tips.
#[tokio::test]
async fn lenient_mode_reports_invalid() {
    let provider = ScriptedProvider::accepting_only(|_| false);
    let engine = Engine::with_provider(EngineConfig::new(), Arc::new(provider)).unwrap();

    let mut spec = spec("sequence", "Client sends request to Server");
    spec.strict = Some(false);
    let body = engine.generate(spec).await.unwrap();

    assert!(body.contains("Status: invalid: Parse error on line 1"));
    assert!(body.contains("Troubleshooting:\n1. "));
    assert!(body.contains("sequenceDiagram"));
}

/// `erDiagram` and `er` produce byte-identical responses.
#[tokio::test]
async fn er_alias_matches_canonical() {
    let engine = builtin_engine();
    let description = "A customer places many orders. An order contains many line items";

    let aliased = engine.generate(spec("erDiagram", description)).await.unwrap();
    let canonical = engine.generate(spec("er", description)).await.unwrap();

    assert_eq!(aliased, canonical);
    assert!(canonical.starts_with("## Diagram: er\n"));
}

/// The manager emits one deploy workflow whose deploy job depends on build.
#[tokio::test]
async fn manager_emits_deploy_workflow() {
    let engine = builtin_engine();
    let result = json!({ "service": "checkout", "language": "rust" });
    let hints = HintBag::new().with("workflowType", "deploy");

    let artifacts = engine
        .generate_artifacts(&result, &["workflow"], Some(&hints), None, None)
        .await;

    assert_eq!(artifacts.len(), 1);
    let artifact = &artifacts[0];
    assert!(artifact.name.ends_with("deploy.yml"));

    let build = artifact.content.find("\n  build:").unwrap();
    let deploy = artifact.content.find("\n  deploy:").unwrap();
    assert!(build < deploy);
    assert!(artifact.content[deploy..].contains("needs:"));
    assert!(artifact.content.contains("cargo build --release --locked"));
}

/// Unknown capabilities and unsupported domain types are skipped; the rest
/// keep request order.
#[tokio::test]
async fn manager_skips_unknown_and_keeps_order() {
    let engine = builtin_engine();
    let result = json!({ "participants": ["User", "API"], "description": "User calls API" });

    let artifacts = engine
        .generate_artifacts(&result, &["automation-workflow", "video", "mermaid"], None, Some("devops"), None)
        .await;
    let names: Vec<_> = artifacts.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec![".github/workflows/ci.yml", "diagrams/sequence.md"]);

    let artifacts = engine
        .generate_artifacts(&result, &["workflow", "diagram"], None, Some("marketing"), None)
        .await;
    let names: Vec<_> = artifacts.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["diagrams/sequence.md"]);
}

/// A failing capability is omitted without aborting the batch.
#[tokio::test]
async fn manager_omits_failing_capability() {
    let engine = builtin_engine();
    let hints = HintBag::new().with("workflowType", "nightly").with("diagramType", "pie");

    let artifacts = engine
        .generate_artifacts(&json!({ "a": 1, "b": 2 }), &["workflow", "diagram"], Some(&hints), None, None)
        .await;

    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].name, "diagrams/pie.md");
    assert!(artifacts[0].content.contains("\"a\" : 1"));
}

/// Repair adds the header once and is stable on re-application.
#[test]
fn repair_inserts_header_once() {
    let body = "    A --> B\n    B --> C";
    let once = repair(body);
    assert_eq!(once, "flowchart TD\n    A --> B\n    B --> C");
    assert_eq!(repair(&once), once);
    assert_eq!(once.matches("flowchart").count(), 1);

    let sequence = repair("Alice->>Bob: hi");
    assert_eq!(sequence, "sequenceDiagram\nAlice->>Bob: hi");
    assert_eq!(repair(&sequence), sequence);
}

/// Every diagram alias resolves to the same output as its canonical key.
#[tokio::test]
async fn every_alias_matches_canonical() {
    let engine = Engine::from_config(EngineConfig::new().with_backend(ValidatorBackend::Disabled)).unwrap();
    for (alias, canonical) in artifex_diagram::ALIASES {
        let description = "Start the job. Check status. Finish";
        let aliased = engine.generate(spec(alias, description)).await.unwrap();
        let direct = engine.generate(spec(canonical, description)).await.unwrap();
        assert_eq!(aliased, direct, "{alias} -> {canonical}");
    }
}

proptest! {
    /// Capability and sub-type names resolve regardless of surrounding
    /// whitespace or alias spelling.
    #[test]
    fn sub_type_resolution_ignores_padding(index in 0..artifex_diagram::ALIASES.len(), pad in " {0,3}") {
        let engine = Engine::from_config(EngineConfig::new().with_backend(ValidatorBackend::Disabled)).unwrap();
        let (alias, canonical) = artifex_diagram::ALIASES[index];
        let padded = format!("{pad}{alias}{pad}");
        prop_assert_eq!(engine.orchestrator().resolve(Some(&padded)), canonical);
    }
}
