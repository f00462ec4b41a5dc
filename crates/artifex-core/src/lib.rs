//! Artifex Core
//!
//! Generation engine for textual artifacts: Mermaid diagrams and
//! automation-workflow YAML.
//!
//! # Architecture
//!
//! Dispatch happens in two tiers, both through
//! [`HandlerRegistry`](artifex_registry::HandlerRegistry):
//!
//! 1. **Capability** ([`CapabilityHandler`]): `diagram`, `workflow`
//! 2. **Sub-type**: twelve diagram formats, four workflow kinds
//!
//! Diagram requests run through the [`Orchestrator`] state machine:
//! generate, annotate, validate, repair, fallback, format. The
//! [`ArtifactManager`] fans a domain result out to several capabilities.
//!
//! # Example
//!
//! ```rust
//! use artifex_core::{Engine, EngineConfig, ValidatorBackend};
//! use artifex_model::HintBag;
//! use serde_json::json;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let engine = Engine::from_config(EngineConfig::new().with_backend(ValidatorBackend::Builtin))?;
//! let hints = HintBag::new().with("workflowType", "deploy");
//! let artifacts = engine
//!     .generate_artifacts(&json!({ "language": "rust" }), &["workflow"], Some(&hints), None, None)
//!     .await;
//!
//! assert_eq!(artifacts[0].name, ".github/workflows/deploy.yml");
//! # Ok::<(), artifex_core::ArtifexError>(())
//! # }).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod capability;
mod config;
mod engine;
mod error;
mod manager;
mod orchestrator;

pub use capability::{
    default_capabilities, CapabilityHandler, DiagramCapability, WorkflowCapability,
    CAPABILITY_ALIASES, WORKFLOW_CAPABILITY, WORKFLOW_DOMAINS,
};
pub use config::{
    DefaultsConfig, EngineConfig, ValidatorBackend, ValidatorConfig, DEFAULT_CHECKER_COMMAND,
    ENV_VALIDATOR_BACKEND, ENV_VALIDATOR_COMMAND,
};
pub use engine::Engine;
pub use error::ArtifexError;
pub use manager::ArtifactManager;
pub use orchestrator::{
    Orchestrator, Outcome, Stage, ValidationStatus, DEFAULT_DIAGRAM_TYPE, DIAGRAM_CAPABILITY,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
