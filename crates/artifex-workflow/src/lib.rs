//! Artifex Workflow
//!
//! Sub-type handlers for the `workflow` capability. Each kind builds a
//! typed [`Pipeline`] (triggers, jobs, steps, target environment) and
//! renders it as GitHub Actions YAML.
//!
//! # Example
//!
//! ```rust
//! use artifex_workflow::{default_handlers, Toolchain, WorkflowConfig};
//!
//! let registry = default_handlers().unwrap();
//! let config = WorkflowConfig::new("Deploy to staging").with_toolchain(Toolchain::Npm);
//! let yaml = registry.get("deploy").unwrap().generate(&config).unwrap();
//!
//! assert!(yaml.contains("environment: staging"));
//! assert!(yaml.contains("npm run build"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod handler;
pub mod kinds;
mod pipeline;

pub use error::WorkflowError;
pub use handler::{infer_environment, Toolchain, WorkflowConfig, WorkflowHandler, ENVIRONMENTS};
pub use kinds::{default_handlers, ALIASES};
pub use pipeline::{Job, Pipeline, RefFilter, Step, Triggers, DEFAULT_RUNNER};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
