//! Artifex Model
//!
//! Plain value types shared by every tier of the generation engine.
//!
//! # Core Concepts
//!
//! - [`GenerationRequest`]: immutable per-call request (target, style, accessibility, mode)
//! - [`ValidationResult`]: grammar check outcome with `valid`/`skipped` invariants
//! - [`Artifact`]: named output value returned to callers
//! - [`CapabilityContext`]: borrowed inputs a capability mines for hints
//!
//! # Example
//!
//! ```rust
//! use artifex_model::{Direction, GenerationRequest, TargetType};
//!
//! let request = GenerationRequest::new(
//!     "Login then load dashboard",
//!     TargetType::with_sub_type("diagram", "flowchart"),
//! )
//! .with_direction(Direction::LR)
//! .with_theme("dark");
//!
//! assert!(request.mode.strict);
//! ```

#![warn(unreachable_pub)]

mod artifact;
mod request;
mod validation;

pub use artifact::{Artifact, CapabilityContext, HintBag};
pub use request::{
    Accessibility, AdvancedFeatures, Direction, DirectionParseError, GenerationMode,
    GenerationRequest, RequestSpec, StyleConfig, TargetType,
};
pub use validation::{InvalidValidationResult, ValidationResult};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
