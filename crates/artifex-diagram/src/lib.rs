//! Artifex Diagram
//!
//! Sub-type handlers for the `diagram` capability. Each handler turns a
//! free-text description into Mermaid source for one diagram family by
//! shallow keyword scanning; there is no model inference involved.
//!
//! # Core Concepts
//!
//! - [`DiagramFormat`]: typed per-format contract (elements, header, capabilities)
//! - [`DiagramHandler`]: object-safe view stored in a [`HandlerRegistry`](artifex_registry::HandlerRegistry)
//! - [`default_handlers`]: registry with all twelve built-in formats
//!
//! # Example
//!
//! ```rust
//! use artifex_diagram::{default_handlers, DiagramConfig};
//! use artifex_model::{AdvancedFeatures, Direction};
//!
//! let registry = default_handlers().unwrap();
//! let features = AdvancedFeatures::new();
//! let code = registry.get("flowchart").unwrap().generate(&DiagramConfig {
//!     description: "Receive order. Check stock. Ship",
//!     direction: Some(Direction::LR),
//!     features: &features,
//! });
//!
//! assert!(code.starts_with("flowchart LR"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod base;
pub mod formats;
pub mod scan;

pub use base::{
    apply_direction, apply_theme, sanitize_id, sanitize_label, DiagramConfig, DiagramFormat,
    DiagramHandler, DirectionStyle, FormatCapabilities,
};
pub use formats::{default_handlers, ALIASES};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
