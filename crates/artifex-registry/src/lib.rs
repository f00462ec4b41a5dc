//! Artifex Registry
//!
//! Keyed dispatch shared by the capability tier and the sub-type tier.
//!
//! # Core Concepts
//!
//! - [`Handler`]: base trait every registered handler implements
//! - [`HandlerRegistry`]: immutable-after-bootstrap map from canonical key to handler
//! - [`Normalizer`]: alias tables applied before lookup
//!
//! # Example
//!
//! ```rust
//! use artifex_registry::{Handler, HandlerRegistry, Normalizer};
//! use std::sync::Arc;
//!
//! trait Format: Handler {
//!     fn header(&self) -> &'static str;
//! }
//!
//! struct Pie;
//! impl Handler for Pie {}
//! impl Format for Pie {
//!     fn header(&self) -> &'static str { "pie" }
//! }
//!
//! let mut registry: HandlerRegistry<dyn Format> = HandlerRegistry::new("format");
//! registry.register("pie", Arc::new(Pie)).unwrap();
//!
//! let normalizer = Normalizer::new().with_sub_type_aliases("diagram", &[("pieChart", "pie")]);
//! let key = normalizer.sub_type("diagram", "pieChart");
//! assert_eq!(registry.get(key).unwrap().header(), "pie");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod normalizer;
mod registry;

pub use error::RegistryError;
pub use normalizer::Normalizer;
pub use registry::{Handler, HandlerRegistry};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
