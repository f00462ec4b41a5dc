//! Artifex Validation
//!
//! Correctness tooling for generated diagram source: an async
//! [`Validator`] wrapping an optional grammar checker, a deterministic
//! [`repair`] pass and the [`fallback`] skeleton used in strict mode.
//!
//! # Core Concepts
//!
//! - [`CheckerProvider`]: loads a [`GrammarChecker`]; injectable for tests
//! - [`Validator`]: single-flight loader, graceful degradation, result memo
//! - [`repair`]: idempotent heuristic rewrite
//! - [`fallback`]: always-valid flowchart skeleton
//!
//! # Example
//!
//! ```rust
//! use artifex_validation::{fallback, repair, StructuralChecker};
//!
//! let fixed = repair("```mermaid\nA --> B\n```");
//! assert_eq!(fixed, "flowchart TD\nA --> B");
//! assert!(StructuralChecker::check(&fixed).is_ok());
//! assert!(StructuralChecker::check(&fallback()).is_ok());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod fallback;
mod grammar;
mod provider;
mod repair;
mod validator;

pub use error::CheckError;
pub use fallback::{fallback, FALLBACK_SKELETON};
pub use grammar::KNOWN_HEADERS;
pub use provider::{
    BuiltinProvider, CheckerProvider, ExternalProvider, GrammarChecker, NullProvider,
    StructuralChecker,
};
pub use repair::repair;
pub use validator::{LoaderStatus, Validator, DEFAULT_CACHE_CAPACITY};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
