//! Concrete workflow kinds

use crate::handler::WorkflowHandler;
use artifex_registry::{HandlerRegistry, RegistryError};
use std::sync::Arc;

mod ci;
mod deploy;
mod release;
mod suite;

pub use ci::CiHandler;
pub use deploy::{DeployHandler, DEFAULT_ENVIRONMENT};
pub use release::{ReleaseHandler, RELEASE_TAGS};
pub use suite::TestHandler;

/// Sub-type aliases accepted for the `workflow` capability
pub const ALIASES: &[(&str, &str)] = &[
    ("continuous-integration", "ci"),
    ("deployment", "deploy"),
    ("cd", "deploy"),
    ("testing", "test"),
    ("tests", "test"),
    ("publish", "release"),
];

/// Registry holding every built-in workflow kind under its canonical key
///
/// # Errors
///
/// Returns [`RegistryError::DuplicateKey`] if two kinds share a key.
pub fn default_handlers() -> Result<HandlerRegistry<dyn WorkflowHandler>, RegistryError> {
    let handlers: [Arc<dyn WorkflowHandler>; 4] = [
        Arc::new(CiHandler),
        Arc::new(DeployHandler),
        Arc::new(TestHandler),
        Arc::new(ReleaseHandler),
    ];

    let mut registry = HandlerRegistry::new("workflow");
    for handler in handlers {
        registry.register(handler.key(), handler)?;
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::WorkflowConfig;

    #[test]
    fn registers_every_kind() {
        let registry = default_handlers().unwrap();
        assert_eq!(registry.keys(), vec!["ci", "deploy", "test", "release"]);
        for (alias, canonical) in ALIASES {
            assert!(registry.has(canonical), "{alias} -> {canonical}");
        }
    }

    #[test]
    fn every_kind_checks_out_first() {
        let registry = default_handlers().unwrap();
        for (key, handler) in registry.iter() {
            let pipeline = handler.build(&WorkflowConfig::new("anything"));
            for job in pipeline.jobs.values() {
                assert_eq!(job.steps.first().map(|s| s.name.as_str()), Some("Checkout"), "{key}");
            }
        }
    }
}
