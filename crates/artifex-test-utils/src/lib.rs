//! Testing utilities for the Artifex workspace
//!
//! Scripted checker providers, request builders and tracing setup.

#![allow(missing_docs)]

use artifex_model::{GenerationRequest, TargetType};
use artifex_validation::{CheckError, CheckerProvider, GrammarChecker};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Install a test subscriber honoring `RUST_LOG`; repeated calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Diagram request for `sub_type` with default style and mode
pub fn request(sub_type: &str, description: &str) -> GenerationRequest {
    GenerationRequest::new(
        description,
        TargetType::with_sub_type("diagram", sub_type),
    )
}

type Verdict = dyn Fn(&str) -> Result<(), CheckError> + Send + Sync;

/// Checker whose verdict comes from a closure; counts parse calls
pub struct ScriptedChecker {
    verdict: Arc<Verdict>,
    parses: Arc<AtomicUsize>,
}

#[async_trait]
impl GrammarChecker for ScriptedChecker {
    async fn parse(&self, code: &str) -> Result<(), CheckError> {
        self.parses.fetch_add(1, Ordering::SeqCst);
        (self.verdict)(code)
    }
}

/// Provider handing out a [`ScriptedChecker`]
///
/// Counts loads, optionally sleeps inside `load` so concurrent callers
/// overlap, and can be told to fail the load itself.
pub struct ScriptedProvider {
    verdict: Arc<Verdict>,
    load_error: Option<CheckError>,
    delay: Duration,
    loads: Arc<AtomicUsize>,
    parses: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    /// Accept everything
    pub fn accepting() -> Self {
        Self::with_verdict(|_| Ok(()))
    }

    /// Reject code for which `accept` returns false with a syntax error
    pub fn accepting_only(accept: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self::with_verdict(move |code| {
            if accept(code) {
                Ok(())
            } else {
                Err(CheckError::Syntax(
                    "Parse error on line 1: unexpected token".to_string(),
                ))
            }
        })
    }

    pub fn with_verdict(
        verdict: impl Fn(&str) -> Result<(), CheckError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            verdict: Arc::new(verdict),
            load_error: None,
            delay: Duration::ZERO,
            loads: Arc::default(),
            parses: Arc::default(),
        }
    }

    /// Load fails with `err`
    pub fn failing(err: CheckError) -> Self {
        Self {
            load_error: Some(err),
            ..Self::accepting()
        }
    }

    /// Sleep for `delay` inside every load
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Shared load counter
    pub fn loads(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.loads)
    }

    /// Shared parse counter
    pub fn parses(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.parses)
    }
}

#[async_trait]
impl CheckerProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn load(&self) -> Result<Arc<dyn GrammarChecker>, CheckError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(err) = &self.load_error {
            return Err(err.clone());
        }
        Ok(Arc::new(ScriptedChecker {
            verdict: Arc::clone(&self.verdict),
            parses: Arc::clone(&self.parses),
        }))
    }
}

/// Provider whose load reports the checker module as missing
pub fn unavailable_provider() -> ScriptedProvider {
    ScriptedProvider::failing(CheckError::Unavailable(
        "Cannot find module 'mermaid'".to_string(),
    ))
}
