//! Engine configuration
//!
//! Loaded from TOML, then optionally overridden from the environment:
//!
//! ```toml
//! [validator]
//! backend = "external"      # external | builtin | disabled
//! command = "mermaid-check"
//! args = ["--stdin"]
//! cache_capacity = 1024
//!
//! [defaults]
//! strict = true
//! repair = true
//! theme = "neutral"
//! direction = "LR"
//! ```

use crate::error::ArtifexError;
use artifex_model::{
    Accessibility, Direction, GenerationMode, GenerationRequest, RequestSpec, StyleConfig,
    TargetType,
};
use artifex_validation::{
    BuiltinProvider, CheckerProvider, ExternalProvider, NullProvider, DEFAULT_CACHE_CAPACITY,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Environment variable overriding [`ValidatorConfig::backend`]
pub const ENV_VALIDATOR_BACKEND: &str = "ARTIFEX_VALIDATOR_BACKEND";

/// Environment variable overriding [`ValidatorConfig::command`]
pub const ENV_VALIDATOR_COMMAND: &str = "ARTIFEX_VALIDATOR_COMMAND";

/// Default external checker executable
pub const DEFAULT_CHECKER_COMMAND: &str = "mermaid-check";

/// Grammar checker backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorBackend {
    /// External executable; skipped when not installed
    #[default]
    External,
    /// In-process structural checker
    Builtin,
    /// No checker; every validation is skipped
    Disabled,
}

impl FromStr for ValidatorBackend {
    type Err = ArtifexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "external" => Ok(Self::External),
            "builtin" => Ok(Self::Builtin),
            "disabled" | "none" | "off" => Ok(Self::Disabled),
            other => Err(ArtifexError::Config(format!(
                "unknown validator backend: '{other}'"
            ))),
        }
    }
}

impl fmt::Display for ValidatorBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::External => "external",
            Self::Builtin => "builtin",
            Self::Disabled => "disabled",
        })
    }
}

/// Validator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Checker backend
    pub backend: ValidatorBackend,
    /// External checker executable
    pub command: String,
    /// Arguments for the external checker
    pub args: Vec<String>,
    /// Maximum memoized validation results
    pub cache_capacity: u64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            backend: ValidatorBackend::default(),
            command: DEFAULT_CHECKER_COMMAND.to_string(),
            args: Vec::new(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl ValidatorConfig {
    /// Provider for the configured backend
    #[must_use]
    pub fn provider(&self) -> Arc<dyn CheckerProvider> {
        match self.backend {
            ValidatorBackend::External => {
                Arc::new(ExternalProvider::new(&self.command).with_args(self.args.iter().cloned()))
            }
            ValidatorBackend::Builtin => Arc::new(BuiltinProvider),
            ValidatorBackend::Disabled => Arc::new(NullProvider),
        }
    }
}

/// Request defaults applied when the caller leaves a setting out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Strict mode
    pub strict: bool,
    /// Repair mode
    pub repair: bool,
    /// Theme name
    pub theme: Option<String>,
    /// Layout direction
    pub direction: Option<Direction>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let mode = GenerationMode::default();
        Self {
            strict: mode.strict,
            repair: mode.repair,
            theme: None,
            direction: None,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Validator settings
    pub validator: ValidatorConfig,
    /// Request defaults
    pub defaults: DefaultsConfig,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML
    ///
    /// # Errors
    /// [`ArtifexError::Config`] on malformed TOML or unknown values.
    pub fn from_toml_str(text: &str) -> Result<Self, ArtifexError> {
        toml::from_str(text).map_err(|e| ArtifexError::Config(e.to_string()))
    }

    /// Apply `ARTIFEX_VALIDATOR_*` overrides from the process environment
    ///
    /// # Errors
    /// [`ArtifexError::Config`] if the backend override is not recognized.
    pub fn apply_env(self) -> Result<Self, ArtifexError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup
    ///
    /// # Errors
    /// [`ArtifexError::Config`] if the backend override is not recognized.
    pub fn apply_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArtifexError> {
        if let Some(backend) = lookup(ENV_VALIDATOR_BACKEND).filter(|v| !v.trim().is_empty()) {
            self.validator.backend = backend.parse()?;
        }
        if let Some(command) = lookup(ENV_VALIDATOR_COMMAND).filter(|v| !v.trim().is_empty()) {
            self.validator.command = command.trim().to_string();
        }
        Ok(self)
    }

    /// With validator backend
    #[inline]
    #[must_use]
    pub fn with_backend(mut self, backend: ValidatorBackend) -> Self {
        self.validator.backend = backend;
        self
    }

    /// With external checker command
    #[inline]
    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.validator.command = command.into();
        self
    }

    /// With request defaults
    #[inline]
    #[must_use]
    pub fn with_defaults(mut self, defaults: DefaultsConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// Build a request from the wire shape, filling gaps from the defaults
    #[must_use]
    pub fn request(&self, spec: RequestSpec) -> GenerationRequest {
        GenerationRequest {
            description: spec.description,
            target: TargetType {
                capability: spec.capability,
                sub_type: spec.sub_type,
            },
            style: StyleConfig {
                theme: spec.theme.or_else(|| self.defaults.theme.clone()),
                direction: spec.direction.or(self.defaults.direction),
            },
            accessibility: Accessibility {
                title: spec.acc_title,
                descr: spec.acc_descr,
            },
            mode: GenerationMode {
                strict: spec.strict.unwrap_or(self.defaults.strict),
                repair: spec.repair.unwrap_or(self.defaults.repair),
            },
            advanced_features: spec.advanced_features,
        }
    }
}
