//! Workflow handler contract, toolchains and environment inference

use crate::error::WorkflowError;
use crate::pipeline::{Pipeline, Step};
use artifex_registry::Handler;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Build toolchain a pipeline drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toolchain {
    /// Rust / cargo
    Cargo,
    /// Node.js / npm
    Npm,
    /// Python / pip
    Pip,
    /// Anything else, driven through make targets
    #[default]
    Make,
}

const CARGO_MARKERS: &[&str] = &["cargo", "rust", "crate"];
const NPM_MARKERS: &[&str] = &["npm", "node", "javascript", "typescript", "package.json", "yarn"];
const PIP_MARKERS: &[&str] = &["python", "pip", "pytest", "requirements.txt", "pyproject", "django"];

impl Toolchain {
    /// Infer from free text (domain result dump, primary document)
    ///
    /// The first family with a marker word wins, checked cargo, npm, pip.
    #[must_use]
    pub fn infer(text: &str) -> Self {
        let lower = text.to_lowercase();
        let hit = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));
        if hit(CARGO_MARKERS) {
            Self::Cargo
        } else if hit(NPM_MARKERS) {
            Self::Npm
        } else if hit(PIP_MARKERS) {
            Self::Pip
        } else {
            Self::Make
        }
    }

    /// Lowercase name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cargo => "cargo",
            Self::Npm => "npm",
            Self::Pip => "pip",
            Self::Make => "make",
        }
    }

    /// Toolchain installation step, if the runner lacks it
    #[must_use]
    pub fn setup(&self) -> Option<Step> {
        match self {
            Self::Cargo => Some(Step::uses("Set up Rust", "dtolnay/rust-toolchain@stable")),
            Self::Npm => Some(
                Step::uses("Set up Node.js", "actions/setup-node@v4").with("node-version", "20"),
            ),
            Self::Pip => Some(
                Step::uses("Set up Python", "actions/setup-python@v5")
                    .with("python-version", "3.12"),
            ),
            Self::Make => None,
        }
    }

    /// Dependency installation command
    #[must_use]
    pub fn install(&self) -> &'static str {
        match self {
            Self::Cargo => "cargo fetch --locked",
            Self::Npm => "npm ci",
            Self::Pip => "pip install -r requirements.txt",
            Self::Make => "make deps",
        }
    }

    /// Lint command
    #[must_use]
    pub fn lint(&self) -> &'static str {
        match self {
            Self::Cargo => "cargo clippy --all-targets -- -D warnings",
            Self::Npm => "npm run lint",
            Self::Pip => "python -m ruff check .",
            Self::Make => "make lint",
        }
    }

    /// Build command
    #[must_use]
    pub fn build(&self) -> &'static str {
        match self {
            Self::Cargo => "cargo build --release --locked",
            Self::Npm => "npm run build",
            Self::Pip => "python -m build",
            Self::Make => "make build",
        }
    }

    /// Test command
    #[must_use]
    pub fn test(&self) -> &'static str {
        match self {
            Self::Cargo => "cargo test --workspace --locked",
            Self::Npm => "npm test",
            Self::Pip => "python -m pytest",
            Self::Make => "make test",
        }
    }

    /// Coverage command
    #[must_use]
    pub fn coverage(&self) -> &'static str {
        match self {
            Self::Cargo => "cargo llvm-cov --workspace --lcov --output-path lcov.info",
            Self::Npm => "npm test -- --coverage",
            Self::Pip => "python -m pytest --cov --cov-report=xml",
            Self::Make => "make coverage",
        }
    }

    /// Package publication command
    #[must_use]
    pub fn publish(&self) -> &'static str {
        match self {
            Self::Cargo => "cargo publish --locked",
            Self::Npm => "npm publish",
            Self::Pip => "python -m twine upload dist/*",
            Self::Make => "make publish",
        }
    }

    /// Directory holding build outputs
    #[must_use]
    pub fn output_dir(&self) -> &'static str {
        match self {
            Self::Cargo => "target/release",
            Self::Npm | Self::Pip => "dist",
            Self::Make => "build",
        }
    }

    /// Checkout, toolchain setup and dependency install
    #[must_use]
    pub fn prelude(&self) -> Vec<Step> {
        let mut steps = vec![Step::checkout()];
        steps.extend(self.setup());
        steps.push(Step::run("Install dependencies", self.install()));
        steps
    }
}

impl fmt::Display for Toolchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Toolchain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cargo" | "rust" => Ok(Self::Cargo),
            "npm" | "node" | "nodejs" => Ok(Self::Npm),
            "pip" | "python" => Ok(Self::Pip),
            "make" | "generic" => Ok(Self::Make),
            other => Err(format!("unknown toolchain: '{other}'")),
        }
    }
}

/// Environments recognized in free text, in priority order
pub const ENVIRONMENTS: &[(&str, &[&str])] = &[
    ("production", &["production", "prod", "live"]),
    ("staging", &["staging", "stage", "preprod"]),
    ("development", &["development", "dev"]),
];

/// Target environment named in `text`, matched on whole words
#[must_use]
pub fn infer_environment(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    ENVIRONMENTS
        .iter()
        .find(|(_, markers)| markers.iter().any(|m| words.contains(m)))
        .map(|(name, _)| *name)
}

/// Generation input for a workflow handler
#[derive(Debug, Clone, Copy)]
pub struct WorkflowConfig<'a> {
    /// Description mined for optional steps
    pub description: &'a str,
    /// Explicit pipeline name
    pub name: Option<&'a str>,
    /// Explicit target environment
    pub environment: Option<&'a str>,
    /// Toolchain to drive
    pub toolchain: Toolchain,
    /// Default branch
    pub branch: &'a str,
}

impl<'a> WorkflowConfig<'a> {
    /// Config with defaults: inferred environment, make toolchain, `main`
    #[must_use]
    pub fn new(description: &'a str) -> Self {
        Self {
            description,
            name: None,
            environment: None,
            toolchain: Toolchain::default(),
            branch: "main",
        }
    }

    /// With toolchain
    #[must_use]
    pub fn with_toolchain(mut self, toolchain: Toolchain) -> Self {
        self.toolchain = toolchain;
        self
    }

    /// With explicit environment
    #[must_use]
    pub fn with_environment(mut self, environment: Option<&'a str>) -> Self {
        self.environment = environment;
        self
    }

    /// With explicit pipeline name
    #[must_use]
    pub fn with_name(mut self, name: Option<&'a str>) -> Self {
        self.name = name;
        self
    }

    /// Explicit environment, else one named in the description
    #[must_use]
    pub fn resolved_environment(&self) -> Option<&'a str> {
        self.environment
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .or_else(|| infer_environment(self.description))
    }

    /// Explicit name, else `default`
    #[must_use]
    pub fn name_or(&self, default: &'a str) -> &'a str {
        self.name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or(default)
    }

    /// Whether the description mentions any of `words`
    #[must_use]
    pub fn mentions(&self, words: &[&str]) -> bool {
        let lower = self.description.to_lowercase();
        words.iter().any(|w| lower.contains(w))
    }
}

/// Object-safe workflow handler stored in the sub-type registry
pub trait WorkflowHandler: Handler {
    /// Canonical key (`ci`, `deploy`, ...)
    fn key(&self) -> &'static str;

    /// Build the pipeline; pure function of `config`
    fn build(&self, config: &WorkflowConfig<'_>) -> Pipeline;

    /// Build and render as YAML
    ///
    /// # Errors
    /// [`WorkflowError::Serialize`] if encoding fails.
    fn generate(&self, config: &WorkflowConfig<'_>) -> Result<String, WorkflowError> {
        let pipeline = self.build(config);
        tracing::debug!(
            workflow = self.key(),
            toolchain = %config.toolchain,
            jobs = pipeline.jobs.len(),
            "rendering workflow"
        );
        pipeline.to_yaml()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toolchain_inference() {
        assert_eq!(Toolchain::infer("A Rust service built with Cargo"), Toolchain::Cargo);
        assert_eq!(Toolchain::infer("{\"language\":\"TypeScript\"}"), Toolchain::Npm);
        assert_eq!(Toolchain::infer("Django app, pytest suite"), Toolchain::Pip);
        assert_eq!(Toolchain::infer("C firmware"), Toolchain::Make);
    }

    #[test]
    fn toolchain_from_str() {
        assert_eq!("Rust".parse::<Toolchain>(), Ok(Toolchain::Cargo));
        assert_eq!("node".parse::<Toolchain>(), Ok(Toolchain::Npm));
        assert!("gradle".parse::<Toolchain>().is_err());
    }

    #[test]
    fn environment_inference_matches_words() {
        assert_eq!(infer_environment("Ship to staging first"), Some("staging"));
        assert_eq!(infer_environment("prod rollout"), Some("production"));
        assert_eq!(infer_environment("developer docs"), None);
        assert_eq!(infer_environment("dev and production"), Some("production"));
    }

    #[test]
    fn explicit_environment_wins() {
        let config = WorkflowConfig::new("deploy to staging").with_environment(Some("qa"));
        assert_eq!(config.resolved_environment(), Some("qa"));
        let config = WorkflowConfig::new("deploy to staging").with_environment(Some("  "));
        assert_eq!(config.resolved_environment(), Some("staging"));
    }

    #[test]
    fn prelude_skips_setup_for_make() {
        assert_eq!(Toolchain::Make.prelude().len(), 2);
        assert_eq!(Toolchain::Cargo.prelude().len(), 3);
    }
}
