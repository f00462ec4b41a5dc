//! Serializable pipeline document
//!
//! Field names follow the GitHub Actions workflow schema, so the YAML
//! emitted by [`Pipeline::to_yaml`] can be committed as-is.

use crate::error::WorkflowError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Complete workflow document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Display name
    pub name: String,
    /// Trigger conditions
    pub on: Triggers,
    /// Workflow-level environment variables
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,
    /// Jobs keyed by id, in execution order
    pub jobs: IndexMap<String, Job>,
}

impl Pipeline {
    /// Empty pipeline with triggers
    #[must_use]
    pub fn new(name: impl Into<String>, on: Triggers) -> Self {
        Self {
            name: name.into(),
            on,
            env: IndexMap::new(),
            jobs: IndexMap::new(),
        }
    }

    /// With a workflow-level environment variable
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// With a job appended under `id`
    #[must_use]
    pub fn with_job(mut self, id: impl Into<String>, job: Job) -> Self {
        self.jobs.insert(id.into(), job);
        self
    }

    /// Names of every step, job by job
    pub fn step_names(&self) -> impl Iterator<Item = &str> {
        self.jobs
            .values()
            .flat_map(|job| job.steps.iter().map(|s| s.name.as_str()))
    }

    /// Render as YAML
    ///
    /// # Errors
    /// [`WorkflowError::Serialize`] if the document cannot be encoded.
    pub fn to_yaml(&self) -> Result<String, WorkflowError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Events that start the workflow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Triggers {
    /// Push to matching branches or tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<RefFilter>,
    /// Pull requests against matching branches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<RefFilter>,
    /// Manual dispatch (serialized as an empty map)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_dispatch: Option<IndexMap<String, String>>,
}

impl Triggers {
    /// Push to `branch`
    #[must_use]
    pub fn push(branch: &str) -> Self {
        Self {
            push: Some(RefFilter::branches([branch])),
            ..Self::default()
        }
    }

    /// Push of tags matching `pattern`
    #[must_use]
    pub fn tags(pattern: &str) -> Self {
        Self {
            push: Some(RefFilter::tags([pattern])),
            ..Self::default()
        }
    }

    /// Also on pull requests against `branch`
    #[must_use]
    pub fn with_pull_request(mut self, branch: &str) -> Self {
        self.pull_request = Some(RefFilter::branches([branch]));
        self
    }

    /// Also on manual dispatch
    #[must_use]
    pub fn with_manual(mut self) -> Self {
        self.workflow_dispatch = Some(IndexMap::new());
        self
    }
}

/// Branch or tag filter for a trigger
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefFilter {
    /// Branch names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<String>,
    /// Tag patterns
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl RefFilter {
    /// Filter on branch names
    #[must_use]
    pub fn branches<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            branches: names.into_iter().map(str::to_string).collect(),
            tags: Vec::new(),
        }
    }

    /// Filter on tag patterns
    #[must_use]
    pub fn tags<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            branches: Vec::new(),
            tags: patterns.into_iter().map(str::to_string).collect(),
        }
    }
}

/// One job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Display name
    pub name: String,
    /// Runner label
    #[serde(rename = "runs-on")]
    pub runs_on: String,
    /// Deployment environment the job targets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Jobs that must finish first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub needs: Vec<String>,
    /// Steps in order
    pub steps: Vec<Step>,
}

/// Default runner label
pub const DEFAULT_RUNNER: &str = "ubuntu-latest";

impl Job {
    /// Job on the default runner with no steps
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            runs_on: DEFAULT_RUNNER.to_string(),
            environment: None,
            needs: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Depends on job `id`
    #[must_use]
    pub fn needs(mut self, id: impl Into<String>) -> Self {
        self.needs.push(id.into());
        self
    }

    /// Targets `environment`
    #[must_use]
    pub fn in_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Append a step
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Append several steps
    #[must_use]
    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }
}

/// One step: either an action (`uses`) or a shell command (`run`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Display name
    pub name: String,
    /// Action reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,
    /// Action inputs
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub with: IndexMap<String, String>,
    /// Shell command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,
}

impl Step {
    /// Action step
    #[must_use]
    pub fn uses(name: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uses: Some(action.into()),
            with: IndexMap::new(),
            run: None,
        }
    }

    /// Shell step
    #[must_use]
    pub fn run(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uses: None,
            with: IndexMap::new(),
            run: Some(command.into()),
        }
    }

    /// With an action input
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with.insert(key.into(), value.into());
        self
    }

    /// Repository checkout
    #[must_use]
    pub fn checkout() -> Self {
        Self::uses("Checkout", "actions/checkout@v4")
    }
}
