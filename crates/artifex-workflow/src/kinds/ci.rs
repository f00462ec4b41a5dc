//! Continuous integration pipeline

use crate::handler::{WorkflowConfig, WorkflowHandler};
use crate::pipeline::{Job, Pipeline, Step, Triggers};
use artifex_registry::Handler;

/// Lint, build and test on every push and pull request
#[derive(Debug, Clone, Copy, Default)]
pub struct CiHandler;

impl Handler for CiHandler {}

impl WorkflowHandler for CiHandler {
    fn key(&self) -> &'static str {
        "ci"
    }

    fn build(&self, config: &WorkflowConfig<'_>) -> Pipeline {
        let tc = config.toolchain;
        let mut job = Job::new("Build and test")
            .steps(tc.prelude())
            .step(Step::run("Lint", tc.lint()))
            .step(Step::run("Build", tc.build()))
            .step(Step::run("Test", tc.test()));
        if config.mentions(&["coverage"]) {
            job = job.step(Step::run("Coverage", tc.coverage()));
        }

        Pipeline::new(
            config.name_or("CI"),
            Triggers::push(config.branch).with_pull_request(config.branch),
        )
        .with_job("build", job)
    }
}
