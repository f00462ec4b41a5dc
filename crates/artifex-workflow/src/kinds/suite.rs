//! Test suite pipeline

use crate::handler::{WorkflowConfig, WorkflowHandler};
use crate::pipeline::{Job, Pipeline, Step, Triggers};
use artifex_registry::Handler;

/// Test job, plus optional integration and coverage runs
#[derive(Debug, Clone, Copy, Default)]
pub struct TestHandler;

impl Handler for TestHandler {}

impl WorkflowHandler for TestHandler {
    fn key(&self) -> &'static str {
        "test"
    }

    fn build(&self, config: &WorkflowConfig<'_>) -> Pipeline {
        let tc = config.toolchain;
        let mut pipeline = Pipeline::new(
            config.name_or("Test"),
            Triggers::push(config.branch)
                .with_pull_request(config.branch)
                .with_manual(),
        )
        .with_job(
            "unit",
            Job::new("Unit tests")
                .steps(tc.prelude())
                .step(Step::run("Run unit tests", tc.test())),
        );

        if config.mentions(&["integration", "e2e", "end-to-end"]) {
            pipeline = pipeline.with_job(
                "integration",
                Job::new("Integration tests")
                    .needs("unit")
                    .steps(tc.prelude())
                    .step(Step::run("Run integration tests", "make integration-test")),
            );
        }
        if config.mentions(&["coverage"]) {
            pipeline = pipeline.with_job(
                "coverage",
                Job::new("Coverage")
                    .needs("unit")
                    .steps(tc.prelude())
                    .step(Step::run("Measure coverage", tc.coverage())),
            );
        }
        pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_job_only_by_default() {
        let pipeline = TestHandler.build(&WorkflowConfig::new("Check everything"));
        assert_eq!(pipeline.jobs.keys().collect::<Vec<_>>(), vec!["unit"]);
        assert!(pipeline.on.workflow_dispatch.is_some());
    }

    #[test]
    fn optional_jobs_follow_unit() {
        let pipeline = TestHandler.build(&WorkflowConfig::new("Integration tests and coverage"));
        assert_eq!(
            pipeline.jobs.keys().collect::<Vec<_>>(),
            vec!["unit", "integration", "coverage"]
        );
        assert_eq!(pipeline.jobs["coverage"].needs, vec!["unit"]);
    }
}
