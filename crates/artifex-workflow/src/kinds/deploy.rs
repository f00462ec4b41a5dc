//! Deployment pipeline

use crate::handler::{WorkflowConfig, WorkflowHandler};
use crate::pipeline::{Job, Pipeline, Step, Triggers};
use artifex_registry::Handler;

/// Environment used when none is named
pub const DEFAULT_ENVIRONMENT: &str = "production";

/// Build job producing an artifact, then a deploy job consuming it
#[derive(Debug, Clone, Copy, Default)]
pub struct DeployHandler;

impl Handler for DeployHandler {}

impl WorkflowHandler for DeployHandler {
    fn key(&self) -> &'static str {
        "deploy"
    }

    fn build(&self, config: &WorkflowConfig<'_>) -> Pipeline {
        let tc = config.toolchain;
        let environment = config.resolved_environment().unwrap_or(DEFAULT_ENVIRONMENT);

        let build = Job::new("Build")
            .steps(tc.prelude())
            .step(Step::run("Build", tc.build()))
            .step(Step::run("Test", tc.test()))
            .step(
                Step::uses("Upload build artifact", "actions/upload-artifact@v4")
                    .with("name", "build-output")
                    .with("path", tc.output_dir()),
            );

        let mut deploy = Job::new(format!("Deploy to {environment}"))
            .needs("build")
            .in_environment(environment)
            .step(Step::checkout())
            .step(
                Step::uses("Download build artifact", "actions/download-artifact@v4")
                    .with("name", "build-output")
                    .with("path", tc.output_dir()),
            )
            .step(Step::run(
                format!("Deploy to {environment}"),
                "./scripts/deploy.sh \"$DEPLOY_ENV\"",
            ));
        if config.mentions(&["smoke", "health check", "healthcheck", "verify"]) {
            deploy = deploy.step(Step::run("Smoke test", "./scripts/smoke-test.sh \"$DEPLOY_ENV\""));
        }

        Pipeline::new(
            config.name_or("Deploy"),
            Triggers::push(config.branch).with_manual(),
        )
        .with_env("DEPLOY_ENV", environment)
        .with_job("build", build)
        .with_job("deploy", deploy)
    }
}
