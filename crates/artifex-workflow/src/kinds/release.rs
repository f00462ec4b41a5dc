//! Release pipeline

use super::deploy::DEFAULT_ENVIRONMENT;
use crate::handler::{WorkflowConfig, WorkflowHandler};
use crate::pipeline::{Job, Pipeline, Step, Triggers};
use artifex_registry::Handler;

/// Tag pattern that triggers a release
pub const RELEASE_TAGS: &str = "v*";

/// Build on a version tag, publish the package and cut a release
#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseHandler;

impl Handler for ReleaseHandler {}

impl WorkflowHandler for ReleaseHandler {
    fn key(&self) -> &'static str {
        "release"
    }

    fn build(&self, config: &WorkflowConfig<'_>) -> Pipeline {
        let tc = config.toolchain;
        let environment = config.resolved_environment().unwrap_or(DEFAULT_ENVIRONMENT);

        let build = Job::new("Build release")
            .steps(tc.prelude())
            .step(Step::run("Test", tc.test()))
            .step(Step::run("Build", tc.build()))
            .step(
                Step::uses("Upload build artifact", "actions/upload-artifact@v4")
                    .with("name", "release-output")
                    .with("path", tc.output_dir()),
            );

        let mut publish = Job::new("Publish")
            .needs("build")
            .in_environment(environment)
            .steps(tc.prelude())
            .step(
                Step::uses("Download build artifact", "actions/download-artifact@v4")
                    .with("name", "release-output")
                    .with("path", tc.output_dir()),
            );
        if !config.mentions(&["no publish", "github release only"]) {
            publish = publish.step(Step::run("Publish package", tc.publish()));
        }
        publish = publish.step(
            Step::uses("Create GitHub release", "softprops/action-gh-release@v2")
                .with("files", format!("{}/*", tc.output_dir()))
                .with("generate_release_notes", "true"),
        );

        Pipeline::new(config.name_or("Release"), Triggers::tags(RELEASE_TAGS))
            .with_job("build", build)
            .with_job("release", publish)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Toolchain;

    #[test]
    fn triggered_by_version_tags() {
        let pipeline = ReleaseHandler.build(&WorkflowConfig::new(""));
        let push = pipeline.on.push.as_ref().unwrap();
        assert_eq!(push.tags, vec!["v*"]);
        assert!(push.branches.is_empty());
        assert!(pipeline.on.pull_request.is_none());
    }

    #[test]
    fn publishes_with_toolchain() {
        let config = WorkflowConfig::new("Release the crate").with_toolchain(Toolchain::Cargo);
        let pipeline = ReleaseHandler.build(&config);
        let names: Vec<_> = pipeline.jobs["release"].steps.iter().map(|s| s.name.as_str()).collect();
        assert!(names.contains(&"Publish package"));
        assert_eq!(names.last(), Some(&"Create GitHub release"));
        assert!(pipeline.to_yaml().unwrap().contains("cargo publish --locked"));
    }

    #[test]
    fn publish_step_can_be_skipped() {
        let pipeline = ReleaseHandler.build(&WorkflowConfig::new("GitHub release only"));
        assert!(!pipeline.step_names().any(|n| n == "Publish package"));
    }
}
