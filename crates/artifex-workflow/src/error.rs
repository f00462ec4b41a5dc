//! Workflow errors

/// Errors raised while producing a workflow document
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Pipeline could not be encoded as YAML
    #[error("workflow serialization failed: {0}")]
    Serialize(#[from] serde_yaml::Error),
}
