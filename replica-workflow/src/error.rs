//! Error types for replica-workflow.

use thiserror::Error;

use replica_core::{ConfigError, NamePatternError};
use replica_remote::RemoteError;
use replica_renderer::RenderError;

/// Every way a replication run can stop. All of them are terminal.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Missing or invalid local configuration or secrets.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The origin name lacks the replaceable suffix.
    #[error(transparent)]
    NamePattern(#[from] NamePatternError),

    /// A platform call failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// An artifact could not be generated.
    #[error("cannot generate artifacts: {0}")]
    Render(#[from] RenderError),
}
