//! Error types for replica-remote.

use std::time::Duration;

use thiserror::Error;

/// A request that never produced an HTTP status (DNS, TLS, timeout, reset).
#[derive(Debug, Clone, Error)]
#[error("{method} {url}: {detail}")]
pub struct TransportError {
    pub method: &'static str,
    pub url: String,
    pub detail: String,
}

/// All errors that can arise from a platform adapter.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Listing projects in the configured scope failed.
    #[error("cannot list projects in {scope}: {detail}")]
    List { scope: String, detail: String },

    /// No project in scope matches the configured origin name.
    #[error("origin project '{name}' not found in {scope}")]
    OriginNotFound { name: String, scope: String },

    /// The platform rejected creation of the destination or the import request.
    #[error("cannot create project '{name}': {detail}")]
    Create { name: String, detail: String },

    /// The platform explicitly reported the import as failed.
    #[error("import into '{project}' failed: {detail}")]
    ImportFailed { project: String, detail: String },

    /// The import did not reach a terminal state before the deadline.
    #[error("import into '{project}' did not complete within {}s", .timeout.as_secs())]
    ImportTimeout { project: String, timeout: Duration },

    /// Reading the import status returned an HTTP error.
    #[error("cannot read import status of '{project}': {detail}")]
    Status { project: String, detail: String },

    /// Setting the default branch was refused.
    #[error("cannot set default branch '{branch}' on '{project}': {detail}")]
    DefaultBranch {
        project: String,
        branch: String,
        detail: String,
    },

    /// Reading or writing a repository file failed.
    #[error("cannot write {path}: {detail}")]
    Write { path: String, detail: String },

    /// Transport failure outside the list, create, and write operations.
    #[error("request failed: {0}")]
    Transport(#[from] TransportError),

    /// A successful response carried an unexpected body.
    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}
