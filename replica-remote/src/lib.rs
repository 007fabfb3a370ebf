//! # replica-remote
//!
//! The [`PlatformAdapter`] capability set and its two realizations,
//! [`GitLabAdapter`] and [`GitHubAdapter`], over a blocking HTTP
//! [`Transport`].
//!
//! Every call is a single synchronous request with no retry. Credentials are
//! fixed when an adapter is constructed; nothing here reads the environment.

pub mod adapter;
pub mod auth;
pub mod error;
pub mod github;
pub mod gitlab;
pub mod transport;

pub use adapter::{FileWrite, PlatformAdapter, PollPolicy, RemoteFile, UpsertOutcome};
pub use auth::{build_auth_url, ImportSource};
pub use error::{RemoteError, TransportError};
pub use github::{GitHubAdapter, GitHubSettings};
pub use gitlab::{GitLabAdapter, GitLabSettings};
pub use transport::{ApiRequest, ApiResponse, Method, Transport, UreqTransport};
