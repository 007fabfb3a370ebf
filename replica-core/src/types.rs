//! Domain types for a replication run.
//!
//! Everything here is built once per invocation and discarded afterwards;
//! remote records are never cached between runs.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for a project (repository) on a hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectName(pub String);

impl ProjectName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison on trimmed names, the way origin lookup
    /// matches configured names against remote listings.
    pub fn matches(&self, other: &str) -> bool {
        self.0.trim().to_lowercase() == other.trim().to_lowercase()
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProjectName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The hosting platform a run targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    GitLab,
    GitHub,
}

impl Platform {
    /// Environment variable carrying this platform's API token.
    pub fn token_env_key(&self) -> &'static str {
        match self {
            Platform::GitLab => "GITLAB_TOKEN",
            Platform::GitHub => "GITHUB_TOKEN",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::GitLab => write!(f, "gitlab"),
            Platform::GitHub => write!(f, "github"),
        }
    }
}

/// Which content bundle is materialized after the import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactProfile {
    /// Privacy template CSV.
    Register,
    /// AOO / UO CSVs.
    Protocol,
}

impl fmt::Display for ArtifactProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactProfile::Register => write!(f, "register"),
            ArtifactProfile::Protocol => write!(f, "protocol"),
        }
    }
}

/// Import state of a remote project, normalised across platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    /// No import pending: the platform reported no status or `none`.
    #[default]
    None,
    InProgress,
    Finished,
    Failed,
}

impl ImportStatus {
    /// Whether the poll loop may stop on this status.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ImportStatus::InProgress)
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportStatus::None => write!(f, "none"),
            ImportStatus::InProgress => write!(f, "in_progress"),
            ImportStatus::Finished => write!(f, "finished"),
            ImportStatus::Failed => write!(f, "failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A project as reported by the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteProject {
    /// Platform-assigned numeric id.
    pub id: u64,
    pub name: ProjectName,
    /// Namespaced path (`group/sub/name` on GitLab, `owner/name` on GitHub).
    pub full_path: String,
    /// Plain HTTP(S) clone URL, without credentials.
    pub clone_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub import_status: ImportStatus,
    /// Platform-supplied message accompanying a failed import.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_error: Option<String>,
}

/// One configured user, keyed by its 1-based position (`user1`, `user2`, …).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntry {
    pub index: usize,
    pub name: String,
}

impl UserEntry {
    /// Positional key under the `users` section.
    pub fn key(&self) -> String {
        format!("user{}", self.index)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
