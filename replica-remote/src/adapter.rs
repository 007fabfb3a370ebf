//! The [`PlatformAdapter`] capability set shared by GitLab and GitHub.
//!
//! Implementors provide the primitive calls. Origin resolution, the import
//! poll loop, and get-then-branch upserts are default methods so both
//! platforms behave identically.

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use replica_core::config::{DEFAULT_IMPORT_POLL_SECS, DEFAULT_IMPORT_TIMEOUT_SECS};
use replica_core::{ImportStatus, Platform, RemoteProject};

use crate::auth::ImportSource;
use crate::error::RemoteError;

// ---------------------------------------------------------------------------
// Value types
// ---------------------------------------------------------------------------

/// Deadline and fixed cadence for [`PlatformAdapter::await_import_completion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollPolicy {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_IMPORT_TIMEOUT_SECS),
            interval: Duration::from_secs(DEFAULT_IMPORT_POLL_SECS),
        }
    }
}

/// A file as currently stored on a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Platform identity of the current version (GitHub blob sha, GitLab
    /// last commit id), sent back on update.
    pub token: String,
    /// Decoded file bytes.
    pub content: Vec<u8>,
}

/// One file write: destination, payload, and commit message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileWrite<'a> {
    pub branch: &'a str,
    pub path: &'a str,
    pub content: &'a str,
    pub message: &'a str,
}

/// What [`PlatformAdapter::upsert_file`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
    /// The stored content already matched; nothing was committed.
    Unchanged,
}

impl fmt::Display for UpsertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpsertOutcome::Created => write!(f, "created"),
            UpsertOutcome::Updated => write!(f, "updated"),
            UpsertOutcome::Unchanged => write!(f, "unchanged"),
        }
    }
}

// ---------------------------------------------------------------------------
// PlatformAdapter
// ---------------------------------------------------------------------------

/// Everything the workflow needs from a hosting platform.
///
/// The organizational scope (GitLab group, GitHub owner) and credentials are
/// fixed at construction.
pub trait PlatformAdapter {
    fn platform(&self) -> Platform;

    /// Human-readable scope used in diagnostics, e.g. `GitLab group 42`.
    fn scope(&self) -> String;

    /// Every project in scope. No retry.
    fn list_projects(&self) -> Result<Vec<RemoteProject>, RemoteError>;

    /// Create `new_name` in scope and start importing `source` into it.
    /// Returns as soon as the platform accepts the request.
    fn create_and_import(
        &self,
        new_name: &str,
        source: &ImportSource,
        default_branch: &str,
    ) -> Result<RemoteProject, RemoteError>;

    /// Re-read `project`, refreshing its import status and error.
    fn import_status(&self, project: &RemoteProject) -> Result<RemoteProject, RemoteError>;

    fn set_default_branch(&self, project: &RemoteProject, branch: &str) -> Result<(), RemoteError>;

    /// Current version of `path` on `branch`, or `None` if absent.
    fn get_file(
        &self,
        project: &RemoteProject,
        branch: &str,
        path: &str,
    ) -> Result<Option<RemoteFile>, RemoteError>;

    fn create_file(&self, project: &RemoteProject, write: FileWrite<'_>) -> Result<(), RemoteError>;

    fn update_file(
        &self,
        project: &RemoteProject,
        write: FileWrite<'_>,
        existing: &RemoteFile,
    ) -> Result<(), RemoteError>;

    /// Case-insensitive, whitespace-trimmed exact match over [`list_projects`].
    ///
    /// [`list_projects`]: PlatformAdapter::list_projects
    fn resolve_project_by_name(&self, name: &str) -> Result<RemoteProject, RemoteError> {
        self.list_projects()?
            .into_iter()
            .find(|p| p.name.matches(name))
            .ok_or_else(|| RemoteError::OriginNotFound {
                name: name.trim().to_string(),
                scope: self.scope(),
            })
    }

    /// Poll [`import_status`] until the import is terminal.
    ///
    /// `finished` and an absent status are success, `failed` aborts at once
    /// with the platform's message, and a non-terminal status seen after the
    /// deadline is [`RemoteError::ImportTimeout`]. Sleeps `interval` between
    /// probes.
    ///
    /// [`import_status`]: PlatformAdapter::import_status
    fn await_import_completion(
        &self,
        project: &RemoteProject,
        policy: PollPolicy,
    ) -> Result<RemoteProject, RemoteError> {
        // A timeout too large to represent never expires.
        let deadline = Instant::now().checked_add(policy.timeout);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let current = self.import_status(project)?;
            tracing::debug!(
                project = %current.name,
                status = %current.import_status,
                attempt,
                "import status"
            );
            match current.import_status {
                ImportStatus::Finished | ImportStatus::None => return Ok(current),
                ImportStatus::Failed => {
                    return Err(RemoteError::ImportFailed {
                        project: current.name.to_string(),
                        detail: current
                            .import_error
                            .filter(|e| !e.trim().is_empty())
                            .unwrap_or_else(|| "no error message reported".to_string()),
                    })
                }
                ImportStatus::InProgress => {}
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(RemoteError::ImportTimeout {
                    project: current.name.to_string(),
                    timeout: policy.timeout,
                });
            }
            thread::sleep(policy.interval);
        }
    }

    /// Create `write.path` if absent, overwrite it in place if present, and
    /// skip the commit when the stored bytes already match.
    fn upsert_file(
        &self,
        project: &RemoteProject,
        write: FileWrite<'_>,
    ) -> Result<UpsertOutcome, RemoteError> {
        match self.get_file(project, write.branch, write.path)? {
            Some(existing) if existing.content == write.content.as_bytes() => {
                tracing::debug!(path = write.path, "unchanged");
                Ok(UpsertOutcome::Unchanged)
            }
            Some(existing) => {
                self.update_file(project, write, &existing)?;
                tracing::info!(path = write.path, "updated");
                Ok(UpsertOutcome::Updated)
            }
            None => {
                self.create_file(project, write)?;
                tracing::info!(path = write.path, "created");
                Ok(UpsertOutcome::Created)
            }
        }
    }
}

impl<A: PlatformAdapter + ?Sized> PlatformAdapter for Box<A> {
    fn platform(&self) -> Platform {
        (**self).platform()
    }

    fn scope(&self) -> String {
        (**self).scope()
    }

    fn list_projects(&self) -> Result<Vec<RemoteProject>, RemoteError> {
        (**self).list_projects()
    }

    fn create_and_import(
        &self,
        new_name: &str,
        source: &ImportSource,
        default_branch: &str,
    ) -> Result<RemoteProject, RemoteError> {
        (**self).create_and_import(new_name, source, default_branch)
    }

    fn import_status(&self, project: &RemoteProject) -> Result<RemoteProject, RemoteError> {
        (**self).import_status(project)
    }

    fn set_default_branch(&self, project: &RemoteProject, branch: &str) -> Result<(), RemoteError> {
        (**self).set_default_branch(project, branch)
    }

    fn get_file(
        &self,
        project: &RemoteProject,
        branch: &str,
        path: &str,
    ) -> Result<Option<RemoteFile>, RemoteError> {
        (**self).get_file(project, branch, path)
    }

    fn create_file(&self, project: &RemoteProject, write: FileWrite<'_>) -> Result<(), RemoteError> {
        (**self).create_file(project, write)
    }

    fn update_file(
        &self,
        project: &RemoteProject,
        write: FileWrite<'_>,
        existing: &RemoteFile,
    ) -> Result<(), RemoteError> {
        (**self).update_file(project, write, existing)
    }

    fn resolve_project_by_name(&self, name: &str) -> Result<RemoteProject, RemoteError> {
        (**self).resolve_project_by_name(name)
    }

    fn await_import_completion(
        &self,
        project: &RemoteProject,
        policy: PollPolicy,
    ) -> Result<RemoteProject, RemoteError> {
        (**self).await_import_completion(project, policy)
    }

    fn upsert_file(
        &self,
        project: &RemoteProject,
        write: FileWrite<'_>,
    ) -> Result<UpsertOutcome, RemoteError> {
        (**self).upsert_file(project, write)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
