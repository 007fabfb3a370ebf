//! The replication state machine.
//!
//! ```text
//! Start → OriginResolved → DestinationCreated → ImportAwaited
//!       → DefaultBranchSet → ArtifactsMaterialized → Done
//! ```
//!
//! Single pass, no rollback. A failure at any stage ends the run and leaves
//! whatever already exists on the platform in place. Only the default-branch
//! step is downgraded to a warning.

use std::fmt;

use replica_core::{derive_name, ArtifactProfile, Platform, RemoteProject, ReplicaConfig, Secret};
use replica_remote::{FileWrite, ImportSource, PlatformAdapter, PollPolicy, UpsertOutcome};
use replica_renderer::ArtifactGenerator;

use crate::error::WorkflowError;
use crate::plan::{self, Plan};

// ---------------------------------------------------------------------------
// Stages and report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Start,
    OriginResolved,
    DestinationCreated,
    ImportAwaited,
    DefaultBranchSet,
    ArtifactsMaterialized,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Start => "start",
            Stage::OriginResolved => "origin-resolved",
            Stage::DestinationCreated => "destination-created",
            Stage::ImportAwaited => "import-awaited",
            Stage::DefaultBranchSet => "default-branch-set",
            Stage::ArtifactsMaterialized => "artifacts-materialized",
            Stage::Done => "done",
        };
        f.write_str(s)
    }
}

/// Outcome of one artifact upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    pub path: String,
    pub outcome: UpsertOutcome,
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub origin: RemoteProject,
    pub destination: RemoteProject,
    pub default_branch: String,
    pub writes: Vec<WriteRecord>,
    /// Non-fatal problems, e.g. a default branch the platform refused.
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// One replication run against a single platform.
///
/// Configuration and the platform token are collected by the caller and
/// handed in here; the workflow never reads the environment.
pub struct ReplicationWorkflow<A: PlatformAdapter> {
    config: ReplicaConfig,
    adapter: A,
    token: Secret,
    generator: ArtifactGenerator,
}

impl<A: PlatformAdapter> ReplicationWorkflow<A> {
    pub fn new(config: ReplicaConfig, adapter: A, token: Secret) -> Result<Self, WorkflowError> {
        Ok(Self {
            config,
            adapter,
            token,
            generator: ArtifactGenerator::new()?,
        })
    }

    pub fn platform(&self) -> Platform {
        self.adapter.platform()
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Read-only discovery: every project in the configured scope.
    pub fn list(&self) -> Result<Vec<RemoteProject>, WorkflowError> {
        Ok(self.adapter.list_projects()?)
    }

    /// Validate, resolve the origin, derive the destination name, and
    /// generate every artifact. Makes no remote mutation.
    pub fn plan(&self, profile: ArtifactProfile) -> Result<Plan, WorkflowError> {
        let platform = self.platform();
        tracing::info!(stage = %Stage::Start, %platform, %profile, "replication");

        let validated = plan::validate(&self.config, platform)?;
        let origin = self.adapter.resolve_project_by_name(&validated.origin_name)?;
        tracing::info!(
            stage = %Stage::OriginResolved,
            origin = %origin.full_path,
            "origin resolved"
        );

        let destination_name =
            derive_name(origin.name.as_str(), &self.config.agency.short_name_template)?;
        let artifacts =
            plan::build_artifacts(&self.generator, &self.config, &validated.users, profile)?;

        Ok(Plan {
            platform,
            profile,
            origin,
            destination_name,
            default_branch: validated.default_branch,
            artifacts,
        })
    }

    /// Full run: plan, then create, import, set branch, and upsert.
    pub fn run(&self, profile: ArtifactProfile) -> Result<RunReport, WorkflowError> {
        let plan = self.plan(profile)?;
        self.execute(plan)
    }

    fn execute(&self, plan: Plan) -> Result<RunReport, WorkflowError> {
        let source = ImportSource::new(
            plan.origin.clone_url.clone(),
            plan::import_username(&self.config, plan.platform)?,
            self.token.clone(),
        );
        let created = self.adapter.create_and_import(
            &plan.destination_name,
            &source,
            &plan.default_branch,
        )?;
        tracing::info!(
            stage = %Stage::DestinationCreated,
            destination = %created.full_path,
            "destination created"
        );

        let policy = PollPolicy::new(
            self.config.project.import_timeout(),
            self.config.project.import_poll_interval(),
        );
        let destination = self.adapter.await_import_completion(&created, policy)?;
        tracing::info!(stage = %Stage::ImportAwaited, status = %destination.import_status, "import complete");

        let mut warnings = Vec::new();
        match self
            .adapter
            .set_default_branch(&destination, &plan.default_branch)
        {
            Ok(()) => tracing::info!(
                stage = %Stage::DefaultBranchSet,
                branch = %plan.default_branch,
                "default branch set"
            ),
            Err(e) => {
                tracing::warn!(error = %e, "default branch not set");
                warnings.push(e.to_string());
            }
        }

        let mut writes = Vec::with_capacity(plan.artifacts.len());
        for artifact in &plan.artifacts {
            let outcome = self.adapter.upsert_file(
                &destination,
                FileWrite {
                    branch: &plan.default_branch,
                    path: &artifact.path,
                    content: &artifact.content,
                    message: artifact.commit_message(),
                },
            )?;
            writes.push(WriteRecord {
                path: artifact.path.clone(),
                outcome,
            });
        }
        tracing::info!(
            stage = %Stage::ArtifactsMaterialized,
            files = writes.len(),
            "artifacts materialized"
        );
        tracing::info!(stage = %Stage::Done, destination = %destination.full_path, "replication complete");

        Ok(RunReport {
            origin: plan.origin,
            destination,
            default_branch: plan.default_branch,
            writes,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_ordered() {
        assert!(Stage::Start < Stage::OriginResolved);
        assert!(Stage::ArtifactsMaterialized < Stage::Done);
        assert_eq!(Stage::DefaultBranchSet.to_string(), "default-branch-set");
    }
}
