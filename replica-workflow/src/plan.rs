//! Pre-flight: validation and artifact generation.
//!
//! Everything here is local and pure, so a plan can be built and shown
//! (`--dry-run`) without touching the destination platform.

use replica_core::{
    ArtifactProfile, ConfigError, Platform, RemoteProject, ReplicaConfig, UserEntry,
};
use replica_renderer::{Artifact, ArtifactGenerator, RenderError};

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Local inputs that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    /// Trimmed origin project name as configured.
    pub origin_name: String,
    pub users: Vec<UserEntry>,
    pub default_branch: String,
}

/// Check every local input a create run depends on.
///
/// Order: agency fields, platform addressing, origin name, users. Runs before
/// any remote call.
pub fn validate(config: &ReplicaConfig, platform: Platform) -> Result<Validated, ConfigError> {
    config.agency.validate()?;
    config.project.require_for(platform)?;
    let origin_name = config.project.origin_name()?.to_string();
    let users = config.users()?;
    Ok(Validated {
        origin_name,
        users,
        default_branch: config.project.default_branch().to_string(),
    })
}

/// Account the platform uses to fetch the origin during import.
pub fn import_username(config: &ReplicaConfig, platform: Platform) -> Result<String, ConfigError> {
    match platform {
        Platform::GitLab => config
            .project
            .gitlab_username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .ok_or(ConfigError::MissingField("project_config.gitlab_username")),
        Platform::GitHub => Ok(config.project.github_owner()?.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// Every file to materialize, in write order: one settings file per user,
/// then the register CSV or the non-empty AOO/UO CSVs.
pub fn build_artifacts(
    generator: &ArtifactGenerator,
    config: &ReplicaConfig,
    users: &[UserEntry],
    profile: ArtifactProfile,
) -> Result<Vec<Artifact>, RenderError> {
    let mut artifacts = Vec::with_capacity(users.len() + 2);
    for user in users {
        artifacts.push(generator.user_settings(&config.agency, user.name.trim())?);
    }
    match profile {
        ArtifactProfile::Register => artifacts.push(generator.register_csv(&config.register)?),
        ArtifactProfile::Protocol => {
            artifacts.extend(generator.protocol_csvs(&config.protocol)?.into_vec())
        }
    }
    Ok(artifacts)
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// What a create run will do, resolved up to the first remote mutation.
#[derive(Debug, Clone)]
pub struct Plan {
    pub platform: Platform,
    pub profile: ArtifactProfile,
    pub origin: RemoteProject,
    pub destination_name: String,
    pub default_branch: String,
    pub artifacts: Vec<Artifact>,
}
