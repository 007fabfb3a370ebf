//! Subcommand implementations and the wiring they share.

pub mod create;
pub mod list;

use std::path::Path;

use anyhow::{Context, Result};

use replica_core::{config, secrets, Platform, ReplicaConfig, Secret};
use replica_remote::{GitHubAdapter, GitHubSettings, GitLabAdapter, GitLabSettings, PlatformAdapter};

/// Load `config.yml` from `path`.
pub(crate) fn load_config(path: &Path) -> Result<ReplicaConfig> {
    let config = config::load_config_at(path)
        .with_context(|| format!("cannot load configuration from '{}'", path.display()))?;
    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Read the platform token and build its adapter.
///
/// The token is read only for the platform being addressed; the other one
/// may be absent.
pub(crate) fn connect(
    platform: Platform,
    config: &ReplicaConfig,
) -> Result<(Box<dyn PlatformAdapter>, Secret)> {
    let token = secrets::token_from_env(platform)?;
    let adapter: Box<dyn PlatformAdapter> = match platform {
        Platform::GitLab => {
            let settings = GitLabSettings::from_config(&config.project)?;
            Box::new(GitLabAdapter::new(settings, token.clone()))
        }
        Platform::GitHub => {
            let settings = GitHubSettings::from_config(&config.project)?;
            Box::new(GitHubAdapter::new(settings, token.clone()))
        }
    };
    Ok((adapter, token))
}
