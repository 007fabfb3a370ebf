//! Replica: replicate a template project on GitLab or GitHub and seed it
//! with per-agency settings.
//!
//! # Usage
//!
//! ```text
//! replica [--config <path>] ls-remote-prj <gitlab|github> [--json]
//! replica [--config <path>] create-remote-prj <gitlab|github> <register|protocol> [--dry-run]
//! ```
//!
//! Tokens come from `GITLAB_TOKEN` / `GITHUB_TOKEN`, read only for the
//! platform being addressed.

mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use commands::{create::CreateArgs, list::ListArgs};
use replica_core::{ArtifactProfile, Platform};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "replica",
    version,
    about = "Replicate a template project on GitLab or GitHub and seed its settings",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML configuration document.
    #[arg(long, global = true, env = "REPLICA_CONFIG", default_value = "config.yml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List projects in the configured group or owner.
    #[command(name = "ls-remote-prj")]
    LsRemotePrj(ListArgs),

    /// Create a project from the origin template and upload its settings.
    #[command(name = "create-remote-prj")]
    CreateRemotePrj(CreateArgs),
}

// ---------------------------------------------------------------------------
// Shared argument types: parsed from CLI strings, convert to core types
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse [`Platform`] from CLI args.
#[derive(Debug, Clone, Copy)]
pub struct PlatformArg(pub Platform);

impl FromStr for PlatformArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gitlab" => Ok(Self(Platform::GitLab)),
            "github" => Ok(Self(Platform::GitHub)),
            other => Err(format!("unknown platform '{other}'; expected: gitlab, github")),
        }
    }
}

impl fmt::Display for PlatformArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Thin wrapper so clap can parse [`ArtifactProfile`] from CLI args.
#[derive(Debug, Clone, Copy)]
pub struct ProfileArg(pub ArtifactProfile);

impl FromStr for ProfileArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "register" => Ok(Self(ArtifactProfile::Register)),
            "protocol" => Ok(Self(ArtifactProfile::Protocol)),
            other => Err(format!("unknown profile '{other}'; expected: register, protocol")),
        }
    }
}

impl fmt::Display for ProfileArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let result: Result<()> = match cli.command {
        Commands::LsRemotePrj(args) => args.run(&cli.config),
        Commands::CreateRemotePrj(args) => args.run(&cli.config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "[ERRORE]".red().bold());
            ExitCode::FAILURE
        }
    }
}

/// Diagnostics go to stderr so stdout stays parseable (`--json`).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
