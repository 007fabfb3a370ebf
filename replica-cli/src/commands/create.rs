//! `replica create-remote-prj`: replicate the origin and upload settings.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use replica_remote::UpsertOutcome;
use replica_workflow::{plan, Plan, ReplicationWorkflow, RunReport};

use super::{connect, load_config};
use crate::{PlatformArg, ProfileArg};

/// Arguments for `replica create-remote-prj`.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Platform to create the project on: gitlab or github.
    pub platform: PlatformArg,

    /// Artifact profile: register or protocol.
    pub profile: ProfileArg,

    /// Resolve the origin and render every file without creating anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl CreateArgs {
    pub fn run(self, config_path: &Path) -> Result<()> {
        let platform = self.platform.0;
        let profile = self.profile.0;

        let config = load_config(config_path)?;
        // Local inputs first: a bad config never costs a remote call.
        plan::validate(&config, platform)?;
        let (adapter, token) = connect(platform, &config)?;
        let workflow = ReplicationWorkflow::new(config, adapter, token)?;

        if self.dry_run {
            let plan = workflow
                .plan(profile)
                .with_context(|| format!("cannot plan replication on {platform}"))?;
            print_plan(&plan);
            return Ok(());
        }

        let report = workflow
            .run(profile)
            .with_context(|| format!("replication on {platform} failed"))?;
        print_report(&report);
        Ok(())
    }
}

fn print_plan(plan: &Plan) {
    let prefix = "[dry-run] ";
    println!("{prefix}✓ origin '{}' ({})", plan.origin.name, plan.origin.full_path);
    println!(
        "{prefix}✓ would create '{}' on {} (default branch '{}')",
        plan.destination_name, plan.platform, plan.default_branch
    );
    println!(
        "{prefix}✓ {} files for profile '{}'",
        plan.artifacts.len(),
        plan.profile
    );
    for artifact in &plan.artifacts {
        println!("  ~  {}", artifact.path);
    }
}

fn print_report(report: &RunReport) {
    for warning in &report.warnings {
        eprintln!("{} {warning}", "[WARNING]".yellow().bold());
    }

    let written = report
        .writes
        .iter()
        .filter(|w| w.outcome != UpsertOutcome::Unchanged)
        .count();
    println!(
        "✓ '{}' replicated from '{}'",
        report.destination.full_path, report.origin.full_path
    );
    println!(
        "✓ {} files on '{}' ({} written, {} unchanged)",
        report.writes.len(),
        report.default_branch,
        written,
        report.writes.len() - written
    );
    for write in &report.writes {
        match write.outcome {
            UpsertOutcome::Created => println!("  +  {}", write.path),
            UpsertOutcome::Updated => println!("  ✎  {}", write.path),
            UpsertOutcome::Unchanged => println!("  ·  {}", write.path),
        }
    }
    if let Some(url) = &report.destination.web_url {
        println!("{}", url.bright_black());
    }
}
