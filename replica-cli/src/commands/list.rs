//! `replica ls-remote-prj`: projects in the configured group or owner.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use replica_core::RemoteProject;
use replica_remote::PlatformAdapter;
use replica_workflow::ReplicationWorkflow;

use super::{connect, load_config};
use crate::PlatformArg;

/// Arguments for `replica ls-remote-prj`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Platform to query: gitlab or github.
    pub platform: PlatformArg,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    pub fn run(self, config_path: &Path) -> Result<()> {
        let platform = self.platform.0;
        let config = load_config(config_path)?;
        let (adapter, token) = connect(platform, &config)?;
        let scope = adapter.scope();
        let workflow = ReplicationWorkflow::new(config, adapter, token)?;

        let projects = workflow
            .list()
            .with_context(|| format!("cannot list projects on {platform}"))?;

        if self.json {
            print_json(&projects)?;
        } else {
            print_table(&scope, projects);
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct ProjectJson<'a> {
    id: u64,
    name: &'a str,
    full_path: &'a str,
    clone_url: &'a str,
    default_branch: Option<&'a str>,
}

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "id")]
    id: u64,
    #[tabled(rename = "default branch")]
    default_branch: String,
    #[tabled(rename = "clone url")]
    clone_url: String,
}

fn print_json(projects: &[RemoteProject]) -> Result<()> {
    let payload: Vec<ProjectJson<'_>> = projects
        .iter()
        .map(|p| ProjectJson {
            id: p.id,
            name: p.name.as_str(),
            full_path: &p.full_path,
            clone_url: &p.clone_url,
            default_branch: p.default_branch.as_deref(),
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize project list")?
    );
    Ok(())
}

fn print_table(scope: &str, projects: Vec<RemoteProject>) {
    println!("{} | {} projects", scope.bold(), projects.len());
    if projects.is_empty() {
        println!("No projects found.");
        return;
    }

    let rows: Vec<ProjectRow> = projects
        .into_iter()
        .map(|p| ProjectRow {
            name: p.name.0,
            id: p.id,
            default_branch: p.default_branch.unwrap_or_else(|| "-".to_string()),
            clone_url: p.clone_url,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
