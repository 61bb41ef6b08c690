// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Scan commands - report the CI posture of repositories

use super::Session;
use crate::ci::{scan, ScanOptions};
use crate::config::Config;
use crate::repos::for_each_repo;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

fn scan_options(config: &Config) -> ScanOptions {
    ScanOptions {
        root_toml: config.settings.root_toml.clone(),
        team_prefix: config.team_prefix(),
    }
}

/// Repository names listed one per line; blank lines and `#` comments are
/// ignored
pub fn read_repo_list(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read repository list {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Run the scan-ci command over named repositories and/or a list file
pub fn run(session: &mut Session, mut repos: Vec<String>, file: Option<&Path>) -> Result<()> {
    if let Some(file) = file {
        repos.extend(read_repo_list(file)?);
    }
    if repos.is_empty() {
        anyhow::bail!("no repositories given; pass names or --file");
    }

    let options = scan_options(&session.config);
    let limit = session.config.limit.unwrap_or(usize::MAX);
    for name in repos.iter().take(limit) {
        let repo = session.config.qualify_repo(name)?;
        let posture = scan(&session.client, &repo, &options)
            .with_context(|| format!("Failed to scan {repo}"))?;
        session.sink.emit(&posture)?;
    }
    Ok(())
}

/// Run the list-and-scan command over every repository of the organization
pub fn list_and_scan(session: &mut Session) -> Result<()> {
    let org = session.config.org()?.to_string();
    let options = scan_options(&session.config);
    let walk = session.config.walk_options();
    let client = &session.client;
    let sink = &mut session.sink;

    let summary = for_each_repo(client, &org, walk, |repo| {
        let posture = scan(client, &repo.full_name, &options)?;
        sink.emit(&posture)
    })
    .with_context(|| format!("Failed to scan repositories of {org}"))?;

    info!(scanned = summary.processed, skipped = summary.skipped, "scan complete");
    Ok(())
}
