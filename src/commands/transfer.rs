// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Transfer-repo command - moves a repository to another organization

use super::Session;
use crate::repos::transfer;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

/// Run the transfer-repo command
pub fn run(session: &mut Session, repo: &str, new_owner: &str, team_ids: &[u64]) -> Result<()> {
    let repo = session.config.qualify_repo(repo)?;
    transfer(&session.client, &repo, new_owner, team_ids)
        .with_context(|| format!("Failed to transfer {repo} to {new_owner}"))?;

    let name = repo.rsplit('/').next().unwrap_or(&repo);
    let target = format!("{new_owner}/{name}");
    if session.config.color {
        eprintln!("moved {} to {}", repo.bold(), target.green().bold());
    } else {
        eprintln!("moved {repo} to {target}");
    }
    Ok(())
}
