// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Organization repositories: listing and ownership transfer

use crate::client::{ApiRequest, ForgeClient};
use crate::error::Result;
use crate::pages::{walk, Pages, WalkOptions, WalkSummary};
use crate::types::Repo;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, info};

/// Listing path for an organization's repositories
#[must_use]
pub fn org_repos_path(org: &str) -> String {
    format!("/orgs/{org}/repos")
}

/// Walk every repository of `org`, page by page.
///
/// Archived repositories are skipped when asked; the limit counts the
/// repositories handed to `each`.
pub fn for_each_repo<F>(client: &ForgeClient, org: &str, options: WalkOptions, mut each: F) -> Result<WalkSummary>
where
    F: FnMut(Repo) -> Result<()>,
{
    debug!(org, "listing repositories page by page");
    let items = Pages::new(client, org_repos_path(org)).items::<Repo>();
    let summary = walk(
        items,
        options.limit,
        |repo| {
            let keep = !(options.skip_archived && repo.archived);
            if !keep {
                debug!(repo = %repo.full_name, "skipping archived repo");
            }
            keep
        },
        |repo| {
            debug!(repo = %repo.full_name, "starting to process repo");
            each(repo)
        },
    )?;
    info!(
        org,
        processed = summary.processed,
        skipped = summary.skipped,
        "finished listing repositories"
    );
    Ok(summary)
}

#[derive(Serialize)]
struct TransferRequest<'a> {
    new_owner: &'a str,
    #[serde(skip_serializing_if = "<[u64]>::is_empty")]
    team_ids: &'a [u64],
}

/// Transfer `repo` (full name) to `new_owner`; the API must answer 202
pub fn transfer(client: &ForgeClient, repo: &str, new_owner: &str, team_ids: &[u64]) -> Result<()> {
    let request = ApiRequest::post_json(
        format!("/repos/{repo}/transfer"),
        &TransferRequest {
            new_owner,
            team_ids,
        },
    )?;
    client.send(&request)?.require(StatusCode::ACCEPTED)?;
    info!(repo, new_owner, "repository transfer accepted");
    Ok(())
}
