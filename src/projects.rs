// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Project boards: reading projects, columns and cards, and creating them

use crate::client::{ApiRequest, ForgeClient};
use crate::error::{ForgeError, Result};
use crate::pages::{walk, Pages, WalkOptions, WalkSummary};
use crate::types::{Card, Column, Project};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Kind of item a content card points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    /// An issue
    Issue,
    /// A pull request
    PullRequest,
}

impl ContentType {
    /// Classify a content URL by its path
    #[must_use]
    pub fn classify(content_url: &str) -> Self {
        if content_url.contains("/pulls/") {
            Self::PullRequest
        } else {
            Self::Issue
        }
    }
}

/// Payload for creating a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NewCard {
    /// Free-text card
    Note {
        /// Card text
        note: String,
    },
    /// Card linked to an issue or pull request
    Content {
        /// Numeric identity of the linked item
        content_id: u64,
        /// What the item is
        content_type: ContentType,
    },
}

/// Identity returned by create calls and content lookups
#[derive(Debug, Deserialize)]
struct Created {
    id: u64,
    #[serde(default)]
    html_url: Option<String>,
}

#[derive(Serialize)]
struct NewProject<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
}

#[derive(Serialize)]
struct NewColumn<'a> {
    name: &'a str,
}

/// Fetch one project; `None` unless the API answers 200.
///
/// A shallow fetch skips columns and cards.
pub fn get_project(client: &ForgeClient, id: &str, shallow: bool) -> Result<Option<Project>> {
    let response = client.get(&format!("/projects/{id}"))?;
    if response.status != StatusCode::OK {
        info!(
            project = id,
            status = response.status.as_u16(),
            "project not available"
        );
        return Ok(None);
    }

    let mut project: Project = response.json()?;
    if !shallow {
        project.columns = fetch_columns(client, project.id)?;
    }
    Ok(Some(project))
}

/// Columns of a project without their cards; the API must answer 200
pub fn list_columns(client: &ForgeClient, project_id: u64) -> Result<Vec<Column>> {
    client
        .get(&format!("/projects/{project_id}/columns"))?
        .require(StatusCode::OK)?
        .json()
}

/// Columns of a project with all their cards
pub fn fetch_columns(client: &ForgeClient, project_id: u64) -> Result<Vec<Column>> {
    let mut columns = list_columns(client, project_id)?;
    for column in &mut columns {
        column.cards = fetch_cards(client, column.id)?;
        debug!(
            project_id,
            column_id = column.id,
            column_name = %column.name,
            cards = column.cards.len(),
            "loaded cards"
        );
    }
    Ok(columns)
}

/// Every card of a column, in board order
pub fn fetch_cards(client: &ForgeClient, column_id: u64) -> Result<Vec<Card>> {
    let mut cards = Vec::new();
    for page in Pages::new(client, format!("/projects/columns/{column_id}/cards")).items::<Card>() {
        cards.extend(page?);
    }
    Ok(cards)
}

/// Walk the projects of `org`; closed projects are skipped when asked
pub fn for_each_org_project<F>(client: &ForgeClient, org: &str, options: WalkOptions, each: F) -> Result<WalkSummary>
where
    F: FnMut(Project) -> Result<()>,
{
    debug!(org, "listing projects page by page");
    let items = Pages::new(client, format!("/orgs/{org}/projects")).items::<Project>();
    walk(
        items,
        options.limit,
        |project| {
            let keep = !(options.skip_archived && !project.is_open());
            if !keep {
                debug!(project = %project.name, "skipping closed project");
            }
            keep
        },
        each,
    )
}

/// Create a project under `org`; returns the new identity
pub fn create_project(client: &ForgeClient, org: &str, name: &str, body: Option<&str>) -> Result<u64> {
    let request = ApiRequest::post_json(format!("/orgs/{org}/projects"), &NewProject { name, body })?;
    let created: Created = client.send(&request)?.require(StatusCode::CREATED)?.json()?;
    info!(
        id = created.id,
        url = created.html_url.as_deref().unwrap_or_default(),
        "created new project"
    );
    Ok(created.id)
}

/// Create a column on a project; returns the new identity
pub fn create_column(client: &ForgeClient, project_id: u64, name: &str) -> Result<u64> {
    let request = ApiRequest::post_json(format!("/projects/{project_id}/columns"), &NewColumn { name })?;
    let created: Created = client.send(&request)?.require(StatusCode::CREATED)?.json()?;
    Ok(created.id)
}

/// Create a card on a column; returns the new identity
pub fn create_card(client: &ForgeClient, column_id: u64, card: &NewCard) -> Result<u64> {
    let request = ApiRequest::post_json(format!("/projects/columns/{column_id}/cards"), card)?;
    let created: Created = client.send(&request)?.require(StatusCode::CREATED)?.json()?;
    Ok(created.id)
}

/// Delete a column; the API must answer 204
pub fn delete_column(client: &ForgeClient, column_id: u64) -> Result<()> {
    client
        .send(&ApiRequest::delete(format!("/projects/columns/{column_id}")))?
        .require(StatusCode::NO_CONTENT)?;
    Ok(())
}

/// Resolve a content URL into a card payload
pub fn resolve_content(client: &ForgeClient, content_url: &str) -> Result<NewCard> {
    let item: Created = client.get(content_url)?.require(StatusCode::OK)?.json()?;
    Ok(NewCard::Content {
        content_id: item.id,
        content_type: ContentType::classify(content_url),
    })
}

/// Require a project, turning absence into an error
pub fn require_project(project: Option<Project>, id: &str) -> Result<Project> {
    project.ok_or_else(|| ForgeError::NotFound(format!("project {id}")))
}
