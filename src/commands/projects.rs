// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Projects commands - list, fetch, clear and migrate project boards

use super::Session;
use crate::migrate::{clear_project, load_snapshot, migrate};
use crate::projects::{for_each_org_project, get_project, require_project};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;
use tracing::info;

/// List the organization's projects
pub fn list(session: &mut Session) -> Result<()> {
    let org = session.config.org()?.to_string();
    let walk = session.config.walk_options();
    let sink = &mut session.sink;

    for_each_org_project(&session.client, &org, walk, |project| sink.emit(&project))
        .with_context(|| format!("Failed to list projects of {org}"))?;
    Ok(())
}

/// Fetch one project, with its columns and cards unless `shallow`
pub fn get(session: &mut Session, id: &str, shallow: bool) -> Result<()> {
    let project = get_project(&session.client, id, shallow)
        .with_context(|| format!("Failed to fetch project {id}"))?;
    match project {
        Some(project) => session.sink.emit(&project)?,
        None => info!(project = id, "nothing to emit"),
    }
    Ok(())
}

/// Delete every column of a project
pub fn clear(session: &mut Session, id: u64) -> Result<()> {
    let deleted = clear_project(&session.client, id)
        .with_context(|| format!("Failed to clear project {id}"))?;
    if session.config.color {
        eprintln!("cleared project {}: {} columns deleted", id.bold(), deleted.red());
    } else {
        eprintln!("cleared project {id}: {deleted} columns deleted");
    }
    Ok(())
}

/// Copy a project onto `dest`, or onto a new project in the organization.
///
/// With `from_file`, `source` is a snapshot path written by `projects get`;
/// otherwise it is the source project's identity.
pub fn migrate_project(session: &mut Session, source: &str, dest: Option<u64>, from_file: bool) -> Result<()> {
    let project = if from_file {
        load_snapshot(Path::new(source))?
    } else {
        let fetched = get_project(&session.client, source, false)
            .with_context(|| format!("Failed to fetch project {source}"))?;
        require_project(fetched, source)?
    };

    // the organization only matters when a destination must be created
    let org = match dest {
        Some(_) => String::new(),
        None => session.config.org()?.to_string(),
    };

    let report = migrate(&session.client, &project, dest, &org)
        .with_context(|| format!("Failed to migrate project {}", project.id))?;
    session.sink.emit(&report)?;

    if session.config.color {
        eprintln!(
            "migrated project {} to {}: {} columns, {} cards",
            report.source.bold(),
            report.destination.green().bold(),
            report.columns_created,
            report.cards_created
        );
    } else {
        eprintln!(
            "migrated project {} to {}: {} columns, {} cards",
            report.source, report.destination, report.columns_created, report.cards_created
        );
    }
    Ok(())
}
