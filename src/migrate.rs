// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Project board migration
//!
//! Copies a project's columns and cards, in source order, onto a
//! destination project. Nothing is rolled back: the first failed call
//! aborts the run and leaves whatever was already created in place.

use crate::client::ForgeClient;
use crate::error::{ForgeError, Result};
use crate::output::Record;
use crate::projects::{
    create_card, create_column, create_project, delete_column, list_columns, resolve_content, NewCard,
};
use crate::types::{Card, CardBody, Project};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Outcome of one migration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Source project identity
    pub source: u64,
    /// Destination project identity
    pub destination: u64,
    /// Whether the destination was created by this run
    pub created_project: bool,
    /// Columns created on the destination
    pub columns_created: usize,
    /// Cards created on the destination
    pub cards_created: usize,
}

impl Record for MigrationReport {
    const HEADERS: &'static [&'static str] =
        &["source", "destination", "created_project", "columns", "cards"];

    fn values(&self) -> Vec<String> {
        vec![
            self.source.to_string(),
            self.destination.to_string(),
            self.created_project.to_string(),
            self.columns_created.to_string(),
            self.cards_created.to_string(),
        ]
    }
}

/// Read a project snapshot written by `projects get`
pub fn load_snapshot(path: &Path) -> Result<Project> {
    let raw = std::fs::read(path)?;
    serde_json::from_slice(&raw)
        .map_err(|e| ForgeError::decode(format!("project snapshot {}", path.display()), e))
}

/// Payload that recreates `card` on another board
pub fn card_payload(client: &ForgeClient, card: &Card) -> Result<NewCard> {
    match card.body() {
        Some(CardBody::Note(note)) => Ok(NewCard::Note {
            note: note.to_string(),
        }),
        Some(CardBody::Content(url)) => resolve_content(client, url),
        None => Err(ForgeError::EmptyCard(card.id)),
    }
}

/// Copy `source` onto project `dest`, or onto a new project under `org`
/// when no destination is given.
///
/// Re-running after a failure without `dest` creates another project.
pub fn migrate(client: &ForgeClient, source: &Project, dest: Option<u64>, org: &str) -> Result<MigrationReport> {
    let mut report = MigrationReport {
        source: source.id,
        ..Default::default()
    };

    report.destination = match dest {
        Some(id) => id,
        None => {
            report.created_project = true;
            create_project(client, org, &source.name, source.body.as_deref())?
        }
    };
    info!(
        source = source.id,
        destination = report.destination,
        columns = source.columns.len(),
        cards = source.card_count(),
        "migrating project"
    );

    for column in &source.columns {
        let column_id = create_column(client, report.destination, &column.name)?;
        report.columns_created += 1;
        info!(column_name = %column.name, column_id, "created column");

        for card in &column.cards {
            let payload = card_payload(client, card)?;
            let card_id = create_card(client, column_id, &payload)?;
            report.cards_created += 1;
            debug!(source_card = card.id, card_id, column_id, "created card");
        }
    }

    info!(
        destination = report.destination,
        cards = report.cards_created,
        "created cards"
    );
    Ok(report)
}

/// Delete every column of a project; returns how many were deleted.
///
/// The first delete that does not answer 204 aborts the rest.
pub fn clear_project(client: &ForgeClient, project_id: u64) -> Result<usize> {
    let columns = list_columns(client, project_id)?;
    for column in &columns {
        delete_column(client, column.id)?;
        info!(project_id, column_id = column.id, column_name = %column.name, "deleted column");
    }
    Ok(columns.len())
}
