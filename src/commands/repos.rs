// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! List-repos command - emits every repository of the organization

use super::Session;
use crate::repos::for_each_repo;
use anyhow::{Context, Result};

/// Run the list-repos command
pub fn run(session: &mut Session) -> Result<()> {
    let org = session.config.org()?.to_string();
    let options = session.config.walk_options();
    let Session { client, sink, .. } = session;

    for_each_repo(client, &org, options, |repo| sink.emit(&repo))
        .with_context(|| format!("Failed to list repositories of {org}"))?;
    Ok(())
}
