// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! List-module-refs command - which version of a Go module each repo pins

use super::Session;
use crate::deps::module_ref;
use crate::repos::for_each_repo;
use anyhow::{Context, Result};
use tracing::info;

/// Run the list-module-refs command
pub fn run(session: &mut Session, module: &str) -> Result<()> {
    let org = session.config.org()?.to_string();
    let walk = session.config.walk_options();
    let client = &session.client;
    let sink = &mut session.sink;

    let mut found = 0usize;
    for_each_repo(client, &org, walk, |repo| {
        if let Some(reference) = module_ref(client, &repo, module)? {
            found += 1;
            sink.emit(&reference)?;
        }
        Ok(())
    })
    .with_context(|| format!("Failed to audit {module} across {org}"))?;

    info!(module, found, "module audit complete");
    Ok(())
}
