// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Query command - raw API passthrough

use super::Session;
use crate::client::{ApiRequest, ACCEPT_RAW};
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Run the query command: GET `path` and write the body as-is
pub fn run(session: &mut Session, path: &str, raw: bool) -> Result<()> {
    let mut request = ApiRequest::get(path);
    if raw {
        request = request.accept(ACCEPT_RAW);
    }

    let response = session
        .client
        .send(&request)
        .with_context(|| format!("Failed to query {path}"))?;
    if response.is_success() {
        info!(status = response.status.as_u16(), "finished querying the API");
    } else {
        warn!(status = response.status.as_u16(), path, "query returned an error status");
    }

    let body = if session.config.pretty && !raw {
        prettify(&response.body).unwrap_or(response.body)
    } else {
        response.body
    };
    session.sink.write_raw(&body)?;
    Ok(())
}

/// Re-indent a JSON body; `None` when it is not JSON
fn prettify(body: &[u8]) -> Option<Vec<u8>> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    serde_json::to_vec_pretty(&value).ok()
}
