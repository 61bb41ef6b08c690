// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Repository contents: existence checks, file fetches and decoding

use crate::client::ForgeClient;
use crate::error::{ForgeError, Result};
use crate::types::FileEntry;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

/// Path of a file or directory in a repository
#[must_use]
pub fn contents_path(repo: &str, path: &str) -> String {
    format!("/repos/{repo}/contents/{}", path.trim_start_matches('/'))
}

/// Whether `path` exists in `repo`; any non-2xx status means absent
pub fn file_exists(client: &ForgeClient, repo: &str, path: &str) -> Result<bool> {
    let response = client.get(&contents_path(repo, path))?;
    tracing::trace!(repo, path, status = response.status.as_u16(), "file existence check");
    Ok(response.is_success())
}

/// Fetch a file entry; `None` unless the API answers 200
pub fn file_content(client: &ForgeClient, repo: &str, path: &str) -> Result<Option<FileEntry>> {
    get_if_ok(client, &contents_path(repo, path))
}

/// List a directory; `None` unless the API answers 200
pub fn list_dir(client: &ForgeClient, repo: &str, path: &str) -> Result<Option<Vec<FileEntry>>> {
    get_if_ok(client, &contents_path(repo, path))
}

fn get_if_ok<T: DeserializeOwned>(client: &ForgeClient, path: &str) -> Result<Option<T>> {
    let response = client.get(path)?;
    if response.status != StatusCode::OK {
        return Ok(None);
    }
    response.json().map(Some)
}

impl FileEntry {
    /// Decoded file bytes.
    ///
    /// Directories and entries without inline content yield no bytes. Only
    /// base64 is understood; any other encoding is an error.
    pub fn contents(&self) -> Result<Vec<u8>> {
        let raw = match self.content.as_deref() {
            Some(raw) if self.entry_type == "file" && !raw.is_empty() => raw,
            _ => return Ok(Vec::new()),
        };

        match self.encoding.as_deref() {
            Some("base64") => {
                // the API wraps the payload at 60 columns
                let compact: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();
                Ok(STANDARD.decode(compact)?)
            }
            other => Err(ForgeError::UnsupportedEncoding(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    /// Decoded file contents as lossy UTF-8
    pub fn text(&self) -> Result<String> {
        Ok(String::from_utf8_lossy(&self.contents()?).into_owned())
    }
}
