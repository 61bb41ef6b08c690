// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Forgeyard library - inventory and project-board migration for a forge
//! organization
//!
//! This crate provides a rate-limit-aware client for the forge REST API, a
//! page walker on top of it, typed readers for repositories, file contents
//! and project boards, and the project migration workflow.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod ci;
pub mod client;
pub mod commands;
pub mod config;
pub mod contents;
pub mod deps;
pub mod error;
pub mod migrate;
pub mod output;
pub mod pages;
pub mod projects;
pub mod repos;

/// Resource types decoded from the forge API
pub mod types {
    use crate::output::Record;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    // =========================================================================
    // Repositories
    // =========================================================================

    /// Owner descriptor of a repository
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Owner {
        /// Login name
        pub login: String,
        /// Remote identity
        pub id: u64,
        /// "User" or "Organization"
        #[serde(rename = "type")]
        pub owner_type: String,
        /// Site administrator flag
        #[serde(default)]
        pub site_admin: bool,
    }

    /// Repository snapshot as listed by the API
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Repo {
        /// Remote identity
        pub id: u64,
        /// Short name
        pub name: String,
        /// `owner/name`
        pub full_name: String,
        /// Private visibility
        #[serde(default)]
        pub private: bool,
        /// Archived (read-only)
        #[serde(default)]
        pub archived: bool,
        /// Disabled by the forge
        #[serde(default)]
        pub disabled: bool,
        /// Fork of another repository
        #[serde(default)]
        pub fork: bool,
        /// Default branch
        #[serde(default)]
        pub default_branch: String,
        /// Creation time
        pub created_at: DateTime<Utc>,
        /// Last metadata update
        pub updated_at: DateTime<Utc>,
        /// Last push, absent for empty repositories
        pub pushed_at: Option<DateTime<Utc>>,
        /// Owner descriptor
        pub owner: Owner,
        /// Web URL
        #[serde(default)]
        pub html_url: String,
        /// Free-text description
        pub description: Option<String>,
        /// Size in kilobytes
        #[serde(default)]
        pub size: u64,
        /// Open issue count
        #[serde(default)]
        pub open_issues_count: u64,
        /// Primary language
        pub language: Option<String>,
    }

    impl Record for Repo {
        const HEADERS: &'static [&'static str] = &[
            "name",
            "private",
            "archived",
            "disabled",
            "default_branch",
            "url",
        ];

        fn values(&self) -> Vec<String> {
            vec![
                self.full_name.clone(),
                self.private.to_string(),
                self.archived.to_string(),
                self.disabled.to_string(),
                self.default_branch.clone(),
                self.html_url.clone(),
            ]
        }
    }

    // =========================================================================
    // File contents
    // =========================================================================

    /// Entry returned by the contents endpoint (a file or a directory item)
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FileEntry {
        /// File name
        pub name: String,
        /// Path within the repository
        pub path: String,
        /// Web URL
        #[serde(default)]
        pub html_url: Option<String>,
        /// Raw download URL
        #[serde(default)]
        pub download_url: Option<String>,
        /// Encoded payload (files only)
        #[serde(default)]
        pub content: Option<String>,
        /// Encoding tag of `content`
        #[serde(default)]
        pub encoding: Option<String>,
        /// "file", "dir", "symlink" or "submodule"
        #[serde(rename = "type", default)]
        pub entry_type: String,
    }

    // =========================================================================
    // Project boards
    // =========================================================================

    /// Card on a project column; either a note or a content reference
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Card {
        /// Remote identity
        pub id: u64,
        /// Free-text note
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub note: Option<String>,
        /// API URL of the referenced issue or pull request
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub content_url: Option<String>,
    }

    /// What a card carries
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum CardBody<'a> {
        /// Free-text note
        Note(&'a str),
        /// Reference to an issue or pull request
        Content(&'a str),
    }

    impl Card {
        /// The card's payload; a non-empty note wins over a content reference
        #[must_use]
        pub fn body(&self) -> Option<CardBody<'_>> {
            match (self.note.as_deref(), self.content_url.as_deref()) {
                (Some(note), _) if !note.is_empty() => Some(CardBody::Note(note)),
                (_, Some(url)) if !url.is_empty() => Some(CardBody::Content(url)),
                _ => None,
            }
        }
    }

    /// Column of a project board
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Column {
        /// Remote identity
        pub id: u64,
        /// Column name
        pub name: String,
        /// Cards in board order
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub cards: Vec<Card>,
    }

    /// Project board
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Project {
        /// Remote identity
        pub id: u64,
        /// Board name
        pub name: String,
        /// Free-text description
        #[serde(default)]
        pub body: Option<String>,
        /// "open" or "closed"
        #[serde(default)]
        pub state: String,
        /// Web URL
        #[serde(default)]
        pub html_url: String,
        /// Columns in board order; empty for a shallow fetch
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub columns: Vec<Column>,
    }

    impl Project {
        /// Whether the board is open
        #[must_use]
        pub fn is_open(&self) -> bool {
            self.state == "open"
        }

        /// Total number of cards across all columns
        #[must_use]
        pub fn card_count(&self) -> usize {
            self.columns.iter().map(|c| c.cards.len()).sum()
        }
    }

    impl Record for Project {
        const HEADERS: &'static [&'static str] =
            &["id", "name", "state", "url", "columns", "cards"];

        fn values(&self) -> Vec<String> {
            vec![
                self.id.to_string(),
                self.name.clone(),
                self.state.clone(),
                self.html_url.clone(),
                self.columns.len().to_string(),
                self.card_count().to_string(),
            ]
        }
    }

    // =========================================================================
    // Dependency audit
    // =========================================================================

    /// A repository's reference to a tracked module
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ModuleRef {
        /// Repository full name
        pub repo: String,
        /// Version string found in the manifest
        pub version: String,
        /// Whether the repository is private
        pub private: bool,
    }

    impl Record for ModuleRef {
        const HEADERS: &'static [&'static str] = &["name", "version", "private"];

        fn values(&self) -> Vec<String> {
            vec![
                self.repo.clone(),
                self.version.clone(),
                self.private.to_string(),
            ]
        }
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::client::{ApiRequest, ApiResponse, ForgeClient};
    pub use crate::config::Config;
    pub use crate::error::{ForgeError, Result};
    pub use crate::output::{Record, Sink};
    pub use crate::types::*;
}
