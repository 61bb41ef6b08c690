// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! CI posture of a repository
//!
//! Which pipeline and policy files exist, who owns the code, and which
//! workflow automation is installed.

use crate::client::ForgeClient;
use crate::contents::{file_content, file_exists, list_dir};
use crate::error::Result;
use crate::output::{join_list, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Build pipeline definition
pub const JENKINSFILE: &str = "Jenkinsfile";
/// CI service config
pub const CIRCLECI_CONFIG: &str = ".circleci/config.yml";
/// Security policy
pub const SECURITY_POLICY: &str = ".github/SECURITY.MD";
/// Code owners file
pub const CODEOWNERS: &str = ".github/CODEOWNERS";
/// Workflow directory
pub const WORKFLOWS_DIR: &str = ".github/workflows";

/// Dependency-license scanner workflow
pub const FOSSA_WORKFLOW: &str = "fossa.yml";
/// Stale-issue bot workflow
pub const STALEBOT_WORKFLOW: &str = "stalebot.yml";
/// Dependency-update bot workflow
pub const RENOVATE_WORKFLOW: &str = "renovate.yml";

/// Computed CI summary for one repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiPosture {
    /// Repository full name
    pub repo: String,
    /// `Jenkinsfile` present
    pub jenkinsfile: bool,
    /// `.circleci/config.yml` present
    pub circleci: bool,
    /// Root TOML config present
    pub root_toml: bool,
    /// Security policy present
    pub security: bool,
    /// Code owner handles, deduplicated
    pub code_owners: BTreeSet<String>,
    /// Dependency-license scanner workflow installed
    pub fossa: bool,
    /// Stale-issue bot workflow installed
    pub stalebot: bool,
    /// Dependency-update bot workflow installed
    pub renovate: bool,
    /// Other workflow files, in listing order
    pub actions: Vec<String>,
}

impl CiPosture {
    /// Sort a workflow file name into a flag or the generic list
    pub fn record_workflow(&mut self, name: &str) {
        match name {
            FOSSA_WORKFLOW => self.fossa = true,
            STALEBOT_WORKFLOW => self.stalebot = true,
            RENOVATE_WORKFLOW => self.renovate = true,
            other => self.actions.push(other.to_string()),
        }
    }
}

impl Record for CiPosture {
    const HEADERS: &'static [&'static str] = &[
        "name",
        "jenkinsfile",
        "circleci",
        "root_toml",
        "security",
        "code_owners",
        "fossa",
        "stalebot",
        "renovate",
        "actions",
    ];

    fn values(&self) -> Vec<String> {
        let owners: Vec<String> = self.code_owners.iter().cloned().collect();
        vec![
            self.repo.clone(),
            self.jenkinsfile.to_string(),
            self.circleci.to_string(),
            self.root_toml.to_string(),
            self.security.to_string(),
            join_list(&owners),
            self.fossa.to_string(),
            self.stalebot.to_string(),
            self.renovate.to_string(),
            join_list(&self.actions),
        ]
    }
}

/// What to look for during a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Root TOML config file name
    pub root_toml: String,
    /// Team prefix stripped from code owner handles (`@org/`)
    pub team_prefix: Option<String>,
}

/// Parse code owner handles out of a CODEOWNERS file.
///
/// Whitespace-separated tokens starting with `@` are owner lists. The team
/// prefix is stripped from the front of the whole token only; the rest is
/// split on commas and the trimmed, non-empty parts are collected.
#[must_use]
pub fn parse_codeowners(text: &str, team_prefix: Option<&str>) -> BTreeSet<String> {
    text.split_whitespace()
        .filter(|token| token.starts_with('@'))
        .map(|token| {
            team_prefix
                .and_then(|prefix| token.strip_prefix(prefix))
                .unwrap_or(token)
        })
        .flat_map(|token| token.split(','))
        .map(str::trim)
        .filter(|owner| !owner.is_empty())
        .map(str::to_string)
        .collect()
}

/// Compute the CI posture of `repo` (a full `owner/name`)
pub fn scan(client: &ForgeClient, repo: &str, options: &ScanOptions) -> Result<CiPosture> {
    let mut posture = CiPosture {
        repo: repo.to_string(),
        jenkinsfile: file_exists(client, repo, JENKINSFILE)?,
        circleci: file_exists(client, repo, CIRCLECI_CONFIG)?,
        root_toml: file_exists(client, repo, &options.root_toml)?,
        security: file_exists(client, repo, SECURITY_POLICY)?,
        ..Default::default()
    };

    if let Some(entry) = file_content(client, repo, CODEOWNERS)? {
        posture.code_owners = parse_codeowners(&entry.text()?, options.team_prefix.as_deref());
    }

    if let Some(workflows) = list_dir(client, repo, WORKFLOWS_DIR)? {
        for file in &workflows {
            posture.record_workflow(&file.name);
        }
    }

    debug!(
        repo,
        owners = posture.code_owners.len(),
        actions = posture.actions.len(),
        "scanned repository"
    );
    Ok(posture)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_codeowners_single_line() {
        let owners = parse_codeowners("@netlify/team-a @user1, @netlify/team-b\n", Some("@netlify/"));
        assert_eq!(owners, set(&["team-a", "@user1", "team-b"]));
    }

    #[test]
    fn test_codeowners_multi_line_dedup() {
        let text = "\
# global owners
*           @netlify/platform @alice
/docs/      @netlify/docs,@bob
/api/       @netlify/platform
*.go\t@alice  @netlify/go-team";
        let owners = parse_codeowners(text, Some("@netlify/"));
        assert_eq!(
            owners,
            set(&["platform", "@alice", "docs", "@bob", "go-team"])
        );
    }

    #[test]
    fn test_codeowners_prefix_stripped_from_token_start_only() {
        let owners = parse_codeowners("* @netlify/a,@netlify/b\n", Some("@netlify/"));
        assert_eq!(owners, set(&["a", "@netlify/b"]));

        let owners = parse_codeowners("* @bob,@netlify/docs", Some("@netlify/"));
        assert_eq!(owners, set(&["@bob", "@netlify/docs"]));
    }

    #[test]
    fn test_codeowners_without_prefix() {
        let owners = parse_codeowners("* @acme/web @carol", None);
        assert_eq!(owners, set(&["@acme/web", "@carol"]));
    }

    #[test]
    fn test_codeowners_ignores_non_handles() {
        let owners = parse_codeowners("*.md docs@example.test\n", Some("@acme/"));
        assert!(owners.is_empty());
    }

    #[test]
    fn test_record_workflow() {
        let mut posture = CiPosture::default();
        for name in ["build.yml", FOSSA_WORKFLOW, RENOVATE_WORKFLOW, "release.yml"] {
            posture.record_workflow(name);
        }
        assert!(posture.fossa);
        assert!(posture.renovate);
        assert!(!posture.stalebot);
        assert_eq!(posture.actions, vec!["build.yml", "release.yml"]);
    }

    #[test]
    fn test_csv_values_match_headers() {
        let mut posture = CiPosture {
            repo: "acme/widget".into(),
            code_owners: set(&["team-b", "team-a"]),
            ..Default::default()
        };
        posture.record_workflow("lint.yml");
        let values = posture.values();
        assert_eq!(values.len(), CiPosture::HEADERS.len());
        assert_eq!(values[5], "team-a;team-b");
        assert_eq!(values[9], "lint.yml");
    }
}
