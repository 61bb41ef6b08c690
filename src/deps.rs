// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Dependency audit: which version of a Go module each repository pins

use crate::client::ForgeClient;
use crate::contents::file_content;
use crate::error::Result;
use crate::types::{ModuleRef, Repo};
use tracing::info;

/// Go module manifest
pub const GO_MOD: &str = "go.mod";

/// Version of `module` pinned in a `go.mod`.
///
/// The version is the token right after the module path on the first line
/// that names the module; the `module` directive and replace arrows are
/// skipped.
#[must_use]
pub fn module_version(go_mod: &str, module: &str) -> Option<String> {
    go_mod.lines().find_map(|line| {
        let mut tokens = line.split_whitespace();
        tokens.position(|t| t == module)?;
        tokens
            .next()
            .filter(|v| *v != "=>" && !v.starts_with("//"))
            .map(str::to_string)
    })
}

/// Look up `module` in the manifest of `repo`
pub fn module_ref(client: &ForgeClient, repo: &Repo, module: &str) -> Result<Option<ModuleRef>> {
    let Some(entry) = file_content(client, &repo.full_name, GO_MOD)? else {
        info!(repo = %repo.full_name, "no go.mod found");
        return Ok(None);
    };

    Ok(module_version(&entry.text()?, module).map(|version| ModuleRef {
        repo: repo.full_name.clone(),
        version,
        private: repo.private,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GO_MOD_FIXTURE: &str = "\
module example.test/widget

go 1.21

require (
\tgithub.com/acme/commons v1.42.0
\tgithub.com/sirupsen/logrus v1.9.3
)
";

    #[test]
    fn test_module_version_in_require_block() {
        assert_eq!(
            module_version(GO_MOD_FIXTURE, "github.com/acme/commons").as_deref(),
            Some("v1.42.0")
        );
    }

    #[test]
    fn test_single_line_require() {
        let go_mod = "module x\n\nrequire github.com/acme/commons v0.9.1 // indirect\n";
        assert_eq!(
            module_version(go_mod, "github.com/acme/commons").as_deref(),
            Some("v0.9.1")
        );
    }

    #[test]
    fn test_module_absent() {
        assert_eq!(module_version(GO_MOD_FIXTURE, "github.com/acme/other"), None);
    }

    #[test]
    fn test_prefix_of_other_module_does_not_match() {
        let go_mod = "require github.com/acme/commons-extra v2.0.0\n";
        assert_eq!(module_version(go_mod, "github.com/acme/commons"), None);
    }

    #[test]
    fn test_module_directive_is_skipped() {
        let go_mod = "module github.com/acme/commons\n\ngo 1.21\n";
        assert_eq!(module_version(go_mod, "github.com/acme/commons"), None);
    }
}
