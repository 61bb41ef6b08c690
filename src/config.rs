// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then `FORGEYARD_*` environment variables. Command-line flags are applied
//! last when the run [`Config`] is resolved.

use crate::error::{ForgeError, Result};
use crate::output::Format;
use crate::pages::WalkOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default REST API origin
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Username sent alongside the token in basic auth
pub const DEFAULT_USERNAME: &str = "forgeyard";

/// Root TOML config file probed by the CI scan
pub const DEFAULT_ROOT_TOML: &str = "netlify.toml";

/// Persistent settings read from file and environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// API origin; paths are resolved against it
    pub api_url: String,
    /// Basic-auth username
    pub username: String,
    /// Organization the org-wide commands work on
    #[serde(default)]
    pub org: Option<String>,
    /// Name of the root TOML config file the CI scan looks for
    pub root_toml: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            org: None,
            root_toml: DEFAULT_ROOT_TOML.to_string(),
        }
    }
}

/// Platform config file location (`.../forgeyard/config.toml`)
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("org", "hyperpolymath", "forgeyard")
        .map(|d| d.config_dir().join("config.toml"))
}

/// Load settings from defaults, an optional file and the environment
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let defaults = Settings::default();
    let mut builder = config::Config::builder()
        .set_default("api_url", defaults.api_url)?
        .set_default("username", defaults.username)?
        .set_default("root_toml", defaults.root_toml)?;

    let file = path.map(Path::to_path_buf).or_else(default_config_path);
    if let Some(file) = file {
        tracing::debug!(path = %file.display(), "reading config file if present");
        builder = builder.add_source(
            config::File::from(file)
                .format(config::FileFormat::Toml)
                .required(false),
        );
    }

    let settings = builder
        .add_source(config::Environment::with_prefix("FORGEYARD"))
        .build()?
        .try_deserialize()?;
    Ok(settings)
}

/// Per-run options taken from the command line
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Token from `--token` or `GITHUB_ACCESS_TOKEN`
    pub token: Option<String>,
    /// Organization override
    pub org: Option<String>,
    /// Skip archived repositories and closed projects
    pub skip_archived: bool,
    /// Maximum number of items to process, 0 for no limit
    pub limit: usize,
    /// File to append records to instead of stdout
    pub output: Option<PathBuf>,
    /// Record encoding
    pub format: Format,
    /// Pretty-print JSON records
    pub pretty: bool,
    /// Colored human-readable output
    pub color: bool,
}

/// Resolved configuration for one invocation
#[derive(Clone)]
pub struct Config {
    /// File/environment settings, with flag overrides applied
    pub settings: Settings,
    token: String,
    /// Skip archived repositories and closed projects
    pub skip_archived: bool,
    /// Maximum number of items to process
    pub limit: Option<usize>,
    /// File to append records to instead of stdout
    pub output: Option<PathBuf>,
    /// Record encoding
    pub format: Format,
    /// Pretty-print JSON records
    pub pretty: bool,
    /// Colored human-readable output
    pub color: bool,
}

impl Config {
    /// Combine settings with command-line options; fails without a token
    pub fn resolve(mut settings: Settings, run: RunOptions) -> Result<Self> {
        let token = run
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or(ForgeError::MissingToken)?;

        if let Some(org) = run.org {
            settings.org = Some(org);
        }

        Ok(Self {
            settings,
            token,
            skip_archived: run.skip_archived,
            limit: (run.limit > 0).then_some(run.limit),
            output: run.output,
            format: run.format,
            pretty: run.pretty,
            color: run.color,
        })
    }

    /// Access token for basic auth
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The configured organization, required by org-wide commands
    pub fn org(&self) -> Result<&str> {
        self.settings
            .org
            .as_deref()
            .filter(|o| !o.is_empty())
            .ok_or(ForgeError::MissingOrg)
    }

    /// CODEOWNERS team prefix for the configured organization (`@org/`)
    #[must_use]
    pub fn team_prefix(&self) -> Option<String> {
        self.settings.org.as_ref().map(|o| format!("@{o}/"))
    }

    /// Filtering and limit for page walks
    #[must_use]
    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            skip_archived: self.skip_archived,
            limit: self.limit,
        }
    }

    /// Qualify a bare repository name with the configured organization
    pub fn qualify_repo(&self, name: &str) -> Result<String> {
        if name.contains('/') {
            Ok(name.to_string())
        } else {
            Ok(format!("{}/{}", self.org()?, name))
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("settings", &self.settings)
            .field("token", &"<redacted>")
            .field("skip_archived", &self.skip_archived)
            .field("limit", &self.limit)
            .field("output", &self.output)
            .field("format", &self.format)
            .field("pretty", &self.pretty)
            .field("color", &self.color)
            .finish()
    }
}
