// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Config command - show the effective settings

use crate::config::Settings;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Render the effective settings, or a single key, as TOML
pub fn render(settings: &Settings, key: Option<&str>, token_set: bool) -> Result<String> {
    let value = toml::Value::try_from(settings).context("Failed to encode settings")?;
    let table = value.as_table().context("settings did not encode as a table")?;
    match key {
        Some(key) => match table.get(key) {
            Some(toml::Value::String(value)) => Ok(value.clone()),
            Some(value) => Ok(value.to_string()),
            None if settings_key(key) => Ok(String::new()),
            None => bail!("unknown configuration key: {key}"),
        },
        None => {
            let mut out = toml::to_string_pretty(table).context("Failed to encode settings")?;
            let token = if token_set { "set" } else { "unset" };
            out.push_str(&format!("# token: {token}\n"));
            Ok(out)
        }
    }
}

fn settings_key(key: &str) -> bool {
    matches!(key, "api_url" | "username" | "org" | "root_toml")
}

/// Run the config command
pub fn run(settings: &Settings, file: Option<&Path>, key: Option<&str>, token_set: bool) -> Result<()> {
    if key.is_none() {
        if let Some(file) = file {
            println!("# config file: {}", file.display());
        }
    }
    print!("{}", render(settings, key, token_set)?);
    if key.is_some() {
        println!();
    }
    Ok(())
}
