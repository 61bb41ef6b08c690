// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod completions;
pub mod config;
pub mod modules;
pub mod projects;
pub mod query;
pub mod repos;
pub mod scan;
pub mod transfer;

use crate::client::ForgeClient;
use crate::config::Config;
use crate::output::Sink;
use anyhow::{Context, Result};
use tracing::debug;

/// Everything a networked command needs for one run
pub struct Session {
    /// Resolved configuration
    pub config: Config,
    /// Forge API client
    pub client: ForgeClient,
    /// Record destination
    pub sink: Sink,
}

impl Session {
    /// Build the client and open the sink
    pub fn open(config: Config) -> Result<Self> {
        let client = ForgeClient::from_config(&config).context("Failed to build API client")?;
        let sink = Sink::open(config.output.as_deref(), config.format, config.pretty).with_context(|| {
            match &config.output {
                Some(path) => format!("Failed to open {}", path.display()),
                None => "Failed to open stdout".to_string(),
            }
        })?;
        Ok(Self { config, client, sink })
    }

    /// Flush the sink and report the request count
    pub fn finish(self) -> Result<usize> {
        let emitted = self.sink.finish().context("Failed to flush output")?;
        debug!(
            queries = self.client.request_count(),
            records = emitted,
            "finished"
        );
        Ok(emitted)
    }
}
