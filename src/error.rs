// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Error types for forge API access
//!
//! Absence on a read is never an error: readers return `Ok(None)` or
//! `Ok(false)`. Everything here aborts the current command.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while talking to the forge or emitting records
#[derive(Error, Debug)]
pub enum ForgeError {
    /// No access token was supplied
    #[error("must provide the token via env var GITHUB_ACCESS_TOKEN or the --token flag")]
    MissingToken,

    /// A command needs an organization and none is configured
    #[error("an organization is required (use --org or FORGEYARD_ORG)")]
    MissingOrg,

    /// Invalid configuration source
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    /// Network or connection error
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A response body did not match the expected shape
    #[error("failed to decode {context}: {source}")]
    Decode {
        /// What was being decoded (usually the request path)
        context: String,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// A request payload or record could not be encoded
    #[error("failed to encode JSON: {0}")]
    Encode(#[from] serde_json::Error),

    /// A rate-limit header was missing or unparsable
    #[error("malformed rate-limit header {header}: {value:?}")]
    RateLimitHeader {
        /// Header name
        header: &'static str,
        /// Raw value, if any was present
        value: Option<String>,
    },

    /// File content came back in an encoding we cannot read
    #[error("unexpected content encoding: {0}")]
    UnsupportedEncoding(String),

    /// Base64 payload was corrupt
    #[error("invalid base64 content: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A mutating call returned something other than its documented status
    #[error("unexpected response code: {actual} (expected {expected}): {body}")]
    UnexpectedStatus {
        /// Status the call documents on success
        expected: StatusCode,
        /// Status that came back
        actual: StatusCode,
        /// Response body, for diagnosis
        body: String,
    },

    /// A resource that must exist was not found
    #[error("not found: {0}")]
    NotFound(String),

    /// A project card carried neither a note nor a content reference
    #[error("card {0} has neither a note nor a content reference")]
    EmptyCard(u64),

    /// Output or file I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ForgeError {
    /// Build a decode error for the given context
    pub fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            context: context.into(),
            source,
        }
    }
}

/// Result alias for forge operations
pub type Result<T, E = ForgeError> = std::result::Result<T, E>;
