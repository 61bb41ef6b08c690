// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Rate-limited request executor for the forge REST API
//!
//! Every call goes through [`ForgeClient::send`]. When the API reports an
//! exhausted rate-limit window the client blocks until the window resets
//! and then re-issues the same request, so callers only ever see latency.

use crate::config::Config;
use crate::error::{ForgeError, Result};
use chrono::{DateTime, Utc};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Default media type for API calls
pub const ACCEPT_JSON: &str = "application/vnd.github.v3+json";

/// Media type that returns file contents verbatim
pub const ACCEPT_RAW: &str = "application/vnd.github.v3.raw";

/// Header carrying the calls left in the current window
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Header carrying the window reset as epoch seconds
pub const RESET_HEADER: &str = "x-ratelimit-reset";

/// How often a blocked client wakes up to report progress
pub const DEFAULT_WAIT_TICK: Duration = Duration::from_secs(60);

/// Extra time waited past the advertised reset
const RESET_GRACE: Duration = Duration::from_secs(1);

/// Source of time for the rate-limit wait
pub trait Clock {
    /// Current wall-clock time
    fn now(&self) -> SystemTime;
    /// Block the calling thread
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `std::thread::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Basic-auth credentials
#[derive(Clone)]
pub struct Credentials {
    /// Username sent with the token
    pub username: String,
    /// Access token
    pub token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// A single API call; re-sent unchanged after a rate-limit wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL or path relative to the API base
    pub path: String,
    /// Raw request body
    pub body: Option<Vec<u8>>,
    /// `Accept` override
    pub accept: Option<String>,
}

impl ApiRequest {
    /// A request with no body
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            accept: None,
        }
    }

    /// GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// DELETE request
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// POST request with a JSON-encoded body
    pub fn post_json<T: Serialize + ?Sized>(path: impl Into<String>, payload: &T) -> Result<Self> {
        let body = serde_json::to_vec(payload)?;
        Ok(Self {
            body: Some(body),
            ..Self::new(Method::POST, path)
        })
    }

    /// Override the `Accept` header
    #[must_use]
    pub fn accept(mut self, media_type: impl Into<String>) -> Self {
        self.accept = Some(media_type.into());
        self
    }
}

/// Status and raw body of a completed call
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Raw response body
    pub body: Vec<u8>,
    /// Request path, kept for error context
    pub path: String,
}

impl ApiResponse {
    /// True for any 2xx status
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as lossy UTF-8
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| ForgeError::decode(&self.path, e))
    }

    /// Fail unless the status is exactly `expected`
    pub fn require(self, expected: StatusCode) -> Result<Self> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(ForgeError::UnexpectedStatus {
                expected,
                actual: self.status,
                body: self.text(),
            })
        }
    }
}

/// Read the rate-limit headers of a response.
///
/// Returns the reset instant when the window is exhausted, `None` when the
/// remaining header is absent or non-zero.
pub fn exhausted_until(headers: &HeaderMap) -> Result<Option<SystemTime>> {
    let Some(remaining) = header_value(headers, REMAINING_HEADER)? else {
        return Ok(None);
    };
    let remaining: u64 = remaining
        .trim()
        .parse()
        .map_err(|_| malformed(REMAINING_HEADER, Some(remaining.clone())))?;
    if remaining > 0 {
        return Ok(None);
    }

    let reset = header_value(headers, RESET_HEADER)?.ok_or_else(|| malformed(RESET_HEADER, None))?;
    let epoch: u64 = reset
        .trim()
        .parse()
        .map_err(|_| malformed(RESET_HEADER, Some(reset.clone())))?;
    Ok(Some(UNIX_EPOCH + Duration::from_secs(epoch)))
}

fn header_value(headers: &HeaderMap, name: &'static str) -> Result<Option<String>> {
    headers
        .get(name)
        .map(|v| {
            v.to_str()
                .map(str::to_string)
                .map_err(|_| malformed(name, Some(String::from_utf8_lossy(v.as_bytes()).into_owned())))
        })
        .transpose()
}

fn malformed(header: &'static str, value: Option<String>) -> ForgeError {
    ForgeError::RateLimitHeader { header, value }
}

/// Blocking API client with transparent rate-limit handling
pub struct ForgeClient {
    http: HttpClient,
    base_url: String,
    credentials: Credentials,
    clock: Rc<dyn Clock>,
    wait_tick: Duration,
    requests: Cell<u64>,
    blocked_until: Cell<Option<SystemTime>>,
}

impl ForgeClient {
    /// Create a client for the given API base
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Result<Self> {
        let http = HttpClient::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            clock: Rc::new(SystemClock),
            wait_tick: DEFAULT_WAIT_TICK,
            requests: Cell::new(0),
            blocked_until: Cell::new(None),
        })
    }

    /// Create a client from the resolved run configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.settings.api_url.clone(),
            Credentials {
                username: config.settings.username.clone(),
                token: config.token().to_string(),
            },
        )
    }

    /// Replace the clock used while waiting out the rate limit
    #[must_use]
    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Change how often the wait loop wakes up
    #[must_use]
    pub fn with_wait_tick(mut self, tick: Duration) -> Self {
        self.wait_tick = tick;
        self
    }

    /// Number of calls sent so far, retries included
    #[must_use]
    pub fn request_count(&self) -> u64 {
        self.requests.get()
    }

    /// Resolve a path against the API base
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// GET a path
    pub fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(&ApiRequest::get(path))
    }

    /// Send a request, waiting out and retrying rate-limit exhaustion
    pub fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        loop {
            if let Some(deadline) = self.blocked_until.take() {
                self.wait_until(deadline);
            }

            self.requests.set(self.requests.get() + 1);
            let response = self.dispatch(request)?;
            let status = response.status();

            match exhausted_until(response.headers())? {
                // a write that succeeded must not be replayed
                Some(reset) if status.is_success() && !request.method.is_safe() => {
                    debug!(
                        method = %request.method,
                        resume = %DateTime::<Utc>::from(reset),
                        "rate limit window spent, holding the next call"
                    );
                    self.blocked_until.set(Some(reset));
                }
                Some(reset) => {
                    warn!(
                        status = status.as_u16(),
                        resume = %DateTime::<Utc>::from(reset),
                        "rate limit exceeded, waiting for the window to reset"
                    );
                    self.wait_until(reset);
                    info!(path = %request.path, "resuming, re-issuing request");
                    continue;
                }
                None => {}
            }

            let body = response.bytes()?.to_vec();
            return Ok(ApiResponse {
                status,
                body,
                path: request.path.clone(),
            });
        }
    }

    fn dispatch(&self, request: &ApiRequest) -> Result<reqwest::blocking::Response> {
        let url = self.url_for(&request.path);
        debug!(
            url = %url,
            method = %request.method,
            has_body = request.body.is_some(),
            "querying forge"
        );
        if let Some(body) = &request.body {
            tracing::trace!(payload = %String::from_utf8_lossy(body), "query payload");
        }

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.token))
            .header(ACCEPT, request.accept.as_deref().unwrap_or(ACCEPT_JSON));
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        Ok(builder.send()?)
    }

    /// Sleep in whole ticks until the reset (plus grace) has passed
    fn wait_until(&self, reset: SystemTime) {
        let now = self.clock.now();
        let deadline = reset.max(now) + RESET_GRACE;
        warn!(
            resume = %DateTime::<Utc>::from(deadline),
            wait_secs = deadline.duration_since(now).unwrap_or_default().as_secs(),
            "rate limit exhausted, blocking until reset"
        );

        loop {
            self.clock.sleep(self.wait_tick);
            let remaining = deadline
                .duration_since(self.clock.now())
                .unwrap_or_default();
            if remaining.is_zero() {
                break;
            }
            info!(
                resume = %DateTime::<Utc>::from(deadline),
                wait_secs = remaining.as_secs(),
                "still waiting for the rate limit reset"
            );
        }
    }
}
