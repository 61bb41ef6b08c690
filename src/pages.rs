// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Page walker over page-numbered list endpoints
//!
//! [`Pages`] lazily requests `path?per_page=100&page=N` starting at 1 and
//! yields each raw page. It ends on the first non-success status, which the
//! API uses to signal that there is nothing more to read. [`Items`] decodes
//! pages into element lists and also ends at the first empty page.
//! Stopping early is just a matter of not pulling the next page.

use crate::client::ForgeClient;
use crate::error::{ForgeError, Result};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tracing::{debug, info};

/// Elements requested per page
pub const PER_PAGE: u32 = 100;

/// One fetched page
#[derive(Debug, Clone)]
pub struct Page {
    /// 1-based page number
    pub number: u32,
    /// Request path including the paging query
    pub path: String,
    /// Raw response body
    pub body: Vec<u8>,
}

impl Page {
    /// Decode the page as a JSON array
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        serde_json::from_slice(&self.body).map_err(|e| ForgeError::decode(&self.path, e))
    }
}

/// Lazy sequence of raw pages
pub struct Pages<'c> {
    client: &'c ForgeClient,
    path: String,
    next_page: u32,
    finished: bool,
}

impl<'c> Pages<'c> {
    /// Walk `path` from page 1
    pub fn new(client: &'c ForgeClient, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
            next_page: 1,
            finished: false,
        }
    }

    /// Path of a given page
    #[must_use]
    pub fn page_path(&self, page: u32) -> String {
        let sep = if self.path.contains('?') { '&' } else { '?' };
        format!("{}{sep}per_page={PER_PAGE}&page={page}", self.path)
    }

    /// Decode pages into element lists
    #[must_use]
    pub fn items<T: DeserializeOwned>(self) -> Items<'c, T> {
        Items {
            pages: self,
            _marker: PhantomData,
        }
    }
}

impl Iterator for Pages<'_> {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let number = self.next_page;
        let path = self.page_path(number);
        let response = match self.client.get(&path) {
            Ok(response) => response,
            Err(e) => {
                self.finished = true;
                return Some(Err(e));
            }
        };

        if !response.is_success() {
            info!(
                status = response.status.as_u16(),
                path = %self.path,
                "got a non-success response, assuming we got all the pages"
            );
            self.finished = true;
            return None;
        }

        debug!(page = number, path = %self.path, "fetched a new page");
        self.next_page += 1;
        Some(Ok(Page {
            number,
            path,
            body: response.body,
        }))
    }
}

/// Lazy sequence of decoded, non-empty pages
pub struct Items<'c, T> {
    pages: Pages<'c>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Iterator for Items<'_, T> {
    type Item = Result<Vec<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        let page = match self.pages.next()? {
            Ok(page) => page,
            Err(e) => return Some(Err(e)),
        };
        match page.decode::<T>() {
            Ok(items) if items.is_empty() => {
                debug!(page = page.number, "empty page, finished scrolling");
                self.pages.finished = true;
                None
            }
            Ok(items) => {
                debug!(page = page.number, count = items.len(), "parsed page");
                Some(Ok(items))
            }
            Err(e) => {
                self.pages.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Filtering and limit applied while walking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Skip archived repositories and closed projects
    pub skip_archived: bool,
    /// Stop after this many items have been processed
    pub limit: Option<usize>,
}

/// Totals of one walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Items handed to the consumer
    pub processed: usize,
    /// Items rejected by the filter
    pub skipped: usize,
    /// Whether the walk ended because of the limit
    pub limit_reached: bool,
}

/// Fold over decoded items.
///
/// Items rejected by `keep` are skipped and do not count towards the limit.
/// Once `limit` items were processed no further page is requested.
pub fn walk<T, K, F>(items: Items<'_, T>, limit: Option<usize>, mut keep: K, mut each: F) -> Result<WalkSummary>
where
    T: DeserializeOwned,
    K: FnMut(&T) -> bool,
    F: FnMut(T) -> Result<()>,
{
    let mut summary = WalkSummary::default();
    if limit == Some(0) {
        summary.limit_reached = true;
        return Ok(summary);
    }

    for page in items {
        for item in page? {
            if !keep(&item) {
                summary.skipped += 1;
                continue;
            }
            each(item)?;
            summary.processed += 1;
            if limit.is_some_and(|l| summary.processed >= l) {
                debug!(processed = summary.processed, "reached configured limit");
                summary.limit_reached = true;
                return Ok(summary);
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Credentials;

    #[test]
    fn test_page_path() {
        let client = ForgeClient::new(
            "https://api.example.test",
            Credentials {
                username: "u".into(),
                token: "t".into(),
            },
        )
        .unwrap();

        let pages = Pages::new(&client, "/orgs/acme/repos");
        assert_eq!(pages.page_path(1), "/orgs/acme/repos?per_page=100&page=1");
        assert_eq!(pages.page_path(12), "/orgs/acme/repos?per_page=100&page=12");

        let pages = Pages::new(&client, "/orgs/acme/projects?state=all");
        assert_eq!(pages.page_path(2), "/orgs/acme/projects?state=all&per_page=100&page=2");
    }

    #[test]
    fn test_page_decode_error_names_path() {
        let page = Page {
            number: 1,
            path: "/broken?per_page=100&page=1".into(),
            body: b"not json".to_vec(),
        };
        let err = page.decode::<u32>().unwrap_err();
        assert!(err.to_string().contains("/broken"));
    }
}
