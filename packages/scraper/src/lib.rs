#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Page fetching and table extraction for athletics sites.
//!
//! Pages are retrieved through the [`PageFetcher`] trait. Static pages go
//! through a plain HTTP client ([`http::HttpFetcher`]); pages that build
//! their statistics tables with client-side scripting are rendered in a
//! headless browser session borrowed from a bounded [`pool::BrowserPool`]
//! ([`browser::BrowserFetcher`]). [`SiteFetcher`] dispatches between the two
//! by [`RenderMode`].
//!
//! Fetchers return the raw HTML as a [`Document`]; parsing into a DOM happens
//! synchronously in [`table::extract_table`] and in the resolver, since the
//! parsed tree cannot cross await points.

pub mod browser;
pub mod http;
pub mod pool;
pub mod table;

use std::time::Duration;

use async_trait::async_trait;
use gamelog_site_models::{RenderMode, TableLocator};

pub use browser::BrowserFetcher;
pub use http::HttpFetcher;
pub use table::{ExtractionError, RawTable, extract_table, is_ready};

/// A fetched page: final URL plus rendered HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// URL the content was served from (after redirects).
    pub url: String,
    /// Rendered HTML source.
    pub html: String,
}

impl Document {
    /// Creates a document from a URL and its HTML.
    #[must_use]
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    /// Parses the HTML into a queryable DOM.
    #[must_use]
    pub fn parse(&self) -> scraper::Html {
        scraper::Html::parse_document(&self.html)
    }
}

/// Errors that can occur while fetching a page.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// DNS, connection, or browser navigation failure.
    #[error("{url} is unreachable: {message}")]
    Unreachable {
        /// Requested URL.
        url: String,
        /// Underlying error text.
        message: String,
    },

    /// The server answered with a status code of 400 or above.
    #[error("{url} returned HTTP {status}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The request did not complete within its timeout.
    #[error("{url} timed out after {timeout:?}")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Timeout that elapsed.
        timeout: Duration,
    },

    /// A dynamic page loaded but the target table never appeared.
    #[error("{url}: table did not render within {waited:?}")]
    RenderTimeout {
        /// Requested URL.
        url: String,
        /// How long readiness was polled.
        waited: Duration,
        /// Whatever the browser had rendered when polling gave up.
        partial: Option<Box<Document>>,
    },

    /// No headless browser runtime could be reached or launched.
    #[error("headless browser unavailable: {message}")]
    BrowserUnavailable {
        /// Why the browser could not be used.
        message: String,
    },
}

impl FetchError {
    /// Whether retrying the same fetch could plausibly succeed.
    ///
    /// Only timeouts are transient. Status codes, unreachable hosts and a
    /// missing browser point at configuration problems that a retry cannot
    /// fix.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::RenderTimeout { .. })
    }

    /// Stable short name of the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unreachable { .. } => "unreachable",
            Self::HttpStatus { .. } => "http_status",
            Self::Timeout { .. } => "timeout",
            Self::RenderTimeout { .. } => "render_timeout",
            Self::BrowserUnavailable { .. } => "browser_unavailable",
        }
    }
}

/// Retrieves page content.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url`.
    ///
    /// For [`RenderMode::Dynamic`], `ready` names the table whose presence
    /// marks the page as rendered; without it the page is returned as soon
    /// as navigation completes. `timeout` bounds the request or navigation
    /// itself.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the page cannot be retrieved or never
    /// becomes ready.
    async fn fetch(
        &self,
        url: &str,
        mode: RenderMode,
        ready: Option<&TableLocator>,
        timeout: Duration,
    ) -> Result<Document, FetchError>;
}

/// Fetcher that picks the HTTP client or a browser session per request.
pub struct SiteFetcher {
    http: HttpFetcher,
    browser: Option<BrowserFetcher>,
}

impl SiteFetcher {
    /// Creates a fetcher. Without a browser fetcher, dynamic requests fail
    /// with [`FetchError::BrowserUnavailable`].
    #[must_use]
    pub const fn new(http: HttpFetcher, browser: Option<BrowserFetcher>) -> Self {
        Self { http, browser }
    }

    /// Closes the browser pool, quitting idle sessions.
    pub async fn shutdown(&self) {
        if let Some(browser) = &self.browser {
            browser.pool().shutdown().await;
        }
    }
}

#[async_trait]
impl PageFetcher for SiteFetcher {
    async fn fetch(
        &self,
        url: &str,
        mode: RenderMode,
        ready: Option<&TableLocator>,
        timeout: Duration,
    ) -> Result<Document, FetchError> {
        match mode {
            RenderMode::Static => self.http.fetch(url, mode, ready, timeout).await,
            RenderMode::Dynamic => match &self.browser {
                Some(browser) => browser.fetch(url, mode, ready, timeout).await,
                None => Err(FetchError::BrowserUnavailable {
                    message: format!("{url} needs a browser but none is configured"),
                }),
            },
        }
    }
}
