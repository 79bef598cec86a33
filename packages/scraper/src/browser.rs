//! Headless browser rendering for script-built pages.
//!
//! [`BrowserSession`] and [`SessionFactory`] abstract over the browser so the
//! pool and readiness logic can be exercised without one. The production
//! implementation drives Chrome through a `WebDriver` server
//! ([`WebDriverFactory`]).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gamelog_site_models::{RenderMode, TableLocator};
use thirtyfour::{ChromiumLikeCapabilities, DesiredCapabilities, WebDriver};
use tokio::time::Instant;

use crate::pool::BrowserPool;
use crate::table::is_ready;
use crate::{Document, FetchError, PageFetcher};

/// One live browser tab.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigates to `url` and waits for the load event.
    async fn goto(&self, url: &str) -> Result<(), FetchError>;

    /// Serialized current DOM.
    async fn source(&self) -> Result<String, FetchError>;

    /// Ends the session and releases the browser process.
    async fn quit(&self) -> Result<(), FetchError>;
}

/// Launches new browser sessions.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Starts a fresh session.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::BrowserUnavailable`] if no browser can be
    /// started.
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, FetchError>;
}

/// Chrome arguments that keep headless rendering stable in containers.
const CHROME_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--window-size=1920,1080",
];

/// Launches Chrome sessions through a `WebDriver` server
/// (chromedriver or Selenium).
#[derive(Debug, Clone)]
pub struct WebDriverFactory {
    server_url: String,
    headless: bool,
    user_agent: String,
}

impl WebDriverFactory {
    /// Creates a factory for the `WebDriver` server at `server_url`.
    #[must_use]
    pub fn new(server_url: &str, headless: bool, user_agent: &str) -> Self {
        Self {
            server_url: server_url.to_string(),
            headless,
            user_agent: user_agent.to_string(),
        }
    }

    fn unavailable(&self, err: &thirtyfour::error::WebDriverError) -> FetchError {
        FetchError::BrowserUnavailable {
            message: format!("{}: {err}", self.server_url),
        }
    }
}

#[async_trait]
impl SessionFactory for WebDriverFactory {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, FetchError> {
        let mut caps = DesiredCapabilities::chrome();
        if self.headless {
            caps.set_headless().map_err(|e| self.unavailable(&e))?;
        }
        for arg in CHROME_ARGS {
            caps.add_arg(arg).map_err(|e| self.unavailable(&e))?;
        }
        caps.add_arg(&format!("--user-agent={}", self.user_agent))
            .map_err(|e| self.unavailable(&e))?;

        let driver = WebDriver::new(self.server_url.as_str(), caps)
            .await
            .map_err(|e| self.unavailable(&e))?;
        log::debug!("Started WebDriver session at {}", self.server_url);

        Ok(Box::new(WebDriverSession { driver }))
    }
}

struct WebDriverSession {
    driver: WebDriver,
}

fn navigation_error(url: &str, err: &thirtyfour::error::WebDriverError) -> FetchError {
    FetchError::Unreachable {
        url: url.to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn goto(&self, url: &str) -> Result<(), FetchError> {
        self.driver
            .goto(url)
            .await
            .map_err(|e| navigation_error(url, &e))
    }

    async fn source(&self) -> Result<String, FetchError> {
        self.driver
            .source()
            .await
            .map_err(|e| navigation_error("page source", &e))
    }

    async fn quit(&self) -> Result<(), FetchError> {
        self.driver
            .clone()
            .quit()
            .await
            .map_err(|e| FetchError::BrowserUnavailable {
                message: e.to_string(),
            })
    }
}

/// Renders pages in pooled browser sessions and waits for the target table.
pub struct BrowserFetcher {
    pool: Arc<BrowserPool>,
    render_wait: Duration,
    poll_interval: Duration,
}

impl BrowserFetcher {
    /// Creates a fetcher that polls every `poll_interval` for up to
    /// `render_wait` after navigation.
    #[must_use]
    pub const fn new(pool: Arc<BrowserPool>, render_wait: Duration, poll_interval: Duration) -> Self {
        Self {
            pool,
            render_wait,
            poll_interval,
        }
    }

    /// The underlying session pool.
    #[must_use]
    pub fn pool(&self) -> &BrowserPool {
        &self.pool
    }

    /// Polls the rendered DOM until it holds a table `locator` accepts, or
    /// the render budget runs out. Returns the last document read either way.
    async fn wait_for_table(
        &self,
        url: &str,
        session: &dyn BrowserSession,
        locator: &TableLocator,
    ) -> Result<(bool, Document), FetchError> {
        let deadline = Instant::now() + self.render_wait;
        loop {
            let doc = Document::new(url, session.source().await?);
            if is_ready(&doc, locator) {
                return Ok((true, doc));
            }
            if Instant::now() >= deadline {
                return Ok((false, doc));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(
        &self,
        url: &str,
        _mode: RenderMode,
        ready: Option<&TableLocator>,
        timeout: Duration,
    ) -> Result<Document, FetchError> {
        let lease = self.pool.acquire().await?;

        let navigated = tokio::time::timeout(timeout, lease.session()?.goto(url)).await;
        let Ok(result) = navigated else {
            // A stuck navigation leaves the tab in an unknown state.
            lease.discard().await;
            return Err(FetchError::Timeout {
                url: url.to_string(),
                timeout,
            });
        };
        result?;

        let session = lease.session()?;
        let doc = match ready {
            Some(locator) => {
                let (found, doc) = self.wait_for_table(url, session, locator).await?;
                if !found {
                    log::warn!(
                        "{url}: no table matching '{}' after {:?}",
                        locator.primary,
                        self.render_wait
                    );
                    return Err(FetchError::RenderTimeout {
                        url: url.to_string(),
                        waited: self.render_wait,
                        partial: Some(Box::new(doc)),
                    });
                }
                doc
            }
            None => Document::new(url, session.source().await?),
        };

        log::debug!("Rendered {url} ({} bytes)", doc.html.len());
        Ok(doc)
    }
}
