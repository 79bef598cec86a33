//! Bounded retry for transient fetch failures.
//!
//! Only [`FetchError::is_transient`] errors (request and render timeouts)
//! are retried. Everything else (HTTP status, unreachable host, missing
//! browser) is returned on the first attempt.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gamelog_scraper::{Document, FetchError, PageFetcher};
use gamelog_site_models::{RenderMode, TableLocator};

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Backoff grows by this much per retry (linear).
    pub backoff_step: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based): `attempt × step`.
    #[must_use]
    pub const fn delay(&self, attempt: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_step: Duration::from_secs(1),
        }
    }
}

/// [`PageFetcher`] that retries transient failures of an inner fetcher.
pub struct RetryingFetcher {
    inner: Arc<dyn PageFetcher>,
    policy: RetryPolicy,
}

impl RetryingFetcher {
    /// Wraps `inner` with `policy`.
    #[must_use]
    pub fn new(inner: Arc<dyn PageFetcher>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl PageFetcher for RetryingFetcher {
    async fn fetch(
        &self,
        url: &str,
        mode: RenderMode,
        ready: Option<&TableLocator>,
        timeout: Duration,
    ) -> Result<Document, FetchError> {
        let max_retries = self.policy.max_retries;
        let mut attempt = 0;

        loop {
            match self.inner.fetch(url, mode, ready, timeout).await {
                Ok(doc) => return Ok(doc),
                Err(e) if e.is_transient() && attempt < max_retries => {
                    attempt += 1;
                    let delay = self.policy.delay(attempt);
                    log::warn!("  transient error: {e}");
                    log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    if e.is_transient() {
                        log::warn!("  giving up on {url} after {max_retries} retries");
                    }
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use gamelog_scraper::BrowserFetcher;
    use gamelog_scraper::browser::{BrowserSession, SessionFactory};
    use gamelog_scraper::pool::BrowserPool;

    use super::*;

    /// Fetcher that replays scripted responses per URL and counts calls.
    #[derive(Default)]
    pub struct ScriptedFetcher {
        responses: Mutex<Vec<(String, VecDeque<Result<Document, FetchError>>)>>,
        pub calls: AtomicUsize,
    }

    impl ScriptedFetcher {
        /// Queues `response` for the next fetch of `url`. The last queued
        /// response for a URL repeats once the queue is down to it.
        pub fn respond(self, url: &str, response: Result<Document, FetchError>) -> Self {
            {
                let mut responses = self.responses.lock().unwrap();
                match responses.iter_mut().find(|(u, _)| u == url) {
                    Some((_, queue)) => queue.push_back(response),
                    None => responses.push((url.to_string(), VecDeque::from([response]))),
                }
            }
            self
        }

        pub fn page(self, url: &str, html: &str) -> Self {
            self.respond(url, Ok(Document::new(url, html)))
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn replay(response: &Result<Document, FetchError>) -> Result<Document, FetchError> {
        match response {
            Ok(doc) => Ok(doc.clone()),
            Err(FetchError::Timeout { url, timeout }) => Err(FetchError::Timeout {
                url: url.clone(),
                timeout: *timeout,
            }),
            Err(FetchError::RenderTimeout { url, waited, .. }) => Err(FetchError::RenderTimeout {
                url: url.clone(),
                waited: *waited,
                partial: None,
            }),
            Err(FetchError::HttpStatus { url, status }) => Err(FetchError::HttpStatus {
                url: url.clone(),
                status: *status,
            }),
            Err(FetchError::Unreachable { url, message }) => Err(FetchError::Unreachable {
                url: url.clone(),
                message: message.clone(),
            }),
            Err(FetchError::BrowserUnavailable { message }) => Err(FetchError::BrowserUnavailable {
                message: message.clone(),
            }),
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch(
            &self,
            url: &str,
            _mode: RenderMode,
            _ready: Option<&TableLocator>,
            _timeout: Duration,
        ) -> Result<Document, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            let Some((_, queue)) = responses.iter_mut().find(|(u, _)| u == url) else {
                return Err(FetchError::HttpStatus {
                    url: url.to_string(),
                    status: 404,
                });
            };
            if queue.len() > 1 {
                queue.pop_front().unwrap()
            } else {
                replay(&queue[0])
            }
        }
    }

    pub fn timeout(url: &str) -> FetchError {
        FetchError::Timeout {
            url: url.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    fn quick() -> RetryPolicy {
        RetryPolicy {
            max_retries: 2,
            backoff_step: Duration::from_millis(1),
        }
    }

    const URL: &str = "https://lsusports.net/sports/baseball/stats/2025";

    #[tokio::test]
    async fn retries_timeouts_then_succeeds() {
        let inner = Arc::new(
            ScriptedFetcher::default()
                .respond(URL, Err(timeout(URL)))
                .respond(URL, Err(timeout(URL)))
                .page(URL, "<table></table>"),
        );
        let fetcher = RetryingFetcher::new(inner.clone(), quick());

        let doc = fetcher
            .fetch(URL, RenderMode::Static, None, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(doc.html, "<table></table>");
        assert_eq!(inner.call_count(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let inner = Arc::new(ScriptedFetcher::default().respond(URL, Err(timeout(URL))));
        let fetcher = RetryingFetcher::new(inner.clone(), quick());

        let err = fetcher
            .fetch(URL, RenderMode::Static, None, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Timeout { .. }));
        assert_eq!(inner.call_count(), 3);
    }

    #[tokio::test]
    async fn does_not_retry_http_status() {
        let inner = Arc::new(ScriptedFetcher::default().respond(
            URL,
            Err(FetchError::HttpStatus {
                url: URL.to_string(),
                status: 503,
            }),
        ));
        let fetcher = RetryingFetcher::new(inner.clone(), quick());

        let err = fetcher
            .fetch(URL, RenderMode::Static, None, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "http_status");
        assert_eq!(inner.call_count(), 1);
    }

    #[test]
    fn backoff_is_linear() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(1), Duration::from_secs(1));
        assert_eq!(policy.delay(2), Duration::from_secs(2));
    }

    /// Browser tab whose stats table appears only on the `ready_after + 1`th
    /// read of the DOM.
    struct SlowTab {
        ready_after: usize,
        reads: AtomicUsize,
    }

    #[async_trait]
    impl BrowserSession for SlowTab {
        async fn goto(&self, _url: &str) -> Result<(), FetchError> {
            Ok(())
        }

        async fn source(&self) -> Result<String, FetchError> {
            let reads = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(if reads > self.ready_after {
                "<table><tr><th>Date</th><th>Opp</th></tr><tr><td>3/1</td><td>Rice</td></tr></table>"
                    .to_string()
            } else {
                "<div class=\"spinner\"></div>".to_string()
            })
        }

        async fn quit(&self) -> Result<(), FetchError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct SlowTabs {
        launches: AtomicUsize,
    }

    #[async_trait]
    impl SessionFactory for SlowTabs {
        async fn launch(&self) -> Result<Box<dyn BrowserSession>, FetchError> {
            self.launches.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(SlowTab {
                ready_after: 1,
                reads: AtomicUsize::new(0),
            }))
        }
    }

    #[tokio::test]
    async fn render_timeout_is_retried_in_the_same_browser() {
        let tabs = Arc::new(SlowTabs::default());
        let pool = BrowserPool::new(Arc::clone(&tabs) as Arc<dyn SessionFactory>, 1);
        // A zero render budget reads the DOM once per attempt.
        let browser = BrowserFetcher::new(Arc::new(pool), Duration::ZERO, Duration::from_millis(1));
        let fetcher = RetryingFetcher::new(Arc::new(browser), quick());
        let locator = TableLocator::new("table").with_required_headers(&["Date", "Opp"]);

        let doc = fetcher
            .fetch(URL, RenderMode::Dynamic, Some(&locator), Duration::from_secs(1))
            .await
            .unwrap();

        assert!(doc.html.contains("Rice"));
        assert_eq!(tabs.launches.load(Ordering::SeqCst), 1);
    }
}
