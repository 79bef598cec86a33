//! Static page fetching over plain HTTP.

use std::time::Duration;

use async_trait::async_trait;
use gamelog_site_models::{RenderMode, TableLocator};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};

use crate::{Document, FetchError, PageFetcher};

/// Browser-like `Accept` header; some athletics CDNs reject bare clients.
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Fetches pages with a single GET request each.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Builds a client that identifies itself with `user_agent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the user agent is not a valid header value or the
    /// TLS backend cannot be initialised.
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<Document, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(url, timeout, &e))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .map_err(|e| classify(url, timeout, &e))?;

        log::debug!("GET {url} -> {status} ({} bytes)", html.len());
        Ok(Document::new(final_url, html))
    }
}

/// Maps a transport error onto the fetch error taxonomy.
fn classify(url: &str, timeout: Duration, err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            timeout,
        }
    } else {
        FetchError::Unreachable {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        _mode: RenderMode,
        _ready: Option<&TableLocator>,
        timeout: Duration,
    ) -> Result<Document, FetchError> {
        self.get(url, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
    use tokio::net::TcpListener;

    use super::*;

    /// Serves one canned HTTP response on a local port.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0_u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}/sports/baseball/stats/2025")
    }

    #[tokio::test]
    async fn returns_body_on_success() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 24\r\nConnection: close\r\n\r\n<table><tr></tr></table>",
        )
        .await;
        let fetcher = HttpFetcher::new("test-agent").unwrap();
        let doc = fetcher
            .fetch(&url, RenderMode::Static, None, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(doc.html.starts_with("<table>"));
        assert_eq!(doc.url, url);
    }

    #[tokio::test]
    async fn maps_error_status() {
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let fetcher = HttpFetcher::new("test-agent").unwrap();
        let err = fetcher
            .fetch(&url, RenderMode::Static, None, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(
            matches!(err, FetchError::HttpStatus { status: 404, .. }),
            "{err}"
        );
    }

    #[tokio::test]
    async fn refused_connection_is_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpFetcher::new("test-agent").unwrap();
        let err = fetcher
            .fetch(
                &format!("http://{addr}/"),
                RenderMode::Static,
                None,
                Duration::from_secs(5),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Unreachable { .. }), "{err}");
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let fetcher = HttpFetcher::new("test-agent").unwrap();
        let err = fetcher
            .fetch(
                &format!("http://{addr}/sports/baseball/stats/2025"),
                RenderMode::Static,
                None,
                Duration::from_millis(100),
            )
            .await
            .unwrap_err();
        assert!(
            matches!(err, FetchError::Timeout { timeout, .. } if timeout == Duration::from_millis(100)),
            "{err}"
        );
        assert!(err.is_transient());
    }
}
