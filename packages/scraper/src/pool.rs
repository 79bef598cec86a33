//! Bounded pool of reusable headless browser sessions.
//!
//! Browser sessions are expensive to start, so concurrent requests share a
//! small, fixed number of them. [`BrowserPool::acquire`] waits for a free
//! slot, reuses an idle session if there is one and launches a new one
//! otherwise. The returned [`PooledSession`] hands its session back to the
//! pool when dropped, which also covers requests cancelled mid-fetch.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::FetchError;
use crate::browser::{BrowserSession, SessionFactory};

/// Largest pool the configuration may ask for.
pub const MAX_POOL_SIZE: usize = 4;

type IdleList = Arc<Mutex<Vec<Box<dyn BrowserSession>>>>;

/// Shared, bounded set of browser sessions.
pub struct BrowserPool {
    factory: Arc<dyn SessionFactory>,
    permits: Arc<Semaphore>,
    idle: IdleList,
    size: usize,
}

impl BrowserPool {
    /// Creates an empty pool of at most `size` sessions (clamped to
    /// `1..=MAX_POOL_SIZE`). Sessions are launched on first use.
    #[must_use]
    pub fn new(factory: Arc<dyn SessionFactory>, size: usize) -> Self {
        let size = size.clamp(1, MAX_POOL_SIZE);
        Self {
            factory,
            permits: Arc::new(Semaphore::new(size)),
            idle: Arc::new(Mutex::new(Vec::with_capacity(size))),
            size,
        }
    }

    /// Creates a pool and launches its first session immediately, so a
    /// missing browser runtime is reported at startup.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::BrowserUnavailable`] if the first session cannot
    /// be launched.
    pub async fn start(factory: Arc<dyn SessionFactory>, size: usize) -> Result<Self, FetchError> {
        let pool = Self::new(factory, size);
        let session = pool.factory.launch().await?;
        lock(&pool.idle).push(session);
        log::info!("Browser pool ready (up to {} sessions)", pool.size);
        Ok(pool)
    }

    /// Maximum number of concurrent sessions.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Number of sessions currently waiting in the pool.
    #[must_use]
    pub fn idle_count(&self) -> usize {
        lock(&self.idle).len()
    }

    /// Borrows a session, waiting for a free slot if all are in use.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::BrowserUnavailable`] if the pool has been shut
    /// down or a new session cannot be launched.
    pub async fn acquire(&self) -> Result<PooledSession, FetchError> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| FetchError::BrowserUnavailable {
                message: "browser pool is shut down".to_string(),
            })?;

        let reused = lock(&self.idle).pop();
        let session = if let Some(session) = reused {
            session
        } else {
            log::debug!("Launching browser session");
            self.factory.launch().await?
        };

        Ok(PooledSession {
            session: Some(session),
            idle: Arc::clone(&self.idle),
            permits: Arc::clone(&self.permits),
            _permit: permit,
        })
    }

    /// Stops handing out sessions and quits every idle one.
    ///
    /// Sessions still borrowed are quit when their guards drop.
    pub async fn shutdown(&self) {
        self.permits.close();
        let sessions: Vec<_> = lock(&self.idle).drain(..).collect();
        let count = sessions.len();
        for session in sessions {
            if let Err(e) = session.quit().await {
                log::warn!("Failed to quit browser session: {e}");
            }
        }
        log::debug!("Browser pool shut down ({count} idle sessions closed)");
    }
}

fn lock(idle: &IdleList) -> std::sync::MutexGuard<'_, Vec<Box<dyn BrowserSession>>> {
    idle.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A session borrowed from a [`BrowserPool`].
///
/// Dropping the guard returns the session to the pool, or quits it in the
/// background if the pool has since been shut down.
pub struct PooledSession {
    session: Option<Box<dyn BrowserSession>>,
    idle: IdleList,
    permits: Arc<Semaphore>,
    _permit: OwnedSemaphorePermit,
}

impl PooledSession {
    /// The borrowed session.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::BrowserUnavailable`] if the session was already
    /// discarded.
    pub fn session(&self) -> Result<&dyn BrowserSession, FetchError> {
        self.session
            .as_deref()
            .ok_or_else(|| FetchError::BrowserUnavailable {
                message: "browser session already released".to_string(),
            })
    }

    /// Quits the session instead of returning it, e.g. after it stopped
    /// responding. The pool slot is freed and a fresh session is launched
    /// on the next acquire.
    pub async fn discard(mut self) {
        if let Some(session) = self.session.take() {
            log::debug!("Discarding browser session");
            if let Err(e) = session.quit().await {
                log::warn!("Failed to quit browser session: {e}");
            }
        }
    }
}

impl Drop for PooledSession {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        if !self.permits.is_closed() {
            lock(&self.idle).push(session);
            return;
        }
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = session.quit().await {
                    log::warn!("Failed to quit browser session: {e}");
                }
            });
        } else {
            log::warn!("Browser session released after shutdown with no runtime to quit it");
        }
    }
}
