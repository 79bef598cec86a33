//! Progress reporting for batch runs.
//!
//! [`ProgressCallback`] keeps the pipeline independent of how progress is
//! shown; the CLI renders it with `indicatif`, tests pass [`NullProgress`].

use std::sync::Arc;

/// Receives progress updates from a running batch.
///
/// Implementations must be `Send + Sync` since updates arrive from
/// concurrently running requests.
pub trait ProgressCallback: Send + Sync {
    /// Sets the number of requests in the batch.
    fn set_total(&self, total: u64);

    /// Advances by `delta` finished requests.
    fn inc(&self, delta: u64);

    /// Updates the message shown next to the indicator.
    fn set_message(&self, msg: String);

    /// Marks the batch as done with a final message.
    fn finish(&self, msg: String);

    /// Marks the batch as done and removes the indicator.
    fn finish_and_clear(&self);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
    fn finish_and_clear(&self) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
