//! Request state machine.
//!
//! A player request moves `INIT → FETCHING → RESOLVING → FETCHING →
//! EXTRACTING → NORMALIZING → DONE` (the second fetch loads the game log);
//! team requests skip resolution. `ERROR` absorbs a failure from any stage.

use std::sync::{Mutex, PoisonError};

use strum_macros::{AsRefStr, Display};

/// Where a scrape request currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    /// Looking up the site profile.
    Init,
    /// Retrieving a page.
    Fetching,
    /// Matching the player against the roster.
    Resolving,
    /// Reading the statistics table.
    Extracting,
    /// Mapping the table onto game records.
    Normalizing,
    /// Finished successfully.
    Done,
    /// Failed; terminal.
    Error,
}

impl Stage {
    /// Whether no further transition can happen.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

/// Records the stage of one request.
///
/// The tracker outlives the request future, so the stage is still readable
/// after the future was dropped by a budget timeout.
#[derive(Debug)]
pub struct StageTracker {
    label: String,
    current: Mutex<Stage>,
    failed_in: Mutex<Option<Stage>>,
}

impl StageTracker {
    /// Starts a tracker in [`Stage::Init`]; `label` prefixes its log lines.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            current: Mutex::new(Stage::Init),
            failed_in: Mutex::new(None),
        }
    }

    /// Current stage.
    #[must_use]
    pub fn current(&self) -> Stage {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stage the request was in when it failed, if it did.
    #[must_use]
    pub fn failed_in(&self) -> Option<Stage> {
        *self.failed_in.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves to `next`. Transitions out of a terminal stage are ignored.
    pub fn advance(&self, next: Stage) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if current.is_terminal() {
            log::debug!("[{}] ignoring {next} after {}", self.label, *current);
            return;
        }
        log::debug!("[{}] {} -> {next}", self.label, *current);
        *current = next;
    }

    /// Moves to [`Stage::Error`] and returns the stage that failed.
    pub fn fail(&self) -> Stage {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let failed = *current;
        if failed != Stage::Error {
            *self.failed_in.lock().unwrap_or_else(PoisonError::into_inner) = Some(failed);
            log::debug!("[{}] {failed} -> {}", self.label, Stage::Error);
            *current = Stage::Error;
        }
        self.failed_in().unwrap_or(failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_player_stages() {
        let tracker = StageTracker::new("Charlie Davis #8 (belmont)");
        assert_eq!(tracker.current(), Stage::Init);
        for stage in [
            Stage::Fetching,
            Stage::Resolving,
            Stage::Fetching,
            Stage::Extracting,
            Stage::Normalizing,
            Stage::Done,
        ] {
            tracker.advance(stage);
            assert_eq!(tracker.current(), stage);
        }
        assert_eq!(tracker.failed_in(), None);
    }

    #[test]
    fn error_is_absorbing() {
        let tracker = StageTracker::new("lsu");
        tracker.advance(Stage::Fetching);
        tracker.advance(Stage::Resolving);
        assert_eq!(tracker.fail(), Stage::Resolving);

        tracker.advance(Stage::Extracting);
        assert_eq!(tracker.current(), Stage::Error);
        assert_eq!(tracker.fail(), Stage::Resolving);
        assert_eq!(tracker.failed_in(), Some(Stage::Resolving));
    }

    #[test]
    fn displays_screaming_case() {
        assert_eq!(Stage::Normalizing.to_string(), "NORMALIZING");
        assert_eq!(Stage::Init.as_ref(), "INIT");
    }
}
