//! Pipeline settings.
//!
//! Settings come from an optional `gamelog.toml`, then `GAMELOG_*`
//! environment variables, then whatever the caller (usually CLI flags) sets
//! on top. Every field has a default, so an empty file is a valid config.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Datelike as _;
use gamelog_record_models::Season;
use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "gamelog.toml";

/// User agent sent by static fetches and browser sessions.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`PipelineConfig`].
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// An environment override could not be parsed.
    #[error("invalid value for {name}: '{value}'")]
    InvalidEnv {
        /// Variable name.
        name: String,
        /// Offending value.
        value: String,
    },
}

/// Tunables for fetching, retrying and output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Season to scrape when a request does not name one. `None` means the
    /// current calendar year.
    pub season: Option<Season>,
    /// Per-request HTTP timeout and browser navigation timeout.
    pub request_timeout_secs: u64,
    /// How long a dynamic page may take to render its table.
    pub render_wait_secs: u64,
    /// How often the DOM is polled for the table while waiting.
    pub poll_interval_ms: u64,
    /// Retries for transient fetch failures.
    pub max_retries: u32,
    /// Linear backoff step between retries.
    pub backoff_step_ms: u64,
    /// Browser sessions shared by concurrent requests (1 to 4).
    pub pool_size: usize,
    /// Wall-clock budget for one request across all retries.
    pub request_budget_secs: u64,
    /// `WebDriver` server used for dynamic pages.
    pub webdriver_url: String,
    /// Run the browser without a window.
    pub headless: bool,
    /// User agent for every request.
    pub user_agent: String,
    /// Directory output files are written to.
    pub output_dir: PathBuf,
    /// Requests run at once in a batch.
    pub batch_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            season: None,
            request_timeout_secs: 30,
            render_wait_secs: 12,
            poll_interval_ms: 250,
            max_retries: 2,
            backoff_step_ms: 1000,
            pool_size: 2,
            request_budget_secs: 120,
            webdriver_url: "http://localhost:4444".to_string(),
            headless: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            output_dir: PathBuf::from("output"),
            batch_concurrency: 4,
        }
    }
}

impl PipelineConfig {
    /// Parses a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the text is not a valid config.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Loads `path`, or [`DEFAULT_CONFIG_FILE`] if it exists when `path` is
    /// `None`, then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an explicitly given file is missing, a
    /// file is not valid TOML, or an environment override is malformed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        let path = match path {
            Some(path) => Some(path),
            None if default_path.is_file() => Some(default_path),
            None => None,
        };

        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                log::debug!("Loaded config from {}", path.display());
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Applies `GAMELOG_SEASON`, `GAMELOG_WEBDRIVER_URL` and
    /// `GAMELOG_OUTPUT_DIR` as read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if `GAMELOG_SEASON` is not a year.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup("GAMELOG_SEASON") {
            let season = value
                .trim()
                .parse::<Season>()
                .map_err(|_| ConfigError::InvalidEnv {
                    name: "GAMELOG_SEASON".to_string(),
                    value: value.clone(),
                })?;
            self.season = Some(season);
        }
        if let Some(url) = lookup("GAMELOG_WEBDRIVER_URL") {
            self.webdriver_url = url;
        }
        if let Some(dir) = lookup("GAMELOG_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Configured season, else the current calendar year.
    #[must_use]
    pub fn default_season(&self) -> Season {
        self.season.unwrap_or_else(|| {
            Season::try_from(chrono::Local::now().year()).unwrap_or(Season::MAX)
        })
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub const fn render_wait(&self) -> Duration {
        Duration::from_secs(self.render_wait_secs)
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub const fn request_budget(&self) -> Duration {
        Duration::from_secs(self.request_budget_secs)
    }

    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff_step: Duration::from_millis(self.backoff_step_ms),
        }
    }
}
