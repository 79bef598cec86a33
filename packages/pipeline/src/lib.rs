#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Scrape orchestration.
//!
//! [`Pipeline`] runs one request through fetch, resolution, extraction and
//! normalization, in that order, and either returns a [`ScrapeResult`]
//! (possibly with warnings) or a [`ScrapeError`] that names the failing
//! [`Stage`]. Transient fetch failures are retried by [`RetryingFetcher`];
//! every request runs under a wall-clock budget after which it is
//! cancelled. Independent requests can run concurrently with
//! [`Pipeline::scrape_batch`], sharing one browser pool.

pub mod config;
pub mod progress;
pub mod retry;
pub mod stage;

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt as _;
use gamelog_record::{NormalizeContext, Normalizer, SynonymTable};
use gamelog_record_models::{
    GameRecord, PlayerQuery, ScrapeResult, ScrapeSubject, Season, Warning,
};
use gamelog_resolver::{ResolutionError, resolve_in_roster};
use gamelog_scraper::browser::WebDriverFactory;
use gamelog_scraper::pool::BrowserPool;
use gamelog_scraper::{
    BrowserFetcher, Document, ExtractionError, FetchError, HttpFetcher, PageFetcher, SiteFetcher,
    extract_table,
};
use gamelog_site::{SiteError, SiteRegistry};
use gamelog_site_models::{RenderMode, SiteProfile, TableLocator};
use tokio::time::error::Elapsed;

pub use config::{ConfigError, PipelineConfig};
pub use progress::{NullProgress, ProgressCallback, null_progress};
pub use retry::{RetryPolicy, RetryingFetcher};
pub use stage::{Stage, StageTracker};

/// A terminal scrape failure.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// The school/team key is unknown or its profile is unusable.
    #[error("{0}")]
    Site(#[from] SiteError),

    /// The HTTP client could not be built.
    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// A page could not be retrieved (after retries, where applicable).
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The player could not be matched on the roster.
    #[error("{0}")]
    Resolution(#[from] ResolutionError),

    /// The statistics table could not be located.
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// The request exceeded its budget and was abandoned.
    #[error("cancelled during {stage}: request budget of {budget:?} exceeded")]
    Cancelled {
        /// Stage in progress when the budget ran out.
        stage: Stage,
        /// The budget that was exceeded.
        budget: Duration,
    },
}

impl ScrapeError {
    /// Stage the request failed in.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Site(_) | Self::Client(_) | Self::Fetch(FetchError::BrowserUnavailable { .. }) => {
                Stage::Init
            }
            Self::Fetch(_) => Stage::Fetching,
            Self::Resolution(_) => Stage::Resolving,
            Self::Extraction(_) => Stage::Extracting,
            Self::Cancelled { stage, .. } => *stage,
        }
    }

    /// Stable short name of the failure, e.g. `ambiguous` or
    /// `render_timeout`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Site(SiteError::UnknownSite { .. }) => "unknown_site",
            Self::Site(_) => "site_config",
            Self::Client(_) => "http_client",
            Self::Fetch(e) => e.kind(),
            Self::Resolution(e) => e.kind(),
            Self::Extraction(e) => e.kind(),
            Self::Cancelled { .. } => "cancelled",
        }
    }
}

/// Runs scrape requests against a set of site profiles.
pub struct Pipeline {
    fetcher: Arc<dyn PageFetcher>,
    site_fetcher: Option<Arc<SiteFetcher>>,
    registry: SiteRegistry,
    config: PipelineConfig,
}

impl Pipeline {
    /// Creates a pipeline on top of `fetcher`, adding retries per `config`.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        registry: SiteRegistry,
        config: PipelineConfig,
    ) -> Self {
        let fetcher = Arc::new(RetryingFetcher::new(fetcher, config.retry_policy()));
        Self {
            fetcher,
            site_fetcher: None,
            registry,
            config,
        }
    }

    /// Creates a pipeline backed by the real HTTP client and, when
    /// `needs_browser` is set, a started browser pool.
    ///
    /// Call [`Pipeline::shutdown`] when done so browser sessions are quit.
    ///
    /// # Errors
    ///
    /// * [`ScrapeError::Client`] if the HTTP client cannot be built
    /// * [`ScrapeError::Fetch`] with [`FetchError::BrowserUnavailable`] if no
    ///   browser session can be started
    pub async fn connect(
        registry: SiteRegistry,
        config: PipelineConfig,
        needs_browser: bool,
    ) -> Result<Self, ScrapeError> {
        let http = HttpFetcher::new(&config.user_agent)?;

        let browser = if needs_browser {
            log::info!("Starting browser pool via {}", config.webdriver_url);
            let factory = Arc::new(WebDriverFactory::new(
                &config.webdriver_url,
                config.headless,
                &config.user_agent,
            ));
            let pool = BrowserPool::start(factory, config.pool_size).await?;
            Some(BrowserFetcher::new(
                Arc::new(pool),
                config.render_wait(),
                config.poll_interval(),
            ))
        } else {
            log::debug!("No dynamic sites requested; not starting a browser");
            None
        };

        let site_fetcher = Arc::new(SiteFetcher::new(http, browser));
        let mut pipeline = Self::new(site_fetcher.clone(), registry, config);
        pipeline.site_fetcher = Some(site_fetcher);
        Ok(pipeline)
    }

    /// Site profiles this pipeline serves.
    #[must_use]
    pub const fn registry(&self) -> &SiteRegistry {
        &self.registry
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Quits pooled browser sessions. Requests still running fail with
    /// [`FetchError::BrowserUnavailable`] once they need a new session.
    pub async fn shutdown(&self) {
        if let Some(site_fetcher) = &self.site_fetcher {
            site_fetcher.shutdown().await;
        }
    }

    /// Scrapes one player's game log.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] tagged with the stage that failed; a request
    /// that exceeds its budget returns [`ScrapeError::Cancelled`].
    pub async fn scrape_player(&self, query: &PlayerQuery) -> Result<ScrapeResult, ScrapeError> {
        let tracker = StageTracker::new(query.label());
        let budget = self.config.request_budget();
        let outcome = tokio::time::timeout(budget, self.run_player(query, &tracker)).await;
        settle(&tracker, outcome, budget)
    }

    /// Scrapes a team's game-by-game stats page.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] tagged with the stage that failed; a request
    /// that exceeds its budget returns [`ScrapeError::Cancelled`].
    pub async fn scrape_team(&self, key: &str, season: Season) -> Result<ScrapeResult, ScrapeError> {
        let tracker = StageTracker::new(format!("{key} {season}"));
        let budget = self.config.request_budget();
        let outcome = tokio::time::timeout(budget, self.run_team(key, season, &tracker)).await;
        settle(&tracker, outcome, budget)
    }

    /// Scrapes many players concurrently, at most `batch_concurrency` at a
    /// time. Returns one outcome per query, in input order.
    pub async fn scrape_batch(
        &self,
        queries: &[PlayerQuery],
        progress: &dyn ProgressCallback,
    ) -> Vec<Result<ScrapeResult, ScrapeError>> {
        progress.set_total(queries.len() as u64);
        let concurrency = self.config.batch_concurrency.max(1);
        log::info!(
            "Scraping {} players, {concurrency} at a time",
            queries.len()
        );

        let mut outcomes: Vec<(usize, Result<ScrapeResult, ScrapeError>)> =
            futures::stream::iter(queries.iter().enumerate())
                .map(|(index, query)| async move {
                    let outcome = self.scrape_player(query).await;
                    progress.set_message(query.label());
                    progress.inc(1);
                    (index, outcome)
                })
                .buffer_unordered(concurrency)
                .collect()
                .await;
        outcomes.sort_by_key(|(index, _)| *index);

        let failed = outcomes.iter().filter(|(_, o)| o.is_err()).count();
        progress.finish(format!(
            "{} players scraped, {failed} failed",
            queries.len() - failed
        ));
        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }

    async fn run_player(
        &self,
        query: &PlayerQuery,
        tracker: &StageTracker,
    ) -> Result<ScrapeResult, ScrapeError> {
        let profile = self.registry.get(&query.school)?;
        let tag = &profile.key;

        tracker.advance(Stage::Fetching);
        let roster_url = profile.roster_url(query.season);
        log::info!("[{tag}] Fetching roster {roster_url}");
        let roster_ready = profile.player_link_locator();
        let roster = self
            .fetch(&roster_url, profile.render_mode, Some(&roster_ready))
            .await?;

        tracker.advance(Stage::Resolving);
        let player = resolve_in_roster(&roster, query, profile)?;

        tracker.advance(Stage::Fetching);
        log::info!("[{tag}] Fetching game log {}", player.game_log_url);
        let page = self
            .fetch(
                &player.game_log_url,
                profile.render_mode,
                Some(&profile.table_locator),
            )
            .await?;

        let ctx = NormalizeContext::for_player(&player, query.season);
        let (games, warnings) =
            extract_and_normalize(&page, &profile.table_locator, profile, &ctx, tracker)?;
        log::info!(
            "[{tag}] {}: {} games, {} warnings",
            player.name,
            games.len(),
            warnings.len()
        );

        Ok(ScrapeResult {
            subject: ScrapeSubject::Player(player),
            season: query.season,
            games,
            warnings,
        })
    }

    async fn run_team(
        &self,
        key: &str,
        season: Season,
        tracker: &StageTracker,
    ) -> Result<ScrapeResult, ScrapeError> {
        let profile = self.registry.get(key)?;
        let tag = &profile.key;

        tracker.advance(Stage::Fetching);
        let stats_url = profile.stats_url(season);
        log::info!("[{tag}] Fetching team stats {stats_url}");
        let page = self
            .fetch(
                &stats_url,
                profile.render_mode,
                Some(&profile.team_table_locator),
            )
            .await?;

        let ctx = NormalizeContext::for_team(season);
        let (games, warnings) =
            extract_and_normalize(&page, &profile.team_table_locator, profile, &ctx, tracker)?;
        log::info!(
            "[{tag}] {}: {} games, {} warnings",
            profile.display_name,
            games.len(),
            warnings.len()
        );

        Ok(ScrapeResult {
            subject: ScrapeSubject::Team {
                key: profile.key.clone(),
                display_name: profile.display_name.clone(),
                stats_url,
            },
            season,
            games,
            warnings,
        })
    }

    async fn fetch(
        &self,
        url: &str,
        mode: RenderMode,
        ready: Option<&TableLocator>,
    ) -> Result<Document, ScrapeError> {
        Ok(self
            .fetcher
            .fetch(url, mode, ready, self.config.request_timeout())
            .await?)
    }
}

fn extract_and_normalize(
    page: &Document,
    locator: &TableLocator,
    profile: &SiteProfile,
    ctx: &NormalizeContext,
    tracker: &StageTracker,
) -> Result<(Vec<GameRecord>, Vec<Warning>), ScrapeError> {
    tracker.advance(Stage::Extracting);
    let (table, mut warnings) = extract_table(page, locator)?;
    log::debug!(
        "[{}] table has {} columns, {} rows",
        profile.key,
        table.header_cells.len(),
        table.rows.len()
    );

    tracker.advance(Stage::Normalizing);
    let synonyms = SynonymTable::builtin().with_synonyms(&profile.header_synonyms);
    let (games, row_warnings) = Normalizer::new(synonyms).normalize(&table, ctx);
    warnings.extend(row_warnings);
    Ok((games, warnings))
}

fn settle(
    tracker: &StageTracker,
    outcome: Result<Result<ScrapeResult, ScrapeError>, Elapsed>,
    budget: Duration,
) -> Result<ScrapeResult, ScrapeError> {
    match outcome {
        Ok(Ok(result)) => {
            tracker.advance(Stage::Done);
            Ok(result)
        }
        Ok(Err(e)) => {
            tracker.fail();
            Err(e)
        }
        Err(_) => {
            let stage = tracker.fail();
            log::warn!("Request budget of {budget:?} exceeded during {stage}");
            Err(ScrapeError::Cancelled { stage, budget })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicU64, Ordering};

    use async_trait::async_trait;
    use gamelog_record_models::{Completeness, Field, HomeAway, Outcome};
    use gamelog_site_models::{Platform, Sport};

    use super::*;
    use crate::retry::tests::{ScriptedFetcher, timeout};

    const ROSTER_URL: &str = "https://belmontbruins.com/sports/baseball/roster/2025";
    const GAME_LOG_URL: &str =
        "https://belmontbruins.com/sports/baseball/roster/charlie-davis/4763?view=gamelog&season=2025";
    const STATS_URL: &str = "https://belmontbruins.com/sports/baseball/stats/2025";

    const ROSTER: &str = r#"
        <ul>
          <li><span class="roster-jersey-number">8</span>
              <a href="/sports/baseball/roster/charlie-davis/4763">Charlie Davis</a></li>
          <li><span class="roster-jersey-number">12</span>
              <a href="/sports/baseball/roster/sam-ortiz/4770">Sam Ortiz</a></li>
          <li><span class="roster-jersey-number">21</span>
              <a href="/sports/baseball/roster/sam-ortiz/4771">Sam Ortiz</a></li>
        </ul>
    "#;

    fn game_log(rows: &[&str]) -> String {
        let body: String = rows
            .iter()
            .map(|row| {
                let cells: String = row.split(',').map(|c| format!("<td>{c}</td>")).collect();
                format!("<tr>{cells}</tr>")
            })
            .collect();
        format!(
            "<table class=\"gamelog\"><thead><tr><th>Date</th><th>Opp</th><th>Result</th>\
             <th>AB</th><th>H</th><th>R</th><th>RBI</th><th>BB</th><th>Ks</th></tr></thead>\
             <tbody>{body}</tbody></table>"
        )
    }

    fn belmont() -> SiteProfile {
        SiteProfile {
            key: "belmont".to_string(),
            display_name: "Belmont Bruins".to_string(),
            base_url: "https://belmontbruins.com".to_string(),
            stats_path_template: "/sports/baseball/stats/{season}".to_string(),
            roster_path_template: "/sports/baseball/roster/{season}".to_string(),
            game_log_template: "{player_url}?view=gamelog&season={season}".to_string(),
            player_link_pattern: "/sports/baseball/roster/".to_string(),
            table_locator: TableLocator::new("table.gamelog").with_required_headers(&["Date"]),
            team_table_locator: TableLocator::new("table.gamelog"),
            render_mode: RenderMode::Static,
            platform: Platform::Sidearm,
            sport: Sport::Baseball,
            header_synonyms: BTreeMap::from([("Ks".to_string(), Field::Strikeouts)]),
        }
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            backoff_step_ms: 1,
            ..PipelineConfig::default()
        }
    }

    fn pipeline(fetcher: Arc<ScriptedFetcher>) -> Pipeline {
        let registry = SiteRegistry::from_profiles([belmont()]).unwrap();
        Pipeline::new(fetcher, registry, config())
    }

    fn charlie() -> PlayerQuery {
        PlayerQuery::new("Charlie Davis", Some("8"), "belmont", 2025)
    }

    #[tokio::test]
    async fn scrapes_charlie_davis_game_log() {
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .page(ROSTER_URL, ROSTER)
                .page(
                    GAME_LOG_URL,
                    &game_log(&["3/14/2025,@ Vanderbilt,W 7-2,4,2,1,3,1,0"]),
                ),
        );
        let result = pipeline(fetcher).scrape_player(&charlie()).await.unwrap();

        assert_eq!(result.games.len(), 1);
        assert_eq!(result.completeness(), Completeness::Complete);
        let game = &result.games[0];
        assert_eq!(game.opponent, "Vanderbilt");
        assert_eq!(game.home_or_away, HomeAway::Away);
        assert_eq!(game.result.outcome, Outcome::Win);
        assert_eq!(game.result.runs_scored, Some(7));
        assert_eq!(game.result.runs_allowed, Some(2));
        assert_eq!(
            (game.at_bats, game.hits, game.runs, game.rbi, game.walks, game.strikeouts),
            (Some(4), Some(2), Some(1), Some(3), Some(1), Some(0))
        );
        assert_eq!(game.player_name.as_deref(), Some("Charlie Davis"));
        assert_eq!(game.jersey_number.as_deref(), Some("8"));

        let ScrapeSubject::Player(player) = &result.subject else {
            panic!("expected a player subject");
        };
        assert_eq!(player.game_log_url, GAME_LOG_URL);
    }

    #[tokio::test]
    async fn unparsable_cell_is_partial_success() {
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .page(ROSTER_URL, ROSTER)
                .page(
                    GAME_LOG_URL,
                    &game_log(&["3/15/2025,Tennessee,L 3-5,abc,1,0,0,0,2"]),
                ),
        );
        let result = pipeline(fetcher).scrape_player(&charlie()).await.unwrap();

        assert_eq!(result.games.len(), 1);
        assert_eq!(result.games[0].at_bats, None);
        assert_eq!(result.games[0].hits, Some(1));
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.completeness(), Completeness::Partial);
    }

    #[tokio::test]
    async fn short_row_is_dropped_with_warning() {
        let fetcher = Arc::new(
            ScriptedFetcher::default().page(ROSTER_URL, ROSTER).page(
                GAME_LOG_URL,
                &game_log(&[
                    "3/14/2025,@ Vanderbilt,W 7-2,4,2,1,3,1,0",
                    "3/15/2025,Tennessee,L 3-5",
                    "3/16/2025,Tennessee,W 6-1,3,1,1,0,1,1",
                ]),
            ),
        );
        let result = pipeline(fetcher).scrape_player(&charlie()).await.unwrap();

        assert_eq!(result.games.len(), 2);
        assert!(matches!(
            result.warnings.as_slice(),
            [Warning::RowLengthMismatch {
                expected: 9,
                found: 3,
                ..
            }]
        ));
    }

    #[tokio::test]
    async fn ambiguous_player_fails_in_resolution() {
        let fetcher = Arc::new(ScriptedFetcher::default().page(ROSTER_URL, ROSTER));
        let query = PlayerQuery::new("Sam Ortiz", None, "belmont", 2025);
        let err = pipeline(fetcher.clone()).scrape_player(&query).await.unwrap_err();

        assert_eq!(err.stage(), Stage::Resolving);
        assert_eq!(err.kind(), "ambiguous");
        assert!(err.to_string().starts_with("player ambiguous: 2 candidates"));
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn unknown_school_fails_before_fetching() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let query = PlayerQuery::new("Charlie Davis", Some("8"), "vandy", 2025);
        let err = pipeline(fetcher.clone()).scrape_player(&query).await.unwrap_err();

        assert_eq!(err.stage(), Stage::Init);
        assert_eq!(err.kind(), "unknown_site");
        assert_eq!(fetcher.call_count(), 0);
    }

    #[tokio::test]
    async fn transient_roster_failure_is_retried() {
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .respond(ROSTER_URL, Err(timeout(ROSTER_URL)))
                .page(ROSTER_URL, ROSTER)
                .page(
                    GAME_LOG_URL,
                    &game_log(&["3/14/2025,@ Vanderbilt,W 7-2,4,2,1,3,1,0"]),
                ),
        );
        let result = pipeline(fetcher.clone()).scrape_player(&charlie()).await.unwrap();

        assert_eq!(result.games.len(), 1);
        assert_eq!(fetcher.call_count(), 3);
    }

    #[tokio::test]
    async fn http_status_is_terminal() {
        let fetcher = Arc::new(
            ScriptedFetcher::default().page(ROSTER_URL, ROSTER).respond(
                GAME_LOG_URL,
                Err(FetchError::HttpStatus {
                    url: GAME_LOG_URL.to_string(),
                    status: 404,
                }),
            ),
        );
        let err = pipeline(fetcher.clone()).scrape_player(&charlie()).await.unwrap_err();

        assert_eq!(err.stage(), Stage::Fetching);
        assert_eq!(err.kind(), "http_status");
        assert_eq!(fetcher.call_count(), 2);
    }

    #[tokio::test]
    async fn missing_table_fails_in_extraction() {
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .page(ROSTER_URL, ROSTER)
                .page(GAME_LOG_URL, "<p>No games yet</p>"),
        );
        let err = pipeline(fetcher).scrape_player(&charlie()).await.unwrap_err();

        assert_eq!(err.stage(), Stage::Extracting);
        assert_eq!(err.kind(), "table_not_found");
    }

    #[tokio::test]
    async fn repeated_runs_are_identical() {
        let fetcher = Arc::new(
            ScriptedFetcher::default().page(ROSTER_URL, ROSTER).page(
                GAME_LOG_URL,
                &game_log(&[
                    "3/14/2025,@ Vanderbilt,W 7-2,4,2,1,3,1,0",
                    "3/15/2025,Tennessee,L 3-5,abc,1,0,0,0,2",
                ]),
            ),
        );
        let pipeline = pipeline(fetcher);
        let first = pipeline.scrape_player(&charlie()).await.unwrap();
        let second = pipeline.scrape_player(&charlie()).await.unwrap();

        assert_eq!(first.games, second.games);
        assert_eq!(first.warnings, second.warnings);
    }

    #[tokio::test]
    async fn scrapes_team_stats() {
        let fetcher = Arc::new(ScriptedFetcher::default().page(
            STATS_URL,
            &game_log(&[
                "3/14/2025,@ Vanderbilt,W 7-2,34,12,7,7,5,8",
                "Totals,,,34,12,7,7,5,8",
            ]),
        ));
        let result = pipeline(fetcher).scrape_team("BELMONT", 2025).await.unwrap();

        assert_eq!(result.games.len(), 1);
        assert_eq!(result.games[0].player_name, None);
        assert_eq!(result.games[0].at_bats, Some(34));
        assert!(matches!(
            &result.subject,
            ScrapeSubject::Team { key, stats_url, .. } if key == "belmont" && stats_url == STATS_URL
        ));
    }

    struct StalledFetcher;

    #[async_trait]
    impl PageFetcher for StalledFetcher {
        async fn fetch(
            &self,
            _url: &str,
            _mode: RenderMode,
            _ready: Option<&TableLocator>,
            _timeout: Duration,
        ) -> Result<Document, FetchError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Document::new("", ""))
        }
    }

    #[tokio::test]
    async fn budget_cancels_stalled_request() {
        let registry = SiteRegistry::from_profiles([belmont()]).unwrap();
        let config = PipelineConfig {
            request_budget_secs: 1,
            ..config()
        };
        let pipeline = Pipeline::new(Arc::new(StalledFetcher), registry, config);

        let err = pipeline.scrape_player(&charlie()).await.unwrap_err();
        assert_eq!(err.kind(), "cancelled");
        assert_eq!(err.stage(), Stage::Fetching);
    }

    #[derive(Default)]
    struct CountingProgress {
        total: AtomicU64,
        done: AtomicU64,
    }

    impl ProgressCallback for CountingProgress {
        fn set_total(&self, total: u64) {
            self.total.store(total, Ordering::SeqCst);
        }
        fn inc(&self, delta: u64) {
            self.done.fetch_add(delta, Ordering::SeqCst);
        }
        fn set_message(&self, _msg: String) {}
        fn finish(&self, _msg: String) {}
        fn finish_and_clear(&self) {}
    }

    #[tokio::test]
    async fn batch_keeps_input_order() {
        let fetcher = Arc::new(
            ScriptedFetcher::default().page(ROSTER_URL, ROSTER).page(
                GAME_LOG_URL,
                &game_log(&["3/14/2025,@ Vanderbilt,W 7-2,4,2,1,3,1,0"]),
            ),
        );
        let queries = [
            PlayerQuery::new("Sam Ortiz", None, "belmont", 2025),
            charlie(),
            PlayerQuery::new("Charlie Davis", Some("8"), "lipscomb", 2025),
        ];
        let progress = CountingProgress::default();
        let outcomes = pipeline(fetcher).scrape_batch(&queries, &progress).await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].as_ref().unwrap_err().kind(), "ambiguous");
        assert_eq!(outcomes[1].as_ref().unwrap().games.len(), 1);
        assert_eq!(outcomes[2].as_ref().unwrap_err().kind(), "unknown_site");
        assert_eq!(progress.total.load(Ordering::SeqCst), 3);
        assert_eq!(progress.done.load(Ordering::SeqCst), 3);
    }
}
