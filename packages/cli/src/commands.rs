//! Command implementations shared by flag-driven and interactive runs.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use gamelog_cli_utils::{IndicatifProgress, MultiProgress};
use gamelog_pipeline::{Pipeline, PipelineConfig, ScrapeError};
use gamelog_record::export::write_outputs;
use gamelog_record_models::{PlayerQuery, ScrapeResult, Season};
use gamelog_site::SiteRegistry;

/// Settings that override the config file and environment.
#[derive(Debug, Default, clap::Args)]
pub struct Overrides {
    /// Pipeline config file (default: ./gamelog.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Directory of extra site profile TOML files; same keys replace built-ins
    #[arg(long, global = true)]
    pub sites_dir: Option<PathBuf>,
    /// Season (year) to scrape; defaults to the configured or current year
    #[arg(long, global = true)]
    pub season: Option<Season>,
    /// Directory to write CSV and JSON files to
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,
}

/// Site profiles plus settings for one run.
pub struct Context {
    pub registry: SiteRegistry,
    pub config: PipelineConfig,
}

impl Context {
    /// Loads config and site profiles, applying `overrides` last.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file or a site profile is invalid.
    pub fn load(overrides: &Overrides) -> Result<Self, Box<dyn Error>> {
        let mut config = PipelineConfig::load(overrides.config.as_deref())?;
        if let Some(season) = overrides.season {
            config.season = Some(season);
        }
        if let Some(dir) = &overrides.output_dir {
            config.output_dir.clone_from(dir);
        }

        let mut registry = SiteRegistry::builtin();
        if let Some(dir) = &overrides.sites_dir {
            registry = registry.with_overrides(SiteRegistry::load_dir(dir)?);
        }
        log::debug!("{} site profiles loaded", registry.len());

        Ok(Self { registry, config })
    }

    async fn connect<'a>(
        self,
        schools: impl IntoIterator<Item = &'a str>,
    ) -> Result<Pipeline, ScrapeError> {
        let needs_browser = self.registry.requires_browser_for(schools);
        Pipeline::connect(self.registry, self.config, needs_browser).await
    }
}

/// Scrapes one player and writes their files.
pub async fn scrape_player(ctx: Context, multi: &MultiProgress, query: &PlayerQuery) -> ExitCode {
    let label = query.label();
    let pipeline = match ctx.connect([query.school.as_str()]).await {
        Ok(pipeline) => pipeline,
        Err(e) => {
            report_failure(&label, &e);
            return ExitCode::FAILURE;
        }
    };

    let spinner = IndicatifProgress::spinner(multi, &format!("Scraping {label}"));
    let outcome = pipeline.scrape_player(query).await;
    spinner.finish_and_clear();
    pipeline.shutdown().await;

    finish(outcome, &label, &pipeline.config().output_dir)
}

/// Scrapes a team's stats page and writes its files.
pub async fn scrape_team(ctx: Context, multi: &MultiProgress, key: &str) -> ExitCode {
    let season = ctx.config.default_season();
    let label = format!("{key} {season}");
    let pipeline = match ctx.connect([key]).await {
        Ok(pipeline) => pipeline,
        Err(e) => {
            report_failure(&label, &e);
            return ExitCode::FAILURE;
        }
    };

    let spinner = IndicatifProgress::spinner(multi, &format!("Scraping {label}"));
    let outcome = pipeline.scrape_team(key, season).await;
    spinner.finish_and_clear();
    pipeline.shutdown().await;

    finish(outcome, &label, &pipeline.config().output_dir)
}

/// Scrapes every query, writing files for each success. Fails if any
/// request failed.
pub async fn scrape_batch(
    ctx: Context,
    multi: &MultiProgress,
    queries: &[PlayerQuery],
) -> ExitCode {
    if queries.is_empty() {
        eprintln!("No players to scrape.");
        return ExitCode::FAILURE;
    }

    let schools: Vec<String> = queries.iter().map(|q| q.school.clone()).collect();
    let pipeline = match ctx.connect(schools.iter().map(String::as_str)).await {
        Ok(pipeline) => pipeline,
        Err(e) => {
            report_failure("batch", &e);
            return ExitCode::FAILURE;
        }
    };

    let progress = IndicatifProgress::batch_bar(multi, "Scraping players");
    let outcomes = pipeline.scrape_batch(queries, progress.as_ref()).await;
    pipeline.shutdown().await;

    let mut failed = 0;
    for (query, outcome) in queries.iter().zip(outcomes) {
        let written = match outcome {
            Ok(result) => write_result(&result, &pipeline.config().output_dir),
            Err(e) => {
                report_failure(&query.label(), &e);
                false
            }
        };
        if !written {
            failed += 1;
        }
    }

    println!();
    println!("{} of {} players scraped", queries.len() - failed, queries.len());
    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Prints the configured site profiles.
pub fn list_sites(registry: &SiteRegistry) {
    println!("{:<16} {:<8} {:<14} {:<9} NAME", "KEY", "RENDER", "PLATFORM", "SPORT");
    println!("{}", "-".repeat(72));
    for site in registry.iter() {
        println!(
            "{:<16} {:<8} {:<14} {:<9} {}",
            site.key,
            site.render_mode.as_ref(),
            site.platform.as_ref(),
            site.sport.as_ref(),
            site.display_name
        );
    }
    if registry.requires_browser() {
        println!();
        println!("DYNAMIC sites need a WebDriver server (e.g. chromedriver --port=4444).");
    }
}

fn finish(outcome: Result<ScrapeResult, ScrapeError>, label: &str, output_dir: &Path) -> ExitCode {
    let written = match outcome {
        Ok(result) => write_result(&result, output_dir),
        Err(e) => {
            report_failure(label, &e);
            false
        }
    };
    if written {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Writes the output files and prints a summary. Returns `false` if the
/// files could not be written.
fn write_result(result: &ScrapeResult, output_dir: &Path) -> bool {
    let files = match write_outputs(output_dir, result) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("error: could not write output for {}: {e}", result.subject.name());
            return false;
        }
    };

    println!(
        "{} ({}): {} games, {} -> {}",
        result.subject.name(),
        result.season,
        result.games.len(),
        result.completeness(),
        files.csv.display()
    );
    if !result.warnings.is_empty() {
        eprintln!("  {} warnings:", result.warnings.len());
        for warning in &result.warnings {
            eprintln!("    {warning}");
        }
    }
    true
}

fn report_failure(label: &str, err: &ScrapeError) {
    log::debug!("[{label}] {err:?}");
    eprintln!(
        "error: {label}: {} failed [{}]: {err}",
        err.stage(),
        err.kind()
    );
}
