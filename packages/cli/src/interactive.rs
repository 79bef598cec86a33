#![allow(clippy::module_name_repetitions)]

//! Interactive menu for the game log scraper.
//!
//! Lets a user pick a school from the configured profiles and type a
//! player's name instead of remembering flags.

use std::path::PathBuf;
use std::process::ExitCode;

use dialoguer::{Input, Select};
use gamelog_cli_utils::MultiProgress;
use gamelog_record_models::{PlayerQuery, Season};
use gamelog_site::SiteRegistry;

use crate::commands::{self, Context};

/// Top-level actions available in the interactive menu.
enum MenuAction {
    ScrapePlayer,
    ScrapeTeam,
    ScrapeBatch,
    ListSites,
}

impl MenuAction {
    const ALL: &[Self] = &[
        Self::ScrapePlayer,
        Self::ScrapeTeam,
        Self::ScrapeBatch,
        Self::ListSites,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::ScrapePlayer => "Scrape a player's game log",
            Self::ScrapeTeam => "Scrape a team's season stats",
            Self::ScrapeBatch => "Scrape players from a CSV file",
            Self::ListSites => "List configured sites",
        }
    }
}

/// Prompts for an action and its inputs, then runs it.
///
/// # Errors
///
/// Returns an error if a prompt fails or the batch file cannot be read.
pub async fn run(mut ctx: Context, multi: &MultiProgress) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let labels: Vec<&str> = MenuAction::ALL.iter().map(MenuAction::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    let code = match MenuAction::ALL[idx] {
        MenuAction::ScrapePlayer => {
            let school = select_school(&ctx.registry)?;
            let name: String = Input::new().with_prompt("Player name").interact_text()?;
            let jersey: String = Input::new()
                .with_prompt("Jersey number (empty if unknown)")
                .allow_empty(true)
                .interact_text()?;
            let season = prompt_season(ctx.config.default_season())?;

            let query = PlayerQuery::new(&name, Some(&jersey), &school, season);
            commands::scrape_player(ctx, multi, &query).await
        }
        MenuAction::ScrapeTeam => {
            let school = select_school(&ctx.registry)?;
            ctx.config.season = Some(prompt_season(ctx.config.default_season())?);
            commands::scrape_team(ctx, multi, &school).await
        }
        MenuAction::ScrapeBatch => {
            let path: String = Input::new()
                .with_prompt("CSV file (name,jersey_number,school[,season])")
                .interact_text()?;
            let file = std::fs::File::open(PathBuf::from(path.trim()))?;
            let queries = crate::batch::read_queries(file, ctx.config.default_season())?;
            commands::scrape_batch(ctx, multi, &queries).await
        }
        MenuAction::ListSites => {
            commands::list_sites(&ctx.registry);
            ExitCode::SUCCESS
        }
    };

    Ok(code)
}

/// Prompts for a school from the registry. Returns its site key.
fn select_school(registry: &SiteRegistry) -> Result<String, dialoguer::Error> {
    let sites: Vec<_> = registry.iter().collect();
    let labels: Vec<String> = sites
        .iter()
        .map(|s| format!("{} ({}, {})", s.display_name, s.key, s.render_mode))
        .collect();

    let idx = Select::new()
        .with_prompt("School")
        .items(&labels)
        .default(0)
        .max_length(20)
        .interact()?;

    Ok(sites[idx].key.clone())
}

fn prompt_season(default: Season) -> Result<Season, dialoguer::Error> {
    Input::new()
        .with_prompt("Season")
        .default(default)
        .interact_text()
}
