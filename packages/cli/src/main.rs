#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the college baseball game log scraper.
//!
//! With a subcommand, runs it and exits. Without one, falls back to an
//! interactive menu. Log output goes through
//! [`gamelog_cli_utils::init_logger`] so log lines and progress bars never
//! fight for the terminal. Set `RUST_LOG=debug` for fetch and stage detail.

mod batch;
mod commands;
mod interactive;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use gamelog_cli_utils::MultiProgress;
use gamelog_record_models::PlayerQuery;

use crate::commands::{Context, Overrides};

#[derive(Parser)]
#[command(name = "gamelog", about = "Scrape college baseball game logs into CSV and JSON")]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape one player's game-by-game log
    Player {
        /// Player name as it appears on the roster (e.g. "Charlie Davis")
        name: String,

        /// Site key of the player's school (see `gamelog sites`)
        #[arg(long)]
        school: String,

        /// Jersey number; needed when two players share the name
        #[arg(long, short)]
        jersey: Option<String>,
    },
    /// Scrape a team's season stats table
    Team {
        /// Site key of the school
        school: String,
    },
    /// Scrape every player listed in a CSV file
    /// (`name,jersey_number,school[,season]`)
    Batch {
        /// Path to the CSV file
        file: PathBuf,
    },
    /// List configured site profiles
    Sites,
}

#[tokio::main]
async fn main() -> ExitCode {
    let multi = gamelog_cli_utils::init_logger("info");
    let cli = Cli::parse();

    match run(cli, &multi).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, multi: &MultiProgress) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let ctx = Context::load(&cli.overrides)?;

    let Some(command) = cli.command else {
        return interactive::run(ctx, multi).await;
    };

    let code = match command {
        Commands::Player {
            name,
            school,
            jersey,
        } => {
            let query = PlayerQuery::new(
                &name,
                jersey.as_deref(),
                &school,
                ctx.config.default_season(),
            );
            commands::scrape_player(ctx, multi, &query).await
        }
        Commands::Team { school } => commands::scrape_team(ctx, multi, &school).await,
        Commands::Batch { file } => {
            let reader = std::fs::File::open(&file)
                .map_err(|e| format!("failed to open {}: {e}", file.display()))?;
            let queries = batch::read_queries(reader, ctx.config.default_season())?;
            log::info!("{} players read from {}", queries.len(), file.display());
            commands::scrape_batch(ctx, multi, &queries).await
        }
        Commands::Sites => {
            commands::list_sites(&ctx.registry);
            ExitCode::SUCCESS
        }
    };

    Ok(code)
}
