//! CSV and JSON output.
//!
//! The CSV form is flat: one row per game, the nested result spread over
//! `outcome`, `runs_scored` and `runs_allowed` columns, absent values as
//! empty cells. It reads back into identical [`GameRecord`]s. The JSON form
//! is the whole [`ScrapeResult`], warnings included.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use gamelog_record_models::{
    GameRecord, GameResult, HomeAway, Outcome, ScrapeResult, ScrapeSubject, Season,
};
use serde::{Deserialize, Serialize};

/// Errors that can occur while writing or reading output files.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// File system error.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// CSV encoding or decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExportError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// One CSV row.
#[derive(Debug, Serialize, Deserialize)]
struct GameRow {
    date: Option<NaiveDate>,
    opponent: String,
    home_or_away: HomeAway,
    outcome: Outcome,
    runs_scored: Option<u32>,
    runs_allowed: Option<u32>,
    at_bats: Option<u32>,
    hits: Option<u32>,
    runs: Option<u32>,
    rbi: Option<u32>,
    walks: Option<u32>,
    strikeouts: Option<u32>,
    total_bases: Option<u32>,
    player_name: Option<String>,
    jersey_number: Option<String>,
    season: Season,
}

impl From<&GameRecord> for GameRow {
    fn from(game: &GameRecord) -> Self {
        Self {
            date: game.date,
            opponent: game.opponent.clone(),
            home_or_away: game.home_or_away,
            outcome: game.result.outcome,
            runs_scored: game.result.runs_scored,
            runs_allowed: game.result.runs_allowed,
            at_bats: game.at_bats,
            hits: game.hits,
            runs: game.runs,
            rbi: game.rbi,
            walks: game.walks,
            strikeouts: game.strikeouts,
            total_bases: game.total_bases,
            player_name: game.player_name.clone(),
            jersey_number: game.jersey_number.clone(),
            season: game.season,
        }
    }
}

impl From<GameRow> for GameRecord {
    fn from(row: GameRow) -> Self {
        Self {
            date: row.date,
            opponent: row.opponent,
            home_or_away: row.home_or_away,
            result: GameResult {
                outcome: row.outcome,
                runs_scored: row.runs_scored,
                runs_allowed: row.runs_allowed,
            },
            at_bats: row.at_bats,
            hits: row.hits,
            runs: row.runs,
            rbi: row.rbi,
            walks: row.walks,
            strikeouts: row.strikeouts,
            total_bases: row.total_bases,
            player_name: row.player_name,
            jersey_number: row.jersey_number,
            season: row.season,
        }
    }
}

/// Writes `games` as CSV to `writer`.
///
/// # Errors
///
/// Returns [`ExportError::Csv`] if writing fails.
pub fn write_csv<W: Write>(writer: W, games: &[GameRecord]) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    for game in games {
        csv.serialize(GameRow::from(game))?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Reads games back from CSV produced by [`write_csv`].
///
/// # Errors
///
/// Returns [`ExportError::Csv`] if the input is not valid game CSV.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<GameRecord>, ExportError> {
    let mut csv = csv::Reader::from_reader(reader);
    csv.deserialize::<GameRow>()
        .map(|row| Ok(GameRecord::from(row?)))
        .collect()
}

/// Writes `result` as pretty-printed JSON to `writer`.
///
/// # Errors
///
/// Returns [`ExportError::Json`] if serialization fails.
pub fn write_json<W: Write>(writer: W, result: &ScrapeResult) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, result)?;
    Ok(())
}

/// Lowercase, underscore-separated form of `text` for file names.
#[must_use]
pub fn slug(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// File stem for a result: `<subject>_<school>_<season>`. A player subject
/// is their name plus jersey number when known, so same-named teammates get
/// separate files; team scrapes use `team` (e.g.
/// `charlie_davis_08_belmont_2025`, `team_lsu_2025`).
#[must_use]
pub fn output_stem(result: &ScrapeResult) -> String {
    let subject = match &result.subject {
        ScrapeSubject::Player(player) => match player.jersey_number.as_deref().map(slug) {
            Some(jersey) if !jersey.is_empty() => format!("{}_{jersey}", slug(&player.name)),
            _ => slug(&player.name),
        },
        ScrapeSubject::Team { .. } => "team".to_string(),
    };
    format!(
        "{subject}_{}_{}",
        slug(result.subject.school()),
        result.season
    )
}

/// Paths of the files written for one result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    /// Flat CSV of the games.
    pub csv: PathBuf,
    /// Full JSON result.
    pub json: PathBuf,
}

/// Writes the CSV and JSON forms of `result` under `dir`, creating it if
/// needed.
///
/// # Errors
///
/// Returns [`ExportError`] if the directory or either file cannot be
/// written.
pub fn write_outputs(dir: &Path, result: &ScrapeResult) -> Result<OutputFiles, ExportError> {
    std::fs::create_dir_all(dir).map_err(|e| ExportError::io(dir, e))?;
    let stem = output_stem(result);
    let files = OutputFiles {
        csv: dir.join(format!("{stem}.csv")),
        json: dir.join(format!("{stem}.json")),
    };

    let csv_file = File::create(&files.csv).map_err(|e| ExportError::io(&files.csv, e))?;
    write_csv(BufWriter::new(csv_file), &result.games)?;

    let json_file = File::create(&files.json).map_err(|e| ExportError::io(&files.json, e))?;
    let mut json_writer = BufWriter::new(json_file);
    write_json(&mut json_writer, result)?;
    json_writer
        .flush()
        .map_err(|e| ExportError::io(&files.json, e))?;

    log::info!(
        "Wrote {} games to {} and {}",
        result.games.len(),
        files.csv.display(),
        files.json.display()
    );
    Ok(files)
}

#[cfg(test)]
mod tests {
    use gamelog_record_models::{ResolvedPlayer, Warning};

    use super::*;

    fn games() -> Vec<GameRecord> {
        vec![
            GameRecord {
                date: NaiveDate::from_ymd_opt(2025, 3, 14),
                opponent: "Vanderbilt".to_string(),
                home_or_away: HomeAway::Away,
                result: GameResult {
                    outcome: Outcome::Win,
                    runs_scored: Some(7),
                    runs_allowed: Some(2),
                },
                at_bats: Some(4),
                hits: Some(2),
                runs: Some(1),
                rbi: Some(3),
                walks: Some(1),
                strikeouts: Some(0),
                total_bases: None,
                player_name: Some("Charlie Davis".to_string()),
                jersey_number: Some("08".to_string()),
                season: 2025,
            },
            GameRecord {
                date: None,
                opponent: "Tennessee, Knoxville".to_string(),
                home_or_away: HomeAway::Unknown,
                result: GameResult::unknown(),
                at_bats: None,
                hits: Some(1),
                runs: Some(0),
                rbi: Some(0),
                walks: Some(0),
                strikeouts: Some(2),
                total_bases: None,
                player_name: Some("Charlie Davis".to_string()),
                jersey_number: Some("08".to_string()),
                season: 2025,
            },
        ]
    }

    fn result() -> ScrapeResult {
        ScrapeResult {
            subject: ScrapeSubject::Player(ResolvedPlayer {
                name: "Charlie Davis".to_string(),
                jersey_number: Some("08".to_string()),
                school: "belmont".to_string(),
                game_log_url: "https://belmontbruins.com/sports/baseball/roster/charlie-davis/4763"
                    .to_string(),
            }),
            season: 2025,
            games: games(),
            warnings: vec![Warning::UnparsableCell {
                row: 1,
                column: "AB".to_string(),
                field: gamelog_record_models::Field::AtBats,
                value: "abc".to_string(),
            }],
        }
    }

    #[test]
    fn csv_reads_back_identically() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &games()).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();

        let header = text.lines().next().unwrap();
        assert!(header.starts_with("date,opponent,home_or_away,outcome,runs_scored"));
        assert!(text.contains("2025-03-14,Vanderbilt,AWAY,WIN,7,2,4,2,1,3,1,0,,"));

        assert_eq!(read_csv(buf.as_slice()).unwrap(), games());
    }

    #[test]
    fn absent_counts_are_empty_not_zero() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &games()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let second = text.lines().nth(2).unwrap();
        assert!(second.starts_with(",\"Tennessee, Knoxville\",UNKNOWN,UNKNOWN,,,,1,"), "{second}");
    }

    #[test]
    fn json_carries_whole_result() {
        let mut buf = Vec::new();
        write_json(&mut buf, &result()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["subject"]["type"], "player");
        assert_eq!(value["games"][0]["homeOrAway"], "AWAY");
        assert_eq!(value["games"][0]["result"]["runsScored"], 7);
        assert_eq!(value["games"][1]["atBats"], serde_json::Value::Null);
        assert_eq!(value["warnings"][0]["kind"], "UNPARSABLE_CELL");
    }

    #[test]
    fn names_files_after_subject_school_and_season() {
        assert_eq!(output_stem(&result()), "charlie_davis_08_belmont_2025");
        assert_eq!(slug("  O'Neil  Jr. "), "o_neil_jr");

        let team = ScrapeResult {
            subject: ScrapeSubject::Team {
                key: "lsu".to_string(),
                display_name: "LSU Tigers".to_string(),
                stats_url: "https://lsusports.net/sports/baseball/stats/2025".to_string(),
            },
            season: 2024,
            games: Vec::new(),
            warnings: Vec::new(),
        };
        assert_eq!(output_stem(&team), "team_lsu_2024");
    }

    #[test]
    fn same_named_players_get_separate_files() {
        let player = |jersey: Option<&str>| {
            let mut result = result();
            if let ScrapeSubject::Player(player) = &mut result.subject {
                player.name = "Jake Smith".to_string();
                player.jersey_number = jersey.map(str::to_string);
            }
            result
        };

        let four = output_stem(&player(Some("4")));
        let twenty_two = output_stem(&player(Some("22")));
        assert_eq!(four, "jake_smith_4_belmont_2025");
        assert_eq!(twenty_two, "jake_smith_22_belmont_2025");
        assert_ne!(four, twenty_two);
        assert_eq!(output_stem(&player(None)), "jake_smith_belmont_2025");
    }

    #[test]
    fn writes_both_files() {
        let dir = std::env::temp_dir().join(format!("gamelog_export_{}", std::process::id()));
        let files = write_outputs(&dir, &result()).unwrap();

        let csv = File::open(&files.csv).unwrap();
        let reread = read_csv(csv).unwrap();
        let json = std::fs::read_to_string(&files.json).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(reread, games());
        assert!(json.contains("\"gameLogUrl\""));
        assert!(files.csv.ends_with("charlie_davis_08_belmont_2025.csv"));
    }
}
