#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical game-by-game record schema.
//!
//! Every site, whatever its column set or labels, is normalized into
//! [`GameRecord`] values. Numeric statistics are `Option<u32>` so that a
//! column the site does not publish (or a cell that could not be read) stays
//! distinguishable from a real zero.
//!
//! This crate also carries the identity types that flow through the
//! pipeline ([`PlayerQuery`] in, [`ResolvedPlayer`] out of resolution) and
//! the top-level [`ScrapeResult`].

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A season is identified by its four-digit calendar year.
pub type Season = u16;

/// Canonical fields a statistics column can map onto.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    /// Game date.
    Date,
    /// Opponent name, possibly carrying a home/away marker.
    Opponent,
    /// Game result, e.g. `"W 7-2"`.
    Result,
    /// At bats (AB).
    AtBats,
    /// Hits (H).
    Hits,
    /// Runs scored by the player (R).
    Runs,
    /// Runs batted in (RBI).
    Rbi,
    /// Walks (BB).
    Walks,
    /// Strikeouts (K / SO).
    Strikeouts,
    /// Total bases (TB).
    TotalBases,
}

impl Field {
    /// All canonical fields, in output column order.
    pub const ALL: &[Self] = &[
        Self::Date,
        Self::Opponent,
        Self::Result,
        Self::AtBats,
        Self::Hits,
        Self::Runs,
        Self::Rbi,
        Self::Walks,
        Self::Strikeouts,
        Self::TotalBases,
    ];

    /// Returns `true` for the non-negative integer batting counts.
    #[must_use]
    pub const fn is_count(self) -> bool {
        !matches!(self, Self::Date | Self::Opponent | Self::Result)
    }
}

/// Where a game was played, relative to the subject's team.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum HomeAway {
    /// Opponent marked with `vs`.
    Home,
    /// Opponent marked with `@` or `at`.
    Away,
    /// No marker present; never guessed.
    #[default]
    Unknown,
}

/// Win/loss outcome of a game.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// `W`
    Win,
    /// `L`
    Loss,
    /// Missing, unplayed, or unreadable result.
    #[default]
    Unknown,
}

/// Structured game result parsed from strings like `"W, 5-3"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    /// Win, loss, or unknown.
    pub outcome: Outcome,
    /// Runs scored by the subject's team.
    pub runs_scored: Option<u32>,
    /// Runs allowed by the subject's team.
    pub runs_allowed: Option<u32>,
}

impl GameResult {
    /// A result with an unknown outcome and no score.
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            outcome: Outcome::Unknown,
            runs_scored: None,
            runs_allowed: None,
        }
    }
}

/// One game of canonical, typed statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// Calendar date of the game. `None` when the cell was empty or could
    /// not be parsed (the latter is accompanied by a warning).
    pub date: Option<NaiveDate>,
    /// Opponent name with home/away markers removed.
    pub opponent: String,
    /// Derived from the opponent marker.
    pub home_or_away: HomeAway,
    /// Parsed result.
    pub result: GameResult,
    /// At bats.
    pub at_bats: Option<u32>,
    /// Hits.
    pub hits: Option<u32>,
    /// Runs.
    pub runs: Option<u32>,
    /// Runs batted in.
    pub rbi: Option<u32>,
    /// Walks.
    pub walks: Option<u32>,
    /// Strikeouts.
    pub strikeouts: Option<u32>,
    /// Total bases.
    pub total_bases: Option<u32>,
    /// Player name carried through from the query (absent for team records).
    pub player_name: Option<String>,
    /// Jersey number carried through from the query (absent for team records).
    pub jersey_number: Option<String>,
    /// Season the record belongs to.
    pub season: Season,
}

impl GameRecord {
    /// Returns the value of a batting count field.
    ///
    /// Returns `None` for non-count fields and for absent counts.
    #[must_use]
    pub const fn count(&self, field: Field) -> Option<u32> {
        match field {
            Field::AtBats => self.at_bats,
            Field::Hits => self.hits,
            Field::Runs => self.runs,
            Field::Rbi => self.rbi,
            Field::Walks => self.walks,
            Field::Strikeouts => self.strikeouts,
            Field::TotalBases => self.total_bases,
            Field::Date | Field::Opponent | Field::Result => None,
        }
    }

    /// Sets a batting count field. Non-count fields are ignored.
    pub const fn set_count(&mut self, field: Field, value: Option<u32>) {
        match field {
            Field::AtBats => self.at_bats = value,
            Field::Hits => self.hits = value,
            Field::Runs => self.runs = value,
            Field::Rbi => self.rbi = value,
            Field::Walks => self.walks = value,
            Field::Strikeouts => self.strikeouts = value,
            Field::TotalBases => self.total_bases = value,
            Field::Date | Field::Opponent | Field::Result => {}
        }
    }
}

/// A table as rendered: header labels and trimmed cell text, not yet
/// interpreted.
///
/// Every row has exactly `header_cells.len()` cells; rows that did not were
/// dropped during extraction with a [`Warning::RowLengthMismatch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Header labels in column order.
    pub header_cells: Vec<String>,
    /// Data rows in source order.
    pub rows: Vec<Vec<String>>,
}

/// A non-fatal issue found while extracting or normalizing a table.
///
/// Warnings never halt a scrape; the affected field or row is simply absent
/// from the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Warning {
    /// A cell could not be parsed into its canonical field's type.
    #[serde(rename_all = "camelCase")]
    UnparsableCell {
        /// Zero-based data row index within the raw table.
        row: usize,
        /// Header label of the offending column.
        column: String,
        /// Canonical field the column maps to.
        field: Field,
        /// The cell text as rendered.
        value: String,
    },
    /// A table row's cell count did not match the header; the row was
    /// excluded.
    #[serde(rename_all = "camelCase")]
    RowLengthMismatch {
        /// Zero-based data row index within the rendered table.
        row: usize,
        /// Number of header cells.
        expected: usize,
        /// Number of cells found in the row.
        found: usize,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnparsableCell {
                row,
                column,
                field,
                value,
            } => write!(
                f,
                "row {row}: could not parse {field} from column '{column}' (value '{value}')"
            ),
            Self::RowLengthMismatch {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {row}: expected {expected} cells, found {found}; row skipped"
            ),
        }
    }
}

/// Loose, human-provided identification of a player to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerQuery {
    /// Free-text name, whitespace-collapsed.
    pub name: String,
    /// Jersey number kept as text so `"00"` and `"08"` survive. `None` when
    /// the caller does not know it.
    pub jersey_number: Option<String>,
    /// Site profile key of the player's school.
    pub school: String,
    /// Season to scrape.
    pub season: Season,
}

impl PlayerQuery {
    /// Builds a query, collapsing whitespace in the name and stripping a
    /// leading `#` from the jersey number. An empty jersey becomes `None`.
    #[must_use]
    pub fn new(name: &str, jersey_number: Option<&str>, school: &str, season: Season) -> Self {
        let jersey_number = jersey_number
            .map(|j| j.trim().trim_start_matches('#').trim().to_string())
            .filter(|j| !j.is_empty());

        Self {
            name: name.split_whitespace().collect::<Vec<_>>().join(" "),
            jersey_number,
            school: school.trim().to_string(),
            season,
        }
    }

    /// Human-readable label used in log lines and error messages.
    #[must_use]
    pub fn label(&self) -> String {
        self.jersey_number.as_ref().map_or_else(
            || format!("{} ({})", self.name, self.school),
            |jersey| format!("{} #{jersey} ({})", self.name, self.school),
        )
    }
}

/// Output of player resolution: the concrete game-log page to extract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPlayer {
    /// Name as listed on the roster.
    pub name: String,
    /// Jersey number as listed on the roster (or as queried when the roster
    /// does not show one).
    pub jersey_number: Option<String>,
    /// Site profile key.
    pub school: String,
    /// Absolute URL of the individual game-log page.
    pub game_log_url: String,
}

/// Who a [`ScrapeResult`] is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScrapeSubject {
    /// A single resolved player.
    Player(ResolvedPlayer),
    /// A whole team's game-by-game stats page.
    #[serde(rename_all = "camelCase")]
    Team {
        /// Site profile key.
        key: String,
        /// Human-readable team name.
        display_name: String,
        /// Absolute URL of the stats page that was scraped.
        stats_url: String,
    },
}

impl ScrapeSubject {
    /// Site profile key of the subject.
    #[must_use]
    pub fn school(&self) -> &str {
        match self {
            Self::Player(player) => &player.school,
            Self::Team { key, .. } => key,
        }
    }

    /// Display name of the subject (player name or team name).
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Player(player) => &player.name,
            Self::Team { display_name, .. } => display_name,
        }
    }
}

/// Whether a successful scrape was complete or had gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Completeness {
    /// No warnings were recorded.
    Complete,
    /// At least one field or row is missing; see the warnings.
    Partial,
}

/// Top-level output of one scrape request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    /// Who was scraped.
    pub subject: ScrapeSubject,
    /// Season scraped.
    pub season: Season,
    /// Game records in source order.
    pub games: Vec<GameRecord>,
    /// Non-fatal issues collected during extraction and normalization.
    pub warnings: Vec<Warning>,
}

impl ScrapeResult {
    /// Distinguishes "complete success" from "success with gaps".
    #[must_use]
    pub const fn completeness(&self) -> Completeness {
        if self.warnings.is_empty() {
            Completeness::Complete
        } else {
            Completeness::Partial
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn field_names_round_trip_through_strum() {
        for field in Field::ALL {
            assert_eq!(Field::from_str(field.as_ref()).unwrap(), *field);
        }
        assert_eq!(Field::TotalBases.to_string(), "total_bases");
    }

    #[test]
    fn only_batting_counts_are_counts() {
        let counts: Vec<Field> = Field::ALL.iter().copied().filter(|f| f.is_count()).collect();
        assert_eq!(counts.len(), 7);
        assert!(!Field::Result.is_count());
    }

    #[test]
    fn query_collapses_whitespace_and_keeps_leading_zeros() {
        let query = PlayerQuery::new("  Charlie   Davis ", Some("#08"), "belmont", 2025);
        assert_eq!(query.name, "Charlie Davis");
        assert_eq!(query.jersey_number.as_deref(), Some("08"));
        assert_eq!(query.label(), "Charlie Davis #08 (belmont)");
    }

    #[test]
    fn empty_jersey_becomes_none() {
        let query = PlayerQuery::new("Charlie Davis", Some("  "), "belmont", 2025);
        assert!(query.jersey_number.is_none());
        assert_eq!(query.label(), "Charlie Davis (belmont)");
    }

    #[test]
    fn warning_serializes_with_kind_tag() {
        let warning = Warning::RowLengthMismatch {
            row: 3,
            expected: 9,
            found: 4,
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["kind"], "ROW_LENGTH_MISMATCH");
        assert_eq!(json["expected"], 9);
    }

    #[test]
    fn completeness_follows_warnings() {
        let mut result = ScrapeResult {
            subject: ScrapeSubject::Team {
                key: "lsu".to_string(),
                display_name: "LSU Tigers".to_string(),
                stats_url: "https://lsusports.net/sports/baseball/stats/2025".to_string(),
            },
            season: 2025,
            games: Vec::new(),
            warnings: Vec::new(),
        };
        assert_eq!(result.completeness(), Completeness::Complete);

        result.warnings.push(Warning::UnparsableCell {
            row: 0,
            column: "AB".to_string(),
            field: Field::AtBats,
            value: "abc".to_string(),
        });
        assert_eq!(result.completeness(), Completeness::Partial);
        assert_eq!(result.subject.school(), "lsu");
    }
}
