//! Raw table → canonical game records.

use gamelog_record_models::{
    Field, GameRecord, GameResult, HomeAway, RawTable, ResolvedPlayer, Season, Warning,
};

use crate::parse::{parse_count, parse_date, parse_result, split_opponent};
use crate::synonyms::SynonymTable;

/// Per-request values stamped onto every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeContext {
    /// Season the table belongs to; also supplies the year for dates that
    /// omit it.
    pub season: Season,
    /// Player name for player game logs.
    pub player_name: Option<String>,
    /// Jersey number for player game logs.
    pub jersey_number: Option<String>,
}

impl NormalizeContext {
    /// Context for a resolved player's game log.
    #[must_use]
    pub fn for_player(player: &ResolvedPlayer, season: Season) -> Self {
        Self {
            season,
            player_name: Some(player.name.clone()),
            jersey_number: player.jersey_number.clone(),
        }
    }

    /// Context for a team stats table; records carry no player identity.
    #[must_use]
    pub const fn for_team(season: Season) -> Self {
        Self {
            season,
            player_name: None,
            jersey_number: None,
        }
    }

    fn empty_record(&self) -> GameRecord {
        GameRecord {
            date: None,
            opponent: String::new(),
            home_or_away: HomeAway::Unknown,
            result: GameResult::unknown(),
            at_bats: None,
            hits: None,
            runs: None,
            rbi: None,
            walks: None,
            strikeouts: None,
            total_bases: None,
            player_name: self.player_name.clone(),
            jersey_number: self.jersey_number.clone(),
            season: self.season,
        }
    }
}

/// Maps raw tables onto the canonical schema.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    synonyms: SynonymTable,
}

impl Normalizer {
    /// Creates a normalizer using `synonyms` to map header labels.
    #[must_use]
    pub const fn new(synonyms: SynonymTable) -> Self {
        Self { synonyms }
    }

    /// Normalizes every data row of `table`.
    ///
    /// Unmapped columns are ignored. Canonical fields without a column stay
    /// absent. Cells that cannot be parsed leave their field absent and add
    /// a [`Warning::UnparsableCell`]; the record itself is kept. Summary rows
    /// (a first cell starting with "Total", or blank date and opponent) are
    /// skipped. Source order is preserved.
    #[must_use]
    pub fn normalize(
        &self,
        table: &RawTable,
        ctx: &NormalizeContext,
    ) -> (Vec<GameRecord>, Vec<Warning>) {
        let columns = self.synonyms.map_headers(&table.header_cells);
        for (label, field) in table.header_cells.iter().zip(&columns) {
            if field.is_none() {
                log::trace!("Ignoring column '{label}'");
            }
        }
        let date_col = columns.iter().position(|f| *f == Some(Field::Date));
        let opponent_col = columns.iter().position(|f| *f == Some(Field::Opponent));

        let mut records = Vec::with_capacity(table.rows.len());
        let mut warnings = Vec::new();

        for (row_index, row) in table.rows.iter().enumerate() {
            if is_summary_row(row, date_col, opponent_col) {
                log::debug!("Skipping summary row {row_index}: {row:?}");
                continue;
            }

            let mut record = ctx.empty_record();
            for ((cell, label), field) in row.iter().zip(&table.header_cells).zip(&columns) {
                let Some(field) = *field else {
                    continue;
                };
                let parsed = apply_cell(&mut record, field, cell, ctx.season);
                if parsed.is_err() {
                    warnings.push(Warning::UnparsableCell {
                        row: row_index,
                        column: label.clone(),
                        field,
                        value: cell.clone(),
                    });
                }
            }
            records.push(record);
        }

        if !warnings.is_empty() {
            log::warn!(
                "{} unparsable cells across {} games",
                warnings.len(),
                records.len()
            );
        }
        (records, warnings)
    }
}

/// Parses one cell into its field on `record`.
fn apply_cell(
    record: &mut GameRecord,
    field: Field,
    cell: &str,
    season: Season,
) -> Result<(), crate::parse::InvalidCell> {
    match field {
        Field::Date => record.date = parse_date(cell, season)?,
        Field::Opponent => (record.opponent, record.home_or_away) = split_opponent(cell),
        Field::Result => record.result = parse_result(cell)?,
        Field::AtBats
        | Field::Hits
        | Field::Runs
        | Field::Rbi
        | Field::Walks
        | Field::Strikeouts
        | Field::TotalBases => record.set_count(field, parse_count(cell)?),
    }
    Ok(())
}

fn is_summary_row(row: &[String], date_col: Option<usize>, opponent_col: Option<usize>) -> bool {
    if row
        .first()
        .is_some_and(|first| first.to_lowercase().starts_with("total"))
    {
        return true;
    }
    if date_col.is_none() && opponent_col.is_none() {
        return false;
    }
    let blank = |col: Option<usize>| col.and_then(|c| row.get(c)).is_none_or(|s| s.trim().is_empty());
    blank(date_col) && blank(opponent_col)
}
