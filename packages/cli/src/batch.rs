//! Batch input files.
//!
//! A batch file is CSV with a header row of `name,jersey_number,school`
//! and an optional `season` column. Empty cells mean "not given".

use std::io::Read;

use gamelog_record_models::{PlayerQuery, Season};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct BatchRow {
    name: String,
    #[serde(default)]
    jersey_number: Option<String>,
    school: String,
    #[serde(default)]
    season: Option<Season>,
}

/// Reads one [`PlayerQuery`] per row. Rows without a season use
/// `default_season`.
///
/// # Errors
///
/// Returns a CSV error if a row is missing a name or school column or has
/// a season that is not a year.
pub fn read_queries<R: Read>(reader: R, default_season: Season) -> Result<Vec<PlayerQuery>, csv::Error> {
    let mut rows = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    rows.deserialize::<BatchRow>()
        .map(|row| {
            let row = row?;
            Ok(PlayerQuery::new(
                &row.name,
                row.jersey_number.as_deref(),
                &row.school,
                row.season.unwrap_or(default_season),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_with_and_without_jersey() {
        let input = "\
name,jersey_number,school,season
Charlie Davis,8,belmont_abbey,2025
Jake Smith,,lsu,
";
        let queries = read_queries(input.as_bytes(), 2024).unwrap();
        assert_eq!(queries.len(), 2);

        assert_eq!(queries[0].name, "Charlie Davis");
        assert_eq!(queries[0].jersey_number.as_deref(), Some("8"));
        assert_eq!(queries[0].school, "belmont_abbey");
        assert_eq!(queries[0].season, 2025);

        assert_eq!(queries[1].jersey_number, None);
        assert_eq!(queries[1].season, 2024);
    }

    #[test]
    fn season_column_is_optional() {
        let input = "name,jersey_number,school\nSam Lee,08,vanderbilt\n";
        let queries = read_queries(input.as_bytes(), 2025).unwrap();
        assert_eq!(queries[0].season, 2025);
        assert_eq!(queries[0].jersey_number.as_deref(), Some("08"));
    }

    #[test]
    fn bad_season_is_an_error() {
        let input = "name,jersey_number,school,season\nSam Lee,8,lsu,next\n";
        assert!(read_queries(input.as_bytes(), 2025).is_err());
    }
}
