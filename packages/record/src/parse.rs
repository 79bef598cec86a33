//! Cell parsers.
//!
//! Each parser distinguishes three cases: a value, a blank cell
//! (`Ok(None)`, the statistic is simply not there), and text that is
//! present but unreadable (`Err(InvalidCell)`), which the normalizer turns
//! into a warning.

use std::sync::LazyLock;

use chrono::{Datelike as _, NaiveDate};
use gamelog_record_models::{GameResult, HomeAway, Outcome, Season};
use regex::Regex;

/// A non-blank cell that does not fit its field's format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidCell;

/// Leading weekday, e.g. `"Sat, "` or `"Fri. "`.
static WEEKDAY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+").expect("valid regex")
});

/// Trailing double-header or weekday marker, e.g. `"(1)"` or `"(Sat)"`.
static TRAILING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\((\d+|[A-Za-z]{2,9})\)$").expect("valid regex"));

/// `W 7-2`, `L, 3-5`, `W7-2`, `W 4-3 (10)`, `Win`, `L`.
static RESULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(w(?:in|on)?|l(?:oss|ost)?)[\s,.:]*(?:(\d+)\s*-\s*(\d+))?\s*(?:\(\d+\))?$")
        .expect("valid regex")
});

/// Opponent home/away markers.
static OPPONENT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(@)\s*|(at)\s+|(vs)\.?\s+|(vs)\.)").expect("valid regex")
});

/// Date formats that carry a year.
const DATED_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%m/%d/%y",
    "%m-%d-%Y",
    "%Y-%m-%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%m.%d.%Y",
];

/// Date formats without a year; the season supplies it.
const SEASONLESS_FORMATS: &[&str] = &["%b %d", "%B %d", "%m/%d"];

/// Cells that mean "no value" rather than "bad value".
const BLANK_MARKERS: &[&str] = &["", "-", "\u{2014}", "\u{2013}"];

fn is_blank(raw: &str) -> bool {
    BLANK_MARKERS.contains(&raw.trim())
}

/// Parses a site-local date, filling in the year from `season` when the
/// cell omits it.
///
/// # Errors
///
/// Returns [`InvalidCell`] if the cell is non-blank and matches no known
/// format.
pub fn parse_date(raw: &str, season: Season) -> Result<Option<NaiveDate>, InvalidCell> {
    if is_blank(raw) {
        return Ok(None);
    }

    let stripped = WEEKDAY_PREFIX.replace(raw.trim(), "");
    let cleaned = TRAILING_MARKER.replace(&stripped, "");
    let text = cleaned.trim();

    for format in DATED_FORMATS {
        // `%Y` happily reads "25" as year 25; leave two-digit years to `%y`.
        if let Ok(date) = NaiveDate::parse_from_str(text, format)
            && date.year() >= 1900
        {
            return Ok(Some(date));
        }
    }

    let with_year = format!("{text} {season}");
    for format in SEASONLESS_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&with_year, &format!("{format} %Y")) {
            return Ok(Some(date));
        }
    }

    Err(InvalidCell)
}

/// Parses a game result such as `"W, 5-3"`.
///
/// The first score is runs scored and the second runs allowed, unless the
/// pair contradicts the outcome letter, in which case they are swapped. A
/// blank cell (unplayed game) is an unknown result.
///
/// # Errors
///
/// Returns [`InvalidCell`] if the cell is non-blank and not shaped like a
/// win/loss result.
pub fn parse_result(raw: &str) -> Result<GameResult, InvalidCell> {
    if is_blank(raw) {
        return Ok(GameResult::unknown());
    }

    let caps = RESULT.captures(raw.trim()).ok_or(InvalidCell)?;
    let outcome = if caps[1].to_ascii_lowercase().starts_with('w') {
        Outcome::Win
    } else {
        Outcome::Loss
    };

    let score = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let (mut scored, mut allowed) = (score(2), score(3));
    if let (Some(a), Some(b)) = (scored, allowed) {
        let contradicts = match outcome {
            Outcome::Win => a < b,
            Outcome::Loss => a > b,
            Outcome::Unknown => false,
        };
        if contradicts {
            (scored, allowed) = (Some(b), Some(a));
        }
    }

    Ok(GameResult {
        outcome,
        runs_scored: scored,
        runs_allowed: allowed,
    })
}

/// Parses a non-negative batting count.
///
/// # Errors
///
/// Returns [`InvalidCell`] if the cell is non-blank and not a non-negative
/// integer.
pub fn parse_count(raw: &str) -> Result<Option<u32>, InvalidCell> {
    if is_blank(raw) {
        return Ok(None);
    }
    raw.trim().parse::<u32>().map(Some).map_err(|_| InvalidCell)
}

/// Splits an opponent cell into the bare name and where the game was
/// played. `@`/`at` mean away, `vs` means home; anything else is unknown.
#[must_use]
pub fn split_opponent(raw: &str) -> (String, HomeAway) {
    let text = raw.trim();
    let Some(caps) = OPPONENT_MARKER.captures(text) else {
        return (text.to_string(), HomeAway::Unknown);
    };

    let home_or_away = if caps.get(1).is_some() || caps.get(2).is_some() {
        HomeAway::Away
    } else {
        HomeAway::Home
    };
    (text[caps[0].len()..].trim().to_string(), home_or_away)
}
