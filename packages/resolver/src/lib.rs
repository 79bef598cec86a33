#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Player resolution.
//!
//! Turns a loose [`PlayerQuery`] into a [`ResolvedPlayer`] by scanning a
//! fetched roster page. Names are compared after normalization (see
//! [`names`]); the jersey number is what tells duplicate names apart.
//! Resolution never guesses: no match is [`ResolutionError::NotFound`], more
//! than one is [`ResolutionError::Ambiguous`].
//!
//! Fetching the roster is the caller's job, so the matching logic here is
//! pure and runs on any [`Document`].

pub mod names;
pub mod roster;

use gamelog_record_models::{PlayerQuery, ResolvedPlayer};
use gamelog_scraper::Document;
use gamelog_site_models::SiteProfile;

pub use roster::{Candidate, roster_candidates};

/// Errors that can occur while resolving a player.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// No roster entry matched the query.
    #[error("player not found: {name}{} on the {school} roster ({roster_size} players listed)", jersey_suffix(.jersey.as_deref()))]
    NotFound {
        /// Queried name.
        name: String,
        /// Site profile key searched.
        school: String,
        /// Queried jersey number, if any.
        jersey: Option<String>,
        /// How many players the roster page listed.
        roster_size: usize,
    },

    /// More than one roster entry matched the query.
    #[error("player ambiguous: {} candidates, specify jersey number ({})", .candidates.len(), list(.candidates))]
    Ambiguous {
        /// Queried name.
        name: String,
        /// Every matching roster entry.
        candidates: Vec<Candidate>,
    },
}

impl ResolutionError {
    /// Stable short name of the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Ambiguous { .. } => "ambiguous",
        }
    }
}

fn jersey_suffix(jersey: Option<&str>) -> String {
    jersey.map(|j| format!(" #{j}")).unwrap_or_default()
}

fn list(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Roster entries matching `query`.
///
/// A candidate matches when its name equals the query name after
/// normalization (directly or through "Last, First" reordering) and the
/// jersey numbers do not disagree. Jerseys are compared as exact strings,
/// so `"8"` and `"08"` are different players. A query without a jersey
/// accepts any number; a roster entry that shows no number accepts any
/// queried one.
#[must_use]
pub fn match_candidates<'a>(candidates: &'a [Candidate], query: &PlayerQuery) -> Vec<&'a Candidate> {
    candidates
        .iter()
        .filter(|c| names::names_match(&c.name, &query.name))
        .filter(|c| match (&query.jersey_number, &c.jersey_number) {
            (Some(wanted), Some(listed)) => wanted == listed,
            _ => true,
        })
        .collect()
}

/// Resolves `query` against a fetched roster page of `profile`.
///
/// # Errors
///
/// * [`ResolutionError::NotFound`] if no roster entry matches
/// * [`ResolutionError::Ambiguous`] if several entries match
pub fn resolve_in_roster(
    roster: &Document,
    query: &PlayerQuery,
    profile: &SiteProfile,
) -> Result<ResolvedPlayer, ResolutionError> {
    let candidates = roster_candidates(roster, &profile.player_link_pattern);
    let matches = match_candidates(&candidates, query);

    match matches.as_slice() {
        [] => Err(ResolutionError::NotFound {
            name: query.name.clone(),
            school: profile.key.clone(),
            jersey: query.jersey_number.clone(),
            roster_size: candidates.len(),
        }),
        [only] => {
            log::info!("Resolved {} to {}", query.label(), only.url);
            Ok(ResolvedPlayer {
                name: only.name.clone(),
                jersey_number: only
                    .jersey_number
                    .clone()
                    .or_else(|| query.jersey_number.clone()),
                school: profile.key.clone(),
                game_log_url: profile.game_log_url(&only.url, query.season),
            })
        }
        several => Err(ResolutionError::Ambiguous {
            name: query.name.clone(),
            candidates: several.iter().map(|c| (*c).clone()).collect(),
        }),
    }
}
