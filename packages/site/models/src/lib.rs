#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Site profile configuration types.
//!
//! A [`SiteProfile`] captures everything that differs between athletics
//! sites: where the roster and stats pages live, whether they need a
//! browser to render, and how to find the statistics table. New schools
//! are added as data, never as new code paths.

use std::collections::BTreeMap;

use gamelog_record_models::{Field, Season};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Placeholder replaced by the four-digit season in path templates.
pub const SEASON_PLACEHOLDER: &str = "{season}";

/// Placeholder replaced by the resolved roster link in game-log templates.
pub const PLAYER_URL_PLACEHOLDER: &str = "{player_url}";

/// Whether a page's content is present in the initial server response.
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
pub enum RenderMode {
    /// Plain HTTP is enough.
    #[default]
    Static,
    /// Client-side scripting must run before the table exists.
    Dynamic,
}

/// Sport a profile's pages belong to.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Sport {
    /// College baseball.
    #[default]
    Baseball,
    /// College softball (same table shapes as baseball).
    Softball,
}

/// Athletics website generator family.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Platform {
    /// Sidearm Sports
    Sidearm,
    /// `PrestoSports`
    Presto,
    /// Genius Sports
    Genius,
    /// `StatBroadcast`
    StatBroadcast,
    /// ncaa.com / ncaa.org stats pages
    Ncaa,
    /// Stretch Internet / Hudl
    Stretch,
    /// WMT Digital
    Wmt,
    /// Revel XP
    Revel,
    /// d3baseball.com and sister sites
    D3Sports,
    /// Unrecognized generator.
    #[default]
    Generic,
}

impl Platform {
    /// Table locator that works for most sites built on this platform.
    #[must_use]
    pub fn default_table_locator(self) -> TableLocator {
        match self {
            Self::Sidearm => TableLocator::new("table.sidearm-table")
                .with_fallback("section#gamelog table")
                .with_fallback("table")
                .with_required_headers(&["Date"]),
            Self::Presto => TableLocator::new("table.stats-table")
                .with_fallback("div.stats-box table")
                .with_fallback("table")
                .with_required_headers(&["Date"]),
            Self::Wmt => TableLocator::new("table.table--stats")
                .with_fallback("table")
                .with_required_headers(&["Date"]),
            Self::Genius
            | Self::StatBroadcast
            | Self::Ncaa
            | Self::Stretch
            | Self::Revel
            | Self::D3Sports
            | Self::Generic => TableLocator::new("table").with_required_headers(&["Date", "Opp"]),
        }
    }

    /// Substring an `href` must contain to be a roster player link.
    #[must_use]
    pub const fn default_player_link_pattern(self) -> &'static str {
        match self {
            Self::Presto => "/players/",
            Self::Sidearm
            | Self::Genius
            | Self::StatBroadcast
            | Self::Ncaa
            | Self::Stretch
            | Self::Wmt
            | Self::Revel
            | Self::D3Sports
            | Self::Generic => "/roster/",
        }
    }
}

/// Rule set identifying the target table within a rendered page.
///
/// Rules are CSS selectors tried in order: the primary first, then each
/// fallback. When `required_headers` is non-empty, a matched table is only
/// accepted if every listed label starts one of its header cells
/// (case-insensitive, so `"Opp"` accepts `"Opponent"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLocator {
    /// Primary CSS selector.
    pub primary: String,
    /// Selectors tried in order when the primary matches nothing.
    #[serde(default)]
    pub fallbacks: Vec<String>,
    /// Header labels a candidate table must contain.
    #[serde(default)]
    pub required_headers: Vec<String>,
}

impl TableLocator {
    /// Creates a locator with a single primary rule.
    #[must_use]
    pub fn new(primary: &str) -> Self {
        Self {
            primary: primary.to_owned(),
            fallbacks: Vec::new(),
            required_headers: Vec::new(),
        }
    }

    /// Appends a fallback rule.
    #[must_use]
    pub fn with_fallback(mut self, selector: &str) -> Self {
        self.fallbacks.push(selector.to_owned());
        self
    }

    /// Sets the header labels a matching table must contain.
    #[must_use]
    pub fn with_required_headers(mut self, headers: &[&str]) -> Self {
        self.required_headers = headers.iter().map(|h| (*h).to_owned()).collect();
        self
    }

    /// All rules in the order they are tried.
    pub fn rules(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.fallbacks.iter().map(String::as_str))
    }
}

/// One configured school/team source. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteProfile {
    /// Stable identifier, unique across the store (e.g. `"belmont"`).
    pub key: String,
    /// Human-readable name (e.g. `"Belmont Bruins"`).
    pub display_name: String,
    /// Scheme and host, without a trailing slash.
    pub base_url: String,
    /// Path of the team stats page; may contain `{season}`.
    pub stats_path_template: String,
    /// Path of the roster page; may contain `{season}`.
    pub roster_path_template: String,
    /// Template for the game-log URL; may contain `{player_url}` and
    /// `{season}`.
    pub game_log_template: String,
    /// Substring identifying player links on the roster page.
    pub player_link_pattern: String,
    /// Locator for a player's game-log table.
    pub table_locator: TableLocator,
    /// Locator for the team stats table.
    pub team_table_locator: TableLocator,
    /// Static or dynamic rendering.
    pub render_mode: RenderMode,
    /// Site generator family.
    pub platform: Platform,
    /// Sport the pages cover.
    pub sport: Sport,
    /// Extra header labels for this site, mapped to canonical fields.
    pub header_synonyms: BTreeMap<String, Field>,
}

impl SiteProfile {
    /// URL of the team stats page for `season`.
    #[must_use]
    pub fn stats_url(&self, season: Season) -> String {
        self.absolute(&fill_season(&self.stats_path_template, season))
    }

    /// URL of the roster page for `season`.
    #[must_use]
    pub fn roster_url(&self, season: Season) -> String {
        self.absolute(&fill_season(&self.roster_path_template, season))
    }

    /// Builds a game-log URL from an absolute roster link.
    ///
    /// A template that appends a query (`{player_url}?view=gamelog`) extends
    /// the link's own query string with `&` when it already has one.
    #[must_use]
    pub fn game_log_url(&self, player_url: &str, season: Season) -> String {
        let template = fill_season(&self.game_log_template, season);
        let query_start = format!("{PLAYER_URL_PLACEHOLDER}?");
        let template = if player_url.contains('?') {
            template.replace(&query_start, &format!("{PLAYER_URL_PLACEHOLDER}&"))
        } else {
            template
        };
        template.replace(PLAYER_URL_PLACEHOLDER, player_url)
    }

    /// Locator matching this site's player links on a roster page.
    #[must_use]
    pub fn player_link_locator(&self) -> TableLocator {
        TableLocator::new(&player_link_selector(&self.player_link_pattern))
    }

    /// Joins a path onto `base_url` unless it is already absolute.
    fn absolute(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}

/// CSS selector for anchors whose `href` contains `pattern`.
#[must_use]
pub fn player_link_selector(pattern: &str) -> String {
    format!("a[href*=\"{pattern}\"]")
}

fn fill_season(template: &str, season: Season) -> String {
    template.replace(SEASON_PLACEHOLDER, &season.to_string())
}
