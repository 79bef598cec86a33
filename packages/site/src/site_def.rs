//! TOML shape of a site profile.
//!
//! [`SiteDefinition`] mirrors what a profile author writes: most fields are
//! optional and fall back to platform defaults. [`SiteDefinition::into_profile`]
//! fills those defaults in and validates the result into an immutable
//! [`SiteProfile`].

use std::collections::BTreeMap;
use std::str::FromStr as _;
use std::sync::LazyLock;

use gamelog_record_models::Field;
use gamelog_site_models::{
    PLAYER_URL_PLACEHOLDER, Platform, RenderMode, SEASON_PLACEHOLDER, SiteProfile, Sport,
    TableLocator, player_link_selector,
};
use regex::Regex;
use serde::Deserialize;

use crate::SiteError;
use crate::platform::detect_platform;

/// Keys are short lowercase identifiers usable in file names.
static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9_]*$").expect("valid regex"));

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^{}]*\}").expect("valid regex"));

/// A site profile as written in TOML.
#[derive(Debug, Deserialize)]
pub struct SiteDefinition {
    /// Unique identifier (e.g., `"belmont"`).
    pub key: String,
    /// Human-readable name (e.g., `"Belmont Bruins"`).
    pub display_name: String,
    /// Scheme and host of the athletics site.
    pub base_url: String,
    /// Path of the team stats page, parameterized by `{season}`.
    pub stats_path_template: String,
    /// Path of the roster page. Defaults to
    /// `/sports/<sport>/roster/{season}`.
    pub roster_path_template: Option<String>,
    /// Game-log URL template. Defaults to `{player_url}`.
    pub game_log_template: Option<String>,
    /// Roster link substring. Defaults per platform.
    pub player_link_pattern: Option<String>,
    /// Game-log table locator. Defaults per platform.
    pub table_locator: Option<TableLocator>,
    /// Team stats table locator. Defaults to `table_locator`.
    pub team_table_locator: Option<TableLocator>,
    /// Whether the pages need a browser. Defaults to static.
    #[serde(default)]
    pub render_mode: RenderMode,
    /// Site generator. Detected from `base_url` when omitted.
    pub platform: Option<Platform>,
    /// Sport covered by the pages.
    #[serde(default)]
    pub sport: Sport,
    /// Site-specific header labels, mapped to canonical field names
    /// (e.g. `{ "SO" = "strikeouts" }`).
    #[serde(default)]
    pub header_synonyms: BTreeMap<String, String>,
}

impl SiteDefinition {
    /// Fills in defaults and validates the definition.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Invalid`] if the key, URL, selectors, templates
    /// or header synonyms are malformed.
    pub fn into_profile(self) -> Result<SiteProfile, SiteError> {
        let key = self.key.trim().to_lowercase();
        let invalid = |message: String| SiteError::Invalid {
            key: key.clone(),
            message,
        };

        if !KEY_RE.is_match(&key) {
            return Err(invalid(format!(
                "key must be lowercase letters, digits and underscores, got '{}'",
                self.key
            )));
        }
        if self.display_name.trim().is_empty() {
            return Err(invalid("display_name is empty".to_string()));
        }

        let base = url::Url::parse(&self.base_url)
            .map_err(|e| invalid(format!("base_url '{}': {e}", self.base_url)))?;
        if !matches!(base.scheme(), "http" | "https") || base.host_str().is_none() {
            return Err(invalid(format!(
                "base_url '{}' must be an http(s) URL with a host",
                self.base_url
            )));
        }

        let platform = self
            .platform
            .unwrap_or_else(|| detect_platform(&self.base_url, None));

        let table_locator = self
            .table_locator
            .unwrap_or_else(|| platform.default_table_locator());
        let team_table_locator = self
            .team_table_locator
            .unwrap_or_else(|| table_locator.clone());
        for locator in [&table_locator, &team_table_locator] {
            validate_locator(locator).map_err(&invalid)?;
        }

        let game_log_template = self
            .game_log_template
            .unwrap_or_else(|| PLAYER_URL_PLACEHOLDER.to_string());
        if !game_log_template.contains(PLAYER_URL_PLACEHOLDER) {
            return Err(invalid(format!(
                "game_log_template must contain {PLAYER_URL_PLACEHOLDER}"
            )));
        }
        validate_placeholders(
            "game_log_template",
            &game_log_template,
            &[PLAYER_URL_PLACEHOLDER, SEASON_PLACEHOLDER],
        )
        .map_err(&invalid)?;

        let mut header_synonyms = BTreeMap::new();
        for (label, field_name) in self.header_synonyms {
            let field = Field::from_str(field_name.trim())
                .map_err(|_| invalid(format!("unknown canonical field '{field_name}'")))?;
            header_synonyms.insert(label, field);
        }

        let roster_path_template = self
            .roster_path_template
            .unwrap_or_else(|| format!("/sports/{}/roster/{{season}}", self.sport));
        for (name, template) in [
            ("stats_path_template", &self.stats_path_template),
            ("roster_path_template", &roster_path_template),
        ] {
            if !template.contains(SEASON_PLACEHOLDER) {
                return Err(invalid(format!("{name} must contain {SEASON_PLACEHOLDER}")));
            }
            validate_placeholders(name, template, &[SEASON_PLACEHOLDER]).map_err(&invalid)?;
        }

        let player_link_pattern = self
            .player_link_pattern
            .unwrap_or_else(|| platform.default_player_link_pattern().to_string());
        validate_link_pattern(&player_link_pattern).map_err(&invalid)?;

        Ok(SiteProfile {
            key,
            display_name: self.display_name.trim().to_string(),
            base_url: self.base_url.trim_end_matches('/').to_string(),
            stats_path_template: self.stats_path_template,
            roster_path_template,
            game_log_template,
            player_link_pattern,
            table_locator,
            team_table_locator,
            render_mode: self.render_mode,
            platform,
            sport: self.sport,
            header_synonyms,
        })
    }
}

/// Checks that every rule in a locator is a parseable CSS selector.
fn validate_locator(locator: &TableLocator) -> Result<(), String> {
    for rule in locator.rules() {
        scraper::Selector::parse(rule)
            .map_err(|e| format!("invalid CSS selector '{rule}': {e}"))?;
    }
    Ok(())
}

/// Rejects `{...}` placeholders outside `allowed`.
fn validate_placeholders(name: &str, template: &str, allowed: &[&str]) -> Result<(), String> {
    for found in PLACEHOLDER_RE.find_iter(template) {
        if !allowed.contains(&found.as_str()) {
            return Err(format!(
                "{name} has unknown placeholder {}; expected one of {}",
                found.as_str(),
                allowed.join(", ")
            ));
        }
    }
    Ok(())
}

/// The pattern is embedded in a quoted attribute selector.
fn validate_link_pattern(pattern: &str) -> Result<(), String> {
    if pattern.trim().is_empty() {
        return Err("player_link_pattern is empty".to_string());
    }
    if pattern.contains(['"', '\\']) {
        return Err(format!(
            "player_link_pattern '{pattern}' must not contain quotes or backslashes"
        ));
    }
    validate_locator(&TableLocator::new(&player_link_selector(pattern)))
}

/// Parses and validates a [`SiteProfile`] from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is malformed, missing required fields, or
/// fails validation.
pub fn parse_site_toml(toml_str: &str) -> Result<SiteProfile, SiteError> {
    let definition: SiteDefinition = toml::de::from_str(toml_str)?;
    definition.into_profile()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        key = "belmont"
        display_name = "Belmont Bruins"
        base_url = "https://belmontbruins.com/"
        stats_path_template = "/sports/baseball/stats/{season}"
    "#;

    #[test]
    fn fills_platform_defaults() {
        let profile = parse_site_toml(MINIMAL).unwrap();
        assert_eq!(profile.key, "belmont");
        assert_eq!(profile.base_url, "https://belmontbruins.com");
        assert_eq!(profile.render_mode, RenderMode::Static);
        assert_eq!(profile.sport, Sport::Baseball);
        assert_eq!(profile.roster_path_template, "/sports/baseball/roster/{season}");
        assert_eq!(profile.game_log_template, "{player_url}");
        assert_eq!(profile.player_link_pattern, "/roster/");
        assert_eq!(profile.team_table_locator, profile.table_locator);
    }

    #[test]
    fn parses_explicit_locator_and_synonyms() {
        let toml_str = r##"
            key = "lsu"
            display_name = "LSU Tigers"
            base_url = "https://lsusports.net"
            stats_path_template = "/sports/baseball/stats/{season}"
            render_mode = "DYNAMIC"
            platform = "sidearm"

            [table_locator]
            primary = "table.sidearm-table"
            fallbacks = ["#gamelog table"]
            required_headers = ["Date", "Opponent"]

            [header_synonyms]
            "SO" = "strikeouts"
        "##;
        let profile = parse_site_toml(toml_str).unwrap();
        assert_eq!(profile.render_mode, RenderMode::Dynamic);
        assert_eq!(profile.platform, Platform::Sidearm);
        assert_eq!(profile.table_locator.fallbacks, vec!["#gamelog table"]);
        assert_eq!(profile.header_synonyms.get("SO"), Some(&Field::Strikeouts));
    }

    #[test]
    fn rejects_unknown_canonical_field() {
        let toml_str = format!("{MINIMAL}\n[header_synonyms]\n\"XBH\" = \"extra_base_hits\"\n");
        let err = parse_site_toml(&toml_str).unwrap_err();
        assert!(err.to_string().contains("extra_base_hits"), "{err}");
    }

    #[test]
    fn rejects_bad_selector() {
        let toml_str = format!("{MINIMAL}\n[table_locator]\nprimary = \"table[[\"\n");
        let err = parse_site_toml(&toml_str).unwrap_err();
        assert!(matches!(err, SiteError::Invalid { .. }), "{err}");
    }

    #[test]
    fn rejects_non_http_base_url() {
        let toml_str = MINIMAL.replace("https://belmontbruins.com/", "ftp://belmontbruins.com");
        assert!(parse_site_toml(&toml_str).is_err());
    }

    #[test]
    fn rejects_game_log_template_without_player_url() {
        let toml_str = format!("{MINIMAL}\ngame_log_template = \"/stats/{{season}}\"\n");
        assert!(parse_site_toml(&toml_str).is_err());
    }

    #[test]
    fn rejects_path_templates_without_season() {
        let toml_str = MINIMAL.replace("/stats/{season}", "/stats");
        let err = parse_site_toml(&toml_str).unwrap_err();
        assert!(err.to_string().contains("stats_path_template"), "{err}");

        let toml_str = format!("{MINIMAL}\nroster_path_template = \"/sports/baseball/roster\"\n");
        let err = parse_site_toml(&toml_str).unwrap_err();
        assert!(err.to_string().contains("roster_path_template"), "{err}");
    }

    #[test]
    fn rejects_unknown_placeholders() {
        let toml_str = MINIMAL.replace("/stats/{season}", "/stats/{year}");
        let err = parse_site_toml(&toml_str).unwrap_err();
        assert!(err.to_string().contains("{year}"), "{err}");

        let toml_str =
            format!("{MINIMAL}\ngame_log_template = \"{{player_url}}?view=gamelog&yr={{seasn}}\"\n");
        let err = parse_site_toml(&toml_str).unwrap_err();
        assert!(err.to_string().contains("{seasn}"), "{err}");
    }

    #[test]
    fn rejects_link_patterns_that_break_the_selector() {
        for pattern in [r#"/roster/"x"#, r"/roster\x", "  "] {
            let toml_str = format!("{MINIMAL}\nplayer_link_pattern = '{pattern}'\n");
            let err = parse_site_toml(&toml_str).unwrap_err();
            assert!(err.to_string().contains("player_link_pattern"), "{pattern}: {err}");
        }
    }

    #[test]
    fn rejects_malformed_key() {
        let toml_str = MINIMAL.replace("key = \"belmont\"", "key = \"Belmont Bruins\"");
        assert!(parse_site_toml(&toml_str).is_err());
    }
}
