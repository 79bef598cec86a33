//! Athletics platform detection.
//!
//! Most college athletics sites are produced by a handful of generators.
//! Knowing which one built a site gives sensible default table locators
//! and roster link patterns for profiles that do not spell them out.

use gamelog_site_models::Platform;

/// Domain substrings that identify a platform.
const DOMAIN_PATTERNS: &[(Platform, &[&str])] = &[
    (
        Platform::Sidearm,
        &["sidearmsports.com", "sidearmstats.com", "asics.com"],
    ),
    (Platform::Presto, &["prestosports.com", "presto-stats.com"]),
    (Platform::Genius, &["geniussports.com"]),
    (Platform::StatBroadcast, &["statbroadcast.com"]),
    (Platform::Ncaa, &["ncaa.com", "ncaa.org"]),
    (Platform::Stretch, &["stretchinternet.com", "hudl.com"]),
    (Platform::Wmt, &["wmt.digital"]),
    (Platform::Revel, &["revelxp.com"]),
    (Platform::D3Sports, &["d3baseball.com", "d3sports.com"]),
];

/// Page markers that identify white-labeled sites.
const HTML_MARKERS: &[(Platform, &[&str])] = &[
    (Platform::Sidearm, &["sidearm sports", "sidearmstats"]),
    (Platform::Presto, &["prestosports", "presto stats"]),
    (Platform::Genius, &["genius sports"]),
    (Platform::Wmt, &["wmt digital"]),
    (Platform::Stretch, &["stretch internet"]),
    (Platform::StatBroadcast, &["statbroadcast"]),
];

/// Detects the platform behind `url`, optionally using the page HTML.
///
/// Checks, in order: the host against known platform domains, the HTML
/// for generator markers, then the URL path. Falls back to
/// [`Platform::Generic`].
#[must_use]
pub fn detect_platform(url: &str, html: Option<&str>) -> Platform {
    let parsed = url::Url::parse(url).ok();
    let host = parsed
        .as_ref()
        .and_then(url::Url::host_str)
        .unwrap_or_default()
        .to_lowercase();
    let path = parsed
        .as_ref()
        .map(|u| u.path().to_lowercase())
        .unwrap_or_default();

    for (platform, patterns) in DOMAIN_PATTERNS {
        if patterns.iter().any(|p| host.contains(p)) {
            return *platform;
        }
    }

    if let Some(html) = html {
        let lower = html.to_lowercase();
        for (platform, markers) in HTML_MARKERS {
            if markers.iter().any(|m| lower.contains(m)) {
                return *platform;
            }
        }
    }

    if path.contains("/sidearmstats/") {
        return Platform::Sidearm;
    }
    if path.contains("/stats/") && host.contains("ncaa") {
        return Platform::Ncaa;
    }

    Platform::Generic
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_by_domain() {
        assert_eq!(
            detect_platform("https://stats.statbroadcast.com/broadcast/?id=1", None),
            Platform::StatBroadcast
        );
        assert_eq!(
            detect_platform("https://d3baseball.com/seasons/2025", None),
            Platform::D3Sports
        );
    }

    #[test]
    fn detects_white_labeled_sidearm_by_markup() {
        let html = r#"<footer>Powered by <a>Sidearm Sports</a></footer>"#;
        assert_eq!(
            detect_platform("https://belmontbruins.com/sports/baseball", Some(html)),
            Platform::Sidearm
        );
    }

    #[test]
    fn detects_by_path() {
        assert_eq!(
            detect_platform("https://goheels.com/sidearmstats/baseball/summary", None),
            Platform::Sidearm
        );
    }

    #[test]
    fn falls_back_to_generic() {
        assert_eq!(
            detect_platform("https://belmontbruins.com/sports/baseball", None),
            Platform::Generic
        );
        assert_eq!(detect_platform("not a url", None), Platform::Generic);
    }
}
