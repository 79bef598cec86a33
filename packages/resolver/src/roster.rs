//! Roster page parsing.
//!
//! A roster candidate is any link whose `href` contains the site's player
//! link pattern. The jersey number is read from the markup around the link,
//! stopping before a container that also holds another player's link.

use std::fmt;
use std::sync::LazyLock;

use gamelog_scraper::Document;
use regex::Regex;
use scraper::{ElementRef, Selector};

static LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));
static NUMBER_CLASS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("[class*=number], [class*=jersey], [class*=Number], [class*=Jersey]")
        .expect("valid selector")
});
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("valid selector"));

static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,3})\b").expect("valid regex"));
static HASH_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\s?(\d{1,3})\b").expect("valid regex"));
static ONLY_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}$").expect("valid regex"));

/// How far up the tree to look for a jersey number.
const MAX_CONTAINER_DEPTH: usize = 8;

/// A player listed on a roster page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Name as shown in the link text.
    pub name: String,
    /// Jersey number, when the roster shows one.
    pub jersey_number: Option<String>,
    /// Absolute URL of the player's roster page.
    pub url: String,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.jersey_number {
            Some(jersey) => write!(f, "{} #{jersey}", self.name),
            None => write!(f, "{} (no number)", self.name),
        }
    }
}

/// Lists the players on a roster page.
///
/// Links are kept in document order, de-duplicated by absolute URL, and
/// skipped when they carry no text (headshot links).
#[must_use]
pub fn roster_candidates(doc: &Document, link_pattern: &str) -> Vec<Candidate> {
    let base = url::Url::parse(&doc.url).ok();
    let html = doc.parse();

    let mut candidates: Vec<Candidate> = Vec::new();
    for link in html.select(&LINK) {
        let Some(url) = player_url(link, link_pattern, base.as_ref()) else {
            continue;
        };
        let name = collapse(&link.text().collect::<String>());
        if name.is_empty() || candidates.iter().any(|c| c.url == url) {
            continue;
        }
        let jersey_number = jersey_near(link, &url, link_pattern, base.as_ref());
        candidates.push(Candidate {
            name,
            jersey_number,
            url,
        });
    }

    log::debug!("{}: {} roster candidates", doc.url, candidates.len());
    candidates
}

/// Absolute URL of `link` if it points at a player page.
fn player_url(link: ElementRef<'_>, pattern: &str, base: Option<&url::Url>) -> Option<String> {
    let href = link.value().attr("href")?.trim();
    if !href.contains(pattern) {
        return None;
    }
    match base {
        Some(base) => base.join(href).ok().map(String::from),
        None => Some(href.to_string()),
    }
}

/// Reads the jersey number from the containers around `link`.
fn jersey_near(
    link: ElementRef<'_>,
    url: &str,
    pattern: &str,
    base: Option<&url::Url>,
) -> Option<String> {
    for container in link
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take(MAX_CONTAINER_DEPTH)
    {
        let shared = container
            .select(&LINK)
            .filter_map(|other| player_url(other, pattern, base))
            .any(|other| other != url);
        if shared {
            break;
        }
        if !matches!(container.value().name(), "li" | "tr" | "div" | "article") {
            continue;
        }
        if let Some(jersey) = jersey_in(container) {
            return Some(jersey);
        }
    }
    None
}

fn jersey_in(container: ElementRef<'_>) -> Option<String> {
    let from_class = container.select(&NUMBER_CLASS).find_map(|el| {
        let text = collapse(&el.text().collect::<String>());
        DIGITS.captures(&text).map(|c| c[1].to_string())
    });
    if from_class.is_some() {
        return from_class;
    }

    let text = collapse(&container.text().collect::<Vec<_>>().join(" "));
    if let Some(caps) = HASH_NUMBER.captures(&text) {
        return Some(caps[1].to_string());
    }

    container.select(&CELL).find_map(|td| {
        let text = collapse(&td.text().collect::<String>());
        ONLY_DIGITS.is_match(&text).then_some(text)
    })
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
