//! Player name normalization.
//!
//! Roster pages and callers spell names differently: case, spacing,
//! accents, and "Last, First" ordering. [`canonical_name`] reduces all of
//! these to one comparable form.

use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Lowercase accented letters folded to their ASCII base.
static FOLD: LazyLock<BTreeMap<char, &'static str>> = LazyLock::new(|| {
    BTreeMap::from([
        ('á', "a"),
        ('à', "a"),
        ('â', "a"),
        ('ä', "a"),
        ('ã', "a"),
        ('å', "a"),
        ('ā', "a"),
        ('ą', "a"),
        ('æ', "ae"),
        ('ç', "c"),
        ('ć', "c"),
        ('č', "c"),
        ('ď', "d"),
        ('đ', "d"),
        ('é', "e"),
        ('è', "e"),
        ('ê', "e"),
        ('ë', "e"),
        ('ē', "e"),
        ('ę', "e"),
        ('ě', "e"),
        ('ğ', "g"),
        ('í', "i"),
        ('ì', "i"),
        ('î', "i"),
        ('ï', "i"),
        ('ī', "i"),
        ('ı', "i"),
        ('ł', "l"),
        ('ñ', "n"),
        ('ń', "n"),
        ('ň', "n"),
        ('ó', "o"),
        ('ò', "o"),
        ('ô', "o"),
        ('ö', "o"),
        ('õ', "o"),
        ('ø', "o"),
        ('ō', "o"),
        ('ő', "o"),
        ('œ', "oe"),
        ('ř', "r"),
        ('ś', "s"),
        ('š', "s"),
        ('ş', "s"),
        ('ß', "ss"),
        ('ť', "t"),
        ('ú', "u"),
        ('ù', "u"),
        ('û', "u"),
        ('ü', "u"),
        ('ū', "u"),
        ('ů', "u"),
        ('ű', "u"),
        ('ý', "y"),
        ('ÿ', "y"),
        ('ź', "z"),
        ('ż', "z"),
        ('ž', "z"),
    ])
});

/// Combining diacritical marks, as left behind by decomposed (NFD) text.
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{300}'..='\u{36f}';

/// Lowercases, folds diacritics and collapses whitespace.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    let mut folded = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase) {
        if COMBINING_MARKS.contains(&c) {
            continue;
        }
        match FOLD.get(&c) {
            Some(ascii) => folded.push_str(ascii),
            None => folded.push(c),
        }
    }
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// [`normalize_name`], with "Last, First" reordered to "First Last".
#[must_use]
pub fn canonical_name(name: &str) -> String {
    let normalized = normalize_name(name);
    match normalized.split_once(',') {
        Some((last, first)) if !first.trim().is_empty() => {
            normalize_name(&format!("{first} {last}"))
        }
        _ => normalized.trim_end_matches(',').trim().to_string(),
    }
}

/// Whether two names refer to the same person after normalization, either
/// exactly or through "Last, First" reordering.
#[must_use]
pub fn names_match(a: &str, b: &str) -> bool {
    normalize_name(a) == normalize_name(b) || canonical_name(a) == canonical_name(b)
}
