//! Header label synonym table.
//!
//! Sites label the same statistic differently ("AB", "At Bats", "at-bats").
//! Labels are compared after lowercasing, collapsing whitespace and dropping
//! trailing punctuation, so "Opp." and "OPP" both hit the `opp` entry.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use gamelog_record_models::Field;

/// Built-in label → field mappings, keyed by normalized label.
static BUILTIN: LazyLock<BTreeMap<&'static str, Field>> = LazyLock::new(|| {
    BTreeMap::from([
        ("date", Field::Date),
        ("dt", Field::Date),
        ("game date", Field::Date),
        ("opponent", Field::Opponent),
        ("opp", Field::Opponent),
        ("vs", Field::Opponent),
        ("result", Field::Result),
        ("score", Field::Result),
        ("w/l", Field::Result),
        ("w-l", Field::Result),
        ("ab", Field::AtBats),
        ("at bats", Field::AtBats),
        ("at-bats", Field::AtBats),
        ("h", Field::Hits),
        ("hits", Field::Hits),
        ("r", Field::Runs),
        ("runs", Field::Runs),
        ("rbi", Field::Rbi),
        ("rbis", Field::Rbi),
        ("runs batted in", Field::Rbi),
        ("bb", Field::Walks),
        ("walks", Field::Walks),
        ("base on balls", Field::Walks),
        ("k", Field::Strikeouts),
        ("so", Field::Strikeouts),
        ("strikeouts", Field::Strikeouts),
        ("tb", Field::TotalBases),
        ("total bases", Field::TotalBases),
    ])
});

/// Normalizes a header label for lookup.
#[must_use]
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(['.', ':'])
        .to_lowercase()
}

/// Mapping from header labels to canonical fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymTable {
    labels: BTreeMap<String, Field>,
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SynonymTable {
    /// The built-in table.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            labels: BUILTIN
                .iter()
                .map(|(label, field)| ((*label).to_string(), *field))
                .collect(),
        }
    }

    /// Adds (or overrides) one label.
    #[must_use]
    pub fn with_synonym(mut self, label: &str, field: Field) -> Self {
        self.labels.insert(normalize_label(label), field);
        self
    }

    /// Adds a site's extra labels, e.g. a profile's `header_synonyms`.
    #[must_use]
    pub fn with_synonyms<'a>(self, extra: impl IntoIterator<Item = (&'a String, &'a Field)>) -> Self {
        extra
            .into_iter()
            .fold(self, |table, (label, field)| table.with_synonym(label, *field))
    }

    /// Canonical field for a header label, if known.
    #[must_use]
    pub fn lookup(&self, label: &str) -> Option<Field> {
        self.labels.get(&normalize_label(label)).copied()
    }

    /// Maps each header cell to a field. When several columns map to the
    /// same field only the first is used; the rest map to `None`.
    #[must_use]
    pub fn map_headers(&self, header_cells: &[String]) -> Vec<Option<Field>> {
        let mut seen = Vec::new();
        header_cells
            .iter()
            .map(|label| {
                let field = self.lookup(label)?;
                if seen.contains(&field) {
                    log::debug!("Ignoring duplicate '{label}' column for {field}");
                    return None;
                }
                seen.push(field);
                Some(field)
            })
            .collect()
    }
}
