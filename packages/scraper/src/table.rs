//! HTML table extraction.
//!
//! Locates a statistics table through a [`TableLocator`] and reads it into a
//! [`RawTable`]: header labels plus rows of trimmed cell text, nothing
//! interpreted yet. Rows whose width does not match the header are dropped
//! with a [`Warning::RowLengthMismatch`] so one malformed row never costs the
//! whole table.

use std::sync::LazyLock;

pub use gamelog_record_models::RawTable;
use gamelog_record_models::Warning;
use gamelog_site_models::TableLocator;
use scraper::{ElementRef, Selector};

use crate::Document;

static TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("valid selector"));
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("valid selector"));

/// Upper bound on `colspan`, guarding against absurd attribute values.
const MAX_COLSPAN: usize = 32;

/// Errors that can occur while locating a table.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// No locator rule matched a table with the required headers.
    #[error("no table found (tried: {rules})")]
    TableNotFound {
        /// The rules that were tried, in order.
        rules: String,
    },

    /// A locator rule is not a valid CSS selector.
    #[error("invalid CSS selector '{selector}': {message}")]
    InvalidSelector {
        /// The offending rule.
        selector: String,
        /// Parser message.
        message: String,
    },
}

impl ExtractionError {
    /// Stable short name of the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::TableNotFound { .. } => "table_not_found",
            Self::InvalidSelector { .. } => "invalid_selector",
        }
    }
}

struct Row {
    cells: Vec<String>,
    /// `<td>`/`<th>` elements before `colspan` expansion.
    raw_len: usize,
    is_header: bool,
}

impl Row {
    /// A lone cell stretched across a wider table, e.g. "Postponed".
    const fn is_note(&self, width: usize) -> bool {
        self.raw_len == 1 && width > 1
    }
}

/// Extracts the table identified by `locator` from `doc`.
///
/// Rules are tried in order (primary, then fallbacks). Within a rule, every
/// matching element is considered in document order; an element that is not
/// itself a `<table>` stands for the first table inside it. The first table
/// whose header row satisfies `required_headers` wins.
///
/// # Errors
///
/// Returns [`ExtractionError::TableNotFound`] if no rule yields an acceptable
/// table, or [`ExtractionError::InvalidSelector`] for an unparsable rule.
pub fn extract_table(
    doc: &Document,
    locator: &TableLocator,
) -> Result<(RawTable, Vec<Warning>), ExtractionError> {
    let html = doc.parse();

    for rule in locator.rules() {
        let selector = Selector::parse(rule).map_err(|e| ExtractionError::InvalidSelector {
            selector: rule.to_string(),
            message: e.to_string(),
        })?;

        for element in html.select(&selector) {
            let Some(table) = as_table(element) else {
                continue;
            };
            let Some((rows, header_index)) = accepted_rows(table, &locator.required_headers)
            else {
                log::debug!("{}: table matched by '{rule}' lacks required headers", doc.url);
                continue;
            };

            log::debug!("{}: using table matched by '{rule}'", doc.url);
            return Ok(build_table(&doc.url, rows, header_index));
        }
    }

    Err(ExtractionError::TableNotFound {
        rules: locator.rules().collect::<Vec<_>>().join(", "),
    })
}

/// Whether `doc` already holds what `locator` is waiting for.
///
/// A rule matching a table, or an element wrapping one, only counts when
/// [`extract_table`] would accept that table, so a layout table caught by a
/// broad fallback rule does not pass for the statistics table. An element
/// with no table inside (a roster link, say) counts as soon as it exists,
/// unless the locator requires header labels.
#[must_use]
pub fn is_ready(doc: &Document, locator: &TableLocator) -> bool {
    let html = doc.parse();
    locator
        .rules()
        .filter_map(|rule| Selector::parse(rule).ok())
        .any(|selector| {
            html.select(&selector).any(|element| match as_table(element) {
                Some(table) => accepted_rows(table, &locator.required_headers).is_some(),
                None => locator.required_headers.is_empty(),
            })
        })
}

/// Rows of `table` and the index of its header row, if the header carries
/// every `required` label.
fn accepted_rows(table: ElementRef<'_>, required: &[String]) -> Option<(Vec<Row>, usize)> {
    let rows = table_rows(table);
    let header_index = header_row_index(&rows)?;
    has_required_headers(&rows[header_index].cells, required).then_some((rows, header_index))
}

fn as_table(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    if element.value().name() == "table" {
        Some(element)
    } else {
        element.select(&TABLE).next()
    }
}

/// Rows belonging directly to `table`, excluding rows of nested tables.
fn table_rows(table: ElementRef<'_>) -> Vec<Row> {
    table
        .select(&ROW)
        .filter(|tr| {
            tr.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|a| a.value().name() == "table")
                .is_some_and(|owner| owner.id() == table.id())
        })
        .map(|tr| {
            let in_thead = tr
                .ancestors()
                .filter_map(ElementRef::wrap)
                .take_while(|a| a.id() != table.id())
                .any(|a| a.value().name() == "thead");

            let mut cells = Vec::new();
            let mut raw_len = 0;
            let mut all_th = true;
            for cell in tr.children().filter_map(ElementRef::wrap) {
                let name = cell.value().name();
                if name != "td" && name != "th" {
                    continue;
                }
                raw_len += 1;
                all_th &= name == "th";
                let span = cell
                    .value()
                    .attr("colspan")
                    .and_then(|s| s.trim().parse::<usize>().ok())
                    .unwrap_or(1)
                    .clamp(1, MAX_COLSPAN);
                let text = cell_text(cell);
                cells.extend(std::iter::repeat_n(text, span));
            }

            Row {
                is_header: !cells.is_empty() && (in_thead || all_th),
                cells,
                raw_len,
            }
        })
        .collect()
}

/// Cell text with runs of whitespace collapsed and ends trimmed.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The first row marked as a header, else the first non-empty row.
fn header_row_index(rows: &[Row]) -> Option<usize> {
    rows.iter()
        .position(|r| r.is_header)
        .or_else(|| rows.iter().position(|r| !r.cells.is_empty()))
}

/// Case-insensitive prefix match, so `"Opp"` accepts an `"Opponent"` column.
fn has_required_headers(header: &[String], required: &[String]) -> bool {
    let header: Vec<String> = header.iter().map(|h| h.to_lowercase()).collect();
    required.iter().all(|r| {
        let r = r.trim().to_lowercase();
        header.iter().any(|h| h.starts_with(&r))
    })
}

fn build_table(url: &str, rows: Vec<Row>, header_index: usize) -> (RawTable, Vec<Warning>) {
    let mut rows = rows.into_iter().skip(header_index);
    let header_cells = rows.next().map(|r| r.cells).unwrap_or_default();
    let width = header_cells.len();

    let mut kept = Vec::new();
    let mut warnings = Vec::new();

    let data_rows = rows.filter(|r| !r.cells.is_empty() && r.cells != header_cells);
    for (index, row) in data_rows.enumerate() {
        let found = if row.is_note(width) {
            row.raw_len
        } else {
            row.cells.len()
        };
        if found == width {
            kept.push(row.cells);
        } else {
            log::warn!("{url}: row {index} has {found} cells, header has {width}; skipping");
            warnings.push(Warning::RowLengthMismatch {
                row: index,
                expected: width,
                found,
            });
        }
    }

    let table = RawTable {
        header_cells,
        rows: kept,
    };
    (table, warnings)
}
