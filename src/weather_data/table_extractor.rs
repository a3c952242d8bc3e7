//! Turns the first HTML table of an observation page into a string-typed
//! Polars `DataFrame`.
//!
//! JMA tables use multi-row headers built with `rowspan` and `colspan`, so the
//! table is first expanded into a rectangular grid in which every spanned cell
//! is repeated. The first grid row becomes the header and the remaining rows
//! the data.

use crate::types::page::FetchPage;
use crate::weather_data::error::WeatherDataError;
use log::debug;
use polars::prelude::*;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

// Guards against absurd span attributes.
const MAX_SPAN: usize = 1_000;

/// A table expanded into a header and rectangular rows of optional cell texts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Builds a frame with one string column per header entry.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let columns = self
            .header
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let values: Vec<Option<&str>> = self
                    .rows
                    .iter()
                    .map(|row| row.get(idx).and_then(|v| v.as_deref()))
                    .collect();
                Column::new(name.as_str().into(), values)
            })
            .collect();
        DataFrame::new(columns)
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("CSS selector should be valid")
}

/// Extracts the first `<table>` of a document, or `None` when there is none.
pub fn extract_first_table(html: &str) -> Option<RawTable> {
    let document = Html::parse_document(html);
    let table = document.select(&selector("table")).next()?;
    let grid = expand_grid(table);

    let Some((header_row, data_rows)) = grid.split_first() else {
        return Some(RawTable::default());
    };

    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    let header = header_names(header_row, width);
    let rows = data_rows
        .iter()
        .filter(|row| row.iter().any(Option::is_some))
        .map(|row| {
            let mut row = row.clone();
            row.resize(width, None);
            row
        })
        .collect();

    Some(RawTable { header, rows })
}

/// Extracts the first table of an observation page and prepends the page key
/// column (`date`, `month` or `year` depending on the granularity).
///
/// Returns `Ok(None)` when the table holds no data rows.
pub fn page_frame(html: &str, page: &FetchPage) -> Result<Option<DataFrame>, WeatherDataError> {
    let table =
        extract_first_table(html).ok_or_else(|| WeatherDataError::TableNotFound(page.to_string()))?;

    if table.rows.is_empty() {
        debug!("Table on page {} has no data rows", page);
        return Ok(None);
    }

    let frame_error = |source| WeatherDataError::FrameBuild {
        granularity: page.granularity,
        page: page.key(),
        source,
    };

    let mut df = table.to_frame().map_err(frame_error)?;
    let key_column = Column::new(
        page.granularity.key_column().into(),
        vec![page.key(); df.height()],
    );
    df.insert_column(0, key_column).map_err(frame_error)?;
    Ok(Some(df))
}

/// Direct rows of `table`, skipping rows that belong to nested tables.
fn table_rows<'a>(table: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let table_id = table.id();
    table
        .select(&selector("tr"))
        .filter(|row| {
            row.ancestors()
                .find(|node| node.value().as_element().is_some_and(|e| e.name() == "table"))
                .is_some_and(|node| node.id() == table_id)
        })
        .collect()
}

fn span_attr(cell: &ElementRef<'_>, attr: &str) -> usize {
    cell.value()
        .attr(attr)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_SPAN)
}

/// Text of a cell with whitespace runs collapsed. Text nodes are joined as-is,
/// so `気温<br>(℃)` reads `気温(℃)`.
fn cell_text(cell: &ElementRef<'_>) -> Option<String> {
    let raw = cell.text().collect::<String>();
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

/// Lays the table out on a grid, repeating every cell over the rows and
/// columns it spans.
fn expand_grid(table: ElementRef<'_>) -> Vec<Vec<Option<String>>> {
    // Per column: rows still covered by a rowspan from above, and its text.
    let mut carried: Vec<(usize, Option<String>)> = Vec::new();
    let mut grid = Vec::new();

    for row in table_rows(table) {
        let mut cells = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|c| matches!(c.value().name(), "td" | "th"));
        let mut out: Vec<Option<String>> = Vec::new();
        let mut col = 0;

        loop {
            if let Some((remaining, text)) = carried.get_mut(col) {
                if *remaining > 0 {
                    *remaining -= 1;
                    out.push(text.clone());
                    col += 1;
                    continue;
                }
            }

            let Some(cell) = cells.next() else {
                break;
            };
            let text = cell_text(&cell);
            let rowspan = span_attr(&cell, "rowspan");
            for _ in 0..span_attr(&cell, "colspan") {
                if carried.len() <= col {
                    carried.resize(col + 1, (0, None));
                }
                carried[col] = (rowspan - 1, text.clone());
                out.push(text.clone());
                col += 1;
            }
        }

        // Columns to the right still covered from above.
        while col < carried.len() {
            let (remaining, text) = &mut carried[col];
            if *remaining > 0 {
                *remaining -= 1;
                out.push(text.clone());
            } else {
                out.push(None);
            }
            col += 1;
        }
        while out.last().is_some_and(Option::is_none) {
            out.pop();
        }

        grid.push(out);
    }

    grid
}

/// Header names for a row: blanks become `column_{i}` and repeated names get
/// a `.1`, `.2`, ... suffix.
fn header_names(row: &[Option<String>], width: usize) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    (0..width)
        .map(|idx| {
            let base = row
                .get(idx)
                .cloned()
                .flatten()
                .unwrap_or_else(|| format!("column_{}", idx));
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}
