use scraper::{ElementRef, Selector};

use crate::{
    error::RowError,
    html::{parse_html, parse_selector},
};

/// One row-like element matched by a selector.
///
/// Cells are the row's direct child elements, addressed by position.
pub struct RowView<'a> {
    index: usize,
    element: ElementRef<'a>,
    cells: Vec<ElementRef<'a>>,
}

impl<'a> RowView<'a> {
    fn new(index: usize, element: ElementRef<'a>) -> Self {
        let cells = element.children().filter_map(ElementRef::wrap).collect();
        Self {
            index,
            element,
            cells,
        }
    }

    /// Position of the row among all matches.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Trimmed text of the cell at `position`.
    pub fn cell_text(&self, position: usize) -> Result<String, RowError> {
        self.cells
            .get(position)
            .map(|cell| collapse_text(cell.text()))
            .ok_or(RowError::MissingCell(position))
    }

    pub fn cell_html(&self, position: usize) -> Result<String, RowError> {
        self.cells
            .get(position)
            .map(|cell| cell.inner_html().trim().to_owned())
            .ok_or(RowError::MissingCell(position))
    }

    /// Trimmed text of the first descendant matching `selector`.
    pub fn select_text(&self, selector: &str) -> Result<String, RowError> {
        let parsed = Selector::parse(selector).map_err(|e| RowError::Invalid(e.to_string()))?;
        self.element
            .select(&parsed)
            .next()
            .map(|element| collapse_text(element.text()))
            .ok_or_else(|| RowError::MissingField(selector.to_owned()))
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Parses the cell at `position` as a number.
    pub fn cell_parse<N: std::str::FromStr>(&self, position: usize) -> Result<N, RowError> {
        let text = self.cell_text(position)?;
        text.parse().map_err(|_| RowError::InvalidNumber {
            field: format!("cell {position}"),
            value: text,
        })
    }
}

/// Maps every element matching `selector` through `mapper`.
///
/// Rows the mapper rejects are dropped; an unusable selector yields no rows.
pub fn decode_rows<T, F>(bytes: &[u8], selector: &str, mut mapper: F) -> Vec<T>
where
    F: FnMut(&RowView<'_>) -> Result<T, RowError>,
{
    let selector_parsed = match parse_selector(selector) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping row decode");
            return Vec::new();
        }
    };

    let document = parse_html(bytes);
    document
        .select(&selector_parsed)
        .enumerate()
        .filter_map(|(index, element)| {
            let row = RowView::new(index, element);
            match mapper(&row) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::debug!(row = index, selector, error = %e, "Dropping row");
                    None
                }
            }
        })
        .collect()
}

fn collapse_text<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
