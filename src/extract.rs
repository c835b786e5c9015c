use crate::error::EtlError;
use crate::fetch::FetchedDocument;
use crate::model::{BankRecord, RecordSet};
use scraper::{ElementRef, Html};
use tracing::{debug, info};

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];
const MIN_CELLS: usize = 3;
const NAME_CELL: usize = 1;
const MARKET_CAP_CELL: usize = 2;

pub fn extract_banks(
    doc: &FetchedDocument,
    anchor_id: &str,
    table_class: &str,
) -> Result<RecordSet, EtlError> {
    let parsed = Html::parse_document(&doc.body);
    let records = parse_bank_table(&parsed, anchor_id, table_class)?;
    info!(url = %doc.source_url, rows = records.len(), "extracted bank table");
    Ok(records)
}

/// Parses the (name, market cap) rows of the first `table_class` table that
/// follows the heading containing `anchor_id`.
pub fn parse_bank_table(
    html: &Html,
    anchor_id: &str,
    table_class: &str,
) -> Result<RecordSet, EtlError> {
    let table = locate_table(html, anchor_id, table_class)?;

    let mut rows = Vec::new();
    let table_rows = table
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "tr");

    for (index, row) in table_rows.enumerate() {
        let row_number = index + 1;
        let cells: Vec<ElementRef<'_>> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "td")
            .collect();

        if cells.len() < MIN_CELLS {
            debug!(row = row_number, cells = cells.len(), "skipping non-data row");
            continue;
        }

        let name = bank_name(cells[NAME_CELL]);
        if name.is_empty() {
            return Err(EtlError::MalformedRow {
                row: row_number,
                value: cell_text(cells[NAME_CELL]),
                reason: "empty bank name".to_string(),
            });
        }

        let raw_cap = cell_text(cells[MARKET_CAP_CELL]);
        let market_cap = parse_market_cap(&raw_cap).map_err(|reason| EtlError::MalformedRow {
            row: row_number,
            value: raw_cap.clone(),
            reason,
        })?;

        rows.push(BankRecord::new(name, market_cap));
    }

    if rows.is_empty() {
        return Err(EtlError::EmptyTable {
            anchor: anchor_id.to_string(),
        });
    }

    Ok(RecordSet::new(rows))
}

fn locate_table<'a>(
    html: &'a Html,
    anchor_id: &str,
    table_class: &str,
) -> Result<ElementRef<'a>, EtlError> {
    let root = html.root_element();
    let anchor = root
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().id() == Some(anchor_id))
        .ok_or_else(|| EtlError::SectionNotFound {
            anchor: anchor_id.to_string(),
        })?;

    // Older page layouts put the id on a span inside the heading.
    let heading = std::iter::once(anchor)
        .chain(anchor.ancestors().filter_map(ElementRef::wrap))
        .find(|el| HEADING_TAGS.contains(&el.value().name()))
        .unwrap_or(anchor);
    debug!(heading = heading.value().name(), "located section heading");

    let mut past_heading = false;
    for node in root.descendants() {
        if node == *heading {
            past_heading = true;
            continue;
        }
        if !past_heading {
            continue;
        }
        if let Some(el) = ElementRef::wrap(node) {
            if el.value().name() == "table" && el.value().classes().any(|c| c == table_class) {
                return Ok(el);
            }
        }
    }

    Err(EtlError::TableNotFound {
        anchor: anchor_id.to_string(),
        class: table_class.to_string(),
    })
}

fn bank_name(cell: ElementRef<'_>) -> String {
    cell.children()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "a")
        .map(cell_text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| cell_text(cell))
}

fn cell_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

pub fn parse_market_cap(raw: &str) -> Result<f64, String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    if cleaned.is_empty() {
        return Err("empty market cap".to_string());
    }

    let value: f64 = cleaned
        .parse()
        .map_err(|err| format!("not a number: {err}"))?;
    if !value.is_finite() || value < 0.0 {
        return Err("market cap must be a non-negative finite number".to_string());
    }
    Ok(value)
}
