use std::path::Path;

use calamine::{Data, Reader};

use super::columns::{parse_rows, Cell};
use super::excel_serial_to_date;
use crate::error::{FinanceError, Result};
use crate::keywords::ImportKeywords;
use crate::models::ParseOutcome;

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()).map_or(Cell::Empty, Cell::Date),
        Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Text(b.to_string()),
        _ => Cell::Empty,
    }
}

/// Parse the first worksheet of an `.xlsx`/`.xls` workbook with the same
/// header and column rules as CSV.
pub fn parse_workbook(file_path: &Path, source: &str, keywords: &ImportKeywords) -> Result<ParseOutcome> {
    let mut workbook = calamine::open_workbook_auto(file_path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| FinanceError::HeaderNotFound(format!("{source} (workbook has no sheets)")))??;

    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    let rows = range
        .rows()
        .enumerate()
        .map(|(i, row)| (first_row + i + 1, row.iter().map(to_cell).collect::<Vec<_>>()));
    parse_rows(rows, source, keywords)
}
