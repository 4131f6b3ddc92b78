//! Header detection and column resolution shared by the CSV and spreadsheet
//! parsers. Keyword tables come from [`ImportKeywords`].

use chrono::NaiveDate;

use super::{excel_serial_to_date, parse_amount, parse_date};
use crate::error::{FinanceError, Result};
use crate::keywords::ImportKeywords;
use crate::models::{Direction, ParseOutcome, ParsedRow};
use crate::normalize::normalize_text;

/// A source cell, independent of the file format it came from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Cell {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Empty,
}

impl Cell {
    fn text(&self) -> String {
        match self {
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => n.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::Empty => String::new(),
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Empty => true,
            _ => false,
        }
    }

    fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Text(s) => parse_date(s),
            Cell::Number(n) => excel_serial_to_date(*n),
            Cell::Date(d) => Some(*d),
            Cell::Empty => None,
        }
    }

    fn as_amount(&self) -> Option<f64> {
        match self {
            Cell::Text(s) => parse_amount(s),
            Cell::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ColumnMap {
    pub date: usize,
    pub description: usize,
    pub value: usize,
    pub kind: Option<usize>,
}

fn contains_any(cell: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| cell.contains(k.as_str()))
}

/// A header line starts with a date-like cell followed by a description-like cell.
pub(crate) fn is_header(cells: &[Cell], keywords: &ImportKeywords) -> bool {
    if cells.len() < 2 {
        return false;
    }
    let first = normalize_text(&cells[0].text());
    let second = normalize_text(&cells[1].text());
    contains_any(&first, &keywords.date) && contains_any(&second, &keywords.description)
}

/// For each keyword in priority order, the first not-yet-claimed column whose
/// header contains it.
fn find_column(headers: &[String], keywords: &[String], claimed: &[usize]) -> Option<usize> {
    keywords.iter().find_map(|k| {
        headers
            .iter()
            .enumerate()
            .find(|(i, h)| !claimed.contains(i) && h.contains(k.as_str()))
            .map(|(i, _)| i)
    })
}

pub(crate) fn resolve_columns(header: &[Cell], keywords: &ImportKeywords) -> Result<ColumnMap> {
    let headers: Vec<String> = header.iter().map(|c| normalize_text(&c.text())).collect();
    let mut claimed = Vec::new();

    let date = find_column(&headers, &keywords.date, &claimed);
    claimed.extend(date);
    let description = find_column(&headers, &keywords.description, &claimed);
    claimed.extend(description);
    let value = find_column(&headers, &keywords.value, &claimed);
    claimed.extend(value);
    let kind = find_column(&headers, &keywords.kind, &claimed);

    let mut missing = Vec::new();
    if date.is_none() {
        missing.push("date");
    }
    if description.is_none() {
        missing.push("description");
    }
    if value.is_none() {
        missing.push("value");
    }
    match (date, description, value) {
        (Some(date), Some(description), Some(value)) => Ok(ColumnMap {
            date,
            description,
            value,
            kind,
        }),
        _ => Err(FinanceError::MissingColumns(format!(
            "{} (header: {})",
            missing.join(", "),
            headers.join(" | ")
        ))),
    }
}

/// Walk rows of `(line, cells)`: locate the header, resolve columns, then turn
/// every following non-blank row into a `ParsedRow` or a skipped-row note.
pub(crate) fn parse_rows<I>(rows: I, source: &str, keywords: &ImportKeywords) -> Result<ParseOutcome>
where
    I: IntoIterator<Item = (usize, Vec<Cell>)>,
{
    let mut rows = rows.into_iter();
    let map = loop {
        match rows.next() {
            Some((_, cells)) if is_header(&cells, keywords) => break resolve_columns(&cells, keywords)?,
            Some(_) => continue,
            None => return Err(FinanceError::HeaderNotFound(source.to_string())),
        }
    };

    let mut outcome = ParseOutcome::default();
    for (line, cells) in rows {
        if cells.iter().all(Cell::is_blank) {
            continue;
        }
        let cell = |idx: usize| cells.get(idx).cloned().unwrap_or(Cell::Empty);

        let raw_date = cell(map.date);
        let Some(date) = raw_date.as_date() else {
            outcome.skip(line, format!("invalid date '{}'", raw_date.text()));
            continue;
        };
        let raw_amount = cell(map.value);
        let Some(amount) = raw_amount.as_amount() else {
            outcome.skip(line, format!("invalid amount '{}'", raw_amount.text()));
            continue;
        };
        let description = cell(map.description).text();
        if description.is_empty() {
            outcome.skip(line, "missing description");
            continue;
        }

        let kind = map.kind.map(cell).filter(|c| !c.is_blank());
        let direction = match kind {
            Some(k) if keywords.is_credit(&k.text()) => Direction::Entrada,
            Some(_) => Direction::Saida,
            None => Direction::from_amount(amount),
        };
        outcome.rows.push(ParsedRow {
            date,
            description,
            amount: direction.signed(amount),
            direction,
        });
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|c| Cell::Text(c.to_string())).collect()
    }

    #[test]
    fn test_is_header() {
        let kw = ImportKeywords::default();
        assert!(is_header(&text_row(&["Data", "Histórico", "Valor"]), &kw));
        assert!(is_header(&text_row(&["DATA LANÇAMENTO", "DESCRIÇÃO", "VALOR"]), &kw));
        assert!(!is_header(&text_row(&["Conta", "12345"]), &kw));
        assert!(!is_header(&text_row(&["Data"]), &kw));
    }

    #[test]
    fn test_resolve_columns_with_type() {
        let kw = ImportKeywords::default();
        let header = text_row(&["Data", "Descrição", "Tipo", "Valor (R$)"]);
        let map = resolve_columns(&header, &kw).unwrap();
        assert_eq!(
            map,
            ColumnMap {
                date: 0,
                description: 1,
                value: 3,
                kind: Some(2)
            }
        );
    }

    #[test]
    fn test_resolve_columns_missing_value() {
        let kw = ImportKeywords::default();
        let header = text_row(&["Data", "Histórico", "Saldo"]);
        let err = resolve_columns(&header, &kw).unwrap_err();
        match err {
            FinanceError::MissingColumns(msg) => assert!(msg.starts_with("value")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rows_header_not_found() {
        let kw = ImportKeywords::default();
        let rows = vec![(1, text_row(&["foo", "bar"])), (2, text_row(&["1", "2"]))];
        let err = parse_rows(rows, "x.csv", &kw).unwrap_err();
        assert!(matches!(err, FinanceError::HeaderNotFound(_)));
    }

    #[test]
    fn test_parse_rows_type_column_overrides_sign() {
        let kw = ImportKeywords::default();
        let rows = vec![
            (1, text_row(&["Data", "Histórico", "Valor", "Tipo"])),
            (2, text_row(&["05/03/2024", "Depósito", "500,00", "C"])),
            (3, text_row(&["06/03/2024", "Conta de luz", "120,00", "D"])),
            (4, text_row(&["07/03/2024", "Estorno", "-30,00", ""])),
        ];
        let outcome = parse_rows(rows, "x.csv", &kw).unwrap();
        assert_eq!(outcome.rows.len(), 3);
        assert_eq!(outcome.rows[0].direction, Direction::Entrada);
        assert_eq!(outcome.rows[0].amount, 500.0);
        assert_eq!(outcome.rows[1].direction, Direction::Saida);
        assert_eq!(outcome.rows[1].amount, -120.0);
        assert_eq!(outcome.rows[2].direction, Direction::Saida);
    }

    #[test]
    fn test_parse_rows_records_skipped_lines() {
        let kw = ImportKeywords::default();
        let rows = vec![
            (1, text_row(&["Extrato conta corrente"])),
            (2, text_row(&["Data", "Histórico", "Valor"])),
            (3, text_row(&["", "Saldo anterior", "1.000,00"])),
            (4, text_row(&["01/03/2024", "Padaria", "abc"])),
            (5, text_row(&["", "", ""])),
            (6, text_row(&["02/03/2024", "", "-5,00"])),
            (7, text_row(&["03/03/2024", "Padaria", "-7,50"])),
        ];
        let outcome = parse_rows(rows, "x.csv", &kw).unwrap();
        assert_eq!(outcome.rows.len(), 1);
        let lines: Vec<usize> = outcome.skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![3, 4, 6]);
        assert!(outcome.skipped[1].reason.contains("invalid amount"));
    }

    #[test]
    fn test_parse_rows_numeric_cells() {
        let kw = ImportKeywords::default();
        let rows = vec![
            (1, text_row(&["Data", "Descrição", "Valor"])),
            (
                2,
                vec![
                    Cell::Number(45352.0),
                    Cell::Text("Supermercado".into()),
                    Cell::Number(-150.0),
                ],
            ),
        ];
        let outcome = parse_rows(rows, "x.xlsx", &kw).unwrap();
        assert_eq!(outcome.rows[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(outcome.rows[0].amount, -150.0);
    }

    #[test]
    fn test_parse_rows_document_number_in_date_column_is_skipped() {
        let kw = ImportKeywords::default();
        let rows = vec![
            (1, text_row(&["Data", "Histórico", "Valor"])),
            (
                2,
                vec![
                    Cell::Number(45352.0),
                    Cell::Text("Padaria".into()),
                    Cell::Number(-20.0),
                ],
            ),
            (
                3,
                vec![
                    Cell::Number(123_456_789_012_345.0),
                    Cell::Text("Documento 123456789012345".into()),
                    Cell::Number(1.0),
                ],
            ),
        ];
        let outcome = parse_rows(rows, "x.xlsx", &kw).unwrap();
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].line, 3);
        assert!(outcome.skipped[0].reason.starts_with("invalid date"));
    }
}
