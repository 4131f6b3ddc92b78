use super::columns::{parse_rows, Cell};
use crate::error::{FinanceError, Result};
use crate::keywords::ImportKeywords;
use crate::models::ParseOutcome;

/// Delimiters tried in order. Brazilian bank exports use `;`; the `,`
/// fallback covers US-style exports.
const DELIMITERS: &[u8] = b";,";

/// Parse statement CSV text. The header row is searched for anywhere in the
/// file, so preamble lines (account name, period) are tolerated.
pub fn parse_csv_text(content: &str, source: &str, keywords: &ImportKeywords) -> Result<ParseOutcome> {
    let mut last_err = FinanceError::HeaderNotFound(source.to_string());
    for &delimiter in DELIMITERS {
        match parse_with_delimiter(content, delimiter, source, keywords) {
            Err(e @ FinanceError::HeaderNotFound(_)) => last_err = e,
            other => return other,
        }
    }
    Err(last_err)
}

fn parse_with_delimiter(
    content: &str,
    delimiter: u8,
    source: &str,
    keywords: &ImportKeywords,
) -> Result<ParseOutcome> {
    let mut rdr = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    let mut unreadable = Vec::new();
    for result in rdr.records() {
        match result {
            Ok(record) => {
                let line = record.position().map_or(rows.len() + 1, |p| p.line() as usize);
                let cells = record.iter().map(|f| Cell::Text(f.to_string())).collect();
                rows.push((line, cells));
            }
            Err(e) => {
                let line = e.position().map_or(0, |p| p.line() as usize);
                unreadable.push((line, e.to_string()));
            }
        }
    }

    let mut outcome = parse_rows(rows, source, keywords)?;
    for (line, reason) in unreadable {
        outcome.skip(line, format!("unreadable record: {reason}"));
    }
    outcome.skipped.sort_by_key(|s| s.line);
    Ok(outcome)
}
