mod columns;
mod delimited;
mod ofx;
#[cfg(feature = "xlsx")]
mod xlsx;

use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::categorizer::Categorizer;
use crate::error::{FinanceError, Result};
use crate::fingerprint::fingerprint;
use crate::keywords::ImportKeywords;
use crate::models::{FileType, ImportLog, ParseOutcome};
use crate::preview::ImportSession;
use crate::store::{CommitBatch, TransactionStore};

pub use self::delimited::parse_csv_text;
pub use self::ofx::parse_ofx_text;

pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a money amount written in Brazilian (`1.234,56`) or US (`1,234.56`)
/// notation. Accepts `R$`/`$` prefixes, parenthesized negatives and trailing
/// `-`, `D` (debit) or `C` (credit) markers.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let mut s: String = raw
        .trim()
        .replace(|c: char| c == '"' || c == '\u{a0}', "")
        .replace("R$", "")
        .replace('$', "")
        .trim()
        .to_string();
    let mut negative = false;

    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        negative = true;
        s = inner.trim().to_string();
    }
    if let Some(rest) = s.strip_suffix(&['D', 'd'][..]) {
        negative = true;
        s = rest.trim().to_string();
    } else if let Some(rest) = s.strip_suffix(&['C', 'c'][..]) {
        s = rest.trim().to_string();
    }
    if let Some(rest) = s.strip_suffix('-') {
        negative = true;
        s = rest.trim().to_string();
    }
    if let Some(rest) = s.strip_prefix('-') {
        negative = !negative;
        s = rest.trim().to_string();
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest.trim().to_string();
    }
    let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return None;
    }

    let last_comma = s.rfind(',');
    let last_dot = s.rfind('.');
    let canonical = match (last_comma, last_dot) {
        // Whichever separator comes last is the decimal point.
        (Some(c), Some(d)) if c > d => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(_), None) if s.matches(',').count() > 1 => s.replace(',', ""),
        (Some(_), None) => s.replace(',', "."),
        (None, Some(_)) if s.matches('.').count() > 1 => s.replace('.', ""),
        _ => s,
    };

    let value: f64 = canonical.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// Parse `YYYY-MM-DD`, `DD/MM/YYYY`, `DD-MM-YYYY` or `DD/MM/YY`. A trailing
/// time component (`T10:00:00` or ` 10:00`) is ignored.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let raw = raw.split(|c: char| c == 'T' || c == ' ').next()?;
    let parts: Vec<&str> = raw.split(&['/', '-', '.'][..]).collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }
    let (y, m, d) = if parts[0].len() == 4 {
        (parts[0], parts[1], parts[2])
    } else {
        (parts[2], parts[1], parts[0])
    };
    let mut year: i32 = y.parse().ok()?;
    match y.len() {
        2 => year += 2000,
        4 => {}
        _ => return None,
    }
    let month: u32 = m.parse().ok()?;
    let day: u32 = d.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Serial of 9999-12-31, the last date a spreadsheet can hold.
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Spreadsheet serial day number to a date. Epoch is 1899-12-30 (accounting
/// for the 1900 leap year bug). Serials past 9999-12-31 are not dates.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    chrono::Duration::try_days(serial.trunc() as i64).and_then(|d| base.checked_add_signed(d))
}

/// Decode statement bytes as UTF-8, falling back to Latin-1 for the legacy
/// exports many Brazilian banks still produce.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

// ---------------------------------------------------------------------------
// File type detection
// ---------------------------------------------------------------------------

const ALL_FILE_TYPES: &[FileType] = &[FileType::Ofx, FileType::Csv, FileType::Xlsx, FileType::Xls];

impl FileType {
    /// Detect the parser kind from the file name suffix alone.
    pub fn detect(file_name: &str) -> Option<FileType> {
        let lower = file_name.trim().to_lowercase();
        ALL_FILE_TYPES
            .iter()
            .find(|t| lower.ends_with(&format!(".{}", t.as_str())))
            .copied()
    }

    pub fn parse(&self, file_path: &Path, keywords: &ImportKeywords) -> Result<ParseOutcome> {
        let name = file_name_of(file_path);
        match self {
            Self::Ofx => Ok(parse_ofx_text(&decode_text(&std::fs::read(file_path)?))),
            Self::Csv => parse_csv_text(&decode_text(&std::fs::read(file_path)?), &name, keywords),
            #[cfg(feature = "xlsx")]
            Self::Xlsx | Self::Xls => xlsx::parse_workbook(file_path, &name, keywords),
            #[cfg(not(feature = "xlsx"))]
            Self::Xlsx | Self::Xls => Err(FinanceError::UnsupportedFile(format!(
                "{name} (spreadsheet support not compiled in)"
            ))),
        }
    }
}

pub fn detect_file_type(file_name: &str) -> Result<FileType> {
    FileType::detect(file_name).ok_or_else(|| FinanceError::UnsupportedFile(file_name.to_string()))
}

pub fn check_file_size(file_path: &Path, limit: u64) -> Result<()> {
    let size = std::fs::metadata(file_path)?.len();
    if size > limit {
        return Err(FinanceError::FileTooLarge { size, limit });
    }
    Ok(())
}

fn file_name_of(file_path: &Path) -> String {
    file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_string()
}

// ---------------------------------------------------------------------------
// prepare / commit
// ---------------------------------------------------------------------------

pub struct ImportOptions<'a> {
    pub keywords: &'a ImportKeywords,
    pub categorizer: &'a Categorizer,
    pub account_id: Option<&'a str>,
    pub max_file_size: u64,
}

/// Parse a statement and build a preview session with duplicates flagged
/// against the store. Nothing is written.
pub fn prepare_import(
    store: &dyn TransactionStore,
    file_path: &Path,
    options: &ImportOptions,
) -> Result<ImportSession> {
    let name = file_name_of(file_path);
    let file_type = detect_file_type(&name)?;
    check_file_size(file_path, options.max_file_size)?;

    let outcome = file_type.parse(file_path, options.keywords)?;
    debug!(file = %name, rows = outcome.rows.len(), skipped = outcome.skipped.len(), "parsed statement");
    for skipped in &outcome.skipped {
        warn!(file = %name, line = skipped.line, reason = %skipped.reason, "skipped row");
    }

    let fingerprints: Vec<String> = outcome
        .rows
        .iter()
        .map(|r| fingerprint(r.date, &r.description, r.amount, options.account_id))
        .collect();
    let existing = store.existing_fingerprints(&fingerprints)?;

    Ok(ImportSession::build(
        name,
        file_type,
        outcome,
        fingerprints,
        &existing,
        options.categorizer,
    ))
}

/// Write the session's selected rows and one import log entry.
pub fn commit_import(
    store: &dyn TransactionStore,
    session: &ImportSession,
    account_id: Option<&str>,
) -> Result<ImportLog> {
    let batch = CommitBatch {
        file_name: &session.file_name,
        file_type: session.file_type,
        account_id,
        rows: session.selected().collect(),
        duplicate_count: session.duplicate_count(),
        skipped_count: session.skipped.len(),
    };
    let log = store.commit_import(&batch)?;
    info!(
        file = %log.file_name,
        imported = log.imported_count,
        duplicates = log.duplicate_count,
        skipped = log.skipped_count,
        "import committed"
    );
    Ok(log)
}
