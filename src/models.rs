use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Entrada,
    Saida,
}

impl Direction {
    pub fn from_amount(amount: f64) -> Self {
        if amount >= 0.0 {
            Self::Entrada
        } else {
            Self::Saida
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entrada => "entrada",
            Self::Saida => "saida",
        }
    }

    /// Apply this direction's sign to an absolute amount.
    pub fn signed(&self, amount: f64) -> f64 {
        match self {
            Self::Entrada => amount.abs(),
            Self::Saida => -amount.abs(),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Ofx,
    Csv,
    Xlsx,
    Xls,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ofx => "ofx",
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intermediate representation from an OFX/CSV/XLSX parser before preview.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub date: NaiveDate,
    pub description: String,
    /// Signed: negative for money going out.
    pub amount: f64,
    pub direction: Direction,
}

/// A source row the parser could not turn into a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// 1-based line (CSV/XLSX row, or OFX block ordinal).
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub rows: Vec<ParsedRow>,
    pub skipped: Vec<SkippedRow>,
}

impl ParseOutcome {
    pub fn skip(&mut self, line: usize, reason: impl Into<String>) {
        self.skipped.push(SkippedRow {
            line,
            reason: reason.into(),
        });
    }
}

/// A candidate row inside an import session, shown in the preview.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedTransaction {
    pub date: NaiveDate,
    pub description: String,
    /// Absolute value; `direction` carries the sign.
    pub amount: f64,
    pub direction: Direction,
    pub fingerprint: String,
    pub is_duplicate: bool,
    pub is_selected: bool,
    pub category: String,
}

impl ImportedTransaction {
    pub fn signed_amount(&self) -> f64 {
        self.direction.signed(self.amount)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportLog {
    pub file_name: String,
    pub file_type: FileType,
    pub imported_count: usize,
    pub duplicate_count: usize,
    pub skipped_count: usize,
    pub timestamp: String,
}

#[derive(Debug, Clone)]
pub struct Card {
    pub id: i64,
    pub name: String,
    pub closing_day: u32,
    pub due_day: u32,
    pub limit: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct RecurringBill {
    pub id: i64,
    pub name: String,
    pub amount: f64,
    pub due_day: u32,
    pub category: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub id: i64,
    pub pattern: String,
    pub match_type: String,
    pub category: String,
    pub priority: i64,
    pub hit_count: i64,
}
