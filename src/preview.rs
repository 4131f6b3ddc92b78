use std::collections::HashSet;

use crate::categorizer::Categorizer;
use crate::models::{Direction, FileType, ImportedTransaction, ParseOutcome, SkippedRow};

/// The transient state of one import between parsing and commit.
#[derive(Debug, Clone)]
pub struct ImportSession {
    pub file_name: String,
    pub file_type: FileType,
    pub rows: Vec<ImportedTransaction>,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub selected_count: usize,
    pub entradas: f64,
    pub saidas: f64,
}

impl Totals {
    pub fn net(&self) -> f64 {
        self.entradas - self.saidas
    }
}

impl ImportSession {
    /// `fingerprints` runs parallel to `outcome.rows`. A row is a duplicate
    /// when its fingerprint is already stored or appeared earlier in the file.
    pub fn build(
        file_name: String,
        file_type: FileType,
        outcome: ParseOutcome,
        fingerprints: Vec<String>,
        existing: &HashSet<String>,
        categorizer: &Categorizer,
    ) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let rows = outcome
            .rows
            .into_iter()
            .zip(fingerprints)
            .map(|(row, fingerprint)| {
                let is_duplicate = existing.contains(&fingerprint) || !seen.insert(fingerprint.clone());
                ImportedTransaction {
                    category: categorizer.categorize(&row.description),
                    date: row.date,
                    description: row.description,
                    amount: row.amount.abs(),
                    direction: row.direction,
                    fingerprint,
                    is_duplicate,
                    is_selected: !is_duplicate,
                }
            })
            .collect();
        Self {
            file_name,
            file_type,
            rows,
            skipped: outcome.skipped,
        }
    }

    /// Flip one row's selection. Duplicates cannot be selected; returns
    /// whether anything changed.
    pub fn toggle(&mut self, index: usize) -> bool {
        match self.rows.get_mut(index) {
            Some(row) if !row.is_duplicate => {
                row.is_selected = !row.is_selected;
                true
            }
            _ => false,
        }
    }

    pub fn select_all(&mut self) {
        self.set_all(true);
    }

    pub fn deselect_all(&mut self) {
        self.set_all(false);
    }

    fn set_all(&mut self, selected: bool) {
        for row in self.rows.iter_mut().filter(|r| !r.is_duplicate) {
            row.is_selected = selected;
        }
    }

    pub fn set_category(&mut self, index: usize, category: &str) -> bool {
        let category = category.trim();
        match self.rows.get_mut(index) {
            Some(row) if !category.is_empty() => {
                row.category = category.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn selected(&self) -> impl Iterator<Item = &ImportedTransaction> {
        self.rows.iter().filter(|r| r.is_selected && !r.is_duplicate)
    }

    pub fn duplicate_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_duplicate).count()
    }

    /// Sums over selected rows; duplicates never count.
    pub fn totals(&self) -> Totals {
        self.selected().fold(Totals::default(), |mut t, row| {
            t.selected_count += 1;
            match row.direction {
                Direction::Entrada => t.entradas += row.amount,
                Direction::Saida => t.saidas += row.amount,
            }
            t
        })
    }
}
