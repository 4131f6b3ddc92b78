use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;

use crate::error::{FinanceError, Result};
use crate::models::Card;
use crate::months::{clamp_day, month_start};
use crate::normalize::normalize_text;

fn validate_day(label: &str, day: u32) -> Result<()> {
    if !(1..=31).contains(&day) {
        return Err(FinanceError::Invalid(format!("{label} must be between 1 and 31, got {day}")));
    }
    Ok(())
}

pub fn add_card(conn: &Connection, name: &str, closing_day: u32, due_day: u32, limit: Option<f64>) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FinanceError::Invalid("card name is required".into()));
    }
    validate_day("closing day", closing_day)?;
    validate_day("due day", due_day)?;
    conn.execute(
        "INSERT INTO cartoes (nome, dia_fechamento, dia_vencimento, limite) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![name, closing_day, due_day, limit],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_cards(conn: &Connection) -> Result<Vec<Card>> {
    let mut stmt = conn.prepare("SELECT id, nome, dia_fechamento, dia_vencimento, limite FROM cartoes ORDER BY nome")?;
    let cards = stmt
        .query_map([], |row| {
            Ok(Card {
                id: row.get(0)?,
                name: row.get(1)?,
                closing_day: row.get(2)?,
                due_day: row.get(3)?,
                limit: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(cards)
}

/// Resolve a free-text card reference ("nubank", "itau plat", "nubak") to a
/// registered card: exact normalized name, then containment, then the
/// closest Levenshtein match within `max(2, len / 3)` edits.
pub fn resolve_card<'a>(query: &str, cards: &'a [Card]) -> Option<&'a Card> {
    let q = normalize_text(query);
    if q.is_empty() {
        return None;
    }
    let named: Vec<(String, &Card)> = cards.iter().map(|c| (normalize_text(&c.name), c)).collect();

    if let Some((_, card)) = named.iter().find(|(n, _)| *n == q) {
        return Some(*card);
    }

    let containing = named
        .iter()
        .filter(|(n, _)| n.contains(&q) || q.contains(n.as_str()))
        .min_by_key(|(n, _)| n.len().abs_diff(q.len()));
    if let Some((_, card)) = containing {
        return Some(*card);
    }

    let threshold = (q.chars().count() / 3).max(2);
    named
        .iter()
        .map(|(n, c)| (strsim::levenshtein(n, &q), *c))
        .filter(|(dist, _)| *dist <= threshold)
        .min_by_key(|(dist, _)| *dist)
        .map(|(_, c)| c)
}

/// First day of the invoice (fatura) month a purchase belongs to. Purchases
/// after the closing day roll into the next month's invoice.
pub fn invoice_month(purchase: NaiveDate, closing_day: u32) -> NaiveDate {
    let closing = clamp_day(purchase, closing_day);
    if purchase.day() <= closing.day() {
        month_start(purchase, 0)
    } else {
        month_start(purchase, 1)
    }
}

/// Due date of the invoice that closes in `invoice_month`. When the due day
/// is not after the closing day, payment falls in the following month.
pub fn invoice_due_date(invoice_month: NaiveDate, closing_day: u32, due_day: u32) -> NaiveDate {
    if due_day > closing_day {
        clamp_day(invoice_month, due_day)
    } else {
        clamp_day(month_start(invoice_month, 1), due_day)
    }
}
