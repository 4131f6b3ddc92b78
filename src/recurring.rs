use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;

use crate::error::{FinanceError, Result};
use crate::models::RecurringBill;
use crate::months::{clamp_day, month_start};

pub fn add_bill(conn: &Connection, name: &str, amount: f64, due_day: u32, category: Option<&str>) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FinanceError::Invalid("bill name is required".into()));
    }
    if !(1..=31).contains(&due_day) {
        return Err(FinanceError::Invalid(format!("due day must be between 1 and 31, got {due_day}")));
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err(FinanceError::Invalid(format!("amount must be positive, got {amount}")));
    }
    conn.execute(
        "INSERT INTO contas_recorrentes (nome, valor, dia_vencimento, categoria) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![name, amount, due_day, category],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_bills(conn: &Connection) -> Result<Vec<RecurringBill>> {
    let mut stmt = conn.prepare(
        "SELECT id, nome, valor, dia_vencimento, categoria, ativa FROM contas_recorrentes ORDER BY dia_vencimento, nome",
    )?;
    let bills = stmt
        .query_map([], |row| {
            Ok(RecurringBill {
                id: row.get(0)?,
                name: row.get(1)?,
                amount: row.get(2)?,
                due_day: row.get(3)?,
                category: row.get(4)?,
                active: row.get::<_, i64>(5)? != 0,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(bills)
}

/// The next due date on or after `today` for a bill due on `due_day`
/// each month (clamped to the month's length).
pub fn next_due_date(due_day: u32, today: NaiveDate) -> NaiveDate {
    let this_month = clamp_day(today, due_day);
    if this_month >= today {
        this_month
    } else {
        clamp_day(month_start(today, 1), due_day)
    }
}

/// Active bills due within `window_days` of `today` (inclusive), soonest first.
pub fn upcoming(bills: &[RecurringBill], today: NaiveDate, window_days: i64) -> Vec<(NaiveDate, &RecurringBill)> {
    let mut due: Vec<(NaiveDate, &RecurringBill)> = bills
        .iter()
        .filter(|b| b.active)
        .map(|b| (next_due_date(b.due_day, today), b))
        .filter(|(date, _)| (*date - today).num_days() <= window_days)
        .collect();
    due.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.name.cmp(&b.1.name)));
    due
}

/// Days remaining until `date`; negative when past.
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

/// Human label for a due date relative to today, used in reminder text.
pub fn due_label(date: NaiveDate, today: NaiveDate) -> String {
    match days_until(date, today) {
        0 => "vence hoje".to_string(),
        1 => "vence amanhã".to_string(),
        n => format!("vence em {n} dias ({:02}/{:02})", date.day(), date.month()),
    }
}
