use chrono::{Local, NaiveDate};
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{open_db, parse_date_arg};
use crate::error::Result;
use crate::fmt::money;
use crate::recurring::{add_bill, due_label, list_bills, next_due_date, upcoming};

pub fn add(name: &str, amount: f64, due: u32, category: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let id = add_bill(&conn, name, amount, due, category)?;
    println!("Added bill {id}: {} {} due day {due}", name.trim(), money(amount));
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let bills = list_bills(&conn)?;
    if bills.is_empty() {
        println!("No recurring bills. Add one with `finhome bills add`.");
        return Ok(());
    }

    let today = Local::now().date_naive();
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Amount", "Due day", "Next due", "Category", "Active"]);
    for bill in &bills {
        table.add_row(vec![
            Cell::new(bill.id),
            Cell::new(&bill.name),
            Cell::new(money(bill.amount)),
            Cell::new(bill.due_day),
            Cell::new(next_due_date(bill.due_day, today).format("%d/%m/%Y")),
            Cell::new(bill.category.as_deref().unwrap_or("-")),
            Cell::new(if bill.active { "yes" } else { "no" }),
        ]);
    }
    println!("Recurring bills\n{table}");
    Ok(())
}

pub fn upcoming_bills(days: i64, today: Option<&str>) -> Result<()> {
    let today: NaiveDate = match today {
        Some(raw) => parse_date_arg(raw)?,
        None => Local::now().date_naive(),
    };
    let conn = open_db()?;
    let bills = list_bills(&conn)?;
    let due = upcoming(&bills, today, days);
    if due.is_empty() {
        println!("Nothing due in the next {days} days.");
        return Ok(());
    }

    let mut total = 0.0;
    for (date, bill) in &due {
        total += bill.amount;
        let label = due_label(*date, today);
        let label = if *date == today { label.red().bold().to_string() } else { label };
        println!("  {:<24} {:>14}  {label}", bill.name, money(bill.amount));
    }
    println!("  {:<24} {:>14}", "Total".bold(), money(total));
    Ok(())
}
