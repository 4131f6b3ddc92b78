use comfy_table::{Cell, Table};

use crate::cards::{add_card, invoice_due_date, invoice_month, list_cards, resolve_card};
use crate::cli::{open_db, parse_date_arg};
use crate::error::{FinanceError, Result};
use crate::fmt::money;
use crate::models::Card;

pub fn add(name: &str, closing: u32, due: u32, limit: Option<f64>) -> Result<()> {
    let conn = open_db()?;
    let id = add_card(&conn, name, closing, due, limit)?;
    println!("Added card {id}: {} (closes day {closing}, due day {due})", name.trim());
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let cards = list_cards(&conn)?;
    if cards.is_empty() {
        println!("No cards registered. Add one with `finhome cards add`.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Closing", "Due", "Limit"]);
    for card in &cards {
        table.add_row(vec![
            Cell::new(card.id),
            Cell::new(&card.name),
            Cell::new(card.closing_day),
            Cell::new(card.due_day),
            Cell::new(card.limit.map(money).unwrap_or_else(|| "-".into())),
        ]);
    }
    println!("Cards\n{table}");
    Ok(())
}

fn find(query: &str, cards: &[Card]) -> Result<Card> {
    resolve_card(query, cards)
        .cloned()
        .ok_or_else(|| FinanceError::UnknownCard(query.to_string()))
}

pub fn resolve(query: &str) -> Result<()> {
    let conn = open_db()?;
    let cards = list_cards(&conn)?;
    let card = find(query, &cards)?;
    println!("{} (id {})", card.name, card.id);
    Ok(())
}

pub fn invoice(query: &str, date: &str) -> Result<()> {
    let purchase = parse_date_arg(date)?;
    let conn = open_db()?;
    let cards = list_cards(&conn)?;
    let card = find(query, &cards)?;

    let month = invoice_month(purchase, card.closing_day);
    let due = invoice_due_date(month, card.closing_day, card.due_day);
    println!("Card:     {}", card.name);
    println!("Purchase: {}", purchase.format("%d/%m/%Y"));
    println!("Invoice:  {}", month.format("%m/%Y"));
    println!("Due:      {}", due.format("%d/%m/%Y"));
    Ok(())
}
