use comfy_table::{Cell, Table};

use crate::categorizer::{add_rule, delete_rule, list_rules};
use crate::cli::open_db;
use crate::error::Result;

pub fn add(pattern: &str, category: &str, match_type: &str, priority: i64) -> Result<()> {
    let conn = open_db()?;
    let id = add_rule(&conn, pattern, match_type, category, priority)?;
    println!("Added rule {id}: '{pattern}' \u{2192} {category}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let rules = list_rules(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Pattern", "Type", "Category", "Priority", "Hits"]);
    for rule in rules {
        table.add_row(vec![
            Cell::new(rule.id),
            Cell::new(rule.pattern),
            Cell::new(rule.match_type),
            Cell::new(rule.category),
            Cell::new(rule.priority),
            Cell::new(rule.hit_count),
        ]);
    }
    println!("Rules\n{table}");
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let conn = open_db()?;
    delete_rule(&conn, id)?;
    println!("Deactivated rule {id}");
    Ok(())
}
