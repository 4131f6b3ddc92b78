use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::store::TransactionStore;

pub fn run(limit: usize) -> Result<()> {
    let conn = open_db()?;
    let logs = conn.import_history(limit)?;
    if logs.is_empty() {
        println!("No imports yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["When", "File", "Type", "Imported", "Duplicates", "Skipped"]);
    for log in &logs {
        table.add_row(vec![
            Cell::new(&log.timestamp),
            Cell::new(&log.file_name),
            Cell::new(log.file_type),
            Cell::new(log.imported_count),
            Cell::new(log.duplicate_count),
            Cell::new(log.skipped_count),
        ]);
    }
    println!("Import history\n{table}");
    Ok(())
}
