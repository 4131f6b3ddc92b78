use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::categorizer::Categorizer;
use crate::cli::open_db;
use crate::cli::preview::{PreviewOutcome, PreviewScreen};
use crate::context::{SessionContext, ACCOUNT_ID};
use crate::error::Result;
use crate::fmt::money;
use crate::importer::{commit_import, prepare_import, ImportOptions};
use crate::keywords::ImportKeywords;
use crate::models::{Direction, ImportLog};
use crate::preview::ImportSession;
use crate::settings::{load_settings, session_path};
use crate::tui::run_screen;

pub fn run(file: &str, account: Option<&str>, yes: bool, dry_run: bool) -> Result<()> {
    let settings = load_settings();
    let keywords = ImportKeywords::load(settings.keywords_file().as_deref())?;
    let conn = open_db()?;
    let categorizer = Categorizer::load(&conn, keywords.clone())?;
    let ctx = SessionContext::load(&session_path())?;
    let account_id = account.or_else(|| ctx.get(ACCOUNT_ID));

    let options = ImportOptions {
        keywords: &keywords,
        categorizer: &categorizer,
        account_id,
        max_file_size: settings.max_file_size,
    };
    let mut session = prepare_import(&conn, &PathBuf::from(file), &options)?;

    if dry_run {
        print_preview(&session);
        return Ok(());
    }

    if !yes {
        let mut screen = PreviewScreen::new(session);
        run_screen(&mut screen)?;
        match screen.into_outcome() {
            PreviewOutcome::Commit(confirmed) => session = confirmed,
            PreviewOutcome::Cancel => {
                println!("Import cancelled; nothing was written.");
                return Ok(());
            }
        }
    }

    let log = commit_import(&conn, &session, account_id)?;
    print_summary(&log, &session);
    Ok(())
}

fn print_preview(session: &ImportSession) {
    let mut table = Table::new();
    table.set_header(vec!["#", "Date", "Description", "Amount", "Category", "Status"]);
    for (i, row) in session.rows.iter().enumerate() {
        let amount = match row.direction {
            Direction::Entrada => money(row.signed_amount()).green().to_string(),
            Direction::Saida => money(row.signed_amount()).red().to_string(),
        };
        let status = if row.is_duplicate {
            "duplicate".dimmed().to_string()
        } else if row.is_selected {
            "selected".to_string()
        } else {
            "skipped".to_string()
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(row.date.format("%Y-%m-%d")),
            Cell::new(&row.description),
            Cell::new(amount),
            Cell::new(&row.category),
            Cell::new(status),
        ]);
    }
    println!("{} ({})\n{table}", session.file_name, session.file_type);

    let totals = session.totals();
    println!(
        "{} selected, {} duplicates | entradas {} | saidas {} | net {}",
        totals.selected_count,
        session.duplicate_count(),
        money(totals.entradas),
        money(totals.saidas),
        money(totals.net())
    );
    print_skipped(session);
}

fn print_skipped(session: &ImportSession) {
    if session.skipped.is_empty() {
        return;
    }
    println!("{}", format!("{} rows could not be read:", session.skipped.len()).yellow());
    for s in &session.skipped {
        println!("  line {}: {}", s.line, s.reason);
    }
}

fn print_summary(log: &ImportLog, session: &ImportSession) {
    println!(
        "{} imported, {} duplicates, {} skipped",
        log.imported_count, log.duplicate_count, log.skipped_count
    );
    print_skipped(session);
}
