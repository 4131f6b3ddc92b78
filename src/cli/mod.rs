pub mod bills;
pub mod cards;
pub mod categorize;
pub mod history;
pub mod import;
pub mod init;
pub mod preview;
pub mod rules;
pub mod session;
pub mod status;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db::{get_connection, init_db};
use crate::error::{FinanceError, Result};
use crate::settings::load_settings;

/// Open the configured database, creating the schema if needed.
pub(crate) fn open_db() -> Result<Connection> {
    let settings = load_settings();
    let path = settings.db_path();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let conn = get_connection(&path)?;
    init_db(&conn)?;
    Ok(conn)
}

pub(crate) fn parse_date_arg(raw: &str) -> Result<chrono::NaiveDate> {
    crate::importer::parse_date(raw)
        .ok_or_else(|| FinanceError::Invalid(format!("invalid date '{raw}' (use YYYY-MM-DD or DD/MM/YYYY)")))
}

#[derive(Parser)]
#[command(name = "finhome", about = "Import bank statements and track bills for Finance Home.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for data (default: ~/Documents/finance-home)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Import an OFX, CSV, XLSX or XLS statement.
    Import {
        /// Path to the statement file
        file: String,
        /// Account identifier folded into duplicate fingerprints (default: session account_id)
        #[arg(long)]
        account: Option<String>,
        /// Commit the default selection without the interactive preview
        #[arg(long, conflicts_with = "dry_run")]
        yes: bool,
        /// Print the preview and exit without writing anything
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
    /// Show recent imports.
    History {
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Re-apply category rules to transactions still in the default category.
    Categorize,
    /// Manage category rules.
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// Manage credit cards and invoice cycles.
    Cards {
        #[command(subcommand)]
        command: CardsCommands,
    },
    /// Manage recurring bills.
    Bills {
        #[command(subcommand)]
        command: BillsCommands,
    },
    /// Inspect or change the session context.
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
    /// Show current database and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// Add a category rule.
    Add {
        /// Pattern to match against transaction descriptions
        pattern: String,
        /// Category to assign
        #[arg(long)]
        category: String,
        /// Match type: contains, starts_with, regex
        #[arg(long = "match-type", default_value = "contains")]
        match_type: String,
        /// Rule priority (higher wins)
        #[arg(long, default_value = "0")]
        priority: i64,
    },
    /// List active rules.
    List,
    /// Delete (deactivate) a rule by ID.
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum CardsCommands {
    /// Register a credit card.
    Add {
        name: String,
        /// Day of the month the invoice closes
        #[arg(long)]
        closing: u32,
        /// Day of the month the invoice is due
        #[arg(long)]
        due: u32,
        #[arg(long)]
        limit: Option<f64>,
    },
    /// List cards.
    List,
    /// Resolve a free-text card name to a registered card.
    Resolve {
        query: String,
    },
    /// Show which invoice a purchase falls into and when it is due.
    Invoice {
        /// Card name (fuzzy)
        card: String,
        /// Purchase date: YYYY-MM-DD or DD/MM/YYYY
        #[arg(long)]
        date: String,
    },
}

#[derive(Subcommand)]
pub enum BillsCommands {
    /// Add a recurring bill.
    Add {
        name: String,
        #[arg(long)]
        amount: f64,
        /// Day of the month the bill is due
        #[arg(long)]
        due: u32,
        #[arg(long)]
        category: Option<String>,
    },
    /// List recurring bills with their next due date.
    List,
    /// Bills due within the next N days.
    Upcoming {
        #[arg(long, default_value = "7")]
        days: i64,
        /// Reference date (default: today)
        #[arg(long)]
        today: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SessionCommands {
    /// Print all session values.
    Show,
    /// Set a session value (user_email, account_id).
    Set {
        key: String,
        value: String,
    },
    /// Remove one session value.
    Unset {
        key: String,
    },
    /// Clear the whole session.
    Clear,
}
