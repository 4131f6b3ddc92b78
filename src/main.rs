mod cards;
mod categorizer;
mod cli;
mod context;
mod db;
mod error;
mod fingerprint;
mod fmt;
mod importer;
mod keywords;
mod models;
mod months;
mod normalize;
mod preview;
mod recurring;
mod settings;
mod store;
mod tui;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{BillsCommands, CardsCommands, Cli, Commands, RulesCommands, SessionCommands};

fn main() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: logging disabled: {e}");
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Import {
            file,
            account,
            yes,
            dry_run,
        } => cli::import::run(&file, account.as_deref(), yes, dry_run),
        Commands::History { limit } => cli::history::run(limit),
        Commands::Categorize => cli::categorize::run(),
        Commands::Rules { command } => match command {
            RulesCommands::Add {
                pattern,
                category,
                match_type,
                priority,
            } => cli::rules::add(&pattern, &category, &match_type, priority),
            RulesCommands::List => cli::rules::list(),
            RulesCommands::Delete { id } => cli::rules::delete(id),
        },
        Commands::Cards { command } => match command {
            CardsCommands::Add {
                name,
                closing,
                due,
                limit,
            } => cli::cards::add(&name, closing, due, limit),
            CardsCommands::List => cli::cards::list(),
            CardsCommands::Resolve { query } => cli::cards::resolve(&query),
            CardsCommands::Invoice { card, date } => cli::cards::invoice(&card, &date),
        },
        Commands::Bills { command } => match command {
            BillsCommands::Add {
                name,
                amount,
                due,
                category,
            } => cli::bills::add(&name, amount, due, category.as_deref()),
            BillsCommands::List => cli::bills::list(),
            BillsCommands::Upcoming { days, today } => cli::bills::upcoming_bills(days, today.as_deref()),
        },
        Commands::Session { command } => match command {
            SessionCommands::Show => cli::session::show(),
            SessionCommands::Set { key, value } => cli::session::set(&key, &value),
            SessionCommands::Unset { key } => cli::session::unset(&key),
            SessionCommands::Clear => cli::session::clear(),
        },
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
