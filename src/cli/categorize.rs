use crate::categorizer::{categorize_transactions, Categorizer};
use crate::cli::open_db;
use crate::error::Result;
use crate::keywords::ImportKeywords;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let keywords = ImportKeywords::load(settings.keywords_file().as_deref())?;
    let conn = open_db()?;
    let categorizer = Categorizer::load(&conn, keywords)?;
    let result = categorize_transactions(&conn, &categorizer)?;
    println!(
        "Categorized: {}, still {}: {}",
        result.categorized,
        categorizer.default_category(),
        result.still_default
    );
    Ok(())
}
