use crate::context::{SessionContext, ACCOUNT_ID, USER_EMAIL};
use crate::db::get_connection;
use crate::error::Result;
use crate::settings::{load_settings, session_path};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();
    let ctx = SessionContext::load(&session_path())?;

    println!("User:       {}", ctx.get(USER_EMAIL).unwrap_or("(not set)"));
    println!("Account:    {}", ctx.get(ACCOUNT_ID).unwrap_or("(not set)"));
    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());

    if db_path.exists() {
        let conn = get_connection(&db_path)?;
        let transactions: i64 = conn.query_row("SELECT count(*) FROM transacoes", [], |r| r.get(0))?;
        let imports: i64 = conn.query_row("SELECT count(*) FROM importacoes_log", [], |r| r.get(0))?;
        let rules: i64 =
            conn.query_row("SELECT count(*) FROM regras_categoria WHERE is_active = 1", [], |r| r.get(0))?;
        let cards: i64 = conn.query_row("SELECT count(*) FROM cartoes", [], |r| r.get(0))?;
        let bills: i64 =
            conn.query_row("SELECT count(*) FROM contas_recorrentes WHERE ativa = 1", [], |r| r.get(0))?;

        println!();
        println!("Transactions:  {transactions}");
        println!("Imports:       {imports}");
        println!("Rules:         {rules}");
        println!("Cards:         {cards}");
        println!("Bills:         {bills}");
    } else {
        println!();
        println!("Database not found. Run `finhome init` to set up.");
    }

    Ok(())
}
