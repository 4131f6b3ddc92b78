use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Env {
    home: TempDir,
}

impl Env {
    fn new() -> Self {
        let env = Self {
            home: tempfile::tempdir().unwrap(),
        };
        let data = env.home.path().join("data");
        env.cmd()
            .args(["init", "--data-dir", data.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("Initialized Finance Home"));
        env
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("finhome").unwrap();
        cmd.env("HOME", self.home.path()).env_remove("RUST_LOG");
        cmd
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.home.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

const STATEMENT: &str = "Data;Histórico;Valor\n\
01/03/2024;Supermercado ABC;-150,00\n\
02/03/2024;Salario Empresa;3.000,00\n\
xx/03/2024;Linha quebrada;10,00\n";

#[test]
fn import_then_reimport_reports_duplicates() {
    let env = Env::new();
    let file = env.write("extrato.csv", STATEMENT);

    env.cmd()
        .args(["import", arg(&file), "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 imported, 0 duplicates, 1 skipped"))
        .stdout(predicate::str::contains("line 4"));

    env.cmd()
        .args(["import", arg(&file), "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 imported, 2 duplicates, 1 skipped"));

    env.cmd()
        .args(["history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("extrato.csv"));
}

#[test]
fn dry_run_writes_nothing() {
    let env = Env::new();
    let file = env.write("extrato.csv", STATEMENT);

    env.cmd()
        .args(["import", arg(&file), "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Supermercado ABC"))
        .stdout(predicate::str::contains("2 selected"));

    env.cmd()
        .args(["history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No imports yet."));
}

#[test]
fn unsupported_extension_fails() {
    let env = Env::new();
    let file = env.write("extrato.pdf", "not a statement");

    env.cmd()
        .args(["import", arg(&file), "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file type"));
}

#[test]
fn ofx_import() {
    let env = Env::new();
    let file = env.write(
        "extrato.ofx",
        "OFXHEADER:100\n<OFX><BANKTRANLIST>\n\
<STMTTRN><TRNTYPE>DEBIT<DTPOSTED>20240305120000[-3:BRT]<TRNAMT>-42.50<MEMO>Padaria Central\n</STMTTRN>\n\
</BANKTRANLIST></OFX>\n",
    );

    env.cmd()
        .args(["import", arg(&file), "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 imported, 0 duplicates, 0 skipped"));
}

#[test]
fn session_values_persist() {
    let env = Env::new();
    env.cmd()
        .args(["session", "set", "user_email", "ana@example.com"])
        .assert()
        .success();
    env.cmd()
        .args(["session", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ana@example.com"));
    env.cmd()
        .args(["session", "set", "favorite", "x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not a known key"));
    env.cmd().args(["session", "clear"]).assert().success();
    env.cmd()
        .args(["session", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Session is empty."));
}

#[test]
fn cards_resolve_and_invoice() {
    let env = Env::new();
    env.cmd()
        .args(["cards", "add", "Nubank", "--closing", "3", "--due", "10"])
        .assert()
        .success();

    env.cmd()
        .args(["cards", "resolve", "nubak"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nubank"));

    env.cmd()
        .args(["cards", "invoice", "nubank", "--date", "2024-03-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("04/2024"))
        .stdout(predicate::str::contains("10/04/2024"));

    env.cmd()
        .args(["cards", "resolve", "itau"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown card"));
}

#[test]
fn bills_upcoming() {
    let env = Env::new();
    env.cmd()
        .args(["bills", "add", "Aluguel", "--amount", "1500", "--due", "10"])
        .assert()
        .success();
    env.cmd()
        .args(["bills", "add", "Internet", "--amount", "99.9", "--due", "25"])
        .assert()
        .success();

    env.cmd()
        .args(["bills", "upcoming", "--days", "7", "--today", "2024-03-08"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Aluguel"))
        .stdout(predicate::str::contains("vence em 2 dias (10/03)"))
        .stdout(predicate::str::contains("Internet").not());
}

#[test]
fn rules_recategorize_stored_transactions() {
    let env = Env::new();
    let file = env.write("extrato.csv", "Data;Histórico;Valor\n01/03/2024;ACME Servicos;-80,00\n");
    env.cmd()
        .args(["import", arg(&file), "--yes"])
        .assert()
        .success();

    env.cmd()
        .args(["rules", "add", "acme", "--category", "Servicos"])
        .assert()
        .success();
    env.cmd()
        .args(["categorize"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Categorized: 1"));
    env.cmd()
        .args(["rules", "add", "(", "--category", "X", "--match-type", "regex"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid regex"));
}

#[test]
fn init_expands_tilde_before_creating_data_dir() {
    let home = tempfile::tempdir().unwrap();
    let cwd = tempfile::tempdir().unwrap();
    Command::cargo_bin("finhome")
        .unwrap()
        .env("HOME", home.path())
        .current_dir(cwd.path())
        .args(["init", "--data-dir", "~/fin"])
        .assert()
        .success();

    assert!(home.path().join("fin").join("finance.db").exists());
    assert!(!cwd.path().join("~").exists());
}

#[test]
fn status_reports_counts() {
    let env = Env::new();
    env.cmd()
        .args(["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Transactions:  0"));
}
