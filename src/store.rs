use std::collections::HashSet;

use rusqlite::Connection;
use tracing::debug;

use crate::error::{FinanceError, Result};
use crate::models::{FileType, ImportLog, ImportedTransaction};

/// SQLite caps bound parameters per statement; stay well below it.
const LOOKUP_CHUNK: usize = 500;

/// Everything the commit step writes in one go.
pub struct CommitBatch<'a> {
    pub file_name: &'a str,
    pub file_type: FileType,
    pub account_id: Option<&'a str>,
    pub rows: Vec<&'a ImportedTransaction>,
    /// Rows already flagged as duplicates during preview.
    pub duplicate_count: usize,
    pub skipped_count: usize,
}

/// The backing store the import pipeline needs.
pub trait TransactionStore {
    /// Which of `fingerprints` are already committed.
    fn existing_fingerprints(&self, fingerprints: &[String]) -> Result<HashSet<String>>;

    /// Insert the batch and its log entry atomically. Rows whose fingerprint
    /// is already present are not inserted and count as duplicates.
    fn commit_import(&self, batch: &CommitBatch) -> Result<ImportLog>;

    /// Most recent import log entries, newest first.
    fn import_history(&self, limit: usize) -> Result<Vec<ImportLog>>;
}

fn parse_file_type(raw: &str) -> rusqlite::Result<FileType> {
    FileType::detect(&format!("x.{raw}")).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("unknown file type '{raw}'").into(),
        )
    })
}

impl TransactionStore for Connection {
    fn existing_fingerprints(&self, fingerprints: &[String]) -> Result<HashSet<String>> {
        let mut found = HashSet::new();
        for chunk in fingerprints.chunks(LOOKUP_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!("SELECT hash_unico FROM transacoes WHERE hash_unico IN ({placeholders})");
            let mut stmt = self.prepare(&sql)?;
            let rows = stmt.query_map(rusqlite::params_from_iter(chunk.iter()), |row| row.get::<_, String>(0))?;
            for hash in rows {
                found.insert(hash?);
            }
        }
        Ok(found)
    }

    fn commit_import(&self, batch: &CommitBatch) -> Result<ImportLog> {
        let tx = self.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO importacoes_log (file_name, file_type, skipped_count) VALUES (?1, ?2, ?3)",
            rusqlite::params![batch.file_name, batch.file_type.as_str(), batch.skipped_count as i64],
        )?;
        let import_id = tx.last_insert_rowid();

        let mut imported = 0usize;
        let mut conflicts = 0usize;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO transacoes (data, descricao, valor, tipo, categoria, conta_id, hash_unico, import_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) ON CONFLICT(hash_unico) DO NOTHING",
            )?;
            for row in &batch.rows {
                if row.is_duplicate {
                    return Err(FinanceError::Invalid(format!(
                        "duplicate row selected for commit: {} {}",
                        row.date, row.description
                    )));
                }
                let changed = stmt.execute(rusqlite::params![
                    row.date.format("%Y-%m-%d").to_string(),
                    row.description,
                    row.amount,
                    row.direction.as_str(),
                    row.category,
                    batch.account_id,
                    row.fingerprint,
                    import_id,
                ])?;
                if changed == 0 {
                    conflicts += 1;
                } else {
                    imported += 1;
                }
            }
        }
        if conflicts > 0 {
            debug!(conflicts, "rows already present at commit time");
        }

        let duplicate_count = batch.duplicate_count + conflicts;
        tx.execute(
            "UPDATE importacoes_log SET imported_count = ?1, duplicate_count = ?2 WHERE id = ?3",
            rusqlite::params![imported as i64, duplicate_count as i64, import_id],
        )?;
        let timestamp: String = tx.query_row(
            "SELECT created_at FROM importacoes_log WHERE id = ?1",
            [import_id],
            |r| r.get(0),
        )?;
        tx.commit()?;

        Ok(ImportLog {
            file_name: batch.file_name.to_string(),
            file_type: batch.file_type,
            imported_count: imported,
            duplicate_count,
            skipped_count: batch.skipped_count,
            timestamp,
        })
    }

    fn import_history(&self, limit: usize) -> Result<Vec<ImportLog>> {
        let mut stmt = self.prepare(
            "SELECT file_name, file_type, imported_count, duplicate_count, skipped_count, created_at \
             FROM importacoes_log ORDER BY id DESC LIMIT ?1",
        )?;
        let logs = stmt
            .query_map([limit as i64], |row| {
                Ok(ImportLog {
                    file_name: row.get(0)?,
                    file_type: parse_file_type(&row.get::<_, String>(1)?)?,
                    imported_count: row.get::<_, i64>(2)? as usize,
                    duplicate_count: row.get::<_, i64>(3)? as usize,
                    skipped_count: row.get::<_, i64>(4)? as usize,
                    timestamp: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::fingerprint::fingerprint;
    use crate::models::Direction;
    use chrono::NaiveDate;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn txn(day: u32, description: &str, amount: f64) -> ImportedTransaction {
        let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        ImportedTransaction {
            date,
            description: description.to_string(),
            amount: amount.abs(),
            direction: Direction::from_amount(amount),
            fingerprint: fingerprint(date, description, amount, None),
            is_duplicate: false,
            is_selected: true,
            category: "Outros".to_string(),
        }
    }

    fn batch<'a>(rows: &'a [ImportedTransaction]) -> CommitBatch<'a> {
        CommitBatch {
            file_name: "extrato.csv",
            file_type: FileType::Csv,
            account_id: None,
            rows: rows.iter().collect(),
            duplicate_count: 0,
            skipped_count: 1,
        }
    }

    #[test]
    fn test_commit_inserts_rows_and_log() {
        let (_dir, conn) = test_db();
        let rows = vec![txn(1, "Padaria", -10.0), txn(2, "Salario", 3000.0)];
        let log = conn.commit_import(&batch(&rows)).unwrap();
        assert_eq!(log.imported_count, 2);
        assert_eq!(log.duplicate_count, 0);
        assert_eq!(log.skipped_count, 1);

        let count: i64 = conn.query_row("SELECT count(*) FROM transacoes", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 2);
        let tipo: String = conn
            .query_row("SELECT tipo FROM transacoes WHERE descricao = 'Padaria'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(tipo, "saida");
    }

    #[test]
    fn test_existing_fingerprints() {
        let (_dir, conn) = test_db();
        let rows = vec![txn(1, "Padaria", -10.0)];
        conn.commit_import(&batch(&rows)).unwrap();
        let other = txn(2, "Outra", -1.0);
        let found = conn
            .existing_fingerprints(&[rows[0].fingerprint.clone(), other.fingerprint.clone()])
            .unwrap();
        assert!(found.contains(&rows[0].fingerprint));
        assert!(!found.contains(&other.fingerprint));
        assert!(conn.existing_fingerprints(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_racing_commit_inserts_once() {
        let (_dir, conn) = test_db();
        let rows = vec![txn(1, "Padaria", -10.0), txn(2, "Mercado", -20.0)];
        // Both sessions previewed before either committed.
        let first = conn.commit_import(&batch(&rows)).unwrap();
        let second = conn.commit_import(&batch(&rows)).unwrap();
        assert_eq!(first.imported_count, 2);
        assert_eq!(second.imported_count, 0);
        assert_eq!(second.duplicate_count, 2);
        let count: i64 = conn.query_row("SELECT count(*) FROM transacoes", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_duplicate_row_in_batch_rolls_back() {
        let (_dir, conn) = test_db();
        let mut dup = txn(2, "Mercado", -20.0);
        dup.is_duplicate = true;
        let rows = vec![txn(1, "Padaria", -10.0), dup];
        assert!(conn.commit_import(&batch(&rows)).is_err());
        let count: i64 = conn.query_row("SELECT count(*) FROM transacoes", [], |r| r.get(0)).unwrap();
        let logs: i64 = conn.query_row("SELECT count(*) FROM importacoes_log", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 0);
        assert_eq!(logs, 0);
    }

    #[test]
    fn test_import_history_newest_first() {
        let (_dir, conn) = test_db();
        let a = vec![txn(1, "A", -1.0)];
        let b = vec![txn(2, "B", -1.0)];
        conn.commit_import(&batch(&a)).unwrap();
        let mut second = batch(&b);
        second.file_name = "fatura.ofx";
        second.file_type = FileType::Ofx;
        conn.commit_import(&second).unwrap();

        let history = conn.import_history(10).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].file_name, "fatura.ofx");
        assert_eq!(history[0].file_type, FileType::Ofx);
        assert_eq!(conn.import_history(1).unwrap().len(), 1);
    }
}
