use regex::Regex;
use rusqlite::Connection;

use crate::error::{FinanceError, Result};
use crate::keywords::ImportKeywords;
use crate::models::CategoryRule;

pub const MATCH_TYPES: &[&str] = &["contains", "starts_with", "regex"];

fn matches(description: &str, pattern: &str, match_type: &str) -> bool {
    let desc_upper = description.to_uppercase();
    let pat_upper = pattern.to_uppercase();
    match match_type {
        "contains" => desc_upper.contains(&pat_upper),
        "starts_with" => desc_upper.starts_with(&pat_upper),
        "regex" => Regex::new(pattern)
            .map(|re| re.is_match(description))
            .unwrap_or(false),
        _ => false,
    }
}

/// User rules first (highest priority wins), then the keyword buckets, then
/// the default category.
pub struct Categorizer {
    rules: Vec<CategoryRule>,
    keywords: ImportKeywords,
}

impl Categorizer {
    pub fn new(rules: Vec<CategoryRule>, keywords: ImportKeywords) -> Self {
        let mut rules = rules;
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self { rules, keywords }
    }

    pub fn load(conn: &Connection, keywords: ImportKeywords) -> Result<Self> {
        Ok(Self::new(list_rules(conn)?, keywords))
    }

    pub fn matching_rule(&self, description: &str) -> Option<&CategoryRule> {
        self.rules
            .iter()
            .find(|r| matches(description, &r.pattern, &r.match_type))
    }

    pub fn categorize(&self, description: &str) -> String {
        match self.matching_rule(description) {
            Some(rule) => rule.category.clone(),
            None => self.keywords.bucket_for(description).to_string(),
        }
    }

    pub fn default_category(&self) -> &str {
        &self.keywords.default_category
    }
}

// ---------------------------------------------------------------------------
// Rule storage
// ---------------------------------------------------------------------------

pub fn add_rule(
    conn: &Connection,
    pattern: &str,
    match_type: &str,
    category: &str,
    priority: i64,
) -> Result<i64> {
    if !MATCH_TYPES.contains(&match_type) {
        return Err(FinanceError::Invalid(format!(
            "match type must be one of {}, got '{match_type}'",
            MATCH_TYPES.join(", ")
        )));
    }
    if match_type == "regex" {
        Regex::new(pattern).map_err(|e| FinanceError::Invalid(format!("invalid regex: {e}")))?;
    }
    conn.execute(
        "INSERT INTO regras_categoria (pattern, match_type, categoria, priority) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![pattern, match_type, category, priority],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_rules(conn: &Connection) -> Result<Vec<CategoryRule>> {
    let mut stmt = conn.prepare(
        "SELECT id, pattern, match_type, categoria, priority, hit_count FROM regras_categoria \
         WHERE is_active = 1 ORDER BY priority DESC, id",
    )?;
    let rules = stmt
        .query_map([], |row| {
            Ok(CategoryRule {
                id: row.get(0)?,
                pattern: row.get(1)?,
                match_type: row.get(2)?,
                category: row.get(3)?,
                priority: row.get(4)?,
                hit_count: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rules)
}

/// Deactivate a rule; it stays in the table for history.
pub fn delete_rule(conn: &Connection, id: i64) -> Result<()> {
    let changed = conn.execute(
        "UPDATE regras_categoria SET is_active = 0 WHERE id = ?1 AND is_active = 1",
        [id],
    )?;
    if changed == 0 {
        return Err(FinanceError::UnknownRule(id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Re-categorization of stored transactions
// ---------------------------------------------------------------------------

pub struct CategorizeResult {
    pub categorized: usize,
    pub still_default: usize,
}

/// Apply the active rules to stored transactions still in the default
/// category, bumping each rule's hit count.
pub fn categorize_transactions(conn: &Connection, categorizer: &Categorizer) -> Result<CategorizeResult> {
    let mut txn_stmt = conn.prepare("SELECT id, descricao FROM transacoes WHERE categoria = ?1")?;
    let pending: Vec<(i64, String)> = txn_stmt
        .query_map([categorizer.default_category()], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut categorized = 0usize;
    let mut still_default = 0usize;

    for (txn_id, description) in &pending {
        match categorizer.matching_rule(description) {
            Some(rule) => {
                conn.execute(
                    "UPDATE transacoes SET categoria = ?1 WHERE id = ?2",
                    rusqlite::params![rule.category, txn_id],
                )?;
                conn.execute(
                    "UPDATE regras_categoria SET hit_count = hit_count + 1 WHERE id = ?1",
                    [rule.id],
                )?;
                categorized += 1;
            }
            None => still_default += 1,
        }
    }

    Ok(CategorizeResult {
        categorized,
        still_default,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn setup_txns(conn: &Connection, descriptions: &[&str]) {
        for (i, desc) in descriptions.iter().enumerate() {
            conn.execute(
                "INSERT INTO transacoes (data, descricao, valor, tipo, categoria, hash_unico) \
                 VALUES ('2024-03-01', ?1, 50.0, 'saida', 'Outros', ?2)",
                rusqlite::params![desc, format!("hash-{i}")],
            )
            .unwrap();
        }
    }

    fn categorizer(conn: &Connection) -> Categorizer {
        Categorizer::load(conn, ImportKeywords::default()).unwrap()
    }

    #[test]
    fn test_contains_rule() {
        let (_dir, conn) = test_db();
        add_rule(&conn, "netflix", "contains", "Assinaturas", 0).unwrap();
        assert_eq!(categorizer(&conn).categorize("NETFLIX.COM"), "Assinaturas");
    }

    #[test]
    fn test_starts_with_rule() {
        let (_dir, conn) = test_db();
        add_rule(&conn, "PIX ENVIADO", "starts_with", "Família", 0).unwrap();
        let c = categorizer(&conn);
        assert_eq!(c.categorize("PIX ENVIADO MARIA"), "Família");
        assert_eq!(c.categorize("PIX RECEBIDO JOAO"), "Transferência");
    }

    #[test]
    fn test_regex_rule() {
        let (_dir, conn) = test_db();
        add_rule(&conn, r"^AWS.*\d+$", "regex", "Infra", 0).unwrap();
        assert_eq!(categorizer(&conn).categorize("AWS Services 12345"), "Infra");
    }

    #[test]
    fn test_higher_priority_wins() {
        let (_dir, conn) = test_db();
        add_rule(&conn, "PAGAMENTO", "contains", "Baixa", 1).unwrap();
        add_rule(&conn, "PAGAMENTO", "contains", "Alta", 10).unwrap();
        assert_eq!(categorizer(&conn).categorize("PAGAMENTO BOLETO"), "Alta");
    }

    #[test]
    fn test_falls_back_to_bucket_then_default() {
        let (_dir, conn) = test_db();
        let c = categorizer(&conn);
        assert_eq!(c.categorize("Supermercado ABC"), "Alimentação");
        assert_eq!(c.categorize("Loja XYZ"), "Outros");
    }

    #[test]
    fn test_add_rule_validates() {
        let (_dir, conn) = test_db();
        assert!(matches!(
            add_rule(&conn, "x", "fuzzy", "Y", 0),
            Err(FinanceError::Invalid(_))
        ));
        assert!(matches!(
            add_rule(&conn, "([", "regex", "Y", 0),
            Err(FinanceError::Invalid(_))
        ));
    }

    #[test]
    fn test_delete_rule_deactivates() {
        let (_dir, conn) = test_db();
        let id = add_rule(&conn, "uber", "contains", "Corridas", 0).unwrap();
        delete_rule(&conn, id).unwrap();
        assert!(list_rules(&conn).unwrap().is_empty());
        assert!(matches!(delete_rule(&conn, id), Err(FinanceError::UnknownRule(_))));
    }

    #[test]
    fn test_categorize_transactions_updates_and_counts_hits() {
        let (_dir, conn) = test_db();
        setup_txns(&conn, &["ADOBE PHOTOSHOP", "ADOBE ILLUSTRATOR", "RANDOM VENDOR"]);
        add_rule(&conn, "ADOBE", "contains", "Software", 0).unwrap();
        let result = categorize_transactions(&conn, &categorizer(&conn)).unwrap();
        assert_eq!(result.categorized, 2);
        assert_eq!(result.still_default, 1);
        let hit_count: i64 = conn
            .query_row("SELECT hit_count FROM regras_categoria LIMIT 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(hit_count, 2);
    }
}
