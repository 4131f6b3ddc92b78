use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::normalize::normalize_text;

/// A named bucket of description keywords used for default categorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBucket {
    pub category: String,
    pub keywords: Vec<String>,
}

/// Keyword tables driving header detection, column resolution, credit/debit
/// typing and default categories. Lists are tried in order; the first hit wins.
/// All entries are compared against accent-folded, lowercased text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportKeywords {
    pub date: Vec<String>,
    pub description: Vec<String>,
    pub value: Vec<String>,
    #[serde(rename = "type")]
    pub kind: Vec<String>,
    pub credit_terms: Vec<String>,
    pub category_buckets: Vec<CategoryBucket>,
    pub default_category: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn bucket(category: &str, keywords: &[&str]) -> CategoryBucket {
    CategoryBucket {
        category: category.to_string(),
        keywords: strings(keywords),
    }
}

impl Default for ImportKeywords {
    fn default() -> Self {
        Self {
            date: strings(&["data", "date", "dt"]),
            description: strings(&[
                "historico",
                "descricao",
                "description",
                "lancamento",
                "estabelecimento",
                "memo",
                "detalhe",
            ]),
            value: strings(&["valor", "value", "amount", "quantia", "montante"]),
            kind: strings(&["tipo", "type", "natureza", "d/c"]),
            credit_terms: strings(&[
                "credito", "credit", "entrada", "receita", "deposito", "c", "cr",
            ]),
            category_buckets: vec![
                bucket(
                    "Alimentação",
                    &["supermercado", "mercado", "padaria", "restaurante", "ifood", "lanchonete", "acougue"],
                ),
                bucket(
                    "Transporte",
                    &["uber", "posto", "combustivel", "estacionamento", "pedagio", "metro", "onibus"],
                ),
                bucket(
                    "Moradia",
                    &["aluguel", "condominio", "energia", "eletric", "saneamento", "internet", "gas"],
                ),
                bucket("Saúde", &["farmacia", "drogaria", "hospital", "clinica", "laboratorio"]),
                bucket("Lazer", &["cinema", "netflix", "spotify", "teatro", "show"]),
                bucket("Salário", &["salario", "folha de pagamento", "proventos"]),
                bucket("Transferência", &["pix", "transferencia", "ted ", "doc "]),
            ],
            default_category: "Outros".to_string(),
        }
    }
}

impl ImportKeywords {
    /// Load from a JSON override file; missing fields fall back to the built-ins.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => {
                let content = std::fs::read_to_string(p)?;
                Ok(serde_json::from_str(&content)?)
            }
            _ => Ok(Self::default()),
        }
    }

    /// True when a normalized type-column cell denotes money coming in.
    /// Short terms (like `c`) must match the whole cell.
    pub fn is_credit(&self, cell: &str) -> bool {
        let cell = normalize_text(cell);
        self.credit_terms.iter().any(|term| {
            if term.len() <= 2 {
                cell == *term
            } else {
                cell.contains(term.as_str())
            }
        })
    }

    /// Built-in category bucket for a description, or the default category.
    pub fn bucket_for(&self, description: &str) -> &str {
        let desc = format!("{} ", normalize_text(description));
        self.category_buckets
            .iter()
            .find(|b| b.keywords.iter().any(|k| desc.contains(k.as_str())))
            .map(|b| b.category.as_str())
            .unwrap_or(&self.default_category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_credit() {
        let kw = ImportKeywords::default();
        assert!(kw.is_credit("Crédito"));
        assert!(kw.is_credit("C"));
        assert!(kw.is_credit("DEPÓSITO"));
        assert!(!kw.is_credit("Débito"));
        assert!(!kw.is_credit("D"));
        assert!(!kw.is_credit("Compra"));
    }

    #[test]
    fn test_bucket_for() {
        let kw = ImportKeywords::default();
        assert_eq!(kw.bucket_for("Supermercado ABC"), "Alimentação");
        assert_eq!(kw.bucket_for("UBER *TRIP"), "Transporte");
        assert_eq!(kw.bucket_for("PIX RECEBIDO"), "Transferência");
        assert_eq!(kw.bucket_for("Loja qualquer"), "Outros");
    }

    #[test]
    fn test_load_partial_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keywords.json");
        std::fs::write(&path, r#"{"value": ["importe"], "default_category": "Misc"}"#).unwrap();
        let kw = ImportKeywords::load(Some(&path)).unwrap();
        assert_eq!(kw.value, vec!["importe".to_string()]);
        assert_eq!(kw.default_category, "Misc");
        assert!(kw.date.contains(&"data".to_string()));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let kw = ImportKeywords::load(Some(Path::new("/nonexistent/keywords.json"))).unwrap();
        assert_eq!(kw.default_category, "Outros");
    }
}
