/// Replace Latin accented letters with their base letter (Portuguese and common
/// Western European set). Other characters pass through unchanged.
pub fn fold_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'ç' => 'c',
            'Ç' => 'C',
            'ñ' => 'n',
            'Ñ' => 'N',
            other => other,
        })
        .collect()
}

/// Accent-fold, lowercase, trim and collapse inner whitespace.
pub fn normalize_text(s: &str) -> String {
    let folded = fold_accents(s.trim_start_matches('\u{feff}')).to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_accents() {
        assert_eq!(fold_accents("Histórico"), "Historico");
        assert_eq!(fold_accents("Descrição"), "Descricao");
        assert_eq!(fold_accents("plain"), "plain");
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Data   Lançamento "), "data lancamento");
        assert_eq!(normalize_text("\u{feff}Data"), "data");
        assert_eq!(normalize_text("SALÁRIO"), "salario");
    }
}
