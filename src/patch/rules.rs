use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::fs;
use std::path::Path;

/// Field key -> authoritative figure to write, for one update operation.
/// Fields missing from the map are never searched for.
pub type FieldValues = IndexMap<String, f64>;

/// Field key -> ordered candidate phrases, matched as lowercase substrings
/// against cell text. Table order is the tie-break when one cell could match
/// several fields; phrase order is the tie-break within a field.
#[derive(Debug, Clone)]
pub struct FieldRules {
    patterns: IndexMap<String, Vec<String>>,
}

impl FieldRules {
    /// Phrases are stored lowercase and trimmed; blank phrases are dropped.
    pub fn new(patterns: IndexMap<String, Vec<String>>) -> Self {
        let patterns = patterns
            .into_iter()
            .map(|(field, phrases)| {
                let phrases = phrases
                    .into_iter()
                    .map(|phrase| phrase.trim().to_lowercase())
                    .filter(|phrase| !phrase.is_empty())
                    .collect();
                (field, phrases)
            })
            .collect();

        Self { patterns }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let patterns: IndexMap<String, Vec<String>> = serde_json::from_str(json)
            .context("Rules file must map field names to phrase lists")?;
        Ok(Self::new(patterns))
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file: {}", path.display()))?;
        Self::from_json_str(&contents)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }

    /// Candidate phrases for `field`, in priority order. Unknown fields have
    /// no phrases and therefore never match.
    pub fn phrases(&self, field: &str) -> &[String] {
        self.patterns.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for FieldRules {
    /// Built-in vocabulary for the statement line items SEC filings report
    /// most prominently. Broader phrases come before narrower ones since the
    /// first match wins.
    fn default() -> Self {
        let table: [(&str, &[&str]); 4] = [
            (
                "revenue",
                &["revenue", "net revenue", "total revenue", "sales", "net sales"],
            ),
            (
                "net_income",
                &["net income", "net profit", "net earnings", "profit", "earnings"],
            ),
            ("total_assets", &["total assets", "assets"]),
            ("cash", &["cash", "cash and cash equivalents"]),
        ];

        let mut patterns = IndexMap::new();
        for (field, phrases) in table {
            patterns.insert(
                field.to_string(),
                phrases.iter().map(|phrase| phrase.to_string()).collect(),
            );
        }

        Self { patterns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_keeps_declaration_order() {
        let rules = FieldRules::default();
        let fields: Vec<&str> = rules.fields().collect();
        assert_eq!(fields, ["revenue", "net_income", "total_assets", "cash"]);
    }

    #[test]
    fn phrases_are_ordered_and_lowercase() {
        let rules = FieldRules::default();
        assert_eq!(rules.phrases("net_income")[0], "net income");
        assert!(rules.phrases("cash").contains(&"cash and cash equivalents".to_string()));
    }

    #[test]
    fn unknown_field_has_no_phrases() {
        let rules = FieldRules::default();
        assert!(rules.phrases("ebitda").is_empty());
    }

    #[test]
    fn custom_phrases_are_normalized() {
        let mut patterns = IndexMap::new();
        patterns.insert(
            "revenue".to_string(),
            vec!["  Net Sales ".to_string(), "   ".to_string()],
        );

        let rules = FieldRules::new(patterns);
        assert_eq!(rules.phrases("revenue"), ["net sales"]);
    }

    #[test]
    fn parses_rules_from_json() {
        let rules =
            FieldRules::from_json_str(r#"{"gross_margin": ["gross margin", "Gross Profit"]}"#)
                .unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.phrases("gross_margin"), ["gross margin", "gross profit"]);
    }

    #[test]
    fn rejects_malformed_rules_json() {
        assert!(FieldRules::from_json_str(r#"{"revenue": "not a list"}"#).is_err());
    }
}
