use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::fs;
use std::path::Path;

use crate::patch::FieldValues;

/// Latest filed figures for one company, in millions of USD. `fiscal_year`
/// is display metadata only and is never searched for on the sheet.
#[derive(Debug, Clone)]
pub struct CompanyFigures {
    pub fiscal_year: String,
    pub values: FieldValues,
}

/// Figures lifted from the most recent filings of the companies the tool
/// ships with.
pub fn builtin_figures() -> IndexMap<String, CompanyFigures> {
    let mut companies = IndexMap::new();

    companies.insert(
        "AAPL".to_string(),
        CompanyFigures {
            fiscal_year: "2024".to_string(),
            values: figures(&[
                ("revenue", 94836.0),
                ("net_income", 20721.0),
                ("total_assets", 352755.0),
                ("cash", 29965.0),
            ]),
        },
    );

    companies.insert(
        "COTY".to_string(),
        CompanyFigures {
            fiscal_year: "2024".to_string(),
            values: figures(&[
                ("revenue", 5683.0),
                ("net_income", 126.0),
                ("total_assets", 11234.0),
                ("cash", 287.0),
            ]),
        },
    );

    companies
}

fn figures(entries: &[(&str, f64)]) -> FieldValues {
    entries
        .iter()
        .map(|(field, value)| (field.to_string(), *value))
        .collect()
}

pub fn for_ticker(ticker: &str) -> Option<CompanyFigures> {
    builtin_figures().shift_remove(&ticker.to_uppercase())
}

pub fn known_tickers() -> Vec<String> {
    builtin_figures().keys().cloned().collect()
}

/// Caller-supplied figures: a flat JSON object of field name -> number.
pub fn load_values_file(path: &Path) -> Result<FieldValues> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read values file: {}", path.display()))?;

    serde_json::from_str(&contents).with_context(|| {
        format!(
            "Values file must map field names to numbers: {}",
            path.display()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_data_covers_the_shipped_tickers() {
        let companies = builtin_figures();
        assert_eq!(companies.len(), 2);
        assert!(companies.contains_key("AAPL"));
        assert!(companies.contains_key("COTY"));
    }

    #[test]
    fn aapl_figures_match_the_filing() {
        let company = for_ticker("AAPL").unwrap();
        assert_eq!(company.fiscal_year, "2024");
        assert_eq!(company.values["revenue"], 94836.0);
        assert_eq!(company.values["net_income"], 20721.0);
        assert_eq!(company.values["total_assets"], 352755.0);
        assert_eq!(company.values["cash"], 29965.0);
    }

    #[test]
    fn ticker_lookup_is_case_insensitive() {
        assert!(for_ticker("coty").is_some());
        assert!(for_ticker("TSLA").is_none());
    }
}
