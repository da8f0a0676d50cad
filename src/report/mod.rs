mod convert;

pub use convert::cell_to_value;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use crate::patch::{ChangeRecord, FieldValues};

/// Caller-facing result of one update operation, shaped for JSON output.
/// Records stay in the order the labels were discovered; `field_values`
/// passes the applied figures back through for display.
#[derive(Serialize)]
pub struct UpdateReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal_year: Option<String>,
    pub changes_count: usize,
    pub changes: Vec<ChangeRecord>,
    pub field_values: FieldValues,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl UpdateReport {
    pub fn new(
        ticker: Option<String>,
        fiscal_year: Option<String>,
        changes: Vec<ChangeRecord>,
        field_values: FieldValues,
        output: Option<&Path>,
    ) -> Self {
        Self {
            ticker,
            fiscal_year,
            changes_count: changes.len(),
            changes,
            field_values,
            output: output.map(|path| path.display().to_string()),
        }
    }
}

pub fn serialize_to_json<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data).context("Failed to serialize data to JSON")
}
