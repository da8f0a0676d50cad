use crate::excel::Sheet;
use crate::patch::rules::{FieldRules, FieldValues};

/// Only the top-left corner of a sheet is scanned. Statement labels live
/// there, and the cap bounds the work on very large sheets; labels beyond
/// these limits are never found.
pub const ROW_LIMIT: usize = 50;
pub const COL_LIMIT: usize = 20;

/// Scan region for one operation, clamped to the sheet's actual extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanBounds {
    pub max_row: usize,
    pub max_col: usize,
}

impl ScanBounds {
    pub fn clamped_to(sheet: &Sheet) -> Self {
        Self {
            max_row: sheet.max_rows.min(ROW_LIMIT),
            max_col: sheet.max_cols.min(COL_LIMIT),
        }
    }
}

/// Fields worth searching for: present in both the rule table and the
/// supplied values, in table order.
pub fn searchable_fields<'a>(rules: &'a FieldRules, values: &FieldValues) -> Vec<&'a str> {
    rules
        .fields()
        .filter(|field| values.contains_key(*field))
        .collect()
}

/// Cell text ready for matching; None for missing, empty and
/// whitespace-only cells, which are skipped without a match attempt.
pub fn normalized_text(sheet: &Sheet, row: usize, col: usize) -> Option<String> {
    let cell = sheet.cell(row, col)?;
    let text = cell.value.to_lowercase();
    let text = text.trim();

    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// First still-unclaimed field with a phrase contained in `text`, honoring
/// table order across fields and list order within a field. The winning
/// field is removed from `unclaimed` so it is never matched twice.
pub fn claim_match<'a>(
    text: &str,
    rules: &FieldRules,
    unclaimed: &mut Vec<&'a str>,
) -> Option<&'a str> {
    let position = unclaimed.iter().position(|field| {
        rules
            .phrases(field)
            .iter()
            .any(|phrase| text.contains(phrase.as_str()))
    })?;

    Some(unclaimed.remove(position))
}
