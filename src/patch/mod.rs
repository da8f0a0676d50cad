mod applier;
mod resolver;
mod rules;
mod scanner;

pub use applier::{CellLocation, ChangeRecord, apply_patch};
pub use resolver::resolve_value_cell;
pub use rules::{FieldRules, FieldValues};
pub use scanner::{COL_LIMIT, ROW_LIMIT, ScanBounds};

use crate::excel::Sheet;

/// One update operation: walk the bounded scan region row by row looking for
/// field labels, resolve each label's value cell, and overwrite it with the
/// supplied figure. Patches land as labels are found, so a later label can
/// observe an earlier write.
///
/// Each field matches at most once (first label in row-major order wins) and
/// each cell claims at most one field. Records come back in discovery order.
/// The sheet is mutated in place; a field whose vocabulary never appears
/// simply produces no record.
pub fn apply_field_values(
    sheet: &mut Sheet,
    rules: &FieldRules,
    values: &FieldValues,
) -> Vec<ChangeRecord> {
    let bounds = ScanBounds::clamped_to(sheet);
    let mut unclaimed = scanner::searchable_fields(rules, values);
    let mut changes = Vec::with_capacity(unclaimed.len());

    'scan: for row in 1..=bounds.max_row {
        for col in 1..=bounds.max_col {
            if unclaimed.is_empty() {
                break 'scan;
            }

            let Some(text) = scanner::normalized_text(sheet, row, col) else {
                continue;
            };
            let Some(field) = scanner::claim_match(&text, rules, &mut unclaimed) else {
                continue;
            };

            let (value_row, value_col) = resolve_value_cell(sheet, row, col);
            if let Some(&figure) = values.get(field) {
                changes.push(apply_patch(sheet, field, value_row, value_col, figure));
            }
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excel::Cell;
    use serde_json::json;

    fn sheet_with(cells: &[(usize, usize, &str)]) -> Sheet {
        let mut sheet = Sheet::new("Sheet1");
        for (row, col, value) in cells {
            sheet.set_cell(*row, *col, Cell::new((*value).to_string(), false));
        }
        sheet
    }

    fn values(entries: &[(&str, f64)]) -> FieldValues {
        entries
            .iter()
            .map(|(field, figure)| (field.to_string(), *figure))
            .collect()
    }

    #[test]
    fn patches_numeric_cell_right_of_label() {
        let mut sheet = sheet_with(&[(5, 2, "Total Revenue"), (5, 3, "50000")]);
        let changes =
            apply_field_values(&mut sheet, &FieldRules::default(), &values(&[("revenue", 94836.0)]));

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "Revenue");
        assert_eq!(changes[0].location, CellLocation { row: 5, col: 3 });
        assert_eq!(changes[0].old, json!(50000));
        assert_eq!(changes[0].new, json!(94836));
    }

    #[test]
    fn falls_back_to_cell_below_when_right_is_empty() {
        let mut sheet = sheet_with(&[(7, 1, "Net Income"), (8, 1, "200")]);
        let changes = apply_field_values(
            &mut sheet,
            &FieldRules::default(),
            &values(&[("net_income", 20721.0)]),
        );

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].location, CellLocation { row: 8, col: 1 });
        assert_eq!(changes[0].old, json!(200));
        assert_eq!(changes[0].new, json!(20721));
    }

    #[test]
    fn field_without_matching_label_yields_no_record() {
        let mut sheet = sheet_with(&[(2, 1, "Cash"), (2, 2, "100")]);
        let changes = apply_field_values(
            &mut sheet,
            &FieldRules::default(),
            &values(&[("cash", 29965.0), ("total_assets", 352755.0)]),
        );

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "Cash");
    }

    #[test]
    fn at_most_one_record_per_field() {
        // Two cells both say "revenue"; only the first in row-major order
        // is treated as canonical.
        let mut sheet = sheet_with(&[
            (2, 1, "Revenue"),
            (2, 2, "10"),
            (6, 1, "Revenue"),
            (6, 2, "20"),
        ]);
        let changes =
            apply_field_values(&mut sheet, &FieldRules::default(), &values(&[("revenue", 94836.0)]));

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].location, CellLocation { row: 2, col: 2 });
        assert_eq!(sheet.cell(6, 2).map(|c| c.value.as_str()), Some("20"));
    }

    #[test]
    fn records_follow_scan_order_not_value_order() {
        let mut sheet = sheet_with(&[
            (3, 1, "Cash"),
            (3, 2, "5"),
            (9, 1, "Revenue"),
            (9, 2, "7"),
        ]);
        // "revenue" listed first in the values; "Cash" sits higher on the
        // sheet and must come first in the log.
        let changes = apply_field_values(
            &mut sheet,
            &FieldRules::default(),
            &values(&[("revenue", 94836.0), ("cash", 29965.0)]),
        );

        let fields: Vec<&str> = changes.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, ["Cash", "Revenue"]);
    }

    #[test]
    fn fields_absent_from_values_are_not_searched() {
        let mut sheet = sheet_with(&[(1, 1, "Total Revenue"), (1, 2, "50000")]);
        let changes =
            apply_field_values(&mut sheet, &FieldRules::default(), &values(&[("cash", 29965.0)]));

        assert!(changes.is_empty());
        assert_eq!(sheet.cell(1, 2).map(|c| c.value.as_str()), Some("50000"));
    }

    #[test]
    fn labels_beyond_scan_bounds_are_never_found() {
        let mut sheet = sheet_with(&[(51, 1, "Total Revenue"), (51, 2, "50000")]);
        let changes =
            apply_field_values(&mut sheet, &FieldRules::default(), &values(&[("revenue", 94836.0)]));

        assert!(changes.is_empty());
    }

    #[test]
    fn labels_beyond_column_bounds_are_never_found() {
        let mut sheet = sheet_with(&[(1, 21, "Cash"), (1, 22, "10")]);
        let changes =
            apply_field_values(&mut sheet, &FieldRules::default(), &values(&[("cash", 29965.0)]));

        assert!(changes.is_empty());
    }

    #[test]
    fn one_cell_claims_only_the_first_matching_field() {
        // The first cell matches both the net_income and total_assets
        // vocabularies; net_income sits earlier in the table and claims it,
        // so total_assets keeps scanning and finds its own label below.
        let mut sheet = sheet_with(&[
            (2, 1, "Profit / Total Assets"),
            (2, 2, "40"),
            (5, 1, "Assets"),
            (5, 2, "60"),
        ]);
        let changes = apply_field_values(
            &mut sheet,
            &FieldRules::default(),
            &values(&[("net_income", 20721.0), ("total_assets", 352755.0)]),
        );

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].field, "Net Income");
        assert_eq!(changes[0].location, CellLocation { row: 2, col: 2 });
        assert_eq!(changes[1].field, "Total Assets");
        assert_eq!(changes[1].location, CellLocation { row: 5, col: 2 });
    }

    #[test]
    fn repeated_application_is_stable() {
        let mut sheet = sheet_with(&[(5, 2, "Total Revenue"), (5, 3, "50000")]);
        let rules = FieldRules::default();
        let figures = values(&[("revenue", 94836.0)]);

        let first = apply_field_values(&mut sheet, &rules, &figures);
        let second = apply_field_values(&mut sheet, &rules, &figures);

        assert_eq!(second.len(), 1);
        assert_eq!(second[0].old, first[0].new);
        assert_eq!(second[0].new, first[0].new);
        assert_eq!(second[0].location, first[0].location);
    }

    #[test]
    fn last_resort_overwrites_text_below_label() {
        // Right cell is text, below cell is text: the below cell is still
        // written; there is no third candidate and no skip.
        let mut sheet = sheet_with(&[(4, 4, "Profit"), (4, 5, "n/a"), (5, 4, "see note 3")]);
        let changes = apply_field_values(
            &mut sheet,
            &FieldRules::default(),
            &values(&[("net_income", 126.0)]),
        );

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].location, CellLocation { row: 5, col: 4 });
        assert_eq!(changes[0].old, json!("see note 3"));
        assert_eq!(sheet.cell(5, 4).map(|c| c.value.as_str()), Some("126"));
    }

    #[test]
    fn label_in_last_scanned_row_can_patch_one_row_past_bounds() {
        let mut sheet = sheet_with(&[(50, 1, "Net Income")]);
        sheet.set_cell(50, 20, Cell::new("x".to_string(), false));
        let changes = apply_field_values(
            &mut sheet,
            &FieldRules::default(),
            &values(&[("net_income", 20721.0)]),
        );

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].location, CellLocation { row: 51, col: 1 });
    }
}
