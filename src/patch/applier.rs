use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::excel::{Cell, Sheet};
use crate::report::cell_to_value;
use crate::utils::cell_reference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellLocation {
    pub row: usize,
    pub col: usize,
}

impl fmt::Display for CellLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", cell_reference((self.row, self.col)))
    }
}

/// One applied patch. `old` holds whatever the target cell contained before
/// the write, `new` the authoritative figure; both are JSON values so the
/// change log serializes without a second conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeRecord {
    pub field: String,
    pub location: CellLocation,
    pub old: Value,
    pub new: Value,
}

/// Overwrite `(row, col)` with `figure` and record the change. The write is
/// unconditional; a cell already holding the figure is rewritten and still
/// produces a record. The target may sit outside the populated grid, in
/// which case the grid grows to reach it.
pub fn apply_patch(
    sheet: &mut Sheet,
    field: &str,
    row: usize,
    col: usize,
    figure: f64,
) -> ChangeRecord {
    sheet.ensure_cell_exists(row, col);
    let old = cell_to_value(&sheet.data[row][col]);

    let cell = Cell::number(figure);
    let new = cell_to_value(&cell);
    sheet.set_cell(row, col, cell);

    ChangeRecord {
        field: display_name(field),
        location: CellLocation { row, col },
        old,
        new,
    }
}

/// Field keys read as `net_income`; the change log shows `Net Income`.
fn display_name(field: &str) -> String {
    field
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
