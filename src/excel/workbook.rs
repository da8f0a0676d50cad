use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::Local;
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};
use std::path::{Path, PathBuf};

use crate::excel::{Cell, CellType, DataTypeInfo, Sheet};

/// An Excel file loaded into memory. The patch operation runs against the
/// first sheet; the remaining sheets ride along and are written back as-is.
pub struct Workbook {
    sheets: Vec<Sheet>,
    file_path: PathBuf,
}

pub fn open_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook> {
    let path_ref = path.as_ref();

    let mut workbook = open_workbook_auto(path_ref)
        .with_context(|| format!("Unable to parse Excel file: {}", path_ref.display()))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for name in &sheet_names {
        let range = workbook
            .worksheet_range(name)
            .with_context(|| format!("Unable to read worksheet: {}", name))?;

        sheets.push(create_sheet_from_range(name, range));
    }

    if sheets.is_empty() {
        anyhow::bail!("No worksheets found in file");
    }

    Ok(Workbook {
        sheets,
        file_path: path_ref.to_path_buf(),
    })
}

fn create_sheet_from_range(name: &str, range: calamine::Range<Data>) -> Sheet {
    let (height, width) = range.get_size();

    // Empty grid with an extra row/column of padding for 1-based indexing
    let mut data = vec![vec![Cell::empty(); width + 1]; height + 1];

    for (row_idx, col_idx, cell) in range.used_cells() {
        let (value, cell_type, original_type) = match cell {
            Data::Empty => (String::new(), CellType::Empty, Some(DataTypeInfo::Empty)),

            Data::String(s) => (s.clone(), CellType::Text, Some(DataTypeInfo::String)),

            Data::Float(f) => {
                let value = if *f == (*f as i64) as f64 && f.abs() < 1e10 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                };
                (value, CellType::Number, Some(DataTypeInfo::Float(*f)))
            }

            Data::Int(i) => (i.to_string(), CellType::Number, Some(DataTypeInfo::Int(*i))),

            Data::Bool(b) => (
                if *b {
                    "TRUE".to_string()
                } else {
                    "FALSE".to_string()
                },
                CellType::Boolean,
                Some(DataTypeInfo::Bool(*b)),
            ),

            Data::Error(e) => (
                format!("Error: {:?}", e),
                CellType::Text,
                Some(DataTypeInfo::Error),
            ),

            Data::DateTime(dt) => (
                dt.as_f64().to_string(),
                CellType::Date,
                Some(DataTypeInfo::DateTime(dt.as_f64())),
            ),

            Data::DateTimeIso(s) => (
                s.clone(),
                CellType::Date,
                Some(DataTypeInfo::DateTimeIso(s.clone())),
            ),

            Data::DurationIso(s) => (
                s.clone(),
                CellType::Text,
                Some(DataTypeInfo::DurationIso(s.clone())),
            ),
        };

        let is_formula = !value.is_empty() && value.starts_with('=');

        data[row_idx + 1][col_idx + 1] =
            Cell::new_with_type(value, is_formula, cell_type, original_type);
    }

    Sheet {
        name: name.to_string(),
        data,
        max_rows: height,
        max_cols: width,
    }
}

impl Workbook {
    /// The sheet the patch operation runs against, mirroring how analysts
    /// keep the statement model on the first tab.
    pub fn first_sheet(&self) -> &Sheet {
        &self.sheets[0]
    }

    pub fn first_sheet_mut(&mut self) -> &mut Sheet {
        &mut self.sheets[0]
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|sheet| sheet.name.clone()).collect()
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Write every sheet to `output`, or to a timestamped `_updated` copy
    /// beside the input when no path is given. Always writes `.xlsx`
    /// regardless of the input format. Returns the path written.
    pub fn save(&self, output: Option<&Path>) -> Result<PathBuf> {
        let out_path = match output {
            Some(path) => path.to_path_buf(),
            None => {
                let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
                let file_stem = self
                    .file_path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("sheet");
                let parent_dir = self.file_path.parent().unwrap_or_else(|| Path::new(""));
                parent_dir.join(format!("{}_updated_{}.xlsx", file_stem, timestamp))
            }
        };

        let mut workbook = XlsxWorkbook::new();

        let number_format = Format::new().set_num_format("General");
        let date_format = Format::new().set_num_format("yyyy-mm-dd");

        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet().set_name(&sheet.name)?;

            for col in 0..sheet.max_cols {
                worksheet.set_column_width(col as u16, 15)?;
            }

            for row in 1..sheet.data.len() {
                if row > sheet.max_rows {
                    break;
                }

                for col in 1..sheet.data[row].len() {
                    if col > sheet.max_cols {
                        break;
                    }

                    let cell = &sheet.data[row][col];
                    if cell.value.is_empty() {
                        continue;
                    }

                    let row_idx = (row - 1) as u32;
                    let col_idx = (col - 1) as u16;

                    match cell.cell_type {
                        CellType::Number => {
                            if let Ok(num) = cell.value.parse::<f64>() {
                                worksheet.write_number_with_format(
                                    row_idx,
                                    col_idx,
                                    num,
                                    &number_format,
                                )?;
                            } else {
                                worksheet.write_string(row_idx, col_idx, &cell.value)?;
                            }
                        }
                        CellType::Date => {
                            worksheet.write_string_with_format(
                                row_idx,
                                col_idx,
                                &cell.value,
                                &date_format,
                            )?;
                        }
                        CellType::Boolean => {
                            if let Ok(b) = cell.value.to_lowercase().parse::<bool>() {
                                worksheet.write_boolean(row_idx, col_idx, b)?;
                            } else {
                                worksheet.write_string(row_idx, col_idx, &cell.value)?;
                            }
                        }
                        CellType::Text => {
                            if cell.is_formula {
                                let formula = rust_xlsxwriter::Formula::new(&cell.value);
                                worksheet.write_formula(row_idx, col_idx, formula)?;
                            } else {
                                worksheet.write_string(row_idx, col_idx, &cell.value)?;
                            }
                        }
                        CellType::Empty => {}
                    }
                }
            }
        }

        workbook
            .save(&out_path)
            .with_context(|| format!("Failed to write workbook: {}", out_path.display()))?;

        Ok(out_path)
    }
}
