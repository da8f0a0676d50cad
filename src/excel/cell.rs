#[derive(Clone)]
pub struct Cell {
    pub value: String,
    pub is_formula: bool,
    pub cell_type: CellType,
    pub original_type: Option<DataTypeInfo>,
}

#[derive(Clone, PartialEq)]
pub enum CellType {
    Text,
    Number,
    Date,
    Boolean,
    Empty,
}

/// Source type reported by calamine, kept so values pass through the
/// change log without losing their original representation.
#[derive(Clone, PartialEq)]
pub enum DataTypeInfo {
    Empty,
    String,
    Float(f64),
    Int(i64),
    Bool(bool),
    DateTime(f64),
    DateTimeIso(String),
    DurationIso(String),
    Error,
}

impl Cell {
    pub fn new(value: String, is_formula: bool) -> Self {
        let cell_type = if value.is_empty() {
            CellType::Empty
        } else if is_formula {
            CellType::Text
        } else if value.parse::<f64>().is_ok() {
            CellType::Number
        } else if (value.contains('/') && value.split('/').count() == 3)
            || (value.contains('-') && value.split('-').count() == 3)
        {
            CellType::Date
        } else if value == "true" || value == "false" {
            CellType::Boolean
        } else {
            CellType::Text
        };

        Self::new_with_type(value, is_formula, cell_type, None)
    }

    pub fn new_with_type(
        value: String,
        is_formula: bool,
        cell_type: CellType,
        original_type: Option<DataTypeInfo>,
    ) -> Self {
        Self {
            value,
            is_formula,
            cell_type,
            original_type,
        }
    }

    /// Numeric cell holding an authoritative figure. Integral figures are
    /// rendered without a trailing `.0` so they write back as integers.
    pub fn number(figure: f64) -> Self {
        let value = if figure == figure.trunc() && figure.abs() < 1e10 {
            (figure as i64).to_string()
        } else {
            figure.to_string()
        };

        Self::new_with_type(
            value,
            false,
            CellType::Number,
            Some(DataTypeInfo::Float(figure)),
        )
    }

    pub fn empty() -> Self {
        Self {
            value: String::new(),
            is_formula: false,
            cell_type: CellType::Empty,
            original_type: Some(DataTypeInfo::Empty),
        }
    }

    /// True for cells a line-item figure may already live in: real numeric
    /// values, not text that happens to contain digits.
    pub fn is_numeric(&self) -> bool {
        self.cell_type == CellType::Number
    }
}
