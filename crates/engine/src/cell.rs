use serde::{Deserialize, Serialize};

use crate::style::StyleBundle;

/// A cell value as stored in the workbook. Formulas are never evaluated:
/// the source text and the cached result travel together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel serial date (days since 1899-12-30, fractional part = time).
    DateTime(f64),
    /// Error literal such as `#N/A` or `#DIV/0!`.
    Error(String),
    Formula {
        /// Formula text without the leading '='.
        source: String,
        /// Last calculated result as text, if the file carried one.
        cached: Option<String>,
    },
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, CellValue::Formula { .. })
    }

    /// Display text of the value (cached result for formulas).
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) | CellValue::DateTime(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Error(e) => e.clone(),
            CellValue::Formula { cached, .. } => cached.clone().unwrap_or_default(),
        }
    }
}

/// A cell's value together with its full style, both owned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub value: CellValue,
    pub style: StyleBundle,
}

impl Cell {
    pub fn new(value: CellValue) -> Self {
        Self { value, style: StyleBundle::default() }
    }

    pub fn with_style(mut self, style: StyleBundle) -> Self {
        self.style = style;
        self
    }

    /// True when the writer can skip the cell entirely.
    pub fn is_blank(&self) -> bool {
        self.value.is_empty() && self.style.is_default()
    }
}
