use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::cell::{Cell, CellValue};
use crate::range::CellRef;
use crate::style::StyleBundle;
use crate::validation::ValidationRule;

/// The worksheet being split, fully materialized in memory.
///
/// Rows and columns are 1-based; row 1 is the header. Cells absent from the
/// map are empty and unstyled.
#[derive(Debug, Clone)]
pub struct SourceSheet {
    pub name: String,
    row_count: u32,
    col_count: u16,
    /// Column -> width in Excel character units. `None` keeps the default width.
    pub col_widths: BTreeMap<u16, Option<f64>>,
    pub validations: Vec<ValidationRule>,
    cells: FxHashMap<CellRef, Cell>,
}

impl SourceSheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            row_count: 1,
            col_count: 1,
            col_widths: BTreeMap::new(),
            validations: Vec::new(),
            cells: FxHashMap::default(),
        }
    }

    /// Rows including the header (always >= 1).
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// Columns (always >= 1).
    pub fn col_count(&self) -> u16 {
        self.col_count
    }

    /// Data rows below the header.
    pub fn data_row_count(&self) -> u32 {
        self.row_count - 1
    }

    /// Grow the sheet's extent to at least `rows` x `cols`.
    pub fn extend_to(&mut self, rows: u32, cols: u16) {
        self.row_count = self.row_count.max(rows);
        self.col_count = self.col_count.max(cols);
    }

    pub fn set_value(&mut self, row: u32, col: u16, value: CellValue) {
        if row == 0 || col == 0 {
            return;
        }
        self.cells.entry(CellRef::new(row, col)).or_default().value = value;
        self.extend_to(row, col);
    }

    pub fn set_style(&mut self, row: u32, col: u16, style: StyleBundle) {
        if row == 0 || col == 0 {
            return;
        }
        self.cells.entry(CellRef::new(row, col)).or_default().style = style;
        self.extend_to(row, col);
    }

    pub fn set_cell(&mut self, row: u32, col: u16, cell: Cell) {
        if row == 0 || col == 0 {
            return;
        }
        self.cells.insert(CellRef::new(row, col), cell);
        self.extend_to(row, col);
    }

    pub fn set_col_width(&mut self, col: u16, width: Option<f64>) {
        self.col_widths.insert(col, width);
    }

    /// Borrow a stored cell, if any.
    pub fn get(&self, row: u32, col: u16) -> Option<&Cell> {
        self.cells.get(&CellRef::new(row, col))
    }

    /// An owned copy of the cell at (row, col); empty cells come back default.
    pub fn cell(&self, row: u32, col: u16) -> Cell {
        self.get(row, col).cloned().unwrap_or_default()
    }

    /// All cells of one row as owned copies, one per column.
    pub fn row(&self, row: u32) -> Vec<Cell> {
        (1..=self.col_count).map(|col| self.cell(row, col)).collect()
    }

    /// Number of stored (non-default) cells.
    pub fn stored_cells(&self) -> usize {
        self.cells.len()
    }

    /// Give every stored cell that has no explicit style the workbook's
    /// base style.
    pub fn apply_base_style(&mut self, base: &StyleBundle) {
        for cell in self.cells.values_mut() {
            if cell.style.is_default() {
                cell.style = base.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_tracks_writes() {
        let mut sheet = SourceSheet::new("Data");
        assert_eq!((sheet.row_count(), sheet.col_count()), (1, 1));
        assert_eq!(sheet.data_row_count(), 0);

        sheet.set_value(10, 3, CellValue::Number(1.0));
        assert_eq!((sheet.row_count(), sheet.col_count()), (10, 3));

        let mut style = StyleBundle::default();
        style.font.bold = true;
        sheet.set_style(12, 1, style);
        assert_eq!(sheet.row_count(), 12);
        assert_eq!(sheet.data_row_count(), 11);
    }

    #[test]
    fn test_cell_returns_owned_copy() {
        let mut sheet = SourceSheet::new("Data");
        let mut style = StyleBundle::default();
        style.font.name = Some("Calibri".into());
        sheet.set_cell(1, 1, Cell::new(CellValue::Text("Name".into())).with_style(style));

        let mut copy = sheet.cell(1, 1);
        copy.style.font.name = Some("Arial".into());
        assert_eq!(sheet.get(1, 1).unwrap().style.font.name.as_deref(), Some("Calibri"));

        assert_eq!(sheet.cell(5, 5), Cell::default());
    }

    #[test]
    fn test_row_spans_all_columns() {
        let mut sheet = SourceSheet::new("Data");
        sheet.set_value(1, 1, CellValue::Text("a".into()));
        sheet.set_value(1, 4, CellValue::Text("d".into()));
        let row = sheet.row(1);
        assert_eq!(row.len(), 4);
        assert!(row[1].is_blank());
        assert_eq!(row[3].value, CellValue::Text("d".into()));
    }

    #[test]
    fn test_zero_coordinates_ignored() {
        let mut sheet = SourceSheet::new("Data");
        sheet.set_value(0, 1, CellValue::Bool(true));
        assert_eq!(sheet.stored_cells(), 0);
    }

    #[test]
    fn test_apply_base_style_keeps_explicit_styles() {
        let mut sheet = SourceSheet::new("Data");
        let mut bold = StyleBundle::default();
        bold.font.bold = true;
        sheet.set_value(1, 1, CellValue::Text("plain".into()));
        sheet.set_cell(1, 2, Cell::new(CellValue::Text("bold".into())).with_style(bold.clone()));

        let mut base = StyleBundle::default();
        base.font.name = Some("Arial".into());
        sheet.apply_base_style(&base);

        assert_eq!(sheet.cell(1, 1).style, base);
        assert_eq!(sheet.cell(1, 2).style, bold);
        // cells never stored stay default
        assert!(sheet.cell(5, 5).style.is_default());
    }
}
