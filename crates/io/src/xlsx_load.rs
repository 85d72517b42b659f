//! Source workbook loader.
//!
//! Opens an xlsx from bytes, forces every sheet visible, picks the active
//! sheet and materializes it as a [`SourceSheet`]: values and formulas via
//! calamine, styles, column widths and validation rules from the package
//! XML. Nothing is written back; the visibility change only exists in the
//! returned index.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use log::{debug, info, warn};
use sheetsplit_engine::cell::CellValue;
use sheetsplit_engine::style::{Rgb, StyleBundle};
use sheetsplit_engine::SourceSheet;
use zip::ZipArchive;

use crate::error::LoadError;
use crate::xlsx_package::{
    read_optional_part, read_zip_file, WorkbookIndex, STYLES_PART, WORKBOOK_PART,
    WORKBOOK_RELS_PART,
};
use crate::xlsx_styles::{parse_sheet_formatting, parse_styles_xml, StyleTable};
use crate::xlsx_theme::{parse_theme_xml, ThemePalette, THEME_PART};
use crate::xlsx_validation::parse_validations_from_xml;

/// The active sheet plus what loading did to the workbook around it.
#[derive(Debug)]
pub struct LoadedSheet {
    pub sheet: SourceSheet,
    /// Sheets that were hidden or very hidden before loading.
    pub unhidden: Vec<String>,
    /// Number of sheets in the workbook.
    pub sheet_count: usize,
}

/// Load the active sheet of an xlsx workbook.
pub fn load(bytes: &[u8]) -> Result<SourceSheet, LoadError> {
    load_active_sheet(bytes).map(|loaded| loaded.sheet)
}

/// Load the active sheet, also reporting which sheets were unhidden.
pub fn load_active_sheet(bytes: &[u8]) -> Result<LoadedSheet, LoadError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let workbook_xml = read_zip_file(&mut archive, WORKBOOK_PART)?;
    let rels_xml = read_zip_file(&mut archive, WORKBOOK_RELS_PART)?;
    let mut index = WorkbookIndex::parse(&workbook_xml, &rels_xml)?;
    let unhidden = index.force_visible();
    let entry = index.active_sheet().clone();
    debug!("Active sheet '{}' at {}", entry.name, entry.path);

    let sheet_xml = read_zip_file(&mut archive, &entry.path)?;
    let theme_path = index.theme_path.as_deref().unwrap_or(THEME_PART);
    let theme = match read_optional_part(&mut archive, theme_path)? {
        Some(xml) => parse_theme_xml(&xml),
        None => {
            debug!("No theme part at {}, using the default palette", theme_path);
            ThemePalette::default()
        }
    };
    let styles = match read_optional_part(&mut archive, STYLES_PART)? {
        Some(xml) => parse_styles_xml(&xml, &theme),
        None => StyleTable::default(),
    };
    let formatting = parse_sheet_formatting(&sheet_xml);
    let validations = parse_validations_from_xml(&sheet_xml, &entry.path)?;

    let mut sheet = SourceSheet::new(entry.name.clone());
    read_cells(bytes, &entry.name, &mut sheet)?;

    for (row, col, style_id) in formatting.cell_styles {
        match styles.get(style_id) {
            Some(style) if !style.is_default() => sheet.set_style(row, col, style.clone()),
            Some(_) => {}
            None => debug!("Cell ({}, {}) references unknown style {}", row, col, style_id),
        }
    }
    if let Some(base) = base_style(&styles) {
        sheet.apply_base_style(&base);
    }

    sheet.col_widths = formatting.col_widths;
    sheet.validations = validations;

    info!(
        "Loaded sheet '{}': {} rows x {} cols, {} validation rules",
        sheet.name,
        sheet.row_count(),
        sheet.col_count(),
        sheet.validations.len()
    );

    Ok(LoadedSheet { sheet, unhidden, sheet_count: index.sheets.len() })
}

/// Read cell values and formulas for one sheet through calamine.
fn read_cells(bytes: &[u8], sheet_name: &str, sheet: &mut SourceSheet) -> Result<(), LoadError> {
    let mut workbook: Xlsx<_> =
        open_workbook_from_rs(Cursor::new(bytes)).map_err(LoadError::Workbook)?;

    let range = workbook.worksheet_range(sheet_name).map_err(|source| LoadError::Sheet {
        sheet: sheet_name.to_string(),
        source,
    })?;
    let range_start = range.start().unwrap_or((0, 0));

    for (row, col, data) in range.used_cells() {
        let Some((row, col)) = to_position(range_start, row, col) else {
            continue;
        };
        if let Some(value) = convert_value(data) {
            sheet.set_value(row, col, value);
        }
    }

    // Missing formula data is not fatal: the cached values already loaded
    // stand in for the formulas.
    match workbook.worksheet_formula(sheet_name) {
        Ok(formula_range) => {
            let formula_start = formula_range.start().unwrap_or((0, 0));
            for (row, col, formula) in formula_range.used_cells() {
                let Some((row, col)) = to_position(formula_start, row, col) else {
                    continue;
                };
                let source = formula.trim_start_matches('=');
                if source.is_empty() {
                    continue;
                }
                // Batches store error cells as a formula that evaluates to
                // the literal.
                if ERROR_LITERALS.contains(&source) {
                    sheet.set_value(row, col, CellValue::Error(source.to_string()));
                    continue;
                }
                let cached = sheet
                    .get(row, col)
                    .map(|cell| cell.value.display())
                    .filter(|text| !text.is_empty());
                sheet.set_value(row, col, CellValue::Formula { source: source.to_string(), cached });
            }
        }
        Err(e) => warn!("Failed to read formulas for sheet '{}': {}", sheet_name, e),
    }

    Ok(())
}

const ERROR_LITERALS: [&str; 8] =
    ["#NULL!", "#DIV/0!", "#VALUE!", "#REF!", "#NAME?", "#NUM!", "#N/A", "#GETTING_DATA"];

/// Convert a calamine offset within a range to a 1-based sheet position.
fn to_position(start: (u32, u32), row: usize, col: usize) -> Option<(u32, u16)> {
    let row = u32::try_from(row).ok()?.checked_add(start.0)?.checked_add(1)?;
    let col = u32::try_from(col).ok()?.checked_add(start.1)?.checked_add(1)?;
    Some((row, u16::try_from(col).ok()?))
}

fn convert_value(data: &Data) -> Option<CellValue> {
    match data {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Float(n) => Some(CellValue::Number(*n)),
        Data::Int(n) => Some(CellValue::Number(*n as f64)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::Error(e) => Some(CellValue::Error(e.to_string())),
        Data::DateTime(dt) => Some(CellValue::DateTime(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
    }
}

/// The workbook's base cell style (cellXfs 0) when it differs from what the
/// batch writer produces for an unformatted cell.
fn base_style(styles: &StyleTable) -> Option<StyleBundle> {
    let mut base = styles.get(0)?.clone();
    if base.font.name.as_deref() == Some("Calibri") {
        base.font.name = None;
    }
    if base.font.size == Some(11.0) {
        base.font.size = None;
    }
    if base.font.color == Some(Rgb(0x000000)) {
        base.font.color = None;
    }
    if base.is_default() {
        None
    } else {
        Some(base)
    }
}
