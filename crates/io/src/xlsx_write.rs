//! Batch workbook writer.
//!
//! Serializes one [`Batch`] into a single-sheet xlsx: values and formulas
//! by value, each cell's full style as an explicit format, column widths
//! and the batch's validation rules.
//!
//! rust_xlsxwriter only takes widths it can round to whole pixels, so the
//! `<cols>` element is patched into the finished package afterwards with
//! the widths exactly as the source declared them.

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;
use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, FormatDiagonalBorder, FormatPattern, FormatScript,
    FormatUnderline, Formula, Workbook as XlsxWorkbook, Worksheet,
};
use sheetsplit_engine::cell::{Cell, CellValue};
use sheetsplit_engine::style::{
    BorderStyle, FillPattern, FontScript, HorizontalAlign, NumFormat, Rgb, StyleBundle, Underline,
    VerticalAlign,
};
use sheetsplit_engine::Batch;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::WriteError;
use crate::xlsx_validation::rule_to_xlsx;

/// Counts from writing one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Cells that carried a value or a non-default style.
    pub cells: usize,
    /// `<dataValidation>` ranges written.
    pub validation_ranges: usize,
}

/// Worksheet part of a single-sheet rust_xlsxwriter package.
const SHEET_PART: &str = "xl/worksheets/sheet1.xml";

/// Serialize a batch to xlsx bytes.
pub fn batch_to_buffer(batch: &Batch) -> Result<(Vec<u8>, WriteStats), WriteError> {
    let (mut workbook, stats) = build_workbook(batch)?;
    let bytes = workbook.save_to_buffer()?;
    let bytes = apply_column_widths(bytes, &batch.col_widths)?;
    Ok((bytes, stats))
}

/// Serialize a batch to an xlsx file at `path`.
pub fn write_batch(batch: &Batch, path: &Path) -> Result<WriteStats, WriteError> {
    let (bytes, stats) = batch_to_buffer(batch)?;
    std::fs::write(path, bytes)?;
    debug!("Wrote {} ({} cells) to {}", batch.name, stats.cells, path.display());
    Ok(stats)
}

fn build_workbook(batch: &Batch) -> Result<(XlsxWorkbook, WriteStats), WriteError> {
    let mut workbook = XlsxWorkbook::new();
    let mut stats = WriteStats::default();

    let worksheet = workbook.add_worksheet().set_name(&batch.name)?;

    for (row_idx, row) in batch.rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            if cell.is_blank() {
                continue;
            }
            write_cell(worksheet, row_idx as u32, col_idx as u16, cell)?;
            stats.cells += 1;
        }
    }

    for rule in &batch.validations {
        let validation = rule_to_xlsx(rule)?;
        for range in &rule.ranges {
            worksheet.add_data_validation(
                range.first_row - 1,
                range.first_col - 1,
                range.last_row - 1,
                range.last_col - 1,
                &validation,
            )?;
            stats.validation_ranges += 1;
        }
    }

    Ok((workbook, stats))
}

/// Write one cell at 0-based (row, col).
fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<(), WriteError> {
    let format = build_excel_format(&cell.style);
    match &cell.value {
        CellValue::Empty => {
            worksheet.write_blank(row, col, &format)?;
        }
        CellValue::Text(s) => {
            worksheet.write_string_with_format(row, col, s, &format)?;
        }
        CellValue::Number(n) | CellValue::DateTime(n) => {
            worksheet.write_number_with_format(row, col, *n, &format)?;
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean_with_format(row, col, *b, &format)?;
        }
        // A formula that evaluates to the literal, cached as the literal.
        CellValue::Error(e) => {
            let formula = Formula::new(e).set_result(e);
            worksheet.write_formula_with_format(row, col, formula, &format)?;
        }
        CellValue::Formula { source, cached } => {
            let mut formula = Formula::new(source);
            if let Some(cached) = cached {
                formula = formula.set_result(cached);
            }
            worksheet.write_formula_with_format(row, col, formula, &format)?;
        }
    }
    Ok(())
}

// ============================================================================
// Column widths
// ============================================================================

/// Replace the worksheet's `<cols>` with the batch's widths. Other package
/// entries are copied without recompressing.
fn apply_column_widths(
    xlsx: Vec<u8>,
    widths: &BTreeMap<u16, Option<f64>>,
) -> Result<Vec<u8>, WriteError> {
    let cols = cols_xml(widths);
    if cols.is_empty() {
        return Ok(xlsx);
    }

    let mut archive = ZipArchive::new(Cursor::new(xlsx))?;
    let mut out = ZipWriter::new(Cursor::new(Vec::new()));
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.name() != SHEET_PART {
            out.raw_copy_file(file)?;
            continue;
        }
        let mut xml = String::new();
        file.read_to_string(&mut xml)?;
        let options = SimpleFileOptions::default().compression_method(file.compression());
        out.start_file(SHEET_PART, options)?;
        out.write_all(splice_cols(&xml, &cols)?.as_bytes())?;
    }
    Ok(out.finish()?.into_inner())
}

/// `<cols>` for the given widths, with runs of equal widths merged into one
/// `<col>`. Empty when no column has a width.
fn cols_xml(widths: &BTreeMap<u16, Option<f64>>) -> String {
    let mut spans: Vec<(u16, u16, f64)> = Vec::new();
    for (&col, width) in widths {
        let Some(width) = width.filter(|w| w.is_finite() && *w >= 0.0) else {
            continue;
        };
        if col == 0 {
            continue;
        }
        match spans.last_mut() {
            Some((_, last, w)) if *last + 1 == col && *w == width => *last = col,
            _ => spans.push((col, col, width)),
        }
    }
    if spans.is_empty() {
        return String::new();
    }

    let mut xml = String::from("<cols>");
    for (min, max, width) in spans {
        xml.push_str(&format!(
            r#"<col min="{}" max="{}" width="{}" customWidth="1"/>"#,
            min, max, width
        ));
    }
    xml.push_str("</cols>");
    xml
}

/// Drop any existing `<cols>` and insert `cols` right before `<sheetData>`.
fn splice_cols(xml: &str, cols: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut existing: Option<(usize, usize)> = None;
    let mut cols_start = 0;
    let mut sheet_data = None;

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"cols" => cols_start = before,
            Event::End(e) if e.local_name().as_ref() == b"cols" => {
                existing = Some((cols_start, reader.buffer_position() as usize));
            }
            Event::Empty(e) if e.local_name().as_ref() == b"cols" => {
                existing = Some((before, reader.buffer_position() as usize));
            }
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheetData" => {
                sheet_data = Some(before);
                break;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let Some(insert_at) = sheet_data else {
        debug!("worksheet has no sheetData, column widths not written");
        return Ok(xml.to_string());
    };
    let mut out = String::with_capacity(xml.len() + cols.len());
    match existing {
        Some((start, end)) if end <= insert_at => {
            out.push_str(&xml[..start]);
            out.push_str(&xml[end..insert_at]);
        }
        _ => out.push_str(&xml[..insert_at]),
    }
    out.push_str(cols);
    out.push_str(&xml[insert_at..]);
    Ok(out)
}

// ============================================================================
// Style -> Format
// ============================================================================

fn color(rgb: Rgb) -> Color {
    Color::RGB(rgb.0)
}

/// Build an explicit rust_xlsxwriter format from a resolved style.
pub(crate) fn build_excel_format(style: &StyleBundle) -> Format {
    let mut format = Format::new();

    // Font
    let font = &style.font;
    if let Some(ref name) = font.name {
        format = format.set_font_name(name);
    }
    if let Some(size) = font.size {
        format = format.set_font_size(size);
    }
    if font.bold {
        format = format.set_bold();
    }
    if font.italic {
        format = format.set_italic();
    }
    format = match font.underline {
        Underline::None => format,
        Underline::Single => format.set_underline(FormatUnderline::Single),
        Underline::Double => format.set_underline(FormatUnderline::Double),
        Underline::SingleAccounting => format.set_underline(FormatUnderline::SingleAccounting),
        Underline::DoubleAccounting => format.set_underline(FormatUnderline::DoubleAccounting),
    };
    if font.strikethrough {
        format = format.set_font_strikethrough();
    }
    format = match font.script {
        FontScript::Baseline => format,
        FontScript::Superscript => format.set_font_script(FormatScript::Superscript),
        FontScript::Subscript => format.set_font_script(FormatScript::Subscript),
    };
    if let Some(rgb) = font.color {
        format = format.set_font_color(color(rgb));
    }

    // Fill. For solid fills Excel paints with the pattern (foreground)
    // color; rust_xlsxwriter takes that color as the background color.
    let fill = &style.fill;
    match fill.pattern {
        FillPattern::None => {}
        FillPattern::Solid => {
            format = format.set_pattern(FormatPattern::Solid);
            if let Some(rgb) = fill.fg_color.or(fill.bg_color) {
                format = format.set_background_color(color(rgb));
            }
        }
        pattern => {
            format = format.set_pattern(fill_pattern_to_xlsx(pattern));
            if let Some(rgb) = fill.fg_color {
                format = format.set_foreground_color(color(rgb));
            }
            if let Some(rgb) = fill.bg_color {
                format = format.set_background_color(color(rgb));
            }
        }
    }

    // Borders
    let border = &style.border;
    if border.top.is_set() {
        format = format.set_border_top(border_style_to_xlsx(border.top.style));
        if let Some(rgb) = border.top.color {
            format = format.set_border_top_color(color(rgb));
        }
    }
    if border.right.is_set() {
        format = format.set_border_right(border_style_to_xlsx(border.right.style));
        if let Some(rgb) = border.right.color {
            format = format.set_border_right_color(color(rgb));
        }
    }
    if border.bottom.is_set() {
        format = format.set_border_bottom(border_style_to_xlsx(border.bottom.style));
        if let Some(rgb) = border.bottom.color {
            format = format.set_border_bottom_color(color(rgb));
        }
    }
    if border.left.is_set() {
        format = format.set_border_left(border_style_to_xlsx(border.left.style));
        if let Some(rgb) = border.left.color {
            format = format.set_border_left_color(color(rgb));
        }
    }
    if border.diagonal.is_set() && (border.diagonal_up || border.diagonal_down) {
        let kind = match (border.diagonal_up, border.diagonal_down) {
            (true, true) => FormatDiagonalBorder::BorderUpDown,
            (true, false) => FormatDiagonalBorder::BorderUp,
            _ => FormatDiagonalBorder::BorderDown,
        };
        format = format
            .set_border_diagonal(border_style_to_xlsx(border.diagonal.style))
            .set_border_diagonal_type(kind);
        if let Some(rgb) = border.diagonal.color {
            format = format.set_border_diagonal_color(color(rgb));
        }
    }

    // Alignment
    let align = &style.alignment;
    format = match align.horizontal {
        HorizontalAlign::General => format,
        HorizontalAlign::Left => format.set_align(FormatAlign::Left),
        HorizontalAlign::Center => format.set_align(FormatAlign::Center),
        HorizontalAlign::Right => format.set_align(FormatAlign::Right),
        HorizontalAlign::Fill => format.set_align(FormatAlign::Fill),
        HorizontalAlign::Justify => format.set_align(FormatAlign::Justify),
        HorizontalAlign::CenterContinuous => format.set_align(FormatAlign::CenterAcross),
        HorizontalAlign::Distributed => format.set_align(FormatAlign::Distributed),
    };
    format = match align.vertical {
        VerticalAlign::Default => format,
        VerticalAlign::Top => format.set_align(FormatAlign::Top),
        VerticalAlign::Center => format.set_align(FormatAlign::VerticalCenter),
        VerticalAlign::Bottom => format.set_align(FormatAlign::Bottom),
        VerticalAlign::Justify => format.set_align(FormatAlign::VerticalJustify),
        VerticalAlign::Distributed => format.set_align(FormatAlign::VerticalDistributed),
    };
    if align.wrap_text {
        format = format.set_text_wrap();
    }
    if align.shrink_to_fit {
        format = format.set_shrink();
    }
    if align.indent > 0 {
        format = format.set_indent(align.indent);
    }
    if let Some(rotation) = rotation_to_xlsx(align.rotation) {
        format = format.set_rotation(rotation);
    }

    // Number format
    match &style.num_format {
        NumFormat::General => {}
        NumFormat::Builtin(id) => match u8::try_from(*id) {
            Ok(index) => format = format.set_num_format_index(index),
            Err(_) => {
                if let Some(code) = style.num_format.code() {
                    format = format.set_num_format(code);
                }
            }
        },
        NumFormat::Custom(code) => {
            format = format.set_num_format(code);
        }
    }

    format
}

/// Map a raw `textRotation` to rust_xlsxwriter's signed degrees.
/// 91-180 are clockwise (stored as 90 + degrees); 255 is stacked text.
fn rotation_to_xlsx(raw: u16) -> Option<i16> {
    match raw {
        0 => None,
        1..=90 => Some(raw as i16),
        91..=180 => Some(-((raw - 90) as i16)),
        255 => Some(270),
        _ => None,
    }
}

fn border_style_to_xlsx(style: BorderStyle) -> FormatBorder {
    match style {
        BorderStyle::None => FormatBorder::None,
        BorderStyle::Thin => FormatBorder::Thin,
        BorderStyle::Medium => FormatBorder::Medium,
        BorderStyle::Dashed => FormatBorder::Dashed,
        BorderStyle::Dotted => FormatBorder::Dotted,
        BorderStyle::Thick => FormatBorder::Thick,
        BorderStyle::Double => FormatBorder::Double,
        BorderStyle::Hair => FormatBorder::Hair,
        BorderStyle::MediumDashed => FormatBorder::MediumDashed,
        BorderStyle::DashDot => FormatBorder::DashDot,
        BorderStyle::MediumDashDot => FormatBorder::MediumDashDot,
        BorderStyle::DashDotDot => FormatBorder::DashDotDot,
        BorderStyle::MediumDashDotDot => FormatBorder::MediumDashDotDot,
        BorderStyle::SlantDashDot => FormatBorder::SlantDashDot,
    }
}

fn fill_pattern_to_xlsx(pattern: FillPattern) -> FormatPattern {
    match pattern {
        FillPattern::None => FormatPattern::None,
        FillPattern::Solid => FormatPattern::Solid,
        FillPattern::MediumGray => FormatPattern::MediumGray,
        FillPattern::DarkGray => FormatPattern::DarkGray,
        FillPattern::LightGray => FormatPattern::LightGray,
        FillPattern::DarkHorizontal => FormatPattern::DarkHorizontal,
        FillPattern::DarkVertical => FormatPattern::DarkVertical,
        FillPattern::DarkDown => FormatPattern::DarkDown,
        FillPattern::DarkUp => FormatPattern::DarkUp,
        FillPattern::DarkGrid => FormatPattern::DarkGrid,
        FillPattern::DarkTrellis => FormatPattern::DarkTrellis,
        FillPattern::LightHorizontal => FormatPattern::LightHorizontal,
        FillPattern::LightVertical => FormatPattern::LightVertical,
        FillPattern::LightDown => FormatPattern::LightDown,
        FillPattern::LightUp => FormatPattern::LightUp,
        FillPattern::LightGrid => FormatPattern::LightGrid,
        FillPattern::LightTrellis => FormatPattern::LightTrellis,
        FillPattern::Gray125 => FormatPattern::Gray125,
        FillPattern::Gray0625 => FormatPattern::Gray0625,
    }
}
