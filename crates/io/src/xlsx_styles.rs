//! XLSX style parser: resolves styles.xml `cellXfs` entries into
//! [`StyleBundle`]s and reads per-cell style ids and column widths from a
//! worksheet part.

use std::collections::{BTreeMap, HashMap};

use log::warn;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use sheetsplit_engine::range::CellRef;
use sheetsplit_engine::style::{
    Alignment, Border, BorderEdge, BorderStyle, Fill, FillPattern, Font, FontScript,
    HorizontalAlign, NumFormat, Rgb, StyleBundle, Underline, VerticalAlign,
};

use crate::xlsx_package::{attr_bool, attr_parse, attr_string, collect_attrs};
use crate::xlsx_theme::{apply_tint, ThemePalette};

// =============================================================================
// Public types
// =============================================================================

/// Parsed style table from styles.xml: cellXfs index -> StyleBundle.
#[derive(Debug, Default)]
pub struct StyleTable {
    pub styles: Vec<StyleBundle>,
}

impl StyleTable {
    pub fn get(&self, id: usize) -> Option<&StyleBundle> {
        self.styles.get(id)
    }
}

/// Per-cell style references and column layout from one worksheet part.
#[derive(Debug, Default)]
pub struct SheetFormatting {
    /// (row, col, style_id) with 1-based coordinates; style 0 is omitted.
    pub cell_styles: Vec<(u32, u16, usize)>,
    /// Column widths in Excel character units. `None` = no explicit width.
    pub col_widths: BTreeMap<u16, Option<f64>>,
}

// =============================================================================
// Color parsing
// =============================================================================

/// Standard Excel indexed color palette.
fn indexed_color(idx: u8) -> Option<Rgb> {
    let rgb: [u8; 3] = match idx {
        0 | 8 => [0, 0, 0],
        1 | 9 => [255, 255, 255],
        2 | 10 => [255, 0, 0],
        3 | 11 => [0, 255, 0],
        4 | 12 => [0, 0, 255],
        5 | 13 => [255, 255, 0],
        6 | 14 => [255, 0, 255],
        7 | 15 => [0, 255, 255],
        16 => [128, 0, 0],
        17 => [0, 128, 0],
        18 => [0, 0, 128],
        19 => [128, 128, 0],
        20 => [128, 0, 128],
        21 => [0, 128, 128],
        22 => [192, 192, 192],
        23 => [128, 128, 128],
        24 => [153, 153, 255],
        25 => [153, 51, 102],
        26 => [255, 255, 204],
        27 => [204, 255, 255],
        28 => [102, 0, 102],
        29 => [255, 128, 128],
        30 => [0, 102, 204],
        31 => [204, 204, 255],
        32 => [0, 0, 128],
        33 => [255, 0, 255],
        34 => [255, 255, 0],
        35 => [0, 255, 255],
        36 => [128, 0, 128],
        37 => [128, 0, 0],
        38 => [0, 128, 128],
        39 => [0, 0, 255],
        40 => [0, 204, 255],
        41 => [204, 255, 255],
        42 => [204, 255, 204],
        43 => [255, 255, 153],
        44 => [153, 204, 255],
        45 => [255, 153, 204],
        46 => [204, 153, 255],
        47 => [255, 204, 153],
        48 => [51, 102, 255],
        49 => [51, 204, 204],
        50 => [153, 204, 0],
        51 => [255, 204, 0],
        52 => [255, 153, 0],
        53 => [255, 102, 0],
        54 => [102, 102, 153],
        55 => [150, 150, 150],
        56 => [0, 51, 102],
        57 => [51, 153, 102],
        58 => [0, 51, 0],
        59 => [51, 51, 0],
        60 => [153, 51, 0],
        61 => [153, 51, 51],
        62 => [51, 51, 153],
        63 => [51, 51, 51],
        64 => [0, 0, 0],       // System foreground
        65 => [255, 255, 255], // System background
        _ => return None,
    };
    Some(Rgb::from_components(rgb[0], rgb[1], rgb[2]))
}

/// Parse a color from XML attributes. Prefers rgb > indexed > theme; theme
/// colours resolve against the workbook's palette.
fn parse_color_attrs(attrs: &[(Vec<u8>, Vec<u8>)], theme: &ThemePalette) -> Option<Rgb> {
    let mut rgb_val: Option<&[u8]> = None;
    let mut indexed_val: Option<u8> = None;
    let mut theme_val: Option<u8> = None;
    let mut tint = 0.0f64;

    for (key, value) in attrs {
        let text = std::str::from_utf8(value).ok();
        match key.as_slice() {
            b"rgb" => rgb_val = Some(value.as_slice()),
            b"indexed" => indexed_val = text.and_then(|s| s.parse().ok()),
            b"theme" => theme_val = text.and_then(|s| s.parse().ok()),
            b"tint" => tint = text.and_then(|s| s.parse().ok()).unwrap_or(0.0),
            b"auto" if value.as_slice() == b"1" => return None,
            _ => {}
        }
    }

    if let Some(hex) = rgb_val {
        return parse_argb_hex(hex).map(|c| apply_tint(c, tint));
    }
    if let Some(idx) = indexed_val {
        return indexed_color(idx);
    }
    theme_val.and_then(|idx| theme.resolve(idx, tint))
}

/// Parse AARRGGBB or RRGGBB hex. Alpha is ignored.
fn parse_argb_hex(hex: &[u8]) -> Option<Rgb> {
    let s = std::str::from_utf8(hex).ok()?.trim_start_matches('#');
    let rgb = match s.len() {
        8 => &s[2..],
        6 => s,
        _ => return None,
    };
    u32::from_str_radix(rgb, 16).ok().map(Rgb)
}

// =============================================================================
// styles.xml parser
// =============================================================================

/// Parse styles.xml content into a StyleTable, resolving theme colours
/// against `theme`. Malformed sections end their parse early; whatever was
/// read before the error is kept.
pub fn parse_styles_xml(xml: &str, theme: &ThemePalette) -> StyleTable {
    let custom_num_fmts = parse_num_fmts(xml);
    let fonts = parse_fonts(xml, theme);
    let fills = parse_fills(xml, theme);
    let borders = parse_borders(xml, theme);
    let styles = parse_cell_xfs(xml, &custom_num_fmts, &fonts, &fills, &borders);
    StyleTable { styles }
}

/// Parse <numFmts> section -> formatId -> formatCode.
fn parse_num_fmts(xml: &str) -> HashMap<u16, String> {
    let mut map = HashMap::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_num_fmts = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"numFmts" => in_num_fmts = true,
            Ok(Event::End(ref e)) if e.name().as_ref() == b"numFmts" => break,
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if in_num_fmts && e.name().as_ref() == b"numFmt" =>
            {
                let mut id: Option<u16> = None;
                let mut code: Option<String> = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"numFmtId" => id = attr_parse(&attr),
                        // Entities must be unescaped: "$"#,##0 is stored with &quot;
                        b"formatCode" => code = Some(attr_string(&attr)),
                        _ => {}
                    }
                }
                if let (Some(id), Some(code)) = (id, code) {
                    map.insert(id, code);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("styles.xml numFmts: {}", e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    map
}

fn val_attr(e: &BytesStart) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == b"val")
        .map(|a| attr_string(&a))
}

/// `<b/>` is on; `<b val="0"/>` is off.
fn flag_on(e: &BytesStart) -> bool {
    !matches!(val_attr(e).as_deref(), Some("0") | Some("false"))
}

fn apply_font_child(font: &mut Font, e: &BytesStart, theme: &ThemePalette) {
    match e.name().as_ref() {
        b"b" => font.bold = flag_on(e),
        b"i" => font.italic = flag_on(e),
        b"strike" => font.strikethrough = flag_on(e),
        b"u" => {
            font.underline = match val_attr(e).as_deref() {
                None | Some("single") => Underline::Single,
                Some("double") => Underline::Double,
                Some("singleAccounting") => Underline::SingleAccounting,
                Some("doubleAccounting") => Underline::DoubleAccounting,
                _ => Underline::None,
            }
        }
        b"vertAlign" => {
            font.script = match val_attr(e).as_deref() {
                Some("superscript") => FontScript::Superscript,
                Some("subscript") => FontScript::Subscript,
                _ => FontScript::Baseline,
            }
        }
        b"sz" => font.size = val_attr(e).and_then(|s| s.parse().ok()),
        b"color" => font.color = parse_color_attrs(&collect_attrs(e), theme),
        b"name" | b"rFont" => font.name = val_attr(e),
        _ => {}
    }
}

/// Parse <fonts> section.
fn parse_fonts(xml: &str, theme: &ThemePalette) -> Vec<Font> {
    let mut fonts = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut depth = 0; // 0 = outside, 1 = inside <fonts>, 2 = inside <font>
    let mut current = Font::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"fonts" if depth == 0 => depth = 1,
                b"font" if depth == 1 => {
                    depth = 2;
                    current = Font::default();
                }
                _ if depth == 2 => apply_font_child(&mut current, e, theme),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"font" if depth == 1 => fonts.push(Font::default()),
                _ if depth == 2 => apply_font_child(&mut current, e, theme),
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"font" if depth == 2 => {
                    fonts.push(std::mem::take(&mut current));
                    depth = 1;
                }
                b"fonts" if depth == 1 => break,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("styles.xml fonts: {}", e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    fonts
}

/// Parse <fills> section. Gradient fills have no pattern equivalent and
/// come back as `FillPattern::None`.
fn parse_fills(xml: &str, theme: &ThemePalette) -> Vec<Fill> {
    let mut fills = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut depth = 0; // 0 = outside, 1 = inside <fills>, 2 = inside <fill>
    let mut in_pattern_fill = false;
    let mut current = Fill::default();

    let pattern_of = |e: &BytesStart| {
        e.attributes()
            .flatten()
            .find(|a| a.key.as_ref() == b"patternType")
            .map(|a| FillPattern::from_xml(&attr_string(&a)))
            .unwrap_or(FillPattern::None)
    };

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"fills" if depth == 0 => depth = 1,
                b"fill" if depth == 1 => {
                    depth = 2;
                    current = Fill::default();
                }
                b"patternFill" if depth == 2 => {
                    current.pattern = pattern_of(e);
                    in_pattern_fill = true;
                }
                b"gradientFill" if depth == 2 => {
                    warn!("gradient fill has no pattern equivalent, dropped");
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"fill" if depth == 1 => fills.push(Fill::default()),
                b"patternFill" if depth == 2 => current.pattern = pattern_of(e),
                b"fgColor" if in_pattern_fill => {
                    current.fg_color = parse_color_attrs(&collect_attrs(e), theme);
                }
                b"bgColor" if in_pattern_fill => {
                    current.bg_color = parse_color_attrs(&collect_attrs(e), theme);
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"patternFill" => in_pattern_fill = false,
                b"fill" if depth == 2 => {
                    fills.push(std::mem::take(&mut current));
                    depth = 1;
                    in_pattern_fill = false;
                }
                b"fills" if depth == 1 => break,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("styles.xml fills: {}", e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    fills
}

/// Parse <borders> section.
fn parse_borders(xml: &str, theme: &ThemePalette) -> Vec<Border> {
    let mut borders = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut depth = 0; // 0 = outside, 1 = inside <borders>, 2 = inside <border>
    let mut current = Border::default();
    let mut side: Option<Vec<u8>> = None;
    let mut edge = BorderEdge::default();

    let edge_style = |e: &BytesStart| {
        e.attributes()
            .flatten()
            .find(|a| a.key.as_ref() == b"style")
            .map(|a| BorderStyle::from_xml(&attr_string(&a)))
            .unwrap_or(BorderStyle::None)
    };

    fn store(border: &mut Border, side: &[u8], edge: BorderEdge) {
        match side {
            b"left" | b"start" => border.left = edge,
            b"right" | b"end" => border.right = edge,
            b"top" => border.top = edge,
            b"bottom" => border.bottom = edge,
            b"diagonal" => border.diagonal = edge,
            _ => {}
        }
    }

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"borders" if depth == 0 => depth = 1,
                b"border" if depth == 1 => {
                    depth = 2;
                    current = border_flags(e);
                }
                name @ (b"left" | b"right" | b"top" | b"bottom" | b"diagonal" | b"start" | b"end")
                    if depth == 2 =>
                {
                    side = Some(name.to_vec());
                    edge = BorderEdge { style: edge_style(e), color: None };
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"border" if depth == 1 => borders.push(border_flags(e)),
                name @ (b"left" | b"right" | b"top" | b"bottom" | b"diagonal" | b"start" | b"end")
                    if depth == 2 =>
                {
                    store(&mut current, name, BorderEdge { style: edge_style(e), color: None });
                }
                b"color" if side.is_some() => edge.color = parse_color_attrs(&collect_attrs(e), theme),
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"left" | b"right" | b"top" | b"bottom" | b"diagonal" | b"start" | b"end"
                    if depth == 2 =>
                {
                    if let Some(name) = side.take() {
                        store(&mut current, &name, edge);
                    }
                    edge = BorderEdge::default();
                }
                b"border" if depth == 2 => {
                    borders.push(current);
                    current = Border::default();
                    depth = 1;
                }
                b"borders" if depth == 1 => break,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("styles.xml borders: {}", e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    borders
}

fn border_flags(e: &BytesStart) -> Border {
    let mut border = Border::default();
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"diagonalUp" => border.diagonal_up = attr_bool(&attr),
            b"diagonalDown" => border.diagonal_down = attr_bool(&attr),
            _ => {}
        }
    }
    border
}

#[derive(Debug, Default)]
struct XfEntry {
    num_fmt_id: Option<u16>,
    font_id: Option<usize>,
    fill_id: Option<usize>,
    border_id: Option<usize>,
    alignment: Alignment,
}

impl XfEntry {
    fn from_attrs(e: &BytesStart) -> Self {
        let mut xf = XfEntry::default();
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"numFmtId" => xf.num_fmt_id = attr_parse(&attr),
                b"fontId" => xf.font_id = attr_parse(&attr),
                b"fillId" => xf.fill_id = attr_parse(&attr),
                b"borderId" => xf.border_id = attr_parse(&attr),
                _ => {}
            }
        }
        xf
    }

    fn read_alignment(&mut self, e: &BytesStart) {
        let a = &mut self.alignment;
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"horizontal" => a.horizontal = HorizontalAlign::from_xml(&attr_string(&attr)),
                b"vertical" => a.vertical = VerticalAlign::from_xml(&attr_string(&attr)),
                b"wrapText" => a.wrap_text = attr_bool(&attr),
                b"shrinkToFit" => a.shrink_to_fit = attr_bool(&attr),
                b"indent" => a.indent = attr_parse(&attr).unwrap_or(0),
                b"textRotation" => a.rotation = attr_parse(&attr).unwrap_or(0),
                _ => {}
            }
        }
    }
}

/// Parse <cellXfs> and resolve each <xf> into a StyleBundle.
fn parse_cell_xfs(
    xml: &str,
    custom_num_fmts: &HashMap<u16, String>,
    fonts: &[Font],
    fills: &[Fill],
    borders: &[Border],
) -> Vec<StyleBundle> {
    let mut styles = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_cell_xfs = false;
    let mut current: Option<XfEntry> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"cellXfs" => in_cell_xfs = true,
                b"xf" if in_cell_xfs => current = Some(XfEntry::from_attrs(e)),
                b"alignment" => {
                    if let Some(xf) = current.as_mut() {
                        xf.read_alignment(e);
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"xf" if in_cell_xfs => {
                    let xf = XfEntry::from_attrs(e);
                    styles.push(resolve_xf(&xf, custom_num_fmts, fonts, fills, borders));
                }
                b"alignment" => {
                    if let Some(xf) = current.as_mut() {
                        xf.read_alignment(e);
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"xf" => {
                    if let Some(xf) = current.take() {
                        styles.push(resolve_xf(&xf, custom_num_fmts, fonts, fills, borders));
                    }
                }
                b"cellXfs" => break,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("styles.xml cellXfs: {}", e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    styles
}

/// Resolve an XfEntry into a StyleBundle using the parsed component tables.
fn resolve_xf(
    xf: &XfEntry,
    custom_num_fmts: &HashMap<u16, String>,
    fonts: &[Font],
    fills: &[Fill],
    borders: &[Border],
) -> StyleBundle {
    let num_format = match xf.num_fmt_id {
        None | Some(0) => NumFormat::General,
        Some(id) => match custom_num_fmts.get(&id) {
            Some(code) => NumFormat::Custom(code.clone()),
            None => NumFormat::Builtin(id),
        },
    };

    StyleBundle {
        font: xf.font_id.and_then(|i| fonts.get(i)).cloned().unwrap_or_default(),
        fill: xf.fill_id.and_then(|i| fills.get(i)).cloned().unwrap_or_default(),
        border: xf.border_id.and_then(|i| borders.get(i)).copied().unwrap_or_default(),
        alignment: xf.alignment,
        num_format,
    }
}

// =============================================================================
// Worksheet XML parser: per-cell style IDs + column widths
// =============================================================================

/// Parse a worksheet XML for per-cell style ids and `<col>` widths.
pub fn parse_sheet_formatting(xml: &str) -> SheetFormatting {
    let mut out = SheetFormatting::default();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    // Cells without r= follow the previous cell in the same row
    let mut current_row: u32 = 0;
    let mut next_col: u16 = 1;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"row" => {
                    let row = e
                        .attributes()
                        .flatten()
                        .find(|a| a.key.as_ref() == b"r")
                        .and_then(|a| attr_parse::<u32>(&a));
                    current_row = row.unwrap_or(current_row + 1);
                    next_col = 1;
                }
                b"c" => {
                    let mut style_id: Option<usize> = None;
                    let mut cell_ref: Option<CellRef> = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"s" => style_id = attr_parse(&attr),
                            b"r" => cell_ref = CellRef::parse(&attr_string(&attr)),
                            _ => {}
                        }
                    }
                    let cell = cell_ref.unwrap_or_else(|| CellRef::new(current_row.max(1), next_col));
                    next_col = cell.col.saturating_add(1);
                    if let Some(style_id) = style_id.filter(|&s| s > 0) {
                        out.cell_styles.push((cell.row, cell.col, style_id));
                    }
                }
                b"col" => {
                    let mut min_col: Option<u16> = None;
                    let mut max_col: Option<u16> = None;
                    let mut width: Option<f64> = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"min" => min_col = attr_parse(&attr),
                            b"max" => max_col = attr_parse(&attr),
                            b"width" => width = attr_parse(&attr),
                            _ => {}
                        }
                    }
                    if let Some(min) = min_col.filter(|&c| c > 0) {
                        let max = max_col.unwrap_or(min).max(min);
                        for col in min..=max {
                            out.col_widths.insert(col, width);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("worksheet formatting: {}", e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    out
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="1">
    <numFmt numFmtId="164" formatCode="&quot;$&quot;#,##0.00"/>
  </numFmts>
  <fonts count="3">
    <font><sz val="11"/><name val="Calibri"/></font>
    <font><b/><i val="0"/><u val="double"/><sz val="14"/><color rgb="FFFF0000"/><name val="Arial"/></font>
    <font><strike/><vertAlign val="superscript"/><color theme="4" tint="-0.5"/><name val="Calibri"/></font>
  </fonts>
  <fills count="3">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
    <fill><patternFill patternType="solid"><fgColor rgb="FFFFFF00"/><bgColor indexed="64"/></patternFill></fill>
  </fills>
  <borders count="2">
    <border><left/><right/><top/><bottom/><diagonal/></border>
    <border diagonalUp="1"><left style="thin"><color indexed="10"/></left><right style="mediumDashDot"/><top style="double"/><bottom style="hair"><color auto="1"/></bottom><diagonal style="thin"/></border>
  </borders>
  <cellXfs count="4">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="14" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/>
    <xf numFmtId="164" fontId="2" fillId="2" borderId="1" xfId="0" applyFill="1" applyBorder="1">
      <alignment horizontal="center" vertical="top" wrapText="1" indent="2" textRotation="135"/>
    </xf>
    <xf numFmtId="0" fontId="9" fillId="9" borderId="9"/>
  </cellXfs>
</styleSheet>"#;

    #[test]
    fn test_parse_argb_hex() {
        assert_eq!(parse_argb_hex(b"FF0000FF"), Some(Rgb(0x0000FF)));
        assert_eq!(parse_argb_hex(b"FF0000"), Some(Rgb(0xFF0000)));
        assert_eq!(parse_argb_hex(b"xyz"), None);
    }

    #[test]
    fn test_indexed_colors() {
        assert_eq!(indexed_color(2), Some(Rgb(0xFF0000)));
        assert_eq!(indexed_color(99), None);
    }

    #[test]
    fn test_theme_colors_use_workbook_palette() {
        let theme = crate::xlsx_theme::parse_theme_xml(
            r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><a:themeElements><a:clrScheme name="x"><a:accent1><a:srgbClr val="123456"/></a:accent1></a:clrScheme></a:themeElements></a:theme>"#,
        );
        let table = parse_styles_xml(STYLES, &theme);
        assert_eq!(table.get(2).unwrap().font.color, Some(Rgb(0x091A2B)));

        let attrs = vec![(b"theme".to_vec(), b"4".to_vec())];
        assert_eq!(parse_color_attrs(&attrs, &theme), Some(Rgb(0x123456)));
        assert_eq!(parse_color_attrs(&attrs, &ThemePalette::default()), Some(Rgb(0x4472C4)));
    }

    #[test]
    fn test_parse_styles_fonts() {
        let table = parse_styles_xml(STYLES, &ThemePalette::default());
        assert_eq!(table.styles.len(), 4);

        let s0 = table.get(0).unwrap();
        assert_eq!(s0.font.name.as_deref(), Some("Calibri"));
        assert_eq!(s0.font.size, Some(11.0));
        assert!(!s0.font.bold);

        let s1 = table.get(1).unwrap();
        assert!(s1.font.bold);
        assert!(!s1.font.italic);
        assert_eq!(s1.font.underline, Underline::Double);
        assert_eq!(s1.font.color, Some(Rgb(0xFF0000)));
        assert_eq!(s1.num_format, NumFormat::Builtin(14));

        let s2 = table.get(2).unwrap();
        assert!(s2.font.strikethrough);
        assert_eq!(s2.font.script, FontScript::Superscript);
        assert_eq!(s2.font.color, Some(Rgb(0x203864)));
    }

    #[test]
    fn test_parse_styles_fill_border_alignment() {
        let table = parse_styles_xml(STYLES, &ThemePalette::default());
        let s2 = table.get(2).unwrap();

        assert_eq!(s2.fill.pattern, FillPattern::Solid);
        assert_eq!(s2.fill.fg_color, Some(Rgb(0xFFFF00)));
        assert_eq!(s2.fill.bg_color, Some(Rgb(0x000000)));

        assert_eq!(s2.border.left.style, BorderStyle::Thin);
        assert_eq!(s2.border.left.color, Some(Rgb(0xFF0000)));
        assert_eq!(s2.border.right.style, BorderStyle::MediumDashDot);
        assert_eq!(s2.border.top.style, BorderStyle::Double);
        assert_eq!(s2.border.bottom, BorderEdge { style: BorderStyle::Hair, color: None });
        assert_eq!(s2.border.diagonal.style, BorderStyle::Thin);
        assert!(s2.border.diagonal_up);
        assert!(!s2.border.diagonal_down);

        assert_eq!(s2.alignment.horizontal, HorizontalAlign::Center);
        assert_eq!(s2.alignment.vertical, VerticalAlign::Top);
        assert!(s2.alignment.wrap_text);
        assert_eq!(s2.alignment.indent, 2);
        assert_eq!(s2.alignment.rotation, 135);

        assert_eq!(s2.num_format, NumFormat::Custom("\"$\"#,##0.00".into()));
    }

    #[test]
    fn test_out_of_range_component_ids_default() {
        let table = parse_styles_xml(STYLES, &ThemePalette::default());
        assert!(table.get(3).unwrap().is_default());
    }

    #[test]
    fn test_parse_empty_styles_xml() {
        let xml = r#"<?xml version="1.0"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
</styleSheet>"#;
        assert!(parse_styles_xml(xml, &ThemePalette::default()).styles.is_empty());
    }

    #[test]
    fn test_parse_sheet_formatting() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <cols>
    <col min="1" max="1" width="24.7109375" customWidth="1"/>
    <col min="3" max="5" width="9.140625"/>
    <col min="6" max="6" style="2"/>
  </cols>
  <sheetData>
    <row r="1"><c r="A1" s="1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
    <row r="3"><c r="A3" s="0"><v>5</v></c><c s="2"/><c r="G3" s="3"/></row>
  </sheetData>
</worksheet>"#;
        let sf = parse_sheet_formatting(xml);
        assert_eq!(sf.cell_styles, vec![(1, 1, 1), (3, 2, 2), (3, 7, 3)]);
        assert_eq!(sf.col_widths.get(&1), Some(&Some(24.7109375)));
        assert_eq!(sf.col_widths.get(&4), Some(&Some(9.140625)));
        assert_eq!(sf.col_widths.get(&6), Some(&None));
        assert_eq!(sf.col_widths.get(&2), None);
    }
}
