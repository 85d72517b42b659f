// End-to-end tests for the split pipeline.
// Run with: cargo test -p sheetsplit-io --test split_tests
//
// Fixtures are generated with rust_xlsxwriter (or assembled by hand as a
// zip package when the writer cannot express the case), split, and the
// resulting batches are loaded back with the same loader as the source.

use std::io::{Cursor, Read, Write};

use rust_xlsxwriter::{
    Color, DataValidation, DataValidationRule, Format, FormatBorder, Workbook as XlsxWorkbook,
};
use sheetsplit_engine::range::CellRange;
use sheetsplit_engine::{CellValue, Progress, SourceSheet, ValidationMode, ValidationRule};
use sheetsplit_io::{load, plan, split, split_with_progress, Error, SplitOptions};
use zip::write::SimpleFileOptions;
use zip::ZipArchive;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const COLS: u16 = 4;

/// Header + `data_rows` rows over four columns, with a styled header, a few
/// styled data cells, custom widths and two validation rules.
fn roster_workbook(data_rows: u32) -> Vec<u8> {
    let mut workbook = XlsxWorkbook::new();
    let header = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xDDEBF7))
        .set_border_bottom(FormatBorder::Thin);
    let money = Format::new().set_num_format("#,##0.00");
    let flagged = Format::new().set_font_color(Color::RGB(0xC00000)).set_italic();
    let date = Format::new().set_num_format("yyyy-mm-dd");

    let ws = workbook.add_worksheet().set_name("Roster").unwrap();
    for (col, title) in ["Id", "Name", "Amount", "Status"].iter().enumerate() {
        ws.write_string_with_format(0, col as u16, *title, &header).unwrap();
    }
    for i in 1..=data_rows {
        ws.write_number(i, 0, i).unwrap();
        if i % 7 == 0 {
            ws.write_string_with_format(i, 1, format!("person {}", i), &flagged).unwrap();
        } else {
            ws.write_string(i, 1, format!("person {}", i)).unwrap();
        }
        if i % 5 == 0 {
            ws.write_number_with_format(i, 2, 45000.0 + i as f64, &date).unwrap();
        } else {
            ws.write_number_with_format(i, 2, i as f64 * 1.25, &money).unwrap();
        }
        ws.write_string(i, 3, if i % 2 == 0 { "open" } else { "closed" }).unwrap();
    }
    ws.set_column_width(1, 24).unwrap();
    ws.set_column_width(2, 14.5).unwrap();

    let status = DataValidation::new()
        .allow_list_strings(&["open", "closed"])
        .unwrap()
        .set_input_title("Status")
        .unwrap()
        .set_error_message("Pick open or closed")
        .unwrap();
    ws.add_data_validation(1, 3, data_rows.max(1), 3, &status).unwrap();

    let ids = DataValidation::new().allow_whole_number(DataValidationRule::GreaterThan(0));
    ws.add_data_validation(1, 0, data_rows.max(1), 0, &ids).unwrap();

    workbook.save_to_buffer().unwrap()
}

fn zip_package(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in parts {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/>
</Relationships>"#;

const EMPTY_SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData/></worksheet>"#;

/// Two sheets; the second is very hidden and is the active tab.
fn hidden_active_workbook(data_rows: u32, validation_attrs: &str) -> Vec<u8> {
    let workbook = r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<bookViews><workbookView activeTab="1"/></bookViews>
<sheets>
<sheet name="Cover" sheetId="1" r:id="rId1"/>
<sheet name="Ledger" sheetId="2" state="veryHidden" r:id="rId2"/>
</sheets>
</workbook>"#;

    let mut rows = String::from(
        r#"<row r="1"><c r="A1" t="inlineStr"><is><t>Code</t></is></c><c r="B1" t="inlineStr"><is><t>Qty</t></is></c></row>"#,
    );
    for r in 2..=data_rows + 1 {
        rows.push_str(&format!(
            r#"<row r="{r}"><c r="A{r}" t="inlineStr"><is><t>C{r}</t></is></c><c r="B{r}"><v>{q}</v></c></row>"#,
            r = r,
            q = r * 3
        ));
    }
    let sheet = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<cols><col min="1" max="1" width="18.7109375" customWidth="1"/></cols>
<sheetData>{rows}</sheetData>
<dataValidations count="1">
<dataValidation type="whole" operator="between" {attrs} sqref="B2:B{last}"><formula1>0</formula1><formula2>999</formula2></dataValidation>
</dataValidations>
</worksheet>"#,
        rows = rows,
        attrs = validation_attrs,
        last = data_rows + 1
    );

    zip_package(&[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("xl/workbook.xml", workbook),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
        ("xl/worksheets/sheet1.xml", EMPTY_SHEET),
        ("xl/worksheets/sheet2.xml", &sheet),
    ])
}

const THEMED_WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Styled" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

const THEMED_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/>
</Relationships>"#;

/// Arial 10 base font; xf 1 is a bold header with a theme-coloured fill and
/// a tinted theme font colour.
const THEMED_STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="2">
<font><sz val="10"/><color theme="1"/><name val="Arial"/><family val="2"/></font>
<font><b/><sz val="10"/><color theme="1" tint="0.499984740745262"/><name val="Arial"/><family val="2"/></font>
</fonts>
<fills count="3">
<fill><patternFill patternType="none"/></fill>
<fill><patternFill patternType="gray125"/></fill>
<fill><patternFill patternType="solid"><fgColor theme="4"/><bgColor indexed="64"/></patternFill></fill>
</fills>
<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
<cellXfs count="2">
<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
<xf numFmtId="0" fontId="1" fillId="2" borderId="0" xfId="0" applyFont="1" applyFill="1"/>
</cellXfs>
</styleSheet>"#;

/// Header row styled with xf 1, `data_rows` plain rows, off-grid widths.
fn themed_workbook(accent1: &str, data_rows: u32) -> Vec<u8> {
    let theme = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme">
<a:themeElements>
<a:clrScheme name="Office">
<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
<a:dk2><a:srgbClr val="44546A"/></a:dk2>
<a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>
<a:accent1><a:srgbClr val="{}"/></a:accent1>
<a:accent2><a:srgbClr val="ED7D31"/></a:accent2>
</a:clrScheme>
</a:themeElements>
</a:theme>"#,
        accent1
    );

    let mut rows = String::from(
        r#"<row r="1"><c r="A1" s="1" t="inlineStr"><is><t>Region</t></is></c><c r="B1" s="1" t="inlineStr"><is><t>Total</t></is></c></row>"#,
    );
    for r in 2..=data_rows + 1 {
        rows.push_str(&format!(
            r#"<row r="{r}"><c r="A{r}" t="inlineStr"><is><t>R{r}</t></is></c><c r="B{r}"><v>{r}</v></c></row>"#,
            r = r
        ));
    }
    let sheet = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetFormatPr defaultRowHeight="12.75"/>
<cols><col min="1" max="2" width="14.5" customWidth="1"/><col min="3" max="3" width="30.25" customWidth="1"/></cols>
<sheetData>{}</sheetData>
</worksheet>"#,
        rows
    );

    zip_package(&[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("xl/workbook.xml", THEMED_WORKBOOK),
        ("xl/_rels/workbook.xml.rels", THEMED_RELS),
        ("xl/styles.xml", THEMED_STYLES),
        ("xl/theme/theme1.xml", &theme),
        ("xl/worksheets/sheet1.xml", &sheet),
    ])
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Archive entries as (name, bytes), in archive order.
fn entries(archive: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut zip = ZipArchive::new(Cursor::new(archive)).unwrap();
    (0..zip.len())
        .map(|i| {
            let mut file = zip.by_index(i).unwrap();
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes).unwrap();
            (file.name().to_string(), bytes)
        })
        .collect()
}

/// One part of a batch workbook as text.
fn part_xml(xlsx: &[u8], part: &str) -> String {
    let mut zip = ZipArchive::new(Cursor::new(xlsx)).unwrap();
    let mut xml = String::new();
    zip.by_name(part).unwrap().read_to_string(&mut xml).unwrap();
    xml
}

fn load_batches(archive: &[u8]) -> Vec<SourceSheet> {
    entries(archive).iter().map(|(_, bytes)| load(bytes).unwrap()).collect()
}

/// Rules flattened to one (rule-without-ranges, range) pair per range,
/// sorted, so rules split across several elements still compare equal.
fn flat_rules(rules: &[ValidationRule]) -> Vec<(String, CellRange)> {
    let mut out: Vec<_> = rules
        .iter()
        .flat_map(|rule| {
            let bare = format!("{:?}", rule.with_ranges(Vec::new()));
            rule.ranges.iter().map(move |range| (bare.clone(), *range))
        })
        .collect();
    out.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.to_string().cmp(&b.1.to_string())));
    out
}

fn data_rows_of(sheet: &SourceSheet) -> Vec<Vec<sheetsplit_engine::Cell>> {
    (2..=sheet.row_count()).map(|r| sheet.row(r)).collect()
}

// ---------------------------------------------------------------------------
// Batching
// ---------------------------------------------------------------------------

#[test]
fn test_2500_rows_in_batches_of_1000() {
    let source_bytes = roster_workbook(2500);
    let source = load(&source_bytes).unwrap();
    assert_eq!(source.row_count(), 2501);

    let archive = split(&source_bytes, 1000).unwrap();
    let names: Vec<_> = entries(&archive).into_iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["Batch_1.xlsx", "Batch_2.xlsx", "Batch_3.xlsx"]);

    let batches = load_batches(&archive);
    let sizes: Vec<_> = batches.iter().map(|b| b.data_row_count()).collect();
    assert_eq!(sizes, [1000, 1000, 500]);

    // Source rows 2, 1002 and 2002 open the three batches.
    for (batch, first_id) in batches.iter().zip([1.0, 1001.0, 2001.0]) {
        assert_eq!(batch.cell(2, 1).value, CellValue::Number(first_id));
    }
    for (i, batch) in batches.iter().enumerate() {
        assert_eq!(batch.name, format!("Batch_{}", i + 1));
    }
}

#[test]
fn test_batches_reproduce_source() {
    let source_bytes = roster_workbook(230);
    let source = load(&source_bytes).unwrap();
    let batches = load_batches(&split(&source_bytes, 100).unwrap());
    assert_eq!(batches.len(), 3);

    let header = source.row(1);
    assert!(header[0].style.font.bold);
    let mut data = Vec::new();
    for batch in &batches {
        assert_eq!(batch.col_count(), COLS);
        assert_eq!(batch.row(1), header, "header differs in {}", batch.name);
        assert_eq!(batch.col_widths, source.col_widths, "widths differ in {}", batch.name);
        data.extend(data_rows_of(batch));
    }
    assert_eq!(data, data_rows_of(&source));
}

#[test]
fn test_styles_and_formats_survive() {
    let source_bytes = roster_workbook(20);
    let batch = &load_batches(&split(&source_bytes, 10).unwrap())[0];

    // Row 8 holds record 7: italic red name.
    let name = batch.cell(8, 2);
    assert!(name.style.font.italic);
    assert_eq!(name.style.font.color.map(|c| c.0), Some(0xC00000));

    // Record 5 is a date-formatted number.
    let when = batch.cell(6, 3);
    assert!(matches!(when.value, CellValue::DateTime(_)), "got {:?}", when.value);
    assert_eq!(when.style.num_format.code(), Some("yyyy-mm-dd"));

    let amount = batch.cell(2, 3);
    assert_eq!(amount.value, CellValue::Number(1.25));
    assert_eq!(amount.style.num_format.code(), Some("#,##0.00"));

    let width = batch.col_widths.get(&2).copied().flatten().unwrap();
    assert!((width - 24.7109375).abs() < 1e-9, "width {}", width);
}

#[test]
fn test_exact_division_last_batch_full() {
    let source_bytes = roster_workbook(300);
    let batches = load_batches(&split(&source_bytes, 100).unwrap());
    assert_eq!(batches.len(), 3);
    assert!(batches.iter().all(|b| b.data_row_count() == 100));
}

#[test]
fn test_header_only_workbook_yields_one_batch() {
    let mut workbook = XlsxWorkbook::new();
    let bold = Format::new().set_bold();
    let ws = workbook.add_worksheet();
    ws.write_string_with_format(0, 0, "Only", &bold).unwrap();
    ws.write_string_with_format(0, 1, "Header", &bold).unwrap();
    let source_bytes = workbook.save_to_buffer().unwrap();

    let archive = split(&source_bytes, 50).unwrap();
    let batches = load_batches(&archive);
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].row_count(), 1);
    assert_eq!(batches[0].cell(1, 2).value, CellValue::Text("Header".into()));
    assert!(batches[0].cell(1, 2).style.font.bold);
}

#[test]
fn test_two_runs_are_identical() {
    let source_bytes = roster_workbook(150);
    let first = load_batches(&split(&source_bytes, 40).unwrap());
    let second = load_batches(&split(&source_bytes, 40).unwrap());
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.row_count(), b.row_count());
        for row in 1..=a.row_count() {
            assert_eq!(a.row(row), b.row(row));
        }
        assert_eq!(a.validations, b.validations);
    }
}

// ---------------------------------------------------------------------------
// Validation rules
// ---------------------------------------------------------------------------

#[test]
fn test_validations_copied_verbatim() {
    let source_bytes = roster_workbook(250);
    let source = load(&source_bytes).unwrap();
    assert_eq!(source.validations.len(), 2);

    for batch in load_batches(&split(&source_bytes, 100).unwrap()) {
        assert_eq!(flat_rules(&batch.validations), flat_rules(&source.validations));
    }
}

#[test]
fn test_validations_relocated_on_request() {
    let source_bytes = roster_workbook(250);
    let options = SplitOptions::new(100).with_validation_mode(ValidationMode::Relocate);
    let output = split_with_progress(&source_bytes, options, |_| {}).unwrap();
    let batches = load_batches(&output.archive);

    let expected_last = [101, 101, 51];
    for (batch, last) in batches.iter().zip(expected_last) {
        let mut sqrefs: Vec<_> = batch.validations.iter().map(|r| r.sqref()).collect();
        sqrefs.sort();
        assert_eq!(sqrefs, [format!("A2:A{}", last), format!("D2:D{}", last)]);
    }
    assert_eq!(output.report.validation_ranges_dropped, 0);
}

// ---------------------------------------------------------------------------
// Hidden sheets
// ---------------------------------------------------------------------------

#[test]
fn test_hidden_active_sheet_is_split() {
    let source_bytes = hidden_active_workbook(25, "");
    let output = split_with_progress(&source_bytes, SplitOptions::new(10), |_| {}).unwrap();
    assert_eq!(output.report.sheet, "Ledger");
    assert_eq!(output.report.unhidden_sheets, ["Ledger"]);
    assert_eq!(output.report.batches, 3);

    let batches = load_batches(&output.archive);
    assert_eq!(batches[2].data_row_count(), 5);
    assert_eq!(batches[1].cell(2, 1).value, CellValue::Text("C12".into()));
    assert_eq!(batches[1].cell(2, 2).value, CellValue::Number(36.0));
    let width = batches[0].col_widths.get(&1).copied().flatten().unwrap();
    assert!((width - 18.7109375).abs() < 1e-9);
    assert_eq!(batches[0].validations[0].sqref(), "B2:B26");
}

// ---------------------------------------------------------------------------
// Raw batch XML
// ---------------------------------------------------------------------------

#[test]
fn test_theme_fill_uses_workbook_theme() {
    let archive = split(&themed_workbook("4472C4", 12), 10).unwrap();
    let batches = entries(&archive);
    assert_eq!(batches.len(), 2);

    for (name, bytes) in &batches {
        let styles = part_xml(bytes, "xl/styles.xml");
        assert!(styles.contains(r#"rgb="FF4472C4""#), "{} styles: {}", name, styles);
        assert!(!styles.contains("FF4F81BD"), "{} used the 2007 palette", name);
        // theme="1" is dk1, lightened by half.
        assert!(styles.contains(r#"rgb="FF7F7F7F""#), "{} styles: {}", name, styles);
    }
}

#[test]
fn test_custom_theme_colour_is_read_from_package() {
    let archive = split(&themed_workbook("1F6E43", 3), 10).unwrap();
    let (_, bytes) = &entries(&archive)[0];
    assert!(part_xml(bytes, "xl/styles.xml").contains(r#"rgb="FF1F6E43""#));

    let batch = load(bytes).unwrap();
    let header = batch.cell(1, 1);
    assert!(header.style.font.bold);
    assert_eq!(header.style.fill.fg_color.map(|c| c.0), Some(0x1F6E43));
}

#[test]
fn test_off_grid_widths_written_verbatim() {
    let archive = split(&themed_workbook("4472C4", 12), 10).unwrap();
    for (name, bytes) in entries(&archive) {
        let sheet = part_xml(&bytes, "xl/worksheets/sheet1.xml");
        assert!(
            sheet.contains(r#"<col min="1" max="2" width="14.5" customWidth="1"/>"#),
            "{} sheet: {}",
            name,
            sheet
        );
        assert!(sheet.contains(r#"<col min="3" max="3" width="30.25" customWidth="1"/>"#));
        assert!(!sheet.contains("14.7109375"), "{} width moved to the pixel grid", name);
    }
}

#[test]
fn test_non_calibri_base_font_carried_to_every_cell() {
    let archive = split(&themed_workbook("4472C4", 12), 10).unwrap();
    let (_, bytes) = &entries(&archive)[1];
    let styles = part_xml(bytes, "xl/styles.xml");
    assert!(styles.contains(r#"<name val="Arial"/>"#), "styles: {}", styles);
    assert!(styles.contains(r#"<sz val="10"/>"#));

    let batch = load(bytes).unwrap();
    let plain = batch.cell(2, 1);
    assert_eq!(plain.value, CellValue::Text("R12".into()));
    assert_eq!(plain.style.font.name.as_deref(), Some("Arial"));
    assert_eq!(plain.style.font.size, Some(10.0));
    assert!(!plain.style.font.bold);
}

// ---------------------------------------------------------------------------
// Progress, report, plan
// ---------------------------------------------------------------------------

#[test]
fn test_progress_reported_after_each_batch() {
    let source_bytes = roster_workbook(45);
    let mut seen = Vec::new();
    let output =
        split_with_progress(&source_bytes, SplitOptions::new(20), |p| seen.push(p)).unwrap();

    assert_eq!(
        seen,
        [
            Progress { batch: 1, total: 3 },
            Progress { batch: 2, total: 3 },
            Progress { batch: 3, total: 3 },
        ]
    );
    assert_eq!(output.report.batches, 3);
    assert_eq!(output.report.data_rows, 45);
    assert_eq!(output.report.validation_rules, 2);
    // Two rules, one range each, in three batches.
    assert_eq!(output.report.validation_ranges_written, 6);
    assert_eq!(output.report.archive_bytes, output.archive.len());
}

#[test]
fn test_plan_writes_nothing() {
    let source_bytes = roster_workbook(2500);
    let plan = plan(&source_bytes, 1000).unwrap();
    assert_eq!(plan.sheet, "Roster");
    assert_eq!(plan.data_rows, 2500);
    let spans: Vec<_> = plan.batches.iter().map(|s| (s.source_start, s.source_end)).collect();
    assert_eq!(spans, [(2, 1001), (1002, 2001), (2002, 2501)]);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn test_garbage_input_is_load_error() {
    let err = split(b"PK\x03\x04 but not really", 100).unwrap_err();
    assert!(matches!(err, Error::Load(_)), "got {:?}", err);
    assert_eq!(err.kind(), "load");
}

#[test]
fn test_zero_rows_per_batch_is_rejected() {
    let err = split(&roster_workbook(5), 0).unwrap_err();
    assert_eq!(err.kind(), "plan");
}

#[test]
fn test_unwritable_batch_is_split_error() {
    // Excel caps prompt titles at 32 characters; the writer refuses longer ones.
    let attrs = format!(r#"showInputMessage="1" promptTitle="{}""#, "T".repeat(40));
    let source_bytes = hidden_active_workbook(5, &attrs);

    let mut progress = 0;
    let err = split_with_progress(&source_bytes, SplitOptions::new(10), |_| progress += 1)
        .unwrap_err();
    match err {
        Error::Split(ref e) => assert_eq!(e.batch, 1),
        ref other => panic!("expected split error, got {:?}", other),
    }
    assert_eq!(err.kind(), "split");
    assert_eq!(progress, 0);
}
