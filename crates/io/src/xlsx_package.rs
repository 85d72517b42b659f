//! XLSX package access: ZIP parts, workbook.xml sheet index and the small
//! XML helpers shared by the style and validation parsers.

use std::collections::HashMap;
use std::io::{Read, Seek};

use log::{debug, info};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::LoadError;

pub(crate) const WORKBOOK_PART: &str = "xl/workbook.xml";
pub(crate) const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
pub(crate) const STYLES_PART: &str = "xl/styles.xml";

// =============================================================================
// ZIP parts
// =============================================================================

/// Read a part from the package. A missing part is `MissingPart`.
pub(crate) fn read_zip_file<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<String, LoadError> {
    let mut file = match archive.by_name(path) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(LoadError::MissingPart(path.to_string()))
        }
        Err(e) => return Err(LoadError::Zip(e)),
    };
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| LoadError::xml(path, e))
}

/// Read a part that a workbook may legitimately omit.
pub(crate) fn read_optional_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<Option<String>, LoadError> {
    match read_zip_file(archive, path) {
        Ok(xml) => Ok(Some(xml)),
        Err(LoadError::MissingPart(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

// =============================================================================
// XML helpers
// =============================================================================

/// Attribute value with entity and character references resolved. A value
/// with an unknown entity is kept as written.
pub(crate) fn attr_string(attr: &Attribute) -> String {
    match attr.decode_and_unescape_value(Reader::from_str("").decoder()) {
        Ok(value) => value.into_owned(),
        Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
    }
}

/// Attribute value parsed as a number (or anything `FromStr`).
pub(crate) fn attr_parse<T: std::str::FromStr>(attr: &Attribute) -> Option<T> {
    std::str::from_utf8(&attr.value).ok().and_then(|s| s.trim().parse().ok())
}

/// SpreadsheetML boolean: "1" or "true".
pub(crate) fn attr_bool(attr: &Attribute) -> bool {
    attr.value.as_ref() == b"1" || attr.value.as_ref() == b"true"
}

/// Collect XML attributes into a Vec of (key, value) pairs.
pub(crate) fn collect_attrs(e: &BytesStart) -> Vec<(Vec<u8>, Vec<u8>)> {
    e.attributes()
        .flatten()
        .map(|a| (a.key.as_ref().to_vec(), a.value.to_vec()))
        .collect()
}

/// Accumulates an element's character data. Entity references may arrive as
/// separate events, so text is collected piecewise until the closing tag.
#[derive(Debug, Default)]
pub(crate) struct TextCollector {
    text: String,
}

impl TextCollector {
    pub fn push(&mut self, event: &Event) {
        match event {
            Event::Text(t) => match t.xml_content() {
                Ok(text) => self.text.push_str(&text),
                Err(_) => self.text.push_str(&String::from_utf8_lossy(t)),
            },
            Event::CData(c) => self.text.push_str(&String::from_utf8_lossy(c)),
            Event::GeneralRef(r) => {
                if let Ok(Some(ch)) = r.resolve_char_ref() {
                    self.text.push(ch);
                    return;
                }
                let name = String::from_utf8_lossy(r);
                match resolve_predefined_entity(&name) {
                    Some(text) => self.text.push_str(text),
                    None => {
                        self.text.push('&');
                        self.text.push_str(&name);
                        self.text.push(';');
                    }
                }
            }
            _ => {}
        }
    }

    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}

// =============================================================================
// Workbook index
// =============================================================================

/// Visibility state of a sheet as declared in workbook.xml.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetState {
    Visible,
    Hidden,
    VeryHidden,
}

impl SheetState {
    fn from_xml(s: &str) -> Self {
        match s {
            "hidden" => Self::Hidden,
            "veryHidden" => Self::VeryHidden,
            _ => Self::Visible,
        }
    }
}

/// One `<sheet>` entry of workbook.xml with its resolved worksheet part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    pub name: String,
    pub state: SheetState,
    pub rel_id: String,
    /// Package path of the worksheet XML, e.g. `xl/worksheets/sheet1.xml`.
    pub path: String,
}

/// The sheets of a workbook in tab order plus the active tab.
#[derive(Debug, Clone)]
pub struct WorkbookIndex {
    pub sheets: Vec<SheetEntry>,
    /// `workbookView/@activeTab` as declared (0 when absent).
    pub active_tab: usize,
    /// Package path of the theme part, when the rels name one.
    pub theme_path: Option<String>,
}

impl WorkbookIndex {
    /// Build the index from workbook.xml and its relationships part.
    pub fn parse(workbook_xml: &str, rels_xml: &str) -> Result<Self, LoadError> {
        let rels = parse_relationships(rels_xml)?;

        let mut reader = Reader::from_str(workbook_xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();
        let mut sheets = Vec::new();
        let mut active_tab = 0usize;
        let mut seen_view = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => match e.name().as_ref() {
                    b"sheet" => {
                        let mut name = None;
                        let mut rel_id = None;
                        let mut state = SheetState::Visible;
                        for attr in e.attributes().flatten() {
                            let key = attr.key.as_ref();
                            if key == b"name" {
                                name = Some(attr_string(&attr));
                            } else if key == b"state" {
                                state = SheetState::from_xml(&attr_string(&attr));
                            } else if key == b"r:id" || key.ends_with(b":id") {
                                rel_id = Some(attr_string(&attr));
                            }
                        }
                        if let (Some(name), Some(rel_id)) = (name, rel_id) {
                            let path = rels
                                .targets
                                .get(&rel_id)
                                .map(|t| resolve_target(t))
                                .ok_or_else(|| {
                                    LoadError::MissingPart(format!(
                                        "relationship {} for sheet '{}'",
                                        rel_id, name
                                    ))
                                })?;
                            sheets.push(SheetEntry { name, state, rel_id, path });
                        }
                    }
                    // Only the first view decides the active tab
                    b"workbookView" if !seen_view => {
                        seen_view = true;
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"activeTab" {
                                active_tab = attr_parse(&attr).unwrap_or(0);
                            }
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(LoadError::xml(WORKBOOK_PART, e)),
                _ => {}
            }
            buf.clear();
        }

        if sheets.is_empty() {
            return Err(LoadError::NoSheets);
        }
        let theme_path = rels.theme.as_deref().map(resolve_target);
        Ok(Self { sheets, active_tab, theme_path })
    }

    /// Mark every hidden or very hidden sheet visible. Returns the names changed.
    pub fn force_visible(&mut self) -> Vec<String> {
        let mut changed = Vec::new();
        for sheet in &mut self.sheets {
            if sheet.state != SheetState::Visible {
                info!("Sheet '{}' was {:?}, forcing visible", sheet.name, sheet.state);
                sheet.state = SheetState::Visible;
                changed.push(sheet.name.clone());
            }
        }
        changed
    }

    /// Index of the sheet to split. Out-of-range tabs fall back to the first sheet.
    pub fn active_index(&self) -> usize {
        if self.active_tab < self.sheets.len() {
            self.active_tab
        } else {
            debug!(
                "activeTab {} out of range for {} sheets, using first sheet",
                self.active_tab,
                self.sheets.len()
            );
            0
        }
    }

    pub fn active_sheet(&self) -> &SheetEntry {
        &self.sheets[self.active_index()]
    }
}

/// workbook.xml.rels: rId -> Target, plus the theme part's target.
#[derive(Debug, Default)]
struct Relationships {
    targets: HashMap<String, String>,
    theme: Option<String>,
}

fn parse_relationships(rels_xml: &str) -> Result<Relationships, LoadError> {
    let mut rels = Relationships::default();
    let mut reader = Reader::from_str(rels_xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                let mut is_theme = false;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = Some(attr_string(&attr)),
                        b"Target" => target = Some(attr_string(&attr)),
                        b"Type" => is_theme = attr.value.ends_with(b"/theme"),
                        _ => {}
                    }
                }
                if let Some(target) = target {
                    if is_theme && rels.theme.is_none() {
                        rels.theme = Some(target.clone());
                    }
                    if let Some(id) = id {
                        rels.targets.insert(id, target);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(LoadError::xml(WORKBOOK_RELS_PART, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

/// Relationship targets are relative to `xl/` unless absolute.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target.trim_start_matches("./")),
    }
}
