//! Theme colour scheme from `xl/theme/theme1.xml` and Excel's tint rule.
//!
//! Style colours given as `theme="n" tint="t"` resolve against the
//! workbook's own `<a:clrScheme>`. Workbooks without a theme part use the
//! default Office palette.

use log::warn;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use sheetsplit_engine::style::Rgb;

/// Package path used when the workbook rels do not name a theme part.
pub(crate) const THEME_PART: &str = "xl/theme/theme1.xml";

/// Scheme slots in `theme=` index order. Excel swaps the first two pairs
/// relative to document order: index 0 is lt1 and index 1 is dk1.
const SLOTS: [&[u8]; 12] = [
    b"lt1", b"dk1", b"lt2", b"dk2", b"accent1", b"accent2", b"accent3", b"accent4", b"accent5",
    b"accent6", b"hlink", b"folHlink",
];

/// Office theme colours (Excel 2013 onward).
const DEFAULT_COLORS: [u32; 12] = [
    0xFFFFFF, // lt1
    0x000000, // dk1
    0xE7E6E6, // lt2
    0x44546A, // dk2
    0x4472C4, // accent1
    0xED7D31, // accent2
    0xA5A5A5, // accent3
    0xFFC000, // accent4
    0x5B9BD5, // accent5
    0x70AD47, // accent6
    0x0563C1, // hlink
    0x954F72, // folHlink
];

/// The twelve theme colours of a workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemePalette {
    colors: [Rgb; 12],
}

impl Default for ThemePalette {
    fn default() -> Self {
        Self { colors: DEFAULT_COLORS.map(Rgb) }
    }
}

impl ThemePalette {
    /// Colour for a `theme=` index, before tint.
    pub fn get(&self, idx: u8) -> Option<Rgb> {
        self.colors.get(usize::from(idx)).copied()
    }

    /// Colour for a `theme=` index with `tint` applied.
    pub fn resolve(&self, idx: u8, tint: f64) -> Option<Rgb> {
        self.get(idx).map(|c| apply_tint(c, tint))
    }
}

/// Parse the `<a:clrScheme>` of a theme part. Slots the part leaves out keep
/// their default colour.
pub fn parse_theme_xml(xml: &str) -> ThemePalette {
    let mut palette = ThemePalette::default();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_scheme = false;
    let mut slot: Option<usize> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"clrScheme" => in_scheme = true,
                    other if in_scheme => {
                        if let Some(i) = SLOTS.iter().position(|s| *s == other) {
                            slot = Some(i);
                        } else if let (Some(i), Some(rgb)) = (slot, scheme_color(e)) {
                            palette.colors[i] = rgb;
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) if in_scheme => {
                if let (Some(i), Some(rgb)) = (slot, scheme_color(e)) {
                    palette.colors[i] = rgb;
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"clrScheme" => break,
                    other if SLOTS.contains(&other) => slot = None,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("theme clrScheme: {}", e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    palette
}

/// `<a:srgbClr val=..>` or `<a:sysClr lastClr=..>`.
fn scheme_color(e: &BytesStart) -> Option<Rgb> {
    let key: &[u8] = match e.local_name().as_ref() {
        b"srgbClr" => b"val",
        b"sysClr" => b"lastClr",
        _ => return None,
    };
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .and_then(|a| {
            let hex = std::str::from_utf8(&a.value).ok()?.to_string();
            u32::from_str_radix(hex.trim(), 16).ok()
        })
        .filter(|&v| v <= 0xFF_FFFF)
        .map(Rgb)
}

// =============================================================================
// Tint
// =============================================================================

/// Excel's tint rule: scale the HSL luminance towards black (tint < 0) or
/// towards white (tint > 0), keeping hue and saturation.
pub fn apply_tint(color: Rgb, tint: f64) -> Rgb {
    if tint == 0.0 {
        return color;
    }
    let (h, s, l) = rgb_to_hsl(color);
    let l = if tint < 0.0 { l * (1.0 + tint) } else { l * (1.0 - tint) + tint };
    hsl_to_rgb(h, s, l.clamp(0.0, 1.0))
}

fn rgb_to_hsl(color: Rgb) -> (f64, f64, f64) {
    let (r, g, b) = color.components();
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let d = max - min;
    if d.abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }

    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h / 6.0, s, l)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let channel = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    if s.abs() < f64::EPSILON {
        let v = channel(l);
        return Rgb::from_components(v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Rgb::from_components(
        channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        channel(hue_to_rgb(p, q, h)),
        channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    )
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}
