//! Text widget writing.
//!
//! A text value lands in two places: `/V` on the field and a freshly
//! synthesized `/AP /N` Form XObject on each widget, because plenty of
//! viewers ignore `NeedAppearances` for filled-in forms. Layout follows the
//! field flags: comb cells, word-wrapped multiline, or a single line.

use bitflags::bitflags;
use log::debug;

use crate::document::Document;
use crate::introspect::{inherited_int, kid_refs, widget_rect};
use crate::object::{Dict, Object, ObjectRef};

bitflags! {
    /// Form field flags (`/Ff`, ISO 32000-1 Table 221/226/228).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FieldFlags: u32 {
        /// Text: wrap into multiple lines
        const MULTILINE = 1 << 12;
        /// Button: radio may not be toggled off by the user
        const NO_TOGGLE_TO_OFF = 1 << 14;
        /// Button: radio group
        const RADIO = 1 << 15;
        /// Button: push button (stateless)
        const PUSHBUTTON = 1 << 16;
        /// Text: comb layout, one cell per character up to /MaxLen
        const COMB = 1 << 24;
    }
}

/// Write a text value to a field and its widgets.
///
/// `/V` goes on the field; each kid widget (or the field itself when the
/// widget is merged in) gets the synthesized appearance. Returns whether
/// anything was written.
pub fn write_text_field(doc: &mut Document, field_ref: ObjectRef, value: &str) -> bool {
    let kids = match doc.get(field_ref).and_then(|o| o.as_dict()) {
        Some(dict) => kid_refs(doc, dict),
        None => return false,
    };

    let Some(dict) = doc.get_mut(field_ref).and_then(|o| o.as_dict_mut()) else {
        return false;
    };
    dict.insert("V".to_string(), Object::text_string(value));

    if kids.is_empty() {
        set_widget_appearance(doc, field_ref, value);
    } else {
        for kid in kids {
            if let Some(kid_dict) = doc.get_mut(kid).and_then(|o| o.as_dict_mut()) {
                kid_dict.insert("V".to_string(), Object::text_string(value));
            }
            set_widget_appearance(doc, kid, value);
        }
    }
    true
}

/// Synthesize and install the `/AP /N` stream for one widget.
///
/// Widgets without a usable `/Rect` are left alone; the `/V` written by the
/// caller still round-trips.
fn set_widget_appearance(doc: &mut Document, widget_ref: ObjectRef, value: &str) {
    let Some(widget) = doc.get(widget_ref).and_then(|o| o.as_dict()) else {
        return;
    };
    let Some([x0, y0, x1, y1]) = widget_rect(doc, widget) else {
        debug!("widget {} has no /Rect, appearance skipped", widget_ref);
        return;
    };

    let width = (x1 - x0).abs().max(1.0);
    let height = (y1 - y0).abs().max(1.0);
    let ff = FieldFlags::from_bits_truncate(inherited_int(doc, widget, "Ff").unwrap_or(0) as u32);
    let max_len = inherited_int(doc, widget, "MaxLen").filter(|&n| n > 0);

    let content = appearance_content(value, width, height, ff, max_len);
    let stream_ref = doc.insert(form_xobject(content, width, height));

    let Some(widget) = doc.get_mut(widget_ref).and_then(|o| o.as_dict_mut()) else {
        return;
    };
    match widget.get_mut("AP").and_then(|o| o.as_dict_mut()) {
        Some(ap) => {
            ap.insert("N".to_string(), Object::Reference(stream_ref));
        },
        None => {
            let mut ap = Dict::new();
            ap.insert("N".to_string(), Object::Reference(stream_ref));
            widget.insert("AP".to_string(), Object::Dictionary(ap));
        },
    }
}

/// Build the appearance content stream for a text value.
fn appearance_content(
    value: &str,
    width: f64,
    height: f64,
    ff: FieldFlags,
    max_len: Option<i64>,
) -> Vec<u8> {
    let font_size = (height * 0.6).clamp(7.0, 11.0);
    let leading = font_size * 1.15;
    let max_lines = ((height / leading).floor() as usize).max(1);

    let is_comb = ff.contains(FieldFlags::COMB) && max_len.is_some();

    let mut parts: Vec<String> = vec![
        "q".to_string(),
        "BT".to_string(),
        format!("/F0 {:.2} Tf", font_size),
        "0 g".to_string(),
    ];

    if is_comb {
        let max_len = max_len.unwrap() as usize;
        let text: String = value.chars().filter(|c| !c.is_whitespace()).take(max_len).collect();
        let cell_width = width / max_len as f64;
        let baseline_y = ((height - font_size) / 2.0).max(1.0);
        for (idx, ch) in text.chars().enumerate() {
            let ch_width = approx_text_width(&ch.to_string(), font_size);
            let cell_x = idx as f64 * cell_width;
            let text_x = cell_x + ((cell_width - ch_width) / 2.0).max(0.0);
            parts.push(format!("1 0 0 1 {:.3} {:.3} Tm", text_x, baseline_y));
            parts.push(format!("({}) Tj", pdf_literal_string(&ch.to_string())));
        }
    } else {
        let take = if ff.contains(FieldFlags::MULTILINE) {
            max_lines
        } else {
            1
        };
        let lines = wrap_text_lines(value, width - 4.0, font_size);
        let mut y = height - font_size - 1.0;
        for line in lines.iter().take(take) {
            parts.push(format!("1 0 0 1 2 {:.3} Tm", y));
            parts.push(format!("({}) Tj", pdf_literal_string(line)));
            y -= leading;
        }
    }

    parts.push("ET".to_string());
    parts.push("Q".to_string());
    let mut content = parts.join("\n");
    content.push('\n');
    content.into_bytes()
}

/// Form XObject wrapping a content stream, Helvetica/WinAnsi as `/F0`.
fn form_xobject(content: Vec<u8>, width: f64, height: f64) -> Object {
    let mut font = Dict::new();
    font.insert("Type".to_string(), Object::Name("Font".to_string()));
    font.insert("Subtype".to_string(), Object::Name("Type1".to_string()));
    font.insert("BaseFont".to_string(), Object::Name("Helvetica".to_string()));
    font.insert("Encoding".to_string(), Object::Name("WinAnsiEncoding".to_string()));

    let mut fonts = Dict::new();
    fonts.insert("F0".to_string(), Object::Dictionary(font));
    let mut resources = Dict::new();
    resources.insert("Font".to_string(), Object::Dictionary(fonts));

    let mut dict = Dict::new();
    dict.insert("Type".to_string(), Object::Name("XObject".to_string()));
    dict.insert("Subtype".to_string(), Object::Name("Form".to_string()));
    dict.insert(
        "BBox".to_string(),
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(width),
            Object::Real(height),
        ]),
    );
    dict.insert("Resources".to_string(), Object::Dictionary(resources));

    Object::Stream {
        dict,
        data: bytes::Bytes::from(content),
    }
}

/// Escaped PDF literal string (WinAnsi/CP1252) for appearance streams.
pub fn pdf_literal_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let byte = cp1252_byte(ch).unwrap_or(b'?');
        match byte {
            b'(' | b')' | b'\\' => {
                out.push('\\');
                out.push(byte as char);
            },
            0x20..=0x7E => out.push(byte as char),
            _ => out.push_str(&format!("\\{:03o}", byte)),
        }
    }
    out
}

/// CP1252 encoding of one character (the 0x80..0x9F block included).
fn cp1252_byte(ch: char) -> Option<u8> {
    let code = ch as u32;
    match code {
        0x00..=0x7F => Some(code as u8),
        0xA0..=0xFF => Some(code as u8),
        0x20AC => Some(0x80),
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84),
        0x2026 => Some(0x85),
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x02C6 => Some(0x88),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x2039 => Some(0x8B),
        0x0152 => Some(0x8C),
        0x017D => Some(0x8E),
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95),
        0x2013 => Some(0x96),
        0x2014 => Some(0x97),
        0x02DC => Some(0x98),
        0x2122 => Some(0x99),
        0x0161 => Some(0x9A),
        0x203A => Some(0x9B),
        0x0153 => Some(0x9C),
        0x017E => Some(0x9E),
        0x0178 => Some(0x9F),
        _ => None,
    }
}

/// Width estimate for Helvetica, good enough for wrapping decisions.
pub fn approx_text_width(text: &str, font_size: f64) -> f64 {
    let mut total = 0.0;
    for ch in text.chars() {
        let factor = if "il.,:;|!'` ".contains(ch) {
            0.28
        } else if "mwMW@#%&".contains(ch) {
            0.86
        } else {
            0.56
        };
        total += factor * font_size;
    }
    total
}

/// Hard-break a token that does not fit a line on its own.
fn split_long_token(token: &str, max_width: f64, font_size: f64) -> Vec<String> {
    if token.is_empty() {
        return vec![String::new()];
    }
    let mut out = Vec::new();
    let mut current = String::new();
    for ch in token.chars() {
        let mut candidate = current.clone();
        candidate.push(ch);
        if !current.is_empty() && approx_text_width(&candidate, font_size) > max_width {
            out.push(current);
            current = ch.to_string();
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    if out.is_empty() {
        out.push(token.to_string());
    }
    out
}

/// Word-wrap `text` into lines of at most `max_width` points.
pub fn wrap_text_lines(text: &str, max_width: f64, font_size: f64) -> Vec<String> {
    if max_width <= 1.0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for para in text.replace('\r', "").split('\n') {
        let words: Vec<&str> = para.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in words {
            if approx_text_width(word, font_size) > max_width {
                let chunks = split_long_token(word, max_width, font_size);
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let (last, full) = chunks.split_last().expect("split_long_token never empty");
                lines.extend(full.iter().cloned());
                current = last.clone();
                continue;
            }

            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if approx_text_width(&candidate, font_size) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current = word.to_string();
            }
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
