//! PDF Name codec and state-label normalization.
//!
//! The S0050/S0051 template family spells the same German state label three
//! different ways: as UTF-8 name bytes (`Einschr#C3#A4nkungen`), as
//! PDFDocEncoding/Latin-1 bytes (`Einschr#E4nkungen`), and as CESU-8 low
//! surrogates left behind by a non-conforming form filler. Every decode in
//! the crate funnels through [`decode_name_bytes`]; every Name written to
//! disk goes through [`encode_name`]. There are no ad-hoc charset repairs
//! anywhere else.

/// Encode a decoded name as its on-disk byte form, `/` included.
///
/// Each UTF-8 byte of `s` passes through verbatim when it is a regular
/// character; everything else (including `#` itself and the PDF delimiters)
/// becomes a two-digit `#XX` escape. This is the canonical write form: a
/// name written here and re-read through [`decode_name_bytes`] compares
/// equal, which is what makes `/AS` vs. `/AP /N` key checks reliable.
pub fn encode_name(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len() + 1);
    out.push(b'/');
    for byte in s.bytes() {
        if is_regular_name_byte(byte) {
            out.push(byte);
        } else {
            out.extend_from_slice(format!("#{:02X}", byte).as_bytes());
        }
    }
    out
}

/// Regular characters per ISO 32000-1 §7.3.5: printable ASCII that is
/// neither `#` nor a delimiter.
fn is_regular_name_byte(byte: u8) -> bool {
    matches!(byte, 0x21..=0x7E)
        && !matches!(
            byte,
            b'#' | b'/' | b'%' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}'
        )
}

/// Decode raw name bytes (everything after the `/`) into a Unicode string.
///
/// Pipeline: expand `#XX` escapes, fold CESU-8 low surrogates back into the
/// Latin-1 byte they stand for, then attempt UTF-8 and fall back to Latin-1.
pub fn decode_name_bytes(raw: &[u8]) -> String {
    let mut bytes = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'#' && i + 2 < raw.len() {
            if let Some(byte) = hex_pair(raw[i + 1], raw[i + 2]) {
                bytes.push(byte);
                i += 3;
                continue;
            }
        }
        bytes.push(raw[i]);
        i += 1;
    }

    let bytes = recover_low_surrogates(bytes);

    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

/// Decode a name that is already text (schema labels, `/V` values read back
/// as strings). Characters above U+00FF are treated as UTF-8 sequences,
/// everything else as a single byte, then the byte pipeline applies.
pub fn decode_name(value: &str) -> String {
    if !value.contains('#') && value.is_ascii() {
        return value.to_string();
    }
    let mut raw = Vec::with_capacity(value.len());
    for ch in value.chars() {
        let code = ch as u32;
        if code <= 0xFF {
            raw.push(code as u8);
        } else {
            let mut buf = [0u8; 4];
            raw.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        }
    }
    decode_name_bytes(&raw)
}

fn hex_pair(hi: u8, lo: u8) -> Option<u8> {
    let hi = (hi as char).to_digit(16)?;
    let lo = (lo as char).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}

/// Fold CESU-8 encoded low surrogates (U+DC00..U+DCFF) back into the
/// Latin-1 byte each one stands for. Such sequences are produced when a
/// previous tool round-tripped undecodable name bytes through a
/// surrogateescape decoder and wrote the result back verbatim.
fn recover_low_surrogates(bytes: Vec<u8>) -> Vec<u8> {
    if !bytes.contains(&0xED) {
        return bytes;
    }
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if i + 2 < bytes.len() && bytes[i] == 0xED && (0xB0..=0xB3).contains(&bytes[i + 1]) {
            let b1 = bytes[i + 1] as u32;
            let b2 = bytes[i + 2] as u32;
            if (0x80..=0xBF).contains(&(b2 as u8)) {
                let code = 0xD000 | ((b1 & 0x3F) << 6) | (b2 & 0x3F);
                if (0xDC00..=0xDCFF).contains(&code) {
                    out.push((code - 0xDC00) as u8);
                    i += 3;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

/// Normalize a state label for comparison: decode escapes, repair known
/// mojibake, collapse whitespace, lowercase.
pub fn normalize_label(value: &str) -> String {
    let text = value.trim();
    if text.is_empty() {
        return String::new();
    }
    let mut text = decode_name(text);

    // Misdecodings of ä ö ü ß seen in submitted form values and in names
    // written by earlier tool versions.
    const REPAIRS: &[(&str, &str)] = &[
        ("\u{c3}\u{a4}", "\u{e4}"),  // Ã¤ -> ä
        ("\u{c3}\u{b6}", "\u{f6}"),  // Ã¶ -> ö
        ("\u{c3}\u{bc}", "\u{fc}"),  // Ã¼ -> ü
        ("\u{c3}\u{9f}", "\u{df}"),  // ÃŸ -> ß
        ("\u{92cd}", "\u{e4}"),      // 鋍 -> ä
        ("\u{92d8}", "\u{e4}"),      // 鋘 -> ä
        ("\u{9c10}", "\u{f6}"),      // 鰐 -> ö
        ("\u{9ee8}", "\u{fc}"),      // 黨 -> ü
        ("\u{9c03}", "\u{f6}"),      // 鰃 -> ö
    ];
    for (wrong, right) in REPAIRS {
        if text.contains(wrong) {
            text = text.replace(wrong, right);
        }
    }

    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Map a normalized label to its semantic token.
///
/// Two labels select the same radio option iff their tokens are equal; the
/// substring tests absorb whatever encoding damage survived
/// [`normalize_label`].
pub fn canonical_token(normalized: &str) -> String {
    if normalized.is_empty() {
        return String::new();
    }

    let compact: String = normalized
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    let compact = compact.split_whitespace().collect::<Vec<_>>().join(" ");

    if compact.contains("keine angabe") {
        return "keine_angabe".to_string();
    }
    if compact.contains("personelle") && compact.contains("hilfe") {
        return "personelle_hilfe".to_string();
    }
    if compact.contains("nicht") && compact.contains("durchf") {
        return "nicht_durchfuehrbar".to_string();
    }
    if compact.contains("einschr") {
        return "einschraenkungen".to_string();
    }
    if compact.contains("keine") && (compact.contains("beeintr") || compact.contains("beein")) {
        return "keine_beeintraechtigungen".to_string();
    }
    if compact == "ja" || compact == "yes" {
        return "yes".to_string();
    }
    if compact == "nein" || compact == "no" {
        return "no".to_string();
    }

    compact
}

/// Semantic token of an arbitrary (possibly damaged) label.
pub fn state_token(label: &str) -> String {
    canonical_token(&normalize_label(label))
}

/// Whether a decoded state name is the Off state.
pub fn is_off(name: &str) -> bool {
    normalize_label(name) == "off"
}
