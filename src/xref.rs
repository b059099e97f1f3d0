//! Cross-reference parsing.
//!
//! Supports classic xref tables, cross-reference streams (PDF 1.5+) and
//! hybrid-reference files (`/XRefStm`), following `/Prev` chains. Entries
//! from newer sections win over older ones.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::object::{Dict, Object};
use crate::parser::parse_indirect_object;

/// Where an object lives in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrefEntry {
    /// Free entry (object deleted or never used)
    Free,
    /// Uncompressed object at a byte offset
    Uncompressed {
        /// Byte offset of the `id gen obj` header
        offset: u64,
    },
    /// Object stored inside an object stream
    InObjectStream {
        /// Object number of the containing `/Type /ObjStm` stream
        stream_id: u32,
        /// Index of the object within the stream
        index: u32,
    },
}

/// Merged cross-reference table plus merged trailer dictionary.
#[derive(Debug, Default)]
pub struct CrossRefTable {
    entries: HashMap<u32, XrefEntry>,
    trailer: Dict,
}

impl CrossRefTable {
    /// Entry for an object number, if any section mentioned it.
    pub fn get(&self, object_number: u32) -> Option<&XrefEntry> {
        self.entries.get(&object_number)
    }

    /// All object numbers with entries.
    pub fn object_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    /// The merged trailer (keys from the newest section win).
    pub fn trailer(&self) -> &Dict {
        &self.trailer
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert_if_new(&mut self, id: u32, entry: XrefEntry) {
        self.entries.entry(id).or_insert(entry);
    }

    fn merge_trailer(&mut self, dict: &Dict) {
        for (k, v) in dict {
            if !self.trailer.contains_key(k) {
                self.trailer.insert(k.clone(), v.clone());
            }
        }
    }
}

/// Locate the byte offset given by the last `startxref` in the file.
pub fn find_xref_offset(data: &[u8]) -> Result<u64> {
    let needle = b"startxref";
    let tail_start = data.len().saturating_sub(2048);
    let tail = &data[tail_start..];

    let mut found = None;
    let mut pos = 0;
    while pos + needle.len() <= tail.len() {
        if &tail[pos..pos + needle.len()] == needle {
            found = Some(pos);
        }
        pos += 1;
    }
    let pos = found.ok_or(Error::InvalidXref)?;

    let after = &tail[pos + needle.len()..];
    let digits: String = after
        .iter()
        .skip_while(|&&b| b == b' ' || b == b'\r' || b == b'\n')
        .take_while(|&&b| b.is_ascii_digit())
        .map(|&b| b as char)
        .collect();
    digits.parse::<u64>().map_err(|_| Error::InvalidXref)
}

/// Parse the cross-reference chain starting at `offset`.
pub fn parse_xref(data: &[u8], offset: u64) -> Result<CrossRefTable> {
    let mut table = CrossRefTable::default();
    let mut visited = HashSet::new();
    parse_section(data, offset, &mut table, &mut visited)?;
    if table.is_empty() {
        return Err(Error::InvalidXref);
    }
    Ok(table)
}

fn parse_section(
    data: &[u8],
    offset: u64,
    table: &mut CrossRefTable,
    visited: &mut HashSet<u64>,
) -> Result<()> {
    if !visited.insert(offset) {
        // Cycle in /Prev chain; stop quietly with what we have.
        return Ok(());
    }
    let offset = offset as usize;
    if offset >= data.len() {
        return Err(Error::InvalidXref);
    }

    let slice = &data[offset..];
    let at_keyword = slice
        .iter()
        .position(|&b| !b.is_ascii_whitespace())
        .map(|i| slice[i..].starts_with(b"xref"))
        .unwrap_or(false);

    let trailer = if at_keyword {
        parse_table_section(slice, table)?
    } else {
        parse_stream_section(slice, table)?
    };

    // Hybrid-reference files: the stream's entries complement the table.
    if let Some(xrefstm) = trailer.get("XRefStm").and_then(|o| o.as_integer()) {
        parse_section(data, xrefstm as u64, table, visited)?;
    }

    table.merge_trailer(&trailer);

    if let Some(prev) = trailer.get("Prev").and_then(|o| o.as_integer()) {
        parse_section(data, prev as u64, table, visited)?;
    }
    Ok(())
}

/// Classic `xref` table: subsections of 20-byte entries, then `trailer`.
fn parse_table_section(slice: &[u8], table: &mut CrossRefTable) -> Result<Dict> {
    let mut pos = slice
        .iter()
        .position(|&b| !b.is_ascii_whitespace())
        .ok_or(Error::InvalidXref)?;
    pos += 4; // "xref"

    loop {
        pos = skip_whitespace(slice, pos);
        if slice[pos..].starts_with(b"trailer") {
            pos += b"trailer".len();
            break;
        }

        let (start, p) = read_number(slice, pos).ok_or(Error::InvalidXref)?;
        let (count, p) = read_number(slice, skip_whitespace(slice, p)).ok_or(Error::InvalidXref)?;
        pos = skip_whitespace(slice, p);

        for i in 0..count {
            if pos + 18 > slice.len() {
                return Err(Error::InvalidXref);
            }
            let entry = &slice[pos..pos + 18];
            let offset: u64 = std::str::from_utf8(&entry[0..10])
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .ok_or(Error::InvalidXref)?;
            let kind = entry[17];
            let id = (start + i) as u32;
            match kind {
                b'n' => table.insert_if_new(id, XrefEntry::Uncompressed { offset }),
                b'f' => table.insert_if_new(id, XrefEntry::Free),
                _ => return Err(Error::InvalidXref),
            }
            // Entries are 20 bytes but some writers use 19; resync on digits.
            pos += 18;
            pos = skip_whitespace(slice, pos);
        }
    }

    let (_, obj) = crate::parser::parse_object(&slice[pos..]).map_err(|_| Error::InvalidXref)?;
    match obj {
        Object::Dictionary(d) => Ok(d),
        _ => Err(Error::InvalidXref),
    }
}

/// Cross-reference stream: `/Type /XRef` with packed binary rows.
fn parse_stream_section(slice: &[u8], table: &mut CrossRefTable) -> Result<Dict> {
    let (_, _, _, obj) = parse_indirect_object(slice)?;
    let (dict, data) = match &obj {
        Object::Stream { dict, .. } => (dict.clone(), obj.decode_stream_data()?),
        _ => return Err(Error::InvalidXref),
    };

    let w: Vec<usize> = dict
        .get("W")
        .and_then(|o| o.as_array())
        .map(|arr| arr.iter().filter_map(|o| o.as_integer()).map(|i| i as usize).collect())
        .ok_or(Error::InvalidXref)?;
    if w.len() < 3 {
        return Err(Error::InvalidXref);
    }
    let row_len: usize = w.iter().sum();
    if row_len == 0 {
        return Err(Error::InvalidXref);
    }

    let size = dict.get("Size").and_then(|o| o.as_integer()).unwrap_or(0);
    let index: Vec<i64> = dict
        .get("Index")
        .and_then(|o| o.as_array())
        .map(|arr| arr.iter().filter_map(|o| o.as_integer()).collect())
        .unwrap_or_else(|| vec![0, size]);

    let mut rows = data.chunks_exact(row_len);
    for pair in index.chunks(2) {
        let (start, count) = (pair[0], *pair.get(1).unwrap_or(&0));
        for i in 0..count {
            let row = rows.next().ok_or(Error::InvalidXref)?;
            let (f1, rest) = row.split_at(w[0]);
            let (f2, f3) = rest.split_at(w[1]);
            // A zero-width first field defaults to type 1.
            let kind = if w[0] == 0 { 1 } else { be_int(f1) };
            let id = (start + i) as u32;
            match kind {
                0 => table.insert_if_new(id, XrefEntry::Free),
                1 => table.insert_if_new(id, XrefEntry::Uncompressed { offset: be_int(f2) }),
                2 => table.insert_if_new(
                    id,
                    XrefEntry::InObjectStream {
                        stream_id: be_int(f2) as u32,
                        index: be_int(f3) as u32,
                    },
                ),
                _ => {}, // Unknown types must be treated as null references.
            }
        }
    }

    Ok(dict)
}

fn be_int(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

fn skip_whitespace(slice: &[u8], mut pos: usize) -> usize {
    while pos < slice.len() && slice[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

fn read_number(slice: &[u8], pos: usize) -> Option<(i64, usize)> {
    let mut end = pos;
    while end < slice.len() && slice[end].is_ascii_digit() {
        end += 1;
    }
    if end == pos {
        return None;
    }
    let n = std::str::from_utf8(&slice[pos..end]).ok()?.parse().ok()?;
    Some((n, end))
}
