//! Object stream (`/Type /ObjStm`) unpacking.
//!
//! PDF 1.5+ files store most small objects inside compressed object
//! streams; the current S0051 template revision does. The stream body is a
//! table of `objnum offset` pairs followed by the serialized objects.

use crate::error::{Error, Result};
use crate::object::Object;
use crate::parser::parse_object;

/// Extract all objects contained in an object stream.
///
/// Returns `(object_number, object)` pairs in stream order.
pub fn parse_object_stream(stream_obj: &Object) -> Result<Vec<(u32, Object)>> {
    let dict = stream_obj
        .as_dict()
        .ok_or_else(|| Error::InvalidPdf("object stream is not a stream".to_string()))?;

    let n = dict
        .get("N")
        .and_then(|o| o.as_integer())
        .ok_or_else(|| Error::InvalidPdf("object stream missing /N".to_string()))?;
    let first = dict
        .get("First")
        .and_then(|o| o.as_integer())
        .ok_or_else(|| Error::InvalidPdf("object stream missing /First".to_string()))?
        as usize;

    let data = stream_obj.decode_stream_data()?;
    if first > data.len() {
        return Err(Error::InvalidPdf("object stream /First beyond data".to_string()));
    }

    let mut header = &data[..first];
    let mut pairs = Vec::with_capacity(n as usize);
    for _ in 0..n {
        let (id, rest) = read_uint(header)
            .ok_or_else(|| Error::InvalidPdf("bad object stream pair table".to_string()))?;
        let (offset, rest) = read_uint(rest)
            .ok_or_else(|| Error::InvalidPdf("bad object stream pair table".to_string()))?;
        pairs.push((id as u32, offset as usize));
        header = rest;
    }

    let body = &data[first..];
    let mut out = Vec::with_capacity(pairs.len());
    for (id, offset) in pairs {
        if offset >= body.len() {
            return Err(Error::InvalidPdf(format!(
                "object {} offset {} beyond object stream body",
                id, offset
            )));
        }
        let (_, obj) = parse_object(&body[offset..]).map_err(|_| Error::ParseError {
            offset,
            reason: format!("malformed object {} in object stream", id),
        })?;
        out.push((id, obj));
    }
    Ok(out)
}

fn read_uint(input: &[u8]) -> Option<(u64, &[u8])> {
    let start = input.iter().position(|b| !b.is_ascii_whitespace())?;
    let rest = &input[start..];
    let end = rest.iter().position(|b| !b.is_ascii_digit()).unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let n = std::str::from_utf8(&rest[..end]).ok()?.parse().ok()?;
    Some((n, &rest[end..]))
}
