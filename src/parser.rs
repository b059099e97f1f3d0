//! PDF object parser.
//!
//! Builds [`Object`] values out of the token stream: dictionaries, arrays,
//! strings (with escape decoding), names, references and streams. The
//! template's object graph is loosely typed; the walker side of the crate
//! uses exhaustive pattern matching over the parsed variants.

use nom::IResult;

use crate::error::{Error, Result};
use crate::lexer::{skip_ws, token, Token};
use crate::object::{Dict, Object, ObjectRef};

/// Decode escape sequences in a literal string's raw bytes.
///
/// Handles \n \r \t \b \f \\ \( \), octal \ddd (1-3 digits) and
/// backslash-newline line continuations. Unknown escapes drop the backslash,
/// per ISO 32000-1 §7.3.4.2.
pub fn decode_literal_string_escapes(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] != b'\\' {
            out.push(raw[i]);
            i += 1;
            continue;
        }
        i += 1;
        if i >= raw.len() {
            break;
        }
        match raw[i] {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'(' => out.push(b'('),
            b')' => out.push(b')'),
            b'\\' => out.push(b'\\'),
            b'\r' => {
                // Line continuation; swallow an LF of a CRLF pair too.
                if i + 1 < raw.len() && raw[i + 1] == b'\n' {
                    i += 1;
                }
            },
            b'\n' => {},
            b'0'..=b'7' => {
                let mut value: u32 = 0;
                let mut digits = 0;
                while digits < 3 && i < raw.len() && (b'0'..=b'7').contains(&raw[i]) {
                    value = value * 8 + (raw[i] - b'0') as u32;
                    i += 1;
                    digits += 1;
                }
                out.push((value & 0xFF) as u8);
                continue;
            },
            other => out.push(other),
        }
        i += 1;
    }
    out
}

/// Decode a hex string's digit bytes (whitespace skipped, odd digit padded).
pub fn decode_hex(hex_bytes: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(hex_bytes.len() / 2);
    let mut hi: Option<u8> = None;
    for &b in hex_bytes {
        if b.is_ascii_whitespace() {
            continue;
        }
        let digit = (b as char)
            .to_digit(16)
            .ok_or_else(|| Error::ParseError {
                offset: 0,
                reason: format!("invalid hex digit 0x{:02X}", b),
            })? as u8;
        match hi.take() {
            Some(h) => out.push(h * 16 + digit),
            None => hi = Some(digit),
        }
    }
    if let Some(h) = hi {
        out.push(h * 16);
    }
    Ok(out)
}

/// Parse a single object, following `n g R` reference syntax by lookahead.
pub fn parse_object(input: &[u8]) -> IResult<&[u8], Object> {
    let (rest, tok) = token(input)?;
    match tok {
        Token::Null => Ok((rest, Object::Null)),
        Token::True => Ok((rest, Object::Boolean(true))),
        Token::False => Ok((rest, Object::Boolean(false))),
        Token::Real(r) => Ok((rest, Object::Real(r))),
        Token::Integer(i) => {
            // Lookahead for "gen R": only then is this a reference.
            if let Ok((after_gen, Token::Integer(gen))) = token(rest) {
                if let Ok((after_r, Token::R)) = token(after_gen) {
                    if i >= 0 && gen >= 0 {
                        return Ok((
                            after_r,
                            Object::Reference(ObjectRef::new(i as u32, gen as u16)),
                        ));
                    }
                }
            }
            Ok((rest, Object::Integer(i)))
        },
        Token::LiteralString(raw) => {
            Ok((rest, Object::String(decode_literal_string_escapes(raw))))
        },
        Token::HexString(raw) => {
            let bytes = decode_hex(raw)
                .map_err(|_| nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::HexDigit)))?;
            Ok((rest, Object::String(bytes)))
        },
        Token::Name(name) => Ok((rest, Object::Name(name))),
        Token::ArrayStart => parse_array_body(rest),
        Token::DictStart => parse_dict_body(rest),
        _ => Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Alt))),
    }
}

fn parse_array_body(mut input: &[u8]) -> IResult<&[u8], Object> {
    let mut items = Vec::new();
    loop {
        if let Ok((rest, Token::ArrayEnd)) = token(input) {
            return Ok((rest, Object::Array(items)));
        }
        let (rest, obj) = parse_object(input)?;
        items.push(obj);
        input = rest;
    }
}

fn parse_dict_body(mut input: &[u8]) -> IResult<&[u8], Object> {
    let mut dict = Dict::new();
    loop {
        match token(input)? {
            (rest, Token::DictEnd) => return Ok((rest, Object::Dictionary(dict))),
            (rest, Token::Name(key)) => {
                let (rest, value) = parse_object(rest)?;
                dict.insert(key, value);
                input = rest;
            },
            _ => {
                return Err(nom::Err::Error(nom::error::Error::new(
                    input,
                    nom::error::ErrorKind::Tag,
                )))
            },
        }
    }
}

/// Parse an indirect object (`id gen obj ... endobj`), including any stream
/// payload. Returns the remaining input after `endobj`.
///
/// Stream extent comes from an inline integer `/Length` when it checks out
/// against the following `endstream`; otherwise the data is delimited by
/// scanning for the keyword, which also covers `/Length` given as an
/// indirect reference.
pub fn parse_indirect_object(input: &[u8]) -> Result<(&[u8], u32, u16, Object)> {
    let err = |reason: &str| Error::ParseError {
        offset: 0,
        reason: reason.to_string(),
    };

    let (rest, id_tok) = token(input).map_err(|_| err("expected object number"))?;
    let (rest, gen_tok) = token(rest).map_err(|_| err("expected generation number"))?;
    let (rest, obj_tok) = token(rest).map_err(|_| err("expected 'obj'"))?;

    let (id, gen) = match (id_tok, gen_tok, obj_tok) {
        (Token::Integer(id), Token::Integer(gen), Token::ObjStart) if id >= 0 && gen >= 0 => {
            (id as u32, gen as u16)
        },
        _ => return Err(err("malformed indirect object header")),
    };

    let (rest, obj) =
        parse_object(rest).map_err(|_| err("malformed object body"))?;

    // A stream keyword may follow a dictionary body.
    if let Ok((after_kw, Token::StreamStart)) = token(rest) {
        let dict = match obj {
            Object::Dictionary(d) => d,
            _ => return Err(err("stream keyword after non-dictionary")),
        };

        // Exactly one EOL after "stream" per spec.
        let data_start = if after_kw.starts_with(b"\r\n") {
            2
        } else if after_kw.starts_with(b"\n") || after_kw.starts_with(b"\r") {
            1
        } else {
            0
        };
        let body = &after_kw[data_start..];

        let declared = dict.get("Length").and_then(|o| o.as_integer());
        let data_len = match declared {
            Some(len) if len >= 0 && (len as usize) <= body.len() => {
                let len = len as usize;
                if endstream_follows(&body[len..]) {
                    Some(len)
                } else {
                    None
                }
            },
            _ => None,
        };
        let data_len = match data_len {
            Some(len) => len,
            None => find_endstream(body).ok_or_else(|| err("missing endstream"))?,
        };

        let data = bytes::Bytes::copy_from_slice(&body[..data_len]);
        let rest = &body[data_len..];
        let (rest, _) = skip_ws(rest).map_err(|_| err("bad stream tail"))?;
        let rest = rest
            .strip_prefix(b"endstream".as_slice())
            .ok_or_else(|| err("missing endstream keyword"))?;
        let rest = expect_endobj(rest)?;
        return Ok((rest, id, gen, Object::Stream { dict, data }));
    }

    let rest = expect_endobj(rest)?;
    Ok((rest, id, gen, obj))
}

fn expect_endobj(input: &[u8]) -> Result<&[u8]> {
    match token(input) {
        Ok((rest, Token::ObjEnd)) => Ok(rest),
        // Lenient: some generators drop endobj before the next header.
        _ => Ok(input),
    }
}

fn endstream_follows(tail: &[u8]) -> bool {
    let mut i = 0;
    while i < tail.len() && matches!(tail[i], b' ' | b'\t' | b'\r' | b'\n' | 0x00 | 0x0C) {
        i += 1;
    }
    tail[i..].starts_with(b"endstream")
}

/// Scan for the `endstream` keyword and return the data length before it,
/// with the trailing EOL (if any) excluded.
fn find_endstream(input: &[u8]) -> Option<usize> {
    let needle = b"endstream";
    let mut pos = 0;
    while pos + needle.len() <= input.len() {
        if &input[pos..pos + needle.len()] == needle {
            let mut end = pos;
            if end > 0 && input[end - 1] == b'\n' {
                end -= 1;
            }
            if end > 0 && input[end - 1] == b'\r' {
                end -= 1;
            }
            return Some(end);
        }
        pos += 1;
    }
    None
}
