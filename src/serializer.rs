//! PDF object serialization.
//!
//! Serializes the object graph back to bytes per ISO 32000-1:2008 syntax.
//! Names are emitted through the name codec so that every state key written
//! by this crate is byte-identical to `encode_name(decoded_key)`; dictionary
//! entries keep their insertion order, which makes saves deterministic.

use std::io::Write;

use crate::names;
use crate::object::{Dict, Object};

/// Serializer for PDF objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectSerializer;

impl ObjectSerializer {
    /// Create a new object serializer.
    pub fn new() -> Self {
        Self
    }

    /// Serialize an object to bytes.
    pub fn serialize(&self, obj: &Object) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write_object(&mut buf, obj).expect("write to Vec cannot fail");
        buf
    }

    /// Serialize an indirect object definition.
    ///
    /// Format: `{id} {gen} obj\n{object}\nendobj\n`
    pub fn serialize_indirect(&self, id: u32, gen: u16, obj: &Object) -> Vec<u8> {
        let mut buf = Vec::new();
        writeln!(buf, "{} {} obj", id, gen).expect("write to Vec cannot fail");
        self.write_object(&mut buf, obj).expect("write to Vec cannot fail");
        write!(buf, "\nendobj\n").expect("write to Vec cannot fail");
        buf
    }

    fn write_object<W: Write>(&self, w: &mut W, obj: &Object) -> std::io::Result<()> {
        match obj {
            Object::Null => write!(w, "null"),
            Object::Boolean(b) => write!(w, "{}", if *b { "true" } else { "false" }),
            Object::Integer(i) => write!(w, "{}", i),
            Object::Real(r) => self.write_real(w, *r),
            Object::String(s) => self.write_string(w, s),
            Object::Name(n) => w.write_all(&names::encode_name(n)),
            Object::Array(arr) => self.write_array(w, arr),
            Object::Dictionary(dict) => self.write_dictionary(w, dict),
            Object::Stream { dict, data } => self.write_stream(w, dict, data),
            // All objects are rewritten at generation 0 on save.
            Object::Reference(r) => write!(w, "{} 0 R", r.id),
        }
    }

    /// Write a real number, trimming trailing zeros.
    fn write_real<W: Write>(&self, w: &mut W, value: f64) -> std::io::Result<()> {
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            write!(w, "{}", value as i64)
        } else {
            let formatted = format!("{:.5}", value);
            let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
            write!(w, "{}", trimmed)
        }
    }

    /// Write a PDF string: literal `(...)` when printable, hex `<...>`
    /// otherwise (UTF-16BE field values always take the hex form).
    fn write_string<W: Write>(&self, w: &mut W, data: &[u8]) -> std::io::Result<()> {
        let is_printable = data
            .iter()
            .all(|&b| b == b'\n' || b == b'\r' || b == b'\t' || (0x20..=0x7E).contains(&b));

        if is_printable {
            write!(w, "(")?;
            for &byte in data {
                match byte {
                    b'(' => write!(w, "\\(")?,
                    b')' => write!(w, "\\)")?,
                    b'\\' => write!(w, "\\\\")?,
                    b'\n' => write!(w, "\\n")?,
                    b'\r' => write!(w, "\\r")?,
                    b'\t' => write!(w, "\\t")?,
                    _ => w.write_all(&[byte])?,
                }
            }
            write!(w, ")")
        } else {
            write!(w, "<")?;
            for byte in data {
                write!(w, "{:02X}", byte)?;
            }
            write!(w, ">")
        }
    }

    fn write_array<W: Write>(&self, w: &mut W, arr: &[Object]) -> std::io::Result<()> {
        write!(w, "[")?;
        for (i, obj) in arr.iter().enumerate() {
            if i > 0 {
                write!(w, " ")?;
            }
            self.write_object(w, obj)?;
        }
        write!(w, "]")
    }

    fn write_dictionary<W: Write>(&self, w: &mut W, dict: &Dict) -> std::io::Result<()> {
        write!(w, "<<")?;
        for (key, value) in dict {
            write!(w, " ")?;
            w.write_all(&names::encode_name(key))?;
            write!(w, " ")?;
            self.write_object(w, value)?;
        }
        write!(w, " >>")
    }

    fn write_stream<W: Write>(&self, w: &mut W, dict: &Dict, data: &[u8]) -> std::io::Result<()> {
        let mut dict_with_length = dict.clone();
        dict_with_length.insert("Length".to_string(), Object::Integer(data.len() as i64));

        self.write_dictionary(w, &dict_with_length)?;
        write!(w, "\nstream\n")?;
        w.write_all(data)?;
        write!(w, "\nendstream")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectRef;

    fn to_string(obj: &Object) -> String {
        String::from_utf8_lossy(&ObjectSerializer::new().serialize(obj)).to_string()
    }

    #[test]
    fn test_serialize_scalars() {
        assert_eq!(to_string(&Object::Null), "null");
        assert_eq!(to_string(&Object::Boolean(true)), "true");
        assert_eq!(to_string(&Object::Integer(-7)), "-7");
        assert_eq!(to_string(&Object::Real(1.0)), "1");
        assert_eq!(to_string(&Object::Real(0.5)), "0.5");
    }

    #[test]
    fn test_serialize_string_escaping() {
        assert_eq!(to_string(&Object::String(b"a(b)c".to_vec())), "(a\\(b\\)c)");
        assert_eq!(to_string(&Object::String(vec![0xFE, 0xFF, 0x00, 0x41])), "<FEFF0041>");
    }

    #[test]
    fn test_serialize_name_via_codec() {
        assert_eq!(
            to_string(&Object::Name("Einschr\u{e4}nkungen".to_string())),
            "/Einschr#C3#A4nkungen"
        );
        assert_eq!(to_string(&Object::Name("Off".to_string())), "/Off");
    }

    #[test]
    fn test_serialize_reference_normalizes_generation() {
        assert_eq!(to_string(&Object::Reference(ObjectRef::new(10, 3))), "10 0 R");
    }

    #[test]
    fn test_serialize_dict_keeps_order() {
        let mut dict = Dict::new();
        dict.insert("Zebra".to_string(), Object::Integer(1));
        dict.insert("Apple".to_string(), Object::Integer(2));
        assert_eq!(to_string(&Object::Dictionary(dict)), "<< /Zebra 1 /Apple 2 >>");
    }

    #[test]
    fn test_serialize_stream_sets_length() {
        let stream = Object::Stream {
            dict: Dict::new(),
            data: bytes::Bytes::from_static(b"q 0 0 m Q"),
        };
        let out = to_string(&stream);
        assert!(out.contains("/Length 9"));
        assert!(out.contains("stream\nq 0 0 m Q\nendstream"));
    }

    #[test]
    fn test_serialized_name_reparses_identically() {
        let original = Object::Name("Keine Angabe m\u{f6}glich".to_string());
        let bytes = ObjectSerializer::new().serialize(&original);
        let (_, reparsed) = crate::parser::parse_object(&bytes).unwrap();
        assert_eq!(reparsed, original);
    }

    #[test]
    fn test_indirect_roundtrip() {
        let obj = Object::Array(vec![Object::Integer(0), Object::Name("Off".to_string())]);
        let bytes = ObjectSerializer::new().serialize_indirect(5, 0, &obj);
        let (_, id, gen, parsed) = crate::parser::parse_indirect_object(&bytes).unwrap();
        assert_eq!((id, gen), (5, 0));
        assert_eq!(parsed, obj);
    }
}
