//! In-memory PDF document.
//!
//! The engine needs one mutable view of the whole object graph for the
//! duration of a fill (template files are small), so loading is eager:
//! every in-use cross-reference entry is materialized up front, object
//! streams included. Saving is a full rewrite with a fresh single-section
//! xref, staged through a temp file and renamed into place so that a
//! half-written output never exists at the target path.

use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::object::{Dict, Object, ObjectRef};
use crate::objstm::parse_object_stream;
use crate::parser::parse_indirect_object;
use crate::serializer::ObjectSerializer;
use crate::xref::{find_xref_offset, parse_xref, XrefEntry};

/// Maximum reference-chain depth followed by [`Document::resolve`].
const MAX_RESOLVE_DEPTH: usize = 32;

/// Stand-in for dangling references.
static NULL_OBJECT: Object = Object::Null;

/// A fully loaded PDF document.
#[derive(Debug)]
pub struct Document {
    version: (u8, u8),
    objects: BTreeMap<u32, Object>,
    trailer: Dict,
    next_id: u32,
}

impl Document {
    /// Open and fully load a PDF file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(&data)
    }

    /// Load a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let version = parse_header(data)?;
        let xref_offset = find_xref_offset(data)?;
        let table = parse_xref(data, xref_offset)?;

        if table.trailer().contains_key("Encrypt") {
            return Err(Error::Unsupported("encrypted documents".to_string()));
        }

        let mut objects: BTreeMap<u32, Object> = BTreeMap::new();
        let mut compressed: Vec<(u32, u32)> = Vec::new(); // (object id, stream id)

        for id in table.object_numbers() {
            match table.get(id) {
                Some(XrefEntry::Uncompressed { offset }) => {
                    let offset = *offset as usize;
                    if offset >= data.len() {
                        warn!("object {} points beyond end of file, skipping", id);
                        continue;
                    }
                    match parse_indirect_object(&data[offset..]) {
                        Ok((_, parsed_id, _, obj)) => {
                            if parsed_id != id {
                                warn!(
                                    "xref says object {} at offset {}, file says {}",
                                    id, offset, parsed_id
                                );
                            }
                            objects.insert(parsed_id, obj);
                        },
                        Err(e) => warn!("failed to parse object {}: {}", id, e),
                    }
                },
                Some(XrefEntry::InObjectStream { stream_id, .. }) => {
                    compressed.push((id, *stream_id));
                },
                _ => {},
            }
        }

        // Unpack object streams after all containers are loaded.
        let mut stream_ids: Vec<u32> = compressed.iter().map(|&(_, s)| s).collect();
        stream_ids.sort_unstable();
        stream_ids.dedup();
        for stream_id in stream_ids {
            let Some(stream_obj) = objects.get(&stream_id) else {
                warn!("object stream {} not present, contents lost", stream_id);
                continue;
            };
            match parse_object_stream(stream_obj) {
                Ok(contained) => {
                    for (id, obj) in contained {
                        // Only adopt objects the xref actually maps here.
                        let expected = compressed.iter().any(|&(cid, sid)| cid == id && sid == stream_id);
                        if expected {
                            objects.insert(id, obj);
                        }
                    }
                },
                Err(e) => warn!("failed to unpack object stream {}: {}", stream_id, e),
            }
        }

        let trailer = table.trailer().clone();
        if !trailer.contains_key("Root") {
            return Err(Error::InvalidPdf("trailer has no /Root".to_string()));
        }

        let next_id = objects.keys().max().copied().unwrap_or(0) + 1;
        debug!("loaded {} objects, next id {}", objects.len(), next_id);

        Ok(Self {
            version,
            objects,
            trailer,
            next_id,
        })
    }

    /// PDF version from the header.
    pub fn version(&self) -> (u8, u8) {
        self.version
    }

    /// Immutable access to an object by reference (generation ignored; the
    /// loader keeps the newest definition per object number).
    pub fn get(&self, r: ObjectRef) -> Option<&Object> {
        self.objects.get(&r.id)
    }

    /// Mutable access to an object by reference.
    pub fn get_mut(&mut self, r: ObjectRef) -> Option<&mut Object> {
        self.objects.get_mut(&r.id)
    }

    /// Follow reference chains until a direct object is reached.
    pub fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        let mut current = obj;
        for _ in 0..MAX_RESOLVE_DEPTH {
            match current {
                Object::Reference(r) => match self.get(*r) {
                    Some(next) => current = next,
                    None => return &NULL_OBJECT,
                },
                _ => return current,
            }
        }
        warn!("reference chain too deep, treating as null");
        &NULL_OBJECT
    }

    /// Resolve a dictionary entry.
    pub fn resolve_entry<'a>(&'a self, dict: &'a Dict, key: &str) -> Option<&'a Object> {
        dict.get(key).map(|o| self.resolve(o)).filter(|o| !o.is_null())
    }

    /// Allocate a new object and return its reference.
    pub fn insert(&mut self, obj: Object) -> ObjectRef {
        let id = self.next_id;
        self.next_id += 1;
        self.objects.insert(id, obj);
        ObjectRef::new(id, 0)
    }

    /// Reference to the document catalog.
    pub fn catalog_ref(&self) -> Result<ObjectRef> {
        self.trailer
            .get("Root")
            .and_then(|o| o.as_reference())
            .ok_or_else(|| Error::InvalidPdf("trailer /Root is not a reference".to_string()))
    }

    /// The catalog dictionary.
    pub fn catalog(&self) -> Result<&Dict> {
        let root = self.catalog_ref()?;
        self.get(root)
            .and_then(|o| o.as_dict())
            .ok_or_else(|| Error::InvalidPdf("catalog is not a dictionary".to_string()))
    }

    /// The AcroForm dictionary, wherever the catalog keeps it.
    pub fn acroform(&self) -> Option<&Dict> {
        let acro = self.catalog().ok()?.get("AcroForm")?;
        self.resolve(acro).as_dict()
    }

    /// Mutable AcroForm dictionary (inline in the catalog or indirect).
    pub fn acroform_mut(&mut self) -> Option<&mut Dict> {
        let root = self.catalog_ref().ok()?;
        let indirect = {
            let cat = self.objects.get(&root.id)?.as_dict()?;
            match cat.get("AcroForm")? {
                Object::Reference(r) => Some(*r),
                _ => None,
            }
        };
        match indirect {
            Some(r) => self.objects.get_mut(&r.id)?.as_dict_mut(),
            None => self
                .objects
                .get_mut(&root.id)?
                .as_dict_mut()?
                .get_mut("AcroForm")?
                .as_dict_mut(),
        }
    }

    /// Top-level field references from `/AcroForm /Fields`.
    pub fn acroform_field_refs(&self) -> Vec<ObjectRef> {
        let Some(acro) = self.acroform() else {
            return Vec::new();
        };
        let Some(fields) = acro.get("Fields").map(|o| self.resolve(o)) else {
            return Vec::new();
        };
        fields
            .as_array()
            .map(|arr| arr.iter().filter_map(|o| o.as_reference()).collect())
            .unwrap_or_default()
    }

    /// Page object references in document order.
    pub fn pages(&self) -> Vec<ObjectRef> {
        let mut out = Vec::new();
        let Ok(catalog) = self.catalog() else {
            return out;
        };
        let Some(pages_ref) = catalog.get("Pages").and_then(|o| o.as_reference()) else {
            return out;
        };
        let mut visited = std::collections::HashSet::new();
        self.collect_pages(pages_ref, &mut out, &mut visited, 0);
        out
    }

    fn collect_pages(
        &self,
        node_ref: ObjectRef,
        out: &mut Vec<ObjectRef>,
        visited: &mut std::collections::HashSet<u32>,
        depth: usize,
    ) {
        if depth > MAX_RESOLVE_DEPTH || !visited.insert(node_ref.id) {
            return;
        }
        let Some(node) = self.get(node_ref).and_then(|o| o.as_dict()) else {
            return;
        };
        let type_name = node.get("Type").and_then(|o| o.as_name());
        let has_kids = node.contains_key("Kids");
        match type_name {
            // Tree nodes missing /Type but carrying /Kids count as interior.
            Some("Pages") | None if has_kids => {
                if let Some(kids) = node.get("Kids").map(|o| self.resolve(o)).and_then(|o| o.as_array()) {
                    let kid_refs: Vec<ObjectRef> =
                        kids.iter().filter_map(|o| o.as_reference()).collect();
                    for kid in kid_refs {
                        self.collect_pages(kid, out, visited, depth + 1);
                    }
                }
            },
            Some("Page") | None => out.push(node_ref),
            _ => {},
        }
    }

    /// Serialize the document to bytes (full rewrite, single xref section).
    pub fn to_bytes(&self) -> Vec<u8> {
        let serializer = ObjectSerializer::new();
        let mut out = Vec::with_capacity(64 * 1024);

        out.extend_from_slice(format!("%PDF-{}.{}\n", self.version.0, self.version.1).as_bytes());
        // Binary marker so transfer agents keep the file 8-bit clean.
        out.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

        let max_id = self.objects.keys().max().copied().unwrap_or(0);
        let mut offsets: Vec<Option<u64>> = vec![None; (max_id + 1) as usize];

        for (&id, obj) in &self.objects {
            offsets[id as usize] = Some(out.len() as u64);
            out.extend_from_slice(&serializer.serialize_indirect(id, 0, obj));
        }

        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", max_id + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for id in 1..=max_id {
            match offsets[id as usize] {
                Some(offset) => {
                    out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes())
                },
                None => out.extend_from_slice(b"0000000000 00000 f \n"),
            }
        }

        let mut trailer = Dict::new();
        trailer.insert("Size".to_string(), Object::Integer((max_id + 1) as i64));
        for key in ["Root", "Info", "ID"] {
            if let Some(v) = self.trailer.get(key) {
                trailer.insert(key.to_string(), v.clone());
            }
        }

        out.extend_from_slice(b"trailer\n");
        out.extend_from_slice(&serializer.serialize(&Object::Dictionary(trailer)));
        out.extend_from_slice(format!("\nstartxref\n{}\n%%EOF\n", xref_offset).as_bytes());
        out
    }

    /// Write the document to `path` atomically (temp file, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes();
        let tmp = path.with_extension("pdf.tmp");
        std::fs::write(&tmp, &bytes)?;
        std::fs::rename(&tmp, path)?;
        debug!("wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

fn parse_header(data: &[u8]) -> Result<(u8, u8)> {
    if !data.starts_with(b"%PDF-") {
        let head = String::from_utf8_lossy(&data[..data.len().min(8)]).to_string();
        return Err(Error::InvalidHeader(head));
    }
    let major = data.get(5).map(|b| b.wrapping_sub(b'0')).unwrap_or(1);
    let minor = data.get(7).map(|b| b.wrapping_sub(b'0')).unwrap_or(4);
    if major == 0 || major > 2 {
        return Err(Error::InvalidHeader(
            String::from_utf8_lossy(&data[..8.min(data.len())]).to_string(),
        ));
    }
    Ok((major, minor))
}
