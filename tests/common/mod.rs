//! Shared fixture builder: assembles small but structurally honest
//! S0051-style AcroForm templates (catalog, page tree, annotations, field
//! tree, button appearance state dictionaries) as real PDF bytes.
#![allow(dead_code)]

use formfill::names::encode_name;
use formfill::{Dict, Document, Object, ObjectRef};

/// Builds a single-page AcroForm template.
pub struct TemplateBuilder {
    bodies: Vec<(u32, String)>,
    next_id: u32,
    field_ids: Vec<u32>,
    annot_ids: Vec<u32>,
    next_y: i32,
}

impl Default for TemplateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            next_id: 4, // 1..3 are catalog, pages, page
            field_ids: Vec::new(),
            annot_ids: Vec::new(),
            next_y: 780,
        }
    }

    fn alloc(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn next_rect(&mut self, width: i32, height: i32) -> String {
        let y = self.next_y;
        self.next_y -= height + 4;
        format!("[40 {} {} {}]", y, 40 + width, y + height)
    }

    /// Name key in on-disk form (leading slash included).
    fn key(state: &str) -> String {
        String::from_utf8(encode_name(state)).expect("encoded names are ASCII")
    }

    /// Merged text field+widget. `flags`/`max_len` land on the object when set.
    pub fn text_field(&mut self, name: &str, flags: Option<u32>, max_len: Option<u32>) -> u32 {
        let id = self.alloc();
        let rect = self.next_rect(160, 20);
        let mut body = format!(
            "{} 0 obj\n<< /Type /Annot /Subtype /Widget /T ({}) /FT /Tx /Rect {} /P 3 0 R",
            id, name, rect
        );
        if let Some(ff) = flags {
            body.push_str(&format!(" /Ff {}", ff));
        }
        if let Some(ml) = max_len {
            body.push_str(&format!(" /MaxLen {}", ml));
        }
        body.push_str(" >>\nendobj\n");
        self.bodies.push((id, body));
        self.field_ids.push(id);
        self.annot_ids.push(id);
        id
    }

    /// Merged checkbox field+widget with one On state.
    pub fn checkbox(&mut self, name: &str, on_state: &str) -> u32 {
        let id = self.alloc();
        let rect = self.next_rect(12, 12);
        let body = format!(
            "{} 0 obj\n<< /Type /Annot /Subtype /Widget /T ({}) /FT /Btn /Rect {} /P 3 0 R \
             /AS /Off /AP << /N << {} null /Off null >> >> >>\nendobj\n",
            id,
            name,
            rect,
            Self::key(on_state)
        );
        self.bodies.push((id, body));
        self.field_ids.push(id);
        self.annot_ids.push(id);
        id
    }

    /// Radio group: parent field plus one kid widget per state, the keys
    /// written through the canonical encoder.
    pub fn radio_group(&mut self, name: &str, states: &[&str]) -> (u32, Vec<u32>) {
        let raw: Vec<String> = states.iter().map(|s| Self::key(s)).collect();
        let raw_refs: Vec<&str> = raw.iter().map(String::as_str).collect();
        self.radio_group_raw(name, &raw_refs)
    }

    /// Radio group whose `/AP /N` keys are written verbatim (`/Einschr#E4nkungen`
    /// and friends), for encoding-damage scenarios.
    pub fn radio_group_raw(&mut self, name: &str, raw_keys: &[&str]) -> (u32, Vec<u32>) {
        let field_id = self.alloc();
        let kid_ids: Vec<u32> = raw_keys.iter().map(|_| self.alloc()).collect();

        let kids_list = kid_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        self.bodies.push((
            field_id,
            format!(
                "{} 0 obj\n<< /T ({}) /FT /Btn /Ff 32768 /Kids [{}] >>\nendobj\n",
                field_id, name, kids_list
            ),
        ));
        self.field_ids.push(field_id);

        for (kid_id, raw_key) in kid_ids.iter().zip(raw_keys) {
            let rect = self.next_rect(12, 12);
            self.bodies.push((
                *kid_id,
                format!(
                    "{} 0 obj\n<< /Type /Annot /Subtype /Widget /Parent {} 0 R /Rect {} /P 3 0 R \
                     /AS /Off /AP << /N << {} null /Off null >> >> >>\nendobj\n",
                    kid_id, field_id, rect, raw_key
                ),
            ));
            self.annot_ids.push(*kid_id);
        }

        (field_id, kid_ids)
    }

    /// Serialize the template.
    pub fn build(&self) -> Vec<u8> {
        let fields = self
            .field_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        let annots = self
            .annot_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");

        let mut bodies = vec![
            (
                1,
                format!(
                    "1 0 obj\n<< /Type /Catalog /Pages 2 0 R /AcroForm << /Fields [{}] /NeedAppearances true >> >>\nendobj\n",
                    fields
                ),
            ),
            (2, "2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n".to_string()),
            (
                3,
                format!(
                    "3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] /Annots [{}] >>\nendobj\n",
                    annots
                ),
            ),
        ];
        bodies.extend(self.bodies.iter().map(|(id, b)| (*id, b.clone())));
        bodies.sort_by_key(|(id, _)| *id);

        let mut data = Vec::new();
        data.extend_from_slice(b"%PDF-1.6\n%\xE2\xE3\xCF\xD3\n");
        let max_id = bodies.last().map(|(id, _)| *id).unwrap_or(0);
        let mut offsets = vec![0u64; (max_id + 1) as usize];
        for (id, body) in &bodies {
            offsets[*id as usize] = data.len() as u64;
            data.extend_from_slice(body.as_bytes());
        }

        let xref = data.len();
        data.extend_from_slice(format!("xref\n0 {}\n", max_id + 1).as_bytes());
        data.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            data.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        data.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                max_id + 1,
                xref
            )
            .as_bytes(),
        );
        data
    }
}

/// Field reference found by name in a loaded document.
pub fn find_field(doc: &Document, name: &str) -> Option<ObjectRef> {
    let mut found = None;
    formfill::introspect::walk_fields(doc, |node_ref, effective| {
        if found.is_none() && effective == Some(name) {
            let own = doc
                .get(node_ref)
                .and_then(|o| o.as_dict())
                .and_then(|d| formfill::introspect::field_name(doc, d));
            if own.as_deref() == Some(name) {
                found = Some(node_ref);
            }
        }
    });
    found
}

/// Decoded `/V` name of a field.
pub fn field_v_name(doc: &Document, field: ObjectRef) -> Option<String> {
    let dict = doc.get(field)?.as_dict()?;
    Some(doc.resolve(dict.get("V")?).as_name()?.to_string())
}

/// `/AS` names of a field's kids, in order.
pub fn kid_as_names(doc: &Document, field: ObjectRef) -> Vec<String> {
    let Some(dict) = doc.get(field).and_then(|o| o.as_dict()) else {
        return Vec::new();
    };
    formfill::introspect::kid_refs(doc, dict)
        .into_iter()
        .map(|kid| {
            doc.get(kid)
                .and_then(|o| o.as_dict())
                .and_then(|d| d.get("AS"))
                .and_then(|o| o.as_name())
                .unwrap_or("")
                .to_string()
        })
        .collect()
}

/// All page content streams of page 3, decoded and concatenated.
pub fn page_content(doc: &Document) -> String {
    let Some(page) = doc.get(ObjectRef::new(3, 0)).and_then(|o| o.as_dict()) else {
        return String::new();
    };
    let Some(contents) = page.get("Contents") else {
        return String::new();
    };
    let streams: Vec<&Object> = match doc.resolve(contents) {
        Object::Array(arr) => arr.iter().map(|o| doc.resolve(o)).collect(),
        single => vec![single],
    };
    streams
        .iter()
        .filter_map(|s| s.decode_stream_data().ok())
        .map(|b| String::from_utf8_lossy(&b).to_string())
        .collect()
}

/// The appearance stream dictionary and content of a widget's `/AP /N`.
pub fn appearance_of(doc: &Document, widget: ObjectRef) -> Option<(Dict, String)> {
    let dict = doc.get(widget)?.as_dict()?;
    let ap = doc.resolve(dict.get("AP")?).as_dict()?;
    let n = doc.resolve(ap.get("N")?);
    let stream_dict = n.as_dict()?.clone();
    let content = String::from_utf8_lossy(&n.decode_stream_data().ok()?).to_string();
    Some((stream_dict, content))
}
