//! Template introspection.
//!
//! Two read-only walks over the loaded document: widget annotations per
//! page, and the AcroForm field tree. Both yield object references so that
//! the writers can re-enter mutably; inherited `/Ff` and `/MaxLen` are
//! resolved by climbing `/Parent` chains.

use log::debug;

use crate::document::Document;
use crate::names;
use crate::object::{Dict, Object, ObjectRef};

/// A widget annotation found on a page.
#[derive(Debug, Clone)]
pub struct PageWidget {
    /// The annotation object
    pub annot: ObjectRef,
    /// The page carrying it
    pub page: ObjectRef,
    /// Decoded `/T`, when the annotation carries one
    pub field_name: Option<String>,
}

/// Enumerate widget annotations page by page.
///
/// Annotations without an indirect reference are skipped (the AcroForm
/// contract requires fields to be indirect objects).
pub fn page_widgets(doc: &Document) -> Vec<PageWidget> {
    let mut out = Vec::new();
    for page_ref in doc.pages() {
        let Some(page) = doc.get(page_ref).and_then(|o| o.as_dict()) else {
            continue;
        };
        let Some(annots) = doc.resolve_entry(page, "Annots").and_then(|o| o.as_array()) else {
            continue;
        };
        for annot in annots {
            let Some(annot_ref) = annot.as_reference() else {
                debug!("inline annotation on page {}, skipping", page_ref);
                continue;
            };
            let Some(dict) = doc.get(annot_ref).and_then(|o| o.as_dict()) else {
                continue;
            };
            out.push(PageWidget {
                annot: annot_ref,
                page: page_ref,
                field_name: field_name(doc, dict),
            });
        }
    }
    out
}

/// Decoded `/T` of a field or widget dictionary.
///
/// `/T` is a PDF text string; older templates store Latin-1 bytes there and
/// the odd one ships `#xx`-escaped leftovers, so the decoded text takes one
/// more trip through the name codec.
pub fn field_name(doc: &Document, dict: &Dict) -> Option<String> {
    let raw = doc.resolve_entry(dict, "T")?.as_string()?;
    let text = Object::decode_text_string(raw);
    Some(names::decode_name(&text))
}

/// Kid references of a field node.
pub fn kid_refs(doc: &Document, dict: &Dict) -> Vec<ObjectRef> {
    doc.resolve_entry(dict, "Kids")
        .and_then(|o| o.as_array())
        .map(|arr| arr.iter().filter_map(|o| o.as_reference()).collect())
        .unwrap_or_default()
}

/// Integer property resolved against the widget, then its `/Parent` chain.
pub fn inherited_int(doc: &Document, dict: &Dict, key: &str) -> Option<i64> {
    let mut current = dict;
    for _ in 0..16 {
        if let Some(v) = doc.resolve_entry(current, key).and_then(|o| o.as_integer()) {
            return Some(v);
        }
        match doc.resolve_entry(current, "Parent").and_then(|o| o.as_dict()) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    None
}

/// Name property resolved against the widget, then its `/Parent` chain.
pub fn inherited_name<'a>(doc: &'a Document, dict: &'a Dict, key: &str) -> Option<&'a str> {
    let mut current = dict;
    for _ in 0..16 {
        if let Some(v) = doc.resolve_entry(current, key).and_then(|o| o.as_name()) {
            return Some(v);
        }
        match doc.resolve_entry(current, "Parent").and_then(|o| o.as_dict()) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    None
}

/// The widget's `/Rect` as `[x0, y0, x1, y1]`.
pub fn widget_rect(doc: &Document, dict: &Dict) -> Option<[f64; 4]> {
    let arr = doc.resolve_entry(dict, "Rect")?.as_array()?;
    if arr.len() != 4 {
        return None;
    }
    let mut out = [0.0; 4];
    for (slot, obj) in out.iter_mut().zip(arr) {
        *slot = doc.resolve(obj).as_number()?;
    }
    Some(out)
}

/// Decoded On-state keys of a button widget's `/AP /N` dictionary (every
/// key that does not normalize to "off").
pub fn on_state_names(doc: &Document, widget: &Dict) -> Vec<String> {
    let Some(n) = appearance_states(doc, widget) else {
        return Vec::new();
    };
    n.keys()
        .filter(|k| !names::is_off(k))
        .cloned()
        .collect()
}

/// The `/AP /N` state dictionary of a widget, resolved.
pub fn appearance_states<'a>(doc: &'a Document, widget: &'a Dict) -> Option<&'a Dict> {
    let ap = doc.resolve_entry(widget, "AP")?.as_dict()?;
    doc.resolve_entry(ap, "N")?.as_dict()
}

/// Depth-first walk of the AcroForm field tree.
///
/// The callback receives each node's reference and its effective name
/// (own `/T` or the nearest ancestor's). Kids of radio groups inherit the
/// group name this way, matching how `/T`-less widgets behave in viewers.
pub fn walk_fields<F>(doc: &Document, mut visit: F)
where
    F: FnMut(ObjectRef, Option<&str>),
{
    fn recurse<F>(
        doc: &Document,
        node_ref: ObjectRef,
        parent_name: Option<&str>,
        depth: usize,
        visit: &mut F,
    ) where
        F: FnMut(ObjectRef, Option<&str>),
    {
        if depth > 16 {
            return;
        }
        let Some(dict) = doc.get(node_ref).and_then(|o| o.as_dict()) else {
            return;
        };
        let own_name = field_name(doc, dict);
        let effective = own_name.as_deref().or(parent_name);
        visit(node_ref, effective);
        for kid in kid_refs(doc, dict) {
            recurse(doc, kid, effective, depth + 1, visit);
        }
    }

    for field_ref in doc.acroform_field_refs() {
        recurse(doc, field_ref, None, 0, &mut visit);
    }
}
