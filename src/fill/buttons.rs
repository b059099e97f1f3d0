//! Checkbox and radio widget writing.
//!
//! Buttons are marked by pointing `/AS` (and the field's `/V`) at an
//! existing On-state key of the widget's `/AP /N` dictionary. Before any
//! key is read it is re-decoded through the name codec, which flushes out
//! double-encoded or surrogate-damaged keys left by earlier tools and makes
//! the later `/AS` == key comparisons exact.

use log::{debug, warn};

use crate::document::Document;
use crate::fill::groups;
use crate::introspect::{kid_refs, on_state_names};
use crate::names;
use crate::object::{Dict, Object, ObjectRef};
use crate::schema::is_truthy;

/// Where a widget's `/AP /N` dictionary actually lives.
enum NormalDictSlot {
    /// Inline under the widget's own `/AP`
    InWidget,
    /// Inline in the indirect `/AP` object
    InApObject(ObjectRef),
    /// `/N` itself is an indirect object
    NObject(ObjectRef),
}

fn locate_normal_dict(doc: &Document, widget_ref: ObjectRef) -> Option<NormalDictSlot> {
    let widget = doc.get(widget_ref)?.as_dict()?;
    let (ap_slot, ap_dict) = match widget.get("AP")? {
        Object::Reference(r) => (Some(*r), doc.get(*r)?.as_dict()?),
        Object::Dictionary(d) => (None, d),
        _ => return None,
    };
    match ap_dict.get("N")? {
        Object::Reference(r) => doc.get(*r)?.as_dict().map(|_| NormalDictSlot::NObject(*r)),
        Object::Dictionary(_) => Some(match ap_slot {
            Some(r) => NormalDictSlot::InApObject(r),
            None => NormalDictSlot::InWidget,
        }),
        _ => None,
    }
}

fn normal_dict_mut(doc: &mut Document, widget_ref: ObjectRef) -> Option<&mut Dict> {
    match locate_normal_dict(doc, widget_ref)? {
        NormalDictSlot::InWidget => doc
            .get_mut(widget_ref)?
            .as_dict_mut()?
            .get_mut("AP")?
            .as_dict_mut()?
            .get_mut("N")?
            .as_dict_mut(),
        NormalDictSlot::InApObject(r) => doc
            .get_mut(r)?
            .as_dict_mut()?
            .get_mut("N")?
            .as_dict_mut(),
        NormalDictSlot::NObject(r) => doc.get_mut(r)?.as_dict_mut(),
    }
}

/// Re-decode every `/AP /N` state key of a widget in place.
///
/// After this, each key equals `decode_name` of itself, so the serializer's
/// `encode_name` output is canonical and `/AS` set from the same strings
/// compares byte-identical on disk.
pub fn normalize_ap_state_keys(doc: &mut Document, widget_ref: ObjectRef) {
    let Some(n) = normal_dict_mut(doc, widget_ref) else {
        return;
    };
    let needs_fix = n.keys().any(|k| names::decode_name(k) != *k);
    if !needs_fix {
        return;
    }
    let mut fixed = Dict::new();
    for (key, value) in n.drain(..) {
        fixed.insert(names::decode_name(&key), value);
    }
    *n = fixed;
    debug!("normalized /AP /N keys of widget {}", widget_ref);
}

/// The widget's On-state key (first `/AP /N` key that is not Off).
pub fn first_on_state(doc: &Document, widget_ref: ObjectRef) -> Option<String> {
    let widget = doc.get(widget_ref)?.as_dict()?;
    on_state_names(doc, widget).into_iter().next()
}

/// The widget's On-state key whose semantic token matches `token`.
pub fn on_state_for_token(doc: &Document, widget_ref: ObjectRef, token: &str) -> Option<String> {
    let widget = doc.get(widget_ref)?.as_dict()?;
    on_state_names(doc, widget)
        .into_iter()
        .find(|name| names::state_token(name) == token)
}

fn set_as(doc: &mut Document, widget_ref: ObjectRef, state: &str) {
    if let Some(dict) = doc.get_mut(widget_ref).and_then(|o| o.as_dict_mut()) {
        dict.insert("AS".to_string(), Object::Name(state.to_string()));
    }
}

/// Set a checkbox to its On state (truthy value) or Off.
///
/// Widgets without an `/AP` fall back to the conventional `/Yes` key.
pub fn set_checkbox(doc: &mut Document, widget_ref: ObjectRef, value: &str) -> bool {
    normalize_ap_state_keys(doc, widget_ref);

    let state = if is_truthy(value) {
        first_on_state(doc, widget_ref).unwrap_or_else(|| "Yes".to_string())
    } else {
        "Off".to_string()
    };

    let Some(dict) = doc.get_mut(widget_ref).and_then(|o| o.as_dict_mut()) else {
        return false;
    };
    dict.insert("V".to_string(), Object::Name(state.clone()));
    dict.insert("AS".to_string(), Object::Name(state));
    true
}

/// Select one option of a radio group.
///
/// Semantic match over each kid's own On-state keys first; the fixed
/// positional table second, for groups whose widget order is known stable.
/// Every non-selected kid is forced to `/Off` either way. Returns whether a
/// selection was made (the group is left unchanged otherwise, except for
/// the key normalization).
pub fn select_radio(
    doc: &mut Document,
    field_ref: ObjectRef,
    group: &str,
    target_state: &str,
) -> bool {
    let kids = match doc.get(field_ref).and_then(|o| o.as_dict()) {
        Some(dict) => kid_refs(doc, dict),
        None => return false,
    };
    if kids.is_empty() {
        return false;
    }

    let target_token = names::state_token(target_state);

    // Key normalization is a repair and happens regardless of the outcome;
    // the selection itself is decided before anything else is written so an
    // unmatched group stays untouched.
    for &kid in &kids {
        normalize_ap_state_keys(doc, kid);
    }

    let mut selected: Option<(ObjectRef, String)> = None;
    for &kid in &kids {
        if let Some(state) = on_state_for_token(doc, kid, &target_token) {
            selected = Some((kid, state));
            break;
        }
    }

    // Positional fallback for groups whose option order is known: address
    // the kid at the target's index and take its first On-state key.
    if selected.is_none() {
        if let Some(states) = groups::known_states(group) {
            let index = states
                .iter()
                .position(|s| names::state_token(s) == target_token);
            if let Some(&kid) = index.and_then(|i| kids.get(i)) {
                if let Some(state) = first_on_state(doc, kid) {
                    selected = Some((kid, state));
                }
            }
        }
    }

    let Some((on_kid, state)) = selected else {
        let available: Vec<String> = kids
            .iter()
            .filter_map(|&k| first_on_state(doc, k))
            .collect();
        warn!(
            "no option of radio group {} matches '{}' (available: {:?})",
            group, target_state, available
        );
        return false;
    };

    for &kid in &kids {
        if kid == on_kid {
            set_as(doc, kid, &state);
        } else {
            set_as(doc, kid, "Off");
        }
    }
    if let Some(dict) = doc.get_mut(field_ref).and_then(|o| o.as_dict_mut()) {
        dict.insert("V".to_string(), Object::Name(state));
    }
    true
}

/// The currently selected kid of a button field (`/AS` not Off), if any.
pub fn selected_kid(doc: &Document, kids: &[ObjectRef]) -> Option<ObjectRef> {
    kids.iter().copied().find(|&kid| {
        doc.get(kid)
            .and_then(|o| o.as_dict())
            .and_then(|d| d.get("AS"))
            .and_then(|o| o.as_name())
            .map(|name| !names::is_off(name))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn assemble(bodies: &[&str]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(b"%PDF-1.4\n");
        let mut offsets = Vec::new();
        for body in bodies {
            offsets.push(data.len());
            data.extend_from_slice(body.as_bytes());
        }
        let xref = data.len();
        data.extend_from_slice(format!("xref\n0 {}\n", offsets.len() + 1).as_bytes());
        data.extend_from_slice(b"0000000000 65535 f \n");
        for off in &offsets {
            data.extend_from_slice(format!("{:010} 00000 n \n", off).as_bytes());
        }
        data.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                offsets.len() + 1,
                xref
            )
            .as_bytes(),
        );
        data
    }

    /// Two-kid radio group AW_23 (nein/ja) plus a checkbox.
    fn button_doc() -> Document {
        let data = assemble(&[
            "1 0 obj\n<< /Type /Catalog /Pages 2 0 R /AcroForm << /Fields [4 0 R 7 0 R] >> >>\nendobj\n",
            "2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n",
            "3 0 obj\n<< /Type /Page /Parent 2 0 R /Annots [5 0 R 6 0 R 7 0 R] >>\nendobj\n",
            "4 0 obj\n<< /T (AW_23) /FT /Btn /Ff 32768 /Kids [5 0 R 6 0 R] >>\nendobj\n",
            "5 0 obj\n<< /Parent 4 0 R /Rect [10 10 20 20] /P 3 0 R /AP << /N << /nein null /Off null >> >> >>\nendobj\n",
            "6 0 obj\n<< /Parent 4 0 R /Rect [30 10 40 20] /P 3 0 R /AP << /N << /ja null /Off null >> >> >>\nendobj\n",
            "7 0 obj\n<< /T (AW_22) /FT /Btn /Rect [50 10 60 20] /P 3 0 R /AP << /N << /Yes null /Off null >> >> >>\nendobj\n",
        ]);
        Document::from_bytes(&data).unwrap()
    }

    #[test]
    fn test_checkbox_on_off() {
        let mut doc = button_doc();
        let cb = ObjectRef::new(7, 0);
        assert!(set_checkbox(&mut doc, cb, "ja"));
        let dict = doc.get(cb).unwrap().as_dict().unwrap();
        assert_eq!(dict.get("V").unwrap().as_name(), Some("Yes"));
        assert_eq!(dict.get("AS").unwrap().as_name(), Some("Yes"));

        assert!(set_checkbox(&mut doc, cb, "nein"));
        let dict = doc.get(cb).unwrap().as_dict().unwrap();
        assert_eq!(dict.get("V").unwrap().as_name(), Some("Off"));
        assert_eq!(dict.get("AS").unwrap().as_name(), Some("Off"));
    }

    #[test]
    fn test_radio_semantic_selection() {
        let mut doc = button_doc();
        let field = ObjectRef::new(4, 0);
        assert!(select_radio(&mut doc, field, "AW_23", "ja"));

        let kid1 = doc.get(ObjectRef::new(5, 0)).unwrap().as_dict().unwrap();
        assert_eq!(kid1.get("AS").unwrap().as_name(), Some("Off"));
        let kid2 = doc.get(ObjectRef::new(6, 0)).unwrap().as_dict().unwrap();
        assert_eq!(kid2.get("AS").unwrap().as_name(), Some("ja"));
        let fdict = doc.get(field).unwrap().as_dict().unwrap();
        assert_eq!(fdict.get("V").unwrap().as_name(), Some("ja"));
    }

    #[test]
    fn test_radio_no_match_leaves_group() {
        let mut doc = button_doc();
        let field = ObjectRef::new(4, 0);
        assert!(!select_radio(&mut doc, field, "AW_23", "vielleicht"));
        let fdict = doc.get(field).unwrap().as_dict().unwrap();
        assert!(fdict.get("V").is_none());
    }

    #[test]
    fn test_selected_kid() {
        let mut doc = button_doc();
        let field = ObjectRef::new(4, 0);
        let kids = kid_refs(&doc, doc.get(field).unwrap().as_dict().unwrap());
        assert!(selected_kid(&doc, &kids).is_none());
        select_radio(&mut doc, field, "AW_23", "nein");
        assert_eq!(selected_kid(&doc, &kids), Some(ObjectRef::new(5, 0)));
    }

    #[test]
    fn test_normalize_repairs_double_encoded_key() {
        // Key bytes #C3#83#C2#A4 decode to "Ã¤"; normalization folds them
        // back to "ä".
        let data = assemble(&[
            "1 0 obj\n<< /Type /Catalog /Pages 2 0 R /AcroForm << /Fields [4 0 R] >> >>\nendobj\n",
            "2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n",
            "3 0 obj\n<< /Type /Page /Parent 2 0 R >>\nendobj\n",
            "4 0 obj\n<< /T (W) /FT /Btn /AP << /N << /#C3#83#C2#A4 null /Off null >> >> >>\nendobj\n",
        ]);
        let mut doc = Document::from_bytes(&data).unwrap();
        let w = ObjectRef::new(4, 0);
        normalize_ap_state_keys(&mut doc, w);
        assert_eq!(first_on_state(&doc, w), Some("\u{e4}".to_string()));
    }

    #[test]
    fn test_positional_fallback_with_numeral_keys() {
        // AW_7 variant whose option keys are numerals; no semantic match,
        // index 1 (Einschraenkungen) must be addressed positionally.
        let kids_objs: Vec<String> = (0..5)
            .map(|i| {
                format!(
                    "{} 0 obj\n<< /Parent 4 0 R /Rect [{} 10 {} 20] /AP << /N << /{} null /Off null >> >> >>\nendobj\n",
                    5 + i,
                    10 + i * 20,
                    20 + i * 20,
                    i
                )
            })
            .collect();
        let mut bodies = vec![
            "1 0 obj\n<< /Type /Catalog /Pages 2 0 R /AcroForm << /Fields [4 0 R] >> >>\nendobj\n".to_string(),
            "2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n".to_string(),
            "3 0 obj\n<< /Type /Page /Parent 2 0 R >>\nendobj\n".to_string(),
            "4 0 obj\n<< /T (AW_7) /FT /Btn /Ff 32768 /Kids [5 0 R 6 0 R 7 0 R 8 0 R 9 0 R] >>\nendobj\n".to_string(),
        ];
        bodies.extend(kids_objs);
        let refs: Vec<&str> = bodies.iter().map(String::as_str).collect();
        let mut doc = Document::from_bytes(&assemble(&refs)).unwrap();

        let field = ObjectRef::new(4, 0);
        assert!(select_radio(&mut doc, field, "AW_7", "Einschr\u{e4}nkungen"));
        let kid = doc.get(ObjectRef::new(6, 0)).unwrap().as_dict().unwrap();
        assert_eq!(kid.get("AS").unwrap().as_name(), Some("1"));
        let fdict = doc.get(field).unwrap().as_dict().unwrap();
        assert_eq!(fdict.get("V").unwrap().as_name(), Some("1"));
    }
}
