//! Post-save reconciliation of radio `/V` and `/AS`.
//!
//! Re-opens the already written file and verifies, for every group in the
//! known-option table, that the selection is internally consistent: `/V`
//! carries a known option and exactly one kid is on with an `/AS` that its
//! own `/AP /N` actually defines. Anything else is re-selected with the
//! same semantic-then-positional strategy the writer uses. Running the pass
//! on a consistent file changes nothing.

use log::{debug, info};

use crate::document::Document;
use crate::fill::buttons::{first_on_state, normalize_ap_state_keys, on_state_for_token};
use crate::fill::groups::known_states;
use crate::introspect::{field_name, kid_refs, on_state_names};
use crate::names;
use crate::object::{Object, ObjectRef};

/// Reconcile all known radio groups. Returns the number repaired.
pub fn repair_radio_appearances(doc: &mut Document) -> usize {
    let mut repaired = 0;

    for field_ref in doc.acroform_field_refs() {
        let Some(dict) = doc.get(field_ref).and_then(|o| o.as_dict()) else {
            continue;
        };
        let Some(name) = field_name(doc, dict) else {
            continue;
        };
        let Some(states) = known_states(&name) else {
            continue;
        };

        let selected_token = dict
            .get("V")
            .map(|v| doc.resolve(v))
            .and_then(|v| v.as_name())
            .map(names::state_token)
            .filter(|t| !t.is_empty());
        let Some(selected_token) = selected_token else {
            continue;
        };

        let kids = kid_refs(doc, dict);
        if kids.is_empty() {
            continue;
        }

        if selection_is_consistent(doc, &kids, &selected_token, &states) {
            continue;
        }

        if reselect(doc, field_ref, &kids, &selected_token, &states) {
            repaired += 1;
        }
    }

    if repaired > 0 {
        info!("radio repair: {} groups reset onto valid /AP keys", repaired);
    }
    repaired
}

/// A selection is consistent when `/V` names a known option and exactly one
/// kid is on, with an `/AS` its own `/AP /N` defines and that matches `/V`.
fn selection_is_consistent(
    doc: &Document,
    kids: &[ObjectRef],
    selected_token: &str,
    states: &[&str],
) -> bool {
    if !states.iter().any(|s| names::state_token(s) == selected_token) {
        return false;
    }

    let mut on_count = 0;
    let mut on_matches = false;
    for &kid in kids {
        let Some(kid_dict) = doc.get(kid).and_then(|o| o.as_dict()) else {
            return false;
        };
        let Some(as_name) = kid_dict.get("AS").and_then(|o| o.as_name()) else {
            // A kid without /AS renders unpredictably.
            return false;
        };
        if names::is_off(as_name) {
            continue;
        }
        on_count += 1;
        let keys = on_state_names(doc, kid_dict);
        if !keys.iter().any(|k| k == as_name) {
            return false;
        }
        on_matches = names::state_token(as_name) == selected_token;
    }
    on_count == 1 && on_matches
}

/// Redo the selection: semantic match per kid, then positional fallback.
fn reselect(
    doc: &mut Document,
    field_ref: ObjectRef,
    kids: &[ObjectRef],
    selected_token: &str,
    states: &[&str],
) -> bool {
    let mut selected: Option<String> = None;

    for &kid in kids {
        normalize_ap_state_keys(doc, kid);
        let matched = if selected.is_none() {
            on_state_for_token(doc, kid, selected_token)
        } else {
            None
        };
        let state = match matched {
            Some(state) => {
                selected = Some(state.clone());
                state
            },
            None => "Off".to_string(),
        };
        if let Some(kid_dict) = doc.get_mut(kid).and_then(|o| o.as_dict_mut()) {
            kid_dict.insert("AS".to_string(), Object::Name(state));
        }
    }

    if selected.is_none() {
        let index = states
            .iter()
            .position(|s| names::state_token(s) == selected_token);
        if let Some(index) = index {
            if let Some(&kid) = kids.get(index) {
                if let Some(state) = first_on_state(doc, kid) {
                    if let Some(kid_dict) = doc.get_mut(kid).and_then(|o| o.as_dict_mut()) {
                        kid_dict.insert("AS".to_string(), Object::Name(state.clone()));
                    }
                    selected = Some(state);
                }
            }
        }
    }

    match selected {
        Some(state) => {
            if let Some(dict) = doc.get_mut(field_ref).and_then(|o| o.as_dict_mut()) {
                dict.insert("V".to_string(), Object::Name(state));
            }
            true
        },
        None => {
            debug!("repair found no usable option for field {}", field_ref);
            false
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fill::buttons::selected_kid;

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

    /// AW_23 with /V set but both kids still Off (the broken shape some
    /// viewers produce).
    fn broken_doc() -> Document {
        let data = assemble(&[
            "1 0 obj\n<< /Type /Catalog /Pages 2 0 R /AcroForm << /Fields [4 0 R] >> >>\nendobj\n",
            "2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n",
            "3 0 obj\n<< /Type /Page /Parent 2 0 R >>\nendobj\n",
            "4 0 obj\n<< /T (AW_23) /FT /Btn /Ff 32768 /V /ja /Kids [5 0 R 6 0 R] >>\nendobj\n",
            "5 0 obj\n<< /Parent 4 0 R /AS /Off /AP << /N << /nein null /Off null >> >> >>\nendobj\n",
            "6 0 obj\n<< /Parent 4 0 R /AS /Off /AP << /N << /ja null /Off null >> >> >>\nendobj\n",
        ]);
        Document::from_bytes(&data).unwrap()
    }

    #[test]
    fn test_repairs_v_without_as() {
        let mut doc = broken_doc();
        assert_eq!(repair_radio_appearances(&mut doc), 1);
        let kids = [ObjectRef::new(5, 0), ObjectRef::new(6, 0)];
        assert_eq!(selected_kid(&doc, &kids), Some(ObjectRef::new(6, 0)));
    }

    #[test]
    fn test_idempotent_after_repair() {
        let mut doc = broken_doc();
        repair_radio_appearances(&mut doc);
        let first = doc.to_bytes();
        assert_eq!(repair_radio_appearances(&mut doc), 0);
        assert_eq!(doc.to_bytes(), first);
    }

    #[test]
    fn test_consistent_group_untouched() {
        let data = assemble(&[
            "1 0 obj\n<< /Type /Catalog /Pages 2 0 R /AcroForm << /Fields [4 0 R] >> >>\nendobj\n",
            "2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n",
            "3 0 obj\n<< /Type /Page /Parent 2 0 R >>\nendobj\n",
            "4 0 obj\n<< /T (AW_26) /FT /Btn /Ff 32768 /V /nein /Kids [5 0 R 6 0 R] >>\nendobj\n",
            "5 0 obj\n<< /Parent 4 0 R /AS /nein /AP << /N << /nein null /Off null >> >> >>\nendobj\n",
            "6 0 obj\n<< /Parent 4 0 R /AS /Off /AP << /N << /ja null /Off null >> >> >>\nendobj\n",
        ]);
        let mut doc = Document::from_bytes(&data).unwrap();
        assert_eq!(repair_radio_appearances(&mut doc), 0);
    }

    #[test]
    fn test_unknown_group_skipped() {
        let data = assemble(&[
            "1 0 obj\n<< /Type /Catalog /Pages 2 0 R /AcroForm << /Fields [4 0 R] >> >>\nendobj\n",
            "2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n",
            "3 0 obj\n<< /Type /Page /Parent 2 0 R >>\nendobj\n",
            "4 0 obj\n<< /T (CUSTOM) /FT /Btn /V /x /Kids [5 0 R] >>\nendobj\n",
            "5 0 obj\n<< /Parent 4 0 R /AS /Off /AP << /N << /x null /Off null >> >> >>\nendobj\n",
        ]);
        let mut doc = Document::from_bytes(&data).unwrap();
        assert_eq!(repair_radio_appearances(&mut doc), 0);
    }
}
