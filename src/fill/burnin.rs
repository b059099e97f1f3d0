//! Burn-in marks.
//!
//! For the whitelisted groups, a visible X is drawn straight into the page
//! content over the selected widget's rectangle. This is the last line of
//! defense for viewers that ignore widget appearances entirely; the mark
//! survives even form flattening.

use std::collections::HashMap;

use log::info;

use crate::document::Document;
use crate::fill::buttons::selected_kid;
use crate::fill::groups::{known_states, BurnInTargets};
use crate::introspect::{field_name, kid_refs, widget_rect};
use crate::names;
use crate::object::{Dict, Object, ObjectRef};

/// Draw marks for all selected widgets of the whitelisted groups.
///
/// `page_of` maps widget object numbers to their page for widgets that do
/// not carry `/P`. Returns the number of marks drawn.
pub fn burn_in_marks(
    doc: &mut Document,
    targets: &BurnInTargets,
    page_of: &HashMap<u32, ObjectRef>,
) -> usize {
    if targets.is_empty() {
        return 0;
    }

    let mut marked = 0;
    for field_ref in doc.acroform_field_refs() {
        let Some(dict) = doc.get(field_ref).and_then(|o| o.as_dict()) else {
            continue;
        };
        let Some(name) = field_name(doc, dict) else {
            continue;
        };

        let widget = if targets.radio_groups.contains(&name) {
            selected_radio_widget(doc, field_ref)
        } else if targets.checkboxes.contains(&name) {
            selected_checkbox_widget(doc, field_ref)
        } else {
            None
        };

        if let Some(widget) = widget {
            if draw_x_on_widget(doc, widget, page_of) {
                marked += 1;
            }
        }
    }

    if marked > 0 {
        info!("burn-in: {} visible marks drawn", marked);
    }
    marked
}

/// The selected kid of a radio group: by `/AS`, else by `/V` plus the known
/// widget order.
fn selected_radio_widget(doc: &Document, field_ref: ObjectRef) -> Option<ObjectRef> {
    let dict = doc.get(field_ref)?.as_dict()?;
    let kids = kid_refs(doc, dict);
    if kids.is_empty() {
        return None;
    }
    if let Some(kid) = selected_kid(doc, &kids) {
        return Some(kid);
    }

    // /AS did not survive; fall back to /V and the stable option order.
    let name = field_name(doc, dict)?;
    let states = known_states(&name)?;
    let token = dict
        .get("V")
        .map(|v| doc.resolve(v))
        .and_then(|v| v.as_name())
        .map(names::state_token)?;
    let index = states.iter().position(|s| names::state_token(s) == token)?;
    kids.get(index).copied()
}

/// The checked widget of a checkbox: the field itself (merged form) or its
/// first on kid.
fn selected_checkbox_widget(doc: &Document, field_ref: ObjectRef) -> Option<ObjectRef> {
    let dict = doc.get(field_ref)?.as_dict()?;
    let own_as = dict.get("AS").and_then(|o| o.as_name());
    if own_as.map(|n| !names::is_off(n)).unwrap_or(false) {
        return Some(field_ref);
    }
    let kids = kid_refs(doc, dict);
    selected_kid(doc, &kids)
}

/// Append a stroked X over the widget's rectangle to its page content.
fn draw_x_on_widget(
    doc: &mut Document,
    widget_ref: ObjectRef,
    page_of: &HashMap<u32, ObjectRef>,
) -> bool {
    let Some(widget) = doc.get(widget_ref).and_then(|o| o.as_dict()) else {
        return false;
    };
    let Some([x0, y0, x1, y1]) = widget_rect(doc, widget) else {
        return false;
    };
    let page_ref = widget
        .get("P")
        .and_then(|o| o.as_reference())
        .or_else(|| page_of.get(&widget_ref.id).copied());
    let Some(page_ref) = page_ref else {
        return false;
    };

    let left = x0.min(x1) + 1.0;
    let right = x0.max(x1) - 1.0;
    let bottom = y0.min(y1) + 1.0;
    let top = y0.max(y1) - 1.0;
    if right <= left || top <= bottom {
        return false;
    }

    let content = format!(
        "q\n0 0 0 RG\n1.1 w\n{:.3} {:.3} m {:.3} {:.3} l S\n{:.3} {:.3} m {:.3} {:.3} l S\nQ\n",
        left, bottom, right, top, left, top, right, bottom
    );
    let stream_ref = doc.insert(Object::Stream {
        dict: Dict::new(),
        data: bytes::Bytes::from(content.into_bytes()),
    });

    let Some(page) = doc.get_mut(page_ref).and_then(|o| o.as_dict_mut()) else {
        return false;
    };
    match page.get_mut("Contents") {
        None => {
            page.insert("Contents".to_string(), Object::Reference(stream_ref));
        },
        Some(Object::Array(arr)) => arr.push(Object::Reference(stream_ref)),
        Some(existing) => {
            let previous = existing.clone();
            *existing = Object::Array(vec![previous, Object::Reference(stream_ref)]);
        },
    }
    true
}
