//! Fill orchestration.
//!
//! One fill is strictly sequential: load the template, write page
//! annotations, write the AcroForm tree, save, then re-open the output for
//! the repair and burn-in passes and save again. Per-widget problems are
//! warnings and counters, never aborts; the output is always a valid PDF.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use log::{error, info, warn};

use crate::document::Document;
use crate::error::Result;
use crate::fill::burnin::burn_in_marks;
use crate::fill::buttons::{select_radio, set_checkbox};
use crate::fill::groups::BurnInTargets;
use crate::fill::plan::MutationPlan;
use crate::fill::repair::repair_radio_appearances;
use crate::fill::text::write_text_field;
use crate::introspect::{field_name, kid_refs, page_widgets, walk_fields};
use crate::object::{Object, ObjectRef};

/// Counters returned to the caller after a fill.
#[derive(Debug, Default, Clone)]
pub struct FillOutcome {
    /// Plan entries the engine tried to apply
    pub attempted: usize,
    /// Plan entries that reached at least one widget
    pub filled: usize,
    /// Widgets skipped for structural reasons
    pub skipped: usize,
    /// Human-readable warnings collected along the way
    pub warnings: Vec<String>,
}

impl FillOutcome {
    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }
}

/// Fill `template_path` according to `plan` and write the result to
/// `output_path`.
///
/// IO failures on open and save are fatal; a template without a usable
/// AcroForm is copied through unmodified with a warning.
pub fn fill(
    template_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    plan: &MutationPlan,
    burn_in: &BurnInTargets,
) -> Result<FillOutcome> {
    let template_path = template_path.as_ref();
    let output_path = output_path.as_ref();
    let mut outcome = FillOutcome {
        attempted: plan.text_map.len() + plan.checkbox_map.len() + plan.radio_map.len(),
        ..Default::default()
    };

    let mut doc = Document::open(template_path)?;

    if doc.acroform().map(|a| !a.contains_key("Fields")).unwrap_or(true) {
        error!(
            "{} has no AcroForm fields; saving an unmodified copy",
            template_path.display()
        );
        outcome.warn("template has no AcroForm fields".to_string());
        doc.save(output_path)?;
        return Ok(outcome);
    }

    if plan.radio_map.is_empty() {
        warn!("no radio selections in plan (radio_map is empty)");
    }

    let mut filled: HashSet<String> = HashSet::new();
    let mut written_text: HashSet<u32> = HashSet::new();

    // Text and checkboxes through the page annotations.
    for widget in page_widgets(&doc) {
        let Some(name) = widget.field_name else {
            outcome.skipped += 1;
            continue;
        };
        if let Some(value) = plan.text_map.get(&name) {
            if written_text.insert(widget.annot.id)
                && write_text_field(&mut doc, widget.annot, value)
            {
                filled.insert(name);
            }
        } else if let Some(value) = plan.checkbox_map.get(&name) {
            if set_checkbox(&mut doc, widget.annot, value) {
                filled.insert(name);
            }
        }
    }

    // Text fields whose widgets hide in /Kids, and radio groups, through
    // the AcroForm tree.
    let mut text_targets: Vec<(ObjectRef, String)> = Vec::new();
    let mut radio_targets: Vec<(ObjectRef, String, String)> = Vec::new();
    walk_fields(&doc, |node_ref, name| {
        let Some(name) = name else {
            return;
        };
        let Some(dict) = doc.get(node_ref).and_then(|o| o.as_dict()) else {
            return;
        };
        if let Some(value) = plan.text_map.get(name) {
            let is_text = dict.get("FT").and_then(|o| o.as_name()) == Some("Tx");
            let has_kids = !kid_refs(&doc, dict).is_empty();
            // Only the node carrying the name itself, not its widgets again.
            let own_name = field_name(&doc, dict);
            if (is_text || has_kids) && own_name.as_deref() == Some(name) {
                text_targets.push((node_ref, value.clone()));
            }
        }
        if let Some(state) = plan.radio_map.get(name) {
            let own_name = field_name(&doc, dict);
            if !kid_refs(&doc, dict).is_empty() && own_name.as_deref() == Some(name) {
                radio_targets.push((node_ref, name.to_string(), state.clone()));
            }
        }
    });

    for (node_ref, value) in text_targets {
        if !written_text.insert(node_ref.id) {
            continue;
        }
        let name = doc
            .get(node_ref)
            .and_then(|o| o.as_dict())
            .and_then(|d| field_name(&doc, d));
        if write_text_field(&mut doc, node_ref, &value) {
            if let Some(name) = name {
                filled.insert(name);
            }
        }
    }

    for (node_ref, group, state) in radio_targets {
        if select_radio(&mut doc, node_ref, &group, &state) {
            filled.insert(group);
        } else {
            outcome.warn(format!("radio group {} left unchanged", group));
        }
    }

    // The engine ships its own appearances.
    set_need_appearances(&mut doc, false);
    doc.save(output_path)?;

    // Safety net on the already saved file: reconcile /V with /AS and draw
    // the burn-in marks.
    let mut post = Document::open(output_path)?;
    let page_of: HashMap<u32, ObjectRef> = page_widgets(&post)
        .into_iter()
        .map(|w| (w.annot.id, w.page))
        .collect();
    repair_radio_appearances(&mut post);
    burn_in_marks(&mut post, burn_in, &page_of);
    set_need_appearances(&mut post, false);
    post.save(output_path)?;

    outcome.filled = filled.len();
    info!(
        "{}: {} of {} plan entries filled ({} widgets skipped)",
        output_path.display(),
        outcome.filled,
        outcome.attempted,
        outcome.skipped
    );
    Ok(outcome)
}

fn set_need_appearances(doc: &mut Document, value: bool) {
    match doc.acroform_mut() {
        Some(acro) => {
            acro.insert("NeedAppearances".to_string(), Object::Boolean(value));
        },
        None => warn!("no AcroForm in document"),
    }
}
