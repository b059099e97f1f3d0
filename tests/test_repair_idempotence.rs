//! The repair pass must converge: running it on an already repaired file
//! leaves the touched objects byte-identical.

mod common;

use common::*;
use formfill::fill::repair::repair_radio_appearances;
use formfill::fill::{fill, BurnInTargets, MutationPlan};
use formfill::schema::{FieldStatus, FormField};
use formfill::{Document, Object, ObjectRef};

fn radio_on(name: &str, group: &str, state: &str) -> FormField {
    let mut f = FormField::radio(name, group, state, name, 0);
    f.set_value("ja", FieldStatus::Manual);
    f
}

#[test]
fn repair_on_fill_output_is_a_noop() {
    let mut tpl = TemplateBuilder::new();
    tpl.radio_group("AW_23", &["nein", "ja"]);
    tpl.radio_group(
        "AW_4",
        &[
            "Keine Beeintr\u{e4}chtigungen",
            "Einschr\u{e4}nkungen",
            "Personelle Hilfe n\u{f6}tig",
            "nicht durchf\u{fc}hrbar",
            "Keine Angabe m\u{f6}glich",
        ],
    );

    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("S0051.pdf");
    let output = dir.path().join("out.pdf");
    std::fs::write(&template, tpl.build()).unwrap();

    let fields = vec![
        radio_on("AW_23_ja", "AW_23", "ja"),
        radio_on("AW_4_ka", "AW_4", "Keine Angabe m\u{f6}glich"),
    ];
    fill(
        &template,
        &output,
        &MutationPlan::build(&fields),
        &BurnInTargets::none(),
    )
    .unwrap();

    // The engine already ran repair before the final save; another round
    // must change nothing.
    let mut doc = Document::open(&output).unwrap();
    let before = doc.to_bytes();
    assert_eq!(repair_radio_appearances(&mut doc), 0);
    assert_eq!(doc.to_bytes(), before);
}

#[test]
fn repair_restores_clobbered_as() {
    let mut tpl = TemplateBuilder::new();
    let (_, kids) = tpl.radio_group("AW_26", &["nein", "ja"]);

    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("S0051.pdf");
    let output = dir.path().join("out.pdf");
    std::fs::write(&template, tpl.build()).unwrap();

    fill(
        &template,
        &output,
        &MutationPlan::build(&[radio_on("AW_26_ja", "AW_26", "ja")]),
        &BurnInTargets::none(),
    )
    .unwrap();

    // Simulate a viewer that dropped the /AS flags but kept /V.
    let mut doc = Document::open(&output).unwrap();
    for &kid in &kids {
        let r = ObjectRef::new(kid, 0);
        if let Some(d) = doc.get_mut(r).and_then(|o| o.as_dict_mut()) {
            d.insert("AS".to_string(), Object::Name("Off".to_string()));
        }
    }
    assert_eq!(repair_radio_appearances(&mut doc), 1);

    let field = find_field(&doc, "AW_26").unwrap();
    assert_eq!(kid_as_names(&doc, field), vec!["Off".to_string(), "ja".to_string()]);
    assert_eq!(field_v_name(&doc, field).as_deref(), Some("ja"));

    // And the second run converges.
    let bytes = doc.to_bytes();
    assert_eq!(repair_radio_appearances(&mut doc), 0);
    assert_eq!(doc.to_bytes(), bytes);
}

#[test]
fn full_fill_is_deterministic() {
    let mut tpl = TemplateBuilder::new();
    tpl.radio_group("AW_24", &["nein", "ja"]);
    tpl.checkbox("AW_17", "Yes");

    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("S0051.pdf");
    let out_a = dir.path().join("a.pdf");
    let out_b = dir.path().join("b.pdf");
    std::fs::write(&template, tpl.build()).unwrap();

    let mut cb = FormField::checkbox("AW_17", "AW_17", 0);
    cb.set_value("ja", FieldStatus::Manual);
    let fields = vec![radio_on("AW_24_nein", "AW_24", "nein"), cb];
    let plan = MutationPlan::build(&fields);

    fill(&template, &out_a, &plan, &BurnInTargets::s0051()).unwrap();
    fill(&template, &out_b, &plan, &BurnInTargets::s0051()).unwrap();
    assert_eq!(std::fs::read(&out_a).unwrap(), std::fs::read(&out_b).unwrap());
}
