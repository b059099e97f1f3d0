//! Mutation planning.
//!
//! Turns an instance list into the three lookup maps the widget writer
//! consumes. Values are normalized here, once, so that the writer only ever
//! sees writable text.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use log::warn;
use regex::Regex;

use crate::schema::{FieldKind, FormField};

lazy_static! {
    static ref ICD_FIELD: Regex = Regex::new(r"^VERS_DIAGNOSESCH_[1-4]$").unwrap();
    static ref LOOSE_DATE: Regex = Regex::new(r"^(\d{1,2})\D(\d{1,2})\D(\d{4})$").unwrap();
}

/// Field names holding a digits-only date (`DDMMYYYY`).
const DATE_FIELDS: &[&str] = &["VERS_GEBDAT", "PAT_Geburtsdatum"];

/// The three lookup maps driving one fill.
#[derive(Debug, Default)]
pub struct MutationPlan {
    /// Field `/T` -> normalized text
    pub text_map: IndexMap<String, String>,
    /// Field `/T` -> "ja" / "nein"
    pub checkbox_map: IndexMap<String, String>,
    /// Radio group `/T` -> target On-state label (Unicode)
    pub radio_map: IndexMap<String, String>,
}

impl MutationPlan {
    /// Build the plan from runtime instances.
    ///
    /// Empty text values never enter the plan, so untouched widgets stay
    /// untouched. When two members of one radio group are both truthy the
    /// last one wins and a warning is logged.
    pub fn build(fields: &[FormField]) -> Self {
        let mut plan = Self::default();

        for field in fields {
            let Some(value) = field.value.as_deref() else {
                continue;
            };
            match field.kind {
                FieldKind::Text => {
                    if !value.is_empty() {
                        plan.text_map
                            .insert(field.name.clone(), normalize_text_value(&field.name, value));
                    }
                },
                FieldKind::Checkbox => {
                    if !value.is_empty() {
                        let state = if field.is_truthy() { "ja" } else { "nein" };
                        plan.checkbox_map.insert(field.name.clone(), state.to_string());
                    }
                },
                FieldKind::RadioMember => {
                    if !field.is_truthy() {
                        continue;
                    }
                    let (Some(group), Some(state)) =
                        (field.radio_group.as_ref(), field.pdf_state.as_ref())
                    else {
                        warn!("radio member {} lacks group or pdf_state, ignored", field.name);
                        continue;
                    };
                    if let Some(previous) = plan
                        .radio_map
                        .insert(group.clone(), state.clone())
                    {
                        warn!(
                            "radio group {} selected twice ('{}' replaced by '{}')",
                            group, previous, state
                        );
                    }
                },
            }
        }

        plan
    }

    /// Whether the plan would touch anything at all.
    pub fn is_empty(&self) -> bool {
        self.text_map.is_empty() && self.checkbox_map.is_empty() && self.radio_map.is_empty()
    }
}

/// Field-specific normalization for text values.
///
/// Date fields become digits only, truncated to 8; day and month of a
/// recognizable `D.M.YYYY` value are zero-padded first so the comb cells
/// line up. ICD-10 key fields keep upper-cased alphanumerics (truncated to
/// 5); everything else is trimmed.
pub fn normalize_text_value(field_name: &str, value: &str) -> String {
    let text = value.trim();

    if DATE_FIELDS.contains(&field_name) {
        if let Some(caps) = LOOSE_DATE.captures(text) {
            return format!("{:0>2}{:0>2}{}", &caps[1], &caps[2], &caps[3]);
        }
        return text.chars().filter(|c| c.is_ascii_digit()).take(8).collect();
    }

    if ICD_FIELD.is_match(field_name) {
        return text
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_uppercase())
            .take(5)
            .collect();
    }

    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldStatus, FormField};

    #[test]
    fn test_date_normalization() {
        assert_eq!(normalize_text_value("VERS_GEBDAT", "6.1.1980"), "06011980");
        assert_eq!(normalize_text_value("VERS_GEBDAT", "06.01.1980"), "06011980");
        assert_eq!(normalize_text_value("VERS_GEBDAT", "geb. 1.2.1980 in X"), "121980");
        assert_eq!(normalize_text_value("PAT_Geburtsdatum", "01021980"), "01021980");
    }

    #[test]
    fn test_icd_normalization() {
        assert_eq!(normalize_text_value("VERS_DIAGNOSESCH_1", "M54.5 L"), "M545L");
        assert_eq!(normalize_text_value("VERS_DIAGNOSESCH_4", "f32.1"), "F321");
        // Only _1.._4 take the ICD rule.
        assert_eq!(normalize_text_value("VERS_DIAGNOSESCH_5", "M54.5"), "M54.5");
    }

    #[test]
    fn test_plain_text_trimmed_only() {
        assert_eq!(normalize_text_value("ANAMNESE", "  some text  "), "some text");
    }

    #[test]
    fn test_build_maps() {
        let mut name = FormField::text("VERS_NAME", "Name", 0);
        name.set_value("Muster, Max", FieldStatus::Filled);
        let empty = FormField::text("BEMERKUNGEN", "Bemerkungen", 12);
        let mut smoker = FormField::checkbox("AW_22", "Nikotin", 10);
        smoker.set_value("ja", FieldStatus::Manual);
        let mut no_drugs = FormField::checkbox("AW_19", "Drogen", 10);
        no_drugs.set_value("nein", FieldStatus::Manual);
        let mut radio = FormField::radio("AW_4_einschr", "AW_4", "Einschr\u{e4}nkungen", "E", 5);
        radio.set_value("ja", FieldStatus::Manual);
        let silent = FormField::radio("AW_4_keine", "AW_4", "keine", "K", 5);

        let plan = MutationPlan::build(&[name, empty, smoker, no_drugs, radio, silent]);
        assert_eq!(plan.text_map.get("VERS_NAME").map(String::as_str), Some("Muster, Max"));
        assert!(!plan.text_map.contains_key("BEMERKUNGEN"));
        assert_eq!(plan.checkbox_map.get("AW_22").map(String::as_str), Some("ja"));
        assert_eq!(plan.checkbox_map.get("AW_19").map(String::as_str), Some("nein"));
        assert_eq!(
            plan.radio_map.get("AW_4").map(String::as_str),
            Some("Einschr\u{e4}nkungen")
        );
    }

    #[test]
    fn test_last_truthy_radio_wins() {
        let mut a = FormField::radio("AW_25_ja", "AW_25", "ja", "ja", 11);
        a.set_value("ja", FieldStatus::Manual);
        let mut b = FormField::radio("AW_25_kb", "AW_25", "kann ich nicht beurteilen", "kb", 11);
        b.set_value("ja", FieldStatus::Manual);
        let plan = MutationPlan::build(&[a, b]);
        assert_eq!(
            plan.radio_map.get("AW_25").map(String::as_str),
            Some("kann ich nicht beurteilen")
        );
    }
}
