//! Per-form post-processing.
//!
//! Instead of handler-class hooks, each form gets a pipeline of plain
//! functions over the instance list, run after extraction and before
//! planning. Cross-form generation (S0051 feeds S0050) is a separate
//! orchestration step, not a hook.

use std::collections::HashMap;
use std::path::Path;

use chrono::Local;
use log::warn;
use serde::Deserialize;

use crate::schema::{FieldStatus, FormField};

/// One pass over the instance list.
pub type FieldPass = fn(&mut [FormField], &PassContext);

/// Context shared by all passes of one run.
#[derive(Debug, Default, Clone)]
pub struct PassContext {
    /// Sender (physician) record, when one is configured
    pub sender: Option<SenderData>,
}

/// Physician master data, kept in `sender_data.json` next to the templates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SenderData {
    /// Academic title
    #[serde(default)]
    pub titel: Option<String>,
    /// Given name
    #[serde(default)]
    pub vorname: Option<String>,
    /// Family name
    #[serde(default)]
    pub name: Option<String>,
    /// Medical specialty
    #[serde(default)]
    pub fachrichtung: Option<String>,
    /// Phone number for queries
    #[serde(default)]
    pub telefon: Option<String>,
    /// Street
    #[serde(default)]
    pub strasse: Option<String>,
    /// House number
    #[serde(default)]
    pub hausnummer: Option<String>,
    /// Postal code
    #[serde(default)]
    pub plz: Option<String>,
    /// City
    #[serde(default)]
    pub ort: Option<String>,
    /// IBAN, country prefix included
    #[serde(default)]
    pub iban: Option<String>,
    /// Bank name
    #[serde(default)]
    pub kreditinstitut: Option<String>,
}

impl SenderData {
    /// "Titel Vorname Name", skipping empty parts.
    pub fn full_name(&self) -> String {
        [&self.titel, &self.vorname, &self.name]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// "Vorname Name" for signature lines.
    pub fn signature_name(&self) -> String {
        [&self.vorname, &self.name]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// `sender_data.json`: either `{"active_doctor_index": n, "doctors": [...]}`
/// or the legacy single-object form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SenderFile {
    Roster {
        #[serde(default)]
        active_doctor_index: usize,
        doctors: Vec<SenderData>,
    },
    Legacy(SenderData),
}

/// Load the active sender record, tolerating a missing or malformed file.
pub fn load_sender_data(path: impl AsRef<Path>) -> Option<SenderData> {
    let path = path.as_ref();
    if !path.exists() {
        return None;
    }
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            warn!("could not read {}: {}", path.display(), e);
            return None;
        },
    };
    match serde_json::from_str::<SenderFile>(&text) {
        Ok(SenderFile::Roster {
            active_doctor_index,
            mut doctors,
        }) => {
            if doctors.is_empty() {
                return None;
            }
            let index = if active_doctor_index < doctors.len() {
                active_doctor_index
            } else {
                0
            };
            Some(doctors.swap_remove(index))
        },
        Ok(SenderFile::Legacy(data)) => Some(data),
        Err(e) => {
            warn!("could not parse {}: {}", path.display(), e);
            None
        },
    }
}

fn set_if_present(fields: &mut [FormField], name: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    if let Some(field) = fields.iter_mut().find(|f| f.name == name) {
        field.set_value(value, FieldStatus::Filled);
    }
}

/// Fill the treatment-section fields of S0051 from the sender record.
pub fn apply_sender_data(fields: &mut [FormField], ctx: &PassContext) {
    let Some(sender) = &ctx.sender else {
        return;
    };

    let doctor = sender.full_name();
    set_if_present(fields, "NAME_DER_\u{c4}RZTIN", &doctor);
    if let Some(fach) = sender.fachrichtung.as_deref() {
        set_if_present(fields, "FACHRICHTUNG", fach);
    }
    if let Some(tel) = sender.telefon.as_deref() {
        set_if_present(fields, "TEL", tel);
    }
    if !doctor.is_empty() {
        let today = Local::now().format("%d.%m.%Y");
        set_if_present(fields, "ARZT_UNTERS_DATUM", &format!("{}, {}", doctor, today));
    }
}

/// Copy `PAT_*` values into the matching empty `VERS_*` fields.
pub fn copy_patient_to_insured(fields: &mut [FormField], _ctx: &PassContext) {
    for (src, dst) in [
        ("PAT_NAME", "VERS_NAME"),
        ("PAT_Geburtsdatum", "VERS_GEBDAT"),
        ("PAT_STRASSE_HNR", "VERS_STRASSE_HNR"),
        ("PAT_PLZ_WOHNORT", "VERS_WOHNORT"),
    ] {
        let value = fields
            .iter()
            .find(|f| f.name == src)
            .and_then(|f| f.value.clone());
        let Some(value) = value else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        if let Some(target) = fields.iter_mut().find(|f| f.name == dst) {
            if target.value.as_deref().unwrap_or("").is_empty() {
                target.set_value(value, FieldStatus::Filled);
            }
        }
    }
}

/// The pass pipeline for a form.
pub fn passes_for(form_id: &str) -> &'static [FieldPass] {
    match form_id {
        "S0051" => &[apply_sender_data, copy_patient_to_insured],
        _ => &[],
    }
}

/// Run a form's pipeline in order.
pub fn run_passes(form_id: &str, fields: &mut [FormField], ctx: &PassContext) {
    for pass in passes_for(form_id) {
        pass(fields, ctx);
    }
}

fn value_of<'a>(by_name: &'a HashMap<&str, &FormField>, name: &str) -> Option<&'a str> {
    by_name
        .get(name)
        .and_then(|f| f.value.as_deref())
        .filter(|v| !v.is_empty())
}

/// Derive a filled S0050 instance list from a finalized S0051.
///
/// Carries over insurance number, application kind, patient and insured
/// data, adds the sender's bank details and the generated dates, and checks
/// the S0051 remuneration box.
pub fn derive_s0050(s0051_fields: &[FormField], ctx: &PassContext) -> Vec<FormField> {
    let mut out = crate::forms::registry()
        .get("S0050")
        .expect("S0050 is registered")
        .definition
        .instantiate();

    let by_name: HashMap<&str, &FormField> =
        s0051_fields.iter().map(|f| (f.name.as_str(), f)).collect();
    let mut set = |name: &str, value: String| {
        if let Some(field) = out.iter_mut().find(|f| f.name == name) {
            field.set_value(value, FieldStatus::Manual);
        }
    };

    if let Some(v) = value_of(&by_name, "VERS_VNR") {
        set("PAF_VSNR_trim", v.to_string());
    }
    if let Some(v) = value_of(&by_name, "KENNZEICHEN") {
        set("PAF_AIGR", v.to_string());
    }

    // Application kind: the first truthy AW_1 member carries over.
    for member in ["AW_1_med_reha", "AW_1_onko_reha", "AW_1_lta", "AW_1_emr"] {
        if by_name.get(member).map(|f| f.is_truthy()).unwrap_or(false) {
            set(member, "ja".to_string());
            break;
        }
    }

    // Remuneration for the S0051 report itself.
    set("AW_Verguetung_BB", "ja".to_string());

    for (src, dst) in [("PAT_NAME", "PAT_NAME"), ("PAT_Geburtsdatum", "PAT_Geburtsdatum")] {
        if let Some(v) = value_of(&by_name, src) {
            set(dst, v.to_string());
        }
    }

    // Insured data, falling back to the patient.
    let vers_name = value_of(&by_name, "VERS_NAME").or_else(|| value_of(&by_name, "PAT_NAME"));
    if let Some(v) = vers_name {
        set("VERS_NAME", v.to_string());
    }
    let vers_gebdat =
        value_of(&by_name, "VERS_GEBDAT").or_else(|| value_of(&by_name, "PAT_Geburtsdatum"));
    if let Some(v) = vers_gebdat {
        set("VERS_GEBDAT", v.to_string());
    }

    let now = Local::now();
    set("RECHNUNG_VOM", now.format("%d%m%Y").to_string());

    if let Some(sender) = &ctx.sender {
        if let Some(iban) = sender.iban.as_deref() {
            // Drop the country prefix; the form provides printed boxes for it.
            let trimmed = if iban.len() > 2 { &iban[2..] } else { iban };
            set("KONTOINH_IBAN", trimmed.to_string());
        }
        if let Some(bank) = sender.kreditinstitut.as_deref() {
            set("KONTOINH_BANK_1", bank.to_string());
        }
        let holder = sender.signature_name();
        if !holder.is_empty() {
            set("KONTOINH_NAME_1", holder.clone());
            set("ARZT_UNTERS", holder);
        }

        let mut address = Vec::new();
        if let Some(street) = sender.strasse.as_deref().filter(|s| !s.is_empty()) {
            let mut line = street.to_string();
            if let Some(no) = sender.hausnummer.as_deref().filter(|s| !s.is_empty()) {
                line.push(' ');
                line.push_str(no);
            }
            address.push(line);
        }
        if let (Some(plz), Some(ort)) = (sender.plz.as_deref(), sender.ort.as_deref()) {
            if !plz.is_empty() && !ort.is_empty() {
                address.push(format!("{} {}", plz, ort));
            }
        }
        if !address.is_empty() {
            set("KONTOINH_ORT_1", address.join(", "));
        }

        let date = now.format("%d.%m.%Y");
        let ort_datum = match sender.ort.as_deref().filter(|s| !s.is_empty()) {
            Some(ort) => format!("{}, {}", ort, date),
            None => date.to_string(),
        };
        set("ARZT_ORT", ort_datum);
    } else {
        set("ARZT_ORT", now.format("%d.%m.%Y").to_string());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::registry;

    fn sender() -> SenderData {
        SenderData {
            titel: Some("Dr. med.".to_string()),
            vorname: Some("Eva".to_string()),
            name: Some("Beispiel".to_string()),
            fachrichtung: Some("Orthop\u{e4}die".to_string()),
            telefon: Some("030 123456".to_string()),
            strasse: Some("Hauptstra\u{df}e".to_string()),
            hausnummer: Some("5".to_string()),
            plz: Some("10115".to_string()),
            ort: Some("Berlin".to_string()),
            iban: Some("DE02120300000000202051".to_string()),
            kreditinstitut: Some("Testbank Berlin".to_string()),
        }
    }

    fn field_value<'a>(fields: &'a [FormField], name: &str) -> Option<&'a str> {
        fields.iter().find(|f| f.name == name).and_then(|f| f.value.as_deref())
    }

    #[test]
    fn test_apply_sender_data() {
        let mut fields = registry().get("S0051").unwrap().definition.instantiate();
        let ctx = PassContext {
            sender: Some(sender()),
        };
        run_passes("S0051", &mut fields, &ctx);
        assert_eq!(
            field_value(&fields, "NAME_DER_\u{c4}RZTIN"),
            Some("Dr. med. Eva Beispiel")
        );
        assert_eq!(field_value(&fields, "FACHRICHTUNG"), Some("Orthop\u{e4}die"));
        assert_eq!(field_value(&fields, "TEL"), Some("030 123456"));
        assert!(field_value(&fields, "ARZT_UNTERS_DATUM")
            .unwrap()
            .starts_with("Dr. med. Eva Beispiel, "));
    }

    #[test]
    fn test_patient_copy_only_fills_empty() {
        let mut fields = registry().get("S0051").unwrap().definition.instantiate();
        fields
            .iter_mut()
            .find(|f| f.name == "PAT_NAME")
            .unwrap()
            .set_value("Muster, Max", FieldStatus::Filled);
        fields
            .iter_mut()
            .find(|f| f.name == "VERS_NAME")
            .unwrap()
            .set_value("Anders, Anna", FieldStatus::Manual);

        copy_patient_to_insured(&mut fields, &PassContext::default());
        assert_eq!(field_value(&fields, "VERS_NAME"), Some("Anders, Anna"));
    }

    #[test]
    fn test_derive_s0050() {
        let mut s51 = registry().get("S0051").unwrap().definition.instantiate();
        for (name, value) in [
            ("VERS_VNR", "12 160885 K 005"),
            ("PAT_NAME", "Muster, Max"),
            ("PAT_Geburtsdatum", "16.08.1985"),
            ("AW_1_med_reha", "ja"),
        ] {
            s51.iter_mut()
                .find(|f| f.name == name)
                .unwrap()
                .set_value(value, FieldStatus::Manual);
        }
        let ctx = PassContext {
            sender: Some(sender()),
        };
        let s50 = derive_s0050(&s51, &ctx);

        assert_eq!(field_value(&s50, "PAF_VSNR_trim"), Some("12 160885 K 005"));
        assert_eq!(field_value(&s50, "AW_1_med_reha"), Some("ja"));
        assert_eq!(field_value(&s50, "AW_Verguetung_BB"), Some("ja"));
        assert_eq!(field_value(&s50, "PAT_NAME"), Some("Muster, Max"));
        // Insured falls back to patient data.
        assert_eq!(field_value(&s50, "VERS_NAME"), Some("Muster, Max"));
        assert_eq!(field_value(&s50, "VERS_GEBDAT"), Some("16.08.1985"));
        // IBAN without the DE prefix.
        assert_eq!(field_value(&s50, "KONTOINH_IBAN"), Some("02120300000000202051"));
        assert_eq!(
            field_value(&s50, "KONTOINH_ORT_1"),
            Some("Hauptstra\u{df}e 5, 10115 Berlin")
        );
        assert_eq!(field_value(&s50, "KONTOINH_NAME_1"), Some("Eva Beispiel"));
        assert!(field_value(&s50, "ARZT_ORT").unwrap().starts_with("Berlin, "));
        assert_eq!(field_value(&s50, "RECHNUNG_VOM").unwrap().len(), 8);
    }

    #[test]
    fn test_load_sender_roster() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sender_data.json");
        std::fs::write(
            &path,
            r#"{"active_doctor_index": 1, "doctors": [{"name": "A"}, {"name": "B"}]}"#,
        )
        .unwrap();
        assert_eq!(load_sender_data(&path).unwrap().name.as_deref(), Some("B"));
    }

    #[test]
    fn test_load_sender_legacy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sender_data.json");
        std::fs::write(&path, r#"{"name": "Solo", "vorname": "Sanda"}"#).unwrap();
        let data = load_sender_data(&path).unwrap();
        assert_eq!(data.signature_name(), "Sanda Solo");
    }

    #[test]
    fn test_load_sender_missing_file() {
        assert!(load_sender_data("/nonexistent/sender.json").is_none());
    }
}
