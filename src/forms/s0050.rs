//! S0050 — Honorarabrechnung für die Deutsche Rentenversicherung.
//!
//! Derived automatically from a finalized S0051; every field is therefore
//! excluded from AI extraction.

use crate::schema::{FormDefinition, FormField};

/// Build the S0050 definition.
pub fn definition() -> FormDefinition {
    let mut fields = Vec::with_capacity(24);

    // Seite 1: Kopfdaten
    fields.extend([
        FormField::text("PAF_VSNR_trim", "Versicherungsnummer", 0)
            .describe("Versicherungsnummer")
            .no_ai(),
        FormField::text("PAF_AIGR", "Kennzeichen", 0)
            .describe("Kennzeichen / Aktenzeichen")
            .no_ai(),
    ]);

    // Antragsart: Radio-Gruppe AW_1 (gleiche States wie im S0051)
    for (name, state) in [
        ("AW_1_med_reha", "Leistungen zur medizinischen Rehabilitation"),
        ("AW_1_onko_reha", "Leistungen zur onkologischen Rehabilitation"),
        ("AW_1_lta", "Leistungen zur Teilhabe am Arbeitsleben (LTA)"),
        ("AW_1_emr", "Erwerbsminderungsrente"),
    ] {
        fields.push(
            FormField::radio(name, "AW_1", state, state, 0)
                .describe(&format!("Antrag auf {}", state))
                .no_ai(),
        );
    }

    // Verguetungs-Checkboxen
    fields.extend([
        FormField::checkbox("AW_Verguetung_BB", "Verguetung fuer Formular S0051 (41,04 EUR)", 0)
            .describe("Verguetung fuer das Formular S0051 - Befundbericht")
            .no_ai(),
        FormField::checkbox("AW_ZusBogen_onkol", "Verguetung fuer Formular S0052 (5 EUR)", 0)
            .describe("Verguetung fuer das Formular S0052 - Zusatzbogen onkologische Rehabilitation")
            .no_ai(),
    ]);

    // Personalien
    fields.extend([
        FormField::text("PAT_NAME", "Name, Vorname (Patientin/Patient)", 1)
            .describe("Name und Vorname der Patientin / des Patienten")
            .no_ai(),
        FormField::text("PAT_Geburtsdatum", "Geburtsdatum (Patientin/Patient)", 1)
            .describe("Geburtsdatum der Patientin / des Patienten")
            .no_ai(),
        FormField::text("VERS_NAME", "Name, Vorname (Versicherte/r)", 1)
            .describe("Name und Vorname der/des Versicherten (falls abweichend)")
            .no_ai(),
        FormField::text("VERS_GEBDAT", "Geburtsdatum (Versicherte/r)", 1)
            .describe("Geburtsdatum der/des Versicherten (falls abweichend)")
            .no_ai(),
    ]);

    // Seite 2: Zahlungsempfaenger und Bankdaten
    fields.extend([
        FormField::text("INSTITUTIONSKENNZEICHEN", "Institutionskennzeichen", 2)
            .describe("Institutionskennzeichen")
            .no_ai(),
        FormField::text("KONTOINH_IBAN", "IBAN", 2)
            .describe("IBAN (International Bank Account Number)")
            .no_ai(),
        FormField::text("KONTOINH_BANK_1", "Geldinstitut (Name, Ort)", 2)
            .describe("Name und Ort des Geldinstituts")
            .no_ai(),
        FormField::text("KONTOINH_NAME_1", "Kontoinhaber/in", 2)
            .describe("Name der Kontoinhaberin / des Kontoinhabers")
            .no_ai(),
        FormField::text("KONTOINH_ORT_1", "Strasse, Hausnummer, PLZ, Ort", 2)
            .describe("Vollstaendige Adresse (Strasse, Hausnummer, PLZ, Ort)")
            .no_ai(),
        FormField::text("RECHNUNG_NUM_1", "Rechnungsnummer", 2)
            .describe("Rechnungsnummer")
            .no_ai(),
        FormField::text("RECHNUNG_VOM", "Rechnung vom", 2)
            .describe("Rechnungsdatum (Format: TTMMJJJJ)")
            .no_ai(),
        FormField::text("ARZT_ORT", "Ort, Datum", 2)
            .describe("Ort und Datum der Unterschrift")
            .no_ai(),
        FormField::text("ARZT_UNTERS", "Unterschrift des Arztes", 2)
            .describe("Unterschrift, Name des Arztes")
            .no_ai(),
    ]);

    FormDefinition {
        form_id: "S0050".to_string(),
        form_title: "Honorarabrechnung f\u{fc}r die Deutsche Rentenversicherung".to_string(),
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aw1_group_present() {
        let def = definition();
        let members: Vec<_> = def
            .fields
            .iter()
            .filter(|f| f.radio_group.as_deref() == Some("AW_1"))
            .collect();
        assert_eq!(members.len(), 4);
    }

    #[test]
    fn test_no_field_extracted_by_ai() {
        assert!(definition().fields.iter().all(|f| !f.extract_from_ai));
    }
}
