//! S0051 — Befundbericht für die Deutsche Rentenversicherung.
//!
//! Field names equal the `/T` entries of the S0051.pdf template. The
//! activity/participation matrix (section 5) is nine radio groups with the
//! same five options each; only `AW_4` spells its first option with a
//! capital K in the template.

use crate::schema::{FormDefinition, FormField};

/// Activity domains of section 5, one radio group each.
const ACTIVITY_GROUPS: &[(&str, &str)] = &[
    ("AW_4", "Lernen und Wissensanwendung"),
    ("AW_5", "Allgemeine Aufgaben und Anforderungen"),
    ("AW_6", "Kommunikation"),
    ("AW_7", "Mobilit\u{e4}t"),
    ("AW_8", "Arbeit und Besch\u{e4}ftigung"),
    ("AW_9", "Erziehung / Bildung"),
    ("AW_10", "Interpersonelle Aktivit\u{e4}ten"),
    ("AW_11", "H\u{e4}usliches Leben"),
    ("AW_12", "Selbstversorgung"),
];

/// Build the S0051 definition.
pub fn definition() -> FormDefinition {
    let mut fields = Vec::with_capacity(128);

    // Sektion 0: Kopfdaten / Identifikation
    fields.extend([
        FormField::text("VERS_VNR", "Versicherungsnummer", 0)
            .describe("Versicherungsnummer der Person, aus deren Versicherung die Leistung beantragt wird")
            .no_ai(),
        FormField::text("KENNZEICHEN", "Kennzeichen", 0)
            .describe("Kennzeichen / Aktenzeichen (soweit bekannt)")
            .no_ai(),
        FormField::text("DRV_Kopf_PAF_Reha_MSAT_MSNR", "MSAT / MSNR (Kopfzeile)", 0)
            .describe("Massnahme-Satz-Nummer / Massnahme-Nummer (Kopfzeile, alle Seiten)")
            .no_ai(),
        FormField::text("MSAT_MSNR", "MSAT / MSNR", 0)
            .describe("Massnahme-Satz-Nummer / Massnahme-Nummer")
            .no_ai(),
        FormField::text("VERS_NAME", "Name, Vorname (Versicherte/r)", 0)
            .describe("Name, Vorname der Person, aus deren Versicherung die Leistung beantragt wird"),
        FormField::text("VERS_GEBDAT", "Geburtsdatum (Versicherte/r)", 0)
            .describe("Geburtsdatum der versicherten Person (Format: TT.MM.JJJJ)"),
        FormField::text("VERS_STRASSE_HNR", "Strasse, Hausnummer (Versicherte/r)", 0)
            .describe("Strasse und Hausnummer der versicherten Person"),
        FormField::text("VERS_WOHNORT", "PLZ, Wohnort (Versicherte/r)", 0)
            .describe("Postleitzahl und Wohnort der versicherten Person"),
        FormField::text("PAT_NAME", "Patient/in (Name, Vorname)", 0)
            .describe("Name, Vorname der Patientin / des Patienten"),
        FormField::text("PAT_Geburtsdatum", "Geburtsdatum (Patient/in)", 0)
            .describe("Geburtsdatum der Patientin / des Patienten (Format: TT.MM.JJJJ)"),
        FormField::text("PAT_STRASSE_HNR", "Strasse, Hausnummer (Patient/in)", 0)
            .describe("Strasse und Hausnummer der Patientin / des Patienten"),
        FormField::text("PAT_PLZ_WOHNORT", "PLZ, Wohnort (Patient/in)", 0)
            .describe("Postleitzahl und Wohnort der Patientin / des Patienten"),
    ]);

    // Antragsart: Radio-Gruppe AW_1 mit 5 States
    fields.extend([
        FormField::radio(
            "AW_1_med_reha",
            "AW_1",
            "Leistungen zur medizinischen Rehabilitation",
            "Leistungen zur medizinischen Rehabilitation",
            0,
        )
        .describe("Antrag auf Leistungen zur medizinischen Rehabilitation")
        .no_ai(),
        FormField::radio(
            "AW_1_onko_reha",
            "AW_1",
            "Leistungen zur onkologischen Rehabilitation",
            "Leistungen zur onkologischen Rehabilitation",
            0,
        )
        .describe("Antrag auf Leistungen zur onkologischen Rehabilitation")
        .no_ai(),
        FormField::radio(
            "AW_1_lta",
            "AW_1",
            "Leistungen zur Teilhabe am Arbeitsleben (LTA)",
            "Leistungen zur Teilhabe am Arbeitsleben (LTA)",
            0,
        )
        .describe("Antrag auf Leistungen zur Teilhabe am Arbeitsleben")
        .no_ai(),
        FormField::radio(
            "AW_1_emr",
            "AW_1",
            "Erwerbsminderungsrente",
            "Erwerbsminderungsrente",
            0,
        )
        .describe("Antrag auf Erwerbsminderungsrente")
        .no_ai(),
        FormField::radio("AW_1_sonstige", "AW_1", "Sonstiges", "Sonstige Leistungen", 0)
            .describe("Antrag auf sonstige Leistungen")
            .no_ai(),
        FormField::text("SONSTIGES", "Sonstige Leistungen (Details)", 0)
            .describe("Naehere Angabe bei Auswahl 'Sonstige Leistungen'")
            .no_ai(),
    ]);

    // Sektion 1: Behandlung
    fields.extend([
        FormField::text("NAME_DER_\u{c4}RZTIN", "Name der Aerztin/des Arztes", 1)
            .describe("Name der behandelnden Aerztin / des Arztes / Psychotherapeutin / Psychotherapeut")
            .no_ai(),
        FormField::text("FACHRICHTUNG", "Fachrichtung", 1)
            .describe("Medizinische Fachrichtung der behandelnden Aerztin / des Arztes")
            .no_ai(),
        FormField::text("BEHANDLUNG_SEIT", "In Behandlung seit", 1)
            .describe("Datum, seit dem sich der Patient in Behandlung befindet (Format: TT.MM.JJJJ)"),
        FormField::text("KONTAKT_LETZTER", "Letzter Kontakt am", 1)
            .describe("Datum des letzten Kontakts mit dem Patienten (Format: TT.MM.JJJJ)")
            .no_ai(),
        FormField::text("TEL", "Telefonnummer", 1)
            .describe("Telefonnummer der Aerztin / des Arztes fuer Rueckfragen")
            .no_ai(),
        FormField::radio("AW_2_woechentlich", "AW_2", "w\u{f6}chentlich", "woechentlich", 1)
            .describe("Kontakthaeufigkeit: woechentlich")
            .no_ai(),
        FormField::radio("AW_2_14taegig", "AW_2", "14-t\u{e4}gig", "14-taegig", 1)
            .describe("Kontakthaeufigkeit: 14-taegig / alle zwei Wochen")
            .no_ai(),
        FormField::radio("AW_2_monatlich", "AW_2", "monatlich", "monatlich", 1)
            .describe("Kontakthaeufigkeit: monatlich")
            .no_ai(),
        FormField::radio("AW_2_seltener", "AW_2", "seltener", "seltener", 1)
            .describe("Kontakthaeufigkeit: seltener als monatlich")
            .no_ai(),
        FormField::radio("AW_3_nein", "AW_3", "nein", "Antrag nicht auf meine Anregung", 1)
            .describe("Der Antrag wurde nicht auf Anregung des Arztes gestellt")
            .no_ai(),
        FormField::radio("AW_3_ja", "AW_3", "ja", "Antrag auf meine Anregung", 1)
            .describe("Der Antrag wurde auf Anregung des Arztes gestellt")
            .no_ai(),
    ]);

    // Sektion 2: Diagnosen
    for i in 1..=4u8 {
        fields.push(
            FormField::text(&format!("DIAG_{}", i), &format!("Diagnose {}", i), 2)
                .describe("Diagnosetext"),
        );
        fields.push(
            FormField::text(&format!("ICD_{}", i), &format!("ICD-10 Code {}", i), 2)
                .describe("ICD-10 Diagnoseschluessel zur Diagnose (z.B. M54.5)"),
        );
    }

    // Sektion 3/4: Anamnese und Funktionseinschraenkungen
    fields.push(
        FormField::text("ANAMNESE", "Antragsrelevante Anamnese", 3).describe(
            "Antragsrelevante Anamnese einschliesslich Krankenhausaufenthalte und Berichte anderer Fachaerzte",
        ),
    );
    fields.push(
        FormField::text("FUNKTIONSEINSCHRAENKUNGEN", "Funktionseinschraenkungen", 4)
            .describe("Daraus resultierende Funktionseinschraenkungen in Beruf und Alltag"),
    );

    // Sektion 5: Aktivitaeten und Teilhabe. Fuenf Optionen pro Gruppe; nur
    // AW_4 schreibt die erste Option mit grossem K.
    for (group, domain) in ACTIVITY_GROUPS {
        let keine = if *group == "AW_4" {
            "Keine Beeintr\u{e4}chtigungen"
        } else {
            "keine Beeintr\u{e4}chtigungen"
        };
        for (suffix, state, label) in [
            ("keine", keine, "keine Beeintraechtigungen"),
            ("einschr", "Einschr\u{e4}nkungen", "Einschraenkungen"),
            ("hilfe", "Personelle Hilfe n\u{f6}tig", "Personelle Hilfe noetig"),
            ("nicht", "nicht durchf\u{fc}hrbar", "nicht durchfuehrbar"),
            ("ka", "Keine Angabe m\u{f6}glich", "Keine Angabe moeglich"),
        ] {
            fields.push(
                FormField::radio(&format!("{}_{}", group, suffix), group, state, label, 5)
                    .describe(&format!("{}: {}", domain, label))
                    .no_ai(),
            );
        }
    }

    // Sektion 6-9: lange Textfelder
    fields.extend([
        FormField::text("THERAPIE", "Bisherige und aktuelle Therapie", 6)
            .describe("Bisherige und aktuelle Therapie einschliesslich Medikation"),
        FormField::text("UNTERSUCHUNGSBEFUNDE", "Untersuchungsbefunde", 7)
            .describe("Aktuelle klinische Untersuchungsbefunde"),
        FormField::text("GROESSE_CM", "Koerpergroesse (cm)", 7)
            .describe("Koerpergroesse in Zentimetern"),
        FormField::text("GEWICHT_KG", "Gewicht (kg)", 7).describe("Koerpergewicht in Kilogramm"),
        FormField::text("TECHNISCHE_BEFEUNDE", "Medizinisch-technische Befunde", 8)
            .describe("Ergebnisse medizinisch-technischer Untersuchungen (Labor, Bildgebung)"),
        FormField::text("LEBENSUMSTAENDE", "Lebensumstaende / Kontextfaktoren", 9)
            .describe("Antragsrelevante Lebensumstaende und Kontextfaktoren"),
    ]);

    // Sektion 10: Risikofaktoren (Checkboxen)
    for (name, label) in [
        ("AW_17", "Bewegungsmangel"),
        ("AW_18", "Uebergewicht"),
        ("AW_19", "Drogen"),
        ("AW_20", "Medikamente"),
        ("AW_21", "Untergewicht"),
        ("AW_22", "Nikotin"),
        ("AW_23", "Alkohol"),
    ] {
        fields.push(
            FormField::checkbox(name, label, 10)
                .describe(&format!("Risikofaktor: {}", label))
                .no_ai(),
        );
    }

    // Sektion 11: Arbeitsunfaehigkeit / Prognose
    fields.extend([
        FormField::radio("AW_13_nein", "AW_13", "nein", "nein", 11)
            .describe("Zur Zeit nicht arbeitsunfaehig")
            .no_ai(),
        FormField::radio("AW_13_ja", "AW_13", "ja", "ja", 11)
            .describe("Zur Zeit arbeitsunfaehig")
            .no_ai(),
        FormField::text("AU_SEIT", "seit (Datum)", 11)
            .describe("Arbeitsunfaehig seit (Format: TT.MM.JJJJ)")
            .no_ai()
            .conditional("AW_13_ja", "ja"),
        FormField::text("AU_WEGEN", "wegen", 11)
            .describe("Arbeitsunfaehig wegen (Diagnose / Grund)")
            .no_ai()
            .conditional("AW_13_ja", "ja"),
        FormField::radio("AW_14_nein", "AW_14", "nein", "nein", 11)
            .describe("Keine wesentliche Aenderung des Gesundheitszustands")
            .no_ai(),
        FormField::radio("AW_14_ja", "AW_14", "ja", "ja", 11)
            .describe("Wesentliche Aenderung des Gesundheitszustands")
            .no_ai(),
        FormField::radio("AW_15_besserung", "AW_15", "Besserung seit", "Besserung seit", 11)
            .describe("Besserung des Gesundheitszustands seit")
            .no_ai()
            .conditional("AW_14_ja", "ja"),
        FormField::text("VERS_BESSERUNG_DATUM", "Datum Besserung", 11)
            .describe("Datum der Besserung (Format: TT.MM.JJJJ)")
            .no_ai()
            .conditional("AW_15_besserung", "ja"),
        FormField::radio(
            "AW_15_verschlechterung",
            "AW_15",
            "Verschlechterung seit",
            "Verschlechterung seit",
            11,
        )
        .describe("Verschlechterung des Gesundheitszustands seit")
        .no_ai()
        .conditional("AW_14_ja", "ja"),
        FormField::text("VERS_VERSCHLECHTERUNG_DATUM", "Datum Verschlechterung", 11)
            .describe("Datum der Verschlechterung (Format: TT.MM.JJJJ)")
            .no_ai()
            .conditional("AW_15_verschlechterung", "ja"),
        FormField::radio("AW_16_ja", "AW_16", "ja", "ja", 11)
            .describe("Verstaendigung in deutscher Sprache moeglich")
            .no_ai(),
        FormField::radio("AW_16_nein", "AW_16", "nein", "nein", 11)
            .describe("Verstaendigung in deutscher Sprache nicht moeglich")
            .no_ai(),
        FormField::text("SPRACHE", "Wenn nein, in welcher Sprache?", 11)
            .describe("Sprache, in der eine Verstaendigung moeglich ist")
            .no_ai()
            .conditional("AW_16_nein", "ja"),
        FormField::radio("AW_24_nein", "AW_24", "nein", "nein", 11)
            .describe("Reisefaehigkeit: oeffentliche Verkehrsmittel nicht zumutbar")
            .no_ai(),
        FormField::radio("AW_24_ja", "AW_24", "ja", "ja", 11)
            .describe("Reisefaehigkeit: oeffentliche Verkehrsmittel zumutbar")
            .no_ai(),
        FormField::checkbox("AW_24_1", "mit Begleitung", 11)
            .describe("Reise nur mit Begleitperson zumutbar")
            .no_ai()
            .conditional("AW_24_ja", "ja"),
        FormField::radio("AW_25_nein", "AW_25", "nein", "nein", 11)
            .describe("Rehabilitationsbeduerftigkeit nicht gegeben")
            .no_ai(),
        FormField::radio("AW_25_ja", "AW_25", "ja", "ja", 11)
            .describe("Rehabilitationsbeduerftigkeit gegeben")
            .no_ai(),
        FormField::radio(
            "AW_25_kb",
            "AW_25",
            "kann ich nicht beurteilen",
            "kann ich nicht beurteilen",
            11,
        )
        .describe("Rehabilitationsbeduerftigkeit nicht beurteilbar")
        .no_ai(),
        FormField::radio("AW_26_nein", "AW_26", "nein", "nein", 11)
            .describe("Erfolgsaussicht einer Rehabilitation nicht gegeben")
            .no_ai(),
        FormField::radio("AW_26_ja", "AW_26", "ja", "ja", 11)
            .describe("Erfolgsaussicht einer Rehabilitation gegeben")
            .no_ai(),
    ]);

    // Sektion 12: Bemerkungen und Unterschrift
    fields.extend([
        FormField::text("BEMERKUNGEN", "Bemerkungen", 12)
            .describe("Ergaenzende Bemerkungen"),
        FormField::text("ARZT_UNTERS_DATUM", "Unterschrift, Datum, Stempel", 12)
            .describe("Unterschrift der Aerztin / des Arztes mit Datum")
            .no_ai(),
    ]);

    FormDefinition {
        form_id: "S0051".to_string(),
        form_title: "Befundbericht f\u{fc}r die Deutsche Rentenversicherung".to_string(),
        fields,
    }
}
