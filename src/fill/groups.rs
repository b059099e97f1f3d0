//! Per-group option tables for the S0050/S0051 template family.
//!
//! The ordered option lists below are authoritative for these templates.
//! They cannot be re-derived from a template whose state keys carry
//! arbitrary encoding damage, so they back both the positional fallback of
//! the radio selector and the repair pass. New template revisions get new
//! table entries, not introspection.

use std::collections::BTreeSet;

/// Ordered On-state labels of the activity matrix (`AW_4`..`AW_12`).
///
/// `AW_4` is the one group whose first option starts with a capital K.
fn activity_states(n: u32) -> Vec<&'static str> {
    let first = if n == 4 {
        "Keine Beeintr\u{e4}chtigungen"
    } else {
        "keine Beeintr\u{e4}chtigungen"
    };
    vec![
        first,
        "Einschr\u{e4}nkungen",
        "Personelle Hilfe n\u{f6}tig",
        "nicht durchf\u{fc}hrbar",
        "Keine Angabe m\u{f6}glich",
    ]
}

/// Ordered On-state labels for a known radio group, if the group is known.
pub fn known_states(group: &str) -> Option<Vec<&'static str>> {
    if let Some(n) = group
        .strip_prefix("AW_")
        .and_then(|rest| rest.parse::<u32>().ok())
    {
        if (4..=12).contains(&n) {
            return Some(activity_states(n));
        }
    }

    let states: Vec<&'static str> = match group {
        "AW_1" => vec![
            "Leistungen zur medizinischen Rehabilitation",
            "Leistungen zur onkologischen Rehabilitation",
            "Leistungen zur Teilhabe am Arbeitsleben (LTA)",
            "Erwerbsminderungsrente",
            "Sonstiges",
        ],
        "AW_2" => vec!["w\u{f6}chentlich", "14-t\u{e4}gig", "monatlich", "seltener"],
        "AW_14" => vec!["\u{dc}bergewicht", "Untergewicht"],
        "AW_22" => vec!["Besserung", "Verschlechterung"],
        "AW_25" => vec!["nein", "ja", "kann ich nicht beurteilen"],
        "AW_3" | "AW_20" | "AW_21" | "AW_23" | "AW_24" | "AW_26" => vec!["nein", "ja"],
        _ => return None,
    };
    Some(states)
}

/// Whether a group belongs to the activity matrix.
pub fn is_activity_group(group: &str) -> bool {
    group
        .strip_prefix("AW_")
        .and_then(|rest| rest.parse::<u32>().ok())
        .map(|n| (4..=12).contains(&n))
        .unwrap_or(false)
}

/// Per-form burn-in whitelist.
///
/// The set of groups that historically lost their widget appearance in some
/// viewers is an empirical list, not something a template reveals; forms
/// configure it here and an empty value disables the pass.
#[derive(Debug, Clone, Default)]
pub struct BurnInTargets {
    /// Radio groups: the selected kid widget receives the mark
    pub radio_groups: BTreeSet<String>,
    /// Checkboxes: the field widget (or its single kid) receives the mark
    pub checkboxes: BTreeSet<String>,
}

impl BurnInTargets {
    /// No burn-in.
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether the pass has nothing to do.
    pub fn is_empty(&self) -> bool {
        self.radio_groups.is_empty() && self.checkboxes.is_empty()
    }

    /// Historical list for S0051.
    pub fn s0051() -> Self {
        let mut radio_groups: BTreeSet<String> =
            (4..=12).map(|n| format!("AW_{}", n)).collect();
        for g in [
            "AW_1", "AW_2", "AW_3", "AW_14", "AW_20", "AW_21", "AW_22", "AW_23", "AW_24",
            "AW_25", "AW_26",
        ] {
            radio_groups.insert(g.to_string());
        }
        let checkboxes = ["AW_13", "AW_15", "AW_16", "AW_17", "AW_18", "AW_19", "AW_24_1"]
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            radio_groups,
            checkboxes,
        }
    }

    /// S0050 only ever misrendered its application-kind group.
    pub fn s0050() -> Self {
        Self {
            radio_groups: ["AW_1".to_string()].into_iter().collect(),
            checkboxes: BTreeSet::new(),
        }
    }
}
