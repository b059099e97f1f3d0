//! Declarative field model.
//!
//! A form definition is an ordered, immutable list of logical fields. Field
//! names equal the PDF `/T` of the target field, except for radio members,
//! whose name is a synthetic suffix and whose `radio_group` carries the
//! parent's `/T`. The engine consumes only the invariants below; the
//! remaining metadata (sections, descriptions, conditional visibility,
//! AI extractability) exists for upstream callers.

use serde::{Deserialize, Serialize};

/// Kind of a logical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text, written with a synthesized appearance stream
    Text,
    /// Two-state button addressed by its own `/T`
    Checkbox,
    /// One option of a radio group addressed by the group's `/T`
    RadioMember,
}

/// Fill status of a runtime instance (informational).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    /// No value yet
    #[default]
    Unfilled,
    /// Value produced by extraction
    Filled,
    /// Value entered or corrected by hand
    Manual,
}

/// A logical field together with its runtime value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormField {
    /// PDF `/T` (text, checkbox) or synthetic member id (radio member)
    pub name: String,
    /// Field kind
    pub kind: FieldKind,
    /// Human-readable label (display only)
    pub label: String,
    /// UI grouping; invisible to the engine
    pub section: u8,
    /// Hint for the upstream extractor; ignored by the engine
    pub description: String,
    /// For radio members: `/T` of the parent radio field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radio_group: Option<String>,
    /// For radio members: exact Unicode text of the target On-state key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_state: Option<String>,
    /// Field this one's visibility depends on (upstream UI only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_on: Option<String>,
    /// Value `conditional_on` must have (upstream UI only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_value: Option<String>,
    /// Whether the upstream extractor should attempt this field
    #[serde(default = "default_true")]
    pub extract_from_ai: bool,
    /// Current value, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Fill status
    #[serde(default)]
    pub status: FieldStatus,
}

fn default_true() -> bool {
    true
}

impl FormField {
    /// New text field.
    pub fn text(name: &str, label: &str, section: u8) -> Self {
        Self::new(name, FieldKind::Text, label, section)
    }

    /// New checkbox field.
    pub fn checkbox(name: &str, label: &str, section: u8) -> Self {
        Self::new(name, FieldKind::Checkbox, label, section)
    }

    /// New radio member of `group` selecting the `pdf_state` option.
    pub fn radio(name: &str, group: &str, pdf_state: &str, label: &str, section: u8) -> Self {
        let mut f = Self::new(name, FieldKind::RadioMember, label, section);
        f.radio_group = Some(group.to_string());
        f.pdf_state = Some(pdf_state.to_string());
        f
    }

    fn new(name: &str, kind: FieldKind, label: &str, section: u8) -> Self {
        Self {
            name: name.to_string(),
            kind,
            label: label.to_string(),
            section,
            description: String::new(),
            radio_group: None,
            pdf_state: None,
            conditional_on: None,
            conditional_value: None,
            extract_from_ai: true,
            value: None,
            status: FieldStatus::Unfilled,
        }
    }

    /// Set the extractor hint.
    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Exclude this field from AI extraction.
    pub fn no_ai(mut self) -> Self {
        self.extract_from_ai = false;
        self
    }

    /// Make visibility depend on another field's value.
    pub fn conditional(mut self, on: &str, value: &str) -> Self {
        self.conditional_on = Some(on.to_string());
        self.conditional_value = Some(value.to_string());
        self
    }

    /// Set a value and mark the field filled.
    pub fn set_value(&mut self, value: impl Into<String>, status: FieldStatus) {
        self.value = Some(value.into());
        self.status = status;
    }

    /// Whether the current value selects/checks this field.
    pub fn is_truthy(&self) -> bool {
        self.value.as_deref().map(is_truthy).unwrap_or(false)
    }
}

/// Case-insensitive truthy set used for checkbox and radio values.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "ja" | "yes" | "true" | "1" | "on"
    )
}

/// A registered form: id, title and its ordered field list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormDefinition {
    /// Stable form id (e.g. "S0051")
    pub form_id: String,
    /// Human-readable title
    pub form_title: String,
    /// Ordered logical fields
    pub fields: Vec<FormField>,
}

impl FormDefinition {
    /// Fresh instance list (all values empty) for a fill session.
    pub fn instantiate(&self) -> Vec<FormField> {
        self.fields.clone()
    }

    /// Find a field by name.
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthy_set() {
        for v in ["ja", "JA", "yes", "true", "1", "on", " Ja "] {
            assert!(is_truthy(v), "{v:?} should be truthy");
        }
        for v in ["nein", "no", "0", "", "off", "jein"] {
            assert!(!is_truthy(v), "{v:?} should be falsy");
        }
    }

    #[test]
    fn test_radio_builder() {
        let f = FormField::radio(
            "AW_4_einschr",
            "AW_4",
            "Einschr\u{e4}nkungen",
            "Einschraenkungen",
            5,
        )
        .no_ai();
        assert_eq!(f.kind, FieldKind::RadioMember);
        assert_eq!(f.radio_group.as_deref(), Some("AW_4"));
        assert_eq!(f.pdf_state.as_deref(), Some("Einschr\u{e4}nkungen"));
        assert!(!f.extract_from_ai);
        assert!(!f.is_truthy());
    }

    #[test]
    fn test_set_value() {
        let mut f = FormField::checkbox("AW_17", "Nikotin", 10);
        f.set_value("ja", FieldStatus::Filled);
        assert!(f.is_truthy());
        assert_eq!(f.status, FieldStatus::Filled);
    }

    #[test]
    fn test_serde_roundtrip() {
        let f = FormField::text("VERS_NAME", "Name, Vorname", 0).describe("Name der Person");
        let json = serde_json::to_string(&f).unwrap();
        let back: FormField = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "VERS_NAME");
        assert_eq!(back.kind, FieldKind::Text);
        assert!(back.extract_from_ai);
    }
}
