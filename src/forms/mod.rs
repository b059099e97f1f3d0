//! Form registry.
//!
//! Maps form ids to their definition, template filename and metadata. One
//! canonical schema per form, built once; the engine consumes definitions
//! through [`crate::schema`] only.

mod s0050;
mod s0051;

use std::collections::BTreeMap;

use lazy_static::lazy_static;

use crate::error::{Error, Result};
use crate::fill::BurnInTargets;
use crate::schema::FormDefinition;

/// A registered form.
#[derive(Debug, Clone)]
pub struct FormRegistryEntry {
    /// Stable form id (e.g. "S0051")
    pub form_id: String,
    /// The field schema
    pub definition: FormDefinition,
    /// Template filename under the template directory
    pub template_filename: String,
    /// Form ids generated automatically alongside this one
    pub generates: Vec<String>,
    /// Short description for listings
    pub description: String,
    /// Groups receiving a burn-in mark after filling
    pub burn_in: BurnInTargets,
}

/// Registry of all available forms.
#[derive(Debug, Default)]
pub struct FormRegistry {
    entries: BTreeMap<String, FormRegistryEntry>,
}

impl FormRegistry {
    /// Register a form.
    pub fn register(&mut self, entry: FormRegistryEntry) {
        self.entries.insert(entry.form_id.clone(), entry);
    }

    /// Look up a form, erroring on unknown ids.
    pub fn get(&self, form_id: &str) -> Result<&FormRegistryEntry> {
        self.entries
            .get(form_id)
            .ok_or_else(|| Error::UnknownForm(form_id.to_string()))
    }

    /// All registered entries, ordered by form id.
    pub fn entries(&self) -> impl Iterator<Item = &FormRegistryEntry> {
        self.entries.values()
    }
}

lazy_static! {
    static ref REGISTRY: FormRegistry = {
        let mut registry = FormRegistry::default();
        registry.register(FormRegistryEntry {
            form_id: "S0050".to_string(),
            definition: s0050::definition(),
            template_filename: "S0050.pdf".to_string(),
            generates: Vec::new(),
            description: "Honorarabrechnung f\u{fc}r die Deutsche Rentenversicherung".to_string(),
            burn_in: BurnInTargets::s0050(),
        });
        registry.register(FormRegistryEntry {
            form_id: "S0051".to_string(),
            definition: s0051::definition(),
            template_filename: "S0051.pdf".to_string(),
            generates: vec!["S0050".to_string()],
            description: "Befundbericht f\u{fc}r die Deutsche Rentenversicherung".to_string(),
            burn_in: BurnInTargets::s0051(),
        });
        registry
    };
}

/// The global form registry.
pub fn registry() -> &'static FormRegistry {
    &REGISTRY
}
