//! Collaborator interfaces.
//!
//! Source-document text extraction and model-based field extraction happen
//! outside this crate; these traits are the seam. The engine itself never
//! calls them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::FormField;

/// One extracted field value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedValue {
    /// Target field name
    pub field_name: String,
    /// Extracted value
    pub value: String,
    /// Extractor's own confidence tag; passed through, never interpreted
    pub confidence: String,
}

/// Source-document text supplier (text layer, OCR, anything).
pub trait TextSource {
    /// Extract the combined text of the given documents.
    fn extract(&self, paths: &[&Path]) -> Result<String>;
}

/// Structured field extractor over free-form source text.
pub trait FieldExtractor {
    /// Propose values for the given schema fields.
    fn extract(&self, fields: &[FormField], source_text: &str) -> Result<Vec<ExtractedValue>>;
}

/// Merge extraction results into an instance list (empty targets only).
pub fn merge_extracted(fields: &mut [FormField], results: &[ExtractedValue]) {
    use crate::schema::FieldStatus;
    for result in results {
        if result.value.is_empty() {
            continue;
        }
        if let Some(field) = fields.iter_mut().find(|f| f.name == result.field_name) {
            if field.value.as_deref().unwrap_or("").is_empty() {
                field.set_value(result.value.clone(), FieldStatus::Filled);
            }
        }
    }
}
