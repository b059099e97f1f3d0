//! # formfill
//!
//! Fills the interactive AcroForm templates of the German pension
//! insurance's medical report forms (families S0050 and S0051) from
//! structured field values.
//!
//! The engineering weight sits in the template-mutation engine: it flips
//! text, checkbox and radio widgets in third-party templates whose button
//! state names carry German umlauts in three mutually inconsistent
//! encodings, and guarantees that every mark renders in every viewer
//! (own appearance streams, a post-save repair pass, and content-stream
//! burn-in marks for the historically unreliable groups).
//!
//! ## Quick start
//!
//! ```no_run
//! use formfill::fill::{fill, MutationPlan};
//! use formfill::forms::registry;
//! use formfill::schema::FieldStatus;
//!
//! # fn main() -> formfill::Result<()> {
//! let entry = registry().get("S0051")?;
//! let mut fields = entry.definition.instantiate();
//! if let Some(f) = fields.iter_mut().find(|f| f.name == "AW_4_einschr") {
//!     f.set_value("ja", FieldStatus::Manual);
//! }
//!
//! let plan = MutationPlan::build(&fields);
//! let outcome = fill("data/S0051.pdf", "out/S0051_filled.pdf", &plan, &entry.burn_in)?;
//! println!("{} of {} entries filled", outcome.filled, outcome.attempted);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Core PDF parsing
pub mod document;
pub mod lexer;
pub mod object;
pub mod objstm;
pub mod parser;
pub mod xref;

// Stream decoders
pub mod decoders;

// Serialization
pub mod serializer;

// Name codec and label normalization
pub mod names;

// Field model and form definitions
pub mod forms;
pub mod schema;

// Template introspection and mutation
pub mod fill;
pub mod introspect;

// Upstream plumbing
pub mod config;
pub mod extract;
pub mod pipeline;
pub mod session;

// Re-exports
pub use document::Document;
pub use error::{Error, Result};
pub use fill::{fill as fill_template, FillOutcome, MutationPlan};
pub use object::{Dict, Object, ObjectRef};
pub use schema::{FieldKind, FieldStatus, FormDefinition, FormField};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.starts_with("0."));
    }
}
