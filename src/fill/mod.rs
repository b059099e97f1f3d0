//! The template-mutation engine.
//!
//! [`plan::MutationPlan`] says what to write, [`engine::fill`] runs the
//! whole sequence: page-annotation writes, AcroForm-tree writes, save,
//! repair, burn-in, save.

pub mod burnin;
pub mod buttons;
pub mod engine;
pub mod groups;
pub mod plan;
pub mod repair;
pub mod text;

pub use engine::{fill, FillOutcome};
pub use groups::BurnInTargets;
pub use plan::MutationPlan;
