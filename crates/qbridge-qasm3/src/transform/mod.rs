//! Structural transforms over a parsed [`Program`](crate::Program).
//!
//! Every transform edits the statement list in place; register declarations
//! are re-derived from it afterwards, so no numbering is ever cached across a
//! rewrite.

pub mod compat;
mod depth;
mod idle;
mod remap;
mod reset;

pub use idle::IdleQubits;
pub use remap::{QubitMapping, validate_mapping};
