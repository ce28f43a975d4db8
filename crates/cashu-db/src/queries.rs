//! Database query functions organized by domain.

pub mod keysets;
pub mod proofs;
pub mod settings;
