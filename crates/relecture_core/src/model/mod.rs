//! Journal domain model.
//!
//! # Responsibility
//! - Define the five entry kinds as one tagged union.
//! - Define typed links between entries and the relationship vocabulary.
//! - Define the signed-in session passed explicitly to every use-case.
//!
//! # Invariants
//! - An entry is addressed by `EntryRef { kind, id }`; ids are per kind.
//! - An entry never changes kind after creation.

pub mod entry;
pub mod link;
pub mod session;
