//! Residue and patch template definitions.
//!
//! Templates are the chemical ground truth the assembly and reconstruction
//! engines build against: which atoms a residue has, how they are bonded,
//! and the internal coordinates that position each atom from three already
//! placed references.

pub mod registry;
