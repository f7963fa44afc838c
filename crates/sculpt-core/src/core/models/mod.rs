//! The molecular data model.
//!
//! The hierarchy is strictly owned: a [`structure::Structure`] owns its
//! chains, a [`chain::Chain`] owns its residues, and a [`residue::Residue`]
//! owns its atoms and intra-residue bonds. Positions into the hierarchy are
//! plain indices; anything that holds one across a mutation (design sites in
//! particular) re-validates it on access instead of assuming stability.

pub mod atom;
pub mod chain;
pub mod design;
pub mod kind;
pub mod residue;
pub mod structure;
pub mod topology;
