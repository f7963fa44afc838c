//! # Core Module
//!
//! The computational core of sculpt: molecular data models, the record-stream
//! assembly engine, the internal-coordinate reconstruction engine, template
//! databases, energy tables, and file I/O.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, residues, chains, the
//!   structure aggregate, and design sites
//! - **Assembly** ([`assembly`]) - Structure-from-records and ligand-from-records
//! - **Reconstruction** ([`reconstruct`]) - Coordinate completion, torsion
//!   derivation, terminal patching, nucleotide pairing and mutation
//! - **Structural Knowledge** ([`topology`]) - Residue and patch templates
//! - **Energy Tables** ([`tables`]) - Propensity/Ramachandran/rotamer evaluators
//! - **File I/O** ([`io`]) - PDB-format export
//! - **Geometry** ([`geometry`]) - Distance, angle, torsion, and
//!   internal-coordinate placement primitives

pub mod assembly;
pub mod error;
pub mod geometry;
pub mod io;
pub mod models;
pub mod reconstruct;
pub mod tables;
pub mod topology;
