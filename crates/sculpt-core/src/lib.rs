//! # Sculpt Core Library
//!
//! A library for assembling in-memory molecular models (protein/DNA/RNA/ligand)
//! from coordinate-file records, repairing missing atoms by geometric
//! reconstruction from internal-coordinate topology templates, and maintaining
//! the design-site bookkeeping consumed by combinatorial sequence/rotamer
//! optimizers.
//!
//! ## Architectural Philosophy
//!
//! The library is organized around a small set of clearly separated concerns:
//!
//! - **[`core::models`]: The Data Model.** Owning arena of chains, residues,
//!   atoms and bonds, plus the design-site index that refers back into it.
//!
//! - **[`core::assembly`]: The Assembly Engine.** Streams fixed-column atom
//!   records into the data model, detecting chain and residue boundaries and
//!   invoking classification, terminal patching, and reconstruction.
//!
//! - **[`core::reconstruct`]: The Geometric Core.** Completes unobserved atom
//!   coordinates from internal-coordinate templates, derives backbone and
//!   sidechain torsions, and handles nucleotide pairing and mutation.
//!
//! - **[`core::topology`] and [`core::tables`]: External Services.** Read-only
//!   template databases and energy tables, shareable across assemblies.

pub mod core;
