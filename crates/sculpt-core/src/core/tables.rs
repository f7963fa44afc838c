//! Backbone-dependent energy tables.
//!
//! Amino-acid propensity, Ramachandran and backbone-dependent rotamer
//! energies all share one table shape: a scalar keyed by residue name and a
//! binned (phi, psi) pair. Tables load from CSV with an `aa,phi,psi,energy`
//! header; lookups wrap angles into [-180, 180) and floor them to the bin
//! grid.

use crate::core::models::chain::ChainKind;
use crate::core::models::kind;
use crate::core::models::structure::Structure;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Grid spacing of the (phi, psi) bins in degrees.
const BIN_WIDTH: f64 = 10.0;

#[derive(Debug, Error)]
pub enum TableLoadError {
    #[error("Failed to read energy table '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse energy table '{}'", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Deserialize)]
struct TableRow {
    aa: String,
    phi: f64,
    psi: f64,
    energy: f64,
}

/// One energy table keyed by residue name and binned backbone torsions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhiPsiEnergyTable {
    bins: HashMap<(String, i64, i64), f64>,
}

/// Wraps an angle into [-180, 180) and floors it to its bin start.
fn bin(angle: f64) -> i64 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    (wrapped.div_euclid(BIN_WIDTH) * BIN_WIDTH) as i64
}

impl PhiPsiEnergyTable {
    pub fn load(path: &Path) -> Result<Self, TableLoadError> {
        let file = std::fs::File::open(path).map_err(|source| TableLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file).map_err(|source| TableLoadError::Csv {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut bins = HashMap::new();
        let mut csv = csv::Reader::from_reader(reader);
        for row in csv.deserialize() {
            let row: TableRow = row?;
            bins.insert((row.aa.to_uppercase(), bin(row.phi), bin(row.psi)), row.energy);
        }
        Ok(Self { bins })
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Energy for a residue name at the given backbone torsions, or `None`
    /// when the table has no bin for it.
    pub fn energy(&self, aa: &str, phi: f64, psi: f64) -> Option<f64> {
        self.bins
            .get(&(aa.to_uppercase(), bin(phi), bin(psi)))
            .copied()
    }
}

/// Stores propensity and Ramachandran energies on every protein residue.
/// Histidine variants look up under the canonical HIS name; table misses
/// leave the stored energy at zero.
pub fn assign_propensity_and_rama(
    structure: &mut Structure,
    propensity: &PhiPsiEnergyTable,
    rama: &PhiPsiEnergyTable,
) {
    for_each_protein_residue(structure, |name, phi, psi, residue| {
        residue.propensity_energy = propensity.energy(name, phi, psi).unwrap_or(0.0);
        residue.rama_energy = rama.energy(name, phi, psi).unwrap_or(0.0);
    });
}

/// Stores the backbone-dependent rotamer self-energy on every protein
/// residue.
pub fn assign_rotamer_energy(structure: &mut Structure, dunbrack: &PhiPsiEnergyTable) {
    for_each_protein_residue(structure, |name, phi, psi, residue| {
        residue.dunbrack_energy = dunbrack.energy(name, phi, psi).unwrap_or(0.0);
    });
}

fn for_each_protein_residue<F>(structure: &mut Structure, mut apply: F)
where
    F: FnMut(&str, f64, f64, &mut crate::core::models::residue::Residue),
{
    for chain in structure.chains.iter_mut() {
        if chain.kind != ChainKind::Protein {
            continue;
        }
        for residue in chain.residues.iter_mut() {
            let Some(name) = kind::canonical_amino_acid(&residue.name) else {
                continue;
            };
            let name = name.to_string();
            let (phi, psi) = (residue.phi, residue.psi);
            apply(&name, phi, psi, residue);
        }
    }
}
