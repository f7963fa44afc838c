use super::atom::Atom;
use super::topology::BondSet;
use crate::core::topology::registry::ResidueTemplate;
use serde::Deserialize;
use std::fmt;

/// Role of a residue in combinatorial design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DesignKind {
    /// Kept at its native identity and conformation.
    #[default]
    Fixed,
    /// Subject to sequence mutation.
    Designable,
    /// Native identity, alternative rotamers allowed.
    Repacked,
    /// Catalytic constraint site.
    Catalytic,
    /// Small-molecule (ligand) site.
    SmallMolecule,
}

impl fmt::Display for DesignKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Fixed => "fixed",
                Self::Designable => "mutated",
                Self::Repacked => "rotameric",
                Self::Catalytic => "catalytic",
                Self::SmallMolecule => "smallmol",
            }
        )
    }
}

/// Terminal status of a residue within its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalKind {
    #[default]
    #[serde(rename = "none")]
    NotTerminal,
    #[serde(rename = "nter")]
    NTerminus,
    #[serde(rename = "cter")]
    CTerminus,
}

/// Default phi assigned when the preceding peptide bond is absent or broken.
pub const PHI_SENTINEL: f64 = -60.0;
/// Default psi assigned when the following peptide bond is absent or broken.
pub const PSI_SENTINEL: f64 = 60.0;

/// One residue: a named, template-complete set of atoms and bonds.
///
/// A residue always carries the full atom and bond set implied by its
/// template name; atoms whose coordinates were never observed or rebuilt are
/// flagged invalid rather than omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    /// Residue name (three-letter amino acid or nucleotide code).
    pub name: String,
    /// Name of the owning chain.
    pub chain_name: String,
    /// Logical sequence position from the source records.
    pub pos_in_chain: isize,
    pub design: DesignKind,
    pub terminal: TerminalKind,
    /// Backbone torsions in degrees, sentinel-filled at chain breaks.
    pub phi: f64,
    pub psi: f64,
    /// Sidechain torsions in degrees, template quadruplet order.
    pub sidechain_torsions: Vec<f64>,
    /// Number of CB (CA fallback) atoms of other residues within 10 A.
    pub n_cb_within_10a: usize,
    /// Whether every sidechain heavy atom had an observed coordinate.
    pub sidechain_intact: bool,
    pub propensity_energy: f64,
    pub rama_energy: f64,
    pub dunbrack_energy: f64,
    pub(crate) atoms: Vec<Atom>,
    pub(crate) bonds: BondSet,
}

impl Residue {
    pub fn new(name: &str, chain_name: &str, pos_in_chain: isize) -> Self {
        Self {
            name: name.to_string(),
            chain_name: chain_name.to_string(),
            pos_in_chain,
            design: DesignKind::default(),
            terminal: TerminalKind::default(),
            phi: PHI_SENTINEL,
            psi: PSI_SENTINEL,
            sidechain_torsions: Vec::new(),
            n_cb_within_10a: 0,
            sidechain_intact: false,
            propensity_energy: 0.0,
            rama_energy: 0.0,
            dunbrack_energy: 0.0,
            atoms: Vec::new(),
            bonds: BondSet::new(),
        }
    }

    /// Replaces the atom and bond sets with the template's, in template
    /// order, with every coordinate flagged invalid.
    pub fn populate_from_template(&mut self, template: &ResidueTemplate) {
        self.atoms = template
            .atoms
            .iter()
            .map(|a| Atom::new(&a.name, &a.ff_type, a.backbone))
            .collect();
        self.bonds = template.bond_set();
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn atom(&self, name: &str) -> Option<&Atom> {
        let name = name.trim();
        self.atoms.iter().find(|a| a.name == name)
    }

    pub fn atom_mut(&mut self, name: &str) -> Option<&mut Atom> {
        let name = name.trim();
        self.atoms.iter_mut().find(|a| a.name == name)
    }

    /// Adds an atom unless one with the same name already exists.
    pub fn add_atom(&mut self, atom: Atom) {
        if self.atom(&atom.name).is_none() {
            self.atoms.push(atom);
        }
    }

    /// Removes an atom and every bond incident to it.
    pub fn remove_atom(&mut self, name: &str) -> Option<Atom> {
        let idx = self.atoms.iter().position(|a| a.name == name)?;
        self.bonds.remove_atom(name);
        Some(self.atoms.remove(idx))
    }

    pub fn bonds(&self) -> &BondSet {
        &self.bonds
    }

    /// Whether every backbone atom has a valid coordinate.
    pub fn backbone_complete(&self) -> bool {
        self.atoms
            .iter()
            .filter(|a| a.is_backbone)
            .all(|a| a.is_valid)
    }

    /// Whether every sidechain heavy atom has a valid coordinate. Residues
    /// without sidechain heavy atoms (glycine) are trivially intact.
    pub fn sidechain_heavy_atoms_valid(&self) -> bool {
        self.atoms
            .iter()
            .filter(|a| !a.is_backbone && a.is_heavy())
            .all(|a| a.is_valid)
    }
}
