use super::kind::{self, ResidueClass};
use super::residue::Residue;
use std::fmt;

/// Polymer class of a chain, fixed at creation from its first residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainKind {
    Protein,
    Dna,
    Rna,
    SmallMolecule,
    Water,
}

impl ChainKind {
    /// Chain kind implied by a residue name.
    pub fn from_residue_name(name: &str) -> Self {
        match kind::classify_residue(name) {
            ResidueClass::AminoAcid => Self::Protein,
            ResidueClass::DnaNucleotide => Self::Dna,
            ResidueClass::RnaNucleotide => Self::Rna,
            ResidueClass::Water => Self::Water,
            ResidueClass::SmallMolecule => Self::SmallMolecule,
        }
    }
}

impl fmt::Display for ChainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Protein => "protein",
                Self::Dna => "DNA",
                Self::Rna => "RNA",
                Self::SmallMolecule => "small molecule",
                Self::Water => "water",
            }
        )
    }
}

/// An ordered run of residues sharing one chain identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub name: String,
    pub kind: ChainKind,
    pub(crate) residues: Vec<Residue>,
}

impl Chain {
    pub fn new(name: &str, kind: ChainKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            residues: Vec::new(),
        }
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }

    pub fn residue(&self, index: usize) -> Option<&Residue> {
        self.residues.get(index)
    }

    pub fn residue_mut(&mut self, index: usize) -> Option<&mut Residue> {
        self.residues.get_mut(index)
    }

    pub fn push_residue(&mut self, residue: Residue) {
        self.residues.push(residue);
    }

    /// Index of the residue with the given source sequence position.
    pub fn find_residue_by_pos(&self, pos: isize) -> Option<usize> {
        self.residues.iter().position(|r| r.pos_in_chain == pos)
    }
}
