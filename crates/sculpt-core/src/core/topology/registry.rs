use crate::core::models::residue::TerminalKind;
use crate::core::models::topology::{Bond, BondOrder, BondSet};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading the template registry from disk.
#[derive(Debug, Error)]
pub enum TemplateLoadError {
    #[error("Failed to read template file '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse template file '{}'", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// One atom slot of a residue or patch template.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AtomTemplate {
    pub name: String,
    pub ff_type: String,
    #[serde(default)]
    pub backbone: bool,
}

/// One intra-residue bond of a template.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BondTemplate {
    pub atoms: [String; 2],
    #[serde(default)]
    pub order: BondOrder,
}

/// One internal-coordinate record: atom `d` is placed from `a`, `b`, `c`
/// using the `c`-`d` bond length, the `b`-`c`-`d` angle and the
/// `a`-`b`-`c`-`d` dihedral. Names prefixed with `-` or `+` refer to the
/// previous or next residue in the chain.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IcRecord {
    pub atoms: [String; 4],
    /// Bond length in Angstroms.
    pub bond: f64,
    /// Bond angle in degrees.
    pub angle: f64,
    /// Dihedral angle in degrees.
    pub dihedral: f64,
}

/// The full chemical definition of one residue type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResidueTemplate {
    pub atoms: Vec<AtomTemplate>,
    #[serde(default)]
    pub bonds: Vec<BondTemplate>,
    #[serde(default)]
    pub ics: Vec<IcRecord>,
    /// Sidechain torsion quadruplets, chi-1 outward.
    #[serde(default)]
    pub torsions: Vec<[String; 4]>,
}

impl ResidueTemplate {
    pub fn bond_set(&self) -> BondSet {
        let mut set = BondSet::new();
        for bond in &self.bonds {
            set.push(Bond::new(&bond.atoms[0], &bond.atoms[1], bond.order));
        }
        set
    }

    pub fn has_atom(&self, name: &str) -> bool {
        self.atoms.iter().any(|a| a.name == name)
    }
}

/// A terminal patch: atoms removed and added when a residue sits at a chain
/// end, plus the internal coordinates that place the added atoms.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchTemplate {
    pub terminal: TerminalKind,
    #[serde(default)]
    pub delete_atoms: Vec<String>,
    #[serde(default)]
    pub atoms: Vec<AtomTemplate>,
    #[serde(default)]
    pub ics: Vec<IcRecord>,
}

/// In-memory registry of residue and patch templates, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateRegistry {
    residues: HashMap<String, ResidueTemplate>,
    patches: HashMap<String, PatchTemplate>,
}

impl TemplateRegistry {
    /// Loads the registry from a residue-template file and a patch-template
    /// file, each a TOML map from template name to definition.
    pub fn load(
        residues_path: &Path,
        patches_path: &Path,
    ) -> Result<Self, TemplateLoadError> {
        let residues = read_toml(residues_path)?;
        let patches = read_toml(patches_path)?;
        Ok(Self { residues, patches })
    }

    pub fn from_toml_str(
        residues: &str,
        patches: &str,
    ) -> Result<Self, toml::de::Error> {
        Ok(Self {
            residues: toml::from_str(residues)?,
            patches: toml::from_str(patches)?,
        })
    }

    pub fn residue(&self, name: &str) -> Option<&ResidueTemplate> {
        self.residues.get(name.trim())
    }

    pub fn patch(&self, name: &str) -> Option<&PatchTemplate> {
        self.patches.get(name.trim())
    }

    /// First patch declaring the given terminal kind.
    pub fn patch_for_terminal(&self, terminal: TerminalKind) -> Option<&PatchTemplate> {
        self.patches.values().find(|p| p.terminal == terminal)
    }

    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, TemplateLoadError> {
    let text = fs::read_to_string(path).map_err(|source| TemplateLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| TemplateLoadError::Toml {
        path: path.to_path_buf(),
        source,
    })
}
