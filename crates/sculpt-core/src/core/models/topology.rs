use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

#[derive(Debug, Error)]
#[error("Invalid bond order string")]
pub struct ParseBondOrderError;

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "s" | "single" => Ok(Self::Single),
            "2" | "d" | "double" => Ok(Self::Double),
            "3" | "t" | "triple" => Ok(Self::Triple),
            "ar" | "aromatic" => Ok(Self::Aromatic),
            _ => Err(ParseBondOrderError),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Single => "Single",
                Self::Double => "Double",
                Self::Triple => "Triple",
                Self::Aromatic => "Aromatic",
            }
        )
    }
}

/// An intra-residue bond between two named atoms.
///
/// Bonds are scoped to a single residue and derived from the topology
/// template, never supplied by the input records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bond {
    pub a: String,
    pub b: String,
    pub order: BondOrder,
}

impl Bond {
    pub fn new(a: &str, b: &str, order: BondOrder) -> Self {
        Self {
            a: a.to_string(),
            b: b.to_string(),
            order,
        }
    }

    /// Whether this bond joins the two named atoms, in either direction.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.a == a && self.b == b) || (self.a == b && self.b == a)
    }

    pub fn involves(&self, name: &str) -> bool {
        self.a == name || self.b == name
    }
}

/// The bond set of one residue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BondSet {
    bonds: Vec<Bond>,
}

impl BondSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bond: Bond) {
        if !self.are_bonded(&bond.a, &bond.b) {
            self.bonds.push(bond);
        }
    }

    pub fn are_bonded(&self, a: &str, b: &str) -> bool {
        self.bonds.iter().any(|bond| bond.connects(a, b))
    }

    /// Drops every bond involving the named atom.
    pub fn remove_atom(&mut self, name: &str) {
        self.bonds.retain(|bond| !bond.involves(name));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bond> {
        self.bonds.iter()
    }

    pub fn len(&self) -> usize {
        self.bonds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bonds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bond_order_from_str_parses_valid_strings() {
        assert_eq!("1".parse::<BondOrder>().unwrap(), BondOrder::Single);
        assert_eq!("double".parse::<BondOrder>().unwrap(), BondOrder::Double);
        assert_eq!("T".parse::<BondOrder>().unwrap(), BondOrder::Triple);
        assert_eq!("ar".parse::<BondOrder>().unwrap(), BondOrder::Aromatic);
        assert!("quadruple".parse::<BondOrder>().is_err());
    }

    #[test]
    fn bond_connects_is_symmetric() {
        let bond = Bond::new("N", "CA", BondOrder::Single);
        assert!(bond.connects("N", "CA"));
        assert!(bond.connects("CA", "N"));
        assert!(!bond.connects("CA", "C"));
    }

    #[test]
    fn bond_set_deduplicates_on_push() {
        let mut set = BondSet::new();
        set.push(Bond::new("N", "CA", BondOrder::Single));
        set.push(Bond::new("CA", "N", BondOrder::Single));
        assert_eq!(set.len(), 1);
        assert!(set.are_bonded("CA", "N"));
    }

    #[test]
    fn remove_atom_drops_all_incident_bonds() {
        let mut set = BondSet::new();
        set.push(Bond::new("N", "CA", BondOrder::Single));
        set.push(Bond::new("CA", "C", BondOrder::Single));
        set.push(Bond::new("C", "O", BondOrder::Double));
        set.remove_atom("CA");
        assert_eq!(set.len(), 1);
        assert!(set.are_bonded("C", "O"));
        assert!(!set.are_bonded("N", "CA"));
    }
}
