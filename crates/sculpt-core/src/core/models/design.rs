use super::atom::Atom;

/// One candidate sidechain conformation for a design site.
#[derive(Debug, Clone, PartialEq)]
pub struct Rotamer {
    /// Residue name the rotamer belongs to.
    pub residue_name: String,
    /// Sidechain atoms in template order.
    pub atoms: Vec<Atom>,
    /// Library self-energy of this conformation.
    pub self_energy: f64,
}

/// The rotamer candidates attached to one design site.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RotamerSet {
    rotamers: Vec<Rotamer>,
}

impl RotamerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.rotamers.len()
    }

    pub fn add(&mut self, rotamer: Rotamer) {
        self.rotamers.push(rotamer);
    }

    pub fn get(&self, index: usize) -> Option<&Rotamer> {
        self.rotamers.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rotamer> {
        self.rotamers.iter()
    }

    pub fn clear(&mut self) {
        self.rotamers.clear();
    }
}

/// A designated residue position, addressed by chain and residue indices
/// into the owning structure.
///
/// The indices are positional, not stable handles: deleting a chain or a
/// residue shifts them, so every dereference re-validates them against the
/// current chain and residue counts.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignSite {
    pub chain_index: usize,
    pub resi_index: usize,
    pub rotamers: RotamerSet,
}

impl DesignSite {
    pub fn new(chain_index: usize, resi_index: usize) -> Self {
        Self {
            chain_index,
            resi_index,
            rotamers: RotamerSet::new(),
        }
    }

    /// Whether this site addresses the given position.
    pub fn addresses(&self, chain_index: usize, resi_index: usize) -> bool {
        self.chain_index == chain_index && self.resi_index == resi_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotamer_set_starts_empty_and_accumulates() {
        let mut set = RotamerSet::new();
        assert_eq!(set.count(), 0);
        set.add(Rotamer {
            residue_name: "LEU".into(),
            atoms: Vec::new(),
            self_energy: 1.25,
        });
        assert_eq!(set.count(), 1);
        assert_eq!(set.get(0).unwrap().residue_name, "LEU");
        set.clear();
        assert_eq!(set.count(), 0);
    }

    #[test]
    fn design_site_addressing_is_exact() {
        let site = DesignSite::new(2, 14);
        assert!(site.addresses(2, 14));
        assert!(!site.addresses(2, 13));
        assert!(!site.addresses(1, 14));
    }
}
