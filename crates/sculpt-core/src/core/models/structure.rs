use super::chain::{Chain, ChainKind};
use super::design::DesignSite;
use super::kind;
use super::residue::Residue;
use crate::core::error::{MAX_STRUCTURE_NAME_LEN, ValidationError};
use crate::core::geometry;
use nalgebra::Point3;
use std::io::{self, Write};

/// Radius of the local-density probe around each sidechain anchor.
const CONTACT_RADIUS: f64 = 10.0;

/// The top-level aggregate: a named set of chains plus the design-site
/// bookkeeping layered on top of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    name: String,
    pub(crate) chains: Vec<Chain>,
    design_sites: Vec<DesignSite>,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), ValidationError> {
        if name.len() > MAX_STRUCTURE_NAME_LEN {
            return Err(ValidationError::NameTooLong {
                name: name.to_string(),
                max: MAX_STRUCTURE_NAME_LEN,
            });
        }
        self.name = name.to_string();
        Ok(())
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    pub fn chain(&self, index: usize) -> Option<&Chain> {
        self.chains.get(index)
    }

    pub fn chain_mut(&mut self, index: usize) -> Option<&mut Chain> {
        self.chains.get_mut(index)
    }

    pub fn find_chain(&self, name: &str) -> Option<usize> {
        self.chains.iter().position(|c| c.name == name)
    }

    pub fn last_chain_mut(&mut self) -> Option<&mut Chain> {
        self.chains.last_mut()
    }

    /// Adds a chain. If a chain with the same name already exists, its
    /// contents are replaced in place; otherwise the chain is appended.
    pub fn add_chain(&mut self, chain: Chain) {
        match self.find_chain(&chain.name) {
            Some(i) => self.chains[i] = chain,
            None => self.chains.push(chain),
        }
    }

    /// Removes a chain by name. Later chains shift down, which is why design
    /// sites are re-validated on every dereference rather than trusted.
    pub fn delete_chain(&mut self, name: &str) -> Option<Chain> {
        let index = self.find_chain(name)?;
        Some(self.chains.remove(index))
    }

    pub fn residue(&self, chain_index: usize, resi_index: usize) -> Option<&Residue> {
        self.chains.get(chain_index)?.residue(resi_index)
    }

    pub fn residue_mut(
        &mut self,
        chain_index: usize,
        resi_index: usize,
    ) -> Option<&mut Residue> {
        self.chains.get_mut(chain_index)?.residue_mut(resi_index)
    }

    pub fn design_sites(&self) -> &[DesignSite] {
        &self.design_sites
    }

    pub fn design_site_mut(&mut self, index: usize) -> Option<&mut DesignSite> {
        self.design_sites.get_mut(index)
    }

    /// Registers a design site at the given position. Out-of-range positions
    /// are rejected, and re-registering an existing site is a no-op; either
    /// way the site list holds at most one entry per position.
    pub fn add_design_site(&mut self, chain_index: usize, resi_index: usize) -> Option<()> {
        self.residue(chain_index, resi_index)?;
        if self.find_design_site(chain_index, resi_index).is_none() {
            self.design_sites
                .push(DesignSite::new(chain_index, resi_index));
        }
        Some(())
    }

    pub fn find_design_site(&self, chain_index: usize, resi_index: usize) -> Option<usize> {
        self.design_sites
            .iter()
            .position(|s| s.addresses(chain_index, resi_index))
    }

    /// Looks a design site up by chain name and source sequence position.
    pub fn find_design_site_by_position(&self, chain_name: &str, pos: isize) -> Option<usize> {
        let chain_index = self.find_chain(chain_name)?;
        let resi_index = self.chains[chain_index].find_residue_by_pos(pos)?;
        self.find_design_site(chain_index, resi_index)
    }

    /// Removes the design site at the given position, if one is registered.
    pub fn remove_design_site(&mut self, chain_index: usize, resi_index: usize) {
        if let Some(i) = self.find_design_site(chain_index, resi_index) {
            self.design_sites.remove(i);
        }
    }

    pub fn clear_design_sites(&mut self) {
        self.design_sites.clear();
    }

    /// Counts protein residues into the 20 canonical amino-acid buckets.
    /// Histidine variants HSD/HSE fold into HIS; HSP is left out.
    pub fn amino_acid_composition(&self) -> [usize; 20] {
        let mut tally = [0usize; 20];
        for chain in &self.chains {
            if chain.kind != ChainKind::Protein {
                continue;
            }
            for residue in chain.residues() {
                if let Some(bucket) = kind::composition_bucket(&residue.name) {
                    tally[bucket] += 1;
                }
            }
        }
        tally
    }

    /// Anchor point for the contact count: CB when valid, CA as fallback.
    fn contact_anchor(residue: &Residue) -> Option<Point3<f64>> {
        for name in ["CB", "CA"] {
            if let Some(atom) = residue.atom(name) {
                if atom.is_valid {
                    return Some(atom.position);
                }
            }
        }
        None
    }

    fn collect_contact_anchors(&self) -> Vec<(usize, usize, Point3<f64>)> {
        let mut anchors = Vec::new();
        for (ci, chain) in self.chains.iter().enumerate() {
            if chain.kind != ChainKind::Protein {
                continue;
            }
            for (ri, residue) in chain.residues().iter().enumerate() {
                if let Some(point) = Self::contact_anchor(residue) {
                    anchors.push((ci, ri, point));
                }
            }
        }
        anchors
    }

    fn count_neighbors(
        anchors: &[(usize, usize, Point3<f64>)],
        ci: usize,
        ri: usize,
        point: &Point3<f64>,
    ) -> usize {
        anchors
            .iter()
            .filter(|(oc, or, other)| {
                !(*oc == ci && *or == ri) && geometry::distance(point, other) < CONTACT_RADIUS
            })
            .count()
    }

    /// Recomputes the local-density contact count of every protein residue.
    pub fn compute_residue_contacts(&mut self) {
        let anchors = self.collect_contact_anchors();
        for &(ci, ri, point) in &anchors {
            let count = Self::count_neighbors(&anchors, ci, ri, &point);
            self.chains[ci].residues[ri].n_cb_within_10a = count;
        }
    }

    /// Recomputes contact counts for the residues of one chain, still
    /// counting neighbors across the whole structure.
    pub fn compute_chain_residue_contacts(&mut self, chain_index: usize) {
        let anchors = self.collect_contact_anchors();
        for &(ci, ri, point) in &anchors {
            if ci != chain_index {
                continue;
            }
            let count = Self::count_neighbors(&anchors, ci, ri, &point);
            self.chains[ci].residues[ri].n_cb_within_10a = count;
        }
    }

    /// First residue of the first small-molecule chain, as (chain, residue)
    /// indices.
    pub fn find_small_molecule(&self) -> Option<(usize, usize)> {
        self.chains
            .iter()
            .enumerate()
            .find(|(_, c)| c.kind == ChainKind::SmallMolecule && !c.residues.is_empty())
            .map(|(ci, _)| (ci, 0))
    }

    /// Writes one line per design site: chain name, source position, residue
    /// name and design role. Sites whose indices no longer resolve (after a
    /// chain or residue deletion) are skipped.
    pub fn report_design_sites<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for site in &self.design_sites {
            let Some(residue) = self.residue(site.chain_index, site.resi_index) else {
                continue;
            };
            writeln!(
                out,
                "{} {} {} {} rotamers: {}",
                residue.chain_name,
                residue.pos_in_chain,
                residue.name,
                residue.design,
                site.rotamers.count()
            )?;
        }
        Ok(())
    }
}
