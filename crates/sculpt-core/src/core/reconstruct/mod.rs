//! Geometric reconstruction: coordinate completion from internal-coordinate
//! templates, backbone and sidechain torsion derivation, and the nucleotide
//! pairing and mutation operations built on top of them.

use crate::core::error::{StructureError, ValidationError};
use crate::core::geometry;
use crate::core::models::atom::Atom;
use crate::core::models::chain::{Chain, ChainKind};
use crate::core::models::kind;
use crate::core::models::residue::{PHI_SENTINEL, PSI_SENTINEL, Residue, TerminalKind};
use crate::core::models::structure::Structure;
use crate::core::topology::registry::{IcRecord, PatchTemplate, TemplateRegistry};
use nalgebra::Point3;

/// Peptide-bond C-N distance window; outside it the backbone torsion is
/// treated as broken and falls back to the sentinel values.
const PEPTIDE_BOND_MIN: f64 = 1.25;
const PEPTIDE_BOND_MAX: f64 = 1.45;

/// Donor/acceptor distance window for Watson-Crick pairing detection.
const PAIRING_MIN: f64 = 2.0;
const PAIRING_MAX: f64 = 4.0;

/// Resolves an internal-coordinate atom reference to a placed position.
/// A leading `-` or `+` addresses the previous or next residue.
fn resolve_reference(
    name: &str,
    residue: &Residue,
    prev: Option<&Residue>,
    next: Option<&Residue>,
) -> Option<Point3<f64>> {
    let (owner, name) = if let Some(rest) = name.strip_prefix('-') {
        (prev?, rest)
    } else if let Some(rest) = name.strip_prefix('+') {
        (next?, rest)
    } else {
        (residue, name)
    };
    let atom = owner.atom(name)?;
    atom.is_valid.then_some(atom.position)
}

/// Places every not-yet-valid atom accepted by `want` whose three reference
/// atoms are placed, iterating to a fixed point so chained dependencies
/// resolve in template-dependent order.
fn complete_atoms<F>(
    residue: &mut Residue,
    prev: Option<&Residue>,
    next: Option<&Residue>,
    ics: &[&IcRecord],
    want: F,
) where
    F: Fn(&Atom) -> bool,
{
    loop {
        let mut progressed = false;
        for ic in ics {
            let target = ic.atoms[3].as_str();
            let placeable = match residue.atom(target) {
                Some(atom) => !atom.is_valid && want(atom),
                None => false,
            };
            if !placeable {
                continue;
            }
            let (Some(a), Some(b), Some(c)) = (
                resolve_reference(&ic.atoms[0], residue, prev, next),
                resolve_reference(&ic.atoms[1], residue, prev, next),
                resolve_reference(&ic.atoms[2], residue, prev, next),
            ) else {
                continue;
            };
            let position = geometry::place_fourth_atom(&a, &b, &c, ic.bond, ic.angle, ic.dihedral);
            let atom = residue.atom_mut(target).unwrap();
            atom.position = position;
            atom.is_valid = true;
            progressed = true;
        }
        if !progressed {
            break;
        }
    }
}

/// Internal-coordinate records for a residue: its template's, plus those of
/// the terminal patch when the residue sits at a chain end.
fn gather_ics<'a>(
    residue: &Residue,
    registry: &'a TemplateRegistry,
) -> Option<Vec<&'a IcRecord>> {
    let template = registry.residue(&residue.name)?;
    let mut ics: Vec<&IcRecord> = template.ics.iter().collect();
    if residue.terminal != TerminalKind::NotTerminal {
        if let Some(patch) = registry.patch_for_terminal(residue.terminal) {
            ics.extend(patch.ics.iter());
        }
    }
    Some(ics)
}

/// Reconstructs every invalid atom of the residue, backbone and sidechain.
pub fn complete_all_atoms(
    residue: &mut Residue,
    prev: Option<&Residue>,
    next: Option<&Residue>,
    registry: &TemplateRegistry,
) {
    let Some(ics) = gather_ics(residue, registry) else {
        return;
    };
    complete_atoms(residue, prev, next, &ics, |_| true);
}

/// Reconstructs invalid backbone atoms only, leaving sidechain validity
/// untouched.
pub fn complete_backbone(
    residue: &mut Residue,
    prev: Option<&Residue>,
    next: Option<&Residue>,
    registry: &TemplateRegistry,
) {
    let Some(ics) = gather_ics(residue, registry) else {
        return;
    };
    complete_atoms(residue, prev, next, &ics, |a| a.is_backbone);
}

/// Reconstructs invalid sidechain atoms only.
pub fn complete_sidechain(
    residue: &mut Residue,
    prev: Option<&Residue>,
    next: Option<&Residue>,
    registry: &TemplateRegistry,
) {
    let Some(ics) = gather_ics(residue, registry) else {
        return;
    };
    complete_atoms(residue, prev, next, &ics, |a| !a.is_backbone);
}

/// Applies a terminal patch: deletes the patch's removed atoms, adds its new
/// atoms as unplaced placeholders, and marks the residue's terminal kind.
/// Re-applying the same patch is a no-op.
pub fn apply_terminal_patch(residue: &mut Residue, patch: &PatchTemplate) {
    for name in &patch.delete_atoms {
        residue.remove_atom(name);
    }
    for atom in &patch.atoms {
        residue.add_atom(Atom::new(&atom.name, &atom.ff_type, atom.backbone));
    }
    residue.terminal = patch.terminal;
}

/// Derives sidechain torsions from the template's dihedral quadruplets.
/// Alanine and glycine have none and are skipped.
pub fn calc_sidechain_torsions(residue: &mut Residue, registry: &TemplateRegistry) {
    residue.sidechain_torsions.clear();
    if !kind::has_rotatable_sidechain(&residue.name) {
        return;
    }
    let Some(template) = registry.residue(&residue.name) else {
        return;
    };
    for quad in &template.torsions {
        let points: Vec<Point3<f64>> = quad
            .iter()
            .filter_map(|name| {
                let atom = residue.atom(name)?;
                atom.is_valid.then_some(atom.position)
            })
            .collect();
        if points.len() == 4 {
            residue.sidechain_torsions.push(geometry::torsion_angle(
                &points[0], &points[1], &points[2], &points[3],
            ));
        }
    }
}

/// Recomputes sidechain torsions for every protein residue of the
/// structure.
pub fn calc_protein_sidechain_torsions(structure: &mut Structure, registry: &TemplateRegistry) {
    for chain in structure.chains.iter_mut() {
        if chain.kind != ChainKind::Protein {
            continue;
        }
        for residue in chain.residues.iter_mut() {
            calc_sidechain_torsions(residue, registry);
        }
    }
}

fn placed(residue: &Residue, name: &str) -> Option<Point3<f64>> {
    let atom = residue.atom(name)?;
    atom.is_valid.then_some(atom.position)
}

fn peptide_bonded(c: &Point3<f64>, n: &Point3<f64>) -> bool {
    let d = geometry::distance(c, n);
    d > PEPTIDE_BOND_MIN && d < PEPTIDE_BOND_MAX
}

/// Derives phi/psi for every residue of a protein chain. A missing neighbor
/// or an implausible peptide-bond distance yields the sentinel angles.
pub fn calc_phi_psi(chain: &mut Chain) {
    if chain.kind != ChainKind::Protein {
        return;
    }
    let n = chain.residues().len();
    let mut angles = vec![(PHI_SENTINEL, PSI_SENTINEL); n];
    for i in 0..n {
        let residue = &chain.residues()[i];
        let (Some(own_n), Some(own_ca), Some(own_c)) = (
            placed(residue, "N"),
            placed(residue, "CA"),
            placed(residue, "C"),
        ) else {
            continue;
        };
        if i > 0 {
            if let Some(prev_c) = placed(&chain.residues()[i - 1], "C") {
                if peptide_bonded(&prev_c, &own_n) {
                    angles[i].0 = geometry::torsion_angle(&prev_c, &own_n, &own_ca, &own_c);
                }
            }
        }
        if i + 1 < n {
            if let Some(next_n) = placed(&chain.residues()[i + 1], "N") {
                if peptide_bonded(&own_c, &next_n) {
                    angles[i].1 = geometry::torsion_angle(&own_n, &own_ca, &own_c, &next_n);
                }
            }
        }
    }
    for (residue, (phi, psi)) in chain.residues.iter_mut().zip(angles) {
        residue.phi = phi;
        residue.psi = psi;
    }
}

/// Finds the Watson-Crick partner of a nucleotide residue.
///
/// Every donor/acceptor contact of the pairing rule must fall inside the
/// [2.0, 4.0] A window simultaneously. Same-chain candidates within one
/// sequence position of the query are excluded. Returns the first match as
/// (chain index, residue index).
pub fn find_nucleotide_pair(
    structure: &Structure,
    chain_index: usize,
    resi_index: usize,
) -> Option<(usize, usize)> {
    let query = structure.residue(chain_index, resi_index)?;
    let rule = kind::pairing_rule(&query.name)?;
    for (ci, chain) in structure.chains().iter().enumerate() {
        if !matches!(chain.kind, ChainKind::Dna | ChainKind::Rna) {
            continue;
        }
        for (ri, candidate) in chain.residues().iter().enumerate() {
            if ci == chain_index {
                if ri == resi_index {
                    continue;
                }
                if (candidate.pos_in_chain - query.pos_in_chain).abs() <= 1 {
                    continue;
                }
                if candidate.name != rule.same_chain_partner {
                    continue;
                }
            } else if !rule.cross_chain_partners.contains(&candidate.name.as_str()) {
                continue;
            }
            let all_in_window = rule.contacts.iter().all(|(q_atom, p_atom)| {
                match (placed(query, q_atom), placed(candidate, p_atom)) {
                    (Some(q), Some(p)) => {
                        let d = geometry::distance(&q, &p);
                        (PAIRING_MIN..=PAIRING_MAX).contains(&d)
                    }
                    _ => false,
                }
            });
            if all_in_window {
                return Some((ci, ri));
            }
        }
    }
    None
}

/// Mutates a nucleotide residue to a new identity given by a one-letter
/// code.
///
/// The code is validated against the chain's alphabet (DNA vs. RNA). The
/// replacement residue is built from templates, inherits the backbone
/// coordinates of the old residue by atom-name match, is re-anchored at the
/// old glycosidic bond position, and has its base atoms reconstructed before
/// it replaces the old residue in place.
pub fn mutate_nucleotide(
    structure: &mut Structure,
    chain_index: usize,
    resi_index: usize,
    code: char,
    registry: &TemplateRegistry,
) -> Result<(), StructureError> {
    let chain = structure
        .chain(chain_index)
        .ok_or_else(|| StructureError::NotFound(format!("chain index {chain_index}")))?;
    let chain_kind = chain.kind;
    let old = chain.residue(resi_index).ok_or_else(|| {
        StructureError::NotFound(format!(
            "residue index {resi_index} in chain '{}'",
            chain.name
        ))
    })?;
    let new_name = match chain_kind {
        ChainKind::Dna => kind::dna_nucleotide_from_code(code),
        ChainKind::Rna => kind::rna_nucleotide_from_code(code),
        _ => None,
    }
    .ok_or_else(|| ValidationError::InvalidNucleotideCode {
        chain_kind: chain_kind.to_string(),
        code,
    })?;
    let template = registry
        .residue(new_name)
        .ok_or_else(|| StructureError::NotFound(format!("residue template '{new_name}'")))?;

    let mut replacement = Residue::new(new_name, &old.chain_name, old.pos_in_chain);
    replacement.populate_from_template(template);
    replacement.design = old.design;
    replacement.terminal = old.terminal;

    // Backbone carries over verbatim by atom-name match.
    for atom in old.atoms() {
        if !(atom.is_backbone && atom.is_valid) {
            continue;
        }
        if let Some(target) = replacement.atom_mut(&atom.name) {
            target.position = atom.position;
            target.is_valid = true;
        }
    }

    // Re-anchor the base at the old glycosidic bond position.
    let old_anchors = kind::glycosidic_anchors(&old.name);
    let new_anchors = kind::glycosidic_anchors(new_name);
    for (old_name, new_atom_name) in [
        (old_anchors.0, new_anchors.0),
        (old_anchors.1, new_anchors.1),
    ] {
        if let Some(position) = placed(old, old_name) {
            if let Some(target) = replacement.atom_mut(new_atom_name) {
                target.position = position;
                target.is_valid = true;
            }
        }
    }

    complete_sidechain(&mut replacement, None, None, registry);
    let slot = structure
        .residue_mut(chain_index, resi_index)
        .ok_or_else(|| StructureError::NotFound(format!("residue index {resi_index}")))?;
    *slot = replacement;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::topology::registry::TemplateRegistry;

    const RESIDUES: &str = r#"
        [ALA]
        atoms = [
            { name = "N", ff_type = "N", backbone = true },
            { name = "CA", ff_type = "C", backbone = true },
            { name = "C", ff_type = "C", backbone = true },
            { name = "O", ff_type = "O", backbone = true },
            { name = "CB", ff_type = "C" },
        ]
        ics = [
            { atoms = ["N", "CA", "C", "O"], bond = 1.23, angle = 121.0, dihedral = 180.0 },
            { atoms = ["N", "C", "CA", "CB"], bond = 1.53, angle = 110.5, dihedral = -122.5 },
        ]

        [LEU]
        atoms = [
            { name = "N", ff_type = "N", backbone = true },
            { name = "CA", ff_type = "C", backbone = true },
            { name = "C", ff_type = "C", backbone = true },
            { name = "CB", ff_type = "C" },
            { name = "CG", ff_type = "C" },
        ]
        ics = [
            { atoms = ["N", "C", "CA", "CB"], bond = 1.53, angle = 110.5, dihedral = -122.5 },
            { atoms = ["N", "CA", "CB", "CG"], bond = 1.53, angle = 114.0, dihedral = 60.0 },
        ]
        torsions = [["N", "CA", "CB", "CG"]]
    "#;

    const PATCHES: &str = r#"
        [CTER]
        terminal = "cter"
        atoms = [{ name = "OXT", ff_type = "O", backbone = true }]
        ics = [
            { atoms = ["N", "CA", "C", "OXT"], bond = 1.26, angle = 117.0, dihedral = 180.0 },
        ]
    "#;

    fn registry() -> TemplateRegistry {
        TemplateRegistry::from_toml_str(RESIDUES, PATCHES).unwrap()
    }

    fn set_atom(residue: &mut Residue, name: &str, at: [f64; 3]) {
        let atom = residue.atom_mut(name).unwrap();
        atom.position = Point3::new(at[0], at[1], at[2]);
        atom.is_valid = true;
    }

    fn placed_backbone(name: &str, registry: &TemplateRegistry, pos: isize) -> Residue {
        let mut residue = Residue::new(name, "A", pos);
        residue.populate_from_template(registry.residue(name).unwrap());
        set_atom(&mut residue, "N", [0.0, 1.4, 0.0]);
        set_atom(&mut residue, "CA", [1.2, 2.2, 0.0]);
        set_atom(&mut residue, "C", [2.5, 1.5, 0.3]);
        residue
    }

    #[test]
    fn completion_chains_dependencies_to_a_fixed_point() {
        let registry = registry();
        let mut residue = placed_backbone("LEU", &registry, 1);
        // CG depends on CB, which is itself unplaced at the start.
        complete_all_atoms(&mut residue, None, None, &registry);
        assert!(residue.atom("CB").unwrap().is_valid);
        assert!(residue.atom("CG").unwrap().is_valid);
        let cb = residue.atom("CB").unwrap().position;
        let ca = residue.atom("CA").unwrap().position;
        assert!((geometry::distance(&ca, &cb) - 1.53).abs() < 1e-9);
    }

    #[test]
    fn backbone_completion_leaves_sidechain_validity_untouched() {
        let registry = registry();
        let mut residue = placed_backbone("ALA", &registry, 1);
        complete_backbone(&mut residue, None, None, &registry);
        assert!(residue.atom("O").unwrap().is_valid);
        assert!(!residue.atom("CB").unwrap().is_valid);
    }

    #[test]
    fn terminal_patch_is_idempotent_and_feeds_completion() {
        let registry = registry();
        let mut residue = placed_backbone("ALA", &registry, 1);
        let cter = registry.patch("CTER").unwrap();
        apply_terminal_patch(&mut residue, cter);
        apply_terminal_patch(&mut residue, cter);
        assert_eq!(residue.terminal, TerminalKind::CTerminus);
        assert_eq!(
            residue.atoms().iter().filter(|a| a.name == "OXT").count(),
            1
        );
        complete_backbone(&mut residue, None, None, &registry);
        assert!(residue.atom("OXT").unwrap().is_valid);
    }

    #[test]
    fn sidechain_torsions_follow_template_quadruplets() {
        let registry = registry();
        let mut residue = placed_backbone("LEU", &registry, 1);
        complete_all_atoms(&mut residue, None, None, &registry);
        calc_sidechain_torsions(&mut residue, &registry);
        assert_eq!(residue.sidechain_torsions.len(), 1);
        assert!((residue.sidechain_torsions[0] - 60.0).abs() < 1e-6);
    }

    #[test]
    fn structure_wide_torsion_pass_covers_protein_chains_only() {
        let registry = registry();
        let mut structure = Structure::new();
        let mut protein = Chain::new("A", ChainKind::Protein);
        let mut leu = placed_backbone("LEU", &registry, 1);
        complete_all_atoms(&mut leu, None, None, &registry);
        protein.push_residue(leu);
        let mut water = Chain::new("W", ChainKind::Water);
        water.push_residue(Residue::new("HOH", "W", 1));
        structure.add_chain(protein);
        structure.add_chain(water);
        calc_protein_sidechain_torsions(&mut structure, &registry);
        assert_eq!(
            structure.residue(0, 0).unwrap().sidechain_torsions.len(),
            1
        );
        assert!(structure.residue(1, 0).unwrap().sidechain_torsions.is_empty());
    }

    #[test]
    fn alanine_gets_no_sidechain_torsions() {
        let registry = registry();
        let mut residue = placed_backbone("ALA", &registry, 1);
        complete_all_atoms(&mut residue, None, None, &registry);
        calc_sidechain_torsions(&mut residue, &registry);
        assert!(residue.sidechain_torsions.is_empty());
    }

    #[test]
    fn broken_peptide_bond_yields_the_phi_sentinel() {
        let registry = registry();
        let mut chain = Chain::new("A", ChainKind::Protein);
        let mut first = placed_backbone("ALA", &registry, 1);
        // 1.50 A from the next residue's N: outside the bonded window.
        set_atom(&mut first, "C", [0.0, -0.1, 0.0]);
        let mut second = placed_backbone("ALA", &registry, 2);
        set_atom(&mut second, "N", [0.0, 1.4, 0.0]);
        set_atom(&mut second, "CA", [1.2, 2.2, 0.0]);
        set_atom(&mut second, "C", [2.5, 1.5, 0.3]);
        chain.push_residue(first);
        chain.push_residue(second);
        calc_phi_psi(&mut chain);
        assert_eq!(chain.residue(1).unwrap().phi, PHI_SENTINEL);
        // No residue follows the last one.
        assert_eq!(chain.residue(1).unwrap().psi, PSI_SENTINEL);
    }

    fn nucleotide(name: &str, chain: &str, pos: isize, atoms: &[(&str, [f64; 3])]) -> Residue {
        let mut residue = Residue::new(name, chain, pos);
        for (atom_name, at) in atoms {
            residue.add_atom(Atom::new(atom_name, "N", false));
            set_atom(&mut residue, atom_name, *at);
        }
        residue
    }

    #[test]
    fn pairing_finds_distant_partner_and_skips_adjacent_ones() {
        let mut structure = Structure::new();
        let mut chain = Chain::new("D", ChainKind::Dna);
        chain.push_residue(nucleotide(
            "DA",
            "D",
            5,
            &[("N1", [0.0, 0.0, 0.0]), ("N6", [0.0, 2.0, 0.0])],
        ));
        // Adjacent DT, geometrically close but within the +/-1 window.
        chain.push_residue(nucleotide(
            "DT",
            "D",
            6,
            &[("N3", [2.5, 0.0, 0.0]), ("O4", [0.0, 4.5, 0.0])],
        ));
        chain.push_residue(nucleotide(
            "DT",
            "D",
            40,
            &[("N3", [3.0, 0.0, 0.0]), ("O4", [0.0, 5.0, 0.0])],
        ));
        structure.add_chain(chain);
        assert_eq!(find_nucleotide_pair(&structure, 0, 0), Some((0, 2)));
    }

    #[test]
    fn pairing_requires_every_contact_in_window() {
        let mut structure = Structure::new();
        let mut chain = Chain::new("D", ChainKind::Dna);
        chain.push_residue(nucleotide(
            "DA",
            "D",
            1,
            &[("N1", [0.0, 0.0, 0.0]), ("N6", [0.0, 2.0, 0.0])],
        ));
        // First contact in window, second one 6 A out.
        chain.push_residue(nucleotide(
            "DT",
            "D",
            10,
            &[("N3", [3.0, 0.0, 0.0]), ("O4", [0.0, 8.0, 0.0])],
        ));
        structure.add_chain(chain);
        assert_eq!(find_nucleotide_pair(&structure, 0, 0), None);
    }

    const NUCLEOTIDE_RESIDUES: &str = r#"
        [DA]
        atoms = [
            { name = "C1'", ff_type = "C", backbone = true },
            { name = "N9", ff_type = "N" },
            { name = "C4", ff_type = "C" },
            { name = "C8", ff_type = "C" },
        ]
        ics = [
            { atoms = ["C1'", "C4", "N9", "C8"], bond = 1.37, angle = 106.0, dihedral = 180.0 },
        ]
    "#;

    #[test]
    fn mutation_rebuilds_the_base_on_the_old_glycosidic_anchor() {
        let registry = TemplateRegistry::from_toml_str(NUCLEOTIDE_RESIDUES, "").unwrap();
        let mut structure = Structure::new();
        let mut chain = Chain::new("D", ChainKind::Dna);
        let mut old = Residue::new("DT", "D", 3);
        let mut sugar = Atom::new("C1'", "C", true);
        sugar.position = Point3::new(-1.0, 1.0, 0.0);
        sugar.is_valid = true;
        old.add_atom(sugar);
        old.add_atom(Atom::new("N1", "N", false));
        old.add_atom(Atom::new("C2", "C", false));
        set_atom(&mut old, "N1", [0.0, 0.0, 0.0]);
        set_atom(&mut old, "C2", [1.3, 0.5, 0.0]);
        chain.push_residue(old);
        structure.add_chain(chain);

        mutate_nucleotide(&mut structure, 0, 0, 'a', &registry).unwrap();
        let mutated = structure.residue(0, 0).unwrap();
        assert_eq!(mutated.name, "DA");
        assert_eq!(mutated.pos_in_chain, 3);
        // Backbone and glycosidic anchors carry the old coordinates.
        assert_eq!(mutated.atom("C1'").unwrap().position, Point3::new(-1.0, 1.0, 0.0));
        assert_eq!(mutated.atom("N9").unwrap().position, Point3::origin());
        // The remaining base atom was rebuilt from internal coordinates.
        assert!(mutated.atom("C8").unwrap().is_valid);
    }

    #[test]
    fn mutation_rejects_codes_outside_the_chain_alphabet() {
        let registry = TemplateRegistry::from_toml_str(NUCLEOTIDE_RESIDUES, "").unwrap();
        let mut structure = Structure::new();
        let mut chain = Chain::new("D", ChainKind::Dna);
        chain.push_residue(Residue::new("DT", "D", 1));
        structure.add_chain(chain);
        let err = mutate_nucleotide(&mut structure, 0, 0, 'u', &registry).unwrap_err();
        assert!(matches!(err, StructureError::Validation(_)));
        // A bad index is an absence signal, not a validation failure.
        let err = mutate_nucleotide(&mut structure, 0, 9, 'a', &registry).unwrap_err();
        assert!(matches!(err, StructureError::NotFound(_)));
        // Failed mutations leave the residue untouched.
        assert_eq!(structure.residue(0, 0).unwrap().name, "DT");
    }

    #[test]
    fn intact_peptide_bond_yields_measured_phi() {
        let registry = registry();
        let mut chain = Chain::new("A", ChainKind::Protein);
        let mut first = placed_backbone("ALA", &registry, 1);
        // 1.33 A straight below the next residue's N.
        set_atom(&mut first, "C", [0.0, 0.07, 0.0]);
        set_atom(&mut first, "CA", [-1.1, -0.8, 0.2]);
        chain.push_residue(first);
        chain.push_residue(placed_backbone("ALA", &registry, 2));
        calc_phi_psi(&mut chain);
        let second = chain.residue(1).unwrap();
        assert_ne!(second.phi, PHI_SENTINEL);
        assert!((-180.0..=180.0).contains(&second.phi));
    }
}
