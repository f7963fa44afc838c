//! Structure assembly from atom-record streams.
//!
//! The assembly loop is a small state machine over a peekable record
//! stream: each peeked record is classified as opening a new chain, opening
//! a new residue, or continuing the current residue, and chains are
//! finalized (terminal patching, coordinate completion, torsion derivation)
//! once fully read, so no residue is ever reconstructed against incomplete
//! neighbor data.

pub mod records;

use crate::core::error::{StructureError, ValidationError};
use crate::core::models::atom::Atom;
use crate::core::models::chain::{Chain, ChainKind};
use crate::core::models::kind;
use crate::core::models::residue::Residue;
use crate::core::models::structure::Structure;
use crate::core::reconstruct;
use crate::core::topology::registry::TemplateRegistry;
use nalgebra::Point3;
use records::{AtomRecord, RecordStream};
use std::io::BufRead;

/// Largest coordinate magnitude accepted from an input record.
const MAX_COORDINATE: f64 = 9999.999;

/// Reserved residue name for ligands colliding with an amino-acid name.
const LIGAND_PLACEHOLDER: &str = "LIG";

/// Boundary classification of the next record relative to the parse state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    NewChain,
    NewResidue,
    SameResidue,
}

/// The chain and residue identity tracked across the assembly loop.
///
/// Residue boundaries compare the raw position text, so insertion-coded
/// positions ("52" vs "52A") open distinct residues even though they share
/// a sequence number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParserState {
    chain_id: Option<String>,
    res_pos: Option<String>,
}

impl ParserState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&self, record: &AtomRecord) -> Boundary {
        if self.chain_id.as_deref() != Some(&record.chain_id) {
            Boundary::NewChain
        } else if self.res_pos.as_deref() != Some(&record.res_pos_raw) {
            Boundary::NewResidue
        } else {
            Boundary::SameResidue
        }
    }

    fn enter_chain(&mut self, chain_id: &str) {
        self.chain_id = Some(chain_id.to_string());
        self.res_pos = None;
    }

    fn enter_residue(&mut self, res_pos: &str) {
        self.res_pos = Some(res_pos.to_string());
    }
}

fn coordinate_is_plausible(v: f64) -> bool {
    v.is_finite() && v.abs() <= MAX_COORDINATE
}

/// Assembles a structure from a fixed-column atom-record stream.
///
/// On success every finalized residue has a fully valid backbone, and
/// residues whose heavy side chain was observed intact are completed down
/// to the last hydrogen. Residues with an incomplete side chain keep their
/// unobserved sidechain atoms invalid for downstream rotamer replacement.
pub fn build_structure<R: BufRead>(
    reader: R,
    registry: &TemplateRegistry,
) -> Result<Structure, StructureError> {
    let mut stream = RecordStream::new(reader);
    let mut structure = Structure::new();
    let mut state = ParserState::new();

    while let Some(record) = stream.peek()? {
        match state.classify(record) {
            Boundary::NewChain => {
                finalize_last_chain(&mut structure, registry);
                let chain = Chain::new(
                    &record.chain_id,
                    ChainKind::from_residue_name(&record.residue_name),
                );
                state.enter_chain(&record.chain_id);
                structure.add_chain(chain);
                // The record is not consumed; the next pass sees it again
                // as the first residue of the new chain.
            }
            Boundary::NewResidue => {
                let residue_records = collect_residue_records(&mut stream)?;
                state.enter_residue(&residue_records[0].res_pos_raw);
                commit_residue(&mut structure, registry, &residue_records)?;
            }
            Boundary::SameResidue => {
                // Residue records are drained by the NewResidue arm; this
                // only runs on malformed interleavings.
                stream.next_record()?;
            }
        }
    }
    finalize_last_chain(&mut structure, registry);
    Ok(structure)
}

/// Consumes every consecutive record sharing the chain and raw residue
/// position of the next one.
fn collect_residue_records<R: BufRead>(
    stream: &mut RecordStream<R>,
) -> Result<Vec<AtomRecord>, StructureError> {
    let mut collected: Vec<AtomRecord> = Vec::new();
    while let Some(record) = stream.peek()? {
        if let Some(first) = collected.first() {
            if record.chain_id != first.chain_id || record.res_pos_raw != first.res_pos_raw {
                break;
            }
        }
        collected.push(stream.next_record()?.unwrap());
    }
    Ok(collected)
}

/// Histidine protonation state, decided from which ring hydrogens the input
/// actually observed. Neither hydrogen present defaults to the neutral HSD.
fn resolve_histidine_variant(residue_records: &[AtomRecord]) -> &'static str {
    let has_hd1 = residue_records.iter().any(|r| r.atom_name == "HD1");
    let has_he2 = residue_records.iter().any(|r| r.atom_name == "HE2");
    match (has_hd1, has_he2) {
        (true, true) => "HSP",
        (false, true) => "HSE",
        _ => "HSD",
    }
}

/// Parameter-type guess for atoms absent from the template: the element
/// letter leading the atom name.
fn fallback_ff_type(atom_name: &str) -> String {
    atom_name
        .chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default()
}

fn commit_residue(
    structure: &mut Structure,
    registry: &TemplateRegistry,
    residue_records: &[AtomRecord],
) -> Result<(), StructureError> {
    let first = &residue_records[0];
    let name = if first.residue_name == "HIS" {
        resolve_histidine_variant(residue_records)
    } else {
        first.residue_name.as_str()
    };

    // Validation runs before any mutation so a failure leaves the
    // structure as it was.
    for record in residue_records {
        for v in [record.x, record.y, record.z] {
            if !coordinate_is_plausible(v) {
                return Err(ValidationError::ImplausibleCoordinate {
                    atom: record.atom_name.clone(),
                    residue: name.to_string(),
                    position: record.res_seq,
                }
                .into());
            }
        }
    }

    let chain = structure
        .last_chain_mut()
        .ok_or_else(|| StructureError::NotFound("no open chain for residue records".into()))?;
    let first_in_chain = chain.residues().is_empty();

    let mut residue = Residue::new(name, &chain.name, first.res_seq);
    if let Some(template) = registry.residue(name) {
        residue.populate_from_template(template);
    }
    if first_in_chain {
        let patch = match chain.kind {
            ChainKind::Protein => registry.patch("NTER"),
            ChainKind::Dna | ChainKind::Rna => registry.patch("5TER"),
            _ => None,
        };
        if let Some(patch) = patch {
            reconstruct::apply_terminal_patch(&mut residue, patch);
        }
    }

    for record in residue_records {
        if residue.atom(&record.atom_name).is_none() {
            residue.add_atom(Atom::new(
                &record.atom_name,
                &fallback_ff_type(&record.atom_name),
                false,
            ));
        }
        let atom = residue.atom_mut(&record.atom_name).unwrap();
        atom.position = Point3::new(record.x, record.y, record.z);
        atom.is_valid = true;
    }
    residue.sidechain_intact = residue.sidechain_heavy_atoms_valid();
    chain.push_residue(residue);
    Ok(())
}

fn first_residue_has_nterminal_hydrogen(chain: &Chain) -> bool {
    let Some(first) = chain.residues().first() else {
        return false;
    };
    // Atom presence, not coordinate validity: the N-terminal patch adds
    // HT1 whether or not the input observed it.
    ["HT1", "HN1"]
        .iter()
        .any(|name| first.atom(name).is_some())
}

/// Finalizes the most recently opened chain: terminal patching, coordinate
/// completion and torsion derivation.
fn finalize_last_chain(structure: &mut Structure, registry: &TemplateRegistry) {
    let Some(chain) = structure.last_chain_mut() else {
        return;
    };
    if chain.residues().is_empty() {
        return;
    }
    match chain.kind {
        ChainKind::Protein => {
            // An observed N-terminal hydrogen on the first residue means
            // the file carries patched termini, so the last residue is
            // owed the C-terminal patch.
            if first_residue_has_nterminal_hydrogen(chain) {
                if let Some(patch) = registry.patch("CTER") {
                    let last = chain.residues.last_mut().unwrap();
                    reconstruct::apply_terminal_patch(last, patch);
                }
            }
            complete_chain_residues(chain, registry);
            for residue in chain.residues.iter_mut() {
                if residue.sidechain_intact {
                    reconstruct::calc_sidechain_torsions(residue, registry);
                }
            }
            reconstruct::calc_phi_psi(chain);
        }
        ChainKind::Dna | ChainKind::Rna => {
            if let Some(patch) = registry.patch("3TER") {
                let last = chain.residues.last_mut().unwrap();
                reconstruct::apply_terminal_patch(last, patch);
            }
            complete_chain_residues(chain, registry);
        }
        _ => {}
    }
}

/// Runs coordinate completion over every residue of a chain: full-atom
/// reconstruction when the heavy side chain came in intact (so only
/// hydrogens and patch atoms are filled in), backbone-only otherwise —
/// an incomplete side chain stays invalid for the rotamer optimizer to
/// replace rather than being fabricated here.
fn complete_chain_residues(chain: &mut Chain, registry: &TemplateRegistry) {
    let n = chain.residues.len();
    for i in 0..n {
        let (left, rest) = chain.residues.split_at_mut(i);
        let (current, right) = rest.split_at_mut(1);
        let prev = left.last();
        let next = right.first();
        let residue = &mut current[0];
        if residue.sidechain_intact {
            reconstruct::complete_all_atoms(residue, prev, next, registry);
        } else {
            reconstruct::complete_backbone(residue, prev, next, registry);
        }
    }
}

/// Reads a tag-delimited small-molecule record stream and attaches it to
/// the structure as a single-residue chain named "X".
///
/// Only the ATOM and BOND sections are consulted; any other section is
/// skipped. The residue name comes from the first atom record, truncated to
/// three characters and remapped to the reserved placeholder when it
/// collides with a standard amino-acid name.
pub fn attach_ligand<R: BufRead>(
    structure: &mut Structure,
    reader: R,
    registry: &TemplateRegistry,
) -> Result<(), StructureError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Section {
        Other,
        Atoms,
        Bonds,
    }

    let mut section = Section::Other;
    let mut atoms: Vec<(String, f64, f64, f64)> = Vec::new();
    let mut residue_name: Option<String> = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = line_no + 1;
        let trimmed = line.trim();
        if let Some(tag) = trimmed.strip_prefix("@<TRIPOS>") {
            section = match tag {
                "ATOM" => Section::Atoms,
                "BOND" => Section::Bonds,
                _ => Section::Other,
            };
            continue;
        }
        if trimmed.is_empty() || section == Section::Other {
            continue;
        }
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        match section {
            Section::Atoms => {
                if tokens.len() < 6 {
                    continue;
                }
                let coord = |i: usize| -> Result<f64, StructureError> {
                    tokens[i].parse().map_err(|_| StructureError::Parse {
                        line: line_no,
                        kind: crate::core::error::ParseErrorKind::InvalidFloat {
                            columns: format!("token {}", i + 1),
                            value: tokens[i].to_string(),
                        },
                    })
                };
                let (x, y, z) = (coord(2)?, coord(3)?, coord(4)?);
                if residue_name.is_none() {
                    let raw = tokens.get(7).copied().unwrap_or(LIGAND_PLACEHOLDER);
                    let truncated: String = raw.chars().take(3).collect();
                    residue_name = Some(
                        if kind::ligand_name_conflicts_with_amino_acid(&truncated) {
                            LIGAND_PLACEHOLDER.to_string()
                        } else {
                            truncated
                        },
                    );
                }
                atoms.push((tokens[1].to_string(), x, y, z));
            }
            Section::Bonds => {
                // Bond records are validated but never ingested: residue
                // bonds come from the topology templates alone.
                if tokens.len() < 4 {
                    continue;
                }
                for i in [1, 2] {
                    tokens[i].parse::<usize>().map_err(|_| StructureError::Parse {
                        line: line_no,
                        kind: crate::core::error::ParseErrorKind::InvalidInt {
                            columns: format!("token {}", i + 1),
                            value: tokens[i].to_string(),
                        },
                    })?;
                }
            }
            Section::Other => {}
        }
    }

    let name = residue_name
        .ok_or_else(|| StructureError::NotFound("no atom records in ligand input".into()))?;
    let mut residue = Residue::new(&name, "X", 1);
    if let Some(template) = registry.residue(&name) {
        residue.populate_from_template(template);
    }
    for (atom_name, x, y, z) in &atoms {
        if residue.atom(atom_name).is_none() {
            residue.add_atom(Atom::new(atom_name, &fallback_ff_type(atom_name), false));
        }
        let atom = residue.atom_mut(atom_name).unwrap();
        atom.position = Point3::new(*x, *y, *z);
        atom.is_valid = true;
    }
    residue.sidechain_intact = true;

    let mut chain = Chain::new("X", ChainKind::SmallMolecule);
    chain.push_residue(residue);
    structure.add_chain(chain);
    Ok(())
}
