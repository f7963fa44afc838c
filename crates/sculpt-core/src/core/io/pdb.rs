use crate::core::models::structure::Structure;
use std::io::{self, Write};

/// Writes every valid atom as a fixed-column atom record, numbering serials
/// sequentially across all chains. Atoms without a valid coordinate are
/// omitted rather than written with placeholder positions.
pub fn write_structure<W: Write>(structure: &Structure, out: &mut W) -> io::Result<()> {
    let mut serial = 1usize;
    for chain in structure.chains() {
        for residue in chain.residues() {
            for atom in residue.atoms() {
                if !atom.is_valid {
                    continue;
                }
                writeln!(
                    out,
                    "ATOM  {:>5} {:<4} {:<4}{:1}{:>5}   {:>8.3}{:>8.3}{:>8.3}",
                    serial,
                    atom.name,
                    residue.name,
                    chain.name,
                    residue.pos_in_chain,
                    atom.position.x,
                    atom.position.y,
                    atom.position.z,
                )?;
                serial += 1;
            }
        }
    }
    writeln!(out, "END")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assembly::build_structure;
    use crate::core::geometry;
    use crate::core::models::atom::Atom;
    use crate::core::models::chain::{Chain, ChainKind};
    use crate::core::models::residue::Residue;
    use crate::core::topology::registry::TemplateRegistry;
    use nalgebra::Point3;
    use std::io::Cursor;

    fn ligand_structure() -> Structure {
        let mut residue = Residue::new("UNK", "X", 1);
        for (name, at) in [
            ("C1", [1.207, 0.743, 0.001]),
            ("C2", [2.414, -0.012, 0.325]),
            ("O1", [2.414, -1.5, -12.75]),
        ] {
            let mut atom = Atom::new(name, "C", false);
            atom.position = Point3::new(at[0], at[1], at[2]);
            atom.is_valid = true;
            residue.add_atom(atom);
        }
        // An unplaced atom must not be exported.
        residue.add_atom(Atom::new("C3", "C", false));
        let mut chain = Chain::new("X", ChainKind::SmallMolecule);
        chain.push_residue(residue);
        let mut structure = Structure::new();
        structure.add_chain(chain);
        structure
    }

    #[test]
    fn writer_emits_valid_atoms_with_sequential_serials() {
        let structure = ligand_structure();
        let mut out = Vec::new();
        write_structure(&structure, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let atom_lines: Vec<&str> = text.lines().filter(|l| l.starts_with("ATOM")).collect();
        assert_eq!(atom_lines.len(), 3);
        assert!(atom_lines[0].starts_with("ATOM      1 C1"));
        assert!(atom_lines[2].starts_with("ATOM      3 O1"));
        assert!(!text.contains("C3 "));
        assert!(text.ends_with("END\n"));
    }

    #[test]
    fn exported_records_reassemble_to_identical_coordinates() {
        let original = ligand_structure();
        let mut out = Vec::new();
        write_structure(&original, &mut out).unwrap();

        let registry = TemplateRegistry::default();
        let reparsed = build_structure(Cursor::new(out), &registry).unwrap();
        assert_eq!(reparsed.chain_count(), 1);
        let before = original.residue(0, 0).unwrap();
        let after = reparsed.residue(0, 0).unwrap();
        for atom in before.atoms().iter().filter(|a| a.is_valid) {
            let twin = after.atom(&atom.name).unwrap();
            assert!(twin.is_valid);
            assert!(
                geometry::distance(&atom.position, &twin.position) < 1e-6,
                "{} moved",
                atom.name
            );
        }
        assert!(after.atom("C3").is_none());
    }
}
