use phf::{Map, Set, phf_map, phf_set};

/// Chemical classification of a residue, derived from its canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResidueClass {
    AminoAcid,
    DnaNucleotide,
    RnaNucleotide,
    Water,
    SmallMolecule,
}

static AMINO_ACID_NAMES: Set<&'static str> = phf_set! {
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "ILE", "LEU",
    "LYS", "MET", "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL",
    "HIS", "HSD", "HSE", "HSP",
};

static DNA_NUCLEOTIDE_NAMES: Set<&'static str> = phf_set! {
    "DA", "DC", "DG", "DT", "DN",
};

static RNA_NUCLEOTIDE_NAMES: Set<&'static str> = phf_set! {
    "A", "C", "G", "U", "N",
};

static WATER_NAMES: Set<&'static str> = phf_set! {
    "HOH", "WAT", "TIP3",
};

/// Classifies a residue by its canonical name; unrecognized names are
/// treated as small molecules.
pub fn classify_residue(name: &str) -> ResidueClass {
    let name = name.trim();
    if AMINO_ACID_NAMES.contains(name) {
        ResidueClass::AminoAcid
    } else if DNA_NUCLEOTIDE_NAMES.contains(name) {
        ResidueClass::DnaNucleotide
    } else if RNA_NUCLEOTIDE_NAMES.contains(name) {
        ResidueClass::RnaNucleotide
    } else if WATER_NAMES.contains(name) {
        ResidueClass::Water
    } else {
        ResidueClass::SmallMolecule
    }
}

/// Canonical bucket names of the 20-entry amino-acid composition tally.
pub const COMPOSITION_NAMES: [&str; 20] = [
    "ALA", "CYS", "ASP", "GLU", "PHE", "GLY", "HIS", "ILE", "LYS", "LEU",
    "MET", "ASN", "PRO", "GLN", "ARG", "SER", "THR", "VAL", "TRP", "TYR",
];

static COMPOSITION_BUCKETS: Map<&'static str, usize> = phf_map! {
    "ALA" => 0, "CYS" => 1, "ASP" => 2, "GLU" => 3, "PHE" => 4,
    "GLY" => 5, "HSD" => 6, "HSE" => 6, "HIS" => 6, "ILE" => 7,
    "LYS" => 8, "LEU" => 9, "MET" => 10, "ASN" => 11, "PRO" => 12,
    "GLN" => 13, "ARG" => 14, "SER" => 15, "THR" => 16, "VAL" => 17,
    "TRP" => 18, "TYR" => 19,
};

/// Composition-tally bucket for a residue name, if it participates in the
/// tally. Histidine variants HSD and HSE aggregate into the HIS bucket.
pub fn composition_bucket(name: &str) -> Option<usize> {
    COMPOSITION_BUCKETS.get(name.trim()).copied()
}

static HISTIDINE_VARIANTS: Set<&'static str> = phf_set! {
    "HIS", "HSD", "HSE", "HSP",
};

/// Maps histidine protonation variants back to "HIS"; other amino acids map
/// to themselves. Returns `None` for non-amino-acid names.
pub fn canonical_amino_acid(name: &str) -> Option<&str> {
    let name = name.trim();
    if HISTIDINE_VARIANTS.contains(name) {
        Some("HIS")
    } else if AMINO_ACID_NAMES.contains(name) {
        Some(name)
    } else {
        None
    }
}

/// Whether a protein residue has a rotatable side chain. Alanine and glycine
/// are excluded from sidechain-torsion derivation.
pub fn has_rotatable_sidechain(name: &str) -> bool {
    let name = name.trim();
    AMINO_ACID_NAMES.contains(name) && name != "ALA" && name != "GLY"
}

/// Whether a ligand residue name collides with a standard amino-acid name
/// and must be remapped to the reserved placeholder.
pub fn ligand_name_conflicts_with_amino_acid(name: &str) -> bool {
    AMINO_ACID_NAMES.contains(name.trim())
}

static PURINE_NAMES: Set<&'static str> = phf_set! { "DA", "DG", "A", "G" };
static PYRIMIDINE_NAMES: Set<&'static str> = phf_set! { "DC", "DT", "C", "T", "U" };

pub fn is_purine(name: &str) -> bool {
    PURINE_NAMES.contains(name.trim())
}

pub fn is_pyrimidine(name: &str) -> bool {
    PYRIMIDINE_NAMES.contains(name.trim())
}

/// Glycosidic-bond anchor atoms used to re-anchor a base during nucleotide
/// mutation: purines use N9/C4, pyrimidines N1/C2, and the degenerate bases
/// (DN/N) use the placeholder N10/C4 pair.
pub fn glycosidic_anchors(name: &str) -> (&'static str, &'static str) {
    let name = name.trim();
    if PURINE_NAMES.contains(name) {
        ("N9", "C4")
    } else if PYRIMIDINE_NAMES.contains(name) {
        ("N1", "C2")
    } else {
        ("N10", "C4")
    }
}

static DNA_FROM_CODE: Map<char, &'static str> = phf_map! {
    'a' => "DA", 'c' => "DC", 'g' => "DG", 't' => "DT", 'n' => "DN",
};

static RNA_FROM_CODE: Map<char, &'static str> = phf_map! {
    'a' => "A", 'c' => "C", 'g' => "G", 'u' => "U", 'n' => "N",
};

/// Resolves a one-letter nucleotide code against a chain alphabet.
pub fn dna_nucleotide_from_code(code: char) -> Option<&'static str> {
    DNA_FROM_CODE.get(&code.to_ascii_lowercase()).copied()
}

pub fn rna_nucleotide_from_code(code: char) -> Option<&'static str> {
    RNA_FROM_CODE.get(&code.to_ascii_lowercase()).copied()
}

/// Watson-Crick pairing rule for one query nucleotide.
///
/// `contacts` lists (query atom, partner atom) donor/acceptor pairs that must
/// all fall inside the pairing distance window simultaneously.
#[derive(Debug, Clone, Copy)]
pub struct PairingRule {
    pub same_chain_partner: &'static str,
    pub cross_chain_partners: [&'static str; 2],
    pub contacts: &'static [(&'static str, &'static str)],
}

static AT_CONTACTS: [(&str, &str); 2] = [("N1", "N3"), ("N6", "O4")];
static TA_CONTACTS: [(&str, &str); 2] = [("N3", "N1"), ("O4", "N6")];
static CG_CONTACTS: [(&str, &str); 3] = [("O2", "N2"), ("N3", "N1"), ("N4", "O6")];
static GC_CONTACTS: [(&str, &str); 3] = [("N2", "O2"), ("N1", "N3"), ("O6", "N4")];

static PAIRING_RULES: Map<&'static str, PairingRule> = phf_map! {
    "DA" => PairingRule { same_chain_partner: "DT", cross_chain_partners: ["DT", "U"], contacts: &AT_CONTACTS },
    "DT" => PairingRule { same_chain_partner: "DA", cross_chain_partners: ["DA", "A"], contacts: &TA_CONTACTS },
    "DC" => PairingRule { same_chain_partner: "DG", cross_chain_partners: ["DG", "G"], contacts: &CG_CONTACTS },
    "DG" => PairingRule { same_chain_partner: "DC", cross_chain_partners: ["DC", "C"], contacts: &GC_CONTACTS },
    "A" => PairingRule { same_chain_partner: "U", cross_chain_partners: ["DT", "U"], contacts: &AT_CONTACTS },
    "U" => PairingRule { same_chain_partner: "A", cross_chain_partners: ["DA", "A"], contacts: &TA_CONTACTS },
    "C" => PairingRule { same_chain_partner: "G", cross_chain_partners: ["DG", "G"], contacts: &CG_CONTACTS },
    "G" => PairingRule { same_chain_partner: "C", cross_chain_partners: ["DC", "C"], contacts: &GC_CONTACTS },
};

/// Pairing rule for a query nucleotide name. The degenerate bases DN and N
/// carry no donor/acceptor template and have no rule.
pub fn pairing_rule(name: &str) -> Option<&'static PairingRule> {
    PAIRING_RULES.get(name.trim())
}
