use nalgebra::Point3;

/// An atom inside a residue.
///
/// Atoms exist from the moment their residue is populated from a template,
/// even before any coordinate is known; `is_valid` distinguishes observed or
/// reconstructed coordinates from placeholder ones. An atom's name is unique
/// within its residue.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The atom name (e.g. "CA", "N9"), unique within the owning residue.
    pub name: String,
    /// The element-derived parameter type from the atom-parameter template.
    pub ff_type: String,
    /// The 3D coordinates in Angstroms. Meaningful only when `is_valid`.
    pub position: Point3<f64>,
    /// Whether the coordinate is known (read or reconstructed).
    pub is_valid: bool,
    /// Whether the atom belongs to the backbone.
    pub is_backbone: bool,
}

impl Atom {
    /// Creates a placeholder atom with no valid coordinate.
    pub fn new(name: &str, ff_type: &str, is_backbone: bool) -> Self {
        Self {
            name: name.to_string(),
            ff_type: ff_type.to_string(),
            position: Point3::origin(),
            is_valid: false,
            is_backbone,
        }
    }

    /// Whether the atom is a non-hydrogen atom, judged from the leading
    /// character of its name.
    pub fn is_heavy(&self) -> bool {
        !matches!(
            self.name.chars().next().map(|c| c.to_ascii_uppercase()),
            Some('H') | Some('D')
        )
    }
}
