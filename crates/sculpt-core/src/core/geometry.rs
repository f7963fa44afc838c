use nalgebra::{Point3, Vector3};

/// Euclidean distance between two points in Angstroms.
pub fn distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (a - b).norm()
}

/// Bond angle a-b-c in degrees, with b at the vertex.
pub fn bond_angle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let ba = (a - b).normalize();
    let bc = (c - b).normalize();
    ba.dot(&bc).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Signed torsion (dihedral) angle a-b-c-d in degrees, in (-180, 180].
///
/// Uses the IUPAC sign convention: looking down the b->c axis, a positive
/// angle rotates the far bond clockwise relative to the near bond.
pub fn torsion_angle(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> f64 {
    let b1 = b - a;
    let b2 = c - b;
    let b3 = d - c;
    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);
    let m1 = n1.cross(&b2.normalize());
    let x = n1.dot(&n2);
    let y = m1.dot(&n2);
    y.atan2(x).to_degrees()
}

/// Places a fourth atom from three already-placed reference atoms and an
/// internal-coordinate triple: bond length c-d (Angstroms), bond angle b-c-d
/// (degrees), and torsion a-b-c-d (degrees).
///
/// The construction is consistent with [`torsion_angle`]: measuring the
/// torsion over the returned point reproduces the requested value.
pub fn place_fourth_atom(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    bond: f64,
    angle_deg: f64,
    torsion_deg: f64,
) -> Point3<f64> {
    let theta = angle_deg.to_radians();
    let chi = torsion_deg.to_radians();

    let v1 = b - a;
    let bc = (c - b).normalize();
    let n = v1.cross(&bc).normalize();
    let m = n.cross(&bc);

    let local = Vector3::new(
        -bond * theta.cos(),
        bond * theta.sin() * chi.cos(),
        -bond * theta.sin() * chi.sin(),
    );
    c + bc * local.x + m * local.y + n * local.z
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn distance_between_axis_points() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 0.0);
        assert!((distance(&a, &b) - 5.0).abs() < TOL);
    }

    #[test]
    fn bond_angle_of_right_angle_is_ninety_degrees() {
        let a = Point3::new(1.0, 0.0, 0.0);
        let b = Point3::new(0.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);
        assert!((bond_angle(&a, &b, &c) - 90.0).abs() < TOL);
    }

    #[test]
    fn torsion_angle_of_cis_arrangement_is_zero() {
        let a = Point3::new(0.0, 1.0, 0.0);
        let b = Point3::new(0.0, 0.0, 0.0);
        let c = Point3::new(1.0, 0.0, 0.0);
        let d = Point3::new(1.0, 1.0, 0.0);
        assert!(torsion_angle(&a, &b, &c, &d).abs() < TOL);
    }

    #[test]
    fn torsion_angle_of_trans_arrangement_is_180() {
        let a = Point3::new(0.0, 1.0, 0.0);
        let b = Point3::new(0.0, 0.0, 0.0);
        let c = Point3::new(1.0, 0.0, 0.0);
        let d = Point3::new(1.0, -1.0, 0.0);
        assert!((torsion_angle(&a, &b, &c, &d).abs() - 180.0).abs() < TOL);
    }

    #[test]
    fn place_fourth_atom_reproduces_requested_internal_coordinates() {
        let a = Point3::new(-1.2, 0.8, 0.3);
        let b = Point3::new(0.0, 0.0, 0.0);
        let c = Point3::new(1.5, 0.1, -0.2);

        for &(bond, angle, torsion) in &[
            (1.53, 109.5, 60.0),
            (1.33, 120.0, -75.0),
            (1.47, 111.0, 180.0),
            (1.01, 118.0, 0.0),
            (1.53, 109.5, -120.0),
        ] {
            let d = place_fourth_atom(&a, &b, &c, bond, angle, torsion);
            assert!((distance(&c, &d) - bond).abs() < 1e-9);
            assert!((bond_angle(&b, &c, &d) - angle).abs() < 1e-9);
            let measured = torsion_angle(&a, &b, &c, &d);
            let mut diff = (measured - torsion).abs();
            if diff > 180.0 {
                diff = 360.0 - diff;
            }
            assert!(diff < 1e-9, "torsion {} measured {}", torsion, measured);
        }
    }

    #[test]
    fn place_fourth_atom_is_deterministic() {
        let a = Point3::new(0.0, 1.0, 0.0);
        let b = Point3::new(0.0, 0.0, 0.0);
        let c = Point3::new(1.0, 0.0, 0.0);
        let d1 = place_fourth_atom(&a, &b, &c, 1.5, 109.5, 57.3);
        let d2 = place_fourth_atom(&a, &b, &c, 1.5, 109.5, 57.3);
        assert_eq!(d1, d2);
    }
}
