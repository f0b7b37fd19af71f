use glam::{DAffine3, DMat3, DVec3};

/// Below this magnitude on both X and Y, the arbitrary axis algorithm
/// derives the OCS X axis from world Y instead of world Z.
const ARBITRARY_AXIS_LIMIT: f64 = 1.0 / 64.0;

/// Where and how an instance sits inside its parent space.
///
/// The insertion point is expressed in the object coordinate system given by
/// `extrusion`, matching how INSERT entities store it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub insertion: DVec3,
    pub scale: DVec3,
    /// Rotation about the extrusion axis, in degrees
    pub rotation: f64,
    pub extrusion: DVec3,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            insertion: DVec3::ZERO,
            scale: DVec3::ONE,
            rotation: 0.0,
            extrusion: DVec3::Z,
        }
    }
}

impl Placement {
    pub fn at(insertion: DVec3) -> Self {
        Self {
            insertion,
            ..Default::default()
        }
    }

    /// Instance-local transform into the parent space:
    /// `OCS(extrusion) * T(insertion) * Rz(rotation) * S(scale)`.
    ///
    /// The definition base point is not part of this transform; it is applied
    /// when descending into the definition's children.
    pub fn local_transform(&self) -> DAffine3 {
        DAffine3::from_mat3(ocs_basis(self.extrusion))
            * DAffine3::from_translation(self.insertion)
            * DAffine3::from_rotation_z(self.rotation.to_radians())
            * DAffine3::from_scale(self.scale)
    }
}

/// Object coordinate system basis for an extrusion direction (DXF arbitrary axis algorithm)
pub fn ocs_basis(extrusion: DVec3) -> DMat3 {
    let normal = extrusion.normalize_or_zero();
    if normal == DVec3::ZERO || normal == DVec3::Z {
        return DMat3::IDENTITY;
    }
    let ax = if normal.x.abs() < ARBITRARY_AXIS_LIMIT && normal.y.abs() < ARBITRARY_AXIS_LIMIT {
        DVec3::Y.cross(normal)
    } else {
        DVec3::Z.cross(normal)
    }
    .normalize();
    let ay = normal.cross(ax).normalize();
    DMat3::from_cols(ax, ay, normal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: DVec3, b: DVec3) {
        assert!(a.abs_diff_eq(b, 1e-9), "{a:?} != {b:?}");
    }

    #[test]
    fn test_default_placement_is_identity() {
        assert!(Placement::default()
            .local_transform()
            .abs_diff_eq(DAffine3::IDENTITY, 1e-12));
    }

    #[test]
    fn test_rotation_and_scale_apply_before_translation() {
        let placement = Placement {
            insertion: DVec3::new(10.0, 0.0, 0.0),
            scale: DVec3::new(2.0, 2.0, 1.0),
            rotation: 90.0,
            ..Default::default()
        };
        let p = placement
            .local_transform()
            .transform_point3(DVec3::new(1.0, 0.0, 0.0));
        assert_close(p, DVec3::new(10.0, 2.0, 0.0));
    }

    #[test]
    fn test_flipped_extrusion_mirrors_x() {
        // Normal (0,0,-1) gives OCS X = (-1,0,0), Y = (0,1,0)
        let basis = ocs_basis(DVec3::NEG_Z);
        assert_close(basis.x_axis, DVec3::NEG_X);
        assert_close(basis.y_axis, DVec3::Y);
        let placement = Placement {
            insertion: DVec3::new(5.0, 1.0, 0.0),
            extrusion: DVec3::NEG_Z,
            ..Default::default()
        };
        let origin = placement.local_transform().transform_point3(DVec3::ZERO);
        assert_close(origin, DVec3::new(-5.0, 1.0, 0.0));
    }

    #[test]
    fn test_zero_extrusion_falls_back_to_world() {
        assert_eq!(ocs_basis(DVec3::ZERO), DMat3::IDENTITY);
    }
}
