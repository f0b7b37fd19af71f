//! Transform composition along the instance chain

use glam::{DAffine3, DVec3};

/// Parent-to-world composed with an instance-local transform (local applied first)
pub fn compose(parent: DAffine3, local: DAffine3) -> DAffine3 {
    parent * local
}

/// The local origin carried through the combined transform
pub fn world_position(combined: DAffine3) -> [f64; 3] {
    combined.transform_point3(DVec3::ZERO).to_array()
}

/// Frame for the children of a definition inserted with `combined`.
///
/// Definition geometry is stored relative to its base point, which lands on
/// the insertion point.
pub fn enter_definition(combined: DAffine3, base_point: DVec3) -> DAffine3 {
    if base_point == DVec3::ZERO {
        combined
    } else {
        combined * DAffine3::from_translation(-base_point)
    }
}
