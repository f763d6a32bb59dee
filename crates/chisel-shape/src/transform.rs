//! Quarter-turn rotation about +Y and mirroring, applied box by box. Neither
//! operation touches individual voxels: a 90° step maps an axis-aligned box to
//! another axis-aligned box exactly.

use crate::LATTICE_SIZE;
use crate::cuboid::CuboidWithMaterial;
use crate::face::Axis;

const LAT: u8 = LATTICE_SIZE as u8;

#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("rotation of {0} degrees is not a multiple of 90")]
    UnsupportedAngle(i32),
}

/// Normalizes a signed angle to quarter turns in `0..4`.
pub fn quarter_turns(degrees: i32) -> Result<u8, TransformError> {
    if degrees % 90 != 0 {
        return Err(TransformError::UnsupportedAngle(degrees));
    }
    Ok((degrees.rem_euclid(360) / 90) as u8)
}

/// One box turned `turns` quarter turns about the vertical axis through the cell center.
/// A point `(x, z)` maps to `(z, 16 - x)` per turn.
#[inline]
pub fn rotate_cuboid_y(mut c: CuboidWithMaterial, turns: u8) -> CuboidWithMaterial {
    for _ in 0..(turns % 4) {
        let (x1, x2) = (c.x1, c.x2);
        c.x1 = c.z1;
        c.x2 = c.z2;
        c.z1 = LAT - x2;
        c.z2 = LAT - x1;
    }
    c
}

/// One box mirrored across the plane through the cell center perpendicular to `axis`.
#[inline]
pub fn flip_cuboid(mut c: CuboidWithMaterial, axis: Axis) -> CuboidWithMaterial {
    let (lo, hi) = c.span(axis);
    c.set_span(axis, LAT - hi, LAT - lo);
    c
}

/// Rotates every cuboid in place by `degrees` (any multiple of 90, sign gives direction).
pub fn rotate_y(cuboids: &mut [CuboidWithMaterial], degrees: i32) -> Result<(), TransformError> {
    let turns = quarter_turns(degrees)?;
    if turns == 0 {
        return Ok(());
    }
    for c in cuboids.iter_mut() {
        *c = rotate_cuboid_y(*c, turns);
    }
    Ok(())
}

/// Mirrors every cuboid in place across `axis`.
pub fn flip(cuboids: &mut [CuboidWithMaterial], axis: Axis) {
    for c in cuboids.iter_mut() {
        *c = flip_cuboid(*c, axis);
    }
}
