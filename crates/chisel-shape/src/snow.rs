//! Decorative snow layer computed by running the greedy compressor over
//! "snow belongs here" predicates instead of raw occupancy.

use crate::compress::compress_with;
use crate::cuboid::CuboidWithMaterial;
use crate::face::Face;
use crate::lattice::VoxelLattice;
use crate::neighbors::NeighborCell;
use crate::{FACE_AREA, LATTICE_SIZE};

/// Thickest snow layer, in voxels.
pub const MAX_SNOW_LEVEL: u8 = LATTICE_SIZE as u8;

/// Material index used for overlay cuboids (the overlay has a single material).
const SNOW: u8 = 0;

/// Secondary cuboid set layered over a cell's shape.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Overlay {
    /// Snow resting on top of the cell's own voxels.
    pub on_shape: Vec<CuboidWithMaterial>,
    /// Snow resting on the cell below, in columns this cell leaves empty.
    pub on_ground: Vec<CuboidWithMaterial>,
}

impl Overlay {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.on_shape.is_empty() && self.on_ground.is_empty()
    }

    pub fn len(&self) -> usize {
        self.on_shape.len() + self.on_ground.len()
    }

    pub fn clear(&mut self) {
        self.on_shape.clear();
        self.on_ground.clear();
    }
}

#[inline]
fn column(x: usize, z: usize) -> usize {
    z * LATTICE_SIZE + x
}

/// Columns whose top is covered by the cell above (its bottom layer is occupied there).
fn sheltered_columns(above: Option<NeighborCell<'_>>) -> [bool; FACE_AREA] {
    let mut out = [false; FACE_AREA];
    let Some(above) = above else {
        return out;
    };
    for c in above.boundary_cuboids(Face::NegY) {
        for z in c.z1 as usize..c.z2 as usize {
            for x in c.x1 as usize..c.x2 as usize {
                out[column(x, z)] = true;
            }
        }
    }
    out
}

/// Computes the snow overlay for `level` voxels of snow.
///
/// A column with occupied voxels gets snow in the `level` positions right above
/// its top-most voxel. A column with no voxels at all gets `level` positions of
/// ground snow starting at the bottom layer. Columns sheltered by the cell
/// above get none.
pub fn compute_snow(lattice: &VoxelLattice, level: u8, above: Option<NeighborCell<'_>>) -> Overlay {
    let level = level.min(MAX_SNOW_LEVEL) as usize;
    if level == 0 {
        return Overlay::default();
    }
    let sheltered = sheltered_columns(above);
    let mut tops = [None; FACE_AREA];
    for z in 0..LATTICE_SIZE {
        for x in 0..LATTICE_SIZE {
            tops[column(x, z)] = lattice.column_top(x, z);
        }
    }

    let on_shape = compress_with(|x, y, z| {
        let col = column(x, z);
        match tops[col] {
            Some(top) if !sheltered[col] && y > top && y <= top + level => Some(SNOW),
            _ => None,
        }
    });
    let on_ground = compress_with(|x, y, z| {
        let col = column(x, z);
        if tops[col].is_none() && !sheltered[col] && y < level {
            Some(SNOW)
        } else {
            None
        }
    });
    Overlay {
        on_shape,
        on_ground,
    }
}
