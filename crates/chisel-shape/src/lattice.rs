//! Dense 16³ occupancy + material grid. Only materialized for the span of an
//! edit or a rebuild; the cuboid list stays the source of truth.

use std::fmt;

use crate::cuboid::CuboidWithMaterial;
use crate::face::Face;
use crate::flags::FaceFlags;
use crate::{LATTICE_SIZE, LATTICE_VOLUME};

const WORDS: usize = LATTICE_VOLUME / 64;

#[derive(Clone, PartialEq, Eq)]
pub struct VoxelLattice {
    occupied: [u64; WORDS],
    material: [u8; LATTICE_VOLUME],
}

impl Default for VoxelLattice {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VoxelLattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoxelLattice")
            .field("occupied", &self.occupied_count())
            .finish()
    }
}

impl VoxelLattice {
    pub fn new() -> Self {
        Self {
            occupied: [0; WORDS],
            material: [0; LATTICE_VOLUME],
        }
    }

    #[inline]
    pub fn index(x: usize, y: usize, z: usize) -> usize {
        (y * LATTICE_SIZE + z) * LATTICE_SIZE + x
    }

    /// Stamps every cuboid's voxels. Later cuboids win where boxes overlap.
    pub fn from_cuboids(cuboids: &[CuboidWithMaterial]) -> Self {
        let mut lat = Self::new();
        for c in cuboids {
            c.for_each_voxel(|x, y, z| lat.set(x, y, z, Some(c.material)));
        }
        lat
    }

    #[inline]
    pub fn is_occupied(&self, x: usize, y: usize, z: usize) -> bool {
        let i = Self::index(x, y, z);
        (self.occupied[i >> 6] >> (i & 63)) & 1 == 1
    }

    /// Material index at a voxel, `None` when empty.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<u8> {
        if self.is_occupied(x, y, z) {
            Some(self.material[Self::index(x, y, z)])
        } else {
            None
        }
    }

    /// Sets or clears a voxel. Empty voxels keep material 0 so equal shapes compare equal.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, value: Option<u8>) {
        let i = Self::index(x, y, z);
        match value {
            Some(m) => {
                self.occupied[i >> 6] |= 1u64 << (i & 63);
                self.material[i] = m;
            }
            None => {
                self.occupied[i >> 6] &= !(1u64 << (i & 63));
                self.material[i] = 0;
            }
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.iter().map(|w| w.count_ones() as usize).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupied.iter().all(|w| *w == 0)
    }

    /// Height of the top-most occupied voxel in column `(x, z)`.
    pub fn column_top(&self, x: usize, z: usize) -> Option<usize> {
        (0..LATTICE_SIZE).rev().find(|&y| self.is_occupied(x, y, z))
    }

    /// Writes `value` into every voxel of the region (truncated to the lattice).
    /// Returns whether anything changed.
    pub fn fill_region(&mut self, region: &VoxelRegion, value: Option<u8>) -> bool {
        let mut changed = false;
        region.for_each_voxel(|x, y, z| {
            if self.get(x, y, z) != value {
                self.set(x, y, z, value);
                changed = true;
            }
        });
        changed
    }

    /// Recolors occupied voxels of the region; empty voxels stay empty.
    pub fn paint_region(&mut self, region: &VoxelRegion, material: u8) -> bool {
        let mut changed = false;
        region.for_each_voxel(|x, y, z| {
            if let Some(m) = self.get(x, y, z) {
                if m != material {
                    self.set(x, y, z, Some(material));
                    changed = true;
                }
            }
        });
        changed
    }

    /// Material indices actually present.
    pub fn used_materials(&self) -> [bool; crate::MAX_MATERIALS] {
        let mut used = [false; crate::MAX_MATERIALS];
        for i in 0..LATTICE_VOLUME {
            if (self.occupied[i >> 6] >> (i & 63)) & 1 == 1 {
                if let Some(u) = used.get_mut(self.material[i] as usize) {
                    *u = true;
                }
            }
        }
        used
    }
}

/// Axis-aligned voxel region addressed by an edit, e.g. a brush of size N at a position.
/// May extend past the lattice; it is truncated when applied.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VoxelRegion {
    pub min: [i32; 3],
    pub size: [i32; 3],
}

impl VoxelRegion {
    pub fn new(min: [i32; 3], size: [i32; 3]) -> Self {
        Self { min, size }
    }

    /// Cubic brush of `size` voxels with its minimum corner at `at`.
    pub fn brush(at: [i32; 3], size: i32) -> Self {
        Self::new(at, [size, size, size])
    }

    pub fn single(at: [i32; 3]) -> Self {
        Self::brush(at, 1)
    }

    /// Half-open lattice bounds after truncation; `None` when nothing remains.
    pub fn clamped(&self) -> Option<([usize; 3], [usize; 3])> {
        let mut lo = [0usize; 3];
        let mut hi = [0usize; 3];
        for a in 0..3 {
            let l = self.min[a].clamp(0, LATTICE_SIZE as i32);
            let h = self.min[a]
                .saturating_add(self.size[a].max(0))
                .clamp(0, LATTICE_SIZE as i32);
            if h <= l {
                return None;
            }
            lo[a] = l as usize;
            hi[a] = h as usize;
        }
        Some((lo, hi))
    }

    pub fn for_each_voxel(&self, mut f: impl FnMut(usize, usize, usize)) {
        let Some((lo, hi)) = self.clamped() else {
            return;
        };
        for y in lo[1]..hi[1] {
            for z in lo[2]..hi[2] {
                for x in lo[0]..hi[0] {
                    f(x, y, z);
                }
            }
        }
    }

    /// Cell faces the truncated region touches; neighbors across them may need remeshing.
    pub fn touched_faces(&self) -> FaceFlags {
        let mut flags = FaceFlags::NONE;
        let Some((lo, hi)) = self.clamped() else {
            return flags;
        };
        for face in Face::ALL {
            let a = face.axis().index();
            let touches = if face.is_positive() {
                hi[a] == LATTICE_SIZE
            } else {
                lo[a] == 0
            };
            flags.set(face, touches);
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_is_truncated_to_lattice() {
        let r = VoxelRegion::brush([14, -2, 3], 4);
        assert_eq!(r.clamped(), Some(([14, 0, 3], [16, 2, 7])));
        let touched = r.touched_faces();
        assert!(touched.has(Face::PosX));
        assert!(touched.has(Face::NegY));
        assert!(!touched.has(Face::NegX));
        assert_eq!(VoxelRegion::brush([16, 0, 0], 2).clamped(), None);
    }

    #[test]
    fn fill_and_paint_report_changes() {
        let mut lat = VoxelLattice::from_cuboids(&[CuboidWithMaterial::full(0)]);
        let r = VoxelRegion::brush([0, 0, 0], 2);
        assert!(lat.paint_region(&r, 1));
        assert!(!lat.paint_region(&r, 1));
        assert!(lat.fill_region(&r, None));
        assert_eq!(lat.occupied_count(), 4096 - 8);
        assert!(!lat.paint_region(&r, 2));
        assert_eq!(lat.column_top(0, 0), Some(15));
    }

    #[test]
    fn cleared_voxels_compare_equal_to_fresh() {
        let mut a = VoxelLattice::new();
        a.set(3, 3, 3, Some(7));
        a.set(3, 3, 3, None);
        assert_eq!(a, VoxelLattice::new());
    }
}
