//! Packed cuboid codec.
//!
//! A cuboid is six 4-bit bounds plus a material index packed into one `u32`:
//!
//! | bits  | field     |
//! |-------|-----------|
//! | 0-3   | min x     |
//! | 4-7   | min y     |
//! | 8-11  | min z     |
//! | 12-15 | max x - 1 |
//! | 16-19 | max y - 1 |
//! | 20-23 | max z - 1 |
//! | 24-31 | material  |
//!
//! Storing `max - 1` lets a 4-bit field express the exclusive bound 16.

use chisel_geom::Aabb;

use crate::face::{Axis, Face};
use crate::{LATTICE_SIZE, MAX_MATERIALS};

const NIBBLE: u32 = 0xF;
const MATERIAL_SHIFT: u32 = 24;
const LAT: u8 = LATTICE_SIZE as u8;

/// Axis-aligned box inside the 16³ lattice, tagged with an index into the cell's material table.
/// Bounds are half-open: `min <= v < max` on every axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CuboidWithMaterial {
    pub x1: u8,
    pub y1: u8,
    pub z1: u8,
    pub x2: u8,
    pub y2: u8,
    pub z2: u8,
    pub material: u8,
}

impl CuboidWithMaterial {
    /// Builds a cuboid. Panics when the bounds are empty, leave the lattice,
    /// or the material index does not fit in four bits.
    #[inline]
    pub fn new(min: [u8; 3], max: [u8; 3], material: u8) -> Self {
        let c = Self {
            x1: min[0],
            y1: min[1],
            z1: min[2],
            x2: max[0],
            y2: max[1],
            z2: max[2],
            material,
        };
        assert!(c.is_valid(), "invalid cuboid {c:?}");
        c
    }

    /// The whole cell in one material.
    #[inline]
    pub fn full(material: u8) -> Self {
        Self::new([0, 0, 0], [LAT, LAT, LAT], material)
    }

    /// True when every bound lies in the lattice, every axis has positive extent
    /// and the material index fits the 4-bit table.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.x1 < self.x2
            && self.y1 < self.y2
            && self.z1 < self.z2
            && self.x2 <= LAT
            && self.y2 <= LAT
            && self.z2 <= LAT
            && (self.material as usize) < MAX_MATERIALS
    }

    #[inline]
    pub fn encode(&self) -> u32 {
        debug_assert!(self.is_valid(), "encoding invalid cuboid {self:?}");
        (self.x1 as u32 & NIBBLE)
            | (self.y1 as u32 & NIBBLE) << 4
            | (self.z1 as u32 & NIBBLE) << 8
            | ((self.x2 as u32 - 1) & NIBBLE) << 12
            | ((self.y2 as u32 - 1) & NIBBLE) << 16
            | ((self.z2 as u32 - 1) & NIBBLE) << 20
            | (self.material as u32) << MATERIAL_SHIFT
    }

    /// Decodes a packed value without validation; persisted data from an
    /// untrusted source may decode to a degenerate box (see `is_valid`).
    #[inline]
    pub fn decode(packed: u32) -> Self {
        Self {
            x1: (packed & NIBBLE) as u8,
            y1: ((packed >> 4) & NIBBLE) as u8,
            z1: ((packed >> 8) & NIBBLE) as u8,
            x2: (((packed >> 12) & NIBBLE) + 1) as u8,
            y2: (((packed >> 16) & NIBBLE) + 1) as u8,
            z2: (((packed >> 20) & NIBBLE) + 1) as u8,
            material: (packed >> MATERIAL_SHIFT) as u8,
        }
    }

    #[inline]
    pub fn min(&self) -> [u8; 3] {
        [self.x1, self.y1, self.z1]
    }

    #[inline]
    pub fn max(&self) -> [u8; 3] {
        [self.x2, self.y2, self.z2]
    }

    #[inline]
    pub fn size(&self) -> [u8; 3] {
        [self.x2 - self.x1, self.y2 - self.y1, self.z2 - self.z1]
    }

    #[inline]
    pub fn volume(&self) -> u32 {
        let [sx, sy, sz] = self.size();
        sx as u32 * sy as u32 * sz as u32
    }

    /// Bounds along one axis as `(min, max)`.
    #[inline]
    pub fn span(&self, axis: Axis) -> (u8, u8) {
        match axis {
            Axis::X => (self.x1, self.x2),
            Axis::Y => (self.y1, self.y2),
            Axis::Z => (self.z1, self.z2),
        }
    }

    #[inline]
    pub fn set_span(&mut self, axis: Axis, lo: u8, hi: u8) {
        match axis {
            Axis::X => {
                self.x1 = lo;
                self.x2 = hi;
            }
            Axis::Y => {
                self.y1 = lo;
                self.y2 = hi;
            }
            Axis::Z => {
                self.z1 = lo;
                self.z2 = hi;
            }
        }
    }

    #[inline]
    pub fn contains_voxel(&self, x: usize, y: usize, z: usize) -> bool {
        (self.x1 as usize..self.x2 as usize).contains(&x)
            && (self.y1 as usize..self.y2 as usize).contains(&y)
            && (self.z1 as usize..self.z2 as usize).contains(&z)
    }

    /// True when the two boxes share at least one voxel.
    #[inline]
    pub fn intersects(&self, other: &CuboidWithMaterial) -> bool {
        self.x1 < other.x2
            && other.x1 < self.x2
            && self.y1 < other.y2
            && other.y1 < self.y2
            && self.z1 < other.z2
            && other.z1 < self.z2
    }

    /// True when this cuboid's side in direction `face` lies on the cell boundary.
    #[inline]
    pub fn touches(&self, face: Face) -> bool {
        let (lo, hi) = self.span(face.axis());
        if face.is_positive() { hi == LAT } else { lo == 0 }
    }

    /// Calls `f(x, y, z)` for every voxel inside the cuboid.
    #[inline]
    pub fn for_each_voxel(&self, mut f: impl FnMut(usize, usize, usize)) {
        for y in self.y1 as usize..self.y2 as usize {
            for z in self.z1 as usize..self.z2 as usize {
                for x in self.x1 as usize..self.x2 as usize {
                    f(x, y, z);
                }
            }
        }
    }

    /// Interaction box in cell space (`0..1`).
    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_voxels(self.min(), self.max(), LAT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cell_encodes_max_as_fifteen() {
        let c = CuboidWithMaterial::full(3);
        let p = c.encode();
        assert_eq!(p & 0xFFF, 0);
        assert_eq!((p >> 12) & 0xFFF, 0xFFF);
        assert_eq!(p >> 24, 3);
        assert_eq!(CuboidWithMaterial::decode(p), c);
    }

    #[test]
    fn single_voxel_roundtrip() {
        let c = CuboidWithMaterial::new([15, 0, 7], [16, 1, 8], 15);
        assert_eq!(c.volume(), 1);
        assert_eq!(CuboidWithMaterial::decode(c.encode()), c);
    }

    #[test]
    fn corners_read_from_a_copied_value() {
        let c = CuboidWithMaterial::new([1, 2, 3], [4, 5, 6], 0);
        let copy = c;
        assert_eq!(copy.min(), [1, 2, 3]);
        assert_eq!(copy.max()[1], 5);
        assert_eq!(CuboidWithMaterial::full(0).max(), [16, 16, 16]);
    }

    #[test]
    #[should_panic]
    fn zero_volume_is_rejected() {
        let _ = CuboidWithMaterial::new([4, 0, 0], [4, 16, 16], 0);
    }

    #[test]
    fn decode_can_produce_degenerate_boxes() {
        // min x 9, max x field 3 -> max x 4
        let packed = 9 | (3 << 12);
        let c = CuboidWithMaterial::decode(packed);
        assert!(!c.is_valid());
    }

    #[test]
    fn touches_reports_boundary_faces() {
        let c = CuboidWithMaterial::new([0, 4, 4], [8, 16, 8], 0);
        assert!(c.touches(Face::NegX));
        assert!(!c.touches(Face::PosX));
        assert!(c.touches(Face::PosY));
        assert!(!c.touches(Face::NegY));
    }
}
