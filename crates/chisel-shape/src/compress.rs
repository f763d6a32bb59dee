//! Greedy cuboid compression.
//!
//! Voxels are visited with x outermost, then y, with z varying fastest. The
//! first unclaimed occupied voxel seeds a 1×1×1 box which grows one layer at a time along X, then Y,
//! then Z, repeating until no axis can grow. A layer is accepted only if every
//! voxel in it is occupied, unclaimed and carries the seed's material. The
//! result is deterministic for a given input but not guaranteed minimal.

use std::time::Instant;

use crate::cuboid::CuboidWithMaterial;
use crate::face::Face;
use crate::flags::FaceFlags;
use crate::lattice::VoxelLattice;
use crate::{FACE_AREA, LATTICE_SIZE, LATTICE_VOLUME};

const EMPTY: u8 = u8::MAX;
const ALMOST_SOLID_MIN: u16 = (FACE_AREA as u16 * 3) / 4;
const SIDE_AO_MIN: u16 = FACE_AREA as u16 / 2;

/// Per-cell facts derived alongside compression, consumed by the world model
/// (light occlusion, liquid displacement, ambient occlusion).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ShapeSummary {
    /// Every boundary voxel on the face is occupied.
    pub solid: FaceFlags,
    /// At least three quarters of the face's boundary voxels are occupied.
    pub almost_solid: FaceFlags,
    /// At least half of the face's boundary voxels are occupied.
    pub side_ao: FaceFlags,
    pub occupied: u16,
}

impl ShapeSummary {
    fn from_counts(face_counts: &[u16; 6], occupied: u16) -> Self {
        let mut s = ShapeSummary {
            occupied,
            ..Default::default()
        };
        for face in Face::ALL {
            let n = face_counts[face.index()];
            s.solid.set(face, n as usize == FACE_AREA);
            s.almost_solid.set(face, n >= ALMOST_SOLID_MIN);
            s.side_ao.set(face, n >= SIDE_AO_MIN);
        }
        s
    }

    /// Fraction of the cell's volume that is occupied, `0.0..=1.0`.
    #[inline]
    pub fn volume_fraction(&self) -> f32 {
        self.occupied as f32 / LATTICE_VOLUME as f32
    }

    pub fn rotated_y(self, turns: u8) -> Self {
        Self {
            solid: self.solid.rotated_y(turns),
            almost_solid: self.almost_solid.rotated_y(turns),
            side_ao: self.side_ao.rotated_y(turns),
            occupied: self.occupied,
        }
    }

    pub fn flipped(self, axis: crate::face::Axis) -> Self {
        Self {
            solid: self.solid.flipped(axis),
            almost_solid: self.almost_solid.flipped(axis),
            side_ao: self.side_ao.flipped(axis),
            occupied: self.occupied,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Compressed {
    pub cuboids: Vec<CuboidWithMaterial>,
    pub summary: ShapeSummary,
}

impl Compressed {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cuboids.is_empty()
    }
}

/// Compresses an occupancy + material lattice into the canonical cuboid list.
pub fn compress(lattice: &VoxelLattice) -> Compressed {
    let t0 = Instant::now();
    let mut g = GreedyGrid::sample(|x, y, z| lattice.get(x, y, z));
    let cuboids = g.grow_all();
    let summary = ShapeSummary::from_counts(&g.face_counts, g.occupied);
    log::debug!(
        target: "perf",
        "us={} compress cuboids={} occupied={}",
        t0.elapsed().as_micros(),
        cuboids.len(),
        summary.occupied
    );
    Compressed { cuboids, summary }
}

/// Runs the same greedy growth over an arbitrary per-voxel predicate:
/// `sample` returns the material index for voxels that should be covered.
pub fn compress_with(sample: impl FnMut(usize, usize, usize) -> Option<u8>) -> Vec<CuboidWithMaterial> {
    GreedyGrid::sample(sample).grow_all()
}

struct GreedyGrid {
    cells: [u8; LATTICE_VOLUME],
    claimed: [bool; LATTICE_VOLUME],
    face_counts: [u16; 6],
    occupied: u16,
}

impl GreedyGrid {
    #[inline]
    fn idx(x: usize, y: usize, z: usize) -> usize {
        VoxelLattice::index(x, y, z)
    }

    fn sample(mut sample: impl FnMut(usize, usize, usize) -> Option<u8>) -> Self {
        let mut g = GreedyGrid {
            cells: [EMPTY; LATTICE_VOLUME],
            claimed: [false; LATTICE_VOLUME],
            face_counts: [0; 6],
            occupied: 0,
        };
        let last = LATTICE_SIZE - 1;
        for y in 0..LATTICE_SIZE {
            for z in 0..LATTICE_SIZE {
                for x in 0..LATTICE_SIZE {
                    let Some(m) = sample(x, y, z) else {
                        continue;
                    };
                    g.cells[Self::idx(x, y, z)] = m;
                    g.occupied += 1;
                    // boundary coverage for the face flags
                    let on = [y == last, y == 0, x == last, x == 0, z == last, z == 0];
                    for (count, hit) in g.face_counts.iter_mut().zip(on) {
                        *count += hit as u16;
                    }
                }
            }
        }
        g
    }

    #[inline]
    fn free(&self, x: usize, y: usize, z: usize, m: u8) -> bool {
        let i = Self::idx(x, y, z);
        self.cells[i] == m && !self.claimed[i]
    }

    fn grow_all(&mut self) -> Vec<CuboidWithMaterial> {
        let mut out = Vec::new();
        for x in 0..LATTICE_SIZE {
            for y in 0..LATTICE_SIZE {
                for z in 0..LATTICE_SIZE {
                    let i = Self::idx(x, y, z);
                    let m = self.cells[i];
                    if m == EMPTY || self.claimed[i] {
                        continue;
                    }
                    let c = self.grow_from(x, y, z, m);
                    c.for_each_voxel(|cx, cy, cz| self.claimed[Self::idx(cx, cy, cz)] = true);
                    out.push(c);
                }
            }
        }
        out
    }

    fn grow_from(&self, x: usize, y: usize, z: usize, m: u8) -> CuboidWithMaterial {
        let (mut x2, mut y2, mut z2) = (x + 1, y + 1, z + 1);
        loop {
            let mut grew = false;
            if x2 < LATTICE_SIZE && self.layer_free(m, x2..x2 + 1, y..y2, z..z2) {
                x2 += 1;
                grew = true;
            }
            if y2 < LATTICE_SIZE && self.layer_free(m, x..x2, y2..y2 + 1, z..z2) {
                y2 += 1;
                grew = true;
            }
            if z2 < LATTICE_SIZE && self.layer_free(m, x..x2, y..y2, z2..z2 + 1) {
                z2 += 1;
                grew = true;
            }
            if !grew {
                break;
            }
        }
        CuboidWithMaterial::new(
            [x as u8, y as u8, z as u8],
            [x2 as u8, y2 as u8, z2 as u8],
            m,
        )
    }

    fn layer_free(
        &self,
        m: u8,
        xs: std::ops::Range<usize>,
        ys: std::ops::Range<usize>,
        zs: std::ops::Range<usize>,
    ) -> bool {
        for y in ys {
            for z in zs.clone() {
                for x in xs.clone() {
                    if !self.free(x, y, z, m) {
                        return false;
                    }
                }
            }
        }
        true
    }
}
