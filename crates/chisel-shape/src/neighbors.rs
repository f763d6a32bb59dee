//! Grid-access contract: how the mesher and the snow overlay see adjacent cells.

use serde::{Deserialize, Serialize};

use crate::cuboid::CuboidWithMaterial;
use crate::face::Face;
use crate::flags::FaceFlags;
use crate::material::MaterialId;

/// Integer position of a cell in the world grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CellPos {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The adjacent cell across `face`.
    #[inline]
    pub fn offset(self, face: Face) -> CellPos {
        let (dx, dy, dz) = face.delta();
        CellPos::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

/// Borrowed view of a neighbor's voxel shape.
#[derive(Clone, Copy, Debug)]
pub struct NeighborCell<'a> {
    pub cuboids: &'a [CuboidWithMaterial],
    pub materials: &'a [MaterialId],
}

impl<'a> NeighborCell<'a> {
    /// World material of a cuboid, `None` for an out-of-table index.
    #[inline]
    pub fn material_of(&self, c: &CuboidWithMaterial) -> Option<MaterialId> {
        self.materials.get(c.material as usize).copied()
    }

    /// Cuboids of this neighbor lying on its side `face` (the plane it shares with
    /// the cell on that side). Only these can occlude across the boundary.
    pub fn boundary_cuboids(self, face: Face) -> impl Iterator<Item = &'a CuboidWithMaterial> + 'a {
        self.cuboids.iter().filter(move |c| c.touches(face))
    }
}

/// Read access to the cuboid lists of neighboring cells. `None` means the
/// neighbor is absent or unloaded; callers treat that as "no occlusion data".
pub trait NeighborSource {
    fn neighbor_cuboids(&self, pos: CellPos, face: Face) -> Option<NeighborCell<'_>>;
}

/// A world with no neighbors at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoNeighbors;

impl NeighborSource for NoNeighbors {
    fn neighbor_cuboids(&self, _pos: CellPos, _face: Face) -> Option<NeighborCell<'_>> {
        None
    }
}

/// The up-to-six neighbors of one cell, fetched once per mesh or rebuild.
#[derive(Clone, Copy, Debug, Default)]
pub struct Neighborhood<'a> {
    cells: [Option<NeighborCell<'a>>; 6],
}

impl<'a> Neighborhood<'a> {
    pub const fn empty() -> Self {
        Self { cells: [None; 6] }
    }

    pub fn gather(source: &'a dyn NeighborSource, pos: CellPos) -> Self {
        let mut n = Self::empty();
        for face in Face::ALL {
            n.cells[face.index()] = source.neighbor_cuboids(pos, face);
        }
        n
    }

    #[inline]
    pub fn with(mut self, face: Face, cell: NeighborCell<'a>) -> Self {
        self.cells[face.index()] = Some(cell);
        self
    }

    #[inline]
    pub fn get(&self, face: Face) -> Option<NeighborCell<'a>> {
        self.cells[face.index()]
    }

    /// Faces whose neighbor supplied data.
    pub fn loaded(&self) -> FaceFlags {
        let mut flags = FaceFlags::NONE;
        for face in Face::ALL {
            flags.set(face, self.cells[face.index()].is_some());
        }
        flags
    }
}
