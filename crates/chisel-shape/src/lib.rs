//! Chiseled cell shapes: packed cuboids, the dense lattice bridge, greedy
//! compression, 90° transforms, interaction boxes and the snow overlay.
#![forbid(unsafe_code)]

pub mod behavior;
pub mod boxes;
pub mod catalog;
pub mod compress;
pub mod cuboid;
pub mod face;
pub mod flags;
pub mod lattice;
pub mod material;
pub mod neighbors;
pub mod snow;
pub mod transform;

pub use behavior::{CellBehavior, RebuildContext, SnowBehavior};
pub use boxes::{DEFAULT_GRID_SIZE, derive_boxes};
pub use catalog::{CatalogError, MaterialCatalog, MaterialDef};
pub use compress::{Compressed, ShapeSummary, compress, compress_with};
pub use cuboid::CuboidWithMaterial;
pub use face::{Axis, Face};
pub use flags::FaceFlags;
pub use lattice::{VoxelLattice, VoxelRegion};
pub use material::{MaterialId, MaterialTable, RenderClass};
pub use neighbors::{CellPos, Neighborhood, NeighborCell, NeighborSource, NoNeighbors};
pub use snow::{Overlay, compute_snow};
pub use transform::{TransformError, flip, quarter_turns, rotate_y};

/// Voxels per axis in one cell.
pub const LATTICE_SIZE: usize = 16;
/// Voxels in one cell.
pub const LATTICE_VOLUME: usize = LATTICE_SIZE * LATTICE_SIZE * LATTICE_SIZE;
/// Voxels on one boundary face of a cell.
pub const FACE_AREA: usize = LATTICE_SIZE * LATTICE_SIZE;
/// Distinct materials one cell can reference (4-bit index).
pub const MAX_MATERIALS: usize = 16;
