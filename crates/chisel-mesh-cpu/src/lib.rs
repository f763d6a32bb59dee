//! CPU meshing for chiseled cells: greedy quads with cross-cell culling.
#![forbid(unsafe_code)]

mod constants;
pub mod culling;
pub mod emit;
pub mod mesh_build;
pub mod mesher;
pub mod resolver;
pub mod scratch;

pub use culling::{FaceSide, face_visible};
pub use emit::BuildSink;
pub use mesh_build::MeshBuild;
pub use mesher::{CellMesh, CuboidMesher, MeshInput, mesh_cell};
pub use resolver::{AtlasRect, MaterialResolver, RenderInfo, TextureVariant};
pub use scratch::MeshScratch;
