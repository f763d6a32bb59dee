//! Chiseled cells: edit, transform and persist one cell's voxel shape, and
//! track which cells need remeshing.
#![forbid(unsafe_code)]

mod cell;
mod data;
mod revision;

pub use cell::{ChiselCell, EditError, EditMode, EditOutcome};
pub use data::CellData;
pub use revision::{RevisionStats, RevisionTracker};
