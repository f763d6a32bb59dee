//! Owns a grid of chiseled cells, sequences edits with revision bumps and
//! remeshes dirty cells in parallel.

mod grid;
mod scratch_pool;

pub use grid::CellGrid;
pub use scratch_pool::{PooledScratch, ScratchPool};

use std::sync::Arc;
use std::time::Instant;

use chisel_edit::{ChiselCell, EditError, EditMode, EditOutcome, RevisionStats, RevisionTracker};
use chisel_geom::Vec3;
use chisel_mesh_cpu::{CellMesh, MaterialResolver, MeshInput, MeshScratch, mesh_cell};
use chisel_shape::{Axis, CellPos, Face, FaceFlags, MaterialId, Neighborhood, VoxelRegion};
use hashbrown::HashMap;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("no cell at {0:?}")]
    MissingCell(CellPos),
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error("failed to start mesh workers: {0}")]
    Workers(#[from] rayon::ThreadPoolBuildError),
}

/// Result of one [`ChiselRuntime::remesh_dirty`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RemeshReport {
    pub meshed: usize,
    pub dropped: usize,
    pub quads: usize,
}

pub struct ChiselRuntime {
    grid: CellGrid,
    revisions: RevisionTracker,
    meshes: HashMap<CellPos, CellMesh>,
    scratch: Arc<ScratchPool>,
    pool: Option<ThreadPool>,
    snow_material: Option<MaterialId>,
    snow_level: u8,
}

impl ChiselRuntime {
    /// `workers == 0` meshes on rayon's global pool.
    pub fn new(workers: usize) -> Result<Self, RuntimeError> {
        let pool = if workers > 0 {
            Some(
                ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("chisel-mesh-{i}"))
                    .build()?,
            )
        } else {
            None
        };
        let threads = pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, ThreadPool::current_num_threads);
        log::info!(target: "chisel", "runtime started with {} mesh workers", threads);
        Ok(Self {
            grid: CellGrid::new(),
            revisions: RevisionTracker::new(),
            meshes: HashMap::new(),
            scratch: ScratchPool::with_capacity_from_workers(threads),
            pool,
            snow_material: None,
            snow_level: 0,
        })
    }

    /// Material snow overlays are drawn with. Without one, overlays are not meshed.
    pub fn with_snow_material(mut self, material: MaterialId) -> Self {
        self.snow_material = Some(material);
        self
    }

    /// Snow level given to cells created by edits.
    pub fn with_default_snow(mut self, level: u8) -> Self {
        self.snow_level = level;
        self
    }

    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    pub fn cell(&self, pos: CellPos) -> Option<&ChiselCell> {
        self.grid.get(pos)
    }

    pub fn mesh(&self, pos: CellPos) -> Option<&CellMesh> {
        self.meshes.get(&pos)
    }

    pub fn revision_stats(&self) -> RevisionStats {
        self.revisions.stats()
    }

    pub fn needs_remesh(&self, pos: CellPos) -> bool {
        self.revisions.needs_remesh(pos)
    }

    /// Places a whole cell, replacing whatever was there.
    pub fn insert_cell(&mut self, mut cell: ChiselCell) {
        let pos = cell.pos();
        cell.refresh_behaviors(self.grid.above(pos));
        if cell.is_empty() {
            self.drop_cell(pos);
            return;
        }
        self.grid.insert(cell);
        self.revisions.bump_all(pos);
        self.refresh_below(pos);
    }

    pub fn remove_cell(&mut self, pos: CellPos) -> Option<ChiselCell> {
        let cell = self.grid.remove(pos)?;
        self.drop_cell(pos);
        Some(cell)
    }

    /// The stale mesh and revisions of `pos` are dropped by the next remesh.
    fn drop_cell(&mut self, pos: CellPos) {
        self.grid.remove(pos);
        self.revisions.bump_all(pos);
        self.refresh_below(pos);
    }

    /// Applies a voxel edit at `pos`. `Add` into an empty position creates the
    /// cell; an edit that empties a cell removes it.
    pub fn apply_edit(
        &mut self,
        pos: CellPos,
        region: &VoxelRegion,
        mode: EditMode,
    ) -> Result<EditOutcome, RuntimeError> {
        let mut cell = match self.grid.remove(pos) {
            Some(cell) => cell,
            None if matches!(mode, EditMode::Add(_)) => {
                let mut cell = ChiselCell::new(pos);
                if self.snow_level > 0 {
                    cell.set_snow_level(self.snow_level, None);
                }
                cell
            }
            None => return Ok(EditOutcome::Unchanged),
        };

        let outcome = cell.edit_voxels(region, mode, self.grid.above(pos));
        match outcome {
            Ok(EditOutcome::Changed) => {
                let touched = region.touched_faces();
                self.grid.insert(cell);
                self.revisions.bump(pos, touched);
                if touched.has(Face::NegY) {
                    self.refresh_below(pos);
                }
            }
            Ok(EditOutcome::Emptied) => {
                log::debug!(target: "chisel", "cell {:?} emptied, removing", pos);
                self.drop_cell(pos);
            }
            Ok(EditOutcome::Unchanged) | Err(_) => {
                if !cell.is_empty() {
                    self.grid.insert(cell);
                }
            }
        }
        outcome.map_err(RuntimeError::from)
    }

    /// Turns the cell about Y. Overlays are recomputed against the cell above,
    /// which does not turn with it.
    pub fn rotate(&mut self, pos: CellPos, degrees: i32) -> Result<(), RuntimeError> {
        let mut cell = self.grid.remove(pos).ok_or(RuntimeError::MissingCell(pos))?;
        let turned = cell.rotate(degrees);
        if turned.is_ok() {
            cell.refresh_behaviors(self.grid.above(pos));
        }
        self.grid.insert(cell);
        turned?;
        self.revisions.bump_all(pos);
        self.refresh_below(pos);
        Ok(())
    }

    pub fn flip(&mut self, pos: CellPos, axis: Axis) -> Result<(), RuntimeError> {
        let mut cell = self.grid.remove(pos).ok_or(RuntimeError::MissingCell(pos))?;
        cell.flip(axis, self.grid.above(pos));
        self.grid.insert(cell);
        self.revisions.bump_all(pos);
        self.refresh_below(pos);
        Ok(())
    }

    pub fn set_snow_level(&mut self, pos: CellPos, level: u8) -> Result<(), RuntimeError> {
        let mut cell = self.grid.remove(pos).ok_or(RuntimeError::MissingCell(pos))?;
        cell.set_snow_level(level, self.grid.above(pos));
        self.grid.insert(cell);
        self.revisions.bump(pos, FaceFlags::NONE);
        Ok(())
    }

    /// Recomputes the overlays of the cell below `pos`, whose shelter is `pos`'s bottom face.
    fn refresh_below(&mut self, pos: CellPos) {
        let below = pos.offset(Face::NegY);
        let Some(mut cell) = self.grid.remove(below) else {
            return;
        };
        cell.refresh_behaviors(self.grid.above(below));
        let changed = cell.wants_remesh();
        self.grid.insert(cell);
        if changed {
            self.revisions.bump_below(pos);
        }
    }

    /// Meshes every cell changed since its last build, plus cells whose
    /// behaviors asked for a remesh. Each job holds one pooled scratch.
    pub fn remesh_dirty<R>(&mut self, resolver: &R) -> RemeshReport
    where
        R: MaterialResolver + Sync + ?Sized,
    {
        let t0 = Instant::now();
        let mut dirty = self.revisions.dirty_cells();
        dirty.extend(self.grid.iter().filter(|c| c.wants_remesh()).map(ChiselCell::pos));
        dirty.sort();
        dirty.dedup();

        let mut report = RemeshReport::default();
        let mut jobs = Vec::with_capacity(dirty.len());
        for pos in dirty {
            if self.grid.get(pos).is_some() {
                jobs.push((pos, self.revisions.get_rev(pos)));
            } else {
                // neighbors of edits and removed cells
                self.revisions.forget(pos);
                if self.meshes.remove(&pos).is_some() {
                    report.dropped += 1;
                }
            }
        }

        let grid = &self.grid;
        let scratch = &*self.scratch;
        let snow = self.snow_material;
        let build = || {
            jobs.par_iter()
                .filter_map(|&(pos, rev)| {
                    let cell = grid.get(pos)?;
                    let mut s = scratch.acquire();
                    Some((pos, rev, build_cell_mesh(grid, cell, resolver, snow, &mut s)))
                })
                .collect::<Vec<_>>()
        };
        let results = match &self.pool {
            Some(pool) => pool.install(build),
            None => build(),
        };

        for (pos, rev, mesh) in results {
            self.revisions.mark_built(pos, rev);
            if let Some(cell) = self.grid.get_mut(pos) {
                cell.notify_remeshed();
            }
            report.meshed += 1;
            report.quads += mesh.quads;
            self.meshes.insert(pos, mesh);
        }
        log::info!(
            target: "perf",
            "us={} remesh_dirty meshed={} dropped={} quads={} scratch={}",
            t0.elapsed().as_micros(),
            report.meshed,
            report.dropped,
            report.quads,
            self.scratch.allocated()
        );
        report
    }
}

fn build_cell_mesh<R: MaterialResolver + ?Sized>(
    grid: &CellGrid,
    cell: &ChiselCell,
    resolver: &R,
    snow: Option<MaterialId>,
    scratch: &mut MeshScratch,
) -> CellMesh {
    let p = cell.pos();
    let mut input = MeshInput::new(cell.cuboids(), cell.materials().as_slice())
        .at(Vec3::new(p.x as f32, p.y as f32, p.z as f32))
        .with_neighbors(Neighborhood::gather(grid, p));
    if let Some(original) = cell.original() {
        input = input.with_original(original);
    }
    if let (Some(overlay), Some(material)) = (cell.overlay(), snow) {
        input = input.with_overlay(overlay, material);
    }
    mesh_cell(input, resolver, scratch)
}
