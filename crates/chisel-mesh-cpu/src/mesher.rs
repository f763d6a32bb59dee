//! Greedy mesher for one chiseled cell.
//!
//! Phases, each driven by the caller or by [`mesh_cell`]:
//! 1. `build_halo`: neighbor cuboids lying on the shared boundary are stamped
//!    into the one-voxel padding of an 18³ slot grid.
//! 2. `stamp_cuboids`: the cell's own cuboids (and overlay) are stamped as
//!    shells only. A voxel just outside one cuboid that lies inside another is
//!    always on that other cuboid's shell, so shells are enough for culling.
//! 3. `evaluate_faces`: every face voxel of every own cuboid is tested against
//!    the voxel beyond it; visible faces write a `(slot, variant)` key into a
//!    per-direction layer mask.
//! 4. `emit_into`: each dirty layer is merged into maximal rectangles of equal
//!    key and emitted as quads.

use std::collections::HashMap;
use std::time::Instant;

use chisel_geom::Vec3;
use chisel_shape::{
    CuboidWithMaterial, Face, LATTICE_SIZE, MaterialId, Neighborhood, Overlay, RenderClass,
    VoxelLattice,
};

use crate::constants::{
    EMPTY_SLOT, HALO_HI, MASK_LAYER, MASK_PER_FACE, PADDED, VOXEL_SIZE, WHITE,
};
use crate::culling::face_visible;
use crate::emit::BuildSink;
use crate::mesh_build::MeshBuild;
use crate::resolver::{MaterialResolver, TextureVariant};
use crate::scratch::{MeshScratch, OwnCuboid};

/// Everything the mesher reads for one cell.
#[derive(Clone, Copy)]
pub struct MeshInput<'a> {
    /// World-space position of the cell's minimum corner.
    pub origin: Vec3,
    pub cuboids: &'a [CuboidWithMaterial],
    pub materials: &'a [MaterialId],
    /// Shape before carving; `None` means the full cell.
    pub original: Option<&'a [CuboidWithMaterial]>,
    pub neighbors: Neighborhood<'a>,
    /// Overlay cuboids and the material they are drawn with.
    pub overlay: Option<(&'a Overlay, MaterialId)>,
}

impl<'a> MeshInput<'a> {
    pub fn new(cuboids: &'a [CuboidWithMaterial], materials: &'a [MaterialId]) -> Self {
        Self {
            origin: Vec3::ZERO,
            cuboids,
            materials,
            original: None,
            neighbors: Neighborhood::empty(),
            overlay: None,
        }
    }

    pub fn at(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_original(mut self, original: &'a [CuboidWithMaterial]) -> Self {
        self.original = Some(original);
        self
    }

    pub fn with_neighbors(mut self, neighbors: Neighborhood<'a>) -> Self {
        self.neighbors = neighbors;
        self
    }

    pub fn with_overlay(mut self, overlay: &'a Overlay, material: MaterialId) -> Self {
        self.overlay = Some((overlay, material));
        self
    }

    fn is_empty(&self) -> bool {
        self.cuboids.is_empty() && self.overlay.is_none_or(|(o, _)| o.is_empty())
    }
}

/// Mesh of one cell, split by render pass.
#[derive(Clone, Debug, Default)]
pub struct CellMesh {
    pub parts: HashMap<RenderClass, MeshBuild>,
    /// Merged rectangles emitted.
    pub quads: usize,
}

impl CellMesh {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.quads == 0
    }

    pub fn part(&self, class: RenderClass) -> Option<&MeshBuild> {
        self.parts.get(&class)
    }

    pub fn triangle_count(&self) -> usize {
        self.parts.values().map(MeshBuild::triangle_count).sum()
    }
}

#[inline]
fn pidx(x: usize, y: usize, z: usize) -> usize {
    (y * PADDED + z) * PADDED + x
}

fn fill_padded(grid: &mut [u8], lo: [usize; 3], hi: [usize; 3], slot: u8) {
    for y in lo[1]..hi[1] {
        for z in lo[2]..hi[2] {
            let row = pidx(0, y, z);
            grid[row + lo[0]..row + hi[0]].fill(slot);
        }
    }
}

/// Mask coordinates `(layer, u, v)` of lattice voxel `p` for faces pointing along `face`.
#[inline]
fn mask_coords(face: Face, p: [usize; 3]) -> (usize, usize, usize) {
    match face {
        Face::PosY | Face::NegY => (p[1], p[0], p[2]),
        Face::PosX | Face::NegX => (p[0], p[2], p[1]),
        Face::PosZ | Face::NegZ => (p[2], p[0], p[1]),
    }
}

#[inline]
fn mask_index(face: Face, layer: usize, u: usize, v: usize) -> usize {
    face.index() * MASK_PER_FACE + layer * MASK_LAYER + v * LATTICE_SIZE + u
}

pub struct CuboidMesher<'a, R: MaterialResolver + ?Sized> {
    scratch: &'a mut MeshScratch,
    resolver: &'a R,
    input: MeshInput<'a>,
}

impl<'a, R: MaterialResolver + ?Sized> CuboidMesher<'a, R> {
    /// Takes the scratch for the duration of the build and resets it.
    pub fn new(scratch: &'a mut MeshScratch, resolver: &'a R, input: MeshInput<'a>) -> Self {
        scratch.reset();
        Self {
            scratch,
            resolver,
            input,
        }
    }

    /// Stamps neighbor boundary cuboids into the padding layer. Absent
    /// neighbors leave their padding empty, so faces towards them are drawn.
    pub fn build_halo(&mut self) {
        for face in Face::ALL {
            let Some(nb) = self.input.neighbors.get(face) else {
                continue;
            };
            let axis = face.axis().index();
            let plane = if face.is_positive() { HALO_HI } else { 0 };
            for c in nb.boundary_cuboids(face.opposite()) {
                let Some(id) = nb.material_of(c) else {
                    continue;
                };
                let Some(slot) = self.scratch.slot_for(id, self.resolver) else {
                    continue;
                };
                let (min, max) = (c.min(), c.max());
                let mut lo = [min[0] as usize + 1, min[1] as usize + 1, min[2] as usize + 1];
                let mut hi = [max[0] as usize + 1, max[1] as usize + 1, max[2] as usize + 1];
                lo[axis] = plane;
                hi[axis] = plane + 1;
                fill_padded(&mut self.scratch.grid[..], lo, hi, slot);
            }
        }
    }

    /// Stamps the shells of the cell's own cuboids and overlay, and the
    /// original-shape bitset used to pick texture variants.
    pub fn stamp_cuboids(&mut self) {
        let t0 = Instant::now();
        for c in self.input.cuboids {
            let Some(&id) = self.input.materials.get(c.material as usize) else {
                log::debug!(target: "chisel", "skipping cuboid with material index {} past table", c.material);
                continue;
            };
            let Some(slot) = self.scratch.slot_for(id, self.resolver) else {
                continue;
            };
            self.scratch.own.push(OwnCuboid {
                cuboid: *c,
                slot,
                overlay: false,
            });
        }
        if let Some((overlay, id)) = self.input.overlay {
            if let Some(slot) = self.scratch.slot_for(id, self.resolver) {
                for c in overlay.on_shape.iter().chain(&overlay.on_ground) {
                    self.scratch.own.push(OwnCuboid {
                        cuboid: *c,
                        slot,
                        overlay: true,
                    });
                }
            }
        }
        for i in 0..self.scratch.own.len() {
            let own = self.scratch.own[i];
            let (min, max) = (own.cuboid.min(), own.cuboid.max());
            for face in Face::ALL {
                let axis = face.axis().index();
                let mut lo = [min[0] as usize + 1, min[1] as usize + 1, min[2] as usize + 1];
                let mut hi = [max[0] as usize + 1, max[1] as usize + 1, max[2] as usize + 1];
                if face.is_positive() {
                    lo[axis] = hi[axis] - 1;
                } else {
                    hi[axis] = lo[axis] + 1;
                }
                fill_padded(&mut self.scratch.grid[..], lo, hi, own.slot);
            }
        }
        match self.input.original {
            Some(original) => {
                for c in original {
                    c.for_each_voxel(|x, y, z| self.scratch.set_original(VoxelLattice::index(x, y, z)));
                }
            }
            None => self.scratch.original.fill(u64::MAX),
        }
        log::trace!(
            target: "perf",
            "us={} mesher_stamp cuboids={} slots={}",
            t0.elapsed().as_micros(),
            self.scratch.own.len(),
            self.scratch.slots.len() - 1
        );
    }

    /// Runs the culling policy on every face voxel of every own cuboid.
    pub fn evaluate_faces(&mut self) {
        let scratch = &mut *self.scratch;
        for own in &scratch.own {
            let me = &scratch.slots[own.slot as usize];
            let (min, max) = (own.cuboid.min(), own.cuboid.max());
            for face in Face::ALL {
                let axis = face.axis().index();
                let (dx, dy, dz) = face.delta();
                let mut lo = [min[0] as usize, min[1] as usize, min[2] as usize];
                let mut hi = [max[0] as usize, max[1] as usize, max[2] as usize];
                if face.is_positive() {
                    lo[axis] = hi[axis] - 1;
                } else {
                    hi[axis] = lo[axis] + 1;
                }
                for y in lo[1]..hi[1] {
                    for z in lo[2]..hi[2] {
                        for x in lo[0]..hi[0] {
                            // beyond voxel in padded coordinates
                            let (px, py, pz) = (
                                (x as i32 + 1 + dx) as usize,
                                (y as i32 + 1 + dy) as usize,
                                (z as i32 + 1 + dz) as usize,
                            );
                            let nb = scratch.grid[pidx(px, py, pz)];
                            let nb_side = (nb != EMPTY_SLOT).then(|| &scratch.slots[nb as usize]);
                            if !face_visible(me, nb_side) {
                                continue;
                            }
                            let inner = if own.overlay {
                                false
                            } else {
                                let here = scratch.is_original(VoxelLattice::index(x, y, z));
                                let beyond_inside = (1..=LATTICE_SIZE).contains(&px)
                                    && (1..=LATTICE_SIZE).contains(&py)
                                    && (1..=LATTICE_SIZE).contains(&pz);
                                let beyond = beyond_inside
                                    && scratch.is_original(VoxelLattice::index(px - 1, py - 1, pz - 1));
                                !(here && !beyond)
                            };
                            let (layer, u, v) = mask_coords(face, [x, y, z]);
                            scratch.masks[mask_index(face, layer, u, v)] =
                                ((own.slot as u16) << 1) | inner as u16;
                            scratch.dirty_layers[face.index()] |= 1 << layer;
                        }
                    }
                }
            }
        }
    }

    /// Greedy-merges every dirty mask layer and emits the rectangles.
    /// Returns the number of quads written.
    pub fn emit_into<B: BuildSink>(&mut self, builds: &mut B) -> usize {
        let mut quads = 0;
        for face in Face::ALL {
            quads += self.emit_face(face, builds);
        }
        quads
    }

    fn emit_face<B: BuildSink>(&mut self, face: Face, builds: &mut B) -> usize {
        let scratch = &mut *self.scratch;
        let visited = &mut scratch.visited;
        let n = LATTICE_SIZE;
        visited.fill(0);
        let mut epoch: u8 = 0;
        let mut quads = 0;
        let mut overflowed = false;
        let mut bits = scratch.dirty_layers[face.index()];
        while bits != 0 {
            let layer = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            epoch = epoch.wrapping_add(1);
            if epoch == 0 {
                visited.fill(0);
                epoch = 1;
            }
            let key_at = |u: usize, v: usize| scratch.masks[mask_index(face, layer, u, v)];
            let idx2d = |u: usize, v: usize| v * n + u;
            for v in 0..n {
                let mut u = 0usize;
                while u < n {
                    let key = key_at(u, v);
                    if key == 0 || visited[idx2d(u, v)] == epoch {
                        u += 1;
                        continue;
                    }
                    let mut run_w = 1usize;
                    while u + run_w < n
                        && visited[idx2d(u + run_w, v)] != epoch
                        && key_at(u + run_w, v) == key
                    {
                        run_w += 1;
                    }
                    let mut run_h = 1usize;
                    'outer: while v + run_h < n {
                        for uu in u..(u + run_w) {
                            if visited[idx2d(uu, v + run_h)] == epoch || key_at(uu, v + run_h) != key {
                                break 'outer;
                            }
                        }
                        run_h += 1;
                    }
                    for dv in 0..run_h {
                        for du in 0..run_w {
                            visited[idx2d(u + du, v + dv)] = epoch;
                        }
                    }

                    let side = scratch.slots[(key >> 1) as usize];
                    let variant = if key & 1 == 1 {
                        TextureVariant::Inner
                    } else {
                        TextureVariant::Outer
                    };
                    let tex = self.resolver.resolve_face(side.id, face, variant);
                    let plane = (layer + face.is_positive() as usize) as f32;
                    let (fu, fv) = (u as f32, v as f32);
                    let local = match face {
                        Face::PosY | Face::NegY => Vec3::new(fu, plane, fv),
                        Face::PosX | Face::NegX => Vec3::new(plane, fv, fu),
                        Face::PosZ | Face::NegZ => Vec3::new(fu, fv, plane),
                    };
                    let origin = self.input.origin + local * VOXEL_SIZE;
                    let uv_local = [
                        fu * VOXEL_SIZE,
                        fv * VOXEL_SIZE,
                        run_w as f32 * VOXEL_SIZE,
                        run_h as f32 * VOXEL_SIZE,
                    ];
                    let ok = builds.get_build_mut(side.info.class).add_face_rect(
                        face,
                        origin,
                        run_w as f32 * VOXEL_SIZE,
                        run_h as f32 * VOXEL_SIZE,
                        tex,
                        uv_local,
                        WHITE,
                        side.info.color_map,
                    );
                    if ok {
                        quads += 1;
                    } else {
                        overflowed = true;
                    }
                    u += run_w;
                }
            }
        }
        if overflowed {
            log::warn!(target: "chisel", "mesh index space exhausted on {face:?}; dropped quads");
        }
        quads
    }
}

/// Meshes one cell with the given scratch: halo, stamping, culling, merge.
pub fn mesh_cell<R: MaterialResolver + ?Sized>(
    input: MeshInput<'_>,
    resolver: &R,
    scratch: &mut MeshScratch,
) -> CellMesh {
    let mut out = CellMesh::default();
    if input.is_empty() {
        return out;
    }
    let t0 = Instant::now();
    let mut mesher = CuboidMesher::new(scratch, resolver, input);
    mesher.build_halo();
    mesher.stamp_cuboids();
    mesher.evaluate_faces();
    out.quads = mesher.emit_into(&mut out.parts);
    log::debug!(
        target: "perf",
        "us={} mesh_cell cuboids={} quads={} parts={}",
        t0.elapsed().as_micros(),
        input.cuboids.len(),
        out.quads,
        out.parts.len()
    );
    out
}
