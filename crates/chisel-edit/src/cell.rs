use std::fmt;

use chisel_geom::Aabb;
use chisel_shape::{
    Axis, CellBehavior, CellPos, CuboidWithMaterial, MAX_MATERIALS, MaterialId, MaterialTable,
    NeighborCell, Overlay, RebuildContext, ShapeSummary, SnowBehavior, TransformError,
    VoxelLattice, VoxelRegion, compress, derive_boxes, quarter_turns,
};

/// What an edit does to the voxels of its region.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EditMode {
    /// Fill every voxel, empty or not, with the material.
    Add(MaterialId),
    Remove,
    /// Recolor occupied voxels only.
    Paint(MaterialId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    Changed,
    /// Nothing in the region differed; the stored shape is untouched.
    Unchanged,
    /// The cell has no voxels left and should be removed from the world.
    Emptied,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("cell already uses {MAX_MATERIALS} materials")]
    MaterialTableFull,
    #[error(transparent)]
    Transform(#[from] TransformError),
}

type Behavior = Box<dyn CellBehavior + Send + Sync>;

/// One chiseled cell. The cuboid list is the source of truth; the dense
/// lattice only exists inside an edit.
pub struct ChiselCell {
    pos: CellPos,
    cuboids: Vec<CuboidWithMaterial>,
    materials: MaterialTable,
    original: Option<Vec<CuboidWithMaterial>>,
    /// Accumulated rotation about Y, degrees in `0..360`.
    rotation: i32,
    summary: ShapeSummary,
    snow_level: u8,
    behaviors: Vec<Behavior>,
}

impl fmt::Debug for ChiselCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChiselCell")
            .field("pos", &self.pos)
            .field("cuboids", &self.cuboids.len())
            .field("materials", &self.materials)
            .field("rotation", &self.rotation)
            .field("summary", &self.summary)
            .field(
                "behaviors",
                &self.behaviors.iter().map(|b| b.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ChiselCell {
    /// Empty cell with no materials.
    pub fn new(pos: CellPos) -> Self {
        Self {
            pos,
            cuboids: Vec::new(),
            materials: MaterialTable::new(),
            original: None,
            rotation: 0,
            summary: ShapeSummary::default(),
            snow_level: 0,
            behaviors: Vec::new(),
        }
    }

    /// A full block of `material`, the usual starting point for chiseling.
    pub fn solid(pos: CellPos, material: MaterialId) -> Self {
        Self::from_shape(pos, vec![CuboidWithMaterial::full(0)], MaterialTable::from_ids(vec![material]))
    }

    /// Cell from an existing shape; the shape also becomes the original hull.
    pub fn from_shape(pos: CellPos, cuboids: Vec<CuboidWithMaterial>, materials: MaterialTable) -> Self {
        let lattice = VoxelLattice::from_cuboids(&cuboids);
        let compressed = compress(&lattice);
        let mut cell = Self::new(pos);
        cell.original = Some(compressed.cuboids.clone());
        cell.cuboids = compressed.cuboids;
        cell.summary = compressed.summary;
        cell.materials = materials;
        cell
    }

    /// Reassembles a cell from already sanitized parts.
    pub(crate) fn from_parts(
        pos: CellPos,
        cuboids: Vec<CuboidWithMaterial>,
        materials: MaterialTable,
        original: Option<Vec<CuboidWithMaterial>>,
        rotation: i32,
        summary: ShapeSummary,
    ) -> Self {
        Self {
            pos,
            cuboids,
            materials,
            original,
            rotation,
            summary,
            snow_level: 0,
            behaviors: Vec::new(),
        }
    }

    #[inline]
    pub fn pos(&self) -> CellPos {
        self.pos
    }

    #[inline]
    pub fn cuboids(&self) -> &[CuboidWithMaterial] {
        &self.cuboids
    }

    #[inline]
    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    #[inline]
    pub fn original(&self) -> Option<&[CuboidWithMaterial]> {
        self.original.as_deref()
    }

    #[inline]
    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    #[inline]
    pub fn summary(&self) -> ShapeSummary {
        self.summary
    }

    #[inline]
    pub fn snow_level(&self) -> u8 {
        self.snow_level
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cuboids.is_empty()
    }

    /// Occupied voxel count derived from the cuboid list.
    pub fn volume(&self) -> u32 {
        self.cuboids.iter().map(CuboidWithMaterial::volume).sum()
    }

    /// Borrowed view handed to neighbors for culling and snow shelter.
    pub fn neighbor_view(&self) -> NeighborCell<'_> {
        NeighborCell {
            cuboids: &self.cuboids,
            materials: self.materials.as_slice(),
        }
    }

    /// Dense copy of the shape, for edits and inspection.
    pub fn lattice(&self) -> VoxelLattice {
        VoxelLattice::from_cuboids(&self.cuboids)
    }

    pub fn add_behavior(&mut self, behavior: Behavior) {
        self.behaviors.push(behavior);
    }

    pub fn behaviors(&self) -> impl Iterator<Item = &(dyn CellBehavior + Send + Sync)> {
        self.behaviors.iter().map(|b| b.as_ref())
    }

    /// First overlay any behavior provides.
    pub fn overlay(&self) -> Option<&Overlay> {
        self.behaviors.iter().find_map(|b| b.overlay())
    }

    /// Some behavior changed geometry the last mesh doesn't show.
    pub fn wants_remesh(&self) -> bool {
        self.behaviors.iter().any(|b| b.wants_remesh())
    }

    /// Replaces the snow behavior with one of `level` (0 removes it) and
    /// computes its overlay against `above`.
    pub fn set_snow_level(&mut self, level: u8, above: Option<NeighborCell<'_>>) {
        self.behaviors.retain(|b| b.name() != "snow");
        let snow = SnowBehavior::new(level);
        self.snow_level = snow.level();
        if self.snow_level > 0 {
            self.behaviors.push(Box::new(snow));
        }
        self.refresh_behaviors(above);
    }

    /// Reruns `on_rebuilt` for every behavior, e.g. after the cell above changed.
    pub fn refresh_behaviors(&mut self, above: Option<NeighborCell<'_>>) {
        if self.behaviors.is_empty() {
            return;
        }
        let lattice = self.lattice();
        self.notify_rebuilt(&lattice, above);
    }

    fn notify_rebuilt(&mut self, lattice: &VoxelLattice, above: Option<NeighborCell<'_>>) {
        let ctx = RebuildContext { lattice, above };
        for b in &mut self.behaviors {
            b.on_rebuilt(&ctx);
        }
    }

    /// Applies `mode` to the region (truncated to the lattice) and recompresses.
    ///
    /// A new material is added to the table only when the edit changes something.
    /// On `MaterialTableFull` the cell is left as it was.
    pub fn edit_voxels(
        &mut self,
        region: &VoxelRegion,
        mode: EditMode,
        above: Option<NeighborCell<'_>>,
    ) -> Result<EditOutcome, EditError> {
        let mut materials = self.materials.clone();
        let mut lattice = self.lattice();
        let changed = match mode {
            EditMode::Add(id) => {
                let index = materials.get_or_insert(id).ok_or(EditError::MaterialTableFull)?;
                lattice.fill_region(region, Some(index))
            }
            EditMode::Remove => lattice.fill_region(region, None),
            EditMode::Paint(id) => {
                let index = materials.get_or_insert(id).ok_or(EditError::MaterialTableFull)?;
                lattice.paint_region(region, index)
            }
        };
        if !changed {
            log::trace!(target: "chisel", "edit {:?} at {:?} changed nothing", mode, self.pos);
            return Ok(EditOutcome::Unchanged);
        }

        let compressed = compress(&lattice);
        self.materials = materials;
        self.cuboids = compressed.cuboids;
        self.summary = compressed.summary;
        log::debug!(
            target: "chisel",
            "edit {:?} at {:?}: {} cuboids, {} voxels",
            mode,
            self.pos,
            self.cuboids.len(),
            self.summary.occupied
        );
        if self.cuboids.is_empty() {
            return Ok(EditOutcome::Emptied);
        }
        self.notify_rebuilt(&lattice, above);
        Ok(EditOutcome::Changed)
    }

    /// Turns the cell about the vertical axis. `degrees` must be a multiple of 90.
    pub fn rotate(&mut self, degrees: i32) -> Result<(), EditError> {
        let turns = quarter_turns(degrees)?;
        chisel_shape::rotate_y(&mut self.cuboids, degrees)?;
        if let Some(original) = self.original.as_mut() {
            chisel_shape::rotate_y(original, degrees)?;
        }
        self.summary = self.summary.rotated_y(turns);
        self.rotation = (self.rotation + degrees).rem_euclid(360);
        for b in &mut self.behaviors {
            b.on_rotated(degrees, None);
        }
        log::debug!(target: "chisel", "rotated {:?} by {} (now {})", self.pos, degrees, self.rotation);
        Ok(())
    }

    /// Mirrors the cell across `axis`. Overlays are recomputed afterwards.
    pub fn flip(&mut self, axis: Axis, above: Option<NeighborCell<'_>>) {
        chisel_shape::flip(&mut self.cuboids, axis);
        if let Some(original) = self.original.as_mut() {
            chisel_shape::flip(original, axis);
        }
        self.summary = self.summary.flipped(axis);
        for b in &mut self.behaviors {
            b.on_rotated(0, Some(axis));
        }
        log::debug!(target: "chisel", "flipped {:?} across {:?}", self.pos, axis);
        self.refresh_behaviors(above);
    }

    /// Interaction boxes in cell space, see [`derive_boxes`].
    pub fn selection_boxes(&self, grid_size: u8) -> Vec<Aabb> {
        derive_boxes(&self.cuboids, grid_size)
    }

    /// Drops table entries no cuboid uses. Returns how many were removed.
    pub fn remove_unused_materials(&mut self) -> usize {
        let removed = self.materials.remove_unused(&mut self.cuboids);
        if removed > 0 {
            log::debug!(target: "chisel", "removed {} unused materials from {:?}", removed, self.pos);
        }
        removed
    }

    /// Tells behaviors the cell's mesh was rebuilt.
    pub fn notify_remeshed(&mut self) {
        for b in &mut self.behaviors {
            b.on_remeshed();
        }
    }
}
