//! Pluggable per-cell extensions notified after shape changes.

use crate::face::Axis;
use crate::lattice::VoxelLattice;
use crate::neighbors::NeighborCell;
use crate::snow::{MAX_SNOW_LEVEL, Overlay, compute_snow};
use crate::transform::{flip, rotate_y};

/// What a behavior sees after its cell recompressed.
#[derive(Clone, Copy)]
pub struct RebuildContext<'a> {
    pub lattice: &'a VoxelLattice,
    /// The cell directly above, when loaded.
    pub above: Option<NeighborCell<'a>>,
}

/// Hook points a cell calls on its behaviors, in registration order.
pub trait CellBehavior {
    fn name(&self) -> &'static str;

    fn on_rebuilt(&mut self, _ctx: &RebuildContext<'_>) {}

    /// `axis` is `None` for a rotation about Y by `degrees`, `Some` for a flip.
    fn on_rotated(&mut self, _degrees: i32, _axis: Option<Axis>) {}

    fn on_remeshed(&mut self) {}

    /// Extra geometry to draw alongside the cell's own cuboids.
    fn overlay(&self) -> Option<&Overlay> {
        None
    }

    /// Whether the behavior changed something the last mesh doesn't show yet.
    fn wants_remesh(&self) -> bool {
        false
    }
}

#[derive(Clone, Debug, Default)]
pub struct SnowBehavior {
    level: u8,
    overlay: Overlay,
    stale: bool,
    remesh_pending: bool,
}

impl SnowBehavior {
    pub fn new(level: u8) -> Self {
        Self {
            level: level.min(MAX_SNOW_LEVEL),
            overlay: Overlay::default(),
            stale: true,
            remesh_pending: false,
        }
    }

    #[inline]
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Changes the depth; the overlay is recomputed on the next rebuild.
    pub fn set_level(&mut self, level: u8) {
        let level = level.min(MAX_SNOW_LEVEL);
        if level != self.level {
            self.level = level;
            self.stale = true;
        }
    }

    /// True when the overlay no longer matches the shape and must be recomputed.
    #[inline]
    pub fn is_stale(&self) -> bool {
        self.stale
    }
}

impl CellBehavior for SnowBehavior {
    fn name(&self) -> &'static str {
        "snow"
    }

    fn on_rebuilt(&mut self, ctx: &RebuildContext<'_>) {
        let next = compute_snow(ctx.lattice, self.level, ctx.above);
        if next != self.overlay {
            log::trace!(
                target: "chisel",
                "snow overlay {} -> {} cuboids (level {})",
                self.overlay.len(),
                next.len(),
                self.level
            );
            self.overlay = next;
            self.remesh_pending = true;
        }
        self.stale = false;
    }

    fn on_rotated(&mut self, degrees: i32, axis: Option<Axis>) {
        if self.overlay.is_empty() {
            self.stale |= axis.is_some();
            return;
        }
        match axis {
            None => {
                // the cell already validated the angle
                if rotate_y(&mut self.overlay.on_shape, degrees).is_err()
                    || rotate_y(&mut self.overlay.on_ground, degrees).is_err()
                {
                    self.overlay.clear();
                    self.stale = true;
                }
            }
            Some(axis) => {
                if axis == Axis::Y {
                    self.overlay.clear();
                    self.stale = true;
                } else {
                    flip(&mut self.overlay.on_shape, axis);
                    flip(&mut self.overlay.on_ground, axis);
                    self.stale = true;
                }
            }
        }
        self.remesh_pending = true;
    }

    fn on_remeshed(&mut self) {
        self.remesh_pending = false;
    }

    fn overlay(&self) -> Option<&Overlay> {
        (!self.overlay.is_empty()).then_some(&self.overlay)
    }

    fn wants_remesh(&self) -> bool {
        self.remesh_pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cuboid::CuboidWithMaterial;
    use crate::lattice::VoxelRegion;

    fn step_lattice() -> VoxelLattice {
        // full-height wall along x < 4, floor elsewhere
        let mut lat = VoxelLattice::new();
        lat.fill_region(&VoxelRegion::new([0, 0, 0], [4, 16, 16]), Some(0));
        lat.fill_region(&VoxelRegion::new([4, 0, 0], [12, 2, 16]), Some(0));
        lat
    }

    #[test]
    fn rebuild_computes_overlay_and_requests_remesh() {
        let lat = step_lattice();
        let mut snow = SnowBehavior::new(1);
        assert!(snow.is_stale());
        snow.on_rebuilt(&RebuildContext { lattice: &lat, above: None });
        assert!(!snow.is_stale());
        assert!(snow.wants_remesh());
        let o = snow.overlay().cloned().unwrap_or_default();
        assert_eq!(o.on_shape, vec![CuboidWithMaterial::new([4, 2, 0], [16, 3, 16], 0)]);
        snow.on_remeshed();
        assert!(!snow.wants_remesh());
    }

    #[test]
    fn rotation_turns_overlay_in_place() {
        let lat = step_lattice();
        let mut snow = SnowBehavior::new(1);
        snow.on_rebuilt(&RebuildContext { lattice: &lat, above: None });
        snow.on_rotated(90, None);
        let o = snow.overlay().cloned().unwrap_or_default();
        // x in 4..16 becomes z in 0..12
        assert_eq!(o.on_shape, vec![CuboidWithMaterial::new([0, 2, 0], [16, 3, 12], 0)]);
        assert!(!snow.is_stale());
    }

    #[test]
    fn flip_marks_overlay_stale() {
        let lat = step_lattice();
        let mut snow = SnowBehavior::new(2);
        snow.on_rebuilt(&RebuildContext { lattice: &lat, above: None });
        snow.on_rotated(0, Some(Axis::Y));
        assert!(snow.is_stale());
        assert!(snow.overlay().is_none());
    }

    #[test]
    fn level_is_clamped() {
        let mut snow = SnowBehavior::new(40);
        assert_eq!(snow.level(), MAX_SNOW_LEVEL);
        snow.set_level(3);
        assert_eq!(snow.level(), 3);
    }
}
