use std::collections::HashMap;

use chisel_shape::{CellPos, Face, FaceFlags};

#[derive(Default, Debug, Clone, Copy)]
pub struct RevisionStats {
    pub rev_entries: usize,
    pub built_entries: usize,
    pub dirty: usize,
}

/// Per-cell change stamps deciding which cells need a new mesh.
#[derive(Default, Debug)]
pub struct RevisionTracker {
    rev: HashMap<CellPos, u64>,   // latest change affecting the cell
    built: HashMap<CellPos, u64>, // rev the current mesh was built from
    counter: u64,
}

impl RevisionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> RevisionStats {
        RevisionStats {
            rev_entries: self.rev.len(),
            built_entries: self.built.len(),
            dirty: self.rev.keys().filter(|p| self.needs_remesh(**p)).count(),
        }
    }

    #[inline]
    fn next_stamp(&mut self) -> u64 {
        self.counter = self.counter.wrapping_add(1).max(1);
        self.counter
    }

    /// Cells whose mesh depends on an edit of `pos` touching the `touched` faces:
    /// the cell itself plus the neighbor across each touched face.
    pub fn affected_cells(pos: CellPos, touched: FaceFlags) -> Vec<CellPos> {
        let mut affected = vec![pos];
        affected.extend(touched.iter().map(|f| pos.offset(f)));
        affected
    }

    /// Marks `pos` and the neighbors across `touched` as changed.
    /// Returns the new monotonically increasing stamp.
    pub fn bump(&mut self, pos: CellPos, touched: FaceFlags) -> u64 {
        let stamp = self.next_stamp();
        for p in Self::affected_cells(pos, touched) {
            self.rev.insert(p, stamp);
        }
        stamp
    }

    /// Marks `pos` and all six neighbors, for changes that can alter any boundary.
    pub fn bump_all(&mut self, pos: CellPos) -> u64 {
        self.bump(pos, FaceFlags::ALL)
    }

    /// Marks only the cell below `pos`, whose snow shelter depends on `pos`.
    pub fn bump_below(&mut self, pos: CellPos) -> u64 {
        let stamp = self.next_stamp();
        self.rev.insert(pos.offset(Face::NegY), stamp);
        stamp
    }

    pub fn get_rev(&self, pos: CellPos) -> u64 {
        self.rev.get(&pos).copied().unwrap_or(0)
    }

    pub fn get_built_rev(&self, pos: CellPos) -> u64 {
        self.built.get(&pos).copied().unwrap_or(0)
    }

    pub fn mark_built(&mut self, pos: CellPos, rev: u64) {
        // Only update if this is a newer revision
        let e = self.built.entry(pos).or_insert(0);
        if rev > *e {
            *e = rev;
        }
    }

    pub fn needs_remesh(&self, pos: CellPos) -> bool {
        self.get_rev(pos) > self.get_built_rev(pos)
    }

    /// Cells changed since their last build, in a stable order.
    pub fn dirty_cells(&self) -> Vec<CellPos> {
        let mut out: Vec<CellPos> = self
            .rev
            .keys()
            .copied()
            .filter(|p| self.needs_remesh(*p))
            .collect();
        out.sort();
        out
    }

    /// Drops all tracking for a removed cell.
    pub fn forget(&mut self, pos: CellPos) {
        self.rev.remove(&pos);
        self.built.remove(&pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chisel_shape::VoxelRegion;

    #[test]
    fn edit_on_top_face_marks_cell_above_only() {
        let mut t = RevisionTracker::new();
        let p = CellPos::new(4, 7, -2);
        let touched = VoxelRegion::brush([5, 15, 11], 1).touched_faces();
        let stamp = t.bump(p, touched);
        assert_eq!(t.get_rev(p), stamp);
        assert_eq!(t.get_rev(p.offset(Face::PosY)), stamp);
        assert_eq!(t.get_rev(p.offset(Face::NegY)), 0);
        let mut affected = RevisionTracker::affected_cells(p, touched);
        affected.sort();
        assert_eq!(affected, vec![p, p.offset(Face::PosY)]);
    }

    #[test]
    fn corner_edit_marks_three_neighbors() {
        let mut t = RevisionTracker::new();
        let p = CellPos::new(0, 0, 0);
        t.bump(p, VoxelRegion::brush([0, 0, 0], 2).touched_faces());
        assert_eq!(t.dirty_cells().len(), 4);
        assert!(t.needs_remesh(CellPos::new(-1, 0, 0)));
        assert!(t.needs_remesh(CellPos::new(0, -1, 0)));
        assert!(t.needs_remesh(CellPos::new(0, 0, -1)));
    }

    #[test]
    fn interior_edit_marks_only_the_cell() {
        let mut t = RevisionTracker::new();
        let p = CellPos::new(2, 0, 2);
        t.bump(p, VoxelRegion::brush([4, 4, 4], 4).touched_faces());
        assert_eq!(t.dirty_cells(), vec![p]);
    }

    #[test]
    fn mark_built_clears_dirty_and_ignores_stale_builds() {
        let mut t = RevisionTracker::new();
        let p = CellPos::new(0, 0, 0);
        let first = t.bump(p, FaceFlags::NONE);
        let second = t.bump(p, FaceFlags::NONE);
        t.mark_built(p, second);
        assert!(!t.needs_remesh(p));
        t.mark_built(p, first);
        assert_eq!(t.get_built_rev(p), second);
        t.bump_below(p);
        assert!(t.needs_remesh(p.offset(Face::NegY)));
        t.forget(p);
        assert_eq!(t.stats().rev_entries, 1);
    }
}
