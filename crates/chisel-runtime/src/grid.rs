use chisel_edit::ChiselCell;
use chisel_shape::{CellPos, Face, NeighborCell, NeighborSource};
use hashbrown::HashMap;

/// In-memory world of chiseled cells.
#[derive(Debug, Default)]
pub struct CellGrid {
    cells: HashMap<CellPos, ChiselCell>,
}

impl CellGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, pos: CellPos) -> Option<&ChiselCell> {
        self.cells.get(&pos)
    }

    pub fn get_mut(&mut self, pos: CellPos) -> Option<&mut ChiselCell> {
        self.cells.get_mut(&pos)
    }

    pub fn insert(&mut self, cell: ChiselCell) -> Option<ChiselCell> {
        self.cells.insert(cell.pos(), cell)
    }

    pub fn remove(&mut self, pos: CellPos) -> Option<ChiselCell> {
        self.cells.remove(&pos)
    }

    /// The cell directly above `pos`, as snow shelter sees it.
    pub fn above(&self, pos: CellPos) -> Option<NeighborCell<'_>> {
        self.neighbor_cuboids(pos, Face::PosY)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChiselCell> {
        self.cells.values()
    }

    /// Occupied positions in a stable order.
    pub fn positions(&self) -> Vec<CellPos> {
        let mut out: Vec<CellPos> = self.cells.keys().copied().collect();
        out.sort();
        out
    }
}

impl NeighborSource for CellGrid {
    fn neighbor_cuboids(&self, pos: CellPos, face: Face) -> Option<NeighborCell<'_>> {
        self.cells
            .get(&pos.offset(face))
            .filter(|c| !c.is_empty())
            .map(ChiselCell::neighbor_view)
    }
}
