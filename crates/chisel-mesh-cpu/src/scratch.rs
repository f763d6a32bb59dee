//! Reusable working memory for one mesh build. Owned by a single job at a time;
//! a worker keeps one and resets it at the start of every cell.

use chisel_shape::{CuboidWithMaterial, LATTICE_VOLUME, MaterialId};

use crate::constants::{
    BITS_PER_WORD, EMPTY_SLOT, MASK_LAYER, MASK_PER_FACE, PADDED_VOLUME, WORD_INDEX_MASK,
    WORD_INDEX_SHIFT,
};
use crate::culling::FaceSide;
use crate::resolver::{MaterialResolver, RenderInfo};

/// A cuboid queued for face evaluation with its resolved slot.
#[derive(Copy, Clone, Debug)]
pub(crate) struct OwnCuboid {
    pub cuboid: CuboidWithMaterial,
    pub slot: u8,
    /// Overlay geometry always takes the outer texture.
    pub overlay: bool,
}

pub struct MeshScratch {
    /// Material slot per voxel of the 18³ padded lattice, `EMPTY_SLOT` for air.
    pub(crate) grid: Box<[u8; PADDED_VOLUME]>,
    /// Lattice voxels covered by the original (uncarved) shape.
    pub(crate) original: Box<[u64; LATTICE_VOLUME / BITS_PER_WORD]>,
    /// Visible-face keys per direction, layer and in-plane voxel; 0 = no face.
    pub(crate) masks: Box<[u16]>,
    /// Layers of `masks` holding at least one key, one bit per layer.
    pub(crate) dirty_layers: [u16; 6],
    pub(crate) slots: Vec<FaceSide>,
    pub(crate) own: Vec<OwnCuboid>,
    pub(crate) visited: Vec<u8>,
}

impl Default for MeshScratch {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshScratch {
    pub fn new() -> Self {
        Self {
            grid: Box::new([EMPTY_SLOT; PADDED_VOLUME]),
            original: Box::new([0; LATTICE_VOLUME / BITS_PER_WORD]),
            masks: vec![0u16; 6 * MASK_PER_FACE].into_boxed_slice(),
            dirty_layers: [0; 6],
            slots: Vec::with_capacity(32),
            own: Vec::with_capacity(64),
            visited: vec![0; MASK_LAYER],
        }
    }

    /// Clears everything a previous build left behind.
    pub fn reset(&mut self) {
        self.grid.fill(EMPTY_SLOT);
        self.original.fill(0);
        for (face, dirty) in self.dirty_layers.iter_mut().enumerate() {
            let mut bits = *dirty;
            while bits != 0 {
                let layer = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                let start = face * MASK_PER_FACE + layer * MASK_LAYER;
                self.masks[start..start + MASK_LAYER].fill(0);
            }
            *dirty = 0;
        }
        self.slots.clear();
        // slot 0 is air
        self.slots.push(FaceSide {
            id: MaterialId(u32::MAX),
            info: RenderInfo::default(),
        });
        self.own.clear();
    }

    /// Slot for `id`, registering it on first use. `None` once 255 distinct
    /// materials are in play.
    pub(crate) fn slot_for<R: MaterialResolver + ?Sized>(&mut self, id: MaterialId, resolver: &R) -> Option<u8> {
        if let Some(i) = self.slots.iter().skip(1).position(|s| s.id == id) {
            return Some(i as u8 + 1);
        }
        if self.slots.len() > u8::MAX as usize {
            return None;
        }
        self.slots.push(FaceSide {
            id,
            info: resolver.render_info(id),
        });
        Some((self.slots.len() - 1) as u8)
    }

    #[inline]
    pub(crate) fn set_original(&mut self, i: usize) {
        self.original[i >> WORD_INDEX_SHIFT] |= 1u64 << (i & WORD_INDEX_MASK);
    }

    #[inline]
    pub(crate) fn is_original(&self, i: usize) -> bool {
        (self.original[i >> WORD_INDEX_SHIFT] >> (i & WORD_INDEX_MASK)) & 1 == 1
    }
}
