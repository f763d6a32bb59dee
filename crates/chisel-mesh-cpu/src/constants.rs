//! Shared constants for chisel-mesh-cpu.

use chisel_shape::{FACE_AREA, LATTICE_SIZE, LATTICE_VOLUME};

// Lattice plus one voxel of neighbor halo on each side
pub(crate) const PADDED: usize = LATTICE_SIZE + 2;
pub(crate) const PADDED_VOLUME: usize = PADDED * PADDED * PADDED;
pub(crate) const HALO_HI: usize = PADDED - 1;

// Slot 0 marks an empty padded voxel
pub(crate) const EMPTY_SLOT: u8 = 0;

// Face masks: one 16x16 layer per lattice depth, per direction
pub(crate) const MASK_LAYER: usize = FACE_AREA;
pub(crate) const MASK_PER_FACE: usize = LATTICE_VOLUME;

// Bitset configuration (u64-based)
pub(crate) const BITS_PER_WORD: usize = 64;
pub(crate) const WORD_INDEX_SHIFT: usize = 6; // log2(64)
pub(crate) const WORD_INDEX_MASK: usize = 63;

// World units per voxel
pub(crate) const VOXEL_SIZE: f32 = 1.0 / LATTICE_SIZE as f32;

// Colors
pub(crate) const OPAQUE_ALPHA: u8 = 255;
pub(crate) const WHITE: [u8; 4] = [255, 255, 255, OPAQUE_ALPHA];
