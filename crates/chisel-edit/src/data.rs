//! Persisted form of a cell and the sanitizing loader.

use serde::{Deserialize, Serialize};

use chisel_shape::{
    CellPos, CuboidWithMaterial, FaceFlags, MaterialId, MaterialTable, VoxelLattice, compress,
    snow::MAX_SNOW_LEVEL,
};

use crate::cell::ChiselCell;

/// Flat record handed to the persistence layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellData {
    pub cuboids: Vec<u32>,
    pub materials: Vec<MaterialId>,
    pub original: Option<Vec<u32>>,
    pub rotation: i32,
    pub face_solid: u8,
    pub face_almost_solid: u8,
    pub side_ao: u8,
    pub snow_level: u8,
}

impl CellData {
    pub fn from_cell(cell: &ChiselCell) -> Self {
        let summary = cell.summary();
        Self {
            cuboids: cell.cuboids().iter().map(CuboidWithMaterial::encode).collect(),
            materials: cell.materials().as_slice().to_vec(),
            original: cell
                .original()
                .map(|o| o.iter().map(CuboidWithMaterial::encode).collect()),
            rotation: cell.rotation(),
            face_solid: summary.solid.bits(),
            face_almost_solid: summary.almost_solid.bits(),
            side_ao: summary.side_ao.bits(),
            snow_level: cell.snow_level(),
        }
    }

    /// Builds a cell, repairing whatever the record gets wrong. Every repair is
    /// logged at `warn`; loading never fails.
    pub fn into_cell(self, pos: CellPos) -> ChiselCell {
        if self.materials.len() > chisel_shape::MAX_MATERIALS {
            log::warn!(
                target: "chisel",
                "cell {:?}: material table has {} entries, keeping the first {}",
                pos,
                self.materials.len(),
                chisel_shape::MAX_MATERIALS
            );
        }
        let materials = MaterialTable::from_ids(self.materials);

        let mut cuboids = decode_list(pos, "cuboid", &self.cuboids);
        if !cuboids.is_empty() && materials.is_empty() {
            log::warn!(target: "chisel", "cell {:?}: {} cuboids but no materials, loading empty", pos, cuboids.len());
            cuboids.clear();
        }
        let last = materials.len().saturating_sub(1) as u8;
        for c in cuboids.iter_mut() {
            if c.material > last {
                log::warn!(
                    target: "chisel",
                    "cell {:?}: material index {} past table of {}, clamped",
                    pos,
                    c.material,
                    materials.len()
                );
                c.material = last;
            }
        }
        let original = self.original.map(|o| decode_list(pos, "original cuboid", &o));

        let mut rotation = self.rotation.rem_euclid(360);
        if rotation % 90 != 0 {
            log::warn!(target: "chisel", "cell {:?}: rotation {} is not a quarter turn, reset", pos, self.rotation);
            rotation = 0;
        }

        let summary = compress(&VoxelLattice::from_cuboids(&cuboids)).summary;
        let stored = [self.face_solid, self.face_almost_solid, self.side_ao];
        let derived = [summary.solid, summary.almost_solid, summary.side_ao].map(FaceFlags::bits);
        if stored != derived {
            log::warn!(
                target: "chisel",
                "cell {:?}: stored face flags {:?} disagree with shape {:?}, recomputed",
                pos,
                stored,
                derived
            );
        }

        if self.snow_level > MAX_SNOW_LEVEL {
            log::warn!(target: "chisel", "cell {:?}: snow level {} clamped", pos, self.snow_level);
        }
        let mut cell = ChiselCell::from_parts(pos, cuboids, materials, original, rotation, summary);
        if self.snow_level > 0 {
            cell.set_snow_level(self.snow_level, None);
        }
        cell
    }
}

fn decode_list(pos: CellPos, what: &str, packed: &[u32]) -> Vec<CuboidWithMaterial> {
    let mut out = Vec::with_capacity(packed.len());
    for &p in packed {
        let c = CuboidWithMaterial::decode(p);
        if c.is_valid() {
            out.push(c);
        } else {
            log::warn!(target: "chisel", "cell {:?}: dropping degenerate {} {:#010x}", pos, what, p);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chisel_shape::{Face, VoxelRegion};

    use crate::cell::EditMode;

    fn pos() -> CellPos {
        CellPos::new(1, 2, 3)
    }

    #[test]
    fn saved_cell_loads_back_identically() {
        let mut cell = ChiselCell::solid(pos(), MaterialId(7));
        cell.edit_voxels(&VoxelRegion::brush([0, 8, 0], 8), EditMode::Add(MaterialId(9)), None)
            .unwrap();
        cell.rotate(90).unwrap();
        cell.set_snow_level(3, None);
        let data = CellData::from_cell(&cell);
        let loaded = data.clone().into_cell(pos());
        assert_eq!(loaded.cuboids(), cell.cuboids());
        assert_eq!(loaded.materials(), cell.materials());
        assert_eq!(loaded.original(), cell.original());
        assert_eq!(loaded.rotation(), 90);
        assert_eq!(loaded.summary(), cell.summary());
        assert_eq!(loaded.snow_level(), 3);
        assert_eq!(CellData::from_cell(&loaded), data);
    }

    #[test]
    fn record_survives_toml() {
        let cell = ChiselCell::solid(pos(), MaterialId(4));
        let data = CellData::from_cell(&cell);
        let text = toml::to_string(&data).unwrap();
        let back: CellData = toml::from_str(&text).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn degenerate_cuboids_are_dropped() {
        let good = CuboidWithMaterial::new([0, 0, 0], [4, 4, 4], 0).encode();
        // x1 = 9 with a stored max of 0 (x2 = 1): decodes to an inverted box
        let bad: u32 = 9;
        let data = CellData {
            cuboids: vec![good, bad],
            materials: vec![MaterialId(1)],
            ..Default::default()
        };
        let cell = data.into_cell(pos());
        assert_eq!(cell.cuboids().len(), 1);
        assert_eq!(cell.volume(), 64);
    }

    #[test]
    fn material_indices_are_clamped() {
        let c = CuboidWithMaterial::new([0, 0, 0], [16, 16, 16], 5).encode();
        let data = CellData {
            cuboids: vec![c],
            materials: vec![MaterialId(1), MaterialId(2)],
            ..Default::default()
        };
        let cell = data.into_cell(pos());
        assert_eq!(cell.cuboids()[0].material, 1);
    }

    #[test]
    fn missing_table_yields_empty_cell() {
        let data = CellData {
            cuboids: vec![CuboidWithMaterial::full(0).encode()],
            ..Default::default()
        };
        assert!(data.into_cell(pos()).is_empty());
    }

    #[test]
    fn wrong_flags_and_rotation_are_repaired() {
        let data = CellData {
            cuboids: vec![CuboidWithMaterial::new([0, 0, 0], [16, 8, 16], 0).encode()],
            materials: vec![MaterialId(1)],
            rotation: 45,
            face_solid: 0b11_1111,
            snow_level: 200,
            ..Default::default()
        };
        let cell = data.into_cell(pos());
        assert_eq!(cell.rotation(), 0);
        assert!(cell.summary().solid.has(Face::NegY));
        assert!(!cell.summary().solid.has(Face::PosY));
        assert_eq!(cell.snow_level(), MAX_SNOW_LEVEL);
    }
}
