use serde::{Deserialize, Serialize};

use crate::MAX_MATERIALS;
use crate::cuboid::CuboidWithMaterial;

/// World-level material identifier (a block/material id from the host game).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(pub u32);

/// Render pass a material belongs to. Only `Opaque` hides what is behind it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderClass {
    #[default]
    Opaque,
    Transparent,
    Liquid,
    Cutout,
}

impl RenderClass {
    #[inline]
    pub fn is_opaque(self) -> bool {
        matches!(self, RenderClass::Opaque)
    }

    pub fn from_name(name: &str) -> Option<RenderClass> {
        match name {
            "opaque" => Some(RenderClass::Opaque),
            "transparent" => Some(RenderClass::Transparent),
            "liquid" => Some(RenderClass::Liquid),
            "cutout" => Some(RenderClass::Cutout),
            _ => None,
        }
    }
}

/// Per-cell table of materials; cuboids refer to entries by index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialTable {
    ids: Vec<MaterialId>,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// Builds a table from stored ids, keeping at most `MAX_MATERIALS` entries.
    pub fn from_ids(mut ids: Vec<MaterialId>) -> Self {
        ids.truncate(MAX_MATERIALS);
        Self { ids }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.ids.len() >= MAX_MATERIALS
    }

    #[inline]
    pub fn get(&self, index: u8) -> Option<MaterialId> {
        self.ids.get(index as usize).copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[MaterialId] {
        &self.ids
    }

    pub fn index_of(&self, id: MaterialId) -> Option<u8> {
        self.ids.iter().position(|m| *m == id).map(|i| i as u8)
    }

    /// Returns the index for `id`, appending it when new. `None` when the table is full.
    pub fn get_or_insert(&mut self, id: MaterialId) -> Option<u8> {
        if let Some(i) = self.index_of(id) {
            return Some(i);
        }
        if self.is_full() {
            return None;
        }
        self.ids.push(id);
        Some((self.ids.len() - 1) as u8)
    }

    /// Drops entries no cuboid references and rewrites cuboid indices to match.
    /// Returns the number of removed entries.
    pub fn remove_unused(&mut self, cuboids: &mut [CuboidWithMaterial]) -> usize {
        let mut used = [false; MAX_MATERIALS];
        for c in cuboids.iter() {
            if let Some(u) = used.get_mut(c.material as usize) {
                *u = true;
            }
        }
        let mut remap = [0u8; MAX_MATERIALS];
        let mut kept = Vec::with_capacity(self.ids.len());
        for (i, id) in self.ids.iter().enumerate() {
            if used[i] {
                remap[i] = kept.len() as u8;
                kept.push(*id);
            }
        }
        let removed = self.ids.len() - kept.len();
        if removed > 0 {
            for c in cuboids.iter_mut() {
                if let Some(&m) = remap.get(c.material as usize) {
                    c.material = m;
                }
            }
            self.ids = kept;
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rejects_seventeenth_material() {
        let mut t = MaterialTable::new();
        for i in 0..16 {
            assert_eq!(t.get_or_insert(MaterialId(100 + i)), Some(i as u8));
        }
        assert!(t.is_full());
        assert_eq!(t.get_or_insert(MaterialId(5)), None);
        assert_eq!(t.get_or_insert(MaterialId(103)), Some(3));
    }

    #[test]
    fn remove_unused_compacts_and_remaps() {
        let mut t = MaterialTable::from_ids(vec![MaterialId(1), MaterialId(2), MaterialId(3)]);
        let mut cuboids = vec![
            CuboidWithMaterial::new([0, 0, 0], [8, 16, 16], 2),
            CuboidWithMaterial::new([8, 0, 0], [16, 16, 16], 0),
        ];
        assert_eq!(t.remove_unused(&mut cuboids), 1);
        assert_eq!(t.as_slice(), &[MaterialId(1), MaterialId(3)]);
        assert_eq!(cuboids[0].material, 1);
        assert_eq!(cuboids[1].material, 0);
        assert_eq!(t.get(cuboids[0].material), Some(MaterialId(3)));
    }

    #[test]
    fn render_class_names() {
        assert_eq!(RenderClass::from_name("liquid"), Some(RenderClass::Liquid));
        assert_eq!(RenderClass::from_name("glass"), None);
        assert!(RenderClass::Opaque.is_opaque());
        assert!(!RenderClass::Cutout.is_opaque());
    }
}
