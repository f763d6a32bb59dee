//! Material catalog loaded from TOML: render class, atlas tiles and color map
//! for every material a chiseled cell may use.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::material::{MaterialId, RenderClass};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("reading material catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing material catalog: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("material `{key}` has unknown render class `{class}`")]
    UnknownRenderClass { key: String, class: String },
    #[error("atlas_tiles must be at least 1")]
    EmptyAtlas,
}

#[derive(Clone, Debug)]
pub struct MaterialDef {
    pub id: MaterialId,
    pub key: String,
    pub render_class: RenderClass,
    /// Atlas tile `(column, row)` used on faces of the uncarved hull.
    pub outer_tile: [u16; 2],
    /// Atlas tile used on faces exposed by carving.
    pub inner_tile: [u16; 2],
    /// Climate/season color map index; 0 means untinted.
    pub color_map: u8,
    /// Non-opaque material that also hides faces against other non-opaque materials.
    pub cull_non_opaque: bool,
}

#[derive(Clone, Debug)]
pub struct MaterialCatalog {
    pub atlas_tiles: u16,
    pub materials: Vec<MaterialDef>,
    pub by_key: HashMap<String, MaterialId>,
}

impl Default for MaterialCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialCatalog {
    pub fn new() -> Self {
        Self {
            atlas_tiles: DEFAULT_ATLAS_TILES,
            materials: Vec::new(),
            by_key: HashMap::new(),
        }
    }

    pub fn get_id(&self, key: &str) -> Option<MaterialId> {
        self.by_key.get(key).copied()
    }

    pub fn get(&self, id: MaterialId) -> Option<&MaterialDef> {
        self.materials.get(id.0 as usize)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, CatalogError> {
        let cfg: CatalogConfig = toml::from_str(toml_str)?;
        if cfg.atlas_tiles == 0 {
            return Err(CatalogError::EmptyAtlas);
        }
        let mut catalog = MaterialCatalog {
            atlas_tiles: cfg.atlas_tiles,
            ..MaterialCatalog::new()
        };
        let mut entries: Vec<(String, MaterialEntry)> = cfg.materials.into_iter().collect();
        // HashMap iteration order is nondeterministic; sort keys so MaterialId assignment is stable.
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, entry) in entries {
            let id = MaterialId(catalog.materials.len() as u32);
            let def = match entry {
                MaterialEntry::Tile(tile) => MaterialDef {
                    id,
                    key: key.clone(),
                    render_class: RenderClass::Opaque,
                    outer_tile: tile,
                    inner_tile: tile,
                    color_map: 0,
                    cull_non_opaque: false,
                },
                MaterialEntry::Detail {
                    render_class,
                    outer,
                    inner,
                    color_map,
                    cull_non_opaque,
                } => {
                    let render_class = match render_class {
                        Some(name) => RenderClass::from_name(&name).ok_or_else(|| {
                            CatalogError::UnknownRenderClass {
                                key: key.clone(),
                                class: name.clone(),
                            }
                        })?,
                        None => RenderClass::Opaque,
                    };
                    MaterialDef {
                        id,
                        key: key.clone(),
                        render_class,
                        outer_tile: outer,
                        inner_tile: inner.unwrap_or(outer),
                        color_map: color_map.unwrap_or(0),
                        cull_non_opaque: cull_non_opaque.unwrap_or(false),
                    }
                }
            };
            catalog.by_key.insert(key, id);
            catalog.materials.push(def);
        }
        log::debug!(target: "chisel", "material catalog loaded: {} materials", catalog.materials.len());
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}

// --- Config ---

const DEFAULT_ATLAS_TILES: u16 = 16;

fn default_atlas_tiles() -> u16 {
    DEFAULT_ATLAS_TILES
}

#[derive(Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_atlas_tiles")]
    pub atlas_tiles: u16,
    pub materials: HashMap<String, MaterialEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub enum MaterialEntry {
    // Simple: granite = [0, 0]
    Tile([u16; 2]),
    // Detailed: glass = { render_class = "transparent", outer = [2, 0] }
    Detail {
        render_class: Option<String>,
        outer: [u16; 2],
        inner: Option<[u16; 2]>,
        color_map: Option<u8>,
        cull_non_opaque: Option<bool>,
    },
}
