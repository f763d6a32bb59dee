//! Collaborator that turns material ids into render facts and atlas rectangles.

use chisel_shape::{Face, MaterialCatalog, MaterialId, RenderClass};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderInfo {
    pub class: RenderClass,
    pub cull_non_opaque: bool,
    pub color_map: u8,
}

/// Which texture a face gets: the hull of the uncarved shape or the carved inside.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureVariant {
    Outer,
    Inner,
}

/// Texture-space rectangle in normalized atlas coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AtlasRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl AtlasRect {
    pub const FULL: AtlasRect = AtlasRect {
        u0: 0.0,
        v0: 0.0,
        u1: 1.0,
        v1: 1.0,
    };

    /// Rectangle of tile `(column, row)` in a square atlas of `tiles` per side.
    pub fn tile(tile: [u16; 2], tiles: u16) -> AtlasRect {
        let n = tiles.max(1) as f32;
        AtlasRect {
            u0: tile[0] as f32 / n,
            v0: tile[1] as f32 / n,
            u1: (tile[0] as f32 + 1.0) / n,
            v1: (tile[1] as f32 + 1.0) / n,
        }
    }

    /// Maps a position in `0..=1` of the tile onto the atlas.
    #[inline]
    pub fn lerp(&self, s: f32, t: f32) -> (f32, f32) {
        (self.u0 + (self.u1 - self.u0) * s, self.v0 + (self.v1 - self.v0) * t)
    }
}

pub trait MaterialResolver {
    fn render_info(&self, id: MaterialId) -> RenderInfo;
    fn resolve_face(&self, id: MaterialId, face: Face, variant: TextureVariant) -> AtlasRect;
}

impl MaterialResolver for MaterialCatalog {
    fn render_info(&self, id: MaterialId) -> RenderInfo {
        match self.get(id) {
            Some(def) => RenderInfo {
                class: def.render_class,
                cull_non_opaque: def.cull_non_opaque,
                color_map: def.color_map,
            },
            None => RenderInfo::default(),
        }
    }

    fn resolve_face(&self, id: MaterialId, _face: Face, variant: TextureVariant) -> AtlasRect {
        let Some(def) = self.get(id) else {
            return AtlasRect::FULL;
        };
        let tile = match variant {
            TextureVariant::Outer => def.outer_tile,
            TextureVariant::Inner => def.inner_tile,
        };
        AtlasRect::tile(tile, self.atlas_tiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_resolves_tiles_and_classes() {
        let cat = MaterialCatalog::from_toml_str(
            r#"
atlas_tiles = 4
[materials]
stone = [1, 2]
[materials.glass]
render_class = "transparent"
outer = [0, 0]
inner = [3, 3]
color_map = 2
"#,
        )
        .unwrap();
        let glass = cat.get_id("glass").unwrap();
        let stone = cat.get_id("stone").unwrap();
        assert_eq!(cat.render_info(glass).class, RenderClass::Transparent);
        assert_eq!(cat.render_info(glass).color_map, 2);
        assert_eq!(
            cat.resolve_face(stone, Face::PosY, TextureVariant::Inner),
            AtlasRect { u0: 0.25, v0: 0.5, u1: 0.5, v1: 0.75 }
        );
        assert_eq!(cat.resolve_face(glass, Face::NegX, TextureVariant::Inner).u0, 0.75);
        assert_eq!(cat.resolve_face(MaterialId(99), Face::NegX, TextureVariant::Outer), AtlasRect::FULL);
    }
}
