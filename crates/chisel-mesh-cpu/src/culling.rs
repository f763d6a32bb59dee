//! Whether a voxel face between two materials is drawn.

use chisel_shape::MaterialId;

use crate::resolver::RenderInfo;

/// Render facts for one side of a voxel face.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FaceSide {
    pub id: MaterialId,
    pub info: RenderInfo,
}

/// Face of `me` towards `neighbor` (`None` = empty or no data) is drawn.
///
/// | neighbor       | self opaque | self non-opaque                  |
/// |----------------|-------------|----------------------------------|
/// | empty / absent | draw        | draw                             |
/// | same material  | cull        | cull                             |
/// | opaque         | cull        | cull                             |
/// | non-opaque     | draw        | draw unless `cull_non_opaque`    |
#[inline]
pub fn face_visible(me: &FaceSide, neighbor: Option<&FaceSide>) -> bool {
    let Some(nb) = neighbor else {
        return true;
    };
    if nb.id == me.id || nb.info.class.is_opaque() {
        return false;
    }
    me.info.class.is_opaque() || !me.info.cull_non_opaque
}

#[cfg(test)]
mod tests {
    use super::*;
    use chisel_shape::RenderClass;

    fn side(id: u32, class: RenderClass, cull_non_opaque: bool) -> FaceSide {
        FaceSide {
            id: MaterialId(id),
            info: RenderInfo {
                class,
                cull_non_opaque,
                color_map: 0,
            },
        }
    }

    #[test]
    fn policy_table() {
        let stone = side(1, RenderClass::Opaque, false);
        let dirt = side(2, RenderClass::Opaque, false);
        let glass = side(3, RenderClass::Transparent, false);
        let water = side(4, RenderClass::Liquid, true);
        let ice = side(5, RenderClass::Transparent, true);

        assert!(face_visible(&stone, None));
        assert!(face_visible(&glass, None));
        assert!(!face_visible(&stone, Some(&stone)));
        assert!(!face_visible(&glass, Some(&glass)));
        assert!(!face_visible(&stone, Some(&dirt)));
        assert!(!face_visible(&glass, Some(&stone)));
        assert!(face_visible(&stone, Some(&glass)));
        assert!(face_visible(&glass, Some(&water)));
        assert!(!face_visible(&water, Some(&glass)));
        assert!(!face_visible(&ice, Some(&water)));
    }
}
