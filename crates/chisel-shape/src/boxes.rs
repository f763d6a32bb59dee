//! Selection/collision boxes derived from the cuboid list.

use chisel_geom::Aabb;
use hashbrown::HashSet;

use crate::LATTICE_SIZE;
use crate::cuboid::CuboidWithMaterial;

/// Grid size that yields one exact box per cuboid.
pub const DEFAULT_GRID_SIZE: u8 = LATTICE_SIZE as u8;

/// Interaction boxes in cell space.
///
/// `grid_size` is the edge, in voxels, of one interaction unit. At the default
/// of 16 every cuboid maps to its own exact box. Smaller sizes snap each cuboid
/// to the grid and emit one unit box per covered grid step, skipping units
/// that would leave the cell. Duplicates are removed; first occurrence wins.
pub fn derive_boxes(cuboids: &[CuboidWithMaterial], grid_size: u8) -> Vec<Aabb> {
    let lat = LATTICE_SIZE as u8;
    let g = grid_size.clamp(1, lat);
    let mut seen: HashSet<[u8; 6]> = HashSet::new();
    let mut out = Vec::new();
    if g == lat {
        for c in cuboids {
            let key = [c.x1, c.y1, c.z1, c.x2, c.y2, c.z2];
            if seen.insert(key) {
                out.push(c.aabb());
            }
        }
        return out;
    }
    for c in cuboids {
        let (sx, sy, sz) = (c.x1 - c.x1 % g, c.y1 - c.y1 % g, c.z1 - c.z1 % g);
        for y in (sy..c.y2).step_by(g as usize) {
            for z in (sz..c.z2).step_by(g as usize) {
                for x in (sx..c.x2).step_by(g as usize) {
                    let (ex, ey, ez) = (x + g, y + g, z + g);
                    if ex > lat || ey > lat || ez > lat {
                        continue;
                    }
                    if seen.insert([x, y, z, ex, ey, ez]) {
                        out.push(Aabb::from_voxels([x, y, z], [ex, ey, ez], lat));
                    }
                }
            }
        }
    }
    out
}
