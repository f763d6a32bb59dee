use chisel_geom::Vec3;
use chisel_shape::Face;

use crate::resolver::AtlasRect;

#[derive(Default, Clone, Debug)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub uv: Vec<f32>,
    pub idx: Vec<u16>,
    pub col: Vec<u8>,
    /// Climate/season color-map index per vertex (0 = untinted).
    pub color_map: Vec<u8>,
}

impl MeshBuild {
    /// Clears all arrays but retains capacity for reuse across rebuilds.
    #[inline]
    pub fn clear_keep_capacity(&mut self) {
        self.pos.clear();
        self.norm.clear();
        self.uv.clear();
        self.idx.clear();
        self.col.clear();
        self.color_map.clear();
    }

    /// Pre-reserve capacity for approximately `n_quads` quads worth of data.
    #[inline]
    pub fn reserve_quads(&mut self, n_quads: usize) {
        // 4 vertices per quad
        self.pos.reserve(n_quads * 4 * 3);
        self.norm.reserve(n_quads * 4 * 3);
        self.uv.reserve(n_quads * 4 * 2);
        self.col.reserve(n_quads * 4 * 4);
        self.color_map.reserve(n_quads * 4);
        self.idx.reserve(n_quads * 6);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.idx.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    /// Appends a quad with explicit per-vertex UVs, wound to face along `n`.
    /// Returns false when the 16-bit index space is exhausted.
    pub fn add_quad_uv(
        &mut self,
        a: Vec3,
        b: Vec3,
        c: Vec3,
        d: Vec3,
        n: Vec3,
        mut uvs: [(f32, f32); 4],
        rgba: [u8; 4],
        color_map: u8,
    ) -> bool {
        let base = self.vertex_count();
        if base + 4 > u16::MAX as usize + 1 {
            return false;
        }
        let mut vs = [a, d, c, b];
        let e1 = vs[1] - vs[0];
        let e2 = vs[2] - vs[0];
        if e1.cross(e2).dot(n) < 0.0 {
            vs.swap(1, 3);
            uvs.swap(1, 3);
        }
        for i in 0..4 {
            self.pos.extend_from_slice(&[vs[i].x, vs[i].y, vs[i].z]);
            self.norm.extend_from_slice(&[n.x, n.y, n.z]);
            self.uv.extend_from_slice(&[uvs[i].0, uvs[i].1]);
            self.col.extend_from_slice(&rgba);
            self.color_map.push(color_map);
        }
        let base = base as u16;
        self.idx
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        true
    }

    /// Emits a face-aligned rectangle for `face` at `origin` spanning `(u1, v1)`
    /// along the face's in-plane axes: Y faces span (x, z), X faces (z, y),
    /// Z faces (x, y). `tex` is the atlas rectangle and `local` the rectangle's
    /// position and size inside the cell, in `0..=1`, used to pick the matching
    /// part of the tile.
    pub fn add_face_rect(
        &mut self,
        face: Face,
        origin: Vec3,
        u1: f32,
        v1: f32,
        tex: AtlasRect,
        local: [f32; 4],
        rgba: [u8; 4],
        color_map: u8,
    ) -> bool {
        let n = face.normal();
        let o = origin;
        let (a, b, c, d) = match face {
            Face::PosY => (
                o,
                Vec3::new(o.x + u1, o.y, o.z),
                Vec3::new(o.x + u1, o.y, o.z + v1),
                Vec3::new(o.x, o.y, o.z + v1),
            ),
            Face::NegY => (
                Vec3::new(o.x, o.y, o.z + v1),
                Vec3::new(o.x + u1, o.y, o.z + v1),
                Vec3::new(o.x + u1, o.y, o.z),
                o,
            ),
            Face::PosX => (
                Vec3::new(o.x, o.y + v1, o.z + u1),
                Vec3::new(o.x, o.y + v1, o.z),
                o,
                Vec3::new(o.x, o.y, o.z + u1),
            ),
            Face::NegX => (
                Vec3::new(o.x, o.y + v1, o.z),
                Vec3::new(o.x, o.y + v1, o.z + u1),
                Vec3::new(o.x, o.y, o.z + u1),
                o,
            ),
            Face::PosZ => (
                Vec3::new(o.x + u1, o.y + v1, o.z),
                Vec3::new(o.x, o.y + v1, o.z),
                o,
                Vec3::new(o.x + u1, o.y, o.z),
            ),
            Face::NegZ => (
                Vec3::new(o.x, o.y + v1, o.z),
                Vec3::new(o.x + u1, o.y + v1, o.z),
                Vec3::new(o.x + u1, o.y, o.z),
                o,
            ),
        };
        let [lu, lv, lw, lh] = local;
        let uv_from = |p: Vec3| {
            let (pu, pv) = match face {
                Face::PosY | Face::NegY => (p.x - o.x, p.z - o.z),
                Face::PosX | Face::NegX => (p.z - o.z, p.y - o.y),
                Face::PosZ | Face::NegZ => (p.x - o.x, p.y - o.y),
            };
            let s = lu + if u1 > 0.0 { pu / u1 * lw } else { 0.0 };
            let t = lv + if v1 > 0.0 { pv / v1 * lh } else { 0.0 };
            // side faces: texture rows run top to bottom
            match face {
                Face::PosY | Face::NegY => tex.lerp(s, t),
                _ => tex.lerp(s, 1.0 - t),
            }
        };
        let uvs = [uv_from(a), uv_from(d), uv_from(c), uv_from(b)];
        self.add_quad_uv(a, b, c, d, n, uvs, rgba, color_map)
    }

    /// Returns a slice of interleaved vertex positions (x,y,z per vertex).
    pub fn positions(&self) -> &[f32] {
        &self.pos
    }
    /// Returns a slice of interleaved vertex normals (x,y,z per vertex).
    pub fn normals(&self) -> &[f32] {
        &self.norm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quads_wind_along_their_normal() {
        for face in Face::ALL {
            let mut mb = MeshBuild::default();
            assert!(mb.add_face_rect(
                face,
                Vec3::ZERO,
                0.5,
                0.25,
                AtlasRect::FULL,
                [0.0, 0.0, 0.5, 0.25],
                [255; 4],
                0
            ));
            let p = |i: usize| Vec3::new(mb.pos[i * 3], mb.pos[i * 3 + 1], mb.pos[i * 3 + 2]);
            let (i0, i1, i2) = (mb.idx[0] as usize, mb.idx[1] as usize, mb.idx[2] as usize);
            let cross = (p(i1) - p(i0)).cross(p(i2) - p(i0));
            assert!(cross.dot(face.normal()) > 0.0, "{face:?}");
            assert_eq!(mb.triangle_count(), 2);
        }
    }

    #[test]
    fn uvs_stay_inside_the_tile() {
        let tex = AtlasRect::tile([2, 1], 4);
        let mut mb = MeshBuild::default();
        mb.add_face_rect(Face::PosX, Vec3::ZERO, 1.0, 1.0, tex, [0.0, 0.0, 1.0, 1.0], [255; 4], 3);
        for uv in mb.uv.chunks(2) {
            assert!(uv[0] >= tex.u0 && uv[0] <= tex.u1);
            assert!(uv[1] >= tex.v0 && uv[1] <= tex.v1);
        }
        assert_eq!(mb.color_map, vec![3; 4]);
    }
}
