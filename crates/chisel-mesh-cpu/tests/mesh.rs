use std::collections::HashMap;

use chisel_geom::Vec3;
use chisel_mesh_cpu::{
    AtlasRect, CellMesh, MaterialResolver, MeshBuild, MeshInput, MeshScratch, RenderInfo,
    TextureVariant, mesh_cell,
};
use chisel_shape::{
    CuboidWithMaterial, Face, MaterialId, NeighborCell, Neighborhood, RenderClass, VoxelLattice,
    VoxelRegion, compress, compute_snow,
};

const STONE: MaterialId = MaterialId(1);
const DIRT: MaterialId = MaterialId(2);
const GLASS: MaterialId = MaterialId(3);
const SNOW: MaterialId = MaterialId(4);

struct TestResolver {
    classes: HashMap<MaterialId, RenderClass>,
}

impl TestResolver {
    fn new() -> Self {
        let mut classes = HashMap::new();
        classes.insert(GLASS, RenderClass::Transparent);
        Self { classes }
    }
}

impl MaterialResolver for TestResolver {
    fn render_info(&self, id: MaterialId) -> RenderInfo {
        RenderInfo {
            class: self.classes.get(&id).copied().unwrap_or_default(),
            cull_non_opaque: false,
            color_map: 0,
        }
    }

    fn resolve_face(&self, _id: MaterialId, _face: Face, _variant: TextureVariant) -> AtlasRect {
        AtlasRect::FULL
    }
}

fn quad_area(mb: &MeshBuild, quad: usize) -> f32 {
    let p = |i: usize| {
        let i = (quad * 4 + i) * 3;
        Vec3::new(mb.pos[i], mb.pos[i + 1], mb.pos[i + 2])
    };
    (p(1) - p(0)).cross(p(3) - p(0)).length()
}

fn total_area(mesh: &CellMesh) -> f32 {
    mesh.parts
        .values()
        .map(|mb| (0..mb.vertex_count() / 4).map(|q| quad_area(mb, q)).sum::<f32>())
        .sum()
}

fn mesh(input: MeshInput<'_>) -> CellMesh {
    let mut scratch = MeshScratch::new();
    mesh_cell(input, &TestResolver::new(), &mut scratch)
}

#[test]
fn lone_full_cell_is_six_quads() {
    let cuboids = [CuboidWithMaterial::full(0)];
    let materials = [STONE];
    let m = mesh(MeshInput::new(&cuboids, &materials));
    assert_eq!(m.quads, 6);
    assert_eq!(m.triangle_count(), 12);
    assert!((total_area(&m) - 6.0).abs() < 1e-4);
}

#[test]
fn fully_enclosed_cell_emits_nothing() {
    let cuboids = [CuboidWithMaterial::full(0)];
    let materials = [STONE];
    let nb = NeighborCell {
        cuboids: &cuboids,
        materials: &materials,
    };
    let mut hood = Neighborhood::empty();
    for face in Face::ALL {
        hood = hood.with(face, nb);
    }
    let m = mesh(MeshInput::new(&cuboids, &materials).with_neighbors(hood));
    assert_eq!(m.quads, 0);
    assert!(m.is_empty());
}

#[test]
fn absent_neighbor_leaves_shared_face_drawn() {
    let cuboids = [CuboidWithMaterial::full(0)];
    let materials = [STONE];
    let nb = NeighborCell {
        cuboids: &cuboids,
        materials: &materials,
    };
    let mut hood = Neighborhood::empty();
    for face in Face::ALL.into_iter().filter(|f| *f != Face::NegZ) {
        hood = hood.with(face, nb);
    }
    let m = mesh(MeshInput::new(&cuboids, &materials).with_neighbors(hood));
    assert_eq!(m.quads, 1);
    let mb = m.part(RenderClass::Opaque).cloned().unwrap_or_default();
    assert!(mb.norm.chunks(3).all(|n| n == [0.0, 0.0, -1.0]));
}

#[test]
fn half_height_neighbor_occludes_half_the_face() {
    let cuboids = [CuboidWithMaterial::full(0)];
    let materials = [STONE];
    let slab = [CuboidWithMaterial::new([0, 0, 0], [16, 8, 16], 0)];
    let hood = Neighborhood::empty().with(
        Face::PosX,
        NeighborCell {
            cuboids: &slab,
            materials: &[DIRT],
        },
    );
    let m = mesh(MeshInput::new(&cuboids, &materials).with_neighbors(hood));
    assert_eq!(m.quads, 6);
    assert!((total_area(&m) - 5.5).abs() < 1e-4);
}

#[test]
fn neighbor_cuboids_off_the_boundary_do_not_occlude() {
    let cuboids = [CuboidWithMaterial::full(0)];
    let materials = [STONE];
    // neighbor on +X holds a box that does not reach its x = 0 plane
    let floating = [CuboidWithMaterial::new([1, 0, 0], [16, 16, 16], 0)];
    let hood = Neighborhood::empty().with(
        Face::PosX,
        NeighborCell {
            cuboids: &floating,
            materials: &[STONE],
        },
    );
    let m = mesh(MeshInput::new(&cuboids, &materials).with_neighbors(hood));
    assert_eq!(m.quads, 6);
}

#[test]
fn transparent_neighbor_shows_the_stone_face() {
    let cuboids = [CuboidWithMaterial::full(0)];
    let materials = [STONE];
    let glass = [CuboidWithMaterial::full(0)];
    let hood = Neighborhood::empty().with(
        Face::PosY,
        NeighborCell {
            cuboids: &glass,
            materials: &[GLASS],
        },
    );
    let m = mesh(MeshInput::new(&cuboids, &materials).with_neighbors(hood));
    assert_eq!(m.quads, 6);
}

#[test]
fn glass_against_stone_is_hidden_but_not_the_reverse() {
    let mut lat = VoxelLattice::new();
    lat.fill_region(&VoxelRegion::new([0, 0, 0], [8, 16, 16]), Some(0));
    lat.fill_region(&VoxelRegion::new([8, 0, 0], [8, 16, 16]), Some(1));
    let cuboids = compress(&lat).cuboids;
    let materials = [STONE, GLASS];
    let m = mesh(MeshInput::new(&cuboids, &materials));
    // stone: 5 outer faces plus the one facing glass; glass: 5 outer faces
    assert_eq!(m.part(RenderClass::Opaque).map(|p| p.vertex_count() / 4), Some(6));
    assert_eq!(m.part(RenderClass::Transparent).map(|p| p.vertex_count() / 4), Some(5));
}

#[test]
fn two_opaque_halves_hide_their_shared_wall() {
    let cuboids = [
        CuboidWithMaterial::new([0, 0, 0], [8, 16, 16], 0),
        CuboidWithMaterial::new([8, 0, 0], [16, 16, 16], 1),
    ];
    let materials = [STONE, DIRT];
    let m = mesh(MeshInput::new(&cuboids, &materials));
    assert_eq!(m.quads, 10);
    assert!((total_area(&m) - 6.0).abs() < 1e-4);
}

#[test]
fn same_material_cuboids_merge_across_their_seam() {
    // a stepped shape split into two cuboids of one material
    let cuboids = [
        CuboidWithMaterial::new([0, 0, 0], [16, 8, 16], 0),
        CuboidWithMaterial::new([0, 8, 0], [8, 16, 16], 0),
    ];
    let materials = [STONE];
    let m = mesh(MeshInput::new(&cuboids, &materials));
    // -X and -Y span both cuboids as one rectangle each; the L-shaped Z sides
    // take two; +X and +Y each have a hull part and a step part
    assert_eq!(m.quads, 10);
    assert!((total_area(&m) - 5.5).abs() < 1e-4);
}

#[test]
fn snow_overlay_covers_slab_top() {
    let mut lat = VoxelLattice::new();
    lat.fill_region(&VoxelRegion::new([0, 0, 0], [16, 8, 16]), Some(0));
    let cuboids = compress(&lat).cuboids;
    let materials = [STONE];
    let overlay = compute_snow(&lat, 1, None);
    let m = mesh(MeshInput::new(&cuboids, &materials).with_overlay(&overlay, SNOW));
    // slab: 5 faces (top hidden by snow); snow layer: 5 faces (bottom hidden by slab)
    assert_eq!(m.quads, 10);
}

#[test]
fn positions_are_offset_by_cell_origin() {
    let cuboids = [CuboidWithMaterial::new([0, 0, 0], [1, 1, 1], 0)];
    let materials = [STONE];
    let m = mesh(MeshInput::new(&cuboids, &materials).at(Vec3::new(3.0, 0.0, -2.0)));
    let mb = m.part(RenderClass::Opaque).cloned().unwrap_or_default();
    for p in mb.pos.chunks(3) {
        assert!(p[0] >= 3.0 && p[0] <= 3.0625);
        assert!(p[2] >= -2.0 && p[2] <= -1.9375);
    }
}

#[test]
fn scratch_reuse_matches_fresh_scratch() {
    let resolver = TestResolver::new();
    let mut scratch = MeshScratch::new();
    let big = [CuboidWithMaterial::full(0)];
    let small = [CuboidWithMaterial::new([2, 2, 2], [5, 9, 4], 0)];
    let materials = [DIRT];
    let _ = mesh_cell(MeshInput::new(&big, &materials), &resolver, &mut scratch);
    let reused = mesh_cell(MeshInput::new(&small, &materials), &resolver, &mut scratch);
    let fresh = mesh(MeshInput::new(&small, &materials));
    assert_eq!(reused.quads, fresh.quads);
    assert_eq!(
        reused.part(RenderClass::Opaque).map(|p| p.pos.clone()),
        fresh.part(RenderClass::Opaque).map(|p| p.pos.clone())
    );
}
