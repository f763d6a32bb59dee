use chisel_shape::{CuboidWithMaterial, FaceFlags, VoxelLattice, compress};
use proptest::prelude::*;

// A handful of random boxes painted over each other, last writer wins.
fn arb_lattice() -> impl Strategy<Value = VoxelLattice> {
    let arb_box = (0u8..16, 0u8..16, 0u8..16, 1u8..=8, 1u8..=8, 1u8..=8, 0u8..4).prop_map(
        |(x, y, z, sx, sy, sz, m)| {
            CuboidWithMaterial::new(
                [x, y, z],
                [(x + sx).min(16), (y + sy).min(16), (z + sz).min(16)],
                m,
            )
        },
    );
    prop::collection::vec(arb_box, 0..8).prop_map(|boxes| VoxelLattice::from_cuboids(&boxes))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Decompressing the cuboid list reproduces the lattice exactly
    #[test]
    fn compress_round_trips(lat in arb_lattice()) {
        let c = compress(&lat);
        prop_assert_eq!(VoxelLattice::from_cuboids(&c.cuboids), lat);
    }

    // Compressing the decompressed list gives the same list again
    #[test]
    fn compress_is_idempotent(lat in arb_lattice()) {
        let first = compress(&lat);
        let second = compress(&VoxelLattice::from_cuboids(&first.cuboids));
        prop_assert_eq!(first, second);
    }

    // Cuboids are valid, disjoint and add up to the occupied volume
    #[test]
    fn cuboids_partition_occupancy(lat in arb_lattice()) {
        let c = compress(&lat);
        let total: u32 = c.cuboids.iter().map(|b| b.volume()).sum();
        prop_assert_eq!(total as usize, lat.occupied_count());
        prop_assert_eq!(c.summary.occupied as usize, lat.occupied_count());
        for (i, a) in c.cuboids.iter().enumerate() {
            prop_assert!(a.is_valid());
            for b in &c.cuboids[i + 1..] {
                prop_assert!(!a.intersects(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    // Solid implies almost solid implies side AO
    #[test]
    fn face_flags_nest(lat in arb_lattice()) {
        let s = compress(&lat).summary;
        prop_assert_eq!(s.solid.bits() & !s.almost_solid.bits(), FaceFlags::NONE.bits());
        prop_assert_eq!(s.almost_solid.bits() & !s.side_ao.bits(), FaceFlags::NONE.bits());
    }
}
