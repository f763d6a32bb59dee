use chisel_edit::{CellData, ChiselCell, EditMode, EditOutcome};
use chisel_shape::{CellPos, MaterialId, VoxelLattice, VoxelRegion, compress};
use proptest::prelude::*;

fn edit_strategy() -> impl Strategy<Value = (VoxelRegion, EditMode)> {
    let region = (prop::array::uniform3(-2i32..16), prop::array::uniform3(1i32..9))
        .prop_map(|(min, size)| VoxelRegion::new(min, size));
    let mode = prop_oneof![
        (1u32..5).prop_map(|m| EditMode::Add(MaterialId(m))),
        Just(EditMode::Remove),
        (1u32..5).prop_map(|m| EditMode::Paint(MaterialId(m))),
    ];
    (region, mode)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn edits_keep_the_cell_consistent(edits in prop::collection::vec(edit_strategy(), 1..12)) {
        let pos = CellPos::new(0, 0, 0);
        let mut cell = ChiselCell::solid(pos, MaterialId(1));
        let mut expected = cell.lattice();
        for (region, mode) in edits {
            let before = cell.lattice();
            // new materials are appended to the table
            let table = cell.materials();
            let index = |id: MaterialId| table.index_of(id).unwrap_or(table.len() as u8);
            match mode {
                EditMode::Add(id) => { expected.fill_region(&region, Some(index(id))); }
                EditMode::Remove => { expected.fill_region(&region, None); }
                EditMode::Paint(id) => { expected.paint_region(&region, index(id)); }
            }
            let outcome = cell.edit_voxels(&region, mode, None).unwrap();
            match outcome {
                EditOutcome::Unchanged => prop_assert_eq!(cell.lattice(), before),
                EditOutcome::Emptied => {
                    prop_assert!(cell.is_empty());
                    return Ok(());
                }
                EditOutcome::Changed => prop_assert!(!cell.is_empty()),
            }
            prop_assert_eq!(cell.lattice(), expected.clone());
            prop_assert_eq!(cell.volume() as usize, expected.occupied_count());
            prop_assert_eq!(cell.summary(), compress(&expected).summary);
        }

        let loaded = CellData::from_cell(&cell).into_cell(pos);
        prop_assert_eq!(loaded.cuboids(), cell.cuboids());
        prop_assert_eq!(loaded.summary(), cell.summary());
    }

    #[test]
    fn four_quarter_turns_restore_the_cell(min in prop::array::uniform3(0i32..12), degrees in prop::sample::select(vec![90, 180, 270, -90])) {
        let mut cell = ChiselCell::solid(CellPos::new(0, 0, 0), MaterialId(2));
        cell.edit_voxels(&VoxelRegion::brush(min, 4), EditMode::Remove, None).unwrap();
        let lattice: VoxelLattice = cell.lattice();
        let summary = cell.summary();
        for _ in 0..4 {
            cell.rotate(degrees).unwrap();
        }
        prop_assert_eq!(cell.rotation(), 0);
        prop_assert_eq!(cell.lattice(), lattice);
        prop_assert_eq!(cell.summary(), summary);
    }
}
