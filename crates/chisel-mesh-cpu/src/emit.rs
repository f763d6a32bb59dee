use std::collections::HashMap;

use chisel_shape::RenderClass;

use crate::mesh_build::MeshBuild;

// Sink for writing into per-render-class mesh buffers.
pub trait BuildSink {
    fn get_build_mut(&mut self, class: RenderClass) -> &mut MeshBuild;
}

impl BuildSink for HashMap<RenderClass, MeshBuild> {
    #[inline]
    fn get_build_mut(&mut self, class: RenderClass) -> &mut MeshBuild {
        self.entry(class).or_insert_with(|| {
            // Lazy small reserve to reduce early reallocs when a class is first used in a cell
            const INITIAL_QUAD_CAP: usize = 64;
            let mut mb = MeshBuild::default();
            mb.reserve_quads(INITIAL_QUAD_CAP);
            mb
        })
    }
}
