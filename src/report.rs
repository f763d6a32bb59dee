use std::fmt::Write as _;

use chisel_edit::ChiselCell;
use chisel_mesh_cpu::CellMesh;
use chisel_shape::{Face, FaceFlags, MaterialCatalog};

fn face_name(face: Face) -> &'static str {
    match face {
        Face::PosY => "+y",
        Face::NegY => "-y",
        Face::PosX => "+x",
        Face::NegX => "-x",
        Face::PosZ => "+z",
        Face::NegZ => "-z",
    }
}

pub fn flags(f: FaceFlags) -> String {
    if f == FaceFlags::NONE {
        return "-".to_string();
    }
    f.iter().map(face_name).collect::<Vec<_>>().join(",")
}

/// One block of text describing a cell and its mesh.
pub fn cell_report(cell: &ChiselCell, mesh: Option<&CellMesh>, catalog: &MaterialCatalog) -> String {
    let p = cell.pos();
    let summary = cell.summary();
    let mut out = String::new();
    let _ = writeln!(out, "cell ({}, {}, {})", p.x, p.y, p.z);
    let _ = writeln!(out, "  cuboids      {}", cell.cuboids().len());
    let _ = writeln!(out, "  volume       {}/4096", cell.volume());
    let names: Vec<&str> = cell
        .materials()
        .as_slice()
        .iter()
        .map(|id| catalog.get(*id).map_or("?", |d| d.key.as_str()))
        .collect();
    let _ = writeln!(out, "  materials    {}", names.join(" "));
    let _ = writeln!(out, "  rotation     {}", cell.rotation());
    let _ = writeln!(out, "  solid        {}", flags(summary.solid));
    let _ = writeln!(out, "  almost solid {}", flags(summary.almost_solid));
    let _ = writeln!(out, "  side ao      {}", flags(summary.side_ao));
    if let Some(overlay) = cell.overlay() {
        let _ = writeln!(
            out,
            "  snow         level {}, {} on shape, {} on ground",
            cell.snow_level(),
            overlay.on_shape.len(),
            overlay.on_ground.len()
        );
    }
    if let Some(mesh) = mesh {
        let _ = writeln!(out, "  quads        {} ({} triangles)", mesh.quads, mesh.triangle_count());
    }
    out
}
