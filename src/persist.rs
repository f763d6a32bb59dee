//! Cells on disk: one `CellData` TOML file per cell.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use chisel_edit::{CellData, ChiselCell};
use chisel_shape::CellPos;

pub fn cell_file_name(pos: CellPos) -> String {
    format!("cell_{}_{}_{}.toml", pos.x, pos.y, pos.z)
}

/// Position encoded in a `cell_X_Y_Z.toml` name, if it is one.
pub fn pos_from_file_name(path: &Path) -> Option<CellPos> {
    let stem = path.file_stem()?.to_str()?;
    let mut parts = stem.strip_prefix("cell_")?.split('_');
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    let z = parts.next()?.parse().ok()?;
    parts.next().is_none().then_some(CellPos::new(x, y, z))
}

pub fn save_cell(dir: &Path, cell: &ChiselCell) -> Result<PathBuf, Box<dyn Error>> {
    fs::create_dir_all(dir)?;
    let path = dir.join(cell_file_name(cell.pos()));
    let text = toml::to_string(&CellData::from_cell(cell))?;
    fs::write(&path, text).map_err(|e| format!("writing {}: {}", path.display(), e))?;
    log::debug!(target: "chisel", "saved {:?} to {}", cell.pos(), path.display());
    Ok(path)
}

/// Loads and repairs a saved cell. Files not named `cell_X_Y_Z.toml` load at the origin.
pub fn load_cell(path: &Path) -> Result<ChiselCell, Box<dyn Error>> {
    let text = fs::read_to_string(path).map_err(|e| format!("reading {}: {}", path.display(), e))?;
    let data: CellData = toml::from_str(&text)?;
    let pos = pos_from_file_name(path).unwrap_or(CellPos::new(0, 0, 0));
    Ok(data.into_cell(pos))
}
