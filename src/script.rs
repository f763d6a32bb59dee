//! TOML edit scripts: an ordered list of steps run against a [`ChiselRuntime`].
//!
//! ```toml
//! [[step]]
//! op = "add"
//! cell = [0, 0, 0]
//! at = [0, 0, 0]
//! size = 16            # brush edge, or [x, y, z]
//! material = "granite"
//!
//! [[step]]
//! op = "rotate"
//! cell = [0, 0, 0]
//! degrees = 90
//! ```

use std::error::Error;
use std::fs;
use std::path::Path;

use chisel_edit::{EditMode, EditOutcome};
use chisel_runtime::{ChiselRuntime, RuntimeError};
use chisel_shape::{Axis, CellPos, MaterialCatalog, MaterialId, VoxelRegion};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Script {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RegionSize {
    Brush(i32),
    Box([i32; 3]),
}

impl Default for RegionSize {
    fn default() -> Self {
        RegionSize::Brush(16)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Add {
        cell: [i32; 3],
        #[serde(default)]
        at: [i32; 3],
        #[serde(default)]
        size: RegionSize,
        material: String,
    },
    Remove {
        cell: [i32; 3],
        #[serde(default)]
        at: [i32; 3],
        #[serde(default)]
        size: RegionSize,
    },
    Paint {
        cell: [i32; 3],
        #[serde(default)]
        at: [i32; 3],
        #[serde(default)]
        size: RegionSize,
        material: String,
    },
    Rotate {
        cell: [i32; 3],
        degrees: i32,
    },
    Flip {
        cell: [i32; 3],
        axis: Axis,
    },
    Snow {
        cell: [i32; 3],
        level: u8,
    },
}

fn region(at: [i32; 3], size: RegionSize) -> VoxelRegion {
    match size {
        RegionSize::Brush(edge) => VoxelRegion::brush(at, edge),
        RegionSize::Box(size) => VoxelRegion::new(at, size),
    }
}

fn pos(cell: [i32; 3]) -> CellPos {
    CellPos::new(cell[0], cell[1], cell[2])
}

fn material(catalog: &MaterialCatalog, key: &str) -> Result<MaterialId, Box<dyn Error>> {
    Ok(catalog
        .get_id(key)
        .ok_or_else(|| format!("unknown material `{}`", key))?)
}

impl Script {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path).map_err(|e| format!("reading {}: {}", path.display(), e))?;
        Self::from_toml_str(&s)
    }

    /// Runs every step in order. Rejected edits (full material table, bad
    /// angle, missing cell) are logged and skipped; unknown materials abort.
    pub fn apply(&self, runtime: &mut ChiselRuntime, catalog: &MaterialCatalog) -> Result<usize, Box<dyn Error>> {
        let mut applied = 0;
        for (i, step) in self.steps.iter().enumerate() {
            match step.apply(runtime, catalog)? {
                Ok(outcome) => {
                    log::debug!(target: "chisel", "step {}: {:?}", i, outcome);
                    applied += 1;
                }
                Err(e) => log::warn!(target: "chisel", "step {} rejected: {}", i, e),
            }
        }
        Ok(applied)
    }
}

impl Step {
    fn apply(
        &self,
        runtime: &mut ChiselRuntime,
        catalog: &MaterialCatalog,
    ) -> Result<Result<EditOutcome, RuntimeError>, Box<dyn Error>> {
        Ok(match self {
            Step::Add { cell, at, size, material: key } => {
                let id = material(catalog, key)?;
                runtime.apply_edit(pos(*cell), &region(*at, *size), EditMode::Add(id))
            }
            Step::Remove { cell, at, size } => {
                runtime.apply_edit(pos(*cell), &region(*at, *size), EditMode::Remove)
            }
            Step::Paint { cell, at, size, material: key } => {
                let id = material(catalog, key)?;
                runtime.apply_edit(pos(*cell), &region(*at, *size), EditMode::Paint(id))
            }
            Step::Rotate { cell, degrees } => runtime.rotate(pos(*cell), *degrees).map(|_| EditOutcome::Changed),
            Step::Flip { cell, axis } => runtime.flip(pos(*cell), *axis).map(|_| EditOutcome::Changed),
            Step::Snow { cell, level } => runtime.set_snow_level(pos(*cell), *level).map(|_| EditOutcome::Changed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> MaterialCatalog {
        MaterialCatalog::from_toml_str("[materials]\ngranite = [0, 0]\nsnow = [3, 0]\n").unwrap()
    }

    const SCRIPT: &str = r#"
        [[step]]
        op = "add"
        cell = [0, 0, 0]
        size = [16, 8, 16]
        material = "granite"

        [[step]]
        op = "remove"
        cell = [0, 0, 0]
        at = [0, 4, 0]
        size = 4

        [[step]]
        op = "rotate"
        cell = [0, 0, 0]
        degrees = 45

        [[step]]
        op = "flip"
        cell = [0, 0, 0]
        axis = "x"
    "#;

    #[test]
    fn parses_every_step_shape() {
        let script = Script::from_toml_str(SCRIPT).unwrap();
        assert_eq!(script.steps.len(), 4);
        assert_eq!(
            script.steps[1],
            Step::Remove { cell: [0, 0, 0], at: [0, 4, 0], size: RegionSize::Brush(4) }
        );
        assert_eq!(script.steps[3], Step::Flip { cell: [0, 0, 0], axis: Axis::X });
    }

    #[test]
    fn rejected_steps_are_skipped() {
        let script = Script::from_toml_str(SCRIPT).unwrap();
        let mut rt = ChiselRuntime::new(1).unwrap();
        let applied = script.apply(&mut rt, &catalog()).unwrap();
        // the 45 degree rotation is refused
        assert_eq!(applied, 3);
        let cell = rt.cell(CellPos::new(0, 0, 0)).unwrap();
        assert_eq!(cell.volume(), 16 * 8 * 16 - 64);
        assert_eq!(cell.rotation(), 0);
    }

    #[test]
    fn unknown_material_aborts() {
        let script = Script::from_toml_str("[[step]]\nop = \"add\"\ncell = [0, 0, 0]\nmaterial = \"lava\"").unwrap();
        let mut rt = ChiselRuntime::new(1).unwrap();
        assert!(script.apply(&mut rt, &catalog()).is_err());
    }
}
