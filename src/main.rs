mod cli;
mod config;
mod logging;
mod persist;
mod report;
mod script;

use std::error::Error;
use std::path::Path;

use chisel_runtime::ChiselRuntime;
use chisel_shape::MaterialCatalog;
use clap::Parser;

use crate::cli::{Cli, Command};
use crate::config::ChiselConfig;
use crate::script::Script;

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let mut cfg = match &cli.config {
        Some(path) => ChiselConfig::load(path)?,
        None => ChiselConfig::load_default()?,
    };
    cli.apply_to(&mut cfg);
    logging::init(&cfg.log_level, cli.log_file.as_deref())?;

    match &cli.command {
        Command::Run { script, save_dir } => run(&cfg, script, save_dir.as_deref()),
        Command::Inspect { cell, grid } => inspect(&cfg, cell, *grid),
    }
}

fn load_catalog(cfg: &ChiselConfig) -> Result<MaterialCatalog, Box<dyn Error>> {
    match &cfg.materials {
        Some(path) => {
            Ok(MaterialCatalog::from_path(path).map_err(|e| format!("{}: {}", path.display(), e))?)
        }
        None => {
            log::warn!(target: "chisel", "no material catalog configured, all materials render opaque");
            Ok(MaterialCatalog::new())
        }
    }
}

fn build_runtime(cfg: &ChiselConfig, catalog: &MaterialCatalog) -> Result<ChiselRuntime, Box<dyn Error>> {
    let mut runtime = ChiselRuntime::new(cfg.workers)?.with_default_snow(cfg.snow_level);
    if let Some(key) = &cfg.snow_material {
        let id = catalog
            .get_id(key)
            .ok_or_else(|| format!("snow material `{}` is not in the catalog", key))?;
        runtime = runtime.with_snow_material(id);
    }
    Ok(runtime)
}

fn run(cfg: &ChiselConfig, script_path: &Path, save_dir: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let catalog = load_catalog(cfg)?;
    let mut runtime = build_runtime(cfg, &catalog)?;
    let script = Script::load(script_path)?;
    let applied = script.apply(&mut runtime, &catalog)?;
    let meshed = runtime.remesh_dirty(&catalog);
    log::info!(
        target: "chisel",
        "{}: {}/{} steps applied, {} cells meshed",
        script_path.display(),
        applied,
        script.steps.len(),
        meshed.meshed
    );

    for pos in runtime.grid().positions() {
        let Some(cell) = runtime.cell(pos) else {
            continue;
        };
        print!("{}", report::cell_report(cell, runtime.mesh(pos), &catalog));
        if let Some(dir) = save_dir {
            persist::save_cell(dir, cell)?;
        }
    }
    let stats = runtime.revision_stats();
    println!(
        "{} cells, {} quads, {} tracked revisions",
        runtime.grid().len(),
        meshed.quads,
        stats.rev_entries
    );
    Ok(())
}

fn inspect(cfg: &ChiselConfig, path: &Path, grid: u8) -> Result<(), Box<dyn Error>> {
    if !matches!(grid, 1 | 2 | 4 | 8 | 16) {
        return Err(format!("grid size {} must be 1, 2, 4, 8 or 16", grid).into());
    }
    let catalog = load_catalog(cfg)?;
    let cell = persist::load_cell(path)?;
    let pos = cell.pos();
    let boxes = cell.selection_boxes(grid);

    // meshed alone, with nothing around it
    let mut runtime = build_runtime(cfg, &catalog)?;
    runtime.insert_cell(cell);
    runtime.remesh_dirty(&catalog);
    let Some(cell) = runtime.cell(pos) else {
        println!("{}: empty cell", path.display());
        return Ok(());
    };
    print!("{}", report::cell_report(cell, runtime.mesh(pos), &catalog));
    println!("  boxes (grid {}): {}", grid, boxes.len());
    for b in &boxes {
        println!(
            "    [{:.4} {:.4} {:.4}] .. [{:.4} {:.4} {:.4}]",
            b.min.x, b.min.y, b.min.z, b.max.x, b.max.y, b.max.z
        );
    }
    Ok(())
}
