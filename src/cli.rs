use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::ChiselConfig;

#[derive(Parser, Debug)]
#[command(name = "chisel")]
#[command(about = "Chiseled cell editing and meshing tool", long_about = None)]
pub struct Cli {
    /// Config file (defaults to ./chisel.toml when present)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Material catalog, overrides the config's `materials`
    #[arg(long, short = 'm', value_name = "PATH")]
    pub materials: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Mesh worker threads, overrides the config (0 = all cores)
    #[arg(long)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply an edit script to an empty grid and report every cell
    Run {
        script: PathBuf,

        /// Save each resulting cell as `cell_X_Y_Z.toml` here
        #[arg(long, value_name = "DIR")]
        save_dir: Option<PathBuf>,
    },
    /// Load a saved cell, repair it and report its shape
    Inspect {
        cell: PathBuf,

        /// Selection grid size in voxels (1, 2, 4, 8 or 16)
        #[arg(long, default_value_t = 16)]
        grid: u8,
    },
}

impl Cli {
    /// Flags win over the config file.
    pub fn apply_to(&self, cfg: &mut ChiselConfig) {
        if let Some(path) = &self.materials {
            cfg.materials = Some(path.clone());
        }
        if let Some(workers) = self.workers {
            cfg.workers = workers;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from(["chisel", "--materials", "m.toml", "--workers", "3", "run", "s.toml"]);
        let mut cfg = ChiselConfig::default();
        cli.apply_to(&mut cfg);
        assert_eq!(cfg.materials, Some(PathBuf::from("m.toml")));
        assert_eq!(cfg.workers, 3);
        assert!(matches!(cli.command, Command::Run { save_dir: None, .. }));
    }

    #[test]
    fn inspect_defaults_to_exact_boxes() {
        let cli = Cli::parse_from(["chisel", "inspect", "cell.toml"]);
        assert!(matches!(cli.command, Command::Inspect { grid: 16, .. }));
    }
}
