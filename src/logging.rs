use std::error::Error;
use std::fs::File;
use std::path::Path;

use log::LevelFilter;

/// Installs env_logger (honoring `RUST_LOG`, else `level`), or a file logger
/// at `level` when `log_file` is given.
pub fn init(level: &str, log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    match log_file {
        Some(path) => {
            let filter = level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info);
            let file = File::create(path).map_err(|e| format!("creating {}: {}", path.display(), e))?;
            let config = simplelog::ConfigBuilder::new()
                .set_target_level(LevelFilter::Error)
                .build();
            simplelog::WriteLogger::init(filter, config, file)?;
        }
        None => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).try_init()?;
        }
    }
    Ok(())
}
