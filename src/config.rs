use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const DEFAULT_CONFIG: &str = "chisel.toml";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChiselConfig {
    pub log_level: String,
    /// Material catalog TOML.
    pub materials: Option<PathBuf>,
    /// Mesh worker threads; 0 uses every core.
    pub workers: usize,
    /// Snow depth given to cells created by edits.
    pub snow_level: u8,
    /// Catalog key snow overlays are drawn with.
    pub snow_material: Option<String>,
}

impl Default for ChiselConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            materials: None,
            workers: 0,
            snow_level: 0,
            snow_material: None,
        }
    }
}

impl ChiselConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path).map_err(|e| format!("reading {}: {}", path.display(), e))?;
        let mut cfg = Self::from_toml_str(&s)?;
        // catalog paths are relative to the config file
        if let (Some(m), Some(dir)) = (cfg.materials.as_mut(), path.parent()) {
            if m.is_relative() {
                *m = dir.join(&*m);
            }
        }
        Ok(cfg)
    }

    /// Loads `chisel.toml` from the working directory, or defaults when absent.
    pub fn load_default() -> Result<Self, Box<dyn Error>> {
        let path = Path::new(DEFAULT_CONFIG);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let cfg = ChiselConfig::from_toml_str("workers = 4\nsnow_material = \"snow\"").unwrap();
        assert_eq!(cfg.workers, 4);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.snow_material.as_deref(), Some("snow"));
        assert_eq!(cfg.snow_level, 0);
    }

    #[test]
    fn unknown_field_types_are_rejected() {
        assert!(ChiselConfig::from_toml_str("workers = \"many\"").is_err());
    }
}
