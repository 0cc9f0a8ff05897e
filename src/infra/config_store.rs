// ============================================================
// Layer 6 — Run Config Store
// ============================================================
// Saves the RunConfig of a training run next to its metrics and
// loads run configs from JSON files given on the command line.
//
// File layout:
//   <output_dir>/
//     run_config.json   ← the RunConfig used for this run
//     metrics.csv       ← written by MetricsLogger
//
// Model weights are not persisted.

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::RunConfig;

pub const CONFIG_FILE: &str = "run_config.json";

pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn save_config(&self, cfg: &RunConfig) -> Result<()> {
        let path = self.config_path();
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved run config to '{}'", path.display());
        Ok(())
    }

    /// Load a RunConfig from any JSON file.
    pub fn load_config(path: impl AsRef<Path>) -> Result<RunConfig> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed run config in '{}'", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_config_loads_back() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("run")).unwrap();
        let cfg   = RunConfig { epochs: 3, seed: 9, ..RunConfig::default() };

        store.save_config(&cfg).unwrap();
        let loaded = ConfigStore::load_config(store.config_path()).unwrap();

        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigStore::load_config(dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("Cannot read config"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ \"epochs\": \"many\" }").unwrap();

        assert!(ConfigStore::load_config(&path).is_err());
    }
}
