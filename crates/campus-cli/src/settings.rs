//! Config as loaded by the CLI, remembering whether it is safe to write back.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::warn;

use campus_core::Config;

pub struct LoadedConfig {
    pub config: Config,
    /// None when the file on disk could not be read; saving is then skipped
    /// so the user's file is left for them to fix.
    path: Option<PathBuf>,
}

impl LoadedConfig {
    pub fn load() -> Self {
        match Config::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                eprintln!("Warning: no config location: {:#}", e);
                Self {
                    config: Config::default(),
                    path: None,
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match Config::load_from(path) {
            Ok(config) => Self {
                config,
                path: Some(path.to_path_buf()),
            },
            Err(e) => {
                eprintln!("Warning: ignoring unreadable config: {:#}", e);
                Self {
                    config: Config::default(),
                    path: None,
                }
            }
        }
    }

    /// Write the config back. Returns false when writing was skipped.
    pub fn save(&self) -> Result<bool> {
        match &self.path {
            Some(path) => {
                self.config.save_to(path)?;
                Ok(true)
            }
            None => {
                warn!("Config was not loaded cleanly, leaving it untouched");
                Ok(false)
            }
        }
    }
}
