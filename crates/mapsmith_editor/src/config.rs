use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EditorError, EditorResult};

/// Largest grid edge accepted from configuration
pub const MAX_GRID_SIZE: u32 = 1024;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub drawing: DrawingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Edge length of the square grid (16 for small builds, 256 for large)
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Oldest batches are dropped beyond this count; 0 keeps everything
    pub max_batches: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingConfig {
    /// Seed for tile-variant rolls. Unset means seeded from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub default_tile: u32,
    #[serde(default)]
    pub default_wall: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { size: 16 }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_batches: 100 }
    }
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            seed: None,
            default_tile: 0,
            default_wall: 0,
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            history: HistoryConfig::default(),
            drawing: DrawingConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> EditorResult<Self> {
        let config_str = std::fs::read_to_string(path).map_err(|e| {
            EditorError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&config_str)?;
        info!("Editor configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load from `path`, falling back to defaults if it is missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}; using default editor configuration", e);
                Self::default()
            }
        }
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(config_str: &str) -> EditorResult<Self> {
        let config: EditorConfig = toml::from_str(config_str)
            .map_err(|e| EditorError::ConfigError(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EditorResult<()> {
        if self.grid.size == 0 {
            return Err(EditorError::ConfigError("grid.size must be at least 1".to_string()));
        }
        if self.grid.size > MAX_GRID_SIZE {
            return Err(EditorError::ConfigError(format!(
                "grid.size must not exceed {}",
                MAX_GRID_SIZE
            )));
        }
        if self.grid.size != 16 && self.grid.size != 256 {
            warn!(
                "grid.size {} is neither of the standard 16 or 256 builds",
                self.grid.size
            );
        }
        Ok(())
    }
}
