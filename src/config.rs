//! # Client Configuration
//!
//! Runtime settings loaded from a JSON file at startup.
//!
//! The file is looked up at the path in `VOXEL_CLIENT_CONFIG`, falling back to
//! `client.json` in the working directory. Without either, the defaults are used.
//! Every field is optional in the file; missing ones take their default.
//!
//! ```json
//! {
//!     "ticks_per_second": 30.0,
//!     "world": { "width": 64 },
//!     "player": { "motion": { "gravity": 0.06 } }
//! }
//! ```

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    engine_state::{
        physics::MotionProfile,
        rendering::draw_mode::DrawMode,
        voxels::{block::Block, world::MAX_WORLD_VOLUME},
    },
    error::ClientError,
};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "VOXEL_CLIENT_CONFIG";

/// Config file used when the environment variable is not set.
pub const DEFAULT_CONFIG_PATH: &str = "client.json";

/// Window creation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Initial inner width in physical pixels
    pub width: u32,
    /// Initial inner height in physical pixels
    pub height: u32,
    /// Window title
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 864,
            height: 480,
            title: "Voxel Client".to_string(),
        }
    }
}

/// Size of the generated world, in blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Blocks along X
    pub width: u32,
    /// Blocks along Y
    pub height: u32,
    /// Layers along Z
    pub depth: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            depth: 2,
        }
    }
}

/// Player body and motion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Where the player's feet start
    pub spawn: [f64; 3],
    /// Width, height and depth of the collision box
    pub size: [f64; 3],
    /// Speeds, gravity and damping
    pub motion: MotionProfile,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn: [0.5, 5.0, 1.5],
            size: [0.6, 1.8, 0.6],
            motion: MotionProfile::default(),
        }
    }
}

impl PlayerConfig {
    /// The spawn position as a vector.
    pub fn spawn(&self) -> Vector3<f64> {
        Vector3::from(self.spawn)
    }

    /// The collision box size as a vector.
    pub fn size(&self) -> Vector3<f64> {
        Vector3::from(self.size)
    }
}

/// Capacities of the geometry batch between flushes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Vertices staged before a flush
    pub vertex_capacity: usize,
    /// Indices staged before a flush
    pub index_capacity: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            vertex_capacity: 15000,
            index_capacity: 20000,
        }
    }
}

/// All runtime settings of the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Window title and initial size
    pub window: WindowConfig,
    /// Fixed simulation rate
    pub ticks_per_second: f64,
    /// World dimensions
    pub world: WorldConfig,
    /// Player spawn, size and motion
    pub player: PlayerConfig,
    /// Geometry batch capacities
    pub batch: BatchConfig,
    /// Directory holding `shaders/` and `textures/`
    pub asset_root: PathBuf,
    /// Block names selectable with the number keys, in slot order
    pub hotbar: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            ticks_per_second: 20.0,
            world: WorldConfig::default(),
            player: PlayerConfig::default(),
            batch: BatchConfig::default(),
            asset_root: PathBuf::from("assets"),
            hotbar: ["stone", "grass_block", "dirt", "cobblestone", "bedrock"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl ClientConfig {
    /// Loads the configuration from the environment-selected file, the default file,
    /// or the built-in defaults, in that order.
    ///
    /// # Returns
    /// A validated configuration, or the reason the chosen file cannot be used
    pub fn load() -> Result<Self, ClientError> {
        let config = match env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_path(Path::new(&path))?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_path(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => {
                log::info!("No config file found, using defaults");
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration file without validating it.
    pub fn from_path(path: &Path) -> Result<Self, ClientError> {
        let text = fs::read_to_string(path).map_err(|source| ClientError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ClientError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Checks the values that would otherwise fail later at runtime.
    pub fn validate(&self) -> Result<(), ClientError> {
        let invalid = |message: String| Err(ClientError::InvalidConfig(message));

        if !(self.ticks_per_second.is_finite() && self.ticks_per_second > 0.0) {
            return invalid(format!(
                "ticks_per_second must be positive, got {}",
                self.ticks_per_second
            ));
        }

        let WorldConfig {
            width,
            height,
            depth,
        } = self.world;
        if width == 0 || height == 0 || depth == 0 {
            return invalid(format!(
                "world dimensions must be non-zero, got {}x{}x{}",
                width, height, depth
            ));
        }
        let volume = u64::from(width) * u64::from(height) * u64::from(depth);
        if volume > MAX_WORLD_VOLUME {
            return invalid(format!(
                "world of {}x{}x{} blocks exceeds {} blocks",
                width, height, depth, MAX_WORLD_VOLUME
            ));
        }

        for mode in DrawMode::ALL {
            if self.batch.vertex_capacity < mode.primitive_vertices()
                || self.batch.index_capacity < mode.primitive_indices()
            {
                return invalid(format!(
                    "batch capacities {}/{} cannot hold one {:?} primitive",
                    self.batch.vertex_capacity, self.batch.index_capacity, mode
                ));
            }
        }

        if self.hotbar.is_empty() {
            return invalid("hotbar must name at least one block".to_string());
        }
        if let Some(unknown) = self.hotbar.iter().find(|name| Block::from_name(name).is_none()) {
            return invalid(format!("unknown hotbar block '{}'", unknown));
        }

        Ok(())
    }

    /// The hotbar as blocks. Names that do not resolve are skipped.
    pub fn hotbar_blocks(&self) -> Vec<Block> {
        self.hotbar
            .iter()
            .filter_map(|name| Block::from_name(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.hotbar_blocks().len(), 5);
        assert_eq!(config.hotbar_blocks()[1], Block::GrassBlock);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{ "world": { "width": 64 }, "hotbar": ["dirt"] }"#).unwrap();
        assert_eq!(config.world.width, 64);
        assert_eq!(config.world.depth, 2);
        assert_eq!(config.ticks_per_second, 20.0);
        assert_eq!(config.hotbar_blocks(), vec![Block::Dirt]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unusable_values() {
        let mut config = ClientConfig::default();
        config.ticks_per_second = 0.0;
        assert!(matches!(config.validate(), Err(ClientError::InvalidConfig(_))));

        let mut config = ClientConfig::default();
        config.world.depth = 0;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.world.width = u32::MAX;
        assert!(matches!(config.validate(), Err(ClientError::InvalidConfig(_))));

        let mut config = ClientConfig::default();
        config.world.width = 1 << 16;
        config.world.height = 1 << 16;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        // enough for quads, too small for a line loop
        config.batch.index_capacity = 6;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.hotbar.push("glass".to_string());
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.hotbar.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn file_errors_carry_the_path() {
        let missing = env::temp_dir().join("voxel-client-missing-config.json");
        match ClientConfig::from_path(&missing) {
            Err(ClientError::ConfigIo { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected an I/O error, got {:?}", other),
        }

        let broken = env::temp_dir().join(format!("voxel-client-{}.json", fastrand::u64(..)));
        fs::write(&broken, "{ not json").unwrap();
        let result = ClientConfig::from_path(&broken);
        fs::remove_file(&broken).unwrap();
        assert!(matches!(result, Err(ClientError::ConfigParse { .. })));
    }
}
