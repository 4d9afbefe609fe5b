use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::game::pathfinding::{PortalScan, SearchMode, World as NavWorld};
use crate::game::structures::TerrainCosts;

/// Default location of the configuration file, relative to the working directory.
pub const INITIAL_CONFIG_PATH: &str = "assets/initial_config.ron";

/// Static configuration loaded once at startup. These values define the shape
/// of the world and the search policy; changing them requires rebuilding the
/// world, so they are never hot-reloaded.
#[derive(Resource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PathfindingConfig {
    // World shape
    /// Regions along each lattice axis.
    pub world_size: usize,
    /// Cells along each region axis.
    pub region_size: usize,

    // Search policy
    pub search_mode: SearchMode,
    pub portal_scan: PortalScan,

    // Movement
    /// Seconds per step into a cell with cost multiplier 1.0.
    pub step_duration: f32,
    pub terrain_costs: TerrainCosts,

    // Demo content (consumed by the binary only)
    pub seed: u64,
    pub demo_blocked_chance: f32,
    pub demo_river_chance: f32,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            world_size: 4,
            region_size: 10,
            search_mode: SearchMode::AStar,
            portal_scan: PortalScan::RightAndTop,
            step_duration: 0.2,
            terrain_costs: TerrainCosts::default(),
            seed: 67,
            demo_blocked_chance: 0.1,
            demo_river_chance: 0.05,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl PathfindingConfig {
    pub fn from_ron(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron(&contents)
    }

    /// Load the config, logging and falling back to defaults on any error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded pathfinding config from {}", path.display());
                config
            }
            Err(e) => {
                error!("{}", e);
                error!("Using default PathfindingConfig");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world_size == 0 {
            return Err(ConfigError::Invalid("world_size must be at least 1".into()));
        }
        if self.region_size == 0 {
            return Err(ConfigError::Invalid("region_size must be at least 1".into()));
        }
        if self.step_duration.is_nan() || self.step_duration < 0.0 {
            return Err(ConfigError::Invalid("step_duration must be non-negative".into()));
        }
        let costs = self.terrain_costs;
        if costs.grass <= 0.0 || costs.river <= 0.0 || costs.grass.is_nan() || costs.river.is_nan() {
            return Err(ConfigError::Invalid("terrain costs must be positive".into()));
        }
        Ok(())
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (load_initial_config, build_world).chain());
    }
}

/// Load static configuration synchronously at startup, unless a config was inserted already.
fn load_initial_config(mut commands: Commands, existing: Option<Res<PathfindingConfig>>) {
    if existing.is_some() {
        return;
    }
    commands.insert_resource(PathfindingConfig::load_or_default(INITIAL_CONFIG_PATH));
}

/// Build an all-grass world from the config if no world was provided.
fn build_world(
    mut commands: Commands,
    config: Option<Res<PathfindingConfig>>,
    existing: Option<Res<NavWorld>>,
) {
    if existing.is_some() {
        return;
    }
    let mut config = config.as_deref().cloned().unwrap_or_default();
    if let Err(e) = config.validate() {
        error!("{}", e);
        error!("Using default PathfindingConfig");
        config = PathfindingConfig::default();
        commands.insert_resource(config.clone());
    }
    commands.insert_resource(NavWorld::new(config));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = PathfindingConfig::from_ron("(world_size: 2, search_mode: Dijkstra)").unwrap();
        assert_eq!(config.world_size, 2);
        assert_eq!(config.search_mode, SearchMode::Dijkstra);
        assert_eq!(config.region_size, 10);
        assert_eq!(config.terrain_costs, TerrainCosts::default());
    }

    #[test]
    fn test_bundled_config_loads() {
        let config = PathfindingConfig::load(INITIAL_CONFIG_PATH).unwrap();
        assert_eq!(config, PathfindingConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            PathfindingConfig::from_ron("(region_size: 0)"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            PathfindingConfig::from_ron("(terrain_costs: (river: -1.0))"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            PathfindingConfig::from_ron("(world_size: \"big\")"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        assert!(matches!(
            PathfindingConfig::load("does/not/exist.ron"),
            Err(ConfigError::Io { .. })
        ));
        assert_eq!(
            PathfindingConfig::load_or_default("does/not/exist.ron"),
            PathfindingConfig::default()
        );
    }
}
