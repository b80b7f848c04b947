//! Engine configuration.
//!
//! Every section has working defaults, so an empty JSON object is a valid configuration
//! and a file only needs the values it changes:
//!
//! ```json
//! {
//!     "seed": 7,
//!     "terrain": { "snow_line": 60 },
//!     "streaming": { "load_radius": 2, "evict_distance": 200.0 }
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use super::rendering::meshing::MeshingConfig;
use super::voxels::automaton::AutomatonConfig;
use super::voxels::chunk::CHUNK_DIMENSION;
use super::voxels::terrain::TerrainConfig;
use super::voxels::world::StreamingConfig;

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// World seed
    pub seed: u32,
    /// Terrain generator coefficients
    pub terrain: TerrainConfig,
    /// Streaming radii and budgets
    pub streaming: StreamingConfig,
    /// Block automaton tuning
    pub automaton: AutomatonConfig,
    /// Mesh rebuild budget
    pub meshing: MeshingConfig,
}

impl EngineConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).context("Engine configuration is not valid JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine configuration {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("Invalid engine configuration {}", path.display()))
    }

    /// Checks values that would make the engine misbehave.
    pub fn validate(&self) -> Result<()> {
        let streaming = &self.streaming;
        if streaming.inner_radius < 0 || streaming.load_radius < streaming.inner_radius {
            bail!(
                "Streaming radii must satisfy 0 <= inner_radius ({}) <= load_radius ({})",
                streaming.inner_radius,
                streaming.load_radius
            );
        }

        // Farthest chunk center inside the load cube.
        let reach = (streaming.load_radius as f32 + 1.0) * CHUNK_DIMENSION as f32 * 3f32.sqrt();
        if streaming.evict_distance <= reach {
            bail!(
                "evict_distance ({}) must exceed {:.1}, or chunks inside load_radius {} would be evicted as soon as they load",
                streaming.evict_distance,
                reach,
                streaming.load_radius
            );
        }

        let terrain = &self.terrain;
        if !(terrain.gold_chance < terrain.iron_chance && terrain.iron_chance < terrain.coal_chance) {
            bail!(
                "Ore chances must be ordered gold ({}) < iron ({}) < coal ({})",
                terrain.gold_chance,
                terrain.iron_chance,
                terrain.coal_chance
            );
        }
        if terrain.gold_chance < 0.0 || terrain.gold_chance + terrain.iron_chance + terrain.coal_chance > 1.0 {
            bail!("Ore chances must be probabilities that sum to at most 1");
        }
        if terrain.tree_power_min < 0 || terrain.tree_power_max < terrain.tree_power_min {
            bail!(
                "Tree power range {}..={} is empty or negative",
                terrain.tree_power_min,
                terrain.tree_power_max
            );
        }
        if terrain.snow_line <= terrain.water_level {
            bail!(
                "snow_line ({}) must be above water_level ({})",
                terrain.snow_line,
                terrain.water_level
            );
        }
        if terrain.detail_octaves == 0 {
            bail!("detail_octaves must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
        assert_eq!(EngineConfig::from_json_str("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_sections_keep_their_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{ "seed": 9, "streaming": { "load_radius": 2 }, "terrain": { "snow_line": 55 } }"#,
        )
        .unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.streaming.load_radius, 2);
        assert_eq!(config.streaming.inner_radius, 1);
        assert_eq!(config.terrain.snow_line, 55);
        assert_eq!(config.automaton.updates_per_chunk, 10);
    }

    #[test]
    fn eviction_inside_the_load_radius_is_rejected() {
        let error = EngineConfig::from_json_str(r#"{ "streaming": { "load_radius": 5 } }"#).unwrap_err();
        assert!(error.to_string().contains("evict_distance"));
    }

    #[test]
    fn unordered_ore_chances_are_rejected() {
        let result = EngineConfig::from_json_str(r#"{ "terrain": { "gold_chance": 0.5 } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn malformed_json_is_reported() {
        let error = EngineConfig::from_json_str("{ seed: ").unwrap_err();
        assert!(format!("{:#}", error).contains("not valid JSON"));
    }

    #[test]
    fn missing_files_name_the_path() {
        let error = EngineConfig::load("/nonexistent/voxel-world.json").unwrap_err();
        assert!(error.to_string().contains("/nonexistent/voxel-world.json"));
    }
}
