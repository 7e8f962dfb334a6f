//! Per-layer generation settings
//!
//! The catalog is an ordered list of [`LayerConfig`] entries, one per map
//! layer. It is authored outside the generator (usually a TOML file with one
//! `[[layers]]` table per layer) and only read here.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LevelError, Result};
use crate::seeds::SeedSource;
use crate::tilemap::check_dimensions;

/// Generation algorithm selected for a layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// 1D Perlin terrain surface
    #[default]
    Perlin,
    /// Perlin surface sampled every `interval` columns and interpolated
    PerlinSmoothed,
    /// 2D Perlin field rounded to walls and open space
    PerlinCave,
    /// Random walk along the surface, then Moore smoothing
    RandomWalkTop,
    /// Random walk surface with sections at least `interval` wide
    RandomWalkTopSmoothed,
    /// 4-direction walker carving out of solid rock
    RandomWalkCave,
    /// 8-direction walker carving out of solid rock
    RandomWalkCaveCustom,
    /// Random fill smoothed with the 4-cell neighborhood
    CellularAutomataVonNeumann,
    /// Random fill smoothed with the 8-cell neighborhood
    CellularAutomataMoore,
    /// Winding corridor from the bottom edge to the top edge
    DirectionalTunnel,
}

impl Algorithm {
    pub fn all() -> &'static [Self] {
        &[
            Self::Perlin,
            Self::PerlinSmoothed,
            Self::PerlinCave,
            Self::RandomWalkTop,
            Self::RandomWalkTopSmoothed,
            Self::RandomWalkCave,
            Self::RandomWalkCaveCustom,
            Self::CellularAutomataVonNeumann,
            Self::CellularAutomataMoore,
            Self::DirectionalTunnel,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Perlin => "perlin",
            Self::PerlinSmoothed => "perlin_smoothed",
            Self::PerlinCave => "perlin_cave",
            Self::RandomWalkTop => "random_walk_top",
            Self::RandomWalkTopSmoothed => "random_walk_top_smoothed",
            Self::RandomWalkCave => "random_walk_cave",
            Self::RandomWalkCaveCustom => "random_walk_cave_custom",
            Self::CellularAutomataVonNeumann => "cellular_automata_von_neumann",
            Self::CellularAutomataMoore => "cellular_automata_moore",
            Self::DirectionalTunnel => "directional_tunnel",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Settings for a single layer.
///
/// Only the fields used by `algorithm` matter; the rest keep their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    pub algorithm: Algorithm,

    /// Explicit seed, hashed with the layer index before use
    pub seed: SeedSource,
    /// Ignore `seed` and derive one from the clock at generation time
    pub random_seed: bool,

    /// Keep the map border solid (noise, cave and automata variants)
    pub edges_are_walls: bool,

    /// Initial wall density for cellular automata (0.0-1.0)
    pub fill_ratio: f64,
    /// Number of smoothing passes (automata and random walk top)
    pub smooth_passes: usize,

    /// Sample spacing for perlin_smoothed, minimum section width for
    /// random_walk_top_smoothed
    pub interval: usize,

    /// Fraction of the map the cave walkers clear (0.0-1.0)
    pub clear_ratio: f64,

    /// Noise frequency multiplier for perlin_cave
    pub modifier: f64,

    /// Tunnel half-width bounds and maximum half-width change per row
    pub min_path_width: usize,
    pub max_path_width: usize,
    pub max_path_change: usize,
    /// Chance per row that the tunnel width changes (0.0-1.0)
    pub roughness: f64,
    /// Chance per row that the tunnel drifts sideways (0.0-1.0)
    pub windiness: f64,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Perlin,
            seed: SeedSource::default(),
            random_seed: false,
            edges_are_walls: true,
            fill_ratio: 0.45,
            smooth_passes: 3,
            interval: 4,
            clear_ratio: 0.4,
            modifier: 0.1,
            min_path_width: 1,
            max_path_width: 4,
            max_path_change: 1,
            roughness: 0.25,
            windiness: 0.35,
        }
    }
}

impl LayerConfig {
    pub fn new(algorithm: Algorithm) -> Self {
        Self { algorithm, ..Self::default() }
    }

    pub fn with_seed(mut self, seed: SeedSource) -> Self {
        self.seed = seed;
        self.random_seed = false;
        self
    }

    /// Check the parameters the selected algorithm depends on against a
    /// `width x height` map. Out-of-range values are rejected, never clamped.
    pub fn validate(&self, width: usize, height: usize) -> std::result::Result<(), String> {
        check_dimensions(width, height)?;

        match self.algorithm {
            Algorithm::Perlin | Algorithm::RandomWalkTop => {}
            Algorithm::PerlinSmoothed | Algorithm::RandomWalkTopSmoothed => {
                if self.interval == 0 {
                    return Err("interval must be at least 1".to_string());
                }
            }
            Algorithm::PerlinCave => {
                if !(self.modifier.is_finite() && self.modifier > 0.0) {
                    return Err(format!("modifier must be positive, got {}", self.modifier));
                }
            }
            Algorithm::RandomWalkCave | Algorithm::RandomWalkCaveCustom => {
                check_unit("clear_ratio", self.clear_ratio)?;
                if width < 3 || height < 3 {
                    return Err(format!("cave walkers need at least a 3x3 map, got {}x{}", width, height));
                }
                let target = clear_target(width, height, self.clear_ratio);
                let interior = (width - 2) * (height - 2);
                if target > interior {
                    return Err(format!(
                        "clear_ratio {} needs {} open cells but only {} interior cells exist",
                        self.clear_ratio, target, interior
                    ));
                }
            }
            Algorithm::CellularAutomataVonNeumann | Algorithm::CellularAutomataMoore => {
                check_unit("fill_ratio", self.fill_ratio)?;
            }
            Algorithm::DirectionalTunnel => {
                if self.min_path_width > self.max_path_width {
                    return Err(format!(
                        "min_path_width {} exceeds max_path_width {}",
                        self.min_path_width, self.max_path_width
                    ));
                }
                if self.max_path_change > self.max_path_width {
                    return Err(format!(
                        "max_path_change {} exceeds max_path_width {}",
                        self.max_path_change, self.max_path_width
                    ));
                }
                if width <= self.max_path_width.saturating_mul(2) {
                    return Err(format!(
                        "map width {} cannot hold a tunnel of half-width {}",
                        width, self.max_path_width
                    ));
                }
                check_unit("roughness", self.roughness)?;
                check_unit("windiness", self.windiness)?;
            }
        }

        Ok(())
    }
}

/// Number of open cells a cave walker must reach.
pub fn clear_target(width: usize, height: usize, clear_ratio: f64) -> usize {
    ((width * height) as f64 * clear_ratio).round() as usize
}

fn check_unit(name: &str, value: f64) -> std::result::Result<(), String> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{} must be within 0.0-1.0, got {}", name, value))
    }
}

/// Ordered layer settings, index 0 first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsCatalog {
    #[serde(default)]
    pub layers: Vec<LayerConfig>,
}

impl SettingsCatalog {
    pub fn new(layers: Vec<LayerConfig>) -> Self {
        Self { layers }
    }

    /// Ground, cave and tunnel: the three-layer arena the game ships with.
    pub fn default_arena() -> Self {
        Self::new(vec![
            LayerConfig::new(Algorithm::PerlinSmoothed).with_seed(SeedSource::Text("surface".into())),
            LayerConfig::new(Algorithm::CellularAutomataMoore).with_seed(SeedSource::Text("caverns".into())),
            LayerConfig::new(Algorithm::DirectionalTunnel).with_seed(SeedSource::Text("shaft".into())),
        ])
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| LevelError::Settings(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| LevelError::Settings(e.to_string()))
    }

    /// Validate every layer, reporting the first failure with its index.
    pub fn validate(&self, width: usize, height: usize) -> Result<()> {
        for (layer, config) in self.layers.iter().enumerate() {
            config
                .validate(width, height)
                .map_err(|reason| LevelError::InvalidConfig { layer, reason })?;
        }
        Ok(())
    }

    /// Use `seed` for every layer instead of the configured seeds.
    pub fn override_seed(&mut self, seed: i64) {
        for config in &mut self.layers {
            config.seed = SeedSource::Number(seed);
            config.random_seed = false;
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LayerConfig> {
        self.layers.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerConfig> {
        self.layers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tilemap::MAX_DIMENSION;

    #[test]
    fn test_parse_catalog() {
        let text = r#"
            [[layers]]
            algorithm = "perlin_cave"
            seed = "deep"
            modifier = 0.08

            [[layers]]
            algorithm = "directional_tunnel"
            random_seed = true
            min_path_width = 2
            max_path_width = 5
        "#;
        let catalog = SettingsCatalog::from_toml_str(text).unwrap();
        assert_eq!(catalog.len(), 2);

        let cave = catalog.get(0).unwrap();
        assert_eq!(cave.algorithm, Algorithm::PerlinCave);
        assert_eq!(cave.seed, SeedSource::Text("deep".into()));
        assert!((cave.modifier - 0.08).abs() < 1e-12);
        assert!(cave.edges_are_walls);

        let tunnel = catalog.get(1).unwrap();
        assert!(tunnel.random_seed);
        assert_eq!((tunnel.min_path_width, tunnel.max_path_width), (2, 5));
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let err = SettingsCatalog::from_toml_str("[[layers]]\nalgorithm = \"voronoi\"").unwrap_err();
        assert!(matches!(err, LevelError::Settings(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let catalog = SettingsCatalog::default_arena();
        let text = catalog.to_toml_string().unwrap();
        assert_eq!(SettingsCatalog::from_toml_str(&text).unwrap(), catalog);
    }

    #[test]
    fn test_tunnel_width_order() {
        let mut config = LayerConfig::new(Algorithm::DirectionalTunnel);
        config.min_path_width = 5;
        config.max_path_width = 3;
        assert!(config.validate(50, 20).is_err());

        let catalog = SettingsCatalog::new(vec![LayerConfig::default(), config]);
        assert!(matches!(
            catalog.validate(50, 20),
            Err(LevelError::InvalidConfig { layer: 1, .. })
        ));
    }

    #[test]
    fn test_tunnel_must_fit() {
        let mut config = LayerConfig::new(Algorithm::DirectionalTunnel);
        config.max_path_width = 5;
        assert!(config.validate(10, 20).is_err());
        assert!(config.validate(11, 20).is_ok());
    }

    #[test]
    fn test_ratios_not_clamped() {
        let mut config = LayerConfig::new(Algorithm::CellularAutomataMoore);
        config.fill_ratio = 1.2;
        assert!(config.validate(20, 20).is_err());

        let mut config = LayerConfig::new(Algorithm::RandomWalkCave);
        config.clear_ratio = -0.1;
        assert!(config.validate(20, 20).is_err());
    }

    #[test]
    fn test_cave_target_must_fit_interior() {
        let mut config = LayerConfig::new(Algorithm::RandomWalkCaveCustom);
        // 20x20 has 324 interior cells out of 400
        config.clear_ratio = 0.8;
        assert!(config.validate(20, 20).is_ok());
        config.clear_ratio = 0.9;
        assert!(config.validate(20, 20).is_err());
        config.clear_ratio = 0.1;
        assert!(config.validate(2, 20).is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = LayerConfig::new(Algorithm::PerlinSmoothed);
        config.interval = 0;
        assert!(config.validate(20, 20).is_err());
        // interval is irrelevant to plain perlin
        config.algorithm = Algorithm::Perlin;
        assert!(config.validate(20, 20).is_ok());
    }

    #[test]
    fn test_oversized_map_rejected() {
        let config = LayerConfig::new(Algorithm::Perlin);
        assert!(config.validate(MAX_DIMENSION, 20).is_ok());
        assert!(config.validate(MAX_DIMENSION + 1, 20).is_err());
        assert!(config.validate(20, 1 << 31).is_err());

        let catalog = SettingsCatalog::new(vec![config]);
        assert!(matches!(
            catalog.validate(1 << 32, 20),
            Err(LevelError::InvalidConfig { layer: 0, .. })
        ));
    }

    #[test]
    fn test_override_seed() {
        let mut catalog = SettingsCatalog::default_arena();
        catalog.layers[0].random_seed = true;
        catalog.override_seed(9);
        assert!(catalog.iter().all(|c| c.seed == SeedSource::Number(9) && !c.random_seed));

        // Any override still writes back out as TOML
        catalog.override_seed(i64::MIN);
        let text = catalog.to_toml_string().unwrap();
        assert_eq!(SettingsCatalog::from_toml_str(&text).unwrap(), catalog);
    }

    #[test]
    fn test_negative_seed_in_catalog() {
        let catalog = SettingsCatalog::from_toml_str("[[layers]]\nseed = -42").unwrap();
        assert_eq!(catalog.get(0).unwrap().seed, SeedSource::Number(-42));
    }
}
