//! Map generation algorithms
//!
//! Every algorithm is a pure function of its grid size, parameters and seed:
//!
//! - Perlin noise terrain and caves
//! - Random walks along the surface and through rock
//! - Cellular automata smoothing (von Neumann and Moore neighborhoods)
//! - Directional tunnels

pub mod automata;
pub mod perlin;
pub mod tunnel;
pub mod walk;

pub use automata::{random_fill, smooth_moore, smooth_von_neumann, unstable_cells, Neighborhood};
pub use perlin::{perlin, perlin_cave, perlin_smoothed};
pub use tunnel::{directional_tunnel, TunnelParams};
pub use walk::{random_walk_cave, random_walk_cave_custom, random_walk_top, random_walk_top_smoothed};

use crate::settings::{Algorithm, LayerConfig};
use crate::tilemap::MapGrid;

/// Generate one layer with the algorithm `config` selects.
///
/// `config` must already have passed [`LayerConfig::validate`] for this map
/// size; algorithms don't re-check their parameters.
pub fn generate_layer(config: &LayerConfig, width: usize, height: usize, seed: u64) -> MapGrid {
    let edges = config.edges_are_walls;

    match config.algorithm {
        Algorithm::Perlin => perlin(MapGrid::allocate(width, height, edges), seed),
        Algorithm::PerlinSmoothed => {
            perlin_smoothed(MapGrid::allocate(width, height, edges), seed, config.interval)
        }
        Algorithm::PerlinCave => {
            perlin_cave(MapGrid::allocate(width, height, edges), seed, config.modifier, edges)
        }
        Algorithm::RandomWalkTop => {
            let grid = random_walk_top(MapGrid::allocate(width, height, edges), seed);
            smooth_moore(grid, edges, config.smooth_passes)
        }
        Algorithm::RandomWalkTopSmoothed => {
            random_walk_top_smoothed(MapGrid::allocate(width, height, edges), seed, config.interval)
        }
        Algorithm::RandomWalkCave => random_walk_cave(width, height, seed, config.clear_ratio),
        Algorithm::RandomWalkCaveCustom => random_walk_cave_custom(width, height, seed, config.clear_ratio),
        Algorithm::CellularAutomataVonNeumann => {
            let grid = random_fill(width, height, seed, config.fill_ratio, edges);
            smooth_von_neumann(grid, edges, config.smooth_passes)
        }
        Algorithm::CellularAutomataMoore => {
            let grid = random_fill(width, height, seed, config.fill_ratio, edges);
            smooth_moore(grid, edges, config.smooth_passes)
        }
        Algorithm::DirectionalTunnel => {
            directional_tunnel(width, height, seed, &TunnelParams::from(config))
        }
    }
}
