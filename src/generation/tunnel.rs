//! Directional tunnel carved from the bottom edge of the map to the top

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::settings::LayerConfig;
use crate::tilemap::{MapGrid, Tile};

/// Corridor shape parameters. Widths are half-widths: a row of half-width
/// `w` clears `2w + 1` cells around the corridor center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TunnelParams {
    pub min_path_width: usize,
    pub max_path_width: usize,
    /// Largest change in half-width between consecutive rows
    pub max_path_change: usize,
    /// Chance per row of a width change
    pub roughness: f64,
    /// Chance per row of a sideways drift
    pub windiness: f64,
}

impl From<&LayerConfig> for TunnelParams {
    fn from(config: &LayerConfig) -> Self {
        Self {
            min_path_width: config.min_path_width,
            max_path_width: config.max_path_width,
            max_path_change: config.max_path_change,
            roughness: config.roughness,
            windiness: config.windiness,
        }
    }
}

/// Carve a winding corridor through solid rock.
///
/// The center starts in the middle column. A drift never moves the center
/// further than the new half-width, so each row still covers the previous
/// row's center and the corridor stays 4-connected from floor to ceiling.
pub fn directional_tunnel(width: usize, height: usize, seed: u64, params: &TunnelParams) -> MapGrid {
    let mut grid = MapGrid::solid(width, height);
    if width <= 2 * params.max_path_width {
        return grid;
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (min_w, max_w) = (params.min_path_width, params.max_path_width);

    // Center bounds that keep the widest possible row on the map
    let (lo, hi) = (max_w, width - 1 - max_w);
    let mut center = (width / 2).clamp(lo, hi);
    let mut half_width = 1usize.clamp(min_w, max_w);

    for y in 0..height {
        if y > 0 {
            if params.max_path_change > 0 && rng.gen::<f64>() < params.roughness {
                let change = params.max_path_change as i64;
                let delta = rng.gen_range(-change..=change);
                half_width = (half_width as i64 + delta).clamp(min_w as i64, max_w as i64) as usize;
            }

            if half_width > 0 && rng.gen::<f64>() < params.windiness {
                let reach = half_width as i64;
                let shift = rng.gen_range(-reach..=reach);
                center = (center as i64 + shift).clamp(lo as i64, hi as i64) as usize;
            }
        }

        for x in center - half_width..=center + half_width {
            grid.put(x, y, Tile::Empty);
        }
    }

    grid
}
