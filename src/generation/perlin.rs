//! Perlin noise layers: terrain surfaces and caves

use noise::{NoiseFn, Perlin};

use crate::tilemap::{MapGrid, Tile};

/// Horizontal sampling frequency for terrain surfaces
const TERRAIN_FREQUENCY: f64 = 0.08;

/// Terrain is a 1D slice of 2D noise; this row keeps it off the lattice,
/// where Perlin noise is always zero.
const TERRAIN_ROW: f64 = 0.37;

/// Fold a 64-bit layer seed into the 32 bits `Perlin` accepts.
fn noise_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

/// Noise sample mapped from roughly [-1, 1] into [0, 1].
fn unit_sample(noise: &Perlin, x: f64, y: f64) -> f64 {
    ((noise.get([x, y]) + 1.0) * 0.5).clamp(0.0, 1.0)
}

fn surface_height(noise: &Perlin, x: usize, height: usize) -> f64 {
    unit_sample(noise, x as f64 * TERRAIN_FREQUENCY, TERRAIN_ROW) * height.saturating_sub(1) as f64
}

/// Terrain surface: every column is solid from the floor up to a noise height.
pub fn perlin(mut grid: MapGrid, seed: u64) -> MapGrid {
    let noise = Perlin::new(noise_seed(seed));

    for x in 0..grid.width {
        let surface = surface_height(&noise, x, grid.height).floor() as usize;
        grid.fill_column(x, surface);
    }

    grid
}

/// Terrain surface sampled every `interval` columns, with straight slopes
/// between the samples.
pub fn perlin_smoothed(mut grid: MapGrid, seed: u64, interval: usize) -> MapGrid {
    if grid.width == 0 {
        return grid;
    }
    let noise = Perlin::new(noise_seed(seed));
    let last = grid.width - 1;

    let mut anchors: Vec<(usize, f64)> = (0..grid.width)
        .step_by(interval.max(1))
        .map(|x| (x, surface_height(&noise, x, grid.height)))
        .collect();
    if anchors.last().map(|&(x, _)| x) != Some(last) {
        anchors.push((last, surface_height(&noise, last, grid.height)));
    }

    if anchors.len() == 1 {
        grid.fill_column(0, anchors[0].1.floor() as usize);
        return grid;
    }

    for pair in anchors.windows(2) {
        let (x0, h0) = pair[0];
        let (x1, h1) = pair[1];
        let span = (x1 - x0) as f64;
        for x in x0..=x1 {
            let t = (x - x0) as f64 / span;
            let surface = h0 + (h1 - h0) * t;
            grid.fill_column(x, surface.floor() as usize);
        }
    }

    grid
}

/// 2D noise rounded to walls and open space. `modifier` scales the sampling
/// frequency: smaller values give larger caverns.
pub fn perlin_cave(mut grid: MapGrid, seed: u64, modifier: f64, edges_are_walls: bool) -> MapGrid {
    let noise = Perlin::new(noise_seed(seed));

    for y in 0..grid.height {
        for x in 0..grid.width {
            let tile = if edges_are_walls && grid.is_edge(x, y) {
                Tile::Wall
            } else {
                let value = unit_sample(&noise, (x as f64 + 0.5) * modifier, (y as f64 + 0.5) * modifier);
                if value.round() >= 1.0 { Tile::Wall } else { Tile::Empty }
            };
            grid.put(x, y, tile);
        }
    }

    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_heights(grid: &MapGrid) -> Vec<usize> {
        (0..grid.width)
            .map(|x| (0..grid.height).filter(|&y| grid.at(x, y).is_wall()).count())
            .collect()
    }

    #[test]
    fn test_perlin_deterministic() {
        let a = perlin(MapGrid::allocate(64, 32, false), 99);
        let b = perlin(MapGrid::allocate(64, 32, false), 99);
        assert_eq!(a, b);

        let c = perlin(MapGrid::allocate(64, 32, false), 100);
        assert_ne!(a, c);
    }

    #[test]
    fn test_perlin_columns_are_solid_from_floor() {
        let grid = perlin(MapGrid::allocate(40, 20, false), 5);
        for (x, height) in column_heights(&grid).into_iter().enumerate() {
            assert!(height >= 1, "column {x} has no ground");
            for y in 0..height {
                assert!(grid.at(x, y).is_wall(), "hole under the surface at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_smoothed_is_piecewise_linear() {
        let interval = 5;
        let grid = perlin_smoothed(MapGrid::allocate(41, 30, false), 17, interval);
        let heights = column_heights(&grid);

        // Between two anchors the slope can only change by flooring error
        for segment in heights.chunks(interval) {
            for w in segment.windows(3) {
                let d1 = w[1] as i64 - w[0] as i64;
                let d2 = w[2] as i64 - w[1] as i64;
                assert!((d1 - d2).abs() <= 1, "kink inside a segment: {:?}", segment);
            }
        }
    }

    #[test]
    fn test_smoothed_single_column() {
        let grid = perlin_smoothed(MapGrid::allocate(1, 10, false), 3, 4);
        assert!(grid.at(0, 0).is_wall());
    }

    #[test]
    fn test_cave_edges_and_mix() {
        let grid = perlin_cave(MapGrid::allocate(60, 40, false), 8, 0.1, true);
        for (x, y, &tile) in grid.iter() {
            if grid.is_edge(x, y) {
                assert_eq!(tile, Tile::Wall);
            }
        }
        let walls = grid.ratio(&Tile::Wall);
        assert!(walls > 0.05 && walls < 0.95, "wall ratio {walls}");
    }

    #[test]
    fn test_cave_deterministic() {
        let a = perlin_cave(MapGrid::allocate(30, 30, false), 1, 0.15, false);
        let b = perlin_cave(MapGrid::allocate(30, 30, false), 1, 0.15, false);
        assert_eq!(a, b);
    }
}
