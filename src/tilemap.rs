//! Tile grids shared by every generation algorithm.
//!
//! Storage is row-major (`y * width + x`). `x` is the column, `y` is the row,
//! and the origin is the bottom-left corner: row 0 is the floor and terrain
//! grows upward from it.

use crate::error::{LevelError, Result};

/// Largest width or height a level layer may have. Keeps every world offset
/// derived from a layer size inside `i32`.
pub const MAX_DIMENSION: usize = 1 << 20;

/// Check that a `width x height` layer is non-empty and within
/// [`MAX_DIMENSION`] on both axes.
pub fn check_dimensions(width: usize, height: usize) -> std::result::Result<(), String> {
    if width == 0 || height == 0 {
        return Err(format!("map size {}x{} has no cells", width, height));
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(format!(
            "map size {}x{} exceeds the {} tile limit per axis",
            width, height, MAX_DIMENSION
        ));
    }
    Ok(())
}

/// Occupancy of a single map cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Tile {
    #[default]
    Empty = 0,
    Wall = 1,
}

impl Tile {
    /// Integer id used by the persisted map format.
    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            0 => Some(Tile::Empty),
            1 => Some(Tile::Wall),
            _ => None,
        }
    }

    pub fn is_wall(self) -> bool {
        self == Tile::Wall
    }
}

/// A 2D tilemap grid with hard edges (no wrapping).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

/// The grid every layer of a level is generated into.
pub type MapGrid = Tilemap<Tile>;

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }

    /// Copy into a `new_width x new_height` grid anchored at the origin.
    /// Cells outside the source are padded with `T::default()`, cells outside
    /// the target are cropped.
    pub fn resize(&self, new_width: usize, new_height: usize) -> Self {
        let mut result = Tilemap::new(new_width, new_height);
        for y in 0..new_height.min(self.height) {
            for x in 0..new_width.min(self.width) {
                result.put(x, y, self.at(x, y).clone());
            }
        }
        result
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Build from rows ordered by increasing `y`. Every row must have the
    /// same length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Option<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != width) {
            return None;
        }
        Some(Self {
            width,
            height,
            data: rows.into_iter().flatten().collect(),
        })
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    fn out_of_range(&self, x: usize, y: usize) -> LevelError {
        LevelError::OutOfRange { x, y, width: self.width, height: self.height }
    }

    /// Bounds-checked read.
    pub fn get(&self, x: usize, y: usize) -> Result<&T> {
        if !self.in_bounds(x, y) {
            return Err(self.out_of_range(x, y));
        }
        Ok(&self.data[y * self.width + x])
    }

    /// Bounds-checked write.
    pub fn set(&mut self, x: usize, y: usize, value: T) -> Result<()> {
        if !self.in_bounds(x, y) {
            return Err(self.out_of_range(x, y));
        }
        let idx = y * self.width + x;
        self.data[idx] = value;
        Ok(())
    }

    /// Unchecked read for loops that already stay inside the grid.
    /// Panics on out-of-range coordinates.
    pub fn at(&self, x: usize, y: usize) -> &T {
        assert!(self.in_bounds(x, y), "({x}, {y}) outside {}x{}", self.width, self.height);
        &self.data[y * self.width + x]
    }

    /// Unchecked write, see [`Tilemap::at`].
    pub fn put(&mut self, x: usize, y: usize, value: T) {
        assert!(self.in_bounds(x, y), "({x}, {y}) outside {}x{}", self.width, self.height);
        let idx = y * self.width + x;
        self.data[idx] = value;
    }

    /// Fill the entire map with a value.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn is_edge(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 == self.width || y + 1 == self.height
    }

    /// In-bounds 4-connected neighbors (left, right, down, up).
    pub fn neighbors(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let mut result = Vec::with_capacity(4);
        if x > 0 {
            result.push((x - 1, y));
        }
        if x + 1 < self.width {
            result.push((x + 1, y));
        }
        if y > 0 {
            result.push((x, y - 1));
        }
        if y + 1 < self.height {
            result.push((x, y + 1));
        }
        result
    }

    /// In-bounds 8-connected neighbors.
    pub fn neighbors_8(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let mut result = Vec::with_capacity(8);

        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx >= 0 && ny >= 0 && (nx as usize) < self.width && (ny as usize) < self.height {
                    result.push((nx as usize, ny as usize));
                }
            }
        }

        result
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % self.width;
            let y = idx / self.width;
            (x, y, val)
        })
    }

    /// Rows in increasing `y` order.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        // chunks() rejects a zero size; an empty grid has no rows anyway
        self.data.chunks(self.width.max(1)).take(self.height)
    }
}

impl<T: Clone + PartialEq> Tilemap<T> {
    pub fn count(&self, value: &T) -> usize {
        self.data.iter().filter(|v| *v == value).count()
    }

    /// Fraction of cells equal to `value`, 0.0 for an empty grid.
    pub fn ratio(&self, value: &T) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.count(value) as f64 / self.data.len() as f64
    }

    /// Moore neighborhood count of `value`. Cells past the edge are not counted.
    pub fn moore_count(&self, x: usize, y: usize, value: &T) -> usize {
        self.neighbors_8(x, y)
            .into_iter()
            .filter(|&(nx, ny)| self.at(nx, ny) == value)
            .count()
    }

    /// Von Neumann neighborhood count of `value`. Cells past the edge are not counted.
    pub fn von_neumann_count(&self, x: usize, y: usize, value: &T) -> usize {
        self.neighbors(x, y)
            .into_iter()
            .filter(|&(nx, ny)| self.at(nx, ny) == value)
            .count()
    }
}

impl MapGrid {
    /// Empty grid, optionally with a wall border.
    pub fn allocate(width: usize, height: usize, fill_edges_as_walls: bool) -> Self {
        let mut grid = MapGrid::new(width, height);
        if fill_edges_as_walls {
            for y in 0..height {
                for x in 0..width {
                    if grid.is_edge(x, y) {
                        grid.put(x, y, Tile::Wall);
                    }
                }
            }
        }
        grid
    }

    /// Grid filled entirely with walls, for algorithms that carve.
    pub fn solid(width: usize, height: usize) -> Self {
        MapGrid::new_with(width, height, Tile::Wall)
    }

    /// Mark every cell from the floor up to and including `surface` as wall.
    pub fn fill_column(&mut self, x: usize, surface: usize) {
        let top = surface.min(self.height.saturating_sub(1));
        for y in 0..=top {
            self.put(x, y, Tile::Wall);
        }
    }
}
