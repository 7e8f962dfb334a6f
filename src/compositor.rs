//! Layer composition
//!
//! [`LevelGenerator`] runs every layer of its settings catalog, keeps the
//! resulting [`MapSet`] and paints it into a render sink with a fixed
//! placement scheme:
//!
//! - Layer 0 at full size at the base offset
//! - Layer 1 cropped to 3/4 of the map width at the second-row origin
//! - Layer 2 cropped to 1/4 of the map width, directly right of layer 1
//!
//! Further layers are generated and kept but have no slot in the arena.

use std::borrow::Cow;
use std::ops::Add;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::generation::generate_layer;
use crate::persistence;
use crate::render::RenderSink;
use crate::seeds::resolve_layer_seed;
use crate::settings::SettingsCatalog;
use crate::tilemap::{MapGrid, Tile, MAX_DIMENSION};

/// Placement vector in world tile coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, other: Offset) -> Offset {
        Offset::new(self.x + other.x, self.y + other.y)
    }
}

/// Layers produced by one generation pass, all allocated at `width x height`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapSet {
    pub width: usize,
    pub height: usize,
    pub layers: Vec<MapGrid>,
}

impl MapSet {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, layers: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Where each layer of a map set goes in world space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Bottom-left corner of layer 0
    pub base: Offset,
    /// Bottom-left corner of layer 1; layer 2 follows to its right
    pub row_origin: Offset,
}

/// Number of layers the arena has room for.
pub const PLACED_LAYERS: usize = 3;

/// Layer size as a world-space length. Sizes past [`MAX_DIMENSION`] are
/// rejected by settings validation and by the map loader, so the clamp only
/// guards direct callers.
fn extent(size: usize) -> i32 {
    i32::try_from(size.min(MAX_DIMENSION)).unwrap_or(i32::MAX)
}

impl Placement {
    /// Layout after a fresh generation: layers 1 and 2 continue to the right
    /// of layer 0.
    pub fn fresh(width: usize, height: usize) -> Self {
        let (w, h) = (extent(width), extent(height));
        Self {
            base: Offset::new(-w, -h / 2),
            row_origin: Offset::new(0, -h / 2),
        }
    }

    /// Layout after loading from disk: layer 0 centred, layers 1 and 2 on a
    /// row below it.
    pub fn loaded(width: usize, height: usize) -> Self {
        let (w, h) = (extent(width), extent(height));
        Self {
            base: Offset::new(-w / 2, -h / 2),
            row_origin: Offset::new(-w / 2, -h / 2 - h),
        }
    }

    /// Offset and target width of layer `index`, or `None` past the last slot.
    pub fn slot(&self, index: usize, width: usize) -> Option<(Offset, usize)> {
        let wide = width / 4 * 3;
        match index {
            0 => Some((self.base, width)),
            1 => Some((self.row_origin, wide)),
            2 => Some((self.row_origin + Offset::new(extent(wide), 0), width / 4)),
            _ => None,
        }
    }
}

/// Paint every wall of `grid` at `offset`.
fn paint_grid<S: RenderSink>(grid: &MapGrid, offset: Offset, sink: &mut S) {
    for (x, y, &tile) in grid.iter() {
        if tile == Tile::Wall {
            sink.paint(offset.x + x as i32, offset.y + y as i32, tile);
        }
    }
}

/// Paint `map_set` into `sink` using `placement`. Returns how many layers
/// were placed.
pub fn place<S: RenderSink>(map_set: &MapSet, placement: &Placement, sink: &mut S) -> usize {
    let mut placed = 0;

    for (index, grid) in map_set.layers.iter().enumerate() {
        let Some((offset, target_width)) = placement.slot(index, map_set.width) else {
            warn!(layer = index, "no arena slot for layer; generated but not placed");
            continue;
        };

        let fitted = if grid.width == target_width && grid.height == map_set.height {
            Cow::Borrowed(grid)
        } else {
            Cow::Owned(grid.resize(target_width, map_set.height))
        };
        paint_grid(&fitted, offset, sink);
        placed += 1;
    }

    placed
}

/// Generates, places, saves and loads levels for one render sink.
pub struct LevelGenerator<S: RenderSink> {
    catalog: SettingsCatalog,
    sink: S,
    width: usize,
    height: usize,
    map_set: MapSet,
}

impl<S: RenderSink> LevelGenerator<S> {
    pub fn new(catalog: SettingsCatalog, sink: S, width: usize, height: usize) -> Self {
        Self {
            catalog,
            sink,
            width,
            height,
            map_set: MapSet::new(width, height),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn catalog(&self) -> &SettingsCatalog {
        &self.catalog
    }

    pub fn map_set(&self) -> &MapSet {
        &self.map_set
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Remove everything painted so far.
    pub fn clear(&mut self) {
        self.sink.clear_all();
    }

    /// Generate every layer and paint the result.
    ///
    /// The whole catalog is validated first; an invalid layer aborts the
    /// pass before anything is cleared, so the previous map set and canvas
    /// stay as they were.
    pub fn generate(&mut self) -> Result<&MapSet> {
        self.catalog.validate(self.width, self.height)?;
        self.clear();

        let mut map_set = MapSet::new(self.width, self.height);
        for (index, config) in self.catalog.iter().enumerate() {
            let seed = resolve_layer_seed(&config.seed, config.random_seed, index);
            let grid = generate_layer(config, self.width, self.height, seed);
            debug!(
                layer = index,
                algorithm = %config.algorithm,
                seed,
                wall_ratio = grid.ratio(&Tile::Wall),
                "generated layer"
            );
            map_set.layers.push(grid);
        }
        self.map_set = map_set;

        let placed = place(&self.map_set, &Placement::fresh(self.width, self.height), &mut self.sink);
        info!(
            layers = self.map_set.len(),
            placed,
            width = self.width,
            height = self.height,
            "generated level"
        );
        Ok(&self.map_set)
    }

    /// Write the current map set to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_maps(&self.map_set, path.as_ref())?;
        info!(path = %path.as_ref().display(), layers = self.map_set.len(), "saved level");
        Ok(())
    }

    /// Replace the current map set with one read from `path` and paint it.
    /// On error nothing changes.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<&MapSet> {
        let loaded = persistence::load_maps(path.as_ref())?;

        self.clear();
        self.map_set = loaded;
        let placement = Placement::loaded(self.map_set.width, self.map_set.height);
        let placed = place(&self.map_set, &placement, &mut self.sink);
        info!(
            path = %path.as_ref().display(),
            layers = self.map_set.len(),
            placed,
            "loaded level"
        );
        Ok(&self.map_set)
    }
}
