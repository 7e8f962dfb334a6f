//! Procedural 2D level generation library
//!
//! Layers of walls and open space are generated from a settings catalog,
//! composed into one arena through a render sink, and saved to or loaded
//! from JSON.

pub mod compositor;
pub mod error;
pub mod generation;
pub mod persistence;
pub mod progression;
pub mod render;
pub mod seeds;
pub mod settings;
pub mod tilemap;

pub use compositor::{place, LevelGenerator, MapSet, Offset, Placement};
pub use error::{LevelError, Result};
pub use render::{RenderSink, TileCanvas};
pub use settings::{Algorithm, LayerConfig, SettingsCatalog};
pub use tilemap::{MapGrid, Tile, Tilemap};
