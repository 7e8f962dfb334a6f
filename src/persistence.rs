//! Map persistence.
//!
//! Map sets are stored as JSON:
//!
//! ```json
//! { "width": 3, "height": 2, "maps": [ [[0, 1, 0], [1, 1, 1]] ] }
//! ```
//!
//! `maps[i][y][x]` is the tile id of layer `i` at column `x`, row `y`, rows in
//! increasing `y` order.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::compositor::MapSet;
use crate::error::{LevelError, Result};
use crate::tilemap::{check_dimensions, MapGrid, Tile};

/// On-disk shape of a map set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapData {
    pub width: usize,
    pub height: usize,
    pub maps: Vec<Vec<Vec<i32>>>,
}

impl MapData {
    pub fn from_map_set(map_set: &MapSet) -> Self {
        let maps = map_set
            .layers
            .iter()
            .map(|grid| {
                grid.rows()
                    .map(|row| row.iter().map(|tile| tile.id()).collect())
                    .collect()
            })
            .collect();

        Self {
            width: map_set.width,
            height: map_set.height,
            maps,
        }
    }

    /// Rebuild the map set, checking every dimension and tile id.
    pub fn into_map_set(self) -> Result<MapSet> {
        check_dimensions(self.width, self.height).map_err(LevelError::Format)?;

        let mut map_set = MapSet::new(self.width, self.height);
        for (index, map) in self.maps.into_iter().enumerate() {
            if map.len() != self.height {
                return Err(LevelError::Format(format!(
                    "map {} has {} rows, expected {}",
                    index,
                    map.len(),
                    self.height
                )));
            }

            let mut rows = Vec::with_capacity(self.height);
            for (y, row) in map.into_iter().enumerate() {
                if row.len() != self.width {
                    return Err(LevelError::Format(format!(
                        "map {} row {} has {} cells, expected {}",
                        index,
                        y,
                        row.len(),
                        self.width
                    )));
                }
                let tiles = row
                    .into_iter()
                    .enumerate()
                    .map(|(x, id)| {
                        Tile::from_id(id).ok_or_else(|| {
                            LevelError::Format(format!("map {} cell ({}, {}) has unknown tile id {}", index, x, y, id))
                        })
                    })
                    .collect::<Result<Vec<Tile>>>()?;
                rows.push(tiles);
            }

            let grid = MapGrid::from_rows(rows)
                .ok_or_else(|| LevelError::Format(format!("map {} is not rectangular", index)))?;
            map_set.layers.push(grid);
        }

        Ok(map_set)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| LevelError::Format(e.to_string()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| LevelError::Format(e.to_string()))
    }
}

/// Directory the save is staged in: the target's own, so the final rename
/// never crosses filesystems.
fn staging_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn write_json<W: Write>(data: &MapData, out: W) -> Result<()> {
    let mut writer = BufWriter::new(out);
    serde_json::to_writer(&mut writer, data).map_err(|e| {
        if e.is_io() {
            LevelError::Io(e.into())
        } else {
            LevelError::Format(e.to_string())
        }
    })?;
    writer.flush()?;
    Ok(())
}

/// Save a map set to `path`.
///
/// The document is written to a uniquely named file next to the target and
/// renamed into place, so a failed save never leaves a half-written map file
/// behind and never touches any other file in the directory.
pub fn save_maps(map_set: &MapSet, path: &Path) -> Result<()> {
    let data = MapData::from_map_set(map_set);

    // Dropped (and deleted) on any early return
    let mut staged = NamedTempFile::new_in(staging_dir(path))?;
    write_json(&data, staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| LevelError::Io(e.error))?;
    Ok(())
}

/// Load a map set saved by [`save_maps`].
pub fn load_maps(path: &Path) -> Result<MapSet> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let data: MapData = serde_json::from_reader(reader).map_err(|e| {
        if e.is_io() {
            LevelError::Io(e.into())
        } else {
            LevelError::Format(e.to_string())
        }
    })?;
    data.into_map_set()
}
