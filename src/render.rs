//! Render sinks for composed levels
//!
//! The generator only knows how to paint a tile at a world cell and how to
//! wipe everything it painted. [`TileCanvas`] is an in-memory sink that can
//! also be dumped as ASCII text or a PNG preview.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;
use image::error::{LimitError, LimitErrorKind};
use image::{ImageBuffer, ImageError, Rgb, RgbImage};

use crate::tilemap::Tile;

/// Anything that can display tiles at world coordinates.
pub trait RenderSink {
    fn paint(&mut self, x: i32, y: i32, tile: Tile);
    fn clear_all(&mut self);
}

impl<S: RenderSink + ?Sized> RenderSink for &mut S {
    fn paint(&mut self, x: i32, y: i32, tile: Tile) {
        (**self).paint(x, y, tile);
    }

    fn clear_all(&mut self) {
        (**self).clear_all();
    }
}

/// Sparse world-space tile canvas.
#[derive(Clone, Debug, Default)]
pub struct TileCanvas {
    tiles: HashMap<(i32, i32), Tile>,
    /// Paints that landed on an already painted cell since the last clear
    overdraw: usize,
}

impl TileCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Option<Tile> {
        self.tiles.get(&(x, y)).copied()
    }

    pub fn painted_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn overdraw(&self) -> usize {
        self.overdraw
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Inclusive `((min_x, min_y), (max_x, max_y))` of painted cells.
    pub fn bounds(&self) -> Option<((i32, i32), (i32, i32))> {
        let mut keys = self.tiles.keys();
        let &(x0, y0) = keys.next()?;
        let mut min = (x0, y0);
        let mut max = (x0, y0);
        for &(x, y) in keys {
            min = (min.0.min(x), min.1.min(y));
            max = (max.0.max(x), max.1.max(y));
        }
        Some((min, max))
    }

    /// Text picture of the canvas, top row first. Walls are `#`, unpainted
    /// cells inside the bounds are `.`.
    pub fn to_ascii(&self) -> String {
        let Some(((min_x, min_y), (max_x, max_y))) = self.bounds() else {
            return String::new();
        };

        let mut output = String::new();
        for y in (min_y..=max_y).rev() {
            for x in min_x..=max_x {
                output.push(match self.tile_at(x, y) {
                    Some(Tile::Wall) => '#',
                    _ => '.',
                });
            }
            output.push('\n');
        }
        output
    }

    /// Write the ASCII picture to a text file with a short header.
    pub fn export_ascii<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;
        writeln!(file, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
        if let Some(((min_x, min_y), (max_x, max_y))) = self.bounds() {
            writeln!(file, "Bounds: ({}, {}) to ({}, {})", min_x, min_y, max_x, max_y)?;
        }
        writeln!(file, "Painted tiles: {}", self.painted_count())?;
        writeln!(file)?;
        write!(file, "{}", self.to_ascii())?;
        Ok(())
    }

    /// Render to an image, `scale` pixels per tile. The top row of the image
    /// is the highest world row.
    ///
    /// Fails with a limit error when the image would not fit `u32` sides or
    /// [`MAX_IMAGE_BYTES`].
    pub fn to_image(&self, scale: u32) -> Result<RgbImage, ImageError> {
        const BACKGROUND: Rgb<u8> = Rgb([24, 26, 33]);
        const WALL: Rgb<u8> = Rgb([181, 160, 126]);

        let scale = scale.max(1);
        let ((min_x, min_y), (max_x, max_y)) = self.bounds().unwrap_or(((0, 0), (0, 0)));
        let cols = span(min_x, max_x)?;
        let rows = span(min_y, max_y)?;

        let width = cols.checked_mul(scale).ok_or_else(|| limit_error(LimitErrorKind::DimensionError))?;
        let height = rows.checked_mul(scale).ok_or_else(|| limit_error(LimitErrorKind::DimensionError))?;
        let bytes = u64::from(width).checked_mul(u64::from(height)).and_then(|px| px.checked_mul(3));
        if !matches!(bytes, Some(b) if b <= MAX_IMAGE_BYTES) {
            return Err(limit_error(LimitErrorKind::InsufficientMemory));
        }

        let mut img: RgbImage = ImageBuffer::from_pixel(width, height, BACKGROUND);
        for (&(x, y), &tile) in &self.tiles {
            if !tile.is_wall() {
                continue;
            }
            // Both offsets are below cols/rows, so the products fit
            let px = (i64::from(x) - i64::from(min_x)) as u32 * scale;
            let py = (i64::from(max_y) - i64::from(y)) as u32 * scale;
            for dy in 0..scale {
                for dx in 0..scale {
                    img.put_pixel(px + dx, py + dy, WALL);
                }
            }
        }
        Ok(img)
    }

    pub fn export_png<P: AsRef<Path>>(&self, path: P, scale: u32) -> Result<(), ImageError> {
        self.to_image(scale)?.save(path)
    }
}

/// Largest RGB buffer `to_image` will allocate, matching the default
/// allocation limit `image` applies when decoding.
pub const MAX_IMAGE_BYTES: u64 = 512 * 1024 * 1024;

/// Number of tiles in `lo..=hi`.
fn span(lo: i32, hi: i32) -> Result<u32, ImageError> {
    u32::try_from(i64::from(hi) - i64::from(lo) + 1).map_err(|_| limit_error(LimitErrorKind::DimensionError))
}

fn limit_error(kind: LimitErrorKind) -> ImageError {
    ImageError::Limits(LimitError::from_kind(kind))
}

impl RenderSink for TileCanvas {
    fn paint(&mut self, x: i32, y: i32, tile: Tile) {
        if self.tiles.insert((x, y), tile).is_some() {
            self.overdraw += 1;
        }
    }

    fn clear_all(&mut self) {
        self.tiles.clear();
        self.overdraw = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_and_clear() {
        let mut canvas = TileCanvas::new();
        canvas.paint(-3, 2, Tile::Wall);
        canvas.paint(4, -1, Tile::Wall);
        assert_eq!(canvas.painted_count(), 2);
        assert_eq!(canvas.bounds(), Some(((-3, -1), (4, 2))));
        assert_eq!(canvas.tile_at(-3, 2), Some(Tile::Wall));

        canvas.paint(-3, 2, Tile::Wall);
        assert_eq!(canvas.overdraw(), 1);

        canvas.clear_all();
        assert!(canvas.is_empty());
        assert_eq!(canvas.overdraw(), 0);
        assert_eq!(canvas.bounds(), None);
    }

    #[test]
    fn test_ascii_top_row_first() {
        let mut canvas = TileCanvas::new();
        canvas.paint(0, 0, Tile::Wall);
        canvas.paint(1, 1, Tile::Wall);
        assert_eq!(canvas.to_ascii(), ".#\n#.\n");
    }

    #[test]
    fn test_image_size() {
        let mut canvas = TileCanvas::new();
        canvas.paint(0, 0, Tile::Wall);
        canvas.paint(9, 4, Tile::Wall);
        let img = canvas.to_image(3).unwrap();
        assert_eq!(img.dimensions(), (30, 15));
        // (0, 0) is the bottom-left tile
        assert_eq!(*img.get_pixel(0, 14), Rgb([181, 160, 126]));
    }

    #[test]
    fn test_oversized_image_is_an_error() {
        let mut canvas = TileCanvas::new();
        canvas.paint(0, 0, Tile::Wall);
        canvas.paint(1, 0, Tile::Wall);
        assert!(matches!(canvas.to_image(u32::MAX), Err(ImageError::Limits(_))));
        // Fits u32 sides, but not the byte limit
        assert!(matches!(canvas.to_image(1 << 15), Err(ImageError::Limits(_))));

        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("huge.png");
        assert!(canvas.export_png(&png, u32::MAX).is_err());
        assert!(!png.exists());
    }

    #[test]
    fn test_far_apart_tiles() {
        let mut canvas = TileCanvas::new();
        canvas.paint(i32::MIN, 0, Tile::Wall);
        canvas.paint(i32::MAX, 0, Tile::Wall);
        assert!(matches!(canvas.to_image(1), Err(ImageError::Limits(_))));
    }

    #[test]
    fn test_empty_canvas_image() {
        let img = TileCanvas::new().to_image(4).unwrap();
        assert_eq!(img.dimensions(), (4, 4));
    }

    #[test]
    fn test_exports() {
        let dir = tempfile::tempdir().unwrap();
        let mut canvas = TileCanvas::new();
        canvas.paint(2, 3, Tile::Wall);

        let txt = dir.path().join("level.txt");
        canvas.export_ascii(&txt).unwrap();
        let text = std::fs::read_to_string(&txt).unwrap();
        assert!(text.contains("Painted tiles: 1"));
        assert!(text.ends_with("#\n"));

        let png = dir.path().join("level.png");
        canvas.export_png(&png, 2).unwrap();
        assert!(png.exists());
    }
}
