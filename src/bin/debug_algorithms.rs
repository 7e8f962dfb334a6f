//! Debug tool for comparing generation algorithms visually
//! Renders every algorithm with its default settings at one seed into a grid

use image::{ImageBuffer, Rgb, RgbImage};
use level_generator::generation::generate_layer;
use level_generator::seeds::{derive_seed, layer_system};
use level_generator::settings::{Algorithm, LayerConfig};
use level_generator::tilemap::{MapGrid, Tile};

const WIDTH: usize = 96;
const HEIGHT: usize = 48;
const SEED: u64 = 42;
const SCALE: u32 = 4;
const COLS: usize = 5;

fn main() {
    println!("Generating algorithm comparison grid...");

    let mut images: Vec<RgbImage> = Vec::new();
    for (index, &algorithm) in Algorithm::all().iter().enumerate() {
        let config = LayerConfig::new(algorithm);
        if let Err(reason) = config.validate(WIDTH, HEIGHT) {
            println!("  Skipping {}: {}", algorithm, reason);
            continue;
        }

        let seed = derive_seed(&SEED, &layer_system(index));
        let grid = generate_layer(&config, WIDTH, HEIGHT, seed);
        println!(
            "  {:>2}. {:<30} {:5.1}% wall",
            images.len() + 1,
            algorithm.name(),
            100.0 * grid.ratio(&Tile::Wall)
        );
        images.push(render_grid(&grid));
    }

    let rows = images.len().div_ceil(COLS);
    let sheet = create_sheet(&images, COLS, rows);
    match sheet.save("algorithm_comparison.png") {
        Ok(()) => println!("Saved algorithm_comparison.png"),
        Err(e) => eprintln!("Failed to save algorithm_comparison.png: {}", e),
    }
}

/// One cell per `SCALE x SCALE` block, top row of the image is the highest
/// grid row.
fn render_grid(grid: &MapGrid) -> RgbImage {
    let mut img: RgbImage = ImageBuffer::new(grid.width as u32 * SCALE, grid.height as u32 * SCALE);

    for (x, y, &tile) in grid.iter() {
        let color = match tile {
            Tile::Wall => Rgb([181, 160, 126]),
            Tile::Empty if grid.is_edge(x, y) => Rgb([60, 50, 70]),
            Tile::Empty => Rgb([24, 26, 33]),
        };
        let px = x as u32 * SCALE;
        let py = (grid.height - 1 - y) as u32 * SCALE;
        for dy in 0..SCALE {
            for dx in 0..SCALE {
                img.put_pixel(px + dx, py + dy, color);
            }
        }
    }

    img
}

/// Lay the images out in a grid. Each cell gets a header bar with one tick
/// per position in the printed legend.
fn create_sheet(images: &[RgbImage], cols: usize, rows: usize) -> RgbImage {
    if images.is_empty() {
        return ImageBuffer::new(1, 1);
    }

    let gap = 4u32;
    let header = 10u32;
    let cell_width = images[0].width() + gap;
    let cell_height = images[0].height() + header + gap;

    let mut sheet: RgbImage =
        ImageBuffer::from_pixel(cell_width * cols as u32, cell_height * rows as u32, Rgb([40, 40, 40]));

    for (idx, img) in images.iter().enumerate() {
        let x0 = (idx % cols) as u32 * cell_width;
        let y0 = (idx / cols) as u32 * cell_height;

        for tick in 0..=idx as u32 {
            let tx = x0 + 2 + tick * 4;
            for dy in 2..header - 2 {
                for dx in 0..2 {
                    if tx + dx < x0 + img.width() {
                        sheet.put_pixel(tx + dx, y0 + dy, Rgb([230, 230, 230]));
                    }
                }
            }
        }

        for (x, y, pixel) in img.enumerate_pixels() {
            sheet.put_pixel(x0 + x, y0 + header + y, *pixel);
        }
    }

    sheet
}
