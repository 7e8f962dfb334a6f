use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use level_generator::progression::{LevelProgression, SpawnKind};
use level_generator::{LevelGenerator, SettingsCatalog, Tile, TileCanvas};

#[derive(Parser, Debug)]
#[command(name = "level_generator")]
#[command(about = "Generate layered 2D tile levels from a settings catalog")]
struct Args {
    /// Layer settings (TOML with [[layers]] tables); built-in arena if omitted
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Width of each layer in tiles
    #[arg(short = 'W', long, default_value = "50")]
    width: usize,

    /// Height of each layer in tiles
    #[arg(short = 'H', long, default_value = "20")]
    height: usize,

    /// Override the seed of every layer (negative values allowed)
    #[arg(short, long, allow_negative_numbers = true)]
    seed: Option<i64>,

    /// Save the generated map set to a JSON file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Load a map set from JSON instead of generating one
    #[arg(long)]
    load: Option<PathBuf>,

    /// Print the composed level as ASCII
    #[arg(long)]
    ascii: bool,

    /// Export the composed level as ASCII text with a header
    #[arg(long)]
    export_ascii: Option<PathBuf>,

    /// Export the composed level to PNG
    #[arg(long)]
    png: Option<PathBuf>,

    /// Pixels per tile for PNG export
    #[arg(long, default_value = "8")]
    png_scale: u32,

    /// Show the spawn plan for this progression level
    #[arg(long)]
    level: Option<u32>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = match &args.settings {
        Some(path) => {
            println!("Loading settings from {}", path.display());
            SettingsCatalog::load(path)?
        }
        None => SettingsCatalog::default_arena(),
    };
    if let Some(seed) = args.seed {
        println!("Using seed {} for every layer", seed);
        catalog.override_seed(seed);
    }

    println!("Map size: {}x{}", args.width, args.height);
    let mut generator = LevelGenerator::new(catalog, TileCanvas::new(), args.width, args.height);

    if let Some(path) = &args.load {
        println!("Loading level from {}...", path.display());
        let map_set = generator.load(path)?;
        println!("Loaded {} layers ({}x{})", map_set.len(), map_set.width, map_set.height);
    } else {
        println!("Generating {} layers...", generator.catalog().len());
        generator.generate()?;
        let layers = &generator.map_set().layers;
        for (index, (config, grid)) in generator.catalog().iter().zip(layers).enumerate() {
            println!(
                "  Layer {}: {} ({:.1}% wall)",
                index,
                config.algorithm,
                100.0 * grid.ratio(&Tile::Wall)
            );
        }
    }
    println!("Painted {} tiles", generator.sink().painted_count());

    if let Some(path) = &args.save {
        generator.save(path)?;
        println!("Saved level to {}", path.display());
    }

    if args.ascii {
        println!();
        print!("{}", generator.sink().to_ascii());
    }

    if let Some(path) = &args.export_ascii {
        generator.sink().export_ascii(path)?;
        println!("Exported ASCII to {}", path.display());
    }

    if let Some(path) = &args.png {
        generator.sink().export_png(path, args.png_scale)?;
        println!("Exported PNG to {}", path.display());
    }

    if let Some(level) = args.level {
        let progression = LevelProgression {
            current_level: level.max(1),
            enemies_to_spawn: level.max(1) * level_generator::progression::ENEMY_STEP,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(args.seed.map_or_else(rand::random, |seed| seed as u64));
        let plan = progression.spawn_plan(args.width as f32, 3, &mut rng);
        println!("Level {} spawns:", plan.level);
        for spawn in &plan.spawns {
            match spawn.kind {
                SpawnKind::Boss => println!("  boss at x = {:.1}", spawn.x),
                SpawnKind::Enemy { variant } => println!("  enemy {} at x = {:.1}", variant, spawn.x),
            }
        }
    }

    Ok(())
}
