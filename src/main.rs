// Demo runner for the `mosaic_engine` library: loads an image, clamps it to
// the size limits, builds a photomosaic against the built-in swatch resolver,
// and writes the result as a PNG.

use mosaic_engine::core_modules::utils::image_helper::image_helper::{
    MAX_HEIGHT, MAX_WIDTH, load, save, scale_to_fit,
};
use mosaic_engine::pipeline::{MosaicBuilder, PipelineConfig};
use mosaic_engine::resolver::SwatchResolver;
use std::env;
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Argument Parsing & Setup ---
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        println!("Usage: mosaic_engine <input_image> <output_image> [tile_size]");
        return Ok(());
    }
    let input_path = Path::new(&args[1]);
    let output_path = Path::new(&args[2]);
    let tile_size: u32 = match args.get(3) {
        Some(raw) => raw.parse()?,
        None => 16,
    };

    // --- 2. Input Loading & Pre-scaling ---
    let image = load(input_path)?;
    println!(
        "Loaded {}x{} image from {}",
        image.width(),
        image.height(),
        input_path.display()
    );
    let image = scale_to_fit(&image, MAX_WIDTH, MAX_HEIGHT)?;

    // --- 3. Pipeline Initialization ---
    let config = PipelineConfig {
        tile_width: tile_size,
        tile_height: tile_size,
        ..PipelineConfig::for_host()
    };
    let builder = MosaicBuilder::new(config)?;
    let resolver = SwatchResolver::new(tile_size, tile_size);

    // --- 4. Build & Output ---
    println!(
        "Building mosaic with {}x{} tiles on {} workers...",
        tile_size,
        tile_size,
        builder.workers()
    );
    let mosaic = builder.build(&image, &resolver).await?;
    save(output_path, &mosaic)?;
    println!("Saved mosaic to {}", output_path.display());

    Ok(())
}
