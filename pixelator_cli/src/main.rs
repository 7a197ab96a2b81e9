use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command, value_parser};
use pixelator::parallel_pipeline::{ParallelPixelator, PassOutcome, SharedSource};
use pixelator::pipeline::{MAX_GRID_SIZE, MIN_GRID_SIZE};
use pixelator::{Interpolator, Pixelation, PixelationConfig, RankedPalette};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod image_helper;

fn command() -> Command {
    Command::new("pixelate")
        .version(clap::crate_version!())
        .about("Pixelates an image into uniformly colored blocks and lists the colors used.")
        .arg(
            Arg::new("input")
                .help("The image to pixelate")
                .required(true)
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .index(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Where to write the pixelated PNG"),
        )
        .arg(
            Arg::new("grid_size")
                .short('g')
                .long("grid-size")
                .value_name("PIXELS")
                .value_parser(value_parser!(u32).range(MIN_GRID_SIZE as i64..=MAX_GRID_SIZE as i64))
                .default_value("16")
                .help("Edge length of one block"),
        )
        .arg(
            Arg::new("interpolator")
                .short('i')
                .long("interpolator")
                .value_name("NAME")
                .value_parser(|s: &str| s.parse::<Interpolator>())
                .default_value("middle-pixel")
                .help("middle-pixel, dominant-pixel or weighted-average"),
        )
        .arg(
            Arg::new("no_grid")
                .long("no-grid")
                .action(ArgAction::SetTrue)
                .help("Do not draw grid lines (print layout)"),
        )
        .arg(
            Arg::new("palette_json")
                .long("palette-json")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Also write the ranked palette as JSON"),
        )
        .arg(
            Arg::new("workers")
                .short('j')
                .long("workers")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .help("Worker tasks for the pass (defaults to the number of CPUs)"),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- 1. Argument Parsing & Setup ---
    let matches = command().get_matches();
    let input = matches
        .get_one::<PathBuf>("input")
        .context("missing input path")?;
    let config = PixelationConfig {
        grid_size: *matches.get_one::<u32>("grid_size").context("missing grid size")?,
        interpolator: *matches
            .get_one::<Interpolator>("interpolator")
            .context("missing interpolator")?,
        draw_grid: !matches.get_flag("no_grid"),
    };
    config.validate()?;

    // --- 2. Image Loading ---
    let image = image_helper::load(input)?;
    println!(
        "Loaded {} ({}x{}), grid {}, {}",
        input.display(),
        image.width(),
        image.height(),
        config.grid_label(),
        config.interpolator
    );

    // --- 3. Pixelation Pass ---
    let pixelator = match matches.get_one::<usize>("workers") {
        Some(&workers) => ParallelPixelator::with_workers(workers),
        None => ParallelPixelator::new(),
    };
    let source: SharedSource = Arc::new(image);
    let pixelation = match pixelator.render(Some(source), &config).await? {
        PassOutcome::Current(pixelation) => pixelation,
        PassOutcome::Superseded { ticket, latest } => {
            anyhow::bail!("pass {ticket:?} was superseded by {latest:?}")
        }
    };

    // --- 4. Output ---
    let palette = pixelation.palette();
    print_palette(&pixelation, &palette);

    if let Some(output) = matches.get_one::<PathBuf>("output") {
        image_helper::save(output, &pixelation.rasterize())?;
        println!("Pixelated image saved to {}", output.display());
    }

    if let Some(path) = matches.get_one::<PathBuf>("palette_json") {
        write_palette_json(path, &config, &palette)?;
        println!("Palette saved to {}", path.display());
    }

    Ok(())
}

fn print_palette(pixelation: &Pixelation, palette: &RankedPalette) {
    println!(
        "{} blocks, {} distinct colors, showing {}:",
        pixelation.block_count(),
        pixelation.usage.len(),
        palette.len()
    );
    for entry in palette {
        println!("  {entry}");
    }
}

fn write_palette_json(path: &Path, config: &PixelationConfig, palette: &RankedPalette) -> Result<()> {
    let document = serde_json::json!({
        "config": config,
        "palette": palette,
    });
    let file = std::fs::File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, &document)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
