//! cavern-gen: generate cavern maps from example CSV maps.
//!
//! ```text
//! cavern-gen --input-dir maps --out out/cavern.csv --png out/cavern.png -n 3 --width 32 --height 24
//! ```
//!
//! Flags override values loaded with `--config`. Without any output path the
//! generated grid is printed to stdout as CSV.

use anyhow::{anyhow, bail, Context, Result};
use cavern_core::map_io::grid_to_csv;
use cavern_core::{
    difficulty, generate, load_all_maps, load_csv_map, render_to_png, save_grid_csv,
    save_labeled, PipelineConfig, RngKind, TileGrid, TilePalette,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn print_help() {
    println!("cavern-gen: overlapping WFC cavern map generator");
    println!();
    println!("Usage: cavern-gen [options]");
    println!();
    println!("Inputs:");
    println!("  --config <file>        JSON pipeline config");
    println!("  --input <file>         example CSV map (repeatable)");
    println!("  --input-dir <dir>      load every *.csv in a directory");
    println!();
    println!("Generator:");
    println!("  -n, --pattern-size <n> pattern size (default 3)");
    println!("  --width <w>            output width in pattern cells (default 20)");
    println!("  --height <h>           output height in pattern cells (default 20)");
    println!("  --seed <i32>           random seed (default 12345)");
    println!("  --random-seed          draw a fresh seed");
    println!("  --periodic             wrap input borders (default)");
    println!("  --no-periodic          do not wrap input borders");
    println!("  --attempts <k>         solver runs before giving up (default 1)");
    println!("  --std-rng              use the std RNG instead of the .NET-compatible one");
    println!();
    println!("Outputs:");
    println!("  --out <file>           write the grid as CSV");
    println!("  --labeled <file>       write CSV with a difficulty label line");
    println!("  --png <file>           write a PNG preview");
    println!("  --pixel-size <px>      pixels per tile in the preview (default 8)");
    println!();
    println!("Logging is controlled by RUST_LOG (default cavern=info).");
}

/// Flags as given on the command line; `None` leaves the config value alone.
#[derive(Debug, Default)]
struct CliArgs {
    help: bool,
    config: Option<PathBuf>,
    inputs: Vec<PathBuf>,
    input_dir: Option<PathBuf>,
    out: Option<PathBuf>,
    labeled: Option<PathBuf>,
    png: Option<PathBuf>,
    pixel_size: Option<u32>,
    pattern_size: Option<usize>,
    width: Option<usize>,
    height: Option<usize>,
    seed: Option<i32>,
    random_seed: bool,
    periodic: Option<bool>,
    attempts: Option<usize>,
    std_rng: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
    fn value<T: std::str::FromStr>(
        flag: &str,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<T>
    where
        T::Err: std::fmt::Display,
    {
        let raw = args
            .next()
            .ok_or_else(|| anyhow!("{} expects a value", flag))?;
        raw.parse::<T>()
            .map_err(|e| anyhow!("invalid value {:?} for {}: {}", raw, flag, e))
    }

    let mut cli = CliArgs::default();
    let mut args = args.into_iter();
    while let Some(a) = args.next() {
        match a.as_str() {
            "-h" | "--help" | "help" => cli.help = true,
            "--config" => cli.config = Some(value(&a, &mut args)?),
            "--input" => cli.inputs.push(value(&a, &mut args)?),
            "--input-dir" => cli.input_dir = Some(value(&a, &mut args)?),
            "--out" => cli.out = Some(value(&a, &mut args)?),
            "--labeled" => cli.labeled = Some(value(&a, &mut args)?),
            "--png" => cli.png = Some(value(&a, &mut args)?),
            "--pixel-size" => cli.pixel_size = Some(value(&a, &mut args)?),
            "-n" | "--pattern-size" => cli.pattern_size = Some(value(&a, &mut args)?),
            "--width" => cli.width = Some(value(&a, &mut args)?),
            "--height" => cli.height = Some(value(&a, &mut args)?),
            "--seed" => cli.seed = Some(value(&a, &mut args)?),
            "--random-seed" => cli.random_seed = true,
            "--periodic" => cli.periodic = Some(true),
            "--no-periodic" => cli.periodic = Some(false),
            "--attempts" => cli.attempts = Some(value(&a, &mut args)?),
            "--std-rng" => cli.std_rng = true,
            other => bail!("unknown argument: {} (see --help)", other),
        }
    }
    Ok(cli)
}

/// Merge the config file (if any) with command-line overrides.
fn resolve_config(cli: &CliArgs) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    config.inputs.files.extend(cli.inputs.iter().cloned());
    if let Some(dir) = &cli.input_dir {
        config.inputs.dir = Some(dir.clone());
    }

    let generator = &mut config.generator;
    if let Some(n) = cli.pattern_size {
        generator.pattern_size = n;
    }
    if let Some(w) = cli.width {
        generator.out_width = w;
    }
    if let Some(h) = cli.height {
        generator.out_height = h;
    }
    if let Some(seed) = cli.seed {
        generator.seed = Some(seed);
    }
    if cli.random_seed {
        generator.seed = None;
    }
    if let Some(periodic) = cli.periodic {
        generator.periodic_input = periodic;
    }
    if let Some(attempts) = cli.attempts {
        generator.attempts = attempts;
    }
    if cli.std_rng {
        generator.rng = RngKind::Std;
    }

    let output = &mut config.output;
    if cli.out.is_some() {
        output.csv = cli.out.clone();
    }
    if cli.labeled.is_some() {
        output.labeled = cli.labeled.clone();
    }
    if cli.png.is_some() {
        output.png = cli.png.clone();
    }
    if let Some(px) = cli.pixel_size {
        output.pixel_size = px;
    }

    config.validate()?;
    Ok(config)
}

fn load_inputs(config: &PipelineConfig) -> Result<Vec<TileGrid>> {
    let mut maps = Vec::new();
    for path in &config.inputs.files {
        let map =
            load_csv_map(path).with_context(|| format!("loading map {}", path.display()))?;
        maps.push(map);
    }
    if let Some(dir) = &config.inputs.dir {
        let loaded = load_all_maps(dir)
            .with_context(|| format!("loading maps from {}", dir.display()))?;
        maps.extend(loaded);
    }
    if maps.is_empty() {
        bail!("no input maps: pass --input, --input-dir or a config with inputs");
    }
    Ok(maps)
}

fn run(config: &PipelineConfig) -> Result<()> {
    let inputs = load_inputs(config)?;
    let generation = generate(&inputs, &config.generator).context("generation failed")?;
    let tiles = &generation.tiles;

    info!(
        seed = generation.seed,
        attempts = generation.attempts,
        patterns = generation.pattern_count,
        difficulty = ?difficulty(tiles),
        "generated {}x{} map",
        tiles.width(),
        tiles.height()
    );

    let output = &config.output;
    if let Some(path) = &output.csv {
        save_grid_csv(tiles, path).with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = &output.labeled {
        save_labeled(tiles, path).with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = &output.png {
        render_to_png(tiles, &TilePalette::default(), output.pixel_size, path)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    if output.csv.is_none() && output.labeled.is_none() && output.png.is_none() {
        print!("{}", grid_to_csv(tiles));
    }
    Ok(())
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays usable for CSV
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("cavern=info".parse()?))
        .init();

    let cli = parse_args(std::env::args().skip(1))?;
    if cli.help {
        print_help();
        return Ok(());
    }

    let config = resolve_config(&cli)?;
    run(&config)
}
