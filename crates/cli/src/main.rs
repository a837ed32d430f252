//! Gridmask CLI - windowed inclusion masks from raster exclusion layers

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::ops::Range;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use gridmask_algorithms::config::MaskConfig;
use gridmask_core::io::{write_mask, GeoTiffStore};
use gridmask_core::{LayerStore, Window};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "gridmask")]
#[command(author, version, about = "Inclusion masks from raster exclusion layers", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the catalogue and shape of an exclusion layer store
    Info {
        /// Directory of single-band GeoTIFF layers
        store: PathBuf,
    },
    /// Compute an inclusion mask and write it as a float32 GeoTIFF
    Mask {
        /// Directory of single-band GeoTIFF layers
        store: PathBuf,
        /// JSON mask configuration (layers, min_area, kernel)
        config: PathBuf,
        /// Output mask file
        output: PathBuf,
        /// Row window as start:end (half-open); whole domain if omitted
        #[arg(long)]
        rows: Option<String>,
        /// Column window as start:end (half-open); whole domain if omitted
        #[arg(long)]
        cols: Option<String>,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn parse_range(s: &str) -> Result<Range<usize>> {
    let (start, end) = s
        .split_once(':')
        .with_context(|| format!("window range must be start:end, got: {s}"))?;
    let start: usize = start.trim().parse().context("invalid range start")?;
    let end: usize = end.trim().parse().context("invalid range end")?;
    if end <= start {
        anyhow::bail!("window range end must exceed start, got: {s}");
    }
    Ok(start..end)
}

fn parse_window(rows: Option<String>, cols: Option<String>) -> Result<Window> {
    match (rows, cols) {
        (None, None) => Ok(Window::Full),
        (Some(rows), Some(cols)) => Ok(Window::ranges(parse_range(&rows)?, parse_range(&cols)?)),
        _ => anyhow::bail!("--rows and --cols must be given together"),
    }
}

fn open_store(path: &PathBuf) -> Result<GeoTiffStore> {
    let pb = spinner("Opening layer store...");
    let store = GeoTiffStore::open(path).context("Failed to open layer store")?;
    pb.finish_and_clear();
    let (rows, cols) = store.shape();
    info!("Store: {} layers over {} x {}", store.catalogue().len(), rows, cols);
    Ok(store)
}

fn done(path: &PathBuf, elapsed: std::time::Duration) {
    println!("Mask saved to: {}", path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Info { store } => {
            let store = open_store(&store)?;
            let (rows, cols) = store.shape();
            println!("Dimensions: {} x {} ({} cells)", rows, cols, rows * cols);
            println!("Layers:");
            for name in store.catalogue() {
                println!("  {name}");
            }
        }

        Commands::Mask {
            store,
            config,
            output,
            rows,
            cols,
        } => {
            let store = open_store(&store)?;
            let config = MaskConfig::from_json_file(&config)
                .with_context(|| format!("Failed to read config {}", config.display()))?;
            let window = parse_window(rows, cols)?;

            let combiner = config.build(store).context("Invalid mask configuration")?;
            info!(
                "Combining {} layers (min_area: {:?} km², kernel: {})",
                combiner.len(),
                config.min_area,
                config.kernel
            );

            let pb = spinner("Computing mask...");
            let start = Instant::now();
            let mask = combiner.mask(&window).context("Mask computation failed")?;
            let elapsed = start.elapsed();
            pb.finish_and_clear();

            let included = mask.iter().filter(|&&v| v > 0.0).count();
            info!(
                "Included pixels: {} of {} ({:.1}%)",
                included,
                mask.len(),
                100.0 * included as f64 / mask.len() as f64
            );

            let pb = spinner("Writing output...");
            write_mask(&mask, &output).context("Failed to write mask")?;
            pb.finish_and_clear();

            done(&output, elapsed);
        }
    }

    Ok(())
}
