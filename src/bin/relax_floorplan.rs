use clap::Parser;
use log::info;
use panorelax::dataset::Dataset;
use panorelax::layout::{relax_floor_plan, LayoutConfig};
use std::path::PathBuf;
use std::time::Instant;

/// Spread floor plan nodes apart while preserving corridor links.
#[derive(Parser, Debug)]
#[clap(author, about)]
struct Opts {
    /// Number of relaxation steps to run.
    #[clap(long, default_value = "750")]
    iterations: usize,
    /// Reserved border space around the layout (0-0.5).
    #[clap(long, default_value = "0.2")]
    margin: f64,
    /// Compute the layout but do not write the dataset back to disk.
    #[clap(long)]
    dry_run: bool,
    /// Run the repulsion pass on the rayon thread pool.
    #[clap(long)]
    parallel: bool,
    /// Floor plan dataset to relax.
    #[clap(long, default_value = "data/panorama-map.json")]
    dataset: PathBuf,
}

fn main() {
    env_logger::init();
    let opts = Opts::parse();
    if let Err(err) = run(&opts) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(opts: &Opts) -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();
    let mut dataset = Dataset::from_json_file(&opts.dataset)?;
    let config = LayoutConfig {
        iterations: opts.iterations,
        margin: opts.margin,
        parallel: opts.parallel,
        ..LayoutConfig::default()
    };
    relax_floor_plan(&mut dataset, &config)?;
    info!("layout took {} ms", started.elapsed().as_millis());

    if opts.dry_run {
        println!("Layout computed. Dry run requested; not writing output.");
        return Ok(());
    }
    dataset.to_json_file(&opts.dataset)?;
    println!("Relaxed layout written to {}", opts.dataset.display());
    Ok(())
}
