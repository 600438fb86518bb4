//! geolay - Extract map overlays from KML and KMZ files

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use geolay::{Feature, Overlay, read_overlay};

#[derive(Parser)]
#[command(name = "geolay")]
#[command(version, about = "Extract map overlays from KML and KMZ files", long_about = None)]
#[command(after_help = "EXAMPLES:
    geolay trails.kmz            Summarize features and bounds
    geolay --json parcels.kml    Print the overlay as JSON")]
struct Cli {
    /// Input file (KML or KMZ)
    #[arg(value_name = "INPUT")]
    input: String,

    /// Print the extracted overlay as JSON
    #[arg(short, long)]
    json: bool,

    /// Zoom cap a renderer should apply to a single-point overlay
    #[arg(long, default_value_t = 16)]
    max_point_zoom: u8,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: failed to set tracing subscriber: {e}");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let overlay = read_overlay(&cli.input).map_err(|e| e.to_string())?;

    if cli.json {
        let json = serde_json::to_string_pretty(&overlay).map_err(|e| e.to_string())?;
        println!("{json}");
    } else {
        print_summary(&cli.input, &overlay, cli.max_point_zoom);
    }
    Ok(())
}

fn print_summary(path: &str, overlay: &Overlay, max_point_zoom: u8) {
    let (mut polygons, mut lines, mut points) = (0, 0, 0);
    for feature in &overlay.features {
        match feature {
            Feature::Polygon { .. } => polygons += 1,
            Feature::Polyline { .. } => lines += 1,
            Feature::Point { .. } => points += 1,
        }
    }

    println!("File: {path}");
    println!("Polygons: {polygons}");
    println!("Lines: {lines}");
    println!("Points: {points}");
    println!("Assets: {}", overlay.assets.len());

    let b = &overlay.bounds;
    println!(
        "Bounds: lat {:.6}..{:.6}, lng {:.6}..{:.6}",
        b.min_lat, b.max_lat, b.min_lng, b.max_lng
    );
    if overlay.is_single_point() {
        println!("Single point: zoom capped at {max_point_zoom}");
    }
}
