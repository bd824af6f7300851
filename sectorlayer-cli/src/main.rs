//! SectorLayer CLI - Command-line interface
//!
//! Turns a radio network inventory (sites and cells CSV files) into
//! GeoPackage layers and Google Earth KMZ files.

use clap::Parser;

mod commands;
mod error;
mod runner;

use commands::Commands;

#[derive(Parser)]
#[command(name = "sectorlayer")]
#[command(version, about = "Build map layers from a radio site and cell inventory", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        e.exit();
    }
}
