//! SectorLayer - radio network inventory to map overlays
//!
//! Reads site and cell inventories from CSV, draws a coverage wedge for
//! every cell, and writes the result as GeoPackages and KMZ archives.
//!
//! # High-Level API
//!
//! ```no_run
//! use sectorlayer::config::ConfigFile;
//! use sectorlayer::pipeline::Pipeline;
//!
//! let config = ConfigFile::load()?.to_run_config()?;
//! let report = Pipeline::for_config(&config).run(&config)?;
//! println!("{} sectors, success: {}", report.sectors, report.is_success());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The stages are usable on their own: [`sector::generate`] for a single
//! wedge, [`layer::assemble`] for layers, [`package::package`] and
//! [`export::KmzExporter`] for output.

pub mod config;
pub mod export;
pub mod inventory;
pub mod layer;
pub mod logging;
pub mod package;
pub mod pipeline;
pub mod sector;

/// Version of the SectorLayer library and CLI.
///
/// Synchronized across the workspace from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
