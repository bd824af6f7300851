//! Inventory record store.
//!
//! Reads the sites and cells CSV files, validates them, and hands them out
//! sorted by site id so every downstream artifact has a deterministic
//! feature order.
//!
//! # Files
//!
//! - Sites: one row per site, requires site id, latitude and longitude.
//! - Cells: one row per antenna, requires site id, latitude, longitude and
//!   azimuth; beamwidth and radius columns are optional.
//!
//! Both files are comma-separated and Latin-1 encoded unless configured
//! otherwise.

mod encoding;
mod reader;
mod records;
mod writer;

use std::path::PathBuf;

use thiserror::Error;

pub use encoding::TextEncoding;
pub use reader::{read_cells, read_sites, CellDefaults, ColumnMap, InputOptions};
pub use records::{CellRecord, CellSet, Record, RecordSet, SiteRecord, SiteSet};
pub use writer::{encode_normalized, write_normalized};

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' is not valid {encoding} text")]
    InvalidEncoding {
        path: PathBuf,
        encoding: TextEncoding,
    },

    #[error("Malformed CSV in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("'{path}' is missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("'{path}' line {line}: empty site id")]
    EmptySiteId { path: PathBuf, line: u64 },

    #[error("'{path}' line {line} (site '{site_id}'): {column} = '{value}' - {reason}")]
    InvalidValue {
        path: PathBuf,
        line: u64,
        site_id: String,
        column: String,
        value: String,
        reason: String,
    },

    #[error("'{path}': duplicate site id '{site_id}' on lines {first_line} and {line}")]
    DuplicateSiteId {
        path: PathBuf,
        site_id: String,
        first_line: u64,
        line: u64,
    },

    #[error("'{path}' line {line}: {column} contains '{character}' which has no {encoding} encoding")]
    Unencodable {
        path: PathBuf,
        line: u64,
        column: String,
        character: char,
        encoding: TextEncoding,
    },
}

/// Validated, sorted inventory snapshot.
#[derive(Debug, Clone)]
pub struct Inventory {
    pub sites: SiteSet,
    pub cells: CellSet,
}

impl Inventory {
    /// Load both inventory files.
    pub fn load(
        sites_path: &std::path::Path,
        cells_path: &std::path::Path,
        options: &InputOptions,
        defaults: &CellDefaults,
    ) -> Result<Self, InputError> {
        let sites = read_sites(sites_path, options)?;
        let cells = read_cells(cells_path, options, defaults)?;
        Ok(Self { sites, cells })
    }
}
