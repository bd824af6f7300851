//! Configuration for SectorLayer runs.
//!
//! Settings are read from an INI file (`~/.sectorlayer/config.ini` by
//! default) and converted into an explicit [`RunConfig`] that is handed to
//! every pipeline stage.
//!
//! # Example
//!
//! ```
//! use sectorlayer::config::ConfigFile;
//!
//! let mut config = ConfigFile::default();
//! config.sector.segments = 36;
//!
//! let run = config.to_run_config().unwrap();
//! assert_eq!(run.segments, 36);
//! assert!(run.sites_path.ends_with("Sites.csv"));
//! ```

mod defaults;
mod file;
mod parser;
mod run;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use run::{ExportFields, LayerNames, RunConfig};
pub use settings::{
    ConfigFile, ExportSettings, InputSettings, LoggingSettings, OutputSettings, SectorSettings,
    StyleSettings,
};
