//! Reading and writing `~/.sectorlayer/config.ini`.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ini::Ini;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use super::settings::ConfigFile;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A key parsed but its value is out of range or unknown
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    #[error("Failed to create config directory {path}: {source}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ConfigFile {
    /// Load from `~/.sectorlayer/config.ini`.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        match Ini::load_from_file(path) {
            Ok(ini) => super::parser::parse_ini(&ini),
            Err(ini::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigFileError::ReadError {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Render the configuration as commented INI text.
    pub fn to_ini_string(&self) -> String {
        super::writer::to_config_string(self)
    }

    /// Write to `path`, creating missing parent directories.
    ///
    /// The text is written to a temporary file beside `path` and then
    /// renamed over it.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|source| ConfigFileError::DirectoryError {
            path: dir.to_path_buf(),
            source,
        })?;

        let write_error = |source| ConfigFileError::WriteError {
            path: path.to_path_buf(),
            source,
        };
        let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
        temp.write_all(self.to_ini_string().as_bytes()).map_err(write_error)?;
        temp.persist(path).map_err(|e| write_error(e.error))?;

        debug!(path = %path.display(), "Saved config file");
        Ok(())
    }
}

/// `~/.sectorlayer`, or `./.sectorlayer` when there is no home directory.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sectorlayer")
}

/// `~/.sectorlayer/config.ini`.
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use tempfile::TempDir;

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_unreadable_file_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        fs::write(&config_path, "[sector\nsegments = 8\n").unwrap();

        match ConfigFile::load_from(&config_path) {
            Err(ConfigFileError::ReadError { path, source }) => {
                assert_eq!(path, config_path);
                assert!(matches!(source, ini::Error::Parse(_)));
            }
            other => panic!("expected ReadError, got {:?}", other),
        }
    }

    #[test]
    fn test_parent_is_a_file_keeps_io_source() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let err = ConfigFile::default()
            .save_to(&blocker.join("config.ini"))
            .unwrap_err();
        match &err {
            ConfigFileError::DirectoryError { path, .. } => assert_eq!(*path, blocker),
            other => panic!("expected DirectoryError, got {:?}", other),
        }
        assert!(err.source().is_some());
    }

    #[test]
    fn test_write_over_directory_keeps_io_source() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("config.ini");
        fs::create_dir(&target).unwrap();

        let err = ConfigFile::default().save_to(&target).unwrap_err();
        match &err {
            ConfigFileError::WriteError { path, .. } => assert_eq!(*path, target),
            other => panic!("expected WriteError, got {:?}", other),
        }
        assert!(err.source().is_some());
        // The temporary file is cleaned up
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        fs::write(&config_path, "stale").unwrap();

        let mut config = ConfigFile::default();
        config.sector.segments = 12;
        config.save_to(&config_path).unwrap();

        assert_eq!(ConfigFile::load_from(&config_path).unwrap(), config);
    }

    #[test]
    fn test_config_file_path() {
        let path = config_file_path();
        assert!(path.ends_with(".sectorlayer/config.ini"));
    }
}
