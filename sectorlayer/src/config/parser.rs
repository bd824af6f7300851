//! INI parsing: `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names map to struct fields.

use std::path::PathBuf;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::sector::FULL_CIRCLE;

/// Parse an `Ini` into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [input] section
    if let Some(section) = ini.section(Some("input")) {
        if let Some(v) = non_empty(section, "directory") {
            config.input.directory = expand_tilde(v);
        }
        if let Some(v) = non_empty(section, "sites_file") {
            config.input.sites_file = v.to_string();
        }
        if let Some(v) = non_empty(section, "cells_file") {
            config.input.cells_file = v.to_string();
        }
        if let Some(v) = section.get("encoding") {
            config.input.encoding = v
                .parse()
                .map_err(|reason| invalid("input", "encoding", v, reason))?;
        }

        let columns = &mut config.input.columns;
        for (key, slot) in [
            ("site_id_column", &mut columns.site_id),
            ("latitude_column", &mut columns.latitude),
            ("longitude_column", &mut columns.longitude),
            ("azimuth_column", &mut columns.azimuth),
            ("beamwidth_column", &mut columns.beamwidth),
            ("radius_column", &mut columns.radius),
        ] {
            if let Some(v) = non_empty(section, key) {
                *slot = v.to_string();
            }
        }
    }

    // [sector] section
    if let Some(section) = ini.section(Some("sector")) {
        if let Some(v) = section.get("segments") {
            config.sector.segments = match v.trim().parse::<u32>() {
                Ok(n) if n >= 1 => n,
                _ => return Err(invalid("sector", "segments", v, "must be an integer >= 1")),
            };
        }
        if let Some(v) = section.get("radius") {
            config.sector.radius = match v.trim().parse::<f64>() {
                Ok(r) if r.is_finite() && r > 0.0 => r,
                _ => return Err(invalid("sector", "radius", v, "must be a positive number of meters")),
            };
        }
        if let Some(v) = section.get("beamwidth") {
            config.sector.beamwidth = match v.trim().parse::<f64>() {
                Ok(b) if b > 0.0 && b <= FULL_CIRCLE => b,
                _ => {
                    return Err(invalid(
                        "sector",
                        "beamwidth",
                        v,
                        "must be greater than 0 and at most 360 degrees",
                    ))
                }
            };
        }
        if let Some(v) = section.get("model") {
            config.sector.model = v
                .parse()
                .map_err(|reason| invalid("sector", "model", v, reason))?;
        }
    }

    // [output] section
    if let Some(section) = ini.section(Some("output")) {
        if let Some(v) = non_empty(section, "directory") {
            config.output.directory = expand_tilde(v);
        }
        if let Some(v) = section.get("overwrite") {
            config.output.overwrite = parse_bool(v);
        }
        if let Some(v) = section.get("write_normalized") {
            config.output.write_normalized = parse_bool(v);
        }
        if let Some(v) = non_empty(section, "sites_layer") {
            config.output.sites_layer = v.to_string();
        }
        if let Some(v) = non_empty(section, "cells_layer") {
            config.output.cells_layer = v.to_string();
        }
        if let Some(v) = non_empty(section, "sectors_layer") {
            config.output.sectors_layer = v.to_string();
        }
    }

    // [export] section
    if let Some(section) = ini.section(Some("export")) {
        if let Some(v) = non_empty(section, "site_name_field") {
            config.export.site_name_field = v.to_string();
        }
        if let Some(v) = non_empty(section, "cell_name_field") {
            config.export.cell_name_field = v.to_string();
        }
        if let Some(v) = section.get("site_description_fields") {
            config.export.site_description_fields = parse_list(v);
        }
        if let Some(v) = section.get("cell_description_fields") {
            config.export.cell_description_fields = parse_list(v);
        }
    }

    // [styles] section
    if let Some(section) = ini.section(Some("styles")) {
        if let Some(v) = non_empty(section, "directory") {
            config.styles.directory = Some(expand_tilde(v));
        }
        if let Some(v) = section.get("sites_style") {
            config.styles.sites_style = v.trim().to_string();
        }
        if let Some(v) = section.get("cells_style") {
            config.styles.cells_style = v.trim().to_string();
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section, "file") {
            config.logging.file = expand_tilde(v);
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: impl Into<String>) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a boolean; anything unrecognised is false.
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Comma-separated list, blanks dropped.
pub(super) fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
