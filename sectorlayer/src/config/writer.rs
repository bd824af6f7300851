//! INI serialization: `ConfigFile` → commented INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to the commented INI text written to `config.ini`.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let columns = &config.input.columns;
    let styles_dir = config
        .styles
        .directory
        .as_ref()
        .map(|p| path_to_string(p))
        .unwrap_or_default();

    format!(
        r#"[input]
; Directory holding the inventory CSV files (relative to the working directory)
directory = {}
sites_file = {}
cells_file = {}
; Text encoding of the CSV files: latin-1 or utf-8
encoding = {}
; Column names. Beamwidth and radius columns are optional in the cells file;
; cells without them use the [sector] defaults.
site_id_column = {}
latitude_column = {}
longitude_column = {}
azimuth_column = {}
beamwidth_column = {}
radius_column = {}

[sector]
; Arc subdivisions per wedge (default: 20)
segments = {}
; Default radius in meters (default: 200)
radius = {}
; Default beamwidth in degrees, 360 for a full circle (default: 60)
beamwidth = {}
; Distance model:
;   geodesic  - WGS84 ellipsoid (most accurate)
;   spherical - haversine on the mean Earth radius
;   planar    - local flat approximation, short radii only
model = {}

[output]
directory = {}
; Replace existing GeoPackages (KMZ files are always replaced)
overwrite = {}
; Write the sorted inventory back as Sites_mod.csv / Cells_mod.csv
write_normalized = {}
sites_layer = {}
cells_layer = {}
sectors_layer = {}

[export]
; Field used as the placemark label
site_name_field = {}
cell_name_field = {}
; Comma-separated fields listed in each placemark description.
; Leave empty to list every field.
site_description_fields = {}
cell_description_fields = {}

[styles]
; Directory of QGIS style files. If empty, <input directory>/qgis_styles
directory = {}
; Leave a file name empty to package the layer unstyled
sites_style = {}
cells_style = {}

[logging]
file = {}
"#,
        path_to_string(&config.input.directory),
        config.input.sites_file,
        config.input.cells_file,
        config.input.encoding,
        columns.site_id,
        columns.latitude,
        columns.longitude,
        columns.azimuth,
        columns.beamwidth,
        columns.radius,
        config.sector.segments,
        config.sector.radius,
        config.sector.beamwidth,
        config.sector.model,
        path_to_string(&config.output.directory),
        config.output.overwrite,
        config.output.write_normalized,
        config.output.sites_layer,
        config.output.cells_layer,
        config.output.sectors_layer,
        config.export.site_name_field,
        config.export.cell_name_field,
        config.export.site_description_fields.join(", "),
        config.export.cell_description_fields.join(", "),
        styles_dir,
        config.styles.sites_style,
        config.styles.cells_style,
        path_to_string(&config.logging.file),
    )
}

/// Convert path to string, collapsing home dir to ~.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::super::settings::ConfigFile;
    use crate::inventory::TextEncoding;
    use crate::sector::ModelKind;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        let mut config = ConfigFile::default();
        config.input.encoding = TextEncoding::Utf8;
        config.input.columns.site_id = "SiteCode".to_string();
        config.sector.segments = 48;
        config.sector.radius = 125.5;
        config.sector.model = ModelKind::Planar;
        config.output.overwrite = true;
        config.export.cell_description_fields = vec!["Site_ID".into(), "Azimuth".into()];
        config.styles.directory = Some(PathBuf::from("/srv/styles"));

        config.save_to(&config_path).unwrap();
        let loaded = ConfigFile::load_from(&config_path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_default_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.ini");

        ConfigFile::default().save_to(&config_path).unwrap();
        let loaded = ConfigFile::load_from(&config_path).unwrap();

        assert_eq!(loaded, ConfigFile::default());
    }
}
