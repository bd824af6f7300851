//! Integration tests for a full inventory run.
//!
//! Each test builds an `inputs/` tree in a temporary directory, runs the
//! pipeline, and inspects `outputs/`.
//!
//! Run with: `cargo test --test pipeline_integration`

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::ZipArchive;

use sectorlayer::config::{ConfigFile, RunConfig};
use sectorlayer::layer::{FieldValue, Geometry, GeometryKind};
use sectorlayer::package::read_package;
use sectorlayer::pipeline::{Artifact, ErrorKind, Pipeline};

// ============================================================================
// Test Helpers
// ============================================================================

const SITES: &[u8] = b"Site_ID,Name,Latitude,Longitude\n\
S2,Alcal\xe1 Norte,41.0,-3.5\n\
S1,Centro,40.0,-3.0\n";

const CELLS: &[u8] = b"Site_ID,Cell,Latitude,Longitude,Azimuth,Beamwidth,Radius\n\
S2,S2A,41.0,-3.5,0,65,300\n\
S1,S1A,40.0,-3.0,90,60,200\n\
S1,S1B,40.0,-3.0,210,,\n";

const STYLE: &str = "<!DOCTYPE qgis><qgis version=\"3.28\"></qgis>";

struct Workspace {
    _temp: TempDir,
    inputs: PathBuf,
    outputs: PathBuf,
}

impl Workspace {
    fn new(sites: &[u8], cells: &[u8]) -> Self {
        let temp = TempDir::new().unwrap();
        let inputs = temp.path().join("inputs");
        let outputs = temp.path().join("outputs");
        fs::create_dir_all(&inputs).unwrap();
        fs::write(inputs.join("Sites.csv"), sites).unwrap();
        fs::write(inputs.join("Cells.csv"), cells).unwrap();
        Self {
            _temp: temp,
            inputs,
            outputs,
        }
    }

    fn add_style(&self, name: &str) {
        let dir = self.inputs.join("qgis_styles");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), STYLE).unwrap();
    }

    fn config(&self) -> ConfigFile {
        let mut config = ConfigFile::default();
        config.input.directory = self.inputs.clone();
        config.output.directory = self.outputs.clone();
        config.sector.segments = 4;
        config
    }

    fn run_config(&self) -> RunConfig {
        self.config().to_run_config().unwrap()
    }
}

fn read_kml(path: &Path) -> String {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name("doc.kml").unwrap();
    let mut kml = String::new();
    entry.read_to_string(&mut kml).unwrap();
    kml
}

// ============================================================================
// Full run
// ============================================================================

#[test]
fn test_full_run_writes_every_artifact() {
    let ws = Workspace::new(SITES, CELLS);
    let config = ws.run_config();

    let report = Pipeline::for_config(&config).run(&config).unwrap();

    assert!(report.is_success());
    assert_eq!(report.sites, 2);
    assert_eq!(report.cells, 3);
    assert_eq!(report.sectors, 3);
    assert_eq!(report.artifacts.len(), 6);

    for name in [
        "Sites_mod.csv",
        "Cells_mod.csv",
        "Sites_for_GE.gpkg",
        "Cells_for_GE.gpkg",
        "Sites_for_GE.kmz",
        "Cells_for_GE.kmz",
    ] {
        assert!(ws.outputs.join(name).exists(), "{} missing", name);
    }
}

#[test]
fn test_sector_geometry_in_package() {
    let ws = Workspace::new(SITES, CELLS);
    let config = ws.run_config();
    Pipeline::for_config(&config).run(&config).unwrap();

    let layers = read_package(&ws.outputs.join("Cells_for_GE.gpkg")).unwrap();
    let names: Vec<&str> = layers.iter().map(|l| l.name()).collect();
    assert_eq!(names, vec!["Cells_for_GE", "cellFile"]);

    let sectors = &layers[1];
    assert_eq!(sectors.kind(), GeometryKind::Polygon);
    assert_eq!(sectors.len(), 3);

    // Sorted by site id: S1A, S1B, S2A
    let first = &sectors.features()[0];
    assert_eq!(first.value("Cell"), Some(&FieldValue::Text("S1A".into())));
    assert_eq!(first.value("Azimuth"), Some(&FieldValue::Integer(90)));

    let Geometry::Polygon(polygon) = &first.geometry else {
        panic!("expected polygon");
    };
    let ring: Vec<_> = polygon.exterior().coords().collect();
    // apex, 5 arc vertices, apex
    assert_eq!(ring.len(), 7);
    assert_eq!((ring[0].x, ring[0].y), (-3.0, 40.0));
    assert_eq!(ring[0], ring[6]);
    // arc runs from bearing 60 to 120, east of the apex
    assert!(ring[1..6].iter().all(|c| c.x > -3.0));
    assert!(ring[1].y > 40.0 && ring[5].y < 40.0);
}

#[test]
fn test_cells_without_parameters_use_defaults() {
    let ws = Workspace::new(SITES, CELLS);
    let mut config = ws.config();
    config.sector.beamwidth = 360.0;
    config.sector.radius = 500.0;
    let config = config.to_run_config().unwrap();
    Pipeline::for_config(&config).run(&config).unwrap();

    let layers = read_package(&ws.outputs.join("Cells_for_GE.gpkg")).unwrap();
    let s1b = &layers[1].features()[1];
    assert_eq!(s1b.value("Cell"), Some(&FieldValue::Text("S1B".into())));

    // Full circle: no apex, segments + 1 vertices
    let Geometry::Polygon(polygon) = &s1b.geometry else {
        panic!("expected polygon");
    };
    assert_eq!(polygon.exterior().0.len(), 5);
}

#[test]
fn test_kmz_placemarks() {
    let ws = Workspace::new(SITES, CELLS);
    let config = ws.run_config();
    Pipeline::for_config(&config).run(&config).unwrap();

    let sites = read_kml(&ws.outputs.join("Sites_for_GE.kmz"));
    assert_eq!(sites.matches("<Placemark>").count(), 2);
    let s1 = sites.find("<name>S1</name>").unwrap();
    let s2 = sites.find("<name>S2</name>").unwrap();
    assert!(s1 < s2);
    assert!(sites.contains("Alcalá Norte"));

    let cells = read_kml(&ws.outputs.join("Cells_for_GE.kmz"));
    assert_eq!(cells.matches("<Polygon>").count(), 3);
    assert!(cells.contains("<name>S1</name>"));
    assert!(cells.contains("<b>Azimuth</b></td><td>90</td>"));
    assert!(cells.contains("<b>Radius</b></td><td>200</td>"));
}

#[test]
fn test_normalized_csv_sorted_and_latin1() {
    let ws = Workspace::new(SITES, CELLS);
    let config = ws.run_config();
    Pipeline::for_config(&config).run(&config).unwrap();

    let sites = fs::read(ws.outputs.join("Sites_mod.csv")).unwrap();
    let expected: &[u8] = b"Site_ID,Name,Latitude,Longitude\n\
S1,Centro,40.0,-3.0\n\
S2,Alcal\xe1 Norte,41.0,-3.5\n";
    assert_eq!(sites, expected);

    let cells = fs::read_to_string(ws.outputs.join("Cells_mod.csv")).unwrap();
    let order: Vec<&str> = cells
        .lines()
        .skip(1)
        .map(|l| l.split(',').nth(1).unwrap())
        .collect();
    assert_eq!(order, vec!["S1A", "S1B", "S2A"]);
}

#[test]
fn test_styles_attached_when_present() {
    let ws = Workspace::new(SITES, CELLS);
    ws.add_style("style_Sites.qml");
    let config = ws.run_config();
    Pipeline::for_config(&config).run(&config).unwrap();

    let sites = read_package(&ws.outputs.join("Sites_for_GE.gpkg")).unwrap();
    let style = sites[0].style().unwrap();
    assert_eq!(style.name, "style_Sites");
    assert_eq!(style.body, STYLE.as_bytes());

    // style_Cells.qml is missing: sectors are packaged unstyled.
    let cells = read_package(&ws.outputs.join("Cells_for_GE.gpkg")).unwrap();
    assert!(cells[1].style().is_none());
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_duplicate_site_writes_nothing() {
    let sites = b"Site_ID,Latitude,Longitude\nS1,40.0,-3.0\nS2,41.0,-3.5\nS1,40.5,-3.2\n";
    let ws = Workspace::new(sites, CELLS);
    let config = ws.run_config();

    let err = Pipeline::for_config(&config).run(&config).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InputValidation);
    assert!(err.to_string().contains("S1"));
    assert!(!ws.outputs.exists());
}

#[test]
fn test_out_of_range_cell_writes_nothing() {
    let cells = b"Site_ID,Latitude,Longitude,Azimuth,Beamwidth\nS1,40.0,-3.0,90,400\n";
    let ws = Workspace::new(SITES, cells);
    let config = ws.run_config();

    let err = Pipeline::for_config(&config).run(&config).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InputValidation);
    assert!(!ws.outputs.exists());
}

#[test]
fn test_unknown_export_field_writes_nothing() {
    let ws = Workspace::new(SITES, CELLS);
    let mut config = ws.config();
    config.export.cell_name_field = "Cell_Name".to_string();
    let config = config.to_run_config().unwrap();

    let err = Pipeline::for_config(&config).run(&config).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InputValidation);
    assert!(err.to_string().contains("Cell_Name"));
    assert!(!ws.outputs.exists());
}

#[test]
fn test_reserved_column_writes_nothing() {
    let sites = b"Site_ID,fid,Latitude,Longitude\nS1,1,40.0,-3.0\nS2,2,41.0,-3.5\n";
    let ws = Workspace::new(sites, CELLS);
    let config = ws.run_config();

    let err = Pipeline::for_config(&config).run(&config).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InputValidation);
    assert!(err.to_string().contains("fid"));
    assert!(!ws.outputs.exists());
}

#[test]
fn test_collapsed_full_circle_writes_nothing() {
    let cells = b"Site_ID,Latitude,Longitude,Azimuth,Beamwidth\nS1,40.0,-3.0,90,360\n";
    let ws = Workspace::new(SITES, cells);
    for segments in [1, 2] {
        let mut config = ws.config();
        config.sector.segments = segments;
        let config = config.to_run_config().unwrap();

        let err = Pipeline::for_config(&config).run(&config).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InputValidation);
        assert!(err.to_string().contains("segments"));
        assert!(!ws.outputs.exists());
    }
}

#[test]
fn test_destination_conflict_fails_only_that_package() {
    let ws = Workspace::new(SITES, CELLS);
    fs::create_dir_all(&ws.outputs).unwrap();
    let existing = ws.outputs.join("Sites_for_GE.gpkg");
    fs::write(&existing, b"keep me").unwrap();
    let config = ws.run_config();

    let report = Pipeline::for_config(&config).run(&config).unwrap();

    assert!(!report.is_success());
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].artifact, Artifact::GeoPackage);
    assert_eq!(failures[0].path, existing);
    assert_eq!(
        failures[0].error().map(|e| e.kind()),
        Some(ErrorKind::DestinationConflict)
    );
    assert_eq!(fs::read(&existing).unwrap(), b"keep me");

    assert_eq!(report.written().count(), 5);
    assert!(ws.outputs.join("Cells_for_GE.gpkg").exists());
    assert!(ws.outputs.join("Sites_for_GE.kmz").exists());
}

#[test]
fn test_overwrite_replaces_packages() {
    let ws = Workspace::new(SITES, CELLS);
    let config = ws.run_config();
    Pipeline::for_config(&config).run(&config).unwrap();

    let mut config = ws.config();
    config.output.overwrite = true;
    let config = config.to_run_config().unwrap();
    let report = Pipeline::for_config(&config).run(&config).unwrap();

    assert!(report.is_success());
}
