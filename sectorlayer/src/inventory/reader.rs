//! CSV reading and validation of inventory files.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::encoding::TextEncoding;
use super::records::{CellRecord, CellSet, RecordSet, SiteRecord, SiteSet};
use super::InputError;
use crate::sector::{normalize_bearing, LatLon, FULL_CIRCLE, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Column names used to locate required and optional fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub site_id: String,
    pub latitude: String,
    pub longitude: String,
    pub azimuth: String,
    /// Optional per-cell beamwidth column
    pub beamwidth: String,
    /// Optional per-cell radius column
    pub radius: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            site_id: "Site_ID".to_string(),
            latitude: "Latitude".to_string(),
            longitude: "Longitude".to_string(),
            azimuth: "Azimuth".to_string(),
            beamwidth: "Beamwidth".to_string(),
            radius: "Radius".to_string(),
        }
    }
}

/// How inventory files are decoded and interpreted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputOptions {
    pub encoding: TextEncoding,
    pub columns: ColumnMap,
}

/// Values used for cells whose file carries no beamwidth or radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellDefaults {
    pub beamwidth: f64,
    pub radius: f64,
}

/// Undecoded table: headers plus `(line, values)` rows.
#[derive(Debug)]
struct RawTable {
    headers: Vec<String>,
    rows: Vec<(u64, Vec<String>)>,
}

impl RawTable {
    fn require(&self, path: &Path, column: &str) -> Result<usize, InputError> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| InputError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            })
    }

    fn optional(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }
}

fn read_raw(path: &Path, encoding: TextEncoding) -> Result<RawTable, InputError> {
    let bytes = fs::read(path).map_err(|e| InputError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    let text = encoding
        .decode(&bytes)
        .ok_or_else(|| InputError::InvalidEncoding {
            path: path.to_path_buf(),
            encoding,
        })?;
    parse_raw(path, &text)
}

fn parse_raw(path: &Path, text: &str) -> Result<RawTable, InputError> {
    let csv_error = |e: csv::Error| InputError::Csv {
        path: path.to_path_buf(),
        source: e,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        rows.push((line, record.iter().map(str::to_string).collect()));
    }

    debug!(
        path = %path.display(),
        columns = headers.len(),
        rows = rows.len(),
        "Parsed CSV table"
    );

    Ok(RawTable { headers, rows })
}

/// Context for value errors on one row.
struct RowContext<'a> {
    path: &'a Path,
    line: u64,
    site_id: &'a str,
}

impl RowContext<'_> {
    fn invalid(&self, column: &str, value: &str, reason: &str) -> InputError {
        InputError::InvalidValue {
            path: self.path.to_path_buf(),
            line: self.line,
            site_id: self.site_id.to_string(),
            column: column.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn number(&self, column: &str, raw: &str) -> Result<f64, InputError> {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| self.invalid(column, raw, "expected a number"))?;
        if !value.is_finite() {
            return Err(self.invalid(column, raw, "expected a finite number"));
        }
        Ok(value)
    }

    fn position(
        &self,
        values: &[String],
        lat_idx: usize,
        lon_idx: usize,
        columns: &ColumnMap,
    ) -> Result<LatLon, InputError> {
        let lat = self.number(&columns.latitude, &values[lat_idx])?;
        if !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(self.invalid(&columns.latitude, &values[lat_idx], "must be within [-90, 90]"));
        }
        let lon = self.number(&columns.longitude, &values[lon_idx])?;
        if !(MIN_LON..=MAX_LON).contains(&lon) {
            return Err(self.invalid(
                &columns.longitude,
                &values[lon_idx],
                "must be within [-180, 180]",
            ));
        }
        Ok(LatLon::new(lat, lon))
    }

    /// Optional numeric column: `None` when the column is absent or blank.
    fn optional_number(
        &self,
        column: &str,
        values: &[String],
        idx: Option<usize>,
    ) -> Result<Option<f64>, InputError> {
        match idx.map(|i| values[i].trim()) {
            Some(raw) if !raw.is_empty() => self.number(column, raw).map(Some),
            _ => Ok(None),
        }
    }
}

fn site_id_of(path: &Path, line: u64, values: &[String], idx: usize) -> Result<String, InputError> {
    let id = values[idx].trim();
    if id.is_empty() {
        return Err(InputError::EmptySiteId {
            path: path.to_path_buf(),
            line,
        });
    }
    Ok(id.to_string())
}

/// Read and validate the sites file, sorted by site id.
///
/// Fails on missing columns, unparsable coordinates, empty or duplicate ids.
pub fn read_sites(path: &Path, options: &InputOptions) -> Result<SiteSet, InputError> {
    let table = read_raw(path, options.encoding)?;
    let columns = &options.columns;
    let id_idx = table.require(path, &columns.site_id)?;
    let lat_idx = table.require(path, &columns.latitude)?;
    let lon_idx = table.require(path, &columns.longitude)?;

    let mut records = Vec::with_capacity(table.rows.len());
    for (line, values) in table.rows {
        let site_id = site_id_of(path, line, &values, id_idx)?;
        let ctx = RowContext {
            path,
            line,
            site_id: &site_id,
        };
        let position = ctx.position(&values, lat_idx, lon_idx, columns)?;
        records.push(SiteRecord {
            site_id,
            position,
            line,
            values,
        });
    }

    let mut sites = RecordSet::new(table.headers, records);
    sites.sort_by_site_id();
    check_unique_sites(path, &sites)?;

    info!(path = %path.display(), count = sites.len(), "Loaded sites");
    Ok(sites)
}

/// Read and validate the cells file, sorted by site id.
///
/// Cells may share a site id. Beamwidth and radius come from their columns
/// when present and non-blank, otherwise from `defaults`.
pub fn read_cells(
    path: &Path,
    options: &InputOptions,
    defaults: &CellDefaults,
) -> Result<CellSet, InputError> {
    let table = read_raw(path, options.encoding)?;
    let columns = &options.columns;
    let id_idx = table.require(path, &columns.site_id)?;
    let lat_idx = table.require(path, &columns.latitude)?;
    let lon_idx = table.require(path, &columns.longitude)?;
    let az_idx = table.require(path, &columns.azimuth)?;
    let bw_idx = table.optional(&columns.beamwidth);
    let radius_idx = table.optional(&columns.radius);

    let mut records = Vec::with_capacity(table.rows.len());
    for (line, values) in table.rows {
        let site_id = site_id_of(path, line, &values, id_idx)?;
        let ctx = RowContext {
            path,
            line,
            site_id: &site_id,
        };
        let position = ctx.position(&values, lat_idx, lon_idx, columns)?;
        let azimuth = normalize_bearing(ctx.number(&columns.azimuth, &values[az_idx])?);

        let beamwidth = ctx
            .optional_number(&columns.beamwidth, &values, bw_idx)?
            .unwrap_or(defaults.beamwidth);
        if beamwidth <= 0.0 || beamwidth > FULL_CIRCLE {
            return Err(ctx.invalid(
                &columns.beamwidth,
                &beamwidth.to_string(),
                "must be within (0, 360]",
            ));
        }

        let radius = ctx
            .optional_number(&columns.radius, &values, radius_idx)?
            .unwrap_or(defaults.radius);
        if radius <= 0.0 {
            return Err(ctx.invalid(&columns.radius, &radius.to_string(), "must be greater than 0"));
        }

        records.push(CellRecord {
            site_id,
            position,
            azimuth,
            beamwidth,
            radius,
            line,
            values,
        });
    }

    let mut cells = RecordSet::new(table.headers, records);
    cells.sort_by_site_id();

    info!(path = %path.display(), count = cells.len(), "Loaded cells");
    Ok(cells)
}

/// Site ids must be unique. The first repeat in file order is reported.
fn check_unique_sites(path: &Path, sites: &SiteSet) -> Result<(), InputError> {
    let mut by_line: Vec<&SiteRecord> = sites.records.iter().collect();
    by_line.sort_by_key(|r| r.line);

    let mut seen: HashMap<&str, u64> = HashMap::with_capacity(by_line.len());
    for record in by_line {
        if let Some(&first_line) = seen.get(record.site_id.as_str()) {
            return Err(InputError::DuplicateSiteId {
                path: path.to_path_buf(),
                site_id: record.site_id.clone(),
                first_line,
                line: record.line,
            });
        }
        seen.insert(&record.site_id, record.line);
    }
    Ok(())
}
