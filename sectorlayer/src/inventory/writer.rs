//! Write-back of sorted inventory tables.

use std::fs;
use std::path::Path;

use tracing::info;

use super::encoding::TextEncoding;
use super::records::{Record, RecordSet};
use super::InputError;

/// Write a record set as CSV in the given encoding, in its current order.
///
/// All characters are checked against the encoding before anything is
/// written, so an unrepresentable value leaves no file behind.
pub fn write_normalized<R: Record>(
    path: &Path,
    set: &RecordSet<R>,
    encoding: TextEncoding,
) -> Result<(), InputError> {
    let bytes = encode_normalized(path, set, encoding)?;
    fs::write(path, bytes).map_err(|e| InputError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    info!(path = %path.display(), rows = set.len(), "Wrote normalized table");
    Ok(())
}

/// Encode a record set as CSV bytes without touching the disk.
///
/// `path` is only used for error context.
pub fn encode_normalized<R: Record>(
    path: &Path,
    set: &RecordSet<R>,
    encoding: TextEncoding,
) -> Result<Vec<u8>, InputError> {
    let unencodable = |line: u64, column: &str, character: char| InputError::Unencodable {
        path: path.to_path_buf(),
        line,
        column: column.to_string(),
        character,
        encoding,
    };

    let headers = set
        .headers
        .iter()
        .map(|h| encoding.encode(h).map_err(|c| unencodable(1, h, c)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = Vec::with_capacity(set.len());
    for record in &set.records {
        let row = record
            .values()
            .iter()
            .zip(&set.headers)
            .map(|(value, column)| {
                encoding
                    .encode(value)
                    .map_err(|c| unencodable(record.line(), column, c))
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }

    let write_error = |e: std::io::Error| InputError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    };
    let csv_error = |e: csv::Error| InputError::Csv {
        path: path.to_path_buf(),
        source: e,
    };

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b',')
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(&headers).map_err(csv_error)?;
    for row in &rows {
        writer.write_record(row).map_err(csv_error)?;
    }
    writer.into_inner().map_err(|e| write_error(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::records::SiteRecord;
    use crate::sector::LatLon;
    use tempfile::TempDir;

    fn sites(town: &str) -> RecordSet<SiteRecord> {
        RecordSet::new(
            vec!["Site_ID".into(), "Town".into()],
            vec![SiteRecord {
                site_id: "S1".into(),
                position: LatLon::new(0.0, 0.0),
                line: 2,
                values: vec!["S1".into(), town.into()],
            }],
        )
    }

    #[test]
    fn test_writes_latin1_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Sites_mod.csv");

        write_normalized(&path, &sites("León"), TextEncoding::Latin1).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes, b"Site_ID,Town\nS1,Le\xf3n\n");
    }

    #[test]
    fn test_quotes_values_with_commas() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Sites_mod.csv");

        write_normalized(&path, &sites("Madrid, Centro"), TextEncoding::Utf8).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Site_ID,Town\nS1,\"Madrid, Centro\"\n");
    }

    #[test]
    fn test_unencodable_value_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Sites_mod.csv");

        let err = write_normalized(&path, &sites("Łódź"), TextEncoding::Latin1).unwrap_err();

        assert!(matches!(
            err,
            InputError::Unencodable { character: 'Ł', line: 2, .. }
        ));
        assert!(!path.exists());
    }
}
