//! Site and cell records.

use crate::sector::LatLon;

/// A radio site: one row of the sites file.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteRecord {
    pub site_id: String,
    pub position: LatLon,
    /// Line in the source file (1-based, header is line 1)
    pub line: u64,
    /// Raw values of every column, aligned with [`RecordSet::headers`]
    pub values: Vec<String>,
}

/// An antenna cell: one row of the cells file.
///
/// `beamwidth` and `radius` are already resolved against the configured
/// defaults when the file has no value for them.
#[derive(Debug, Clone, PartialEq)]
pub struct CellRecord {
    pub site_id: String,
    pub position: LatLon,
    /// Degrees clockwise from true north, normalized into [0, 360)
    pub azimuth: f64,
    /// Degrees, (0, 360]
    pub beamwidth: f64,
    /// Meters, > 0
    pub radius: f64,
    pub line: u64,
    pub values: Vec<String>,
}

/// Access shared by both record kinds.
pub trait Record {
    fn site_id(&self) -> &str;
    fn position(&self) -> LatLon;
    fn line(&self) -> u64;
    fn values(&self) -> &[String];
}

impl Record for SiteRecord {
    fn site_id(&self) -> &str {
        &self.site_id
    }

    fn position(&self) -> LatLon {
        self.position
    }

    fn line(&self) -> u64 {
        self.line
    }

    fn values(&self) -> &[String] {
        &self.values
    }
}

impl Record for CellRecord {
    fn site_id(&self) -> &str {
        &self.site_id
    }

    fn position(&self) -> LatLon {
        self.position
    }

    fn line(&self) -> u64 {
        self.line
    }

    fn values(&self) -> &[String] {
        &self.values
    }
}

/// Records of one file together with its column headers.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet<R> {
    pub headers: Vec<String>,
    pub records: Vec<R>,
}

impl<R: Record> RecordSet<R> {
    pub fn new(headers: Vec<String>, records: Vec<R>) -> Self {
        Self { headers, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index of a column by exact header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Stable sort by site id.
    ///
    /// When every id in the set is an integer the ids are compared
    /// numerically (so "9" sorts before "10"), otherwise lexically.
    /// Numerically equal spellings ("7", "07") are ordered lexically.
    pub fn sort_by_site_id(&mut self) {
        let numeric = !self.records.is_empty()
            && self
                .records
                .iter()
                .all(|r| r.site_id().parse::<i64>().is_ok());

        if numeric {
            self.records.sort_by(|a, b| {
                let key = |r: &R| r.site_id().parse::<i64>().unwrap_or_default();
                key(a)
                    .cmp(&key(b))
                    .then_with(|| a.site_id().cmp(b.site_id()))
            });
        } else {
            self.records.sort_by(|a, b| a.site_id().cmp(b.site_id()));
        }
    }
}

pub type SiteSet = RecordSet<SiteRecord>;
pub type CellSet = RecordSet<CellRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    fn site(id: &str, line: u64) -> SiteRecord {
        SiteRecord {
            site_id: id.to_string(),
            position: LatLon::new(0.0, 0.0),
            line,
            values: vec![id.to_string()],
        }
    }

    #[test]
    fn test_sort_lexical_is_stable() {
        let mut set = RecordSet::new(
            vec!["Site_ID".to_string()],
            vec![site("B", 2), site("A", 3), site("B", 4), site("A", 5)],
        );
        set.sort_by_site_id();
        let order: Vec<u64> = set.records.iter().map(|r| r.line).collect();
        assert_eq!(order, vec![3, 5, 2, 4]);
    }

    #[test]
    fn test_sort_numeric_ids() {
        let mut set = RecordSet::new(
            vec!["Site_ID".to_string()],
            vec![site("10", 2), site("9", 3), site("100", 4)],
        );
        set.sort_by_site_id();
        let ids: Vec<&str> = set.records.iter().map(|r| r.site_id.as_str()).collect();
        assert_eq!(ids, vec!["9", "10", "100"]);
    }

    #[test]
    fn test_sort_numeric_ties_keep_equal_ids_adjacent() {
        let mut set = RecordSet::new(
            vec!["Site_ID".to_string()],
            vec![site("7", 2), site("07", 3), site("7", 4), site("6", 5)],
        );
        set.sort_by_site_id();
        let order: Vec<u64> = set.records.iter().map(|r| r.line).collect();
        assert_eq!(order, vec![5, 3, 2, 4]);
    }

    #[test]
    fn test_sort_mixed_ids_falls_back_to_lexical() {
        let mut set = RecordSet::new(
            vec!["Site_ID".to_string()],
            vec![site("10", 2), site("9", 3), site("X1", 4)],
        );
        set.sort_by_site_id();
        let ids: Vec<&str> = set.records.iter().map(|r| r.site_id.as_str()).collect();
        assert_eq!(ids, vec!["10", "9", "X1"]);
    }

    #[test]
    fn test_column_index() {
        let set: SiteSet = RecordSet::new(vec!["Site_ID".into(), "Latitude".into()], vec![]);
        assert_eq!(set.column_index("Latitude"), Some(1));
        assert_eq!(set.column_index("latitude"), None);
    }
}
