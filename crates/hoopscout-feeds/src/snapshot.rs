// Offline ratings source backed by CSV exports.
//
// Layout under the snapshot directory:
//   <year>/<endpoint>.csv      season tables (e.g. 2026/four-factors.csv)
//   fanmatch/<YYYY-MM-DD>.csv  daily predictions
//   archive/<YYYY-MM-DD>.csv   historical ratings

use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use hoopscout_core::RawRow;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{FeedError, FeedResult};
use crate::ratings::{Dataset, RatingsProvider, RatingsQuery};

pub struct CsvSnapshotProvider {
    dir: PathBuf,
}

impl CsvSnapshotProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn table_path(&self, dataset: Dataset, year: u16) -> PathBuf {
        self.dir
            .join(year.to_string())
            .join(format!("{}.csv", dataset.endpoint()))
    }

    fn dated_path(&self, kind: &str, date: NaiveDate) -> PathBuf {
        self.dir
            .join(kind)
            .join(format!("{}.csv", date.format("%Y-%m-%d")))
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Read every record as a row of string cells keyed by header. Records that
/// fail to parse are skipped with a warning.
fn rows_from_reader<R: Read>(rdr: R) -> Result<Vec<RawRow>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        match result {
            Ok(record) => {
                let row: RawRow = headers
                    .iter()
                    .zip(record.iter())
                    .map(|(h, cell)| (h.trim().to_string(), Value::String(cell.trim().to_string())))
                    .collect();
                rows.push(row);
            }
            Err(e) => {
                warn!("skipping malformed snapshot record {}: {}", i + 1, e);
            }
        }
    }
    Ok(rows)
}

fn load_rows(path: &Path) -> FeedResult<Vec<RawRow>> {
    let file = std::fs::File::open(path).map_err(|e| FeedError::Snapshot {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let rows = rows_from_reader(file).map_err(|e| FeedError::Snapshot {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!(path = %path.display(), rows = rows.len(), "loaded snapshot");
    Ok(rows)
}

fn filter_rows(rows: Vec<RawRow>, team_id: Option<u32>, conference: Option<&str>) -> Vec<RawRow> {
    rows.into_iter()
        .filter(|r| team_id.map_or(true, |id| r.float("TeamID") == f64::from(id)))
        .filter(|r| conference.map_or(true, |c| r.text_eq_ignore_case("ConfShort", c)))
        .collect()
}

#[async_trait]
impl RatingsProvider for CsvSnapshotProvider {
    async fn table(&self, dataset: Dataset, query: &RatingsQuery) -> FeedResult<Vec<RawRow>> {
        let rows = load_rows(&self.table_path(dataset, query.year))?;
        // Apply the same filters the live API would for this dataset.
        let params = query.params(dataset);
        let param = |name: &str| params.iter().find(|(k, _)| *k == name).map(|(_, v)| v.as_str());
        let team_id = param("team_id").and_then(|v| v.parse::<u32>().ok());
        Ok(filter_rows(rows, team_id, param("c")))
    }

    async fn fanmatch(&self, date: NaiveDate) -> FeedResult<Vec<RawRow>> {
        load_rows(&self.dated_path("fanmatch", date))
    }

    async fn archive(&self, date: NaiveDate, team_id: Option<u32>) -> FeedResult<Vec<RawRow>> {
        let rows = load_rows(&self.dated_path("archive", date))?;
        Ok(filter_rows(rows, team_id, None))
    }

    fn clear_cache(&self) {}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
