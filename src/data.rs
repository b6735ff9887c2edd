use crate::error::LoadError;
use crate::types::{BusinessRecord, RecordTable};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

/// Bundled Sulawesi Barat dataset, used until something is uploaded.
const EMBEDDED_CSV: &str = include_str!("../data/umkm_sulbar.csv");

pub const REQUIRED_COLUMNS: [&str; 6] = ["nama_umkm", "kategori", "kabupaten", "alamat", "lat", "lon"];

#[derive(Debug, Clone)]
pub enum DataSource {
    Embedded,
    Csv(String),
    File(PathBuf),
}

impl DataSource {
    pub fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => DataSource::File(path),
            None => DataSource::Embedded,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub table: RecordTable,
    /// Rows skipped because lat or lon was missing or not a number.
    pub dropped: usize,
}

pub fn load(source: &DataSource) -> Result<LoadOutcome, LoadError> {
    let outcome = match source {
        DataSource::Embedded => load_from_reader(EMBEDDED_CSV.as_bytes())?,
        DataSource::Csv(text) => load_from_reader(text.as_bytes())?,
        DataSource::File(path) => {
            tracing::info!(path = ?path, "Loading records from file");
            load_from_reader(File::open(path)?)?
        }
    };

    if outcome.dropped > 0 {
        tracing::warn!(dropped = outcome.dropped, "Dropped rows with missing or invalid coordinates");
    }
    tracing::info!(records = outcome.table.len(), "Loaded record table");

    Ok(outcome)
}

fn load_from_reader<R: Read>(reader: R) -> Result<LoadOutcome, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::Headers)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();

    let columns = ColumnIndices::resolve(&headers)?;

    let mut records = Vec::new();
    let mut dropped = 0;

    for result in rdr.records() {
        let row = result?;
        match columns.parse_row(&row) {
            Some(record) => records.push(record),
            None => {
                tracing::debug!(line = ?row.position().map(|p| p.line()), "Skipping row without usable coordinates");
                dropped += 1;
            }
        }
    }

    Ok(LoadOutcome {
        table: RecordTable::new(records),
        dropped,
    })
}

struct ColumnIndices {
    name: usize,
    category: usize,
    district: usize,
    address: usize,
    lat: usize,
    lon: usize,
}

impl ColumnIndices {
    fn resolve(headers: &StringRecord) -> Result<Self, LoadError> {
        let position = |column: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}') == column)
        };

        let found: Vec<Option<usize>> = REQUIRED_COLUMNS.iter().map(|&c| position(c)).collect();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .zip(&found)
            .filter(|(_, idx)| idx.is_none())
            .map(|(c, _)| c.to_string())
            .collect();

        match found.as_slice() {
            [Some(name), Some(category), Some(district), Some(address), Some(lat), Some(lon)] => Ok(Self {
                name: *name,
                category: *category,
                district: *district,
                address: *address,
                lat: *lat,
                lon: *lon,
            }),
            _ => Err(LoadError::Schema { missing }),
        }
    }

    fn parse_row(&self, row: &StringRecord) -> Option<BusinessRecord> {
        let text = |idx: usize| row.get(idx).unwrap_or("").to_string();

        Some(BusinessRecord {
            name: text(self.name),
            category: text(self.category),
            district: text(self.district),
            address: text(self.address),
            lat: parse_coordinate(row.get(self.lat))?,
            lon: parse_coordinate(row.get(self.lon))?,
        })
    }
}

fn parse_coordinate(value: Option<&str>) -> Option<f64> {
    value
        .map(str::trim)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
