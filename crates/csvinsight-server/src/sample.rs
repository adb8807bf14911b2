//! Reduces a CSV file to a payload small enough for one model request.
//!
//! Rows become JSON objects keyed by header, only the first
//! [`SAMPLE_ROWS`] are kept, and the serialized array is cut at
//! [`MAX_PAYLOAD_CHARS`] characters.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;

pub const SAMPLE_ROWS: usize = 50;
pub const MAX_PAYLOAD_CHARS: usize = 12_000;

#[derive(Debug, Clone)]
pub struct CsvSample {
    pub headers: Vec<String>,
    /// First [`SAMPLE_ROWS`] non-empty rows.
    pub rows: Vec<Map<String, Value>>,
    /// Non-empty data rows in the whole file.
    pub total_rows: usize,
}

impl CsvSample {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("Failed to parse CSV file: {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .context("Failed to read CSV header row")?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        let mut total_rows = 0;

        for (idx, rec) in rdr.records().enumerate() {
            let record = rec.with_context(|| format!("Failed to parse CSV row {}", idx + 1))?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            total_rows += 1;
            if rows.len() < SAMPLE_ROWS {
                let row = headers
                    .iter()
                    .enumerate()
                    .map(|(i, h)| {
                        let v = record.get(i).unwrap_or_default();
                        (h.clone(), Value::String(v.to_string()))
                    })
                    .collect();
                rows.push(row);
            }
        }

        Ok(Self {
            headers,
            rows,
            total_rows,
        })
    }

    /// JSON array of the sampled rows, cut to [`MAX_PAYLOAD_CHARS`] characters.
    pub fn payload(&self) -> Result<String> {
        let json = serde_json::to_string(&self.rows)?;
        Ok(match json.char_indices().nth(MAX_PAYLOAD_CHARS) {
            Some((cut, _)) => json[..cut].to_string(),
            None => json,
        })
    }
}
