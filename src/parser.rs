use crate::{errors::PkError, models::DatasetRow, Result};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io;
use std::path::Path;

/// Column names the input dataset must carry. Extra columns are ignored and
/// column order is free.
pub const REQUIRED_COLUMNS: [&str; 3] = ["PatientID", "Time", "Concentration"];

pub struct DatasetParser;

impl DatasetParser {
    pub fn parse_dataset<P: AsRef<Path>>(file_path: P) -> Result<Vec<DatasetRow>> {
        let file = File::open(file_path)?;
        Self::parse_reader(file)
    }

    /// Parse a CSV dataset into raw rows.
    ///
    /// The header is validated up front: absence of any required column is a
    /// schema error and rejects the whole dataset. Within rows, empty cells
    /// and NaN literals map to missing values (dropped later by the
    /// calculator), while malformed numeric text is a parse error.
    pub fn parse_reader<R: io::Read>(input: R) -> Result<Vec<DatasetRow>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(input);

        let headers = reader.headers()?.clone();
        let mut indices = [0usize; 3];
        let mut missing = Vec::new();
        for (slot, name) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
            match headers.iter().position(|h| h == name) {
                Some(idx) => *slot = idx,
                None => missing.push(name.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(PkError::MissingColumns(missing));
        }
        let [id_col, time_col, conc_col] = indices;

        let mut rows = Vec::new();
        for (record_no, result) in reader.records().enumerate() {
            let record = result?;
            // Header occupies line 1
            let line = record_no + 2;
            rows.push(DatasetRow {
                patient_id: record
                    .get(id_col)
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(String::from),
                time: Self::parse_cell(&record, time_col, "Time", line)?,
                concentration: Self::parse_cell(&record, conc_col, "Concentration", line)?,
            });
        }

        log::info!("Parsed {} data rows", rows.len());
        Ok(rows)
    }

    fn parse_cell(
        record: &StringRecord,
        idx: usize,
        column: &str,
        line: usize,
    ) -> Result<Option<f64>> {
        let raw = match record.get(idx) {
            Some(value) => value.trim(),
            None => return Ok(None),
        };
        if raw.is_empty() {
            return Ok(None);
        }
        let value: f64 = raw.parse().map_err(|_| {
            PkError::Parse(format!(
                "Invalid numeric value '{}' for {} on line {}",
                raw, column, line
            ))
        })?;
        // NaN is the conventional missing-value sentinel in exported datasets
        if value.is_nan() {
            Ok(None)
        } else {
            Ok(Some(value))
        }
    }
}
