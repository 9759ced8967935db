use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::credits::domain::{GrossReceiptsRecord, QreCategory, QreEntry};

#[derive(Debug, thiserror::Error)]
pub enum EntryImportError {
    #[error("failed to open {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid CSV data")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unknown QRE category `{value}`")]
    UnknownCategory { row: usize, value: String },
    #[error("row {row}: needs either calculated_qre or annual_cost with applied_percentage")]
    MissingAmount { row: usize },
}

/// Reads `category,name,annual_cost,applied_percentage,calculated_qre` rows.
/// A blank `calculated_qre` is derived from cost and percentage.
pub fn read_entries<R: Read>(reader: R) -> Result<Vec<QreEntry>, EntryImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut entries = Vec::new();

    for (index, record) in csv_reader.deserialize::<EntryRow>().enumerate() {
        let row = record?;
        // header is row 1
        let row_number = index + 2;
        let category =
            QreCategory::parse(&row.category).ok_or_else(|| EntryImportError::UnknownCategory {
                row: row_number,
                value: row.category.clone(),
            })?;

        let entry = match (row.calculated_qre, row.annual_cost, row.applied_percentage) {
            (Some(amount), cost, percentage) => QreEntry {
                category,
                name: row.name,
                annual_cost: cost.unwrap_or(amount),
                applied_percentage: percentage.unwrap_or(100.0),
                calculated_qre: amount,
            },
            (None, Some(cost), Some(percentage)) => {
                QreEntry::new(category, row.name, cost, percentage)
            }
            (None, _, _) => return Err(EntryImportError::MissingAmount { row: row_number }),
        };
        entries.push(entry);
    }

    Ok(entries)
}

pub fn read_entries_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<QreEntry>, EntryImportError> {
    read_entries(open(path.as_ref())?)
}

/// Reads `year,gross_receipts` rows.
pub fn read_gross_receipts<R: Read>(
    reader: R,
) -> Result<Vec<GrossReceiptsRecord>, EntryImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for record in csv_reader.deserialize::<GrossReceiptsRecord>() {
        records.push(record?);
    }

    Ok(records)
}

pub fn read_gross_receipts_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<GrossReceiptsRecord>, EntryImportError> {
    read_gross_receipts(open(path.as_ref())?)
}

fn open(path: &Path) -> Result<BufReader<File>, EntryImportError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| EntryImportError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[derive(Debug, Deserialize)]
struct EntryRow {
    category: String,
    #[serde(default)]
    name: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    annual_cost: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    applied_percentage: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    calculated_qre: Option<f64>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .replace([',', '$'], "")
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
