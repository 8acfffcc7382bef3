//! Labeled dataset handling for the offline training side.
//!
//! The contract with the rest of the repository is the `id,text,label` CSV
//! schema: the synthetic generator produces it, the validator checks it, and
//! the trainer consumes it.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classifier::TriageLabel;

pub mod synthetic;

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Dataset is empty")]
    Empty,
}

/// One labeled symptom description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub text: String,
    pub label: TriageLabel,
}

/// Reads a labeled dataset from a CSV file with an `id,text,label` header.
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Record>, DataError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    if records.is_empty() {
        return Err(DataError::Empty);
    }
    Ok(records)
}

/// Writes a labeled dataset to a CSV file with an `id,text,label` header.
pub fn write_csv<P: AsRef<Path>>(path: P, records: &[Record]) -> Result<(), DataError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Summary of a dataset's shape, printed by the `validate-data` tool.
#[derive(Debug)]
pub struct ValidationReport {
    pub rows: usize,
    pub empty_text: usize,
    pub label_counts: HashMap<TriageLabel, usize>,
}

impl ValidationReport {
    pub fn for_records(records: &[Record]) -> Self {
        let mut label_counts = HashMap::new();
        let mut empty_text = 0;
        for record in records {
            *label_counts.entry(record.label).or_insert(0) += 1;
            if record.text.trim().is_empty() {
                empty_text += 1;
            }
        }
        Self {
            rows: records.len(),
            empty_text,
            label_counts,
        }
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Rows: {}", self.rows)?;
        writeln!(f, "Empty text values: {}", self.empty_text)?;
        writeln!(f, "Label counts:")?;
        for label in TriageLabel::ALL {
            let count = self.label_counts.get(&label).copied().unwrap_or(0);
            writeln!(f, "  {}: {}", label, count)?;
        }
        Ok(())
    }
}
